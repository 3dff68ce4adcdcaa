//! XML Serializer
//!
//! quick-xmlの`Writer`を使用して申請バッチをXMLドキュメントに変換します。

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

use crate::error::SubmissionError;
use crate::types::{HeaderContext, Linkage, ProviderInclusion, Relationship, SubmissionBatch};

/// XMLスキーマインスタンス名前空間
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// 要素名
mod tags {
    pub const ROOT: &str = "operadora";
    pub const REGISTRO_ANS: &str = "registroANS";
    pub const CNPJ_OPERADORA: &str = "cnpjOperadora";
    pub const SOLICITACAO: &str = "solicitacao";
    pub const NOSSO_NUMERO: &str = "nossoNumero";
    pub const ISENCAO_ONUS: &str = "isencaoOnus";
    pub const INCLUSAO: &str = "inclusaoPrestador";
    pub const CLASSIFICACAO: &str = "classificacao";
    pub const CNPJ_CPF: &str = "cnpjCpf";
    pub const CNES: &str = "cnes";
    pub const UF: &str = "uf";
    pub const CODIGO_MUNICIPIO_IBGE: &str = "codigoMunicipioIBGE";
    pub const RAZAO_SOCIAL: &str = "razaoSocial";
    pub const RELACAO_OPERADORA: &str = "relacaoOperadora";
    pub const TIPO_CONTRATUALIZACAO: &str = "tipoContratualizacao";
    pub const REGISTRO_ANS_INTERMEDIARIA: &str = "registroANSOperadoraIntermediaria";
    pub const DATA_CONTRATUALIZACAO: &str = "dataContratualizacao";
    pub const DATA_INICIO_PRESTACAO: &str = "dataInicioPrestacaoServico";
    pub const DISPONIBILIDADE_SERVICO: &str = "disponibilidadeServico";
    pub const URGENCIA_EMERGENCIA: &str = "urgenciaEmergencia";
    pub const VINCULACAO: &str = "vinculacao";
    pub const PLANO_VINCULACAO: &str = "numeroRegistroPlanoVinculacao";
    pub const CODIGO_PLANO_OPERADORA: &str = "codigoPlanoOperadoraVinculacao";
}

/// XMLドキュメントライター
///
/// インデント付きで要素を書き出します。空の値は`<tag></tag>`として出力されます。
pub(crate) struct XmlDocumentWriter<W: Write> {
    writer: Writer<W>,
}

impl<W: Write> XmlDocumentWriter<W> {
    /// 新しいライターを生成
    ///
    /// # 引数
    ///
    /// * `inner` - 出力先
    /// * `indent` - インデント幅（スペース数、0の場合はインデントなし）
    pub fn new(inner: W, indent: usize) -> Self {
        let writer = if indent == 0 {
            Writer::new(inner)
        } else {
            Writer::new_with_indent(inner, b' ', indent)
        };
        Self { writer }
    }

    /// 申請バッチ全体を書き出す
    ///
    /// # 出力構造
    ///
    /// ```xml
    /// <?xml version="1.0" encoding="UTF-8"?>
    /// <operadora xmlns:xsi="..." xsi:noNamespaceSchemaLocation="...">
    ///   <registroANS>...</registroANS>
    ///   <cnpjOperadora>...</cnpjOperadora>
    ///   <solicitacao>
    ///     <nossoNumero>...</nossoNumero>
    ///     <isencaoOnus>...</isencaoOnus>
    ///     <inclusaoPrestador>...</inclusaoPrestador>
    ///   </solicitacao>
    /// </operadora>
    /// ```
    pub fn write_batch(
        mut self,
        batch: &SubmissionBatch,
        schema_location: &str,
    ) -> Result<W, SubmissionError> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let root = BytesStart::new(tags::ROOT).with_attributes([
            ("xmlns:xsi", XSI_NAMESPACE),
            ("xsi:noNamespaceSchemaLocation", schema_location),
        ]);
        self.writer.write_event(Event::Start(root))?;

        self.write_header(&batch.header, &batch.inclusions)?;

        self.writer.write_event(Event::End(BytesEnd::new(tags::ROOT)))?;

        let mut inner = self.writer.into_inner();
        inner.write_all(b"\n")?;
        Ok(inner)
    }

    fn write_header(
        &mut self,
        header: &HeaderContext,
        inclusions: &[ProviderInclusion],
    ) -> Result<(), SubmissionError> {
        self.text(tags::REGISTRO_ANS, &header.registration_id)?;
        self.text(tags::CNPJ_OPERADORA, &header.operator_tax_id)?;

        self.start(tags::SOLICITACAO)?;
        self.text(tags::NOSSO_NUMERO, &header.reference_number)?;
        self.text(tags::ISENCAO_ONUS, &header.fee_exemption)?;
        for inclusion in inclusions {
            self.write_inclusion(inclusion)?;
        }
        self.end(tags::SOLICITACAO)
    }

    fn write_inclusion(&mut self, inclusion: &ProviderInclusion) -> Result<(), SubmissionError> {
        self.start(tags::INCLUSAO)?;

        self.text(tags::CLASSIFICACAO, &inclusion.classification)?;
        self.text(tags::CNPJ_CPF, &inclusion.tax_id)?;
        self.text(tags::CNES, &inclusion.facility_id)?;
        self.text(tags::UF, &inclusion.state)?;
        self.text(tags::CODIGO_MUNICIPIO_IBGE, &inclusion.municipality_code)?;
        self.text(tags::RAZAO_SOCIAL, &inclusion.legal_name)?;
        self.text(tags::RELACAO_OPERADORA, &inclusion.relationship_code)?;

        match &inclusion.relationship {
            Relationship::Contractual {
                contract_type,
                intermediary_registration,
            } => {
                self.text(tags::TIPO_CONTRATUALIZACAO, contract_type)?;
                self.text(tags::REGISTRO_ANS_INTERMEDIARIA, intermediary_registration)?;
            }
            Relationship::Other => {}
        }

        self.text(tags::DATA_CONTRATUALIZACAO, &inclusion.contract_date)?;
        self.text(tags::DATA_INICIO_PRESTACAO, &inclusion.service_start_date)?;
        self.text(tags::DISPONIBILIDADE_SERVICO, &inclusion.service_availability)?;
        self.text(tags::URGENCIA_EMERGENCIA, &inclusion.urgency_emergency)?;

        self.write_linkage(&inclusion.linkage)?;

        self.end(tags::INCLUSAO)
    }

    /// vinculacaoブロック（常に3要素、固定順）
    fn write_linkage(&mut self, linkage: &Linkage) -> Result<(), SubmissionError> {
        self.start(tags::VINCULACAO)?;
        self.text(tags::PLANO_VINCULACAO, &linkage.plan_registration)?;
        self.text(tags::PLANO_VINCULACAO, &linkage.second_plan_registration)?;
        self.text(tags::CODIGO_PLANO_OPERADORA, &linkage.operator_plan_code)?;
        self.end(tags::VINCULACAO)
    }

    fn start(&mut self, name: &str) -> Result<(), SubmissionError> {
        self.writer.write_event(Event::Start(BytesStart::new(name)))?;
        Ok(())
    }

    fn end(&mut self, name: &str) -> Result<(), SubmissionError> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    /// テキスト要素を書き出す（引用符はエスケープしない）
    fn text(&mut self, name: &str, value: &str) -> Result<(), SubmissionError> {
        self.writer
            .create_element(name)
            .write_text_content(BytesText::from_escaped(partial_escape(value)))?;
        Ok(())
    }
}

/// XML 1.0で使用できない最初の文字を検索
///
/// 許可される文字: `#x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]`
pub(crate) fn find_invalid_char(value: &str) -> Option<char> {
    value.chars().find(|&c| {
        !matches!(
            c,
            '\u{9}' | '\u{A}' | '\u{D}' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
        )
    })
}

/// 申請バッチをXMLバイト列に変換
pub(crate) fn render_batch(
    batch: &SubmissionBatch,
    schema_location: &str,
    indent: usize,
) -> Result<Vec<u8>, SubmissionError> {
    XmlDocumentWriter::new(Vec::new(), indent).write_batch(batch, schema_location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DateWarning, HeaderContext};

    fn inclusion(relationship: Relationship) -> ProviderInclusion {
        ProviderInclusion {
            classification: "1".to_string(),
            tax_id: "11222333000181".to_string(),
            facility_id: "2077485".to_string(),
            state: "SP".to_string(),
            municipality_code: "355030".to_string(),
            legal_name: "Clínica A & B <Ltda>".to_string(),
            relationship_code: match relationship {
                Relationship::Contractual { .. } => "C".to_string(),
                Relationship::Other => "P".to_string(),
            },
            relationship,
            contract_date: "15/03/2024".to_string(),
            service_start_date: String::new(),
            service_availability: "T".to_string(),
            urgency_emergency: "N".to_string(),
            linkage: Linkage {
                plan_registration: "111".to_string(),
                second_plan_registration: String::new(),
                operator_plan_code: "ABC".to_string(),
            },
        }
    }

    fn batch(inclusions: Vec<ProviderInclusion>) -> SubmissionBatch {
        SubmissionBatch {
            header: HeaderContext {
                registration_id: "123456".to_string(),
                operator_tax_id: "99888777000166".to_string(),
                reference_number: "42".to_string(),
                fee_exemption: "N".to_string(),
            },
            inclusions,
            warnings: Vec::<DateWarning>::new(),
        }
    }

    fn render(batch: &SubmissionBatch) -> String {
        let bytes = render_batch(batch, "SolicitacaoInclusaoPrestador.xsd", 2).unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_declaration_and_root() {
        let xml = render(&batch(vec![]));
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains(
            "<operadora xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" \
             xsi:noNamespaceSchemaLocation=\"SolicitacaoInclusaoPrestador.xsd\">"
        ));
        assert!(xml.trim_end().ends_with("</operadora>"));
        assert!(xml.ends_with('\n'));
    }

    #[test]
    fn test_header_layout() {
        let xml = render(&batch(vec![]));
        let expected = "\
<operadora xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\" xsi:noNamespaceSchemaLocation=\"SolicitacaoInclusaoPrestador.xsd\">
  <registroANS>123456</registroANS>
  <cnpjOperadora>99888777000166</cnpjOperadora>
  <solicitacao>
    <nossoNumero>42</nossoNumero>
    <isencaoOnus>N</isencaoOnus>
  </solicitacao>
</operadora>
";
        assert!(xml.ends_with(expected), "unexpected layout:\n{}", xml);
    }

    #[test]
    fn test_contractual_inclusion_layout() {
        let xml = render(&batch(vec![inclusion(Relationship::Contractual {
            contract_type: "D".to_string(),
            intermediary_registration: "654321".to_string(),
        })]));

        let expected = "
    <inclusaoPrestador>
      <classificacao>1</classificacao>
      <cnpjCpf>11222333000181</cnpjCpf>
      <cnes>2077485</cnes>
      <uf>SP</uf>
      <codigoMunicipioIBGE>355030</codigoMunicipioIBGE>
      <razaoSocial>Clínica A &amp; B &lt;Ltda&gt;</razaoSocial>
      <relacaoOperadora>C</relacaoOperadora>
      <tipoContratualizacao>D</tipoContratualizacao>
      <registroANSOperadoraIntermediaria>654321</registroANSOperadoraIntermediaria>
      <dataContratualizacao>15/03/2024</dataContratualizacao>
      <dataInicioPrestacaoServico></dataInicioPrestacaoServico>
      <disponibilidadeServico>T</disponibilidadeServico>
      <urgenciaEmergencia>N</urgenciaEmergencia>
      <vinculacao>
        <numeroRegistroPlanoVinculacao>111</numeroRegistroPlanoVinculacao>
        <numeroRegistroPlanoVinculacao></numeroRegistroPlanoVinculacao>
        <codigoPlanoOperadoraVinculacao>ABC</codigoPlanoOperadoraVinculacao>
      </vinculacao>
    </inclusaoPrestador>
";
        assert!(xml.contains(expected), "unexpected layout:\n{}", xml);
    }

    #[test]
    fn test_other_relationship_omits_conditional_elements() {
        let xml = render(&batch(vec![inclusion(Relationship::Other)]));
        assert!(xml.contains("<relacaoOperadora>P</relacaoOperadora>"));
        assert!(!xml.contains("tipoContratualizacao"));
        assert!(!xml.contains("registroANSOperadoraIntermediaria"));
        assert!(xml.contains("<dataContratualizacao>15/03/2024</dataContratualizacao>"));
    }

    #[test]
    fn test_one_inclusion_per_row() {
        let xml = render(&batch(vec![
            inclusion(Relationship::Other),
            inclusion(Relationship::Other),
            inclusion(Relationship::Other),
        ]));
        assert_eq!(xml.matches("<inclusaoPrestador>").count(), 3);
        assert_eq!(xml.matches("<vinculacao>").count(), 3);
    }

    #[test]
    fn test_quotes_are_written_literally() {
        let mut quoted = inclusion(Relationship::Other);
        quoted.legal_name = "Rede D'Or \"São Luiz\" <SP>".to_string();
        let xml = render(&batch(vec![quoted]));
        assert!(xml.contains("<razaoSocial>Rede D'Or \"São Luiz\" &lt;SP&gt;</razaoSocial>"));
    }

    #[test]
    fn test_find_invalid_char() {
        assert_eq!(find_invalid_char("Clínica A & B\tLtda\r\n"), None);
        assert_eq!(find_invalid_char("Clinica\u{0B}A\u{01}"), Some('\u{0B}'));
        assert_eq!(find_invalid_char("\u{FFFE}"), Some('\u{FFFE}'));
        assert_eq!(find_invalid_char("\u{1F600}"), None);
        assert_eq!(find_invalid_char(""), None);
    }

    #[test]
    fn test_without_indent() {
        let bytes = render_batch(&batch(vec![]), "x.xsd", 0).unwrap();
        let xml = String::from_utf8(bytes).unwrap();
        assert!(xml.contains("<registroANS>123456</registroANS><cnpjOperadora>"));
    }
}
