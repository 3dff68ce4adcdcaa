//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

/// 列名定数
///
/// 入力スプレッドシートの列名（大文字・小文字を区別）。
pub(crate) mod columns {
    pub const REGISTRO_ANS: &str = "registroANS";
    pub const CNPJ_OPERADORA: &str = "cnpjOperadora";
    pub const NOSSO_NUMERO: &str = "nossoNumero";
    pub const ISENCAO_ONUS: &str = "isencaoOnus";
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
    pub const PLANO_VINCULACAO: &str = "numeroRegistroPlanoVinculacao";
    pub const PLANO_VINCULACAO_1: &str = "numeroRegistroPlanoVinculacao1";
    pub const CODIGO_PLANO_OPERADORA: &str = "codigoPlanoOperadoraVinculacao";
}

/// 契約関係を示す関係コード
pub(crate) const CONTRACTUAL_CODE: &str = "C";

/// テキストのみで構成された表形式データセット
///
/// ヘッダー行の列名と、データ行のセル文字列を保持します。
/// 空セルは常に空文字列として格納され、欠損マーカーは存在しません。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    /// ヘッダーと行からデータセットを生成
    ///
    /// 各行はヘッダーと同じ長さに揃えられます（不足分は空文字列で埋め、
    /// 余剰セルは切り捨て）。
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// ヘッダー行の列名
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// データ行数
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// データ行が存在しないかを判定
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 列名から列インデックスを検索
    ///
    /// 同名の列が複数ある場合は最初の列を返します。
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// データ行を先頭から順に走査
    pub(crate) fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

/// ヘッダー情報（先頭行から1回だけ読み取るオペレーター情報）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderContext {
    /// registroANS
    pub registration_id: String,
    /// cnpjOperadora
    pub operator_tax_id: String,
    /// nossoNumero
    pub reference_number: String,
    /// isencaoOnus
    pub fee_exemption: String,
}

/// オペレーターとの関係
///
/// 関係コードが`"C"`の場合のみ、契約種別と仲介オペレーター登録番号を持ちます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relationship {
    /// 契約関係（関係コード`"C"`）
    Contractual {
        /// tipoContratualizacao
        contract_type: String,
        /// registroANSOperadoraIntermediaria
        intermediary_registration: String,
    },

    /// 契約以外（空文字列を含む）
    Other,
}

/// vinculacaoブロック
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Linkage {
    /// numeroRegistroPlanoVinculacao
    pub plan_registration: String,
    /// numeroRegistroPlanoVinculacao1（出力時も同じ要素名）
    pub second_plan_registration: String,
    /// codigoPlanoOperadoraVinculacao
    pub operator_plan_code: String,
}

/// 1行分の医療提供者追加申請レコード
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInclusion {
    pub classification: String,
    pub tax_id: String,
    pub facility_id: String,
    pub state: String,
    pub municipality_code: String,
    pub legal_name: String,
    /// 元の関係コード（そのまま出力される）
    pub relationship_code: String,
    pub relationship: Relationship,
    /// 正規化済み（`DD/MM/YYYY`または空文字列）
    pub contract_date: String,
    /// 正規化済み（`DD/MM/YYYY`または空文字列）
    pub service_start_date: String,
    pub service_availability: String,
    pub urgency_emergency: String,
    pub linkage: Linkage,
}

/// 解析できなかった日付セルの記録
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DateWarning {
    /// データ行番号（0始まり、ヘッダー行を含まない）
    pub row: usize,
    /// 列名
    pub column: &'static str,
    /// 元のセル値
    pub value: String,
}

/// 出力ドキュメント全体
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionBatch {
    pub header: HeaderContext,
    /// 入力行順
    pub inclusions: Vec<ProviderInclusion>,
    pub warnings: Vec<DateWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_dataset_pads_short_rows() {
        let dataset = Dataset::new(strings(&["a", "b", "c"]), vec![strings(&["1"])]);
        assert_eq!(dataset.rows().next(), Some(&strings(&["1", "", ""])[..]));
    }

    #[test]
    fn test_dataset_truncates_long_rows() {
        let dataset = Dataset::new(strings(&["a"]), vec![strings(&["1", "2"])]);
        assert_eq!(dataset.rows().next(), Some(&strings(&["1"])[..]));
    }

    #[test]
    fn test_column_index_is_case_sensitive() {
        let dataset = Dataset::new(strings(&["uf", "UF"]), vec![]);
        assert_eq!(dataset.column_index("uf"), Some(0));
        assert_eq!(dataset.column_index("UF"), Some(1));
        assert_eq!(dataset.column_index("Uf"), None);
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_rows_in_order() {
        let dataset = Dataset::new(
            strings(&["cnes"]),
            vec![strings(&["1"]), strings(&["2"]), strings(&["3"])],
        );
        let values: Vec<&str> = dataset.rows().map(|row| row[0].as_str()).collect();
        assert_eq!(values, ["1", "2", "3"]);
    }
}
