//! Mapping Module
//!
//! データセットの各行を医療提供者追加申請レコードへ変換するモジュール。

use tracing::{debug, warn};

use crate::error::SubmissionError;
use crate::formatter::{format_date, parse_date};
use crate::output::find_invalid_char;
use crate::types::{
    columns, Dataset, DateWarning, HeaderContext, Linkage, ProviderInclusion, Relationship,
    SubmissionBatch, CONTRACTUAL_CODE,
};

/// 必須列（マッピング順）
///
/// 列の欠落はこの順序で検出され、最初に欠落している列名が報告されます。
pub const REQUIRED_COLUMNS: [&str; 20] = [
    columns::REGISTRO_ANS,
    columns::CNPJ_OPERADORA,
    columns::NOSSO_NUMERO,
    columns::ISENCAO_ONUS,
    columns::CLASSIFICACAO,
    columns::CNPJ_CPF,
    columns::CNES,
    columns::UF,
    columns::CODIGO_MUNICIPIO_IBGE,
    columns::RAZAO_SOCIAL,
    columns::RELACAO_OPERADORA,
    columns::TIPO_CONTRATUALIZACAO,
    columns::REGISTRO_ANS_INTERMEDIARIA,
    columns::DATA_CONTRATUALIZACAO,
    columns::DATA_INICIO_PRESTACAO,
    columns::DISPONIBILIDADE_SERVICO,
    columns::URGENCIA_EMERGENCIA,
    columns::PLANO_VINCULACAO,
    columns::PLANO_VINCULACAO_1,
    columns::CODIGO_PLANO_OPERADORA,
];

/// マッピング対象の列（`REQUIRED_COLUMNS`と同じ並び）
#[derive(Debug, Clone, Copy)]
enum Field {
    RegistroAns,
    CnpjOperadora,
    NossoNumero,
    IsencaoOnus,
    Classificacao,
    CnpjCpf,
    Cnes,
    Uf,
    CodigoMunicipioIbge,
    RazaoSocial,
    RelacaoOperadora,
    TipoContratualizacao,
    RegistroAnsIntermediaria,
    DataContratualizacao,
    DataInicioPrestacao,
    DisponibilidadeServico,
    UrgenciaEmergencia,
    PlanoVinculacao,
    PlanoVinculacao1,
    CodigoPlanoOperadora,
}

impl Field {
    fn name(self) -> &'static str {
        REQUIRED_COLUMNS[self as usize]
    }
}

/// 解決済みの列インデックス（`Field`の値で参照）
struct ColumnMap {
    indices: [usize; REQUIRED_COLUMNS.len()],
}

impl ColumnMap {
    fn resolve(dataset: &Dataset) -> Result<Self, SubmissionError> {
        let mut indices = [0usize; REQUIRED_COLUMNS.len()];
        for (slot, name) in indices.iter_mut().zip(REQUIRED_COLUMNS.iter()) {
            *slot = dataset
                .column_index(name)
                .ok_or_else(|| SubmissionError::MissingColumn((*name).to_string()))?;
        }
        Ok(Self { indices })
    }

    fn get<'a>(&self, row: &'a [String], field: Field) -> &'a str {
        row.get(self.indices[field as usize])
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// 1行分のセルアクセサ
struct RowView<'a> {
    columns: &'a ColumnMap,
    cells: &'a [String],
    index: usize,
}

impl RowView<'_> {
    fn raw(&self, field: Field) -> &str {
        self.columns.get(self.cells, field)
    }

    /// XMLに書き出すセル値を取得
    ///
    /// XML 1.0で使用できない文字を含む場合はエラーを返します。
    fn text(&self, field: Field) -> Result<String, SubmissionError> {
        let value = self.raw(field);
        match find_invalid_char(value) {
            Some(c) => Err(SubmissionError::InvalidCharacter {
                row: self.index,
                column: field.name(),
                code: c as u32,
            }),
            None => Ok(value.to_string()),
        }
    }
}

/// データセット全体を申請バッチに変換
///
/// 書き出し前にすべてのセルを検証するため、エラー時に部分的な出力は発生しません。
///
/// # 戻り値
///
/// * `Ok(SubmissionBatch)` - すべての行の変換に成功した場合
/// * `Err(SubmissionError::EmptySpreadsheet)` - データ行が存在しない場合
/// * `Err(SubmissionError::MissingColumn)` - 必須列が存在しない場合
/// * `Err(SubmissionError::InvalidCharacter)` - XMLで使用できない文字を含むセルがある場合
pub(crate) fn map_dataset(dataset: &Dataset) -> Result<SubmissionBatch, SubmissionError> {
    if dataset.is_empty() {
        return Err(SubmissionError::EmptySpreadsheet);
    }

    let columns = ColumnMap::resolve(dataset)?;

    let first = dataset.rows().next().ok_or(SubmissionError::EmptySpreadsheet)?;
    let header = map_header(&RowView {
        columns: &columns,
        cells: first,
        index: 0,
    })?;

    let mut inclusions = Vec::with_capacity(dataset.len());
    let mut warnings = Vec::new();

    for (index, cells) in dataset.rows().enumerate() {
        let view = RowView {
            columns: &columns,
            cells,
            index,
        };
        inclusions.push(map_row(&view, &mut warnings)?);
    }

    debug!(
        rows = inclusions.len(),
        contractual = inclusions
            .iter()
            .filter(|i| matches!(i.relationship, Relationship::Contractual { .. }))
            .count(),
        date_warnings = warnings.len(),
        "dataset mapped"
    );

    Ok(SubmissionBatch {
        header,
        inclusions,
        warnings,
    })
}

fn map_header(row: &RowView<'_>) -> Result<HeaderContext, SubmissionError> {
    Ok(HeaderContext {
        registration_id: row.text(Field::RegistroAns)?,
        operator_tax_id: row.text(Field::CnpjOperadora)?,
        reference_number: row.text(Field::NossoNumero)?,
        fee_exemption: row.text(Field::IsencaoOnus)?,
    })
}

fn map_row(
    row: &RowView<'_>,
    warnings: &mut Vec<DateWarning>,
) -> Result<ProviderInclusion, SubmissionError> {
    let relationship_code = row.text(Field::RelacaoOperadora)?;
    let relationship = if relationship_code == CONTRACTUAL_CODE {
        Relationship::Contractual {
            contract_type: row.text(Field::TipoContratualizacao)?,
            intermediary_registration: row.text(Field::RegistroAnsIntermediaria)?,
        }
    } else {
        Relationship::Other
    };

    Ok(ProviderInclusion {
        classification: row.text(Field::Classificacao)?,
        tax_id: row.text(Field::CnpjCpf)?,
        facility_id: row.text(Field::Cnes)?,
        state: row.text(Field::Uf)?,
        municipality_code: row.text(Field::CodigoMunicipioIbge)?,
        legal_name: row.text(Field::RazaoSocial)?,
        relationship_code,
        relationship,
        contract_date: normalize_cell(row, Field::DataContratualizacao, warnings),
        service_start_date: normalize_cell(row, Field::DataInicioPrestacao, warnings),
        service_availability: row.text(Field::DisponibilidadeServico)?,
        urgency_emergency: row.text(Field::UrgenciaEmergencia)?,
        linkage: Linkage {
            plan_registration: row.text(Field::PlanoVinculacao)?,
            second_plan_registration: row.text(Field::PlanoVinculacao1)?,
            operator_plan_code: row.text(Field::CodigoPlanoOperadora)?,
        },
    })
}

/// 日付セルを正規化し、解析できなかった値を警告として記録
///
/// 出力は`DD/MM/YYYY`または空文字列のみのため、文字の検証は不要です。
fn normalize_cell(row: &RowView<'_>, field: Field, warnings: &mut Vec<DateWarning>) -> String {
    let raw = row.raw(field);
    if raw.trim().is_empty() {
        return String::new();
    }

    match parse_date(raw) {
        Some(date) => format_date(date),
        None => {
            let column = field.name();
            warn!(row = row.index, column, value = %raw, "unparseable date dropped");
            warnings.push(DateWarning {
                row: row.index,
                column,
                value: raw.to_string(),
            });
            String::new()
        }
    }
}
