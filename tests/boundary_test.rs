//! Boundary Tests for prestadorxml
//!
//! 型付きセル、空行、空シート、大量行などの境界条件を検証します。

use rust_xlsxwriter::*;
use std::io::Cursor;
use prestadorxml::{GeneratorBuilder, SubmissionError, REQUIRED_COLUMNS};

// Helper module for generating boundary test fixtures
mod fixtures {
    use super::*;

    /// 列名から列番号を取得
    pub fn col(name: &str) -> u16 {
        REQUIRED_COLUMNS
            .iter()
            .position(|c| *c == name)
            .expect("unknown column") as u16
    }

    /// ヘッダー行のみを書き込んだワークブック
    pub fn workbook_with_header() -> Result<Workbook, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        for (index, name) in REQUIRED_COLUMNS.iter().enumerate() {
            worksheet.write_string(0, index as u16, *name)?;
        }
        Ok(workbook)
    }

    /// 完全に空のシート
    pub fn generate_empty_sheet() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("EmptySheet")?;
        workbook.save_to_buffer()
    }

    /// 数値・論理値・日付の型付きセルを含む1行
    pub fn generate_typed_cells() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = workbook_with_header()?;
        let worksheet = workbook.worksheet_from_index(0)?;

        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let date = ExcelDateTime::from_ymd(2024, 3, 15)?;

        worksheet.write_number(1, col("registroANS"), 123456.0)?;
        worksheet.write_number(1, col("cnes"), 2077485.0)?;
        worksheet.write_number(1, col("codigoMunicipioIBGE"), 355030.0)?;
        worksheet.write_number(1, col("classificacao"), 1.5)?;
        worksheet.write_boolean(1, col("urgenciaEmergencia"), true)?;
        worksheet.write_datetime_with_format(1, col("dataContratualizacao"), &date, &date_format)?;
        worksheet.write_string(1, col("dataInicioPrestacaoServico"), "2023-12-01")?;

        workbook.save_to_buffer()
    }

    /// データ行の間に空行を含むシート
    pub fn generate_blank_middle_row() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = workbook_with_header()?;
        let worksheet = workbook.worksheet_from_index(0)?;

        worksheet.write_string(1, col("cnes"), "A")?;
        // row 2 is left blank
        worksheet.write_string(3, col("cnes"), "C")?;

        workbook.save_to_buffer()
    }

    /// ヘッダー名の前後に空白があるシート
    pub fn generate_padded_headers() -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        for (index, name) in REQUIRED_COLUMNS.iter().enumerate() {
            worksheet.write_string(0, index as u16, format!(" {} ", name))?;
        }
        worksheet.write_string(1, col("uf"), "PR")?;
        workbook.save_to_buffer()
    }

    /// 大量行のシート
    pub fn generate_many_rows(rows: u32) -> Result<Vec<u8>, XlsxError> {
        let mut workbook = workbook_with_header()?;
        let worksheet = workbook.worksheet_from_index(0)?;

        for row in 1..=rows {
            worksheet.write_string(row, col("cnes"), format!("{:07}", row))?;
            let code = if row % 2 == 0 { "C" } else { "P" };
            worksheet.write_string(row, col("relacaoOperadora"), code)?;
        }

        workbook.save_to_buffer()
    }
}

fn render(data: Vec<u8>) -> Result<String, SubmissionError> {
    let generator = GeneratorBuilder::new().build()?;
    let document = generator.render(Cursor::new(data))?;
    Ok(String::from_utf8(document.bytes).unwrap())
}

#[test]
fn test_empty_sheet() {
    let data = fixtures::generate_empty_sheet().unwrap();
    assert!(matches!(render(data), Err(SubmissionError::EmptySpreadsheet)));
}

#[test]
fn test_typed_cells_are_rendered_as_text() {
    let data = fixtures::generate_typed_cells().unwrap();
    let xml = render(data).unwrap();

    assert!(xml.contains("<registroANS>123456</registroANS>"));
    assert!(xml.contains("<cnes>2077485</cnes>"));
    assert!(xml.contains("<codigoMunicipioIBGE>355030</codigoMunicipioIBGE>"));
    assert!(xml.contains("<classificacao>1.5</classificacao>"));
    assert!(xml.contains("<urgenciaEmergencia>True</urgenciaEmergencia>"));
}

#[test]
fn test_date_cells_are_normalized() {
    let data = fixtures::generate_typed_cells().unwrap();
    let xml = render(data).unwrap();

    assert!(xml.contains("<dataContratualizacao>15/03/2024</dataContratualizacao>"));
    assert!(xml.contains("<dataInicioPrestacaoServico>01/12/2023</dataInicioPrestacaoServico>"));
}

#[test]
fn test_blank_middle_row_is_kept() {
    let data = fixtures::generate_blank_middle_row().unwrap();
    let xml = render(data).unwrap();

    assert_eq!(xml.matches("<inclusaoPrestador>").count(), 3);
    assert!(xml.contains("<cnes>A</cnes>"));
    assert!(xml.contains("<cnes></cnes>"));
    assert!(xml.contains("<cnes>C</cnes>"));
}

#[test]
fn test_padded_header_names_match() {
    let data = fixtures::generate_padded_headers().unwrap();
    let xml = render(data).unwrap();
    assert!(xml.contains("<uf>PR</uf>"));
}

#[test]
fn test_many_rows() {
    const ROWS: u32 = 2_000;
    let data = fixtures::generate_many_rows(ROWS).unwrap();

    let generator = GeneratorBuilder::new().build().unwrap();
    let document = generator.render(Cursor::new(data)).unwrap();
    let xml = String::from_utf8(document.bytes).unwrap();

    assert_eq!(document.rows, ROWS as usize);
    assert_eq!(xml.matches("<inclusaoPrestador>").count(), ROWS as usize);
    assert_eq!(
        xml.matches("<tipoContratualizacao>").count(),
        (ROWS / 2) as usize
    );

    let first = xml.find("<cnes>0000001</cnes>").unwrap();
    let last = xml.find("<cnes>0002000</cnes>").unwrap();
    assert!(first < last);
}

#[test]
fn test_non_spreadsheet_input() {
    let result = render(b"registroANS;cnpjOperadora\n1;2\n".to_vec());
    match result {
        Err(e) => assert!(e.is_unexpected()),
        Ok(_) => panic!("Expected error for non-spreadsheet input"),
    }
}
