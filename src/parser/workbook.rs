//! Workbook Loader
//!
//! calamineを使用してワークシートを読み込み、テキストのみのデータセットに変換します。

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use std::io::{Cursor, Read, Seek};
use tracing::debug;

use crate::api::SheetSelector;
use crate::error::SubmissionError;
use crate::formatter::CellFormatter;
use crate::security::SecurityConfig;
use crate::types::Dataset;

/// ワークブックローダー
///
/// calamineのラッパーとして、シート選択とテキスト化を担当します。
pub(crate) struct WorkbookLoader {
    /// calamineのワークブック（xlsx/xlsm/xlsb/xls/odsを自動判別）
    workbook: Sheets<Cursor<Vec<u8>>>,
    formatter: CellFormatter,
}

impl WorkbookLoader {
    /// ワークブックを開く
    ///
    /// # 引数
    ///
    /// * `reader` - スプレッドシートを読み込むためのリーダー（Read + Seekトレイトを実装）
    /// * `security` - 入力サイズ制限
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookLoader)` - ワークブックの読み込みに成功した場合
    /// * `Err(SubmissionError)` - サイズ超過、または解析に失敗した場合
    pub fn open<R: Read + Seek>(
        mut reader: R,
        security: &SecurityConfig,
    ) -> Result<Self, SubmissionError> {
        let mut buffer = Vec::new();
        let bytes_read = reader.read_to_end(&mut buffer)?;
        security.check_input_size(bytes_read as u64)?;

        let workbook = open_workbook_auto_from_rs(Cursor::new(buffer))?;

        Ok(Self {
            workbook,
            formatter: CellFormatter::new(),
        })
    }

    /// すべてのシート名を取得
    pub fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    /// シート選択方式に基づいてシート名を解決
    ///
    /// # 戻り値
    ///
    /// * `Ok(String)` - 選択されたシート名
    /// * `Err(SubmissionError::Config)` - シートが見つからない、またはインデックスが範囲外の場合
    pub fn select_sheet(&self, selector: &SheetSelector) -> Result<String, SubmissionError> {
        let names = self.sheet_names();

        match selector {
            SheetSelector::Index(index) => names.get(*index).cloned().ok_or_else(|| {
                SubmissionError::Config(format!(
                    "Sheet index {} is out of range (total: {})",
                    index,
                    names.len()
                ))
            }),
            SheetSelector::Name(name) => {
                if names.contains(name) {
                    Ok(name.clone())
                } else {
                    Err(SubmissionError::Config(format!("Sheet '{}' not found", name)))
                }
            }
        }
    }

    /// シートを読み込み、データセットに変換
    ///
    /// 先頭行をヘッダー行として扱い、以降の行をデータ行とします。
    /// ヘッダー行より後の空行もデータ行として保持されます。
    pub fn load(&mut self, selector: &SheetSelector) -> Result<Dataset, SubmissionError> {
        let sheet_name = self.select_sheet(selector)?;
        let range = self.workbook.worksheet_range(&sheet_name)?;

        let dataset = self.to_dataset(&range);
        debug!(
            sheet = %sheet_name,
            columns = dataset.headers().len(),
            rows = dataset.len(),
            "worksheet loaded"
        );
        Ok(dataset)
    }

    fn to_dataset(&self, range: &Range<Data>) -> Dataset {
        let mut rows = range
            .rows()
            .map(|row| row.iter().map(|cell| self.formatter.format_cell(cell)).collect::<Vec<_>>());

        let headers: Vec<String> = match rows.next() {
            Some(header) => header.into_iter().map(|h| h.trim().to_string()).collect(),
            None => return Dataset::default(),
        };

        Dataset::new(headers, rows.collect())
    }
}

// 実ファイルを使ったテストは統合テスト（tests/）で実装します。
