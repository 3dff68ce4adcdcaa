//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// prestadorxmlクレート全体で使用するエラー型
///
/// スプレッドシートの読み込み、行のマッピング、XMLの生成、ファイル書き込み中に
/// 発生するすべてのエラーを統一的に扱うために使用されます。
///
/// # エラーの種類
///
/// - `EmptySpreadsheet`: データ行が1行も存在しない
/// - `MissingColumn`: 必須列がヘッダー行に存在しない
/// - それ以外: 予期しないエラー（I/O、解析、XML、設定、セキュリティ）
///
/// # 使用例
///
/// ```rust,no_run
/// use prestadorxml::{GeneratorBuilder, SubmissionError};
///
/// # fn main() -> Result<(), SubmissionError> {
/// let generator = GeneratorBuilder::new().build()?;
/// match generator.generate("prestadores.xlsx") {
///     Ok(batch) => println!("{}", batch.message()),
///     Err(SubmissionError::MissingColumn(column)) => {
///         eprintln!("列がありません: {}", column);
///     }
///     Err(e) => eprintln!("{}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Error, Debug)]
pub enum SubmissionError {
    /// データ行が存在しない
    ///
    /// ヘッダー行しかないシート、完全に空のシートの両方で発生します。
    #[error("The spreadsheet is empty or could not be read")]
    EmptySpreadsheet,

    /// 必須列が見つからない
    ///
    /// 列名は大文字・小文字を区別して照合されます。
    /// マッピング順で最初に欠落している列名が格納されます。
    #[error("Column '{0}' was not found in the spreadsheet. Check that the column name matches exactly")]
    MissingColumn(String),

    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("Unexpected error: IO error: {0}")]
    Io(#[from] std::io::Error),

    /// スプレッドシートの解析中に発生したエラー（calamine由来）
    #[error("Unexpected error: failed to parse spreadsheet: {0}")]
    Parse(#[from] calamine::Error),

    /// XMLの書き出し中に発生したエラー（quick-xml由来）
    #[error("Unexpected error: failed to write XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// XML 1.0で使用できない文字を含むセル
    ///
    /// 制御文字（タブ・改行・復帰を除く）や`U+FFFE`/`U+FFFF`が対象です。
    /// 書き出し前のマッピング段階で検出されるため、ファイルは作成されません。
    #[error("Unexpected error: row {row}, column '{column}' contains a character not allowed in XML (U+{code:04X})")]
    InvalidCharacter {
        /// データ行のインデックス（0始まり）
        row: usize,
        /// 列名
        column: &'static str,
        /// 該当文字のコードポイント
        code: u32,
    },

    /// 設定の検証に失敗したエラー
    ///
    /// `GeneratorBuilder::build()`時、またはシート選択の解決時に発生します。
    ///
    /// ```rust,no_run
    /// use prestadorxml::{GeneratorBuilder, SubmissionError};
    ///
    /// let result = GeneratorBuilder::new()
    ///     .with_extensions("xml", "xml")
    ///     .build();
    ///
    /// match result {
    ///     Err(SubmissionError::Config(msg)) => println!("設定エラー: {}", msg),
    ///     _ => {}
    /// }
    /// ```
    #[error("Unexpected error: configuration error: {0}")]
    Config(String),

    /// セキュリティ制限に違反したエラー
    ///
    /// 入力ファイルサイズの上限を超えた場合に発生します。
    #[error("Unexpected error: security violation: {0}")]
    SecurityViolation(String),
}

impl SubmissionError {
    /// 予期しないエラー（空シート・列欠落以外）かどうかを判定
    pub fn is_unexpected(&self) -> bool {
        !matches!(
            self,
            SubmissionError::EmptySpreadsheet | SubmissionError::MissingColumn(_)
        )
    }
}
