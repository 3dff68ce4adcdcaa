//! prestadorxml - Spreadsheet to XML batch generator for healthcare provider inclusion requests
//!
//! スプレッドシート（先頭ワークシート）の各行を医療提供者追加申請（`inclusaoPrestador`）に
//! 変換し、同一内容のXMLを`.xml`と`.rpi`の2ファイルとして書き出します。
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use prestadorxml::GeneratorBuilder;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // デフォルト設定（出力先: ./saida）
//!     let generator = GeneratorBuilder::new().build()?;
//!
//!     let batch = generator.generate("prestadores.xlsx")?;
//!     println!("{}", batch.message());
//!
//!     Ok(())
//! }
//! ```
//!
//! # In-memory Rendering
//!
//! ```rust,no_run
//! use std::io::Cursor;
//! use prestadorxml::GeneratorBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let generator = GeneratorBuilder::new().build()?;
//! let excel_data: Vec<u8> = vec![]; // スプレッドシートのバイト列
//! let document = generator.render(Cursor::new(excel_data))?;
//! println!("{}", String::from_utf8(document.bytes)?);
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! ```rust,no_run
//! use prestadorxml::{GeneratorBuilder, SubmissionError};
//!
//! # fn main() -> Result<(), SubmissionError> {
//! let generator = GeneratorBuilder::new().with_output_dir("lotes").build()?;
//! match generator.generate("prestadores.xlsx") {
//!     Ok(batch) => println!("{}", batch.message()),
//!     Err(SubmissionError::EmptySpreadsheet) => eprintln!("planilha vazia"),
//!     Err(SubmissionError::MissingColumn(column)) => eprintln!("coluna ausente: {}", column),
//!     Err(e) => eprintln!("{}", e),
//! }
//! # Ok(())
//! # }
//! ```

mod api;
mod builder;
mod error;
mod formatter;
mod mapping;
mod output;
mod parser;
mod security;
mod types;

// 公開API
pub use api::SheetSelector;
pub use builder::{
    GeneratedBatch, Generator, GeneratorBuilder, RenderedDocument, DEFAULT_OUTPUT_DIR,
    DEFAULT_SCHEMA_LOCATION,
};
pub use error::SubmissionError;
pub use formatter::normalize_date;
pub use mapping::REQUIRED_COLUMNS;
pub use output::{FILE_PREFIX, TIMESTAMP_FORMAT, XSI_NAMESPACE};
pub use types::{
    Dataset, DateWarning, HeaderContext, Linkage, ProviderInclusion, Relationship,
    SubmissionBatch,
};
