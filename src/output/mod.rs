//! Output Module
//!
//! XMLの生成と、同一内容の2ファイル（`.xml`と`.rpi`）への書き出しを提供するモジュール。

mod xml;

use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::SubmissionError;

pub(crate) use xml::{find_invalid_char, render_batch};
pub use xml::XSI_NAMESPACE;

/// 出力ファイル名の接頭辞
pub const FILE_PREFIX: &str = "prestadores_lote_";

/// ファイル名に埋め込むタイムスタンプ形式（秒単位、ソート可能）
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// 拡張子を除いた出力ファイル名を生成
///
/// 例: `prestadores_lote_20240315_093000`
pub(crate) fn base_file_name(timestamp: NaiveDateTime) -> String {
    format!("{}{}", FILE_PREFIX, timestamp.format(TIMESTAMP_FORMAT))
}

/// 出力ファイルのペア
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OutputPair {
    pub primary: PathBuf,
    pub secondary: PathBuf,
}

impl OutputPair {
    /// 出力ディレクトリ、ベース名、2つの拡張子からパスを組み立てる
    pub fn new(dir: &Path, base: &str, extensions: (&str, &str)) -> Self {
        Self {
            primary: dir.join(format!("{}.{}", base, extensions.0)),
            secondary: dir.join(format!("{}.{}", base, extensions.1)),
        }
    }

    /// 同じバイト列を両方のファイルに書き出す
    ///
    /// 出力ディレクトリが存在しない場合は作成します。
    /// 2つ目の書き込みに失敗した場合は1つ目のファイルを削除し、エラーを返します。
    ///
    /// # 戻り値
    ///
    /// * `Ok((PathBuf, PathBuf))` - 書き出したファイルの絶対パス
    /// * `Err(SubmissionError::Io)` - いずれかの書き込みに失敗した場合
    pub fn write(&self, contents: &[u8]) -> Result<(PathBuf, PathBuf), SubmissionError> {
        if let Some(dir) = self.primary.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        fs::write(&self.primary, contents)?;
        debug!(path = %self.primary.display(), bytes = contents.len(), "file written");

        if let Err(e) = fs::write(&self.secondary, contents) {
            if let Err(cleanup) = fs::remove_file(&self.primary) {
                warn!(
                    path = %self.primary.display(),
                    error = %cleanup,
                    "failed to remove file after partial write"
                );
            }
            return Err(e.into());
        }
        debug!(path = %self.secondary.display(), bytes = contents.len(), "file written");

        Ok((absolute(&self.primary)?, absolute(&self.secondary)?))
    }
}

fn absolute(path: &Path) -> Result<PathBuf, SubmissionError> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}
