//! Security Module
//!
//! 入力ファイルに対するセキュリティ制限を実装するモジュール。

use crate::error::SubmissionError;

/// 入力ファイルの最大サイズ（256MB）
const DEFAULT_MAX_INPUT_FILE_SIZE: u64 = 268_435_456;

/// セキュリティ設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SecurityConfig {
    /// 入力ファイルの最大サイズ（バイト）
    pub max_input_file_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_input_file_size: DEFAULT_MAX_INPUT_FILE_SIZE,
        }
    }
}

impl SecurityConfig {
    /// 読み込んだバイト数が上限以内かを検証
    ///
    /// # 戻り値
    ///
    /// * `Ok(())` - 上限以内の場合
    /// * `Err(SubmissionError::SecurityViolation)` - 上限を超えた場合
    pub fn check_input_size(&self, bytes: u64) -> Result<(), SubmissionError> {
        if bytes > self.max_input_file_size {
            return Err(SubmissionError::SecurityViolation(format!(
                "Input file size exceeds maximum: {} bytes (max: {} bytes)",
                bytes, self.max_input_file_size
            )));
        }
        Ok(())
    }
}
