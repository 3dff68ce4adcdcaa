//! Builder Module
//!
//! Fluent Builder APIを提供し、`Generator`インスタンスを段階的に構築する。

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use tracing::{info, info_span};

use crate::api::SheetSelector;
use crate::error::SubmissionError;
use crate::output::OutputPair;
use crate::parser::WorkbookLoader;
use crate::security::SecurityConfig;
use crate::types::{Dataset, DateWarning, SubmissionBatch};

/// デフォルトの出力ディレクトリ
pub const DEFAULT_OUTPUT_DIR: &str = "saida";

/// デフォルトのスキーマ位置
pub const DEFAULT_SCHEMA_LOCATION: &str = "SolicitacaoInclusaoPrestador.xsd";

/// 生成処理の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct GenerationConfig {
    /// 出力ディレクトリ
    pub output_dir: PathBuf,

    /// シート選択方式
    pub sheet_selector: SheetSelector,

    /// 出力拡張子（1つ目, 2つ目）
    pub extensions: (String, String),

    /// xsi:noNamespaceSchemaLocation属性の値
    pub schema_location: String,

    /// インデント幅
    pub indent: usize,

    /// セキュリティ制限
    pub security: SecurityConfig,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            sheet_selector: SheetSelector::default(),
            extensions: ("xml".to_string(), "rpi".to_string()),
            schema_location: DEFAULT_SCHEMA_LOCATION.to_string(),
            indent: 2,
            security: SecurityConfig::default(),
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// `Generator`インスタンスを段階的に構築するためのビルダーです。
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use prestadorxml::{GeneratorBuilder, SheetSelector};
///
/// # fn main() -> Result<(), prestadorxml::SubmissionError> {
/// let generator = GeneratorBuilder::new()
///     .with_output_dir("saida")
///     .with_sheet_selector(SheetSelector::Name("Prestadores".to_string()))
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct GeneratorBuilder {
    /// 内部設定（構築中）
    config: GenerationConfig,
}

impl GeneratorBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - 出力ディレクトリ: `saida`
    /// - シート選択: 先頭シート
    /// - 拡張子: `xml`, `rpi`
    /// - スキーマ位置: `SolicitacaoInclusaoPrestador.xsd`
    /// - インデント: スペース2つ
    pub fn new() -> Self {
        Self::default()
    }

    /// 出力ディレクトリを指定する（存在しない場合は生成時に作成）
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// 読み込むワークシートを選択する
    ///
    /// ```rust,no_run
    /// use prestadorxml::{GeneratorBuilder, SheetSelector};
    ///
    /// let builder = GeneratorBuilder::new()
    ///     .with_sheet_selector(SheetSelector::Index(1));
    /// ```
    pub fn with_sheet_selector(mut self, selector: SheetSelector) -> Self {
        self.config.sheet_selector = selector;
        self
    }

    /// 2つの出力拡張子を指定する（先頭の`.`は不要）
    pub fn with_extensions(mut self, primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        self.config.extensions = (primary.into(), secondary.into());
        self
    }

    /// ルート要素のスキーマ位置を指定する
    pub fn with_schema_location(mut self, location: impl Into<String>) -> Self {
        self.config.schema_location = location.into();
        self
    }

    /// インデント幅を指定する（0でインデントなし）
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.config.indent = indent;
        self
    }

    /// 入力ファイルの最大サイズ（バイト）を指定する
    pub fn with_max_input_size(mut self, bytes: u64) -> Self {
        self.config.security.max_input_file_size = bytes;
        self
    }

    /// 設定を検証し、`Generator`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `SubmissionError::Config(String)`: 設定の検証に失敗した場合
    ///   * 拡張子が空、`.`やパス区切り文字を含む
    ///   * 2つの拡張子が同一
    ///   * スキーマ位置が空
    pub fn build(self) -> Result<Generator, SubmissionError> {
        // 1. 拡張子の検証
        let (primary, secondary) = &self.config.extensions;
        for ext in [primary, secondary] {
            if ext.is_empty() {
                return Err(SubmissionError::Config(
                    "Output extension must not be empty".to_string(),
                ));
            }
            if ext.contains(['.', '/', '\\']) {
                return Err(SubmissionError::Config(format!(
                    "Invalid output extension: '{}'",
                    ext
                )));
            }
        }
        if primary.eq_ignore_ascii_case(secondary) {
            return Err(SubmissionError::Config(format!(
                "Output extensions must differ: '{}' and '{}'",
                primary, secondary
            )));
        }

        // 2. スキーマ位置の検証
        if self.config.schema_location.trim().is_empty() {
            return Err(SubmissionError::Config(
                "Schema location must not be empty".to_string(),
            ));
        }

        Ok(Generator {
            config: self.config,
        })
    }
}

/// メモリ上で生成されたXMLドキュメント
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    /// UTF-8でエンコードされたXML
    pub bytes: Vec<u8>,

    /// inclusaoPrestador要素の数（データ行数）
    pub rows: usize,

    /// 解析できず空文字列として出力された日付
    pub warnings: Vec<DateWarning>,
}

/// 生成結果
///
/// 書き出した2ファイルの絶対パスと、処理の概要を保持します。
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedBatch {
    /// 1つ目のファイル（デフォルト: `.xml`）
    pub primary_path: PathBuf,

    /// 2つ目のファイル（デフォルト: `.rpi`）
    pub secondary_path: PathBuf,

    /// inclusaoPrestador要素の数
    pub rows: usize,

    /// 解析できず空文字列として出力された日付
    pub warnings: Vec<DateWarning>,
}

impl GeneratedBatch {
    /// 利用者向けの成功メッセージ（両ファイルの絶対パスを含む）
    pub fn message(&self) -> String {
        format!(
            "Files generated successfully:\n\n-> {}\n-> {}",
            self.primary_path.display(),
            self.secondary_path.display()
        )
    }
}

/// 生成処理のファサード
///
/// スプレッドシートから申請XMLを生成するためのメインエントリーポイントです。
///
/// # 使用例
///
/// ```rust,no_run
/// use prestadorxml::GeneratorBuilder;
///
/// # fn main() -> Result<(), prestadorxml::SubmissionError> {
/// let generator = GeneratorBuilder::new().build()?;
/// let batch = generator.generate("prestadores.xlsx")?;
/// println!("{}", batch.message());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Generator {
    /// 生成設定
    config: GenerationConfig,
}

impl Generator {
    /// スプレッドシートを読み込み、2つのXMLファイルを書き出す
    ///
    /// ファイル名には現在のローカル時刻（秒単位）が埋め込まれます。
    ///
    /// # 処理フロー
    ///
    /// 1. スプレッドシートの読み込み（全セルをテキスト化）
    /// 2. 行のマッピング（空シート・列欠落・XMLで使用できない文字はここで失敗し、ファイルは作成されない）
    /// 3. XMLのシリアライズ
    /// 4. 同一内容を2つの拡張子で書き出し
    pub fn generate(&self, input: impl AsRef<Path>) -> Result<GeneratedBatch, SubmissionError> {
        self.generate_at(input, Local::now().naive_local())
    }

    /// タイムスタンプを指定して生成する
    ///
    /// `generate`と同じ処理ですが、ファイル名に埋め込む時刻を呼び出し側が指定します。
    pub fn generate_at(
        &self,
        input: impl AsRef<Path>,
        timestamp: NaiveDateTime,
    ) -> Result<GeneratedBatch, SubmissionError> {
        let input = input.as_ref();
        let _span = info_span!("generate", input = %input.display()).entered();

        let file = File::open(input)?;
        let document = self.render(BufReader::new(file))?;

        let base = crate::output::base_file_name(timestamp);
        let pair = OutputPair::new(
            &self.config.output_dir,
            &base,
            (&self.config.extensions.0, &self.config.extensions.1),
        );
        let (primary_path, secondary_path) = pair.write(&document.bytes)?;

        info!(
            rows = document.rows,
            date_warnings = document.warnings.len(),
            primary = %primary_path.display(),
            secondary = %secondary_path.display(),
            "batch generated"
        );

        Ok(GeneratedBatch {
            primary_path,
            secondary_path,
            rows: document.rows,
            warnings: document.warnings,
        })
    }

    /// スプレッドシートを読み込み、XMLをメモリ上に生成する（ファイルは書き出さない）
    pub fn render<R: Read + Seek>(&self, input: R) -> Result<RenderedDocument, SubmissionError> {
        let mut loader = WorkbookLoader::open(input, &self.config.security)?;
        let dataset = loader.load(&self.config.sheet_selector)?;
        self.render_dataset(&dataset)
    }

    /// 読み込み済みのデータセットからXMLを生成する
    pub fn render_dataset(&self, dataset: &Dataset) -> Result<RenderedDocument, SubmissionError> {
        let batch = crate::mapping::map_dataset(dataset)?;
        self.serialize(batch)
    }

    fn serialize(&self, batch: SubmissionBatch) -> Result<RenderedDocument, SubmissionError> {
        let bytes = crate::output::render_batch(
            &batch,
            &self.config.schema_location,
            self.config.indent,
        )?;

        Ok(RenderedDocument {
            bytes,
            rows: batch.inclusions.len(),
            warnings: batch.warnings,
        })
    }
}
