//! prestadorxml CLI
//!
//! スプレッドシートから医療提供者追加申請ファイル（`.xml`と`.rpi`）を生成します。

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use prestadorxml::{GeneratorBuilder, SheetSelector, SubmissionError, DEFAULT_OUTPUT_DIR};

/// 医療提供者スプレッドシートから`.xml`と`.rpi`を生成する
#[derive(Parser, Debug)]
#[command(name = "prestadorxml", version, about, long_about = None)]
struct Cli {
    /// 入力スプレッドシート（xlsx, xlsm, xlsb, xls, ods）
    input: PathBuf,

    /// 出力ディレクトリ（存在しない場合は作成）
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// シートのインデックス（0始まり、省略時は先頭シート）
    #[arg(long, conflicts_with = "sheet_name")]
    sheet_index: Option<usize>,

    /// シート名
    #[arg(long)]
    sheet_name: Option<String>,

    /// テキストメッセージの代わりにJSONレポートを出力
    #[arg(long)]
    json: bool,

    /// ログ形式（text / json）
    #[arg(long, default_value = "text")]
    log_format: LogFormat,

    /// 詳細度（-v: info, -vv: debug）
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// ログ出力形式
#[derive(Clone, Debug, clap::ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = match cli.verbose {
        0 => "prestadorxml=warn",
        1 => "prestadorxml=info",
        _ => "prestadorxml=debug",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

fn run(cli: &Cli) -> Result<String, SubmissionError> {
    let selector = match (&cli.sheet_name, cli.sheet_index) {
        (Some(name), _) => SheetSelector::Name(name.clone()),
        (None, Some(index)) => SheetSelector::Index(index),
        (None, None) => SheetSelector::default(),
    };

    let generator = GeneratorBuilder::new()
        .with_output_dir(&cli.output_dir)
        .with_sheet_selector(selector)
        .build()?;

    let batch = generator.generate(&cli.input)?;

    if cli.json {
        serde_json::to_string_pretty(&batch)
            .map_err(|e| SubmissionError::Io(std::io::Error::other(e)))
    } else {
        Ok(batch.message())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(report) => {
            println!("{}", report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            if e.is_unexpected() {
                eprintln!("\nCheck that the spreadsheet is formatted correctly.");
            }
            ExitCode::FAILURE
        }
    }
}
