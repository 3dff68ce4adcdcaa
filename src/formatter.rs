//! Formatter Module
//!
//! セル値のテキスト化と日付の正規化を提供するモジュール。
//! すべてのセルは読み込み時点で文字列に変換され、型推論は行いません。

use calamine::{Data, DataType};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// 出力日付形式（日/月/年）
const OUTPUT_DATE_FORMAT: &str = "%d/%m/%Y";

/// 日時セルのテキスト表現
const CELL_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 時刻付きの入力形式
///
/// スラッシュ区切りは日付先行として解釈します。
const DATETIME_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%y %H:%M:%S",
    "%d/%m/%y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
];

/// 日付のみの入力形式（試行順）
///
/// 日付先行の形式を年先行より先に試行します（`15-03-24`を0015年と誤読しないため）。
/// 4桁の年に`%y`を適用すると末尾が余るため、誤って一致することはありません。
const DATE_INPUT_FORMATS: &[&str] = &[
    "%d/%m/%y",
    "%d/%m/%Y",
    "%d-%m-%y",
    "%d-%m-%Y",
    "%d.%m.%y",
    "%d.%m.%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%d-%b-%y",
    "%d-%b-%Y",
    "%d/%b/%y",
    "%d/%b/%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// 年月のみの入力形式（1日として解釈、日付形式の後に試行）
const MONTH_INPUT_FORMATS: &[&str] = &["%Y-%m", "%Y/%m", "%m/%Y", "%m-%Y", "%b %Y", "%B %Y"];

/// 受け付ける最小の年
///
/// chronoの`%Y`は1〜2桁の年も受け付けるため、`3/15/24`が0024年に
/// 解釈されないよう下限を設けます。
const MIN_YEAR: i32 = 1000;

/// セルフォーマッター
///
/// calamineのセル値を、テキスト型として読み込んだ場合と同じ文字列に変換します。
#[derive(Debug, Default)]
pub(crate) struct CellFormatter;

impl CellFormatter {
    pub fn new() -> Self {
        Self
    }

    /// セル値を文字列に変換
    ///
    /// # 変換規則
    ///
    /// - 整数、および小数部のない浮動小数点数: `123`
    /// - それ以外の浮動小数点数: 最短表現（`1.5`）
    /// - 論理値: `True` / `False`
    /// - 日時: `YYYY-MM-DD HH:MM:SS`
    /// - ISO日時・期間文字列: そのまま
    /// - エラー値・空セル: 空文字列
    pub fn format_cell(&self, cell: &Data) -> String {
        match cell {
            Data::Int(i) => i.to_string(),
            Data::Float(f) => self.format_float(*f),
            Data::String(s) => s.clone(),
            Data::Bool(b) => if *b { "True" } else { "False" }.to_string(),
            Data::DateTime(_) => cell
                .as_datetime()
                .map(|dt| dt.format(CELL_DATETIME_FORMAT).to_string())
                .unwrap_or_default(),
            Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
            Data::Error(_) | Data::Empty => String::new(),
        }
    }

    fn format_float(&self, f: f64) -> String {
        // i64に収まる範囲のみ整数表記
        if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
            (f as i64).to_string()
        } else {
            f.to_string()
        }
    }
}

/// 日付文字列を`DD/MM/YYYY`形式に正規化する
///
/// 空文字列（空白のみを含む）の場合は空文字列を返します。
/// 日付として解析できない場合も空文字列を返し、エラーは伝播しません。
///
/// # 使用例
///
/// ```rust
/// use prestadorxml::normalize_date;
///
/// assert_eq!(normalize_date("2024-03-15"), "15/03/2024");
/// assert_eq!(normalize_date("15/03/2024"), "15/03/2024");
/// assert_eq!(normalize_date("não é data"), "");
/// assert_eq!(normalize_date(""), "");
/// ```
pub fn normalize_date(raw: &str) -> String {
    parse_date(raw).map(format_date).unwrap_or_default()
}

/// 日付を出力形式（`DD/MM/YYYY`）の文字列に変換
pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(OUTPUT_DATE_FORMAT).to_string()
}

/// 日付文字列を解析する（寛容な形式推定）
///
/// # 戻り値
///
/// * `Some(NaiveDate)` - いずれかの形式で解析できた場合
/// * `None` - 空文字列、または解析できなかった場合
pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    parse_compact(s)
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .into_iter()
        .chain(
            DATETIME_INPUT_FORMATS
                .iter()
                .filter_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date()),
        )
        .chain(
            DATE_INPUT_FORMATS
                .iter()
                .filter_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok()),
        )
        .chain(MONTH_INPUT_FORMATS.iter().filter_map(|fmt| parse_month(s, fmt)))
        .find(|date| date.year() >= MIN_YEAR)
}

/// 年月のみの文字列を月の1日として解析
fn parse_month(s: &str, fmt: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("1 {}", s), &format!("%d {}", fmt)).ok()
}

/// 区切りなしの`YYYYMMDD`形式
fn parse_compact(s: &str) -> Option<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = s[0..4].parse().ok()?;
    let month = s[4..6].parse().ok()?;
    let day = s[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
