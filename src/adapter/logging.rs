//! Logging Setup
//!
//! env_logger の初期化と `--loglevel` の解釈

use anyhow::{Context, Result};
use log::LevelFilter;

/// ログレベルを名前（大文字小文字を問わない）または数値 0-5 で解釈する
///
/// ```
/// use flickr_knob::adapter::logging::parse_level_filter;
/// use log::LevelFilter;
///
/// assert_eq!(parse_level_filter("DEBUG"), Ok(LevelFilter::Debug));
/// assert_eq!(parse_level_filter("1"), Ok(LevelFilter::Error));
/// assert!(parse_level_filter("loud").is_err());
/// ```
pub fn parse_level_filter(value: &str) -> Result<LevelFilter, String> {
    let value = value.trim();
    let by_number = match value {
        "0" => Some(LevelFilter::Off),
        "1" => Some(LevelFilter::Error),
        "2" => Some(LevelFilter::Warn),
        "3" => Some(LevelFilter::Info),
        "4" => Some(LevelFilter::Debug),
        "5" => Some(LevelFilter::Trace),
        _ => None,
    };

    by_number
        .or_else(|| value.parse::<LevelFilter>().ok())
        .ok_or_else(|| {
            format!(
                "invalid log level '{}' (expected off, error, warn, info, debug, trace or 0-5)",
                value
            )
        })
}

/// ロガーを初期化する
///
/// `RUST_LOG` が設定されていればそちらが優先される
pub fn init_logging(level: LevelFilter) -> Result<()> {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init()
        .context("Failed to initialize logger")
}
