//! CLI Argument Parsing
//!
//! CLIの引数解析

use clap::{Args as ClapArgs, Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;

use crate::adapter::logging::parse_level_filter;
use crate::application::dto::upload_config::{
    DatePolicy, RetryPolicy, UploadConfig, DEFAULT_RETRIES, DEFAULT_STAGGER_MS, DEFAULT_WORKERS,
};

/// `--logfile` のプレースホルダー
pub const ALBUM_NAME_PLACEHOLDER: &str = "{album_name}";

/// Flickrアルバムのアップロード・一覧・削除を行うCLI
#[derive(Parser, Debug, Clone)]
#[command(name = "flickr-knob", version)]
#[command(about = "Upload a directory of photos to a new Flickr album", long_about = None)]
pub struct Args {
    /// Log level: off, error, warn, info, debug, trace or 0-5 (RUST_LOG wins when set)
    #[arg(short, long, global = true, default_value = "info", value_parser = parse_level_filter)]
    pub loglevel: LevelFilter,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Upload photos from a directory into a new album
    Upload(UploadArgs),

    /// List photos in an album
    List {
        /// Album title
        album: String,
    },

    /// Delete an album together with all its photos
    Delete {
        /// Album title
        album: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,

        /// Number of parallel deletions
        #[arg(long, default_value_t = DEFAULT_WORKERS)]
        threads: usize,
    },
}

#[derive(ClapArgs, Debug, Clone)]
pub struct UploadArgs {
    /// Title of the album to create
    pub album: String,

    /// Directory with photos (not searched recursively)
    pub source_dir: String,

    /// Let Flickr detect duplicates and reuse existing photos
    #[arg(short = 'D', long)]
    pub dedup: bool,

    /// Audit log path; {album_name} is replaced by the album title
    #[arg(long, default_value = "{album_name}.log")]
    pub logfile: String,

    /// Retries per file on transient errors
    #[arg(long, default_value_t = DEFAULT_RETRIES)]
    pub retries: u32,

    /// Number of parallel uploads
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub threads: usize,

    /// Delay between worker start-ups in milliseconds
    #[arg(long, default_value_t = DEFAULT_STAGGER_MS)]
    pub stagger_ms: u64,

    /// Abort when a file has no usable capture date instead of using its modification time
    #[arg(long)]
    pub strict_dates: bool,
}

impl UploadArgs {
    /// CLI引数からアップロード設定を組み立てる
    pub fn to_config(&self) -> UploadConfig {
        let source_dir = shellexpand::tilde(&self.source_dir).into_owned();
        let mut config = UploadConfig::new(self.album.clone(), source_dir);
        config.dedup = self.dedup;
        config.retry = RetryPolicy::new(self.retries);
        config.workers = self.threads;
        config.stagger = Duration::from_millis(self.stagger_ms);
        config.date_policy = if self.strict_dates {
            DatePolicy::Strict
        } else {
            DatePolicy::FallbackToModified
        };
        config.audit_log = audit_log_path(&self.logfile, &self.album);
        config
    }
}

/// `{album_name}` をパス区切りを置き換えたアルバム名で展開する
pub fn audit_log_path(pattern: &str, album: &str) -> PathBuf {
    let safe_name = album.replace(['/', '\\'], "_");
    let expanded = shellexpand::tilde(pattern);
    PathBuf::from(expanded.replace(ALBUM_NAME_PLACEHOLDER, &safe_name))
}
