//! # Upload Configuration DTO
//!
//! アップロード設定のData Transfer Object

use std::path::PathBuf;
use std::time::Duration;

/// 既定のワーカー数
pub const DEFAULT_WORKERS: usize = 4;
/// 既定の再試行回数
pub const DEFAULT_RETRIES: u32 = 3;
/// 既定の起動ずらし間隔（ミリ秒）
pub const DEFAULT_STAGGER_MS: u64 = 250;
/// 最初の再試行までの待ち時間（ミリ秒）
pub const INITIAL_RETRY_DELAY_MS: u64 = 1000;
/// 再試行の待ち時間の上限（ミリ秒）
pub const MAX_RETRY_DELAY_MS: u64 = 32000;

/// 撮影日時タグが読めない場合の扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatePolicy {
    /// ファイルの最終更新日時で代用する
    #[default]
    FallbackToModified,
    /// 致命的エラーとして実行を中止する
    Strict,
}

/// 再試行ポリシー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 最初の試行に加えて行う再試行の回数
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl RetryPolicy {
    /// 既定の待ち時間で再試行ポリシーを作成
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_delay_ms: INITIAL_RETRY_DELAY_MS,
            max_delay_ms: MAX_RETRY_DELAY_MS,
        }
    }

    /// 待ち時間なしで再試行する（テスト用）
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_delay_ms: 0,
            max_delay_ms: 0,
        }
    }

    /// 試行の総数（再試行 + 1）
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// `retry` 回目（1始まり）の再試行前の待ち時間（指数バックオフ）
    ///
    /// ```
    /// use std::time::Duration;
    /// use flickr_knob::application::dto::upload_config::RetryPolicy;
    ///
    /// let policy = RetryPolicy::new(5);
    /// assert_eq!(policy.delay_for(1), Duration::from_millis(1000));
    /// assert_eq!(policy.delay_for(3), Duration::from_millis(4000));
    /// assert_eq!(policy.delay_for(10), Duration::from_millis(32000));
    /// ```
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u64
            .checked_shl(retry.saturating_sub(1))
            .unwrap_or(u64::MAX);
        let delay = self.initial_delay_ms.saturating_mul(factor);
        Duration::from_millis(delay.min(self.max_delay_ms))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RETRIES)
    }
}

/// アップロード設定
///
/// CLI引数からDriver層が組み立て、各ユースケースへ明示的に渡す
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// 作成するアルバムのタイトル
    pub album_title: String,
    /// アップロード元ディレクトリ
    pub source_dir: PathBuf,
    /// リモート側の重複検出を有効にするか
    pub dedup: bool,
    /// 1ファイルあたりの再試行ポリシー
    pub retry: RetryPolicy,
    /// ワーカー数（アップロードと追加の両方で使う）
    pub workers: usize,
    /// 最初のワーカー群の起動をずらす間隔
    pub stagger: Duration,
    /// 撮影日時タグが読めない場合の扱い
    pub date_policy: DatePolicy,
    /// 監査ログのパス
    pub audit_log: PathBuf,
}

impl UploadConfig {
    /// 既定値で新しいアップロード設定を作成します。
    ///
    /// ```
    /// use flickr_knob::application::dto::upload_config::{DatePolicy, UploadConfig};
    ///
    /// let config = UploadConfig::new("Summer 2021", "/photos/summer");
    ///
    /// assert_eq!(config.workers, 4);
    /// assert_eq!(config.retry.max_retries, 3);
    /// assert!(!config.dedup);
    /// assert_eq!(config.date_policy, DatePolicy::FallbackToModified);
    /// assert_eq!(config.audit_log.to_str(), Some("Summer 2021.log"));
    /// ```
    pub fn new(album_title: impl Into<String>, source_dir: impl Into<PathBuf>) -> Self {
        let album_title = album_title.into();
        let audit_log = PathBuf::from(format!("{}.log", album_title.replace(['/', '\\'], "_")));
        Self {
            album_title,
            source_dir: source_dir.into(),
            dedup: false,
            retry: RetryPolicy::default(),
            workers: DEFAULT_WORKERS,
            stagger: Duration::from_millis(DEFAULT_STAGGER_MS),
            date_policy: DatePolicy::default(),
            audit_log,
        }
    }
}
