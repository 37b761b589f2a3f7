//! # Domain Errors
//!
//! ドメイン全体で使う型付きエラー

use std::path::PathBuf;
use thiserror::Error;

/// 撮影日時メタデータの取得エラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("cannot read metadata of '{path}': {message}")]
    Unreadable { path: PathBuf, message: String },

    #[error("'{path}' lacks the DateTimeOriginal tag")]
    MissingTag { path: PathBuf },

    #[error("DateTimeOriginal tag '{value}' is malformed in '{path}'")]
    Malformed { path: PathBuf, value: String },
}

/// リモートサービス呼び出しのエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// 再試行で回復しうるエラー（タイムアウト、5xx、レート制限など）
    #[error("transient remote error: {0}")]
    Transient(String),

    /// 再試行しても回復しないエラー（認証失敗、不正な引数など）
    #[error("remote error: {0}")]
    Fatal(String),
}

impl RemoteError {
    pub fn is_transient(&self) -> bool {
        matches!(self, RemoteError::Transient(_))
    }
}

/// 実行開始時（またはアルバム作成時）の致命的エラー
///
/// これらはトップレベルまで伝播し、終了コード1でプロセスを終える
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("missing credential: {0} is not set")]
    MissingCredential(&'static str),

    #[error("'{0}' is not a directory")]
    NotADirectory(PathBuf),

    #[error("duplicate album name: '{0}'")]
    DuplicateAlbum(String),

    #[error("no eligible files in '{0}'")]
    NoEligibleFiles(PathBuf),

    #[error("failed to create album '{title}': {reason}")]
    AlbumCreation { title: String, reason: String },

    #[error("did not find album with name '{0}'")]
    AlbumNotFound(String),

    #[error("cannot sort media files: {0}")]
    UnsortableMedia(#[from] MetadataError),
}
