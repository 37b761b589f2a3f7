//! # Chronological Order Service
//!
//! 撮影日時による並び替え

use crate::domain::entities::source_file::SourceFile;

/// 撮影日時順サービス
pub struct ChronologicalOrder;

impl ChronologicalOrder {
    /// 撮影日時の昇順に並べる
    ///
    /// 安定ソートなので、同じ日時のファイルは入力（ディレクトリ列挙）の順を保つ
    pub fn sort(mut files: Vec<SourceFile>) -> Vec<SourceFile> {
        files.sort_by_key(|file| file.taken_at());
        files
    }
}
