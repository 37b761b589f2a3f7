//! # Album Planner Service
//!
//! アップロード結果からアルバムのカバーと並びを決める

use std::collections::HashMap;

use crate::domain::entities::album::AlbumPlan;
use crate::domain::entities::identifiers::PhotoId;
use crate::domain::entities::source_file::SourceFile;

/// アルバム計画サービス
pub struct AlbumPlanner;

impl AlbumPlanner {
    /// 全アップロードの集計後に、元のファイル順を明示的に走査して計画を作る
    ///
    /// 完了順には依存しない。カバーは撮影日時が最も早い成功済みファイルになる。
    ///
    /// # Arguments
    ///
    /// * `files` - 撮影日時順に並んだソースファイル
    /// * `photo_ids` - 成功したファイルのファイル名 → 写真ID
    ///
    /// # Returns
    ///
    /// 成功が1件もなければ `None`
    pub fn plan(files: &[SourceFile], photo_ids: &HashMap<String, PhotoId>) -> Option<AlbumPlan> {
        AlbumPlan::from_ordered(
            files
                .iter()
                .filter_map(|file| photo_ids.get(file.basename()).cloned()),
        )
    }
}
