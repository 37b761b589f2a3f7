//! # Album Entities
//!
//! アルバム（photoset）の組み立てに関わるエンティティ

use std::collections::HashSet;
use std::fmt;

use super::identifiers::{AlbumId, PhotoId};

/// アルバム組み立ての進行状態
///
/// `NotCreated → Created → PhotosAttached → Reordered` の順にのみ進む
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AlbumStage {
    NotCreated,
    Created,
    PhotosAttached,
    Reordered,
}

impl AlbumStage {
    /// 次の状態を返す（終端なら `None`）
    pub fn next(self) -> Option<AlbumStage> {
        match self {
            AlbumStage::NotCreated => Some(AlbumStage::Created),
            AlbumStage::Created => Some(AlbumStage::PhotosAttached),
            AlbumStage::PhotosAttached => Some(AlbumStage::Reordered),
            AlbumStage::Reordered => None,
        }
    }

    /// 次の状態へ進める
    ///
    /// 終端状態では何もせず `false` を返す
    pub fn advance(&mut self) -> bool {
        match self.next() {
            Some(next) => {
                *self = next;
                true
            }
            None => false,
        }
    }
}

impl fmt::Display for AlbumStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlbumStage::NotCreated => "not created",
            AlbumStage::Created => "created",
            AlbumStage::PhotosAttached => "photos attached",
            AlbumStage::Reordered => "reordered",
        };
        f.write_str(name)
    }
}

/// 作成済みアルバム
///
/// 作成後は参照されるだけで変更されない
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumHandle {
    pub id: AlbumId,
    pub title: String,
    pub cover_photo_id: PhotoId,
}

impl AlbumHandle {
    pub fn new(id: AlbumId, title: impl Into<String>, cover_photo_id: PhotoId) -> Self {
        Self {
            id,
            title: title.into(),
            cover_photo_id,
        }
    }
}

/// アルバムの最終的な並び
///
/// 先頭がカバー写真。撮影日時順に並んだ成功済み写真の識別子を、
/// 重複を除いて保持する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumPlan {
    ordered: Vec<PhotoId>,
}

impl AlbumPlan {
    /// 撮影日時順の識別子から計画を作る
    ///
    /// 同じ識別子が複数回現れた場合（重複検出で同一写真に解決された場合）は
    /// 最初の出現だけを残す。空なら `None`。
    pub fn from_ordered(ids: impl IntoIterator<Item = PhotoId>) -> Option<Self> {
        let mut seen = HashSet::new();
        let ordered: Vec<PhotoId> = ids
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();

        if ordered.is_empty() {
            None
        } else {
            Some(Self { ordered })
        }
    }

    /// カバー写真（撮影日時が最も早い成功済み写真）
    pub fn cover(&self) -> &PhotoId {
        &self.ordered[0]
    }

    /// 作成後に追加する写真（カバーは作成時に自動で含まれるため除く）
    pub fn to_attach(&self) -> &[PhotoId] {
        &self.ordered[1..]
    }

    /// 並び替え呼び出しに渡す全体の並び
    pub fn ordered(&self) -> &[PhotoId] {
        &self.ordered
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
