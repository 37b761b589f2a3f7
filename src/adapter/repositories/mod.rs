//! Repository Implementations
//!
//! Domain層のRepositoryトレイトの実装

pub mod file_audit_repository;
pub mod file_media_repository;
pub mod flickr_photo_repository;
