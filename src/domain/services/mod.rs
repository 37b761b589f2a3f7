//! # Domain Services
//!
//! エンティティに属さないビジネスルール

pub mod album_planner;
pub mod chronological_order;
pub mod media_filter;
