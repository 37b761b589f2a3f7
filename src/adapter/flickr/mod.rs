//! Flickr Adapter Modules
//!
//! Flickr API 統合のためのアダプターモジュール

pub mod client;
pub mod models;
pub mod oauth;
pub mod retry;
