//! Adapter Layer
//!
//! 外部システム（Flickr, ファイルシステム, 端末）との統合

pub mod config;
pub mod flickr;
pub mod logging;
pub mod progress;
pub mod repositories;
