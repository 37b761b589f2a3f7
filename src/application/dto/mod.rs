//! # Data Transfer Objects
//!
//! レイヤー間でデータを受け渡すためのオブジェクト

pub mod upload_config;
