//! # Domain Layer
//!
//! このモジュールはビジネスの核心的なルールとエンティティを定義します。
//!
//! ## 特徴
//!
//! - ネットワークやファイルシステムに触れない
//! - フレームワークに依存しない
//! - Flickr APIやEXIFについて何も知らない
//! - 純粋なビジネスロジック
//!
//! ## 構成要素
//!
//! - **entities**: ビジネスエンティティ（SourceFile, UploadResult, AlbumHandleなど）
//! - **errors**: 型付きエラー（MetadataError, RemoteError, SetupError）
//! - **repositories**: Repository trait（インターフェース定義のみ）
//! - **services**: Domain Service（並び順、アルバム計画などのビジネスルール）

pub mod entities;
pub mod errors;
pub mod repositories;
pub mod services;
