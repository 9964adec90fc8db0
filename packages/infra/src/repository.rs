//! # リポジトリ実装
//!
//! エンティティの永続化を担当する。
//!
//! ## 設計方針
//!
//! - **セッション経由**: クエリは呼び出し側から渡された [`DbSession`](crate::db::DbSession) 上で実行する
//! - **テスタビリティ**: トレイト経由でスタブに差し替えられる

pub mod meeting_repository;

pub use meeting_repository::{MeetingRepository, PostgresMeetingRepository};
