//! # Pioneiros インフラ層
//!
//! PostgreSQL との接続、トランザクション管理、エンティティの永続化を担当する。
//!
//! ## モジュール構成
//!
//! - [`config`] - 接続先とプールの設定
//! - [`db`] - 接続・セッションアダプタとトランザクションの入れ子管理
//! - [`entity`] - テーブル名の規約、型付き識別子、タイムスタンプ
//! - [`error`] - インフラ層のエラー
//! - [`repository`] - エンティティの読み書き
//!
//! ## テスト用ユーティリティ
//!
//! `test-utils` feature を有効にすると、PostgreSQL なしで動く
//! [`db::MockEngine`] が使えるようになる。

pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod repository;

pub use config::{DatabaseConfig, PoolConfig};
pub use error::InfraError;
