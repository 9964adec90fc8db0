//! # Pioneiros da Colina API
//!
//! ミーティングを管理する HTTP API。
//!
//! ```text
//! HTTP リクエスト
//!   → handler（セッション取得・解放）
//!   → usecase（検証・トランザクション・エンベロープ化）
//!   → repository（SQL）
//!   → PostgreSQL
//! ```
//!
//! エラーはどこで発生しても `Result` で境界まで伝播し、[`error::ApiError`] として
//! 一度だけ JSON レスポンスに変換される。
//!
//! ## モジュール構成
//!
//! - [`app_builder`] - ルーター構築と依存関係の組み立て
//! - [`config`] - アプリケーション設定（環境変数からの読み込み）
//! - [`error`] - API エラー定義と HTTP レスポンスへの変換
//! - [`handler`] - HTTP リクエストハンドラ
//! - [`middleware`] - セキュリティヘッダー
//! - [`openapi`] - OpenAPI 仕様と Swagger UI（ローカル環境のみ）
//! - [`usecase`] - ミーティングのユースケース
//!
//! ## 依存関係
//!
//! - `pioneiros_domain`: ミーティングの値とバリデーション
//! - `pioneiros_infra`: データベースアダプタ、リポジトリ
//! - `pioneiros_shared`: レスポンスエンベロープ、トレーシング初期化

pub mod app_builder;
pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod openapi;
pub mod usecase;
