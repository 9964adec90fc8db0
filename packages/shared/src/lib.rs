//! # Pioneiros 共有ユーティリティ
//!
//! このクレートは、Pioneiros da Colina API 全体で使用される共通ユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - API クレートから依存される（domain / infra はこのクレートに依存しない）
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - 外部クレートへの依存は最小限に抑える（axum / sqlx には依存しない）
//!
//! ## モジュール構成
//!
//! - [`api_response`] - 成功レスポンスのエンベロープ `{status, message, data}`
//! - [`health`] - ヘルスチェックのレスポンス型
//! - [`observability`] - トレーシング初期化
//!
//! `openapi` feature を有効にすると、レスポンス型に `utoipa::ToSchema` が実装される。

pub mod api_response;
pub mod health;
pub mod observability;

pub use api_response::ApiResponse;
pub use health::HealthResponse;
