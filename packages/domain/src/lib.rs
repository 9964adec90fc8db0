//! # Pioneiros ドメイン層
//!
//! ミーティング管理の中核となる値と、そのビジネスルールを定義する。
//!
//! ## 依存関係の方向
//!
//! ```text
//! api → infra → domain
//! api → shared
//! ```
//!
//! ドメイン層はインフラ層（DB、HTTP）に一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`clock`] - 時刻プロバイダ（テストで固定時刻を注入するため）
//! - [`error`] - ドメイン層で発生するエラーの定義
//! - [`meeting`] - ミーティングの値とバリデーション

pub mod clock;
pub mod error;
pub mod meeting;

pub use error::{DomainError, FieldViolation};
pub use meeting::Meeting;
