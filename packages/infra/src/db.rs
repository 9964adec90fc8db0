//! # データベース接続管理
//!
//! PostgreSQL 接続プールとハンドルのライフサイクル、トランザクションの入れ子を扱う。
//!
//! ## 構成
//!
//! - [`ConnectionAdapter`]: プールを遅延生成し、接続ハンドル [`DbConnection`] を払い出す
//! - [`SessionAdapter`]: 接続アダプタを共有し、セッションハンドル [`DbSession`] を払い出す
//! - [`DatabaseAdapter`]: 両者に共通の操作（acquire / release / begin / commit など）
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use pioneiros_infra::{DatabaseConfig, db::{ConnectionAdapter, DatabaseAdapter, SessionAdapter}};
//!
//! let provider = Arc::new(ConnectionAdapter::new(DatabaseConfig::default()));
//! let adapter = SessionAdapter::new(provider);
//!
//! let mut session = adapter.acquire().await?;
//! adapter.begin(&mut session).await?;
//! // ...
//! adapter.commit(&mut session).await?;
//! adapter.release(&mut session).await?;
//! ```

mod adapter;
mod connection;
#[cfg(any(test, feature = "test-utils"))]
mod mock;
mod session;
mod transaction;

pub use adapter::DatabaseAdapter;
pub use connection::{ConnectionAdapter, DbConnection};
#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockEngine;
pub use session::{DbSession, SessionAdapter};
pub use transaction::{TransactionKind, TransactionMarker};
