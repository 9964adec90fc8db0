//! # ミドルウェア
//!
//! API 全体に適用するミドルウェアを提供する。

mod security_headers;

pub use security_headers::{SECURITY_HEADERS, security_headers};
