//! # ドメイン層エラー定義
//!
//! ビジネスルール違反を表現するエラー型。
//!
//! | エラー種別 | HTTP ステータス | 用途 |
//! |-----------|----------------|------|
//! | `Validation` | 400 Bad Request | 入力値の検証失敗（フィールド単位の詳細付き） |

use thiserror::Error;

/// フィールド単位のルール違反
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
   /// 違反したフィールド名（リクエストの JSON キーと同じ）
   pub field:   &'static str,
   /// 違反内容
   pub message: String,
}

impl FieldViolation {
   pub fn new(field: &'static str, message: impl Into<String>) -> Self {
      Self {
         field,
         message: message.into(),
      }
   }
}

/// ドメイン層で発生するエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
   /// バリデーションエラー
   ///
   /// 1 つ以上のフィールドがルールに違反している。違反は検出順に並ぶ。
   #[error("validation failed on {} field(s)", violations.len())]
   Validation { violations: Vec<FieldViolation> },
}

impl DomainError {
   /// 違反したフィールドの一覧を返す
   pub fn violations(&self) -> &[FieldViolation] {
      match self {
         Self::Validation { violations } => violations,
      }
   }
}
