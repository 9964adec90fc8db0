//! # ミーティング
//!
//! API で受け渡しするミーティングの値。
//!
//! ## ルール
//!
//! - `title` は空白のみであってはならない
//! - `title` / `location` は 255 文字以内（DB の `VARCHAR(255)` に合わせる）
//! - `end_time` は `start_time` より前であってはならない（同時刻は許容）

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, FieldViolation};

/// 文字列カラムの最大長
pub const MAX_TEXT_LENGTH: usize = 255;

/// ミーティング
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Meeting {
   pub id:         i64,
   pub title:      String,
   pub start_time: DateTime<Utc>,
   pub end_time:   DateTime<Utc>,
   #[serde(default)]
   pub location:   Option<String>,
   #[serde(default)]
   pub attendees:  Vec<String>,
}

impl Meeting {
   /// ビジネスルールを検証する
   ///
   /// 違反をすべて集めてから返す（最初の違反で打ち切らない）。
   pub fn validate(&self) -> Result<(), DomainError> {
      let mut violations = Vec::new();

      if self.title.trim().is_empty() {
         violations.push(FieldViolation::new("title", "Title must not be empty"));
      } else if self.title.chars().count() > MAX_TEXT_LENGTH {
         violations.push(FieldViolation::new(
            "title",
            format!("Title must be at most {MAX_TEXT_LENGTH} characters"),
         ));
      }

      if self.end_time < self.start_time {
         violations.push(FieldViolation::new(
            "end_time",
            "End time must not be before start time",
         ));
      }

      if self
         .location
         .as_ref()
         .is_some_and(|location| location.chars().count() > MAX_TEXT_LENGTH)
      {
         violations.push(FieldViolation::new(
            "location",
            format!("Location must be at most {MAX_TEXT_LENGTH} characters"),
         ));
      }

      if violations.is_empty() {
         Ok(())
      } else {
         Err(DomainError::Validation { violations })
      }
   }
}
