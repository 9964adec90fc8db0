//! # インフラ層エラー定義
//!
//! データベースとの通信や永続化形式の変換で発生するエラーを表現する。
//!
//! ## 設計方針
//!
//! - **エラーの変換**: `sqlx::Error` などを `#[from]` でラップし、`?` で伝播できるようにする
//! - **変換しない**: エンジン由来のエラーは意味を書き換えず、そのまま上位へ渡す
//! - **API 層での扱い**: API 層はこのエラーを一律 500 に変換し、詳細はログにのみ残す

use thiserror::Error;

use crate::entity::TypeIdError;

/// インフラ層で発生するエラー
#[derive(Debug, Error)]
pub enum InfraError {
   /// データベースエラー
   ///
   /// 接続取得の失敗、SQL の実行失敗、プールのクローズ後の取得など。
   #[error("データベースエラー: {0}")]
   Database(#[from] sqlx::Error),

   /// マイグレーションエラー
   #[error("マイグレーションエラー: {0}")]
   Migration(#[from] sqlx::migrate::MigrateError),

   /// 解放済みのハンドルを使おうとした
   #[error("接続は既に解放されています")]
   HandleClosed,

   /// 永続化された識別子が TypeId として不正
   #[error("不正な識別子: {0}")]
   InvalidIdentifier(#[from] TypeIdError),

   /// 一意制約に反する行を書き込もうとした
   ///
   /// ユースケース層で「既に存在する」エラーに変換して返す。
   #[error("競合が発生しました: {entity}(id={id})")]
   Conflict {
      /// エンティティ名（例: "Meeting"）
      entity: String,
      /// 競合した識別子
      id:     String,
   },

   /// 予期しないエラー
   #[error("予期しないエラー: {0}")]
   Unexpected(String),
}

impl InfraError {
   /// 一意制約の競合エラーを生成する
   pub fn conflict(entity: impl Into<String>, id: impl Into<String>) -> Self {
      Self::Conflict {
         entity: entity.into(),
         id:     id.into(),
      }
   }

   /// 予期しないエラーを生成する
   pub fn unexpected(msg: impl Into<String>) -> Self {
      Self::Unexpected(msg.into())
   }
}

#[cfg(test)]
mod tests {
   use std::error::Error;

   use super::*;

   #[test]
   fn test_from_sqlx_errorでdatabaseに変換される() {
      let err: InfraError = sqlx::Error::PoolClosed.into();

      assert!(matches!(err, InfraError::Database(sqlx::Error::PoolClosed)));
      assert!(err.source().is_some());
   }

   #[test]
   fn test_conflictはエンティティ名と識別子を保持する() {
      let err = InfraError::conflict("Meeting", "42");

      assert!(matches!(
         &err,
         InfraError::Conflict { entity, id } if entity == "Meeting" && id == "42"
      ));
      assert_eq!(err.to_string(), "競合が発生しました: Meeting(id=42)");
   }

   #[test]
   fn test_handle_closedのメッセージ() {
      assert_eq!(
         InfraError::HandleClosed.to_string(),
         "接続は既に解放されています"
      );
   }
}
