//! # MeetingRepository
//!
//! `meeting` テーブルの読み書きを担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **ハンドルは呼び出し側が持つ**: リポジトリ自体は状態を持たず、
//!   渡されたセッション上でクエリを実行する。トランザクションの境界はユースケースが決める
//! - **実行時クエリ**: `sqlx::query` を使い、ビルド時に DB を必要としない
//! - **競合の変換**: `external_id` の一意インデックス違反は [`InfraError::Conflict`] にする

use async_trait::async_trait;

use crate::{
   db::DbSession,
   entity::{MeetingEntity, meeting::EXTERNAL_ID_UNIQUE_INDEX},
   error::InfraError,
};

/// ミーティングリポジトリトレイト
#[async_trait]
pub trait MeetingRepository: Send + Sync {
   /// 論理削除されていないミーティングを作成順に取得する
   async fn find_all(&self, session: &mut DbSession) -> Result<Vec<MeetingEntity>, InfraError>;

   /// ミーティングを 1 行挿入する
   ///
   /// 同じ `external_id` の行が既にあれば [`InfraError::Conflict`] を返す。
   async fn insert(&self, session: &mut DbSession, meeting: &MeetingEntity)
   -> Result<(), InfraError>;
}

/// PostgreSQL 実装の MeetingRepository
#[derive(Debug, Clone, Default)]
pub struct PostgresMeetingRepository;

impl PostgresMeetingRepository {
   pub fn new() -> Self {
      Self
   }
}

#[async_trait]
impl MeetingRepository for PostgresMeetingRepository {
   async fn find_all(&self, session: &mut DbSession) -> Result<Vec<MeetingEntity>, InfraError> {
      session.find_all::<MeetingEntity>().await
   }

   async fn insert(
      &self,
      session: &mut DbSession,
      meeting: &MeetingEntity,
   ) -> Result<(), InfraError> {
      let result = sqlx::query(
         r#"
         INSERT INTO meeting (
            id, external_id, title, start_time, end_time, location, attendees,
            created_at, updated_at, deleted_at
         )
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         "#,
      )
      .bind(&meeting.id)
      .bind(meeting.external_id)
      .bind(&meeting.title)
      .bind(meeting.start_time)
      .bind(meeting.end_time)
      .bind(&meeting.location)
      .bind(&meeting.attendees)
      .bind(meeting.timestamps.created_at)
      .bind(meeting.timestamps.updated_at)
      .bind(meeting.timestamps.deleted_at)
      .execute(session.pg_connection()?)
      .await;

      match result {
         Ok(_) => {
            tracing::debug!(
               id = %meeting.id,
               external_id = meeting.external_id,
               "ミーティングを挿入"
            );
            Ok(())
         }
         Err(e) if violates_external_id(&e) => Err(InfraError::conflict(
            "Meeting",
            meeting.external_id.to_string(),
         )),
         Err(e) => Err(e.into()),
      }
   }
}

fn violates_external_id(error: &sqlx::Error) -> bool {
   error
      .as_database_error()
      .and_then(|d| d.constraint())
      .is_some_and(|constraint| constraint == EXTERNAL_ID_UNIQUE_INDEX)
}
