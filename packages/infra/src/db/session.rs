//! # セッションアダプタ
//!
//! 接続ハンドルの上に作るセッションハンドル（[`DbSession`]）を払い出す。
//! ライフサイクルとトランザクション操作は束ねた接続にそのまま委譲し、
//! セッション側はエンティティ単位の読み出しヘルパーを提供する。

use std::sync::Arc;

use sqlx::{FromRow, PgConnection, postgres::PgRow};

use super::connection::{ConnectionAdapter, DbConnection};
use crate::{entity::Entity, error::InfraError};

/// セッションハンドル
#[derive(Debug)]
pub struct DbSession {
   bind: DbConnection,
}

impl DbSession {
   pub(crate) fn new(bind: DbConnection) -> Self {
      Self { bind }
   }

   /// 束ねている接続ハンドル
   pub fn connection(&self) -> &DbConnection {
      &self.bind
   }

   pub(crate) fn connection_mut(&mut self) -> &mut DbConnection {
      &mut self.bind
   }

   /// クエリ実行用の PostgreSQL 接続を借りる
   pub fn pg_connection(&mut self) -> Result<&mut PgConnection, InfraError> {
      self.bind.pg_connection()
   }

   /// エンティティのテーブルから全行を読み出す
   ///
   /// 論理削除を使うエンティティでは `deleted_at` が設定された行を除外する。
   /// 並び順は `id`（UUIDv7 由来のため作成順）。
   pub async fn find_all<E>(&mut self) -> Result<Vec<E>, InfraError>
   where
      E: Entity + for<'r> FromRow<'r, PgRow> + Send + Unpin,
   {
      let sql = E::select_all_sql();
      let rows = sqlx::query_as::<_, E>(&sql)
         .fetch_all(self.pg_connection()?)
         .await?;
      Ok(rows)
   }

   /// 1 列だけを返すクエリを実行し、値を文字列として集める
   pub async fn scalars(&mut self, sql: &str) -> Result<Vec<String>, InfraError> {
      let values = sqlx::query_scalar::<_, String>(sql)
         .fetch_all(self.pg_connection()?)
         .await?;
      Ok(values)
   }
}

/// セッションアダプタ
///
/// 接続アダプタ（provider）を共有し、取得した接続をセッションに包んで返す。
#[derive(Debug, Clone)]
pub struct SessionAdapter {
   provider: Arc<ConnectionAdapter>,
}

impl SessionAdapter {
   pub fn new(provider: Arc<ConnectionAdapter>) -> Self {
      Self { provider }
   }

   pub fn provider(&self) -> &Arc<ConnectionAdapter> {
      &self.provider
   }
}
