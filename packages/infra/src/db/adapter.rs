//! # データベースアダプタ
//!
//! 接続ハンドルとセッションハンドルに共通のライフサイクル操作を定義する。
//! 呼び出し側はどちらのハンドルを持っているかを意識せずに済む。
//!
//! | 操作 | 説明 |
//! |------|------|
//! | `acquire` | エンジンからハンドルを取得する（エンジンは初回に 1 度だけ作る） |
//! | `is_closed` | ハンドルが解放済みか |
//! | `release` | ハンドルを解放する。解放済みなら何もしない |
//! | `shutdown` | エンジンを停止する。以降の `acquire` は失敗する |
//! | `begin` | トランザクションを開始する。開いていればセーブポイントを作る |
//! | `commit` / `rollback` | 最も内側のトランザクションを解決する。開いていなければ何もしない |
//! | `in_transaction` | トランザクションかセーブポイントが開いているか |
//!
//! 1 つのハンドルを複数のタスクから同時に使ってはならない（`&mut` で強制）。

use async_trait::async_trait;

use super::{
   connection::{ConnectionAdapter, DbConnection},
   session::{DbSession, SessionAdapter},
   transaction::Resolution,
};
use crate::error::InfraError;

/// ハンドルのライフサイクルとトランザクションを扱うアダプタ
#[async_trait]
pub trait DatabaseAdapter: Send + Sync {
   /// アダプタが払い出すハンドル
   type Handle: Send;

   async fn acquire(&self) -> Result<Self::Handle, InfraError>;

   fn is_closed(&self, handle: &Self::Handle) -> bool;

   async fn release(&self, handle: &mut Self::Handle) -> Result<(), InfraError>;

   async fn shutdown(&self);

   async fn begin(&self, handle: &mut Self::Handle) -> Result<(), InfraError>;

   async fn commit(&self, handle: &mut Self::Handle) -> Result<(), InfraError>;

   async fn rollback(&self, handle: &mut Self::Handle) -> Result<(), InfraError>;

   fn in_transaction(&self, handle: &Self::Handle) -> bool;
}

#[async_trait]
impl DatabaseAdapter for ConnectionAdapter {
   type Handle = DbConnection;

   async fn acquire(&self) -> Result<DbConnection, InfraError> {
      self.acquire_connection().await
   }

   fn is_closed(&self, handle: &DbConnection) -> bool {
      handle.is_closed()
   }

   async fn release(&self, handle: &mut DbConnection) -> Result<(), InfraError> {
      handle.release().await
   }

   async fn shutdown(&self) {
      self.shutdown_engine().await
   }

   async fn begin(&self, handle: &mut DbConnection) -> Result<(), InfraError> {
      handle.begin().await
   }

   async fn commit(&self, handle: &mut DbConnection) -> Result<(), InfraError> {
      handle.resolve(Resolution::Commit).await
   }

   async fn rollback(&self, handle: &mut DbConnection) -> Result<(), InfraError> {
      handle.resolve(Resolution::Rollback).await
   }

   fn in_transaction(&self, handle: &DbConnection) -> bool {
      handle.in_transaction()
   }
}

#[async_trait]
impl DatabaseAdapter for SessionAdapter {
   type Handle = DbSession;

   async fn acquire(&self) -> Result<DbSession, InfraError> {
      let conn = self.provider().acquire().await?;
      Ok(DbSession::new(conn))
   }

   fn is_closed(&self, handle: &DbSession) -> bool {
      self.provider().is_closed(handle.connection())
   }

   async fn release(&self, handle: &mut DbSession) -> Result<(), InfraError> {
      self.provider().release(handle.connection_mut()).await
   }

   async fn shutdown(&self) {
      self.provider().shutdown().await
   }

   async fn begin(&self, handle: &mut DbSession) -> Result<(), InfraError> {
      self.provider().begin(handle.connection_mut()).await
   }

   async fn commit(&self, handle: &mut DbSession) -> Result<(), InfraError> {
      self.provider().commit(handle.connection_mut()).await
   }

   async fn rollback(&self, handle: &mut DbSession) -> Result<(), InfraError> {
      self.provider().rollback(handle.connection_mut()).await
   }

   fn in_transaction(&self, handle: &DbSession) -> bool {
      self.provider().in_transaction(handle.connection())
   }
}
