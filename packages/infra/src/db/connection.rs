//! # 接続アダプタ
//!
//! プール済み PostgreSQL 接続をハンドル（[`DbConnection`]）として払い出し、
//! トランザクションの入れ子を管理する。
//!
//! ## 設計方針
//!
//! - **エンジンの遅延生成**: プールは最初に必要になった時点で 1 度だけ作る（`OnceLock`）
//! - **SQL は素通し**: 制御文の失敗は `InfraError::Database` に包んでそのまま返す
//! - **ハンドルは単一所有**: トランザクション状態はハンドルが持ち、`&mut` でのみ変更する
//! - **開いたまま捨てない**: トランザクションを開いたままハンドルが drop された場合
//!   （リクエストのキャンセルや panic）、物理接続はプールへ戻さずに閉じる

use std::{future::Future, pin::Pin, sync::OnceLock, time::Duration};

use sqlx::{
   ConnectOptions,
   PgConnection,
   PgPool,
   Postgres,
   pool::PoolConnection,
   postgres::PgPoolOptions,
};

#[cfg(any(test, feature = "test-utils"))]
use super::mock::{MockEngine, MockLink};
use super::transaction::{Resolution, TransactionMarker, TransactionStack};
use crate::{config::DatabaseConfig, error::InfraError};

/// 接続取得のタイムアウト
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

// =============================================================================
// Engine
// =============================================================================

/// 接続の供給元
#[derive(Debug, Clone)]
pub(crate) enum Engine {
   Pg(PgPool),
   /// 作成前に停止された
   Closed,
   #[cfg(any(test, feature = "test-utils"))]
   Mock(MockEngine),
}

impl Engine {
   /// 設定からプールを作る
   ///
   /// 接続は張らない（`connect_lazy_with`）。最初の `acquire` で接続する。
   fn connect(config: &DatabaseConfig) -> Self {
      let mut options = config.connect_options();
      if !config.debug {
         options = options.disable_statement_logging();
      }

      let pool = PgPoolOptions::new()
         .max_connections(config.pool.max_connections())
         .acquire_timeout(ACQUIRE_TIMEOUT)
         .max_lifetime(config.pool.recycle)
         .connect_lazy_with(options);

      tracing::info!(
         uri = %config.redacted_uri(),
         max_connections = config.pool.max_connections(),
         "データベースエンジンを作成"
      );

      Self::Pg(pool)
   }

   async fn acquire(&self) -> Result<Link, sqlx::Error> {
      match self {
         Self::Pg(pool) => Ok(Link::Pg(pool.acquire().await?)),
         Self::Closed => Err(sqlx::Error::PoolClosed),
         #[cfg(any(test, feature = "test-utils"))]
         Self::Mock(engine) => Ok(Link::Mock(engine.acquire()?)),
      }
   }

   async fn close(&self) {
      match self {
         Self::Pg(pool) => pool.close().await,
         Self::Closed => {}
         #[cfg(any(test, feature = "test-utils"))]
         Self::Mock(engine) => engine.close(),
      }
   }
}

// =============================================================================
// Link
// =============================================================================

/// ハンドルが保持する物理接続
enum Link {
   Pg(PoolConnection<Postgres>),
   #[cfg(any(test, feature = "test-utils"))]
   Mock(MockLink),
}

/// `Send` を明示した制御文実行の Future
///
/// `async_trait` の中から呼ぶとき、`&mut PgConnection` を executor にした Future の
/// ライフタイムを推論できないため、ここで型を固定する。
type ExecuteFuture<'a> = Pin<Box<dyn Future<Output = Result<(), sqlx::Error>> + Send + 'a>>;

impl Link {
   /// 制御文を実行する（結果行は使わない）
   fn execute<'a>(&'a mut self, statement: &'a str) -> ExecuteFuture<'a> {
      match self {
         Self::Pg(conn) => {
            let conn: &'a mut PgConnection = &mut **conn;
            Box::pin(async move {
               sqlx::Executor::execute(conn, sqlx::raw_sql(statement)).await?;
               Ok(())
            })
         }
         #[cfg(any(test, feature = "test-utils"))]
         Self::Mock(link) => {
            let result = link.execute(statement);
            Box::pin(async move { result })
         }
      }
   }

   /// drop されたときにプールへ返さず閉じるよう印を付ける
   fn discard_on_drop(&mut self) {
      match self {
         Self::Pg(conn) => conn.close_on_drop(),
         #[cfg(any(test, feature = "test-utils"))]
         Self::Mock(link) => link.discard(),
      }
   }

   /// プールへ返却せずに物理接続を閉じる
   async fn close(self) {
      match self {
         Self::Pg(conn) => {
            if let Err(e) = conn.close().await {
               tracing::warn!(error = %e, "接続のクローズに失敗");
            }
         }
         #[cfg(any(test, feature = "test-utils"))]
         Self::Mock(mut link) => link.discard(),
      }
   }
}

// =============================================================================
// DbConnection
// =============================================================================

/// データベース接続ハンドル
///
/// [`ConnectionAdapter::acquire`](crate::db::DatabaseAdapter::acquire) で取得し、
/// 使い終わったら `release` で解放する。解放後は `is_closed` が `true` になり、
/// クエリは [`InfraError::HandleClosed`] で失敗する。
pub struct DbConnection {
   link:         Option<Link>,
   transactions: TransactionStack,
}

impl DbConnection {
   fn new(link: Link) -> Self {
      Self {
         link:         Some(link),
         transactions: TransactionStack::default(),
      }
   }

   pub fn is_closed(&self) -> bool {
      self.link.is_none()
   }

   /// トップレベルのトランザクションかセーブポイントが開いているか
   pub fn in_transaction(&self) -> bool {
      !self.transactions.is_empty()
   }

   /// 開いているトランザクションの数（トップレベルを含む）
   pub fn transaction_depth(&self) -> usize {
      self.transactions.len()
   }

   /// 最も内側の開いているトランザクション
   pub fn current_transaction(&self) -> Option<&TransactionMarker> {
      self.transactions.innermost()
   }

   /// クエリ実行用の PostgreSQL 接続を借りる
   ///
   /// sqlx のクエリは `&mut PgConnection` を executor として受け取る。
   pub fn pg_connection(&mut self) -> Result<&mut PgConnection, InfraError> {
      match self.link.as_mut() {
         None => Err(InfraError::HandleClosed),
         Some(Link::Pg(conn)) => Ok(&mut **conn),
         #[cfg(any(test, feature = "test-utils"))]
         Some(Link::Mock(_)) => Err(InfraError::unexpected(
            "モック接続ではクエリを実行できません",
         )),
      }
   }

   fn link_mut(&mut self) -> Result<&mut Link, InfraError> {
      self.link.as_mut().ok_or(InfraError::HandleClosed)
   }

   /// トランザクションを開始する。開いていればセーブポイントを作る
   ///
   /// マーカーは文を送る前に積む。応答を待つ間に drop されても、
   /// 開いている可能性のある接続として扱われる。
   pub(crate) async fn begin(&mut self) -> Result<(), InfraError> {
      if self.is_closed() {
         return Err(InfraError::HandleClosed);
      }

      let marker = self.transactions.next_marker();
      let depth = marker.depth();
      let statement = marker.begin_statement();
      self.transactions.push(marker);

      if let Err(e) = self.link_mut()?.execute(&statement).await {
         self.transactions.pop();
         return Err(e.into());
      }

      tracing::debug!(depth, "トランザクションを開始");
      Ok(())
   }

   /// 最も内側のトランザクションを確定または取り消す
   ///
   /// - 開いているトランザクションが無ければ何もしない
   /// - 無効なマーカーは SQL を発行せずに取り除く
   /// - 文が失敗したらマーカーを無効にしてエラーを返す
   pub(crate) async fn resolve(&mut self, resolution: Resolution) -> Result<(), InfraError> {
      let Some(marker) = self.transactions.innermost() else {
         return Ok(());
      };

      if !marker.is_valid() {
         tracing::debug!(depth = marker.depth(), "無効なトランザクションを破棄");
         self.transactions.pop();
         return Ok(());
      }

      let depth = marker.depth();
      let statement = resolution.statement(marker);

      match self.link_mut()?.execute(&statement).await {
         Ok(()) => {
            tracing::debug!(depth, ?resolution, "トランザクションを解決");
            self.transactions.pop();
            Ok(())
         }
         Err(e) => {
            self.transactions.invalidate_innermost();
            Err(e.into())
         }
      }
   }

   /// 接続を解放する
   ///
   /// 開いているトランザクションがあればロールバックしてからプールへ返す。
   /// ロールバックに失敗した接続はプールへ返さずに閉じる。
   pub(crate) async fn release(&mut self) -> Result<(), InfraError> {
      let Some(link) = self.link.as_mut() else {
         return Ok(());
      };

      // ロールバックが終わるまでマーカーとリンクは手放さない
      if !self.transactions.is_empty() {
         if let Err(e) = link.execute("ROLLBACK").await {
            tracing::warn!(error = %e, "解放時のロールバックに失敗したため接続を破棄");
            self.transactions.clear();
            if let Some(link) = self.link.take() {
               link.close().await;
            }
            return Err(e.into());
         }
      }

      self.transactions.clear();
      // Drop でプールへ返却される
      self.link = None;
      Ok(())
   }
}

impl Drop for DbConnection {
   fn drop(&mut self) {
      if self.transactions.is_empty() {
         return;
      }
      if let Some(link) = self.link.as_mut() {
         tracing::warn!(
            depth = self.transactions.len(),
            "トランザクションを開いたままハンドルが破棄されたため接続を閉じる"
         );
         link.discard_on_drop();
      }
   }
}

impl std::fmt::Debug for DbConnection {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      f.debug_struct("DbConnection")
         .field("closed", &self.is_closed())
         .field("transaction_depth", &self.transaction_depth())
         .finish()
   }
}

// =============================================================================
// ConnectionAdapter
// =============================================================================

/// 接続アダプタ
///
/// アプリケーション起動時に 1 つ作り、`Arc` で共有する。
/// エンジン（接続プール）は最初の `acquire` で作られ、以降は同じものを使う。
#[derive(Debug)]
pub struct ConnectionAdapter {
   config: DatabaseConfig,
   engine: OnceLock<Engine>,
}

impl ConnectionAdapter {
   pub fn new(config: DatabaseConfig) -> Self {
      Self {
         config,
         engine: OnceLock::new(),
      }
   }

   /// モックエンジンを使うアダプタを作る
   #[cfg(any(test, feature = "test-utils"))]
   pub fn with_mock(engine: MockEngine) -> Self {
      Self {
         config: DatabaseConfig::default(),
         engine: OnceLock::from(Engine::Mock(engine)),
      }
   }

   pub fn config(&self) -> &DatabaseConfig {
      &self.config
   }

   /// エンジンが作成済みか
   pub fn is_engine_initialized(&self) -> bool {
      self.engine.get().is_some()
   }

   pub(crate) fn engine(&self) -> &Engine {
      self.engine.get_or_init(|| Engine::connect(&self.config))
   }

   /// 埋め込みマイグレーションを適用する
   ///
   /// 適用済みのマイグレーションはスキップされる。モックエンジンでは何もしない。
   pub async fn run_migrations(&self) -> Result<(), InfraError> {
      match self.engine() {
         Engine::Pg(pool) => {
            sqlx::migrate!("./migrations").run(pool).await?;
            tracing::info!("マイグレーションを適用");
            Ok(())
         }
         Engine::Closed => Err(sqlx::Error::PoolClosed.into()),
         #[cfg(any(test, feature = "test-utils"))]
         Engine::Mock(_) => Ok(()),
      }
   }

   pub(crate) async fn acquire_connection(&self) -> Result<DbConnection, InfraError> {
      let link = self.engine().acquire().await?;
      Ok(DbConnection::new(link))
   }

   /// エンジンを停止する
   ///
   /// 作成前ならプールを作らずに停止済みとして記録する。
   pub(crate) async fn shutdown_engine(&self) {
      self.engine.get_or_init(|| Engine::Closed).close().await;
      tracing::info!("データベースエンジンを停止");
   }
}
