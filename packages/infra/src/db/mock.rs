//! # テスト用モックエンジン
//!
//! PostgreSQL なしでアダプタとハンドラをテストするためのインメモリエンジン。
//! ハンドル上で発行された制御文（`BEGIN` / `SAVEPOINT` / `COMMIT` など）を
//! 記録し、指定した文を失敗させることができる。プールへ返さずに閉じた接続の数も数える。
//!
//! ```toml
//! [dev-dependencies]
//! pioneiros-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{
   Arc,
   Mutex,
   atomic::{AtomicBool, AtomicUsize, Ordering},
};

/// インメモリエンジン
///
/// クローンは同じ記録と状態を共有する。テストではアダプタに渡したものとは
/// 別のクローンを手元に残しておき、発行された文を検証する。
#[derive(Debug, Clone, Default)]
pub struct MockEngine {
   statements: Arc<Mutex<Vec<String>>>,
   failing:    Arc<Mutex<Vec<String>>>,
   closed:     Arc<AtomicBool>,
   discarded:  Arc<AtomicUsize>,
}

impl MockEngine {
   pub fn new() -> Self {
      Self::default()
   }

   /// これまでに発行された文（発行順）
   pub fn statements(&self) -> Vec<String> {
      self.statements.lock().unwrap().clone()
   }

   /// 指定した文を以降すべて失敗させる
   pub fn fail_on(&self, statement: impl Into<String>) {
      self.failing.lock().unwrap().push(statement.into());
   }

   /// プールへ返さずに閉じられた接続の数
   pub fn discarded_connections(&self) -> usize {
      self.discarded.load(Ordering::SeqCst)
   }

   /// `shutdown` 済みか
   pub fn is_closed(&self) -> bool {
      self.closed.load(Ordering::SeqCst)
   }

   pub(crate) fn close(&self) {
      self.closed.store(true, Ordering::SeqCst);
   }

   pub(crate) fn acquire(&self) -> Result<MockLink, sqlx::Error> {
      if self.is_closed() {
         return Err(sqlx::Error::PoolClosed);
      }
      Ok(MockLink {
         engine:    self.clone(),
         discarded: false,
      })
   }
}

/// モックエンジンから取得した接続
#[derive(Debug)]
pub struct MockLink {
   engine:    MockEngine,
   discarded: bool,
}

impl MockLink {
   /// 文を記録する。`fail_on` で指定された文ならエラーを返す
   pub(crate) fn execute(&mut self, statement: &str) -> Result<(), sqlx::Error> {
      self.engine.statements.lock().unwrap().push(statement.to_string());

      if self.engine.failing.lock().unwrap().iter().any(|s| s == statement) {
         return Err(sqlx::Error::Protocol(format!("mock failure: {statement}")));
      }
      Ok(())
   }

   /// プールへ返さずに閉じたものとして数える（1 接続につき 1 回）
   pub(crate) fn discard(&mut self) {
      if !self.discarded {
         self.discarded = true;
         self.engine.discarded.fetch_add(1, Ordering::SeqCst);
      }
   }
}
