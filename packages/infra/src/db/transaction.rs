//! # トランザクションの入れ子管理
//!
//! 1 つのハンドル上で開いているトランザクションをスタックとして管理する。
//! 最下段がトップレベルのトランザクション（`BEGIN`）、それより上は
//! セーブポイント（`SAVEPOINT`）になる。
//!
//! ```text
//! depth 2  SAVEPOINT pioneiros_savepoint_2   ← innermost（commit / rollback の対象）
//! depth 1  SAVEPOINT pioneiros_savepoint_1
//! depth 0  BEGIN
//! ```
//!
//! このモジュールは SQL を実行しない。発行すべき文を返すだけで、
//! 実行と結果に応じたスタック操作は [`DbConnection`](super::DbConnection) が行う。

/// トランザクションの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
   /// トップレベルのトランザクション
   TopLevel,
   /// 入れ子のトランザクション（セーブポイント）
   Savepoint,
}

/// 開いているトランザクション（またはセーブポイント）を表すマーカー
///
/// `begin` で作られ、`commit` / `rollback` で取り除かれる。
/// 解決のための SQL が失敗すると無効になり、以降の `commit` / `rollback` では
/// SQL を発行せずに取り除かれる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionMarker {
   depth: usize,
   valid: bool,
}

impl TransactionMarker {
   fn new(depth: usize) -> Self {
      Self { depth, valid: true }
   }

   /// 入れ子の深さ（トップレベルが 0）
   pub fn depth(&self) -> usize {
      self.depth
   }

   pub fn kind(&self) -> TransactionKind {
      if self.depth == 0 {
         TransactionKind::TopLevel
      } else {
         TransactionKind::Savepoint
      }
   }

   /// セーブポイント名（トップレベルの場合は `None`）
   pub fn savepoint_name(&self) -> Option<String> {
      match self.kind() {
         TransactionKind::TopLevel => None,
         TransactionKind::Savepoint => Some(format!("pioneiros_savepoint_{}", self.depth)),
      }
   }

   /// まだ commit / rollback できる状態か
   pub fn is_valid(&self) -> bool {
      self.valid
   }

   pub(crate) fn begin_statement(&self) -> String {
      match self.savepoint_name() {
         None => "BEGIN".to_string(),
         Some(name) => format!("SAVEPOINT {name}"),
      }
   }

   pub(crate) fn commit_statement(&self) -> String {
      match self.savepoint_name() {
         None => "COMMIT".to_string(),
         Some(name) => format!("RELEASE SAVEPOINT {name}"),
      }
   }

   pub(crate) fn rollback_statement(&self) -> String {
      match self.savepoint_name() {
         None => "ROLLBACK".to_string(),
         Some(name) => format!("ROLLBACK TO SAVEPOINT {name}"),
      }
   }
}

/// トランザクションの解決方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolution {
   Commit,
   Rollback,
}

impl Resolution {
   pub(crate) fn statement(&self, marker: &TransactionMarker) -> String {
      match self {
         Self::Commit => marker.commit_statement(),
         Self::Rollback => marker.rollback_statement(),
      }
   }
}

/// ハンドル 1 つ分のトランザクションスタック
#[derive(Debug, Default)]
pub(crate) struct TransactionStack {
   markers: Vec<TransactionMarker>,
}

impl TransactionStack {
   pub(crate) fn is_empty(&self) -> bool {
      self.markers.is_empty()
   }

   pub(crate) fn len(&self) -> usize {
      self.markers.len()
   }

   /// 最も内側のマーカー（入れ子がトップレベルより優先される）
   pub(crate) fn innermost(&self) -> Option<&TransactionMarker> {
      self.markers.last()
   }

   /// 次に `begin` した場合に積まれるマーカー
   ///
   /// スタックが空ならトップレベル、そうでなければセーブポイントになる。
   pub(crate) fn next_marker(&self) -> TransactionMarker {
      TransactionMarker::new(self.markers.len())
   }

   pub(crate) fn push(&mut self, marker: TransactionMarker) {
      debug_assert_eq!(marker.depth, self.markers.len());
      self.markers.push(marker);
   }

   pub(crate) fn pop(&mut self) -> Option<TransactionMarker> {
      self.markers.pop()
   }

   pub(crate) fn invalidate_innermost(&mut self) {
      if let Some(marker) = self.markers.last_mut() {
         marker.valid = false;
      }
   }

   pub(crate) fn clear(&mut self) {
      self.markers.clear();
   }
}

#[cfg(test)]
mod tests {
   use pretty_assertions::assert_eq;
   use rstest::rstest;

   use super::*;

   #[test]
   fn test_空のスタックの次のマーカーはトップレベル() {
      let stack = TransactionStack::default();
      let marker = stack.next_marker();

      assert_eq!(marker.kind(), TransactionKind::TopLevel);
      assert_eq!(marker.begin_statement(), "BEGIN");
      assert_eq!(marker.savepoint_name(), None);
   }

   #[test]
   fn test_トランザクション中の次のマーカーはセーブポイント() {
      let mut stack = TransactionStack::default();
      stack.push(stack.next_marker());

      let marker = stack.next_marker();

      assert_eq!(marker.kind(), TransactionKind::Savepoint);
      assert_eq!(marker.depth(), 1);
      assert_eq!(marker.begin_statement(), "SAVEPOINT pioneiros_savepoint_1");
   }

   #[rstest]
   #[case(0, Resolution::Commit, "COMMIT")]
   #[case(0, Resolution::Rollback, "ROLLBACK")]
   #[case(2, Resolution::Commit, "RELEASE SAVEPOINT pioneiros_savepoint_2")]
   #[case(2, Resolution::Rollback, "ROLLBACK TO SAVEPOINT pioneiros_savepoint_2")]
   fn test_解決時のsql(
      #[case] depth: usize,
      #[case] resolution: Resolution,
      #[case] expected: &str,
   ) {
      let marker = TransactionMarker::new(depth);

      assert_eq!(resolution.statement(&marker), expected);
   }

   #[test]
   fn test_innermostは最後に積んだマーカーを返す() {
      let mut stack = TransactionStack::default();
      stack.push(stack.next_marker());
      stack.push(stack.next_marker());

      assert_eq!(stack.innermost().map(|m| m.depth()), Some(1));
      assert_eq!(stack.len(), 2);
   }

   #[test]
   fn test_invalidate_innermostは最も内側だけを無効にする() {
      let mut stack = TransactionStack::default();
      stack.push(stack.next_marker());
      stack.push(stack.next_marker());

      stack.invalidate_innermost();

      assert!(!stack.pop().unwrap().is_valid());
      assert!(stack.pop().unwrap().is_valid());
      assert!(stack.is_empty());
   }
}
