//! # エンティティ基盤
//!
//! 永続化される行の共通規約を定義する。
//!
//! ## 規約
//!
//! - **テーブル名**: 型名を小文字にし、末尾の `entity` を取り除いたもの
//!   （`MeetingEntity` → `meeting`）
//! - **識別子**: [`TypeId`]（`VARCHAR(36)`）。prefix はエンティティごとに決める
//! - **タイムスタンプ**: [`Timestamps`] を `#[sqlx(flatten)]` で埋め込む
//! - **論理削除**: `SOFT_DELETE = true` のエンティティは `deleted_at` が
//!   設定された行を読み出し対象から外す

pub mod meeting;
mod type_id;

use chrono::{DateTime, Utc};
use pioneiros_domain::clock::Clock;
use sqlx::FromRow;

pub use self::{
   meeting::MeetingEntity,
   type_id::{MAX_PREFIX_LENGTH, TypeId, TypeIdError},
};

/// 永続化されるエンティティ
pub trait Entity {
   /// 識別子の prefix
   const ID_PREFIX: &'static str;

   /// 論理削除を使うか
   const SOFT_DELETE: bool = false;

   /// 対応するテーブル名
   fn table_name() -> String {
      table_name_of(std::any::type_name::<Self>())
   }

   /// 読み出し対象の全行を取得する SQL
   fn select_all_sql() -> String {
      let table = Self::table_name();
      if Self::SOFT_DELETE {
         format!("SELECT * FROM {table} WHERE deleted_at IS NULL ORDER BY id")
      } else {
         format!("SELECT * FROM {table} ORDER BY id")
      }
   }
}

/// 型のフルパスからテーブル名を導出する
///
/// モジュールパスとジェネリクスは無視する。型名が `Entity` だけの場合は
/// 接尾辞を取り除かない。
pub fn table_name_of(type_name: &str) -> String {
   let without_generics = type_name.split('<').next().unwrap_or(type_name);
   let last = without_generics
      .rsplit("::")
      .next()
      .unwrap_or(without_generics);
   let lower = last.to_lowercase();

   match lower.strip_suffix("entity") {
      Some(stripped) if !stripped.is_empty() => stripped.to_string(),
      _ => lower,
   }
}

/// 作成・更新・論理削除の時刻
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Timestamps {
   pub created_at: DateTime<Utc>,
   pub updated_at: DateTime<Utc>,
   pub deleted_at: Option<DateTime<Utc>>,
}

impl Timestamps {
   /// 作成時刻と更新時刻を現在時刻に揃えて作る
   pub fn new(clock: &dyn Clock) -> Self {
      let now = clock.now();
      Self {
         created_at: now,
         updated_at: now,
         deleted_at: None,
      }
   }

   pub fn touch(&mut self, clock: &dyn Clock) {
      self.updated_at = clock.now();
   }

   pub fn soft_delete(&mut self, clock: &dyn Clock) {
      let now = clock.now();
      self.deleted_at = Some(now);
      self.updated_at = now;
   }

   pub fn is_deleted(&self) -> bool {
      self.deleted_at.is_some()
   }
}
