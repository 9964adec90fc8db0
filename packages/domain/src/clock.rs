//! # Clock（時刻プロバイダ）
//!
//! エンティティの `created_at` / `updated_at` / `deleted_at` を設定するときの現在時刻。
//! 本番は [`SystemClock`]、テストは [`FixedClock`] を注入する。

use chrono::{DateTime, Duration, Utc};

/// 現在時刻を提供するトレイト
pub trait Clock: Send + Sync {
   fn now(&self) -> DateTime<Utc>;
}

/// システム時刻
pub struct SystemClock;

impl Clock for SystemClock {
   fn now(&self) -> DateTime<Utc> {
      Utc::now()
   }
}

/// 常に同じ時刻を返す時計
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
   now: DateTime<Utc>,
}

impl FixedClock {
   pub fn new(now: DateTime<Utc>) -> Self {
      Self { now }
   }

   /// 指定した時間だけ進めた時計を返す
   pub fn advance(self, by: Duration) -> Self {
      Self { now: self.now + by }
   }
}

impl Clock for FixedClock {
   fn now(&self) -> DateTime<Utc> {
      self.now
   }
}

#[cfg(test)]
mod tests {
   use chrono::TimeZone;

   use super::*;

   #[test]
   fn test_system_clockは呼び出し時点の時刻を返す() {
      let before = Utc::now();
      let now = SystemClock.now();

      assert!(before <= now && now <= Utc::now());
   }

   #[test]
   fn test_advanceは元の時計を変えずに進めた時計を返す() {
      let start = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
      let clock = FixedClock::new(start);

      let later = clock.advance(Duration::hours(1));

      assert_eq!(clock.now(), start);
      assert_eq!(later.now(), Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap());
   }
}
