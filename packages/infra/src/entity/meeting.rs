//! # ミーティングエンティティ
//!
//! `meeting` テーブルの 1 行。主キーは採番した [`TypeId`]、クライアントが指定した
//! 番号は `external_id` に保存する。参加者は `TEXT[]` 列にそのまま保存する。

use chrono::{DateTime, Utc};
use pioneiros_domain::{Meeting, clock::Clock};
use sqlx::FromRow;

use super::{Entity, Timestamps, TypeId, TypeIdError};

/// `external_id` の一意インデックス名
pub const EXTERNAL_ID_UNIQUE_INDEX: &str = "meeting_external_id_key";

/// `meeting` テーブルの行
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct MeetingEntity {
   pub id:          TypeId,
   pub external_id: i64,
   pub title:       String,
   pub start_time:  DateTime<Utc>,
   pub end_time:    DateTime<Utc>,
   pub location:    Option<String>,
   pub attendees:   Vec<String>,
   #[sqlx(flatten)]
   pub timestamps:  Timestamps,
}

impl Entity for MeetingEntity {
   const ID_PREFIX: &'static str = "meeting";
   const SOFT_DELETE: bool = true;
}

impl MeetingEntity {
   /// API で受け取ったミーティングから新しい行を作る
   pub fn from_meeting(meeting: &Meeting, clock: &dyn Clock) -> Result<Self, TypeIdError> {
      Ok(Self {
         id:          TypeId::new(Self::ID_PREFIX)?,
         external_id: meeting.id,
         title:       meeting.title.clone(),
         start_time:  meeting.start_time,
         end_time:    meeting.end_time,
         location:    meeting.location.clone(),
         attendees:   meeting.attendees.clone(),
         timestamps:  Timestamps::new(clock),
      })
   }

   /// 行をドメインのミーティングに戻す
   pub fn to_meeting(&self) -> Meeting {
      Meeting {
         id:         self.external_id,
         title:      self.title.clone(),
         start_time: self.start_time,
         end_time:   self.end_time,
         location:   self.location.clone(),
         attendees:  self.attendees.clone(),
      }
   }
}

#[cfg(test)]
mod tests {
   use chrono::TimeZone;
   use pioneiros_domain::clock::FixedClock;
   use pretty_assertions::assert_eq;
   use rstest::rstest;

   use super::*;

   fn meeting(attendees: Vec<&str>) -> Meeting {
      Meeting {
         id:         42,
         title:      "Sync".to_string(),
         start_time: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
         end_time:   Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap(),
         location:   Some("Sala 1".to_string()),
         attendees:  attendees.into_iter().map(str::to_string).collect(),
      }
   }

   #[test]
   fn test_from_meetingは値とタイムスタンプを設定する() {
      let now = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
      let clock = FixedClock::new(now);

      let entity =
         MeetingEntity::from_meeting(&meeting(vec!["a@x.com", "b@x.com"]), &clock).unwrap();

      assert_eq!(entity.id.prefix(), "meeting");
      assert_eq!(entity.external_id, 42);
      assert_eq!(entity.title, "Sync");
      assert_eq!(entity.location.as_deref(), Some("Sala 1"));
      assert_eq!(entity.attendees, vec!["a@x.com", "b@x.com"]);
      assert_eq!(entity.timestamps, Timestamps::new(&clock));
   }

   #[rstest]
   #[case::空(vec![])]
   #[case::区切り文字を含む(vec!["Doe, John <j@x.com>"])]
   #[case::空文字だけ(vec![""])]
   #[case::複数(vec!["a@x.com", "", "b,c@x.com"])]
   fn test_to_meetingで受け取ったミーティングがそのまま戻る(#[case] attendees: Vec<&str>) {
      let clock = FixedClock::new(Utc::now());
      let original = meeting(attendees);

      let entity = MeetingEntity::from_meeting(&original, &clock).unwrap();

      assert_eq!(entity.to_meeting(), original);
   }
}
