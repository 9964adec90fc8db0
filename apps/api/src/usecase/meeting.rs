//! ミーティングのユースケース

use std::sync::Arc;

use chrono::{DateTime, Utc};
use pioneiros_domain::{Meeting, clock::Clock};
use pioneiros_infra::{
   InfraError,
   db::{DatabaseAdapter, DbSession, SessionAdapter},
   entity::MeetingEntity,
   repository::MeetingRepository,
};
use pioneiros_shared::ApiResponse;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;

pub const MEETINGS_FETCHED: &str = "Meetings fetched successfully";
pub const MEETINGS_CREATED: &str = "Meetings created successfully";

/// 保存済みミーティングの DTO
///
/// `id` は作成時にクライアントが指定した番号。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MeetingDto {
   pub id:         i64,
   pub title:      String,
   pub start_time: DateTime<Utc>,
   pub end_time:   DateTime<Utc>,
   pub location:   Option<String>,
   pub attendees:  Vec<String>,
   pub created_at: DateTime<Utc>,
   pub updated_at: DateTime<Utc>,
}

impl From<MeetingEntity> for MeetingDto {
   fn from(entity: MeetingEntity) -> Self {
      Self {
         id:         entity.external_id,
         title:      entity.title,
         start_time: entity.start_time,
         end_time:   entity.end_time,
         location:   entity.location,
         attendees:  entity.attendees,
         created_at: entity.timestamps.created_at,
         updated_at: entity.timestamps.updated_at,
      }
   }
}

/// ミーティングのユースケース
pub struct MeetingUseCaseImpl {
   meeting_repository: Arc<dyn MeetingRepository>,
   clock:              Arc<dyn Clock>,
}

impl MeetingUseCaseImpl {
   pub fn new(meeting_repository: Arc<dyn MeetingRepository>, clock: Arc<dyn Clock>) -> Self {
      Self {
         meeting_repository,
         clock,
      }
   }

   /// 保存済みのミーティングを一覧する
   pub async fn get_meetings(
      &self,
      session: &mut DbSession,
   ) -> Result<ApiResponse<Vec<MeetingDto>>, ApiError> {
      let meetings = self.meeting_repository.find_all(session).await?;
      let data = meetings.into_iter().map(MeetingDto::from).collect();

      Ok(ApiResponse::ok(MEETINGS_FETCHED, data))
   }

   /// ミーティングを保存し、受け取った値をそのまま返す
   ///
   /// 1. すべてのミーティングを検証（1 件でも違反があれば何も保存しない）
   /// 2. 1 つのトランザクションで全件を挿入
   /// 3. 途中で失敗したらロールバック（`id` の重複は 409）
   pub async fn create_meetings(
      &self,
      adapter: &SessionAdapter,
      session: &mut DbSession,
      meetings: Vec<Meeting>,
   ) -> Result<ApiResponse<Vec<Meeting>>, ApiError> {
      for meeting in &meetings {
         meeting.validate()?;
      }

      adapter.begin(session).await?;

      if let Err(e) = self.insert_all(session, &meetings).await {
         if let Err(rollback_error) = adapter.rollback(session).await {
            tracing::warn!(error = %rollback_error, "ロールバックに失敗");
         }
         return Err(e.into());
      }

      adapter.commit(session).await?;

      tracing::info!(count = meetings.len(), "ミーティングを作成");
      Ok(ApiResponse::ok(MEETINGS_CREATED, meetings))
   }

   async fn insert_all(
      &self,
      session: &mut DbSession,
      meetings: &[Meeting],
   ) -> Result<(), InfraError> {
      for meeting in meetings {
         let entity = MeetingEntity::from_meeting(meeting, self.clock.as_ref())?;
         self.meeting_repository.insert(session, &entity).await?;
      }
      Ok(())
   }
}

#[cfg(test)]
mod tests {
   use std::sync::Mutex;

   use async_trait::async_trait;
   use chrono::TimeZone;
   use pioneiros_domain::clock::FixedClock;
   use pioneiros_infra::db::{ConnectionAdapter, MockEngine};
   use pretty_assertions::assert_eq;

   use super::*;
   use crate::error::FieldError;

   // ===== スタブ =====

   #[derive(Default)]
   struct StubMeetingRepository {
      stored:    Mutex<Vec<MeetingEntity>>,
      fail_from: Option<usize>,
   }

   impl StubMeetingRepository {
      fn failing_from(index: usize) -> Self {
         Self {
            fail_from: Some(index),
            ..Self::default()
         }
      }
   }

   #[async_trait]
   impl MeetingRepository for StubMeetingRepository {
      async fn find_all(&self, _session: &mut DbSession) -> Result<Vec<MeetingEntity>, InfraError> {
         Ok(self.stored.lock().unwrap().clone())
      }

      async fn insert(
         &self,
         _session: &mut DbSession,
         meeting: &MeetingEntity,
      ) -> Result<(), InfraError> {
         let mut stored = self.stored.lock().unwrap();
         if self.fail_from.is_some_and(|i| stored.len() >= i) {
            return Err(InfraError::unexpected("insert failed"));
         }
         if stored.iter().any(|m| m.external_id == meeting.external_id) {
            return Err(InfraError::conflict(
               "Meeting",
               meeting.external_id.to_string(),
            ));
         }
         stored.push(meeting.clone());
         Ok(())
      }
   }

   // ===== ヘルパー =====

   fn now() -> DateTime<Utc> {
      Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
   }

   fn meeting(id: i64, title: &str) -> Meeting {
      Meeting {
         id,
         title: title.to_string(),
         start_time: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
         end_time: Utc.with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap(),
         location: None,
         attendees: vec!["a@x.com".to_string()],
      }
   }

   struct Fixture {
      sut:        MeetingUseCaseImpl,
      repository: Arc<StubMeetingRepository>,
      adapter:    SessionAdapter,
      engine:     MockEngine,
   }

   fn fixture(repository: StubMeetingRepository) -> Fixture {
      let repository = Arc::new(repository);
      let engine = MockEngine::new();
      let adapter = SessionAdapter::new(Arc::new(ConnectionAdapter::with_mock(engine.clone())));
      let sut = MeetingUseCaseImpl::new(
         repository.clone() as Arc<dyn MeetingRepository>,
         Arc::new(FixedClock::new(now())),
      );
      Fixture {
         sut,
         repository,
         adapter,
         engine,
      }
   }

   // ===== テストケース =====

   #[tokio::test]
   async fn test_create_meetingsは1つのトランザクションで保存して入力を返す() {
      let f = fixture(StubMeetingRepository::default());
      let mut session = f.adapter.acquire().await.unwrap();
      let input = vec![meeting(1, "Sync"), meeting(2, "Retro")];

      let response = f
         .sut
         .create_meetings(&f.adapter, &mut session, input.clone())
         .await
         .unwrap();

      assert_eq!(response, ApiResponse::ok(MEETINGS_CREATED, input));
      assert_eq!(f.engine.statements(), vec!["BEGIN", "COMMIT"]);
      assert_eq!(f.repository.stored.lock().unwrap().len(), 2);
      assert!(!f.adapter.in_transaction(&session));
   }

   #[tokio::test]
   async fn test_検証に失敗したらトランザクションを開始しない() {
      let f = fixture(StubMeetingRepository::default());
      let mut session = f.adapter.acquire().await.unwrap();

      let error = f
         .sut
         .create_meetings(&f.adapter, &mut session, vec![meeting(1, " ")])
         .await
         .unwrap_err();

      assert_eq!(error.status_code, 400);
      assert_eq!(error.fields[0].name, "title");
      assert!(f.engine.statements().is_empty());
   }

   #[tokio::test]
   async fn test_挿入に失敗したらロールバックして500を返す() {
      let f = fixture(StubMeetingRepository::failing_from(1));
      let mut session = f.adapter.acquire().await.unwrap();

      let error = f
         .sut
         .create_meetings(
            &f.adapter,
            &mut session,
            vec![meeting(1, "Sync"), meeting(2, "Retro")],
         )
         .await
         .unwrap_err();

      assert_eq!(error, ApiError::unexpected_error(None));
      assert_eq!(f.engine.statements(), vec!["BEGIN", "ROLLBACK"]);
      assert!(!f.adapter.in_transaction(&session));
   }

   #[tokio::test]
   async fn test_idが重複したらロールバックして409を返す() {
      let f = fixture(StubMeetingRepository::default());
      let mut session = f.adapter.acquire().await.unwrap();

      let error = f
         .sut
         .create_meetings(
            &f.adapter,
            &mut session,
            vec![meeting(7, "Sync"), meeting(7, "Retro")],
         )
         .await
         .unwrap_err();

      assert_eq!(
         error,
         ApiError::already_exists("Meeting", vec![FieldError::new("id", "7")])
      );
      assert_eq!(error.status_code, 409);
      assert_eq!(f.engine.statements(), vec!["BEGIN", "ROLLBACK"]);
   }

   #[tokio::test]
   async fn test_get_meetingsは保存済みの行をdtoにして返す() {
      let f = fixture(StubMeetingRepository::default());
      let mut session = f.adapter.acquire().await.unwrap();
      f.sut
         .create_meetings(&f.adapter, &mut session, vec![meeting(1, "Sync")])
         .await
         .unwrap();

      let response = f.sut.get_meetings(&mut session).await.unwrap();

      assert_eq!(response.status, 200);
      assert_eq!(response.message, MEETINGS_FETCHED);
      assert_eq!(response.data.len(), 1);
      let dto = &response.data[0];
      assert_eq!(dto.id, 1);
      assert_eq!(dto.title, "Sync");
      assert_eq!(dto.attendees, vec!["a@x.com"]);
      assert_eq!(dto.created_at, now());
   }
}
