//! # ミーティングハンドラ
//!
//! ## エンドポイント
//!
//! - `GET /meetings/` - 保存済みミーティングの一覧
//! - `POST /meetings/` - ミーティングを 1 件作成し、1 要素のリストで返す

use std::sync::Arc;

use axum::{
   Json,
   extract::{State, rejection::JsonRejection},
   http::StatusCode,
   response::IntoResponse,
};
use pioneiros_domain::Meeting;
use pioneiros_infra::db::{DatabaseAdapter, DbSession, SessionAdapter};
use pioneiros_shared::ApiResponse;

use crate::{
   error::ApiError,
   usecase::{MeetingDto, MeetingUseCaseImpl},
};

/// ミーティング API の共有状態
pub struct MeetingState {
   pub session_adapter: Arc<SessionAdapter>,
   pub usecase:         MeetingUseCaseImpl,
}

/// GET /meetings/
#[utoipa::path(
   get,
   path = "/meetings/",
   tag = "meetings",
   responses(
      (status = 200, description = "保存済みミーティングの一覧", body = ApiResponse<Vec<MeetingDto>>),
      (status = 500, description = "予期しないエラー", body = ApiError)
   )
)]
pub async fn list_meetings(
   State(state): State<Arc<MeetingState>>,
) -> Result<impl IntoResponse, ApiError> {
   let adapter = state.session_adapter.as_ref();
   let mut session = adapter.acquire().await?;

   let result = state.usecase.get_meetings(&mut session).await;
   release(adapter, &mut session).await;

   Ok((StatusCode::OK, Json(result?)))
}

/// POST /meetings/
///
/// ## レスポンス
///
/// - `200 OK`: 受け取ったミーティングを 1 要素のリストで返す
/// - `400 Bad Request`: JSON が不正、または検証エラー
/// - `409 Conflict`: 識別子の重複
#[utoipa::path(
   post,
   path = "/meetings/",
   tag = "meetings",
   request_body = Meeting,
   responses(
      (status = 200, description = "作成したミーティング", body = ApiResponse<Vec<Meeting>>),
      (status = 400, description = "JSON が不正、または検証エラー", body = ApiError),
      (status = 409, description = "id が重複している", body = ApiError)
   )
)]
pub async fn create_meeting(
   State(state): State<Arc<MeetingState>>,
   payload: Result<Json<Meeting>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
   let Json(meeting) = payload?;
   let adapter = state.session_adapter.as_ref();
   let mut session = adapter.acquire().await?;

   let result = state
      .usecase
      .create_meetings(adapter, &mut session, vec![meeting])
      .await;
   release(adapter, &mut session).await;

   Ok((StatusCode::OK, Json(result?)))
}

/// セッションを解放する。失敗はログに残し、レスポンスには影響させない
async fn release(adapter: &SessionAdapter, session: &mut DbSession) {
   if let Err(e) = adapter.release(session).await {
      tracing::warn!(error = %e, "セッションの解放に失敗");
   }
}
