//! # アプリケーション構築
//!
//! DI（リポジトリ・ユースケース・State）の初期化とルーター構築を担当する。
//! `main.rs` は設定の読み込み、インフラ初期化、サーバー起動に集中する。

use std::sync::Arc;

use axum::{Router, middleware::from_fn, routing::get};
use pioneiros_domain::clock::Clock;
use pioneiros_infra::{db::SessionAdapter, repository::MeetingRepository};
use tower_http::trace::TraceLayer;

use crate::{
   error::route_not_found,
   handler::{MeetingState, create_meeting, health_check, list_meetings},
   middleware::security_headers,
   openapi::docs_router,
   usecase::MeetingUseCaseImpl,
};

/// ルーターを構築する
///
/// セキュリティヘッダーはフォールバック（404）を含むすべてのレスポンスに付く。
/// `serve_docs` が `true` のときだけ `/openapi.json` と `/docs` を公開する。
pub fn build_app(
   session_adapter: Arc<SessionAdapter>,
   meeting_repository: Arc<dyn MeetingRepository>,
   clock: Arc<dyn Clock>,
   serve_docs: bool,
) -> Router {
   let meeting_state = Arc::new(MeetingState {
      session_adapter,
      usecase: MeetingUseCaseImpl::new(meeting_repository, clock),
   });

   let meetings = Router::new()
      .route("/meetings/", get(list_meetings).post(create_meeting))
      .with_state(meeting_state);

   let mut router = Router::new()
      .route("/health", get(health_check))
      .merge(meetings);
   if serve_docs {
      router = router.merge(docs_router());
   }

   router
      .fallback(route_not_found)
      .layer(from_fn(security_headers))
      .layer(TraceLayer::new_for_http())
}
