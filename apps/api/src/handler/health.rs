//! # ヘルスチェックハンドラ
//!
//! ロードバランサーやコンテナオーケストレーターからの死活監視用エンドポイント。
//!
//! ```text
//! GET /health  →  200 {"status": "ok"}
//! ```
//!
//! データベースへの接続は確認せず、プロセスが応答できることだけを返す。

use axum::Json;
use pioneiros_shared::HealthResponse;

/// ヘルスチェックエンドポイント
#[utoipa::path(
   get,
   path = "/health",
   tag = "health",
   responses(
      (status = 200, description = "サーバー稼働中", body = HealthResponse)
   )
)]
pub async fn health_check() -> Json<HealthResponse> {
   Json(HealthResponse::ok())
}

#[cfg(test)]
mod tests {
   use axum::{
      Router,
      body::Body,
      http::{Request, StatusCode},
      routing::get,
   };
   use pretty_assertions::assert_eq;
   use tower::ServiceExt;

   use super::*;

   #[tokio::test]
   async fn test_health_checkは200とstatus_okを返す() {
      // Given
      let sut = Router::new().route("/health", get(health_check));

      // When
      let response = sut
         .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
         .await
         .unwrap();

      // Then
      assert_eq!(response.status(), StatusCode::OK);
      let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
         .await
         .unwrap();
      let body: HealthResponse = serde_json::from_slice(&bytes).unwrap();
      assert_eq!(body, HealthResponse::ok());
   }
}
