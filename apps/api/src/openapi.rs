//! # OpenAPI 仕様とドキュメント画面
//!
//! utoipa でハンドラと型から OpenAPI 仕様を生成する。
//! ローカル環境（`LOCAL=true`）でのみ次のルートを公開する。
//!
//! - `GET /openapi.json` - OpenAPI 仕様
//! - `GET /docs` - Swagger UI（アセットは jsDelivr から読み込む）

use axum::{
   Json,
   Router,
   http::header,
   response::{Html, IntoResponse},
   routing::get,
};
use utoipa::OpenApi;

use crate::{
   error::{ApiError, FieldError},
   handler::{health, meeting},
};

#[derive(OpenApi)]
#[openapi(
   info(
      title = "Pioneiros da Colina",
      version = "0.1.0",
      description = "Pioneiros da Colina API for pathfinders management",
      contact(
         name = "Pioneiros da colina",
         email = "dev@rezendevitor.gmail.com",
         url = "https://clubes.adventistas.org/br/aps/14062/pioneiros-da-colina/"
      )
   ),
   paths(
      health::health_check,
      meeting::list_meetings,
      meeting::create_meeting,
   ),
   components(schemas(ApiError, FieldError)),
   tags(
      (name = "health", description = "ヘルスチェック"),
      (name = "meetings", description = "ミーティング管理"),
   )
)]
pub struct ApiDoc;

/// Swagger UI 用の Content-Security-Policy
///
/// セキュリティヘッダーミドルウェアはハンドラが設定した CSP を残す。
pub const DOCS_CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
   script-src 'self' 'unsafe-inline' https://cdn.jsdelivr.net; \
   style-src 'self' https://cdn.jsdelivr.net; img-src 'self' data:; \
   object-src 'none'; base-uri 'self'; frame-ancestors 'self'";

const SWAGGER_UI_HTML: &str = r##"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Pioneiros da Colina - Swagger UI</title>
  <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    window.ui = SwaggerUIBundle({ url: "/openapi.json", dom_id: "#swagger-ui" });
  </script>
</body>
</html>
"##;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
   Json(ApiDoc::openapi())
}

async fn swagger_ui() -> impl IntoResponse {
   (
      [(header::CONTENT_SECURITY_POLICY, DOCS_CONTENT_SECURITY_POLICY)],
      Html(SWAGGER_UI_HTML),
   )
}

/// `/openapi.json` と `/docs` のルーター
pub fn docs_router<S>() -> Router<S>
where
   S: Clone + Send + Sync + 'static,
{
   Router::new()
      .route("/openapi.json", get(openapi_json))
      .route("/docs", get(swagger_ui))
}
