//! # セキュリティヘッダーミドルウェア
//!
//! ブラウザ向けのセキュリティヘッダーを全レスポンス（エラーを含む）に設定する。
//! ハンドラが同じヘッダーを設定していても上書きする。ただし
//! `Content-Security-Policy` だけはハンドラが設定した値を残す（`/docs` が外部アセットを読むため）。

use axum::{
   extract::Request,
   http::{HeaderName, HeaderValue, header},
   middleware::Next,
   response::Response,
};

/// 設定するヘッダーと値
pub const SECURITY_HEADERS: [(HeaderName, &str); 7] = [
   (header::STRICT_TRANSPORT_SECURITY, "max-age=31536000"),
   (header::X_FRAME_OPTIONS, "SAMEORIGIN"),
   (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
   (header::REFERRER_POLICY, "strict-origin-when-cross-origin"),
   (header::CACHE_CONTROL, "no-store"),
   (
      HeaderName::from_static("cross-origin-opener-policy"),
      "same-origin",
   ),
   (
      header::CONTENT_SECURITY_POLICY,
      "default-src 'self'; script-src 'self'; object-src 'none'; base-uri 'self'; frame-ancestors 'self'",
   ),
];

/// レスポンスにセキュリティヘッダーを付与する
pub async fn security_headers(request: Request, next: Next) -> Response {
   let mut response = next.run(request).await;
   let headers = response.headers_mut();
   for (name, value) in SECURITY_HEADERS {
      if name == header::CONTENT_SECURITY_POLICY && headers.contains_key(&name) {
         continue;
      }
      headers.insert(name, HeaderValue::from_static(value));
   }
   response
}

#[cfg(test)]
mod tests {
   use axum::{
      Router,
      body::Body,
      http::{Request, StatusCode},
      middleware::from_fn,
      response::IntoResponse,
      routing::get,
   };
   use pretty_assertions::assert_eq;
   use tower::ServiceExt;

   use super::*;

   fn create_test_app() -> Router {
      Router::new()
         .route("/ok", get(|| async { "ok" }))
         .route(
            "/cached",
            get(|| async { ([(header::CACHE_CONTROL, "max-age=60")], "cached") }),
         )
         .route(
            "/custom-csp",
            get(|| async { ([(header::CONTENT_SECURITY_POLICY, "default-src 'none'")], "csp") }),
         )
         .route(
            "/fail",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR.into_response() }),
         )
         .layer(from_fn(security_headers))
   }

   async fn get_response(uri: &str) -> Response {
      create_test_app()
         .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
         .await
         .unwrap()
   }

   #[tokio::test]
   async fn test_成功レスポンスにすべてのヘッダーが付く() {
      let response = get_response("/ok").await;

      for (name, value) in SECURITY_HEADERS {
         assert_eq!(response.headers().get(&name).unwrap(), value);
      }
   }

   #[tokio::test]
   async fn test_エラーレスポンスにもヘッダーが付く() {
      let response = get_response("/fail").await;

      assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
      assert_eq!(
         response.headers().get(header::X_FRAME_OPTIONS).unwrap(),
         "SAMEORIGIN"
      );
   }

   #[tokio::test]
   async fn test_ハンドラが設定したcache_controlは上書きされる() {
      let response = get_response("/cached").await;

      assert_eq!(
         response.headers().get(header::CACHE_CONTROL).unwrap(),
         "no-store"
      );
   }

   #[tokio::test]
   async fn test_ハンドラが設定したcspは残りそれ以外は付与される() {
      let response = get_response("/custom-csp").await;

      assert_eq!(
         response.headers().get(header::CONTENT_SECURITY_POLICY).unwrap(),
         "default-src 'none'"
      );
      assert_eq!(
         response.headers().get(header::X_FRAME_OPTIONS).unwrap(),
         "SAMEORIGIN"
      );
   }
}
