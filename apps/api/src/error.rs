//! # API エラー定義
//!
//! アプリケーションで発生したエラーを HTTP レスポンスに変換する。
//!
//! ## レスポンス形式
//!
//! ```json
//! {
//!   "message": "Validation error",
//!   "detail": null,
//!   "fields": [{ "name": "title", "detail": "Title must not be empty" }],
//!   "status_code": 400
//! }
//! ```
//!
//! HTTP ステータスは `status_code` と同じ値にし、`X-Error` ヘッダーに `message` を入れる。
//!
//! ## エラー種別
//!
//! | コンストラクタ | ステータス |
//! |---------------|-----------|
//! | [`ApiError::environment_not_set`] | 500 |
//! | [`ApiError::does_not_exist`] | 404 |
//! | [`ApiError::already_exists`] | 409 |
//! | [`ApiError::unexpected_error`] | 500 |
//! | [`ApiError::unauthenticated`] | 401 |
//! | [`ApiError::unauthorized_error`] | 403 |
//! | [`ApiError::invalid_or_expired_token`] | 401 |
//! | [`ApiError::validation_error`] | 400 |

use axum::{
   Json,
   extract::rejection::JsonRejection,
   http::{HeaderName, HeaderValue, StatusCode},
   response::{IntoResponse, Response},
};
use pioneiros_domain::DomainError;
use pioneiros_infra::InfraError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// エラー内容を運ぶレスポンスヘッダー
pub const X_ERROR: HeaderName = HeaderName::from_static("x-error");

/// フィールド単位のエラー
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
   pub name:   String,
   pub detail: String,
}

impl FieldError {
   pub fn new(name: impl Into<String>, detail: impl Into<String>) -> Self {
      Self {
         name:   name.into(),
         detail: detail.into(),
      }
   }
}

/// API エラー
///
/// 発生した時点で作り、ハンドラの境界で一度だけレスポンスに変換する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
   pub message:     String,
   pub detail:      Option<String>,
   pub fields:      Vec<FieldError>,
   pub status_code: u16,
}

impl ApiError {
   /// 任意のステータスでエラーを作る（`status_code` 省略時は 400）
   pub fn new(
      message: impl Into<String>,
      detail: Option<String>,
      status_code: Option<StatusCode>,
      fields: Vec<FieldError>,
   ) -> Self {
      Self {
         message: message.into(),
         detail,
         fields,
         status_code: status_code.unwrap_or(StatusCode::BAD_REQUEST).as_u16(),
      }
   }

   pub fn environment_not_set(key: &str) -> Self {
      Self::new(
         "Environment variable not set",
         Some(format!("The env key {key} is unset")),
         Some(StatusCode::INTERNAL_SERVER_ERROR),
         Vec::new(),
      )
   }

   pub fn does_not_exist(object_name: &str) -> Self {
      Self::new(
         format!("{object_name} not found"),
         None,
         Some(StatusCode::NOT_FOUND),
         Vec::new(),
      )
   }

   pub fn already_exists(object_name: &str, fields: Vec<FieldError>) -> Self {
      Self::new(
         format!("{object_name} already exists"),
         None,
         Some(StatusCode::CONFLICT),
         fields,
      )
   }

   pub fn unexpected_error(detail: Option<String>) -> Self {
      Self::new(
         "An unexpected error occurred, talk to the tech team",
         detail,
         Some(StatusCode::INTERNAL_SERVER_ERROR),
         Vec::new(),
      )
   }

   pub fn unauthenticated() -> Self {
      Self::new(
         "You are not authenticated",
         None,
         Some(StatusCode::UNAUTHORIZED),
         Vec::new(),
      )
   }

   pub fn unauthorized_error() -> Self {
      Self::new(
         "You do not have permission to use this route",
         None,
         Some(StatusCode::FORBIDDEN),
         Vec::new(),
      )
   }

   pub fn invalid_or_expired_token() -> Self {
      Self::new(
         "Token is invalid or expired",
         None,
         Some(StatusCode::UNAUTHORIZED),
         Vec::new(),
      )
   }

   pub fn validation_error(
      message: impl Into<String>,
      fields: Vec<FieldError>,
      detail: Option<String>,
   ) -> Self {
      Self::new(message, detail, Some(StatusCode::BAD_REQUEST), fields)
   }

   /// HTTP ステータス
   ///
   /// `status_code` が HTTP ステータスとして不正なら 500 とする。
   pub fn status(&self) -> StatusCode {
      StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
   }
}

impl std::fmt::Display for ApiError {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      write!(f, "{} ({})", self.message, self.status_code)
   }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
   fn into_response(self) -> Response {
      let status = self.status();
      let header = HeaderValue::from_str(&self.message).ok();

      let mut response = (status, Json(self)).into_response();
      // 改行などヘッダーに入れられない文字を含むメッセージはヘッダーを省く
      if let Some(value) = header {
         response.headers_mut().insert(X_ERROR, value);
      }
      response
   }
}

// ===== 下位層のエラーからの変換 =====

impl From<InfraError> for ApiError {
   fn from(e: InfraError) -> Self {
      match e {
         InfraError::Conflict { entity, id } => {
            Self::already_exists(&entity, vec![FieldError::new("id", id)])
         }
         e => {
            // 内部エラーの詳細はログのみ
            tracing::error!(error = %e, "インフラ層でエラーが発生");
            Self::unexpected_error(None)
         }
      }
   }
}

impl From<DomainError> for ApiError {
   fn from(e: DomainError) -> Self {
      let fields = e
         .violations()
         .iter()
         .map(|v| FieldError::new(v.field, v.message.clone()))
         .collect();
      Self::validation_error("Validation error", fields, None)
   }
}

impl From<JsonRejection> for ApiError {
   fn from(rejection: JsonRejection) -> Self {
      Self::validation_error("Invalid request body", Vec::new(), Some(rejection.body_text()))
   }
}

/// 存在しないルートへのフォールバック
pub async fn route_not_found() -> ApiError {
   ApiError::does_not_exist("Route")
}
