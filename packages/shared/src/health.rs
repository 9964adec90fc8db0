//! # ヘルスチェック共通型

use serde::{Deserialize, Serialize};

/// ヘルスチェックレスポンス
///
/// ```
/// use pioneiros_shared::HealthResponse;
///
/// assert_eq!(HealthResponse::ok().status, "ok");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthResponse {
   /// 稼働状態（常に `"ok"`）
   pub status: String,
}

impl HealthResponse {
   pub fn ok() -> Self {
      Self {
         status: "ok".to_string(),
      }
   }
}

#[cfg(test)]
mod tests {
   use super::*;

   #[test]
   fn test_health_responseのserializeで正しいjson形状にする() {
      let json = serde_json::to_value(HealthResponse::ok()).unwrap();

      assert_eq!(json, serde_json::json!({ "status": "ok" }));
   }
}
