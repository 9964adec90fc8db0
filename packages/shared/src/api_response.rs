//! # API レスポンスエンベロープ
//!
//! 成功レスポンスの統一形式 `{ "status": u16, "message": str, "data": T }` を提供する。

use serde::{Deserialize, Serialize};

/// 成功レスポンスの統一型
///
/// すべての成功レスポンスは `{ "status", "message", "data" }` 形式で返す。
/// `status` は HTTP ステータスと同じ値を入れる（クライアントがボディだけで判定できるように）。
///
/// ## 使用例
///
/// ```
/// use pioneiros_shared::ApiResponse;
///
/// let response = ApiResponse::ok("Meetings fetched successfully", vec!["a"]);
/// assert_eq!(response.status, 200);
/// assert_eq!(response.data, vec!["a"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiResponse<T> {
   pub status:  u16,
   pub message: String,
   pub data:    T,
}

impl<T> ApiResponse<T> {
   /// 新しい `ApiResponse` を作成する
   pub fn new(status: u16, message: impl Into<String>, data: T) -> Self {
      Self {
         status,
         message: message.into(),
         data,
      }
   }

   /// ステータス 200 の `ApiResponse` を作成する
   pub fn ok(message: impl Into<String>, data: T) -> Self {
      Self::new(200, message, data)
   }
}

#[cfg(test)]
mod tests {
   use pretty_assertions::assert_eq;

   use super::*;

   #[test]
   fn test_serializeを正しいjson形状にする() {
      let response = ApiResponse::ok("done", "hello");
      let json = serde_json::to_value(&response).unwrap();

      assert_eq!(
         json,
         serde_json::json!({ "status": 200, "message": "done", "data": "hello" })
      );
   }

   #[test]
   fn test_vecペイロードをシリアライズする() {
      let response = ApiResponse::new(201, "created", vec!["a", "b"]);
      let json = serde_json::to_value(&response).unwrap();

      assert_eq!(
         json,
         serde_json::json!({ "status": 201, "message": "created", "data": ["a", "b"] })
      );
   }

   #[test]
   fn test_deserializeでjsonからオブジェクトに変換する() {
      let json = r#"{"status": 200, "message": "ok", "data": [1, 2]}"#;
      let response: ApiResponse<Vec<i32>> = serde_json::from_str(json).unwrap();

      assert_eq!(response, ApiResponse::ok("ok", vec![1, 2]));
   }
}
