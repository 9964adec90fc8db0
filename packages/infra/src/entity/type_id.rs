//! # TypeId（型付き識別子）
//!
//! `<prefix>_<suffix>` 形式の識別子。suffix は UUIDv7 を Crockford base32
//! （小文字）で 26 文字にエンコードしたもの。
//!
//! ```text
//! meeting_01h455vb4pex5vsknk084sn02q
//! └─┬───┘ └───────────┬────────────┘
//!  prefix        UUIDv7 (base32)
//! ```
//!
//! DB には `VARCHAR(36)` として保存するため、prefix は 9 文字以内に制限する。

use std::{fmt, str::FromStr};

use sqlx::{
   Decode,
   Encode,
   Postgres,
   Type,
   encode::IsNull,
   error::BoxDynError,
   postgres::{PgArgumentBuffer, PgTypeInfo, PgValueRef},
};
use thiserror::Error;
use uuid::Uuid;

const ALPHABET: &[u8; 32] = b"0123456789abcdefghjkmnpqrstvwxyz";
const SUFFIX_LENGTH: usize = 26;

/// prefix の最大長（`VARCHAR(36)` - 区切り 1 文字 - suffix 26 文字）
pub const MAX_PREFIX_LENGTH: usize = 9;

/// TypeId の生成・解析エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeIdError {
   #[error("prefix が不正です: {0:?}")]
   InvalidPrefix(String),

   #[error("suffix が不正です: {0:?}")]
   InvalidSuffix(String),

   #[error("区切り文字 '_' がありません: {0:?}")]
   MissingSeparator(String),
}

/// 型付き識別子
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeId {
   prefix: String,
   uuid:   Uuid,
}

impl TypeId {
   /// 新しい UUIDv7 で識別子を生成する
   pub fn new(prefix: &str) -> Result<Self, TypeIdError> {
      Self::from_uuid(prefix, Uuid::now_v7())
   }

   pub fn from_uuid(prefix: &str, uuid: Uuid) -> Result<Self, TypeIdError> {
      validate_prefix(prefix)?;
      Ok(Self {
         prefix: prefix.to_string(),
         uuid,
      })
   }

   pub fn prefix(&self) -> &str {
      &self.prefix
   }

   pub fn uuid(&self) -> Uuid {
      self.uuid
   }

   pub fn suffix(&self) -> String {
      encode_suffix(self.uuid.as_u128())
   }
}

fn validate_prefix(prefix: &str) -> Result<(), TypeIdError> {
   let valid = !prefix.is_empty()
      && prefix.len() <= MAX_PREFIX_LENGTH
      && prefix.bytes().all(|b| b.is_ascii_lowercase() || b == b'_')
      && !prefix.starts_with('_')
      && !prefix.ends_with('_');

   if valid {
      Ok(())
   } else {
      Err(TypeIdError::InvalidPrefix(prefix.to_string()))
   }
}

/// 128 ビットを 26 文字に詰める（先頭文字は上位 3 ビットのみを表す）
fn encode_suffix(value: u128) -> String {
   (0..SUFFIX_LENGTH)
      .map(|i| {
         let shift = 5 * (SUFFIX_LENGTH - 1 - i);
         ALPHABET[((value >> shift) & 0x1f) as usize] as char
      })
      .collect()
}

fn decode_suffix(suffix: &str) -> Result<u128, TypeIdError> {
   let invalid = || TypeIdError::InvalidSuffix(suffix.to_string());

   if suffix.len() != SUFFIX_LENGTH {
      return Err(invalid());
   }

   let mut value: u128 = 0;
   for (i, byte) in suffix.bytes().enumerate() {
      let digit = ALPHABET
         .iter()
         .position(|&c| c == byte)
         .ok_or_else(invalid)? as u128;
      // 先頭文字が 7 を超えると 128 ビットに収まらない
      if i == 0 && digit > 7 {
         return Err(invalid());
      }
      value = (value << 5) | digit;
   }
   Ok(value)
}

impl fmt::Display for TypeId {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      write!(f, "{}_{}", self.prefix, self.suffix())
   }
}

impl FromStr for TypeId {
   type Err = TypeIdError;

   fn from_str(s: &str) -> Result<Self, Self::Err> {
      let (prefix, suffix) = s
         .rsplit_once('_')
         .ok_or_else(|| TypeIdError::MissingSeparator(s.to_string()))?;
      let value = decode_suffix(suffix)?;
      Self::from_uuid(prefix, Uuid::from_u128(value))
   }
}

// ===== sqlx（テキストとして保存） =====

impl Type<Postgres> for TypeId {
   fn type_info() -> PgTypeInfo {
      <String as Type<Postgres>>::type_info()
   }

   fn compatible(ty: &PgTypeInfo) -> bool {
      <String as Type<Postgres>>::compatible(ty)
   }
}

impl<'q> Encode<'q, Postgres> for TypeId {
   fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
      <String as Encode<'q, Postgres>>::encode(self.to_string(), buf)
   }
}

impl<'r> Decode<'r, Postgres> for TypeId {
   fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
      let text = <&str as Decode<'r, Postgres>>::decode(value)?;
      Ok(text.parse()?)
   }
}
