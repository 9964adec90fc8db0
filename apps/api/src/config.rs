//! # アプリケーション設定
//!
//! 環境変数からアプリケーション設定を読み込む。
//!
//! ## 設計方針
//!
//! [12-Factor App](https://12factor.net/ja/config) の原則に従い、
//! すべての設定を環境変数から読み込む。すべての項目にデフォルト値があり、
//! 値が解釈できない場合だけ起動時にエラーにする。
//!
//! ## 環境変数一覧
//!
//! | 変数名 | デフォルト | 説明 |
//! |--------|------------|------|
//! | `LOCAL` | `false` | ローカル開発（Pretty ログ、SQL ログ出力） |
//! | `LOG_LEVEL` | `info` | `debug` / `info` / `warning` / `error` / `critical` |
//! | `LOG_FORMAT` | `LOCAL` なら `pretty`、それ以外は `json` | ログ出力形式 |
//! | `SERVER_HOST` | `0.0.0.0` | バインドアドレス |
//! | `SERVER_PORT` | `8000` | ポート番号 |
//! | `WORKERS` | `1` | tokio のワーカースレッド数 |
//! | `DB_HOST` | `localhost` | PostgreSQL ホスト |
//! | `DB_PORT` | `5432` | PostgreSQL ポート |
//! | `DB_NAME` | `postgres` | データベース名 |
//! | `DB_USER` | `postgres` | ユーザー名 |
//! | `DB_PASSWORD` | `postgres` | パスワード |
//! | `DB_POOL_SIZE` | `10` | 接続プールのサイズ |
//! | `DB_POOL_MAX_OVERFLOW` | `5` | プールサイズを超えて開ける接続数 |
//! | `DB_POOL_RECYCLE` | `3600` | 接続の最大寿命（秒） |
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use pioneiros_api::config::AppConfig;
//!
//! dotenvy::dotenv().ok();
//! let config = AppConfig::from_env()?;
//!
//! println!("サーバー: {}:{}", config.server.host, config.server.port);
//! ```

use std::{env, fmt::Display, str::FromStr, time::Duration};

use pioneiros_infra::{DatabaseConfig, PoolConfig};
use pioneiros_shared::observability::{LogFormat, LogLevel};
use thiserror::Error;

/// 設定の読み込みエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
   /// 値を解釈できない
   #[error("環境変数 {key} の値 {value:?} が不正です: {reason}")]
   InvalidValue {
      key:    &'static str,
      value:  String,
      reason: String,
   },
}

/// HTTP サーバー設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
   /// バインドアドレス（例: `0.0.0.0`, `127.0.0.1`）
   pub host:    String,
   /// ポート番号
   pub port:    u16,
   /// tokio のワーカースレッド数
   pub workers: usize,
}

/// ログ設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
   pub level:  LogLevel,
   pub format: LogFormat,
}

/// アプリケーション全体の設定
///
/// アプリケーション起動時に一度だけ構築し、各コンポーネントに渡す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
   /// ローカル開発モード
   pub local:    bool,
   pub log:      LogConfig,
   pub server:   ServerConfig,
   pub database: DatabaseConfig,
}

impl AppConfig {
   /// 環境変数から設定を読み込む
   pub fn from_env() -> Result<Self, ConfigError> {
      Self::from_lookup(|key| env::var(key).ok())
   }

   /// 任意のキー検索関数から設定を読み込む
   ///
   /// テストでは `HashMap` などを渡してプロセスの環境変数に触れずに検証する。
   pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
   where
      F: Fn(&str) -> Option<String>,
   {
      let vars = Vars { lookup };

      let local = vars.bool_or("LOCAL", false)?;
      let default_format = if local { "pretty" } else { "json" };

      let log = LogConfig {
         level:  vars.parse_or("LOG_LEVEL", LogLevel::Info)?,
         format: LogFormat::parse(&vars.string_or("LOG_FORMAT", default_format)),
      };

      let server = ServerConfig {
         host:    vars.string_or("SERVER_HOST", "0.0.0.0"),
         port:    vars.parse_or("SERVER_PORT", 8000)?,
         workers: vars.parse_or("WORKERS", 1)?,
      };

      let defaults = DatabaseConfig::default();
      let pool_defaults = PoolConfig::default();
      let database = DatabaseConfig {
         host:     vars.string_or("DB_HOST", &defaults.host),
         port:     vars.parse_or("DB_PORT", defaults.port)?,
         user:     vars.string_or("DB_USER", &defaults.user),
         password: vars.string_or("DB_PASSWORD", &defaults.password),
         name:     vars.string_or("DB_NAME", &defaults.name),
         pool:     PoolConfig {
            size:         vars.parse_or("DB_POOL_SIZE", pool_defaults.size)?,
            max_overflow: vars.parse_or("DB_POOL_MAX_OVERFLOW", pool_defaults.max_overflow)?,
            recycle:      Duration::from_secs(
               vars.parse_or("DB_POOL_RECYCLE", pool_defaults.recycle.as_secs())?,
            ),
         },
         debug:    local,
      };

      if server.workers == 0 {
         return Err(ConfigError::InvalidValue {
            key:    "WORKERS",
            value:  "0".to_string(),
            reason: "1 以上を指定してください".to_string(),
         });
      }

      Ok(Self {
         local,
         log,
         server,
         database,
      })
   }
}

/// 環境変数の読み出しヘルパー
struct Vars<F> {
   lookup: F,
}

impl<F> Vars<F>
where
   F: Fn(&str) -> Option<String>,
{
   /// 値を取得する（空文字列は未設定として扱う）
   fn get(&self, key: &str) -> Option<String> {
      (self.lookup)(key).filter(|v| !v.trim().is_empty())
   }

   fn string_or(&self, key: &str, default: &str) -> String {
      self.get(key).unwrap_or_else(|| default.to_string())
   }

   fn parse_or<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
   where
      T: FromStr,
      T::Err: Display,
   {
      match self.get(key) {
         None => Ok(default),
         Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            value: raw.clone(),
            reason: e.to_string(),
         }),
      }
   }

   fn bool_or(&self, key: &'static str, default: bool) -> Result<bool, ConfigError> {
      match self.get(key) {
         None => Ok(default),
         Some(raw) => parse_bool(&raw).ok_or_else(|| ConfigError::InvalidValue {
            key,
            value: raw.clone(),
            reason: "真偽値として解釈できません".to_string(),
         }),
      }
   }
}

/// 真偽値を解釈する（大文字小文字は区別しない）
fn parse_bool(raw: &str) -> Option<bool> {
   match raw.trim().to_ascii_lowercase().as_str() {
      "1" | "true" | "yes" | "y" | "t" | "on" => Some(true),
      "0" | "false" | "no" | "n" | "f" | "off" => Some(false),
      _ => None,
   }
}
