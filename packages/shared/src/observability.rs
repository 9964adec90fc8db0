//! # Observability 基盤
//!
//! トレーシング初期化とログ出力形式の設定を提供する。
//! `LOG_FORMAT` による JSON / Pretty 出力の切り替えと、
//! `LOG_LEVEL` によるデフォルトのログレベル指定に対応する。

use std::str::FromStr;

/// ログ出力形式
///
/// 値が不正な場合は [`Pretty`](LogFormat::Pretty) にフォールバックする。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
   /// JSON 形式（本番環境向け）
   Json,
   /// 人間が読みやすい形式（開発環境向け）
   #[default]
   Pretty,
}

impl LogFormat {
   /// 文字列からログ形式をパースする
   ///
   /// 不正な値の場合は [`Pretty`](LogFormat::Pretty) にフォールバックし、
   /// stderr に警告を出力する（この時点ではまだ subscriber が存在しない）。
   pub fn parse(s: &str) -> Self {
      match s {
         "json" => Self::Json,
         "pretty" => Self::Pretty,
         other => {
            eprintln!("WARNING: unknown LOG_FORMAT={other:?}, falling back to pretty");
            Self::Pretty
         }
      }
   }
}

/// ログレベル
///
/// `LOG_LEVEL` 環境変数の値（`debug` / `info` / `warning` / `error` / `critical`）。
/// tracing には `warning` と `critical` が無いため、それぞれ `warn` / `error` に読み替える。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
   Debug,
   #[default]
   Info,
   Warning,
   Error,
   Critical,
}

impl LogLevel {
   /// `EnvFilter` のディレクティブ文字列
   pub fn as_directive(&self) -> &'static str {
      match self {
         Self::Debug => "debug",
         Self::Info => "info",
         Self::Warning => "warn",
         Self::Error | Self::Critical => "error",
      }
   }
}

/// 未知のログレベル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLogLevel(pub String);

impl std::fmt::Display for UnknownLogLevel {
   fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
      write!(
         f,
         "unknown log level {:?} (expected debug, info, warning, error or critical)",
         self.0
      )
   }
}

impl std::error::Error for UnknownLogLevel {}

impl FromStr for LogLevel {
   type Err = UnknownLogLevel;

   fn from_str(s: &str) -> Result<Self, Self::Err> {
      match s.to_ascii_lowercase().as_str() {
         "debug" => Ok(Self::Debug),
         "info" => Ok(Self::Info),
         "warning" => Ok(Self::Warning),
         "error" => Ok(Self::Error),
         "critical" => Ok(Self::Critical),
         _ => Err(UnknownLogLevel(s.to_string())),
      }
   }
}

/// トレーシング初期化設定
#[derive(Debug, Clone)]
pub struct TracingConfig {
   /// サービス名（起動ログに出力）
   pub service_name: String,
   /// ログ出力形式
   pub log_format:   LogFormat,
   /// `RUST_LOG` 未設定時のログレベル
   pub log_level:    LogLevel,
}

impl TracingConfig {
   pub fn new(service_name: impl Into<String>, log_format: LogFormat, log_level: LogLevel) -> Self {
      Self {
         service_name: service_name.into(),
         log_format,
         log_level,
      }
   }

   /// `RUST_LOG` 未設定時に使うフィルタ文字列
   ///
   /// sqlx のクエリログは `sqlx=` ディレクティブで別途制御できるよう、
   /// 全体のレベルだけを指定する。
   pub fn default_filter(&self) -> String {
      self.log_level.as_directive().to_string()
   }
}

/// トレーシングを初期化する
///
/// `RUST_LOG` 環境変数が設定されていればそれを優先する。
/// 未設定の場合は [`TracingConfig::default_filter`] を使用する。
#[cfg(feature = "observability")]
pub fn init_tracing(config: &TracingConfig) {
   use tracing_subscriber::{Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

   let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
      .unwrap_or_else(|_| config.default_filter().into());

   let fmt_layer = match config.log_format {
      LogFormat::Json => tracing_subscriber::fmt::layer()
         .json()
         .flatten_event(true)
         .with_target(true)
         .with_current_span(true)
         .with_span_list(false)
         .boxed(),
      LogFormat::Pretty => tracing_subscriber::fmt::layer().boxed(),
   };

   tracing_subscriber::registry()
      .with(env_filter)
      .with(fmt_layer)
      .init();
}

#[cfg(test)]
mod tests {
   use pretty_assertions::assert_eq;

   use super::*;

   // ===== LogFormat::parse テスト =====

   #[test]
   fn test_parse_jsonでjsonを返す() {
      assert_eq!(LogFormat::parse("json"), LogFormat::Json);
   }

   #[test]
   fn test_parse_不正な値でprettyにフォールバックする() {
      assert_eq!(LogFormat::parse("unknown"), LogFormat::Pretty);
      assert_eq!(LogFormat::parse(""), LogFormat::Pretty);
      assert_eq!(LogFormat::parse("JSON"), LogFormat::Pretty);
   }

   // ===== LogLevel テスト =====

   #[test]
   fn test_log_levelは大文字小文字を区別せずパースする() {
      assert_eq!("DEBUG".parse::<LogLevel>(), Ok(LogLevel::Debug));
      assert_eq!("Warning".parse::<LogLevel>(), Ok(LogLevel::Warning));
      assert_eq!("critical".parse::<LogLevel>(), Ok(LogLevel::Critical));
   }

   #[test]
   fn test_log_levelの不正値はエラーになる() {
      assert_eq!(
         "verbose".parse::<LogLevel>(),
         Err(UnknownLogLevel("verbose".to_string()))
      );
   }

   #[test]
   fn test_warningとcriticalはtracingのディレクティブに読み替えられる() {
      assert_eq!(LogLevel::Warning.as_directive(), "warn");
      assert_eq!(LogLevel::Critical.as_directive(), "error");
   }

   #[test]
   fn test_default_filterはlog_levelから作られる() {
      let config = TracingConfig::new("api", LogFormat::Json, LogLevel::Debug);

      assert_eq!(config.service_name, "api");
      assert_eq!(config.default_filter(), "debug");
   }
}
