//! # Pioneiros da Colina API サーバー
//!
//! ## 起動の流れ
//!
//! 1. `.env` の読み込みと設定の構築
//! 2. トレーシング初期化
//! 3. `WORKERS` 本のワーカースレッドで tokio ランタイムを構築
//! 4. データベースアダプタの作成とマイグレーション
//! 5. サーバー起動（Ctrl+C / SIGTERM でグレースフルシャットダウン）。
//!    `LOCAL=true` のときは `/openapi.json` と `/docs` も公開する
//! 6. データベースエンジンの停止
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境
//! LOCAL=true cargo run -p pioneiros-api
//!
//! # 本番環境
//! WORKERS=4 DB_HOST=db DB_PASSWORD=... cargo run -p pioneiros-api --release
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use pioneiros_api::{app_builder::build_app, config::AppConfig};
use pioneiros_domain::clock::SystemClock;
use pioneiros_infra::{
   db::{ConnectionAdapter, DatabaseAdapter, SessionAdapter},
   repository::PostgresMeetingRepository,
};
use pioneiros_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;

const SERVICE_NAME: &str = "pioneiros-api";

fn main() -> anyhow::Result<()> {
   // .env ファイルを読み込む（存在する場合）
   dotenvy::dotenv().ok();

   let config = AppConfig::from_env().context("設定の読み込みに失敗しました")?;

   init_tracing(&TracingConfig::new(
      SERVICE_NAME,
      config.log.format,
      config.log.level,
   ));

   tokio::runtime::Builder::new_multi_thread()
      .worker_threads(config.server.workers)
      .enable_all()
      .build()
      .context("tokio ランタイムの構築に失敗しました")?
      .block_on(serve(config))
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
   tracing::info!(
      service = SERVICE_NAME,
      local = config.local,
      workers = config.server.workers,
      database = %config.database.redacted_uri(),
      "サーバーを起動します"
   );

   let provider = Arc::new(ConnectionAdapter::new(config.database.clone()));
   provider
      .run_migrations()
      .await
      .context("マイグレーションの適用に失敗しました")?;
   let session_adapter = Arc::new(SessionAdapter::new(provider));

   let app = build_app(
      session_adapter.clone(),
      Arc::new(PostgresMeetingRepository::new()),
      Arc::new(SystemClock),
      config.local,
   );

   let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
      .parse()
      .context("アドレスのパースに失敗しました")?;
   let listener = TcpListener::bind(addr).await?;
   tracing::info!(%addr, "サーバーが起動しました");

   axum::serve(listener, app)
      .with_graceful_shutdown(shutdown_signal())
      .await?;

   session_adapter.shutdown().await;
   tracing::info!("サーバーを停止しました");
   Ok(())
}

/// Ctrl+C または SIGTERM を待つ
async fn shutdown_signal() {
   let ctrl_c = async {
      if let Err(e) = tokio::signal::ctrl_c().await {
         tracing::error!(error = %e, "Ctrl+C ハンドラの登録に失敗");
         std::future::pending::<()>().await;
      }
   };

   #[cfg(unix)]
   let terminate = async {
      match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
         Ok(mut signal) => {
            signal.recv().await;
         }
         Err(e) => {
            tracing::error!(error = %e, "SIGTERM ハンドラの登録に失敗");
            std::future::pending::<()>().await;
         }
      }
   };

   #[cfg(not(unix))]
   let terminate = std::future::pending::<()>();

   tokio::select! {
      _ = ctrl_c => {},
      _ = terminate => {},
   }

   tracing::info!("シャットダウンシグナルを受信");
}
