use bookshelf_bot::config::Config;
use bookshelf_bot::handler::WebhookHandler;
use bookshelf_bot::infrastructure::{lambda, storage};
use bookshelf_bot::services::telegram::TelegramClient;
use bookshelf_bot::{AppState, create_app};
use clap::{Parser, ValueEnum};
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Serve invocations from the AWS Lambda runtime API
    Lambda,
    /// Plain HTTP server for local development
    Server,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, value_enum, default_value_t = Mode::Lambda)]
    mode: Mode,

    /// Port for the local HTTP server
    #[arg(short, long, default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let args = Args::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bookshelf_bot=info,tower_http=info".into());
    match args.mode {
        // CloudWatch ingests one JSON object per line
        Mode::Lambda => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .without_time()
                    .with_current_span(false),
            )
            .init(),
        Mode::Server => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }

    info!("🚀 Starting Bookshelf Bot [Mode: {:?}]...", args.mode);

    let config = Config::from_env()?;
    info!(
        "📚 Config: Bucket={}, Max Size={}MB, Extensions={:?}, Public URL={}",
        config.bucket,
        config.max_file_size / 1024 / 1024,
        config.allowed_extensions,
        config.public_url.as_deref().unwrap_or("<from deployment event>")
    );

    let storage_service = storage::setup_storage(&config).await;
    let telegram = Arc::new(TelegramClient::new(&config)?);
    let handler = Arc::new(WebhookHandler::new(config, storage_service, telegram)?);

    match args.mode {
        Mode::Lambda => lambda::run(handler)
            .await
            .map_err(|e| anyhow::anyhow!("Lambda runtime error: {}", e))?,
        Mode::Server => serve(handler, args.port).await?,
    }

    info!("👋 Bookshelf Bot exited cleanly.");
    Ok(())
}

async fn serve(handler: Arc<WebhookHandler>, port: u16) -> anyhow::Result<()> {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &axum::http::Request<_>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
            )
        })
        .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
            info!("📥 {} {}", request.method(), request.uri());
        })
        .on_response(
            |response: &axum::http::Response<_>,
             latency: std::time::Duration,
             _span: &tracing::Span| {
                info!(
                    "📤 Finished in {:?} with status {}",
                    latency,
                    response.status()
                );
            },
        );

    let app = create_app(AppState { handler }).layer(trace_layer);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("✅ Server listening on: http://0.0.0.0:{}", port);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Server runtime error: {}", e);
        return Err(e.into());
    }

    info!("🛑 Server shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("⌨️  Ctrl+C received, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("💤 SIGTERM received, initiating graceful shutdown...");
        },
    }
}
