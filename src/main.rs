use clap::Parser;
use discoverlens::{server, AnalyzerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Dual-pass image discovery and Discover-preview compatibility analyzer
#[derive(Debug, Parser)]
#[command(name = "discoverlens", version, about)]
struct Cli {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "127.0.0.1")]
    bind: String,

    /// Port to listen on
    #[arg(long, default_value_t = 5001)]
    port: u16,

    /// Directory for rotated log files; console-only when omitted
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Log filter, e.g. "info" or "discoverlens=debug"
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Retry budget for the rendering pass
    #[arg(long, default_value_t = 3)]
    render_attempts: u32,
}

/// Install console + optional daily-rolling file sinks.
///
/// The returned guard must stay alive for the process lifetime or buffered
/// file output is lost.
fn init_logging(
    log_level: &str,
    log_dir: Option<&PathBuf>,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    if let Some(dir) = log_dir {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!(
                "warn: could not create log directory '{}': {} — falling back to console only",
                dir.display(),
                e
            );
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new(log_level))
                .compact()
                .init();
            return None;
        }

        let appender = tracing_appender::rolling::daily(dir, "discoverlens.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        tracing_subscriber::registry()
            .with(EnvFilter::new(log_level))
            .with(fmt::layer().compact())
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .init();

        Some(guard)
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(log_level))
            .compact()
            .init();
        None
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let _log_guard = init_logging(&cli.log_level, cli.log_dir.as_ref());

    let config = Arc::new(AnalyzerConfig {
        max_render_attempts: cli.render_attempts,
        ..AnalyzerConfig::default()
    });

    let addr: SocketAddr = match format!("{}:{}", cli.bind, cli.port).parse() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("invalid bind address {}:{}: {}", cli.bind, cli.port, e);
            std::process::exit(2);
        }
    };

    let router = server::build_router(config);

    info!("listening on http://{}", addr);
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        eprintln!("server error: {}", e);
        std::process::exit(1);
    }
}
