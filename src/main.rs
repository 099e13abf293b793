use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use labhook::config::Config;
use labhook::gitlab::client::GitLabClient;
use labhook::handlers::default_router;
use labhook::router::dispatch::Dispatcher;
use labhook::{create_app, AppState, VERSION};

fn print_banner(addr: &SocketAddr, config: &Config) {
    let ip = addr.ip().to_string();
    let display_host = if addr.ip().is_unspecified() {
        "localhost"
    } else {
        ip.as_str()
    };
    println!();
    println!("  \x1b[36m╔══════════════════════════════════════════╗\x1b[0m");
    println!("  \x1b[36m║\x1b[0m  \x1b[1;35mlabhook\x1b[0m                                 \x1b[36m║\x1b[0m");
    println!("  \x1b[36m║\x1b[0m  \x1b[90mGitLab webhooks → handlers\x1b[0m              \x1b[36m║\x1b[0m");
    println!("  \x1b[36m╚══════════════════════════════════════════╝\x1b[0m");
    println!();
    println!(
        "  \x1b[32m→\x1b[0m Server running at \x1b[1;4mhttp://{}:{}\x1b[0m",
        display_host,
        addr.port()
    );
    println!("  \x1b[32m→\x1b[0m Version: \x1b[33m{}\x1b[0m", VERSION);
    println!("  \x1b[32m→\x1b[0m GitLab: \x1b[33m{}\x1b[0m", config.gitlab_url);
    println!();
    println!("  \x1b[90mEndpoints:\x1b[0m");
    println!("    \x1b[34mPOST\x1b[0m /                  \x1b[90m← GitLab events\x1b[0m");
    println!("    \x1b[32mGET \x1b[0m /health             \x1b[90m← JSON status\x1b[0m");
    println!();
    println!("  \x1b[90mPress Ctrl+C to stop\x1b[0m");
    println!();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("received shutdown signal");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    if config.webhook_secret.is_none() {
        warn!("GL_SECRET not set, webhook signatures will not be verified");
    }
    if config.access_token.is_none() {
        warn!("GL_ACCESS_TOKEN not set, GitLab API calls will be unauthenticated");
    }

    let gitlab = Arc::new(GitLabClient::from_config(&config)?);
    let router = default_router(&config);
    info!(routes = router.len(), "registered webhook handlers");

    let state = AppState::new(config.clone(), Dispatcher::new(Arc::new(router)), gitlab);
    let tasks = state.tasks.clone();
    let app = create_app(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    print_banner(&addr, &config);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if tasks.shutdown(config.shutdown_grace).await {
        info!("shutdown complete");
    } else {
        warn!("shutdown complete, some background dispatches were cancelled");
    }

    Ok(())
}
