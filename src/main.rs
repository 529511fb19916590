use anyhow::Result;
use clap::Parser;
use signal_decoder::{cli, config, openapi, routes, state};
use tokio::net::TcpListener;

fn init_tracing() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,signal_decoder=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    Ok(())
}

async fn bind_listener(addr: &str) -> Result<TcpListener> {
    TcpListener::bind(addr).await.map_err(|err| {
        if err.kind() == std::io::ErrorKind::AddrInUse {
            anyhow::anyhow!("{addr} is already in use; pass --host/--port to listen elsewhere")
        } else {
            anyhow::Error::new(err).context(format!("failed to bind signal-decoder on {addr}"))
        }
    })
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    if args.print_openapi {
        println!(
            "{}",
            serde_json::to_string_pretty(&openapi::openapi_json())?
        );
        return Ok(());
    }

    init_tracing()?;
    let config = config::DecoderConfig::from_env()?;
    tracing::info!(
        decode_timeout_ms = config.decode_timeout.map(|t| t.as_millis() as u64),
        max_solutions = config.max_solutions,
        "loaded decoder config"
    );

    let app = routes::router(state::AppState::new(config));
    let addr = format!("{}:{}", args.host, args.port);
    let listener = bind_listener(&addr).await?;
    tracing::info!(bind = %addr, "signal-decoder HTTP listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::bind_listener;

    #[tokio::test]
    async fn occupied_port_points_at_the_cli_flags() {
        let taken = bind_listener("127.0.0.1:0").await.expect("ephemeral port");
        let addr = taken.local_addr().expect("local addr").to_string();

        let message = bind_listener(&addr).await.unwrap_err().to_string();
        assert!(message.contains(&addr));
        assert!(message.contains("already in use"));
        assert!(message.contains("--port"));
    }
}
