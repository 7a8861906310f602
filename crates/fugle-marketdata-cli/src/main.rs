/*
[INPUT]:  CLI arguments, YAML options file, FUGLE_* environment, OS shutdown signals
[OUTPUT]: Logged streaming frames or one printed REST response
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, startup flow, or shutdown handling
*/

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use fugle_marketdata::{
    ClientOptions, Event, EventKind, Market, RestClientFactory, WebSocketClientFactory,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fugle_marketdata_cli::{Cli, Command, load_options};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    info!(
        config_path = ?args.config_path,
        market = %args.command.market(),
        dry_run = args.dry_run,
        "starting fugle-stream"
    );

    let options = load_options(args.config_path.as_deref())?;
    info!(health_check = options.health_check.enabled, "options loaded");

    if args.dry_run {
        info!("dry-run requested; options validated");
        return Ok(());
    }

    match args.command {
        Command::Stream {
            market,
            channel,
            symbols,
        } => {
            let shutdown = CancellationToken::new();
            setup_signal_handlers(shutdown.clone());
            stream(options, market, &channel, &symbols, shutdown).await
        }
        Command::Get {
            market,
            path,
            params,
        } => get(options, market, &path, &params).await,
    }
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

async fn stream(
    options: ClientOptions,
    market: Market,
    channel: &str,
    symbols: &[String],
    shutdown: CancellationToken,
) -> Result<()> {
    let factory = WebSocketClientFactory::new(options).context("create websocket factory")?;
    let client = factory.client(market);

    client.on(EventKind::Message, |event| {
        if let Event::Message(raw) = event {
            info!(frame = %raw, "message");
        }
    });
    client.on(EventKind::Error, |event| {
        if let Event::Error(message) = event {
            warn!(error = %message, "stream error");
        }
    });
    let closed = shutdown.clone();
    client.on(EventKind::Disconnect, move |event| {
        if let Event::Disconnect { code, reason } = event {
            warn!(?code, reason = %reason, "stream closed");
        }
        closed.cancel();
    });

    client
        .connect()
        .await
        .with_context(|| format!("connect to {}", client.url()))?;
    info!(url = %client.url(), "authenticated");

    for symbol in symbols {
        client
            .subscribe(json!({ "channel": channel, "symbol": symbol }))
            .with_context(|| format!("subscribe {channel} {symbol}"))?;
        info!(channel, symbol = %symbol, "subscribed");
    }

    shutdown.cancelled().await;
    info!("shutdown signal received");
    client.disconnect();
    info!("stream shutdown complete");
    Ok(())
}

async fn get(
    options: ClientOptions,
    market: Market,
    path: &str,
    params: &[(String, String)],
) -> Result<()> {
    let factory = RestClientFactory::new(options).context("create rest factory")?;
    let params: Vec<(&str, &str)> = params
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();

    let body = match market {
        Market::Stock => factory.stock()?.client().request(path, &params).await,
        Market::FutOpt => factory.futopt()?.client().request(path, &params).await,
    }
    .with_context(|| format!("GET {market}/{path}"))?;

    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        shutdown_clone.cancel();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let shutdown_clone = shutdown.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown_clone.cancel();
                }
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }
}
