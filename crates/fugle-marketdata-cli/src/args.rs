/*
[INPUT]:  argv, optional YAML options file, FUGLE_* environment variables
[OUTPUT]: Cli / Command definitions and merged ClientOptions
[POS]:    CLI layer - argument parsing and option loading
[UPDATE]: When changing CLI flags or option precedence
*/

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use fugle_marketdata::{ClientOptions, Market};

#[derive(Parser, Debug)]
#[command(name = "fugle-stream", version, about = "Fugle market data streaming and REST client")]
pub struct Cli {
    /// YAML file with credentials, base URL and health check settings
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config_path: Option<PathBuf>,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info", global = true)]
    pub log_level: String,
    /// Validate options and exit
    #[arg(long = "dry-run", global = true)]
    pub dry_run: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Subscribe to a channel and log every frame until interrupted
    Stream {
        #[arg(long, default_value = "stock")]
        market: Market,
        #[arg(long, default_value = "trades")]
        channel: String,
        #[arg(long = "symbol", value_name = "SYMBOL", required = true)]
        symbols: Vec<String>,
    },
    /// Issue one REST request and print the JSON body
    Get {
        #[arg(long, default_value = "stock")]
        market: Market,
        /// Endpoint path below the market root, e.g. intraday/quote/2330
        path: String,
        #[arg(value_name = "KEY=VALUE", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
}

impl Command {
    pub fn market(&self) -> Market {
        match self {
            Command::Stream { market, .. } | Command::Get { market, .. } => *market,
        }
    }
}

/// Parse one `key=value` query parameter
pub fn parse_param(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("expected KEY=VALUE, got `{raw}`"))?;
    if key.is_empty() {
        return Err(anyhow!("empty parameter name in `{raw}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// File options win; environment fills whatever the file leaves unset.
pub fn load_options(config_path: Option<&Path>) -> Result<ClientOptions> {
    let env = ClientOptions::from_env();
    let options = match config_path {
        Some(path) => ClientOptions::from_file(path)
            .with_context(|| format!("load options from {}", path.display()))?
            .merge(env),
        None => env,
    };
    options.credential().context("resolve credential")?;
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fugle_marketdata::Credential;
    use tokio_test::assert_ok;

    #[test]
    fn test_parse_param() {
        assert_eq!(
            assert_ok!(parse_param("type=EQUITY")),
            ("type".to_string(), "EQUITY".to_string())
        );
        assert_eq!(
            assert_ok!(parse_param("from=2023-02-06")),
            ("from".to_string(), "2023-02-06".to_string())
        );
        assert_eq!(assert_ok!(parse_param("empty=")), ("empty".to_string(), String::new()));
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=x").is_err());
    }

    #[test]
    fn test_stream_command() {
        let cli = Cli::try_parse_from([
            "fugle-stream",
            "stream",
            "--market",
            "futopt",
            "--channel",
            "books",
            "--symbol",
            "TXFA4",
            "--symbol",
            "MXFA4",
        ])
        .unwrap();

        assert_eq!(cli.log_level, "info");
        assert!(cli.config_path.is_none());
        assert_eq!(
            cli.command,
            Command::Stream {
                market: Market::FutOpt,
                channel: "books".to_string(),
                symbols: vec!["TXFA4".to_string(), "MXFA4".to_string()],
            }
        );
    }

    #[test]
    fn test_stream_requires_symbol() {
        assert!(Cli::try_parse_from(["fugle-stream", "stream"]).is_err());
    }

    #[test]
    fn test_get_command_with_params() {
        let cli = Cli::try_parse_from([
            "fugle-stream",
            "--log-level",
            "debug",
            "get",
            "intraday/tickers",
            "type=EQUITY",
            "exchange=TWSE",
        ])
        .unwrap();

        assert_eq!(cli.log_level, "debug");
        assert_eq!(cli.command.market(), Market::Stock);
        match cli.command {
            Command::Get { path, params, .. } => {
                assert_eq!(path, "intraday/tickers");
                assert_eq!(
                    params,
                    vec![
                        ("type".to_string(), "EQUITY".to_string()),
                        ("exchange".to_string(), "TWSE".to_string()),
                    ]
                );
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_market_rejected() {
        assert!(Cli::try_parse_from(["fugle-stream", "get", "--market", "crypto", "x"]).is_err());
    }

    #[test]
    fn test_load_options_file_credential_wins() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/fugle.example.yaml");
        let options = assert_ok!(load_options(Some(path.as_path())));
        assert_eq!(
            assert_ok!(options.credential()),
            Credential::ApiKey("your-api-key".into())
        );
        assert!(options.health_check.enabled);
    }

    #[test]
    fn test_load_options_rejects_missing_file() {
        let err = load_options(Some(Path::new("/nonexistent/fugle.yaml"))).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/fugle.yaml"));
    }
}
