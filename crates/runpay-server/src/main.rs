//! `runpay-server` command line: `serve` and `check-config`

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use runpay_core::RunpayConfig;
use runpay_server::{start_server, telemetry::init_tracing, AppState};
use tracing::{info, warn};

fn cli() -> Command {
    let config_arg = Arg::new("config")
        .long("config")
        .short('c')
        .value_parser(value_parser!(PathBuf))
        .help("TOML config file; environment variables override it");

    Command::new("runpay-server")
        .version(runpay_core::VERSION)
        .about("Charity-run payment backend: orders, gateway callbacks, status lookup")
        .arg_required_else_help(false)
        .subcommand(
            Command::new("serve")
                .about("Run the HTTP server")
                .arg(config_arg.clone())
                .arg(
                    Arg::new("port")
                        .long("port")
                        .value_parser(value_parser!(u16))
                        .help("Port to bind (overrides RUNPAY_PORT)"),
                )
                .arg(
                    Arg::new("host")
                        .long("host")
                        .help("Address to bind (overrides RUNPAY_HOST)"),
                )
                .arg(
                    Arg::new("require-signed-orders")
                        .long("require-signed-orders")
                        .action(ArgAction::SetTrue)
                        .help("Refuse to start without a merchant private key"),
                )
                .arg(
                    Arg::new("log-json")
                        .long("log-json")
                        .action(ArgAction::SetTrue)
                        .help("Emit logs as JSON lines"),
                ),
        )
        .subcommand(
            Command::new("check-config")
                .about("Validate configuration and exit")
                .arg(config_arg),
        )
}

fn load_config(args: &ArgMatches) -> anyhow::Result<RunpayConfig> {
    let base = match args.get_one::<PathBuf>("config") {
        Some(path) => RunpayConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => RunpayConfig::new(),
    };
    Ok(base.apply_env()?)
}

fn apply_serve_flags(mut config: RunpayConfig, args: &ArgMatches) -> RunpayConfig {
    if let Some(port) = args.get_one::<u16>("port") {
        config = config.with_port(*port);
    }
    if let Some(host) = args.get_one::<String>("host") {
        config = config.with_host(host.clone());
    }
    if args.get_flag("require-signed-orders") {
        config.gateway.require_signed_orders = true;
    }
    config
}

async fn serve(args: &ArgMatches) -> anyhow::Result<()> {
    init_tracing(args.get_flag("log-json"));

    let config = apply_serve_flags(load_config(args)?, args);
    let warnings = config.validate().into_result()?;
    for warning in &warnings {
        warn!("{warning}");
    }

    let state = AppState::in_memory(config)?;
    info!("Initialized state");
    start_server(state).await
}

fn check_config(args: &ArgMatches) -> anyhow::Result<()> {
    let config = load_config(args)?;
    let report = config.validate();

    for warning in &report.warnings {
        println!("warning: {warning}");
    }
    for error in &report.errors {
        println!("error: {error}");
    }

    if !report.is_ok() {
        bail!("{} configuration error(s)", report.errors.len());
    }
    println!("Configuration OK (callback URL: {})", config.gateway.callback_url());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("check-config", args)) => check_config(args),
        Some(("serve", args)) => serve(args).await,
        _ => {
            // bare invocation serves with defaults from the environment
            let args = cli().get_matches_from(["runpay-server", "serve"]);
            match args.subcommand() {
                Some((_, serve_args)) => serve(serve_args).await,
                None => Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn serve_flags_override_config() {
        let matches = cli().get_matches_from([
            "runpay-server",
            "serve",
            "--port",
            "8088",
            "--host",
            "127.0.0.1",
            "--require-signed-orders",
        ]);
        let (_, args) = matches.subcommand().unwrap();
        let config = apply_serve_flags(RunpayConfig::new(), args);
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.gateway.require_signed_orders);
    }

    #[test]
    fn config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runpay.toml");
        std::fs::write(
            &path,
            "[gateway]\nmerchant_code = \"MERCH01\"\nsite_base_url = \"https://run.example.org\"\n",
        )
        .unwrap();

        let matches = cli().get_matches_from(["runpay-server", "check-config", "--config", path.to_str().unwrap()]);
        let (_, args) = matches.subcommand().unwrap();
        let config = load_config(args).unwrap();
        assert_eq!(config.gateway.merchant_code, "MERCH01");
    }
}
