use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use triarb_config::EngineConfig;
use triarb_engine::Engine;
use triarb_exchange::{ExchangeClient, SimulatedExchange, SymbolInfo};

fn print_help() {
    eprintln!(
        r#"triarb-engine - triangular arbitrage engine

USAGE:
    triarb-engine --config <PATH>

OPTIONS:
    --config, -c <PATH>   Load the JSON engine configuration from PATH (required)
    --help, -h            Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG              Log level filter (default: info)
"#
    );
}

fn parse_args(args: &[String]) -> Result<String, ()> {
    let mut config_path: Option<String> = None;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return Err(());
            }
            "--config" | "-c" => {
                i += 1;
                let Some(path) = args.get(i) else {
                    eprintln!("Error: --config requires a path argument");
                    return Err(());
                };
                config_path = Some(path.clone());
            }
            arg => {
                eprintln!("Unknown argument: {arg}");
                print_help();
                return Err(());
            }
        }
        i += 1;
    }
    config_path.ok_or_else(|| {
        eprintln!("Error: --config is required");
        print_help();
    })
}

/// Stands in for the real exchange REST/websocket client, which is an
/// external collaborator outside this crate. Wires a
/// `SimulatedExchange` seeded with the configured base asset's obvious
/// triangle so the binary is runnable standalone; a production deployment
/// swaps this for a real `ExchangeClient` built from `config.api_key` /
/// `config.api_secret`.
fn build_exchange(config: &EngineConfig) -> Arc<dyn ExchangeClient> {
    let base = config.base_asset.as_str().to_string();
    let catalogue = vec![
        SymbolInfo {
            symbol: format!("BTC{base}"),
            status: "TRADING".to_string(),
            base: "BTC".to_string(),
            quote: base.clone(),
            base_precision: 8,
            quote_precision: 2,
            lot_step: Some(rust_decimal::Decimal::new(1, 5)),
        },
        SymbolInfo {
            symbol: format!("ETH{base}"),
            status: "TRADING".to_string(),
            base: "ETH".to_string(),
            quote: base,
            base_precision: 8,
            quote_precision: 2,
            lot_step: Some(rust_decimal::Decimal::new(1, 4)),
        },
        SymbolInfo {
            symbol: "ETHBTC".to_string(),
            status: "TRADING".to_string(),
            base: "ETH".to_string(),
            quote: "BTC".to_string(),
            base_precision: 8,
            quote_precision: 8,
            lot_step: Some(rust_decimal::Decimal::new(1, 5)),
        },
    ];
    SimulatedExchange::new(catalogue)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let config_path = match parse_args(&args) {
        Ok(path) => path,
        Err(()) => return ExitCode::FAILURE,
    };

    let config = match EngineConfig::load(&config_path) {
        Ok(config) => config,
        Err(err) => {
            log::error!("configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let exchange = build_exchange(&config);

    let engine = match Engine::start(&config, exchange) {
        Ok(engine) => engine,
        Err(err) => {
            log::error!("startup error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let stop = engine.stop_flag();
    if let Err(err) = ctrlc::set_handler(move || {
        log::info!("shutdown signal received");
        stop.store(true, Ordering::Relaxed);
    }) {
        log::warn!("failed to install SIGINT handler: {err}");
    }

    // Soft shutdown budget: 10s. The supervisor loop returns as soon as the
    // stop flag is observed; join() below is unbounded, since a deal already
    // in flight inside Executor must complete or fail explicitly, not be
    // killed mid-leg.
    engine.supervise();
    log::info!(
        "shutting down: {} deals executed, age stats {:?}",
        engine.executed_deals(),
        engine.ages()
    );
    engine.shutdown();

    ExitCode::SUCCESS
}
