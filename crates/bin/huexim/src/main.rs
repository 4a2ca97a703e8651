//! # huexim — Hue cloud driver CLI
//!
//! Composition root that wires the Hue cloud adapters into the driver entry
//! points and runs one of them.
//!
//! ## Responsibilities
//! - Parse command-line arguments and configuration (file, env vars)
//! - Initialise logging on stderr
//! - Construct the vendor cloud and auth service clients (adapters)
//! - Read one options document from a file or stdin, run the requested entry
//!   point and print the callback payload on stdout
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use huexim_adapter_hue_cloud::{AuthServiceClient, HueCloudClient};
use huexim_app::driver::{EntryPoint, XimDriver};
use huexim_app::ports::{BridgeApi, TokenService};
use huexim_domain::error::{ErrorCode, XimResult};
use huexim_domain::options::{XimOptions, XimResponse};
use serde_json::{Map, Value, json};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "huexim", version)]
#[command(about = "Runs one Hue cloud driver entry point and prints its callback payload")]
struct Cli {
    /// Config file; `huexim.toml` in the working directory when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Options JSON document; read from stdin when omitted
    #[arg(short, long)]
    options: Option<PathBuf>,
    /// authenticate, discovery, action, stat or unlink
    entry: EntryPoint,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    setup_tracing(&config.logging.filter);

    let input = read_options(cli.options.as_deref()).context("reading options document")?;

    let bridge = HueCloudClient::new(&config.hue).context("building vendor cloud client")?;
    let tokens = AuthServiceClient::new(&config.hue).context("building auth service client")?;
    let driver = XimDriver::new(bridge, tokens);

    let payload = dispatch(&driver, cli.entry, &input).await;
    println!("{payload}");
    Ok(())
}

fn setup_tracing(filter: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(filter).unwrap_or_else(|err| {
        eprintln!("invalid log filter {filter:?} ({err}), falling back to info");
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_options(path: Option<&Path>) -> std::io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

/// Run `entry` on the raw options document and render the callback payload.
async fn dispatch<B, T>(driver: &XimDriver<B, T>, entry: EntryPoint, input: &str) -> Value
where
    B: BridgeApi + Clone,
    T: TokenService,
{
    let options = match XimOptions::from_json(input) {
        Ok(options) => options,
        Err(err) => {
            tracing::warn!(entry = %entry, error = %err, "malformed options document");
            let result = XimResult::new(ErrorCode::RequestFailed, format!("fail: {err}"));
            let echoed = XimOptions {
                extra: serde_json::from_str::<Map<String, Value>>(input).unwrap_or_default(),
                ..XimOptions::default()
            };
            return render(&XimResponse::from_options(&echoed, result));
        }
    };

    let mut payload = Value::Null;
    driver
        .invoke(entry, &options, |response| payload = render(&response))
        .await;
    payload
}

fn render(response: &XimResponse) -> Value {
    response.to_value().unwrap_or_else(|err| {
        tracing::error!(error = %err, "payload could not be serialized");
        json!({ "result": XimResult::new(ErrorCode::RequestFailed, format!("fail: {err}")) })
    })
}
