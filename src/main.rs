//! Command-line access to a zkool wallet backend.
//!
//! `zkool-cli <operationName> [arg1] [arg2] ...` calls the named operation and prints its
//! result as JSON. Arguments are read as JSON literals where possible and as plain
//! strings otherwise.

use std::env;
use std::io;

use anyhow::anyhow;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, Layer};

use zkool_client::{
    remote::{Endpoint, Header, ENDPOINT_ENV},
    Dispatcher, Error, WalletClient,
};

#[derive(Debug, Parser)]
#[command(version, about)]
pub(crate) struct MyOptions {
    /// GraphQL endpoint of the wallet backend [default: $ZKOOL_ENDPOINT, then
    /// http://127.0.0.1:8000/graphql]
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Extra request header as NAME:VALUE; may be repeated
    #[arg(long = "header", value_name = "NAME:VALUE")]
    headers: Vec<String>,

    /// The operation to invoke, followed by its arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    #[arg(value_name = "OPERATION [ARGS]")]
    command: Vec<String>,
}

impl MyOptions {
    /// `--endpoint`, then the given `ZKOOL_ENDPOINT` value, then the default. Empty values
    /// count as unset.
    fn endpoint(&self, env_value: Option<&str>) -> anyhow::Result<Endpoint> {
        Endpoint::select(self.endpoint.as_deref(), env_value)
    }

    fn headers(&self) -> anyhow::Result<Vec<Header>> {
        self.headers.iter().map(|h| Header::parse(h)).collect()
    }
}

fn main() -> Result<(), anyhow::Error> {
    let opts = MyOptions::parse();

    let level_filter = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_owned());
    let stderr_logger = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_filter(tracing_subscriber::EnvFilter::from(level_filter));
    let subscriber = tracing_subscriber::registry().with(stderr_logger);
    tracing::subscriber::set_global_default(subscriber)?;

    // One command, one request at a time.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let endpoint = opts.endpoint(env::var(ENDPOINT_ENV).ok().as_deref())?;
    let dispatcher = Dispatcher::new(WalletClient::new(endpoint.connect(&opts.headers()?)?));
    let operation = opts.command.first().cloned().unwrap_or_default();

    match runtime.block_on(dispatcher.dispatch(&opts.command)) {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(e @ Error::MissingOperation) => Err(e.into()),
        Err(e @ Error::UnknownOperation(_)) => Err(anyhow!(
            "{}. Available operations: {}",
            e,
            dispatcher.operation_names().join(", ")
        )),
        Err(e) => Err(anyhow::Error::new(e)
            .context(format!("Error executing operation \"{operation}\""))),
    }
}
