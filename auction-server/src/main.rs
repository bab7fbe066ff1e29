use {
    anyhow::Result,
    clap::Parser,
    per_metrics::{
        is_metrics,
        MetricsLayer,
    },
    server::start_server,
    std::io::IsTerminal,
    tracing_subscriber::{
        filter::{
            self,
            LevelFilter,
        },
        layer::SubscriberExt,
        util::SubscriberInitExt,
        EnvFilter,
        Layer,
    },
};

mod api;
mod auction;
mod config;
mod ingest;
mod kernel;
mod per_metrics;
mod publisher;
mod server;
mod state;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize a Tracing Subscriber
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_file(false)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_ansi(std::io::stderr().is_terminal());
    let registry = tracing_subscriber::registry()
        .with(MetricsLayer.with_filter(filter::filter_fn(|metadata| is_metrics(metadata, false))));

    // Use the compact formatter if we're in a terminal, otherwise use the JSON formatter.
    if std::io::stderr().is_terminal() {
        registry
            .with(fmt_layer.compact().with_filter(env_filter))
            .try_init()?;
    } else {
        registry
            .with(fmt_layer.json().with_filter(env_filter))
            .try_init()?;
    }

    // Parse the command line arguments with clap, will exit automatically on `--help` or
    // with invalid arguments.
    match config::Options::parse() {
        config::Options::Run(opts) => start_server(opts).await,
    }
}
