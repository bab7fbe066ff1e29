use {
    crate::{
        api,
        auction::service::Service,
        config::{
            Config,
            RunOptions,
        },
        ingest::{
            PackageIngestHandler,
            DEFAULT_INGEST_TOPIC,
        },
        kernel::{
            broker::Broker,
            consumer::ReliableConsumer,
        },
        per_metrics,
        publisher::create_publisher,
        state::{
            ServerState,
            Store,
        },
    },
    anyhow::anyhow,
    axum_prometheus::metrics_exporter_prometheus::PrometheusBuilder,
    futures::future::join_all,
    sqlx::postgres::PgPoolOptions,
    std::{
        future::Future,
        sync::Arc,
    },
    tokio::task::JoinHandle,
    tokio_util::{
        sync::CancellationToken,
        task::TaskTracker,
    },
};

const DB_MAX_CONNECTIONS: u32 = 10;
const INGEST_CONSUMER_NAME: &str = "package-ingest";

/// Runs a long-lived task and stops the whole server if it fails.
fn spawn_service<F>(name: &'static str, shutdown: CancellationToken, task: F) -> JoinHandle<()>
where
    F: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(err) = task.await {
            tracing::error!(error = ?err, task = name, "Task failed, shutting down");
            shutdown.cancel();
        }
    })
}

pub async fn start_server(run_options: RunOptions) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            tracing::info!("Registered shutdown signal handler...");
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = ?err, "Failed to listen for the shutdown signal");
                return;
            }
            tracing::info!("Shut down signal received, waiting for tasks...");
            shutdown.cancel();
        }
    });

    let config = Config::load(&run_options.config.config).map_err(|err| {
        anyhow!(
            "Failed to load config from file({path}): {:?}",
            err,
            path = run_options.config.config
        )
    })?;

    let metrics_recorder = PrometheusBuilder::new().install_recorder()?;

    let pool = PgPoolOptions::new()
        .max_connections(DB_MAX_CONNECTIONS)
        .connect(&run_options.server.database_url)
        .await
        .map_err(|err| anyhow!("Failed to connect to the database: {:?}", err))?;
    sqlx::migrate!()
        .run(&pool)
        .await
        .map_err(|err| anyhow!("Failed to run migrations: {:?}", err))?;

    let broker = Broker::new(run_options.server.broker_capacity);
    let publisher = create_publisher(&config.publisher, broker.clone())?;
    let task_tracker = TaskTracker::new();
    let auction_service = Service::new(
        pool,
        publisher,
        config.auction.clone(),
        task_tracker.clone(),
        shutdown.clone(),
    );

    if auction_service.config().reconcile_on_startup {
        match auction_service.reconcile_auctions().await {
            Ok(report) => tracing::info!(
                rearmed = report.rearmed,
                closed = report.closed,
                "Reconciled auctions left by a previous run"
            ),
            Err(err) => tracing::error!(error = ?err, "Failed to reconcile auctions"),
        }
    }

    let consumer = ReliableConsumer::new(
        INGEST_CONSUMER_NAME,
        Arc::new(broker.consumer_group(&config.consumer.group_id, config.consumer.topics.clone())),
        Arc::new(PackageIngestHandler::new(auction_service.clone())),
        config.consumer.backoff,
    );
    let consumer_loop = tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            let exit = consumer.run(shutdown).await;
            tracing::info!(exit = ?exit, "Package ingest consumer stopped");
        }
    });

    let store = Arc::new(Store {
        auction_service,
        broker: broker.clone(),
        ingest_topic: config
            .consumer
            .topics
            .first()
            .cloned()
            .unwrap_or_else(|| DEFAULT_INGEST_TOPIC.to_string()),
    });
    let server_state = Arc::new(ServerState { metrics_recorder });

    let server_loop = spawn_service(
        "api",
        shutdown.clone(),
        api::start_api(run_options.clone(), store, shutdown.clone()),
    );
    let metrics_loop = spawn_service(
        "metrics",
        shutdown.clone(),
        per_metrics::start_metrics(run_options, server_state, shutdown.clone()),
    );
    join_all(vec![consumer_loop, server_loop, metrics_loop]).await;

    broker.close();
    task_tracker.close();
    tracing::info!(
        pending = task_tracker.len(),
        "Waiting for in-flight auction closes..."
    );
    task_tracker.wait().await;
    tracing::info!("Shutdown complete");
    Ok(())
}
