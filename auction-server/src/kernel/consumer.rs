use {
    super::backoff::BackoffPolicy,
    axum::async_trait,
    axum_prometheus::metrics,
    std::sync::Arc,
    tokio::time::Instant,
    tokio_util::sync::CancellationToken,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub topic:   String,
    pub key:     Option<String>,
    pub payload: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConsumeError {
    /// The group was closed on purpose and will never deliver again.
    #[error("consumer group is closed")]
    Closed,
    #[error("consumption failed: {0:?}")]
    Transient(#[from] anyhow::Error),
}

#[async_trait]
pub trait MessageHandler: Send + Sync + 'static {
    /// An error keeps the message pending so it is delivered again.
    async fn handle(&self, message: &Message) -> anyhow::Result<()>;
}

#[async_trait]
pub trait ConsumerGroup: Send + Sync + 'static {
    /// Runs one consumption session, feeding messages to `handler` until the session
    /// ends. Returns `Ok` when `shutdown` is observed.
    async fn consume(
        &self,
        handler: &dyn MessageHandler,
        shutdown: &CancellationToken,
    ) -> Result<(), ConsumeError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerExit {
    Cancelled,
    GroupClosed,
}

/// Keeps a consumer group session alive across transient failures.
pub struct ReliableConsumer {
    name:    String,
    group:   Arc<dyn ConsumerGroup>,
    handler: Arc<dyn MessageHandler>,
    backoff: BackoffPolicy,
}

impl ReliableConsumer {
    pub fn new(
        name: impl Into<String>,
        group: Arc<dyn ConsumerGroup>,
        handler: Arc<dyn MessageHandler>,
        backoff: BackoffPolicy,
    ) -> Self {
        Self {
            name: name.into(),
            group,
            handler,
            backoff,
        }
    }

    #[tracing::instrument(skip_all, fields(consumer = %self.name))]
    pub async fn run(&self, shutdown: CancellationToken) -> ConsumerExit {
        tracing::info!("Starting consumer...");
        let mut retry_count: u32 = 0;
        loop {
            if shutdown.is_cancelled() {
                tracing::info!("Shutting down consumer...");
                return ConsumerExit::Cancelled;
            }

            let started_at = Instant::now();
            let result = self.group.consume(self.handler.as_ref(), &shutdown).await;
            metrics::histogram!("consumer_session_duration_seconds", "consumer" => self.name.clone())
                .record(started_at.elapsed().as_secs_f64());

            match result {
                Ok(()) => retry_count = 0,
                Err(ConsumeError::Closed) => {
                    tracing::warn!("Consumer group closed, exiting");
                    return ConsumerExit::GroupClosed;
                }
                Err(ConsumeError::Transient(err)) => {
                    retry_count = retry_count.saturating_add(1);
                    let delay = self.backoff.delay(retry_count);
                    metrics::counter!("consumer_retries_total", "consumer" => self.name.clone())
                        .increment(1);
                    tracing::error!(
                        error = ?err,
                        retry_attempt = retry_count,
                        retry_in_seconds = delay.as_secs_f64(),
                        "Consume error, will retry"
                    );
                    tokio::select! {
                        _ = shutdown.cancelled() => {
                            tracing::info!("Shutting down consumer during backoff...");
                            return ConsumerExit::Cancelled;
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }
}
