use {
    super::consumer::{
        ConsumeError,
        ConsumerGroup,
        Message,
        MessageHandler,
    },
    anyhow::anyhow,
    axum::async_trait,
    tokio::sync::{
        broadcast::{
            self,
            error::RecvError,
        },
        Mutex,
    },
    tokio_util::sync::CancellationToken,
};

/// In-process topic broker.
///
/// Every consumer group gets its own copy of the message stream and only sees the topics
/// it subscribed to.
#[derive(Clone, Debug)]
pub struct Broker {
    sender: broadcast::Sender<Message>,
    closed: CancellationToken,
}

impl Broker {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            closed: CancellationToken::new(),
        }
    }

    pub fn publish(&self, topic: &str, key: Option<String>, payload: Vec<u8>) -> anyhow::Result<()> {
        if self.closed.is_cancelled() {
            return Err(anyhow!("Broker is closed"));
        }
        let message = Message {
            topic: topic.to_string(),
            key,
            payload,
        };
        // No subscribed group is not an error, the message is simply not retained
        if self.sender.send(message).is_err() {
            tracing::debug!(topic = topic, "No consumer group subscribed, message dropped");
        }
        Ok(())
    }

    pub fn consumer_group(&self, group_id: &str, topics: Vec<String>) -> BrokerConsumerGroup {
        BrokerConsumerGroup {
            group_id: group_id.to_string(),
            topics,
            receiver: Mutex::new(self.sender.subscribe()),
            pending: Mutex::new(None),
            closed: self.closed.child_token(),
        }
    }

    pub fn close(&self) {
        self.closed.cancel();
    }
}

#[derive(Debug)]
pub struct BrokerConsumerGroup {
    group_id: String,
    topics:   Vec<String>,
    receiver: Mutex<broadcast::Receiver<Message>>,
    pending:  Mutex<Option<Message>>,
    closed:   CancellationToken,
}

impl BrokerConsumerGroup {
    pub fn close(&self) {
        self.closed.cancel();
    }

    async fn dispatch(
        &self,
        handler: &dyn MessageHandler,
        message: Message,
    ) -> Result<(), ConsumeError> {
        if let Err(err) = handler.handle(&message).await {
            *self.pending.lock().await = Some(message);
            return Err(ConsumeError::Transient(err));
        }
        Ok(())
    }
}

#[async_trait]
impl ConsumerGroup for BrokerConsumerGroup {
    async fn consume(
        &self,
        handler: &dyn MessageHandler,
        shutdown: &CancellationToken,
    ) -> Result<(), ConsumeError> {
        if self.closed.is_cancelled() {
            return Err(ConsumeError::Closed);
        }
        tracing::info!(group_id = self.group_id, topics = ?self.topics, "Starting consumption");
        let mut receiver = self.receiver.lock().await;

        let pending = self.pending.lock().await.take();
        if let Some(message) = pending {
            self.dispatch(handler, message).await?;
        }

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => return Ok(()),
                _ = self.closed.cancelled() => return Err(ConsumeError::Closed),
                received = receiver.recv() => match received {
                    Ok(message) => {
                        if self.topics.contains(&message.topic) {
                            self.dispatch(handler, message).await?;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        return Err(anyhow!(
                            "Consumer group {} lagged behind by {} messages",
                            self.group_id,
                            skipped
                        )
                        .into());
                    }
                    Err(RecvError::Closed) => return Err(ConsumeError::Closed),
                },
            }
        }
    }
}
