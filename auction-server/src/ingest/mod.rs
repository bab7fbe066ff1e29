use {
    crate::{
        api::RestError,
        auction::{
            entities,
            service::{
                add_package::AddPackageInput,
                start_auction::StartAuctionInput,
                Service,
            },
        },
        kernel::consumer::{
            Message,
            MessageHandler,
        },
    },
    anyhow::anyhow,
    axum::async_trait,
    delivery_auction_api_types::package::ExpiredPackageEvent,
    time::OffsetDateTime,
};

pub const DEFAULT_INGEST_TOPIC: &str = "expired-packages";

/// Turns expired-package events into auctions.
///
/// Only an unreachable store fails a message, so that it is delivered again after a backoff.
/// Malformed payloads and business rejections are logged and acknowledged.
pub struct PackageIngestHandler {
    service: Service,
}

impl PackageIngestHandler {
    pub fn new(service: Service) -> Self {
        Self { service }
    }

    async fn ingest(&self, event: ExpiredPackageEvent) -> anyhow::Result<()> {
        let package_id = event.package_id.clone();
        match self
            .service
            .add_package(AddPackageInput {
                package: expired_package(event, OffsetDateTime::now_utc()),
            })
            .await
        {
            Ok(_) => {}
            Err(RestError::TemporarilyUnavailable) => {
                return Err(anyhow!("Failed to store package {}", package_id));
            }
            Err(err) => {
                tracing::warn!(package_id, error = ?err, "Expired package rejected");
                return Ok(());
            }
        }

        match self
            .service
            .start_auction(StartAuctionInput {
                package_id: package_id.clone(),
            })
            .await
        {
            Ok(_) => Ok(()),
            Err(RestError::TemporarilyUnavailable) => {
                Err(anyhow!("Failed to start auction for package {}", package_id))
            }
            Err(err) => {
                tracing::info!(package_id, reason = ?err, "Auction not started");
                Ok(())
            }
        }
    }
}

#[async_trait]
impl MessageHandler for PackageIngestHandler {
    #[tracing::instrument(skip_all, fields(topic = %message.topic, key = ?message.key))]
    async fn handle(&self, message: &Message) -> anyhow::Result<()> {
        let event: ExpiredPackageEvent = match serde_json::from_slice(&message.payload) {
            Ok(event) => event,
            Err(err) => {
                tracing::error!(error = ?err, "Failed to decode expired package event, skipping");
                return Ok(());
            }
        };
        self.ingest(event).await
    }
}

/// An expired package enters the auction flow as a new Waiting package, whatever status the
/// upstream service reported. `updated_at` is the ingest time since the auction deadline is
/// counted from it.
fn expired_package(event: ExpiredPackageEvent, ingested_at: OffsetDateTime) -> entities::Package {
    entities::Package {
        id:             event.package_id,
        status:         entities::PackageStatus::Waiting,
        from:           event.from,
        to:             event.to,
        weight:         event.weight,
        dimensions:     entities::Dimensions {
            length: event.dimensions.length,
            width:  event.dimensions.width,
            height: event.dimensions.height,
        },
        cost:           event.cost,
        currency:       event.currency,
        tariff_code:    event.tariff_code,
        winner_user_id: None,
        final_cost:     None,
        created_at:     event.created_at,
        updated_at:     ingested_at,
    }
}
