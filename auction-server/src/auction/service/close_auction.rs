use {
    super::{
        publish_result::PublishResultInput,
        Service,
    },
    crate::{
        auction::entities,
        kernel::entities::PackageId,
    },
    axum_prometheus::metrics,
    time::OffsetDateTime,
};

pub struct CloseAuctionInput {
    pub package_id: PackageId,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CloseOutcome {
    Finished(entities::AuctionResult),
    Failed,
    /// Another close already moved the package out of Auctioning.
    AlreadyClosed,
}

impl Service {
    /// Decides the outcome of an auction from the ledger's top bid.
    ///
    /// The status change is a conditional update on Auctioning, so concurrent or replayed closes
    /// for the same package apply at most once. The result is only published by the close that
    /// applied the change.
    #[tracing::instrument(skip_all, fields(package_id = %input.package_id, outcome))]
    pub async fn close_auction(&self, input: CloseAuctionInput) -> anyhow::Result<CloseOutcome> {
        let top_bid = self.repo.get_top_bid(&input.package_id).await?;
        let transition = match &top_bid {
            Some(bid) => entities::PackageTransition::Finish {
                winner_user_id: bid.user_id.clone(),
                final_cost:     bid.amount,
            },
            None => entities::PackageTransition::Fail,
        };

        let package = self
            .repo
            .update_package_status(&input.package_id, &transition, OffsetDateTime::now_utc())
            .await?;
        let Some(package) = package else {
            tracing::Span::current().record("outcome", "already_closed");
            tracing::info!("Auction was already closed");
            return Ok(CloseOutcome::AlreadyClosed);
        };

        let outcome = match top_bid {
            None => {
                tracing::info!("Auction failed without bids");
                CloseOutcome::Failed
            }
            Some(bid) => {
                let result = entities::AuctionResult::new(&package, &bid, package.updated_at);
                tracing::info!(
                    winner_id = %result.winner_id,
                    final_price = result.final_price,
                    "Auction finished"
                );
                self.publish_result(PublishResultInput {
                    notification: entities::Notification::for_winner(&result),
                    result:       result.clone(),
                })
                .await;
                CloseOutcome::Finished(result)
            }
        };

        let label = match outcome {
            CloseOutcome::Finished(_) => "finished",
            _ => "failed",
        };
        tracing::Span::current().record("outcome", label);
        metrics::counter!("auction_finished_total", "result" => label).increment(1);
        Ok(outcome)
    }
}
