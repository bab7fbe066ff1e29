use {
    super::{
        entities,
        service::{
            get_bids::GetBidsInput,
            get_packages::GetUserWonPackagesInput,
            place_bid::PlaceBidInput,
            start_auctions::StartAuctionsReport,
            stream_bids::StreamBidsInput,
        },
    },
    crate::{
        api::RestError,
        state::Store,
    },
    axum::{
        extract::{
            Path,
            State,
        },
        response::{
            IntoResponse,
            Response,
        },
        routing::{
            get,
            post,
        },
        Json,
        Router,
    },
    axum_streams::StreamBodyAs,
    delivery_auction_api_types::{
        bid::{
            Bid,
            BidCreate,
            BidResult,
            BidResultStatus,
            Bids,
        },
        package::{
            Dimensions,
            ExpiredPackageEvent,
            Package,
            PackageStatus,
            Packages,
            StartAuctionsResult,
        },
        ErrorBodyResponse,
        Route,
    },
    futures::StreamExt,
    std::sync::Arc,
};

/// A refused bid, answered with the `BidResult` body and the status of the underlying error.
pub struct BidRejection(RestError);

impl From<RestError> for BidRejection {
    fn from(err: RestError) -> Self {
        BidRejection(err)
    }
}

impl IntoResponse for BidRejection {
    fn into_response(self) -> Response {
        let (status, message) = self.0.to_status_and_message();
        let body = BidResult {
            status: BidResultStatus::Error,
            message,
            id: None,
        };
        (status, Json(body)).into_response()
    }
}

/// Place a bid on a package that is being auctioned.
///
/// The amount is in currency minor units and must be strictly greater than the current top bid.
/// Bids are accepted until the auction deadline, even if the auction has not been closed yet.
#[utoipa::path(post, path = "/v1/bids", request_body = BidCreate, responses(
    (status = 200, description = "Bid was placed", body = BidResult,
    example = json!({"status": "success", "message": "Bid placed", "id": "pkg-7f1c2a-user-42-1718000000000000000"})),
    (status = 400, description = "Invalid bid", body = BidResult,
    example = json!({"status": "error", "message": "Invalid amount, it must be greater than zero", "id": null})),
    (status = 404, description = "Package was not found", body = BidResult),
    (status = 409, description = "Auction is not active or the bid is too low", body = BidResult),
    (status = 503, description = "Bid could not be stored", body = BidResult),
),)]
pub async fn post_bid(
    State(store): State<Arc<Store>>,
    Json(bid_create): Json<BidCreate>,
) -> Result<Json<BidResult>, BidRejection> {
    let bid = store
        .auction_service
        .place_bid(PlaceBidInput {
            bid_create: bid_create.into(),
        })
        .await?;
    Ok(Json(BidResult {
        status:  BidResultStatus::Success,
        message: "Bid placed".to_string(),
        id:      Some(bid.id),
    }))
}

/// Get all bids placed on a package, in the order they were accepted.
#[utoipa::path(get, path = "/v1/packages/{package_id}/bids",
    params(("package_id" = String, Path, description = "Package to get bids for")),
    responses(
    (status = 200, body = Bids),
    (status = 400, response = ErrorBodyResponse),
),)]
pub async fn get_package_bids(
    State(store): State<Arc<Store>>,
    Path(package_id): Path<String>,
) -> Result<Json<Bids>, RestError> {
    let bids = store
        .auction_service
        .get_bids(GetBidsInput { package_id })
        .await?;
    Ok(Json(Bids {
        items: bids.into_iter().map(Bid::from).collect(),
    }))
}

/// Follow the bids placed on a package as newline delimited JSON.
///
/// Bids already placed are sent first. The stream stays open until the client disconnects.
#[utoipa::path(get, path = "/v1/packages/{package_id}/bids/stream",
    params(("package_id" = String, Path, description = "Package to follow")),
    responses(
    (status = 200, description = "One bid per line", body = Bid, content_type = "application/x-ndjson"),
),)]
pub async fn stream_package_bids(
    State(store): State<Arc<Store>>,
    Path(package_id): Path<String>,
) -> impl IntoResponse {
    let stream = store
        .auction_service
        .stream_bids(StreamBidsInput { package_id })
        .map(Bid::from);
    StreamBodyAs::json_nl(stream)
}

/// Start an auction for every package waiting for one.
#[utoipa::path(post, path = "/v1/auctions/start", responses(
    (status = 200, body = StartAuctionsResult),
    (status = 503, response = ErrorBodyResponse),
),)]
pub async fn post_start_auctions(
    State(store): State<Arc<Store>>,
) -> Result<Json<StartAuctionsResult>, RestError> {
    let report = store.auction_service.start_waiting_auctions().await?;
    Ok(Json(report.into()))
}

/// Run another auction for every package whose auction ended without bids.
#[utoipa::path(post, path = "/v1/auctions/repeat", responses(
    (status = 200, body = StartAuctionsResult),
    (status = 503, response = ErrorBodyResponse),
),)]
pub async fn post_repeat_auctions(
    State(store): State<Arc<Store>>,
) -> Result<Json<StartAuctionsResult>, RestError> {
    let report = store.auction_service.repeat_failed_auctions().await?;
    Ok(Json(report.into()))
}

/// Get the packages currently being auctioned.
#[utoipa::path(get, path = "/v1/packages/auctioning", responses(
    (status = 200, body = Packages),
    (status = 503, response = ErrorBodyResponse),
),)]
pub async fn get_auctioning_packages(
    State(store): State<Arc<Store>>,
) -> Result<Json<Packages>, RestError> {
    let packages = store.auction_service.get_auctioning_packages().await?;
    Ok(Json(packages_response(packages)))
}

/// Get the packages whose auction ended without any bid.
#[utoipa::path(get, path = "/v1/packages/failed", responses(
    (status = 200, body = Packages),
    (status = 503, response = ErrorBodyResponse),
),)]
pub async fn get_failed_packages(
    State(store): State<Arc<Store>>,
) -> Result<Json<Packages>, RestError> {
    let packages = store.auction_service.get_failed_packages().await?;
    Ok(Json(packages_response(packages)))
}

/// Get the packages a user won, most recent first.
#[utoipa::path(get, path = "/v1/users/{user_id}/packages",
    params(("user_id" = String, Path, description = "Winner of the auctions")),
    responses(
    (status = 200, body = Packages),
    (status = 400, response = ErrorBodyResponse),
),)]
pub async fn get_user_packages(
    State(store): State<Arc<Store>>,
    Path(user_id): Path<String>,
) -> Result<Json<Packages>, RestError> {
    let packages = store
        .auction_service
        .get_user_won_packages(GetUserWonPackagesInput { user_id })
        .await?;
    Ok(Json(packages_response(packages)))
}

/// Submit an expired package so that it gets auctioned.
///
/// The event is handed to the package consumer through the broker, the auction starts
/// asynchronously.
#[utoipa::path(post, path = "/v1/events/expired-packages", request_body = ExpiredPackageEvent, responses(
    (status = 202, description = "Event accepted"),
    (status = 400, response = ErrorBodyResponse),
    (status = 503, response = ErrorBodyResponse),
),)]
pub async fn post_expired_package(
    State(store): State<Arc<Store>>,
    Json(event): Json<ExpiredPackageEvent>,
) -> Result<impl IntoResponse, RestError> {
    if event.package_id.trim().is_empty() {
        return Err(RestError::InvalidPackageId);
    }
    let payload = serde_json::to_vec(&event).map_err(|err| {
        tracing::error!(error = ?err, "Failed to encode expired package event");
        RestError::TemporarilyUnavailable
    })?;
    store
        .broker
        .publish(&store.ingest_topic, Some(event.package_id), payload)
        .map_err(|err| {
            tracing::error!(error = ?err, "Failed to publish expired package event");
            RestError::TemporarilyUnavailable
        })?;
    Ok(axum::http::StatusCode::ACCEPTED)
}

pub fn get_routes() -> Router<Arc<Store>> {
    Router::new()
        .route(Route::Bids.as_ref(), post(post_bid))
        .route(Route::PackageBids.as_ref(), get(get_package_bids))
        .route(Route::PackageBidsStream.as_ref(), get(stream_package_bids))
        .route(Route::AuctioningPackages.as_ref(), get(get_auctioning_packages))
        .route(Route::FailedPackages.as_ref(), get(get_failed_packages))
        .route(Route::UserPackages.as_ref(), get(get_user_packages))
        .route(Route::StartAuctions.as_ref(), post(post_start_auctions))
        .route(Route::RepeatAuctions.as_ref(), post(post_repeat_auctions))
        .route(Route::ExpiredPackages.as_ref(), post(post_expired_package))
}

impl From<BidCreate> for entities::BidCreate {
    fn from(bid_create: BidCreate) -> Self {
        entities::BidCreate {
            package_id: bid_create.package_id,
            user_id:    bid_create.user_id,
            amount:     bid_create.amount,
        }
    }
}

impl From<entities::Bid> for Bid {
    fn from(bid: entities::Bid) -> Self {
        Bid {
            id:         bid.id,
            package_id: bid.package_id,
            user_id:    bid.user_id,
            amount:     bid.amount,
            timestamp:  bid.timestamp,
        }
    }
}

impl From<entities::PackageStatus> for PackageStatus {
    fn from(status: entities::PackageStatus) -> Self {
        match status {
            entities::PackageStatus::Waiting => PackageStatus::Waiting,
            entities::PackageStatus::Auctioning => PackageStatus::Auctioning,
            entities::PackageStatus::Finished => PackageStatus::Finished,
            entities::PackageStatus::AuctionFailed => PackageStatus::AuctionFailed,
        }
    }
}

impl From<entities::Package> for Package {
    fn from(package: entities::Package) -> Self {
        Package {
            package_id:     package.id,
            status:         package.status.into(),
            from:           package.from,
            to:             package.to,
            weight:         package.weight,
            dimensions:     Dimensions {
                length: package.dimensions.length,
                width:  package.dimensions.width,
                height: package.dimensions.height,
            },
            cost:           package.cost,
            currency:       package.currency,
            tariff_code:    package.tariff_code,
            winner_user_id: package.winner_user_id,
            final_cost:     package.final_cost,
            created_at:     package.created_at,
            updated_at:     package.updated_at,
        }
    }
}

fn packages_response(packages: Vec<entities::Package>) -> Packages {
    Packages {
        items: packages.into_iter().map(Package::from).collect(),
    }
}

impl From<StartAuctionsReport> for StartAuctionsResult {
    fn from(report: StartAuctionsReport) -> Self {
        StartAuctionsResult {
            started: report.started,
            skipped: report.skipped,
        }
    }
}
