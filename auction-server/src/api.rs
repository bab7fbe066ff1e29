use {
    crate::{
        auction::{
            self,
            entities::PackageStatus,
        },
        config::RunOptions,
        kernel::entities::Amount,
        state::Store,
    },
    anyhow::Result,
    axum::{
        http::StatusCode,
        response::{
            IntoResponse,
            Response,
        },
        routing::get,
        Json,
        Router,
    },
    clap::crate_version,
    delivery_auction_api_types::{
        bid,
        event,
        package,
        ErrorBodyResponse,
        Route,
    },
    std::{
        fmt::{
            Display,
            Formatter,
        },
        sync::Arc,
    },
    strum::AsRefStr,
    tokio_util::sync::CancellationToken,
    tower_http::cors::CorsLayer,
    utoipa::OpenApi,
    utoipa_redoc::{
        Redoc,
        Servable,
    },
};

async fn root() -> String {
    format!("Delivery Auction Server API {}", crate_version!())
}

/// Why a bid was refused by an auction that exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InactiveReason {
    /// The package is not in Auctioning.
    NotAuctioning,
    /// The deadline passed, whether or not the auction was closed yet.
    Ended,
}

#[derive(Debug, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum RestError {
    /// The package id was empty
    InvalidPackageId,
    /// The user id was empty
    InvalidUserId,
    /// The bid amount was not positive
    InvalidAmount,
    /// The package was not found
    PackageNotFound,
    /// The package does not accept bids
    AuctionNotActive(InactiveReason),
    /// The bid does not beat the current top bid
    BidTooLow { top_amount: Amount },
    /// The package is already being auctioned
    AuctionAlreadyStarted,
    /// The package status does not allow starting an auction
    InvalidPackageStatus(PackageStatus),
    /// The bid was valid but could not be stored
    SaveBidFailed,
    /// Internal error occurred during processing the request
    TemporarilyUnavailable,
}

impl RestError {
    pub fn to_status_and_message(&self) -> (StatusCode, String) {
        match self {
            RestError::InvalidPackageId => {
                (StatusCode::BAD_REQUEST, "Invalid package id".to_string())
            }
            RestError::InvalidUserId => (StatusCode::BAD_REQUEST, "Invalid user id".to_string()),
            RestError::InvalidAmount => (
                StatusCode::BAD_REQUEST,
                "Invalid amount, it must be greater than zero".to_string(),
            ),
            RestError::PackageNotFound => (
                StatusCode::NOT_FOUND,
                "Package with the specified id was not found".to_string(),
            ),
            RestError::AuctionNotActive(InactiveReason::NotAuctioning) => {
                (StatusCode::CONFLICT, "Auction not active".to_string())
            }
            RestError::AuctionNotActive(InactiveReason::Ended) => {
                (StatusCode::CONFLICT, "Auction ended".to_string())
            }
            RestError::BidTooLow { top_amount } => (
                StatusCode::CONFLICT,
                format!(
                    "Bid too low, it must be greater than the current top bid of {}",
                    top_amount
                ),
            ),
            RestError::AuctionAlreadyStarted => (
                StatusCode::CONFLICT,
                "Auction for this package has already started".to_string(),
            ),
            RestError::InvalidPackageStatus(status) => (
                StatusCode::CONFLICT,
                format!(
                    "Package is {}, only Waiting packages can be auctioned",
                    status
                ),
            ),
            RestError::SaveBidFailed => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Failed to save bid".to_string(),
            ),
            RestError::TemporarilyUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "This service is temporarily unavailable".to_string(),
            ),
        }
    }
}

impl Display for RestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_status_and_message().1)
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let (status, msg) = self.to_status_and_message();
        (status, Json(ErrorBodyResponse { error: msg })).into_response()
    }
}

pub async fn live() -> Response {
    (StatusCode::OK, "OK").into_response()
}

pub async fn start_api(
    run_options: RunOptions,
    store: Arc<Store>,
    shutdown: CancellationToken,
) -> Result<()> {
    // Make sure functions included in the paths section have distinct names, otherwise some api generators will fail
    #[derive(OpenApi)]
    #[openapi(
    paths(
    auction::api::post_bid,
    auction::api::get_package_bids,
    auction::api::stream_package_bids,
    auction::api::post_start_auctions,
    auction::api::post_repeat_auctions,
    auction::api::get_auctioning_packages,
    auction::api::get_failed_packages,
    auction::api::get_user_packages,
    auction::api::post_expired_package,
    ),
    components(
    schemas(
    bid::BidCreate,
    bid::BidResult,
    bid::BidResultStatus,
    bid::Bid,
    bid::Bids,
    package::PackageStatus,
    package::Dimensions,
    package::Package,
    package::Packages,
    package::ExpiredPackageEvent,
    package::StartAuctionsResult,
    event::PaymentDueEvent,
    event::NotificationEvent,
    ErrorBodyResponse,
    ),
    responses(
    ErrorBodyResponse,
    bid::BidResult,
    bid::Bids,
    package::Packages,
    ),
    ),
    tags(
    (name = "Delivery Auction Server", description = "Auction Server decides which user delivers an expired package \
    and at what price. It collects bids for a fixed time and announces the winner to payment and notification channels.")
    )
    )]
    struct ApiDoc;

    let v1_routes = Router::new().nest(Route::V1.as_ref(), auction::api::get_routes());

    let app: Router<()> = Router::new()
        .merge(Redoc::with_url(Route::Docs.as_ref(), ApiDoc::openapi()))
        .merge(v1_routes)
        .route(Route::Root.as_ref(), get(root))
        .route(Route::Liveness.as_ref(), get(live))
        .layer(CorsLayer::permissive())
        .with_state(store);

    let listener = tokio::net::TcpListener::bind(&run_options.server.listen_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            tracing::info!("Shutting down RPC server...");
        })
        .await?;
    Ok(())
}
