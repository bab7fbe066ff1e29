use {
    crate::{
        auction::service::Service,
        kernel::broker::Broker,
    },
    axum_prometheus::metrics_exporter_prometheus::PrometheusHandle,
};

/// Everything the API handlers need.
pub struct Store {
    pub auction_service: Service,
    pub broker:          Broker,
    /// Topic the HTTP ingest endpoint publishes expired-package events to.
    pub ingest_topic:    String,
}

pub struct ServerState {
    pub metrics_recorder: PrometheusHandle,
}
