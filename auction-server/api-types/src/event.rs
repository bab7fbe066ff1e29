use {
    crate::{
        Amount,
        Currency,
        PackageId,
        UserId,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    time::OffsetDateTime,
    utoipa::ToSchema,
};

/// Sent to the payment service once an auction is finished with a winner.
#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq)]
pub struct PaymentDueEvent {
    #[schema(example = "pkg-7f1c2a", value_type = String)]
    pub package_id:  PackageId,
    #[schema(example = "user-42", value_type = String)]
    pub winner_id:   UserId,
    #[schema(example = 7000, value_type = i64)]
    pub final_price: Amount,
    #[schema(example = "RUB", value_type = String)]
    pub currency:    Currency,
    #[schema(example = "2024-05-23T21:26:57.329954Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub finished_at: OffsetDateTime,
}

/// Sent to the notification channel to congratulate the winner.
#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq)]
pub struct NotificationEvent {
    #[schema(example = "user-42", value_type = String)]
    pub user_id: UserId,
    pub message: String,
}
