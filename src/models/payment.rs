use crate::models::order::OrderResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// State of a single receipt submission. An order may accumulate several
/// records over time (resubmission after rejection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Verified,
    Rejected,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Verified => "VERIFIED",
            PaymentStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Payment {
    pub id: i64,
    pub order_id: i64,
    pub user_id: i64,
    /// Snapshot of the order total at submission time.
    pub amount: i64,
    pub payment_method: String,
    /// Reference to the uploaded proof image in external storage.
    pub receipt_image: String,
    pub notes: Option<String>,
    pub status: PaymentStatus,
    pub verification_notes: Option<String>,
    pub verified_by: Option<i64>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitReceiptRequest {
    pub order_id: i64,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    /// Stored-image reference produced by the upload layer.
    pub receipt_image: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyPaymentRequest {
    /// VERIFIED or REJECTED; PENDING is not a decision.
    pub status: PaymentStatus,
    pub verification_notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyPaymentResponse {
    pub payment: Payment,
    pub order: OrderResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentListQuery {
    pub status: Option<PaymentStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// One of: created_at, amount, status.
    pub sort_by: Option<String>,
    /// asc or desc.
    pub sort_order: Option<String>,
}
