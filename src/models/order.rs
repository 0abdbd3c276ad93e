use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Fulfilment state machine. Forward-only:
/// PENDING -> CONFIRMED -> READY_FOR_COLLECTION -> COLLECTED,
/// with CANCELLED reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    ReadyForCollection,
    Collected,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::ReadyForCollection => "READY_FOR_COLLECTION",
            OrderStatus::Collected => "COLLECTED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OrderStatus::Pending),
            "CONFIRMED" => Ok(OrderStatus::Confirmed),
            "READY_FOR_COLLECTION" => Ok(OrderStatus::ReadyForCollection),
            "COLLECTED" => Ok(OrderStatus::Collected),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            other => Err(format!("Unknown order status: {other}")),
        }
    }
}

/// Payment state of the order itself, driven by the verification workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderPaymentStatus {
    Pending,
    Verified,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub store_id: i64,
    pub total_amount: i64,
    /// Short public code shown to the customer for physical pickup.
    pub pickup_code: String,
    /// Set only once the payment has been verified; consumed at collection.
    pub otp: Option<String>,
    pub pickup_date: NaiveDate,
    pub pickup_time: String,
    pub notes: Option<String>,
    pub payment_method: String,
    pub payment_status: OrderPaymentStatus,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Line item snapshot; `price` is the per-unit price at order time.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub price: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: i64,
    pub user_id: i64,
    pub store_id: i64,
    pub items: Vec<OrderItem>,
    pub total_amount: i64,
    pub pickup_code: String,
    pub otp: Option<String>,
    pub pickup_date: NaiveDate,
    pub pickup_time: String,
    pub notes: Option<String>,
    pub payment_method: String,
    pub payment_status: OrderPaymentStatus,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderResponse {
    pub fn from_parts(order: Order, items: Vec<OrderItem>) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            store_id: order.store_id,
            items,
            total_amount: order.total_amount,
            pickup_code: order.pickup_code,
            otp: order.otp,
            pickup_date: order.pickup_date,
            pickup_time: order.pickup_time,
            notes: order.notes,
            payment_method: order.payment_method,
            payment_status: order.payment_status,
            status: order.status,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub store_id: i64,
    /// YYYY-MM-DD, today or later.
    pub pickup_date: String,
    /// HH:MM, 24-hour.
    pub pickup_time: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BuyNowRequest {
    pub product_id: i64,
    pub quantity: i64,
    pub store_id: i64,
    pub pickup_date: String,
    pub pickup_time: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CancelOrderRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    /// READY_FOR_COLLECTION, COLLECTED or CANCELLED.
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyOtpRequest {
    pub otp: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_round_trip() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::ReadyForCollection,
            OrderStatus::Collected,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_order_status_unknown() {
        assert!("SHIPPED".parse::<OrderStatus>().is_err());
    }
}
