use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Catalog entry; `quantity` is the live stock level and never goes negative.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Product {
    pub id: i64,
    pub store_id: i64,
    pub name: String,
    /// Unit price in minor currency units.
    pub price: i64,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}
