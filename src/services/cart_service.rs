use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::Utc;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct CartService {
    pool: SqlitePool,
}

impl CartService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Add a product to the user's cart, merging quantities when an entry
    /// already exists for that product.
    pub async fn add_to_cart(&self, user_id: i64, request: &AddToCartRequest) -> AppResult<CartItem> {
        if request.quantity <= 0 {
            return Err(AppError::ValidationError(
                "Quantity must be greater than zero".to_string(),
            ));
        }

        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
            .bind(request.product_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

        let existing =
            sqlx::query_as::<_, CartItem>("SELECT * FROM cart_items WHERE user_id = ? AND product_id = ?")
                .bind(user_id)
                .bind(request.product_id)
                .fetch_optional(&self.pool)
                .await?;

        let item_id = if let Some(item) = existing {
            let merged = item.quantity + request.quantity;
            if product.quantity < merged {
                return Err(AppError::InvalidState(
                    "Insufficient stock for requested quantity".to_string(),
                ));
            }
            sqlx::query("UPDATE cart_items SET quantity = ? WHERE id = ?")
                .bind(merged)
                .bind(item.id)
                .execute(&self.pool)
                .await?;
            item.id
        } else {
            if product.quantity < request.quantity {
                return Err(AppError::InvalidState(
                    "Insufficient stock available".to_string(),
                ));
            }
            sqlx::query(
                "INSERT INTO cart_items (user_id, product_id, quantity, created_at) VALUES (?, ?, ?, ?)",
            )
            .bind(user_id)
            .bind(request.product_id)
            .bind(request.quantity)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?
            .last_insert_rowid()
        };

        self.get_cart_item(item_id).await
    }

    /// All cart lines with per-line subtotals and the cart total.
    pub async fn get_user_cart(&self, user_id: i64) -> AppResult<CartResponse> {
        let items = sqlx::query_as::<_, CartLine>(
            r#"
            SELECT
                ci.id, ci.product_id, p.name AS product_name, p.price AS unit_price,
                ci.quantity, p.price * ci.quantity AS subtotal
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.user_id = ?
            ORDER BY ci.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let total_price = items.iter().map(|line| line.subtotal).sum();
        let item_count = items.len();

        Ok(CartResponse {
            items,
            total_price,
            item_count,
        })
    }

    pub async fn update_cart_item(
        &self,
        user_id: i64,
        cart_item_id: i64,
        request: &UpdateCartItemRequest,
    ) -> AppResult<CartItem> {
        if request.quantity <= 0 {
            return Err(AppError::ValidationError(
                "Quantity must be greater than zero".to_string(),
            ));
        }

        let item = sqlx::query_as::<_, CartItem>("SELECT * FROM cart_items WHERE id = ?")
            .bind(cart_item_id)
            .fetch_optional(&self.pool)
            .await?;

        let item = match item {
            Some(item) if item.user_id == user_id => item,
            _ => {
                return Err(AppError::Forbidden(
                    "Unauthorized access to cart item".to_string(),
                ));
            }
        };

        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
            .bind(item.product_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

        if product.quantity < request.quantity {
            return Err(AppError::InvalidState(
                "Insufficient stock available".to_string(),
            ));
        }

        sqlx::query("UPDATE cart_items SET quantity = ? WHERE id = ?")
            .bind(request.quantity)
            .bind(item.id)
            .execute(&self.pool)
            .await?;

        self.get_cart_item(item.id).await
    }

    /// Idempotent: removing an entry that is already gone succeeds silently.
    pub async fn remove_from_cart(&self, user_id: i64, cart_item_id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM cart_items WHERE id = ? AND user_id = ?")
            .bind(cart_item_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Idempotent: clearing an empty cart succeeds silently.
    pub async fn clear_cart(&self, user_id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM cart_items WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_cart_item(&self, id: i64) -> AppResult<CartItem> {
        sqlx::query_as::<_, CartItem>("SELECT * FROM cart_items WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Cart item not found".to_string()))
    }
}
