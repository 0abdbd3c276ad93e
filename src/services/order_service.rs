use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::inventory;
use crate::utils::{codes_match, generate_pickup_code};
use chrono::{NaiveDate, Utc};
use regex::Regex;
use sqlx::{SqliteConnection, SqlitePool};
use std::sync::OnceLock;

const PICKUP_CODE_ATTEMPTS: u32 = 5;

fn pickup_time_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([01]?\d|2[0-3]):[0-5]\d$").expect("valid literal regex"))
}

/// A line item candidate going into `process_order`.
struct OrderLine {
    product_id: i64,
    quantity: i64,
}

#[derive(Clone)]
pub struct OrderService {
    pool: SqlitePool,
}

impl OrderService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Convert the user's whole cart into an order; the cart is cleared on
    /// success.
    pub async fn create_order_from_cart(
        &self,
        user_id: i64,
        request: &CreateOrderRequest,
    ) -> AppResult<OrderResponse> {
        self.require_store(request.store_id).await?;

        let cart = sqlx::query_as::<_, CartItem>(
            "SELECT * FROM cart_items WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        if cart.is_empty() {
            return Err(AppError::InvalidState("Cart is empty".to_string()));
        }

        let lines = cart
            .into_iter()
            .map(|item| OrderLine {
                product_id: item.product_id,
                quantity: item.quantity,
            })
            .collect();

        self.process_order(
            user_id,
            lines,
            request.store_id,
            &request.pickup_date,
            &request.pickup_time,
            request.notes.as_deref(),
            true,
        )
        .await
    }

    /// Single-product order path that bypasses the cart.
    pub async fn buy_now(&self, user_id: i64, request: &BuyNowRequest) -> AppResult<OrderResponse> {
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

        if product.quantity < request.quantity {
            return Err(AppError::InvalidState(
                "Insufficient stock available".to_string(),
            ));
        }

        self.require_store(request.store_id).await?;

        let lines = vec![OrderLine {
            product_id: request.product_id,
            quantity: request.quantity,
        }];

        self.process_order(
            user_id,
            lines,
            request.store_id,
            &request.pickup_date,
            &request.pickup_time,
            request.notes.as_deref(),
            false,
        )
        .await
    }

    /// Shared order creation: validates and reserves every line inside one
    /// transaction, so a failure on any line rolls back earlier decrements.
    #[allow(clippy::too_many_arguments)]
    async fn process_order(
        &self,
        user_id: i64,
        lines: Vec<OrderLine>,
        store_id: i64,
        pickup_date: &str,
        pickup_time: &str,
        notes: Option<&str>,
        from_cart: bool,
    ) -> AppResult<OrderResponse> {
        let pickup_date = parse_pickup_date(pickup_date)?;
        validate_pickup_time(pickup_time)?;

        let mut tx = self.pool.begin().await?;

        let mut total_amount = 0i64;
        let mut snapshots: Vec<(i64, i64, i64)> = Vec::with_capacity(lines.len());

        for line in &lines {
            let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
                .bind(line.product_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

            // Conditional decrement; an early return drops the transaction
            // and rolls every earlier line back.
            if !inventory::reserve_stock(&mut tx, line.product_id, line.quantity).await? {
                return Err(AppError::InvalidState(format!(
                    "Insufficient stock for {}",
                    product.name
                )));
            }

            total_amount += product.price * line.quantity;
            snapshots.push((product.id, line.quantity, product.price));
        }

        let order_id = insert_order_with_unique_code(
            &mut tx,
            user_id,
            store_id,
            total_amount,
            pickup_date,
            pickup_time,
            notes,
        )
        .await?;

        for (product_id, quantity, price) in &snapshots {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, quantity, price) VALUES (?, ?, ?, ?)",
            )
            .bind(order_id)
            .bind(product_id)
            .bind(quantity)
            .bind(price)
            .execute(&mut *tx)
            .await?;
        }

        if from_cart {
            sqlx::query("DELETE FROM cart_items WHERE user_id = ?")
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        log::info!("Order {order_id} created for user {user_id}, total {total_amount}");

        load_order_response(&self.pool, order_id).await
    }

    pub async fn get_order(&self, order_id: i64) -> AppResult<OrderResponse> {
        load_order_response(&self.pool, order_id).await
    }

    pub async fn get_user_orders(&self, user_id: i64) -> AppResult<Vec<OrderResponse>> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE user_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        self.with_items(orders).await
    }

    pub async fn get_store_orders(&self, store_id: i64) -> AppResult<Vec<OrderResponse>> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE store_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        self.with_items(orders).await
    }

    pub async fn get_store_orders_by_status(
        &self,
        store_id: i64,
        status: OrderStatus,
    ) -> AppResult<Vec<OrderResponse>> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE store_id = ? AND status = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(store_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        self.with_items(orders).await
    }

    /// Customer cancellation. Restores stock for every line item
    /// (best-effort per item) and moves the order to CANCELLED.
    pub async fn cancel_order(
        &self,
        order_id: i64,
        user_id: i64,
        reason: Option<&str>,
    ) -> AppResult<OrderResponse> {
        let order = require_order(&self.pool, order_id).await?;

        if order.user_id != user_id {
            return Err(AppError::Forbidden(
                "Unauthorized to cancel this order".to_string(),
            ));
        }

        if matches!(order.status, OrderStatus::Collected | OrderStatus::Cancelled) {
            return Err(AppError::InvalidState(format!(
                "Cannot cancel order with status {}",
                order.status
            )));
        }

        let items = load_order_items(&self.pool, order_id).await?;

        let mut tx = self.pool.begin().await?;
        for item in &items {
            // A product since removed from the catalog is skipped, not fatal.
            if !inventory::restore_stock(&mut tx, item.product_id, item.quantity).await? {
                log::warn!(
                    "Product {} missing while restoring stock for order {order_id}",
                    item.product_id
                );
            }
        }
        sqlx::query("UPDATE orders SET status = 'CANCELLED', updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(order_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        match reason {
            Some(reason) => log::info!("Order {order_id} cancelled by user {user_id}: {reason}"),
            None => log::info!("Order {order_id} cancelled by user {user_id}"),
        }

        load_order_response(&self.pool, order_id).await
    }

    /// Administrative fulfilment override, no OTP check. Only
    /// READY_FOR_COLLECTION, COLLECTED and CANCELLED can be set this way;
    /// PENDING and CONFIRMED belong to the payment-verification workflow.
    pub async fn admin_update_order_status(
        &self,
        order_id: i64,
        status: OrderStatus,
    ) -> AppResult<OrderResponse> {
        if !matches!(
            status,
            OrderStatus::ReadyForCollection | OrderStatus::Collected | OrderStatus::Cancelled
        ) {
            return Err(AppError::ValidationError(format!(
                "Cannot set order status to {status}"
            )));
        }

        require_order(&self.pool, order_id).await?;

        sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status)
            .bind(Utc::now())
            .bind(order_id)
            .execute(&self.pool)
            .await?;

        load_order_response(&self.pool, order_id).await
    }

    /// Check the collection OTP and mark the order COLLECTED on match.
    /// A mismatch fails without mutating order state.
    pub async fn admin_verify_otp(&self, order_id: i64, supplied_otp: &str) -> AppResult<OrderResponse> {
        let order = require_order(&self.pool, order_id).await?;

        let stored_otp = order.otp.as_deref().ok_or_else(|| {
            AppError::InvalidState("OTP has not been generated for this order".to_string())
        })?;

        if order.status != OrderStatus::ReadyForCollection {
            return Err(AppError::InvalidState(
                "Order must be ready for collection to verify OTP".to_string(),
            ));
        }

        let well_formed =
            supplied_otp.len() == 6 && supplied_otp.chars().all(|c| c.is_ascii_digit());
        if !well_formed || !codes_match(supplied_otp, stored_otp) {
            return Err(AppError::ValidationError("Invalid OTP".to_string()));
        }

        sqlx::query("UPDATE orders SET status = 'COLLECTED', updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(order_id)
            .execute(&self.pool)
            .await?;

        log::info!("Order {order_id} collected");

        load_order_response(&self.pool, order_id).await
    }

    /// Deletion is only permitted for cancelled orders, preserving the
    /// fulfilment history of everything else.
    pub async fn admin_delete_order(&self, order_id: i64) -> AppResult<()> {
        let order = require_order(&self.pool, order_id).await?;

        if order.status != OrderStatus::Cancelled {
            return Err(AppError::InvalidState(
                "Can only delete cancelled orders".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM order_items WHERE order_id = ?")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(())
    }

    async fn require_store(&self, store_id: i64) -> AppResult<Store> {
        sqlx::query_as::<_, Store>("SELECT * FROM stores WHERE id = ?")
            .bind(store_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Store not found".to_string()))
    }

    async fn with_items(&self, orders: Vec<Order>) -> AppResult<Vec<OrderResponse>> {
        let mut responses = Vec::with_capacity(orders.len());
        for order in orders {
            let items = load_order_items(&self.pool, order.id).await?;
            responses.push(OrderResponse::from_parts(order, items));
        }
        Ok(responses)
    }
}

fn parse_pickup_date(raw: &str) -> AppResult<NaiveDate> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::ValidationError("Invalid pickup date format".to_string()))?;

    if date < Utc::now().date_naive() {
        return Err(AppError::ValidationError(
            "Pickup date cannot be in the past".to_string(),
        ));
    }

    Ok(date)
}

fn validate_pickup_time(raw: &str) -> AppResult<()> {
    if !pickup_time_regex().is_match(raw) {
        return Err(AppError::ValidationError(
            "Invalid pickup time format. Use HH:MM (24-hour)".to_string(),
        ));
    }
    Ok(())
}

/// Insert the order row, regenerating the pickup code on a unique-constraint
/// collision.
async fn insert_order_with_unique_code(
    conn: &mut SqliteConnection,
    user_id: i64,
    store_id: i64,
    total_amount: i64,
    pickup_date: NaiveDate,
    pickup_time: &str,
    notes: Option<&str>,
) -> AppResult<i64> {
    let now = Utc::now();

    for _ in 0..PICKUP_CODE_ATTEMPTS {
        let pickup_code = generate_pickup_code();
        let result = sqlx::query(
            r#"
            INSERT INTO orders (
                user_id, store_id, total_amount, pickup_code, pickup_date, pickup_time,
                notes, payment_method, payment_status, status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, 'ONLINE', 'PENDING', 'PENDING', ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(store_id)
        .bind(total_amount)
        .bind(&pickup_code)
        .bind(pickup_date)
        .bind(pickup_time)
        .bind(notes)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await;

        match result {
            Ok(res) => return Ok(res.last_insert_rowid()),
            Err(e) if is_unique_violation(&e) => {
                log::warn!("Pickup code {pickup_code} collided, regenerating");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::InternalError(
        "Could not generate a unique pickup code".to_string(),
    ))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

pub(crate) async fn require_order(pool: &SqlitePool, order_id: i64) -> AppResult<Order> {
    sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
        .bind(order_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
}

pub(crate) async fn load_order_items(pool: &SqlitePool, order_id: i64) -> AppResult<Vec<OrderItem>> {
    Ok(
        sqlx::query_as::<_, OrderItem>("SELECT * FROM order_items WHERE order_id = ? ORDER BY id")
            .bind(order_id)
            .fetch_all(pool)
            .await?,
    )
}

pub(crate) async fn load_order_response(pool: &SqlitePool, order_id: i64) -> AppResult<OrderResponse> {
    let order = require_order(pool, order_id).await?;
    let items = load_order_items(pool, order_id).await?;
    Ok(OrderResponse::from_parts(order, items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::CartService;
    use chrono::Duration;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    async fn seed_store(pool: &SqlitePool) -> i64 {
        sqlx::query("INSERT INTO stores (name, address, created_at) VALUES ('Main', 'Kathmandu', ?)")
            .bind(Utc::now())
            .execute(pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    async fn seed_product(pool: &SqlitePool, store_id: i64, name: &str, price: i64, quantity: i64) -> i64 {
        sqlx::query("INSERT INTO products (store_id, name, price, quantity, created_at) VALUES (?, ?, ?, ?, ?)")
            .bind(store_id)
            .bind(name)
            .bind(price)
            .bind(quantity)
            .bind(Utc::now())
            .execute(pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    async fn stock(pool: &SqlitePool, product_id: i64) -> i64 {
        sqlx::query_scalar("SELECT quantity FROM products WHERE id = ?")
            .bind(product_id)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    fn tomorrow() -> String {
        (Utc::now().date_naive() + Duration::days(1)).to_string()
    }

    fn buy_now_request(product_id: i64, quantity: i64, store_id: i64) -> BuyNowRequest {
        BuyNowRequest {
            product_id,
            quantity,
            store_id,
            pickup_date: tomorrow(),
            pickup_time: "14:30".to_string(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_buy_now_reserves_stock() {
        let pool = test_pool().await;
        let store_id = seed_store(&pool).await;
        let product_id = seed_product(&pool, store_id, "Momo", 250, 5).await;
        let service = OrderService::new(pool.clone());

        let order = service
            .buy_now(1, &buy_now_request(product_id, 3, store_id))
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, OrderPaymentStatus::Pending);
        assert_eq!(order.payment_method, "ONLINE");
        assert_eq!(order.total_amount, 750);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 3);
        assert_eq!(order.items[0].price, 250);
        assert_eq!(order.pickup_code.len(), 8);
        assert!(
            order
                .pickup_code
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
        assert!(order.otp.is_none());
        assert_eq!(stock(&pool, product_id).await, 2);

        // A second identical request exceeds the remaining stock.
        let err = service
            .buy_now(1, &buy_now_request(product_id, 3, store_id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
        assert_eq!(stock(&pool, product_id).await, 2);
    }

    #[tokio::test]
    async fn test_buy_now_missing_product_and_store() {
        let pool = test_pool().await;
        let store_id = seed_store(&pool).await;
        let product_id = seed_product(&pool, store_id, "Momo", 250, 5).await;
        let service = OrderService::new(pool);

        let err = service
            .buy_now(1, &buy_now_request(99, 1, store_id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = service
            .buy_now(1, &buy_now_request(product_id, 1, 99))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_create_order_from_cart_clears_cart() {
        let pool = test_pool().await;
        let store_id = seed_store(&pool).await;
        let momo = seed_product(&pool, store_id, "Momo", 250, 10).await;
        let chiya = seed_product(&pool, store_id, "Chiya", 50, 10).await;

        let cart = CartService::new(pool.clone());
        cart.add_to_cart(1, &AddToCartRequest { product_id: momo, quantity: 2 })
            .await
            .unwrap();
        cart.add_to_cart(1, &AddToCartRequest { product_id: chiya, quantity: 4 })
            .await
            .unwrap();

        let service = OrderService::new(pool.clone());
        let order = service
            .create_order_from_cart(
                1,
                &CreateOrderRequest {
                    store_id,
                    pickup_date: tomorrow(),
                    pickup_time: "09:15".to_string(),
                    notes: Some("No chilli".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(order.total_amount, 2 * 250 + 4 * 50);
        assert_eq!(order.items.len(), 2);
        let item_sum: i64 = order.items.iter().map(|i| i.price * i.quantity).sum();
        assert_eq!(item_sum, order.total_amount);
        assert_eq!(order.notes.as_deref(), Some("No chilli"));
        assert_eq!(stock(&pool, momo).await, 8);
        assert_eq!(stock(&pool, chiya).await, 6);

        assert!(cart.get_user_cart(1).await.unwrap().items.is_empty());

        // Cart is now empty, so ordering again is rejected.
        let err = service
            .create_order_from_cart(
                1,
                &CreateOrderRequest {
                    store_id,
                    pickup_date: tomorrow(),
                    pickup_time: "09:15".to_string(),
                    notes: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_multi_line_failure_rolls_back_all_decrements() {
        let pool = test_pool().await;
        let store_id = seed_store(&pool).await;
        let momo = seed_product(&pool, store_id, "Momo", 250, 10).await;
        let chiya = seed_product(&pool, store_id, "Chiya", 50, 1).await;

        let cart = CartService::new(pool.clone());
        cart.add_to_cart(1, &AddToCartRequest { product_id: momo, quantity: 2 })
            .await
            .unwrap();
        cart.add_to_cart(1, &AddToCartRequest { product_id: chiya, quantity: 1 })
            .await
            .unwrap();

        // Someone else takes the last chiya between add-to-cart and checkout.
        sqlx::query("UPDATE products SET quantity = 0 WHERE id = ?")
            .bind(chiya)
            .execute(&pool)
            .await
            .unwrap();

        let service = OrderService::new(pool.clone());
        let err = service
            .create_order_from_cart(
                1,
                &CreateOrderRequest {
                    store_id,
                    pickup_date: tomorrow(),
                    pickup_time: "09:15".to_string(),
                    notes: None,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidState(_)));
        // The first line's decrement was rolled back with the transaction.
        assert_eq!(stock(&pool, momo).await, 10);
        assert_eq!(stock(&pool, chiya).await, 0);
        // Cart survives a failed checkout.
        assert_eq!(cart.get_user_cart(1).await.unwrap().items.len(), 2);
    }

    #[tokio::test]
    async fn test_pickup_date_and_time_validation() {
        let pool = test_pool().await;
        let store_id = seed_store(&pool).await;
        let product_id = seed_product(&pool, store_id, "Momo", 250, 5).await;
        let service = OrderService::new(pool.clone());

        let mut request = buy_now_request(product_id, 1, store_id);
        request.pickup_date = "not-a-date".to_string();
        let err = service.buy_now(1, &request).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let mut request = buy_now_request(product_id, 1, store_id);
        request.pickup_date = (Utc::now().date_naive() - Duration::days(1)).to_string();
        let err = service.buy_now(1, &request).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let mut request = buy_now_request(product_id, 1, store_id);
        request.pickup_time = "25:00".to_string();
        let err = service.buy_now(1, &request).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        // Validation failures never touch the stock.
        assert_eq!(stock(&pool, product_id).await, 5);
    }

    #[tokio::test]
    async fn test_cancel_order_restores_stock_once() {
        let pool = test_pool().await;
        let store_id = seed_store(&pool).await;
        let product_id = seed_product(&pool, store_id, "Momo", 250, 5).await;
        let service = OrderService::new(pool.clone());

        let order = service
            .buy_now(1, &buy_now_request(product_id, 3, store_id))
            .await
            .unwrap();
        assert_eq!(stock(&pool, product_id).await, 2);

        let err = service.cancel_order(order.id, 2, None).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let cancelled = service
            .cancel_order(order.id, 1, Some("changed my mind"))
            .await
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(stock(&pool, product_id).await, 5);

        // Re-cancelling must not restore the stock a second time.
        let err = service.cancel_order(order.id, 1, None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
        assert_eq!(stock(&pool, product_id).await, 5);
    }

    #[tokio::test]
    async fn test_cancel_order_skips_missing_products() {
        let pool = test_pool().await;
        let store_id = seed_store(&pool).await;
        let product_id = seed_product(&pool, store_id, "Momo", 250, 5).await;
        let service = OrderService::new(pool.clone());

        let order = service
            .buy_now(1, &buy_now_request(product_id, 2, store_id))
            .await
            .unwrap();

        sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(product_id)
            .execute(&pool)
            .await
            .unwrap();

        let cancelled = service.cancel_order(order.id, 1, None).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_admin_verify_otp_lifecycle() {
        let pool = test_pool().await;
        let store_id = seed_store(&pool).await;
        let product_id = seed_product(&pool, store_id, "Momo", 250, 5).await;
        let service = OrderService::new(pool.clone());

        let order = service
            .buy_now(1, &buy_now_request(product_id, 1, store_id))
            .await
            .unwrap();

        // No OTP before payment verification.
        let err = service.admin_verify_otp(order.id, "048213").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));

        // Simulate a verified payment having issued the OTP.
        sqlx::query("UPDATE orders SET otp = '048213', payment_status = 'VERIFIED', status = 'CONFIRMED' WHERE id = ?")
            .bind(order.id)
            .execute(&pool)
            .await
            .unwrap();

        // Not ready for collection yet.
        let err = service.admin_verify_otp(order.id, "048213").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));

        let order_ready = service
            .admin_update_order_status(order.id, OrderStatus::ReadyForCollection)
            .await
            .unwrap();
        assert_eq!(order_ready.status, OrderStatus::ReadyForCollection);

        // Wrong code fails without mutating the order.
        let err = service.admin_verify_otp(order.id, "048214").await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert_eq!(
            service.get_order(order.id).await.unwrap().status,
            OrderStatus::ReadyForCollection
        );

        let collected = service.admin_verify_otp(order.id, "048213").await.unwrap();
        assert_eq!(collected.status, OrderStatus::Collected);

        // The OTP is consumed: the order is no longer READY_FOR_COLLECTION.
        let err = service.admin_verify_otp(order.id, "048213").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_admin_status_override_excludes_payment_states() {
        let pool = test_pool().await;
        let store_id = seed_store(&pool).await;
        let product_id = seed_product(&pool, store_id, "Momo", 250, 5).await;
        let service = OrderService::new(pool.clone());

        let order = service
            .buy_now(1, &buy_now_request(product_id, 1, store_id))
            .await
            .unwrap();

        // CONFIRMED is only reachable through payment verification.
        let err = service
            .admin_update_order_status(order.id, OrderStatus::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let err = service
            .admin_update_order_status(order.id, OrderStatus::Pending)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let unchanged = service.get_order(order.id).await.unwrap();
        assert_eq!(unchanged.status, OrderStatus::Pending);
        assert_eq!(unchanged.payment_status, OrderPaymentStatus::Pending);

        for status in [
            OrderStatus::ReadyForCollection,
            OrderStatus::Collected,
            OrderStatus::Cancelled,
        ] {
            let updated = service
                .admin_update_order_status(order.id, status)
                .await
                .unwrap();
            assert_eq!(updated.status, status);
        }
    }

    #[tokio::test]
    async fn test_admin_delete_order_requires_cancelled() {
        let pool = test_pool().await;
        let store_id = seed_store(&pool).await;
        let product_id = seed_product(&pool, store_id, "Momo", 250, 5).await;
        let service = OrderService::new(pool.clone());

        let order = service
            .buy_now(1, &buy_now_request(product_id, 1, store_id))
            .await
            .unwrap();

        let err = service.admin_delete_order(order.id).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));

        service.cancel_order(order.id, 1, None).await.unwrap();
        service.admin_delete_order(order.id).await.unwrap();

        let err = service.get_order(order.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = service.admin_delete_order(order.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_store_order_listings() {
        let pool = test_pool().await;
        let store_id = seed_store(&pool).await;
        let product_id = seed_product(&pool, store_id, "Momo", 250, 10).await;
        let service = OrderService::new(pool.clone());

        let first = service
            .buy_now(1, &buy_now_request(product_id, 1, store_id))
            .await
            .unwrap();
        service
            .buy_now(2, &buy_now_request(product_id, 2, store_id))
            .await
            .unwrap();
        service.cancel_order(first.id, 1, None).await.unwrap();

        assert_eq!(service.get_store_orders(store_id).await.unwrap().len(), 2);
        assert_eq!(
            service
                .get_store_orders_by_status(store_id, OrderStatus::Cancelled)
                .await
                .unwrap()
                .len(),
            1
        );
        assert_eq!(service.get_user_orders(1).await.unwrap().len(), 1);
        assert_eq!(service.get_user_orders(2).await.unwrap().len(), 1);
    }
}
