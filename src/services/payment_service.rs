use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::order_service::{load_order_response, require_order};
use crate::utils::generate_otp;
use chrono::Utc;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct PaymentService {
    pool: SqlitePool,
}

impl PaymentService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a receipt submission for manual review. Resubmission is always
    /// allowed (including after a rejection) until the order's payment has
    /// been verified.
    pub async fn submit_receipt(
        &self,
        user_id: i64,
        request: &SubmitReceiptRequest,
    ) -> AppResult<Payment> {
        let order = require_order(&self.pool, request.order_id).await?;

        if order.user_id != user_id {
            return Err(AppError::Forbidden(
                "Unauthorized access to order".to_string(),
            ));
        }

        if order.status == OrderStatus::Cancelled {
            return Err(AppError::InvalidState(
                "Cannot pay for cancelled order".to_string(),
            ));
        }

        if order.payment_status == OrderPaymentStatus::Verified {
            return Err(AppError::InvalidState(
                "Payment already verified for this order".to_string(),
            ));
        }

        if request.receipt_image.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Receipt image is required".to_string(),
            ));
        }

        let payment_method = request
            .payment_method
            .clone()
            .unwrap_or_else(|| "ONLINE".to_string());

        // Amount is the order total snapshot, never recomputed from the
        // live catalog.
        let payment_id = sqlx::query(
            r#"
            INSERT INTO payments (order_id, user_id, amount, payment_method, receipt_image, notes, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, 'PENDING', ?)
            "#,
        )
        .bind(order.id)
        .bind(user_id)
        .bind(order.total_amount)
        .bind(&payment_method)
        .bind(&request.receipt_image)
        .bind(&request.notes)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        log::info!("Receipt submitted for order {} (payment {payment_id})", order.id);

        self.get_payment(payment_id).await
    }

    pub async fn get_payment(&self, payment_id: i64) -> AppResult<Payment> {
        sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = ?")
            .bind(payment_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Payment not found".to_string()))
    }

    /// Latest payment submitted for an order.
    pub async fn get_order_payment(&self, order_id: i64) -> AppResult<Payment> {
        sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE order_id = ? ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("No payment found for this order".to_string()))
    }

    pub async fn get_user_payments(&self, user_id: i64) -> AppResult<Vec<Payment>> {
        Ok(sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE user_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn get_rejected_payments(&self, order_id: i64) -> AppResult<Vec<Payment>> {
        Ok(sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE order_id = ? AND status = 'REJECTED' ORDER BY created_at DESC, id DESC",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Review queue, oldest submission first.
    pub async fn get_pending_payments(&self) -> AppResult<Vec<Payment>> {
        Ok(sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE status = 'PENDING' ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    /// Paginated admin listing with an optional status filter.
    pub async fn get_all_payments(
        &self,
        query: &PaymentListQuery,
    ) -> AppResult<PaginatedResponse<Payment>> {
        let page = query.page.unwrap_or(1);
        let limit = query.limit.unwrap_or(20);

        if page < 1 {
            return Err(AppError::ValidationError(
                "Page must be at least 1".to_string(),
            ));
        }
        if !(1..=100).contains(&limit) {
            return Err(AppError::ValidationError(
                "Limit must be between 1 and 100".to_string(),
            ));
        }

        // Sort column is whitelisted; only bound values reach the query.
        let sort_column = match query.sort_by.as_deref().unwrap_or("created_at") {
            "created_at" | "createdAt" => "created_at",
            "amount" => "amount",
            "status" => "status",
            other => {
                return Err(AppError::ValidationError(format!(
                    "Cannot sort by {other}"
                )));
            }
        };
        let sort_direction = match query.sort_order.as_deref().unwrap_or("desc") {
            "asc" | "ASC" => "ASC",
            "desc" | "DESC" => "DESC",
            other => {
                return Err(AppError::ValidationError(format!(
                    "Invalid sort order {other}"
                )));
            }
        };

        let (total, items) = if let Some(status) = query.status {
            let total: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM payments WHERE status = ?")
                    .bind(status)
                    .fetch_one(&self.pool)
                    .await?;
            let items = sqlx::query_as::<_, Payment>(&format!(
                "SELECT * FROM payments WHERE status = ? ORDER BY {sort_column} {sort_direction} LIMIT ? OFFSET ?"
            ))
            .bind(status)
            .bind(limit)
            .bind((page - 1) * limit)
            .fetch_all(&self.pool)
            .await?;
            (total, items)
        } else {
            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments")
                .fetch_one(&self.pool)
                .await?;
            let items = sqlx::query_as::<_, Payment>(&format!(
                "SELECT * FROM payments ORDER BY {sort_column} {sort_direction} LIMIT ? OFFSET ?"
            ))
            .bind(limit)
            .bind((page - 1) * limit)
            .fetch_all(&self.pool)
            .await?;
            (total, items)
        };

        let params = PaginationParams::new(Some(page as u32), Some(limit as u32));
        Ok(PaginatedResponse::new(items, &params, total))
    }

    /// Admin decision on a pending receipt.
    ///
    /// VERIFIED issues the collection OTP and confirms the order. REJECTED
    /// marks the order's payment as failed and clears any OTP, but leaves
    /// the order status alone so the customer can resubmit.
    pub async fn verify_payment(
        &self,
        payment_id: i64,
        admin_id: i64,
        request: &VerifyPaymentRequest,
    ) -> AppResult<VerifyPaymentResponse> {
        let payment = self.get_payment(payment_id).await?;

        if payment.status != PaymentStatus::Pending {
            return Err(AppError::InvalidState(
                "Payment has already been processed".to_string(),
            ));
        }

        if request.status == PaymentStatus::Pending {
            return Err(AppError::ValidationError(
                "Verification status must be VERIFIED or REJECTED".to_string(),
            ));
        }

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE payments SET status = ?, verification_notes = ?, verified_by = ?, verified_at = ? WHERE id = ?",
        )
        .bind(request.status)
        .bind(&request.verification_notes)
        .bind(admin_id)
        .bind(now)
        .bind(payment_id)
        .execute(&mut *tx)
        .await?;

        match request.status {
            PaymentStatus::Verified => {
                let otp = generate_otp();
                sqlx::query(
                    "UPDATE orders SET payment_status = 'VERIFIED', status = 'CONFIRMED', otp = ?, updated_at = ? WHERE id = ?",
                )
                .bind(&otp)
                .bind(now)
                .bind(payment.order_id)
                .execute(&mut *tx)
                .await?;
                log::info!(
                    "Payment {payment_id} verified by admin {admin_id}; order {} confirmed",
                    payment.order_id
                );
            }
            PaymentStatus::Rejected => {
                sqlx::query(
                    "UPDATE orders SET payment_status = 'FAILED', otp = NULL, updated_at = ? WHERE id = ?",
                )
                .bind(now)
                .bind(payment.order_id)
                .execute(&mut *tx)
                .await?;
                log::info!(
                    "Payment {payment_id} rejected by admin {admin_id} for order {}",
                    payment.order_id
                );
            }
            PaymentStatus::Pending => unreachable!("rejected above"),
        }

        tx.commit().await?;

        let payment = self.get_payment(payment_id).await?;
        let order = load_order_response(&self.pool, payment.order_id).await?;

        Ok(VerifyPaymentResponse { payment, order })
    }
}
