//! Stock ledger primitives. Decrements are conditional single-statement
//! updates so a concurrent order can never drive stock below zero.

use crate::error::AppResult;
use sqlx::SqliteConnection;

/// Decrement stock for a product, only if enough is available.
///
/// Returns `false` when the product is missing or the remaining stock is
/// short; nothing is written in that case.
pub async fn reserve_stock(
    conn: &mut SqliteConnection,
    product_id: i64,
    quantity: i64,
) -> AppResult<bool> {
    let result =
        sqlx::query("UPDATE products SET quantity = quantity - ?1 WHERE id = ?2 AND quantity >= ?1")
            .bind(quantity)
            .bind(product_id)
            .execute(conn)
            .await?;

    Ok(result.rows_affected() > 0)
}

/// Give reserved stock back to a product (cancellation, rejection).
///
/// Returns `false` when the product no longer exists; callers treat that as
/// best-effort and move on.
pub async fn restore_stock(
    conn: &mut SqliteConnection,
    product_id: i64,
    quantity: i64,
) -> AppResult<bool> {
    let result = sqlx::query("UPDATE products SET quantity = quantity + ?1 WHERE id = ?2")
        .bind(quantity)
        .bind(product_id)
        .execute(conn)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sqlx::SqlitePool;
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

    async fn seed_product(pool: &SqlitePool, quantity: i64) -> i64 {
        sqlx::query("INSERT INTO stores (name, address, created_at) VALUES ('Main', '', ?)")
            .bind(Utc::now())
            .execute(pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO products (store_id, name, price, quantity, created_at) VALUES (1, 'Momo', 250, ?, ?)",
        )
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

    #[tokio::test]
    async fn test_reserve_stock_decrements() {
        let pool = test_pool().await;
        let product_id = seed_product(&pool, 5).await;

        let mut conn = pool.acquire().await.unwrap();
        assert!(reserve_stock(&mut conn, product_id, 3).await.unwrap());
        drop(conn);

        assert_eq!(stock(&pool, product_id).await, 2);
    }

    #[tokio::test]
    async fn test_reserve_stock_insufficient_leaves_stock_untouched() {
        let pool = test_pool().await;
        let product_id = seed_product(&pool, 2).await;

        let mut conn = pool.acquire().await.unwrap();
        assert!(!reserve_stock(&mut conn, product_id, 3).await.unwrap());
        drop(conn);

        assert_eq!(stock(&pool, product_id).await, 2);
    }

    #[tokio::test]
    async fn test_reserve_stock_missing_product() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        assert!(!reserve_stock(&mut conn, 999, 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_restore_stock_increments() {
        let pool = test_pool().await;
        let product_id = seed_product(&pool, 2).await;

        let mut conn = pool.acquire().await.unwrap();
        assert!(restore_stock(&mut conn, product_id, 3).await.unwrap());
        assert!(!restore_stock(&mut conn, 999, 3).await.unwrap());
        drop(conn);

        assert_eq!(stock(&pool, product_id).await, 5);
    }
}
