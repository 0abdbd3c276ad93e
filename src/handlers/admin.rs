use crate::handlers::require_admin;
use crate::models::*;
use crate::services::{OrderService, PaymentService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;
use std::str::FromStr;

use crate::error::AppError;

#[utoipa::path(
    get,
    path = "/admin/payments",
    tag = "admin",
    params(
        ("status" = Option<String>, Query, description = "Filter: PENDING, VERIFIED or REJECTED"),
        ("page" = Option<i64>, Query, description = "Page number, starting at 1"),
        ("limit" = Option<i64>, Query, description = "Page size, 1 to 100"),
        ("sort_by" = Option<String>, Query, description = "created_at, amount or status"),
        ("sort_order" = Option<String>, Query, description = "asc or desc")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Payments retrieved"),
        (status = 400, description = "Invalid pagination or sort parameters")
    )
)]
pub async fn get_all_payments(
    payment_service: web::Data<PaymentService>,
    req: HttpRequest,
    query: web::Query<PaymentListQuery>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }

    match payment_service.get_all_payments(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Payments retrieved",
            "data": page.items,
            "pagination": page.pagination
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/payments/pending",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Pending payments retrieved"))
)]
pub async fn get_pending_payments(
    payment_service: web::Data<PaymentService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }

    match payment_service.get_pending_payments().await {
        Ok(payments) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Pending payments retrieved",
            "data": payments
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/payments/{payment_id}/verify",
    tag = "admin",
    params(("payment_id" = i64, Path, description = "Payment id")),
    request_body = VerifyPaymentRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Payment decision recorded"),
        (status = 400, description = "Payment already processed"),
        (status = 404, description = "Payment not found")
    )
)]
pub async fn verify_payment(
    payment_service: web::Data<PaymentService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<VerifyPaymentRequest>,
) -> Result<HttpResponse> {
    let admin = match require_admin(&req) {
        Ok(admin) => admin,
        Err(e) => return Ok(e.error_response()),
    };

    match payment_service
        .verify_payment(path.into_inner(), admin.id, &body)
        .await
    {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Payment decision recorded",
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/orders/{order_id}/status",
    tag = "admin",
    params(("order_id" = i64, Path, description = "Order id")),
    request_body = UpdateOrderStatusRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order status updated"),
        (status = 400, description = "Status not settable by admin override"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn update_order_status(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateOrderStatusRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }

    match order_service
        .admin_update_order_status(path.into_inner(), body.status)
        .await
    {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Order status updated",
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/orders/{order_id}/verify-otp",
    tag = "admin",
    params(("order_id" = i64, Path, description = "Order id")),
    request_body = VerifyOtpRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order collected"),
        (status = 400, description = "Invalid OTP or order not ready for collection"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn verify_otp(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<VerifyOtpRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }

    match order_service
        .admin_verify_otp(path.into_inner(), &body.otp)
        .await
    {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Order collected",
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/admin/orders/{order_id}",
    tag = "admin",
    params(("order_id" = i64, Path, description = "Order id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order deleted"),
        (status = 400, description = "Only cancelled orders can be deleted"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn delete_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }

    match order_service.admin_delete_order(path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Order deleted"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/stores/{store_id}/orders",
    tag = "admin",
    params(("store_id" = i64, Path, description = "Store id")),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Store orders retrieved"))
)]
pub async fn get_store_orders(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }

    match order_service.get_store_orders(path.into_inner()).await {
        Ok(orders) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Store orders retrieved",
            "data": orders
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/stores/{store_id}/orders/status/{status}",
    tag = "admin",
    params(
        ("store_id" = i64, Path, description = "Store id"),
        ("status" = String, Path, description = "Order status filter")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Store orders retrieved"),
        (status = 400, description = "Unknown order status")
    )
)]
pub async fn get_store_orders_by_status(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<(i64, String)>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }

    let (store_id, raw_status) = path.into_inner();
    let status = match OrderStatus::from_str(&raw_status) {
        Ok(status) => status,
        Err(msg) => return Ok(AppError::ValidationError(msg).error_response()),
    };

    match order_service
        .get_store_orders_by_status(store_id, status)
        .await
    {
        Ok(orders) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Store orders retrieved",
            "data": orders
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/payments", web::get().to(get_all_payments))
            .route("/payments/pending", web::get().to(get_pending_payments))
            .route("/payments/{payment_id}/verify", web::put().to(verify_payment))
            .route("/orders/{order_id}/status", web::put().to(update_order_status))
            .route("/orders/{order_id}/verify-otp", web::post().to(verify_otp))
            .route("/orders/{order_id}", web::delete().to(delete_order))
            .route("/stores/{store_id}/orders", web::get().to(get_store_orders))
            .route(
                "/stores/{store_id}/orders/status/{status}",
                web::get().to(get_store_orders_by_status),
            ),
    );
}
