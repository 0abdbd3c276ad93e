use crate::handlers::current_user;
use crate::models::*;
use crate::services::PaymentService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/payments/submit-receipt",
    tag = "payment",
    request_body = SubmitReceiptRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Receipt submitted for verification"),
        (status = 400, description = "Missing receipt or payment already verified"),
        (status = 403, description = "Not the owner of this order"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn submit_receipt(
    payment_service: web::Data<PaymentService>,
    req: HttpRequest,
    body: web::Json<SubmitReceiptRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match payment_service.submit_receipt(user.id, &body).await {
        Ok(payment) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "message": "Receipt submitted for verification",
            "data": payment
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/payments",
    tag = "payment",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Payments retrieved"))
)]
pub async fn get_my_payments(
    payment_service: web::Data<PaymentService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match payment_service.get_user_payments(user.id).await {
        Ok(payments) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Payments retrieved",
            "data": payments
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/payments/{payment_id}",
    tag = "payment",
    params(("payment_id" = i64, Path, description = "Payment id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Payment retrieved"),
        (status = 404, description = "Payment not found")
    )
)]
pub async fn get_payment(
    payment_service: web::Data<PaymentService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match payment_service.get_payment(path.into_inner()).await {
        Ok(payment) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Payment retrieved",
            "data": payment
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/payments/order/{order_id}",
    tag = "payment",
    params(("order_id" = i64, Path, description = "Order id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order payment retrieved"),
        (status = 404, description = "No payment found for this order")
    )
)]
pub async fn get_order_payment(
    payment_service: web::Data<PaymentService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match payment_service.get_order_payment(path.into_inner()).await {
        Ok(payment) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Order payment retrieved",
            "data": payment
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/payments/order/{order_id}/rejected",
    tag = "payment",
    params(("order_id" = i64, Path, description = "Order id")),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Rejected payments retrieved"))
)]
pub async fn get_rejected_payments(
    payment_service: web::Data<PaymentService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match payment_service.get_rejected_payments(path.into_inner()).await {
        Ok(payments) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Rejected payments retrieved",
            "data": payments
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn payment_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payments")
            .route("", web::get().to(get_my_payments))
            .route("/submit-receipt", web::post().to(submit_receipt))
            .route("/order/{order_id}", web::get().to(get_order_payment))
            .route(
                "/order/{order_id}/rejected",
                web::get().to(get_rejected_payments),
            )
            .route("/{payment_id}", web::get().to(get_payment)),
    );
}
