use crate::handlers::current_user;
use crate::models::*;
use crate::services::OrderService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/orders",
    tag = "order",
    request_body = CreateOrderRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Order created from cart"),
        (status = 400, description = "Empty cart or insufficient stock"),
        (status = 404, description = "Store not found")
    )
)]
pub async fn create_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match order_service.create_order_from_cart(user.id, &body).await {
        Ok(order) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "message": "Order placed successfully",
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/orders/buy-now",
    tag = "order",
    request_body = BuyNowRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Order created"),
        (status = 400, description = "Insufficient stock"),
        (status = 404, description = "Product or store not found")
    )
)]
pub async fn buy_now(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    body: web::Json<BuyNowRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match order_service.buy_now(user.id, &body).await {
        Ok(order) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "message": "Order placed successfully",
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders",
    tag = "order",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Orders retrieved"))
)]
pub async fn get_orders(order_service: web::Data<OrderService>, req: HttpRequest) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match order_service.get_user_orders(user.id).await {
        Ok(orders) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Orders retrieved",
            "data": orders
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/orders/{order_id}",
    tag = "order",
    params(("order_id" = i64, Path, description = "Order id")),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order retrieved"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn get_order(
    order_service: web::Data<OrderService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match order_service.get_order(path.into_inner()).await {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Order retrieved",
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/orders/{order_id}/cancel",
    tag = "order",
    params(("order_id" = i64, Path, description = "Order id")),
    request_body = CancelOrderRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order cancelled"),
        (status = 400, description = "Order already collected or cancelled"),
        (status = 403, description = "Not the owner of this order"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn cancel_order(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: Option<web::Json<CancelOrderRequest>>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    let reason = body.as_ref().and_then(|b| b.reason.clone());

    match order_service
        .cancel_order(path.into_inner(), user.id, reason.as_deref())
        .await
    {
        Ok(order) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Order cancelled",
            "data": order
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn order_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/orders")
            .route("", web::post().to(create_order))
            .route("", web::get().to(get_orders))
            .route("/buy-now", web::post().to(buy_now))
            .route("/{order_id}", web::get().to(get_order))
            .route("/{order_id}/cancel", web::post().to(cancel_order)),
    );
}
