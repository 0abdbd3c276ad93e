use crate::handlers::current_user;
use crate::models::*;
use crate::services::CartService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/cart",
    tag = "cart",
    request_body = AddToCartRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Item added to cart"),
        (status = 400, description = "Insufficient stock"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn add_to_cart(
    cart_service: web::Data<CartService>,
    req: HttpRequest,
    body: web::Json<AddToCartRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match cart_service.add_to_cart(user.id, &body).await {
        Ok(item) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "message": "Item added to cart",
            "data": item
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/cart",
    tag = "cart",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Cart retrieved"))
)]
pub async fn get_cart(cart_service: web::Data<CartService>, req: HttpRequest) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match cart_service.get_user_cart(user.id).await {
        Ok(cart) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Cart retrieved",
            "data": cart
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/cart/{cart_item_id}",
    tag = "cart",
    params(("cart_item_id" = i64, Path, description = "Cart item id")),
    request_body = UpdateCartItemRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Cart item updated"),
        (status = 403, description = "Not the owner of this cart item")
    )
)]
pub async fn update_cart_item(
    cart_service: web::Data<CartService>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateCartItemRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match cart_service
        .update_cart_item(user.id, path.into_inner(), &body)
        .await
    {
        Ok(item) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Cart item updated",
            "data": item
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/cart/{cart_item_id}",
    tag = "cart",
    params(("cart_item_id" = i64, Path, description = "Cart item id")),
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Cart item removed"))
)]
pub async fn remove_cart_item(
    cart_service: web::Data<CartService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match cart_service.remove_from_cart(user.id, path.into_inner()).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Cart item removed"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    delete,
    path = "/cart",
    tag = "cart",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Cart cleared"))
)]
pub async fn clear_cart(cart_service: web::Data<CartService>, req: HttpRequest) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match cart_service.clear_cart(user.id).await {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Cart cleared"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn cart_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/cart")
            .route("", web::post().to(add_to_cart))
            .route("", web::get().to(get_cart))
            .route("", web::delete().to(clear_cart))
            .route("/{cart_item_id}", web::put().to(update_cart_item))
            .route("/{cart_item_id}", web::delete().to(remove_cart_item)),
    );
}
