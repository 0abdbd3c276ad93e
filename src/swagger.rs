use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::cart::add_to_cart,
        handlers::cart::get_cart,
        handlers::cart::update_cart_item,
        handlers::cart::remove_cart_item,
        handlers::cart::clear_cart,
        handlers::order::create_order,
        handlers::order::buy_now,
        handlers::order::get_orders,
        handlers::order::get_order,
        handlers::order::cancel_order,
        handlers::payment::submit_receipt,
        handlers::payment::get_my_payments,
        handlers::payment::get_payment,
        handlers::payment::get_order_payment,
        handlers::payment::get_rejected_payments,
        handlers::admin::get_all_payments,
        handlers::admin::get_pending_payments,
        handlers::admin::verify_payment,
        handlers::admin::update_order_status,
        handlers::admin::verify_otp,
        handlers::admin::delete_order,
        handlers::admin::get_store_orders,
        handlers::admin::get_store_orders_by_status,
    ),
    components(
        schemas(
            Store,
            Product,
            CartItem,
            CartLine,
            CartResponse,
            AddToCartRequest,
            UpdateCartItemRequest,
            Order,
            OrderItem,
            OrderResponse,
            OrderStatus,
            OrderPaymentStatus,
            CreateOrderRequest,
            BuyNowRequest,
            CancelOrderRequest,
            UpdateOrderStatusRequest,
            VerifyOtpRequest,
            Payment,
            PaymentStatus,
            SubmitReceiptRequest,
            VerifyPaymentRequest,
            VerifyPaymentResponse,
            PaymentListQuery,
            PaginationParams,
            PaginationInfo,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "cart", description = "Shopping cart API"),
        (name = "order", description = "Order management API"),
        (name = "payment", description = "Receipt submission API"),
        (name = "admin", description = "Administration API"),
    ),
    info(
        title = "Pasal Backend API",
        version = "1.0.0",
        description = "Marketplace backend REST API documentation",
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
