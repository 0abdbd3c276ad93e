pub mod admin;
pub mod cart;
pub mod order;
pub mod payment;

pub use admin::admin_config;
pub use cart::cart_config;
pub use order::order_config;
pub use payment::payment_config;

use crate::error::{AppError, AppResult};
use crate::middlewares::CurrentUser;
use actix_web::{HttpMessage, HttpRequest};

pub(crate) fn current_user(req: &HttpRequest) -> AppResult<CurrentUser> {
    req.extensions()
        .get::<CurrentUser>()
        .cloned()
        .ok_or_else(|| AppError::AuthError("Missing authentication context".to_string()))
}

pub(crate) fn require_admin(req: &HttpRequest) -> AppResult<CurrentUser> {
    let user = current_user(req)?;
    if !user.is_admin() {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }
    Ok(user)
}
