pub mod cart_service;
pub mod inventory;
pub mod order_service;
pub mod payment_service;

pub use cart_service::*;
pub use order_service::*;
pub use payment_service::*;
