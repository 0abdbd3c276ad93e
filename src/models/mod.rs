pub mod cart;
pub mod common;
pub mod order;
pub mod pagination;
pub mod payment;
pub mod product;
pub mod store;

pub use cart::*;
pub use common::*;
pub use order::*;
pub use pagination::*;
pub use payment::*;
pub use product::*;
pub use store::*;
