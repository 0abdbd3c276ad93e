pub mod code_generator;
pub mod jwt;

pub use code_generator::{codes_match, generate_otp, generate_pickup_code};
pub use jwt::*;
