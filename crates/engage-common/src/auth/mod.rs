//! Session token validation

mod jwt;

pub use jwt::{Claims, JwtService, TokenType};
