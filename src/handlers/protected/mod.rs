// handlers/protected/mod.rs - endpoints behind jwt_auth_middleware

pub mod designs;
pub mod line_items;
pub mod products;
