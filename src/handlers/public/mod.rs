// handlers/public/mod.rs - endpoints that need no token
//
// Service info, OTP login, password reset and the storefront developer API.

pub mod developer;
pub mod otp;
pub mod password_reset;
pub mod root;
