pub mod auth;
pub mod designs;
pub mod items;
pub mod products;
pub mod server;
