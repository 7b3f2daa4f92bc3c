pub mod manager;
pub mod memory;
pub mod models;
pub mod product_store;
pub mod schema;
pub mod user_directory;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::{MemoryProductStore, MemoryUserDirectory};
pub use product_store::{PgProductStore, ProductStore};
pub use schema::ensure_schema;
pub use user_directory::{PgUserDirectory, UserDirectory};
