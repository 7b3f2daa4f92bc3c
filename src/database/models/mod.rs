pub mod product;
pub mod user;

pub use product::{
    ColumnSnapshot, MediaColumn, NewProduct, ProductKey, ProductRow, SettingsUpdate,
};
pub use user::LoginUser;
