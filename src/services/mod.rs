pub mod design_service;
pub mod otp_service;
pub mod password_reset;
pub mod product_service;

pub use design_service::{CreatedDesign, DesignService, Mutation};
pub use otp_service::{LoginSession, OtpError, OtpService, SessionUser};
pub use password_reset::{PasswordResetService, ResetError};
pub use product_service::{ProductError, ProductService, SettingsPatch};
