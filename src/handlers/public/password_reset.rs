// handlers/public/password_reset.rs - emailed password reset
//
// POST /api/forgot-password     { email }                                   → link sent by mail
// POST /api/verify-reset-token  { email, token }                            → { valid: true }
// POST /api/reset-password      { email, token, newPassword, confirmPassword }

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ForgotPassword {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetToken {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPassword {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Debug, Serialize)]
pub struct ResetLinkSent {
    pub message: &'static str,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct TokenValid {
    pub message: &'static str,
    pub valid: bool,
}

#[derive(Debug, Serialize)]
pub struct PasswordChanged {
    pub message: &'static str,
}

pub async fn forgot_password(
    State(state): State<AppState>,
    payload: Result<Json<ForgotPassword>, JsonRejection>,
) -> ApiResult<ResetLinkSent> {
    let Json(body) = payload?;
    state.password_reset.request(&body.email).await?;

    Ok(ApiResponse::success(ResetLinkSent {
        message: "Password reset link sent to your email",
        email: body.email.trim().to_string(),
    }))
}

pub async fn verify_reset_token(
    State(state): State<AppState>,
    payload: Result<Json<ResetToken>, JsonRejection>,
) -> ApiResult<TokenValid> {
    let Json(body) = payload?;
    state.password_reset.verify(&body.email, &body.token).await?;

    Ok(ApiResponse::success(TokenValid {
        message: "Token verified successfully",
        valid: true,
    }))
}

pub async fn reset_password(
    State(state): State<AppState>,
    payload: Result<Json<NewPassword>, JsonRejection>,
) -> ApiResult<PasswordChanged> {
    let Json(body) = payload?;
    state
        .password_reset
        .reset(
            &body.email,
            &body.token,
            &body.new_password,
            &body.confirm_password,
        )
        .await?;

    Ok(ApiResponse::success(PasswordChanged {
        message: "Password reset successfully",
    }))
}
