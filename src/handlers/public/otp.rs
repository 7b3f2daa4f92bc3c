// handlers/public/otp.rs - OTP login
//
// POST /api/request-otp  { email, password } → code sent by mail
// POST /api/verify-otp   { email, otp }      → { token, user }
// POST /api/login        always rejected, points at the OTP flow

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::LoginSession;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct OtpRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct OtpVerification {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub otp: String,
}

#[derive(Debug, Serialize)]
pub struct OtpSent {
    pub message: &'static str,
    pub email: String,
}

pub async fn request_otp(
    State(state): State<AppState>,
    payload: Result<Json<OtpRequest>, JsonRejection>,
) -> ApiResult<OtpSent> {
    let Json(body) = payload?;
    state.otp.request(&body.email, &body.password).await?;

    Ok(ApiResponse::success(OtpSent {
        message: "OTP sent successfully to your email",
        email: body.email.trim().to_string(),
    }))
}

pub async fn verify_otp(
    State(state): State<AppState>,
    payload: Result<Json<OtpVerification>, JsonRejection>,
) -> ApiResult<LoginSession> {
    let Json(body) = payload?;
    let session = state.otp.verify(&body.email, &body.otp).await?;
    Ok(ApiResponse::success(session))
}

pub async fn login() -> ApiError {
    ApiError::bad_request(
        "Please use OTP verification. Use /api/request-otp first, then /api/verify-otp.",
    )
}
