/*
 * Responsibility
 * - /auth 系 handler の入出力 DTO
 * - form の最小限の validation (空チェック)
 */
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Default, Deserialize)]
pub struct LoginPageQuery {
    pub next: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginPageResponse {
    pub next: String,
    pub reason: String,
    pub authenticated: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.email.trim().is_empty() {
            return Err(AppError::bad_request("INVALID_FORM", "email is required"));
        }
        if self.password.is_empty() {
            return Err(AppError::bad_request("INVALID_FORM", "password is required"));
        }
        Ok(())
    }
}
