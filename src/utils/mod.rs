use axum::{Json, http::StatusCode};
use serde::Serialize;

use crate::error::{CharacterError, ErrorKind};
use crate::result::ApiResponse;

pub fn success_to_api_response<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code: error_codes::SUCCESS,
        msg: "success".into(),
        resp_data: Some(data),
    })
}

pub fn error_to_api_response<T>(code: i32, msg: String) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        code,
        msg,
        resp_data: None,
    })
}

/// 把服务层错误转换为状态码与业务错误码
pub fn character_error_response<T>(err: &CharacterError) -> (StatusCode, Json<ApiResponse<T>>) {
    let (status, code) = match err {
        CharacterError::NoFurtherLevels { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, error_codes::NO_FURTHER_LEVELS)
        }
        CharacterError::InsufficientFunds { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, error_codes::INSUFFICIENT_FUNDS)
        }
        CharacterError::SkinNotOpened { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, error_codes::SKIN_NOT_OPENED)
        }
        _ => match err.kind() {
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND),
            ErrorKind::Conflict => (StatusCode::CONFLICT, error_codes::CONFLICT),
            ErrorKind::Payment => (StatusCode::BAD_GATEWAY, error_codes::PAYMENT_FAILED),
            ErrorKind::Policy => (StatusCode::UNPROCESSABLE_ENTITY, error_codes::POLICY_VIOLATION),
            ErrorKind::Infrastructure => {
                (StatusCode::INTERNAL_SERVER_ERROR, error_codes::INTERNAL_ERROR)
            }
        },
    };

    // 基础设施错误不把内部细节暴露给调用方
    let msg = match err.kind() {
        ErrorKind::Infrastructure => "内部服务器错误".to_string(),
        _ => err.to_string(),
    };

    (status, error_to_api_response(code, msg))
}

pub mod error_codes {
    pub const SUCCESS: i32 = 0;
    pub const VALIDATION_ERROR: i32 = 1000;
    pub const NOT_FOUND: i32 = 1004;
    pub const CONFLICT: i32 = 1006;
    pub const POLICY_VIOLATION: i32 = 2000;
    pub const INSUFFICIENT_FUNDS: i32 = 2001;
    pub const NO_FURTHER_LEVELS: i32 = 2002;
    pub const SKIN_NOT_OPENED: i32 = 2003;
    pub const PAYMENT_FAILED: i32 = 3001;
    pub const INTERNAL_ERROR: i32 = 5000;
}
