//! 스토어프론트 시스템의 에러 타입.
//!
//! 이 모듈은 스토어프론트 시스템 전반에서 사용되는 에러 타입을 정의합니다.

use thiserror::Error;

/// 핵심 스토어프론트 에러.
#[derive(Debug, Error)]
pub enum ShopError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 인증 에러
    #[error("인증 에러: {0}")]
    Auth(String),

    /// 사용자 저장소 에러
    #[error("사용자 저장소 에러: {0}")]
    Store(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 스토어프론트 작업을 위한 Result 타입.
pub type ShopResult<T> = Result<T, ShopError>;

impl ShopError {
    /// 재시도 가능한 에러인지 확인합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ShopError::Store(_))
    }

    /// 치명적인 에러인지 확인합니다.
    pub fn is_critical(&self) -> bool {
        matches!(self, ShopError::Config(_) | ShopError::Internal(_))
    }
}

impl From<serde_json::Error> for ShopError {
    fn from(err: serde_json::Error) -> Self {
        ShopError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for ShopError {
    fn from(err: config::ConfigError) -> Self {
        ShopError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        let store_err = ShopError::Store("connection refused".to_string());
        assert!(store_err.is_retryable());

        let auth_err = ShopError::Auth("invalid token".to_string());
        assert!(!auth_err.is_retryable());
    }

    #[test]
    fn test_error_critical() {
        let config_err = ShopError::Config("missing jwt secret".to_string());
        assert!(config_err.is_critical());

        let not_found = ShopError::NotFound("user".to_string());
        assert!(!not_found.is_critical());
    }
}
