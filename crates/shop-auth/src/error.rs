//! 인증 코어의 에러 타입.
//!
//! 갱신 결과를 여러 대기자에게 브로드캐스트해야 하므로 `Clone`을 구현합니다.

use thiserror::Error;

/// 인증/권한 부여 에러.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// 자격증명 불일치 (식별자/비밀번호 중 어느 쪽이 틀렸는지 구분하지 않음)
    #[error("잘못된 자격증명입니다")]
    InvalidCredentials,

    /// 서명 불일치 또는 잘못된 토큰 구조
    #[error("유효하지 않은 토큰")]
    TokenInvalid,

    /// 토큰 만료 (갱신 시도를 유도하는 유일한 신호)
    #[error("토큰이 만료되었습니다")]
    TokenExpired,

    /// 저장된 세션과 일치하지 않는 refresh 토큰 (회전된 토큰 재사용 포함)
    #[error("유효하지 않은 refresh 토큰")]
    RefreshTokenInvalid,

    /// refresh 토큰 자체의 만료
    #[error("refresh 토큰이 만료되었습니다")]
    RefreshTokenExpired,

    /// 폐기된 세션
    #[error("폐기된 세션입니다")]
    SessionRevoked,

    /// 역할 부족
    #[error("권한이 부족합니다")]
    Forbidden,

    /// 인증되지 않은 호출자 (토큰 누락 또는 검증 불가)
    #[error("인증이 필요합니다")]
    Unauthenticated,

    /// 갱신 작업 타임아웃
    #[error("토큰 갱신 시간 초과")]
    RefreshTimeout,
}

impl AuthError {
    /// 호출자가 refresh 후 한 번 재시도해야 하는 에러인지 확인합니다.
    pub fn should_refresh(&self) -> bool {
        matches!(self, AuthError::TokenExpired | AuthError::Unauthenticated)
    }

    /// 재인증(재로그인)이 필요한 종단 에러인지 확인합니다.
    pub fn requires_reauth(&self) -> bool {
        matches!(
            self,
            AuthError::Forbidden
                | AuthError::SessionRevoked
                | AuthError::RefreshTokenExpired
                | AuthError::RefreshTokenInvalid
        )
    }

    /// 백오프 후 재시도 가능한 에러인지 확인합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::RefreshTimeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_refresh() {
        assert!(AuthError::TokenExpired.should_refresh());
        assert!(AuthError::Unauthenticated.should_refresh());
        assert!(!AuthError::Forbidden.should_refresh());
    }

    #[test]
    fn test_requires_reauth() {
        assert!(AuthError::SessionRevoked.requires_reauth());
        assert!(AuthError::RefreshTokenExpired.requires_reauth());
        assert!(AuthError::RefreshTokenInvalid.requires_reauth());
        assert!(!AuthError::TokenExpired.requires_reauth());
        assert!(!AuthError::RefreshTimeout.requires_reauth());
    }

    #[test]
    fn test_retryable() {
        assert!(AuthError::RefreshTimeout.is_retryable());
        assert!(!AuthError::InvalidCredentials.is_retryable());
    }

    #[test]
    fn test_credential_error_is_uniform() {
        // 식별자 오류와 비밀번호 오류가 같은 메시지를 공유해야 합니다
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "잘못된 자격증명입니다"
        );
    }
}
