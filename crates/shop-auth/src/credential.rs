//! 로그인 자격증명 검증.
//!
//! 저장된 Argon2 해시에 대해 제시된 비밀번호를 검증합니다.
//! 식별자와 비밀번호 중 어느 쪽이 틀렸는지 에러로도, 타이밍으로도
//! 드러내지 않습니다.

use std::sync::{Arc, OnceLock};

use tracing::debug;

use shop_core::Identity;

use crate::error::AuthError;
use crate::password::{hash_password, verify_password};
use crate::store::UserStore;

/// 미등록 식별자에 대해서도 검증 비용을 지불하기 위한 더미 해시.
///
/// 조회 실패 시 즉시 반환하면 응답 시간으로 식별자 존재 여부가
/// 드러나므로, 실제 해시와 같은 파라미터의 검증을 한 번 수행합니다.
fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| {
        hash_password("dummy-password-for-timing-equalization")
            .unwrap_or_else(|_| String::new())
    })
}

/// 자격증명 검증기.
pub struct CredentialValidator {
    store: Arc<dyn UserStore>,
}

impl CredentialValidator {
    /// 사용자 저장소를 연결해 검증기를 생성합니다.
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// 이메일/비밀번호 쌍을 검증하고 신원을 반환합니다.
    ///
    /// 조회 실패, 해시 불일치, 저장소 에러 모두 동일한
    /// [`AuthError::InvalidCredentials`]로 수렴합니다.
    pub async fn validate(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let record = match self.store.find_by_email(email).await {
            Ok(record) => record,
            Err(_) => None,
        };

        match record {
            Some(record) => {
                verify_password(password, &record.password_hash)
                    .map_err(|_| AuthError::InvalidCredentials)?;

                debug!(user_id = %record.identity.id, "Credential validation succeeded");
                Ok(record.identity)
            }
            None => {
                // 미등록 식별자도 같은 비용을 지불
                let _ = verify_password(password, dummy_hash());
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryUserStore;
    use shop_core::Role;

    async fn store_with_user() -> Arc<InMemoryUserStore> {
        let store = Arc::new(InMemoryUserStore::new());
        store
            .insert(Identity::new("u1", "a@b.com", Role::Customer), "secret123")
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_valid_credentials() {
        let validator = CredentialValidator::new(store_with_user().await);

        let identity = validator.validate("a@b.com", "secret123").await.unwrap();
        assert_eq!(identity.id.as_str(), "u1");
        assert_eq!(identity.role, Role::Customer);
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let validator = CredentialValidator::new(store_with_user().await);

        assert_eq!(
            validator.validate("a@b.com", "wrong-password").await,
            Err(AuthError::InvalidCredentials)
        );
    }

    #[tokio::test]
    async fn test_unknown_email_same_error() {
        let validator = CredentialValidator::new(store_with_user().await);

        // 미등록 이메일과 비밀번호 오류가 같은 에러를 반환해야 합니다
        assert_eq!(
            validator.validate("nobody@b.com", "secret123").await,
            Err(AuthError::InvalidCredentials)
        );
    }
}
