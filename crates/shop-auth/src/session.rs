//! 세션 수명 주기 관리.
//!
//! 사용자당 정확히 하나의 권위 있는 세션 레코드를 소유하고,
//! 발급(issue)/회전(rotate)/폐기(revoke)를 통해서만 변경합니다.
//!
//! 모든 변경은 레지스트리 쓰기 락 아래에서 레코드 전체를 교체하므로
//! 읽기 측은 항상 완전히 쓰인 세션 상태만 관찰합니다.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use shop_core::{AuthConfig, Identity, UserId};

use crate::error::AuthError;
use crate::token::TokenCodec;

/// 권위 있는 세션 레코드.
///
/// 신원과 현재 토큰 쌍, 폐기 상태를 묶습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// 세션의 주체 신원
    pub identity: Identity,
    /// 현재 Access Token
    pub access_token: String,
    /// 현재 Refresh Token (1회용 - 회전 시 교체)
    pub refresh_token: String,
    /// Access Token 만료 시각
    pub access_expires_at: DateTime<Utc>,
    /// Refresh Token 만료 시각
    pub refresh_expires_at: DateTime<Utc>,
    /// 폐기 여부
    pub revoked: bool,
}

impl Session {
    /// Access Token이 만료되었는지 확인.
    pub fn is_access_expired(&self) -> bool {
        self.access_expires_at <= Utc::now()
    }

    /// Refresh Token이 만료되었는지 확인.
    pub fn is_refresh_expired(&self) -> bool {
        self.refresh_expires_at <= Utc::now()
    }

    /// 인증 헤더 값 반환.
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

/// 세션 레지스트리.
///
/// 현재 세션과 폐기된 access 토큰 목록을 하나의 락 아래에 묶어
/// 폐기가 레코드 교체와 원자적으로 일관되게 합니다.
#[derive(Debug, Default)]
struct SessionRegistry {
    sessions: HashMap<UserId, Session>,
    /// 폐기 시점의 access 토큰 → 그 토큰의 만료 시각.
    ///
    /// 재로그인으로 세션 레코드가 교체되어도 이 목록은 유지되므로
    /// 폐기된 토큰은 남은 TTL과 무관하게 다시 통과하지 못합니다.
    revoked_access: HashMap<String, DateTime<Utc>>,
}

/// 세션 관리자.
///
/// 세션 레지스트리의 유일한 변경자입니다.
/// `Clone`은 내부 상태를 공유합니다 (Arc).
#[derive(Clone)]
pub struct SessionManager {
    codec: Arc<TokenCodec>,
    registry: Arc<RwLock<SessionRegistry>>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl SessionManager {
    /// 새 세션 관리자 생성.
    pub fn new(codec: Arc<TokenCodec>, config: &AuthConfig) -> Self {
        Self {
            codec,
            registry: Arc::new(RwLock::new(SessionRegistry::default())),
            access_ttl: Duration::minutes(config.access_ttl_minutes),
            refresh_ttl: Duration::days(config.refresh_ttl_days),
        }
    }

    /// 새 세션을 발급합니다.
    ///
    /// 기존 세션이 있으면 통째로 교체됩니다. 이전 세션의 refresh 토큰은
    /// 더 이상 저장된 값과 일치하지 않으므로 자연히 무효화됩니다.
    pub async fn issue(&self, identity: &Identity) -> Result<Session, AuthError> {
        let pair = self.codec.create_token_pair(identity)?;
        let now = Utc::now();

        let session = Session {
            identity: identity.clone(),
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            access_expires_at: now + self.access_ttl,
            refresh_expires_at: now + self.refresh_ttl,
            revoked: false,
        };

        {
            // 폐기 토큰 목록은 건드리지 않습니다. 재로그인이 이전 폐기를
            // 되돌려서는 안 되기 때문입니다.
            let mut registry = self.registry.write().await;
            registry.sessions.insert(identity.id.clone(), session.clone());
        }

        info!(user_id = %identity.id, role = %identity.role, "Session issued");
        Ok(session)
    }

    /// 제시된 refresh 토큰으로 세션을 회전합니다.
    ///
    /// refresh 토큰은 1회용입니다: 회전에 성공하면 새 쌍이 저장되고,
    /// 이미 회전된 토큰의 재사용은 [`AuthError::RefreshTokenInvalid`]로
    /// 거부됩니다. 검증과 교체가 하나의 쓰기 락 아래에서 수행되므로
    /// 부분 변경이 노출되지 않습니다.
    pub async fn rotate(
        &self,
        user_id: &UserId,
        presented_refresh: &str,
    ) -> Result<Session, AuthError> {
        let mut registry = self.registry.write().await;

        let current = registry
            .sessions
            .get(user_id)
            .ok_or(AuthError::RefreshTokenInvalid)?;

        if current.revoked {
            warn!(user_id = %user_id, "Rotation attempted on revoked session");
            return Err(AuthError::SessionRevoked);
        }

        if current.refresh_token != presented_refresh {
            // 회전된 토큰의 재사용 또는 위조 - 구분하지 않고 거부
            warn!(user_id = %user_id, "Presented refresh token does not match stored session");
            return Err(AuthError::RefreshTokenInvalid);
        }

        if current.is_refresh_expired() {
            return Err(AuthError::RefreshTokenExpired);
        }

        let identity = current.identity.clone();
        let pair = self.codec.create_token_pair(&identity)?;
        let now = Utc::now();

        let rotated = Session {
            identity: identity.clone(),
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            access_expires_at: now + self.access_ttl,
            refresh_expires_at: now + self.refresh_ttl,
            revoked: false,
        };

        registry.sessions.insert(user_id.clone(), rotated.clone());

        info!(user_id = %user_id, "Session rotated");
        Ok(rotated)
    }

    /// 세션을 폐기합니다.
    ///
    /// 레코드는 제거하지 않고 폐기 표시를 남기며, 현재 access 토큰을
    /// 폐기 목록에 추가합니다. 이 목록은 이후 `issue`로 레코드가 교체되어도
    /// 유지되므로, 폐기된 토큰은 재로그인 뒤에도 권한 검사를 통과하지
    /// 못합니다.
    pub async fn revoke(&self, user_id: &UserId) -> bool {
        let now = Utc::now();
        let mut registry = self.registry.write().await;
        let registry = &mut *registry;

        // 이미 만료된 폐기 항목은 검증 단계에서 걸러지므로 함께 정리
        registry.revoked_access.retain(|_, expires_at| *expires_at > now);

        match registry.sessions.get_mut(user_id) {
            Some(session) => {
                session.revoked = true;
                let token = session.access_token.clone();
                let expires_at = session.access_expires_at;
                registry.revoked_access.insert(token, expires_at);
                info!(user_id = %user_id, "Session revoked");
                true
            }
            None => false,
        }
    }

    /// 현재 세션 레코드가 폐기 상태인지 확인합니다.
    pub async fn is_revoked(&self, user_id: &UserId) -> bool {
        let registry = self.registry.read().await;
        registry
            .sessions
            .get(user_id)
            .map(|s| s.revoked)
            .unwrap_or(false)
    }

    /// 제시된 access 토큰이 폐기 목록에 있는지 확인합니다.
    ///
    /// 현재 레코드의 폐기 플래그와 달리 레코드 교체 이후에도 참을
    /// 유지합니다.
    pub async fn is_access_revoked(&self, access_token: &str) -> bool {
        let registry = self.registry.read().await;
        let revoked = registry.revoked_access.contains_key(access_token);
        if revoked {
            debug!("Presented access token is on the revocation list");
        }
        revoked
    }

    /// 현재 세션 스냅샷을 반환합니다.
    pub async fn session_for(&self, user_id: &UserId) -> Option<Session> {
        let registry = self.registry.read().await;
        registry.sessions.get(user_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use shop_core::Role;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: SecretString::new("test-secret-key-for-session-testing-32-chars".into()),
            access_ttl_minutes: 15,
            refresh_ttl_days: 7,
            refresh_timeout_secs: 10,
        }
    }

    fn manager(config: &AuthConfig) -> SessionManager {
        SessionManager::new(Arc::new(TokenCodec::new(config)), config)
    }

    fn customer() -> Identity {
        Identity::new("u1", "a@b.com", Role::Customer)
    }

    #[tokio::test]
    async fn test_issue_creates_authoritative_session() {
        let sm = manager(&test_config());
        let session = sm.issue(&customer()).await.unwrap();

        assert!(!session.revoked);
        assert!(!session.is_access_expired());
        assert!(!session.is_refresh_expired());

        let stored = sm.session_for(&UserId::from("u1")).await.unwrap();
        assert_eq!(stored, session);
    }

    #[tokio::test]
    async fn test_reissue_replaces_prior_session() {
        let sm = manager(&test_config());
        let first = sm.issue(&customer()).await.unwrap();
        let second = sm.issue(&customer()).await.unwrap();
        let user_id = UserId::from("u1");

        // 이전 세션의 refresh 토큰은 더 이상 회전할 수 없습니다
        assert_eq!(
            sm.rotate(&user_id, &first.refresh_token).await,
            Err(AuthError::RefreshTokenInvalid)
        );
        assert!(sm.rotate(&user_id, &second.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_rotate_replaces_token_pair() {
        let sm = manager(&test_config());
        let session = sm.issue(&customer()).await.unwrap();
        let user_id = UserId::from("u1");

        let rotated = sm.rotate(&user_id, &session.refresh_token).await.unwrap();

        assert_ne!(rotated.access_token, session.access_token);
        assert_ne!(rotated.refresh_token, session.refresh_token);
        assert_eq!(rotated.identity, session.identity);

        // 저장된 세션이 통째로 교체되었는지 확인
        let stored = sm.session_for(&user_id).await.unwrap();
        assert_eq!(stored, rotated);
    }

    #[tokio::test]
    async fn test_rotated_token_cannot_be_reused() {
        let sm = manager(&test_config());
        let session = sm.issue(&customer()).await.unwrap();
        let user_id = UserId::from("u1");

        sm.rotate(&user_id, &session.refresh_token).await.unwrap();

        // 1회용: 같은 토큰으로 다시 회전하면 거부
        assert_eq!(
            sm.rotate(&user_id, &session.refresh_token).await,
            Err(AuthError::RefreshTokenInvalid)
        );
    }

    #[tokio::test]
    async fn test_rotate_unknown_user() {
        let sm = manager(&test_config());
        assert_eq!(
            sm.rotate(&UserId::from("ghost"), "some-token").await,
            Err(AuthError::RefreshTokenInvalid)
        );
    }

    #[tokio::test]
    async fn test_rotate_expired_refresh_token() {
        let config = AuthConfig {
            refresh_ttl_days: -1,
            ..test_config()
        };
        let sm = manager(&config);
        let session = sm.issue(&customer()).await.unwrap();

        assert_eq!(
            sm.rotate(&UserId::from("u1"), &session.refresh_token).await,
            Err(AuthError::RefreshTokenExpired)
        );
    }

    #[tokio::test]
    async fn test_revoked_session_cannot_rotate() {
        let sm = manager(&test_config());
        let session = sm.issue(&customer()).await.unwrap();
        let user_id = UserId::from("u1");

        assert!(sm.revoke(&user_id).await);
        assert!(sm.is_revoked(&user_id).await);

        assert_eq!(
            sm.rotate(&user_id, &session.refresh_token).await,
            Err(AuthError::SessionRevoked)
        );
    }

    #[tokio::test]
    async fn test_revocation_survives_reissue() {
        let sm = manager(&test_config());
        let first = sm.issue(&customer()).await.unwrap();
        let user_id = UserId::from("u1");

        assert!(sm.revoke(&user_id).await);
        let second = sm.issue(&customer()).await.unwrap();

        // 새 레코드가 발급되어도 폐기된 access 토큰은 목록에 남습니다
        assert!(sm.is_access_revoked(&first.access_token).await);
        assert!(!sm.is_access_revoked(&second.access_token).await);
        assert!(!sm.is_revoked(&user_id).await);
    }

    #[tokio::test]
    async fn test_revoke_unknown_user() {
        let sm = manager(&test_config());
        assert!(!sm.revoke(&UserId::from("ghost")).await);
        assert!(!sm.is_revoked(&UserId::from("ghost")).await);
    }

    #[tokio::test]
    async fn test_failed_rotation_leaves_session_unchanged() {
        let sm = manager(&test_config());
        let session = sm.issue(&customer()).await.unwrap();
        let user_id = UserId::from("u1");

        let _ = sm.rotate(&user_id, "forged-token").await;

        // 실패한 회전은 세션을 변경하지 않습니다
        let stored = sm.session_for(&user_id).await.unwrap();
        assert_eq!(stored, session);
    }
}
