//! 인증 서비스 진입점.
//!
//! 외부 HTTP 계층이 소비하는 작업 표면을 제공합니다:
//! login / refresh / authorize / logout.
//!
//! 검증기, 세션 관리자, 갱신 조정자, 가드를 하나로 묶는 조립 지점입니다.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use shop_core::{AuthConfig, Identity, Role, UserId};

use crate::credential::CredentialValidator;
use crate::error::AuthError;
use crate::guard::{AccessGuard, RolePolicy};
use crate::refresh::RefreshCoordinator;
use crate::session::{Session, SessionManager};
use crate::store::UserStore;
use crate::token::{TokenCodec, TokenPair};

/// 로그인 응답.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponse {
    /// 발급된 토큰 쌍
    pub tokens: TokenPair,
    /// 인증된 신원
    pub identity: Identity,
}

/// 인증 서비스.
pub struct AuthService {
    codec: Arc<TokenCodec>,
    validator: CredentialValidator,
    sessions: SessionManager,
    coordinator: RefreshCoordinator,
    guard: AccessGuard,
}

impl AuthService {
    /// 사용자 저장소, 인증 설정, 역할 정책으로 서비스를 조립합니다.
    pub fn new(store: Arc<dyn UserStore>, config: &AuthConfig, policy: RolePolicy) -> Self {
        let codec = Arc::new(TokenCodec::new(config));
        let sessions = SessionManager::new(Arc::clone(&codec), config);
        let coordinator = RefreshCoordinator::new(Arc::new(sessions.clone()), config);
        let guard = AccessGuard::new(Arc::clone(&codec), sessions.clone(), policy);

        Self {
            codec,
            validator: CredentialValidator::new(store),
            sessions,
            coordinator,
            guard,
        }
    }

    /// 로그인: 자격증명 검증 후 새 세션을 발급합니다.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let identity = self.validator.validate(email, password).await?;
        let session = self.sessions.issue(&identity).await?;

        info!(user_id = %identity.id, "Login succeeded");
        Ok(LoginResponse {
            tokens: self.pair_from(&session),
            identity,
        })
    }

    /// 토큰 갱신: 같은 세션의 동시 요청은 single-flight로 조정됩니다.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        // 세션 키를 얻으려면 먼저 토큰 자체가 검증되어야 합니다
        let claims = self.codec.verify_refresh(refresh_token).map_err(|e| match e {
            AuthError::TokenExpired => AuthError::RefreshTokenExpired,
            _ => AuthError::RefreshTokenInvalid,
        })?;

        let user_id = UserId::from(claims.sub.as_str());
        let session = self.coordinator.refresh(&user_id, refresh_token).await?;

        Ok(self.pair_from(&session))
    }

    /// 요구 역할 집합에 대해 권한을 검사합니다.
    pub async fn authorize(
        &self,
        access_token: &str,
        required: &HashSet<Role>,
    ) -> Result<Identity, AuthError> {
        self.guard.authorize(access_token, required).await
    }

    /// 선언된 작업 식별자에 대해 권한을 검사합니다.
    pub async fn authorize_operation(
        &self,
        access_token: &str,
        operation: &str,
    ) -> Result<Identity, AuthError> {
        self.guard.authorize_operation(access_token, operation).await
    }

    /// 로그아웃: 세션을 폐기합니다.
    pub async fn logout(&self, user_id: &UserId) -> bool {
        self.sessions.revoke(user_id).await
    }

    /// 세션 관리자 참조 (운영/점검용).
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    fn pair_from(&self, session: &Session) -> TokenPair {
        TokenPair {
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            expires_in: self.codec.access_ttl_secs(),
            token_type: "Bearer".to_string(),
        }
    }
}
