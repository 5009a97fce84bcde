//! 보호된 작업별 권한 검사.
//!
//! 작업 식별자 → 허용 역할 집합의 정적 정책 테이블과, 토큰 검증 →
//! 폐기 확인 → 역할 검사 순서의 검사 파이프라인으로 구성됩니다.
//! 각 단계는 첫 거부에서 단락(short-circuit)합니다.
//!
//! 가드는 갱신을 직접 트리거하지 않습니다. [`AuthError::TokenExpired`]를
//! 구분해 반환하면 호출자가 [`crate::RefreshCoordinator`]로 갱신한 뒤 한 번
//! 재시도합니다.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use shop_core::{Identity, Role};

use crate::error::AuthError;
use crate::session::SessionManager;
use crate::token::{AccessClaims, TokenCodec};

/// 작업별 허용 역할 정책.
///
/// 빈 역할 집합은 "인증된 모든 신원 허용"을 의미합니다.
/// 선언되지 않은 작업은 기본 거부입니다.
#[derive(Debug, Clone, Default)]
pub struct RolePolicy {
    rules: HashMap<String, HashSet<Role>>,
}

impl RolePolicy {
    /// 빈 정책 테이블 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 작업에 허용 역할 집합을 선언합니다.
    pub fn require(
        mut self,
        operation: impl Into<String>,
        roles: impl IntoIterator<Item = Role>,
    ) -> Self {
        self.rules
            .insert(operation.into(), roles.into_iter().collect());
        self
    }

    /// 인증만 요구하는 작업을 선언합니다 (역할 무관).
    pub fn allow_authenticated(mut self, operation: impl Into<String>) -> Self {
        self.rules.insert(operation.into(), HashSet::new());
        self
    }

    /// 작업에 선언된 역할 집합을 조회합니다.
    pub fn required_for(&self, operation: &str) -> Option<&HashSet<Role>> {
        self.rules.get(operation)
    }
}

/// 작업별 권한 검사기.
///
/// 호출마다 (토큰, 정책)의 순수 함수로 동작하며, 세션 레지스트리의
/// 폐기 토큰 목록만 추가로 참조합니다. 세션 레코드 존재 여부는 검사하지
/// 않으므로 서명이 유효한 토큰은 등록된 세션 없이도 통과합니다
/// (상태 없는 JWT 검증).
pub struct AccessGuard {
    codec: Arc<TokenCodec>,
    sessions: SessionManager,
    policy: RolePolicy,
}

impl AccessGuard {
    /// 새 가드 생성.
    pub fn new(codec: Arc<TokenCodec>, sessions: SessionManager, policy: RolePolicy) -> Self {
        Self {
            codec,
            sessions,
            policy,
        }
    }

    /// Access 토큰을 검증하고 요구 역할 집합을 적용합니다.
    ///
    /// 빈 `required`는 인증된 모든 신원을 통과시킵니다.
    pub async fn authorize(
        &self,
        access_token: &str,
        required: &HashSet<Role>,
    ) -> Result<Identity, AuthError> {
        let claims = self.check_token(access_token)?;
        self.check_revocation(access_token).await?;
        self.check_role(&claims, required)?;

        Ok(claims.identity())
    }

    /// 선언된 작업 식별자에 대해 권한을 검사합니다.
    ///
    /// 정책 테이블에 없는 작업은 거부됩니다.
    pub async fn authorize_operation(
        &self,
        access_token: &str,
        operation: &str,
    ) -> Result<Identity, AuthError> {
        let claims = self.check_token(access_token)?;
        self.check_revocation(access_token).await?;

        let required = self.policy.required_for(operation).ok_or_else(|| {
            debug!(operation, "Operation not declared in role policy");
            AuthError::Forbidden
        })?;
        self.check_role(&claims, required)?;

        Ok(claims.identity())
    }

    /// 1단계: 토큰 검증.
    ///
    /// 만료는 갱신을 유도해야 하므로 [`AuthError::TokenExpired`]로 유지하고,
    /// 서명 불일치/구조 오류는 [`AuthError::Unauthenticated`]로 수렴합니다.
    fn check_token(&self, access_token: &str) -> Result<AccessClaims, AuthError> {
        if access_token.is_empty() {
            return Err(AuthError::Unauthenticated);
        }

        self.codec.verify_access(access_token).map_err(|e| match e {
            AuthError::TokenExpired => AuthError::TokenExpired,
            _ => AuthError::Unauthenticated,
        })
    }

    /// 2단계: 폐기 확인.
    ///
    /// 서명이 유효하고 TTL이 남아 있어도 폐기된 토큰은 거부합니다.
    /// 폐기 목록은 레코드 교체(재로그인) 이후에도 유지되므로 한 번 폐기된
    /// 토큰이 다시 통과하는 일은 없습니다.
    async fn check_revocation(&self, access_token: &str) -> Result<(), AuthError> {
        if self.sessions.is_access_revoked(access_token).await {
            return Err(AuthError::SessionRevoked);
        }
        Ok(())
    }

    /// 3단계: 역할 검사.
    fn check_role(&self, claims: &AccessClaims, required: &HashSet<Role>) -> Result<(), AuthError> {
        if required.is_empty() || required.contains(&claims.role) {
            Ok(())
        } else {
            debug!(
                user_id = %claims.sub,
                role = %claims.role,
                "Role not in required set"
            );
            Err(AuthError::Forbidden)
        }
    }
}
