//! JWT 토큰 처리.
//!
//! Access Token 및 Refresh Token 서명/검증 로직.
//!
//! 코덱은 순수 변환만 수행합니다. 공유 가변 상태가 없으므로
//! 여러 태스크에서 동시에 호출해도 안전합니다.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use shop_core::{AuthConfig, Identity, Role};

use crate::error::AuthError;

/// Refresh 토큰의 `token_type` 클레임 값.
const REFRESH_TOKEN_TYPE: &str = "refresh";

/// JWT Access Token 페이로드.
///
/// 사용자 신원과 역할을 포함합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject - 사용자 ID
    pub sub: String,
    /// 이메일 주소
    pub email: String,
    /// 사용자 역할
    pub role: Role,
    /// Issued At - 토큰 발급 시간 (Unix timestamp)
    pub iat: i64,
    /// Expiration - 토큰 만료 시간 (Unix timestamp)
    pub exp: i64,
    /// JWT ID - 토큰 고유 식별자
    pub jti: String,
}

impl AccessClaims {
    /// 검증된 클레임에서 신원을 복원합니다.
    pub fn identity(&self) -> Identity {
        Identity::new(self.sub.as_str(), self.email.clone(), self.role)
    }
}

/// Refresh Token 페이로드.
///
/// Access Token 갱신에만 사용됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject - 사용자 ID
    pub sub: String,
    /// Issued At
    pub iat: i64,
    /// Expiration
    pub exp: i64,
    /// JWT ID
    pub jti: String,
    /// Token type (항상 "refresh")
    pub token_type: String,
}

/// Access Token + Refresh Token 페어.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access Token
    pub access_token: String,
    /// Refresh Token
    pub refresh_token: String,
    /// Access Token 만료 시간 (초)
    pub expires_in: i64,
    /// 토큰 타입 (항상 "Bearer")
    pub token_type: String,
}

impl TokenPair {
    /// 인증 헤더 값 반환.
    pub fn auth_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

/// 토큰 서명/검증 코덱.
///
/// 설정된 비밀 키로 HS256 서명을 수행합니다.
/// Access/Refresh TTL은 [`AuthConfig`]에서 가져옵니다.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenCodec {
    /// 설정에서 코덱을 생성합니다.
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_ttl: Duration::minutes(config.access_ttl_minutes),
            refresh_ttl: Duration::days(config.refresh_ttl_days),
        }
    }

    /// Access Token TTL (초).
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    /// Refresh Token TTL (초).
    pub fn refresh_ttl_secs(&self) -> i64 {
        self.refresh_ttl.num_seconds()
    }

    /// Access Token 생성.
    pub fn create_access_token(&self, identity: &Identity) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: identity.id.to_string(),
            email: identity.email.clone(),
            role: identity.role,
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|_| AuthError::TokenInvalid)
    }

    /// Refresh Token 생성.
    pub fn create_refresh_token(&self, identity: &Identity) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = RefreshClaims {
            sub: identity.id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.refresh_ttl).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: REFRESH_TOKEN_TYPE.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|_| AuthError::TokenInvalid)
    }

    /// Access Token + Refresh Token 쌍 생성.
    pub fn create_token_pair(&self, identity: &Identity) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access_token: self.create_access_token(identity)?,
            refresh_token: self.create_refresh_token(identity)?,
            expires_in: self.access_ttl_secs(),
            token_type: "Bearer".to_string(),
        })
    }

    /// Access Token 검증.
    ///
    /// 만료는 [`AuthError::TokenExpired`]로, 서명 불일치를 포함한 나머지 실패는
    /// [`AuthError::TokenInvalid`]로 구분합니다. 호출자는 이 구분으로
    /// 갱신 시도 여부를 결정합니다.
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, AuthError> {
        let claims = decode::<AccessClaims>(token, &self.decoding, &Self::validation())
            .map(|data| data.claims)
            .map_err(Self::map_decode_error)?;

        Self::check_expiry(claims.exp)?;
        Ok(claims)
    }

    /// Refresh Token 검증.
    ///
    /// `token_type` 클레임이 "refresh"가 아니면 access 토큰을 refresh 용도로
    /// 재사용하려는 시도이므로 거부합니다.
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, AuthError> {
        let claims = decode::<RefreshClaims>(token, &self.decoding, &Self::validation())
            .map(|data| data.claims)
            .map_err(Self::map_decode_error)?;

        if claims.token_type != REFRESH_TOKEN_TYPE {
            return Err(AuthError::TokenInvalid);
        }
        Self::check_expiry(claims.exp)?;
        Ok(claims)
    }

    /// 만료 경계가 정확해야 하므로 leeway 없이 검증합니다.
    fn validation() -> Validation {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.leeway = 0;
        validation
    }

    /// `exp == now`인 경계 처리.
    ///
    /// jsonwebtoken은 `exp < now`만 거부하므로 만료 시각과 같은 초에
    /// 도착한 토큰이 통과합니다. 만료 시각에 도달한 토큰은 만료된 것으로
    /// 취급합니다.
    fn check_expiry(exp: i64) -> Result<(), AuthError> {
        if exp <= Utc::now().timestamp() {
            return Err(AuthError::TokenExpired);
        }
        Ok(())
    }

    fn map_decode_error(err: jsonwebtoken::errors::Error) -> AuthError {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid,
        }
    }
}
