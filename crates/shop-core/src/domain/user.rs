//! 사용자 신원 타입.
//!
//! 이 모듈은 인증된 주체를 나타내는 타입을 정의합니다:
//! - `UserId` - 사용자 식별자 뉴타입
//! - `Identity` - 인증된 사용자의 불변 신원

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Role;

/// 사용자 식별자.
///
/// 사용자 저장소가 부여하는 식별자를 감싸는 뉴타입입니다.
/// 저장소 구현에 따라 UUID 또는 임의 문자열일 수 있습니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// 새 사용자 ID 생성.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// 랜덤 UUID 기반 사용자 ID 생성.
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// 문자열 참조 반환.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// 인증된 사용자의 신원.
///
/// 사용자 저장소에서 로드된 후 요청 수명 동안 불변입니다.
/// 세션은 이 신원을 참조하며 소유하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// 사용자 식별자
    pub id: UserId,
    /// 이메일 주소
    pub email: String,
    /// 부여된 역할
    pub role: Role,
}

impl Identity {
    /// 새 신원 생성.
    pub fn new(id: impl Into<UserId>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            role,
        }
    }
}
