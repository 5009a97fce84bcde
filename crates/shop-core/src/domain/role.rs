//! 역할 기반 접근 제어 (RBAC).
//!
//! 사용자 역할 정의.

use serde::{Deserialize, Serialize};

/// 사용자 역할.
///
/// 시스템에서 사용자의 권한 수준을 정의합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 관리자 - 모든 권한 보유
    Admin,
    /// 매니저 - 카탈로그 및 주문 관리 권한
    Manager,
    /// 고객 - 일반 쇼핑 권한
    Customer,
}

impl Role {
    /// 역할의 우선순위 레벨 반환 (높을수록 더 많은 권한).
    pub fn level(&self) -> u8 {
        match self {
            Role::Admin => 100,
            Role::Manager => 50,
            Role::Customer => 10,
        }
    }

    /// 와이어 형식 역할 문자열 반환.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Customer => "customer",
        }
    }

    /// 문자열에서 역할 파싱.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "manager" => Some(Role::Manager),
            "customer" => Some(Role::Customer),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
