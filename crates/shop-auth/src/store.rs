//! 사용자 저장소 경계.
//!
//! 사용자 신원과 비밀번호 해시의 영속화는 외부 협력자의 책임입니다.
//! 이 모듈은 인증 코어가 소비하는 조회 trait만 정의합니다.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use shop_core::{Identity, ShopError, ShopResult};

use crate::password::hash_password;

/// 저장소에 보관되는 사용자 레코드.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// 사용자 신원
    pub identity: Identity,
    /// PHC 형식 비밀번호 해시
    pub password_hash: String,
}

/// 사용자 조회 인터페이스.
///
/// 실제 구현(DB, 외부 IdP 등)은 이 crate 밖에 있습니다.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// 이메일로 사용자 레코드를 조회합니다.
    async fn find_by_email(&self, email: &str) -> ShopResult<Option<UserRecord>>;
}

/// 인메모리 사용자 저장소.
///
/// 테스트 및 로컬 구동용 구현입니다.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryUserStore {
    /// 빈 저장소 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 사용자를 등록합니다. 비밀번호는 저장 전에 해싱됩니다.
    pub async fn insert(&self, identity: Identity, password: &str) -> ShopResult<()> {
        let password_hash =
            hash_password(password).map_err(|e| ShopError::Store(e.to_string()))?;

        let record = UserRecord {
            identity: identity.clone(),
            password_hash,
        };

        let mut users = self.users.write().await;
        users.insert(identity.email.to_lowercase(), record);
        Ok(())
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> ShopResult<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.get(&email.to_lowercase()).cloned())
    }
}
