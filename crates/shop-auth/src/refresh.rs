//! 동시 토큰 갱신의 single-flight 조정.
//!
//! 같은 세션에 대해 N개의 호출자가 동시에 갱신을 요청하면 실제 회전은
//! 정확히 한 번만 수행되고, 모든 호출자는 동일한 결과(성공 또는 실패)를
//! 공유합니다.
//!
//! 구현: 세션 키 → 진행 중 결과 채널의 레지스트리.
//! - 키에 등록된 시도가 없으면 채널을 등록하고 회전을 별도 태스크로 시작
//! - 이미 등록되어 있으면 채널을 구독해 결과만 기다림
//! - 회전이 끝나면 레지스트리에서 항목을 먼저 제거한 뒤 브로드캐스트
//!   (이후 도착한 요청은 항상 새 시도를 시작)
//!
//! 회전 태스크는 분리 실행되므로 호출자가 대기를 포기해도 진행 중인
//! 회전은 취소되지 않고 남은 대기자들이 결과를 받습니다.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, warn};

use shop_core::{AuthConfig, UserId};

use crate::error::AuthError;
use crate::session::{Session, SessionManager};

/// 브로드캐스트되는 갱신 결과.
type RefreshOutcome = Result<Session, AuthError>;

/// 실효적 회전 연산의 경계.
///
/// 조정자는 이 trait을 통해서만 회전을 일으킵니다.
#[async_trait]
pub trait Rotator: Send + Sync + 'static {
    /// 제시된 refresh 토큰으로 세션을 회전합니다.
    async fn rotate(&self, user_id: &UserId, presented_refresh: &str) -> RefreshOutcome;
}

#[async_trait]
impl Rotator for SessionManager {
    async fn rotate(&self, user_id: &UserId, presented_refresh: &str) -> RefreshOutcome {
        SessionManager::rotate(self, user_id, presented_refresh).await
    }
}

/// Single-flight 갱신 조정자.
///
/// `Clone`은 내부 레지스트리를 공유합니다 (Arc).
#[derive(Clone)]
pub struct RefreshCoordinator {
    rotator: Arc<dyn Rotator>,
    inflight: Arc<Mutex<HashMap<UserId, broadcast::Sender<RefreshOutcome>>>>,
    rotate_timeout: Duration,
}

impl RefreshCoordinator {
    /// 새 조정자 생성.
    pub fn new(rotator: Arc<dyn Rotator>, config: &AuthConfig) -> Self {
        Self {
            rotator,
            inflight: Arc::new(Mutex::new(HashMap::new())),
            rotate_timeout: Duration::from_secs(config.refresh_timeout_secs),
        }
    }

    /// 세션 갱신.
    ///
    /// 해당 키의 회전이 이미 진행 중이면 그 결과에 합류합니다.
    /// 진행 중인 시도가 없으면 이 호출이 회전을 시작하며, 시도가 해소될
    /// 때까지 도착하는 모든 호출이 같은 결과를 받습니다.
    pub async fn refresh(
        &self,
        user_id: &UserId,
        presented_refresh: &str,
    ) -> Result<Session, AuthError> {
        let mut rx = {
            let mut inflight = self.inflight.lock().await;
            match inflight.get(user_id) {
                Some(tx) => {
                    debug!(user_id = %user_id, "Joining in-flight refresh");
                    tx.subscribe()
                }
                None => {
                    let (tx, rx) = broadcast::channel(1);
                    inflight.insert(user_id.clone(), tx.clone());
                    self.spawn_rotation(user_id.clone(), presented_refresh.to_string(), tx);
                    rx
                }
            }
        };

        match rx.recv().await {
            Ok(outcome) => outcome,
            // 송신자가 결과 없이 사라지는 경로는 없지만, 대기자를 영원히
            // 잡아두지는 않습니다
            Err(_) => Err(AuthError::RefreshTimeout),
        }
    }

    /// 회전을 분리 태스크로 시작합니다.
    ///
    /// 호출자의 future가 드롭되어도 회전은 계속됩니다.
    fn spawn_rotation(
        &self,
        user_id: UserId,
        presented_refresh: String,
        tx: broadcast::Sender<RefreshOutcome>,
    ) {
        let rotator = Arc::clone(&self.rotator);
        let inflight = Arc::clone(&self.inflight);
        let rotate_timeout = self.rotate_timeout;

        tokio::spawn(async move {
            // 회전이 패닉해도 레지스트리 항목 제거와 브로드캐스트는 반드시
            // 수행되어야 합니다. 그렇지 않으면 이후 호출자들이 끝나지 않는
            // 시도에 합류해 제 타임아웃까지 묶입니다.
            let rotation =
                AssertUnwindSafe(rotator.rotate(&user_id, &presented_refresh)).catch_unwind();

            let outcome = match tokio::time::timeout(rotate_timeout, rotation).await {
                Ok(Ok(result)) => result,
                Ok(Err(_)) => {
                    warn!(user_id = %user_id, "Session rotation panicked");
                    Err(AuthError::RefreshTimeout)
                }
                Err(_) => {
                    warn!(user_id = %user_id, timeout_secs = rotate_timeout.as_secs(),
                        "Session rotation timed out");
                    Err(AuthError::RefreshTimeout)
                }
            };

            // 브로드캐스트 전에 항목을 제거해야 다음 요청이 완료된 시도에
            // 합류하지 못합니다
            {
                let mut inflight = inflight.lock().await;
                inflight.remove(&user_id);
            }

            // 모든 대기자가 포기했더라도 회전 자체는 이미 완료된 상태
            let _ = tx.send(outcome);
        });
    }
}
