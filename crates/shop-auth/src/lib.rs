//! 인증 및 권한 부여.
//!
//! JWT 기반 세션 수명 주기 관리와 역할 기반 접근 제어(RBAC)를 제공합니다.
//!
//! # 구성 요소
//!
//! - [`TokenCodec`]: Access/Refresh 토큰 서명 및 검증
//! - [`CredentialValidator`]: 로그인 자격증명 검증 (Argon2)
//! - [`SessionManager`]: 사용자별 단일 세션 레코드 소유 및 회전
//! - [`RefreshCoordinator`]: 동시 갱신 요청의 single-flight 조정
//! - [`AccessGuard`]: 보호된 작업별 권한 검사 (정적 정책 테이블)
//! - [`AuthService`]: login / refresh / authorize / logout 진입점
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! let service = AuthService::new(store, &config.auth, policy);
//!
//! let login = service.login("a@b.com", "secret").await?;
//! let identity = service
//!     .authorize_operation(&login.tokens.access_token, "orders.create")
//!     .await?;
//! ```

mod credential;
mod error;
mod guard;
mod password;
mod refresh;
mod service;
mod session;
mod store;
mod token;

pub use credential::CredentialValidator;
pub use error::AuthError;
pub use guard::{AccessGuard, RolePolicy};
pub use password::{hash_password, validate_password_strength, verify_password, PasswordError};
pub use refresh::{RefreshCoordinator, Rotator};
pub use service::{AuthService, LoginResponse};
pub use session::{Session, SessionManager};
pub use store::{InMemoryUserStore, UserRecord, UserStore};
pub use token::{AccessClaims, RefreshClaims, TokenCodec, TokenPair};
