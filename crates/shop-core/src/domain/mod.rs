//! 스토어프론트 시스템 전반에서 사용되는 도메인 타입.

mod role;
mod user;

pub use role::*;
pub use user::*;
