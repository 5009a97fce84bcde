//! 비밀번호 해싱 유틸리티.
//!
//! Argon2id 기반 비밀번호 해싱 및 검증.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패")]
    HashingFailed,
    #[error("비밀번호 검증 실패")]
    VerificationFailed,
    #[error("잘못된 해시 형식")]
    InvalidHashFormat,
    #[error("비밀번호 강도 부족: {0}")]
    TooWeak(&'static str),
}

/// 비밀번호 해싱.
///
/// Argon2id로 해싱하며 솔트는 자동 생성됩니다.
/// 결과는 솔트가 포함된 PHC 형식 문자열입니다.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| PasswordError::HashingFailed)?;

    Ok(hash.to_string())
}

/// 비밀번호 검증.
///
/// 저장된 PHC 해시와 입력된 비밀번호를 비교합니다.
/// Argon2 검증 자체가 타이밍 공격에 안전한 비교를 수행합니다.
pub fn verify_password(password: &str, hash: &str) -> Result<(), PasswordError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| PasswordError::VerificationFailed)
}

/// 비밀번호 강도 검증.
///
/// 회원가입/비밀번호 변경 경계에서 사용합니다:
/// - 최소 8자 이상
/// - 최소 1개의 숫자 포함
/// - 최소 1개의 영문자 포함
pub fn validate_password_strength(password: &str) -> Result<(), PasswordError> {
    if password.len() < 8 {
        return Err(PasswordError::TooWeak("최소 8자 이상이어야 합니다"));
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordError::TooWeak("숫자가 1개 이상 필요합니다"));
    }

    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(PasswordError::TooWeak("영문자가 1개 이상 필요합니다"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let password = "StorePassword123!";
        let hash = hash_password(password).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(password, &hash).is_ok());
        assert!(verify_password("WrongPassword123!", &hash).is_err());
    }

    #[test]
    fn test_same_password_different_salts() {
        let hash1 = hash_password("Password1").unwrap();
        let hash2 = hash_password("Password1").unwrap();

        // 솔트가 다르므로 해시가 달라야 합니다
        assert_ne!(hash1, hash2);
        assert!(verify_password("Password1", &hash1).is_ok());
        assert!(verify_password("Password1", &hash2).is_ok());
    }

    #[test]
    fn test_invalid_hash_format() {
        let result = verify_password("password", "not-a-valid-hash");
        assert!(matches!(result, Err(PasswordError::InvalidHashFormat)));
    }

    #[test]
    fn test_password_strength_validation() {
        assert!(validate_password_strength("Password1").is_ok());
        assert!(validate_password_strength("abcd1234").is_ok());

        assert!(matches!(
            validate_password_strength("Pass1"),
            Err(PasswordError::TooWeak(_))
        ));
        assert!(validate_password_strength("Password").is_err());
        assert!(validate_password_strength("12345678").is_err());
        assert!(validate_password_strength("").is_err());
    }
}
