//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.

use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 인증 설정
    #[serde(default)]
    pub auth: AuthConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// 인증 설정.
///
/// 토큰 수명과 서명 비밀 키를 정의합니다.
/// 비밀 키는 로그에 노출되지 않도록 `SecretString`으로 보관합니다.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// JWT 서명 비밀 키 (프로덕션에서는 반드시 환경변수로 설정)
    pub jwt_secret: SecretString,
    /// Access Token 만료 시간 (분)
    pub access_ttl_minutes: i64,
    /// Refresh Token 만료 시간 (일)
    pub refresh_ttl_days: i64,
    /// 토큰 갱신 작업 타임아웃 (초)
    pub refresh_timeout_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: SecretString::new(
                "development-secret-key-change-in-production".into(),
            ),
            access_ttl_minutes: 15,
            refresh_ttl_days: 7,
            refresh_timeout_secs: 10,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 기본값으로 시작
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("auth.access_ttl_minutes", 15)?
            .set_default("auth.refresh_ttl_days", 7)?
            .set_default("auth.refresh_timeout_secs", 10)?
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("SHOP")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.auth.access_ttl_minutes, 15);
        assert_eq!(config.auth.refresh_ttl_days, 7);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_secret_not_in_debug_output() {
        let config = AuthConfig::default();
        let debug = format!("{:?}", config);

        // SecretString은 Debug 출력에서 내용을 가립니다
        assert!(!debug.contains("development-secret-key"));
        assert!(!config.jwt_secret.expose_secret().is_empty());
    }

    #[test]
    fn test_config_deserialize_from_toml() {
        let toml = r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [auth]
            jwt_secret = "test-secret-key-for-config-loading"
            access_ttl_minutes = 5
            refresh_ttl_days = 30
            refresh_timeout_secs = 3

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.access_ttl_minutes, 5);
        assert_eq!(config.auth.refresh_ttl_days, 30);
        assert_eq!(config.logging.format, "json");
    }
}
