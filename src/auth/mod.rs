use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::SecurityConfig;
use crate::database::models::{User, UserRole};

pub mod password;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,
    pub username: String,
    pub role: UserRole,
    pub token_type: TokenType,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
}

impl Claims {
    fn new(user: &User, token_type: TokenType, config: &SecurityConfig) -> Self {
        let now = Utc::now();
        let lifetime = match token_type {
            TokenType::Access => Duration::hours(config.jwt_expiry_hours as i64),
            TokenType::Refresh => Duration::days(config.refresh_expiry_days as i64),
        };

        Self {
            sub: user.id,
            username: user.username.clone(),
            role: user.role,
            token_type,
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
            iss: config.jwt_issuer.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT secret is not configured")]
    MissingSecret,
    #[error("token generation failed: {0}")]
    Generation(String),
    #[error("invalid token: {0}")]
    Invalid(String),
    #[error("wrong token type")]
    WrongTokenType,
}

pub fn generate_token(
    user: &User,
    token_type: TokenType,
    config: &SecurityConfig,
) -> Result<String, JwtError> {
    if config.jwt_secret.is_empty() {
        return Err(JwtError::MissingSecret);
    }

    let claims = Claims::new(user, token_type, config);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| JwtError::Generation(e.to_string()))
}

/// Decode and verify a token, requiring it to be of the expected type so a
/// refresh token can never authorize an API call (and vice versa).
pub fn decode_token(
    token: &str,
    expected: TokenType,
    config: &SecurityConfig,
) -> Result<Claims, JwtError> {
    if config.jwt_secret.is_empty() {
        return Err(JwtError::MissingSecret);
    }

    let mut validation = Validation::default();
    validation.set_issuer(&[&config.jwt_issuer]);

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| JwtError::Invalid(e.to_string()))?;

    if data.claims.token_type != expected {
        return Err(JwtError::WrongTokenType);
    }

    Ok(data.claims)
}

/// Access-token lifetime in seconds, reported to clients as `expires_in`.
pub fn access_token_ttl_secs(config: &SecurityConfig) -> i64 {
    config.jwt_expiry_hours as i64 * 3600
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn config() -> SecurityConfig {
        SecurityConfig {
            jwt_secret: "test-secret".to_string(),
            jwt_issuer: "lms-api-rust".to_string(),
            jwt_expiry_hours: 1,
            refresh_expiry_days: 7,
            bcrypt_cost: 4,
        }
    }

    fn user() -> User {
        User {
            id: 42,
            username: "teacher1".to_string(),
            email: "teacher1@example.com".to_string(),
            full_name: None,
            hashed_password: "irrelevant".to_string(),
            role: UserRole::Teacher,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
            last_login: None,
        }
    }

    #[test]
    fn access_token_round_trips() {
        let cfg = config();
        let token = generate_token(&user(), TokenType::Access, &cfg).unwrap();
        let claims = decode_token(&token, TokenType::Access, &cfg).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.username, "teacher1");
        assert_eq!(claims.role, UserRole::Teacher);
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let cfg = config();
        let token = generate_token(&user(), TokenType::Refresh, &cfg).unwrap();
        assert!(matches!(
            decode_token(&token, TokenType::Access, &cfg),
            Err(JwtError::WrongTokenType)
        ));
        assert!(decode_token(&token, TokenType::Refresh, &cfg).is_ok());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let cfg = config();
        let mut token = generate_token(&user(), TokenType::Access, &cfg).unwrap();
        token.push('x');
        assert!(matches!(
            decode_token(&token, TokenType::Access, &cfg),
            Err(JwtError::Invalid(_))
        ));
    }

    #[test]
    fn empty_secret_is_refused() {
        let mut cfg = config();
        cfg.jwt_secret.clear();
        assert!(matches!(
            generate_token(&user(), TokenType::Access, &cfg),
            Err(JwtError::MissingSecret)
        ));
    }
}
