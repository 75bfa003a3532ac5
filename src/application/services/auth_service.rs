use crate::infrastructure::http::middleware::error::{ApiError, ApiResult};
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::sync::Arc;
use time::OffsetDateTime;

type HmacSha256 = Hmac<Sha256>;

pub const AUTH_COOKIE_NAME: &str = "auth-token";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
const OPERATOR_ROLE: &str = "admin";

/// How the operator password is configured.
#[derive(Clone)]
pub enum AdminPassword {
    Bcrypt(String),
    Argon2(String),
    Plain(String),
}

impl AdminPassword {
    /// `$2…` is a bcrypt hash, `$argon2…` a PHC string, anything else is
    /// compared verbatim. Unset falls back to the built-in default.
    pub fn from_config(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.starts_with("$2") => AdminPassword::Bcrypt(v.to_string()),
            Some(v) if v.starts_with("$argon2") => AdminPassword::Argon2(v.to_string()),
            Some(v) => AdminPassword::Plain(v.to_string()),
            None => AdminPassword::Plain(DEFAULT_ADMIN_PASSWORD.to_string()),
        }
    }

    pub fn verify(&self, candidate: &str) -> ApiResult<bool> {
        match self {
            AdminPassword::Bcrypt(hash) => bcrypt::verify(candidate, hash)
                .map_err(|e| ApiError::Internal(format!("Invalid bcrypt hash: {}", e))),
            AdminPassword::Argon2(hash) => {
                let parsed = PasswordHash::new(hash)
                    .map_err(|_| ApiError::Internal("Invalid password hash format".to_string()))?;
                Ok(Argon2::default()
                    .verify_password(candidate.as_bytes(), &parsed)
                    .is_ok())
            }
            AdminPassword::Plain(expected) => Ok(constant_time_eq(
                expected.as_bytes(),
                candidate.as_bytes(),
            )),
        }
    }
}

/// Signed token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub role: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: i64,
    pub max_age_secs: i64,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("bad signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
}

/// Issues and checks the operator's bearer credential.
#[derive(Clone)]
pub struct AuthService {
    secret: Arc<Vec<u8>>,
    admin_password: AdminPassword,
    token_ttl_secs: i64,
}

impl AuthService {
    pub fn new(secret: &str, admin_password: AdminPassword, session_duration_hours: i64) -> Self {
        Self {
            secret: Arc::new(secret.as_bytes().to_vec()),
            admin_password,
            token_ttl_secs: session_duration_hours.saturating_mul(3600),
        }
    }

    /// Check the password and hand out a fresh token.
    pub fn login(&self, password: &str) -> ApiResult<IssuedToken> {
        if !self.admin_password.verify(password)? {
            metrics::counter!("auth_logins_total", "outcome" => "rejected").increment(1);
            return Err(ApiError::Unauthorized);
        }

        metrics::counter!("auth_logins_total", "outcome" => "accepted").increment(1);
        self.issue_token_at(OffsetDateTime::now_utc().unix_timestamp())
    }

    pub fn issue_token_at(&self, now: i64) -> ApiResult<IssuedToken> {
        use rand::Rng;
        let nonce: [u8; 12] = rand::thread_rng().gen();

        let claims = Claims {
            role: OPERATOR_ROLE.to_string(),
            iat: now,
            exp: now.saturating_add(self.token_ttl_secs),
            jti: hex::encode(nonce),
        };

        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
        let signature = hex::encode(self.mac(&payload)?.finalize().into_bytes());

        Ok(IssuedToken {
            token: format!("{}.{}", payload, signature),
            expires_at: claims.exp,
            max_age_secs: self.token_ttl_secs,
        })
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_token_at(token, OffsetDateTime::now_utc().unix_timestamp())
    }

    pub fn verify_token_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let (payload, signature) = token.split_once('.').ok_or(TokenError::Malformed)?;
        let signature = hex::decode(signature).map_err(|_| TokenError::Malformed)?;

        self.mac(payload)
            .map_err(|_| TokenError::Malformed)?
            .verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let raw = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let claims: Claims = serde_json::from_slice(&raw).map_err(|_| TokenError::Malformed)?;

        if claims.exp <= now {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    fn mac(&self, payload: &str) -> ApiResult<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|_| ApiError::Internal("Invalid signing key".to_string()))?;
        mac.update(payload.as_bytes());
        Ok(mac)
    }
}

/// Constant-time comparison for plain-text password checks
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
