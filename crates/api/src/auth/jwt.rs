//! Access and refresh token issuance and verification.
//!
//! Both token kinds are HS256 JWTs carrying the same identity payload, signed
//! with separate secrets and tagged with a `typ` claim so neither can stand in
//! for the other. Only the SHA-256 hash of a refresh token is ever persisted.

use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use snapfeed_core::auth::{DEFAULT_ACCESS_EXPIRY_MINS, DEFAULT_REFRESH_EXPIRY_DAYS};
use snapfeed_core::error::CoreError;
use snapfeed_core::types::{DbId, Timestamp};
use uuid::Uuid;

use crate::config::{parse_or, required, Lookup};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Secrets and lifetimes for both token kinds.
#[derive(Clone)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_days: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("access_token_expiry_mins", &self.access_token_expiry_mins)
            .field("refresh_token_expiry_days", &self.refresh_token_expiry_days)
            .finish()
    }
}

impl JwtConfig {
    /// Load token configuration.
    ///
    /// | Env Var                     | Required | Default |
    /// |-----------------------------|----------|---------|
    /// | `ACCESS_TOKEN_SECRET`       | **yes**  | --      |
    /// | `REFRESH_TOKEN_SECRET`      | **yes**  | --      |
    /// | `ACCESS_TOKEN_EXPIRY_MINS`  | no       | `15`    |
    /// | `REFRESH_TOKEN_EXPIRY_DAYS` | no       | `7`     |
    pub fn from_lookup(lookup: Lookup<'_>) -> Result<Self, CoreError> {
        let config = Self {
            access_secret: required(lookup, "ACCESS_TOKEN_SECRET")?,
            refresh_secret: required(lookup, "REFRESH_TOKEN_SECRET")?,
            access_token_expiry_mins: parse_or(
                lookup,
                "ACCESS_TOKEN_EXPIRY_MINS",
                DEFAULT_ACCESS_EXPIRY_MINS,
            )?,
            refresh_token_expiry_days: parse_or(
                lookup,
                "REFRESH_TOKEN_EXPIRY_DAYS",
                DEFAULT_REFRESH_EXPIRY_DAYS,
            )?,
        };
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), CoreError> {
        if self.access_secret.is_empty() || self.refresh_secret.is_empty() {
            return Err(CoreError::Config("Token secrets must not be empty".into()));
        }
        if self.access_secret == self.refresh_secret {
            return Err(CoreError::Config(
                "ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must differ".into(),
            ));
        }
        if self.access_token_expiry_mins <= 0 || self.refresh_token_expiry_days <= 0 {
            return Err(CoreError::Config("Token lifetimes must be positive".into()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Token types
// ---------------------------------------------------------------------------

/// Which of the two token kinds a JWT is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Identity bound into every token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPayload {
    pub id: DbId,
    pub email: String,
    pub username: String,
}

/// JWT claims shared by both token kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject -- the user's id.
    pub sub: DbId,
    pub email: String,
    pub username: String,
    pub typ: TokenKind,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Random per-token id; keeps two tokens minted in the same second
    /// distinct.
    pub jti: String,
}

impl Claims {
    pub fn payload(&self) -> TokenPayload {
        TokenPayload {
            id: self.sub,
            email: self.email.clone(),
            username: self.username.clone(),
        }
    }
}

/// Access and refresh token handed to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Bad signature, malformed token, or the wrong token kind.
    #[error("invalid token")]
    Invalid,
    #[error("token expired")]
    Expired,
}

// ---------------------------------------------------------------------------
// Issuer
// ---------------------------------------------------------------------------

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

/// Mints and verifies token pairs. Holds no state beyond its keys.
pub struct TokenIssuer {
    access: Keys,
    refresh: Keys,
    validation: Validation,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("access_ttl", &self.access.ttl)
            .field("refresh_ttl", &self.refresh.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Build an issuer, refusing empty or shared secrets.
    pub fn new(config: &JwtConfig) -> Result<Self, CoreError> {
        config.check()?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Ok(Self {
            access: Keys {
                encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
                decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
                ttl: Duration::minutes(config.access_token_expiry_mins),
            },
            refresh: Keys {
                encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
                decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
                ttl: Duration::days(config.refresh_token_expiry_days),
            },
            validation,
        })
    }

    /// Lifetime of a refresh token, and so of the session row that mirrors it.
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh.ttl
    }

    /// Mint a fresh pair for `payload`, issued now.
    pub fn issue(&self, payload: &TokenPayload) -> Result<TokenPair, CoreError> {
        self.issue_at(payload, Utc::now())
    }

    /// Mint a pair as if issued at `now`.
    pub fn issue_at(&self, payload: &TokenPayload, now: Timestamp) -> Result<TokenPair, CoreError> {
        Ok(TokenPair {
            access_token: self.sign(payload, TokenKind::Access, now)?,
            refresh_token: self.sign(payload, TokenKind::Refresh, now)?,
        })
    }

    /// Check signature, expiry (no leeway), and kind.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, TokenError> {
        let keys = self.keys(kind);
        let data = decode::<Claims>(token, &keys.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;
        if data.claims.typ != kind {
            return Err(TokenError::Invalid);
        }
        Ok(data.claims)
    }

    fn sign(
        &self,
        payload: &TokenPayload,
        kind: TokenKind,
        now: Timestamp,
    ) -> Result<String, CoreError> {
        let keys = self.keys(kind);
        let claims = Claims {
            sub: payload.id,
            email: payload.email.clone(),
            username: payload.username.clone(),
            typ: kind,
            exp: (now + keys.ttl).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|e| CoreError::Internal(format!("Token signing failed: {e}")))
    }

    fn keys(&self, kind: TokenKind) -> &Keys {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }
}

/// SHA-256 hex digest of a refresh token, the form sessions are keyed by.
pub fn hash_refresh_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
