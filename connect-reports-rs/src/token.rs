// connect-reports-rs/src/token.rs
//
// Signed bearer tokens for the App Store Connect API
// Provides:
// - ES256 signing with a PEM private key and a `kid` header
// - Fixed audience, issuer taken from the API key
// - Lifetime policy (fixed 5 minutes, or clamped into [5, 20])

use std::fs;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorContext, Result, ServiceError};

/// Audience every token is issued for
pub const AUDIENCE: &str = "appstoreconnect-v1";

/// Shortest lifetime, also the default
pub const MIN_LIFETIME_MINUTES: i64 = 5;

/// Longest lifetime the generator accepts
pub const MAX_LIFETIME_MINUTES: i64 = 20;

// JWT Claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String, // Issuer
    pub aud: String, // Audience
    pub exp: i64,    // Expiration time (unix timestamp)
}

/// Validity window of an issued token, in minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetime(i64);

impl TokenLifetime {
    /// Five minutes, used by both report pipelines
    pub fn fixed() -> Self {
        TokenLifetime(MIN_LIFETIME_MINUTES)
    }

    /// Clamp a caller-supplied value into `[5, 20]`; absent means 5
    pub fn clamped(minutes: Option<i64>) -> Self {
        let minutes = minutes
            .unwrap_or(MIN_LIFETIME_MINUTES)
            .clamp(MIN_LIFETIME_MINUTES, MAX_LIFETIME_MINUTES);
        TokenLifetime(minutes)
    }

    pub fn minutes(&self) -> i64 {
        self.0
    }
}

impl Default for TokenLifetime {
    fn default() -> Self {
        Self::fixed()
    }
}

/// A signed token together with the claims it asserts
#[derive(Debug, Clone)]
pub struct SignedAssertion {
    pub token: String,
    pub claims: Claims,
}

impl SignedAssertion {
    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Issues short-lived tokens for one API key
pub struct TokenIssuer {
    issuer_id: String,
    key_id: String,
    encoding_key: EncodingKey,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer_id", &self.issuer_id)
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Build an issuer from PEM-encoded key text
    pub fn from_pem(issuer_id: impl Into<String>, key_id: impl Into<String>, pem: &[u8]) -> Result<Self> {
        let encoding_key = EncodingKey::from_ec_pem(pem).map_err(|e| {
            ServiceError::configuration(format!("Invalid EC private key: {}", e))
                .with_context(ErrorContext::for_service("token"))
        })?;

        Ok(Self {
            issuer_id: issuer_id.into(),
            key_id: key_id.into(),
            encoding_key,
        })
    }

    /// Build an issuer from a PEM private key file
    pub fn from_key_file(
        issuer_id: impl Into<String>,
        key_id: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let pem = fs::read(path).map_err(|e| {
            ServiceError::configuration(format!(
                "Failed to read private key {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_pem(issuer_id, key_id, &pem)
    }

    pub fn issuer_id(&self) -> &str {
        &self.issuer_id
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Issue a token that expires `lifetime` from now
    pub fn issue(&self, lifetime: TokenLifetime) -> Result<SignedAssertion> {
        self.issue_at(Utc::now(), lifetime)
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(&self, now: DateTime<Utc>, lifetime: TokenLifetime) -> Result<SignedAssertion> {
        let expiration = now + Duration::minutes(lifetime.minutes());

        let claims = Claims {
            iss: self.issuer_id.clone(),
            aud: AUDIENCE.to_string(),
            exp: expiration.timestamp(),
        };

        // Create JWT header with key ID
        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(self.key_id.clone());

        let token = encode(&header, &claims, &self.encoding_key)?;

        debug!(
            "Issued token for key {} expiring at {} ({} minutes)",
            self.key_id,
            expiration.to_rfc3339(),
            lifetime.minutes()
        );

        Ok(SignedAssertion { token, claims })
    }
}
