//! Session token issuing and verification
//!
//! Tokens are HS256-signed JWTs carrying the subject ID, display name and
//! an absolute expiry. Verification checks structure and signature first,
//! then expiry, so a tampered token is always `InvalidToken` and only a
//! genuine but stale token is `TokenExpired`.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuthError;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (account ID)
    pub sub: String,
    /// Display name
    pub name: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Verified identity attached to an authenticated request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub subject_id: i64,
    pub display_name: String,
}

impl Identity {
    /// Build from verified claims; a non-numeric subject is rejected
    pub fn from_claims(claims: Claims) -> Result<Self, AuthError> {
        let subject_id = claims.sub.parse().map_err(|_| AuthError::InvalidToken)?;
        Ok(Self {
            subject_id,
            display_name: claims.name,
        })
    }
}

/// Issues and verifies session tokens with a shared secret
#[derive(Clone)]
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenManager {
    /// Create a new token manager
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked separately so it can be told apart from a bad signature
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Lifetime of newly issued tokens
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for an account
    pub fn issue(&self, subject_id: i64, display_name: &str) -> Result<String, AuthError> {
        self.issue_at(subject_id, display_name, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(
        &self,
        subject_id: i64,
        display_name: &str,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::Signing("token expiry out of range".to_string()))?;

        let claims = Claims {
            sub: subject_id.to_string(),
            name: display_name.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        debug!("Issuing token for subject {}", subject_id);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Verify a token and return the identity it carries
    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, AuthError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!("Token rejected: {}", e);
            AuthError::InvalidToken
        })?;

        if now.timestamp() >= token_data.claims.exp {
            return Err(AuthError::TokenExpired);
        }

        Identity::from_claims(token_data.claims)
    }
}
