//! Session token verification.
//!
//! Clerk session tokens are short-lived RS256 JWTs. With the instance's PEM
//! public key they can be checked locally, without a call to Clerk.

use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session verification is not configured")]
    NotConfigured,

    #[error("session token has expired")]
    Expired,

    #[error("session token is not valid")]
    InvalidToken,

    #[error("session token was issued for another party")]
    UnauthorizedParty,
}

/// Claims carried by a verified session, exposed to handlers via request
/// extensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Clerk user id
    pub sub: String,
    /// Clerk session id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    /// Authorized party (origin that requested the token)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azp: Option<String>,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<u64>,
}

pub trait SessionVerifier: Send + Sync {
    fn verify_session(&self, token: &str) -> Result<SessionClaims, SessionError>;
}

/// Offline verifier for Clerk session JWTs.
pub struct JwtSessionVerifier {
    key: Option<DecodingKey>,
    algorithm: Algorithm,
    authorized_parties: Vec<String>,
}

impl JwtSessionVerifier {
    /// Build from a PEM public key. `None` rejects every session.
    pub fn from_pem(
        pem: Option<&str>,
        authorized_parties: Vec<String>,
    ) -> Result<Self, jsonwebtoken::errors::Error> {
        let key = pem
            .map(|pem| DecodingKey::from_rsa_pem(pem.as_bytes()))
            .transpose()?;

        Ok(Self {
            key,
            algorithm: Algorithm::RS256,
            authorized_parties,
        })
    }

    /// Verifier for HS256 tokens signed with a shared secret.
    #[cfg(test)]
    pub fn from_secret(secret: &[u8], authorized_parties: Vec<String>) -> Self {
        Self {
            key: Some(DecodingKey::from_secret(secret)),
            algorithm: Algorithm::HS256,
            authorized_parties,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_nbf = true;
        // Clerk session tokens carry no audience
        validation.validate_aud = false;
        validation.leeway = 5;
        validation
    }
}

impl SessionVerifier for JwtSessionVerifier {
    fn verify_session(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let key = self.key.as_ref().ok_or(SessionError::NotConfigured)?;

        let claims = decode::<SessionClaims>(token, key, &self.validation())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => SessionError::Expired,
                _ => SessionError::InvalidToken,
            })?;

        if !self.authorized_parties.is_empty() {
            if let Some(azp) = &claims.azp {
                if !self.authorized_parties.iter().any(|p| p == azp) {
                    return Err(SessionError::UnauthorizedParty);
                }
            }
        }

        Ok(claims)
    }
}
