// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! JWT issuance and verification.
//!
//! [`TokenIssuer`] mints signed, time-bounded tokens. [`CredentialVerifier`]
//! is the sole authority on whether a token is currently usable: the header
//! algorithm, the signature, the expiry and the session are all checked, in
//! that order, and the first failure wins.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use gatehouse_core::{AuthError, AuthResult, Clock, Principal, SystemClock};
use gatehouse_session::Sessions;
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::Claims;
use super::context::VerifiedPrincipal;

/// Caller-facing denial messages.
pub(crate) mod reason {
    pub const TOKEN_REQUIRED: &str = "token required";
    pub const INVALID_SIGNING_METHOD: &str = "invalid signing method";
    pub const TOKEN_INVALID: &str = "token invalid";
    pub const TOKEN_EXPIRED: &str = "token expired";
    pub const SESSION_MISSING: &str = "token not valid or expired";
}

// =============================================================================
// SigningAlgorithm
// =============================================================================

/// HMAC signing algorithms accepted by Gatehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SigningAlgorithm {
    /// HMAC with SHA-256.
    #[default]
    HS256,
    /// HMAC with SHA-384.
    HS384,
    /// HMAC with SHA-512.
    HS512,
}

impl SigningAlgorithm {
    /// Returns the JOSE `alg` value.
    pub fn as_str(&self) -> &'static str {
        match self {
            SigningAlgorithm::HS256 => "HS256",
            SigningAlgorithm::HS384 => "HS384",
            SigningAlgorithm::HS512 => "HS512",
        }
    }

    /// Parses a JOSE `alg` value. Only HMAC algorithms are recognized.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "HS256" => Some(SigningAlgorithm::HS256),
            "HS384" => Some(SigningAlgorithm::HS384),
            "HS512" => Some(SigningAlgorithm::HS512),
            _ => None,
        }
    }

    fn jwt(&self) -> Algorithm {
        match self {
            SigningAlgorithm::HS256 => Algorithm::HS256,
            SigningAlgorithm::HS384 => Algorithm::HS384,
            SigningAlgorithm::HS512 => Algorithm::HS512,
        }
    }
}

impl fmt::Display for SigningAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// JwtConfig
// =============================================================================

/// JWT configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// Secret key for signing tokens.
    #[serde(skip_serializing)]
    pub secret: String,
    /// Algorithm to use for signing.
    pub algorithm: SigningAlgorithm,
    /// Token lifetime. Also the session lifetime.
    #[serde(with = "humantime_serde")]
    pub token_ttl: Duration,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(), // Must be set by user
            algorithm: SigningAlgorithm::HS256,
            token_ttl: Duration::from_secs(12 * 60 * 60),
        }
    }
}

impl JwtConfig {
    /// Creates a new configuration with the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Sets the signing algorithm.
    pub fn with_algorithm(mut self, algorithm: SigningAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets the token lifetime.
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    /// Checks that a secret is configured.
    pub fn validate(&self) -> AuthResult<()> {
        if self.secret.is_empty() {
            return Err(AuthError::internal("JWT secret is not configured"));
        }
        if self.secret.len() < 32 {
            warn!("JWT secret is shorter than recommended (32 bytes)");
        }
        Ok(())
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

// =============================================================================
// TokenIssuer
// =============================================================================

/// A freshly minted token.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// The signed token.
    pub token: String,
    /// The signed claims.
    pub claims: Claims,
    /// Session lifetime, ending at the same instant as `claims.exp`.
    pub session_ttl: Duration,
}

impl IssuedToken {
    /// Returns the expiry instant.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.claims.expires_at()
    }
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("jti", &self.claims.jti)
            .field("email", &self.claims.email)
            .field("exp", &self.claims.exp)
            .field("session_ttl", &self.session_ttl)
            .finish_non_exhaustive()
    }
}

/// Mints signed tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    config: Arc<JwtConfig>,
    encoding_key: Arc<EncodingKey>,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    /// Creates an issuer driven by the wall clock.
    pub fn new(config: JwtConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates an issuer driven by the given clock.
    pub fn with_clock(config: JwtConfig, clock: Arc<dyn Clock>) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        Self {
            config: Arc::new(config),
            encoding_key: Arc::new(encoding_key),
            clock,
        }
    }

    /// Mints a token for `principal` valid for `ttl`.
    pub fn mint(&self, principal: &Principal, ttl: Duration) -> AuthResult<IssuedToken> {
        self.config.validate()?;

        let issued_at = self.clock.now();
        let claims = Claims::new(&principal.snapshot(), issued_at, ttl);
        let session_ttl = claims
            .remaining_at(issued_at)
            .ok_or_else(|| AuthError::internal("token lifetime must be positive"))?;

        let header = Header::new(self.config.algorithm.jwt());
        let token = encode(&header, &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, "Token signing failed");
            AuthError::internal("failed to sign token")
        })?;

        debug!(email = %claims.email, jti = %claims.jti, exp = claims.exp, "Token minted");

        Ok(IssuedToken {
            token,
            claims,
            session_ttl,
        })
    }

    /// Mints a token with the configured lifetime.
    pub fn mint_default(&self, principal: &Principal) -> AuthResult<IssuedToken> {
        self.mint(principal, self.config.token_ttl)
    }

    /// Returns the configured token lifetime.
    pub fn token_ttl(&self) -> Duration {
        self.config.token_ttl
    }
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("algorithm", &self.config.algorithm)
            .field("token_ttl", &self.config.token_ttl)
            .finish()
    }
}

// =============================================================================
// CredentialVerifier
// =============================================================================

/// Decides whether a token is currently usable.
#[derive(Clone)]
pub struct CredentialVerifier {
    config: Arc<JwtConfig>,
    decoding_key: Arc<DecodingKey>,
    validation: Arc<Validation>,
    sessions: Sessions,
    clock: Arc<dyn Clock>,
}

#[derive(Deserialize)]
struct JoseHeader {
    alg: String,
}

impl CredentialVerifier {
    /// Creates a verifier driven by the wall clock.
    pub fn new(config: JwtConfig, sessions: Sessions) -> Self {
        Self::with_clock(config, sessions, Arc::new(SystemClock))
    }

    /// Creates a verifier driven by the given clock.
    pub fn with_clock(config: JwtConfig, sessions: Sessions, clock: Arc<dyn Clock>) -> Self {
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(config.algorithm.jwt());
        validation.leeway = 0;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            config: Arc::new(config),
            decoding_key: Arc::new(decoding_key),
            validation: Arc::new(validation),
            sessions,
            clock,
        }
    }

    /// Verifies a token and returns the identity stored in its session.
    pub async fn verify(&self, token: &str) -> AuthResult<VerifiedPrincipal> {
        let token = token.trim();
        let claims = self.verify_claims(token)?;

        let snapshot = self
            .sessions
            .lookup(token)
            .await?
            .ok_or_else(|| AuthError::unauthorized(reason::SESSION_MISSING))?;

        Ok(VerifiedPrincipal::new(snapshot, claims))
    }

    /// Checks the header algorithm, signature and expiry without consulting
    /// the session store.
    pub fn verify_claims(&self, token: &str) -> AuthResult<Claims> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::unauthorized(reason::TOKEN_REQUIRED));
        }
        self.config.validate()?;

        let alg = header_algorithm(token)?;
        if alg != self.config.algorithm.as_str() {
            warn!(alg = %alg, expected = %self.config.algorithm, "Rejected token signing method");
            return Err(AuthError::unauthorized(reason::INVALID_SIGNING_METHOD));
        }

        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => AuthError::unauthorized(reason::TOKEN_EXPIRED),
                _ => {
                    debug!(error = %e, "Token rejected");
                    AuthError::unauthorized(reason::TOKEN_INVALID)
                }
            })?;

        if claims.is_expired_at(self.clock.now()) {
            return Err(AuthError::unauthorized(reason::TOKEN_EXPIRED));
        }

        Ok(claims)
    }

    /// Returns the session facade this verifier consults.
    pub fn sessions(&self) -> &Sessions {
        &self.sessions
    }
}

impl fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialVerifier")
            .field("algorithm", &self.config.algorithm)
            .field("sessions", &self.sessions)
            .finish()
    }
}

/// Reads `alg` from the JOSE header without trusting anything else in it.
fn header_algorithm(token: &str) -> AuthResult<String> {
    let invalid = || AuthError::unauthorized(reason::TOKEN_INVALID);

    let mut segments = token.split('.');
    let header = segments.next().ok_or_else(invalid)?;
    if segments.count() != 2 {
        return Err(invalid());
    }

    let bytes = URL_SAFE_NO_PAD.decode(header).map_err(|_| invalid())?;
    let header: JoseHeader = serde_json::from_slice(&bytes).map_err(|_| invalid())?;
    Ok(header.alg)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::{ManualClock, Role};
    use gatehouse_session::MemorySessionStore;

    const SECRET: &str = "test-secret-key-that-is-long-enough-for-testing";

    fn principal() -> Principal {
        Principal {
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password_hash: String::new(),
            roles: vec![Role::new(1, "SUPERADMIN"), Role::new(2, "ADMIN")],
        }
    }

    struct Fixture {
        clock: Arc<ManualClock>,
        issuer: TokenIssuer,
        verifier: CredentialVerifier,
    }

    fn fixture(config: JwtConfig) -> Fixture {
        let clock = Arc::new(ManualClock::starting_now());
        let store = Arc::new(MemorySessionStore::with_clock(clock.clone()));
        let sessions = Sessions::new(store, Duration::from_secs(1));
        Fixture {
            issuer: TokenIssuer::with_clock(config.clone(), clock.clone()),
            verifier: CredentialVerifier::with_clock(config, sessions, clock.clone()),
            clock,
        }
    }

    fn unsigned(alg: &str, claims: &Claims) -> String {
        let header = URL_SAFE_NO_PAD.encode(format!(r#"{{"alg":"{}","typ":"JWT"}}"#, alg));
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap());
        format!("{}.{}.", header, payload)
    }

    #[test]
    fn test_algorithm_parse() {
        assert_eq!(SigningAlgorithm::parse("HS384"), Some(SigningAlgorithm::HS384));
        assert_eq!(SigningAlgorithm::parse("RS256"), None);
        assert_eq!(SigningAlgorithm::parse("none"), None);
    }

    #[test]
    fn test_config_debug_redacts_secret() {
        let debug = format!("{:?}", JwtConfig::new(SECRET));
        assert!(!debug.contains(SECRET));
    }

    #[test]
    fn test_mint_times_align() {
        let f = fixture(JwtConfig::new(SECRET));
        let issued = f.issuer.mint(&principal(), Duration::from_secs(3600)).unwrap();

        assert_eq!(issued.session_ttl, Duration::from_secs(3600));
        assert_eq!(issued.claims.exp - issued.claims.iat, 3600);
        assert_eq!(issued.claims.roles.encode(), "SUPERADMIN|ADMIN");
        assert_eq!(issued.token.split('.').count(), 3);
    }

    #[test]
    fn test_mint_without_secret_is_internal() {
        let f = fixture(JwtConfig::default());
        let err = f.issuer.mint_default(&principal()).unwrap_err();
        assert_eq!(err.kind(), gatehouse_core::ErrorKind::Internal);
    }

    #[test]
    fn test_two_mints_differ() {
        let f = fixture(JwtConfig::new(SECRET));
        let a = f.issuer.mint_default(&principal()).unwrap();
        let b = f.issuer.mint_default(&principal()).unwrap();
        assert_ne!(a.token, b.token);
    }

    #[tokio::test]
    async fn test_verify_requires_session() {
        let f = fixture(JwtConfig::new(SECRET));
        let issued = f.issuer.mint_default(&principal()).unwrap();

        assert!(f.verifier.verify_claims(&issued.token).is_ok());
        let err = f.verifier.verify(&issued.token).await.unwrap_err();
        assert_eq!(err, AuthError::unauthorized(reason::SESSION_MISSING));

        f.verifier
            .sessions()
            .open(&issued.token, &issued.claims.snapshot(), issued.session_ttl)
            .await
            .unwrap();
        let verified = f.verifier.verify(&issued.token).await.unwrap();
        assert_eq!(verified.snapshot.email, "ada@example.com");
    }

    #[test]
    fn test_blank_token() {
        let f = fixture(JwtConfig::new(SECRET));
        assert_eq!(
            f.verifier.verify_claims("   ").unwrap_err(),
            AuthError::unauthorized(reason::TOKEN_REQUIRED)
        );
    }

    #[test]
    fn test_alg_none_rejected() {
        let f = fixture(JwtConfig::new(SECRET));
        let issued = f.issuer.mint_default(&principal()).unwrap();
        let forged = unsigned("none", &issued.claims);

        assert_eq!(
            f.verifier.verify_claims(&forged).unwrap_err(),
            AuthError::unauthorized(reason::INVALID_SIGNING_METHOD)
        );
    }

    #[test]
    fn test_other_hmac_rejected() {
        let f = fixture(JwtConfig::new(SECRET));
        let other = TokenIssuer::new(
            JwtConfig::new(SECRET).with_algorithm(SigningAlgorithm::HS512),
        );
        let issued = other.mint_default(&principal()).unwrap();
        assert_eq!(
            f.verifier.verify_claims(&issued.token).unwrap_err(),
            AuthError::unauthorized(reason::INVALID_SIGNING_METHOD)
        );
    }

    #[test]
    fn test_bad_signature_and_garbage() {
        let f = fixture(JwtConfig::new(SECRET));
        let other = TokenIssuer::new(JwtConfig::new("another-secret-that-is-long-enough-too"));
        let issued = other.mint_default(&principal()).unwrap();

        let invalid = AuthError::unauthorized(reason::TOKEN_INVALID);
        assert_eq!(f.verifier.verify_claims(&issued.token).unwrap_err(), invalid);
        assert_eq!(f.verifier.verify_claims("not-a-jwt").unwrap_err(), invalid);
        assert_eq!(f.verifier.verify_claims("a.b.c").unwrap_err(), invalid);
    }

    #[test]
    fn test_expiry_uses_clock() {
        let f = fixture(JwtConfig::new(SECRET));
        let issued = f.issuer.mint(&principal(), Duration::from_secs(60)).unwrap();

        f.clock.advance(chrono::Duration::seconds(59));
        assert!(f.verifier.verify_claims(&issued.token).is_ok());

        f.clock.advance(chrono::Duration::seconds(1));
        assert_eq!(
            f.verifier.verify_claims(&issued.token).unwrap_err(),
            AuthError::unauthorized(reason::TOKEN_EXPIRED)
        );
    }

    #[test]
    fn test_verify_without_secret_is_internal() {
        let f = fixture(JwtConfig::new(SECRET));
        let issued = f.issuer.mint_default(&principal()).unwrap();
        let g = fixture(JwtConfig::default());
        let err = g.verifier.verify_claims(&issued.token).unwrap_err();
        assert_eq!(err.kind(), gatehouse_core::ErrorKind::Internal);
    }
}
