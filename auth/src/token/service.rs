use std::collections::HashMap;

use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::ConfigurationError;
use super::errors::TokenError;

/// Issues and validates stateless bearer tokens.
///
/// Tokens are HS256-signed JWTs. Validity depends only on the signature and
/// the `exp` claim, so any instance holding the same secret can validate a
/// token issued by any other instance.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl TokenService {
    /// Minimum secret length in bytes (256 bits for HS256).
    pub const MIN_SECRET_LENGTH: usize = 32;

    /// Create a token service from the raw bytes of the configured secret.
    ///
    /// # Arguments
    /// * `secret` - Signing secret, used as-is (no base64 decoding)
    ///
    /// # Returns
    /// TokenService configured with HS256
    ///
    /// # Errors
    /// * `MissingSecret` - Secret is empty
    /// * `SecretTooShort` - Secret is shorter than 32 bytes
    pub fn new(secret: &[u8]) -> Result<Self, ConfigurationError> {
        if secret.is_empty() {
            return Err(ConfigurationError::MissingSecret);
        }
        if secret.len() < Self::MIN_SECRET_LENGTH {
            return Err(ConfigurationError::SecretTooShort {
                min: Self::MIN_SECRET_LENGTH,
                actual: secret.len(),
            });
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        })
    }

    /// Issue a token for `subject`, valid for `ttl` from now.
    ///
    /// # Arguments
    /// * `subject` - Identity claim (`sub`)
    /// * `extra_claims` - Custom claims merged into the payload; reserved names are ignored
    /// * `ttl` - Lifetime of the token
    ///
    /// # Returns
    /// Signed compact token string
    ///
    /// # Errors
    /// * `LifetimeOutOfRange` - Expiry would overflow the timestamp range
    /// * `EncodingFailed` - Claims could not be serialized or signed
    pub fn issue(
        &self,
        subject: &str,
        extra_claims: HashMap<String, serde_json::Value>,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let claims = Claims::new(subject, Utc::now(), ttl)?.with_extra_claims(extra_claims);
        self.sign(&claims)
    }

    /// Sign an already built set of claims.
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))
    }

    /// Decode and validate a token.
    ///
    /// # Arguments
    /// * `token` - Compact token string
    ///
    /// # Returns
    /// Decoded claims
    ///
    /// # Errors
    /// * `Invalid` - Malformed, bad signature, unsupported algorithm or missing claims
    /// * `Expired` - Authentic token whose `exp` is at or before the current time
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_required_spec_claims(&["sub", "exp"]);
        // Expiry is checked below with zero leeway, after the signature.
        validation.validate_exp = false;
        validation.leeway = 0;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Invalid(e.to_string()),
                }
            })?;

        let claims = token_data.claims;
        if claims.is_expired(Utc::now().timestamp()) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// Check that `token` is valid and was issued to `expected_subject`.
    ///
    /// Any validation failure or subject mismatch yields `false`.
    pub fn is_valid_for(&self, token: &str, expected_subject: &str) -> bool {
        self.validate(token)
            .map(|claims| claims.sub == expected_subject)
            .unwrap_or(false)
    }
}
