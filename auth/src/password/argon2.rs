use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use super::errors::PasswordError;

/// Salt used when there is no stored digest to check against.
const UNKNOWN_DIGEST_SALT: &[u8] = b"no-such-principal";

/// One-way salted credential hashing (Argon2id v19, PHC string output).
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    pub fn new() -> Self {
        Self
    }

    fn argon2() -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default())
    }

    /// Hash a plaintext credential with a fresh random salt.
    ///
    /// # Errors
    /// * `HashingFailed` - Argon2 rejected the input or parameters
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        Self::argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|digest| digest.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Check a plaintext credential against a stored PHC digest.
    ///
    /// Only Argon2id digests are accepted; the cost parameters are read from
    /// the digest itself.
    ///
    /// # Errors
    /// * `VerificationFailed` - Stored digest is not an Argon2id PHC string
    pub fn matches(&self, plaintext: &str, digest: &str) -> Result<bool, PasswordError> {
        let parsed = PasswordHash::new(digest).map_err(|e| {
            PasswordError::VerificationFailed(format!("Invalid credential digest: {}", e))
        })?;

        if parsed.algorithm != Algorithm::Argon2id.ident() {
            return Err(PasswordError::VerificationFailed(format!(
                "Unsupported digest algorithm: {}",
                parsed.algorithm
            )));
        }

        Ok(Self::argon2()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok())
    }

    /// Spend the same Argon2 work as [`matches`](Self::matches) when no digest
    /// exists for the claimed identity. Always `false`.
    pub fn matches_unknown(&self, plaintext: &str) -> bool {
        let mut output = [0u8; Params::DEFAULT_OUTPUT_LEN];
        let _ = Self::argon2().hash_password_into(
            plaintext.as_bytes(),
            UNKNOWN_DIGEST_SALT,
            &mut output,
        );
        false
    }
}
