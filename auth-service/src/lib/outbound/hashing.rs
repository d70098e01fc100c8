use crate::domain::principal::ports::CredentialHasher;
use crate::principal::errors::PrincipalError;

/// Argon2id credential hashing backed by the shared auth library.
#[derive(Debug, Clone, Default)]
pub struct Argon2CredentialHasher {
    inner: auth::PasswordHasher,
}

impl Argon2CredentialHasher {
    pub fn new() -> Self {
        Self {
            inner: auth::PasswordHasher::new(),
        }
    }
}

impl CredentialHasher for Argon2CredentialHasher {
    fn hash(&self, plaintext: &str) -> Result<String, PrincipalError> {
        Ok(self.inner.hash(plaintext)?)
    }

    fn matches(&self, plaintext: &str, digest: &str) -> Result<bool, PrincipalError> {
        Ok(self.inner.matches(plaintext, digest)?)
    }

    fn matches_unknown(&self, plaintext: &str) {
        self.inner.matches_unknown(plaintext);
    }
}
