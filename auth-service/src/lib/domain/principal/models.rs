use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::principal::errors::CredentialError;
use crate::principal::errors::ProfileError;
use crate::principal::errors::RoleError;
use crate::principal::errors::SubjectError;

/// Principal aggregate entity.
///
/// The authoritative account record used for authentication and
/// authorization decisions.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: PrincipalId,
    pub subject: Subject,
    pub credential_digest: String,
    pub profile: Profile,
    pub role: Role,
    pub enabled: bool,
    pub account_locked: bool,
    pub credentials_expired: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Principal {
    /// Build a freshly registered principal with default role and flags.
    pub fn register(subject: Subject, credential_digest: String, profile: Profile) -> Self {
        let now = Utc::now();
        Self {
            id: PrincipalId::new(),
            subject,
            credential_digest,
            profile,
            role: Role::default(),
            enabled: true,
            account_locked: false,
            credentials_expired: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the account may authenticate at all.
    pub fn can_authenticate(&self) -> bool {
        self.enabled && !self.account_locked && !self.credentials_expired
    }
}

/// Principal unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrincipalId(pub Uuid);

impl PrincipalId {
    /// Generate a new random principal ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Subject value type: the unique login identifier, an email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subject(String);

impl Subject {
    /// Create a new validated subject.
    ///
    /// # Arguments
    /// * `subject` - Raw email string
    ///
    /// # Errors
    /// * `InvalidFormat` - Not a valid email address
    pub fn new(subject: String) -> Result<Self, SubjectError> {
        email_address::EmailAddress::from_str(&subject)
            .map(|_| Subject(subject))
            .map_err(|e| SubjectError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext credential supplied at registration.
///
/// Never printed: `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    const MIN_LENGTH: usize = 8;
    const MAX_LENGTH: usize = 100;

    /// Create a new credential, enforcing length bounds (in characters).
    ///
    /// # Errors
    /// * `TooShort` - Fewer than 8 characters
    /// * `TooLong` - More than 100 characters
    pub fn new(credential: String) -> Result<Self, CredentialError> {
        let length = credential.chars().count();
        if length < Self::MIN_LENGTH {
            Err(CredentialError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(CredentialError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(credential))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Display profile of a principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
}

impl Profile {
    const MAX_NAME_LENGTH: usize = 50;

    /// Create a validated profile. Names are trimmed.
    ///
    /// # Errors
    /// * `Blank` - A name is empty after trimming
    /// * `TooLong` - A name exceeds 50 characters
    pub fn new(first_name: String, last_name: String) -> Result<Self, ProfileError> {
        Ok(Self {
            first_name: Self::validated_name("first_name", first_name)?,
            last_name: Self::validated_name("last_name", last_name)?,
        })
    }

    fn validated_name(field: &'static str, name: String) -> Result<String, ProfileError> {
        let name = name.trim();
        if name.is_empty() {
            Err(ProfileError::Blank { field })
        } else if name.chars().count() > Self::MAX_NAME_LENGTH {
            Err(ProfileError::TooLong {
                field,
                max: Self::MAX_NAME_LENGTH,
            })
        } else {
            Ok(name.to_string())
        }
    }
}

/// Platform roles. New principals are patients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    Admin,
    Doctor,
    Nurse,
    #[default]
    Patient,
    Receptionist,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Doctor,
        Role::Nurse,
        Role::Patient,
        Role::Receptionist,
    ];

    /// Storage and claim form of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Doctor => "DOCTOR",
            Role::Nurse => "NURSE",
            Role::Patient => "PATIENT",
            Role::Receptionist => "RECEPTIONIST",
        }
    }

    /// Authority tag checked by authorization: the role name prefixed with `ROLE_`.
    pub fn authority(self) -> &'static str {
        match self {
            Role::Admin => "ROLE_ADMIN",
            Role::Doctor => "ROLE_DOCTOR",
            Role::Nurse => "ROLE_NURSE",
            Role::Patient => "ROLE_PATIENT",
            Role::Receptionist => "ROLE_RECEPTIONIST",
        }
    }
}

impl FromStr for Role {
    type Err = RoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RoleError::Unknown(s.to_string()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Command to register a new principal with domain types
#[derive(Debug)]
pub struct RegisterCommand {
    pub subject: Subject,
    pub credential: Credential,
    pub profile: Profile,
}

impl RegisterCommand {
    pub fn new(subject: Subject, credential: Credential, profile: Profile) -> Self {
        Self {
            subject,
            credential,
            profile,
        }
    }
}

/// Bearer token handed to a client after login or registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in_seconds: i64,
}

impl IssuedToken {
    pub const TOKEN_TYPE: &'static str = "Bearer";

    pub fn bearer(access_token: String, expires_in_seconds: i64) -> Self {
        Self {
            access_token,
            token_type: Self::TOKEN_TYPE,
            expires_in_seconds,
        }
    }
}

/// Outcome of a successful login or registration.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub principal: Principal,
    pub token: IssuedToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_authority_mapping() {
        assert_eq!(Role::Admin.authority(), "ROLE_ADMIN");
        assert_eq!(Role::Doctor.authority(), "ROLE_DOCTOR");
        assert_eq!(Role::Nurse.authority(), "ROLE_NURSE");
        assert_eq!(Role::Patient.authority(), "ROLE_PATIENT");
        assert_eq!(Role::Receptionist.authority(), "ROLE_RECEPTIONIST");

        for role in Role::ALL {
            assert_eq!(role.authority(), format!("ROLE_{}", role.as_str()));
        }
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("DOCTOR".parse::<Role>(), Ok(Role::Doctor));
        assert_eq!("nurse".parse::<Role>(), Ok(Role::Nurse));
        assert_eq!(" Receptionist ".parse::<Role>(), Ok(Role::Receptionist));
        assert!(matches!(
            "SURGEON".parse::<Role>(),
            Err(RoleError::Unknown(_))
        ));
        assert_eq!(Role::default(), Role::Patient);
    }

    #[test]
    fn test_subject_validation() {
        assert!(Subject::new("john@hospital.com".to_string()).is_ok());
        assert!(matches!(
            Subject::new("not-an-email".to_string()),
            Err(SubjectError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_credential_length() {
        assert!(Credential::new("12345678".to_string()).is_ok());
        assert_eq!(
            Credential::new("short".to_string()),
            Err(CredentialError::TooShort { min: 8, actual: 5 })
        );
        assert_eq!(
            Credential::new("x".repeat(101)),
            Err(CredentialError::TooLong {
                max: 100,
                actual: 101
            })
        );
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::new("super-secret-value".to_string()).unwrap();
        assert!(!format!("{:?}", credential).contains("super-secret-value"));
    }

    #[test]
    fn test_profile_validation() {
        let profile = Profile::new("  John ".to_string(), "Watson".to_string()).unwrap();
        assert_eq!(profile.first_name, "John");

        assert_eq!(
            Profile::new(" ".to_string(), "Watson".to_string()),
            Err(ProfileError::Blank {
                field: "first_name"
            })
        );
        assert_eq!(
            Profile::new("John".to_string(), "W".repeat(51)),
            Err(ProfileError::TooLong {
                field: "last_name",
                max: 50
            })
        );
    }

    #[test]
    fn test_registered_principal_defaults() {
        let principal = Principal::register(
            Subject::new("john@hospital.com".to_string()).unwrap(),
            "$argon2id$digest".to_string(),
            Profile::new("John".to_string(), "Watson".to_string()).unwrap(),
        );

        assert_eq!(principal.role, Role::Patient);
        assert!(principal.enabled);
        assert!(!principal.account_locked);
        assert!(!principal.credentials_expired);
        assert!(principal.can_authenticate());
    }

    #[test]
    fn test_unusable_principal() {
        let mut principal = Principal::register(
            Subject::new("john@hospital.com".to_string()).unwrap(),
            "$argon2id$digest".to_string(),
            Profile::new("John".to_string(), "Watson".to_string()).unwrap(),
        );

        principal.enabled = false;
        assert!(!principal.can_authenticate());

        principal.enabled = true;
        principal.account_locked = true;
        assert!(!principal.can_authenticate());

        principal.account_locked = false;
        principal.credentials_expired = true;
        assert!(!principal.can_authenticate());
    }
}
