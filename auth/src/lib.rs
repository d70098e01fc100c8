//! Authentication building blocks shared by the platform services:
//! - Credential hashing (Argon2id)
//! - Stateless bearer token issuance and validation (HS256 JWT)
//!
//! Services define their own ports and adapt these implementations.
//!
//! # Examples
//!
//! ## Credential Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let digest = hasher.hash("my_password").unwrap();
//! assert!(hasher.matches("my_password", &digest).unwrap());
//! ```
//!
//! ## Tokens
//! ```
//! use std::collections::HashMap;
//!
//! use auth::TokenService;
//! use chrono::Duration;
//!
//! let tokens = TokenService::new(b"secret_key_at_least_32_bytes_long!").unwrap();
//!
//! let mut extra = HashMap::new();
//! extra.insert("role".to_string(), serde_json::json!("DOCTOR"));
//!
//! let token = tokens
//!     .issue("john@hospital.com", extra, Duration::hours(1))
//!     .unwrap();
//! let claims = tokens.validate(&token).unwrap();
//! assert_eq!(claims.sub, "john@hospital.com");
//! assert_eq!(claims.role(), Some("DOCTOR"));
//! assert!(tokens.is_valid_for(&token, "john@hospital.com"));
//! ```

pub mod password;
pub mod token;

// Re-export commonly used items
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::Claims;
pub use token::ConfigurationError;
pub use token::TokenError;
pub use token::TokenService;
