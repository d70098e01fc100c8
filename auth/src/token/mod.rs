pub mod claims;
pub mod errors;
pub mod service;

pub use claims::Claims;
pub use errors::ConfigurationError;
pub use errors::TokenError;
pub use service::TokenService;
