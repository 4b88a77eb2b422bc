// Public API - what other modules can use
pub use handlers::{authorize_channel, create_session};
pub use middleware::jwt_auth;
pub use service::SessionService;
pub use store::{CredentialStore, InMemoryCredentialStore, UserRecord};
pub use token::TokenConfig;
pub use types::{ChannelClaims, SessionClaims, SessionResponse};

// Internal modules
mod handlers;
mod middleware;
mod service;
mod store;
mod token;
mod types;
