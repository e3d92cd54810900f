//! Client-side credential lifecycle
//!
//! Storage, credential store, gateway, identity provider, session context
//! and the route guard. The egui views sit on top of this module.

pub mod credentials;
pub mod error;
pub mod gateway;
pub mod provider;
pub mod router;
pub mod session;
pub mod storage;

pub use credentials::{Credential, CredentialStore};
pub use error::GatewayError;
pub use gateway::{ApiGateway, ApiGatewayBuilder, UnauthorizedHandler};
pub use provider::{CredentialProvider, TokenProvider};
pub use router::{resolve, Navigation, Navigator, Route};
pub use session::{SessionContext, SessionState};
pub use storage::{FileStorage, MemoryStorage, PersistedSession, SessionStorage, StorageError};
