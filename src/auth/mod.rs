pub mod claims;
pub mod guard;
pub mod permissions;
pub mod resolver;
pub mod session;
pub mod store;

pub use guard::{AccessGuard, Decision, Requirement};
pub use permissions::{permits, permits_named};
pub use resolver::IdentityResolver;
pub use session::{Identity, SessionEnd, SessionState, SessionStore};
pub use store::{FileTokenStore, MemoryTokenStore, StoreError, TokenStore};
