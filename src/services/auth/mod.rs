pub mod bearer;
pub mod credential;
pub mod directory;
pub mod factory;
pub mod guard;
pub mod password;
pub mod roles;

pub use credential::{Claim, CredentialCodec, CredentialError, Subject};
pub use directory::PgUserDirectory;
pub use factory::{build_access_guard, build_credential_codec};
pub use guard::{AccessDecision, AccessGuard};
pub use password::ProductKeys;
pub use roles::{Role, RoleRegistry, RoleSet};
