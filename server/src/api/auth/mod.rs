//! Authentication module
//!
//! - [`AuthManager`]: credentials, token issue/verification, cookie policy
//! - [`gate`]: per-route admission control
//! - [`identity`]: projection of stored users into caller identities

mod extractors;
pub mod gate;
pub mod identity;
pub mod jwt;
mod manager;
pub mod password;

pub use extractors::{AuthRejection, CurrentUser, OptionalUser};
pub use gate::{AccessRouter, RouteAccess};
pub use identity::{Identity, Profile, UserDetails};
pub use manager::{AuthError, AuthManager, extract_token};
