//! Request gate
//!
//! Every route is registered with a [`RouteAccess`] through [`AccessRouter`],
//! which installs [`gate`] as a route layer. The gate runs once per request
//! before the handler:
//!
//! 1. public route: allow, no identity resolution
//! 2. resolve identity (`optional` decides whether absence is an error)
//! 3. no identity: allow optional routes, reject the rest
//! 4. admin route without the `admin` role: reject
//! 5. attach the identity to request extensions and allow

use std::sync::Arc;

use axum::Router;
use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::MethodRouter;
use axum_extra::extract::CookieJar;

use super::identity::Identity;
use super::manager::{AuthError, AuthManager};
use crate::api::types::ApiError;

/// Admission flags attached to a route at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteAccess {
    /// Skip authentication entirely
    pub public: bool,
    /// Attach the identity when present, never reject for its absence
    pub optional: bool,
    /// Require the `admin` role of an authenticated caller
    pub admin: bool,
}

impl RouteAccess {
    pub const PUBLIC: Self = Self {
        public: true,
        optional: false,
        admin: false,
    };

    pub const OPTIONAL: Self = Self {
        public: false,
        optional: true,
        admin: false,
    };

    pub const AUTHENTICATED: Self = Self {
        public: false,
        optional: false,
        admin: false,
    };

    pub const ADMIN: Self = Self {
        public: false,
        optional: false,
        admin: true,
    };
}

/// Admission decision for a resolved (or absent) identity on a non-public route
fn admit(access: RouteAccess, identity: Option<&Identity>) -> Result<(), AuthError> {
    match identity {
        None if access.optional => Ok(()),
        None => Err(AuthError::MissingIdentity),
        Some(identity) if access.admin && !identity.is_admin() => Err(AuthError::AdminRequired),
        Some(_) => Ok(()),
    }
}

/// State for one gated route
#[derive(Clone)]
pub struct GateState {
    pub auth_manager: Arc<AuthManager>,
    pub access: RouteAccess,
}

/// Gate middleware
///
/// Injects into request extensions:
/// - `Identity` - the verified caller, when one was resolved
pub async fn gate(
    State(state): State<GateState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if state.access.public {
        return Ok(next.run(request).await);
    }

    let identity =
        state
            .auth_manager
            .resolve_identity(&jar, request.headers(), state.access.optional)?;

    if let Err(e) = admit(state.access, identity.as_ref()) {
        tracing::debug!(
            path = %request.uri().path(),
            user_id = identity.as_ref().map(|i| i.id),
            reason = %e,
            "Request rejected by gate"
        );
        return Err(e.into());
    }

    if let Some(identity) = identity {
        request.extensions_mut().insert(identity);
    }

    Ok(next.run(request).await)
}

/// Router builder that requires an admission policy for every route
pub struct AccessRouter<S = ()> {
    router: Router<S>,
    auth_manager: Arc<AuthManager>,
}

impl<S> AccessRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(auth_manager: Arc<AuthManager>) -> Self {
        Self {
            router: Router::new(),
            auth_manager,
        }
    }

    /// Register a route with its admission policy.
    ///
    /// Registering the same path again merges the method routers, so methods
    /// on one path may carry different policies.
    pub fn route(self, path: &str, access: RouteAccess, method_router: MethodRouter<S>) -> Self {
        let gated = method_router.route_layer(middleware::from_fn_with_state(
            GateState {
                auth_manager: self.auth_manager.clone(),
                access,
            },
            gate,
        ));

        Self {
            router: self.router.route(path, gated),
            auth_manager: self.auth_manager,
        }
    }

    /// Provide the handler state and finish the router
    pub fn with_state<S2>(self, state: S) -> Router<S2> {
        self.router.with_state(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::auth::identity::Profile;

    fn identity(roles: &[&str]) -> Identity {
        Identity {
            id: 1,
            name: "A".to_string(),
            email: "a@example.com".to_string(),
            user_roles: roles.iter().map(|r| r.to_string()).collect(),
            profile: Profile {
                avatar_path: "default_avatar.png".to_string(),
            },
        }
    }

    #[test]
    fn test_admit_authenticated() {
        assert!(admit(RouteAccess::AUTHENTICATED, Some(&identity(&["general"]))).is_ok());
        assert!(matches!(
            admit(RouteAccess::AUTHENTICATED, None),
            Err(AuthError::MissingIdentity)
        ));
    }

    #[test]
    fn test_admit_optional() {
        assert!(admit(RouteAccess::OPTIONAL, None).is_ok());
        assert!(admit(RouteAccess::OPTIONAL, Some(&identity(&["general"]))).is_ok());
    }

    #[test]
    fn test_admit_admin() {
        assert!(matches!(
            admit(RouteAccess::ADMIN, Some(&identity(&["general"]))),
            Err(AuthError::AdminRequired)
        ));
        assert!(matches!(
            admit(RouteAccess::ADMIN, Some(&identity(&["read_only_admin"]))),
            Err(AuthError::AdminRequired)
        ));
        assert!(admit(RouteAccess::ADMIN, Some(&identity(&["general", "admin"]))).is_ok());
    }

    #[test]
    fn test_admin_flag_ignored_without_identity_on_optional_route() {
        let access = RouteAccess {
            public: false,
            optional: true,
            admin: true,
        };
        assert!(admit(access, None).is_ok());
        assert!(matches!(
            admit(access, Some(&identity(&["general"]))),
            Err(AuthError::AdminRequired)
        ));
    }

    #[test]
    fn test_default_is_authenticated() {
        assert_eq!(RouteAccess::default(), RouteAccess::AUTHENTICATED);
    }
}
