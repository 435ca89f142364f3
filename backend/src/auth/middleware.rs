//! Middleware for protecting authenticated routes and handling authorization.
//!
//! A guarded route resolves the caller's bearer token into a [`Principal`],
//! checks it against the route's [`AuthorizationPolicy`], and runs the handler
//! under the [`RevocationManager`](super::revocation::RevocationManager) so
//! one-time-use tokens are consumed once the handler succeeds.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::{from_fn_with_state, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::MethodRouter;
use tracing::debug;

use super::errors::AuthError;
use super::models::{AuthorizationPolicy, Principal};
use super::policy;
use crate::errors::AppError;
use crate::state::AppState;

/// Pulls the bearer token out of the `Authorization` header.
///
/// Both `Bearer <token>` and `Bearer: <token>` are accepted.
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let rest = value.strip_prefix("Bearer")?;
    let token = match rest.strip_prefix(':') {
        Some(token) => token,
        None if rest.starts_with(char::is_whitespace) => rest,
        None => return None,
    };
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Per-route middleware state: the application plus the route's policy.
#[derive(Clone)]
pub struct Guard {
    state: AppState,
    policy: Arc<AuthorizationPolicy>,
}

impl Guard {
    pub fn new(state: AppState, policy: AuthorizationPolicy) -> Self {
        Self {
            state,
            policy: Arc::new(policy),
        }
    }

    async fn authenticate(&self, headers: &HeaderMap) -> Result<Principal, AuthError> {
        let token = extract_bearer(headers).ok_or(AuthError::NoTokenProvided)?;
        let principal = self.state.tokens.verify(token).await?;
        policy::authorize(Some(&principal), &self.policy)?;
        Ok(principal)
    }
}

/// Wraps `route` so every request must satisfy `policy`.
pub fn guard(
    route: MethodRouter<AppState>,
    state: &AppState,
    policy: AuthorizationPolicy,
) -> MethodRouter<AppState> {
    route.route_layer(from_fn_with_state(Guard::new(state.clone(), policy), authorize))
}

/// A non-2xx handler response travels through the revocation boundary as an
/// error so the token survives.
struct Passthrough(Response);

impl From<AuthError> for Passthrough {
    fn from(err: AuthError) -> Self {
        Passthrough(AppError::from(err).into_response())
    }
}

pub async fn authorize(State(guard): State<Guard>, mut request: Request, next: Next) -> Response {
    let principal = match guard.authenticate(request.headers()).await {
        Ok(principal) => principal,
        Err(err) => {
            debug!("Rejected request to {}: {}", request.uri().path(), err);
            return AppError::from(err).into_response();
        }
    };

    request.extensions_mut().insert(principal.clone());
    let outcome = guard
        .state
        .revocation
        .run(&principal, async move {
            let response = next.run(request).await;
            if response.status().is_success() {
                Ok(response)
            } else {
                Err(Passthrough(response))
            }
        })
        .await;

    match outcome {
        Ok(response) | Err(Passthrough(response)) => response,
    }
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or(AppError::Auth(AuthError::NoTokenProvided))
    }
}
