use axum::{
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, header, request::Parts},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use oneiro_types::api::Claims;

use crate::auth::AppState;

/// Who is making the request. Anonymous requests carry `Viewer(None)`.
#[derive(Debug, Clone, Default)]
pub struct Viewer(pub Option<Claims>);

impl Viewer {
    pub fn id(&self) -> Option<Uuid> {
        self.0.as_ref().map(|c| c.sub)
    }

    pub fn id_string(&self) -> Option<String> {
        self.id().map(|id| id.to_string())
    }
}

/// Resolve the optional bearer token into a `Viewer` extension.
///
/// No Authorization header means anonymous; a header that is present but
/// malformed or carries a bad token is rejected.
pub async fn resolve_viewer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let viewer = match req.headers().get(header::AUTHORIZATION) {
        None => Viewer(None),
        Some(value) => {
            let token = value
                .to_str()
                .ok()
                .and_then(|v| v.strip_prefix("Bearer "))
                .ok_or(StatusCode::UNAUTHORIZED)?;

            let token_data = decode::<Claims>(
                token,
                &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
                &Validation::default(),
            )
            .map_err(|_| StatusCode::UNAUTHORIZED)?;

            Viewer(Some(token_data.claims))
        }
    };

    req.extensions_mut().insert(viewer);
    Ok(next.run(req).await)
}

/// Extractor for routes that require a signed-in caller.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Viewer>()
            .and_then(|v| v.0.clone())
            .map(AuthUser)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}
