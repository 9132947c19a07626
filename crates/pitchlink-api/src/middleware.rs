use axum::{extract::Request, extract::State, middleware::Next, response::Response};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult};

/// Validate the bearer token and hand its claims to the handler.
pub async fn require_auth(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> ApiResult<Response> {
    let TypedHeader(Authorization(bearer)) =
        bearer.ok_or_else(|| ApiError::Unauthorized("Not authenticated".into()))?;
    let claims = state.tokens.verify(bearer.token())?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
