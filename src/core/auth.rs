use crate::core::{AppError, AppState};
use crate::entities::{Membership, Role, User};
use crate::repositories::Read;
use axum::extract::State;
use axum::{Error, body::Body, extract::Request, http, http::Response, middleware::Next};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Contenuto del token jwt
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub exp: usize, // Expiry time of the token
    pub iat: usize, // Issued at time of the token
    pub id: i64,
    pub username: String,
}

#[instrument(skip(secret), fields(username = %username, id = %id))]
pub fn encode_jwt(username: String, id: i64, secret: &str) -> Result<String, Error> {
    debug!("Encoding JWT token for user");
    let now = Utc::now();
    let expire = Duration::hours(24);
    let exp = (now + expire).timestamp() as usize;
    let iat = now.timestamp() as usize;
    let claim = Claims {
        iat,
        exp,
        username,
        id,
    };

    encode(
        &Header::default(),
        &claim,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map(|token| {
        info!("JWT token encoded successfully");
        token
    })
    .map_err(|e| {
        error!("Failed to encode JWT token: {:?}", e);
        Error::new("Error in encoding jwt token")
    })
}

#[instrument(skip(jwt_token, secret))]
pub fn decode_jwt(jwt_token: &str, secret: &str) -> Result<TokenData<Claims>, Error> {
    debug!("Decoding JWT token");
    decode(
        jwt_token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data: TokenData<Claims>| {
        debug!("JWT token decoded for user: {}", data.claims.username);
        data
    })
    .map_err(|e| {
        warn!("Failed to decode JWT token: {:?}", e);
        Error::new("Error in decoding jwt token")
    })
}

/// Resolves a raw bearer token to the stored user.
///
/// Shared by the HTTP middleware and the notification socket, which receives
/// its token as a query parameter.
pub async fn user_from_token(state: &AppState, token: &str) -> Result<User, AppError> {
    let token_data = decode_jwt(token, &state.jwt_secret)
        .map_err(|_| AppError::unauthorized("Unable to decode token"))?;

    match state.user.read(&token_data.claims.id).await? {
        Some(user) if user.username == token_data.claims.username => Ok(user),
        _ => {
            warn!("User not found in database: {}", token_data.claims.username);
            Err(AppError::unauthorized("You are not an authorized user"))
        }
    }
}

#[instrument(skip(state, req, next))]
pub async fn authentication_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    debug!("Running authentication middleware");
    let auth_header = match req.headers().get(http::header::AUTHORIZATION) {
        Some(header) => header.to_str().map_err(|_| {
            warn!("Invalid authorization header format");
            AppError::forbidden("Empty header is not allowed")
        })?,
        None => {
            warn!("Missing authorization header");
            return Err(AppError::forbidden("Please add the JWT token to the header"));
        }
    };

    let mut header = auth_header.split_whitespace();
    let token = match (header.next(), header.next()) {
        (Some("Bearer"), Some(token)) => token.to_string(),
        _ => {
            warn!("Malformed authorization header");
            return Err(AppError::unauthorized("Expected a Bearer token"));
        }
    };

    let current_user = user_from_token(&state, &token).await?;
    debug!("User authenticated: {}", current_user.username);

    req.extensions_mut().insert(current_user);
    Ok(next.run(req).await)
}

/// Verifica che il ruolo della membership sia tra quelli permessi
#[instrument(skip(membership))]
pub fn require_role(membership: &Membership, allowed_roles: &[Role]) -> Result<(), AppError> {
    if !allowed_roles.contains(&membership.role) {
        warn!(
            "User {} has insufficient role {:?}, required one of: {:?}",
            membership.user_id, membership.role, allowed_roles
        );
        return Err(AppError::forbidden("Insufficient role").with_details(format!(
            "This action requires one of the following roles: {:?}",
            allowed_roles
        )));
    }

    debug!(
        "Role check passed for user {} with role {:?}",
        membership.user_id, membership.role
    );
    Ok(())
}
