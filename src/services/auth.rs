//! Auth services - Gestione autenticazione e registrazione utenti

use crate::core::{AppError, AppState, encode_jwt};
use crate::dtos::{CreateUserDTO, LoginDTO, TokenDTO, UserDTO};
use crate::entities::User;
use crate::repositories::Create;
use axum::{
    extract::{Json, State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

#[instrument(skip(state, body))]
pub async fn login_user(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginDTO>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Cercare l'utente nel database tramite username
    // 2. Se l'utente non esiste o la password non corrisponde, ritornare UNAUTHORIZED
    //    con lo stesso messaggio (non riveliamo quale dei due è sbagliato)
    // 3. Generare un token JWT con userid, username e il segreto
    // 4. Ritornare il token sia nell'header Authorization che nel body
    let Json(body) = body?;
    debug!("Login attempt for {}", body.username);

    let user = match state.user.find_by_username(&body.username).await? {
        Some(user) if user.verify_password(&body.password) => user,
        _ => {
            warn!("Failed login for {}", body.username);
            return Err(AppError::unauthorized("Username or password are not correct"));
        }
    };

    let token = encode_jwt(user.username, user.user_id, &state.jwt_secret)?;

    let mut headers = HeaderMap::new();
    let bearer = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|_| AppError::internal_server_error("Failed to build authorization header"))?;
    headers.insert(header::AUTHORIZATION, bearer);

    info!("User {} logged in", user.user_id);
    Ok((
        StatusCode::OK,
        headers,
        Json(TokenDTO {
            access_token: token,
            token_type: "Bearer".to_string(),
        }),
    ))
}

#[instrument(skip(state, body))]
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateUserDTO>, JsonRejection>,
) -> Result<(StatusCode, Json<UserDTO>), AppError> {
    // 1. Validare il DTO con validator (username pattern, lunghezza password)
    // 2. Se l'username è già usato ritornare BAD_REQUEST
    // 3. Salvare l'utente con la password hashata con bcrypt
    let Json(body) = body?;
    body.validate()?;

    if state.user.find_by_username(&body.username).await?.is_some() {
        return Err(AppError::bad_request("Username already exists"));
    }

    let password_hash = User::hash_password(&body.password).map_err(|e| {
        error!("Failed to hash password: {:?}", e);
        AppError::internal_server_error("Failed to hash password")
    })?;

    let new_user = CreateUserDTO {
        username: body.username,
        password: password_hash,
    };

    let created_user = state.user.create(&new_user).await?;
    info!("Registered user {}", created_user.user_id);

    Ok((StatusCode::CREATED, Json(UserDTO::from(created_user))))
}
