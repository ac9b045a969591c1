use std::env;
use std::future::Future;

use axum::{
    extract::{FromRequestParts, Json, State},
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

const AUTH_COOKIE_NAME: &str = "relieflink_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Donor,
    Victim,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub role: UserRole,
}

#[derive(Debug, Clone)]
struct UserAccount {
    profile: UserProfile,
    password: String,
}

/// In-memory stand-in for the authentication backend. Accounts live only
/// for the process lifetime; passwords are compared in the clear, the way
/// the platform's stubbed session expects.
pub struct UserRegistry {
    accounts: RwLock<HashMap<String, UserAccount>>,
}

impl UserRegistry {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
        }
    }

    /// Seeds demo donor/victim accounts outside production when
    /// `DEMO_PASSWORD` is configured. A literal "password" is refused.
    pub async fn with_demo_accounts() -> Self {
        let registry = Self::new();
        let env_mode = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());
        let Ok(demo_password) = env::var("DEMO_PASSWORD") else {
            return registry;
        };
        if env_mode == "production" || demo_password == "password" {
            tracing::warn!("demo accounts disabled (production mode or default password)");
            return registry;
        }

        for (name, email, role) in [
            ("Sarah Johnson", "donor@relieflink.demo", UserRole::Donor),
            ("Alex Rivera", "victim@relieflink.demo", UserRole::Victim),
        ] {
            if let Err(err) = registry
                .register(name.to_string(), email.to_string(), demo_password.clone(), role)
                .await
            {
                tracing::warn!("failed to seed demo account {}: {}", email, err);
            }
        }
        registry
    }

    pub async fn register(
        &self,
        name: String,
        email: String,
        password: String,
        role: UserRole,
    ) -> Result<UserProfile, AppError> {
        if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "name, email and password are required".to_string(),
            ));
        }
        let email = email.trim().to_lowercase();

        let mut accounts = self.accounts.write().await;
        if accounts.values().any(|account| account.profile.email == email) {
            return Err(AppError::Conflict("an account with this email already exists".to_string()));
        }

        let profile = UserProfile {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            email,
            avatar: None,
            role,
        };
        accounts.insert(
            profile.id.clone(),
            UserAccount {
                profile: profile.clone(),
                password,
            },
        );
        Ok(profile)
    }

    pub async fn verify(&self, email: &str, password: &str) -> Option<UserProfile> {
        let email = email.trim().to_lowercase();
        let accounts = self.accounts.read().await;
        accounts
            .values()
            .find(|account| account.profile.email == email && account.password == password)
            .map(|account| account.profile.clone())
    }

    pub async fn get(&self, id: &str) -> Option<UserProfile> {
        self.accounts.read().await.get(id).map(|account| account.profile.clone())
    }

    pub async fn update_profile(
        &self,
        id: &str,
        name: Option<String>,
        avatar: Option<String>,
    ) -> Result<UserProfile, AppError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts.get_mut(id).ok_or(AppError::NotFound("account"))?;
        if let Some(name) = name {
            if name.trim().is_empty() {
                return Err(AppError::Validation("name cannot be empty".to_string()));
            }
            account.profile.name = name.trim().to_string();
        }
        if let Some(avatar) = avatar {
            account.profile.avatar = Some(avatar);
        }
        Ok(account.profile.clone())
    }
}

impl Default for UserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// Claims for our JWT
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
    email: String,
    name: String,
    role: UserRole,
}

pub struct AuthenticatedUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync + 'static,
{
    type Rejection = (StatusCode, String);

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            let token = extract_token_from_headers(&parts.headers)
                .ok_or((StatusCode::UNAUTHORIZED, "Missing auth token".to_string()))?;
            let claims = validate_claims(&token).map_err(|err| {
                tracing::error!("Token error: {}", err);
                (StatusCode::UNAUTHORIZED, "Invalid token".to_string())
            })?;

            Ok(AuthenticatedUser {
                id: claims.sub,
                email: claims.email,
                name: claims.name,
                role: claims.role,
            })
        }
    }
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub user: UserProfile,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let profile = state
        .users
        .register(payload.name, payload.email, payload.password, payload.role)
        .await?;
    session_response(profile)
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let Some(profile) = state.users.verify(&payload.email, &payload.password).await else {
        return Err(AppError::Unauthorized);
    };
    session_response(profile)
}

pub async fn logout() -> impl IntoResponse {
    let cookie = clear_auth_cookie();
    let mut response = (StatusCode::OK, "OK").into_response();
    response
        .headers_mut()
        .insert(header::SET_COOKIE, HeaderValue::from_str(&cookie).expect("cookie header"));
    response
}

pub async fn me(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserProfile>, AppError> {
    let profile = state.users.get(&user.id).await.ok_or(AppError::NotFound("account"))?;
    Ok(Json(profile))
}

pub async fn update_me(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let profile = state
        .users
        .update_profile(&user.id, payload.name, payload.avatar)
        .await?;
    Ok(Json(profile))
}

fn session_response(profile: UserProfile) -> Result<axum::response::Response, AppError> {
    let token = create_jwt(&profile)?;
    let cookie = build_auth_cookie(&token);
    let mut response = Json(AuthResponse { user: profile }).into_response();
    response.headers_mut().insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie)
            .map_err(|err| AppError::Internal(anyhow::anyhow!("cookie header: {err}")))?,
    );
    Ok(response)
}

fn create_jwt(user: &UserProfile) -> Result<String, AppError> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::days(1))
        .expect("valid timestamp")
        .timestamp();

    let claims = Claims {
        sub: user.id.clone(),
        exp: expiration as usize,
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role,
    };

    let secret = env::var("JWT_SECRET")
        .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET environment variable not set")))?;
    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_ref()))
        .map_err(|err| AppError::Internal(anyhow::anyhow!("JWT creation failed: {err}")))?;
    Ok(token)
}

pub fn extract_token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(auth_header) = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
    {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            return Some(token.to_string());
        }
    }

    if let Some(cookie_header) = headers.get(header::COOKIE).and_then(|value| value.to_str().ok()) {
        for cookie in cookie_header.split(';') {
            let cookie = cookie.trim();
            if let Some((key, value)) = cookie.split_once('=') {
                if key == AUTH_COOKIE_NAME {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

pub fn validate_token_str(token: &str) -> anyhow::Result<()> {
    validate_claims(token).map(|_| ())
}

fn validate_claims(token: &str) -> anyhow::Result<Claims> {
    let secret = env::var("JWT_SECRET")
        .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable not set"))?;
    let mut validation = Validation::default();
    validation.validate_exp = true;
    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_ref()), &validation)?;
    Ok(data.claims)
}

fn build_auth_cookie(token: &str) -> String {
    let secure = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string()) == "production";
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age=86400",
        AUTH_COOKIE_NAME, token
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn clear_auth_cookie() -> String {
    let secure = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string()) == "production";
    let mut cookie = format!(
        "{}=; HttpOnly; SameSite=Strict; Path=/; Max-Age=0",
        AUTH_COOKIE_NAME
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}
