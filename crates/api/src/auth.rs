use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use axum::{extract::FromRequestParts, http::request::Parts, http::HeaderMap};
use chrono::{Duration, Utc};
use entity::{app_user, user_role};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::ApiError, AppState};

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub session_ttl_minutes: i64,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("AUTH_SECRET").unwrap_or_else(|_| "dev-secret".into());
        let session_ttl_minutes = std::env::var("SESSION_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(60);
        Self {
            jwt_secret,
            session_ttl_minutes,
        }
    }

    pub fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.jwt_secret.as_bytes())
    }

    pub fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.jwt_secret.as_bytes())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub company: Option<Uuid>,
    pub roles: Vec<String>,
    pub exp: usize,
    pub iat: usize,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
pub enum UserRole {
    Owner,
    Admin,
    Manager,
    Member,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Owner => "OWNER",
            UserRole::Admin => "ADMIN",
            UserRole::Manager => "MANAGER",
            UserRole::Member => "MEMBER",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "OWNER" => Some(UserRole::Owner),
            "ADMIN" => Some(UserRole::Admin),
            "MANAGER" => Some(UserRole::Manager),
            "MEMBER" => Some(UserRole::Member),
            _ => None,
        }
    }

    pub fn level(self) -> u8 {
        match self {
            UserRole::Owner => 4,
            UserRole::Admin => 3,
            UserRole::Manager => 2,
            UserRole::Member => 1,
        }
    }
}

impl From<user_role::Role> for UserRole {
    fn from(value: user_role::Role) -> Self {
        match value {
            user_role::Role::Owner => UserRole::Owner,
            user_role::Role::Admin => UserRole::Admin,
            user_role::Role::Manager => UserRole::Manager,
            user_role::Role::Member => UserRole::Member,
        }
    }
}

impl From<UserRole> for user_role::Role {
    fn from(value: UserRole) -> Self {
        match value {
            UserRole::Owner => user_role::Role::Owner,
            UserRole::Admin => user_role::Role::Admin,
            UserRole::Manager => user_role::Role::Manager,
            UserRole::Member => user_role::Role::Member,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub company_id: Option<Uuid>,
    pub roles: Vec<UserRole>,
}

impl CurrentUser {
    pub fn has_role(&self, role: UserRole) -> bool {
        self.roles.iter().any(|r| r.level() >= role.level())
    }

    pub fn require(&self, role: UserRole) -> Result<(), ApiError> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(ApiError::Unauthenticated)?;
        let claims = decode_token(&token, &state.auth).map_err(|_| ApiError::Unauthenticated)?;
        load_current_user(state.db.as_ref(), claims.sub)
            .await?
            .ok_or(ApiError::Unauthenticated)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(axum::http::header::AUTHORIZATION)?;
    let text = value.to_str().ok()?;
    text.strip_prefix("Bearer ")
        .map(|rest| rest.trim().to_string())
}

/// Resolves the token subject against the database so deactivated
/// accounts lose access before their token expires.
pub async fn load_current_user(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<Option<CurrentUser>, ApiError> {
    let Some(user) = app_user::Entity::find_by_id(user_id).one(db).await? else {
        return Ok(None);
    };
    if !user.is_active {
        return Ok(None);
    }
    let roles = load_roles(db, user_id).await?;
    Ok(Some(CurrentUser {
        user_id,
        company_id: user.company_id,
        roles,
    }))
}

pub async fn load_roles(db: &DatabaseConnection, user_id: Uuid) -> Result<Vec<UserRole>, ApiError> {
    let rows = user_role::Entity::find()
        .filter(user_role::Column::UserId.eq(user_id))
        .all(db)
        .await?;
    Ok(rows.into_iter().map(|row| row.role.into()).collect())
}

pub fn issue_token(
    user: &CurrentUser,
    config: &AuthConfig,
) -> jsonwebtoken::errors::Result<String> {
    let now = Utc::now();
    let exp = now
        .checked_add_signed(Duration::minutes(config.session_ttl_minutes))
        .unwrap_or(now)
        .timestamp() as usize;
    let claims = SessionClaims {
        sub: user.user_id,
        company: user.company_id,
        roles: user.roles.iter().map(|r| r.as_str().to_string()).collect(),
        exp,
        iat: now.timestamp() as usize,
    };
    jsonwebtoken::encode(&Header::default(), &claims, &config.encoding_key())
}

pub fn decode_token(
    token: &str,
    config: &AuthConfig,
) -> jsonwebtoken::errors::Result<SessionClaims> {
    jsonwebtoken::decode::<SessionClaims>(token, &config.decoding_key(), &Validation::default())
        .map(|data| data.claims)
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| ApiError::internal(anyhow::anyhow!("hash error: {}", err)))
}

pub fn verify_password(hash: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(roles: &[UserRole]) -> CurrentUser {
        CurrentUser {
            user_id: Uuid::new_v4(),
            company_id: None,
            roles: roles.to_vec(),
        }
    }

    #[test]
    fn role_levels_are_hierarchical() {
        let manager = user(&[UserRole::Manager]);
        assert!(manager.has_role(UserRole::Member));
        assert!(manager.has_role(UserRole::Manager));
        assert!(!manager.has_role(UserRole::Admin));
        assert!(manager.require(UserRole::Admin).is_err());
    }

    #[test]
    fn tokens_round_trip() {
        let config = AuthConfig {
            jwt_secret: "test-secret".into(),
            session_ttl_minutes: 5,
        };
        let current = CurrentUser {
            user_id: Uuid::new_v4(),
            company_id: Some(Uuid::new_v4()),
            roles: vec![UserRole::Admin],
        };
        let token = issue_token(&current, &config).unwrap();
        let claims = decode_token(&token, &config).unwrap();
        assert_eq!(claims.sub, current.user_id);
        assert_eq!(claims.company, current.company_id);
        assert_eq!(claims.roles, vec!["ADMIN".to_string()]);
    }

    #[test]
    fn password_hashes_verify() {
        let hash = hash_password("s3cret").unwrap();
        assert!(verify_password(&hash, "s3cret"));
        assert!(!verify_password(&hash, "wrong"));
        assert!(!verify_password("not-a-hash", "s3cret"));
    }
}
