use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use entity::{app_user, user_role, user_secret};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::{self, issue_token, verify_password, CurrentUser, UserRole},
    error::{ApiError, ApiResult},
    pagination::{fetch_page, Page, PageQuery},
    tenant::effective_company,
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user).patch(update_user))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: UserDto,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub company_id: Option<Uuid>,
    pub is_active: bool,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserDto {
    fn from_model(model: app_user::Model, roles: Vec<UserRole>) -> Self {
        Self {
            id: model.id,
            email: model.email,
            display_name: model.display_name,
            company_id: model.company_id,
            is_active: model.is_active,
            roles: roles.into_iter().map(|r| r.as_str().to_string()).collect(),
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let db = state.db.as_ref();
    let email = normalize_email(&payload.email)?;
    let user = app_user::Entity::find()
        .filter(app_user::Column::Email.eq(email))
        .one(db)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;
    if !user.is_active {
        return Err(ApiError::InvalidCredentials);
    }
    let secret = user_secret::Entity::find_by_id(user.id)
        .one(db)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;
    if !verify_password(&secret.password_hash, &payload.password) {
        return Err(ApiError::InvalidCredentials);
    }
    let roles = auth::load_roles(db, user.id).await?;
    let current = CurrentUser {
        user_id: user.id,
        company_id: user.company_id,
        roles: roles.clone(),
    };
    let token = issue_token(&current, &state.auth)
        .map_err(|err| ApiError::internal(anyhow::anyhow!("token issue failed: {}", err)))?;
    Ok(Json(LoginResponse {
        token,
        user: UserDto::from_model(user, roles),
    }))
}

async fn me(State(state): State<AppState>, current: CurrentUser) -> ApiResult<Json<UserDto>> {
    let db = state.db.as_ref();
    let user = app_user::Entity::find_by_id(current.user_id)
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(Json(UserDto::from_model(user, current.roles)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub company_id: Option<Uuid>,
    pub q: Option<String>,
}

async fn list_users(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<UserListQuery>,
) -> ApiResult<Json<Page<UserDto>>> {
    current.require(UserRole::Admin)?;
    let db = state.db.as_ref();
    let mut select = app_user::Entity::find();
    if let Some(company_id) = effective_company(&current, query.company_id)? {
        select = select.filter(app_user::Column::CompanyId.eq(company_id));
    }
    if let Some(filter) = sanitize_filter(query.q) {
        let pattern = format!("%{}%", filter);
        select = select.filter(
            Condition::any()
                .add(app_user::Column::Email.like(pattern.clone()))
                .add(app_user::Column::DisplayName.like(pattern)),
        );
    }
    let page = fetch_page(db, select.order_by_asc(app_user::Column::Email), &PageQuery { page: query.page, limit: query.limit }).await?;
    let mut out = Vec::with_capacity(page.data.len());
    for model in &page.data {
        let roles = auth::load_roles(db, model.id).await?;
        out.push(UserDto::from_model(model.clone(), roles));
    }
    let Page {
        total, page: p, limit, ..
    } = page;
    Ok(Json(Page::new(out, total, p, limit)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserRequest {
    pub email: String,
    pub display_name: String,
    pub password: String,
    pub company_id: Option<Uuid>,
    pub roles: Vec<String>,
}

async fn create_user(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<NewUserRequest>,
) -> ApiResult<Json<UserDto>> {
    current.require(UserRole::Admin)?;
    let db = state.db.as_ref();
    let email = normalize_email(&payload.email)?;
    let display_name = validate_display_name(&payload.display_name)?;
    let roles = parse_roles(&payload.roles)?;
    if roles.is_empty() {
        return Err(ApiError::validation("roles must include at least one entry"));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::validation("password must be at least 8 characters"));
    }
    // A tenant admin can only mint accounts inside the tenant.
    let company_id = match current.company_id {
        Some(own) => {
            if payload.company_id.is_some_and(|req| req != own) {
                return Err(ApiError::NotFound("Company"));
            }
            Some(own)
        }
        None => payload.company_id,
    };
    let password_hash = auth::hash_password(&payload.password)?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    let user_id = Uuid::new_v4();
    let txn = db.begin().await?;
    app_user::ActiveModel {
        id: Set(user_id),
        email: Set(email),
        display_name: Set(display_name),
        company_id: Set(company_id),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    user_secret::ActiveModel {
        user_id: Set(user_id),
        password_hash: Set(password_hash),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    insert_roles(&txn, user_id, &roles).await?;
    txn.commit().await?;
    let record = app_user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::internal(anyhow::anyhow!("failed to load new user")))?;
    Ok(Json(UserDto::from_model(record, roles)))
}

async fn get_user(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserDto>> {
    current.require(UserRole::Admin)?;
    let db = state.db.as_ref();
    let user = load_scoped_user(db, &current, id).await?;
    let roles = auth::load_roles(db, user.id).await?;
    Ok(Json(UserDto::from_model(user, roles)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub display_name: Option<String>,
    pub is_active: Option<bool>,
    pub roles: Option<Vec<String>>,
}

async fn update_user(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserDto>> {
    current.require(UserRole::Admin)?;
    let db = state.db.as_ref();
    let user = load_scoped_user(db, &current, id).await?;
    let mut active: app_user::ActiveModel = user.into();
    if let Some(display_name) = &payload.display_name {
        active.display_name = Set(validate_display_name(display_name)?);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(db).await?;
    let mut roles = auth::load_roles(db, id).await?;
    if let Some(role_values) = payload.roles {
        let parsed = parse_roles(&role_values)?;
        if parsed.is_empty() {
            return Err(ApiError::validation("roles must include at least one entry"));
        }
        let txn = db.begin().await?;
        user_role::Entity::delete_many()
            .filter(user_role::Column::UserId.eq(id))
            .exec(&txn)
            .await?;
        insert_roles(&txn, id, &parsed).await?;
        txn.commit().await?;
        roles = parsed;
    }
    Ok(Json(UserDto::from_model(updated, roles)))
}

async fn load_scoped_user(
    db: &DatabaseConnection,
    current: &CurrentUser,
    id: Uuid,
) -> ApiResult<app_user::Model> {
    let user = app_user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    if let (Some(own), Some(theirs)) = (current.company_id, user.company_id) {
        if own != theirs {
            return Err(ApiError::NotFound("User"));
        }
    } else if current.company_id.is_some() && user.company_id.is_none() {
        // Tenant admins cannot see platform operators.
        return Err(ApiError::NotFound("User"));
    }
    Ok(user)
}

async fn insert_roles<C: sea_orm::ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    roles: &[UserRole],
) -> ApiResult<()> {
    for role in roles {
        user_role::ActiveModel {
            user_id: Set(user_id),
            role: Set((*role).into()),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

pub(crate) fn normalize_email(email: &str) -> ApiResult<String> {
    let trimmed = email.trim().to_lowercase();
    if trimmed.is_empty() || !trimmed.contains('@') {
        return Err(ApiError::validation("email is invalid"));
    }
    Ok(trimmed)
}

pub(crate) fn validate_display_name(name: &str) -> ApiResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("displayName cannot be empty"));
    }
    if trimmed.len() > 256 {
        return Err(ApiError::validation("displayName is too long"));
    }
    Ok(trimmed.to_string())
}

fn parse_roles(values: &[String]) -> ApiResult<Vec<UserRole>> {
    let mut roles = Vec::new();
    for value in values {
        let role = UserRole::from_str(value)
            .ok_or_else(|| ApiError::validation(format!("unknown role: {}", value)))?;
        if !roles.contains(&role) {
            roles.push(role);
        }
    }
    Ok(roles)
}

pub(crate) fn sanitize_filter(q: Option<String>) -> Option<String> {
    q.and_then(|value| {
        let trimmed = value.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}
