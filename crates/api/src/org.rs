use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use entity::{branch, company, department};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::{CurrentUser, UserRole},
    error::{ApiError, ApiResult},
    pagination::{fetch_page, Page, PageQuery},
    tenant::{effective_company, ensure_tenant, require_company},
    users::sanitize_filter,
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/companies", get(list_companies).post(create_company))
        .route(
            "/companies/{id}",
            get(get_company).patch(update_company).delete(delete_company),
        )
        .route("/branches", get(list_branches).post(create_branch))
        .route(
            "/branches/{id}",
            get(get_branch).patch(update_branch).delete(delete_branch),
        )
        .route("/departments", get(list_departments).post(create_department))
        .route(
            "/departments/{id}",
            get(get_department)
                .patch(update_department)
                .delete(delete_department),
        )
}

pub(crate) fn validate_name(name: &str) -> ApiResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("name cannot be empty"));
    }
    if trimmed.len() > 256 {
        return Err(ApiError::validation("name is too long"));
    }
    Ok(trimmed.to_string())
}

pub(crate) async fn ensure_company_exists(db: &DatabaseConnection, id: Uuid) -> ApiResult<()> {
    company::Entity::find_by_id(id)
        .filter(company::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .map(|_| ())
        .ok_or(ApiError::NotFound("Company"))
}

// ---------------------------------------------------------------------------
// Companies

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDto {
    pub id: Uuid,
    pub name: String,
    pub legal_name: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<company::Model> for CompanyDto {
    fn from(model: company::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            legal_name: model.legal_name,
            website: model.website,
            phone: model.phone,
            created_by: model.created_by,
            updated_by: model.updated_by,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub q: Option<String>,
}

async fn list_companies(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<CompanyListQuery>,
) -> ApiResult<Json<Page<CompanyDto>>> {
    let db = state.db.as_ref();
    let mut select = company::Entity::find().filter(company::Column::DeletedAt.is_null());
    if let Some(own) = current.company_id {
        select = select.filter(company::Column::Id.eq(own));
    }
    if let Some(filter) = sanitize_filter(query.q) {
        select = select.filter(company::Column::Name.like(format!("%{}%", filter)));
    }
    let page = fetch_page(db, select.order_by_asc(company::Column::Name), &PageQuery { page: query.page, limit: query.limit }).await?;
    Ok(Json(page.map(CompanyDto::from)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompanyRequest {
    pub name: String,
    pub legal_name: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
}

async fn create_company(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<NewCompanyRequest>,
) -> ApiResult<Json<CompanyDto>> {
    current.require(UserRole::Owner)?;
    let db = state.db.as_ref();
    let name = validate_name(&payload.name)?;
    let existing = company::Entity::find()
        .filter(company::Column::Name.eq(name.clone()))
        .filter(company::Column::DeletedAt.is_null())
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict("a company with this name already exists"));
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = company::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        legal_name: Set(payload.legal_name),
        website: Set(payload.website),
        phone: Set(payload.phone),
        created_by: Set(Some(current.user_id)),
        updated_by: Set(Some(current.user_id)),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        deleted_by: Set(None),
    }
    .insert(db)
    .await?;
    Ok(Json(model.into()))
}

async fn load_company(
    db: &DatabaseConnection,
    current: &CurrentUser,
    id: Uuid,
) -> ApiResult<company::Model> {
    let model = company::Entity::find_by_id(id)
        .filter(company::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("Company"))?;
    ensure_tenant(current, model.id, "Company")?;
    Ok(model)
}

async fn get_company(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CompanyDto>> {
    let model = load_company(state.db.as_ref(), &current, id).await?;
    Ok(Json(model.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompanyRequest {
    pub name: Option<String>,
    pub legal_name: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
}

async fn update_company(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCompanyRequest>,
) -> ApiResult<Json<CompanyDto>> {
    current.require(UserRole::Admin)?;
    let db = state.db.as_ref();
    let model = load_company(db, &current, id).await?;
    let mut active: company::ActiveModel = model.into();
    if let Some(name) = &payload.name {
        active.name = Set(validate_name(name)?);
    }
    if payload.legal_name.is_some() {
        active.legal_name = Set(payload.legal_name);
    }
    if payload.website.is_some() {
        active.website = Set(payload.website);
    }
    if payload.phone.is_some() {
        active.phone = Set(payload.phone);
    }
    active.updated_by = Set(Some(current.user_id));
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(db).await?;
    Ok(Json(updated.into()))
}

async fn delete_company(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    current.require(UserRole::Owner)?;
    let db = state.db.as_ref();
    let model = load_company(db, &current, id).await?;
    let mut active: company::ActiveModel = model.into();
    active.deleted_at = Set(Some(Utc::now().into()));
    active.deleted_by = Set(Some(current.user_id));
    active.update(db).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Branches

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchDto {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<branch::Model> for BranchDto {
    fn from(model: branch::Model) -> Self {
        Self {
            id: model.id,
            company_id: model.company_id,
            name: model.name,
            address: model.address,
            phone: model.phone,
            created_by: model.created_by,
            updated_by: model.updated_by,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub company_id: Option<Uuid>,
    pub q: Option<String>,
}

async fn list_branches(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<BranchListQuery>,
) -> ApiResult<Json<Page<BranchDto>>> {
    let db = state.db.as_ref();
    let mut select = branch::Entity::find().filter(branch::Column::DeletedAt.is_null());
    if let Some(company_id) = effective_company(&current, query.company_id)? {
        select = select.filter(branch::Column::CompanyId.eq(company_id));
    }
    if let Some(filter) = sanitize_filter(query.q) {
        select = select.filter(branch::Column::Name.like(format!("%{}%", filter)));
    }
    let page = fetch_page(db, select.order_by_asc(branch::Column::Name), &PageQuery { page: query.page, limit: query.limit }).await?;
    Ok(Json(page.map(BranchDto::from)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBranchRequest {
    pub company_id: Option<Uuid>,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

async fn create_branch(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<NewBranchRequest>,
) -> ApiResult<Json<BranchDto>> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let company_id = require_company(&current, payload.company_id)?;
    ensure_company_exists(db, company_id).await?;
    let name = validate_name(&payload.name)?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = branch::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(company_id),
        name: Set(name),
        address: Set(payload.address),
        phone: Set(payload.phone),
        created_by: Set(Some(current.user_id)),
        updated_by: Set(Some(current.user_id)),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        deleted_by: Set(None),
    }
    .insert(db)
    .await?;
    Ok(Json(model.into()))
}

pub(crate) async fn load_branch(
    db: &DatabaseConnection,
    current: &CurrentUser,
    id: Uuid,
) -> ApiResult<branch::Model> {
    let model = branch::Entity::find_by_id(id)
        .filter(branch::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("Branch"))?;
    ensure_tenant(current, model.company_id, "Branch")?;
    Ok(model)
}

async fn get_branch(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BranchDto>> {
    let model = load_branch(state.db.as_ref(), &current, id).await?;
    Ok(Json(model.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBranchRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

async fn update_branch(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBranchRequest>,
) -> ApiResult<Json<BranchDto>> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let model = load_branch(db, &current, id).await?;
    let mut active: branch::ActiveModel = model.into();
    if let Some(name) = &payload.name {
        active.name = Set(validate_name(name)?);
    }
    if payload.address.is_some() {
        active.address = Set(payload.address);
    }
    if payload.phone.is_some() {
        active.phone = Set(payload.phone);
    }
    active.updated_by = Set(Some(current.user_id));
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(db).await?;
    Ok(Json(updated.into()))
}

async fn delete_branch(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let model = load_branch(db, &current, id).await?;
    let mut active: branch::ActiveModel = model.into();
    active.deleted_at = Set(Some(Utc::now().into()));
    active.deleted_by = Set(Some(current.user_id));
    active.update(db).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Departments

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentDto {
    pub id: Uuid,
    pub company_id: Uuid,
    pub branch_id: Option<Uuid>,
    pub name: String,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<department::Model> for DepartmentDto {
    fn from(model: department::Model) -> Self {
        Self {
            id: model.id,
            company_id: model.company_id,
            branch_id: model.branch_id,
            name: model.name,
            created_by: model.created_by,
            updated_by: model.updated_by,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub company_id: Option<Uuid>,
    pub branch_id: Option<Uuid>,
    pub q: Option<String>,
}

async fn list_departments(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<DepartmentListQuery>,
) -> ApiResult<Json<Page<DepartmentDto>>> {
    let db = state.db.as_ref();
    let mut select = department::Entity::find().filter(department::Column::DeletedAt.is_null());
    if let Some(company_id) = effective_company(&current, query.company_id)? {
        select = select.filter(department::Column::CompanyId.eq(company_id));
    }
    if let Some(branch_id) = query.branch_id {
        select = select.filter(department::Column::BranchId.eq(branch_id));
    }
    if let Some(filter) = sanitize_filter(query.q) {
        select = select.filter(department::Column::Name.like(format!("%{}%", filter)));
    }
    let page = fetch_page(db, select.order_by_asc(department::Column::Name), &PageQuery { page: query.page, limit: query.limit }).await?;
    Ok(Json(page.map(DepartmentDto::from)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDepartmentRequest {
    pub company_id: Option<Uuid>,
    pub branch_id: Option<Uuid>,
    pub name: String,
}

async fn create_department(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<NewDepartmentRequest>,
) -> ApiResult<Json<DepartmentDto>> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let company_id = require_company(&current, payload.company_id)?;
    ensure_company_exists(db, company_id).await?;
    if let Some(branch_id) = payload.branch_id {
        let branch = load_branch(db, &current, branch_id).await?;
        if branch.company_id != company_id {
            return Err(ApiError::validation("branch belongs to a different company"));
        }
    }
    let name = validate_name(&payload.name)?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = department::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(company_id),
        branch_id: Set(payload.branch_id),
        name: Set(name),
        created_by: Set(Some(current.user_id)),
        updated_by: Set(Some(current.user_id)),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        deleted_by: Set(None),
    }
    .insert(db)
    .await?;
    Ok(Json(model.into()))
}

pub(crate) async fn load_department(
    db: &DatabaseConnection,
    current: &CurrentUser,
    id: Uuid,
) -> ApiResult<department::Model> {
    let model = department::Entity::find_by_id(id)
        .filter(department::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("Department"))?;
    ensure_tenant(current, model.company_id, "Department")?;
    Ok(model)
}

async fn get_department(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DepartmentDto>> {
    let model = load_department(state.db.as_ref(), &current, id).await?;
    Ok(Json(model.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDepartmentRequest {
    pub branch_id: Option<Uuid>,
    pub name: Option<String>,
}

async fn update_department(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDepartmentRequest>,
) -> ApiResult<Json<DepartmentDto>> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let model = load_department(db, &current, id).await?;
    let company_id = model.company_id;
    let mut active: department::ActiveModel = model.into();
    if let Some(branch_id) = payload.branch_id {
        let branch = load_branch(db, &current, branch_id).await?;
        if branch.company_id != company_id {
            return Err(ApiError::validation("branch belongs to a different company"));
        }
        active.branch_id = Set(Some(branch_id));
    }
    if let Some(name) = &payload.name {
        active.name = Set(validate_name(name)?);
    }
    active.updated_by = Set(Some(current.user_id));
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(db).await?;
    Ok(Json(updated.into()))
}

async fn delete_department(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let model = load_department(db, &current, id).await?;
    let mut active: department::ActiveModel = model.into();
    active.deleted_at = Set(Some(Utc::now().into()));
    active.deleted_by = Set(Some(current.user_id));
    active.update(db).await?;
    Ok(StatusCode::NO_CONTENT)
}
