use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use entity::{employee, person, role, role_type};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::{CurrentUser, UserRole},
    error::{ApiError, ApiResult},
    org::{ensure_company_exists, load_branch, load_department, validate_name},
    pagination::{fetch_page, Page, PageQuery},
    tenant::{effective_company, ensure_tenant, require_company},
    users::{normalize_email, sanitize_filter},
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/role-types", get(list_role_types).post(create_role_type))
        .route(
            "/role-types/{id}",
            get(get_role_type)
                .patch(update_role_type)
                .delete(delete_role_type),
        )
        .route("/roles", get(list_roles).post(create_role))
        .route(
            "/roles/{id}",
            get(get_role).patch(update_role).delete(delete_role),
        )
        .route("/persons", get(list_persons).post(create_person))
        .route(
            "/persons/{id}",
            get(get_person).patch(update_person).delete(delete_person),
        )
        .route("/employees", get(list_employees).post(create_employee))
        .route(
            "/employees/{id}",
            get(get_employee)
                .patch(update_employee)
                .delete(delete_employee),
        )
}

// ---------------------------------------------------------------------------
// Role types

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleTypeDto {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<role_type::Model> for RoleTypeDto {
    fn from(model: role_type::Model) -> Self {
        Self {
            id: model.id,
            company_id: model.company_id,
            name: model.name,
            description: model.description,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleTypeListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub company_id: Option<Uuid>,
    pub q: Option<String>,
}

async fn list_role_types(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<RoleTypeListQuery>,
) -> ApiResult<Json<Page<RoleTypeDto>>> {
    let db = state.db.as_ref();
    let mut select = role_type::Entity::find().filter(role_type::Column::DeletedAt.is_null());
    if let Some(company_id) = effective_company(&current, query.company_id)? {
        select = select.filter(role_type::Column::CompanyId.eq(company_id));
    }
    if let Some(filter) = sanitize_filter(query.q) {
        select = select.filter(role_type::Column::Name.like(format!("%{}%", filter)));
    }
    let page = fetch_page(db, select.order_by_asc(role_type::Column::Name), &PageQuery { page: query.page, limit: query.limit }).await?;
    Ok(Json(page.map(RoleTypeDto::from)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoleTypeRequest {
    pub company_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
}

async fn create_role_type(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<NewRoleTypeRequest>,
) -> ApiResult<Json<RoleTypeDto>> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let company_id = require_company(&current, payload.company_id)?;
    ensure_company_exists(db, company_id).await?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = role_type::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(company_id),
        name: Set(validate_name(&payload.name)?),
        description: Set(payload.description),
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

async fn load_role_type(
    db: &DatabaseConnection,
    current: &CurrentUser,
    id: Uuid,
) -> ApiResult<role_type::Model> {
    let model = role_type::Entity::find_by_id(id)
        .filter(role_type::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("Role type"))?;
    ensure_tenant(current, model.company_id, "Role type")?;
    Ok(model)
}

async fn get_role_type(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RoleTypeDto>> {
    let model = load_role_type(state.db.as_ref(), &current, id).await?;
    Ok(Json(model.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleTypeRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

async fn update_role_type(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRoleTypeRequest>,
) -> ApiResult<Json<RoleTypeDto>> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let model = load_role_type(db, &current, id).await?;
    let mut active: role_type::ActiveModel = model.into();
    if let Some(name) = &payload.name {
        active.name = Set(validate_name(name)?);
    }
    if payload.description.is_some() {
        active.description = Set(payload.description);
    }
    active.updated_by = Set(Some(current.user_id));
    active.updated_at = Set(Utc::now().into());
    Ok(Json(active.update(db).await?.into()))
}

async fn delete_role_type(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let model = load_role_type(db, &current, id).await?;
    let mut active: role_type::ActiveModel = model.into();
    active.deleted_at = Set(Some(Utc::now().into()));
    active.deleted_by = Set(Some(current.user_id));
    active.update(db).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Roles

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDto {
    pub id: Uuid,
    pub company_id: Uuid,
    pub role_type_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<role::Model> for RoleDto {
    fn from(model: role::Model) -> Self {
        Self {
            id: model.id,
            company_id: model.company_id,
            role_type_id: model.role_type_id,
            name: model.name,
            description: model.description,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub company_id: Option<Uuid>,
    pub role_type_id: Option<Uuid>,
    pub q: Option<String>,
}

async fn list_roles(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<RoleListQuery>,
) -> ApiResult<Json<Page<RoleDto>>> {
    let db = state.db.as_ref();
    let mut select = role::Entity::find().filter(role::Column::DeletedAt.is_null());
    if let Some(company_id) = effective_company(&current, query.company_id)? {
        select = select.filter(role::Column::CompanyId.eq(company_id));
    }
    if let Some(role_type_id) = query.role_type_id {
        select = select.filter(role::Column::RoleTypeId.eq(role_type_id));
    }
    if let Some(filter) = sanitize_filter(query.q) {
        select = select.filter(role::Column::Name.like(format!("%{}%", filter)));
    }
    let page = fetch_page(db, select.order_by_asc(role::Column::Name), &PageQuery { page: query.page, limit: query.limit }).await?;
    Ok(Json(page.map(RoleDto::from)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoleRequest {
    pub company_id: Option<Uuid>,
    pub role_type_id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

async fn create_role(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<NewRoleRequest>,
) -> ApiResult<Json<RoleDto>> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let company_id = require_company(&current, payload.company_id)?;
    ensure_company_exists(db, company_id).await?;
    let role_type = load_role_type(db, &current, payload.role_type_id).await?;
    if role_type.company_id != company_id {
        return Err(ApiError::validation(
            "roleType belongs to a different company",
        ));
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = role::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(company_id),
        role_type_id: Set(payload.role_type_id),
        name: Set(validate_name(&payload.name)?),
        description: Set(payload.description),
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

pub(crate) async fn load_role(
    db: &DatabaseConnection,
    current: &CurrentUser,
    id: Uuid,
) -> ApiResult<role::Model> {
    let model = role::Entity::find_by_id(id)
        .filter(role::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("Role"))?;
    ensure_tenant(current, model.company_id, "Role")?;
    Ok(model)
}

async fn get_role(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RoleDto>> {
    let model = load_role(state.db.as_ref(), &current, id).await?;
    Ok(Json(model.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    pub role_type_id: Option<Uuid>,
    pub name: Option<String>,
    pub description: Option<String>,
}

async fn update_role(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRoleRequest>,
) -> ApiResult<Json<RoleDto>> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let model = load_role(db, &current, id).await?;
    let company_id = model.company_id;
    let mut active: role::ActiveModel = model.into();
    if let Some(role_type_id) = payload.role_type_id {
        let role_type = load_role_type(db, &current, role_type_id).await?;
        if role_type.company_id != company_id {
            return Err(ApiError::validation(
                "roleType belongs to a different company",
            ));
        }
        active.role_type_id = Set(role_type_id);
    }
    if let Some(name) = &payload.name {
        active.name = Set(validate_name(name)?);
    }
    if payload.description.is_some() {
        active.description = Set(payload.description);
    }
    active.updated_by = Set(Some(current.user_id));
    active.updated_at = Set(Utc::now().into());
    Ok(Json(active.update(db).await?.into()))
}

async fn delete_role(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let model = load_role(db, &current, id).await?;
    let mut active: role::ActiveModel = model.into();
    active.deleted_at = Set(Some(Utc::now().into()));
    active.deleted_by = Set(Some(current.user_id));
    active.update(db).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Persons

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonDto {
    pub id: Uuid,
    pub company_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<person::Model> for PersonDto {
    fn from(model: person::Model) -> Self {
        Self {
            id: model.id,
            company_id: model.company_id,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            phone: model.phone,
            birth_date: model.birth_date,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub company_id: Option<Uuid>,
    pub q: Option<String>,
}

async fn list_persons(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<PersonListQuery>,
) -> ApiResult<Json<Page<PersonDto>>> {
    let db = state.db.as_ref();
    let mut select = person::Entity::find().filter(person::Column::DeletedAt.is_null());
    if let Some(company_id) = effective_company(&current, query.company_id)? {
        select = select.filter(person::Column::CompanyId.eq(company_id));
    }
    if let Some(filter) = sanitize_filter(query.q) {
        let pattern = format!("%{}%", filter);
        select = select.filter(
            Condition::any()
                .add(person::Column::FirstName.like(pattern.clone()))
                .add(person::Column::LastName.like(pattern.clone()))
                .add(person::Column::Email.like(pattern)),
        );
    }
    let page = fetch_page(db, select.order_by_asc(person::Column::LastName), &PageQuery { page: query.page, limit: query.limit }).await?;
    Ok(Json(page.map(PersonDto::from)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPersonRequest {
    pub company_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

async fn create_person(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<NewPersonRequest>,
) -> ApiResult<Json<PersonDto>> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let company_id = require_company(&current, payload.company_id)?;
    ensure_company_exists(db, company_id).await?;
    let email = normalize_email(&payload.email)?;
    let duplicate = person::Entity::find()
        .filter(person::Column::CompanyId.eq(company_id))
        .filter(person::Column::Email.eq(email.clone()))
        .filter(person::Column::DeletedAt.is_null())
        .one(db)
        .await?;
    if duplicate.is_some() {
        return Err(ApiError::conflict(
            "a person with this email already exists in the company",
        ));
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = person::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(company_id),
        first_name: Set(validate_name(&payload.first_name)?),
        last_name: Set(validate_name(&payload.last_name)?),
        email: Set(email),
        phone: Set(payload.phone),
        birth_date: Set(payload.birth_date),
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

pub(crate) async fn load_person(
    db: &DatabaseConnection,
    current: &CurrentUser,
    id: Uuid,
) -> ApiResult<person::Model> {
    let model = person::Entity::find_by_id(id)
        .filter(person::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("Person"))?;
    ensure_tenant(current, model.company_id, "Person")?;
    Ok(model)
}

async fn get_person(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PersonDto>> {
    let model = load_person(state.db.as_ref(), &current, id).await?;
    Ok(Json(model.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePersonRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

async fn update_person(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePersonRequest>,
) -> ApiResult<Json<PersonDto>> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let model = load_person(db, &current, id).await?;
    let mut active: person::ActiveModel = model.into();
    if let Some(first_name) = &payload.first_name {
        active.first_name = Set(validate_name(first_name)?);
    }
    if let Some(last_name) = &payload.last_name {
        active.last_name = Set(validate_name(last_name)?);
    }
    if let Some(email) = &payload.email {
        active.email = Set(normalize_email(email)?);
    }
    if payload.phone.is_some() {
        active.phone = Set(payload.phone);
    }
    if payload.birth_date.is_some() {
        active.birth_date = Set(payload.birth_date);
    }
    active.updated_by = Set(Some(current.user_id));
    active.updated_at = Set(Utc::now().into());
    Ok(Json(active.update(db).await?.into()))
}

async fn delete_person(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let model = load_person(db, &current, id).await?;
    let mut active: person::ActiveModel = model.into();
    active.deleted_at = Set(Some(Utc::now().into()));
    active.deleted_by = Set(Some(current.user_id));
    active.update(db).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Employees

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDto {
    pub id: Uuid,
    pub company_id: Uuid,
    pub person_id: Uuid,
    pub branch_id: Uuid,
    pub department_id: Option<Uuid>,
    pub role_id: Uuid,
    pub hire_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<employee::Model> for EmployeeDto {
    fn from(model: employee::Model) -> Self {
        Self {
            id: model.id,
            company_id: model.company_id,
            person_id: model.person_id,
            branch_id: model.branch_id,
            department_id: model.department_id,
            role_id: model.role_id,
            hire_date: model.hire_date,
            is_active: model.is_active,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub company_id: Option<Uuid>,
    pub branch_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub role_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

async fn list_employees(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<EmployeeListQuery>,
) -> ApiResult<Json<Page<EmployeeDto>>> {
    let db = state.db.as_ref();
    let mut select = employee::Entity::find().filter(employee::Column::DeletedAt.is_null());
    if let Some(company_id) = effective_company(&current, query.company_id)? {
        select = select.filter(employee::Column::CompanyId.eq(company_id));
    }
    if let Some(branch_id) = query.branch_id {
        select = select.filter(employee::Column::BranchId.eq(branch_id));
    }
    if let Some(department_id) = query.department_id {
        select = select.filter(employee::Column::DepartmentId.eq(department_id));
    }
    if let Some(role_id) = query.role_id {
        select = select.filter(employee::Column::RoleId.eq(role_id));
    }
    if let Some(is_active) = query.is_active {
        select = select.filter(employee::Column::IsActive.eq(is_active));
    }
    let page = fetch_page(
        db,
        select.order_by_asc(employee::Column::HireDate),
        &PageQuery { page: query.page, limit: query.limit },
    )
    .await?;
    Ok(Json(page.map(EmployeeDto::from)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployeeRequest {
    pub person_id: Uuid,
    pub branch_id: Uuid,
    pub department_id: Option<Uuid>,
    pub role_id: Uuid,
    pub hire_date: NaiveDate,
}

async fn create_employee(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<NewEmployeeRequest>,
) -> ApiResult<Json<EmployeeDto>> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let person = load_person(db, &current, payload.person_id).await?;
    let company_id = person.company_id;
    let existing = employee::Entity::find()
        .filter(employee::Column::PersonId.eq(person.id))
        .filter(employee::Column::DeletedAt.is_null())
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict("person is already an employee"));
    }
    let branch = load_branch(db, &current, payload.branch_id).await?;
    if branch.company_id != company_id {
        return Err(ApiError::validation("branch belongs to a different company"));
    }
    if let Some(department_id) = payload.department_id {
        let department = load_department(db, &current, department_id).await?;
        if department.company_id != company_id {
            return Err(ApiError::validation(
                "department belongs to a different company",
            ));
        }
    }
    let role = load_role(db, &current, payload.role_id).await?;
    if role.company_id != company_id {
        return Err(ApiError::validation("role belongs to a different company"));
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = employee::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(company_id),
        person_id: Set(payload.person_id),
        branch_id: Set(payload.branch_id),
        department_id: Set(payload.department_id),
        role_id: Set(payload.role_id),
        hire_date: Set(payload.hire_date),
        is_active: Set(true),
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

pub(crate) async fn load_employee(
    db: &DatabaseConnection,
    current: &CurrentUser,
    id: Uuid,
) -> ApiResult<employee::Model> {
    let model = employee::Entity::find_by_id(id)
        .filter(employee::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("Employee"))?;
    ensure_tenant(current, model.company_id, "Employee")?;
    Ok(model)
}

async fn get_employee(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EmployeeDto>> {
    let model = load_employee(state.db.as_ref(), &current, id).await?;
    Ok(Json(model.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeeRequest {
    pub branch_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub role_id: Option<Uuid>,
    pub hire_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

async fn update_employee(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEmployeeRequest>,
) -> ApiResult<Json<EmployeeDto>> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let model = load_employee(db, &current, id).await?;
    let company_id = model.company_id;
    let mut active: employee::ActiveModel = model.into();
    if let Some(branch_id) = payload.branch_id {
        let branch = load_branch(db, &current, branch_id).await?;
        if branch.company_id != company_id {
            return Err(ApiError::validation("branch belongs to a different company"));
        }
        active.branch_id = Set(branch_id);
    }
    if let Some(department_id) = payload.department_id {
        let department = load_department(db, &current, department_id).await?;
        if department.company_id != company_id {
            return Err(ApiError::validation(
                "department belongs to a different company",
            ));
        }
        active.department_id = Set(Some(department_id));
    }
    if let Some(role_id) = payload.role_id {
        let role = load_role(db, &current, role_id).await?;
        if role.company_id != company_id {
            return Err(ApiError::validation("role belongs to a different company"));
        }
        active.role_id = Set(role_id);
    }
    if let Some(hire_date) = payload.hire_date {
        active.hire_date = Set(hire_date);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_by = Set(Some(current.user_id));
    active.updated_at = Set(Utc::now().into());
    Ok(Json(active.update(db).await?.into()))
}

async fn delete_employee(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let model = load_employee(db, &current, id).await?;
    let mut active: employee::ActiveModel = model.into();
    active.deleted_at = Set(Some(Utc::now().into()));
    active.deleted_by = Set(Some(current.user_id));
    active.update(db).await?;
    Ok(StatusCode::NO_CONTENT)
}
