use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use entity::{career_path, performance_review};
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
    people::{load_employee, load_role},
    tenant::{effective_company, ensure_tenant},
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/career-paths",
            get(list_career_paths).post(create_career_path),
        )
        .route(
            "/career-paths/{id}",
            get(get_career_path)
                .patch(update_career_path)
                .delete(delete_career_path),
        )
        .route(
            "/performance-reviews",
            get(list_performance_reviews).post(create_performance_review),
        )
        .route(
            "/performance-reviews/{id}",
            get(get_performance_review)
                .patch(update_performance_review)
                .delete(delete_performance_review),
        )
}

fn validate_score(score: i16) -> ApiResult<i16> {
    if !(0..=100).contains(&score) {
        return Err(ApiError::validation("score must be between 0 and 100"));
    }
    Ok(score)
}

// ---------------------------------------------------------------------------
// Career paths

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerPathDto {
    pub id: Uuid,
    pub company_id: Uuid,
    pub employee_id: Uuid,
    pub target_role_id: Uuid,
    pub starts_on: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<career_path::Model> for CareerPathDto {
    fn from(model: career_path::Model) -> Self {
        Self {
            id: model.id,
            company_id: model.company_id,
            employee_id: model.employee_id,
            target_role_id: model.target_role_id,
            starts_on: model.starts_on,
            notes: model.notes,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CareerPathListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub company_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
}

async fn list_career_paths(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<CareerPathListQuery>,
) -> ApiResult<Json<Page<CareerPathDto>>> {
    let db = state.db.as_ref();
    let mut select = career_path::Entity::find().filter(career_path::Column::DeletedAt.is_null());
    if let Some(company_id) = effective_company(&current, query.company_id)? {
        select = select.filter(career_path::Column::CompanyId.eq(company_id));
    }
    if let Some(employee_id) = query.employee_id {
        select = select.filter(career_path::Column::EmployeeId.eq(employee_id));
    }
    let page = fetch_page(
        db,
        select.order_by_desc(career_path::Column::StartsOn),
        &PageQuery { page: query.page, limit: query.limit },
    )
    .await?;
    Ok(Json(page.map(CareerPathDto::from)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCareerPathRequest {
    pub employee_id: Uuid,
    pub target_role_id: Uuid,
    pub starts_on: NaiveDate,
    pub notes: Option<String>,
}

async fn create_career_path(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<NewCareerPathRequest>,
) -> ApiResult<Json<CareerPathDto>> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let employee = load_employee(db, &current, payload.employee_id).await?;
    let role = load_role(db, &current, payload.target_role_id).await?;
    if role.company_id != employee.company_id {
        return Err(ApiError::validation(
            "target role belongs to a different company",
        ));
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = career_path::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(employee.company_id),
        employee_id: Set(payload.employee_id),
        target_role_id: Set(payload.target_role_id),
        starts_on: Set(payload.starts_on),
        notes: Set(payload.notes),
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

async fn load_career_path(
    db: &DatabaseConnection,
    current: &CurrentUser,
    id: Uuid,
) -> ApiResult<career_path::Model> {
    let model = career_path::Entity::find_by_id(id)
        .filter(career_path::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("Career path"))?;
    ensure_tenant(current, model.company_id, "Career path")?;
    Ok(model)
}

async fn get_career_path(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CareerPathDto>> {
    let model = load_career_path(state.db.as_ref(), &current, id).await?;
    Ok(Json(model.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCareerPathRequest {
    pub target_role_id: Option<Uuid>,
    pub starts_on: Option<NaiveDate>,
    pub notes: Option<String>,
}

async fn update_career_path(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCareerPathRequest>,
) -> ApiResult<Json<CareerPathDto>> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let model = load_career_path(db, &current, id).await?;
    let company_id = model.company_id;
    let mut active: career_path::ActiveModel = model.into();
    if let Some(target_role_id) = payload.target_role_id {
        let role = load_role(db, &current, target_role_id).await?;
        if role.company_id != company_id {
            return Err(ApiError::validation(
                "target role belongs to a different company",
            ));
        }
        active.target_role_id = Set(target_role_id);
    }
    if let Some(starts_on) = payload.starts_on {
        active.starts_on = Set(starts_on);
    }
    if payload.notes.is_some() {
        active.notes = Set(payload.notes);
    }
    active.updated_by = Set(Some(current.user_id));
    active.updated_at = Set(Utc::now().into());
    Ok(Json(active.update(db).await?.into()))
}

async fn delete_career_path(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let model = load_career_path(db, &current, id).await?;
    let mut active: career_path::ActiveModel = model.into();
    active.deleted_at = Set(Some(Utc::now().into()));
    active.deleted_by = Set(Some(current.user_id));
    active.update(db).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Performance reviews

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReviewDto {
    pub id: Uuid,
    pub company_id: Uuid,
    pub employee_id: Uuid,
    pub reviewer_id: Uuid,
    pub period: NaiveDate,
    pub score: i16,
    pub comments: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<performance_review::Model> for PerformanceReviewDto {
    fn from(model: performance_review::Model) -> Self {
        Self {
            id: model.id,
            company_id: model.company_id,
            employee_id: model.employee_id,
            reviewer_id: model.reviewer_id,
            period: model.period,
            score: model.score,
            comments: model.comments,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReviewListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub company_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    pub reviewer_id: Option<Uuid>,
}

async fn list_performance_reviews(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<PerformanceReviewListQuery>,
) -> ApiResult<Json<Page<PerformanceReviewDto>>> {
    let db = state.db.as_ref();
    let mut select =
        performance_review::Entity::find().filter(performance_review::Column::DeletedAt.is_null());
    if let Some(company_id) = effective_company(&current, query.company_id)? {
        select = select.filter(performance_review::Column::CompanyId.eq(company_id));
    }
    if let Some(employee_id) = query.employee_id {
        select = select.filter(performance_review::Column::EmployeeId.eq(employee_id));
    }
    if let Some(reviewer_id) = query.reviewer_id {
        select = select.filter(performance_review::Column::ReviewerId.eq(reviewer_id));
    }
    let page = fetch_page(
        db,
        select.order_by_desc(performance_review::Column::Period),
        &PageQuery { page: query.page, limit: query.limit },
    )
    .await?;
    Ok(Json(page.map(PerformanceReviewDto::from)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPerformanceReviewRequest {
    pub employee_id: Uuid,
    pub reviewer_id: Uuid,
    pub period: NaiveDate,
    pub score: i16,
    pub comments: Option<String>,
}

async fn create_performance_review(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<NewPerformanceReviewRequest>,
) -> ApiResult<Json<PerformanceReviewDto>> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let employee = load_employee(db, &current, payload.employee_id).await?;
    let reviewer = load_employee(db, &current, payload.reviewer_id).await?;
    if reviewer.company_id != employee.company_id {
        return Err(ApiError::validation(
            "reviewer belongs to a different company",
        ));
    }
    if reviewer.id == employee.id {
        return Err(ApiError::validation("an employee cannot review themselves"));
    }
    let score = validate_score(payload.score)?;
    let duplicate = performance_review::Entity::find()
        .filter(performance_review::Column::EmployeeId.eq(payload.employee_id))
        .filter(performance_review::Column::Period.eq(payload.period))
        .filter(performance_review::Column::DeletedAt.is_null())
        .one(db)
        .await?;
    if duplicate.is_some() {
        return Err(ApiError::conflict(
            "a review already exists for this employee and period",
        ));
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = performance_review::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(employee.company_id),
        employee_id: Set(payload.employee_id),
        reviewer_id: Set(payload.reviewer_id),
        period: Set(payload.period),
        score: Set(score),
        comments: Set(payload.comments),
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

async fn load_performance_review(
    db: &DatabaseConnection,
    current: &CurrentUser,
    id: Uuid,
) -> ApiResult<performance_review::Model> {
    let model = performance_review::Entity::find_by_id(id)
        .filter(performance_review::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("Performance review"))?;
    ensure_tenant(current, model.company_id, "Performance review")?;
    Ok(model)
}

async fn get_performance_review(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PerformanceReviewDto>> {
    let model = load_performance_review(state.db.as_ref(), &current, id).await?;
    Ok(Json(model.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePerformanceReviewRequest {
    pub reviewer_id: Option<Uuid>,
    pub period: Option<NaiveDate>,
    pub score: Option<i16>,
    pub comments: Option<String>,
}

async fn update_performance_review(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePerformanceReviewRequest>,
) -> ApiResult<Json<PerformanceReviewDto>> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let model = load_performance_review(db, &current, id).await?;
    let company_id = model.company_id;
    let mut active: performance_review::ActiveModel = model.into();
    if let Some(reviewer_id) = payload.reviewer_id {
        let reviewer = load_employee(db, &current, reviewer_id).await?;
        if reviewer.company_id != company_id {
            return Err(ApiError::validation(
                "reviewer belongs to a different company",
            ));
        }
        active.reviewer_id = Set(reviewer_id);
    }
    if let Some(period) = payload.period {
        active.period = Set(period);
    }
    if let Some(score) = payload.score {
        active.score = Set(validate_score(score)?);
    }
    if payload.comments.is_some() {
        active.comments = Set(payload.comments);
    }
    active.updated_by = Set(Some(current.user_id));
    active.updated_at = Set(Utc::now().into());
    Ok(Json(active.update(db).await?.into()))
}

async fn delete_performance_review(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let model = load_performance_review(db, &current, id).await?;
    let mut active: performance_review::ActiveModel = model.into();
    active.deleted_at = Set(Some(Utc::now().into()));
    active.deleted_by = Set(Some(current.user_id));
    active.update(db).await?;
    Ok(StatusCode::NO_CONTENT)
}
