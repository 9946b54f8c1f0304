use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use entity::approval::Status;
use entity::{
    employee_kpi, employee_kpi_evolution, evaluation_type, kpi, team_kpi, team_kpi_evolution,
};
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
    org::{ensure_company_exists, validate_name},
    pagination::{fetch_page, Page, PageQuery},
    people::load_employee,
    rating::rate_kpi,
    teams::load_team,
    tenant::{effective_company, ensure_tenant, require_company},
    users::sanitize_filter,
    workflow::{self, status_str, Transition},
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/kpi/evaluation-types", get(list_evaluation_types))
        .route("/kpi/evaluation-types/{id}", get(get_evaluation_type))
        .route("/kpi/kpis", get(list_kpis).post(create_kpi))
        .route(
            "/kpi/kpis/{id}",
            get(get_kpi).patch(update_kpi).delete(delete_kpi),
        )
        .route(
            "/kpi/employee-kpis",
            get(list_employee_kpis).post(create_employee_kpi),
        )
        .route(
            "/kpi/employee-kpis/{id}",
            get(get_employee_kpi)
                .patch(update_employee_kpi)
                .delete(delete_employee_kpi),
        )
        .route("/kpi/employee-kpis/{id}/submit", post(submit_employee_kpi))
        .route("/kpi/employee-kpis/{id}/approve", post(approve_employee_kpi))
        .route("/kpi/employee-kpis/{id}/reject", post(reject_employee_kpi))
        .route(
            "/kpi/employee-kpis/{id}/evolutions",
            get(list_employee_kpi_evolutions).post(create_employee_kpi_evolution),
        )
        .route(
            "/kpi/employee-kpi-evolutions/{id}",
            get(get_employee_kpi_evolution)
                .patch(update_employee_kpi_evolution)
                .delete(delete_employee_kpi_evolution),
        )
        .route(
            "/kpi/employee-kpi-evolutions/{id}/submit",
            post(submit_employee_kpi_evolution),
        )
        .route(
            "/kpi/employee-kpi-evolutions/{id}/approve",
            post(approve_employee_kpi_evolution),
        )
        .route(
            "/kpi/employee-kpi-evolutions/{id}/reject",
            post(reject_employee_kpi_evolution),
        )
        .route("/kpi/team-kpis", get(list_team_kpis).post(create_team_kpi))
        .route(
            "/kpi/team-kpis/{id}",
            get(get_team_kpi)
                .patch(update_team_kpi)
                .delete(delete_team_kpi),
        )
        .route("/kpi/team-kpis/{id}/submit", post(submit_team_kpi))
        .route("/kpi/team-kpis/{id}/approve", post(approve_team_kpi))
        .route("/kpi/team-kpis/{id}/reject", post(reject_team_kpi))
        .route(
            "/kpi/team-kpis/{id}/evolutions",
            get(list_team_kpi_evolutions).post(create_team_kpi_evolution),
        )
        .route(
            "/kpi/team-kpi-evolutions/{id}",
            get(get_team_kpi_evolution)
                .patch(update_team_kpi_evolution)
                .delete(delete_team_kpi_evolution),
        )
        .route(
            "/kpi/team-kpi-evolutions/{id}/submit",
            post(submit_team_kpi_evolution),
        )
        .route(
            "/kpi/team-kpi-evolutions/{id}/approve",
            post(approve_team_kpi_evolution),
        )
        .route(
            "/kpi/team-kpi-evolutions/{id}/reject",
            post(reject_team_kpi_evolution),
        )
}

fn parse_status(value: &str) -> ApiResult<Status> {
    match value {
        "DRAFT" => Ok(Status::Draft),
        "SUBMITTED" => Ok(Status::Submitted),
        "APPROVED" => Ok(Status::Approved),
        "REJECTED" => Ok(Status::Rejected),
        other => Err(ApiError::validation(format!("unknown status: {}", other))),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

// ---------------------------------------------------------------------------
// Evaluation types

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationTypeDto {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

impl From<evaluation_type::Model> for EvaluationTypeDto {
    fn from(model: evaluation_type::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            name: model.name,
            description: model.description,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EvaluationTypeListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

async fn list_evaluation_types(
    State(state): State<AppState>,
    _current: CurrentUser,
    Query(query): Query<EvaluationTypeListQuery>,
) -> ApiResult<Json<Page<EvaluationTypeDto>>> {
    let db = state.db.as_ref();
    let select = evaluation_type::Entity::find().order_by_asc(evaluation_type::Column::Code);
    let page = fetch_page(db, select, &PageQuery { page: query.page, limit: query.limit }).await?;
    Ok(Json(page.map(EvaluationTypeDto::from)))
}

async fn get_evaluation_type(
    State(state): State<AppState>,
    _current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EvaluationTypeDto>> {
    let model = evaluation_type::Entity::find_by_id(id)
        .one(state.db.as_ref())
        .await?
        .ok_or(ApiError::NotFound("Evaluation type"))?;
    Ok(Json(model.into()))
}

/// Resolves the evaluation code a KPI is judged by.
async fn evaluation_code(db: &DatabaseConnection, kpi_id: Uuid) -> ApiResult<String> {
    let kpi = kpi::Entity::find_by_id(kpi_id)
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("KPI"))?;
    let evaluation = evaluation_type::Entity::find_by_id(kpi.evaluation_type_id)
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("Evaluation type"))?;
    Ok(evaluation.code)
}

// ---------------------------------------------------------------------------
// KPI catalog

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiDto {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub evaluation_type_id: Uuid,
    pub unit: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<kpi::Model> for KpiDto {
    fn from(model: kpi::Model) -> Self {
        Self {
            id: model.id,
            company_id: model.company_id,
            name: model.name,
            description: model.description,
            evaluation_type_id: model.evaluation_type_id,
            unit: model.unit,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub company_id: Option<Uuid>,
    pub evaluation_type_id: Option<Uuid>,
    pub q: Option<String>,
}

async fn list_kpis(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<KpiListQuery>,
) -> ApiResult<Json<Page<KpiDto>>> {
    let db = state.db.as_ref();
    let mut select = kpi::Entity::find().filter(kpi::Column::DeletedAt.is_null());
    if let Some(company_id) = effective_company(&current, query.company_id)? {
        select = select.filter(kpi::Column::CompanyId.eq(company_id));
    }
    if let Some(evaluation_type_id) = query.evaluation_type_id {
        select = select.filter(kpi::Column::EvaluationTypeId.eq(evaluation_type_id));
    }
    if let Some(filter) = sanitize_filter(query.q) {
        select = select.filter(kpi::Column::Name.like(format!("%{}%", filter)));
    }
    let page = fetch_page(db, select.order_by_asc(kpi::Column::Name), &PageQuery { page: query.page, limit: query.limit }).await?;
    Ok(Json(page.map(KpiDto::from)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewKpiRequest {
    pub company_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub evaluation_type_id: Uuid,
    pub unit: Option<String>,
}

async fn create_kpi(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<NewKpiRequest>,
) -> ApiResult<Json<KpiDto>> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let company_id = require_company(&current, payload.company_id)?;
    ensure_company_exists(db, company_id).await?;
    evaluation_type::Entity::find_by_id(payload.evaluation_type_id)
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("Evaluation type"))?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = kpi::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(company_id),
        name: Set(validate_name(&payload.name)?),
        description: Set(payload.description),
        evaluation_type_id: Set(payload.evaluation_type_id),
        unit: Set(payload.unit),
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

async fn load_kpi(
    db: &DatabaseConnection,
    current: &CurrentUser,
    id: Uuid,
) -> ApiResult<kpi::Model> {
    let model = kpi::Entity::find_by_id(id)
        .filter(kpi::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("KPI"))?;
    ensure_tenant(current, model.company_id, "KPI")?;
    Ok(model)
}

async fn get_kpi(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<KpiDto>> {
    let model = load_kpi(state.db.as_ref(), &current, id).await?;
    Ok(Json(model.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateKpiRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub evaluation_type_id: Option<Uuid>,
    pub unit: Option<String>,
}

async fn update_kpi(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateKpiRequest>,
) -> ApiResult<Json<KpiDto>> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let model = load_kpi(db, &current, id).await?;
    let mut active: kpi::ActiveModel = model.into();
    if let Some(name) = &payload.name {
        active.name = Set(validate_name(name)?);
    }
    if payload.description.is_some() {
        active.description = Set(payload.description);
    }
    if let Some(evaluation_type_id) = payload.evaluation_type_id {
        evaluation_type::Entity::find_by_id(evaluation_type_id)
            .one(db)
            .await?
            .ok_or(ApiError::NotFound("Evaluation type"))?;
        active.evaluation_type_id = Set(evaluation_type_id);
    }
    if payload.unit.is_some() {
        active.unit = Set(payload.unit);
    }
    active.updated_by = Set(Some(current.user_id));
    active.updated_at = Set(Utc::now().into());
    Ok(Json(active.update(db).await?.into()))
}

async fn delete_kpi(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let model = load_kpi(db, &current, id).await?;
    let mut active: kpi::ActiveModel = model.into();
    active.deleted_at = Set(Some(Utc::now().into()));
    active.deleted_by = Set(Some(current.user_id));
    active.update(db).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Employee KPI assignments

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeKpiDto {
    pub id: Uuid,
    pub company_id: Uuid,
    pub employee_id: Uuid,
    pub kpi_id: Uuid,
    pub period: NaiveDate,
    pub goal_value: f64,
    pub status: &'static str,
    pub approved_by: Option<Uuid>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<employee_kpi::Model> for EmployeeKpiDto {
    fn from(model: employee_kpi::Model) -> Self {
        Self {
            id: model.id,
            company_id: model.company_id,
            employee_id: model.employee_id,
            kpi_id: model.kpi_id,
            period: model.period,
            goal_value: model.goal_value,
            status: status_str(model.status),
            approved_by: model.approved_by,
            rejection_reason: model.rejection_reason,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeKpiListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub company_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    pub kpi_id: Option<Uuid>,
    pub status: Option<String>,
}

async fn list_employee_kpis(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<EmployeeKpiListQuery>,
) -> ApiResult<Json<Page<EmployeeKpiDto>>> {
    let db = state.db.as_ref();
    let mut select = employee_kpi::Entity::find().filter(employee_kpi::Column::DeletedAt.is_null());
    if let Some(company_id) = effective_company(&current, query.company_id)? {
        select = select.filter(employee_kpi::Column::CompanyId.eq(company_id));
    }
    if let Some(employee_id) = query.employee_id {
        select = select.filter(employee_kpi::Column::EmployeeId.eq(employee_id));
    }
    if let Some(kpi_id) = query.kpi_id {
        select = select.filter(employee_kpi::Column::KpiId.eq(kpi_id));
    }
    if let Some(status) = &query.status {
        select = select.filter(employee_kpi::Column::Status.eq(parse_status(status)?));
    }
    let page = fetch_page(
        db,
        select.order_by_desc(employee_kpi::Column::Period),
        &PageQuery { page: query.page, limit: query.limit },
    )
    .await?;
    Ok(Json(page.map(EmployeeKpiDto::from)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmployeeKpiRequest {
    pub employee_id: Uuid,
    pub kpi_id: Uuid,
    pub period: NaiveDate,
    pub goal_value: f64,
}

async fn create_employee_kpi(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<NewEmployeeKpiRequest>,
) -> ApiResult<Json<EmployeeKpiDto>> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let employee = load_employee(db, &current, payload.employee_id).await?;
    let kpi = load_kpi(db, &current, payload.kpi_id).await?;
    if kpi.company_id != employee.company_id {
        return Err(ApiError::validation("kpi belongs to a different company"));
    }
    let duplicate = employee_kpi::Entity::find()
        .filter(employee_kpi::Column::EmployeeId.eq(payload.employee_id))
        .filter(employee_kpi::Column::KpiId.eq(payload.kpi_id))
        .filter(employee_kpi::Column::Period.eq(payload.period))
        .filter(employee_kpi::Column::DeletedAt.is_null())
        .one(db)
        .await?;
    if duplicate.is_some() {
        return Err(ApiError::conflict(
            "this KPI is already assigned to the employee for the period",
        ));
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = employee_kpi::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(employee.company_id),
        employee_id: Set(payload.employee_id),
        kpi_id: Set(payload.kpi_id),
        period: Set(payload.period),
        goal_value: Set(payload.goal_value),
        status: Set(Status::Draft),
        approved_by: Set(None),
        rejection_reason: Set(None),
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

async fn load_employee_kpi(
    db: &DatabaseConnection,
    current: &CurrentUser,
    id: Uuid,
) -> ApiResult<employee_kpi::Model> {
    let model = employee_kpi::Entity::find_by_id(id)
        .filter(employee_kpi::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("KPI assignment"))?;
    ensure_tenant(current, model.company_id, "KPI assignment")?;
    Ok(model)
}

async fn get_employee_kpi(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EmployeeKpiDto>> {
    let model = load_employee_kpi(state.db.as_ref(), &current, id).await?;
    Ok(Json(model.into()))
}

/// The generic PATCH mirrors the original admin UI: `status` is a plain
/// field here, with no transition guard. The guarded path is the
/// submit/approve/reject routes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeeKpiRequest {
    pub period: Option<NaiveDate>,
    pub goal_value: Option<f64>,
    pub status: Option<String>,
    pub rejection_reason: Option<String>,
}

async fn update_employee_kpi(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEmployeeKpiRequest>,
) -> ApiResult<Json<EmployeeKpiDto>> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let model = load_employee_kpi(db, &current, id).await?;
    let mut active: employee_kpi::ActiveModel = model.into();
    if let Some(period) = payload.period {
        active.period = Set(period);
    }
    if let Some(goal_value) = payload.goal_value {
        active.goal_value = Set(goal_value);
    }
    if let Some(status) = &payload.status {
        active.status = Set(parse_status(status)?);
    }
    if payload.rejection_reason.is_some() {
        active.rejection_reason = Set(payload.rejection_reason);
    }
    active.updated_by = Set(Some(current.user_id));
    active.updated_at = Set(Utc::now().into());
    Ok(Json(active.update(db).await?.into()))
}

async fn delete_employee_kpi(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let model = load_employee_kpi(db, &current, id).await?;
    let mut active: employee_kpi::ActiveModel = model.into();
    active.deleted_at = Set(Some(Utc::now().into()));
    active.deleted_by = Set(Some(current.user_id));
    active.update(db).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn submit_employee_kpi(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EmployeeKpiDto>> {
    let model =
        workflow::transition_employee_kpi(state.db.as_ref(), id, Transition::Submit, None, &current)
            .await?;
    Ok(Json(model.into()))
}

async fn approve_employee_kpi(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EmployeeKpiDto>> {
    let model = workflow::transition_employee_kpi(
        state.db.as_ref(),
        id,
        Transition::Approve,
        None,
        &current,
    )
    .await?;
    Ok(Json(model.into()))
}

async fn reject_employee_kpi(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    payload: Option<Json<RejectRequest>>,
) -> ApiResult<Json<EmployeeKpiDto>> {
    let reason = payload.and_then(|Json(body)| body.reason);
    let model = workflow::transition_employee_kpi(
        state.db.as_ref(),
        id,
        Transition::Reject,
        reason,
        &current,
    )
    .await?;
    Ok(Json(model.into()))
}

// ---------------------------------------------------------------------------
// Employee KPI evolutions

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionDto {
    pub id: Uuid,
    pub parent_id: Uuid,
    pub period: NaiveDate,
    pub achieved_value: f64,
    pub goal_value: f64,
    /// Computed by the rating comparator against the parent assignment's
    /// goal; drives the green/red indicator in the admin UI.
    pub passed: bool,
    pub status: &'static str,
    pub approved_by: Option<Uuid>,
    pub rejection_reason: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EvolutionDto {
    fn from_employee(model: employee_kpi_evolution::Model, goal: f64, code: &str) -> Self {
        Self {
            id: model.id,
            parent_id: model.employee_kpi_id,
            period: model.period,
            achieved_value: model.achieved_value,
            goal_value: goal,
            passed: rate_kpi(model.achieved_value, goal, code),
            status: status_str(model.status),
            approved_by: model.approved_by,
            rejection_reason: model.rejection_reason,
            notes: model.notes,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }

    fn from_team(model: team_kpi_evolution::Model, goal: f64, code: &str) -> Self {
        Self {
            id: model.id,
            parent_id: model.team_kpi_id,
            period: model.period,
            achieved_value: model.achieved_value,
            goal_value: goal,
            passed: rate_kpi(model.achieved_value, goal, code),
            status: status_str(model.status),
            approved_by: model.approved_by,
            rejection_reason: model.rejection_reason,
            notes: model.notes,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<String>,
}

async fn list_employee_kpi_evolutions(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Query(query): Query<EvolutionListQuery>,
) -> ApiResult<Json<Page<EvolutionDto>>> {
    let db = state.db.as_ref();
    let parent = load_employee_kpi(db, &current, id).await?;
    let code = evaluation_code(db, parent.kpi_id).await?;
    let mut select = employee_kpi_evolution::Entity::find()
        .filter(employee_kpi_evolution::Column::EmployeeKpiId.eq(id))
        .filter(employee_kpi_evolution::Column::DeletedAt.is_null());
    if let Some(status) = &query.status {
        select = select.filter(employee_kpi_evolution::Column::Status.eq(parse_status(status)?));
    }
    let page = fetch_page(
        db,
        select.order_by_asc(employee_kpi_evolution::Column::Period),
        &PageQuery { page: query.page, limit: query.limit },
    )
    .await?;
    Ok(Json(
        page.map(|model| EvolutionDto::from_employee(model, parent.goal_value, &code)),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvolutionRequest {
    pub period: NaiveDate,
    pub achieved_value: f64,
    pub notes: Option<String>,
}

async fn create_employee_kpi_evolution(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewEvolutionRequest>,
) -> ApiResult<Json<EvolutionDto>> {
    let db = state.db.as_ref();
    let parent = load_employee_kpi(db, &current, id).await?;
    let code = evaluation_code(db, parent.kpi_id).await?;
    let duplicate = employee_kpi_evolution::Entity::find()
        .filter(employee_kpi_evolution::Column::EmployeeKpiId.eq(id))
        .filter(employee_kpi_evolution::Column::Period.eq(payload.period))
        .filter(employee_kpi_evolution::Column::DeletedAt.is_null())
        .one(db)
        .await?;
    if duplicate.is_some() {
        return Err(ApiError::conflict(
            "an evolution already exists for this period",
        ));
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = employee_kpi_evolution::ActiveModel {
        id: Set(Uuid::new_v4()),
        employee_kpi_id: Set(id),
        period: Set(payload.period),
        achieved_value: Set(payload.achieved_value),
        status: Set(Status::Draft),
        approved_by: Set(None),
        rejection_reason: Set(None),
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
    Ok(Json(EvolutionDto::from_employee(
        model,
        parent.goal_value,
        &code,
    )))
}

async fn load_employee_kpi_evolution(
    db: &DatabaseConnection,
    current: &CurrentUser,
    id: Uuid,
) -> ApiResult<(employee_kpi_evolution::Model, employee_kpi::Model)> {
    let model = employee_kpi_evolution::Entity::find_by_id(id)
        .filter(employee_kpi_evolution::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("KPI evolution"))?;
    let parent = load_employee_kpi(db, current, model.employee_kpi_id).await?;
    Ok((model, parent))
}

async fn get_employee_kpi_evolution(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EvolutionDto>> {
    let db = state.db.as_ref();
    let (model, parent) = load_employee_kpi_evolution(db, &current, id).await?;
    let code = evaluation_code(db, parent.kpi_id).await?;
    Ok(Json(EvolutionDto::from_employee(
        model,
        parent.goal_value,
        &code,
    )))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEvolutionRequest {
    pub period: Option<NaiveDate>,
    pub achieved_value: Option<f64>,
    pub status: Option<String>,
    pub rejection_reason: Option<String>,
    pub notes: Option<String>,
}

async fn update_employee_kpi_evolution(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEvolutionRequest>,
) -> ApiResult<Json<EvolutionDto>> {
    let db = state.db.as_ref();
    let (model, parent) = load_employee_kpi_evolution(db, &current, id).await?;
    let code = evaluation_code(db, parent.kpi_id).await?;
    let mut active: employee_kpi_evolution::ActiveModel = model.into();
    if let Some(period) = payload.period {
        active.period = Set(period);
    }
    if let Some(achieved_value) = payload.achieved_value {
        active.achieved_value = Set(achieved_value);
    }
    if let Some(status) = &payload.status {
        active.status = Set(parse_status(status)?);
    }
    if payload.rejection_reason.is_some() {
        active.rejection_reason = Set(payload.rejection_reason);
    }
    if payload.notes.is_some() {
        active.notes = Set(payload.notes);
    }
    active.updated_by = Set(Some(current.user_id));
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(db).await?;
    Ok(Json(EvolutionDto::from_employee(
        updated,
        parent.goal_value,
        &code,
    )))
}

async fn delete_employee_kpi_evolution(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let db = state.db.as_ref();
    let (model, _parent) = load_employee_kpi_evolution(db, &current, id).await?;
    let mut active: employee_kpi_evolution::ActiveModel = model.into();
    active.deleted_at = Set(Some(Utc::now().into()));
    active.deleted_by = Set(Some(current.user_id));
    active.update(db).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn transition_employee_evolution(
    state: &AppState,
    current: &CurrentUser,
    id: Uuid,
    transition: Transition,
    reason: Option<String>,
) -> ApiResult<Json<EvolutionDto>> {
    let db = state.db.as_ref();
    let model =
        workflow::transition_employee_kpi_evolution(db, id, transition, reason, current).await?;
    let parent = load_employee_kpi(db, current, model.employee_kpi_id).await?;
    let code = evaluation_code(db, parent.kpi_id).await?;
    Ok(Json(EvolutionDto::from_employee(
        model,
        parent.goal_value,
        &code,
    )))
}

async fn submit_employee_kpi_evolution(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EvolutionDto>> {
    transition_employee_evolution(&state, &current, id, Transition::Submit, None).await
}

async fn approve_employee_kpi_evolution(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EvolutionDto>> {
    transition_employee_evolution(&state, &current, id, Transition::Approve, None).await
}

async fn reject_employee_kpi_evolution(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    payload: Option<Json<RejectRequest>>,
) -> ApiResult<Json<EvolutionDto>> {
    let reason = payload.and_then(|Json(body)| body.reason);
    transition_employee_evolution(&state, &current, id, Transition::Reject, reason).await
}

// ---------------------------------------------------------------------------
// Team KPI assignments

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamKpiDto {
    pub id: Uuid,
    pub company_id: Uuid,
    pub team_id: Uuid,
    pub kpi_id: Uuid,
    pub period: NaiveDate,
    pub goal_value: f64,
    pub status: &'static str,
    pub approved_by: Option<Uuid>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<team_kpi::Model> for TeamKpiDto {
    fn from(model: team_kpi::Model) -> Self {
        Self {
            id: model.id,
            company_id: model.company_id,
            team_id: model.team_id,
            kpi_id: model.kpi_id,
            period: model.period,
            goal_value: model.goal_value,
            status: status_str(model.status),
            approved_by: model.approved_by,
            rejection_reason: model.rejection_reason,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamKpiListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub company_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
    pub kpi_id: Option<Uuid>,
    pub status: Option<String>,
}

async fn list_team_kpis(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<TeamKpiListQuery>,
) -> ApiResult<Json<Page<TeamKpiDto>>> {
    let db = state.db.as_ref();
    let mut select = team_kpi::Entity::find().filter(team_kpi::Column::DeletedAt.is_null());
    if let Some(company_id) = effective_company(&current, query.company_id)? {
        select = select.filter(team_kpi::Column::CompanyId.eq(company_id));
    }
    if let Some(team_id) = query.team_id {
        select = select.filter(team_kpi::Column::TeamId.eq(team_id));
    }
    if let Some(kpi_id) = query.kpi_id {
        select = select.filter(team_kpi::Column::KpiId.eq(kpi_id));
    }
    if let Some(status) = &query.status {
        select = select.filter(team_kpi::Column::Status.eq(parse_status(status)?));
    }
    let page = fetch_page(
        db,
        select.order_by_desc(team_kpi::Column::Period),
        &PageQuery { page: query.page, limit: query.limit },
    )
    .await?;
    Ok(Json(page.map(TeamKpiDto::from)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeamKpiRequest {
    pub team_id: Uuid,
    pub kpi_id: Uuid,
    pub period: NaiveDate,
    pub goal_value: f64,
}

async fn create_team_kpi(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<NewTeamKpiRequest>,
) -> ApiResult<Json<TeamKpiDto>> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let team = load_team(db, &current, payload.team_id).await?;
    let kpi = load_kpi(db, &current, payload.kpi_id).await?;
    if kpi.company_id != team.company_id {
        return Err(ApiError::validation("kpi belongs to a different company"));
    }
    let duplicate = team_kpi::Entity::find()
        .filter(team_kpi::Column::TeamId.eq(payload.team_id))
        .filter(team_kpi::Column::KpiId.eq(payload.kpi_id))
        .filter(team_kpi::Column::Period.eq(payload.period))
        .filter(team_kpi::Column::DeletedAt.is_null())
        .one(db)
        .await?;
    if duplicate.is_some() {
        return Err(ApiError::conflict(
            "this KPI is already assigned to the team for the period",
        ));
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = team_kpi::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(team.company_id),
        team_id: Set(payload.team_id),
        kpi_id: Set(payload.kpi_id),
        period: Set(payload.period),
        goal_value: Set(payload.goal_value),
        status: Set(Status::Draft),
        approved_by: Set(None),
        rejection_reason: Set(None),
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

async fn load_team_kpi(
    db: &DatabaseConnection,
    current: &CurrentUser,
    id: Uuid,
) -> ApiResult<team_kpi::Model> {
    let model = team_kpi::Entity::find_by_id(id)
        .filter(team_kpi::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("Team KPI assignment"))?;
    ensure_tenant(current, model.company_id, "Team KPI assignment")?;
    Ok(model)
}

async fn get_team_kpi(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TeamKpiDto>> {
    let model = load_team_kpi(state.db.as_ref(), &current, id).await?;
    Ok(Json(model.into()))
}

async fn update_team_kpi(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEmployeeKpiRequest>,
) -> ApiResult<Json<TeamKpiDto>> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let model = load_team_kpi(db, &current, id).await?;
    let mut active: team_kpi::ActiveModel = model.into();
    if let Some(period) = payload.period {
        active.period = Set(period);
    }
    if let Some(goal_value) = payload.goal_value {
        active.goal_value = Set(goal_value);
    }
    if let Some(status) = &payload.status {
        active.status = Set(parse_status(status)?);
    }
    if payload.rejection_reason.is_some() {
        active.rejection_reason = Set(payload.rejection_reason);
    }
    active.updated_by = Set(Some(current.user_id));
    active.updated_at = Set(Utc::now().into());
    Ok(Json(active.update(db).await?.into()))
}

async fn delete_team_kpi(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let model = load_team_kpi(db, &current, id).await?;
    let mut active: team_kpi::ActiveModel = model.into();
    active.deleted_at = Set(Some(Utc::now().into()));
    active.deleted_by = Set(Some(current.user_id));
    active.update(db).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn submit_team_kpi(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TeamKpiDto>> {
    let model =
        workflow::transition_team_kpi(state.db.as_ref(), id, Transition::Submit, None, &current)
            .await?;
    Ok(Json(model.into()))
}

async fn approve_team_kpi(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TeamKpiDto>> {
    let model =
        workflow::transition_team_kpi(state.db.as_ref(), id, Transition::Approve, None, &current)
            .await?;
    Ok(Json(model.into()))
}

async fn reject_team_kpi(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    payload: Option<Json<RejectRequest>>,
) -> ApiResult<Json<TeamKpiDto>> {
    let reason = payload.and_then(|Json(body)| body.reason);
    let model =
        workflow::transition_team_kpi(state.db.as_ref(), id, Transition::Reject, reason, &current)
            .await?;
    Ok(Json(model.into()))
}

// ---------------------------------------------------------------------------
// Team KPI evolutions

async fn list_team_kpi_evolutions(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Query(query): Query<EvolutionListQuery>,
) -> ApiResult<Json<Page<EvolutionDto>>> {
    let db = state.db.as_ref();
    let parent = load_team_kpi(db, &current, id).await?;
    let code = evaluation_code(db, parent.kpi_id).await?;
    let mut select = team_kpi_evolution::Entity::find()
        .filter(team_kpi_evolution::Column::TeamKpiId.eq(id))
        .filter(team_kpi_evolution::Column::DeletedAt.is_null());
    if let Some(status) = &query.status {
        select = select.filter(team_kpi_evolution::Column::Status.eq(parse_status(status)?));
    }
    let page = fetch_page(
        db,
        select.order_by_asc(team_kpi_evolution::Column::Period),
        &PageQuery { page: query.page, limit: query.limit },
    )
    .await?;
    Ok(Json(
        page.map(|model| EvolutionDto::from_team(model, parent.goal_value, &code)),
    ))
}

async fn create_team_kpi_evolution(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewEvolutionRequest>,
) -> ApiResult<Json<EvolutionDto>> {
    let db = state.db.as_ref();
    let parent = load_team_kpi(db, &current, id).await?;
    let code = evaluation_code(db, parent.kpi_id).await?;
    let duplicate = team_kpi_evolution::Entity::find()
        .filter(team_kpi_evolution::Column::TeamKpiId.eq(id))
        .filter(team_kpi_evolution::Column::Period.eq(payload.period))
        .filter(team_kpi_evolution::Column::DeletedAt.is_null())
        .one(db)
        .await?;
    if duplicate.is_some() {
        return Err(ApiError::conflict(
            "an evolution already exists for this period",
        ));
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = team_kpi_evolution::ActiveModel {
        id: Set(Uuid::new_v4()),
        team_kpi_id: Set(id),
        period: Set(payload.period),
        achieved_value: Set(payload.achieved_value),
        status: Set(Status::Draft),
        approved_by: Set(None),
        rejection_reason: Set(None),
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
    Ok(Json(EvolutionDto::from_team(model, parent.goal_value, &code)))
}

async fn load_team_kpi_evolution(
    db: &DatabaseConnection,
    current: &CurrentUser,
    id: Uuid,
) -> ApiResult<(team_kpi_evolution::Model, team_kpi::Model)> {
    let model = team_kpi_evolution::Entity::find_by_id(id)
        .filter(team_kpi_evolution::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("Team KPI evolution"))?;
    let parent = load_team_kpi(db, current, model.team_kpi_id).await?;
    Ok((model, parent))
}

async fn get_team_kpi_evolution(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EvolutionDto>> {
    let db = state.db.as_ref();
    let (model, parent) = load_team_kpi_evolution(db, &current, id).await?;
    let code = evaluation_code(db, parent.kpi_id).await?;
    Ok(Json(EvolutionDto::from_team(model, parent.goal_value, &code)))
}

async fn update_team_kpi_evolution(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEvolutionRequest>,
) -> ApiResult<Json<EvolutionDto>> {
    let db = state.db.as_ref();
    let (model, parent) = load_team_kpi_evolution(db, &current, id).await?;
    let code = evaluation_code(db, parent.kpi_id).await?;
    let mut active: team_kpi_evolution::ActiveModel = model.into();
    if let Some(period) = payload.period {
        active.period = Set(period);
    }
    if let Some(achieved_value) = payload.achieved_value {
        active.achieved_value = Set(achieved_value);
    }
    if let Some(status) = &payload.status {
        active.status = Set(parse_status(status)?);
    }
    if payload.rejection_reason.is_some() {
        active.rejection_reason = Set(payload.rejection_reason);
    }
    if payload.notes.is_some() {
        active.notes = Set(payload.notes);
    }
    active.updated_by = Set(Some(current.user_id));
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(db).await?;
    Ok(Json(EvolutionDto::from_team(
        updated,
        parent.goal_value,
        &code,
    )))
}

async fn delete_team_kpi_evolution(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let db = state.db.as_ref();
    let (model, _parent) = load_team_kpi_evolution(db, &current, id).await?;
    let mut active: team_kpi_evolution::ActiveModel = model.into();
    active.deleted_at = Set(Some(Utc::now().into()));
    active.deleted_by = Set(Some(current.user_id));
    active.update(db).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn transition_team_evolution(
    state: &AppState,
    current: &CurrentUser,
    id: Uuid,
    transition: Transition,
    reason: Option<String>,
) -> ApiResult<Json<EvolutionDto>> {
    let db = state.db.as_ref();
    let model = workflow::transition_team_kpi_evolution(db, id, transition, reason, current).await?;
    let parent = load_team_kpi(db, current, model.team_kpi_id).await?;
    let code = evaluation_code(db, parent.kpi_id).await?;
    Ok(Json(EvolutionDto::from_team(model, parent.goal_value, &code)))
}

async fn submit_team_kpi_evolution(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EvolutionDto>> {
    transition_team_evolution(&state, &current, id, Transition::Submit, None).await
}

async fn approve_team_kpi_evolution(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<EvolutionDto>> {
    transition_team_evolution(&state, &current, id, Transition::Approve, None).await
}

async fn reject_team_kpi_evolution(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    payload: Option<Json<RejectRequest>>,
) -> ApiResult<Json<EvolutionDto>> {
    let reason = payload.and_then(|Json(body)| body.reason);
    transition_team_evolution(&state, &current, id, Transition::Reject, reason).await
}
