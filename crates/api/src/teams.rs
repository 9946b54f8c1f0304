use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use entity::{team, team_member};
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
    tenant::{effective_company, ensure_tenant, require_company},
    users::sanitize_filter,
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/teams", get(list_teams).post(create_team))
        .route(
            "/teams/{id}",
            get(get_team).patch(update_team).delete(delete_team),
        )
        .route(
            "/teams/{id}/members",
            get(list_team_members).post(add_team_member),
        )
        .route(
            "/teams/{id}/members/{member_id}",
            axum::routing::delete(remove_team_member),
        )
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDto {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub parent_team_id: Option<Uuid>,
    pub lead_employee_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<team::Model> for TeamDto {
    fn from(model: team::Model) -> Self {
        Self {
            id: model.id,
            company_id: model.company_id,
            name: model.name,
            parent_team_id: model.parent_team_id,
            lead_employee_id: model.lead_employee_id,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub company_id: Option<Uuid>,
    pub parent_team_id: Option<Uuid>,
    pub q: Option<String>,
}

async fn list_teams(
    State(state): State<AppState>,
    current: CurrentUser,
    Query(query): Query<TeamListQuery>,
) -> ApiResult<Json<Page<TeamDto>>> {
    let db = state.db.as_ref();
    let mut select = team::Entity::find().filter(team::Column::DeletedAt.is_null());
    if let Some(company_id) = effective_company(&current, query.company_id)? {
        select = select.filter(team::Column::CompanyId.eq(company_id));
    }
    if let Some(parent_team_id) = query.parent_team_id {
        select = select.filter(team::Column::ParentTeamId.eq(parent_team_id));
    }
    if let Some(filter) = sanitize_filter(query.q) {
        select = select.filter(team::Column::Name.like(format!("%{}%", filter)));
    }
    let page = fetch_page(db, select.order_by_asc(team::Column::Name), &PageQuery { page: query.page, limit: query.limit }).await?;
    Ok(Json(page.map(TeamDto::from)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeamRequest {
    pub company_id: Option<Uuid>,
    pub name: String,
    pub parent_team_id: Option<Uuid>,
    pub lead_employee_id: Option<Uuid>,
}

async fn create_team(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(payload): Json<NewTeamRequest>,
) -> ApiResult<Json<TeamDto>> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let company_id = require_company(&current, payload.company_id)?;
    ensure_company_exists(db, company_id).await?;
    if let Some(parent_team_id) = payload.parent_team_id {
        let parent = load_team(db, &current, parent_team_id).await?;
        if parent.company_id != company_id {
            return Err(ApiError::validation(
                "parent team belongs to a different company",
            ));
        }
    }
    if let Some(lead_employee_id) = payload.lead_employee_id {
        let lead = load_employee(db, &current, lead_employee_id).await?;
        if lead.company_id != company_id {
            return Err(ApiError::validation(
                "lead employee belongs to a different company",
            ));
        }
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = team::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(company_id),
        name: Set(validate_name(&payload.name)?),
        parent_team_id: Set(payload.parent_team_id),
        lead_employee_id: Set(payload.lead_employee_id),
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

pub(crate) async fn load_team(
    db: &DatabaseConnection,
    current: &CurrentUser,
    id: Uuid,
) -> ApiResult<team::Model> {
    let model = team::Entity::find_by_id(id)
        .filter(team::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("Team"))?;
    ensure_tenant(current, model.company_id, "Team")?;
    Ok(model)
}

async fn get_team(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TeamDto>> {
    let model = load_team(state.db.as_ref(), &current, id).await?;
    Ok(Json(model.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeamRequest {
    pub name: Option<String>,
    pub parent_team_id: Option<Uuid>,
    pub lead_employee_id: Option<Uuid>,
}

async fn update_team(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTeamRequest>,
) -> ApiResult<Json<TeamDto>> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let model = load_team(db, &current, id).await?;
    let company_id = model.company_id;
    let mut active: team::ActiveModel = model.into();
    if let Some(name) = &payload.name {
        active.name = Set(validate_name(name)?);
    }
    if let Some(parent_team_id) = payload.parent_team_id {
        if parent_team_id == id {
            return Err(ApiError::validation("a team cannot be its own parent"));
        }
        let parent = load_team(db, &current, parent_team_id).await?;
        if parent.company_id != company_id {
            return Err(ApiError::validation(
                "parent team belongs to a different company",
            ));
        }
        active.parent_team_id = Set(Some(parent_team_id));
    }
    if let Some(lead_employee_id) = payload.lead_employee_id {
        let lead = load_employee(db, &current, lead_employee_id).await?;
        if lead.company_id != company_id {
            return Err(ApiError::validation(
                "lead employee belongs to a different company",
            ));
        }
        active.lead_employee_id = Set(Some(lead_employee_id));
    }
    active.updated_by = Set(Some(current.user_id));
    active.updated_at = Set(Utc::now().into());
    Ok(Json(active.update(db).await?.into()))
}

async fn delete_team(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let model = load_team(db, &current, id).await?;
    let mut active: team::ActiveModel = model.into();
    active.deleted_at = Set(Some(Utc::now().into()));
    active.deleted_by = Set(Some(current.user_id));
    active.update(db).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Team members

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberDto {
    pub id: Uuid,
    pub team_id: Uuid,
    pub employee_id: Uuid,
    pub joined_on: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<team_member::Model> for TeamMemberDto {
    fn from(model: team_member::Model) -> Self {
        Self {
            id: model.id,
            team_id: model.team_id,
            employee_id: model.employee_id,
            joined_on: model.joined_on,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TeamMemberListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

async fn list_team_members(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Query(query): Query<TeamMemberListQuery>,
) -> ApiResult<Json<Page<TeamMemberDto>>> {
    let db = state.db.as_ref();
    load_team(db, &current, id).await?;
    let select = team_member::Entity::find()
        .filter(team_member::Column::TeamId.eq(id))
        .filter(team_member::Column::DeletedAt.is_null())
        .order_by_asc(team_member::Column::JoinedOn);
    let page = fetch_page(db, select, &PageQuery { page: query.page, limit: query.limit }).await?;
    Ok(Json(page.map(TeamMemberDto::from)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeamMemberRequest {
    pub employee_id: Uuid,
    pub joined_on: Option<NaiveDate>,
}

async fn add_team_member(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewTeamMemberRequest>,
) -> ApiResult<Json<TeamMemberDto>> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    let team = load_team(db, &current, id).await?;
    let employee = load_employee(db, &current, payload.employee_id).await?;
    if employee.company_id != team.company_id {
        return Err(ApiError::validation(
            "employee belongs to a different company",
        ));
    }
    let duplicate = team_member::Entity::find()
        .filter(team_member::Column::TeamId.eq(id))
        .filter(team_member::Column::EmployeeId.eq(payload.employee_id))
        .filter(team_member::Column::DeletedAt.is_null())
        .one(db)
        .await?;
    if duplicate.is_some() {
        return Err(ApiError::conflict("employee is already a team member"));
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = team_member::ActiveModel {
        id: Set(Uuid::new_v4()),
        team_id: Set(id),
        employee_id: Set(payload.employee_id),
        joined_on: Set(payload.joined_on.unwrap_or_else(|| Utc::now().date_naive())),
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

async fn remove_team_member(
    State(state): State<AppState>,
    current: CurrentUser,
    Path((team_id, member_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    current.require(UserRole::Manager)?;
    let db = state.db.as_ref();
    load_team(db, &current, team_id).await?;
    let model = team_member::Entity::find_by_id(member_id)
        .filter(team_member::Column::TeamId.eq(team_id))
        .filter(team_member::Column::DeletedAt.is_null())
        .one(db)
        .await?
        .ok_or(ApiError::NotFound("Team member"))?;
    let mut active: team_member::ActiveModel = model.into();
    active.deleted_at = Set(Some(Utc::now().into()));
    active.deleted_by = Set(Some(current.user_id));
    active.update(db).await?;
    Ok(StatusCode::NO_CONTENT)
}
