use chrono::Utc;
use entity::approval::Status;
use entity::{employee_kpi, employee_kpi_evolution, team_kpi, team_kpi_evolution};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    TransactionTrait,
};
use tracing::info_span;
use uuid::Uuid;

use crate::{
    auth::{CurrentUser, UserRole},
    error::{ApiError, ApiResult},
    tenant::ensure_tenant,
};

/// The three legal moves through the approval workflow. The generic PATCH
/// endpoints still write `status` directly; these guarded transitions are
/// what the submit/approve/reject routes run.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Transition {
    Submit,
    Approve,
    Reject,
}

impl Transition {
    pub fn target(self) -> Status {
        match self {
            Transition::Submit => Status::Submitted,
            Transition::Approve => Status::Approved,
            Transition::Reject => Status::Rejected,
        }
    }

    pub fn accepts(self, from: Status) -> bool {
        matches!(
            (self, from),
            (Transition::Submit, Status::Draft)
                | (Transition::Approve, Status::Submitted)
                | (Transition::Reject, Status::Submitted)
        )
    }

    fn verb(self) -> &'static str {
        match self {
            Transition::Submit => "submit",
            Transition::Approve => "approve",
            Transition::Reject => "reject",
        }
    }

    fn required_role(self) -> UserRole {
        match self {
            Transition::Submit => UserRole::Member,
            Transition::Approve | Transition::Reject => UserRole::Manager,
        }
    }
}

pub fn status_str(status: Status) -> &'static str {
    match status {
        Status::Draft => "DRAFT",
        Status::Submitted => "SUBMITTED",
        Status::Approved => "APPROVED",
        Status::Rejected => "REJECTED",
    }
}

fn illegal(from: Status, transition: Transition) -> ApiError {
    ApiError::conflict(format!(
        "cannot {} a {} record",
        transition.verb(),
        status_str(from)
    ))
}

pub async fn transition_employee_kpi(
    db: &DatabaseConnection,
    id: Uuid,
    transition: Transition,
    reason: Option<String>,
    actor: &CurrentUser,
) -> ApiResult<employee_kpi::Model> {
    actor.require(transition.required_role())?;
    let span = info_span!(
        "kpi.workflow",
        record = "employee_kpi",
        action = transition.verb()
    );
    let _guard = span.enter();
    let txn = db.begin().await?;
    let existing = employee_kpi::Entity::find_by_id(id)
        .filter(employee_kpi::Column::DeletedAt.is_null())
        .one(&txn)
        .await?
        .ok_or(ApiError::NotFound("KPI assignment"))?;
    ensure_tenant(actor, existing.company_id, "KPI assignment")?;
    if existing.status == transition.target() {
        txn.commit().await?;
        return Ok(existing);
    }
    if !transition.accepts(existing.status) {
        return Err(illegal(existing.status, transition));
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let mut active: employee_kpi::ActiveModel = existing.into();
    active.status = Set(transition.target());
    active.approved_by = Set(decision_actor(transition, actor));
    active.rejection_reason = Set(rejection_reason(transition, reason));
    active.updated_by = Set(Some(actor.user_id));
    active.updated_at = Set(now);
    let updated = active.update(&txn).await?;
    txn.commit().await?;
    Ok(updated)
}

pub async fn transition_employee_kpi_evolution(
    db: &DatabaseConnection,
    id: Uuid,
    transition: Transition,
    reason: Option<String>,
    actor: &CurrentUser,
) -> ApiResult<employee_kpi_evolution::Model> {
    actor.require(transition.required_role())?;
    let span = info_span!(
        "kpi.workflow",
        record = "employee_kpi_evolution",
        action = transition.verb()
    );
    let _guard = span.enter();
    let txn = db.begin().await?;
    let existing = employee_kpi_evolution::Entity::find_by_id(id)
        .filter(employee_kpi_evolution::Column::DeletedAt.is_null())
        .one(&txn)
        .await?
        .ok_or(ApiError::NotFound("KPI evolution"))?;
    let parent = employee_kpi::Entity::find_by_id(existing.employee_kpi_id)
        .one(&txn)
        .await?
        .ok_or(ApiError::NotFound("KPI assignment"))?;
    ensure_tenant(actor, parent.company_id, "KPI evolution")?;
    if existing.status == transition.target() {
        txn.commit().await?;
        return Ok(existing);
    }
    if !transition.accepts(existing.status) {
        return Err(illegal(existing.status, transition));
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let mut active: employee_kpi_evolution::ActiveModel = existing.into();
    active.status = Set(transition.target());
    active.approved_by = Set(decision_actor(transition, actor));
    active.rejection_reason = Set(rejection_reason(transition, reason));
    active.updated_by = Set(Some(actor.user_id));
    active.updated_at = Set(now);
    let updated = active.update(&txn).await?;
    txn.commit().await?;
    Ok(updated)
}

pub async fn transition_team_kpi(
    db: &DatabaseConnection,
    id: Uuid,
    transition: Transition,
    reason: Option<String>,
    actor: &CurrentUser,
) -> ApiResult<team_kpi::Model> {
    actor.require(transition.required_role())?;
    let span = info_span!("kpi.workflow", record = "team_kpi", action = transition.verb());
    let _guard = span.enter();
    let txn = db.begin().await?;
    let existing = team_kpi::Entity::find_by_id(id)
        .filter(team_kpi::Column::DeletedAt.is_null())
        .one(&txn)
        .await?
        .ok_or(ApiError::NotFound("Team KPI assignment"))?;
    ensure_tenant(actor, existing.company_id, "Team KPI assignment")?;
    if existing.status == transition.target() {
        txn.commit().await?;
        return Ok(existing);
    }
    if !transition.accepts(existing.status) {
        return Err(illegal(existing.status, transition));
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let mut active: team_kpi::ActiveModel = existing.into();
    active.status = Set(transition.target());
    active.approved_by = Set(decision_actor(transition, actor));
    active.rejection_reason = Set(rejection_reason(transition, reason));
    active.updated_by = Set(Some(actor.user_id));
    active.updated_at = Set(now);
    let updated = active.update(&txn).await?;
    txn.commit().await?;
    Ok(updated)
}

pub async fn transition_team_kpi_evolution(
    db: &DatabaseConnection,
    id: Uuid,
    transition: Transition,
    reason: Option<String>,
    actor: &CurrentUser,
) -> ApiResult<team_kpi_evolution::Model> {
    actor.require(transition.required_role())?;
    let span = info_span!(
        "kpi.workflow",
        record = "team_kpi_evolution",
        action = transition.verb()
    );
    let _guard = span.enter();
    let txn = db.begin().await?;
    let existing = team_kpi_evolution::Entity::find_by_id(id)
        .filter(team_kpi_evolution::Column::DeletedAt.is_null())
        .one(&txn)
        .await?
        .ok_or(ApiError::NotFound("Team KPI evolution"))?;
    let parent = team_kpi::Entity::find_by_id(existing.team_kpi_id)
        .one(&txn)
        .await?
        .ok_or(ApiError::NotFound("Team KPI assignment"))?;
    ensure_tenant(actor, parent.company_id, "Team KPI evolution")?;
    if existing.status == transition.target() {
        txn.commit().await?;
        return Ok(existing);
    }
    if !transition.accepts(existing.status) {
        return Err(illegal(existing.status, transition));
    }
    let now: DateTimeWithTimeZone = Utc::now().into();
    let mut active: team_kpi_evolution::ActiveModel = existing.into();
    active.status = Set(transition.target());
    active.approved_by = Set(decision_actor(transition, actor));
    active.rejection_reason = Set(rejection_reason(transition, reason));
    active.updated_by = Set(Some(actor.user_id));
    active.updated_at = Set(now);
    let updated = active.update(&txn).await?;
    txn.commit().await?;
    Ok(updated)
}

fn decision_actor(transition: Transition, actor: &CurrentUser) -> Option<Uuid> {
    match transition {
        Transition::Submit => None,
        Transition::Approve | Transition::Reject => Some(actor.user_id),
    }
}

fn rejection_reason(transition: Transition, reason: Option<String>) -> Option<String> {
    match transition {
        Transition::Reject => reason.and_then(|r| {
            let trimmed = r.trim().to_string();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legal_transitions() {
        assert!(Transition::Submit.accepts(Status::Draft));
        assert!(Transition::Approve.accepts(Status::Submitted));
        assert!(Transition::Reject.accepts(Status::Submitted));
    }

    #[test]
    fn illegal_transitions() {
        assert!(!Transition::Approve.accepts(Status::Draft));
        assert!(!Transition::Reject.accepts(Status::Draft));
        assert!(!Transition::Submit.accepts(Status::Approved));
        assert!(!Transition::Submit.accepts(Status::Rejected));
        assert!(!Transition::Approve.accepts(Status::Rejected));
    }

    #[test]
    fn rejection_reason_is_trimmed_and_reject_only() {
        assert_eq!(
            rejection_reason(Transition::Reject, Some("  late data  ".into())),
            Some("late data".to_string())
        );
        assert_eq!(rejection_reason(Transition::Reject, Some("   ".into())), None);
        assert_eq!(
            rejection_reason(Transition::Approve, Some("ignored".into())),
            None
        );
    }
}
