use sea_orm::entity::prelude::*;

use super::approval;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "team_kpi_evolution")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub team_kpi_id: Uuid,
    pub period: Date,
    pub achieved_value: f64,
    pub status: approval::Status,
    pub approved_by: Option<Uuid>,
    pub rejection_reason: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub deleted_by: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::team_kpi::Entity",
        from = "Column::TeamKpiId",
        to = "super::team_kpi::Column::Id",
        on_delete = "Cascade"
    )]
    TeamKpi,
}

impl Related<super::team_kpi::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeamKpi.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
