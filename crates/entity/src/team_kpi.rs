use sea_orm::entity::prelude::*;

use super::approval;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "team_kpi")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub company_id: Uuid,
    #[sea_orm(indexed)]
    pub team_id: Uuid,
    #[sea_orm(indexed)]
    pub kpi_id: Uuid,
    pub period: Date,
    pub goal_value: f64,
    pub status: approval::Status,
    pub approved_by: Option<Uuid>,
    pub rejection_reason: Option<String>,
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
        belongs_to = "super::company::Entity",
        from = "Column::CompanyId",
        to = "super::company::Column::Id",
        on_delete = "Cascade"
    )]
    Company,
    #[sea_orm(
        belongs_to = "super::team::Entity",
        from = "Column::TeamId",
        to = "super::team::Column::Id",
        on_delete = "Cascade"
    )]
    Team,
    #[sea_orm(
        belongs_to = "super::kpi::Entity",
        from = "Column::KpiId",
        to = "super::kpi::Column::Id",
        on_delete = "Cascade"
    )]
    Kpi,
    #[sea_orm(has_many = "super::team_kpi_evolution::Entity")]
    Evolution,
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl Related<super::kpi::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Kpi.def()
    }
}

impl Related<super::team_kpi_evolution::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Evolution.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
