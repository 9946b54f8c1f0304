use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "kpi")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub company_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[sea_orm(indexed)]
    pub evaluation_type_id: Uuid,
    pub unit: Option<String>,
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
        belongs_to = "super::evaluation_type::Entity",
        from = "Column::EvaluationTypeId",
        to = "super::evaluation_type::Column::Id"
    )]
    EvaluationType,
    #[sea_orm(has_many = "super::employee_kpi::Entity")]
    EmployeeKpi,
    #[sea_orm(has_many = "super::team_kpi::Entity")]
    TeamKpi,
}

impl Related<super::evaluation_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EvaluationType.def()
    }
}

impl Related<super::employee_kpi::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmployeeKpi.def()
    }
}

impl Related<super::team_kpi::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeamKpi.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
