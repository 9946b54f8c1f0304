use sea_orm::entity::prelude::*;

/// Catalog of goal-judging rules. Global rows seeded by migration, keyed
/// by the wire code (`BINARY`, `HIGHER_BETTER_SUM`, ...).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "evaluation_type")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::kpi::Entity")]
    Kpi,
}

impl Related<super::kpi::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Kpi.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
