use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Team {
    Table,
    Id,
    CompanyId,
    Name,
    ParentTeamId,
    LeadEmployeeId,
}

#[derive(DeriveIden)]
enum TeamMember {
    Table,
    Id,
    TeamId,
    EmployeeId,
    JoinedOn,
}

#[derive(DeriveIden)]
enum Company {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Employee {
    Table,
    Id,
}

fn audit_columns(table: &mut TableCreateStatement) {
    table
        .col(ColumnDef::new(Alias::new("created_by")).uuid())
        .col(ColumnDef::new(Alias::new("updated_by")).uuid())
        .col(
            ColumnDef::new(Alias::new("created_at"))
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::cust("now()")),
        )
        .col(
            ColumnDef::new(Alias::new("updated_at"))
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::cust("now()")),
        )
        .col(ColumnDef::new(Alias::new("deleted_at")).timestamp_with_time_zone())
        .col(ColumnDef::new(Alias::new("deleted_by")).uuid());
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut team = Table::create()
            .table(Team::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Team::Id)
                    .uuid()
                    .not_null()
                    .primary_key()
                    .default(Expr::cust("gen_random_uuid()")),
            )
            .col(ColumnDef::new(Team::CompanyId).uuid().not_null())
            .col(ColumnDef::new(Team::Name).string_len(256).not_null())
            .col(ColumnDef::new(Team::ParentTeamId).uuid())
            .col(ColumnDef::new(Team::LeadEmployeeId).uuid())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_team_company")
                    .from(Team::Table, Team::CompanyId)
                    .to(Company::Table, Company::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_team_parent")
                    .from(Team::Table, Team::ParentTeamId)
                    .to(Team::Table, Team::Id)
                    .on_delete(ForeignKeyAction::SetNull),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_team_lead")
                    .from(Team::Table, Team::LeadEmployeeId)
                    .to(Employee::Table, Employee::Id)
                    .on_delete(ForeignKeyAction::SetNull),
            )
            .to_owned();
        audit_columns(&mut team);
        manager.create_table(team).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_team_company")
                    .table(Team::Table)
                    .col(Team::CompanyId)
                    .to_owned(),
            )
            .await?;

        let mut team_member = Table::create()
            .table(TeamMember::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(TeamMember::Id)
                    .uuid()
                    .not_null()
                    .primary_key()
                    .default(Expr::cust("gen_random_uuid()")),
            )
            .col(ColumnDef::new(TeamMember::TeamId).uuid().not_null())
            .col(ColumnDef::new(TeamMember::EmployeeId).uuid().not_null())
            .col(ColumnDef::new(TeamMember::JoinedOn).date().not_null())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_team_member_team")
                    .from(TeamMember::Table, TeamMember::TeamId)
                    .to(Team::Table, Team::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_team_member_employee")
                    .from(TeamMember::Table, TeamMember::EmployeeId)
                    .to(Employee::Table, Employee::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned();
        audit_columns(&mut team_member);
        manager.create_table(team_member).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_team_member_unique")
                    .table(TeamMember::Table)
                    .col(TeamMember::TeamId)
                    .col(TeamMember::EmployeeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TeamMember::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Team::Table).to_owned())
            .await?;
        Ok(())
    }
}
