use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum EvaluationType {
    Table,
    Id,
    Code,
    Name,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Kpi {
    Table,
    Id,
    CompanyId,
    Name,
    Description,
    EvaluationTypeId,
    Unit,
}

#[derive(DeriveIden)]
enum EmployeeKpi {
    Table,
    Id,
    CompanyId,
    EmployeeId,
    KpiId,
    Period,
    GoalValue,
    Status,
    ApprovedBy,
    RejectionReason,
}

#[derive(DeriveIden)]
enum EmployeeKpiEvolution {
    Table,
    Id,
    EmployeeKpiId,
    Period,
    AchievedValue,
    Status,
    ApprovedBy,
    RejectionReason,
    Notes,
}

#[derive(DeriveIden)]
enum TeamKpi {
    Table,
    Id,
    CompanyId,
    TeamId,
    KpiId,
    Period,
    GoalValue,
    Status,
    ApprovedBy,
    RejectionReason,
}

#[derive(DeriveIden)]
enum TeamKpiEvolution {
    Table,
    Id,
    TeamKpiId,
    Period,
    AchievedValue,
    Status,
    ApprovedBy,
    RejectionReason,
    Notes,
}

#[derive(DeriveIden)]
#[sea_orm(iden = "approval_status")]
enum ApprovalStatusEnum {
    Table,
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

#[derive(DeriveIden)]
enum Team {
    Table,
    Id,
}

const APPROVAL_STATUS_VALUES: &[&str] = &["DRAFT", "SUBMITTED", "APPROVED", "REJECTED"];

const EVALUATION_TYPE_SEED: &[(&str, &str, &str)] = &[
    ("BINARY", "Binary", "Met exactly or not at all."),
    (
        "HIGHER_BETTER_SUM",
        "Higher is better (sum)",
        "Summed value; achieving at least the goal passes.",
    ),
    (
        "HIGHER_BETTER_PCT",
        "Higher is better (%)",
        "Percentage value; achieving at least the goal passes.",
    ),
    (
        "LOWER_BETTER_SUM",
        "Lower is better (sum)",
        "Summed value; staying at or under the goal passes.",
    ),
    (
        "LOWER_BETTER_PCT",
        "Lower is better (%)",
        "Percentage value; staying at or under the goal passes.",
    ),
];

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

fn status_column() -> ColumnDef {
    let mut def = ColumnDef::new(Alias::new("status"));
    def.custom(ApprovalStatusEnum::Table)
        .not_null()
        .default(Expr::cust("'DRAFT'::approval_status"));
    def
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let create_enum_sql = format!(
            "DO $$ BEGIN IF NOT EXISTS (SELECT 1 FROM pg_type WHERE typname = 'approval_status') THEN CREATE TYPE approval_status AS ENUM ({}); END IF; END $$;",
            APPROVAL_STATUS_VALUES
                .iter()
                .map(|v| format!("'{}'", v))
                .collect::<Vec<_>>()
                .join(", ")
        );
        manager
            .get_connection()
            .execute_unprepared(&create_enum_sql)
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EvaluationType::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EvaluationType::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .default(Expr::cust("gen_random_uuid()")),
                    )
                    .col(
                        ColumnDef::new(EvaluationType::Code)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(EvaluationType::Name)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(EvaluationType::Description).text())
                    .col(
                        ColumnDef::new(EvaluationType::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .to_owned(),
            )
            .await?;

        for (code, name, description) in EVALUATION_TYPE_SEED {
            let insert = format!(
                "INSERT INTO evaluation_type (code, name, description) VALUES ('{}', '{}', '{}') ON CONFLICT (code) DO NOTHING;",
                code, name, description
            );
            manager.get_connection().execute_unprepared(&insert).await?;
        }

        let mut kpi = Table::create()
            .table(Kpi::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Kpi::Id)
                    .uuid()
                    .not_null()
                    .primary_key()
                    .default(Expr::cust("gen_random_uuid()")),
            )
            .col(ColumnDef::new(Kpi::CompanyId).uuid().not_null())
            .col(ColumnDef::new(Kpi::Name).string_len(256).not_null())
            .col(ColumnDef::new(Kpi::Description).text())
            .col(ColumnDef::new(Kpi::EvaluationTypeId).uuid().not_null())
            .col(ColumnDef::new(Kpi::Unit).string_len(32))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_kpi_company")
                    .from(Kpi::Table, Kpi::CompanyId)
                    .to(Company::Table, Company::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_kpi_evaluation_type")
                    .from(Kpi::Table, Kpi::EvaluationTypeId)
                    .to(EvaluationType::Table, EvaluationType::Id),
            )
            .to_owned();
        audit_columns(&mut kpi);
        manager.create_table(kpi).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_kpi_company")
                    .table(Kpi::Table)
                    .col(Kpi::CompanyId)
                    .to_owned(),
            )
            .await?;

        let mut employee_kpi = Table::create()
            .table(EmployeeKpi::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(EmployeeKpi::Id)
                    .uuid()
                    .not_null()
                    .primary_key()
                    .default(Expr::cust("gen_random_uuid()")),
            )
            .col(ColumnDef::new(EmployeeKpi::CompanyId).uuid().not_null())
            .col(ColumnDef::new(EmployeeKpi::EmployeeId).uuid().not_null())
            .col(ColumnDef::new(EmployeeKpi::KpiId).uuid().not_null())
            .col(ColumnDef::new(EmployeeKpi::Period).date().not_null())
            .col(
                ColumnDef::new(EmployeeKpi::GoalValue)
                    .double()
                    .not_null(),
            )
            .col(&mut status_column())
            .col(ColumnDef::new(EmployeeKpi::ApprovedBy).uuid())
            .col(ColumnDef::new(EmployeeKpi::RejectionReason).text())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_employee_kpi_company")
                    .from(EmployeeKpi::Table, EmployeeKpi::CompanyId)
                    .to(Company::Table, Company::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_employee_kpi_employee")
                    .from(EmployeeKpi::Table, EmployeeKpi::EmployeeId)
                    .to(Employee::Table, Employee::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_employee_kpi_kpi")
                    .from(EmployeeKpi::Table, EmployeeKpi::KpiId)
                    .to(Kpi::Table, Kpi::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned();
        audit_columns(&mut employee_kpi);
        manager.create_table(employee_kpi).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_employee_kpi_unique_period")
                    .table(EmployeeKpi::Table)
                    .col(EmployeeKpi::EmployeeId)
                    .col(EmployeeKpi::KpiId)
                    .col(EmployeeKpi::Period)
                    .unique()
                    .to_owned(),
            )
            .await?;

        let mut employee_evolution = Table::create()
            .table(EmployeeKpiEvolution::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(EmployeeKpiEvolution::Id)
                    .uuid()
                    .not_null()
                    .primary_key()
                    .default(Expr::cust("gen_random_uuid()")),
            )
            .col(
                ColumnDef::new(EmployeeKpiEvolution::EmployeeKpiId)
                    .uuid()
                    .not_null(),
            )
            .col(
                ColumnDef::new(EmployeeKpiEvolution::Period)
                    .date()
                    .not_null(),
            )
            .col(
                ColumnDef::new(EmployeeKpiEvolution::AchievedValue)
                    .double()
                    .not_null(),
            )
            .col(&mut status_column())
            .col(ColumnDef::new(EmployeeKpiEvolution::ApprovedBy).uuid())
            .col(ColumnDef::new(EmployeeKpiEvolution::RejectionReason).text())
            .col(ColumnDef::new(EmployeeKpiEvolution::Notes).text())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_employee_kpi_evolution_parent")
                    .from(
                        EmployeeKpiEvolution::Table,
                        EmployeeKpiEvolution::EmployeeKpiId,
                    )
                    .to(EmployeeKpi::Table, EmployeeKpi::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned();
        audit_columns(&mut employee_evolution);
        manager.create_table(employee_evolution).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_employee_kpi_evolution_unique_period")
                    .table(EmployeeKpiEvolution::Table)
                    .col(EmployeeKpiEvolution::EmployeeKpiId)
                    .col(EmployeeKpiEvolution::Period)
                    .unique()
                    .to_owned(),
            )
            .await?;

        let mut team_kpi = Table::create()
            .table(TeamKpi::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(TeamKpi::Id)
                    .uuid()
                    .not_null()
                    .primary_key()
                    .default(Expr::cust("gen_random_uuid()")),
            )
            .col(ColumnDef::new(TeamKpi::CompanyId).uuid().not_null())
            .col(ColumnDef::new(TeamKpi::TeamId).uuid().not_null())
            .col(ColumnDef::new(TeamKpi::KpiId).uuid().not_null())
            .col(ColumnDef::new(TeamKpi::Period).date().not_null())
            .col(ColumnDef::new(TeamKpi::GoalValue).double().not_null())
            .col(&mut status_column())
            .col(ColumnDef::new(TeamKpi::ApprovedBy).uuid())
            .col(ColumnDef::new(TeamKpi::RejectionReason).text())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_team_kpi_company")
                    .from(TeamKpi::Table, TeamKpi::CompanyId)
                    .to(Company::Table, Company::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_team_kpi_team")
                    .from(TeamKpi::Table, TeamKpi::TeamId)
                    .to(Team::Table, Team::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_team_kpi_kpi")
                    .from(TeamKpi::Table, TeamKpi::KpiId)
                    .to(Kpi::Table, Kpi::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned();
        audit_columns(&mut team_kpi);
        manager.create_table(team_kpi).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_team_kpi_unique_period")
                    .table(TeamKpi::Table)
                    .col(TeamKpi::TeamId)
                    .col(TeamKpi::KpiId)
                    .col(TeamKpi::Period)
                    .unique()
                    .to_owned(),
            )
            .await?;

        let mut team_evolution = Table::create()
            .table(TeamKpiEvolution::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(TeamKpiEvolution::Id)
                    .uuid()
                    .not_null()
                    .primary_key()
                    .default(Expr::cust("gen_random_uuid()")),
            )
            .col(ColumnDef::new(TeamKpiEvolution::TeamKpiId).uuid().not_null())
            .col(ColumnDef::new(TeamKpiEvolution::Period).date().not_null())
            .col(
                ColumnDef::new(TeamKpiEvolution::AchievedValue)
                    .double()
                    .not_null(),
            )
            .col(&mut status_column())
            .col(ColumnDef::new(TeamKpiEvolution::ApprovedBy).uuid())
            .col(ColumnDef::new(TeamKpiEvolution::RejectionReason).text())
            .col(ColumnDef::new(TeamKpiEvolution::Notes).text())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_team_kpi_evolution_parent")
                    .from(TeamKpiEvolution::Table, TeamKpiEvolution::TeamKpiId)
                    .to(TeamKpi::Table, TeamKpi::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned();
        audit_columns(&mut team_evolution);
        manager.create_table(team_evolution).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_team_kpi_evolution_unique_period")
                    .table(TeamKpiEvolution::Table)
                    .col(TeamKpiEvolution::TeamKpiId)
                    .col(TeamKpiEvolution::Period)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            TeamKpiEvolution::Table.into_iden(),
            TeamKpi::Table.into_iden(),
            EmployeeKpiEvolution::Table.into_iden(),
            EmployeeKpi::Table.into_iden(),
            Kpi::Table.into_iden(),
            EvaluationType::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).to_owned())
                .await?;
        }
        manager
            .get_connection()
            .execute_unprepared("DROP TYPE IF EXISTS approval_status;")
            .await?;
        Ok(())
    }
}
