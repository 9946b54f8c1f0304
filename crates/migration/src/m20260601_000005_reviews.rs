use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum CareerPath {
    Table,
    Id,
    CompanyId,
    EmployeeId,
    TargetRoleId,
    StartsOn,
    Notes,
}

#[derive(DeriveIden)]
enum PerformanceReview {
    Table,
    Id,
    CompanyId,
    EmployeeId,
    ReviewerId,
    Period,
    Score,
    Comments,
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
enum Role {
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
        let mut career_path = Table::create()
            .table(CareerPath::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(CareerPath::Id)
                    .uuid()
                    .not_null()
                    .primary_key()
                    .default(Expr::cust("gen_random_uuid()")),
            )
            .col(ColumnDef::new(CareerPath::CompanyId).uuid().not_null())
            .col(ColumnDef::new(CareerPath::EmployeeId).uuid().not_null())
            .col(ColumnDef::new(CareerPath::TargetRoleId).uuid().not_null())
            .col(ColumnDef::new(CareerPath::StartsOn).date().not_null())
            .col(ColumnDef::new(CareerPath::Notes).text())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_career_path_company")
                    .from(CareerPath::Table, CareerPath::CompanyId)
                    .to(Company::Table, Company::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_career_path_employee")
                    .from(CareerPath::Table, CareerPath::EmployeeId)
                    .to(Employee::Table, Employee::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_career_path_role")
                    .from(CareerPath::Table, CareerPath::TargetRoleId)
                    .to(Role::Table, Role::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned();
        audit_columns(&mut career_path);
        manager.create_table(career_path).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_career_path_employee")
                    .table(CareerPath::Table)
                    .col(CareerPath::EmployeeId)
                    .to_owned(),
            )
            .await?;

        let mut review = Table::create()
            .table(PerformanceReview::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(PerformanceReview::Id)
                    .uuid()
                    .not_null()
                    .primary_key()
                    .default(Expr::cust("gen_random_uuid()")),
            )
            .col(ColumnDef::new(PerformanceReview::CompanyId).uuid().not_null())
            .col(
                ColumnDef::new(PerformanceReview::EmployeeId)
                    .uuid()
                    .not_null(),
            )
            .col(
                ColumnDef::new(PerformanceReview::ReviewerId)
                    .uuid()
                    .not_null(),
            )
            .col(ColumnDef::new(PerformanceReview::Period).date().not_null())
            .col(
                ColumnDef::new(PerformanceReview::Score)
                    .small_integer()
                    .not_null(),
            )
            .col(ColumnDef::new(PerformanceReview::Comments).text())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_performance_review_company")
                    .from(PerformanceReview::Table, PerformanceReview::CompanyId)
                    .to(Company::Table, Company::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_performance_review_employee")
                    .from(PerformanceReview::Table, PerformanceReview::EmployeeId)
                    .to(Employee::Table, Employee::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_performance_review_reviewer")
                    .from(PerformanceReview::Table, PerformanceReview::ReviewerId)
                    .to(Employee::Table, Employee::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned();
        audit_columns(&mut review);
        manager.create_table(review).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_performance_review_employee_period")
                    .table(PerformanceReview::Table)
                    .col(PerformanceReview::EmployeeId)
                    .col(PerformanceReview::Period)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PerformanceReview::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CareerPath::Table).to_owned())
            .await?;
        Ok(())
    }
}
