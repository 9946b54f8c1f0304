use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Company {
    Table,
    Id,
    Name,
    LegalName,
    Website,
    Phone,
}

#[derive(DeriveIden)]
enum Branch {
    Table,
    Id,
    CompanyId,
    Name,
    Address,
    Phone,
}

#[derive(DeriveIden)]
enum Department {
    Table,
    Id,
    CompanyId,
    BranchId,
    Name,
}

#[derive(DeriveIden)]
enum RoleType {
    Table,
    Id,
    CompanyId,
    Name,
    Description,
}

#[derive(DeriveIden)]
enum Role {
    Table,
    Id,
    CompanyId,
    RoleTypeId,
    Name,
    Description,
}

#[derive(DeriveIden)]
enum Person {
    Table,
    Id,
    CompanyId,
    FirstName,
    LastName,
    Email,
    Phone,
    BirthDate,
}

#[derive(DeriveIden)]
enum Employee {
    Table,
    Id,
    CompanyId,
    PersonId,
    BranchId,
    DepartmentId,
    RoleId,
    HireDate,
    IsActive,
}

/// Audit + soft-delete columns shared by every tenant-owned table.
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

fn uuid_pk<T: Iden + 'static>(col: T) -> ColumnDef {
    let mut def = ColumnDef::new(col);
    def.uuid()
        .not_null()
        .primary_key()
        .default(Expr::cust("gen_random_uuid()"));
    def
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut company = Table::create()
            .table(Company::Table)
            .if_not_exists()
            .col(&mut uuid_pk(Company::Id))
            .col(
                ColumnDef::new(Company::Name)
                    .string_len(256)
                    .not_null()
                    .unique_key(),
            )
            .col(ColumnDef::new(Company::LegalName).string_len(256))
            .col(ColumnDef::new(Company::Website).string_len(512))
            .col(ColumnDef::new(Company::Phone).string_len(64))
            .to_owned();
        audit_columns(&mut company);
        manager.create_table(company).await?;

        let mut branch = Table::create()
            .table(Branch::Table)
            .if_not_exists()
            .col(&mut uuid_pk(Branch::Id))
            .col(ColumnDef::new(Branch::CompanyId).uuid().not_null())
            .col(ColumnDef::new(Branch::Name).string_len(256).not_null())
            .col(ColumnDef::new(Branch::Address).string_len(512))
            .col(ColumnDef::new(Branch::Phone).string_len(64))
            .foreign_key(
                ForeignKey::create()
                    .name("fk_branch_company")
                    .from(Branch::Table, Branch::CompanyId)
                    .to(Company::Table, Company::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned();
        audit_columns(&mut branch);
        manager.create_table(branch).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_branch_company")
                    .table(Branch::Table)
                    .col(Branch::CompanyId)
                    .to_owned(),
            )
            .await?;

        let mut department = Table::create()
            .table(Department::Table)
            .if_not_exists()
            .col(&mut uuid_pk(Department::Id))
            .col(ColumnDef::new(Department::CompanyId).uuid().not_null())
            .col(ColumnDef::new(Department::BranchId).uuid())
            .col(ColumnDef::new(Department::Name).string_len(256).not_null())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_department_company")
                    .from(Department::Table, Department::CompanyId)
                    .to(Company::Table, Company::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_department_branch")
                    .from(Department::Table, Department::BranchId)
                    .to(Branch::Table, Branch::Id)
                    .on_delete(ForeignKeyAction::SetNull),
            )
            .to_owned();
        audit_columns(&mut department);
        manager.create_table(department).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_department_company")
                    .table(Department::Table)
                    .col(Department::CompanyId)
                    .to_owned(),
            )
            .await?;

        let mut role_type = Table::create()
            .table(RoleType::Table)
            .if_not_exists()
            .col(&mut uuid_pk(RoleType::Id))
            .col(ColumnDef::new(RoleType::CompanyId).uuid().not_null())
            .col(ColumnDef::new(RoleType::Name).string_len(256).not_null())
            .col(ColumnDef::new(RoleType::Description).text())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_role_type_company")
                    .from(RoleType::Table, RoleType::CompanyId)
                    .to(Company::Table, Company::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned();
        audit_columns(&mut role_type);
        manager.create_table(role_type).await?;

        let mut role = Table::create()
            .table(Role::Table)
            .if_not_exists()
            .col(&mut uuid_pk(Role::Id))
            .col(ColumnDef::new(Role::CompanyId).uuid().not_null())
            .col(ColumnDef::new(Role::RoleTypeId).uuid().not_null())
            .col(ColumnDef::new(Role::Name).string_len(256).not_null())
            .col(ColumnDef::new(Role::Description).text())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_role_company")
                    .from(Role::Table, Role::CompanyId)
                    .to(Company::Table, Company::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_role_role_type")
                    .from(Role::Table, Role::RoleTypeId)
                    .to(RoleType::Table, RoleType::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned();
        audit_columns(&mut role);
        manager.create_table(role).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_role_company")
                    .table(Role::Table)
                    .col(Role::CompanyId)
                    .to_owned(),
            )
            .await?;

        let mut person = Table::create()
            .table(Person::Table)
            .if_not_exists()
            .col(&mut uuid_pk(Person::Id))
            .col(ColumnDef::new(Person::CompanyId).uuid().not_null())
            .col(ColumnDef::new(Person::FirstName).string_len(128).not_null())
            .col(ColumnDef::new(Person::LastName).string_len(128).not_null())
            .col(ColumnDef::new(Person::Email).string_len(320).not_null())
            .col(ColumnDef::new(Person::Phone).string_len(64))
            .col(ColumnDef::new(Person::BirthDate).date())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_person_company")
                    .from(Person::Table, Person::CompanyId)
                    .to(Company::Table, Company::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .to_owned();
        audit_columns(&mut person);
        manager.create_table(person).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_person_company_email")
                    .table(Person::Table)
                    .col(Person::CompanyId)
                    .col(Person::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        let mut employee = Table::create()
            .table(Employee::Table)
            .if_not_exists()
            .col(&mut uuid_pk(Employee::Id))
            .col(ColumnDef::new(Employee::CompanyId).uuid().not_null())
            .col(
                ColumnDef::new(Employee::PersonId)
                    .uuid()
                    .not_null()
                    .unique_key(),
            )
            .col(ColumnDef::new(Employee::BranchId).uuid().not_null())
            .col(ColumnDef::new(Employee::DepartmentId).uuid())
            .col(ColumnDef::new(Employee::RoleId).uuid().not_null())
            .col(ColumnDef::new(Employee::HireDate).date().not_null())
            .col(
                ColumnDef::new(Employee::IsActive)
                    .boolean()
                    .not_null()
                    .default(true),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_employee_company")
                    .from(Employee::Table, Employee::CompanyId)
                    .to(Company::Table, Company::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_employee_person")
                    .from(Employee::Table, Employee::PersonId)
                    .to(Person::Table, Person::Id)
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_employee_branch")
                    .from(Employee::Table, Employee::BranchId)
                    .to(Branch::Table, Branch::Id),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_employee_department")
                    .from(Employee::Table, Employee::DepartmentId)
                    .to(Department::Table, Department::Id)
                    .on_delete(ForeignKeyAction::SetNull),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_employee_role")
                    .from(Employee::Table, Employee::RoleId)
                    .to(Role::Table, Role::Id),
            )
            .to_owned();
        audit_columns(&mut employee);
        manager.create_table(employee).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_employee_company")
                    .table(Employee::Table)
                    .col(Employee::CompanyId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            Employee::Table.into_iden(),
            Person::Table.into_iden(),
            Role::Table.into_iden(),
            RoleType::Table.into_iden(),
            Department::Table.into_iden(),
            Branch::Table.into_iden(),
            Company::Table.into_iden(),
        ] {
            manager
                .drop_table(Table::drop().table(table).to_owned())
                .await?;
        }
        Ok(())
    }
}
