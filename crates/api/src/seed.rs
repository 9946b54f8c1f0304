use chrono::{NaiveDate, Utc};
use entity::approval::Status;
use entity::{
    app_user, branch, career_path, company, department, employee, employee_kpi,
    employee_kpi_evolution, evaluation_type, kpi, performance_review, person, role, role_type,
    team, team_kpi, team_kpi_evolution, team_member, user_role, user_secret,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter,
};
use uuid::Uuid;

use crate::{auth, rating};

/// Handles to the seeded demo records, mirrored back to the caller so the
/// seed command can print credentials and tests can drive the same data.
#[derive(Debug, Clone)]
pub struct SeededRecords {
    pub users: Vec<app_user::Model>,
    pub companies: Vec<company::Model>,
    pub employees: Vec<employee::Model>,
    pub kpis: Vec<kpi::Model>,
    pub employee_kpis: Vec<employee_kpi::Model>,
    pub team_kpis: Vec<team_kpi::Model>,
}

impl SeededRecords {
    pub fn user_email(&self, email: &str) -> Option<&app_user::Model> {
        self.users.iter().find(|u| u.email == email)
    }

    pub fn company_named(&self, name: &str) -> Option<&company::Model> {
        self.companies.iter().find(|c| c.name == name)
    }
}

pub async fn seed_demo(db: &DatabaseConnection) -> Result<SeededRecords, DbErr> {
    ensure_evaluation_types(db).await?;
    let seeded_at: DateTimeWithTimeZone = Utc::now().into();

    let acme = insert_company(db, "ACME Industries", "https://acme.test", seeded_at).await?;
    let nimbus = insert_company(db, "Nimbus Analytics", "https://nimbus.test", seeded_at).await?;

    let owner = insert_seed_user(
        db,
        "owner@kpisuite.test",
        "Owner One",
        None,
        &[user_role::Role::Owner, user_role::Role::Admin],
        "ownerpass",
    )
    .await?;
    let admin = insert_seed_user(
        db,
        "admin@acme.test",
        "Admin Ada",
        Some(acme.id),
        &[user_role::Role::Admin],
        "adminpass",
    )
    .await?;
    let manager = insert_seed_user(
        db,
        "manager@acme.test",
        "Manager Mae",
        Some(acme.id),
        &[user_role::Role::Manager],
        "managerpass",
    )
    .await?;
    let member = insert_seed_user(
        db,
        "member@acme.test",
        "Member Mo",
        Some(acme.id),
        &[user_role::Role::Member],
        "memberpass",
    )
    .await?;

    let hq = branch::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(acme.id),
        name: Set("Headquarters".into()),
        address: Set(Some("1 Main St".into())),
        phone: Set(Some("+1-555-0100".into())),
        created_by: Set(Some(owner.id)),
        updated_by: Set(Some(owner.id)),
        created_at: Set(seeded_at),
        updated_at: Set(seeded_at),
        deleted_at: Set(None),
        deleted_by: Set(None),
    }
    .insert(db)
    .await?;

    let engineering = department::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(acme.id),
        branch_id: Set(Some(hq.id)),
        name: Set("Engineering".into()),
        created_by: Set(Some(owner.id)),
        updated_by: Set(Some(owner.id)),
        created_at: Set(seeded_at),
        updated_at: Set(seeded_at),
        deleted_at: Set(None),
        deleted_by: Set(None),
    }
    .insert(db)
    .await?;

    let technical = role_type::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(acme.id),
        name: Set("Technical".into()),
        description: Set(Some("Hands-on engineering roles".into())),
        created_by: Set(Some(owner.id)),
        updated_by: Set(Some(owner.id)),
        created_at: Set(seeded_at),
        updated_at: Set(seeded_at),
        deleted_at: Set(None),
        deleted_by: Set(None),
    }
    .insert(db)
    .await?;

    let engineer = insert_role(db, acme.id, technical.id, "Software Engineer", owner.id).await?;
    let senior = insert_role(db, acme.id, technical.id, "Senior Engineer", owner.id).await?;

    let ada = insert_employee(
        db,
        acme.id,
        hq.id,
        Some(engineering.id),
        engineer.id,
        "Ada",
        "Lovelace",
        "ada@acme.test",
        naive_date(2023, 2, 1),
        owner.id,
    )
    .await?;
    let grace = insert_employee(
        db,
        acme.id,
        hq.id,
        Some(engineering.id),
        senior.id,
        "Grace",
        "Hopper",
        "grace@acme.test",
        naive_date(2022, 6, 15),
        owner.id,
    )
    .await?;
    let linus = insert_employee(
        db,
        acme.id,
        hq.id,
        None,
        engineer.id,
        "Linus",
        "Torvalds",
        "linus@acme.test",
        naive_date(2024, 1, 8),
        owner.id,
    )
    .await?;

    let platform_team = team::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(acme.id),
        name: Set("Platform".into()),
        parent_team_id: Set(None),
        lead_employee_id: Set(Some(grace.id)),
        created_by: Set(Some(owner.id)),
        updated_by: Set(Some(owner.id)),
        created_at: Set(seeded_at),
        updated_at: Set(seeded_at),
        deleted_at: Set(None),
        deleted_by: Set(None),
    }
    .insert(db)
    .await?;
    for employee_id in [ada.id, linus.id] {
        team_member::ActiveModel {
            id: Set(Uuid::new_v4()),
            team_id: Set(platform_team.id),
            employee_id: Set(employee_id),
            joined_on: Set(naive_date(2024, 3, 1)),
            created_by: Set(Some(owner.id)),
            updated_by: Set(Some(owner.id)),
            created_at: Set(seeded_at),
            updated_at: Set(seeded_at),
            deleted_at: Set(None),
            deleted_by: Set(None),
        }
        .insert(db)
        .await?;
    }

    let deploys = insert_kpi(
        db,
        acme.id,
        "Monthly deployments",
        rating::HIGHER_BETTER_SUM,
        Some("count"),
        owner.id,
    )
    .await?;
    let escaped_bugs = insert_kpi(
        db,
        acme.id,
        "Escaped defect rate",
        rating::LOWER_BETTER_PCT,
        Some("%"),
        owner.id,
    )
    .await?;

    let draft_assignment = insert_employee_kpi(
        db,
        acme.id,
        ada.id,
        deploys.id,
        naive_date(2025, 1, 1),
        8.0,
        Status::Draft,
        None,
        owner.id,
    )
    .await?;
    let submitted_assignment = insert_employee_kpi(
        db,
        acme.id,
        grace.id,
        deploys.id,
        naive_date(2025, 1, 1),
        12.0,
        Status::Submitted,
        None,
        owner.id,
    )
    .await?;
    let approved_assignment = insert_employee_kpi(
        db,
        acme.id,
        ada.id,
        escaped_bugs.id,
        naive_date(2025, 1, 1),
        2.5,
        Status::Approved,
        Some(manager.id),
        owner.id,
    )
    .await?;

    for (period, achieved, status) in [
        (naive_date(2025, 1, 1), 1.9, Status::Approved),
        (naive_date(2025, 2, 1), 3.1, Status::Submitted),
        (naive_date(2025, 3, 1), 2.2, Status::Draft),
    ] {
        employee_kpi_evolution::ActiveModel {
            id: Set(Uuid::new_v4()),
            employee_kpi_id: Set(approved_assignment.id),
            period: Set(period),
            achieved_value: Set(achieved),
            status: Set(status),
            approved_by: Set(match status {
                Status::Approved => Some(manager.id),
                _ => None,
            }),
            rejection_reason: Set(None),
            notes: Set(None),
            created_by: Set(Some(member.id)),
            updated_by: Set(Some(member.id)),
            created_at: Set(seeded_at),
            updated_at: Set(seeded_at),
            deleted_at: Set(None),
            deleted_by: Set(None),
        }
        .insert(db)
        .await?;
    }

    let team_assignment = team_kpi::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(acme.id),
        team_id: Set(platform_team.id),
        kpi_id: Set(deploys.id),
        period: Set(naive_date(2025, 1, 1)),
        goal_value: Set(30.0),
        status: Set(Status::Submitted),
        approved_by: Set(None),
        rejection_reason: Set(None),
        created_by: Set(Some(manager.id)),
        updated_by: Set(Some(manager.id)),
        created_at: Set(seeded_at),
        updated_at: Set(seeded_at),
        deleted_at: Set(None),
        deleted_by: Set(None),
    }
    .insert(db)
    .await?;
    team_kpi_evolution::ActiveModel {
        id: Set(Uuid::new_v4()),
        team_kpi_id: Set(team_assignment.id),
        period: Set(naive_date(2025, 1, 1)),
        achieved_value: Set(33.0),
        status: Set(Status::Draft),
        approved_by: Set(None),
        rejection_reason: Set(None),
        notes: Set(Some("Strong start to the quarter.".into())),
        created_by: Set(Some(member.id)),
        updated_by: Set(Some(member.id)),
        created_at: Set(seeded_at),
        updated_at: Set(seeded_at),
        deleted_at: Set(None),
        deleted_by: Set(None),
    }
    .insert(db)
    .await?;

    career_path::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(acme.id),
        employee_id: Set(ada.id),
        target_role_id: Set(senior.id),
        starts_on: Set(naive_date(2025, 6, 1)),
        notes: Set(Some("Promotion track after two approved quarters.".into())),
        created_by: Set(Some(manager.id)),
        updated_by: Set(Some(manager.id)),
        created_at: Set(seeded_at),
        updated_at: Set(seeded_at),
        deleted_at: Set(None),
        deleted_by: Set(None),
    }
    .insert(db)
    .await?;

    performance_review::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(acme.id),
        employee_id: Set(ada.id),
        reviewer_id: Set(grace.id),
        period: Set(naive_date(2025, 1, 1)),
        score: Set(87),
        comments: Set(Some("Consistently ships ahead of schedule.".into())),
        created_by: Set(Some(manager.id)),
        updated_by: Set(Some(manager.id)),
        created_at: Set(seeded_at),
        updated_at: Set(seeded_at),
        deleted_at: Set(None),
        deleted_by: Set(None),
    }
    .insert(db)
    .await?;

    // A second, minimal tenant so isolation is demonstrable out of the box.
    let nimbus_branch = branch::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(nimbus.id),
        name: Set("Main Office".into()),
        address: Set(None),
        phone: Set(None),
        created_by: Set(Some(owner.id)),
        updated_by: Set(Some(owner.id)),
        created_at: Set(seeded_at),
        updated_at: Set(seeded_at),
        deleted_at: Set(None),
        deleted_by: Set(None),
    }
    .insert(db)
    .await?;
    let nimbus_type = role_type::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(nimbus.id),
        name: Set("Analytics".into()),
        description: Set(None),
        created_by: Set(Some(owner.id)),
        updated_by: Set(Some(owner.id)),
        created_at: Set(seeded_at),
        updated_at: Set(seeded_at),
        deleted_at: Set(None),
        deleted_by: Set(None),
    }
    .insert(db)
    .await?;
    let analyst = insert_role(db, nimbus.id, nimbus_type.id, "Analyst", owner.id).await?;
    insert_employee(
        db,
        nimbus.id,
        nimbus_branch.id,
        None,
        analyst.id,
        "Margaret",
        "Hamilton",
        "margaret@nimbus.test",
        naive_date(2024, 9, 2),
        owner.id,
    )
    .await?;
    insert_seed_user(
        db,
        "admin@nimbus.test",
        "Nimbus Admin",
        Some(nimbus.id),
        &[user_role::Role::Admin],
        "nimbuspass",
    )
    .await?;

    Ok(SeededRecords {
        users: vec![owner, admin, manager, member],
        companies: vec![acme, nimbus],
        employees: vec![ada, grace, linus],
        kpis: vec![deploys, escaped_bugs],
        employee_kpis: vec![draft_assignment, submitted_assignment, approved_assignment],
        team_kpis: vec![team_assignment],
    })
}

const EVALUATION_TYPES: [(&str, &str); 5] = [
    (rating::BINARY, "Binary"),
    (rating::HIGHER_BETTER_SUM, "Higher is better (sum)"),
    (rating::HIGHER_BETTER_PCT, "Higher is better (%)"),
    (rating::LOWER_BETTER_SUM, "Lower is better (sum)"),
    (rating::LOWER_BETTER_PCT, "Lower is better (%)"),
];

async fn ensure_evaluation_types(db: &DatabaseConnection) -> Result<(), DbErr> {
    for (code, name) in EVALUATION_TYPES {
        let existing = evaluation_type::Entity::find()
            .filter(evaluation_type::Column::Code.eq(code))
            .one(db)
            .await?;
        if existing.is_none() {
            evaluation_type::ActiveModel {
                id: Set(Uuid::new_v4()),
                code: Set(code.to_string()),
                name: Set(name.to_string()),
                description: Set(None),
                created_at: Set(Utc::now().into()),
            }
            .insert(db)
            .await?;
        }
    }
    Ok(())
}

async fn evaluation_type_id(db: &DatabaseConnection, code: &str) -> Result<Uuid, DbErr> {
    evaluation_type::Entity::find()
        .filter(evaluation_type::Column::Code.eq(code))
        .one(db)
        .await?
        .map(|row| row.id)
        .ok_or_else(|| DbErr::Custom(format!("missing evaluation type {}", code)))
}

async fn insert_company(
    db: &DatabaseConnection,
    name: &str,
    website: &str,
    now: DateTimeWithTimeZone,
) -> Result<company::Model, DbErr> {
    company::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        legal_name: Set(Some(format!("{}, Inc.", name))),
        website: Set(Some(website.to_string())),
        phone: Set(None),
        created_by: Set(None),
        updated_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        deleted_by: Set(None),
    }
    .insert(db)
    .await
}

async fn insert_seed_user(
    db: &DatabaseConnection,
    email: &str,
    display_name: &str,
    company_id: Option<Uuid>,
    roles: &[user_role::Role],
    password: &str,
) -> Result<app_user::Model, DbErr> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = app_user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        display_name: Set(display_name.to_string()),
        company_id: Set(company_id),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    user_secret::ActiveModel {
        user_id: Set(model.id),
        password_hash: Set(auth::hash_password(password)
            .map_err(|err| DbErr::Custom(err.to_string()))?),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    for role in roles {
        user_role::ActiveModel {
            user_id: Set(model.id),
            role: Set(*role),
        }
        .insert(db)
        .await?;
    }
    Ok(model)
}

async fn insert_role(
    db: &DatabaseConnection,
    company_id: Uuid,
    role_type_id: Uuid,
    name: &str,
    actor: Uuid,
) -> Result<role::Model, DbErr> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    role::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(company_id),
        role_type_id: Set(role_type_id),
        name: Set(name.to_string()),
        description: Set(None),
        created_by: Set(Some(actor)),
        updated_by: Set(Some(actor)),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        deleted_by: Set(None),
    }
    .insert(db)
    .await
}

#[allow(clippy::too_many_arguments)]
async fn insert_employee(
    db: &DatabaseConnection,
    company_id: Uuid,
    branch_id: Uuid,
    department_id: Option<Uuid>,
    role_id: Uuid,
    first_name: &str,
    last_name: &str,
    email: &str,
    hire_date: NaiveDate,
    actor: Uuid,
) -> Result<employee::Model, DbErr> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let person = person::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(company_id),
        first_name: Set(first_name.to_string()),
        last_name: Set(last_name.to_string()),
        email: Set(email.to_string()),
        phone: Set(None),
        birth_date: Set(None),
        created_by: Set(Some(actor)),
        updated_by: Set(Some(actor)),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        deleted_by: Set(None),
    }
    .insert(db)
    .await?;
    employee::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(company_id),
        person_id: Set(person.id),
        branch_id: Set(branch_id),
        department_id: Set(department_id),
        role_id: Set(role_id),
        hire_date: Set(hire_date),
        is_active: Set(true),
        created_by: Set(Some(actor)),
        updated_by: Set(Some(actor)),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        deleted_by: Set(None),
    }
    .insert(db)
    .await
}

async fn insert_kpi(
    db: &DatabaseConnection,
    company_id: Uuid,
    name: &str,
    evaluation_code: &str,
    unit: Option<&str>,
    actor: Uuid,
) -> Result<kpi::Model, DbErr> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let evaluation_type_id = evaluation_type_id(db, evaluation_code).await?;
    kpi::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(company_id),
        name: Set(name.to_string()),
        description: Set(None),
        evaluation_type_id: Set(evaluation_type_id),
        unit: Set(unit.map(|u| u.to_string())),
        created_by: Set(Some(actor)),
        updated_by: Set(Some(actor)),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        deleted_by: Set(None),
    }
    .insert(db)
    .await
}

#[allow(clippy::too_many_arguments)]
async fn insert_employee_kpi(
    db: &DatabaseConnection,
    company_id: Uuid,
    employee_id: Uuid,
    kpi_id: Uuid,
    period: NaiveDate,
    goal_value: f64,
    status: Status,
    approved_by: Option<Uuid>,
    actor: Uuid,
) -> Result<employee_kpi::Model, DbErr> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    employee_kpi::ActiveModel {
        id: Set(Uuid::new_v4()),
        company_id: Set(company_id),
        employee_id: Set(employee_id),
        kpi_id: Set(kpi_id),
        period: Set(period),
        goal_value: Set(goal_value),
        status: Set(status),
        approved_by: Set(approved_by),
        rejection_reason: Set(None),
        created_by: Set(Some(actor)),
        updated_by: Set(Some(actor)),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
        deleted_by: Set(None),
    }
    .insert(db)
    .await
}

fn naive_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid seed date")
}
