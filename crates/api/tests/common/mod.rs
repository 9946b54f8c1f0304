use std::sync::Arc;

use api::{
    auth::AuthConfig,
    build_router,
    seed::{seed_demo, SeededRecords},
    AppState,
};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};
use serde_json::Value;
use tower::ServiceExt;

pub struct TestContext {
    pub db: Arc<DatabaseConnection>,
    pub router: Router,
    pub seeded: SeededRecords,
}

impl TestContext {
    pub async fn new() -> Self {
        let conn = Database::connect("sqlite::memory:").await.unwrap();
        bootstrap_sqlite(&conn).await;
        let db = Arc::new(conn);
        let seeded = seed_demo(db.as_ref()).await.unwrap();
        let auth = Arc::new(AuthConfig {
            jwt_secret: "test-secret".into(),
            session_ttl_minutes: 30,
        });
        let state = AppState {
            db: db.clone(),
            auth,
        };
        let router = build_router(state);
        Self { db, router, seeded }
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/auth/login",
                None,
                Some(serde_json::json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {:?}", body);
        body["token"].as_str().unwrap().to_string()
    }
}

const AUDIT_COLS: &str = "created_by TEXT,
    updated_by TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT,
    deleted_by TEXT";

async fn exec(db: &DatabaseConnection, sql: String) {
    db.execute(Statement::from_string(DatabaseBackend::Sqlite, sql))
        .await
        .unwrap();
}

pub async fn bootstrap_sqlite(db: &DatabaseConnection) {
    exec(db, "PRAGMA foreign_keys = ON;".to_string()).await;

    exec(
        db,
        r#"
        CREATE TABLE app_user (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            display_name TEXT NOT NULL,
            company_id TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#
        .to_string(),
    )
    .await;

    exec(
        db,
        r#"
        CREATE TABLE user_role (
            user_id TEXT NOT NULL,
            role TEXT NOT NULL,
            PRIMARY KEY (user_id, role),
            FOREIGN KEY(user_id) REFERENCES app_user(id) ON DELETE CASCADE
        );
        "#
        .to_string(),
    )
    .await;

    exec(
        db,
        r#"
        CREATE TABLE user_secret (
            user_id TEXT PRIMARY KEY,
            password_hash TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES app_user(id) ON DELETE CASCADE
        );
        "#
        .to_string(),
    )
    .await;

    exec(
        db,
        format!(
            r#"
        CREATE TABLE company (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            legal_name TEXT,
            website TEXT,
            phone TEXT,
            {AUDIT_COLS}
        );
        "#
        ),
    )
    .await;

    exec(
        db,
        format!(
            r#"
        CREATE TABLE branch (
            id TEXT PRIMARY KEY,
            company_id TEXT NOT NULL,
            name TEXT NOT NULL,
            address TEXT,
            phone TEXT,
            {AUDIT_COLS},
            FOREIGN KEY(company_id) REFERENCES company(id) ON DELETE CASCADE
        );
        "#
        ),
    )
    .await;

    exec(
        db,
        format!(
            r#"
        CREATE TABLE department (
            id TEXT PRIMARY KEY,
            company_id TEXT NOT NULL,
            branch_id TEXT,
            name TEXT NOT NULL,
            {AUDIT_COLS},
            FOREIGN KEY(company_id) REFERENCES company(id) ON DELETE CASCADE,
            FOREIGN KEY(branch_id) REFERENCES branch(id) ON DELETE SET NULL
        );
        "#
        ),
    )
    .await;

    exec(
        db,
        format!(
            r#"
        CREATE TABLE role_type (
            id TEXT PRIMARY KEY,
            company_id TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            {AUDIT_COLS},
            FOREIGN KEY(company_id) REFERENCES company(id) ON DELETE CASCADE
        );
        "#
        ),
    )
    .await;

    exec(
        db,
        format!(
            r#"
        CREATE TABLE role (
            id TEXT PRIMARY KEY,
            company_id TEXT NOT NULL,
            role_type_id TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            {AUDIT_COLS},
            FOREIGN KEY(company_id) REFERENCES company(id) ON DELETE CASCADE,
            FOREIGN KEY(role_type_id) REFERENCES role_type(id) ON DELETE CASCADE
        );
        "#
        ),
    )
    .await;

    exec(
        db,
        format!(
            r#"
        CREATE TABLE person (
            id TEXT PRIMARY KEY,
            company_id TEXT NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT,
            birth_date TEXT,
            {AUDIT_COLS},
            FOREIGN KEY(company_id) REFERENCES company(id) ON DELETE CASCADE
        );
        "#
        ),
    )
    .await;

    exec(
        db,
        format!(
            r#"
        CREATE TABLE employee (
            id TEXT PRIMARY KEY,
            company_id TEXT NOT NULL,
            person_id TEXT NOT NULL UNIQUE,
            branch_id TEXT NOT NULL,
            department_id TEXT,
            role_id TEXT NOT NULL,
            hire_date TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            {AUDIT_COLS},
            FOREIGN KEY(company_id) REFERENCES company(id) ON DELETE CASCADE,
            FOREIGN KEY(person_id) REFERENCES person(id) ON DELETE CASCADE,
            FOREIGN KEY(branch_id) REFERENCES branch(id),
            FOREIGN KEY(department_id) REFERENCES department(id) ON DELETE SET NULL,
            FOREIGN KEY(role_id) REFERENCES role(id)
        );
        "#
        ),
    )
    .await;

    exec(
        db,
        format!(
            r#"
        CREATE TABLE team (
            id TEXT PRIMARY KEY,
            company_id TEXT NOT NULL,
            name TEXT NOT NULL,
            parent_team_id TEXT,
            lead_employee_id TEXT,
            {AUDIT_COLS},
            FOREIGN KEY(company_id) REFERENCES company(id) ON DELETE CASCADE,
            FOREIGN KEY(parent_team_id) REFERENCES team(id) ON DELETE SET NULL,
            FOREIGN KEY(lead_employee_id) REFERENCES employee(id) ON DELETE SET NULL
        );
        "#
        ),
    )
    .await;

    exec(
        db,
        format!(
            r#"
        CREATE TABLE team_member (
            id TEXT PRIMARY KEY,
            team_id TEXT NOT NULL,
            employee_id TEXT NOT NULL,
            joined_on TEXT NOT NULL,
            {AUDIT_COLS},
            FOREIGN KEY(team_id) REFERENCES team(id) ON DELETE CASCADE,
            FOREIGN KEY(employee_id) REFERENCES employee(id) ON DELETE CASCADE
        );
        "#
        ),
    )
    .await;

    exec(
        db,
        r#"
        CREATE TABLE evaluation_type (
            id TEXT PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            description TEXT,
            created_at TEXT NOT NULL
        );
        "#
        .to_string(),
    )
    .await;

    exec(
        db,
        format!(
            r#"
        CREATE TABLE kpi (
            id TEXT PRIMARY KEY,
            company_id TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT,
            evaluation_type_id TEXT NOT NULL,
            unit TEXT,
            {AUDIT_COLS},
            FOREIGN KEY(company_id) REFERENCES company(id) ON DELETE CASCADE,
            FOREIGN KEY(evaluation_type_id) REFERENCES evaluation_type(id)
        );
        "#
        ),
    )
    .await;

    exec(
        db,
        format!(
            r#"
        CREATE TABLE employee_kpi (
            id TEXT PRIMARY KEY,
            company_id TEXT NOT NULL,
            employee_id TEXT NOT NULL,
            kpi_id TEXT NOT NULL,
            period TEXT NOT NULL,
            goal_value REAL NOT NULL,
            status TEXT NOT NULL DEFAULT 'DRAFT',
            approved_by TEXT,
            rejection_reason TEXT,
            {AUDIT_COLS},
            FOREIGN KEY(company_id) REFERENCES company(id) ON DELETE CASCADE,
            FOREIGN KEY(employee_id) REFERENCES employee(id) ON DELETE CASCADE,
            FOREIGN KEY(kpi_id) REFERENCES kpi(id) ON DELETE CASCADE
        );
        "#
        ),
    )
    .await;

    exec(
        db,
        format!(
            r#"
        CREATE TABLE employee_kpi_evolution (
            id TEXT PRIMARY KEY,
            employee_kpi_id TEXT NOT NULL,
            period TEXT NOT NULL,
            achieved_value REAL NOT NULL,
            status TEXT NOT NULL DEFAULT 'DRAFT',
            approved_by TEXT,
            rejection_reason TEXT,
            notes TEXT,
            {AUDIT_COLS},
            FOREIGN KEY(employee_kpi_id) REFERENCES employee_kpi(id) ON DELETE CASCADE
        );
        "#
        ),
    )
    .await;

    exec(
        db,
        format!(
            r#"
        CREATE TABLE team_kpi (
            id TEXT PRIMARY KEY,
            company_id TEXT NOT NULL,
            team_id TEXT NOT NULL,
            kpi_id TEXT NOT NULL,
            period TEXT NOT NULL,
            goal_value REAL NOT NULL,
            status TEXT NOT NULL DEFAULT 'DRAFT',
            approved_by TEXT,
            rejection_reason TEXT,
            {AUDIT_COLS},
            FOREIGN KEY(company_id) REFERENCES company(id) ON DELETE CASCADE,
            FOREIGN KEY(team_id) REFERENCES team(id) ON DELETE CASCADE,
            FOREIGN KEY(kpi_id) REFERENCES kpi(id) ON DELETE CASCADE
        );
        "#
        ),
    )
    .await;

    exec(
        db,
        format!(
            r#"
        CREATE TABLE team_kpi_evolution (
            id TEXT PRIMARY KEY,
            team_kpi_id TEXT NOT NULL,
            period TEXT NOT NULL,
            achieved_value REAL NOT NULL,
            status TEXT NOT NULL DEFAULT 'DRAFT',
            approved_by TEXT,
            rejection_reason TEXT,
            notes TEXT,
            {AUDIT_COLS},
            FOREIGN KEY(team_kpi_id) REFERENCES team_kpi(id) ON DELETE CASCADE
        );
        "#
        ),
    )
    .await;

    exec(
        db,
        format!(
            r#"
        CREATE TABLE career_path (
            id TEXT PRIMARY KEY,
            company_id TEXT NOT NULL,
            employee_id TEXT NOT NULL,
            target_role_id TEXT NOT NULL,
            starts_on TEXT NOT NULL,
            notes TEXT,
            {AUDIT_COLS},
            FOREIGN KEY(company_id) REFERENCES company(id) ON DELETE CASCADE,
            FOREIGN KEY(employee_id) REFERENCES employee(id) ON DELETE CASCADE,
            FOREIGN KEY(target_role_id) REFERENCES role(id) ON DELETE CASCADE
        );
        "#
        ),
    )
    .await;

    exec(
        db,
        format!(
            r#"
        CREATE TABLE performance_review (
            id TEXT PRIMARY KEY,
            company_id TEXT NOT NULL,
            employee_id TEXT NOT NULL,
            reviewer_id TEXT NOT NULL,
            period TEXT NOT NULL,
            score INTEGER NOT NULL,
            comments TEXT,
            {AUDIT_COLS},
            FOREIGN KEY(company_id) REFERENCES company(id) ON DELETE CASCADE,
            FOREIGN KEY(employee_id) REFERENCES employee(id) ON DELETE CASCADE,
            FOREIGN KEY(reviewer_id) REFERENCES employee(id) ON DELETE CASCADE
        );
        "#
        ),
    )
    .await;
}
