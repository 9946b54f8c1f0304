mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestContext;

#[tokio::test]
async fn evaluation_types_are_available() {
    let ctx = TestContext::new().await;
    let token = ctx.login("member@acme.test", "memberpass").await;
    let (status, body) = ctx
        .request("GET", "/kpi/evaluation-types", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 5);
    let codes: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["code"].as_str().unwrap())
        .collect();
    assert_eq!(
        codes,
        vec![
            "BINARY",
            "HIGHER_BETTER_PCT",
            "HIGHER_BETTER_SUM",
            "LOWER_BETTER_PCT",
            "LOWER_BETTER_SUM",
        ]
    );
}

#[tokio::test]
async fn assignment_is_unique_per_employee_kpi_period() {
    let ctx = TestContext::new().await;
    let token = ctx.login("manager@acme.test", "managerpass").await;
    let existing = &ctx.seeded.employee_kpis[0];

    let (status, body) = ctx
        .request(
            "POST",
            "/kpi/employee-kpis",
            Some(&token),
            Some(json!({
                "employeeId": existing.employee_id,
                "kpiId": existing.kpi_id,
                "period": "2025-01-01",
                "goalValue": 10.0
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{:?}", body);

    // Another period is fine.
    let (status, created) = ctx
        .request(
            "POST",
            "/kpi/employee-kpis",
            Some(&token),
            Some(json!({
                "employeeId": existing.employee_id,
                "kpiId": existing.kpi_id,
                "period": "2025-02-01",
                "goalValue": 10.0
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["status"], "DRAFT");
}

#[tokio::test]
async fn evolutions_carry_the_rating_verdict() {
    let ctx = TestContext::new().await;
    let token = ctx.login("member@acme.test", "memberpass").await;
    // Seeded: "Escaped defect rate", LOWER_BETTER_PCT, goal 2.5.
    let assignment = &ctx.seeded.employee_kpis[2];

    let (status, body) = ctx
        .request(
            "GET",
            &format!("/kpi/employee-kpis/{}/evolutions", assignment.id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 3);
    // 1.9 <= 2.5 passes, 3.1 does not, 2.2 passes.
    assert_eq!(rows[0]["achievedValue"], 1.9);
    assert_eq!(rows[0]["passed"], true);
    assert_eq!(rows[1]["achievedValue"], 3.1);
    assert_eq!(rows[1]["passed"], false);
    assert_eq!(rows[2]["achievedValue"], 2.2);
    assert_eq!(rows[2]["passed"], true);
    assert_eq!(rows[0]["goalValue"], 2.5);
}

#[tokio::test]
async fn workflow_submit_then_approve() {
    let ctx = TestContext::new().await;
    let member = ctx.login("member@acme.test", "memberpass").await;
    let manager = ctx.login("manager@acme.test", "managerpass").await;
    let draft = &ctx.seeded.employee_kpis[0];
    let manager_user = ctx.seeded.user_email("manager@acme.test").unwrap();

    let (status, body) = ctx
        .request(
            "POST",
            &format!("/kpi/employee-kpis/{}/submit", draft.id),
            Some(&member),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "SUBMITTED");

    // Members cannot decide.
    let (status, _) = ctx
        .request(
            "POST",
            &format!("/kpi/employee-kpis/{}/approve", draft.id),
            Some(&member),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx
        .request(
            "POST",
            &format!("/kpi/employee-kpis/{}/approve", draft.id),
            Some(&manager),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "APPROVED");
    assert_eq!(body["approvedBy"], manager_user.id.to_string());

    // Re-approving an approved record is a no-op, not an error.
    let (status, body) = ctx
        .request(
            "POST",
            &format!("/kpi/employee-kpis/{}/approve", draft.id),
            Some(&manager),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "APPROVED");
}

#[tokio::test]
async fn workflow_reject_records_reason() {
    let ctx = TestContext::new().await;
    let manager = ctx.login("manager@acme.test", "managerpass").await;
    let submitted = &ctx.seeded.employee_kpis[1];

    let (status, body) = ctx
        .request(
            "POST",
            &format!("/kpi/employee-kpis/{}/reject", submitted.id),
            Some(&manager),
            Some(json!({ "reason": "Goal no longer matches the roadmap" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "REJECTED");
    assert_eq!(body["rejectionReason"], "Goal no longer matches the roadmap");

    let (status, body) = ctx
        .request(
            "GET",
            &format!("/kpi/employee-kpis/{}", submitted.id),
            Some(&manager),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rejectionReason"], "Goal no longer matches the roadmap");
}

#[tokio::test]
async fn workflow_guards_illegal_transitions() {
    let ctx = TestContext::new().await;
    let manager = ctx.login("manager@acme.test", "managerpass").await;
    let draft = &ctx.seeded.employee_kpis[0];
    let approved = &ctx.seeded.employee_kpis[2];

    // DRAFT cannot be approved or rejected.
    let (status, body) = ctx
        .request(
            "POST",
            &format!("/kpi/employee-kpis/{}/approve", draft.id),
            Some(&manager),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (status, _) = ctx
        .request(
            "POST",
            &format!("/kpi/employee-kpis/{}/reject", draft.id),
            Some(&manager),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // APPROVED cannot go back to SUBMITTED.
    let (status, _) = ctx
        .request(
            "POST",
            &format!("/kpi/employee-kpis/{}/submit", approved.id),
            Some(&manager),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn generic_patch_keeps_loose_status_semantics() {
    let ctx = TestContext::new().await;
    let manager = ctx.login("manager@acme.test", "managerpass").await;
    let draft = &ctx.seeded.employee_kpis[0];

    // The plain PATCH endpoint mirrors the original admin UI: any status
    // can be written directly, guard-free.
    let (status, body) = ctx
        .request(
            "PATCH",
            &format!("/kpi/employee-kpis/{}", draft.id),
            Some(&manager),
            Some(json!({ "status": "APPROVED" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "APPROVED");

    let (status, body) = ctx
        .request(
            "PATCH",
            &format!("/kpi/employee-kpis/{}", draft.id),
            Some(&manager),
            Some(json!({ "status": "BOGUS" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION");
}

#[tokio::test]
async fn evolution_lifecycle_and_uniqueness() {
    let ctx = TestContext::new().await;
    let member = ctx.login("member@acme.test", "memberpass").await;
    let manager = ctx.login("manager@acme.test", "managerpass").await;
    let draft = &ctx.seeded.employee_kpis[0];

    let (status, created) = ctx
        .request(
            "POST",
            &format!("/kpi/employee-kpis/{}/evolutions", draft.id),
            Some(&member),
            Some(json!({ "period": "2025-01-01", "achievedValue": 9.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{:?}", created);
    let evolution_id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["status"], "DRAFT");
    // Goal 8.0, HIGHER_BETTER_SUM: 9.0 passes.
    assert_eq!(created["passed"], true);

    let (status, _) = ctx
        .request(
            "POST",
            &format!("/kpi/employee-kpis/{}/evolutions", draft.id),
            Some(&member),
            Some(json!({ "period": "2025-01-01", "achievedValue": 4.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = ctx
        .request(
            "POST",
            &format!("/kpi/employee-kpi-evolutions/{}/submit", evolution_id),
            Some(&member),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "SUBMITTED");

    let (status, body) = ctx
        .request(
            "POST",
            &format!("/kpi/employee-kpi-evolutions/{}/reject", evolution_id),
            Some(&manager),
            Some(json!({ "reason": "numbers need a recount" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "REJECTED");
    assert_eq!(body["rejectionReason"], "numbers need a recount");
}

#[tokio::test]
async fn team_kpi_workflow_mirrors_employee_flow() {
    let ctx = TestContext::new().await;
    let manager = ctx.login("manager@acme.test", "managerpass").await;
    let team_assignment = &ctx.seeded.team_kpis[0];

    let (status, body) = ctx
        .request(
            "POST",
            &format!("/kpi/team-kpis/{}/approve", team_assignment.id),
            Some(&manager),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "APPROVED");

    let (status, body) = ctx
        .request(
            "GET",
            &format!("/kpi/team-kpis/{}/evolutions", team_assignment.id),
            Some(&manager),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    // Goal 30.0, HIGHER_BETTER_SUM, achieved 33.0.
    assert_eq!(body["data"][0]["passed"], true);
}
