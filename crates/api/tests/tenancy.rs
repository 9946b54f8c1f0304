mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::TestContext;

#[tokio::test]
async fn lists_are_scoped_to_the_callers_company() {
    let ctx = TestContext::new().await;
    let acme = ctx.seeded.company_named("ACME Industries").unwrap();
    let nimbus = ctx.seeded.company_named("Nimbus Analytics").unwrap();

    let acme_token = ctx.login("admin@acme.test", "adminpass").await;
    let (status, body) = ctx.request("GET", "/employees", Some(&acme_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    for row in body["data"].as_array().unwrap() {
        assert_eq!(row["companyId"], acme.id.to_string());
    }

    let nimbus_token = ctx.login("admin@nimbus.test", "nimbuspass").await;
    let (status, body) = ctx
        .request("GET", "/employees", Some(&nimbus_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["companyId"], nimbus.id.to_string());
}

#[tokio::test]
async fn cross_tenant_ids_read_as_missing() {
    let ctx = TestContext::new().await;
    let nimbus_token = ctx.login("admin@nimbus.test", "nimbuspass").await;
    let acme_employee = &ctx.seeded.employees[0];

    let (status, _) = ctx
        .request(
            "GET",
            &format!("/employees/{}", acme_employee.id),
            Some(&nimbus_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx
        .request(
            "PATCH",
            &format!("/employees/{}", acme_employee.id),
            Some(&nimbus_token),
            Some(json!({ "isActive": false })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cross_tenant_filters_are_rejected() {
    let ctx = TestContext::new().await;
    let acme = ctx.seeded.company_named("ACME Industries").unwrap();
    let nimbus_token = ctx.login("admin@nimbus.test", "nimbuspass").await;

    let (status, _) = ctx
        .request(
            "GET",
            &format!("/branches?companyId={}", acme.id),
            Some(&nimbus_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn platform_operator_scopes_by_filter() {
    let ctx = TestContext::new().await;
    let owner_token = ctx.login("owner@kpisuite.test", "ownerpass").await;
    let nimbus = ctx.seeded.company_named("Nimbus Analytics").unwrap();

    let (status, body) = ctx.request("GET", "/employees", Some(&owner_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 4);

    let (status, body) = ctx
        .request(
            "GET",
            &format!("/employees?companyId={}", nimbus.id),
            Some(&owner_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);

    // Writes need a concrete tenant.
    let (status, body) = ctx
        .request(
            "POST",
            "/branches",
            Some(&owner_token),
            Some(json!({ "name": "Floating Branch" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION");
}

#[tokio::test]
async fn cross_tenant_workflow_actions_are_denied() {
    let ctx = TestContext::new().await;
    let nimbus_token = ctx.login("admin@nimbus.test", "nimbuspass").await;
    let submitted = &ctx.seeded.employee_kpis[1];

    let (status, _) = ctx
        .request(
            "POST",
            &format!("/kpi/employee-kpis/{}/approve", submitted.id),
            Some(&nimbus_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn kpi_lists_do_not_leak_other_tenants() {
    let ctx = TestContext::new().await;
    let nimbus_token = ctx.login("admin@nimbus.test", "nimbuspass").await;

    let (status, body) = ctx
        .request("GET", "/kpi/employee-kpis", Some(&nimbus_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);

    let (status, body) = ctx.request("GET", "/kpi/kpis", Some(&nimbus_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
}
