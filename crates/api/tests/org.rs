mod common;

use axum::http::StatusCode;
use entity::branch;
use sea_orm::EntityTrait;
use serde_json::json;
use uuid::Uuid;

use common::TestContext;

#[tokio::test]
async fn branch_crud_flow() {
    let ctx = TestContext::new().await;
    let token = ctx.login("manager@acme.test", "managerpass").await;

    let (status, created) = ctx
        .request(
            "POST",
            "/branches",
            Some(&token),
            Some(json!({ "name": "Warehouse", "address": "2 Dock Rd" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "create failed: {:?}", created);
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["name"], "Warehouse");
    let acme = ctx.seeded.company_named("ACME Industries").unwrap();
    assert_eq!(created["companyId"], acme.id.to_string());

    let (status, fetched) = ctx
        .request("GET", &format!("/branches/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["address"], "2 Dock Rd");

    let (status, updated) = ctx
        .request(
            "PATCH",
            &format!("/branches/{}", id),
            Some(&token),
            Some(json!({ "name": "Warehouse North" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Warehouse North");

    let (status, _) = ctx
        .request("DELETE", &format!("/branches/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = ctx
        .request("GET", &format!("/branches/{}", id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Soft delete keeps the row with its tombstone.
    let row = branch::Entity::find_by_id(Uuid::parse_str(&id).unwrap())
        .one(ctx.db.as_ref())
        .await
        .unwrap()
        .expect("soft-deleted row still present");
    assert!(row.deleted_at.is_some());
    assert!(row.deleted_by.is_some());
}

#[tokio::test]
async fn list_pagination_caps_and_counts() {
    let ctx = TestContext::new().await;
    let token = ctx.login("manager@acme.test", "managerpass").await;

    for n in 0..5 {
        let (status, _) = ctx
            .request(
                "POST",
                "/branches",
                Some(&token),
                Some(json!({ "name": format!("Branch {}", n) })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    // The seed adds one ACME branch, so six in total.
    let (status, body) = ctx
        .request("GET", "/branches?limit=4&page=1", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 6);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 4);

    let (status, body) = ctx
        .request("GET", "/branches?limit=4&page=2", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["page"], 2);

    let (status, body) = ctx
        .request("GET", "/branches?limit=500", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION");
}

#[tokio::test]
async fn department_rejects_branch_of_another_company() {
    let ctx = TestContext::new().await;
    let nimbus_token = ctx.login("admin@nimbus.test", "nimbuspass").await;
    let acme_token = ctx.login("manager@acme.test", "managerpass").await;

    let (_, acme_branches) = ctx.request("GET", "/branches", Some(&acme_token), None).await;
    let acme_branch_id = acme_branches["data"][0]["id"].as_str().unwrap().to_string();

    let (status, _) = ctx
        .request(
            "POST",
            "/departments",
            Some(&nimbus_token),
            Some(json!({ "name": "Research", "branchId": acme_branch_id })),
        )
        .await;
    // The foreign branch is invisible to the other tenant.
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn name_filter_narrows_lists() {
    let ctx = TestContext::new().await;
    let token = ctx.login("manager@acme.test", "managerpass").await;

    let (status, body) = ctx
        .request("GET", "/branches?q=Headquarters", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["name"], "Headquarters");

    let (status, body) = ctx
        .request("GET", "/branches?q=zzz-no-match", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert_eq!(body["totalPages"], 0);
}

#[tokio::test]
async fn company_creation_requires_owner() {
    let ctx = TestContext::new().await;
    let admin_token = ctx.login("admin@acme.test", "adminpass").await;
    let owner_token = ctx.login("owner@kpisuite.test", "ownerpass").await;

    let (status, _) = ctx
        .request(
            "POST",
            "/companies",
            Some(&admin_token),
            Some(json!({ "name": "Shadow Corp" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = ctx
        .request(
            "POST",
            "/companies",
            Some(&owner_token),
            Some(json!({ "name": "Umbrella Ltd" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["name"], "Umbrella Ltd");

    let (status, body) = ctx
        .request(
            "POST",
            "/companies",
            Some(&owner_token),
            Some(json!({ "name": "Umbrella Ltd" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}
