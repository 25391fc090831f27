use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt;

use migration::MigratorTrait;
use server::{ServerState, router};

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = engine::Engine::builder()
        .database(db)
        .build()
        .await
        .unwrap();
    router(ServerState {
        engine: Arc::new(engine),
    })
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_req(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn family_crud_over_http() {
    let app = app().await;

    let (status, family) = send(&app, json_req("POST", "/families", &json!({"name": "Rossi"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(family["name"], "Rossi");
    let family_id = family["id"].as_str().unwrap().to_string();

    let (status, _) = send(&app, json_req("POST", "/families", &json!({"name": "rossi"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, fetched) = send(&app, get(&format!("/families/{family_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], family["id"]);
    assert_eq!(fetched["members"].as_array().unwrap().len(), 0);

    let (status, renamed) = send(
        &app,
        json_req(
            "PUT",
            &format!("/families/{family_id}"),
            &json!({"name": "Rossi-Verdi"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["name"], "Rossi-Verdi");

    let (status, listing) = send(&app, get("/families")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, delete(&format!("/families/{family_id}"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, get(&format!("/families/{family_id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn member_routes_enforce_engine_rules() {
    let app = app().await;

    let (_, family) = send(&app, json_req("POST", "/families", &json!({"name": "Rossi"}))).await;
    let family_id = family["id"].as_str().unwrap().to_string();

    let (status, anna) = send(
        &app,
        json_req(
            "POST",
            "/members",
            &json!({
                "family_id": family_id,
                "name": "Anna",
                "role": "admin",
                "email": "anna@example.com"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(anna["role"], "admin");
    let anna_id = anna["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        json_req(
            "POST",
            "/members",
            &json!({"family_id": family_id, "name": "Bruno", "email": "anna@example.com"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        json_req(
            "POST",
            "/members",
            &json!({"family_id": family_id, "name": "Bruno", "email": "no-at-sign"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, changed) = send(
        &app,
        json_req(
            "PUT",
            &format!("/members/{anna_id}/role"),
            &json!({"role": "viewer"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(changed["role"], "viewer");

    let (status, _) = send(&app, delete(&format!("/members/{anna_id}"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, members) = send(&app, get(&format!("/families/{family_id}/members"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(members.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn category_tree_and_reparenting_over_http() {
    let app = app().await;

    let (status, food) = send(
        &app,
        json_req("POST", "/categories", &json!({"name": "Food", "kind": "expense"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let food_id = food["id"].as_str().unwrap().to_string();
    assert_eq!(food["level"], 1);

    let (status, groceries) = send(
        &app,
        json_req(
            "POST",
            "/categories",
            &json!({"name": "Groceries", "kind": "expense", "parent_id": food_id}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let groceries_id = groceries["id"].as_str().unwrap().to_string();
    assert_eq!(groceries["level"], 2);

    let (status, tree) = send(&app, get("/categories/tree?kind=expense")).await;
    assert_eq!(status, StatusCode::OK);
    let roots = tree.as_array().unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0]["id"], food["id"]);
    assert_eq!(roots[0]["children"][0]["id"], groceries["id"]);

    let (status, path) = send(&app, get(&format!("/categories/{groceries_id}/full_path"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(path["full_path"], "Food > Groceries");

    // Mixed kinds are refused.
    let (status, _) = send(
        &app,
        json_req(
            "POST",
            "/categories",
            &json!({"name": "Salary", "kind": "income", "parent_id": food_id}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, detached) = send(
        &app,
        json_req(
            "PUT",
            &format!("/categories/{groceries_id}"),
            &json!({"detach_parent": true}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(detached["parent_id"].is_null());
    assert_eq!(detached["level"], 1);

    let (status, roots) = send(&app, get("/categories/roots")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(roots.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn transaction_lifecycle_over_http() {
    let app = app().await;

    let (_, family) = send(&app, json_req("POST", "/families", &json!({"name": "Rossi"}))).await;
    let family_id = family["id"].as_str().unwrap().to_string();
    let (_, member) = send(
        &app,
        json_req(
            "POST",
            "/members",
            &json!({"family_id": family_id, "name": "Anna"}),
        ),
    )
    .await;
    let member_id = member["id"].as_str().unwrap().to_string();
    let (_, category) = send(
        &app,
        json_req("POST", "/categories", &json!({"name": "Food", "kind": "expense"})),
    )
    .await;
    let category_id = category["id"].as_str().unwrap().to_string();

    // Rejected before it reaches the store.
    let (status, body) = send(
        &app,
        json_req(
            "POST",
            "/transactions",
            &json!({
                "family_id": family_id,
                "member_id": member_id,
                "amount_minor": 0,
                "kind": "expense",
                "category_id": category_id,
                "occurred_at": "2026-03-05T12:00:00Z"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());

    let (status, tx) = send(
        &app,
        json_req(
            "POST",
            "/transactions",
            &json!({
                "family_id": family_id,
                "member_id": member_id,
                "amount_minor": 1250,
                "kind": "expense",
                "category_id": category_id,
                "occurred_at": "2026-03-05T12:00:00Z",
                "payment_method": "card"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let tx_id = tx["id"].as_str().unwrap().to_string();

    let (_, tag) = send(
        &app,
        json_req(
            "POST",
            "/tags",
            &json!({"family_id": family_id, "name": "weekly", "kind": "routine", "color": "#336699"}),
        ),
    )
    .await;
    let tag_id = tag["id"].as_str().unwrap().to_string();

    let attach = |method: &'static str| {
        Request::builder()
            .method(method)
            .uri(format!("/transactions/{tx_id}/tags/{tag_id}"))
            .body(Body::empty())
            .unwrap()
    };
    let (status, _) = send(&app, attach("POST")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, attach("POST")).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, fetched) = send(&app, get(&format!("/transactions/{tx_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["tags"].as_array().unwrap().len(), 1);
    assert_eq!(fetched["tags"][0]["name"], "weekly");

    let (status, listing) = send(
        &app,
        get(&format!("/families/{family_id}/transactions?payment_method=card")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["total"], 1);
    assert_eq!(listing["page"], 1);
    assert_eq!(listing["transactions"].as_array().unwrap().len(), 1);

    let (status, _) = send(&app, attach("DELETE")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, delete(&format!("/transactions/{tx_id}"))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, get(&format!("/transactions/{tx_id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn statistics_routes_summarize_and_validate() {
    let app = app().await;

    let (_, family) = send(&app, json_req("POST", "/families", &json!({"name": "Rossi"}))).await;
    let family_id = family["id"].as_str().unwrap().to_string();
    let (_, member) = send(
        &app,
        json_req(
            "POST",
            "/members",
            &json!({"family_id": family_id, "name": "Anna"}),
        ),
    )
    .await;
    let member_id = member["id"].as_str().unwrap().to_string();
    let (_, category) = send(
        &app,
        json_req("POST", "/categories", &json!({"name": "Food", "kind": "expense"})),
    )
    .await;
    let category_id = category["id"].as_str().unwrap().to_string();

    for (amount, day) in [(1000, 5), (500, 12)] {
        let (status, _) = send(
            &app,
            json_req(
                "POST",
                "/transactions",
                &json!({
                    "family_id": family_id,
                    "member_id": member_id,
                    "amount_minor": amount,
                    "kind": "expense",
                    "category_id": category_id,
                    "occurred_at": format!("2026-03-{day:02}T12:00:00Z")
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let window = "start=2026-03-01T00:00:00Z&end=2026-03-31T23:59:59Z";
    let (status, summary) = send(
        &app,
        get(&format!(
            "/families/{family_id}/statistics/by_category?{window}"
        )),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["totals"]["Food"], 1500);

    let (status, summary) = send(
        &app,
        get(&format!(
            "/families/{family_id}/statistics/by_time?{window}&group_by=month"
        )),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["totals"]["2026-03"], 1500);

    let (status, body) = send(
        &app,
        get(&format!(
            "/families/{family_id}/statistics/by_time?{window}&group_by=week"
        )),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
}
