//! HTTP 层测试 - 通过 `oneshot` 直接驱动 Router，不监听端口

mod common;

use axum::body::Body;
use common::TestEnv;
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use store_server::build_router;
use tower::ServiceExt;

const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";

async fn send(env: &TestEnv, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = build_router(env.state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let env = TestEnv::new().await;
    let (status, body) = send(&env, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
    assert_eq!(body["timezone"], "UTC");
}

#[tokio::test]
async fn test_error_bodies_carry_codes() {
    let env = TestEnv::new().await;

    let (status, body) = send(&env, Method::POST, "/api/categories", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 7);

    let (status, body) = send(&env, Method::GET, "/api/orders/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4001);

    let (status, body) = send(
        &env,
        Method::POST,
        "/api/orders",
        Some(json!({ "items": [], "delivery_price": 10 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4002);

    let (status, body) = send(&env, Method::POST, "/api/orders/by-ids", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 2);

    let (status, body) = send(
        &env,
        Method::PATCH,
        "/api/orders/nope/status",
        Some(json!({ "status": "refunded" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4004);
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let env = TestEnv::new().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/orders")
        .header("content-type", "application/json")
        .body(Body::from("{\"items\": ["))
        .unwrap();

    let response = build_router(env.state.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], 6);
}

#[tokio::test]
async fn test_order_lifecycle_over_http() {
    let env = TestEnv::new().await;

    let (status, category) = send(
        &env,
        Method::POST,
        "/api/categories",
        Some(json!({ "name": "Summer" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, product) = send(
        &env,
        Method::POST,
        "/api/products",
        Some(json!({
            "title": "Linen set",
            "description": "Two-piece linen pajama",
            "images": [PNG],
            "price": 100,
            "cost_price": 40,
            "discount_percentage": 10,
            "category": category["id"],
            "available_sizes": ["S", "M"],
            "quantity": 5
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(product["final_price"], 90.0);
    assert_eq!(product["category"]["name"], "Summer");
    assert_eq!(env.images.len(), 1);
    let product_id = product["id"].as_str().unwrap().to_string();

    let (status, order) = send(
        &env,
        Method::POST,
        "/api/orders",
        Some(json!({
            "customer_info": { "full_name": "Amina", "phone": "0555", "delivery_type": "home" },
            "items": [{ "product": product_id, "quantity": 2, "size": "M" }],
            "delivery_price": 15
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["order_number"], "ORD000001");
    assert_eq!(order["amount"], 180.0);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["items"][0]["product"]["title"], "Linen set");
    let order_id = order["id"].as_str().unwrap().to_string();

    let (status, fetched) = send(&env, Method::GET, "/api/orders/number/ORD000001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], order_id);

    let (_, product) = send(&env, Method::GET, &format!("/api/products/{product_id}"), None).await;
    assert_eq!(product["quantity"], 3);

    let uri = format!("/api/orders/{order_id}/cancel");
    let (status, cancelled) = send(&env, Method::PATCH, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");

    let (status, body) = send(&env, Method::PATCH, &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4003);

    let (_, product) = send(&env, Method::GET, &format!("/api/products/{product_id}"), None).await;
    assert_eq!(product["quantity"], 5);

    let (status, stats) = send(&env, Method::GET, "/api/orders/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_orders"], 1);
    assert_eq!(stats["total_revenue"], 0.0);

    let (status, report) = send(&env, Method::GET, "/api/orders/stats/advanced?period=week", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["period"], "week");
    assert_eq!(report["daily_sales"].as_array().unwrap().len(), 7);
    assert_eq!(report["order_status_stats"].as_array().unwrap().len(), 6);

    let (status, _) = send(&env, Method::DELETE, &format!("/api/products/{product_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(env.images.is_empty());

    let (status, body) = send(&env, Method::GET, &format!("/api/products/{product_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 6001);
}

#[tokio::test]
async fn test_unknown_product_in_order_is_bad_request() {
    let env = TestEnv::new().await;

    let (status, body) = send(
        &env,
        Method::POST,
        "/api/orders",
        Some(json!({
            "customer_info": { "full_name": "Amina", "phone": "0555", "delivery_type": "home" },
            "items": [{ "product": "nope", "quantity": 1, "size": "M" }],
            "delivery_price": 15
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4008);
    assert_eq!(body["details"]["product_id"], "nope");

    // 直接查询不存在的商品仍然是 404
    let (status, body) = send(&env, Method::GET, "/api/products/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 6001);
}

#[tokio::test]
async fn test_product_create_requires_images_and_category() {
    let env = TestEnv::new().await;
    let base = json!({
        "title": "Robe",
        "description": "Warm robe",
        "price": 80,
        "cost_price": 30,
        "category": env.category_id,
        "available_sizes": ["M"],
        "quantity": 2
    });

    let (status, _) = send(&env, Method::POST, "/api/products", Some(base.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut unknown_category = base.clone();
    unknown_category["images"] = json!([PNG]);
    unknown_category["category"] = json!("missing");
    let (status, _) = send(&env, Method::POST, "/api/products", Some(unknown_category)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(env.images.is_empty());
}

#[tokio::test]
async fn test_testimonials() {
    let env = TestEnv::new().await;

    let (status, _) = send(
        &env,
        Method::POST,
        "/api/testimonials",
        Some(json!({ "customer_name": "Sara", "comment": "Lovely", "gender": "other" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, created) = send(
        &env,
        Method::POST,
        "/api/testimonials",
        Some(json!({ "customer_name": " Sara ", "comment": "Lovely fabric", "gender": "female" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["customer_name"], "Sara");

    let (status, stats) = send(&env, Method::GET, "/api/testimonials/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["gender_stats"]["female"], 1);
    assert_eq!(stats["latest"]["customer_name"], "Sara");
}
