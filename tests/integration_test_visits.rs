mod common;

use access_control_backend::domain::models::visit::CancelPolicy;
use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{parse_body, TestApp};
use serde_json::{json, Value};

async fn check_in(app: &TestApp, token: &str, nombre: &str, departamento: &str) -> Value {
    let response = app
        .request(
            "POST",
            "/api/visitas",
            Some(token),
            Some(json!({ "nombre": nombre, "documento": "12345678", "departamento": departamento })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    parse_body(response).await["data"].clone()
}

#[tokio::test]
async fn test_visit_lifecycle_over_http() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let visit = check_in(&app, &token, "Luis", "101").await;
    assert_eq!(visit["estado"], "ingreso");
    assert_eq!(visit["fecha_salida"], Value::Null);
    assert!(visit["fecha_ingreso"].is_string());
    let id = visit["id"].as_str().unwrap();

    let response = app.request("PUT", &format!("/api/visitas/{}/salida", id), Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_body(response).await;
    assert_eq!(body["data"]["estado"], "salida");
    assert!(body["data"]["fecha_salida"].is_string());
    assert_eq!(body["data"]["fecha_ingreso"], visit["fecha_ingreso"]);

    let response = app.request("PUT", &format!("/api/visitas/{}/salida", id), Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(parse_body(response).await["message"], "La visita ya tiene registrada una salida");

    // Strict policy: an exited visit cannot be cancelled
    let response = app.request("PUT", &format!("/api/visitas/{}/cancelar", id), Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.request("GET", &format!("/api/visitas/{}", id), Some(&token), None).await;
    assert_eq!(parse_body(response).await["data"]["estado"], "salida");
}

#[tokio::test]
async fn test_cancelled_visit_is_terminal() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let visit = check_in(&app, &token, "Rosa", "202").await;
    let id = visit["id"].as_str().unwrap();

    let response = app.request("PUT", &format!("/api/visitas/{}/cancelar", id), Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_body(response).await;
    assert_eq!(body["data"]["estado"], "cancelada");
    assert_eq!(body["data"]["fecha_salida"], Value::Null);

    let response = app.request("PUT", &format!("/api/visitas/{}/cancelar", id), Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(parse_body(response).await["message"], "La visita ya está cancelada");

    let response = app.request("PUT", &format!("/api/visitas/{}/salida", id), Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(parse_body(response).await["message"], "La visita está cancelada y no admite registrar salida");

    let response = app.request("PUT", "/api/visitas/no-existe/salida", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(parse_body(response).await["message"], "Visita no encontrada");
}

#[tokio::test]
async fn test_permissive_policy_allows_cancel_after_exit() {
    let app = TestApp::with_config(|config| config.cancel_policy = CancelPolicy::Permissive).await;
    let token = app.admin_token().await;
    let visit = check_in(&app, &token, "Pedro", "303").await;
    let id = visit["id"].as_str().unwrap();

    app.request("PUT", &format!("/api/visitas/{}/salida", id), Some(&token), None).await;
    let response = app.request("PUT", &format!("/api/visitas/{}/cancelar", id), Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_body(response).await;
    assert_eq!(body["data"]["estado"], "cancelada");
    assert!(body["data"]["fecha_salida"].is_string());
}

#[tokio::test]
async fn test_update_cannot_touch_lifecycle_fields() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let visit = check_in(&app, &token, "Luis", "101").await;
    let uri = format!("/api/visitas/{}", visit["id"].as_str().unwrap());

    let response = app.request("PUT", &uri, Some(&token), Some(json!({ "estado": "salida" }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(parse_body(response).await["errors"][0]["field"], "estado");

    let response = app
        .request("PUT", &uri, Some(&token), Some(json!({ "observaciones": "Trae paquete", "ingreso_vehiculo": true })))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_body(response).await;
    assert_eq!(body["data"]["observaciones"], "Trae paquete");
    assert_eq!(body["data"]["ingreso_vehiculo"], true);
    assert_eq!(body["data"]["estado"], "ingreso");

    let response = app.request("POST", "/api/visitas", Some(&token), Some(json!({ "nombre": "Sin datos" }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_body(response).await;
    let fields: Vec<_> = body["errors"].as_array().unwrap().iter().map(|e| e["field"].as_str().unwrap()).collect();
    assert_eq!(fields, vec!["documento", "departamento"]);
}

#[tokio::test]
async fn test_pagination_over_twenty_five_visits() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    for i in 1..=25 {
        check_in(&app, &token, &format!("Visitante {:02}", i), "101").await;
    }

    let response = app.request("GET", "/api/visitas?page=2&limit=10", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_body(response).await;
    // Newest first, so the second page holds the 15th back to the 6th check-in.
    let names: Vec<_> = body["data"].as_array().unwrap().iter().map(|v| v["nombre"].as_str().unwrap()).collect();
    let expected: Vec<_> = (6..=15).rev().map(|i| format!("Visitante {:02}", i)).collect();
    assert_eq!(names, expected);
    assert_eq!(
        body["pagination"],
        json!({ "page": 2, "limit": 10, "total": 25, "totalPages": 3, "hasNextPage": true, "hasPrevPage": true })
    );

    let response = app.request("GET", "/api/visitas?page=3&limit=10", Some(&token), None).await;
    let body = parse_body(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
    assert_eq!(body["pagination"]["hasNextPage"], false);

    let response = app.request("GET", "/api/visitas?limit=1000", Some(&token), None).await;
    let body = parse_body(response).await;
    assert_eq!(body["pagination"]["limit"], 100);
    assert_eq!(body["data"].as_array().unwrap().len(), 25);

    let response = app.request("GET", "/api/visitas?page=9223372036854775807&limit=100", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_body(response).await;
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(body["pagination"]["page"], json!(i64::MAX));
    assert_eq!(body["pagination"]["hasNextPage"], false);
}

#[tokio::test]
async fn test_search_folds_accented_case_and_matches_wildcards_literally() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let payload = json!({ "nombre": "ÁNGEL", "apellido": "NÚÑEZ", "documento": "55555555", "departamento": "A-1" });
    let response = app.request("POST", "/api/visitas", Some(&token), Some(payload)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    check_in(&app, &token, "Ana", "101").await;

    // ángel, úñez
    for term in ["%C3%A1ngel", "%C3%BA%C3%B1ez"] {
        let response = app.request("GET", &format!("/api/visitas?search={term}"), Some(&token), None).await;
        let body = parse_body(response).await;
        assert_eq!(body["pagination"]["total"], 1, "search={term}");
        assert_eq!(body["data"][0]["nombre"], "ÁNGEL");
    }

    for term in ["_", "%25", "%5C"] {
        let response = app.request("GET", &format!("/api/visitas?search={term}"), Some(&token), None).await;
        let body = parse_body(response).await;
        assert_eq!(body["pagination"]["total"], 0, "search={term}");
    }
}

#[tokio::test]
async fn test_filters_and_statistics() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let luis = check_in(&app, &token, "Luis", "101").await;
    let rosa = check_in(&app, &token, "Rosa", "202").await;
    check_in(&app, &token, "Pedro", "303").await;
    app.request("PUT", &format!("/api/visitas/{}/salida", luis["id"].as_str().unwrap()), Some(&token), None).await;
    app.request("PUT", &format!("/api/visitas/{}/cancelar", rosa["id"].as_str().unwrap()), Some(&token), None).await;

    let response = app.request("GET", "/api/visitas?estado=salida", Some(&token), None).await;
    let body = parse_body(response).await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["nombre"], "Luis");

    let response = app.request("GET", "/api/visitas?search=202", Some(&token), None).await;
    assert_eq!(parse_body(response).await["data"][0]["nombre"], "Rosa");

    let today = Utc::now().date_naive();
    let response = app.request("GET", &format!("/api/visitas?fecha={}", today), Some(&token), None).await;
    assert_eq!(parse_body(response).await["pagination"]["total"], 3);

    let yesterday = today - Duration::days(1);
    let response = app.request("GET", &format!("/api/visitas?fecha={}", yesterday), Some(&token), None).await;
    assert_eq!(parse_body(response).await["pagination"]["total"], 0);

    let response = app.request("GET", "/api/visitas?estado=perdida", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.request("GET", "/api/visitas/estadisticas", Some(&token), None).await;
    assert_eq!(
        parse_body(response).await["data"],
        json!({ "total_visitas": 3, "visitas_activas": 1, "visitas_completadas": 1, "visitas_canceladas": 1 })
    );

    let id = luis["id"].as_str().unwrap();
    let response = app.request("DELETE", &format!("/api/visitas/{}", id), Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = app.request("GET", &format!("/api/visitas/{}", id), Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
