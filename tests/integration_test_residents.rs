mod common;

use axum::http::StatusCode;
use common::{parse_body, TestApp};
use serde_json::{json, Value};

fn resident(documento: &str, departamento: &str, nombre: &str) -> Value {
    json!({
        "nombre": nombre,
        "apellido_paterno": "Quispe",
        "documento": documento,
        "departamento": departamento,
        "email": format!("{}@example.com", documento),
    })
}

async fn create(app: &TestApp, token: &str, payload: Value) -> Value {
    let response = app.request("POST", "/api/residentes", Some(token), Some(payload)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    parse_body(response).await["data"].clone()
}

#[tokio::test]
async fn test_resident_crud_with_document_uniqueness() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let created = create(&app, &token, resident("40404040", "502", "María")).await;
    assert_eq!(created["tipo_documento"], "DNI");
    assert_eq!(created["tipo_residente"], "propietario");
    assert_eq!(created["estado"], "activo");
    let id = created["id"].as_str().unwrap();

    // Same document again
    let response = app
        .request("POST", "/api/residentes", Some(&token), Some(resident("40404040", "101", "Otra")))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(parse_body(response).await["message"], "Ya existe un residente con este número de documento");

    // Keeping its own document is fine
    let response = app
        .request(
            "PUT",
            &format!("/api/residentes/{}", id),
            Some(&token),
            Some(json!({ "documento": "40404040", "telefono": "987654321", "tipo_residente": "inquilino" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_body(response).await;
    assert_eq!(body["data"]["telefono"], "987654321");
    assert_eq!(body["data"]["tipo_residente"], "inquilino");

    // Moving onto someone else's document is not
    let other = create(&app, &token, resident("50505050", "503", "Jorge")).await;
    let response = app
        .request(
            "PUT",
            &format!("/api/residentes/{}", other["id"].as_str().unwrap()),
            Some(&token),
            Some(json!({ "documento": "40404040" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(parse_body(response).await["message"], "Ya existe otro residente con este número de documento");

    let response = app.request("DELETE", &format!("/api/residentes/{}", id), Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.request("GET", &format!("/api/residentes/{}", id), Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(parse_body(response).await["message"], "Residente no encontrado");

    let response = app.request("DELETE", &format!("/api/residentes/{}", id), Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_lists_every_missing_field() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let response = app
        .request("POST", "/api/residentes", Some(&token), Some(json!({ "nombre": "Solo nombre" })))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = parse_body(response).await;
    let fields: Vec<_> = body["errors"].as_array().unwrap().iter().map(|e| e["field"].as_str().unwrap()).collect();
    assert_eq!(fields, vec!["apellido_paterno", "documento", "departamento"]);
}

#[tokio::test]
async fn test_list_filters_unit_lookup_and_statistics() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    create(&app, &token, resident("11111111", "101", "Ana")).await;
    create(&app, &token, resident("22222222", "101", "Bruno")).await;
    let mut inquilino = resident("33333333", "202", "Carla");
    inquilino["tipo_residente"] = json!("inquilino");
    create(&app, &token, inquilino).await;
    let mut moved_out = resident("44444444", "101", "Diego");
    moved_out["estado"] = json!("inactivo");
    create(&app, &token, moved_out).await;

    let response = app.request("GET", "/api/residentes?search=carl", Some(&token), None).await;
    let body = parse_body(response).await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["nombre"], "Carla");

    let response = app.request("GET", "/api/residentes?tipo=inquilino&estado=todos", Some(&token), None).await;
    assert_eq!(parse_body(response).await["pagination"]["total"], 1);

    let response = app.request("GET", "/api/residentes?estado=activo&limit=2", Some(&token), None).await;
    let body = parse_body(response).await;
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let response = app.request("GET", "/api/residentes?tipo=visitante", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Active residents of the unit, by name
    let response = app.request("GET", "/api/residentes/departamento/101", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_body(response).await;
    let names: Vec<_> = body["data"].as_array().unwrap().iter().map(|r| r["nombre"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Ana", "Bruno"]);

    let response = app.request("GET", "/api/residentes/estadisticas", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        parse_body(response).await["data"],
        json!({ "total_residentes": 4, "residentes_activos": 3, "propietarios": 3, "inquilinos": 1, "familiares": 0 })
    );
}

#[tokio::test]
async fn test_birth_date_is_validated_and_clearable() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let mut payload = resident("55555555", "301", "Elena");
    payload["fecha_nacimiento"] = json!("31/12/1990");
    let response = app.request("POST", "/api/residentes", Some(&token), Some(payload)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(parse_body(response).await["errors"][0]["field"], "fecha_nacimiento");

    let mut payload = resident("55555555", "301", "Elena");
    payload["fecha_nacimiento"] = json!("1990-12-31");
    let created = create(&app, &token, payload).await;
    assert_eq!(created["fecha_nacimiento"], "1990-12-31");

    let response = app
        .request(
            "PUT",
            &format!("/api/residentes/{}", created["id"].as_str().unwrap()),
            Some(&token),
            Some(json!({ "fecha_nacimiento": "" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse_body(response).await["data"]["fecha_nacimiento"], Value::Null);
}

#[tokio::test]
async fn test_search_key_follows_updates_with_accents() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let created = create(&app, &token, resident("60606060", "303", "Agata")).await;
    let id = created["id"].as_str().unwrap();
    let response = app
        .request("PUT", &format!("/api/residentes/{id}"), Some(&token), Some(json!({ "apellido_paterno": "ÑAHUI" })))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // ñahui
    let response = app.request("GET", "/api/residentes?search=%C3%B1ahui", Some(&token), None).await;
    let body = parse_body(response).await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["id"], id);

    let response = app.request("GET", "/api/residentes?search=quispe", Some(&token), None).await;
    assert_eq!(parse_body(response).await["pagination"]["total"], 0);
}

#[tokio::test]
async fn test_overlong_fields_are_rejected_as_validation_errors() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let response = app
        .request("POST", "/api/residentes", Some(&token), Some(resident(&"9".repeat(25), "101", "Ana")))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_body(response).await;
    assert_eq!(body["errors"][0]["field"], "documento");

    let payload = json!({ "nombre": "Luis", "documento": "1".repeat(25), "departamento": "101" });
    let response = app.request("POST", "/api/visitas", Some(&token), Some(payload)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(parse_body(response).await["errors"][0]["field"], "documento");
}
