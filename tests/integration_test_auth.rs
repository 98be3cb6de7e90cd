mod common;

use access_control_backend::domain::models::auth::Claims;
use access_control_backend::domain::services::auth_service::AUDIENCE;
use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{parse_body, TestApp, ADMIN_PASSWORD};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;

#[tokio::test]
async fn test_login_returns_token_and_user_summary() {
    let app = TestApp::new().await;

    let response = app
        .request("POST", "/api/auth/login", None, Some(json!({ "username": "admin", "password": ADMIN_PASSWORD })))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_body(response).await;
    assert_eq!(body["success"], true);
    assert!(body["token"].as_str().is_some_and(|t| t.split('.').count() == 3));
    assert_eq!(body["user"]["username"], "admin");
    assert_eq!(body["user"]["role"]["nombre"], "Administrador");
    assert_eq!(body["user"]["profile"]["nombre"], "Administrador del Sistema");
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["user"]["ultimo_acceso"].is_string());
}

#[tokio::test]
async fn test_invalid_credentials_are_indistinguishable() {
    let app = TestApp::new().await;

    let wrong_password = app
        .request("POST", "/api/auth/login", None, Some(json!({ "username": "admin", "password": "incorrecta" })))
        .await;
    let unknown_user = app
        .request("POST", "/api/auth/login", None, Some(json!({ "username": "nadie", "password": "incorrecta" })))
        .await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(parse_body(wrong_password).await, parse_body(unknown_user).await);
}

#[tokio::test]
async fn test_login_validates_fields() {
    let app = TestApp::new().await;

    let response = app
        .request("POST", "/api/auth/login", None, Some(json!({ "username": "", "password": "123" })))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = parse_body(response).await;
    let fields: Vec<_> = body["errors"].as_array().unwrap().iter().map(|e| e["field"].as_str().unwrap()).collect();
    assert_eq!(fields, vec!["username", "password"]);

    let malformed = app.router.clone();
    let response = tower::ServiceExt::oneshot(
        malformed,
        axum::http::Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header("Content-Type", "application/json")
            .body(axum::body::Body::from("{not json"))
            .unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(parse_body(response).await["success"], false);
}

#[tokio::test]
async fn test_me_requires_a_valid_token() {
    let app = TestApp::new().await;

    let missing = app.request("GET", "/api/auth/me", None, None).await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(parse_body(missing).await["message"], "Token de autenticación requerido");

    let garbage = app.request("GET", "/api/auth/me", Some("abc.def.ghi"), None).await;
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(parse_body(garbage).await["message"], "Token inválido");

    let token = app.admin_token().await;
    let me = app.request("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(me.status(), StatusCode::OK);
    let body = parse_body(me).await;
    assert_eq!(body["data"]["username"], "admin");
    assert_eq!(body["data"]["profile"]["permisos"]["users"], true);
}

#[tokio::test]
async fn test_expired_token_is_rejected() {
    let app = TestApp::new().await;
    let admin = app.state.user_repo.find_by_username("admin").await.unwrap().unwrap();

    let issued = Utc::now() - Duration::hours(3);
    let claims = Claims {
        iss: "test-issuer".to_string(),
        sub: admin.id.clone(),
        aud: AUDIENCE.to_string(),
        exp: (issued + Duration::hours(1)).timestamp() as usize,
        iat: issued.timestamp() as usize,
        jti: "expired-jti".to_string(),
        username: admin.username.clone(),
        rol_id: admin.rol_id.clone(),
        perfil_id: admin.perfil_id.clone(),
    };
    let key = EncodingKey::from_ed_pem(include_bytes!("keys/test_private.pem")).unwrap();
    let token = encode(&Header::new(Algorithm::EdDSA), &claims, &key).unwrap();

    let response = app.request("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(parse_body(response).await["message"], "Token expirado");
}

#[tokio::test]
async fn test_logout_revokes_the_token() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let response = app.request("POST", "/api/auth/logout", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(parse_body(response).await["success"], true);

    let response = app.request("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(parse_body(response).await["message"], "Token revocado");

    // A fresh login still works.
    let again = app.admin_token().await;
    let response = app.request("GET", "/api/auth/me", Some(&again), None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_deactivated_user_token_stops_working() {
    let app = TestApp::new().await;
    let (user_id, token) = app.user_with_profile("operador", "Usuario Estándar").await;

    let response = app.request("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let admin = app.admin_token().await;
    let response = app.request("DELETE", &format!("/api/users/{}", user_id), Some(&admin), None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.request("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(parse_body(response).await["message"], "Usuario inactivo");
}

#[tokio::test]
async fn test_health_and_unknown_routes() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["x-frame-options"], "DENY");
    let body = parse_body(response).await;
    assert_eq!(body["status"], "OK");
    assert_eq!(body["environment"], "test");

    let response = app.request("GET", "/api/no-existe", None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = parse_body(response).await;
    assert_eq!(body, json!({ "success": false, "message": "Endpoint no encontrado" }));
}
