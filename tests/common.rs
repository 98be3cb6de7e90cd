use access_control_backend::{
    api::router::create_router,
    config::Config,
    domain::models::visit::CancelPolicy,
    domain::services::seed::seed_defaults,
    infra::factory::sqlite_state,
    state::AppState,
};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const ADMIN_PASSWORD: &str = "admin123";

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(customize: impl FnOnce(&mut Config)) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let priv_key_pem = include_str!("../tests/keys/test_private.pem");
        let pub_key_pem = include_str!("../tests/keys/test_public.pem");

        let mut config = Config {
            database_url: db_url.clone(),
            port: 0,
            environment: "test".to_string(),
            jwt_secret_key: priv_key_pem.to_string(),
            jwt_public_key: pub_key_pem.to_string(),
            auth_issuer: "test-issuer".to_string(),
            token_ttl_hours: 24,
            password_min_length: 6,
            cancel_policy: CancelPolicy::Strict,
            frontend_url: "http://localhost:3000".to_string(),
            admin_password: Some(ADMIN_PASSWORD.to_string()),
        };
        customize(&mut config);

        let state = sqlite_state(pool.clone(), &config).expect("Failed to build test state");
        seed_defaults(&state).await.expect("Failed to seed test db");
        let state = Arc::new(state);

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    /// Sends one request through the router, with an optional bearer token and JSON body.
    pub async fn request(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .request("POST", "/api/auth/login", None, Some(json!({ "username": username, "password": password })))
            .await;

        if response.status() != StatusCode::OK {
            panic!("Login failed in test helper: status {}", response.status());
        }

        let body = parse_body(response).await;
        body["token"].as_str().expect("No token in login response").to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.login("admin", ADMIN_PASSWORD).await
    }

    /// Creates a user bound to the named seeded profile and returns its id and a session token.
    pub async fn user_with_profile(&self, username: &str, profile: &str) -> (String, String) {
        let admin = self.admin_token().await;
        let role = self.state.role_repo.find_by_name("Usuario Estándar").await.unwrap().unwrap();
        let profile = self.state.profile_repo.find_by_name(profile).await.unwrap().unwrap();

        let response = self
            .request(
                "POST",
                "/api/users",
                Some(&admin),
                Some(json!({
                    "nombre": "Prueba",
                    "apellido": "Usuario",
                    "email": format!("{}@example.com", username),
                    "username": username,
                    "password": "secreto123",
                    "rol_id": role.id,
                    "perfil_id": profile.id,
                })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED, "user fixture creation failed");
        let id = parse_body(response).await["data"]["id"].as_str().unwrap().to_string();

        (id, self.login(username, "secreto123").await)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}

#[allow(dead_code)]
pub async fn parse_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
