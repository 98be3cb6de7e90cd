use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{auth, health, resident, user, visit};
use crate::domain::models::{external_visit::ExternalVisit, visit::Visit};
use crate::error::AppError;
use serde_json::json;
use tower_http::{
    catch_panic::CatchPanicLayer,
    classify::ServerErrorsFailureClass,
    cors::CorsLayer,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info_span, Span, error, info, warn};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.frontend_url);

    Router::new()
        .route("/health", get(health::health_check))

        // Auth
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", post(auth::logout))

        // Users
        .route("/api/users", get(user::list_users).post(user::create_user))
        .route("/api/users/roles", get(user::list_roles))
        .route("/api/users/profiles", get(user::list_profiles))
        .route("/api/users/{id}", get(user::get_user).put(user::update_user).delete(user::delete_user))
        .route("/api/users/{id}/status", patch(user::update_status))

        // Residents
        .route("/api/residentes", get(resident::list_residents).post(resident::create_resident))
        .route("/api/residentes/estadisticas", get(resident::resident_statistics))
        .route("/api/residentes/departamento/{departamento}", get(resident::residents_by_departamento))
        .route(
            "/api/residentes/{id}",
            get(resident::get_resident).put(resident::update_resident).delete(resident::delete_resident),
        )

        // Visits
        .route("/api/visitas", get(visit::list::<Visit>).post(visit::create::<Visit>))
        .route("/api/visitas/estadisticas", get(visit::statistics::<Visit>))
        .route(
            "/api/visitas/{id}",
            get(visit::get::<Visit>).put(visit::update::<Visit>).delete(visit::delete::<Visit>),
        )
        .route("/api/visitas/{id}/salida", put(visit::register_exit::<Visit>))
        .route("/api/visitas/{id}/cancelar", put(visit::cancel::<Visit>))

        // External visits
        .route(
            "/api/visitas-externas",
            get(visit::list::<ExternalVisit>).post(visit::create::<ExternalVisit>),
        )
        .route("/api/visitas-externas/estadisticas", get(visit::statistics::<ExternalVisit>))
        .route(
            "/api/visitas-externas/{id}",
            get(visit::get::<ExternalVisit>)
                .put(visit::update::<ExternalVisit>)
                .delete(visit::delete::<ExternalVisit>),
        )
        .route("/api/visitas-externas/{id}/salida", put(visit::register_exit::<ExternalVisit>))
        .route("/api/visitas-externas/{id}/cancelar", put(visit::cancel::<ExternalVisit>))

        .fallback(not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY")))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}

fn cors_layer(frontend_url: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true);

    match HeaderValue::from_str(frontend_url) {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            warn!("FRONTEND_URL '{}' is not a valid origin; cross-origin requests will be refused", frontend_url);
            layer
        }
    }
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": "Endpoint no encontrado" })),
    )
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    error!("handler panicked: {}", detail);
    AppError::Internal.into_response()
}
