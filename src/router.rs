// src/router.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn build_router(app_state: AppState) -> Router {
    // Rotas de autenticação (públicas, exceto o refresh)
    let auth_routes = Router::new()
        .route("/google", get(handlers::auth::google_authorize))
        .route("/google/callback", post(handlers::auth::google_callback))
        .route("/login", post(handlers::auth::login))
        .route("/refresh", post(handlers::auth::refresh));

    let user_routes = Router::new().route("/me", get(handlers::auth::get_me));

    // Cada handler escolhe a sua política com RequireRole
    let admin_routes = Router::new()
        .route("/pending-users", get(handlers::admin::list_pending_users))
        .route("/users/{id}", put(handlers::admin::update_user))
        .route("/users/{id}/approve", put(handlers::admin::approve_user))
        .route("/account-requests", get(handlers::admin::list_account_requests))
        .route("/account-requests/{id}", put(handlers::admin::review_account_request))
        .route("/onboarding", post(handlers::onboarding::complete_onboarding))
        .route("/events/{id}/status", put(handlers::events::review_event));

    let public_routes = Router::new()
        .route("/calendar", get(handlers::calendar::public_calendar))
        .route("/{tenant_slug}/calendar", get(handlers::calendar::tenant_calendar));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/request-account", post(handlers::accounts::request_account))
        .route("/api/account-request", post(handlers::accounts::submit_account_request))
        .route("/api/events", post(handlers::events::create_event))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api/public", public_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // A sessão é carregada para todas as rotas; quem barra é o RequireRole
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
        .with_state(app_state)
}
