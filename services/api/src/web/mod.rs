pub mod auth;
pub mod insights;
pub mod journal;
pub mod middleware;
pub mod mood;
pub mod rest;
pub mod state;

pub use middleware::require_auth;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use self::rest::ApiDoc;
use self::state::AppState;

/// Builds the complete application: public auth routes, the protected API,
/// CORS, request tracing, and the Swagger UI.
pub fn router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(app_state.config.cors_origin.clone())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/token/refresh", post(auth::refresh_handler))
        .route("/auth/logout", post(auth::logout_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/auth/user", get(auth::current_user_handler))
        .route(
            "/journal",
            get(journal::list_entries_handler).post(journal::create_entry_handler),
        )
        .route(
            "/journal/{id}",
            get(journal::get_entry_handler)
                .put(journal::update_entry_handler)
                .delete(journal::delete_entry_handler),
        )
        .route(
            "/moodlog",
            get(mood::list_mood_logs_handler).post(mood::create_mood_log_handler),
        )
        .route(
            "/moodlog/{id}",
            get(mood::get_mood_log_handler).delete(mood::delete_mood_log_handler),
        )
        .route(
            "/insights",
            get(insights::stored_insights_handler).post(insights::generate_insights_handler),
        )
        .route(
            "/insights/keywords",
            get(insights::keyword_tool_handler).post(insights::run_keyword_tool_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
