//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;

use axum::error_handling::HandleErrorLayer;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::timeout::RequestBodyTimeoutLayer;

use swift_signals_core::ServiceError;

use crate::error::ApiError;
use crate::handlers::{admin, auth, health, intersections, profile, simulation};
use crate::middleware::{
    authenticate, cors_layer, handle_timeout, preflight_no_content, request_tracing,
    stamp_deadline,
};
use crate::state::GatewayState;

/// Create the gateway router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
/// - `POST /register` - Register
/// - `POST /login` - Log in
/// - `POST /reset-password` - Start password reset
///
/// ## Profile (authenticated)
/// - `POST /logout` - Log out
/// - `GET /me` - Get own profile
/// - `PATCH /me` - Update own profile
/// - `DELETE /me` - Delete own account
///
/// ## Admin (authenticated, `admin` role)
/// - `GET /admin/users?page=&page_size=` - List users
/// - `GET /admin/users/{id}` - Get user
/// - `PATCH /admin/users/{id}` - Update user
/// - `DELETE /admin/users/{id}` - Delete user
///
/// ## Intersections (authenticated)
/// - `GET /intersections` - List intersections
/// - `POST /intersections` - Create intersection
/// - `GET /intersections/{id}` - Get intersection
/// - `PATCH /intersections/{id}` - Update intersection
/// - `DELETE /intersections/{id}` - Delete intersection
/// - `GET /intersections/{id}/simulate` - Simulate default parameters
/// - `GET /intersections/{id}/optimise` - Simulate best parameters
/// - `POST /intersections/{id}/optimise` - Run optimisation (no handling timeout)
pub fn create_router(state: GatewayState) -> Router {
    // Extract config values before moving state
    let cors = cors_layer(&state.config.cors_allowed_origins);
    let max_body_bytes = state.config.max_body_bytes;
    let read_timeout = state.config.read_timeout();
    let write_timeout = state.config.write_timeout();

    let state = Arc::new(state);

    let standard = Router::new()
        // Health (public)
        .route("/health", get(health::health))
        // Auth
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/reset-password", post(auth::reset_password))
        // Profile
        .route(
            "/me",
            get(profile::get_profile)
                .patch(profile::update_profile)
                .delete(profile::delete_profile),
        )
        // Admin
        .route("/admin/users", get(admin::list_users))
        .route(
            "/admin/users/{id}",
            get(admin::get_user)
                .patch(admin::update_user)
                .delete(admin::delete_user),
        )
        // Intersections
        .route(
            "/intersections",
            get(intersections::list_intersections).post(intersections::create_intersection),
        )
        .route(
            "/intersections/{id}",
            get(intersections::get_intersection)
                .patch(intersections::update_intersection)
                .delete(intersections::delete_intersection),
        )
        // Simulation
        .route("/intersections/{id}/simulate", get(simulation::simulate))
        .route(
            "/intersections/{id}/optimise",
            get(simulation::get_optimised),
        )
        .route_layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout))
                .layer(TimeoutLayer::new(write_timeout))
                .layer(middleware::from_fn_with_state(write_timeout, stamp_deadline)),
        );

    // Bounded by the optimisation RPC deadline rather than the handling timeout
    let long_running = Router::new().route(
        "/intersections/{id}/optimise",
        post(intersections::optimise_intersection),
    );

    let router = standard
        .merge(long_running)
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(route_not_found)
        // Middleware, innermost first
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            authenticate,
        ));

    request_tracing(router)
        .layer(cors)
        .layer(middleware::from_fn(preflight_no_content))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(RequestBodyTimeoutLayer::new(read_timeout))
        .with_state(state)
}

async fn route_not_found() -> ApiError {
    ServiceError::not_found("route not found").into()
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
