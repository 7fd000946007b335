//! API routes.

use axum::middleware;
use axum::routing::{delete, get, post, put};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::admin::{
    approve_employer, deactivate_job, delete_user, get_stats, list_disputes, list_users,
    pending_employers, reject_employer, resolve_dispute, set_dispute_status, update_user_status,
};
use crate::handlers::applications::{
    apply, job_applications, my_applications, stats as application_stats, update_status, withdraw,
};
use crate::handlers::auth::{change_password, login, me, register};
use crate::handlers::disputes::file_dispute;
use crate::handlers::jobs::{
    create_job, delete_job, get_job, job_stats, list_jobs, list_saved_jobs, save_job, unsave_job,
    update_job,
};
use crate::handlers::notifications::{
    delete as delete_notification, list as list_notifications, mark_all_read, mark_read,
    unread_count,
};
use crate::handlers::profile::{get_profile, public_profile, update_profile};
use crate::handlers::{health, ready};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers,
    RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let auth_routes = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/change-password", post(change_password));

    let job_routes = Router::new()
        .route("/jobs", get(list_jobs))
        .route("/jobs", post(create_job))
        // Fixed segments before the catch-all id routes
        .route("/jobs/saved/list", get(list_saved_jobs))
        .route("/jobs/stats/mine", get(job_stats))
        .route("/jobs/:id", get(get_job))
        .route("/jobs/:id", put(update_job))
        .route("/jobs/:id", delete(delete_job))
        .route("/jobs/:id/save", post(save_job))
        .route("/jobs/:id/save", delete(unsave_job));

    let application_routes = Router::new()
        .route("/applications", post(apply))
        .route("/applications/mine", get(my_applications))
        .route("/applications/stats", get(application_stats))
        .route("/applications/job/:job_id", get(job_applications))
        .route("/applications/:id/status", put(update_status))
        .route("/applications/:id", delete(withdraw));

    let profile_routes = Router::new()
        .route("/profile", get(get_profile))
        .route("/profile", put(update_profile))
        .route("/profile/:id", get(public_profile));

    let notification_routes = Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/unread-count", get(unread_count))
        .route("/notifications/read-all", put(mark_all_read))
        .route("/notifications/:id/read", put(mark_read))
        .route("/notifications/:id", delete(delete_notification));

    let dispute_routes = Router::new().route("/disputes", post(file_dispute));

    let admin_routes = Router::new()
        .route("/admin/stats", get(get_stats))
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id/status", put(update_user_status))
        .route("/admin/users/:id", delete(delete_user))
        .route("/admin/employers/pending", get(pending_employers))
        .route("/admin/employers/:id/approve", put(approve_employer))
        .route("/admin/employers/:id/reject", put(reject_employer))
        .route("/admin/jobs", get(crate::handlers::admin::list_jobs))
        .route("/admin/jobs/:id/deactivate", put(deactivate_job))
        .route("/admin/disputes", get(list_disputes))
        .route("/admin/disputes/:id/status", put(set_dispute_status))
        .route("/admin/disputes/:id/resolve", put(resolve_dispute));

    let rate_limiter = std::sync::Arc::new(RateLimiterCache::new(state.config.rate_limit_rps));

    let api_routes = Router::new()
        .merge(auth_routes)
        .merge(job_routes)
        .merge(application_routes)
        .merge(profile_routes)
        .merge(notification_routes)
        .merge(dispute_routes)
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
