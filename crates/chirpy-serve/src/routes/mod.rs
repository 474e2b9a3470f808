//! API route definitions.

mod admin;
mod chirps;
mod health;
mod users;

use axum::Router;
use axum::extract::Request;
use axum::http::{StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use tower_http::services::ServeDir;

use crate::hits::count_hits;
use crate::state::AppState;

pub use self::chirps::{CreateChirpRequest, ValidateChirpRequest, ValidateChirpResponse};
pub use self::users::CreateUserRequest;

/// Build the complete application router.
///
/// # Route Structure
///
/// ## Static files
/// - `GET /app/*` - Files under `filepath_root` (counted by the hit counter)
/// - `GET /app` - `301` to `/app/` (not counted)
///
/// ## API
/// - `GET /api/healthz` - Readiness probe
/// - `POST /api/users` - Create a user
/// - `POST /api/validate_chirp` - Validate and clean a chirp without storing it
/// - `POST /api/chirps` - Create a chirp
/// - `GET /api/chirps` - List all chirps, oldest first
/// - `GET /api/chirps/{chirp_id}` - Fetch one chirp
///
/// ## Admin
/// - `GET /admin/metrics` - Hit count page
/// - `POST /admin/reset` - Reset hits and delete all users (dev only)
pub fn router(state: AppState) -> Router {
    let app = Router::new()
        .nest_service("/app", ServeDir::new(&state.config.filepath_root))
        .route_layer(middleware::from_fn_with_state(state.clone(), count_hits))
        .route_layer(middleware::from_fn(redirect_app_root));

    let api = Router::new()
        .route("/healthz", get(health::readiness))
        .route("/users", post(users::create_user))
        .route("/validate_chirp", post(chirps::validate_chirp))
        .route("/chirps", post(chirps::create_chirp).get(chirps::list_chirps))
        .route("/chirps/{chirp_id}", get(chirps::get_chirp));

    let admin = Router::new()
        .route("/metrics", get(admin::metrics))
        .route("/reset", post(admin::reset));

    Router::new()
        .merge(app)
        .nest("/api", api)
        .nest("/admin", admin)
        .with_state(state)
}

/// Send a bare `/app` to `/app/` so relative links in the index resolve
/// under the static root. Runs outside the hit counter.
async fn redirect_app_root(request: Request, next: Next) -> Response {
    if request.uri().path() != "/app" {
        return next.run(request).await;
    }

    let location = match request.uri().query() {
        Some(query) => format!("/app/?{query}"),
        None => "/app/".to_string(),
    };

    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
}
