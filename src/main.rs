mod auth;
mod config;
mod db;
mod entities;
mod error;
mod flash;
mod models;
mod routes;
mod store;
mod templates;

use std::sync::Arc;

use axum::{
    Router,
    extract::FromRef,
    routing::{get, post},
};
use axum_extra::extract::cookie::Key;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{config::Config, store::Store};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Store,
    cookie_key: Key,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Key {
        state.cookie_key.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,movielog=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let db = db::connect_and_migrate(&config.database_url).await?;
    let store = Store::new(db);
    db::seed_admin(&store, &config).await?;

    let cookie_key = Key::derive_from(config.secret_key.as_bytes());
    let state = AppState { config: config.clone(), store, cookie_key };

    let app = Router::new()
        .route("/", get(routes::home).post(routes::home))
        .route("/login", get(routes::login_page).post(routes::login))
        .route("/signup", get(routes::signup_page).post(routes::signup))
        .route("/logout", get(routes::logout))
        .route("/user/movies", get(routes::movies))
        .route("/user/movies/add_movie", get(routes::add_movie_page).post(routes::add_movie))
        .route(
            "/user/movies/update_movie/{movie_id}",
            get(routes::update_movie_page).post(routes::update_movie),
        )
        .route("/user/movies/{movie_id}/delete", post(routes::delete_movie))
        .route("/user/movies/{movie_id}/remove", post(routes::remove_movie))
        .route(
            "/user/movies/show_movie/{movie_id}",
            get(routes::show_movie).post(routes::add_review),
        )
        .route("/user/reviews/{review_id}/delete", post(routes::delete_review))
        .route("/admin", get(routes::admin_dashboard))
        .route("/admin/genre/{genre_id}/delete", get(routes::admin_delete_genre))
        .route("/admin/add_genre", post(routes::admin_add_genre))
        .route("/admin/delete_user/{user_id}", get(routes::admin_delete_user))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any)),
        );

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
