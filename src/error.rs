use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,
    #[error("forbidden")]
    Forbidden,
    #[error("login required")]
    Unauthenticated,
    #[error("email is already registered")]
    EmailTaken,
    #[error("genre already exists")]
    GenreExists,
    #[error(transparent)]
    PasswordHash(#[from] argon2::password_hash::Error),
    #[error(transparent)]
    Db(#[from] sea_orm::DbErr),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthenticated => Redirect::to("/login").into_response(),
            AppError::NotFound => status_page(StatusCode::NOT_FOUND, "Page not found."),
            AppError::Forbidden => {
                status_page(StatusCode::FORBIDDEN, "You do not have access to this page.")
            },
            AppError::EmailTaken => {
                status_page(StatusCode::CONFLICT, "Email is already registered.")
            },
            AppError::GenreExists => status_page(StatusCode::CONFLICT, "Genre already exists."),
            err => {
                tracing::error!(error = %err, "request failed");
                status_page(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong.")
            },
        }
    }
}

fn status_page(status: StatusCode, message: &str) -> Response {
    let mut resp = Html(crate::templates::error_page(status, message)).into_response();
    *resp.status_mut() = status;
    resp
}

pub type AppResult<T> = Result<T, AppError>;
