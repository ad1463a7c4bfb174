use std::collections::HashSet;

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::{Form, cookie::SignedCookieJar};

use crate::{
    AppState,
    auth::{self, AdminUser, CurrentUser, MaybeUser},
    error::{AppError, AppResult},
    flash,
    models::{GenreForm, LoginForm, MovieForm, ReviewForm, SignupForm},
    templates::{self, MovieFormValues},
};

pub async fn home(MaybeUser(user): MaybeUser, jar: SignedCookieJar) -> (SignedCookieJar, Html<String>) {
    let (jar, flash) = flash::take(jar);
    (jar, Html(templates::home_page(user.as_ref(), flash.as_ref())))
}

// ----- auth -----

pub async fn login_page(jar: SignedCookieJar) -> (SignedCookieJar, Html<String>) {
    let (jar, flash) = flash::take(jar);
    (jar, Html(templates::login_page(flash.as_ref(), &[], "")))
}

pub async fn login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let errors = form.validate();
    if !errors.is_empty() {
        return Ok((jar, Html(templates::login_page(None, &errors, &form.email))).into_response());
    }

    if let Some(user) = state.store.user_by_email(form.email.trim()).await? {
        if auth::verify_password(&form.password, &user.password)? {
            tracing::debug!(user_id = user.id, "login");
            let jar = auth::log_in(jar, user.id);
            if user.is_admin {
                let jar = flash::success(jar, "Admin logged in!");
                return Ok((jar, Redirect::to("/admin")).into_response());
            }
            let jar = flash::success(jar, "Logged in successfully!");
            return Ok((jar, Redirect::to("/")).into_response());
        }
    }

    let errors =
        vec!["Login unsuccessful. Please check your email and password.".to_string()];
    Ok((jar, Html(templates::login_page(None, &errors, &form.email))).into_response())
}

pub async fn signup_page(jar: SignedCookieJar) -> (SignedCookieJar, Html<String>) {
    let (jar, flash) = flash::take(jar);
    (jar, Html(templates::signup_page(flash.as_ref(), &[], "", "")))
}

pub async fn signup(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<SignupForm>,
) -> AppResult<Response> {
    let errors = form.validate(&state.config.admin_email);
    if !errors.is_empty() {
        return Ok((
            jar,
            Html(templates::signup_page(None, &errors, &form.name, &form.email)),
        )
            .into_response());
    }

    let email = form.email.trim();
    if state.store.user_by_email(email).await?.is_some() {
        let jar = flash::danger(jar, "Email is already registered. Please log in.");
        return Ok((jar, Redirect::to("/login")).into_response());
    }

    let hash = auth::hash_password(&form.password)?;
    match state.store.add_user(form.name.trim(), email, &hash, false).await {
        Ok(user) => {
            tracing::debug!(user_id = user.id, "new signup");
            let jar = auth::log_in(jar, user.id);
            let jar = flash::success(jar, "Registration successful!");
            Ok((jar, Redirect::to("/")).into_response())
        },
        // Lost a concurrent-signup race on the unique email index.
        Err(AppError::EmailTaken) => {
            let jar = flash::danger(jar, "Email is already registered. Please log in.");
            Ok((jar, Redirect::to("/login")).into_response())
        },
        Err(err) => Err(err),
    }
}

pub async fn logout(jar: SignedCookieJar) -> (SignedCookieJar, Redirect) {
    let jar = auth::log_out(jar);
    let jar = flash::success(jar, "You have been logged out.");
    (jar, Redirect::to("/login"))
}

// ----- movie list -----

pub async fn movies(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: SignedCookieJar,
) -> AppResult<(SignedCookieJar, Html<String>)> {
    let movies = state.store.movies_for_user(user.id).await?;
    let (jar, flash) = flash::take(jar);
    Ok((jar, Html(templates::movies_page(&user, flash.as_ref(), &movies))))
}

pub async fn add_movie_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: SignedCookieJar,
) -> AppResult<(SignedCookieJar, Html<String>)> {
    let genres = state.store.genres().await?;
    let (jar, flash) = flash::take(jar);
    Ok((
        jar,
        Html(templates::movie_form_page(
            &user,
            flash.as_ref(),
            "Add movie",
            "/user/movies/add_movie",
            &[],
            &MovieFormValues::default(),
            &genres,
            &HashSet::new(),
        )),
    ))
}

pub async fn add_movie(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: SignedCookieJar,
    Form(form): Form<MovieForm>,
) -> AppResult<Response> {
    match form.validate() {
        Ok(new_movie) => {
            let movie = state.store.add_movie(user.id, new_movie, &form.genres).await?;
            let jar =
                flash::success(jar, format!("Movie \"{}\" added successfully!", movie.name));
            Ok((jar, Redirect::to("/user/movies")).into_response())
        },
        Err(errors) => {
            let genres = state.store.genres().await?;
            let selected: HashSet<i32> = form.genres.iter().copied().collect();
            Ok((
                jar,
                Html(templates::movie_form_page(
                    &user,
                    None,
                    "Add movie",
                    "/user/movies/add_movie",
                    &errors,
                    &MovieFormValues::from(&form),
                    &genres,
                    &selected,
                )),
            )
                .into_response())
        },
    }
}

pub async fn update_movie_page(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: SignedCookieJar,
    Path(movie_id): Path<i32>,
) -> AppResult<(SignedCookieJar, Html<String>)> {
    let movie = state
        .store
        .movie_for_user(movie_id, user.id)
        .await?
        .ok_or(AppError::Forbidden)?;

    let genres = state.store.genres().await?;
    let selected: HashSet<i32> =
        state.store.genres_for_movie(movie_id).await?.iter().map(|g| g.id).collect();

    let (jar, flash) = flash::take(jar);
    Ok((
        jar,
        Html(templates::movie_form_page(
            &user,
            flash.as_ref(),
            "Update movie",
            &format!("/user/movies/update_movie/{movie_id}"),
            &[],
            &MovieFormValues::from(&movie),
            &genres,
            &selected,
        )),
    ))
}

pub async fn update_movie(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: SignedCookieJar,
    Path(movie_id): Path<i32>,
    Form(form): Form<MovieForm>,
) -> AppResult<Response> {
    state
        .store
        .movie_for_user(movie_id, user.id)
        .await?
        .ok_or(AppError::Forbidden)?;

    match form.validate() {
        Ok(new_movie) => {
            state.store.update_movie(movie_id, new_movie, &form.genres).await?;
            let jar = flash::success(jar, "Movie updated successfully!");
            Ok((jar, Redirect::to("/user/movies")).into_response())
        },
        Err(errors) => {
            let genres = state.store.genres().await?;
            let selected: HashSet<i32> = form.genres.iter().copied().collect();
            Ok((
                jar,
                Html(templates::movie_form_page(
                    &user,
                    None,
                    "Update movie",
                    &format!("/user/movies/update_movie/{movie_id}"),
                    &errors,
                    &MovieFormValues::from(&form),
                    &genres,
                    &selected,
                )),
            )
                .into_response())
        },
    }
}

/// Take a movie off the current user's list without deleting it for other
/// owners. The store garbage-collects the movie if this was the last link.
pub async fn remove_movie(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: SignedCookieJar,
    Path(movie_id): Path<i32>,
) -> AppResult<(SignedCookieJar, Redirect)> {
    let jar = match state.store.movie_for_user(movie_id, user.id).await? {
        Some(movie) => {
            state.store.remove_user_movie(user.id, movie_id).await?;
            flash::success(jar, format!("\"{}\" removed from your list.", movie.name))
        },
        None => flash::danger(jar, "Unauthorized action!"),
    };

    Ok((jar, Redirect::to("/user/movies")))
}

pub async fn delete_movie(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: SignedCookieJar,
    Path(movie_id): Path<i32>,
) -> AppResult<(SignedCookieJar, Redirect)> {
    // Absence from the scoped lookup means "not yours"; don't reveal more.
    let jar = match state.store.movie_for_user(movie_id, user.id).await? {
        Some(_) => {
            state.store.delete_movie(movie_id).await?;
            flash::success(jar, "Movie deleted successfully!")
        },
        None => flash::danger(jar, "Unauthorized action!"),
    };

    Ok((jar, Redirect::to("/user/movies")))
}

// ----- movie detail & reviews -----

pub async fn show_movie(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: SignedCookieJar,
    Path(movie_id): Path<i32>,
) -> AppResult<(SignedCookieJar, Html<String>)> {
    let movie = state
        .store
        .movie_for_user(movie_id, user.id)
        .await?
        .ok_or(AppError::Forbidden)?;

    let genres = state.store.genres_for_movie(movie_id).await?;
    let reviews = state.store.reviews_for_user_and_movie(movie_id, user.id).await?;

    let (jar, flash) = flash::take(jar);
    Ok((
        jar,
        Html(templates::show_movie_page(&user, flash.as_ref(), &movie, &genres, &reviews, &[])),
    ))
}

pub async fn add_review(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: SignedCookieJar,
    Path(movie_id): Path<i32>,
    Form(form): Form<ReviewForm>,
) -> AppResult<Response> {
    let movie = state
        .store
        .movie_for_user(movie_id, user.id)
        .await?
        .ok_or(AppError::Forbidden)?;

    match form.validate() {
        Ok(new_review) => {
            state.store.add_review(movie_id, user.id, new_review).await?;
            let jar = flash::success(jar, "Review added successfully!");
            Ok((jar, Redirect::to(&format!("/user/movies/show_movie/{movie_id}"))).into_response())
        },
        Err(errors) => {
            let genres = state.store.genres_for_movie(movie_id).await?;
            let reviews = state.store.reviews_for_user_and_movie(movie_id, user.id).await?;
            Ok((
                jar,
                Html(templates::show_movie_page(&user, None, &movie, &genres, &reviews, &errors)),
            )
                .into_response())
        },
    }
}

pub async fn delete_review(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    jar: SignedCookieJar,
    Path(review_id): Path<i32>,
) -> AppResult<(SignedCookieJar, Redirect)> {
    let Some(review) = state.store.review_by_id(review_id).await? else {
        let jar = flash::danger(jar, "Review not found.");
        return Ok((jar, Redirect::to("/user/movies")));
    };

    let jar = match state.store.delete_review(review_id, user.id).await {
        Ok(()) => flash::success(jar, "Review deleted successfully!"),
        Err(AppError::Forbidden) => flash::danger(jar, "Unauthorized action!"),
        Err(err) => return Err(err),
    };

    Ok((jar, Redirect::to(&format!("/user/movies/show_movie/{}", review.movie_id))))
}

// ----- admin -----

pub async fn admin_dashboard(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    jar: SignedCookieJar,
) -> AppResult<(SignedCookieJar, Html<String>)> {
    let users = state.store.users().await?;
    let genres = state.store.genres().await?;
    let (jar, flash) = flash::take(jar);
    Ok((jar, Html(templates::admin_page(&admin, flash.as_ref(), &users, &genres))))
}

pub async fn admin_add_genre(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    jar: SignedCookieJar,
    Form(form): Form<GenreForm>,
) -> AppResult<(SignedCookieJar, Redirect)> {
    let errors = form.validate();
    if !errors.is_empty() {
        let jar = flash::danger(jar, errors.join(" "));
        return Ok((jar, Redirect::to("/admin")));
    }

    let name = form.name.trim();
    if state.store.genre_by_name(name).await?.is_some() {
        let jar = flash::danger(jar, "Genre already exists.");
        return Ok((jar, Redirect::to("/admin")));
    }

    // The unique index is the real guard; a concurrent insert that slips
    // past the lookup above still comes back as GenreExists.
    let jar = match state.store.add_genre(name, form.description.trim()).await {
        Ok(_) => flash::success(jar, "Genre added successfully!"),
        Err(AppError::GenreExists) => flash::danger(jar, "Genre already exists."),
        Err(err) => return Err(err),
    };

    Ok((jar, Redirect::to("/admin")))
}

pub async fn admin_delete_genre(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    jar: SignedCookieJar,
    Path(genre_id): Path<i32>,
) -> AppResult<(SignedCookieJar, Redirect)> {
    state.store.delete_genre(genre_id).await?;
    let jar = flash::success(jar, "Genre is deleted");
    Ok((jar, Redirect::to("/admin")))
}

pub async fn admin_delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    jar: SignedCookieJar,
    Path(user_id): Path<i32>,
) -> AppResult<(SignedCookieJar, Redirect)> {
    if user_id == admin.id {
        let jar = flash::danger(jar, "You cannot delete your own account.");
        return Ok((jar, Redirect::to("/admin")));
    }

    state.store.delete_user(user_id).await?;
    let jar = flash::success(jar, "User deleted successfully!");
    Ok((jar, Redirect::to("/admin")))
}
