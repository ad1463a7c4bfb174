use std::collections::HashSet;

use axum::http::StatusCode;
use maud::{DOCTYPE, Markup, html};

use crate::{
    entities::{genre, movie, review, user},
    flash::{Flash, Level},
    models::MovieForm,
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

const INPUT_CLASS: &str = "mt-2 w-full rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500";
const BUTTON_CLASS: &str =
    "rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700";

/// String-typed movie form state, echoed back into the inputs both on first
/// render (prefilled from the row) and on a failed submit (user's values).
#[derive(Clone, Debug, Default)]
pub struct MovieFormValues {
    pub name: String,
    pub director: String,
    pub year: String,
    pub rating: String,
}

impl From<&MovieForm> for MovieFormValues {
    fn from(form: &MovieForm) -> Self {
        Self {
            name: form.name.clone(),
            director: form.director.clone(),
            year: form.year.clone(),
            rating: form.rating.clone(),
        }
    }
}

impl From<&movie::Model> for MovieFormValues {
    fn from(movie: &movie::Model) -> Self {
        Self {
            name: movie.name.clone(),
            director: movie.director.clone(),
            year: movie.year.to_string(),
            rating: movie.rating.map(|r| r.to_string()).unwrap_or_default(),
        }
    }
}

pub fn home_page(user: Option<&user::Model>, flash: Option<&Flash>) -> String {
    page(
        "movielog",
        user,
        flash,
        html! {
            div class="max-w-2xl mx-auto px-6 py-12" {
                div class="bg-white shadow rounded-lg p-8" {
                    h1 class="text-3xl font-bold text-gray-900" { "movielog" }
                    p class="mt-2 text-gray-600" { "Keep a list of the movies you watch, rate them, and write short reviews." }

                    @if let Some(user) = user {
                        p class="mt-6 text-gray-700" { "Welcome back, " span class="font-semibold" { (user.name) } "." }
                        a class=(format!("mt-6 inline-block {BUTTON_CLASS}")) href="/user/movies" { "My movies" }
                    } @else {
                        div class="mt-8 flex gap-4" {
                            a class=(BUTTON_CLASS) href="/login" { "Log in" }
                            a class="rounded-md border border-gray-300 px-4 py-2 font-semibold text-gray-700 hover:bg-gray-100" href="/signup" { "Sign up" }
                        }
                    }
                }
            }
        },
    )
}

pub fn login_page(flash: Option<&Flash>, errors: &[String], email: &str) -> String {
    page(
        "Log in",
        None,
        flash,
        html! {
            div class="max-w-md mx-auto px-6 py-12" {
                div class="bg-white shadow rounded-lg p-8" {
                    h1 class="text-2xl font-bold text-gray-900" { "Log in" }
                    (error_list(errors))

                    form class="mt-6 space-y-6" method="post" action="/login" {
                        div {
                            label class="block text-sm font-medium text-gray-700" for="email" { "Email" }
                            input class=(INPUT_CLASS) type="email" name="email" id="email" value=(email) required;
                        }
                        div {
                            label class="block text-sm font-medium text-gray-700" for="password" { "Password" }
                            input class=(INPUT_CLASS) type="password" name="password" id="password" required;
                        }
                        button class=(format!("w-full {BUTTON_CLASS}")) type="submit" { "Log in" }
                    }

                    p class="mt-6 text-sm text-gray-600" {
                        "No account yet? "
                        a class="text-blue-600 hover:text-blue-800" href="/signup" { "Sign up" }
                    }
                }
            }
        },
    )
}

pub fn signup_page(flash: Option<&Flash>, errors: &[String], name: &str, email: &str) -> String {
    page(
        "Sign up",
        None,
        flash,
        html! {
            div class="max-w-md mx-auto px-6 py-12" {
                div class="bg-white shadow rounded-lg p-8" {
                    h1 class="text-2xl font-bold text-gray-900" { "Sign up" }
                    (error_list(errors))

                    form class="mt-6 space-y-6" method="post" action="/signup" {
                        div {
                            label class="block text-sm font-medium text-gray-700" for="name" { "Name" }
                            input class=(INPUT_CLASS) name="name" id="name" value=(name) required;
                        }
                        div {
                            label class="block text-sm font-medium text-gray-700" for="email" { "Email" }
                            input class=(INPUT_CLASS) type="email" name="email" id="email" value=(email) required;
                        }
                        div {
                            label class="block text-sm font-medium text-gray-700" for="password" { "Password" }
                            input class=(INPUT_CLASS) type="password" name="password" id="password" minlength="6" required;
                        }
                        button class=(format!("w-full {BUTTON_CLASS}")) type="submit" { "Sign up" }
                    }

                    p class="mt-6 text-sm text-gray-600" {
                        "Already registered? "
                        a class="text-blue-600 hover:text-blue-800" href="/login" { "Log in" }
                    }
                }
            }
        },
    )
}

pub fn movies_page(user: &user::Model, flash: Option<&Flash>, movies: &[movie::Model]) -> String {
    page(
        "My movies",
        Some(user),
        flash,
        html! {
            div class="max-w-4xl mx-auto px-6 py-10" {
                div class="flex items-start justify-between gap-6" {
                    h1 class="text-3xl font-bold text-gray-900" { "My movies" }
                    a class=(BUTTON_CLASS) href="/user/movies/add_movie" { "Add movie" }
                }

                @if movies.is_empty() {
                    div class="mt-10 bg-white shadow rounded-lg p-8" {
                        p class="text-gray-600" { "Your list is empty. Add your first movie to get started." }
                    }
                } @else {
                    div class="mt-10 space-y-4" {
                        @for movie in movies {
                            (movie_card(movie))
                        }
                    }
                }
            }
        },
    )
}

pub fn movie_form_page(
    user: &user::Model,
    flash: Option<&Flash>,
    heading: &str,
    action: &str,
    errors: &[String],
    values: &MovieFormValues,
    genres: &[genre::Model],
    selected: &HashSet<i32>,
) -> String {
    page(
        heading,
        Some(user),
        flash,
        html! {
            div class="max-w-2xl mx-auto px-6 py-10" {
                div class="bg-white shadow rounded-lg p-8" {
                    h1 class="text-2xl font-bold text-gray-900" { (heading) }
                    (error_list(errors))

                    form class="mt-6 space-y-6" method="post" action=(action) {
                        div {
                            label class="block text-sm font-medium text-gray-700" for="name" { "Name" }
                            input class=(INPUT_CLASS) name="name" id="name" value=(values.name) required;
                        }
                        div {
                            label class="block text-sm font-medium text-gray-700" for="director" { "Director" }
                            input class=(INPUT_CLASS) name="director" id="director" value=(values.director) required;
                        }
                        div class="grid gap-6 md:grid-cols-2" {
                            div {
                                label class="block text-sm font-medium text-gray-700" for="year" { "Year" }
                                input class=(INPUT_CLASS) type="number" name="year" id="year" value=(values.year) min="1888" max="2100" required;
                            }
                            div {
                                label class="block text-sm font-medium text-gray-700" for="rating" { "Rating (0–10, optional)" }
                                input class=(INPUT_CLASS) type="number" name="rating" id="rating" value=(values.rating) min="0" max="10" step="0.1";
                            }
                        }

                        fieldset {
                            legend class="text-sm font-medium text-gray-700" { "Genres" }
                            @if genres.is_empty() {
                                p class="mt-2 text-sm text-gray-500" { "No genres defined yet." }
                            } @else {
                                div class="mt-2 grid grid-cols-2 gap-2 md:grid-cols-3" {
                                    @for genre in genres {
                                        label class="flex items-center gap-2 text-sm text-gray-700" {
                                            input type="checkbox" name="genres" value=(genre.id) checked[selected.contains(&genre.id)];
                                            (genre.name)
                                        }
                                    }
                                }
                            }
                        }

                        div class="flex gap-4" {
                            button class=(BUTTON_CLASS) type="submit" { "Save" }
                            a class="rounded-md border border-gray-300 px-4 py-2 font-semibold text-gray-700 hover:bg-gray-100" href="/user/movies" { "Cancel" }
                        }
                    }
                }
            }
        },
    )
}

pub fn show_movie_page(
    user: &user::Model,
    flash: Option<&Flash>,
    movie: &movie::Model,
    genres: &[genre::Model],
    reviews: &[review::Model],
    errors: &[String],
) -> String {
    page(
        &movie.name,
        Some(user),
        flash,
        html! {
            div class="max-w-3xl mx-auto px-6 py-10" {
                div class="bg-white shadow rounded-lg p-8" {
                    div class="flex items-start justify-between gap-4" {
                        div {
                            h1 class="text-3xl font-bold text-gray-900" {
                                (movie.name)
                                span class="ml-2 font-normal text-gray-500" { "(" (movie.year) ")" }
                            }
                            p class="mt-1 text-gray-600" { "Directed by " (movie.director) }
                        }
                        span class="rounded-full bg-blue-100 px-3 py-1 text-sm font-semibold text-blue-800" {
                            (format_rating(movie.rating))
                        }
                    }

                    @if !genres.is_empty() {
                        div class="mt-4 flex flex-wrap gap-2" {
                            @for genre in genres {
                                span class="rounded-full bg-gray-100 px-3 py-1 text-xs text-gray-700" { (genre.name) }
                            }
                        }
                    }

                    div class="mt-6 flex gap-4 text-sm" {
                        a class="text-blue-600 hover:text-blue-800" href=(format!("/user/movies/update_movie/{}", movie.id)) { "Edit" }
                        a class="text-gray-500 hover:text-gray-700" href="/user/movies" { "Back to list" }
                    }
                }

                div class="mt-8 bg-white shadow rounded-lg p-8" {
                    h2 class="text-xl font-semibold text-gray-900" { "Your reviews" }

                    @if reviews.is_empty() {
                        p class="mt-4 text-gray-600" { "You have not reviewed this movie yet." }
                    } @else {
                        div class="mt-4 space-y-4" {
                            @for review in reviews {
                                (review_card(review))
                            }
                        }
                    }

                    h3 class="mt-8 text-lg font-semibold text-gray-900" { "Add a review" }
                    (error_list(errors))
                    form class="mt-4 space-y-4" method="post" action=(format!("/user/movies/show_movie/{}", movie.id)) {
                        div {
                            label class="block text-sm font-medium text-gray-700" for="review" { "Review" }
                            textarea class=(INPUT_CLASS) name="review" id="review" rows="4" required {}
                        }
                        div class="md:w-1/3" {
                            label class="block text-sm font-medium text-gray-700" for="rating" { "Rating (0–10, optional)" }
                            input class=(INPUT_CLASS) type="number" name="rating" id="rating" min="0" max="10" step="0.1";
                        }
                        button class=(BUTTON_CLASS) type="submit" { "Submit review" }
                    }
                }
            }
        },
    )
}

pub fn admin_page(
    user: &user::Model,
    flash: Option<&Flash>,
    users: &[user::Model],
    genres: &[genre::Model],
) -> String {
    page(
        "Admin",
        Some(user),
        flash,
        html! {
            div class="max-w-4xl mx-auto px-6 py-10" {
                h1 class="text-3xl font-bold text-gray-900" { "Admin dashboard" }

                div class="mt-8 bg-white shadow rounded-lg p-8" {
                    h2 class="text-xl font-semibold text-gray-900" { "Users" }
                    table class="mt-4 w-full text-left text-sm" {
                        thead {
                            tr class="border-b border-gray-200 text-gray-500" {
                                th class="py-2" { "Name" }
                                th class="py-2" { "Email" }
                                th class="py-2" {}
                            }
                        }
                        tbody {
                            @for row in users {
                                tr class="border-b border-gray-100" {
                                    td class="py-2 text-gray-900" { (row.name) }
                                    td class="py-2 text-gray-600" { (row.email) }
                                    td class="py-2 text-right" {
                                        @if !row.is_admin {
                                            a class="text-red-600 hover:text-red-800" href=(format!("/admin/delete_user/{}", row.id)) { "Delete" }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }

                div class="mt-8 bg-white shadow rounded-lg p-8" {
                    h2 class="text-xl font-semibold text-gray-900" { "Genres" }

                    @if genres.is_empty() {
                        p class="mt-4 text-gray-600" { "No genres defined yet." }
                    } @else {
                        ul class="mt-4 divide-y divide-gray-100" {
                            @for genre in genres {
                                li class="flex items-start justify-between gap-4 py-3" {
                                    div {
                                        span class="font-medium text-gray-900" { (genre.name) }
                                        p class="text-sm text-gray-600" { (genre.description) }
                                    }
                                    a class="text-sm text-red-600 hover:text-red-800" href=(format!("/admin/genre/{}/delete", genre.id)) { "Delete" }
                                }
                            }
                        }
                    }

                    h3 class="mt-8 text-lg font-semibold text-gray-900" { "Add genre" }
                    form class="mt-4 space-y-4" method="post" action="/admin/add_genre" {
                        div {
                            label class="block text-sm font-medium text-gray-700" for="name" { "Name" }
                            input class=(INPUT_CLASS) name="name" id="name" required;
                        }
                        div {
                            label class="block text-sm font-medium text-gray-700" for="description" { "Description" }
                            input class=(INPUT_CLASS) name="description" id="description" required;
                        }
                        button class=(BUTTON_CLASS) type="submit" { "Add genre" }
                    }
                }
            }
        },
    )
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    page(
        "Error",
        None,
        None,
        html! {
            div class="flex min-h-[60vh] items-center justify-center px-6" {
                div class="max-w-xl w-full bg-white shadow rounded-lg p-8" {
                    h1 class="text-2xl font-bold text-gray-900" {
                        (status.as_u16()) " — " (status.canonical_reason().unwrap_or("Error"))
                    }
                    p class="mt-4 text-gray-700" { (message) }
                    a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back to home" }
                }
            }
        },
    )
}

fn page(title: &str, user: Option<&user::Model>, flash: Option<&Flash>, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " · movielog" }
                script src=(TAILWIND_CDN) {}
            }
            body class="min-h-screen bg-gray-50" {
                (nav_bar(user))
                @if let Some(flash) = flash {
                    (flash_banner(flash))
                }
                (body)
            }
        }
    }
    .into_string()
}

fn nav_bar(user: Option<&user::Model>) -> Markup {
    html! {
        nav class="bg-white shadow" {
            div class="max-w-4xl mx-auto flex items-center justify-between px-6 py-4" {
                a class="text-lg font-bold text-gray-900" href="/" { "movielog" }
                div class="flex items-center gap-4 text-sm" {
                    @if let Some(user) = user {
                        a class="text-gray-700 hover:text-gray-900" href="/user/movies" { "My movies" }
                        @if user.is_admin {
                            a class="text-gray-700 hover:text-gray-900" href="/admin" { "Admin" }
                        }
                        a class="text-gray-500 hover:text-gray-700" href="/logout" { "Log out" }
                    } @else {
                        a class="text-gray-700 hover:text-gray-900" href="/login" { "Log in" }
                        a class="text-gray-700 hover:text-gray-900" href="/signup" { "Sign up" }
                    }
                }
            }
        }
    }
}

fn flash_banner(flash: &Flash) -> Markup {
    let classes = match flash.level {
        Level::Success => "border-green-500 bg-green-50 text-green-800",
        Level::Danger => "border-red-500 bg-red-50 text-red-800",
    };

    html! {
        div class="max-w-4xl mx-auto px-6 pt-6" {
            div class=(format!("rounded-md border-l-4 p-4 text-sm {classes}")) { (flash.message) }
        }
    }
}

fn error_list(errors: &[String]) -> Markup {
    html! {
        @if !errors.is_empty() {
            div class="mt-4 rounded-md border-l-4 border-red-500 bg-red-50 p-4" {
                ul class="space-y-1 text-sm text-red-800" {
                    @for error in errors {
                        li { (error) }
                    }
                }
            }
        }
    }
}

fn movie_card(movie: &movie::Model) -> Markup {
    html! {
        div class="bg-white shadow rounded-lg p-6" {
            div class="flex items-start justify-between gap-4" {
                div {
                    h2 class="text-xl font-semibold text-gray-900" {
                        a class="hover:text-blue-700" href=(format!("/user/movies/show_movie/{}", movie.id)) {
                            (movie.name)
                        }
                        span class="ml-2 font-normal text-gray-500" { "(" (movie.year) ")" }
                    }
                    p class="mt-1 text-sm text-gray-600" { (movie.director) }
                }
                span class="rounded-full bg-blue-100 px-3 py-1 text-sm font-semibold text-blue-800" {
                    (format_rating(movie.rating))
                }
            }

            div class="mt-4 flex items-center gap-4 text-sm" {
                a class="text-blue-600 hover:text-blue-800" href=(format!("/user/movies/show_movie/{}", movie.id)) { "Details" }
                a class="text-blue-600 hover:text-blue-800" href=(format!("/user/movies/update_movie/{}", movie.id)) { "Edit" }
                form method="post" action=(format!("/user/movies/{}/remove", movie.id)) {
                    button class="text-gray-500 hover:text-gray-700" type="submit" { "Remove from list" }
                }
                form method="post" action=(format!("/user/movies/{}/delete", movie.id)) {
                    button class="text-red-600 hover:text-red-800" type="submit" { "Delete" }
                }
            }
        }
    }
}

fn review_card(review: &review::Model) -> Markup {
    html! {
        div class="rounded-md border border-gray-200 p-4" {
            div class="flex items-start justify-between gap-4" {
                p class="text-gray-700" { (review.text) }
                span class="shrink-0 text-sm font-semibold text-blue-800" {
                    (format_rating(review.rating))
                }
            }
            div class="mt-2 flex items-center justify-between" {
                span class="text-xs text-gray-500" { (format_timestamp(review.created_at)) }
                form method="post" action=(format!("/user/reviews/{}/delete", review.id)) {
                    button class="text-xs text-red-600 hover:text-red-800" type="submit" { "Delete" }
                }
            }
        }
    }
}

fn format_rating(rating: Option<f64>) -> String {
    match rating {
        Some(rating) => format!("{rating}/10"),
        None => "unrated".to_string(),
    }
}

fn format_timestamp(seconds: i64) -> String {
    jiff::Timestamp::from_second(seconds)
        .map(|ts| ts.to_zoned(jiff::tz::TimeZone::UTC).strftime("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}
