pub mod genre;
pub mod movie;
pub mod movie_genre;
pub mod review;
pub mod user;
pub mod user_movie;
