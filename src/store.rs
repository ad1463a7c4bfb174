use std::collections::HashSet;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    JoinType, NotSet, PaginatorTrait, QueryFilter, QuerySelect, RelationTrait, Set, SqlErr,
    TransactionTrait,
};

use crate::{
    entities::{genre, movie, movie_genre, review, user, user_movie},
    error::{AppError, AppResult},
    models::{NewMovie, NewReview},
};

/// Sole mediator between request handlers and the schema. Cascade rules,
/// ownership scoping and the orphan-movie sweep all live here; handlers
/// never issue queries of their own.
#[derive(Clone)]
pub struct Store {
    db: DatabaseConnection,
}

impl Store {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ----- users -----

    pub async fn users(&self) -> AppResult<Vec<user::Model>> {
        Ok(user::Entity::find().all(&self.db).await?)
    }

    pub async fn user_by_id(&self, user_id: i32) -> AppResult<Option<user::Model>> {
        Ok(user::Entity::find_by_id(user_id).one(&self.db).await?)
    }

    pub async fn user_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        Ok(user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }

    pub async fn add_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> AppResult<user::Model> {
        let row = user::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            password: Set(password_hash.to_string()),
            is_admin: Set(is_admin),
        };

        match row.insert(&self.db).await {
            Ok(user) => Ok(user),
            Err(err) if is_unique_violation(&err) => Err(AppError::EmailTaken),
            Err(err) => Err(err.into()),
        }
    }

    /// Delete a user. The database cascades away their list links and
    /// reviews; any movie left with zero owners is swept in the same
    /// transaction.
    pub async fn delete_user(&self, user_id: i32) -> AppResult<()> {
        let txn = self.db.begin().await?;
        user::Entity::delete_by_id(user_id).exec(&txn).await?;
        sweep_orphan_movies(&txn).await?;
        txn.commit().await?;
        Ok(())
    }

    // ----- movies -----

    pub async fn movies_for_user(&self, user_id: i32) -> AppResult<Vec<movie::Model>> {
        Ok(movie::Entity::find()
            .join(JoinType::InnerJoin, movie::Relation::UserMovies.def())
            .filter(user_movie::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?)
    }

    /// Ownership-scoped lookup: the movie only comes back if `user_id` has
    /// a list link to it. Absence doubles as the authorization signal.
    pub async fn movie_for_user(
        &self,
        movie_id: i32,
        user_id: i32,
    ) -> AppResult<Option<movie::Model>> {
        Ok(movie::Entity::find()
            .join(JoinType::InnerJoin, movie::Relation::UserMovies.def())
            .filter(movie::Column::Id.eq(movie_id))
            .filter(user_movie::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?)
    }

    /// Create a movie together with its owner link and genre associations.
    /// One transaction, so a movie can never exist without an owner.
    pub async fn add_movie(
        &self,
        user_id: i32,
        movie: NewMovie,
        genre_ids: &[i32],
    ) -> AppResult<movie::Model> {
        let txn = self.db.begin().await?;

        let row = movie::ActiveModel {
            id: NotSet,
            name: Set(movie.name),
            director: Set(movie.director),
            year: Set(movie.year),
            rating: Set(movie.rating),
        }
        .insert(&txn)
        .await?;

        user_movie::ActiveModel {
            user_id: Set(user_id),
            movie_id: Set(row.id),
            watched_date: Set(None),
        }
        .insert(&txn)
        .await?;

        for genre_id in genre_ids {
            movie_genre::ActiveModel { genre_id: Set(*genre_id), movie_id: Set(row.id) }
                .insert(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(row)
    }

    /// Update movie fields and reconcile its genre set: associations not in
    /// `genre_ids` are dropped, new ones are added, shared ones are left
    /// untouched.
    pub async fn update_movie(
        &self,
        movie_id: i32,
        movie: NewMovie,
        genre_ids: &[i32],
    ) -> AppResult<()> {
        let txn = self.db.begin().await?;

        let Some(row) = movie::Entity::find_by_id(movie_id).one(&txn).await? else {
            return Err(AppError::NotFound);
        };

        let mut row: movie::ActiveModel = row.into();
        row.name = Set(movie.name);
        row.director = Set(movie.director);
        row.year = Set(movie.year);
        row.rating = Set(movie.rating);
        row.update(&txn).await?;

        let current: HashSet<i32> = movie_genre::Entity::find()
            .filter(movie_genre::Column::MovieId.eq(movie_id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|mg| mg.genre_id)
            .collect();
        let wanted: HashSet<i32> = genre_ids.iter().copied().collect();

        for genre_id in current.difference(&wanted) {
            remove_movie_genre_on(&txn, movie_id, *genre_id).await?;
        }
        for genre_id in wanted.difference(&current) {
            movie_genre::ActiveModel { genre_id: Set(*genre_id), movie_id: Set(movie_id) }
                .insert(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(())
    }

    /// Delete a movie. Its reviews and list links cascade away; genres are
    /// reference data and survive.
    pub async fn delete_movie(&self, movie_id: i32) -> AppResult<()> {
        movie::Entity::delete_by_id(movie_id).exec(&self.db).await?;
        Ok(())
    }

    pub async fn genres_for_movie(&self, movie_id: i32) -> AppResult<Vec<genre::Model>> {
        Ok(genre::Entity::find()
            .join(JoinType::InnerJoin, movie_genre::Relation::Genre.def().rev())
            .filter(movie_genre::Column::MovieId.eq(movie_id))
            .all(&self.db)
            .await?)
    }

    // ----- genres -----

    pub async fn genres(&self) -> AppResult<Vec<genre::Model>> {
        Ok(genre::Entity::find().all(&self.db).await?)
    }

    pub async fn genre_by_id(&self, genre_id: i32) -> AppResult<Option<genre::Model>> {
        Ok(genre::Entity::find_by_id(genre_id).one(&self.db).await?)
    }

    pub async fn genre_by_name(&self, name: &str) -> AppResult<Option<genre::Model>> {
        Ok(genre::Entity::find()
            .filter(genre::Column::Name.eq(name))
            .one(&self.db)
            .await?)
    }

    /// Insert a genre. Name uniqueness is a database constraint; the
    /// conflict is the "already exists" signal, so there is no
    /// check-then-insert race.
    pub async fn add_genre(&self, name: &str, description: &str) -> AppResult<genre::Model> {
        let row = genre::ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
            description: Set(description.to_string()),
        };

        match row.insert(&self.db).await {
            Ok(genre) => Ok(genre),
            Err(err) if is_unique_violation(&err) => Err(AppError::GenreExists),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn delete_genre(&self, genre_id: i32) -> AppResult<()> {
        genre::Entity::delete_by_id(genre_id).exec(&self.db).await?;
        Ok(())
    }

    // ----- list links -----

    pub async fn add_user_movie(
        &self,
        user_id: i32,
        movie_id: i32,
        watched_date: Option<String>,
    ) -> AppResult<()> {
        user_movie::ActiveModel {
            user_id: Set(user_id),
            movie_id: Set(movie_id),
            watched_date: Set(watched_date),
        }
        .insert(&self.db)
        .await?;
        Ok(())
    }

    /// Remove one list link. If that was the movie's last owner, the movie
    /// is garbage-collected in the same transaction.
    pub async fn remove_user_movie(&self, user_id: i32, movie_id: i32) -> AppResult<()> {
        let txn = self.db.begin().await?;

        user_movie::Entity::delete_by_id((user_id, movie_id)).exec(&txn).await?;

        let remaining = user_movie::Entity::find()
            .filter(user_movie::Column::MovieId.eq(movie_id))
            .count(&txn)
            .await?;
        if remaining == 0 {
            movie::Entity::delete_by_id(movie_id).exec(&txn).await?;
        }

        txn.commit().await?;
        Ok(())
    }

    pub async fn remove_movie_genre(&self, movie_id: i32, genre_id: i32) -> AppResult<()> {
        remove_movie_genre_on(&self.db, movie_id, genre_id).await?;
        Ok(())
    }

    // ----- reviews -----

    pub async fn review_by_id(&self, review_id: i32) -> AppResult<Option<review::Model>> {
        Ok(review::Entity::find_by_id(review_id).one(&self.db).await?)
    }

    pub async fn reviews_for_user_and_movie(
        &self,
        movie_id: i32,
        user_id: i32,
    ) -> AppResult<Vec<review::Model>> {
        Ok(review::Entity::find()
            .filter(review::Column::MovieId.eq(movie_id))
            .filter(review::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?)
    }

    pub async fn add_review(
        &self,
        movie_id: i32,
        user_id: i32,
        review: NewReview,
    ) -> AppResult<review::Model> {
        Ok(review::ActiveModel {
            id: NotSet,
            text: Set(review.text),
            rating: Set(review.rating),
            created_at: Set(now_sec()),
            user_id: Set(user_id),
            movie_id: Set(movie_id),
        }
        .insert(&self.db)
        .await?)
    }

    /// Delete a review on behalf of `user_id`. Only the owner may delete;
    /// anyone else gets `Forbidden`, a missing review is `NotFound`.
    pub async fn delete_review(&self, review_id: i32, user_id: i32) -> AppResult<()> {
        let Some(review) = self.review_by_id(review_id).await? else {
            return Err(AppError::NotFound);
        };
        if review.user_id != user_id {
            return Err(AppError::Forbidden);
        }
        review::Entity::delete_by_id(review_id).exec(&self.db).await?;
        Ok(())
    }
}

/// Delete every movie with no remaining list link. An empty link table
/// means every movie is orphaned, which the NOT IN handles correctly.
async fn sweep_orphan_movies<C: ConnectionTrait>(conn: &C) -> Result<(), DbErr> {
    let linked: Vec<i32> = user_movie::Entity::find()
        .select_only()
        .column(user_movie::Column::MovieId)
        .distinct()
        .into_tuple()
        .all(conn)
        .await?;

    movie::Entity::delete_many()
        .filter(movie::Column::Id.is_not_in(linked))
        .exec(conn)
        .await?;
    Ok(())
}

async fn remove_movie_genre_on<C: ConnectionTrait>(
    conn: &C,
    movie_id: i32,
    genre_id: i32,
) -> Result<(), DbErr> {
    movie_genre::Entity::delete_by_id((genre_id, movie_id)).exec(conn).await?;
    Ok(())
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> Store {
        let db = crate::db::connect_and_migrate("sqlite::memory:").await.unwrap();
        Store::new(db)
    }

    async fn seed_user(store: &Store, name: &str, email: &str) -> user::Model {
        store.add_user(name, email, "phc-hash", false).await.unwrap()
    }

    fn arrival() -> NewMovie {
        NewMovie {
            name: "Arrival".to_string(),
            director: "Denis Villeneuve".to_string(),
            year: 2016,
            rating: Some(8.5),
        }
    }

    async fn link_count(store: &Store) -> u64 {
        user_movie::Entity::find().count(&store.db).await.unwrap()
    }

    async fn review_count(store: &Store) -> u64 {
        review::Entity::find().count(&store.db).await.unwrap()
    }

    #[tokio::test]
    async fn scoped_fetch_requires_ownership() {
        let store = test_store().await;
        let a = seed_user(&store, "A", "a@x.com").await;
        let b = seed_user(&store, "B", "b@x.com").await;

        let movie = store.add_movie(a.id, arrival(), &[]).await.unwrap();

        assert!(store.movie_for_user(movie.id, a.id).await.unwrap().is_some());
        assert!(store.movie_for_user(movie.id, b.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleting_user_sweeps_orphaned_movies() {
        let store = test_store().await;
        let a = seed_user(&store, "A", "a@x.com").await;
        let _b = seed_user(&store, "B", "b@x.com").await;

        let movie = store.add_movie(a.id, arrival(), &[]).await.unwrap();
        store
            .add_review(movie.id, a.id, NewReview { text: "Great.".to_string(), rating: Some(9.0) })
            .await
            .unwrap();

        store.delete_user(a.id).await.unwrap();

        // No other owner: movie, link and review are all gone.
        assert!(movie::Entity::find_by_id(movie.id).one(&store.db).await.unwrap().is_none());
        assert_eq!(link_count(&store).await, 0);
        assert_eq!(review_count(&store).await, 0);
    }

    #[tokio::test]
    async fn shared_movie_survives_owner_deletion() {
        let store = test_store().await;
        let a = seed_user(&store, "A", "a@x.com").await;
        let b = seed_user(&store, "B", "b@x.com").await;

        let movie = store.add_movie(a.id, arrival(), &[]).await.unwrap();
        store.add_user_movie(b.id, movie.id, Some("2025-06-01".to_string())).await.unwrap();
        store
            .add_review(movie.id, a.id, NewReview { text: "Loved it.".to_string(), rating: None })
            .await
            .unwrap();
        store
            .add_review(movie.id, b.id, NewReview { text: "Me too.".to_string(), rating: None })
            .await
            .unwrap();

        store.delete_user(a.id).await.unwrap();

        // B still owns a link, so the movie and B's review survive.
        assert!(movie::Entity::find_by_id(movie.id).one(&store.db).await.unwrap().is_some());
        assert_eq!(link_count(&store).await, 1);
        let reviews = store.reviews_for_user_and_movie(movie.id, b.id).await.unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(review_count(&store).await, 1);
    }

    #[tokio::test]
    async fn deleting_movie_cascades_but_leaves_genres() {
        let store = test_store().await;
        let a = seed_user(&store, "A", "a@x.com").await;
        let scifi = store.add_genre("Sci-Fi", "Spaceships and such").await.unwrap();

        let movie = store.add_movie(a.id, arrival(), &[scifi.id]).await.unwrap();
        store
            .add_review(movie.id, a.id, NewReview { text: "Great.".to_string(), rating: None })
            .await
            .unwrap();

        store.delete_movie(movie.id).await.unwrap();

        assert_eq!(link_count(&store).await, 0);
        assert_eq!(review_count(&store).await, 0);
        assert_eq!(
            movie_genre::Entity::find().count(&store.db).await.unwrap(),
            0,
            "association rows must go with the movie"
        );
        assert!(store.genre_by_id(scifi.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn add_movie_creates_owner_link_and_genres() {
        let store = test_store().await;
        let a = seed_user(&store, "A", "a@x.com").await;
        let scifi = store.add_genre("Sci-Fi", "Spaceships").await.unwrap();
        let drama = store.add_genre("Drama", "Feelings").await.unwrap();

        let movie = store.add_movie(a.id, arrival(), &[scifi.id, drama.id]).await.unwrap();

        assert_eq!(store.movies_for_user(a.id).await.unwrap().len(), 1);
        let genres = store.genres_for_movie(movie.id).await.unwrap();
        let names: Vec<_> = genres.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(genres.len(), 2);
        assert!(names.contains(&"Sci-Fi") && names.contains(&"Drama"));
    }

    #[tokio::test]
    async fn update_movie_reconciles_genre_set() {
        let store = test_store().await;
        let a = seed_user(&store, "A", "a@x.com").await;
        let scifi = store.add_genre("Sci-Fi", "Spaceships").await.unwrap();
        let drama = store.add_genre("Drama", "Feelings").await.unwrap();
        let noir = store.add_genre("Noir", "Rain and cigarettes").await.unwrap();

        let movie = store.add_movie(a.id, arrival(), &[scifi.id, drama.id]).await.unwrap();

        let updated = NewMovie { rating: Some(9.0), ..arrival() };
        store.update_movie(movie.id, updated, &[drama.id, noir.id]).await.unwrap();

        let genres: HashSet<i32> =
            store.genres_for_movie(movie.id).await.unwrap().iter().map(|g| g.id).collect();
        assert_eq!(genres, HashSet::from([drama.id, noir.id]));

        let row = movie::Entity::find_by_id(movie.id).one(&store.db).await.unwrap().unwrap();
        assert_eq!(row.rating, Some(9.0));
    }

    #[tokio::test]
    async fn removing_last_link_garbage_collects_movie() {
        let store = test_store().await;
        let a = seed_user(&store, "A", "a@x.com").await;
        let b = seed_user(&store, "B", "b@x.com").await;

        let movie = store.add_movie(a.id, arrival(), &[]).await.unwrap();
        store.add_user_movie(b.id, movie.id, None).await.unwrap();

        store.remove_user_movie(a.id, movie.id).await.unwrap();
        assert!(
            movie::Entity::find_by_id(movie.id).one(&store.db).await.unwrap().is_some(),
            "movie must survive while another owner remains"
        );

        store.remove_user_movie(b.id, movie.id).await.unwrap();
        assert!(movie::Entity::find_by_id(movie.id).one(&store.db).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_genre_name_is_rejected() {
        let store = test_store().await;
        store.add_genre("Horror", "Scary").await.unwrap();

        let err = store.add_genre("Horror", "Still scary").await.unwrap_err();
        assert!(matches!(err, AppError::GenreExists));

        assert_eq!(store.genres().await.unwrap().len(), 1);
        let kept = store.genre_by_name("Horror").await.unwrap().unwrap();
        assert_eq!(kept.description, "Scary");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = test_store().await;
        seed_user(&store, "A", "a@x.com").await;

        let err = store.add_user("Imposter", "a@x.com", "phc-hash", false).await.unwrap_err();
        assert!(matches!(err, AppError::EmailTaken));
        assert_eq!(store.users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn review_deletion_enforces_ownership() {
        let store = test_store().await;
        let a = seed_user(&store, "A", "a@x.com").await;
        let b = seed_user(&store, "B", "b@x.com").await;

        let movie = store.add_movie(a.id, arrival(), &[]).await.unwrap();
        let review = store
            .add_review(movie.id, a.id, NewReview { text: "Mine.".to_string(), rating: None })
            .await
            .unwrap();

        let err = store.delete_review(review.id, b.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
        assert!(store.review_by_id(review.id).await.unwrap().is_some());

        store.delete_review(review.id, a.id).await.unwrap();
        assert!(store.review_by_id(review.id).await.unwrap().is_none());

        let err = store.delete_review(review.id, a.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[tokio::test]
    async fn remove_movie_genre_drops_one_association() {
        let store = test_store().await;
        let a = seed_user(&store, "A", "a@x.com").await;
        let scifi = store.add_genre("Sci-Fi", "Spaceships").await.unwrap();
        let drama = store.add_genre("Drama", "Feelings").await.unwrap();

        let movie = store.add_movie(a.id, arrival(), &[scifi.id, drama.id]).await.unwrap();
        store.remove_movie_genre(movie.id, scifi.id).await.unwrap();

        let genres = store.genres_for_movie(movie.id).await.unwrap();
        assert_eq!(genres.len(), 1);
        assert_eq!(genres[0].id, drama.id);
    }
}
