use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use crate::{auth, config::Config, error::AppResult, store::Store};

pub async fn connect_and_migrate(database_url: &str) -> AppResult<DatabaseConnection> {
    let db = Database::connect(database_url).await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA journal_mode=WAL".to_string(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA synchronous=NORMAL".to_string(),
    ))
    .await?;

    // Declared ON DELETE CASCADE rules only fire with this pragma on.
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA foreign_keys=ON".to_string(),
    ))
    .await?;

    Migrator::up(&db, None).await?;
    Ok(db)
}

/// Ensure the admin account exists. Admin credentials come from the
/// environment but the account itself is a normal row with the `is_admin`
/// role set, so login and session handling stay uniform.
pub async fn seed_admin(store: &Store, config: &Config) -> AppResult<()> {
    let Some(password) = &config.admin_password else {
        tracing::warn!("ADMIN_PASSWORD not set, skipping admin account seeding");
        return Ok(());
    };

    if store.user_by_email(&config.admin_email).await?.is_some() {
        return Ok(());
    }

    let hash = auth::hash_password(password)?;
    store.add_user("Administrator", &config.admin_email, &hash, true).await?;
    tracing::info!(email = %config.admin_email, "seeded admin account");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            addr: "127.0.0.1:0".parse().unwrap(),
            database_url: "sqlite::memory:".to_string(),
            secret_key: "test-secret".to_string(),
            admin_email: "admin@admin.com".to_string(),
            admin_password: Some("super-secret".to_string()),
        }
    }

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let db = connect_and_migrate("sqlite::memory:").await.unwrap();
        let store = Store::new(db);
        let config = test_config();

        seed_admin(&store, &config).await.unwrap();
        seed_admin(&store, &config).await.unwrap();

        let users = store.users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert!(users[0].is_admin);
        assert_eq!(users[0].email, "admin@admin.com");
    }

    #[tokio::test]
    async fn seeding_skipped_without_password() {
        let db = connect_and_migrate("sqlite::memory:").await.unwrap();
        let store = Store::new(db);
        let config = Config { admin_password: None, ..test_config() };

        seed_admin(&store, &config).await.unwrap();
        assert!(store.users().await.unwrap().is_empty());
    }
}
