use std::net::SocketAddr;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub secret_key: String,
    pub admin_email: String,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().context("PORT")?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://movielog.db?mode=rwc".to_string());

        // Session cookies are signed with a key derived from this value, so
        // changing it invalidates every live session.
        let secret_key =
            std::env::var("SECRET_KEY").unwrap_or_else(|_| "dev-secret-change-me".to_string());

        let admin_email =
            std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@admin.com".to_string());

        let admin_password = std::env::var("ADMIN_PASSWORD").ok().filter(|p| !p.is_empty());

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            secret_key,
            admin_email,
            admin_password,
        })
    }
}
