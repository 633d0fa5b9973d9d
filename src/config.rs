use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub user_secret: String,
    pub admin_secret: String,
    pub issuer: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub cookie_secure: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            user_secret: std::env::var("JWT_SECRET")?,
            admin_secret: std::env::var("JWT_ADMIN_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "applynext".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24),
        };
        let cookie_secure = std::env::var("COOKIE_SECURE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or_else(|_| {
                std::env::var("APP_ENV")
                    .map(|v| v == "production")
                    .unwrap_or(false)
            });
        Ok(Self {
            database_url,
            jwt,
            cookie_secure,
        })
    }
}
