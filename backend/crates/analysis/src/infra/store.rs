//! Store Handles
//!
//! Two credential tiers share one database: the elevated `service` tier
//! writes, the `restricted` tier reads. Each pool is created on first use
//! and cached for the life of the process; concurrent first callers wait
//! on the same initialisation.

use platform::config::{ConfigError, Env};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::fmt;
use std::str::FromStr;
use tokio::sync::OnceCell;

/// Database role credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub database_url: String,
    pub service: Credentials,
    /// `None` falls back to the service tier
    pub restricted: Option<Credentials>,
    pub max_connections: u32,
}

impl StoreSettings {
    pub fn from_env(env: &Env) -> Result<Self, ConfigError> {
        let service = Credentials {
            user: env.required("DATABASE_SERVICE_USER")?,
            password: env.required("DATABASE_SERVICE_PASSWORD")?,
        };

        let restricted = match (
            env.optional("DATABASE_RESTRICTED_USER"),
            env.optional("DATABASE_RESTRICTED_PASSWORD"),
        ) {
            (Some(user), Some(password)) => Some(Credentials { user, password }),
            (None, None) => None,
            _ => {
                return Err(ConfigError::Invalid {
                    name: "DATABASE_RESTRICTED_USER".to_string(),
                    reason: "user and password must be set together".to_string(),
                });
            }
        };

        Ok(Self {
            database_url: env.required("DATABASE_URL")?,
            service,
            restricted,
            max_connections: env.parse_or("DATABASE_MAX_CONNECTIONS", 5)?,
        })
    }

    /// Connection options for `credentials`, overriding any in the URL
    pub fn connect_options(
        &self,
        credentials: &Credentials,
    ) -> Result<PgConnectOptions, sqlx::Error> {
        Ok(PgConnectOptions::from_str(&self.database_url)?
            .username(&credentials.user)
            .password(&credentials.password))
    }
}

/// Lazily created, process-lifetime pool handles
pub struct StoreHandles {
    settings: StoreSettings,
    service: OnceCell<PgPool>,
    restricted: OnceCell<PgPool>,
}

impl StoreHandles {
    pub fn new(settings: StoreSettings) -> Self {
        if settings.restricted.is_none() {
            tracing::warn!(
                "Restricted database credentials not set; reads will use the service role"
            );
        }

        Self {
            settings,
            service: OnceCell::new(),
            restricted: OnceCell::new(),
        }
    }

    /// Elevated pool, used for writes and migrations
    pub async fn service(&self) -> Result<&PgPool, sqlx::Error> {
        self.service
            .get_or_try_init(|| self.connect(&self.settings.service, "service"))
            .await
    }

    /// Restricted pool, used for reads
    pub async fn restricted(&self) -> Result<&PgPool, sqlx::Error> {
        match &self.settings.restricted {
            Some(credentials) => {
                self.restricted
                    .get_or_try_init(|| self.connect(credentials, "restricted"))
                    .await
            }
            None => self.service().await,
        }
    }

    async fn connect(
        &self,
        credentials: &Credentials,
        tier: &'static str,
    ) -> Result<PgPool, sqlx::Error> {
        let options = self.settings.connect_options(credentials)?;

        let pool = PgPoolOptions::new()
            .max_connections(self.settings.max_connections)
            .connect_with(options)
            .await?;

        tracing::info!(tier = tier, user = %credentials.user, "Connected to database");

        Ok(pool)
    }
}
