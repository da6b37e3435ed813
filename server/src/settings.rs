use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Server {
    pub port: u16,
    /// Public base URL of this service, used in verification links.
    pub url: String,
    /// Frontend base URL, used for OAuth redirects.
    pub frontend: String,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            port: 3000,
            url: "http://localhost:3000".into(),
            frontend: "http://localhost:5173".into(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct Database {
    /// Postgres connection URL. Empty runs the in-memory store.
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    /// Secret used to sign bearer tokens.
    pub secret: String,
}

impl Default for Auth {
    fn default() -> Self {
        Self {
            secret: "dev secret, change me".into(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct Google {
    pub id: String,
    pub secret: String,
    /// Callback URL registered with Google. Empty derives it from `server.url`.
    pub redirect: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct Mail {
    /// HTTP mail API endpoint. Empty logs verification links instead.
    pub endpoint: String,
    pub key: String,
    pub sender: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct Settings {
    pub server: Server,
    pub database: Database,
    pub auth: Auth,
    pub google: Google,
    pub mail: Mail,
}

impl Settings {
    pub(crate) fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("server.port", 3000)?
            .set_default("server.url", "http://localhost:3000")?
            .set_default("server.frontend", "http://localhost:5173")?
            .set_default("database.url", "")?
            .set_default("auth.secret", "dev secret, change me")?
            .set_default("google.id", "")?
            .set_default("google.secret", "")?
            .set_default("google.redirect", "")?
            .set_default("mail.endpoint", "")?
            .set_default("mail.key", "")?
            .set_default("mail.sender", "Notes <no-reply@localhost>")?
            .add_source(
                File::with_name("config.toml")
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::default().separator("_"))
            .build()?;

        config.try_deserialize()
    }

    /// Google callback URL, derived from the public URL when not set.
    pub fn google_redirect(&self) -> String {
        if self.google.redirect.is_empty() {
            format!("{}/auth/google/callback", self.server.url)
        } else {
            self.google.redirect.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::set_var;

    #[test]
    fn test_settings() {
        set_var("AUTH_SECRET", "test_secret_2");
        set_var("SERVER_FRONTEND", "http://front.example");
        let settings = Settings::new().unwrap_or_default();
        assert_eq!(settings.auth.secret, "test_secret_2");
        assert_eq!(settings.server.frontend, "http://front.example");
        assert_eq!(
            settings.google_redirect(),
            format!("{}/auth/google/callback", settings.server.url)
        );
    }
}
