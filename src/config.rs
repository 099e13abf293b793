use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::gitlab::verify::SignatureScheme;

#[derive(Clone)]
pub struct Config {
    pub webhook_secret: Option<String>,
    pub signature_scheme: SignatureScheme,
    pub access_token: Option<String>,
    pub gitlab_url: String,
    pub requester: String,
    pub host: String,
    pub port: u16,
    pub shutdown_grace: Duration,
    pub push_action_delay: Duration,
    pub http_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            webhook_secret: None,
            signature_scheme: SignatureScheme::Token,
            access_token: None,
            gitlab_url: "https://gitlab.com".into(),
            requester: "labhook".into(),
            host: "0.0.0.0".into(),
            port: 8080,
            shutdown_grace: Duration::from_secs(10),
            push_action_delay: Duration::from_secs(5),
            http_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            webhook_secret: non_empty("GL_SECRET"),
            signature_scheme: match non_empty("GL_SIGNATURE_SCHEME") {
                Some(s) => s.parse()?,
                None => defaults.signature_scheme,
            },
            access_token: non_empty("GL_ACCESS_TOKEN"),
            gitlab_url: non_empty("GL_URL").unwrap_or(defaults.gitlab_url),
            requester: non_empty("GL_REQUESTER").unwrap_or(defaults.requester),
            host: non_empty("HOST").unwrap_or(defaults.host),
            port: parsed("PORT")?.unwrap_or(defaults.port),
            shutdown_grace: parsed("SHUTDOWN_GRACE_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.shutdown_grace),
            push_action_delay: parsed("PUSH_ACTION_DELAY_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.push_action_delay),
            http_timeout: parsed("HTTP_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
        })
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T: FromStr>(key: &str) -> Result<Option<T>> {
    match non_empty(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{key} must be a number, got {raw:?}"))),
        None => Ok(None),
    }
}
