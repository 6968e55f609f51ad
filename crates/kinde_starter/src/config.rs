use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::{builder::{BoolishValueParser, TypedValueParser}, Args, ValueEnum};
use kinde_auth::{
    cookie_key_from_secret, AuthConfig, AuthState, CookieSessionStore, CookieSettings, Key,
    KindeProvider, MemorySessionStore, ProviderConfig, SessionStore, DEFAULT_MAX_RECORDS,
};
use url::Url;

/// Upper bound for `SESSION_TTL_DAYS` (ten years).
pub const MAX_SESSION_TTL_DAYS: u64 = 3650;

/// Where session state is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SessionBackend {
    /// Entire session in the encrypted cookie.
    Cookie,
    /// Server-side map; the cookie holds an id. Single instance only.
    Memory,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Kinde and session settings.
///
/// The five `KINDE_*` settings are optional on the command line so that the
/// server can start in setup mode and explain what is missing.
#[derive(Args)]
pub struct KindeArgs {
    /// Kinde business domain, e.g. https://acme.kinde.com
    #[arg(long, env = "KINDE_DOMAIN")]
    pub kinde_domain: Option<Url>,

    /// OAuth client id of the Kinde application
    #[arg(long, env = "KINDE_CLIENT_ID")]
    pub kinde_client_id: Option<String>,

    /// OAuth client secret of the Kinde application
    #[arg(long, env = "KINDE_CLIENT_SECRET", hide_env_values = true)]
    pub kinde_client_secret: Option<String>,

    /// Callback URL registered with Kinde
    #[arg(long, env = "KINDE_REDIRECT_URI")]
    pub kinde_redirect_uri: Option<Url>,

    /// Where Kinde sends the browser after logout
    #[arg(long, env = "KINDE_LOGOUT_REDIRECT_URI")]
    pub kinde_logout_redirect_uri: Option<String>,

    /// Secret the session cookie key is derived from
    #[arg(long, env = "SESSION_SECRET", hide_env_values = true)]
    pub session_secret: Option<String>,

    /// Mark the session cookie Secure (disable only for local HTTP)
    #[arg(
        long,
        env = "COOKIE_SECURE",
        default_value = "true",
        value_parser = BoolishValueParser::new(),
        action = clap::ArgAction::Set
    )]
    pub cookie_secure: bool,

    /// Session lifetime in days
    #[arg(long, env = "SESSION_TTL_DAYS", default_value_t = 7, value_parser = clap::value_parser!(u64).range(1..=MAX_SESSION_TTL_DAYS))]
    pub session_ttl_days: u64,

    /// Deadline for each call to the identity provider, in seconds
    #[arg(long, env = "PROVIDER_TIMEOUT_SECS", default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub provider_timeout_secs: u64,

    /// Session storage backend
    #[arg(long, env = "SESSION_BACKEND", value_enum, default_value_t = SessionBackend::Cookie)]
    pub session_backend: SessionBackend,

    /// Record cap for the memory backend
    #[arg(long, env = "SESSION_MAX_RECORDS", default_value_t = DEFAULT_MAX_RECORDS, value_parser = clap::value_parser!(u64).range(1..).map(|n| n as usize))]
    pub session_max_records: usize,
}

fn required<'a, T>(value: &'a Option<T>, name: &str) -> Result<&'a T> {
    value.as_ref().with_context(|| format!("{name} is not set"))
}

impl KindeArgs {
    /// Names of the required Kinde settings that are not set.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("KINDE_DOMAIN", self.kinde_domain.is_none()),
            ("KINDE_CLIENT_ID", self.kinde_client_id.is_none()),
            ("KINDE_CLIENT_SECRET", self.kinde_client_secret.is_none()),
            ("KINDE_REDIRECT_URI", self.kinde_redirect_uri.is_none()),
            ("KINDE_LOGOUT_REDIRECT_URI", self.kinde_logout_redirect_uri.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
        .collect()
    }

    /// Build the immutable auth configuration.
    pub fn auth_config(&self) -> Result<AuthConfig> {
        let provider = ProviderConfig::new(
            required(&self.kinde_domain, "KINDE_DOMAIN")?.clone(),
            required(&self.kinde_client_id, "KINDE_CLIENT_ID")?.clone(),
            required(&self.kinde_client_secret, "KINDE_CLIENT_SECRET")?.clone(),
            required(&self.kinde_redirect_uri, "KINDE_REDIRECT_URI")?.clone(),
            required(&self.kinde_logout_redirect_uri, "KINDE_LOGOUT_REDIRECT_URI")?.clone(),
        )
        .context("invalid Kinde provider settings")?;

        let cookie_key = match self.session_secret.as_deref() {
            Some(secret) => cookie_key_from_secret(secret).context("invalid SESSION_SECRET")?,
            None => {
                tracing::warn!(
                    "SESSION_SECRET is not set; using a random key. Sessions will not survive a restart"
                );
                Key::generate()
            }
        };

        let mut config = AuthConfig::new(provider, cookie_key);
        config.cookie_secure = self.cookie_secure;
        config.session_ttl = self
            .session_ttl_days
            .checked_mul(24 * 60 * 60)
            .map(Duration::from_secs)
            .context("SESSION_TTL_DAYS is too large")?;
        config.provider_timeout = Duration::from_secs(self.provider_timeout_secs);

        Ok(config)
    }

    /// Build the auth state: Kinde provider plus the selected session store.
    pub fn auth_state(&self) -> Result<AuthState> {
        let config = self.auth_config()?;
        let provider = KindeProvider::new(&config.provider)?;

        let settings = CookieSettings::from_config(&config);
        let sessions: Arc<dyn SessionStore> = match self.session_backend {
            SessionBackend::Cookie => Arc::new(CookieSessionStore::new(settings)),
            SessionBackend::Memory => Arc::new(MemorySessionStore::with_limit(
                settings,
                self.session_max_records,
            )),
        };

        Ok(AuthState::new(config, Arc::new(provider), sessions))
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        kinde: KindeArgs,
    }

    const REQUIRED: [&str; 11] = [
        "test",
        "--kinde-domain",
        "https://acme.kinde.com",
        "--kinde-client-id",
        "client-id",
        "--kinde-client-secret",
        "client-secret",
        "--kinde-redirect-uri",
        "http://localhost:3000/callback",
        "--kinde-logout-redirect-uri",
        "http://localhost:3000",
    ];

    fn parse(extra: &[&str]) -> Result<KindeArgs, clap::Error> {
        let args = REQUIRED.iter().chain(extra.iter()).copied();
        TestCli::try_parse_from(args).map(|cli| cli.kinde)
    }

    #[test]
    fn defaults() {
        let args = parse(&["--session-secret", "s3cret"]).unwrap();
        assert!(args.cookie_secure);
        assert_eq!(args.session_ttl_days, 7);
        assert_eq!(args.provider_timeout_secs, 10);
        assert_eq!(args.session_backend, SessionBackend::Cookie);
        assert_eq!(args.session_max_records, DEFAULT_MAX_RECORDS);

        let config = args.auth_config().unwrap();
        assert_eq!(config.session_ttl, Duration::from_secs(604_800));
        assert_eq!(config.cookie_name, "kinde_session");
        assert_eq!(
            config.provider.token_endpoint.as_str(),
            "https://acme.kinde.com/oauth2/token"
        );
    }

    #[test]
    fn cookie_secure_accepts_boolish_values() {
        let args = parse(&["--cookie-secure", "false"]).unwrap();
        assert!(!args.cookie_secure);
        let args = parse(&["--cookie-secure", "0"]).unwrap();
        assert!(!args.cookie_secure);
    }

    #[test]
    fn memory_backend() {
        let args = parse(&["--session-backend", "memory"]).unwrap();
        assert_eq!(args.session_backend, SessionBackend::Memory);
        assert!(args.auth_state().is_ok());
    }

    #[test]
    fn invalid_redirect_uri_is_rejected() {
        let mut args: Vec<&str> = REQUIRED.to_vec();
        args[8] = "not a url";
        assert!(TestCli::try_parse_from(args).is_err());
    }

    #[test]
    fn complete_settings_have_nothing_missing() {
        assert!(parse(&[]).unwrap().missing().is_empty());
    }

    #[test]
    fn missing_settings_are_reported() {
        let args = TestCli::try_parse_from([
            "test",
            "--kinde-domain",
            "https://acme.kinde.com",
            "--kinde-client-id",
            "client-id",
        ])
        .unwrap()
        .kinde;

        assert_eq!(
            args.missing(),
            vec![
                "KINDE_CLIENT_SECRET",
                "KINDE_REDIRECT_URI",
                "KINDE_LOGOUT_REDIRECT_URI"
            ]
        );
        let error = args.auth_config().unwrap_err();
        assert!(error.to_string().contains("KINDE_CLIENT_SECRET"));
    }

    #[test]
    fn zero_record_cap_is_rejected() {
        assert!(parse(&["--session-max-records", "0"]).is_err());
        let args = parse(&["--session-max-records", "500"]).unwrap();
        assert_eq!(args.session_max_records, 500);
    }

    #[test]
    fn zero_ttl_is_rejected() {
        assert!(parse(&["--session-ttl-days", "0"]).is_err());
    }

    #[test]
    fn oversized_ttl_is_rejected() {
        assert!(parse(&["--session-ttl-days", "3651"]).is_err());
        assert!(parse(&["--session-ttl-days", "18446744073709551615"]).is_err());

        let args = parse(&["--session-ttl-days", "3650"]).unwrap();
        let config = args.auth_config().unwrap();
        assert_eq!(config.session_ttl, Duration::from_secs(3650 * 86_400));
    }

    #[test]
    fn logout_redirect_uri_is_passed_through_unchanged() {
        let config = parse(&[]).unwrap().auth_config().unwrap();
        assert_eq!(config.provider.logout_redirect_uri, "http://localhost:3000");
    }

    #[test]
    fn invalid_logout_redirect_uri_fails_at_startup() {
        let mut args: Vec<&str> = REQUIRED.to_vec();
        args[10] = "not a url";
        let kinde = TestCli::try_parse_from(args).unwrap().kinde;
        assert!(kinde.auth_config().is_err());
    }

    #[test]
    fn same_secret_gives_same_key() {
        let a = parse(&["--session-secret", "s3cret"]).unwrap().auth_config().unwrap();
        let b = parse(&["--session-secret", "s3cret"]).unwrap().auth_config().unwrap();
        assert_eq!(a.cookie_key.master(), b.cookie_key.master());
    }
}
