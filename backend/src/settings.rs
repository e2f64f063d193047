//! Runtime settings loaded via OrthoConfig.
//!
//! Session key material is read separately by
//! [`crate::inbound::http::session_config`].

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::AppCredentials;

pub const DEFAULT_SPECKLE_SERVER: &str = "https://app.speckle.systems";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Speckle application registration and server address.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SPECKLE")]
pub struct SpeckleSettings {
    /// Registered application id.
    pub app_id: Option<String>,
    /// Registered application secret.
    pub app_secret: Option<String>,
    /// Base URL of the Speckle server.
    #[ortho_config(default = DEFAULT_SPECKLE_SERVER.to_owned())]
    pub server_url: String,
    /// Timeout applied to every outbound Speckle request.
    #[ortho_config(default = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout_secs: u64,
}

impl SpeckleSettings {
    /// Configured server URL; a blank value falls back to the public server.
    pub fn server_url(&self) -> &str {
        match self.server_url.trim() {
            "" => DEFAULT_SPECKLE_SERVER,
            url => url,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Credentials when both id and secret are configured.
    pub fn credentials(&self) -> Option<AppCredentials> {
        AppCredentials::from_parts(self.app_id.as_deref(), self.app_secret.as_deref())
    }
}

/// Listener and persistence settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "MODEL_CHECKER")]
pub struct ServiceSettings {
    /// Interface to bind.
    #[ortho_config(default = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub bind_host: IpAddr,
    /// Port to bind.
    #[ortho_config(default = DEFAULT_PORT)]
    pub port: u16,
    /// PostgreSQL URL. Without it documents are kept in memory.
    pub database_url: Option<String>,
    /// Upper bound on pooled connections.
    #[ortho_config(default = DEFAULT_POOL_MAX_SIZE)]
    pub pool_max_size: u32,
}

impl ServiceSettings {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_host, self.port)
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size
    }
}

#[cfg(test)]
mod tests {
    //! Environment parsing for runtime settings.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const SPECKLE_VARS: [&str; 4] = [
        "SPECKLE_APP_ID",
        "SPECKLE_APP_SECRET",
        "SPECKLE_SERVER_URL",
        "SPECKLE_REQUEST_TIMEOUT_SECS",
    ];
    const SERVICE_VARS: [&str; 4] = [
        "MODEL_CHECKER_BIND_HOST",
        "MODEL_CHECKER_PORT",
        "MODEL_CHECKER_DATABASE_URL",
        "MODEL_CHECKER_POOL_MAX_SIZE",
    ];

    fn args() -> [OsString; 1] {
        [OsString::from("model-checker")]
    }

    #[rstest]
    fn speckle_defaults_apply_when_unset() {
        let _guard = lock_env(SPECKLE_VARS.map(|name| (name, None::<String>)));

        let settings = SpeckleSettings::load_from_iter(args()).expect("config should load");
        assert_eq!(settings.server_url(), DEFAULT_SPECKLE_SERVER);
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
        assert!(settings.credentials().is_none());
    }

    #[rstest]
    fn speckle_environment_overrides_are_respected() {
        let _guard = lock_env([
            ("SPECKLE_APP_ID", Some("app-1".to_owned())),
            ("SPECKLE_APP_SECRET", Some("s3cret".to_owned())),
            ("SPECKLE_SERVER_URL", Some("https://speckle.example".to_owned())),
            ("SPECKLE_REQUEST_TIMEOUT_SECS", Some("5".to_owned())),
        ]);

        let settings = SpeckleSettings::load_from_iter(args()).expect("config should load");
        assert_eq!(settings.server_url(), "https://speckle.example");
        assert_eq!(settings.request_timeout(), Duration::from_secs(5));
        let credentials = settings.credentials().expect("credentials");
        assert_eq!(credentials.app_id(), "app-1");
        assert_eq!(credentials.app_secret(), "s3cret");
    }

    #[rstest]
    fn speckle_credentials_need_both_parts() {
        let _guard = lock_env([
            ("SPECKLE_APP_ID", Some("app-1".to_owned())),
            ("SPECKLE_APP_SECRET", None),
            ("SPECKLE_SERVER_URL", None),
            ("SPECKLE_REQUEST_TIMEOUT_SECS", None),
        ]);

        let settings = SpeckleSettings::load_from_iter(args()).expect("config should load");
        assert!(settings.credentials().is_none());
    }

    #[rstest]
    fn service_defaults_apply_when_unset() {
        let _guard = lock_env(SERVICE_VARS.map(|name| (name, None::<String>)));

        let settings = ServiceSettings::load_from_iter(args()).expect("config should load");
        assert_eq!(settings.bind_addr(), "0.0.0.0:8000".parse().expect("addr"));
        assert!(settings.database_url().is_none());
        assert_eq!(settings.pool_max_size(), 10);
    }

    #[rstest]
    fn both_load_when_no_setting_is_present() {
        let _guard = lock_env(
            SPECKLE_VARS
                .into_iter()
                .chain(SERVICE_VARS)
                .map(|name| (name, None::<String>)),
        );

        let speckle = SpeckleSettings::load_from_iter(args()).expect("speckle config should load");
        let service = ServiceSettings::load_from_iter(args()).expect("service config should load");
        assert_eq!(speckle.server_url, DEFAULT_SPECKLE_SERVER);
        assert_eq!(speckle.request_timeout_secs, 30);
        assert_eq!(service.port, 8000);
        assert_eq!(service.bind_host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
    }

    #[rstest]
    fn blank_server_url_falls_back_to_default() {
        let _guard = lock_env([
            ("SPECKLE_APP_ID", None),
            ("SPECKLE_APP_SECRET", None),
            ("SPECKLE_SERVER_URL", Some("  ".to_owned())),
            ("SPECKLE_REQUEST_TIMEOUT_SECS", None),
        ]);

        let settings = SpeckleSettings::load_from_iter(args()).expect("config should load");
        assert_eq!(settings.server_url(), DEFAULT_SPECKLE_SERVER);
    }

    #[rstest]
    fn service_environment_overrides_are_respected() {
        let _guard = lock_env([
            ("MODEL_CHECKER_BIND_HOST", Some("127.0.0.1".to_owned())),
            ("MODEL_CHECKER_PORT", Some("9090".to_owned())),
            (
                "MODEL_CHECKER_DATABASE_URL",
                Some("postgres://localhost/checker".to_owned()),
            ),
            ("MODEL_CHECKER_POOL_MAX_SIZE", Some("4".to_owned())),
        ]);

        let settings = ServiceSettings::load_from_iter(args()).expect("config should load");
        assert_eq!(settings.bind_addr(), "127.0.0.1:9090".parse().expect("addr"));
        assert_eq!(settings.database_url(), Some("postgres://localhost/checker"));
        assert_eq!(settings.pool_max_size(), 4);
    }
}
