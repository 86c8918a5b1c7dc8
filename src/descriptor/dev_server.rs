//! Development server settings

use std::collections::BTreeMap;

use globset::Glob;
use serde::Serialize;
use tracing::debug;

use crate::config::{Config, DevServerSection, OverlaySection};
use crate::env::EnvSnapshot;
use crate::error::{ConfigError, Result};

/// Header names populated from `POWERED`
const POWERED_HEADERS: [&str; 2] = ["X-Powered-By", "Developed-By"];

/// Environment variable selecting a dev server profile
pub const PROFILE_ENV: &str = "PACKDESC_PROFILE";

/// Validated dev server configuration handed to the engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DevServerConfig {
    pub port: u16,
    pub host: String,
    pub live_reload: bool,
    pub hot_module_reload: bool,
    pub static_directories: Vec<String>,
    pub watched_paths: Vec<String>,
    pub history_fallback: bool,
    pub compress: bool,
    pub open: bool,
    pub headers: BTreeMap<String, String>,
    pub client_overlay: OverlaySection,
    pub progress: bool,
    pub write_to_disk: bool,
    pub use_polling: bool,
}

impl DevServerConfig {
    /// Layer file settings, the selected profile, then the environment
    ///
    /// Returns the config and the name of the profile applied, if any.
    pub(crate) fn resolve(
        config: &Config,
        env: &EnvSnapshot,
        profile: Option<&str>,
    ) -> Result<(Self, Option<String>)> {
        let mut section = config.dev_server.clone();

        let profile = profile.or_else(|| env.get(PROFILE_ENV));
        if let Some(name) = profile {
            let overrides = config
                .profiles
                .get(name)
                .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()))?;
            debug!("Applying dev server profile '{}'", name);
            overrides.apply(&mut section);
        }

        apply_env(&mut section, env)?;

        Ok((Self::validate(section)?, profile.map(str::to_string)))
    }

    fn validate(section: DevServerSection) -> Result<Self> {
        if section.host.trim().is_empty() {
            return Err(ConfigError::invalid("dev_server.host", "host must not be empty"));
        }

        // Set semantics with stable order
        let mut watched_paths: Vec<String> = Vec::with_capacity(section.watch.len());
        for glob in section.watch {
            Glob::new(&glob).map_err(|e| {
                ConfigError::invalid("dev_server.watch", format!("`{glob}`: {e}"))
            })?;
            if !watched_paths.contains(&glob) {
                watched_paths.push(glob);
            }
        }

        if let Some(blank) = section.static_dirs.iter().position(|d| d.trim().is_empty()) {
            return Err(ConfigError::invalid(
                format!("dev_server.static_dirs[{blank}]"),
                "directory must not be empty",
            ));
        }

        Ok(Self {
            port: section.port,
            host: section.host,
            live_reload: section.live_reload,
            hot_module_reload: section.hot,
            static_directories: section.static_dirs,
            watched_paths,
            history_fallback: section.history_fallback,
            compress: section.compress,
            open: section.open,
            headers: section.headers,
            client_overlay: section.overlay,
            progress: section.progress,
            write_to_disk: section.write_to_disk,
            use_polling: section.use_polling,
        })
    }

    /// Address the server is reachable at
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

fn apply_env(section: &mut DevServerSection, env: &EnvSnapshot) -> Result<()> {
    if let Some(port) = env.get("PORT") {
        section.port = port.parse().map_err(|e: std::num::ParseIntError| ConfigError::InvalidEnv {
            name: "PORT",
            value: port.to_string(),
            reason: e.to_string(),
        })?;
    }

    if let Some(host) = env.get("HOST") {
        section.host = host.to_string();
    }

    if let Some(powered) = env.get("POWERED") {
        for header in POWERED_HEADERS {
            section.headers.insert(header.to_string(), powered.to_string());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TWO_PROFILES: &str = r#"
entry = "js/app.js"

[dev_server]
port = 4000
static_dirs = ["public"]

[profiles.hot]
hot = true
live_reload = false

[profiles.live]
hot = false
static_dirs = ["public", "src/assets"]
watch = ["src/*.html", "public/*"]
"#;

    fn config() -> Config {
        Config::parse(TWO_PROFILES, ".").unwrap()
    }

    #[test]
    fn test_base_settings_without_profile() {
        let (dev, profile) = DevServerConfig::resolve(&config(), &EnvSnapshot::default(), None).unwrap();
        assert_eq!(profile, None);
        assert_eq!(dev.port, 4000);
        assert_eq!(dev.host, "127.0.0.1");
        assert!(dev.hot_module_reload);
        assert!(dev.live_reload);
        assert_eq!(dev.url(), "http://127.0.0.1:4000");
    }

    #[test]
    fn test_profiles_are_alternatives() {
        let env = EnvSnapshot::default();
        let (hot, _) = DevServerConfig::resolve(&config(), &env, Some("hot")).unwrap();
        let (live, _) = DevServerConfig::resolve(&config(), &env, Some("live")).unwrap();

        assert!(hot.hot_module_reload && !hot.live_reload);
        assert!(!live.hot_module_reload && live.live_reload);
        assert_eq!(live.static_directories, vec!["public", "src/assets"]);
        assert_eq!(live.watched_paths, vec!["src/*.html", "public/*"]);
    }

    #[test]
    fn test_profile_from_env() {
        let env = EnvSnapshot::from_pairs([(PROFILE_ENV, "live")]);
        let (dev, profile) = DevServerConfig::resolve(&config(), &env, None).unwrap();
        assert_eq!(profile.as_deref(), Some("live"));
        assert!(!dev.hot_module_reload);

        // Explicit selection wins over the environment
        let (_, profile) = DevServerConfig::resolve(&config(), &env, Some("hot")).unwrap();
        assert_eq!(profile.as_deref(), Some("hot"));
    }

    #[test]
    fn test_unknown_profile() {
        let err = DevServerConfig::resolve(&config(), &EnvSnapshot::default(), Some("warp")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownProfile(ref n) if n == "warp"));
    }

    #[test]
    fn test_env_overrides_file_and_profile() {
        let env = EnvSnapshot::from_pairs([("PORT", "8080"), ("HOST", "0.0.0.0"), ("POWERED", "Acme")]);
        let (dev, _) = DevServerConfig::resolve(&config(), &env, Some("live")).unwrap();

        assert_eq!(dev.port, 8080);
        assert_eq!(dev.host, "0.0.0.0");
        assert_eq!(
            dev.headers,
            BTreeMap::from([
                ("Developed-By".to_string(), "Acme".to_string()),
                ("X-Powered-By".to_string(), "Acme".to_string()),
            ])
        );
    }

    #[test]
    fn test_invalid_port_env() {
        let env = EnvSnapshot::from_pairs([("PORT", "eighty")]);
        let err = DevServerConfig::resolve(&config(), &env, None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { name: "PORT", .. }));
    }

    #[test]
    fn test_watched_paths_deduplicated_and_validated() {
        let mut cfg = config();
        cfg.dev_server.watch = vec!["public/*".into(), "public/*".into()];
        let (dev, _) = DevServerConfig::resolve(&cfg, &EnvSnapshot::default(), None).unwrap();
        assert_eq!(dev.watched_paths, vec!["public/*"]);

        cfg.dev_server.watch = vec!["src/[".into()];
        assert!(DevServerConfig::resolve(&cfg, &EnvSnapshot::default(), None).is_err());
    }
}
