use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use url::Url;

pub const SETTINGS_FILE_NAME: &str = "scheduler.toml";
const APP_DIR_NAME: &str = "clinic_scheduler";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub log_filter: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8081/api".into(),
            log_filter: "info".into(),
        }
    }
}

/// Defaults, then the first `scheduler.toml` found, then environment overrides.
pub fn load_settings() -> ClientSettings {
    let file = settings_file_candidates()
        .into_iter()
        .find(|candidate| candidate.is_file());
    load_settings_from(file.as_deref(), |name| std::env::var(name).ok())
}

pub fn load_settings_from(
    file: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Some(path) = file {
        match fs::read_to_string(path) {
            Ok(raw) => match toml::from_str::<HashMap<String, String>>(&raw) {
                Ok(file_cfg) => {
                    if let Some(v) = file_cfg.get("api_base_url") {
                        settings.api_base_url = v.clone();
                    }
                    if let Some(v) = file_cfg.get("log_filter") {
                        settings.log_filter = v.clone();
                    }
                }
                Err(err) => {
                    tracing::warn!("ignoring malformed settings file '{}': {err}", path.display())
                }
            },
            Err(err) => tracing::warn!("could not read settings file '{}': {err}", path.display()),
        }
    }

    if let Some(v) = env("SCHEDULER_API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("SCHEDULER_LOG") {
        settings.log_filter = v;
    }

    settings
}

fn settings_file_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(SETTINGS_FILE_NAME)];
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join(APP_DIR_NAME).join(SETTINGS_FILE_NAME));
    }
    candidates
}

/// Checks that `raw` is an absolute http(s) URL and strips any trailing slash.
pub fn normalize_base_url(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim();
    let parsed =
        Url::parse(trimmed).with_context(|| format!("invalid collaborator base url '{trimmed}'"))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => bail!("unsupported scheme '{other}' in collaborator base url '{trimmed}'"),
    }
    if parsed.host_str().is_none() {
        bail!("collaborator base url '{trimmed}' has no host");
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_point_at_local_collaborator() {
        let settings = load_settings_from(None, no_env);
        assert_eq!(settings, ClientSettings::default());
        assert_eq!(settings.api_base_url, "http://localhost:8081/api");
    }

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "api_base_url = \"http://clinic.internal:9000/api\"").expect("write");
        writeln!(file, "log_filter = \"debug\"").expect("write");

        let settings = load_settings_from(Some(file.path()), no_env);

        assert_eq!(settings.api_base_url, "http://clinic.internal:9000/api");
        assert_eq!(settings.log_filter, "debug");
    }

    #[test]
    fn env_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "api_base_url = \"http://from-file/api\"").expect("write");

        let settings = load_settings_from(Some(file.path()), |name| match name {
            "APP__API_BASE_URL" => Some("http://from-env/api".to_string()),
            _ => None,
        });

        assert_eq!(settings.api_base_url, "http://from-env/api");
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "this is not toml = = =").expect("write");

        let settings = load_settings_from(Some(file.path()), no_env);
        assert_eq!(settings, ClientSettings::default());
    }

    #[test]
    fn normalizes_trailing_slash() {
        assert_eq!(
            normalize_base_url(" http://localhost:8081/api/ ").expect("valid"),
            "http://localhost:8081/api"
        );
    }

    #[test]
    fn rejects_non_http_base_url() {
        assert!(normalize_base_url("ftp://localhost/api").is_err());
        assert!(normalize_base_url("localhost:8081").is_err());
    }
}
