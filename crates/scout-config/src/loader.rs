// SPDX-FileCopyrightText: 2026 Scout Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./scout.toml` > `~/.config/scout/scout.toml` > `/etc/scout/scout.toml`,
//! with environment variable overrides via the `SCOUT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::ScoutConfig;

pub(crate) const LOCAL_CONFIG: &str = "scout.toml";
pub(crate) const SYSTEM_CONFIG: &str = "/etc/scout/scout.toml";

/// Sections that `SCOUT_<SECTION>_<KEY>` variables map into.
const ENV_SECTIONS: &[&str] = &[
    "agent",
    "generation",
    "search",
    "extraction",
    "memory",
    "storage",
    "session",
    "gateway",
];

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("scout").join(LOCAL_CONFIG))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/scout/scout.toml`
/// 3. `~/.config/scout/scout.toml`
/// 4. `./scout.toml`
/// 5. `SCOUT_*` environment variables
pub fn load_config() -> Result<ScoutConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<ScoutConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ScoutConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ScoutConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ScoutConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the layered Figment before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(ScoutConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG))
        .merge(env_provider())
}

/// Environment provider mapping `SCOUT_SECTION_KEY` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` so underscore-containing
/// keys stay intact: `SCOUT_GENERATION_BASE_URL` becomes `generation.base_url`.
pub(crate) fn env_provider() -> Env {
    Env::prefixed("SCOUT_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key.strip_prefix(section) {
            if let Some(field) = rest.strip_prefix('_') {
                return format!("{section}.{field}");
            }
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("generation_base_url"), "generation.base_url");
        assert_eq!(map_env_key("memory_min_similarity"), "memory.min_similarity");
        assert_eq!(map_env_key("search_max_rounds"), "search.max_rounds");
        assert_eq!(map_env_key("gateway_port"), "gateway.port");
    }

    #[test]
    fn unknown_prefix_is_left_alone() {
        assert_eq!(map_env_key("telemetry_enabled"), "telemetry_enabled");
        assert_eq!(map_env_key("searching"), "searching");
    }

    #[test]
    fn env_overrides_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "scout.toml",
                r#"
[generation]
model = "from-file"
"#,
            )?;
            jail.set_env("SCOUT_GENERATION_MODEL", "from-env");
            jail.set_env("SCOUT_SEARCH_MAX_QUERIES", "5");

            let config = load_config_from_path(Path::new("scout.toml"))?;
            assert_eq!(config.generation.model, "from-env");
            assert_eq!(config.search.max_queries, 5);
            Ok(())
        });
    }
}
