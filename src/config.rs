use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub basic: BasicConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub loglevel: String,
    /// Origin allowed by CORS; the web front end lives here.
    pub front_url: Url,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:9000".to_string(),
            loglevel: "info".to_string(),
            front_url: Url::parse("http://localhost:3000").expect("static default url"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: String,
    pub items_json: PathBuf,
    pub image_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            database_url: "sqlite:mercari.sqlite3".to_string(),
            items_json: PathBuf::from("items.json"),
            image_dir: PathBuf::from("images"),
        }
    }
}

impl Config {
    /// Defaults, then `config.toml`, then `ITEMS_*` env vars (`__` nests),
    /// then the bare `FRONT_URL` / `DATABASE_URL` variables.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed("ITEMS_").split("__"))
            .merge(
                Env::raw()
                    .only(&["FRONT_URL", "DATABASE_URL"])
                    .map(|key| {
                        if key == "FRONT_URL" {
                            "basic.front_url".into()
                        } else {
                            "storage.database_url".into()
                        }
                    }),
            )
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::from_figment(Self::figment())
    }

    pub fn from_figment(figment: Figment) -> Result<Self, figment::Error> {
        figment.extract()
    }

    /// `scheme://host[:port]`, the form CORS compares against.
    pub fn front_origin(&self) -> String {
        self.basic.front_url.origin().ascii_serialization()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_local_dev_setup() {
        let cfg = Config::default();
        assert_eq!(cfg.basic.listen_addr, "0.0.0.0:9000");
        assert_eq!(cfg.storage.backend, StorageBackend::Sqlite);
        assert_eq!(cfg.front_origin(), "http://localhost:3000");
    }

    #[test]
    fn toml_overrides_defaults() {
        let figment = Figment::from(Serialized::defaults(Config::default())).merge(Toml::string(
            r#"
            [basic]
            front_url = "https://shop.example.com/app/"

            [storage]
            backend = "json"
            items_json = "data/items.json"
            "#,
        ));
        let cfg = Config::from_figment(figment).unwrap();
        assert_eq!(cfg.storage.backend, StorageBackend::Json);
        assert_eq!(cfg.storage.items_json, PathBuf::from("data/items.json"));
        assert_eq!(cfg.storage.image_dir, PathBuf::from("images"));
        assert_eq!(cfg.front_origin(), "https://shop.example.com");
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::string("[storage]\nbackend = \"postgres\""));
        assert!(Config::from_figment(figment).is_err());
    }
}
