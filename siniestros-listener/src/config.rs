use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::webhook::MessageCatalog;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Webhook listener address. Default: 0.0.0.0:8008
    pub listen: Option<String>,
    pub metrics_listen: Option<String>,

    /// Directory to write JSONL logs (app + access).
    /// Default: ./logs
    pub log_dir: Option<PathBuf>,

    /// YAML rule file replacing the built-in scanner fragments.
    pub rules_path: Option<PathBuf>,

    /// Tree served under `/web`. Default: ./web
    pub web_dir: Option<PathBuf>,

    #[serde(default)]
    pub messages: MessageCatalog,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config failed: {}", path.display()))?;
        let mut cfg: AppConfig = serde_yaml::from_str(&text)
            .with_context(|| format!("parse config failed: {}", path.display()))?;
        cfg.resolve_paths(path.parent().unwrap_or_else(|| Path::new(".")));
        Ok(cfg)
    }

    pub fn listen_addr(&self) -> String {
        self.listen
            .clone()
            .unwrap_or_else(|| "0.0.0.0:8008".to_string())
    }

    pub fn metrics_addr(&self) -> String {
        self.metrics_listen
            .clone()
            .unwrap_or_else(|| "0.0.0.0:9100".to_string())
    }

    pub fn log_dir_path(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("logs"))
    }

    pub fn web_dir_path(&self) -> PathBuf {
        self.web_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("web"))
    }

    /// Resolve all relative paths in config based on the directory containing the config file.
    pub fn resolve_paths(&mut self, base_dir: &Path) {
        for p in [&mut self.log_dir, &mut self.rules_path, &mut self.web_dir]
            .into_iter()
            .flatten()
        {
            *p = resolve_path(base_dir, p);
        }
    }
}

fn resolve_path(base_dir: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webhook::MessageKey;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(cfg.listen_addr(), "0.0.0.0:8008");
        assert_eq!(cfg.metrics_addr(), "0.0.0.0:9100");
        assert_eq!(cfg.log_dir_path(), PathBuf::from("logs"));
        assert_eq!(cfg.web_dir_path(), PathBuf::from("web"));
        assert!(cfg.rules_path.is_none());
        assert_eq!(cfg.messages, MessageCatalog::default());
    }

    #[test]
    fn load_resolves_relative_paths_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
listen: "127.0.0.1:18008"
log_dir: logs
rules_path: rules/bots.yaml
web_dir: /srv/web
messages:
  received_structured: "Received"
"#,
        )
        .unwrap();

        let cfg = AppConfig::load(&path).unwrap();
        assert_eq!(cfg.listen_addr(), "127.0.0.1:18008");
        assert_eq!(cfg.log_dir_path(), dir.path().join("logs"));
        assert_eq!(cfg.rules_path.as_deref(), Some(dir.path().join("rules/bots.yaml").as_path()));
        assert_eq!(cfg.web_dir_path(), PathBuf::from("/srv/web"));
        assert_eq!(cfg.messages.get(MessageKey::ReceivedStructured), "Received");
        assert_eq!(cfg.messages.get(MessageKey::Blocked), "Recurso no encontrado");
    }

    #[test]
    fn load_reports_missing_file() {
        let err = AppConfig::load(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(format!("{err:#}").contains("read config failed"));
    }

    #[test]
    fn load_reports_bad_yaml() {
        let f = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(f.path(), "listen: [unterminated").unwrap();
        let err = AppConfig::load(f.path()).unwrap_err();
        assert!(format!("{err:#}").contains("parse config failed"));
    }
}
