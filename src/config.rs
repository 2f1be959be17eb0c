use std::path::{Path, PathBuf};

use clap::Parser;

use crate::constants::RANKING_DEFAULT_LIMIT;

const STATIC_DIR_CANDIDATES: [&str; 3] = ["public", "dist/client", "../../dist/client"];

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Arcade maze game server with a ranking API")]
pub struct ServerConfig {
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// JSON file backing the ranking table. An empty value disables rankings.
    #[arg(long, env = "RANKING_DB_PATH", default_value = ".data/rankings.json")]
    pub ranking_db: PathBuf,

    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    #[arg(long, default_value_t = RANKING_DEFAULT_LIMIT)]
    pub ranking_limit: usize,

    /// Fixed seed for every session; otherwise drawn at random per session.
    #[arg(long)]
    pub seed: Option<u32>,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    pub fn resolve_static_dir(&self) -> Option<PathBuf> {
        resolve_static_dir(self.static_dir.as_deref())
    }
}

/// First directory holding an `index.html`, preferring the configured one.
pub fn resolve_static_dir(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if path.join("index.html").is_file() {
            return Some(path.to_path_buf());
        }
    }
    STATIC_DIR_CANDIDATES
        .into_iter()
        .map(PathBuf::from)
        .find(|path| path.join("index.html").is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_apply_without_flags() {
        let config = ServerConfig::try_parse_from(["server"]).expect("parse");
        assert_eq!(config.ranking_limit, RANKING_DEFAULT_LIMIT);
        assert!(config.seed.is_none());
        assert!(config.bind_addr().starts_with("0.0.0.0:"));
    }

    #[test]
    fn flags_override_defaults() {
        let config = ServerConfig::try_parse_from([
            "server",
            "--port",
            "9001",
            "--ranking-db",
            "/tmp/r.json",
            "--ranking-limit",
            "25",
            "--seed",
            "42",
        ])
        .expect("parse");
        assert_eq!(config.port, 9001);
        assert_eq!(config.ranking_db, PathBuf::from("/tmp/r.json"));
        assert_eq!(config.ranking_limit, 25);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.bind_addr(), "0.0.0.0:9001");
    }

    #[test]
    fn configured_static_dir_needs_an_index() {
        let dir = std::env::temp_dir().join(format!(
            "static-dir-{}-{}",
            std::process::id(),
            rand::random::<u32>()
        ));
        fs::create_dir_all(&dir).expect("create dir");
        assert_ne!(resolve_static_dir(Some(&dir)).as_deref(), Some(dir.as_path()));

        fs::write(dir.join("index.html"), "<html></html>").expect("write index");
        assert_eq!(resolve_static_dir(Some(&dir)), Some(dir.clone()));

        let _ = fs::remove_dir_all(&dir);
    }
}
