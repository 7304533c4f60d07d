//! Worker configuration.

use std::path::{Path, PathBuf};

use reel_media::ComposeRequest;
use reel_models::ComposeConfig;

use crate::error::{WorkerError, WorkerResult};

/// Default output file name inside the story directory.
const DEFAULT_OUTPUT: &str = "output.mp4";

/// Worker configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerConfig {
    /// Story directory produced by the generators
    pub story_dir: PathBuf,
    /// Destination video
    pub output_path: PathBuf,
    /// Optional JSON file with a `ComposeConfig`
    pub compose_config: Option<PathBuf>,
    /// Fixed seed for effect selection
    pub seed: Option<u64>,
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> WorkerResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> WorkerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let story_dir = lookup("STORY_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| WorkerError::config_error("STORY_DIR is not set"))?;

        let output_path = lookup("OUTPUT_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| story_dir.join(DEFAULT_OUTPUT));

        let compose_config = lookup("COMPOSE_CONFIG")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let seed = match lookup("COMPOSE_SEED") {
            Some(raw) if !raw.trim().is_empty() => Some(raw.trim().parse::<u64>().map_err(|_| {
                WorkerError::config_error(format!("COMPOSE_SEED must be an unsigned integer, got {:?}", raw))
            })?),
            _ => None,
        };

        Ok(Self {
            story_dir,
            output_path,
            compose_config,
            seed,
        })
    }

    /// Composition settings from `compose_config`, or defaults.
    pub fn load_compose_config(&self) -> WorkerResult<ComposeConfig> {
        match &self.compose_config {
            Some(path) => read_compose_config(path),
            None => Ok(ComposeConfig::default()),
        }
    }

    pub fn request(&self) -> ComposeRequest {
        let request = ComposeRequest::new(&self.story_dir, &self.output_path);
        match self.seed {
            Some(seed) => request.with_seed(seed),
            None => request,
        }
    }
}

fn read_compose_config(path: &Path) -> WorkerResult<ComposeConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        WorkerError::config_error(format!("cannot read {}: {}", path.display(), e))
    })?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = WorkerConfig::from_lookup(lookup(&[("STORY_DIR", "/stories/fox")])).unwrap();
        assert_eq!(config.output_path, PathBuf::from("/stories/fox/output.mp4"));
        assert_eq!(config.seed, None);
        assert_eq!(config.load_compose_config().unwrap(), ComposeConfig::default());
    }

    #[test]
    fn test_story_dir_required() {
        let err = WorkerConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("STORY_DIR"));
    }

    #[test]
    fn test_seed_parsing() {
        let config = WorkerConfig::from_lookup(lookup(&[
            ("STORY_DIR", "/s"),
            ("COMPOSE_SEED", "42"),
            ("OUTPUT_PATH", "/out/a.mp4"),
        ]))
        .unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.request().seed, Some(42));
        assert_eq!(config.request().output, PathBuf::from("/out/a.mp4"));

        assert!(WorkerConfig::from_lookup(lookup(&[("STORY_DIR", "/s"), ("COMPOSE_SEED", "abc")])).is_err());
    }

    #[test]
    fn test_partial_compose_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("compose.json");
        std::fs::write(&path, r#"{"fps": 24, "slideshow": {"fade_duration": 0.5}}"#).unwrap();

        let config = WorkerConfig {
            story_dir: dir.path().to_path_buf(),
            output_path: dir.path().join("out.mp4"),
            compose_config: Some(path),
            seed: None,
        };
        let compose = config.load_compose_config().unwrap();

        assert_eq!(compose.fps, 24);
        assert_eq!(compose.slideshow.fade_duration, 0.5);
        assert_eq!(compose.slideshow.slide_duration, 0.4);
        assert_eq!(compose.width, 1280);
    }
}
