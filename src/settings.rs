use crate::draw::settings::CaptureSettings;
use crate::lesson::MatcherSettings;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct CoreSettings {
    /// Region capture and annotation overlay behaviour.
    #[serde(default)]
    pub capture: CaptureSettings,
    #[serde(default)]
    pub matcher: MatcherSettings,
    /// When enabled logging starts at debug level and honours `RUST_LOG`.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file that receives a copy of the log output.
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl CoreSettings {
    /// Loads settings from `path`. A missing or empty file yields defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Self = serde_json::from_str(&content)
            .map_err(|err| anyhow::anyhow!("parse settings {path}: {err}"))?;
        Ok(settings.sanitized())
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn sanitized(mut self) -> Self {
        self.capture = self.capture.sanitized();
        self
    }
}
