//! Text-based persistence for `ResolverConfig` (spec.md §6's injected
//! configuration, given a CLI-facing home here since the core crate is
//! explicitly forbidden from touching env vars or disk).

use sampleforge_collect::ResolverConfig;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Loads and saves a `ResolverConfig` from a simple `key=value` text file,
/// the way `ole-library`'s `Config` does for its own settings.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub resolver: ResolverConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resolver: ResolverConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        Self::load_from(&Self::config_path()).unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    pub fn save(&self) -> io::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.serialize())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sampleforge")
            .join("config.txt")
    }

    fn parse(content: &str) -> Self {
        let mut config = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let value = value.trim();
                match key.trim() {
                    "skip_wav_decode" => config.resolver.skip_wav_decode = value == "true",
                    "no_midi" => config.resolver.no_midi = value == "true",
                    "analyze_seconds" => {
                        if let Ok(secs) = value.parse() {
                            config.resolver.analyze_seconds = secs;
                        }
                    }
                    _ => {}
                }
            }
        }
        config
    }

    fn serialize(&self) -> String {
        format!(
            "# sampleforge configuration\nskip_wav_decode={}\nno_midi={}\nanalyze_seconds={}",
            self.resolver.skip_wav_decode, self.resolver.no_midi, self.resolver.analyze_seconds
        )
    }
}
