use directories::ProjectDirs;
use eyre::Result;
use quire_export::{CoverOptions, PublishOptions};
use quire_export::cover::parse_hex_color;
use quire_storage::backends::filesystem::DEFAULT_MAX_MANUSCRIPT_BYTES;
use quire_types::{InkType, PaperType};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::cli::{ImageArgs, PrintArgs};

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub publish: PublishConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LibraryConfig {
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PublishConfig {
    pub paper: PaperType,
    pub ink: InkType,
    /// Publish only the first N chapters as the web edition.
    pub html_chapter_limit: Option<usize>,
    pub generate_cover: bool,
    /// Back cover background as `#rrggbb`.
    pub back_color: String,
    /// Spine background as `#rrggbb`.
    pub spine_color: String,
    pub max_manuscript_bytes: u64,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            path: get_default_data_dir()
                .join("library")
                .to_string_lossy()
                .to_string(),
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            paper: PaperType::White,
            ink: InkType::Bw,
            html_chapter_limit: None,
            generate_cover: false,
            back_color: hex_color(CoverOptions::DEFAULT_BACK_COLOR),
            spine_color: hex_color(CoverOptions::DEFAULT_SPINE_COLOR),
            max_manuscript_bytes: DEFAULT_MAX_MANUSCRIPT_BYTES,
        }
    }
}

impl Config {
    pub fn get_config_path() -> PathBuf {
        get_default_config_dir().join("config.json")
    }

    /// Load the config file, creating it with defaults when missing.
    pub async fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()).await
    }

    /// Load the config file without creating it; defaults when missing.
    pub async fn read() -> Result<Self> {
        Self::read_from(&Self::get_config_path()).await
    }

    async fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save_to(config_path).await?;
            return Ok(default_config);
        }
        Self::read_from(config_path).await
    }

    async fn read_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(config_path).await?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub async fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()).await
    }

    async fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, content).await?;
        Ok(())
    }

    /// Build publish options from the configured defaults, letting
    /// command-line flags override them.
    pub fn publish_options(
        &self,
        print: &PrintArgs,
        images: &ImageArgs,
        sample: Option<usize>,
        generate_cover: bool,
    ) -> Result<PublishOptions> {
        Ok(PublishOptions {
            paper: print.paper.unwrap_or(self.publish.paper),
            ink: print.ink.unwrap_or(self.publish.ink),
            html_chapter_limit: sample.or(self.publish.html_chapter_limit),
            generate_cover: generate_cover || self.publish.generate_cover,
            front_cover: images.cover.clone(),
            back_photo: images.photo.clone(),
            back_color: parse_hex_color(&self.publish.back_color)?,
            spine_color: parse_hex_color(&self.publish.spine_color)?,
            ..PublishOptions::default()
        })
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["library", "path"] => {
                self.library.path = value.to_string();
            }
            ["publish", "paper"] => {
                self.publish.paper = value.parse().map_err(|e: String| eyre::eyre!(e))?;
            }
            ["publish", "ink"] => {
                self.publish.ink = value.parse().map_err(|e: String| eyre::eyre!(e))?;
            }
            ["publish", "html_chapter_limit"] => {
                self.publish.html_chapter_limit = if value.is_empty() {
                    None
                } else {
                    let limit = value
                        .parse::<usize>()
                        .map_err(|_| eyre::eyre!("Invalid chapter count: {}", value))?;
                    if limit == 0 {
                        return Err(eyre::eyre!("Chapter limit must be at least 1"));
                    }
                    Some(limit)
                };
            }
            ["publish", "generate_cover"] => {
                self.publish.generate_cover = value
                    .parse::<bool>()
                    .map_err(|_| eyre::eyre!("Invalid boolean value: {}", value))?;
            }
            ["publish", "back_color"] => {
                parse_hex_color(value)?;
                self.publish.back_color = value.to_string();
            }
            ["publish", "spine_color"] => {
                parse_hex_color(value)?;
                self.publish.spine_color = value.to_string();
            }
            ["publish", "max_manuscript_bytes"] => {
                self.publish.max_manuscript_bytes = value
                    .parse::<u64>()
                    .map_err(|_| eyre::eyre!("Invalid byte count: {}", value))?;
            }
            _ => {
                return Err(eyre::eyre!("Unknown configuration key: {}", key));
            }
        }

        Ok(())
    }

    pub fn get_value(&self, key: &str) -> Result<String> {
        let parts: Vec<&str> = key.split('.').collect();

        let value = match parts.as_slice() {
            ["library", "path"] => self.library.path.clone(),
            ["publish", "paper"] => self.publish.paper.to_string(),
            ["publish", "ink"] => self.publish.ink.to_string(),
            ["publish", "html_chapter_limit"] => self
                .publish
                .html_chapter_limit
                .map(|limit| limit.to_string())
                .unwrap_or_default(),
            ["publish", "generate_cover"] => self.publish.generate_cover.to_string(),
            ["publish", "back_color"] => self.publish.back_color.clone(),
            ["publish", "spine_color"] => self.publish.spine_color.clone(),
            ["publish", "max_manuscript_bytes"] => self.publish.max_manuscript_bytes.to_string(),
            _ => {
                return Err(eyre::eyre!("Unknown configuration key: {}", key));
            }
        };

        Ok(value)
    }

    pub fn show_all(&self) -> String {
        format!(
            "Configuration ({}):\n\
             Library:\n\
             └─ path: {}\n\
             Publish:\n\
             ├─ paper: {}\n\
             ├─ ink: {}\n\
             ├─ html_chapter_limit: {}\n\
             ├─ generate_cover: {}\n\
             ├─ back_color: {}\n\
             ├─ spine_color: {}\n\
             └─ max_manuscript_bytes: {}",
            Self::get_config_path().display(),
            self.library.path,
            self.publish.paper,
            self.publish.ink,
            self.publish
                .html_chapter_limit
                .map(|limit| limit.to_string())
                .unwrap_or_else(|| "(all chapters)".to_string()),
            self.publish.generate_cover,
            self.publish.back_color,
            self.publish.spine_color,
            self.publish.max_manuscript_bytes,
        )
    }

    pub async fn reset() -> Result<Self> {
        let config = Self::default();
        config.save().await?;
        Ok(config)
    }
}

fn hex_color([r, g, b]: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Get the default configuration directory
fn get_default_config_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("org", "quire", "quire") {
        proj_dirs.config_dir().to_path_buf()
    } else {
        PathBuf::from(".quire").join("config")
    }
}

/// Get the default data directory
fn get_default_data_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("org", "quire", "quire") {
        proj_dirs.data_dir().to_path_buf()
    } else {
        PathBuf::from(".quire").join("data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_round_trip_through_keys() {
        let mut config = Config::default();
        config.set_value("publish.paper", "cream").unwrap();
        config.set_value("publish.html_chapter_limit", "3").unwrap();
        config.set_value("publish.back_color", "#102030").unwrap();

        assert_eq!(config.get_value("publish.paper").unwrap(), "cream");
        assert_eq!(config.get_value("publish.html_chapter_limit").unwrap(), "3");
        assert_eq!(config.get_value("publish.back_color").unwrap(), "#102030");

        config.set_value("publish.html_chapter_limit", "").unwrap();
        assert_eq!(config.get_value("publish.html_chapter_limit").unwrap(), "");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = Config::default();
        assert!(config.set_value("publish.ink", "sepia").is_err());
        assert!(config.set_value("publish.back_color", "navy").is_err());
        assert!(config.set_value("publish.html_chapter_limit", "0").is_err());
        assert!(config.set_value("export.format", "epub").is_err());
        assert_eq!(config.publish.ink, InkType::Bw);
    }

    #[test]
    fn test_flags_override_configured_defaults() {
        let mut config = Config::default();
        config.publish.paper = PaperType::Cream;
        config.publish.html_chapter_limit = Some(5);

        let print = PrintArgs {
            paper: Some(PaperType::White),
            ink: None,
        };
        let options = config
            .publish_options(&print, &ImageArgs::default(), None, true)
            .unwrap();

        assert_eq!(options.paper, PaperType::White);
        assert_eq!(options.ink, InkType::Bw);
        assert_eq!(options.html_chapter_limit, Some(5));
        assert!(options.generate_cover);
        assert_eq!(options.back_color, CoverOptions::DEFAULT_BACK_COLOR);
    }

    #[test]
    fn test_config_deserializes_with_missing_sections() {
        let config: Config = serde_json::from_str(r#"{"library": {"path": "/books"}}"#).unwrap();
        assert_eq!(config.library.path, "/books");
        assert_eq!(config.publish.paper, PaperType::White);
    }

    #[tokio::test]
    async fn test_read_does_not_create_config_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("quire").join("config.json");

        let config = Config::read_from(&path).await.unwrap();
        assert_eq!(config.publish.paper, PaperType::White);
        assert!(!path.exists());

        Config::load_from(&path).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_saved_values_are_read_back() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");

        let mut config = Config::default();
        config.set_value("publish.ink", "premium-color").unwrap();
        config.save_to(&path).await.unwrap();

        let reread = Config::read_from(&path).await.unwrap();
        assert_eq!(reread.publish.ink, InkType::PremiumColor);
    }
}
