//! 图库配置
//!
//! # 设计思路
//!
//! 图库级参数（存储键、条目上限）与编码参数集中在 `GalleryConfig`。
//! 配置文件为 JSON，缺失字段取默认值；文件不存在或无法解析时回退默认配置。

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codec::CodecConfig;
use crate::error::GalleryError;

pub const DEFAULT_STORAGE_KEY: &str = "imageGallery";
pub const DEFAULT_MAX_IMAGES: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// 图库数据所在的唯一存储键。
    pub storage_key: String,
    /// 条目上限。
    pub max_images: usize,
    pub codec: CodecConfig,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            max_images: DEFAULT_MAX_IMAGES,
            codec: CodecConfig::default(),
        }
    }
}

impl GalleryConfig {
    pub fn validate(&self) -> Result<(), GalleryError> {
        if self.storage_key.trim().is_empty() {
            return Err(GalleryError::Config("storage_key must not be empty".to_string()));
        }
        if self.max_images == 0 {
            return Err(GalleryError::Config("max_images must be at least 1".to_string()));
        }
        self.codec
            .validate()
            .map_err(|e| GalleryError::Config(e.to_string()))
    }

    /// 从 JSON 文件读取配置，失败时回退默认值。
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        let parsed = fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|content| serde_json::from_str::<Self>(&content).map_err(|e| e.to_string()));

        match parsed {
            Ok(config) => config,
            Err(err) => {
                log::warn!("⚠️ 配置文件 {} 无法读取，使用默认配置: {}", path.display(), err);
                Self::default()
            }
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), GalleryError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| GalleryError::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)
            .map_err(|e| GalleryError::Config(format!("failed to write config file: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn unique_temp_dir() -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock error")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("image-gallery-config-test-{nanos}"));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn save_and_load_config_roundtrip() {
        let dir = unique_temp_dir();
        let config_path = dir.join("gallery.json");

        let mut config = GalleryConfig::default();
        config.max_images = 12;
        config.codec.max_dimension = 800;
        config.save_to_path(&config_path).expect("save config");

        let loaded = GalleryConfig::load_from_path(&config_path);
        assert_eq!(loaded, config);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let dir = unique_temp_dir();
        let config_path = dir.join("gallery.json");
        std::fs::write(&config_path, r#"{"max_images": 5, "codec": {"jpeg_quality": 60}}"#)
            .expect("write partial config");

        let loaded = GalleryConfig::load_from_path(&config_path);
        assert_eq!(loaded.max_images, 5);
        assert_eq!(loaded.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(loaded.codec.jpeg_quality, 60);
        assert_eq!(loaded.codec.max_dimension, 1200);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn bad_or_missing_config_falls_back_to_default() {
        let dir = unique_temp_dir();
        let config_path = dir.join("gallery.json");
        assert_eq!(GalleryConfig::load_from_path(&config_path), GalleryConfig::default());

        std::fs::write(&config_path, "not-json").expect("write invalid config");
        assert_eq!(GalleryConfig::load_from_path(&config_path), GalleryConfig::default());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn validate_rejects_zero_cap_and_empty_key() {
        let mut config = GalleryConfig::default();
        config.max_images = 0;
        assert!(matches!(config.validate(), Err(GalleryError::Config(_))));

        let mut config = GalleryConfig::default();
        config.storage_key = "  ".to_string();
        assert!(matches!(config.validate(), Err(GalleryError::Config(_))));

        GalleryConfig::default().validate().expect("default is valid");
    }
}
