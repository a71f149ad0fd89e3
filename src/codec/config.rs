//! # 编码配置
//!
//! ## 设计思路
//!
//! 将所有“可调策略”集中到 `CodecConfig`，保证编码行为可观测、可调整、可测试。
//! `Default` 即生产配置：最大边长 1200、JPEG 质量 80（即 0.8）。

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

use super::CodecError;

/// 图片编码配置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// 输出图片宽/高单边最大值，超出时等比缩放。
    pub max_dimension: u32,
    /// JPEG 质量（1~100）。
    pub jpeg_quality: u8,
    /// 输入文件允许的最大体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
    /// 尺寸未超限时保留原始字节，不重新编码为 JPEG。
    pub keep_original_within_bounds: bool,
    /// 降采样滤镜。
    #[serde(with = "filter_name")]
    pub resize_filter: FilterType,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_dimension: 1200,
            jpeg_quality: 80,
            max_file_size: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
            keep_original_within_bounds: false,
            resize_filter: FilterType::Triangle,
        }
    }
}

impl CodecConfig {
    /// 校验参数范围。
    pub fn validate(&self) -> Result<(), CodecError> {
        if self.max_dimension == 0 {
            return Err(CodecError::InvalidFormat(
                "max_dimension must be at least 1".to_string(),
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(CodecError::InvalidFormat(format!(
                "jpeg_quality must be within 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        if self.max_decoded_pixels == 0 || self.max_decoded_bytes == 0 || self.max_file_size == 0 {
            return Err(CodecError::InvalidFormat(
                "resource limits must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// `FilterType` 没有实现 serde，按稳定字符串读写。
mod filter_name {
    use image::imageops::FilterType;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S>(filter: &FilterType, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let name = match filter {
            FilterType::Nearest => "nearest",
            FilterType::Triangle => "triangle",
            FilterType::CatmullRom => "catmull_rom",
            FilterType::Gaussian => "gaussian",
            FilterType::Lanczos3 => "lanczos3",
        };
        serializer.serialize_str(name)
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<FilterType, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        match name.trim().to_lowercase().as_str() {
            "nearest" => Ok(FilterType::Nearest),
            "triangle" => Ok(FilterType::Triangle),
            "catmull_rom" | "catmullrom" => Ok(FilterType::CatmullRom),
            "gaussian" => Ok(FilterType::Gaussian),
            "lanczos3" => Ok(FilterType::Lanczos3),
            other => Err(serde::de::Error::custom(format!(
                "unknown resize filter: {other} (expected nearest / triangle / catmull_rom / gaussian / lanczos3)"
            ))),
        }
    }
}
