//! # 编码编排器
//!
//! ## 设计思路
//!
//! `ImageCodec` 只负责流程编排，不接触存储与视图。处理链路固定为：
//! 1. 签名探测 + 体积校验
//! 2. 资源上限校验 + 解码（按 EXIF 方向转正）
//! 3. 按转正后的尺寸计算目标尺寸并降采样
//! 4. JPEG 编码并包装为 Data URL
//!
//! ## 实现思路
//!
//! - 配置以 `Arc<CodecConfig>` 持有，异步入口可以廉价地把配置移入阻塞线程。
//! - CPU 密集部分放到 `spawn_blocking`，不阻塞事件循环。
//! - 记录 `decode/resize/encode/total` 阶段耗时，便于性能诊断。

use std::sync::Arc;
use std::time::Instant;

use image::GenericImageView;

use super::data_url::{encode_jpeg_data_url, wrap_bytes};
use super::pipeline::scaled_dimensions;
use super::{CodecConfig, CodecError, EncodedImage};

/// 图片编码器。
#[derive(Debug, Clone)]
pub struct ImageCodec {
    config: Arc<CodecConfig>,
}

impl ImageCodec {
    /// 根据配置创建编码器，配置非法时直接拒绝。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use image_gallery::codec::{CodecConfig, ImageCodec};
    ///
    /// let codec = ImageCodec::new(CodecConfig::default())?;
    /// # Ok::<(), image_gallery::codec::CodecError>(())
    /// ```
    pub fn new(config: CodecConfig) -> Result<Self, CodecError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// 异步编码入口：在阻塞线程池中完成解码、缩放与编码。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use image_gallery::codec::{CodecConfig, ImageCodec};
    ///
    /// # async fn demo(bytes: Vec<u8>) -> Result<(), image_gallery::codec::CodecError> {
    /// let codec = ImageCodec::new(CodecConfig::default())?;
    /// let encoded = codec.encode(bytes, 1200).await?;
    /// assert!(encoded.data_url.starts_with("data:image/"));
    /// # Ok(())
    /// # }
    /// ```
    pub async fn encode(&self, bytes: Vec<u8>, max_dimension: u32) -> Result<EncodedImage, CodecError> {
        let codec = self.clone();

        tokio::task::spawn_blocking(move || codec.encode_blocking(&bytes, max_dimension))
            .await
            .map_err(|e| CodecError::Task(e.to_string()))?
    }

    /// 同步编码入口，供没有异步运行时的调用方使用。
    pub fn encode_blocking(&self, bytes: &[u8], max_dimension: u32) -> Result<EncodedImage, CodecError> {
        if max_dimension == 0 {
            return Err(CodecError::InvalidFormat(
                "max_dimension must be at least 1".to_string(),
            ));
        }

        let config = &self.config;
        let total_start = Instant::now();

        let decode_start = Instant::now();
        let raw = Self::sniff(bytes, config)?;
        let decoded = Self::decode(&raw, config)?;
        let decode_elapsed = decode_start.elapsed();

        let (source_width, source_height) = decoded.dimensions();
        let (width, height) = scaled_dimensions(source_width, source_height, max_dimension);
        let within_bounds = (width, height) == (source_width, source_height);

        if within_bounds && config.keep_original_within_bounds {
            log::info!(
                "✅ 尺寸未超限，保留原始编码 - 类型: {} 尺寸: {}x{}",
                raw.mime,
                width,
                height
            );
            return Ok(EncodedImage {
                data_url: wrap_bytes(raw.mime, raw.bytes),
                width,
                height,
            });
        }

        let resize_start = Instant::now();
        let resized = Self::downscale(decoded, width, height, config.resize_filter);
        let resize_elapsed = resize_start.elapsed();

        let encode_start = Instant::now();
        let data_url = encode_jpeg_data_url(&resized, config.jpeg_quality)?;
        let encode_elapsed = encode_start.elapsed();

        log::info!(
            "✅ 图片编码完成 - {}x{} -> {}x{} 输出={}KB decode={}ms resize={}ms encode={}ms total={}ms",
            source_width,
            source_height,
            width,
            height,
            data_url.len() / 1024,
            decode_elapsed.as_millis(),
            resize_elapsed.as_millis(),
            encode_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(EncodedImage {
            data_url,
            width,
            height,
        })
    }
}
