//! # 解码与降采样流水线
//!
//! ## 设计思路
//!
//! 将“字节 → 图像 → 等比缩放”集中管理，并在关键节点增加资源上限控制。
//! 优先做签名与尺寸检查，再进行完整解码，降低恶意输入触发高内存开销的风险。
//!
//! ## 实现思路
//!
//! 1. `infer` 探测文件签名，非图片直接拒绝
//! 2. 仅读取 header 尺寸，按像素/内存上限快速拒绝
//! 3. 完整解码，并按 EXIF 方向旋转/翻转到显示方向
//! 4. 按显示方向的最大边长计算目标尺寸（长边等于上限，短边四舍五入）
//! 5. `fast_image_resize` 降采样，失败回退 `image::resize_exact`

use fast_image_resize as fr;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, GenericImageView, ImageBuffer, ImageDecoder, ImageReader, Rgb};
use std::io::Cursor;

use super::source::RawImageData;
use super::{CodecConfig, CodecError, ImageCodec};

/// 计算等比缩放后的目标尺寸。
///
/// 宽高均不超过 `max_dimension` 时原样返回；否则长边设为 `max_dimension`，
/// 短边按原始宽高比四舍五入，且至少为 1。
///
/// ```
/// use image_gallery::codec::scaled_dimensions;
///
/// assert_eq!(scaled_dimensions(2000, 1000, 1200), (1200, 600));
/// assert_eq!(scaled_dimensions(800, 600, 1200), (800, 600));
/// ```
pub fn scaled_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }
    if width <= max_dimension && height <= max_dimension {
        return (width, height);
    }

    let ratio = width as f64 / height as f64;
    let bound = max_dimension as f64;

    let (target_width, target_height) = if width > height {
        (max_dimension, (bound / ratio).round() as u32)
    } else {
        ((bound * ratio).round() as u32, max_dimension)
    };

    (target_width.max(1), target_height.max(1))
}

/// 旋转 90/270 度的方向会交换宽高。
fn swaps_axes(orientation: Orientation) -> bool {
    matches!(
        orientation,
        Orientation::Rotate90
            | Orientation::Rotate270
            | Orientation::Rotate90FlipH
            | Orientation::Rotate270FlipH
    )
}

/// 文本开头是 XML 声明或 `<svg` 标签。
fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    (text.starts_with("<?xml") || text.starts_with("<svg")) && text.contains("<svg")
}

impl ImageCodec {
    /// 签名探测 + 体积校验。
    pub(super) fn sniff<'a>(
        bytes: &'a [u8],
        config: &CodecConfig,
    ) -> Result<RawImageData<'a>, CodecError> {
        if bytes.is_empty() {
            return Err(CodecError::InvalidFormat("file is empty".to_string()));
        }

        if bytes.len() as u64 > config.max_file_size {
            return Err(CodecError::ResourceLimit(format!(
                "file is {:.2} MB (limit {:.2} MB)",
                bytes.len() as f64 / 1024.0 / 1024.0,
                config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }

        let kind = infer::get(bytes).ok_or_else(|| {
            if looks_like_svg(bytes) {
                CodecError::InvalidFormat("SVG images are not supported".to_string())
            } else {
                CodecError::InvalidFormat("unrecognized file signature".to_string())
            }
        })?;

        if kind.matcher_type() != infer::MatcherType::Image {
            return Err(CodecError::InvalidFormat(format!(
                "file signature is not an image: {}",
                kind.mime_type()
            )));
        }

        Ok(RawImageData {
            bytes,
            mime: kind.mime_type(),
        })
    }

    /// 校验资源上限后完整解码。
    pub(super) fn decode(
        raw: &RawImageData<'_>,
        config: &CodecConfig,
    ) -> Result<DynamicImage, CodecError> {
        let (header_width, header_height) = Self::inspect_dimensions_from_memory(raw.bytes)?;
        Self::validate_pixel_limits(config, header_width, header_height)?;
        Self::validate_decoded_memory_limits(config, header_width, header_height)?;

        let (decoded, orientation) = Self::decode_oriented(raw.bytes)?;

        let (width, height) = decoded.dimensions();
        Self::validate_pixel_limits(config, width, height)?;
        Self::validate_decoded_memory_limits(config, width, height)?;

        log::debug!(
            "🔍 解码完成 - 类型: {} 尺寸: {}x{} 方向: {:?}",
            raw.mime,
            width,
            height,
            orientation
        );

        Ok(decoded)
    }

    /// 完整解码并应用 EXIF 方向，返回显示方向的图像。
    pub(crate) fn decode_oriented(bytes: &[u8]) -> Result<(DynamicImage, Orientation), CodecError> {
        let mut decoder = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| CodecError::InvalidFormat(e.to_string()))?
            .into_decoder()
            .map_err(|e| CodecError::Decode(e.to_string()))?;

        let orientation = Self::read_orientation(&mut decoder);

        let mut image =
            DynamicImage::from_decoder(decoder).map_err(|e| CodecError::Decode(e.to_string()))?;
        image.apply_orientation(orientation);

        Ok((image, orientation))
    }

    /// 只读 header 与 EXIF，返回显示方向的宽高。
    pub(crate) fn inspect_oriented_dimensions(bytes: &[u8]) -> Result<(u32, u32), CodecError> {
        let mut decoder = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| CodecError::InvalidFormat(e.to_string()))?
            .into_decoder()
            .map_err(|e| CodecError::Decode(format!("cannot read image dimensions: {}", e)))?;

        let orientation = Self::read_orientation(&mut decoder);
        let (width, height) = decoder.dimensions();

        Ok(if swaps_axes(orientation) {
            (height, width)
        } else {
            (width, height)
        })
    }

    /// EXIF 缺失或损坏时按原方向处理。
    fn read_orientation(decoder: &mut impl ImageDecoder) -> Orientation {
        decoder.orientation().unwrap_or_else(|err| {
            log::debug!("EXIF 方向读取失败，按原方向处理：{}", err);
            Orientation::NoTransforms
        })
    }

    /// 仅通过内存中的图片头信息读取存储方向的宽高，用于资源上限检查。
    pub(crate) fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), CodecError> {
        ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| CodecError::InvalidFormat(e.to_string()))?
            .into_dimensions()
            .map_err(|e| CodecError::Decode(format!("cannot read image dimensions: {}", e)))
    }

    fn validate_pixel_limits(
        config: &CodecConfig,
        width: u32,
        height: u32,
    ) -> Result<(), CodecError> {
        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| CodecError::ResourceLimit("pixel count overflow".to_string()))?;

        if pixels > config.max_decoded_pixels {
            return Err(CodecError::ResourceLimit(format!(
                "{} pixels (limit {} pixels)",
                pixels, config.max_decoded_pixels
            )));
        }

        Ok(())
    }

    fn validate_decoded_memory_limits(
        config: &CodecConfig,
        width: u32,
        height: u32,
    ) -> Result<(), CodecError> {
        let estimated = (width as u64)
            .checked_mul(height as u64)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or_else(|| CodecError::ResourceLimit("decoded size overflow".to_string()))?;

        if estimated > config.max_decoded_bytes {
            return Err(CodecError::ResourceLimit(format!(
                "decoding needs about {:.2} MB (limit {:.2} MB)",
                estimated as f64 / 1024.0 / 1024.0,
                config.max_decoded_bytes as f64 / 1024.0 / 1024.0
            )));
        }

        Ok(())
    }

    /// 缩放到目标尺寸。尺寸相同时原样返回。
    pub(super) fn downscale(
        image: DynamicImage,
        target_width: u32,
        target_height: u32,
        filter: FilterType,
    ) -> DynamicImage {
        let (width, height) = image.dimensions();
        if (width, height) == (target_width, target_height) {
            return image;
        }

        log::info!(
            "🧩 等比降采样：{}x{} -> {}x{}（filter={:?}）",
            width,
            height,
            target_width,
            target_height,
            filter
        );

        match Self::resize_with_fast_image_resize(&image, target_width, target_height, filter) {
            Ok(resized) => resized,
            Err(err) => {
                log::warn!("⚠️ fast_image_resize 降采样失败，回退 image::resize_exact：{}", err);
                image.resize_exact(target_width, target_height, filter)
            }
        }
    }

    /// 输出为 JPEG，不需要 alpha 通道，直接在 RGB 空间缩放。
    fn resize_with_fast_image_resize(
        image: &DynamicImage,
        target_width: u32,
        target_height: u32,
        filter: FilterType,
    ) -> Result<DynamicImage, CodecError> {
        let src = image.to_rgb8();
        let (src_width, src_height) = src.dimensions();

        let src_image = fr::images::Image::from_vec_u8(
            src_width,
            src_height,
            src.into_raw(),
            fr::PixelType::U8x3,
        )
        .map_err(|e| CodecError::Decode(format!("cannot build source buffer: {}", e)))?;

        let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x3);

        let mut resizer = fr::Resizer::new();
        let options = fr::ResizeOptions::new().resize_alg(Self::to_fast_alg(filter));

        resizer
            .resize(&src_image, &mut dst_image, Some(&options))
            .map_err(|e| CodecError::Decode(format!("resize failed: {}", e)))?;

        let rgb = ImageBuffer::<Rgb<u8>, Vec<u8>>::from_raw(
            target_width,
            target_height,
            dst_image.into_vec(),
        )
        .ok_or_else(|| CodecError::Decode("resized buffer has unexpected length".to_string()))?;

        Ok(DynamicImage::ImageRgb8(rgb))
    }

    fn to_fast_alg(filter: FilterType) -> fr::ResizeAlg {
        match filter {
            FilterType::Nearest => fr::ResizeAlg::Nearest,
            FilterType::Triangle => fr::ResizeAlg::Convolution(fr::FilterType::Bilinear),
            FilterType::CatmullRom => fr::ResizeAlg::Convolution(fr::FilterType::CatmullRom),
            FilterType::Gaussian => fr::ResizeAlg::Convolution(fr::FilterType::Mitchell),
            FilterType::Lanczos3 => fr::ResizeAlg::Convolution(fr::FilterType::Lanczos3),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn landscape_image_bounds_width() {
        assert_eq!(scaled_dimensions(2000, 1000, 1200), (1200, 600));
        assert_eq!(scaled_dimensions(4000, 3000, 1200), (1200, 900));
    }

    #[test]
    fn portrait_and_square_images_bound_height() {
        assert_eq!(scaled_dimensions(1000, 2000, 1200), (600, 1200));
        assert_eq!(scaled_dimensions(1500, 1500, 1200), (1200, 1200));
    }

    #[test]
    fn images_within_bound_are_untouched() {
        assert_eq!(scaled_dimensions(1200, 1200, 1200), (1200, 1200));
        assert_eq!(scaled_dimensions(1, 1, 1200), (1, 1));
    }

    #[test]
    fn extreme_aspect_ratio_keeps_one_pixel() {
        assert_eq!(scaled_dimensions(10_000, 2, 1200), (1200, 1));
    }

    #[test]
    fn sniff_rejects_non_image_signature() {
        let pdf = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n1 0 obj".to_vec();
        let result = ImageCodec::sniff(&pdf, &CodecConfig::default());
        assert!(matches!(result, Err(CodecError::InvalidFormat(_))));
    }

    #[test]
    fn sniff_names_svg_explicitly() {
        let svg = br#"<?xml version="1.0"?><svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"/>"#;
        match ImageCodec::sniff(svg, &CodecConfig::default()) {
            Err(CodecError::InvalidFormat(msg)) => assert!(msg.contains("SVG"), "got {msg}"),
            other => panic!("expected InvalidFormat, got {:?}", other.map(|raw| raw.mime)),
        }
    }

    #[test]
    fn quarter_turns_swap_axes() {
        assert!(swaps_axes(Orientation::Rotate90));
        assert!(swaps_axes(Orientation::Rotate270FlipH));
        assert!(!swaps_axes(Orientation::Rotate180));
        assert!(!swaps_axes(Orientation::FlipHorizontal));
        assert!(!swaps_axes(Orientation::NoTransforms));
    }

    #[test]
    fn sniff_rejects_oversized_file() {
        let config = CodecConfig {
            max_file_size: 4,
            ..CodecConfig::default()
        };
        let result = ImageCodec::sniff(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A], &config);
        assert!(matches!(result, Err(CodecError::ResourceLimit(_))));
    }

    proptest! {
        #[test]
        fn scaled_dimensions_respect_bound_and_ratio(
            width in 1u32..6000,
            height in 1u32..6000,
            bound in 16u32..2000,
        ) {
            let (w, h) = scaled_dimensions(width, height, bound);
            prop_assert!(w <= bound && h <= bound);
            prop_assert!(w >= 1 && h >= 1);

            if width <= bound && height <= bound {
                prop_assert_eq!((w, h), (width, height));
            } else {
                prop_assert_eq!(w.max(h), bound);
                // 短边误差不超过四舍五入带来的半个像素
                let expected_ratio = width as f64 / height as f64;
                if width > height {
                    let exact = bound as f64 / expected_ratio;
                    prop_assert!((h as f64 - exact.max(1.0)).abs() <= 0.5 + f64::EPSILON || h == 1);
                } else {
                    let exact = bound as f64 * expected_ratio;
                    prop_assert!((w as f64 - exact.max(1.0)).abs() <= 0.5 + f64::EPSILON || w == 1);
                }
            }
        }
    }
}
