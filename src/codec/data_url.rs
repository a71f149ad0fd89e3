//! # Data URL 编解码
//!
//! 存储层只认识字符串：`data:<mime>;base64,<payload>`。
//! 这里负责 JPEG 编码后的包装，以及反向解析回像素。

use base64::{Engine as _, engine::general_purpose};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, GenericImageView, ImageEncoder};

use super::{CodecError, ImageCodec};

const DATA_URL_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// 从 Data URL 解码出的图片。
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub mime: String,
    pub width: u32,
    pub height: u32,
    pub image: DynamicImage,
}

/// 以 JPEG 编码并包装为 Data URL。
pub(crate) fn encode_jpeg_data_url(image: &DynamicImage, quality: u8) -> Result<String, CodecError> {
    let rgb = image.to_rgb8();
    let mut buffer = Vec::new();

    JpegEncoder::new_with_quality(&mut buffer, quality)
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| CodecError::Encode(e.to_string()))?;

    Ok(wrap_bytes("image/jpeg", &buffer))
}

pub(crate) fn wrap_bytes(mime: &str, bytes: &[u8]) -> String {
    format!(
        "{}{}{}{}",
        DATA_URL_PREFIX,
        mime,
        BASE64_MARKER,
        general_purpose::STANDARD.encode(bytes)
    )
}

/// 拆分 Data URL，返回 MIME 与原始字节。
fn parse_data_url(data_url: &str) -> Result<(&str, Vec<u8>), CodecError> {
    let rest = data_url
        .strip_prefix(DATA_URL_PREFIX)
        .ok_or_else(|| CodecError::InvalidFormat("missing data: prefix".to_string()))?;

    let marker = rest
        .find(BASE64_MARKER)
        .ok_or_else(|| CodecError::InvalidFormat("missing ;base64, marker".to_string()))?;

    let mime = &rest[..marker];
    if !mime.starts_with("image/") {
        return Err(CodecError::InvalidFormat(format!("not an image data URL: {}", mime)));
    }

    let bytes = general_purpose::STANDARD
        .decode(&rest[marker + BASE64_MARKER.len()..])
        .map_err(|e| CodecError::Decode(format!("invalid base64 payload: {}", e)))?;

    Ok((mime, bytes))
}

/// 将 Data URL 解码为显示方向的像素，不需要任何额外元数据。
pub fn decode_data_url(data_url: &str) -> Result<DecodedImage, CodecError> {
    let (mime, bytes) = parse_data_url(data_url)?;
    let (image, _) = ImageCodec::decode_oriented(&bytes)?;
    let (width, height) = image.dimensions();

    Ok(DecodedImage {
        mime: mime.to_string(),
        width,
        height,
        image,
    })
}

/// 仅读取 header 得到显示方向的宽高；负载不可读时返回 `None`。
pub fn probe_data_url_dimensions(data_url: &str) -> Option<(u32, u32)> {
    let (_, bytes) = parse_data_url(data_url).ok()?;
    ImageCodec::inspect_oriented_dimensions(&bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgba};

    fn sample_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x % 255) as u8, (y % 255) as u8, 128, 255])
        }))
    }

    #[test]
    fn jpeg_data_url_is_self_describing() {
        let data_url = encode_jpeg_data_url(&sample_image(64, 48), 80).expect("encode jpeg");
        assert!(data_url.starts_with("data:image/jpeg;base64,"));

        let decoded = decode_data_url(&data_url).expect("decode data url");
        assert_eq!(decoded.mime, "image/jpeg");
        assert_eq!((decoded.width, decoded.height), (64, 48));
        assert_eq!(probe_data_url_dimensions(&data_url), Some((64, 48)));
    }

    #[test]
    fn rejects_non_image_data_url() {
        let data_url = wrap_bytes("text/plain", b"hello");
        assert!(matches!(decode_data_url(&data_url), Err(CodecError::InvalidFormat(_))));
        assert_eq!(probe_data_url_dimensions(&data_url), None);
    }

    #[test]
    fn rejects_missing_marker_and_bad_payload() {
        assert!(matches!(
            decode_data_url("data:image/png,abcd"),
            Err(CodecError::InvalidFormat(_))
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64,@@@"),
            Err(CodecError::Decode(_))
        ));
        assert!(matches!(
            decode_data_url("https://example.com/a.png"),
            Err(CodecError::InvalidFormat(_))
        ));
    }
}
