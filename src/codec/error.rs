//! # 编解码错误模型
//!
//! 使用单一错误枚举承载编码链路中的所有错误来源，避免字符串拼接式错误处理。
//! 在应用层会被上转为 `GalleryError::Decode`。

/// 图片编解码统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("unsupported image format: {0}")]
    InvalidFormat(String),

    #[error("could not decode image: {0}")]
    Decode(String),

    #[error("could not encode image: {0}")]
    Encode(String),

    #[error("image exceeds processing limits: {0}")]
    ResourceLimit(String),

    #[error("image processing task failed: {0}")]
    Task(String),
}
