//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `GalleryError` 枚举，所有控制器操作统一返回
//! `Result<T, GalleryError>`。每个变体都是可恢复、面向用户的：
//! `Display` 即提示文案，系统在任何失败后都保持可用。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `CodecError` 提供 `From` 转换，无需手动 map。
//! - 实现 `Serialize` 将错误序列化为字符串，事件外壳可直接转发给界面。
//! - `code()` 提供稳定的错误码，便于外壳按类型分支。

use serde::Serialize;

use crate::codec::CodecError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum GalleryError {
    /// 未选择文件
    #[error("Choose an image first.")]
    NoFileSelected,

    /// 声明类型不是图片
    #[error("The selected file is not an image ({0}).")]
    WrongFileType(String),

    /// 图片类型无法栅格化（SVG）
    #[error("{0} images are not supported. Choose a PNG, JPEG, GIF or WebP image.")]
    UnsupportedImageType(String),

    /// 已达条目上限
    #[error("Limit of {cap} images reached.")]
    CapacityReached { cap: usize },

    /// 底层存储拒绝写入（配额 / 序列化失败）
    #[error("Could not save to storage (limit reached). Try removing images or using smaller ones. ({0})")]
    StorageWriteFailed(String),

    /// 图片解码 / 编码失败
    #[error("Could not process the image: {0}")]
    Decode(#[from] CodecError),

    /// 底层存储读取失败
    #[error("Could not read from storage: {0}")]
    StorageReadFailed(String),

    /// 已持久化的数据无法解析
    #[error("Stored gallery data is corrupt: {0}")]
    CorruptStore(String),

    /// 条目 id 已存在
    #[error("An image with id {0} already exists.")]
    DuplicateId(String),

    /// 上一次添加尚未完成
    #[error("An image is already being added.")]
    AddInProgress,

    /// 配置非法
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl GalleryError {
    /// 稳定错误码。
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoFileSelected => "no_file_selected",
            Self::WrongFileType(_) => "wrong_file_type",
            Self::UnsupportedImageType(_) => "unsupported_image_type",
            Self::CapacityReached { .. } => "capacity_reached",
            Self::StorageWriteFailed(_) => "storage_write_failed",
            Self::Decode(_) => "decode_error",
            Self::StorageReadFailed(_) => "storage_read_failed",
            Self::CorruptStore(_) => "corrupt_store",
            Self::DuplicateId(_) => "duplicate_id",
            Self::AddInProgress => "add_in_progress",
            Self::Config(_) => "invalid_config",
        }
    }
}

/// 将错误序列化为人类可读的字符串。
impl Serialize for GalleryError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
