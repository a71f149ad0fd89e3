//! # 图片编解码模块（codec）
//!
//! ## 设计思路
//!
//! 把“原始文件字节 → 像素 → 等比缩放 → JPEG → Data URL”这条链路集中在一个模块中，
//! 与存储、视图完全解耦：输入只有文件字节与配置，输出只有一个自描述字符串。
//!
//! - `config`：编码参数（最大边长、质量、资源上限、滤镜）
//! - `error`：编解码错误模型
//! - `source`：外部输入文件与中间数据模型
//! - `pipeline`：签名探测、资源校验、解码、降采样
//! - `data_url`：Data URL 的生成与解析
//! - `handler`：`ImageCodec` 编排器（同步/异步入口 + 阶段耗时日志）
//!
//! ## 调用链
//!
//! ```text
//! ImageCodec::encode (async)
//!    ↓ spawn_blocking
//! ImageCodec::encode_blocking
//!    ├─ pipeline.rs（签名 + 像素上限 + 解码 + 降采样）
//!    └─ data_url.rs（JPEG 编码 + base64 包装）
//! ```

mod config;
mod data_url;
mod error;
mod handler;
mod pipeline;
mod source;

pub use config::CodecConfig;
pub use data_url::{decode_data_url, probe_data_url_dimensions, DecodedImage};
pub use error::CodecError;
pub use handler::ImageCodec;
pub use pipeline::scaled_dimensions;
pub use source::{EncodedImage, SelectedFile};
