//! # 本地图库 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │              事件外壳（界面 / 文件选择 / 确认框）          │
//! │      选择文件 ── 点击添加 ── 点击删除 ── 确认删除          │
//! └───────┼──────────────────────────────────────────────────┘
//!         ↕ 普通方法调用 (Result<T, GalleryError>)
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            核心 (Rust)                            │
//! │                                                          │
//! │  ┌─ controller ── 编排添加/删除，忙碌标志 (RAII)           │
//! │  │                                                       │
//! │  ├─ codec ─────── 解码·等比缩放·JPEG·Data URL            │
//! │  ├─ store ─────── 唯一键下的 JSON 条目列表                │
//! │  ├─ projection ── 纯函数视图 + “添加”按钮状态              │
//! │  ├─ storage ───── 键值后端（内存 / SQLite，带配额）         │
//! │  ├─ config        图库与编码参数                          │
//! │  └─ error         统一错误类型 `GalleryError`             │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `GalleryError`，所有控制器操作的返回类型 |
//! | [`config`] | `GalleryConfig`：存储键、条目上限、编码参数，JSON 读写 |
//! | [`codec`] | 图片解码、等比降采样、JPEG 编码、Data URL 解析 |
//! | [`storage`] | `KeyValueStore` trait 与内存 / SQLite 两种后端 |
//! | [`store`] | `GalleryStore`：条目列表的 load / save / add / remove |
//! | [`projection`] | `render`：从条目列表生成 `GalleryView` |
//! | [`controller`] | `GalleryController`：添加与两步删除 |

pub mod codec;
pub mod config;
pub mod controller;
pub mod error;
pub mod projection;
pub mod storage;
pub mod store;

pub use codec::{CodecConfig, CodecError, ImageCodec, SelectedFile};
pub use config::GalleryConfig;
pub use controller::{AddOutcome, GalleryController, RemoveConfirmation, RemoveOutcome};
pub use error::GalleryError;
pub use projection::{AddControl, AddControlState, GalleryView};
pub use storage::{KeyValueStore, KvError, MemoryKv, SqliteKv};
pub use store::{GalleryEntry, GalleryStore};
