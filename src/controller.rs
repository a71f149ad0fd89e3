//! 图库控制器
//!
//! # 设计思路
//!
//! 外壳把用户意图（选择文件后点击“添加”、点击“删除”并确认）转成对控制器的普通方法调用，
//! 控制器按 编码 → 存储 → 投影 的顺序编排，不注册任何回调，便于脱离界面测试。
//!
//! # 实现思路
//!
//! - 添加前依次校验：是否选择文件、是否已达上限、声明类型是否为图片、是否为无法栅格化的 SVG，
//!   全部在编码/存储之前完成。
//! - 添加期间用 `AddGuard`（RAII）占用忙碌标志，“添加”按钮保持禁用；
//!   无论成功还是失败，`Drop` 都会释放标志。
//! - 任何编码或存储失败都直接返回，存储内容保持原样。
//! - 删除为两步协议：`request_remove` 返回确认令牌，`confirm_remove` 消费令牌后才执行删除。

use std::sync::atomic::{AtomicBool, Ordering};

use crate::codec::{ImageCodec, SelectedFile};
use crate::config::GalleryConfig;
use crate::error::GalleryError;
use crate::projection::{self, AddControl, GalleryView};
use crate::storage::KeyValueStore;
use crate::store::{generate_entry_id, GalleryEntry, GalleryStore};

pub const REMOVE_PROMPT: &str = "Remove this image?";

// ============================================================================
// AddGuard — RAII 忙碌标志
// ============================================================================

/// 构造时占用忙碌标志，`Drop` 时释放。
struct AddGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> AddGuard<'a> {
    /// 已有添加在进行时返回 `None`。
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for AddGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

// ============================================================================
// 操作结果
// ============================================================================

#[derive(Debug, Clone)]
pub struct AddOutcome {
    pub entry_id: String,
    pub view: GalleryView,
    /// 外壳应清空文件选择控件。
    pub clear_selection: bool,
}

/// 删除确认令牌。只能由 `request_remove` 创建，丢弃即取消。
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "dropping the confirmation cancels the removal"]
pub struct RemoveConfirmation {
    id: String,
}

impl RemoveConfirmation {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn prompt(&self) -> &'static str {
        REMOVE_PROMPT
    }
}

#[derive(Debug, Clone)]
pub struct RemoveOutcome {
    /// 是否真的删除了条目（id 不存在时为 `false`）。
    pub removed: bool,
    pub view: GalleryView,
}

// ============================================================================
// GalleryController
// ============================================================================

pub struct GalleryController<K> {
    store: GalleryStore<K>,
    codec: ImageCodec,
    config: GalleryConfig,
    adding: AtomicBool,
}

impl<K: KeyValueStore> GalleryController<K> {
    /// 校验配置并创建控制器。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use image_gallery::{GalleryConfig, GalleryController, MemoryKv};
    ///
    /// let controller = GalleryController::new(MemoryKv::new(), GalleryConfig::default())?;
    /// let view = controller.render();
    /// assert_eq!(view.count_label, "0 images");
    /// # Ok::<(), image_gallery::GalleryError>(())
    /// ```
    pub fn new(kv: K, config: GalleryConfig) -> Result<Self, GalleryError> {
        config.validate()?;
        let codec = ImageCodec::new(config.codec.clone())
            .map_err(|e| GalleryError::Config(e.to_string()))?;

        Ok(Self {
            store: GalleryStore::from_config(kv, &config),
            codec,
            config,
            adding: AtomicBool::new(false),
        })
    }

    pub fn store(&self) -> &GalleryStore<K> {
        &self.store
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn is_adding(&self) -> bool {
        self.adding.load(Ordering::SeqCst)
    }

    /// 当前“添加”按钮状态：进行中禁用，否则由条目数决定。
    pub fn add_control(&self) -> AddControl {
        if self.is_adding() {
            AddControl::busy()
        } else {
            AddControl::for_count(self.store.len(), self.store.cap())
        }
    }

    /// 从存储渲染当前视图。
    pub fn render(&self) -> GalleryView {
        let mut view = projection::render(&self.store.load(), self.store.cap());
        if self.is_adding() {
            view.add_control = AddControl::busy();
        }
        view
    }

    /// 添加选择的图片（只取第一个文件）。
    pub async fn add_selected(&self, selection: &[SelectedFile]) -> Result<AddOutcome, GalleryError> {
        let result = self.try_add_selected(selection).await;
        if let Err(err) = &result {
            log::warn!("⚠️ 添加图片失败 [{}]: {}", err.code(), err);
        }
        result
    }

    async fn try_add_selected(&self, selection: &[SelectedFile]) -> Result<AddOutcome, GalleryError> {
        if self.is_adding() {
            return Err(GalleryError::AddInProgress);
        }

        let file = selection.first().ok_or(GalleryError::NoFileSelected)?;

        let current = self.store.load();
        if current.len() >= self.store.cap() {
            return Err(GalleryError::CapacityReached {
                cap: self.store.cap(),
            });
        }

        if !file.declares_image() {
            return Err(GalleryError::WrongFileType(file.content_type.clone()));
        }

        if file.declares_svg() {
            return Err(GalleryError::UnsupportedImageType("SVG".to_string()));
        }

        let guard = AddGuard::acquire(&self.adding).ok_or(GalleryError::AddInProgress)?;

        log::info!(
            "📥 开始添加图片 - 名称: {} 类型: {} 大小: {}KB",
            file.name,
            file.content_type,
            file.bytes.len() / 1024
        );

        let encoded = self
            .codec
            .encode(file.bytes.clone(), self.config.codec.max_dimension)
            .await?;

        let entry_id = Self::unique_id(&current);
        let entry = GalleryEntry::new(entry_id.clone(), file.name.clone(), encoded.data_url);
        let count = self.store.add(entry)?;

        drop(guard);

        log::info!(
            "✅ 图片已添加 - id: {} 尺寸: {}x{} 当前 {}/{}",
            entry_id,
            encoded.width,
            encoded.height,
            count,
            self.store.cap()
        );

        Ok(AddOutcome {
            entry_id,
            view: self.render(),
            clear_selection: true,
        })
    }

    fn unique_id(existing: &[GalleryEntry]) -> String {
        loop {
            let id = generate_entry_id();
            if !existing.iter().any(|entry| entry.id == id) {
                return id;
            }
        }
    }

    /// 删除第一步：返回确认令牌，此时不做任何修改。
    pub fn request_remove(&self, id: impl Into<String>) -> RemoveConfirmation {
        RemoveConfirmation { id: id.into() }
    }

    /// 删除第二步：执行删除并重新渲染。
    ///
    /// 写入失败时返回错误且不携带视图；存储内容保持原样，外壳提示错误后应调用
    /// [`render`](Self::render) 刷新界面。
    pub fn confirm_remove(&self, confirmation: RemoveConfirmation) -> Result<RemoveOutcome, GalleryError> {
        let removed = self.store.remove(&confirmation.id).map_err(|err| {
            log::warn!("⚠️ 删除图片失败 [{}]: {}", err.code(), err);
            err
        })?;

        Ok(RemoveOutcome {
            removed,
            view: self.render(),
        })
    }
}
