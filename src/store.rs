//! 图库存储模块
//!
//! # 设计思路
//!
//! 图库是一个按“最新在前”排列的条目列表，整体序列化为一段 JSON，
//! 存放在键值后端的唯一键下。`GalleryStore` 是唯一读写该键的组件，
//! 对外只暴露 `load` / `save` 以及基于二者组合出的 `add` / `remove`。
//!
//! # 实现思路
//!
//! - `load()` 宽松读取：键不存在返回空列表；内容损坏或后端读取失败时记录错误日志并返回空列表。
//! - `try_load()` 严格读取：同样的情况返回 `CorruptStore` / `StorageReadFailed`。
//! - `save()` 整体写入，后端拒绝（如配额不足）时映射为 `StorageWriteFailed`，不会部分写入。
//! - 条目不可修改，没有 update 操作。

mod entry;
mod id;

pub use entry::GalleryEntry;
pub use id::generate_entry_id;

use crate::config::GalleryConfig;
use crate::error::GalleryError;
use crate::storage::KeyValueStore;

pub struct GalleryStore<K> {
    kv: K,
    key: String,
    cap: usize,
}

impl<K: KeyValueStore> GalleryStore<K> {
    pub fn new(kv: K, key: impl Into<String>, cap: usize) -> Self {
        Self {
            kv,
            key: key.into(),
            cap,
        }
    }

    pub fn from_config(kv: K, config: &GalleryConfig) -> Self {
        Self::new(kv, config.storage_key.clone(), config.max_images)
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &K {
        &self.kv
    }

    /// 读取全部条目，任何读取问题都视为空图库。
    pub fn load(&self) -> Vec<GalleryEntry> {
        match self.try_load() {
            Ok(entries) => entries,
            Err(err) => {
                log::error!("❌ 读取图库失败，按空图库处理: {}", err);
                Vec::new()
            }
        }
    }

    pub fn try_load(&self) -> Result<Vec<GalleryEntry>, GalleryError> {
        let raw = self
            .kv
            .get(&self.key)
            .map_err(|e| GalleryError::StorageReadFailed(e.to_string()))?;

        let Some(raw) = raw else {
            return Ok(Vec::new());
        };

        serde_json::from_str(&raw).map_err(|e| GalleryError::CorruptStore(e.to_string()))
    }

    /// 整体写入条目列表。
    pub fn save(&self, entries: &[GalleryEntry]) -> Result<(), GalleryError> {
        let json = serde_json::to_string(entries)
            .map_err(|e| GalleryError::StorageWriteFailed(format!("serialization failed: {}", e)))?;

        self.kv.set(&self.key, &json).map_err(|e| {
            log::error!("❌ 写入图库失败（可能超出配额）: {}", e);
            GalleryError::StorageWriteFailed(e.to_string())
        })?;

        log::debug!("💾 图库已保存 - {} 条, {} 字节", entries.len(), json.len());
        Ok(())
    }

    /// 把条目插入到最前面，返回新长度。
    pub fn add(&self, entry: GalleryEntry) -> Result<usize, GalleryError> {
        let current = self.load();

        if current.len() >= self.cap {
            return Err(GalleryError::CapacityReached { cap: self.cap });
        }
        if current.iter().any(|existing| existing.id == entry.id) {
            return Err(GalleryError::DuplicateId(entry.id));
        }

        let mut next = Vec::with_capacity(current.len() + 1);
        next.push(entry);
        next.extend(current);

        self.save(&next)?;
        Ok(next.len())
    }

    /// 按 id 删除。没有匹配时不写入，返回 `false`。
    pub fn remove(&self, id: &str) -> Result<bool, GalleryError> {
        let current = self.load();
        let before = current.len();

        let filtered: Vec<GalleryEntry> = current.into_iter().filter(|entry| entry.id != id).collect();

        if filtered.len() == before {
            log::debug!("🔎 未找到要删除的条目: {}", id);
            return Ok(false);
        }

        self.save(&filtered)?;
        log::info!("🗑️ 已删除条目 {}，剩余 {} 条", id, filtered.len());
        Ok(true)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.load().iter().any(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
