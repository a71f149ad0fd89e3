//! 键值存储后端模块
//!
//! # 设计思路
//!
//! 图库只需要“一个键对应一个字符串”的持久化能力，且容量有限（配额）。
//! 用 `KeyValueStore` trait 抽象这一能力，`GalleryStore` 是唯一调用方。
//!
//! # 实现思路
//!
//! - `MemoryKv`：内存实现，按字节数计算配额，写入超额时整体拒绝，原值不变。
//! - `SqliteKv`：`rusqlite` 实现，单条 UPSERT 保证写入原子性，可选配额。
//! - 所有可能失败的操作均返回 `Result<_, KvError>`，不使用 `expect()` / `unwrap()`。

mod memory;
mod sqlite;

pub use memory::MemoryKv;
pub use sqlite::SqliteKv;

/// 键值后端错误
#[derive(Debug, thiserror::Error)]
pub enum KvError {
    /// 写入后总体积超过配额
    #[error("storage quota exceeded: {needed} bytes needed, {quota} bytes allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    /// 底层存储失败
    #[error("storage backend error: {0}")]
    Backend(String),

    /// 内部锁已中毒
    #[error("storage lock poisoned")]
    LockPoisoned,
}

impl From<rusqlite::Error> for KvError {
    fn from(error: rusqlite::Error) -> Self {
        KvError::Backend(error.to_string())
    }
}

/// 容量有限的字符串键值存储。
///
/// 写入要么整体成功，要么不产生任何可见变化。
/// 图库删除条目也是整体重写列表，因此后端只需要读与写。
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    fn set(&self, key: &str, value: &str) -> Result<(), KvError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        (**self).set(key, value)
    }
}

/// 条目体积：键与值的字节数之和。
pub(crate) fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}
