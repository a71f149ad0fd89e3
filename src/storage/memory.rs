//! 内存键值后端
//!
//! 模拟浏览器本地存储：全部数据在内存中，按字节配额限制总容量。

use std::collections::HashMap;
use std::sync::RwLock;

use super::{entry_size, KeyValueStore, KvError};

/// 常见浏览器本地存储配额（约 5 MB）。
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug)]
pub struct MemoryKv {
    entries: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryKv {
    /// 使用默认配额。
    pub fn new() -> Self {
        Self::with_quota(Some(DEFAULT_QUOTA_BYTES))
    }

    /// `None` 表示不限容量。
    pub fn with_quota(quota: Option<usize>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            quota,
        }
    }

    pub fn quota(&self) -> Option<usize> {
        self.quota
    }

    /// 当前占用字节数。
    pub fn used_bytes(&self) -> Result<usize, KvError> {
        let entries = self.entries.read().map_err(|_| KvError::LockPoisoned)?;
        Ok(entries.iter().map(|(k, v)| entry_size(k, v)).sum())
    }
}

impl Default for MemoryKv {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let entries = self.entries.read().map_err(|_| KvError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        let mut entries = self.entries.write().map_err(|_| KvError::LockPoisoned)?;

        if let Some(quota) = self.quota {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| entry_size(k, v))
                .sum();
            let needed = others + entry_size(key, value);
            if needed > quota {
                return Err(KvError::QuotaExceeded { needed, quota });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
