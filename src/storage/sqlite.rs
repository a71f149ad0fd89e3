//! SQLite 键值后端
//!
//! ## 职责
//! - 以单表 `kv(key, value)` 持久化图库数据
//! - 单条 UPSERT 写入，配合事务做配额检查
//!
//! ## 错误语义
//! - SQL 执行失败统一映射为 `KvError::Backend`
//! - 超出配额映射为 `KvError::QuotaExceeded`，事务回滚，原值不变

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use super::{entry_size, KeyValueStore, KvError};

pub struct SqliteKv {
    conn: Mutex<Connection>,
    quota: Option<usize>,
}

fn initialize_schema(conn: &Connection) -> Result<(), KvError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL
        );",
    )
    .map_err(|e| KvError::Backend(format!("failed to create kv table: {}", e)))
}

impl SqliteKv {
    /// 打开（或创建）数据库文件。
    pub fn open(path: &Path) -> Result<Self, KvError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    KvError::Backend(format!("failed to create database directory: {}", e))
                })?;
            }
        }
        log::info!("数据库路径: {}", path.display());

        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, KvError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, KvError> {
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            quota: None,
        })
    }

    /// 设置配额（字节），`None` 表示不限。
    pub fn with_quota(mut self, quota: Option<usize>) -> Self {
        self.quota = quota;
        self
    }

    fn with_conn<T>(
        &self,
        op: impl FnOnce(&mut Connection) -> Result<T, KvError>,
    ) -> Result<T, KvError> {
        let mut conn = self.conn.lock().map_err(|_| KvError::LockPoisoned)?;
        op(&mut conn)
    }
}

impl KeyValueStore for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        self.with_conn(|conn| {
            let value = conn
                .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                    row.get::<_, String>(0)
                })
                .optional()?;
            Ok(value)
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        let quota = self.quota;
        self.with_conn(|conn| {
            let tx = conn.transaction()?;

            if let Some(quota) = quota {
                let others: i64 = tx.query_row(
                    "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0)
                     FROM kv WHERE key != ?1",
                    params![key],
                    |row| row.get(0),
                )?;
                let needed = others.max(0) as usize + entry_size(key, value);
                if needed > quota {
                    return Err(KvError::QuotaExceeded { needed, quota });
                }
            }

            tx.execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )?;
            tx.commit()?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn unique_temp_dir() -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock error")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("image-gallery-kv-test-{nanos}"));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn upsert_in_memory() {
        let kv = SqliteKv::open_in_memory().expect("open sqlite");
        assert_eq!(kv.get("imageGallery").expect("get"), None);

        kv.set("imageGallery", "[]").expect("insert");
        kv.set("imageGallery", "[1]").expect("update");
        assert_eq!(kv.get("imageGallery").expect("get").as_deref(), Some("[1]"));
        assert_eq!(kv.get("other").expect("get"), None);
    }

    #[test]
    fn quota_rolls_back_oversized_write() {
        let kv = SqliteKv::open_in_memory()
            .expect("open sqlite")
            .with_quota(Some(16));
        kv.set("k", "short").expect("fits");

        let result = kv.set("k", "this value is too long");
        assert!(matches!(result, Err(KvError::QuotaExceeded { .. })));
        assert_eq!(kv.get("k").expect("get").as_deref(), Some("short"));
    }

    #[test]
    fn values_survive_reopen() {
        let dir = unique_temp_dir();
        let path = dir.join("nested").join("gallery.db");

        {
            let kv = SqliteKv::open(&path).expect("open file db");
            kv.set("imageGallery", r#"[{"id":"a","name":"","dataUrl":"x"}]"#)
                .expect("write");
        }

        let reopened = SqliteKv::open(&path).expect("reopen file db");
        let value = reopened.get("imageGallery").expect("read");
        assert_eq!(value.as_deref(), Some(r#"[{"id":"a","name":"","dataUrl":"x"}]"#));

        drop(reopened);
        let _ = std::fs::remove_dir_all(dir);
    }
}
