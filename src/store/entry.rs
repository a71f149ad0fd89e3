use serde::{Deserialize, Deserializer, Serialize};

/// 图库条目。创建后不可修改。
///
/// 持久化格式：`{"id": string, "name": string, "dataUrl": string}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryEntry {
    pub id: String,
    /// 原始文件名；空字符串表示没有名称。
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(rename = "dataUrl")]
    pub data_url: String,
}

impl GalleryEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>, data_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            data_url: data_url.into(),
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        if self.name.is_empty() {
            None
        } else {
            Some(&self.name)
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
