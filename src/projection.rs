//! 图库视图投影
//!
//! # 设计思路
//!
//! 视图永远是存储内容的纯函数：`render(entries, cap)` 不读写任何状态，
//! 相同输入两次渲染得到完全相同的输出。外壳只负责把 `GalleryView` 画出来。
//!
//! 唯一的状态机是“添加”按钮：`count >= cap` 时禁用，否则启用。

use serde::Serialize;

use crate::codec::probe_data_url_dimensions;
use crate::store::GalleryEntry;

pub const PLACEHOLDER_MESSAGE: &str = "No images yet. Add one using the form above.";
pub const FALLBACK_ALT_TEXT: &str = "Gallery image";
pub const REMOVE_LABEL: &str = "Remove";
pub const REMOVE_HINT: &str = "Click to remove";
pub const ADD_LABEL: &str = "Add image";
pub const ADDING_LABEL: &str = "Adding...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AddControlState {
    Enabled,
    Disabled,
}

impl AddControlState {
    pub fn for_count(count: usize, cap: usize) -> Self {
        if count >= cap {
            Self::Disabled
        } else {
            Self::Enabled
        }
    }

    pub fn is_enabled(self) -> bool {
        self == Self::Enabled
    }
}

/// “添加”按钮的状态与文案。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddControl {
    pub state: AddControlState,
    pub label: &'static str,
}

impl AddControl {
    pub fn for_count(count: usize, cap: usize) -> Self {
        Self {
            state: AddControlState::for_count(count, cap),
            label: ADD_LABEL,
        }
    }

    /// 添加进行中：禁用并显示进度文案。
    pub fn busy() -> Self {
        Self {
            state: AddControlState::Disabled,
            label: ADDING_LABEL,
        }
    }
}

/// 单个条目的卡片。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryCard {
    pub id: String,
    /// 可直接作为图片来源的 Data URL。
    pub image_src: String,
    pub label: String,
    pub alt: String,
    pub title: &'static str,
    pub remove_label: &'static str,
    /// 从 header 读取的宽高，负载不可读时为 `None`。
    pub dimensions: Option<(u32, u32)>,
}

impl EntryCard {
    fn from_entry(entry: &GalleryEntry) -> Self {
        Self {
            id: entry.id.clone(),
            image_src: entry.data_url.clone(),
            label: entry.name.clone(),
            alt: entry.display_name().unwrap_or(FALLBACK_ALT_TEXT).to_string(),
            title: REMOVE_HINT,
            remove_label: REMOVE_LABEL,
            dimensions: probe_data_url_dimensions(&entry.data_url),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryView {
    /// 与输入同序（最新在前）。
    pub cards: Vec<EntryCard>,
    /// 空图库时的占位文案；有条目时为 `None`。
    pub placeholder: Option<&'static str>,
    pub count: usize,
    pub count_label: String,
    pub max_count_label: String,
    pub add_control: AddControl,
}

impl GalleryView {
    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.cards.iter().position(|card| card.id == id)
    }
}

/// “1 image” / “N images”
pub fn count_label(count: usize) -> String {
    format!("{} image{}", count, if count == 1 { "" } else { "s" })
}

pub fn render(entries: &[GalleryEntry], cap: usize) -> GalleryView {
    let count = entries.len();
    let cards: Vec<EntryCard> = entries.iter().map(EntryCard::from_entry).collect();

    GalleryView {
        placeholder: cards.is_empty().then_some(PLACEHOLDER_MESSAGE),
        cards,
        count,
        count_label: count_label(count),
        max_count_label: cap.to_string(),
        add_control: AddControl::for_count(count, cap),
    }
}
