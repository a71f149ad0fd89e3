//! # 输入文件与中间模型
//!
//! - `SelectedFile` 表示文件选择控件交给核心的单个文件
//! - `RawImageData` 表示已通过签名探测、尚未解码的字节
//! - `EncodedImage` 表示编码阶段的最终产物

/// 文件选择控件提供的单个文件。
#[derive(Debug, Clone)]
pub struct SelectedFile {
    /// 原始文件名，作为条目显示名。
    pub name: String,
    /// 控件声明的内容类型（如 `image/png`）。
    pub content_type: String,
    /// 文件字节。
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// 声明类型是否属于图片类别。
    ///
    /// 只看声明的主类型，忽略参数部分（`image/svg+xml; charset=utf-8`）。
    pub fn declares_image(&self) -> bool {
        self.content_type
            .split(';')
            .next()
            .map(|base| base.trim().to_ascii_lowercase().starts_with("image/"))
            .unwrap_or(false)
    }

    /// 声明为 SVG 矢量图。
    pub fn declares_svg(&self) -> bool {
        self.content_type
            .split(';')
            .next()
            .map(|base| base.trim().eq_ignore_ascii_case("image/svg+xml"))
            .unwrap_or(false)
    }
}

/// 签名探测后的原始字节。
pub(crate) struct RawImageData<'a> {
    pub(crate) bytes: &'a [u8],
    /// 按文件签名识别出的 MIME 类型。
    pub(crate) mime: &'static str,
}

/// 编码结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// `data:<mime>;base64,<payload>`
    pub data_url: String,
    pub width: u32,
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::SelectedFile;

    #[test]
    fn declares_image_checks_primary_type_only() {
        let png = SelectedFile::new("a.png", "image/png", Vec::new());
        let svg = SelectedFile::new("a.svg", "Image/SVG+xml; charset=utf-8", Vec::new());
        let text = SelectedFile::new("a.txt", "text/plain", Vec::new());
        let empty = SelectedFile::new("a", "", Vec::new());

        assert!(png.declares_image());
        assert!(svg.declares_image());
        assert!(!text.declares_image());
        assert!(!empty.declares_image());

        assert!(svg.declares_svg());
        assert!(!png.declares_svg());
    }
}
