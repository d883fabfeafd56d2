//! 图片输入映射
//!
//! 把图片字节或图片文件转换为 data URI 形式的 [`ContentItem`]。

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use phf::phf_set;

use crate::error::{ClientError, ClientResult, InputError};
use crate::models::ContentItem;

/// 允许的图片类型（小写）
static ALLOWED_FILE_TYPES: phf::Set<&'static str> = phf_set! {
    "png",
    "jpg",
    "jpeg",
};

/// 是否为允许的图片类型（不区分大小写）
pub fn is_valid_file_type(file_type: &str) -> bool {
    ALLOWED_FILE_TYPES.contains(file_type.to_ascii_lowercase().as_str())
}

/// 文件扩展名（不含点），没有扩展名时为空串
pub fn file_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn assert_valid_file_type(file_type: &str) -> Result<(), InputError> {
    if is_valid_file_type(file_type) {
        Ok(())
    } else {
        Err(InputError::InvalidFileType {
            file_type: file_type.to_string(),
        })
    }
}

/// 由图片字节创建内容，`file_type` 原样写入 data URI
pub fn map_from_bytes(bytes: &[u8], file_type: &str) -> Result<ContentItem, InputError> {
    assert_valid_file_type(file_type)?;
    Ok(ContentItem::image(format!(
        "data:image/{};base64,{}",
        file_type,
        STANDARD.encode(bytes)
    )))
}

/// 读取图片文件并创建内容，类型取自扩展名
///
/// 类型不合法时不会读取文件。
pub async fn map_from_file(path: impl AsRef<Path>) -> ClientResult<ContentItem> {
    let path = path.as_ref();
    let file_type = file_extension(path);
    assert_valid_file_type(&file_type)?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ClientError::io(path, e))?;

    Ok(map_from_bytes(&bytes, &file_type)?)
}

/// 按顺序读取多个图片文件，遇到第一个错误即返回
pub async fn map_from_files<P: AsRef<Path>>(paths: &[P]) -> ClientResult<Vec<ContentItem>> {
    let mut contents = Vec::with_capacity(paths.len());
    for path in paths {
        contents.push(map_from_file(path).await?);
    }
    Ok(contents)
}
