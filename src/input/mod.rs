//! 输入映射
//!
//! 把调用方的原始输入（图片字节、图片文件）转换为 [`crate::models::ContentItem`]。

pub mod image_mapper;

pub use image_mapper::{map_from_bytes, map_from_file, map_from_files};
