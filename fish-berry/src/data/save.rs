//! 图像的持久化存储.

use super::{IntensityWindow, TileSlice};
use image::ImageResult;
use std::path::Path;

/// 表明一个可以通过 **可视化友好** 模式持久化存储的图像对象.
///
/// `ImgWriteVis` trait 的意图是, 图像将以 "可视化友好" 的方式保存, 而不是 "as is" 的方式.
/// 对于以浮点荧光强度存储的 tile, 在保存时会按其自身的最小值和最大值规范化到 8-bit.
pub trait ImgWriteVis {
    /// 按照一定的可视化规则将图片保存到 `path` 路径.
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

impl TileSlice<'_> {
    /// 将 tile 以 `window` 规范化为 8-bit 灰度图. 非有限值映射为黑色.
    pub fn to_gray_image(&self, window: &IntensityWindow) -> image::GrayImage {
        let (height, width) = self.shape();
        let mut buf = image::GrayImage::new(width as u32, height as u32);
        for ((h, w), &v) in self.indexed_iter() {
            let gray = window.eval(v).unwrap_or(u8::MIN);
            buf.put_pixel(w as u32, h as u32, image::Luma([gray]));
        }
        buf
    }
}

/// min-max 规范化. 常数 tile 保存为全黑图.
impl ImgWriteVis for TileSlice<'_> {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        match IntensityWindow::fit(self.iter().copied()) {
            Some(window) => self.to_gray_image(&window).save(path),
            None => {
                let (height, width) = self.shape();
                image::GrayImage::new(width as u32, height as u32).save(path)
            }
        }
    }
}
