//! 内存中的散点图.

use image::{Rgb, RgbImage};

use super::TargetTraces;
use crate::data::IntensityWindow;

/// 画布四周留白 (像素).
const MARGIN: u32 = 16;

/// 散点边长 (像素), 取奇数.
const DOT: u32 = 3;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([0, 0, 0]);
const TICK: Rgb<u8> = Rgb([160, 160, 160]);

/// 按通道着色.
const PALETTE: [Rgb<u8>; 6] = [
    Rgb([31, 119, 180]),
    Rgb([255, 127, 14]),
    Rgb([44, 160, 44]),
    Rgb([214, 39, 40]),
    Rgb([148, 103, 189]),
    Rgb([140, 86, 75]),
];

impl TargetTraces {
    /// 绘制 "强度 - 轨迹位置" 散点图.
    ///
    /// 横轴为轨迹位置 (含抖动), 纵轴为强度, 按全部有限强度做 min-max 缩放.
    /// 点的颜色由通道决定. 画布小于留白时只返回背景. 保存到文件由调用者负责.
    pub fn render(&self, width: u32, height: u32) -> RgbImage {
        let mut img = RgbImage::from_pixel(width, height, BACKGROUND);
        if width <= 2 * MARGIN || height <= 2 * MARGIN {
            return img;
        }
        let (left, right) = (MARGIN, width - MARGIN - 1);
        let (top, bottom) = (MARGIN, height - MARGIN - 1);

        // 横轴和纵轴.
        for x in left..=right {
            img.put_pixel(x, bottom, AXIS);
        }
        for y in top..=bottom {
            img.put_pixel(left, y, AXIS);
        }

        let n_pos = self.positions().len();
        if n_pos == 0 {
            return img;
        }
        // 位置 p 的中心落在第 p 个等宽格子的中点.
        let x_of = |x: f32| -> f32 {
            let cell = (right - left) as f32 / n_pos as f32;
            left as f32 + (x + 0.5) * cell
        };
        for p in 0..n_pos {
            let x = x_of(p as f32).round() as u32;
            for y in bottom.saturating_sub(3)..bottom {
                img.put_pixel(x, y, TICK);
            }
        }

        let window = IntensityWindow::fit(self.traces().iter().copied());
        let y_of = |v: f32| -> Option<f32> {
            let frac = match window {
                Some(w) => w.eval_f32(v)? / 255.0,
                // 所有强度相同: 画在中线.
                None if v.is_finite() => 0.5,
                None => return None,
            };
            Some(bottom as f32 - frac * (bottom - top) as f32)
        };

        for (i, (x, v)) in self.points().into_iter().enumerate() {
            let Some(y) = y_of(v) else {
                continue;
            };
            let ch = self.positions()[i % n_pos].ch;
            let color = PALETTE[ch % PALETTE.len()];
            draw_dot(&mut img, x_of(x), y, color);
        }
        img
    }
}

/// 以 `(cx, cy)` 为中心画一个实心方点, 超出画布的部分被裁掉.
fn draw_dot(img: &mut RgbImage, cx: f32, cy: f32, color: Rgb<u8>) {
    let half = (DOT / 2) as i64;
    let (cx, cy) = (cx.round() as i64, cy.round() as i64);
    let (w, h) = (img.width() as i64, img.height() as i64);
    for y in (cy - half)..=(cy + half) {
        for x in (cx - half)..=(cx + half) {
            if (0..w).contains(&x) && (0..h).contains(&y) {
                img.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codebook::{Code, Codebook};
    use crate::decoder::{DecoderAlgorithm, PerRoundMaxChannel};
    use crate::data::IntensityTable;
    use crate::plot::intensities_by_target;

    fn traces() -> TargetTraces {
        let cb = Codebook::new(2, 2, vec![Code::new("A", vec![0, 1]), Code::new("B", vec![1, 0])])
            .unwrap();
        let table = IntensityTable::synthetic(&cb, 6);
        let decoded = PerRoundMaxChannel.run(&table, &cb).unwrap();
        intensities_by_target(&decoded, "A").unwrap().with_jitter(0.4)
    }

    #[test]
    fn test_render_size_and_axes() {
        let img = traces().render(200, 120);
        assert_eq!(img.dimensions(), (200, 120));
        assert_eq!(*img.get_pixel(0, 0), BACKGROUND);
        assert_eq!(*img.get_pixel(MARGIN, 120 - MARGIN - 1), AXIS);
        assert!(img.pixels().any(|p| PALETTE.contains(p)));
    }

    #[test]
    fn test_render_is_deterministic() {
        let t = traces();
        assert_eq!(t.render(160, 90), t.render(160, 90));
    }

    #[test]
    fn test_render_tiny_canvas() {
        let img = traces().render(10, 10);
        assert!(img.pixels().all(|p| *p == BACKGROUND));
        assert_eq!(traces().render(0, 0).dimensions(), (0, 0));
    }
}
