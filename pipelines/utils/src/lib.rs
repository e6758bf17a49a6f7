//! 解码流水线依赖的通用组件.

use fish_berry::IntensityWindow;

pub mod loader;

const SEP: &str = "--------------------------------------------------------";

/// 向 `w` 写一条简单分隔线.
#[inline]
pub fn sep_to<W: std::io::Write>(mut w: W) -> std::io::Result<()> {
    writeln!(&mut w, "{SEP}")
}

/// 获得可并行核心数.
pub fn cpus() -> usize {
    std::thread::available_parallelism().map_or_else(|_| num_cpus::get(), usize::from)
}

/// 归一化强度的默认显示窗口: 下限 0, 上限 1.
#[inline]
pub fn unit_window() -> IntensityWindow {
    // 该操作不会生成 `None`, 可直接 unwrap.
    IntensityWindow::from_bounds(0.0, 1.0).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers() {
        assert!(cpus() >= 1);
        let mut buf = Vec::new();
        sep_to(&mut buf).unwrap();
        assert_eq!(buf.len(), SEP.len() + 1);
        let w = unit_window();
        assert_eq!((w.lower_bound(), w.upper_bound()), (0.0, 1.0));
    }
}
