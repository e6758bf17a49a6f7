#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 提供多轮多通道 FISH 荧光显微数据的结构化表示与码本解码算法.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 图像堆栈统一按 `(round, ch, z, y, x)` 组织, 强度表统一按 `(feature, ch, round)` 组织.
//!   其它布局的数据需要调用者先行转置.
//! 2. 在非期望情况下 (如越界索引), 程序会直接 panic, 而不会导致内存错误.
//!   输入校验失败则总是以 `Err` 返回.
//!
//! # 开发计划
//!
//! ### N 维有序遍历 ✅
//!
//! 按照给定维度顺序 (第一个最慢, 最后一个最快) 枚举坐标, 显式进位实现.
//!
//! 实现位于 `fish-berry/src/traversal`.
//!
//! ### 图像堆栈与 tile 遍历 ✅
//!
//! 五维堆栈, tile 视图, 最大值投影, 8-bit 可视化保存.
//!
//! 实现位于 `fish-berry/src/data/stack.rs`.
//!
//! ### 强度表构建 ✅
//!
//! 光斑属性与 `(feature, ch, round)` 强度的对齐校验, 按目标筛选, 合成数据.
//!
//! 实现位于 `fish-berry/src/data/intensity.rs`.
//!
//! ### 码本与 JSON 清单 ✅
//!
//! 实现位于 `fish-berry/src/codebook`.
//!
//! ### 码本解码 ✅
//!
//! 1. 逐轮最大通道 (精确匹配) ✅
//! 2. 度量距离 (最近码字) ✅
//! 3. 并行解码 (`rayon` feature) ✅
//!
//! 实现位于 `fish-berry/src/decoder`.
//!
//! ### 强度轨迹可视化 ✅
//!
//! 实现位于 `fish-berry/src/plot`.
//!
//! ### 强度表压缩归档 ✅
//!
//! 实现位于 `fish-berry/src/io`.

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 图像堆栈, 光斑属性, 强度表.
mod data;

pub use data::{
    ImageStack, ImgWriteVis, IntensityTable, IntensityWindow, ShapeMismatchError, SpotAttribute,
    SpotAttributes, SpotFileError, Target, TileSlice,
};

pub mod codebook;
pub mod consts;
pub mod decoder;
pub mod io;
pub mod plot;
pub mod prelude;
pub mod traversal;
