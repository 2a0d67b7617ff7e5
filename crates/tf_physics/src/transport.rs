// crates/tf_physics/src/transport.rs

//! 幽灵层传输
//!
//! 场数组的 pad 层通过 [`HaloTransport`] 与邻居子域交换。
//! 协议：对每个面方向，发送最外 `p` 层内部单元，
//! 接收写入对侧 pad，`p` 为该方向的 pad 宽度。
//! 交换结束后，非物理面的 pad 等于邻居对应核心层；
//! 物理边界面的 pad 保持边界条件上次写入的值。
//!
//! 该 trait 同时承载两类集体操作：pad 交换与全局最大值归约。
//! 分布式后端实现同一 trait 即可接入；
//! 树内提供单进程实现 [`LocalTransport`]（周期回绕为数组内拷贝，
//! 归约为恒等）。
//!
//! `sync` 紧接自身重复执行是幂等的。

use ndarray::{Array3, s};

use crate::mesh::Grid;

/// 幽灵层传输接口
pub trait HaloTransport: Send + Sync {
    /// 与所有邻居交换 pad 层
    fn sync(&self, grid: &Grid, data: &mut Array3<f64>);

    /// 全局最大值归约
    fn max_all(&self, local: f64) -> f64;
}

/// 单进程传输
///
/// 1×1×1 拓扑下周期方向的邻居是自身：pad 由本域对侧核心层填充。
/// 非周期方向不做任何事。
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTransport;

impl LocalTransport {
    /// 创建单进程传输
    pub fn new() -> Self {
        Self
    }
}

impl HaloTransport for LocalTransport {
    fn sync(&self, grid: &Grid, data: &mut Array3<f64>) {
        let pads = grid.pads;

        // x 方向
        if grid.periodic[0] {
            let p = pads[0];
            let n = grid.nx;
            for g in 0..p {
                // 左 pad ← 右端核心层
                let src = data.slice(s![g + n, .., ..]).to_owned();
                data.slice_mut(s![g, .., ..]).assign(&src);
                // 右 pad ← 左端核心层
                let src = data.slice(s![p + g, .., ..]).to_owned();
                data.slice_mut(s![p + n + g, .., ..]).assign(&src);
            }
        }

        // y 方向（planar 模式下 pad 为 0，循环自动为空）
        if grid.periodic[1] && !grid.planar {
            let p = pads[1];
            let n = grid.ny;
            for g in 0..p {
                let src = data.slice(s![.., g + n, ..]).to_owned();
                data.slice_mut(s![.., g, ..]).assign(&src);
                let src = data.slice(s![.., p + g, ..]).to_owned();
                data.slice_mut(s![.., p + n + g, ..]).assign(&src);
            }
        }

        // z 方向
        if grid.periodic[2] {
            let p = pads[2];
            let n = grid.nz;
            for g in 0..p {
                let src = data.slice(s![.., .., g + n]).to_owned();
                data.slice_mut(s![.., .., g]).assign(&src);
                let src = data.slice(s![.., .., p + g]).to_owned();
                data.slice_mut(s![.., .., p + n + g]).assign(&src);
            }
        }
    }

    fn max_all(&self, local: f64) -> f64 {
        local
    }
}

// ============================================================
// 测试
// ============================================================
