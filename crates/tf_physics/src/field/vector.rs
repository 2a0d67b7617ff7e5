// crates/tf_physics/src/field/vector.rs

//! 矢量场
//!
//! 三个 MAC 交错分量（各自沿自身方向取面心）加一个强迫协作者。
//! 分量边界条件独立设置，隐式求解中按分量单独施加。

use super::plain::PlainVector;
use super::scalar::ScalarField;
use crate::forcing::{Forcing, ZeroForcing};
use crate::mesh::{Grid, STAGGER_FACE_X, STAGGER_FACE_Y, STAGGER_FACE_Z};
use crate::transport::HaloTransport;

/// 矢量场
pub struct VectorField {
    /// x 分量（x 面心）
    pub x: ScalarField,
    /// y 分量（y 面心）
    pub y: ScalarField,
    /// z 分量（z 面心）
    pub z: ScalarField,
    /// 强迫协作者
    pub forcing: Box<dyn Forcing>,
}

impl VectorField {
    /// 创建全零矢量场（零强迫）
    pub fn new(grid: &Grid) -> Self {
        Self {
            x: ScalarField::with_stagger(grid, "Vx", STAGGER_FACE_X),
            y: ScalarField::with_stagger(grid, "Vy", STAGGER_FACE_Y),
            z: ScalarField::with_stagger(grid, "Vz", STAGGER_FACE_Z),
            forcing: Box::new(ZeroForcing),
        }
    }

    /// 设置强迫协作者
    pub fn with_forcing(mut self, forcing: Box<dyn Forcing>) -> Self {
        self.forcing = forcing;
        self
    }

    /// 按轴访问分量
    pub fn component(&self, axis: usize) -> &ScalarField {
        match axis {
            0 => &self.x,
            1 => &self.y,
            _ => &self.z,
        }
    }

    /// 按轴可变访问分量
    pub fn component_mut(&mut self, axis: usize) -> &mut ScalarField {
        match axis {
            0 => &mut self.x,
            1 => &mut self.y,
            _ => &mut self.z,
        }
    }

    /// 三个分量依次交换幽灵层
    pub fn sync(&mut self, grid: &Grid, transport: &dyn HaloTransport) {
        self.x.sync(grid, transport);
        self.y.sync(grid, transport);
        self.z.sync(grid, transport);
    }

    /// 施加全部分量的边界条件
    pub fn impose_bcs(&mut self, grid: &Grid, transport: &dyn HaloTransport) {
        self.x.impose_bcs(grid, transport);
        if !grid.planar {
            self.y.impose_bcs(grid, transport);
        }
        self.z.impose_bcs(grid, transport);
    }

    /// `self -= a`
    pub fn sub_plain(&mut self, a: &PlainVector) {
        self.x.data -= &a.x;
        self.y.data -= &a.y;
        self.z.data -= &a.z;
    }

    /// `self = a`
    pub fn assign_plain(&mut self, a: &PlainVector) {
        self.x.data.assign(&a.x);
        self.y.data.assign(&a.y);
        self.z.data.assign(&a.z);
    }

    /// 全局最大速度分量幅值
    pub fn max_abs(&self, transport: &dyn HaloTransport) -> f64 {
        let mx = self.x.max_abs(transport);
        let my = self.y.max_abs(transport);
        let mz = self.z.max_abs(transport);
        mx.max(my).max(mz)
    }
}

// ============================================================
// 测试
// ============================================================
