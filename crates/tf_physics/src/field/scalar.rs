// crates/tf_physics/src/field/scalar.rs

//! 标量场
//!
//! 带名称、交错位置、壁面边界条件表与可选强迫协作者的场。
//! 构造后数组为零；`sync` 之后非物理面 pad 等于邻居核心层；
//! 物理面 pad 由边界施加负责。

use ndarray::Array3;

use super::plain::{local_max_abs, PlainScalar};
use crate::boundary::{self, FaceBcs};
use crate::forcing::ScalarForcing;
use crate::mesh::{Grid, Stagger, StaggerSet, STAGGER_CELL};
use crate::transport::HaloTransport;

/// 标量场
pub struct ScalarField {
    /// 场名称（日志与报错用）
    pub name: String,
    /// 数据数组（全盒）
    pub data: Array3<f64>,
    /// 交错位置
    pub stagger: StaggerSet,
    /// 六面边界条件
    pub bcs: FaceBcs,
    /// 强迫协作者（压力等无强迫的场为 `None`）
    pub forcing: Option<Box<dyn ScalarForcing>>,
}

impl ScalarField {
    /// 创建单元中心标量场（全零）
    pub fn new(grid: &Grid, name: impl Into<String>) -> Self {
        Self::with_stagger(grid, name, STAGGER_CELL)
    }

    /// 创建指定交错位置的标量场（全零）
    pub fn with_stagger(grid: &Grid, name: impl Into<String>, stagger: StaggerSet) -> Self {
        Self {
            name: name.into(),
            data: Array3::zeros(grid.full_shape()),
            stagger,
            bcs: FaceBcs::default(),
            forcing: None,
        }
    }

    /// 设置边界条件表
    pub fn with_bcs(mut self, bcs: FaceBcs) -> Self {
        self.bcs = bcs;
        self
    }

    /// 设置强迫协作者
    pub fn with_forcing(mut self, forcing: Box<dyn ScalarForcing>) -> Self {
        self.forcing = Some(forcing);
        self
    }

    /// 沿某轴的交错位置
    pub fn stagger_along(&self, axis: usize) -> Stagger {
        self.stagger[axis]
    }

    /// 幽灵层交换
    pub fn sync(&mut self, grid: &Grid, transport: &dyn HaloTransport) {
        transport.sync(grid, &mut self.data);
    }

    /// 施加边界条件
    ///
    /// 先交换幽灵层，再按规定顺序写壁面切片：
    /// 非周期的 x/y 面对，以及总是施加的顶/底面对。
    pub fn impose_bcs(&mut self, grid: &Grid, transport: &dyn HaloTransport) {
        transport.sync(grid, &mut self.data);
        boundary::apply_all(grid, &mut self.data, &self.bcs);
    }

    /// 全局最大绝对值（跨进程归约）
    pub fn max_abs(&self, transport: &dyn HaloTransport) -> f64 {
        transport.max_all(local_max_abs(&self.data))
    }

    /// 全场置常数
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// 全场加常数
    pub fn add_scalar(&mut self, value: f64) {
        self.data.mapv_inplace(|v| v + value);
    }

    /// `self += a`
    pub fn add_plain(&mut self, a: &PlainScalar) {
        self.data += &a.data;
    }

    /// `self -= a`
    pub fn sub_plain(&mut self, a: &PlainScalar) {
        self.data -= &a.data;
    }

    /// `self = a`
    pub fn assign_plain(&mut self, a: &PlainScalar) {
        self.data.assign(&a.data);
    }
}

// ============================================================
// 测试
// ============================================================
