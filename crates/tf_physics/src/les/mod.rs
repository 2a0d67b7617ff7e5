// crates/tf_physics/src/les/mod.rs

//! 亚格子尺度模型
//!
//! 时间推进核心通过 [`SubgridModel`] 合同使用亚格子闭合：
//! 模型检视当前速度（与温度），向 RHS 添加亚格子应力散度，
//! 并返回亚格子动能供时间序列报告。
//!
//! 开关语义（见配置 `les.model`）：
//! - `Momentum`：仅动量方程收到亚格子贡献；标量 RHS 不转发，
//!   即标量在仅动量闭合下按被动标量处理
//! - `MomentumScalar`：动量与标量都收到贡献
//!
//! 早期抑制（`t ≤ 5·dt` 不调用模型）由时间推进核心负责。

pub mod smagorinsky;

pub use smagorinsky::SmagorinskyModel;

use crate::field::{PlainScalar, PlainVector, ScalarField, VectorField};
use crate::mesh::Grid;

/// 亚格子模型合同
pub trait SubgridModel: Send {
    /// 仅动量：添加亚格子应力散度，返回亚格子动能
    fn compute_sg(&mut self, grid: &Grid, v: &VectorField, nse_rhs: &mut PlainVector) -> f64;

    /// 动量 + 标量：同时为标量 RHS 添加亚格子扩散，返回亚格子动能
    fn compute_sg_scalar(
        &mut self,
        grid: &Grid,
        v: &VectorField,
        t: &ScalarField,
        nse_rhs: &mut PlainVector,
        tmp_rhs: &mut PlainScalar,
    ) -> f64;
}
