// crates/tf_physics/src/mesh/stretch.rs

//! 坐标拉伸映射与度规数组
//!
//! 计算坐标 ξ ∈ [0,1] 均匀剖分，物理坐标 x = x(ξ) 由拉伸映射给出。
//! 差分算子在计算坐标中求值，经链式法则映射回物理空间，
//! 所需度规为：
//!
//! ```text
//! grad  = dξ/dx            一阶导数的 Jacobian
//! grad2 = (dξ/dx)²         二阶导数主项系数
//! curv  = d²ξ/dx²          非均匀拉伸修正项系数
//! ```
//!
//! 二阶导数保持拆分形式
//! `grad2·(f₊ − 2f + f₋)·ih2 + curv·(f₊ − f₋)·i2h`，
//! 均匀网格下 curv ≡ 0，自动退化为标准中心差分。
//!
//! # 拉伸映射
//!
//! 双侧 tanh 映射（向两端壁面加密）：
//!
//! ```text
//! x(ξ) = (L/2)·[1 − tanh(β(1−2ξ))/tanh(β)]
//! ```

use serde::{Deserialize, Serialize};

/// 交错位置
///
/// MAC 网格约定：标量位于单元中心，速度分量位于自身方向的面心。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stagger {
    /// 单元中心
    Center,
    /// 面心
    Face,
}

/// 三个方向的交错位置组合
pub type StaggerSet = [Stagger; 3];

/// 全单元中心（标量场）
pub const STAGGER_CELL: StaggerSet = [Stagger::Center, Stagger::Center, Stagger::Center];
/// x 面心（Vx 分量）
pub const STAGGER_FACE_X: StaggerSet = [Stagger::Face, Stagger::Center, Stagger::Center];
/// y 面心（Vy 分量）
pub const STAGGER_FACE_Y: StaggerSet = [Stagger::Center, Stagger::Face, Stagger::Center];
/// z 面心（Vz 分量）
pub const STAGGER_FACE_Z: StaggerSet = [Stagger::Center, Stagger::Center, Stagger::Face];

/// 拉伸映射类型
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StretchKind {
    /// 均匀网格
    Uniform,
    /// 双侧 tanh 拉伸，β 越大壁面越密
    Tanh {
        /// 拉伸强度
        beta: f64,
    },
}

impl StretchKind {
    /// 物理坐标 x(ξ)
    pub fn map(&self, xi: f64, length: f64) -> f64 {
        match *self {
            Self::Uniform => length * xi,
            Self::Tanh { beta } => {
                0.5 * length * (1.0 - ((beta * (1.0 - 2.0 * xi)).tanh() / beta.tanh()))
            }
        }
    }

    /// 一阶导数 dx/dξ
    fn dx_dxi(&self, xi: f64, length: f64) -> f64 {
        match *self {
            Self::Uniform => length,
            Self::Tanh { beta } => {
                let u = beta * (1.0 - 2.0 * xi);
                let sech2 = 1.0 / u.cosh().powi(2);
                length * beta * sech2 / beta.tanh()
            }
        }
    }

    /// 二阶导数 d²x/dξ²
    fn d2x_dxi2(&self, xi: f64, length: f64) -> f64 {
        match *self {
            Self::Uniform => 0.0,
            Self::Tanh { beta } => {
                let u = beta * (1.0 - 2.0 * xi);
                let sech2 = 1.0 / u.cosh().powi(2);
                4.0 * length * beta * beta * sech2 * u.tanh() / beta.tanh()
            }
        }
    }
}

/// 单方向度规数组
///
/// 数组按子域全盒（含 pad）索引，与场数组同长，
/// 差分模板中可直接用同一下标访问。
#[derive(Debug, Clone)]
pub struct AxisMetric {
    /// dξ/dx
    pub grad: Vec<f64>,
    /// (dξ/dx)²
    pub grad2: Vec<f64>,
    /// d²ξ/dx²
    pub curv: Vec<f64>,
}

impl AxisMetric {
    /// 在给定交错位置采样度规
    ///
    /// # 参数
    /// - `kind`: 拉伸映射
    /// - `length`: 物理长度
    /// - `n`: 核心单元数
    /// - `pad`: 幽灵层宽度
    /// - `stagger`: 采样位置（中心 ξ = (m−pad+½)·dξ，面 ξ = (m−pad)·dξ）
    pub fn sample(kind: StretchKind, length: f64, n: usize, pad: usize, stagger: Stagger) -> Self {
        let full = n + 2 * pad;
        let d_xi = 1.0 / n as f64;
        let offset = match stagger {
            Stagger::Center => 0.5,
            Stagger::Face => 0.0,
        };

        let mut grad = Vec::with_capacity(full);
        let mut grad2 = Vec::with_capacity(full);
        let mut curv = Vec::with_capacity(full);

        for m in 0..full {
            let xi = (m as f64 - pad as f64 + offset) * d_xi;
            let x_xi = kind.dx_dxi(xi, length);
            let x_xixi = kind.d2x_dxi2(xi, length);

            let g = 1.0 / x_xi;
            grad.push(g);
            grad2.push(g * g);
            // ξ_xx = −x_ξξ / x_ξ³
            curv.push(-x_xixi * g * g * g);
        }

        Self { grad, grad2, curv }
    }

    /// 平凡度规（planar 模式下被消去的方向）
    pub fn trivial(full: usize) -> Self {
        Self {
            grad: vec![0.0; full],
            grad2: vec![0.0; full],
            curv: vec![0.0; full],
        }
    }

    /// 局部物理网格尺度 dx = dξ / grad
    pub fn local_spacing(&self, index: usize, d_xi: f64) -> f64 {
        d_xi / self.grad[index]
    }
}

// ============================================================
// 测试
// ============================================================
