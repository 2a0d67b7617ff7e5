// crates/tf_physics/src/forcing.rs

//! 强迫项
//!
//! 矢量场与标量场各自持有一个强迫协作者，在时间推进的
//! RHS 组装阶段注入贡献。强迫只写核心单元。

use crate::field::{PlainScalar, PlainVector, ScalarField, VectorField};
use crate::mesh::Grid;

/// 动量方程强迫项
pub trait Forcing: Send + Sync {
    /// 向动量 RHS 添加贡献
    ///
    /// # 参数
    /// - `v`: 当前速度场（只读）
    /// - `t`: 标量场（浮力类强迫需要；纯水动力算例为 `None`）
    /// - `rhs`: 动量 RHS 累加器
    fn add_forcing(
        &self,
        grid: &Grid,
        v: &VectorField,
        t: Option<&ScalarField>,
        rhs: &mut PlainVector,
    );
}

/// 标量方程强迫项
pub trait ScalarForcing: Send + Sync {
    /// 向标量 RHS 添加贡献
    fn add_forcing(&self, grid: &Grid, t: &ScalarField, v: &VectorField, rhs: &mut PlainScalar);
}

// ============================================================
// 实现
// ============================================================

/// 零强迫
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroForcing;

impl Forcing for ZeroForcing {
    fn add_forcing(
        &self,
        _grid: &Grid,
        _v: &VectorField,
        _t: Option<&ScalarField>,
        _rhs: &mut PlainVector,
    ) {
    }
}

impl ScalarForcing for ZeroForcing {
    fn add_forcing(&self, _grid: &Grid, _t: &ScalarField, _v: &VectorField, _rhs: &mut PlainScalar) {
    }
}

/// 浮力强迫（Boussinesq 近似）
///
/// Rayleigh-Bénard 无量纲化下向 z 向动量添加 `coeff·T`。
#[derive(Debug, Clone, Copy)]
pub struct BuoyancyForcing {
    /// 浮力系数
    pub coeff: f64,
}

impl BuoyancyForcing {
    /// 创建浮力强迫
    pub fn new(coeff: f64) -> Self {
        Self { coeff }
    }
}

impl Forcing for BuoyancyForcing {
    fn add_forcing(
        &self,
        grid: &Grid,
        _v: &VectorField,
        t: Option<&ScalarField>,
        rhs: &mut PlainVector,
    ) {
        let t = match t {
            Some(t) => t,
            None => {
                log::warn!("浮力强迫需要温度场，本步跳过");
                return;
            }
        };

        let core = grid.core();
        for i in core.x0..=core.x1 {
            for j in core.y0..=core.y1 {
                for k in core.z0..=core.z1 {
                    rhs.z[[i, j, k]] += self.coeff * t.data[[i, j, k]];
                }
            }
        }
    }
}

/// 常量体积力（如槽道流压力梯度驱动）
#[derive(Debug, Clone, Copy)]
pub struct ConstantForcing {
    /// 各方向加速度
    pub accel: [f64; 3],
}

impl ConstantForcing {
    /// 创建常量体积力
    pub fn new(accel: [f64; 3]) -> Self {
        Self { accel }
    }
}

impl Forcing for ConstantForcing {
    fn add_forcing(
        &self,
        grid: &Grid,
        _v: &VectorField,
        _t: Option<&ScalarField>,
        rhs: &mut PlainVector,
    ) {
        let core = grid.core();
        for (axis, data) in [
            (0usize, &mut rhs.x),
            (1usize, &mut rhs.y),
            (2usize, &mut rhs.z),
        ] {
            if axis == 1 && grid.planar {
                continue;
            }
            let a = self.accel[axis];
            if a == 0.0 {
                continue;
            }
            for i in core.x0..=core.x1 {
                for j in core.y0..=core.y1 {
                    for k in core.z0..=core.z1 {
                        data[[i, j, k]] += a;
                    }
                }
            }
        }
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{PlainVector, ScalarField, VectorField};
    use tf_config::DomainConfig;

    fn grid() -> Grid {
        Grid::new(&DomainConfig {
            nx: 4,
            ny: 4,
            nz: 4,
            ..Default::default()
        })
    }

    #[test]
    fn test_buoyancy_adds_to_z_only() {
        let g = grid();
        let v = VectorField::new(&g);
        let mut t = ScalarField::new(&g, "T");
        t.fill(2.0);
        let mut rhs = PlainVector::new(&g);

        BuoyancyForcing::new(0.5).add_forcing(&g, &v, Some(&t), &mut rhs);

        let core = g.core();
        assert_eq!(rhs.z[[core.x0, core.y0, core.z0]], 1.0);
        assert_eq!(rhs.x[[core.x0, core.y0, core.z0]], 0.0);
        // pad 不受影响
        assert_eq!(rhs.z[[0, 0, 0]], 0.0);
    }

    #[test]
    fn test_buoyancy_without_scalar_is_noop() {
        let g = grid();
        let v = VectorField::new(&g);
        let mut rhs = PlainVector::new(&g);
        BuoyancyForcing::new(1.0).add_forcing(&g, &v, None, &mut rhs);
        assert!(rhs.z.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_constant_forcing() {
        let g = grid();
        let v = VectorField::new(&g);
        let mut rhs = PlainVector::new(&g);
        ConstantForcing::new([1.0, 0.0, -2.0]).add_forcing(&g, &v, None, &mut rhs);

        let core = g.core();
        assert_eq!(rhs.x[[core.x0, core.y0, core.z0]], 1.0);
        assert_eq!(rhs.y[[core.x0, core.y0, core.z0]], 0.0);
        assert_eq!(rhs.z[[core.x1, core.y1, core.z1]], -2.0);
    }
}
