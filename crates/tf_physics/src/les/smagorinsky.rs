// crates/tf_physics/src/les/smagorinsky.rs

//! Smagorinsky 亚格子闭合
//!
//! 涡粘性假设：
//!
//! ```text
//! ν_t = (C_s·Δ)²·|S|,   |S| = √(2·S_ij·S_ij)
//! ```
//!
//! 其中 Δ 是局部滤波尺度（网格体积尺度），S_ij 是应变率张量。
//! 亚格子应力散度以涡扩散形式并入动量 RHS：`rhs += ν_t·∇²V`；
//! 标量方程的涡扩散系数取 κ_t = ν_t / Pr_t。
//!
//! 亚格子动能按涡粘性标度估计：
//!
//! ```text
//! k_sgs = (ν_t / (C_k·Δ))²,   C_k ≈ 0.094
//! ```
//!
//! 体积平均后作为诊断量返回。

use ndarray::Array3;

use super::SubgridModel;
use crate::field::{PlainScalar, PlainVector, ScalarField, VectorField};
use crate::mesh::Grid;
use crate::numerics::stencil::{d1, d2};

/// 涡粘性下限 [无量纲]
const MIN_EDDY_VISCOSITY: f64 = 0.0;
/// 涡粘性上限，防止病态应变率导致爆破
const MAX_EDDY_VISCOSITY: f64 = 1e3;
/// 亚格子动能标度常数
const KE_SCALING_CONSTANT: f64 = 0.094;

/// Smagorinsky 亚格子模型
pub struct SmagorinskyModel {
    /// Smagorinsky 常数 C_s
    cs: f64,
    /// 湍流 Prandtl 数
    pr_t: f64,
    /// 涡粘性（核心单元有效）
    nu_t: Array3<f64>,
}

impl SmagorinskyModel {
    /// 创建模型
    pub fn new(grid: &Grid, cs: f64, pr_t: f64) -> Self {
        Self {
            cs,
            pr_t,
            nu_t: Array3::zeros(grid.full_shape()),
        }
    }

    /// 当前涡粘性数组（诊断用）
    pub fn eddy_viscosity(&self) -> &Array3<f64> {
        &self.nu_t
    }

    /// 由速度场更新涡粘性，返回体均亚格子动能
    fn update_eddy_viscosity(&mut self, grid: &Grid, v: &VectorField) -> f64 {
        let core = grid.core();
        let planar = grid.planar;

        // 每个分量用自身交错位置的度规取导数，与对流项同一约定
        let mxx = grid.metric(0, v.x.stagger_along(0));
        let mxy = grid.metric(1, v.x.stagger_along(1));
        let mxz = grid.metric(2, v.x.stagger_along(2));
        let myx = grid.metric(0, v.y.stagger_along(0));
        let myy = grid.metric(1, v.y.stagger_along(1));
        let myz = grid.metric(2, v.y.stagger_along(2));
        let mzx = grid.metric(0, v.z.stagger_along(0));
        let mzy = grid.metric(1, v.z.stagger_along(1));
        let mzz = grid.metric(2, v.z.stagger_along(2));

        let (vx, vy, vz) = (&v.x.data, &v.y.data, &v.z.data);

        let mut ke_sum = 0.0;
        for i in core.x0..=core.x1 {
            for j in core.y0..=core.y1 {
                for k in core.z0..=core.z1 {
                    let dudx = d1(vx[[i - 1, j, k]], vx[[i + 1, j, k]], grid.i2hx, mxx.grad[i]);
                    let dudz = d1(vx[[i, j, k - 1]], vx[[i, j, k + 1]], grid.i2hz, mxz.grad[k]);
                    let dwdx = d1(vz[[i - 1, j, k]], vz[[i + 1, j, k]], grid.i2hx, mzx.grad[i]);
                    let dwdz = d1(vz[[i, j, k - 1]], vz[[i, j, k + 1]], grid.i2hz, mzz.grad[k]);

                    let mut s2 = 2.0 * (dudx * dudx + dwdz * dwdz);
                    let sxz = 0.5 * (dudz + dwdx);
                    s2 += 4.0 * sxz * sxz;

                    if !planar {
                        let dudy =
                            d1(vx[[i, j - 1, k]], vx[[i, j + 1, k]], grid.i2hy, mxy.grad[j]);
                        let dvdx =
                            d1(vy[[i - 1, j, k]], vy[[i + 1, j, k]], grid.i2hx, myx.grad[i]);
                        let dvdy =
                            d1(vy[[i, j - 1, k]], vy[[i, j + 1, k]], grid.i2hy, myy.grad[j]);
                        let dvdz =
                            d1(vy[[i, j, k - 1]], vy[[i, j, k + 1]], grid.i2hz, myz.grad[k]);
                        let dwdy =
                            d1(vz[[i, j - 1, k]], vz[[i, j + 1, k]], grid.i2hy, mzy.grad[j]);

                        s2 += 2.0 * dvdy * dvdy;
                        let sxy = 0.5 * (dudy + dvdx);
                        let syz = 0.5 * (dvdz + dwdy);
                        s2 += 4.0 * (sxy * sxy + syz * syz);
                    }

                    let strain = s2.sqrt();
                    let delta = grid.filter_width(i, j, k);
                    let nu_t = ((self.cs * delta).powi(2) * strain)
                        .clamp(MIN_EDDY_VISCOSITY, MAX_EDDY_VISCOSITY);
                    self.nu_t[[i, j, k]] = nu_t;

                    let k_sgs = (nu_t / (KE_SCALING_CONSTANT * delta)).powi(2);
                    ke_sum += k_sgs;
                }
            }
        }

        ke_sum / grid.core_count() as f64
    }

    /// `rhs += coeff·ν_t·∇²f`（核心单元）
    fn add_eddy_diffusion(
        &self,
        grid: &Grid,
        f: &ScalarField,
        coeff: f64,
        out: &mut Array3<f64>,
    ) {
        let core = grid.core();
        let planar = grid.planar;
        let mx = grid.metric(0, f.stagger_along(0));
        let my = grid.metric(1, f.stagger_along(1));
        let mz = grid.metric(2, f.stagger_along(2));
        let data = &f.data;

        for i in core.x0..=core.x1 {
            for j in core.y0..=core.y1 {
                for k in core.z0..=core.z1 {
                    let mut lap = d2(
                        data[[i - 1, j, k]],
                        data[[i, j, k]],
                        data[[i + 1, j, k]],
                        grid.ihx2,
                        grid.i2hx,
                        mx.grad2[i],
                        mx.curv[i],
                    );
                    if !planar {
                        lap += d2(
                            data[[i, j - 1, k]],
                            data[[i, j, k]],
                            data[[i, j + 1, k]],
                            grid.ihy2,
                            grid.i2hy,
                            my.grad2[j],
                            my.curv[j],
                        );
                    }
                    lap += d2(
                        data[[i, j, k - 1]],
                        data[[i, j, k]],
                        data[[i, j, k + 1]],
                        grid.ihz2,
                        grid.i2hz,
                        mz.grad2[k],
                        mz.curv[k],
                    );
                    out[[i, j, k]] += coeff * self.nu_t[[i, j, k]] * lap;
                }
            }
        }
    }
}

impl SubgridModel for SmagorinskyModel {
    fn compute_sg(&mut self, grid: &Grid, v: &VectorField, nse_rhs: &mut PlainVector) -> f64 {
        let ke = self.update_eddy_viscosity(grid, v);

        self.add_eddy_diffusion(grid, &v.x, 1.0, &mut nse_rhs.x);
        if !grid.planar {
            self.add_eddy_diffusion(grid, &v.y, 1.0, &mut nse_rhs.y);
        }
        self.add_eddy_diffusion(grid, &v.z, 1.0, &mut nse_rhs.z);

        ke
    }

    fn compute_sg_scalar(
        &mut self,
        grid: &Grid,
        v: &VectorField,
        t: &ScalarField,
        nse_rhs: &mut PlainVector,
        tmp_rhs: &mut PlainScalar,
    ) -> f64 {
        let ke = self.compute_sg(grid, v, nse_rhs);

        // 标量涡扩散 κ_t = ν_t / Pr_t
        let inv_pr_t = 1.0 / self.pr_t;
        self.add_eddy_diffusion(grid, t, inv_pr_t, &mut tmp_rhs.data);

        ke
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{HaloTransport, LocalTransport};
    use tf_config::DomainConfig;

    fn grid() -> Grid {
        Grid::new(&DomainConfig {
            nx: 8,
            ny: 8,
            nz: 8,
            x_per: true,
            y_per: true,
            z_per: true,
            ..Default::default()
        })
    }

    #[test]
    fn test_quiescent_field_gives_zero_energy() {
        let g = grid();
        let v = VectorField::new(&g);
        let mut model = SmagorinskyModel::new(&g, 0.17, 0.9);
        let mut rhs = PlainVector::new(&g);

        let ke = model.compute_sg(&g, &v, &mut rhs);
        assert_eq!(ke, 0.0);
        assert!(rhs.x.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_sheared_field_gives_positive_energy() {
        let g = grid();
        let transport = LocalTransport::new();
        let mut v = VectorField::new(&g);
        // 线性剪切 Vx(z)
        let (fx, fy, fz) = g.full_shape();
        for i in 0..fx {
            for j in 0..fy {
                for k in 0..fz {
                    v.x.data[[i, j, k]] = k as f64;
                }
            }
        }
        v.sync(&g, &transport);

        let mut model = SmagorinskyModel::new(&g, 0.17, 0.9);
        let mut rhs = PlainVector::new(&g);
        let ke = model.compute_sg(&g, &v, &mut rhs);

        assert!(ke > 0.0);
        let core = g.core();
        assert!(model.eddy_viscosity()[[core.x0, core.y0, core.z0]] > 0.0);
    }

    #[test]
    fn test_scalar_mode_adds_to_scalar_rhs() {
        let g = grid();
        let transport = LocalTransport::new();
        let mut v = VectorField::new(&g);
        let (fx, fy, fz) = g.full_shape();
        for i in 0..fx {
            for j in 0..fy {
                for k in 0..fz {
                    v.x.data[[i, j, k]] = k as f64;
                }
            }
        }
        v.sync(&g, &transport);

        // 抛物的温度分布，Laplacian 非零
        let mut t = ScalarField::new(&g, "T");
        for i in 0..fx {
            for j in 0..fy {
                for k in 0..fz {
                    t.data[[i, j, k]] = (k as f64) * (k as f64);
                }
            }
        }
        t.sync(&g, &transport);

        let mut model = SmagorinskyModel::new(&g, 0.17, 0.9);
        let mut nse_rhs = PlainVector::new(&g);
        let mut tmp_rhs = PlainScalar::new(&g);
        model.compute_sg_scalar(&g, &v, &t, &mut nse_rhs, &mut tmp_rhs);

        assert!(tmp_rhs.max_abs(&transport) > 0.0);
    }
}
