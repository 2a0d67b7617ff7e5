// crates/tf_physics/src/pressure/mod.rs

//! 压力 Poisson 求解器
//!
//! 投影步的合同方：求解 ∇²Pp = r，使
//! `max|∇²Pp − r| ≤ tolerance`，物理面取齐次 Neumann（镜像）条件，
//! 周期方向由幽灵层回绕处理。
//!
//! # 实现
//!
//! 对角（Jacobi）缩放的无矩阵 BiCGStab，直接作用于核心单元上的
//! 度规加权 Laplacian 模板。拉伸度规使算子轻度非对称，
//! BiCGStab 对此稳健而普通 CG 不保证。
//!
//! 全 Neumann/周期条件下算子有常数零空间：右端与解均做
//! 均值投影。消费方只使用 ∇Pp，常数模无影响。
//!
//! # 迭代格式（预条件 BiCGStab）
//!
//! 1. r₀ = b − A·x₀，r̂ = r₀
//! 2. 对于 k = 0, 1, 2, ...
//!    - β = (ρ_{k}/ρ_{k−1})·(α/ω)
//!    - p = r + β(p − ω·v)
//!    - p̂ = M⁻¹p，v = A·p̂，α = ρ/(r̂,v)
//!    - s = r − α·v，ŝ = M⁻¹s，t = A·ŝ
//!    - ω = (t,s)/(t,t)
//!    - x += α·p̂ + ω·ŝ，r = s − ω·t

use ndarray::Array3;

use crate::boundary::{self, BcKind, Face};
use crate::error::{PhysicsError, PhysicsResult};
use crate::field::PlainScalar;
use crate::mesh::{Grid, Stagger};
use crate::numerics::stencil::d2;
use crate::transport::HaloTransport;

// ============================================================
// 配置与结果
// ============================================================

/// 求解器配置
#[derive(Debug, Clone)]
pub struct PressureConfig {
    /// 残差最大范数容差（绝对）
    pub tolerance: f64,
    /// 最大迭代次数
    pub max_iter: usize,
    /// 是否打印迭代残差
    pub verbose: bool,
}

impl Default for PressureConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-8,
            max_iter: 2000,
            verbose: false,
        }
    }
}

/// 求解状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    /// 收敛
    Converged,
    /// 达到最大迭代次数
    MaxIterationsReached,
    /// 停滞（内积接近零）
    Stagnated,
}

/// 求解结果
#[derive(Debug, Clone)]
pub struct SolverResult {
    /// 求解状态
    pub status: SolverStatus,
    /// 迭代次数
    pub iterations: usize,
    /// 最终残差最大范数
    pub residual_norm: f64,
    /// 初始残差最大范数
    pub initial_residual_norm: f64,
}

// ============================================================
// 幽灵层填充
// ============================================================

/// 填充压力类场的幽灵层
///
/// 周期方向经传输层回绕，非周期物理面做 Neumann 镜像。
/// 求解器每次算子作用前以及解返回前都会调用；
/// 投影步在梯度求值前也复用此函数。
pub fn fill_ghosts(grid: &Grid, transport: &dyn HaloTransport, data: &mut Array3<f64>) {
    transport.sync(grid, data);

    if !grid.periodic[0] {
        boundary::apply_face(grid, data, Face::Left, BcKind::Neumann);
        boundary::apply_face(grid, data, Face::Right, BcKind::Neumann);
    }
    if !grid.planar && !grid.periodic[1] {
        boundary::apply_face(grid, data, Face::Front, BcKind::Neumann);
        boundary::apply_face(grid, data, Face::Back, BcKind::Neumann);
    }
    if !grid.periodic[2] {
        boundary::apply_face(grid, data, Face::Bottom, BcKind::Neumann);
        boundary::apply_face(grid, data, Face::Top, BcKind::Neumann);
    }
}

// ============================================================
// 平坦向量辅助
// ============================================================

#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[inline]
fn norm_inf(a: &[f64]) -> f64 {
    a.iter().fold(0.0f64, |m, &v| m.max(v.abs()))
}

fn subtract_mean(a: &mut [f64]) {
    let mean = a.iter().sum::<f64>() / a.len() as f64;
    for v in a.iter_mut() {
        *v -= mean;
    }
}

/// 核心单元 → 平坦向量
fn gather(grid: &Grid, data: &Array3<f64>, out: &mut [f64]) {
    let core = grid.core();
    let mut idx = 0;
    for i in core.x0..=core.x1 {
        for j in core.y0..=core.y1 {
            for k in core.z0..=core.z1 {
                out[idx] = data[[i, j, k]];
                idx += 1;
            }
        }
    }
}

/// 平坦向量 → 核心单元
fn scatter(grid: &Grid, x: &[f64], data: &mut Array3<f64>) {
    let core = grid.core();
    let mut idx = 0;
    for i in core.x0..=core.x1 {
        for j in core.y0..=core.y1 {
            for k in core.z0..=core.z1 {
                data[[i, j, k]] = x[idx];
                idx += 1;
            }
        }
    }
}

/// 无矩阵算子作用：out = A·x（核心单元上的 Laplacian）
fn apply_operator(
    grid: &Grid,
    transport: &dyn HaloTransport,
    work: &mut Array3<f64>,
    x: &[f64],
    out: &mut [f64],
) {
    scatter(grid, x, work);
    fill_ghosts(grid, transport, work);

    let core = grid.core();
    let mx = grid.metric(0, Stagger::Center);
    let my = grid.metric(1, Stagger::Center);
    let mz = grid.metric(2, Stagger::Center);

    let mut idx = 0;
    for i in core.x0..=core.x1 {
        for j in core.y0..=core.y1 {
            for k in core.z0..=core.z1 {
                let mut lap = d2(
                    work[[i - 1, j, k]],
                    work[[i, j, k]],
                    work[[i + 1, j, k]],
                    grid.ihx2,
                    grid.i2hx,
                    mx.grad2[i],
                    mx.curv[i],
                );
                if !grid.planar {
                    lap += d2(
                        work[[i, j - 1, k]],
                        work[[i, j, k]],
                        work[[i, j + 1, k]],
                        grid.ihy2,
                        grid.i2hy,
                        my.grad2[j],
                        my.curv[j],
                    );
                }
                lap += d2(
                    work[[i, j, k - 1]],
                    work[[i, j, k]],
                    work[[i, j, k + 1]],
                    grid.ihz2,
                    grid.i2hz,
                    mz.grad2[k],
                    mz.curv[k],
                );
                out[idx] = lap;
                idx += 1;
            }
        }
    }
}

// ============================================================
// 求解器
// ============================================================

/// 压力 Poisson 求解器
///
/// 工作区在构造时一次分配，迭代中不再分配内存。
pub struct PressureSolver {
    config: PressureConfig,
    n: usize,
    work: Array3<f64>,
    b: Vec<f64>,
    x: Vec<f64>,
    r: Vec<f64>,
    rhat: Vec<f64>,
    p: Vec<f64>,
    v: Vec<f64>,
    s: Vec<f64>,
    t: Vec<f64>,
    phat: Vec<f64>,
    shat: Vec<f64>,
    /// Jacobi 预条件对角
    diag: Vec<f64>,
}

impl PressureSolver {
    /// 创建求解器并预计算预条件对角
    pub fn new(grid: &Grid, config: PressureConfig) -> Self {
        let n = grid.core_count();
        let core = grid.core();
        let mx = grid.metric(0, Stagger::Center);
        let my = grid.metric(1, Stagger::Center);
        let mz = grid.metric(2, Stagger::Center);

        let mut diag = Vec::with_capacity(n);
        for i in core.x0..=core.x1 {
            for j in core.y0..=core.y1 {
                for k in core.z0..=core.z1 {
                    let mut d = -2.0 * mx.grad2[i] * grid.ihx2 - 2.0 * mz.grad2[k] * grid.ihz2;
                    if !grid.planar {
                        d -= 2.0 * my.grad2[j] * grid.ihy2;
                    }
                    diag.push(d);
                }
            }
        }

        Self {
            config,
            n,
            work: Array3::zeros(grid.full_shape()),
            b: vec![0.0; n],
            x: vec![0.0; n],
            r: vec![0.0; n],
            rhat: vec![0.0; n],
            p: vec![0.0; n],
            v: vec![0.0; n],
            s: vec![0.0; n],
            t: vec![0.0; n],
            phat: vec![0.0; n],
            shat: vec![0.0; n],
            diag,
        }
    }

    /// 配置引用
    pub fn config(&self) -> &PressureConfig {
        &self.config
    }

    /// 求解 ∇²pp = rhs
    ///
    /// 解写入 `pp` 的核心单元（零均值），幽灵层已填好。
    /// 不收敛返回 [`PhysicsError::Pressure`]。
    pub fn solve(
        &mut self,
        grid: &Grid,
        transport: &dyn HaloTransport,
        pp: &mut PlainScalar,
        rhs: &PlainScalar,
    ) -> PhysicsResult<SolverResult> {
        let tol = self.config.tolerance;
        let tiny = 1e-300;

        gather(grid, &rhs.data, &mut self.b);
        // 零空间相容性投影
        subtract_mean(&mut self.b);

        // 初值 x = 0，r = b
        self.x.iter_mut().for_each(|v| *v = 0.0);
        self.r.copy_from_slice(&self.b);
        self.rhat.copy_from_slice(&self.r);
        self.p.iter_mut().for_each(|v| *v = 0.0);
        self.v.iter_mut().for_each(|v| *v = 0.0);

        let initial_norm = norm_inf(&self.r);
        if initial_norm <= tol {
            scatter(grid, &self.x, &mut pp.data);
            fill_ghosts(grid, transport, &mut pp.data);
            return Ok(SolverResult {
                status: SolverStatus::Converged,
                iterations: 0,
                residual_norm: initial_norm,
                initial_residual_norm: initial_norm,
            });
        }

        let mut rho = 1.0f64;
        let mut alpha = 1.0f64;
        let mut omega = 1.0f64;
        let mut res_norm = initial_norm;

        for iter in 1..=self.config.max_iter {
            let rho_new = dot(&self.rhat, &self.r);
            if rho_new.abs() < tiny {
                return Err(self.failure(iter, res_norm));
            }

            let beta = (rho_new / rho) * (alpha / omega);
            for i in 0..self.n {
                self.p[i] = self.r[i] + beta * (self.p[i] - omega * self.v[i]);
            }

            for i in 0..self.n {
                self.phat[i] = self.p[i] / self.diag[i];
            }
            apply_operator(grid, transport, &mut self.work, &self.phat, &mut self.v);

            let denom = dot(&self.rhat, &self.v);
            if denom.abs() < tiny {
                return Err(self.failure(iter, res_norm));
            }
            alpha = rho_new / denom;

            for i in 0..self.n {
                self.s[i] = self.r[i] - alpha * self.v[i];
            }

            res_norm = norm_inf(&self.s);
            if res_norm < tol {
                for i in 0..self.n {
                    self.x[i] += alpha * self.phat[i];
                }
                return Ok(self.finish(grid, transport, pp, iter, res_norm, initial_norm));
            }

            for i in 0..self.n {
                self.shat[i] = self.s[i] / self.diag[i];
            }
            apply_operator(grid, transport, &mut self.work, &self.shat, &mut self.t);

            let tt = dot(&self.t, &self.t);
            if tt < tiny {
                return Err(self.failure(iter, res_norm));
            }
            omega = dot(&self.t, &self.s) / tt;
            if omega.abs() < tiny {
                return Err(self.failure(iter, res_norm));
            }

            for i in 0..self.n {
                self.x[i] += alpha * self.phat[i] + omega * self.shat[i];
                self.r[i] = self.s[i] - omega * self.t[i];
            }

            res_norm = norm_inf(&self.r);
            if self.config.verbose {
                log::trace!("BiCGStab iter {}: residual = {:.6e}", iter, res_norm);
            }
            if res_norm < tol {
                return Ok(self.finish(grid, transport, pp, iter, res_norm, initial_norm));
            }

            rho = rho_new;
        }

        Err(self.failure(self.config.max_iter, res_norm))
    }

    fn finish(
        &mut self,
        grid: &Grid,
        transport: &dyn HaloTransport,
        pp: &mut PlainScalar,
        iterations: usize,
        residual_norm: f64,
        initial_residual_norm: f64,
    ) -> SolverResult {
        subtract_mean(&mut self.x);
        scatter(grid, &self.x, &mut pp.data);
        fill_ghosts(grid, transport, &mut pp.data);

        SolverResult {
            status: SolverStatus::Converged,
            iterations,
            residual_norm,
            initial_residual_norm,
        }
    }

    fn failure(&self, iterations: usize, residual: f64) -> PhysicsError {
        PhysicsError::Pressure {
            iterations,
            residual,
            tolerance: self.config.tolerance,
        }
    }
}

// ============================================================
// 测试
// ============================================================
