// crates/tf_physics/src/timestep/mod.rs

//! 时间推进核心：压力投影步
//!
//! 半隐式 Crank-Nicolson / 显式 Euler 混合格式：
//! 非线性项显式 Euler 推进，扩散项半隐式 Crank-Nicolson 推进。
//!
//! # 算法步骤
//!
//! 1. 清零 RHS 累加器
//! 2. 扩散：`nse_rhs += (ν/2)·∇²V`，标量算例另有 `tmp_rhs += (κ/2)·∇²T`
//! 3. 对流：`nse_rhs −= (V·∇)V`，`tmp_rhs −= (V·∇)T`
//! 4. 强迫：各场的强迫协作者注入贡献
//! 5. 亚格子模型（启用且 t > 5·dt 时）
//! 6. 压力梯度：`nse_rhs −= ∇P`
//! 7. 显式更新：`rhs = 场 + dt·rhs`
//! 8. RHS 幽灵层同步
//! 9. Jacobi 迭代隐式求解各速度分量与标量（原位写回）
//! 10. `mg_rhs = (∇·V)/dt`，压力 Poisson 求解得到 Pp
//! 11. 校正：`P += Pp`，`V −= dt·∇Pp`
//! 12. 施加全部边界条件
//!
//! 扩散系数的 ½ 拆分不可合并：RHS 上只放 Crank-Nicolson 的
//! 显式半步，另一半嵌在 Jacobi 迭代的左端算子里，
//! 改动任何一侧都破坏二阶时间精度。
//!
//! 步末不变量：核心上 `max|∇·V|` 在求解器容差内；
//! 各场满足物理面边界条件；pad 为最新邻居数据。

use ndarray::{parallel::prelude::*, s, Array3, Axis};
use rayon::prelude::*;

use tf_config::{LesModel, SolverConfig};

use crate::error::{PhysicsError, PhysicsResult};
use crate::field::{PlainScalar, PlainVector, ScalarField, VectorField};
use crate::les::{SmagorinskyModel, SubgridModel};
use crate::mesh::{Grid, STAGGER_CELL};
use crate::numerics::operators::{add_laplacian, divergence, gradient, sub_advection};
use crate::numerics::stencil::{d2, d2_neighbor_sum};
use crate::pressure::{PressureConfig, PressureSolver};
use crate::transport::HaloTransport;

// ============================================================
// 统计
// ============================================================

/// 单步统计
#[derive(Debug, Clone, Default)]
pub struct StepStats {
    /// 各隐式求解的 Jacobi 迭代次数（Vx, Vy, Vz, T）
    pub jacobi_iterations: [usize; 4],
    /// 压力求解迭代次数
    pub pressure_iterations: usize,
    /// 压力求解最终残差
    pub pressure_residual: f64,
    /// 亚格子动能（模型未调用时为 0）
    pub subgrid_energy: f64,
    /// 本步是否调用了亚格子模型
    pub les_applied: bool,
}

// ============================================================
// 迭代上限启发式
// ============================================================

/// Jacobi 迭代上限的内置启发式 `⌈(ln(Nx·Ny·Nz))³⌉`
///
/// 以核心单元总数为上限会让发散算例冻结极久、白白烧核时，
/// 故采用此对数上限。该公式是经验值，可经配置覆盖，
/// 但默认公式本身不应改动。
pub fn default_max_iterations(grid: &Grid) -> usize {
    let n = grid.core_count() as f64;
    n.ln().powi(3).ceil() as usize
}

// ============================================================
// 投影推进器
// ============================================================

/// 投影法时间推进器
///
/// 所有临时场均为本对象拥有的成员，生命周期显式、
/// 每实例可重入。`V, P, T` 以可变引用传入，仅在
/// [`ProjectionStepper::advance`] 期间被本核心修改。
pub struct ProjectionStepper {
    dt: f64,
    time: f64,
    nu: f64,
    kappa: f64,
    cn_tolerance: f64,
    max_iterations: usize,
    test_poisson: bool,
    les_model: LesModel,
    les: Option<Box<dyn SubgridModel>>,
    transport: Box<dyn HaloTransport>,
    pressure_solver: PressureSolver,

    // 临时场
    nse_rhs: PlainVector,
    tmp_rhs: PlainScalar,
    pp: PlainScalar,
    mg_rhs: PlainScalar,
    pressure_gradient: PlainVector,
    jacobi_tmp: Array3<f64>,

    stats: StepStats,
}

impl ProjectionStepper {
    /// 创建推进器
    ///
    /// `config` 须已通过 [`SolverConfig::validate`]。
    pub fn new(
        grid: &Grid,
        config: &SolverConfig,
        transport: Box<dyn HaloTransport>,
    ) -> PhysicsResult<Self> {
        config
            .validate()
            .map_err(|e| PhysicsError::invalid_config(e.to_string()))?;

        let max_iterations = config
            .numerics
            .max_iterations
            .unwrap_or_else(|| default_max_iterations(grid));

        let les_model = config.les.model;
        let les: Option<Box<dyn SubgridModel>> = if les_model.is_active() {
            if grid.topology.is_root() {
                log::info!("LES 开关开启，使用 Smagorinsky 亚格子模型");
            }
            Some(Box::new(SmagorinskyModel::new(
                grid,
                config.les.smagorinsky_constant,
                config.les.turbulent_prandtl,
            )))
        } else {
            None
        };

        let pressure_solver = PressureSolver::new(
            grid,
            PressureConfig {
                tolerance: config.numerics.mg_tolerance,
                ..Default::default()
            },
        );

        Ok(Self {
            dt: config.numerics.t_stp,
            time: 0.0,
            nu: config.physics.nu,
            kappa: config.physics.kappa,
            cn_tolerance: config.numerics.cn_tolerance,
            max_iterations,
            test_poisson: config.numerics.test_poisson,
            les_model,
            les,
            transport,
            pressure_solver,
            nse_rhs: PlainVector::new(grid),
            tmp_rhs: PlainScalar::new(grid),
            pp: PlainScalar::new(grid),
            mg_rhs: PlainScalar::new(grid),
            pressure_gradient: PlainVector::new(grid),
            jacobi_tmp: Array3::zeros(grid.full_shape()),
            stats: StepStats::default(),
        })
    }

    /// 当前模拟时间
    pub fn time(&self) -> f64 {
        self.time
    }

    /// 设置模拟时间（续算场景）
    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    /// 时间步长
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Jacobi 迭代上限
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// 幽灵层传输接口
    pub fn transport(&self) -> &dyn HaloTransport {
        &*self.transport
    }

    /// 纯水动力推进：速度与压力
    pub fn advance(
        &mut self,
        grid: &Grid,
        v: &mut VectorField,
        p: &mut ScalarField,
    ) -> PhysicsResult<StepStats> {
        self.advance_inner(grid, v, p, None)
    }

    /// 标量算例推进：速度、压力与温度
    pub fn advance_with_scalar(
        &mut self,
        grid: &Grid,
        v: &mut VectorField,
        p: &mut ScalarField,
        t: &mut ScalarField,
    ) -> PhysicsResult<StepStats> {
        self.advance_inner(grid, v, p, Some(t))
    }

    fn advance_inner(
        &mut self,
        grid: &Grid,
        v: &mut VectorField,
        p: &mut ScalarField,
        mut t: Option<&mut ScalarField>,
    ) -> PhysicsResult<StepStats> {
        let dt = self.dt;
        self.stats = StepStats::default();

        // 1. 清零累加器
        self.nse_rhs.fill(0.0);
        self.tmp_rhs.fill(0.0);

        // 2. 动量扩散项；只放显式半步，另一半在隐式算子里
        add_laplacian(grid, &v.x.data, v.x.stagger, &mut self.nse_rhs.x);
        if !grid.planar {
            add_laplacian(grid, &v.y.data, v.y.stagger, &mut self.nse_rhs.y);
        }
        add_laplacian(grid, &v.z.data, v.z.stagger, &mut self.nse_rhs.z);
        self.nse_rhs.scale(self.nu / 2.0);

        // 标量扩散项
        if let Some(t) = t.as_deref() {
            add_laplacian(grid, &t.data, t.stagger, &mut self.tmp_rhs.data);
            self.tmp_rhs.scale(self.kappa / 2.0);
        }

        // 3. 对流项（中心差分，无迎风）
        sub_advection(grid, &v.x.data, v.x.stagger, v, &mut self.nse_rhs.x);
        if !grid.planar {
            sub_advection(grid, &v.y.data, v.y.stagger, v, &mut self.nse_rhs.y);
        }
        sub_advection(grid, &v.z.data, v.z.stagger, v, &mut self.nse_rhs.z);
        if let Some(t) = t.as_deref() {
            sub_advection(grid, &t.data, t.stagger, v, &mut self.tmp_rhs.data);
        }

        // 4. 强迫项
        v.forcing
            .add_forcing(grid, v, t.as_deref(), &mut self.nse_rhs);
        if let Some(t) = t.as_deref() {
            if let Some(f) = &t.forcing {
                f.add_forcing(grid, t, v, &mut self.tmp_rhs);
            }
        }

        // 5. 亚格子模型；前 5 步抑制，等初始瞬态过去
        if self.les_model.is_active() && self.time > 5.0 * dt {
            if let Some(les) = self.les.as_mut() {
                let ke = match (self.les_model, t.as_deref()) {
                    (LesModel::MomentumScalar, Some(t)) => les.compute_sg_scalar(
                        grid,
                        v,
                        t,
                        &mut self.nse_rhs,
                        &mut self.tmp_rhs,
                    ),
                    // 仅动量闭合下标量按被动标量处理，tmp_rhs 不转发
                    _ => les.compute_sg(grid, v, &mut self.nse_rhs),
                };
                self.stats.subgrid_energy = ke;
                self.stats.les_applied = true;
            }
        }

        // 6. 压力梯度项
        self.pressure_gradient.fill(0.0);
        gradient(grid, &p.data, STAGGER_CELL, &mut self.pressure_gradient);
        self.nse_rhs.sub_plain(&self.pressure_gradient);

        // 7. 显式 Euler 更新到预测值
        self.nse_rhs.scale(dt);
        self.nse_rhs.add_vector(v);
        if let Some(t) = t.as_deref() {
            self.tmp_rhs.scale(dt);
            self.tmp_rhs.add_field(t);
        }

        // 8. RHS 幽灵层同步
        self.nse_rhs.sync(grid, &*self.transport);
        if t.is_some() {
            self.tmp_rhs.sync(grid, &*self.transport);
        }

        // 9. 隐式 Crank-Nicolson 求解（原位写回）
        self.stats.jacobi_iterations[0] = solve_helmholtz(
            grid,
            &*self.transport,
            v.component_mut(0),
            &self.nse_rhs.x,
            &mut self.jacobi_tmp,
            self.nu,
            dt,
            self.cn_tolerance,
            self.max_iterations,
        )?;
        if !grid.planar {
            self.stats.jacobi_iterations[1] = solve_helmholtz(
                grid,
                &*self.transport,
                v.component_mut(1),
                &self.nse_rhs.y,
                &mut self.jacobi_tmp,
                self.nu,
                dt,
                self.cn_tolerance,
                self.max_iterations,
            )?;
        }
        self.stats.jacobi_iterations[2] = solve_helmholtz(
            grid,
            &*self.transport,
            v.component_mut(2),
            &self.nse_rhs.z,
            &mut self.jacobi_tmp,
            self.nu,
            dt,
            self.cn_tolerance,
            self.max_iterations,
        )?;
        if let Some(t) = t.as_deref_mut() {
            self.stats.jacobi_iterations[3] = solve_helmholtz(
                grid,
                &*self.transport,
                t,
                &self.tmp_rhs.data,
                &mut self.jacobi_tmp,
                self.kappa,
                dt,
                self.cn_tolerance,
                self.max_iterations,
            )?;
        }

        // 零步长下投影无意义（mg_rhs 含 1/dt），此时推进即恒等
        if dt == 0.0 {
            return Ok(self.stats.clone());
        }

        // 10. 压力 Poisson 右端：预测速度散度 / dt
        divergence(grid, v, &mut self.mg_rhs);
        self.mg_rhs.scale(1.0 / dt);

        // Poisson 求解器单测通道：右端置 1，单步推进
        if self.test_poisson {
            self.mg_rhs.fill(1.0);
        }

        let result = self.pressure_solver.solve(
            grid,
            &*self.transport,
            &mut self.pp,
            &self.mg_rhs,
        )?;
        self.stats.pressure_iterations = result.iterations;
        self.stats.pressure_residual = result.residual_norm;

        // Poisson 测试通道：清零旧压力，使 P = Pp 可直接检视
        if self.test_poisson {
            p.fill(0.0);
        }

        // 11. 压力校正与速度投影
        p.add_plain(&self.pp);

        gradient(grid, &self.pp.data, STAGGER_CELL, &mut self.pressure_gradient);
        self.pressure_gradient.scale(dt);
        v.sub_plain(&self.pressure_gradient);

        // 12. 边界条件
        v.impose_bcs(grid, &*self.transport);
        p.impose_bcs(grid, &*self.transport);
        if let Some(t) = t.as_deref_mut() {
            t.impose_bcs(grid, &*self.transport);
        }

        self.time += dt;
        Ok(self.stats.clone())
    }
}

// ============================================================
// Jacobi Helmholtz 求解
// ============================================================

/// 点 Jacobi 迭代求解 `φ − (α·dt/2)·∇²φ = rhs`
///
/// 每轮：
/// 1. 核心单元计算候选值（输出写独立缓冲，逐单元可并行）
/// 2. 候选值拷回 φ
/// 3. 施加 φ 的壁面边界条件
/// 4. 残差 `r = φ − (α·dt/2)·∇²φ − rhs` 的全局最大范数
/// 5. 低于容差退出；超过迭代上限报致命收敛失败
pub fn solve_helmholtz(
    grid: &Grid,
    transport: &dyn HaloTransport,
    field: &mut ScalarField,
    rhs: &Array3<f64>,
    tmp: &mut Array3<f64>,
    alpha: f64,
    dt: f64,
    tolerance: f64,
    max_iterations: usize,
) -> PhysicsResult<usize> {
    let core = grid.core();
    let planar = grid.planar;
    let mx = grid.metric(0, field.stagger_along(0));
    let my = grid.metric(1, field.stagger_along(1));
    let mz = grid.metric(2, field.stagger_along(2));
    let half = 0.5 * alpha * dt;

    let mut iterations = 0usize;

    loop {
        // 候选值扫描
        {
            let data = &field.data;
            tmp.axis_iter_mut(Axis(0))
                .into_par_iter()
                .enumerate()
                .for_each(|(i, mut plane)| {
                    if i < core.x0 || i > core.x1 {
                        return;
                    }
                    for j in core.y0..=core.y1 {
                        for k in core.z0..=core.z1 {
                            let mut nsum = d2_neighbor_sum(
                                data[[i - 1, j, k]],
                                data[[i + 1, j, k]],
                                grid.ihx2,
                                grid.i2hx,
                                mx.grad2[i],
                                mx.curv[i],
                            );
                            let mut denom =
                                1.0 + dt * alpha * mx.grad2[i] * grid.ihx2;
                            if !planar {
                                nsum += d2_neighbor_sum(
                                    data[[i, j - 1, k]],
                                    data[[i, j + 1, k]],
                                    grid.ihy2,
                                    grid.i2hy,
                                    my.grad2[j],
                                    my.curv[j],
                                );
                                denom += dt * alpha * my.grad2[j] * grid.ihy2;
                            }
                            nsum += d2_neighbor_sum(
                                data[[i, j, k - 1]],
                                data[[i, j, k + 1]],
                                grid.ihz2,
                                grid.i2hz,
                                mz.grad2[k],
                                mz.curv[k],
                            );
                            denom += dt * alpha * mz.grad2[k] * grid.ihz2;

                            plane[[j, k]] = (nsum * half + rhs[[i, j, k]]) / denom;
                        }
                    }
                });
        }

        // 候选值拷回核心
        field
            .data
            .slice_mut(s![core.x0..=core.x1, core.y0..=core.y1, core.z0..=core.z1])
            .assign(&tmp.slice(s![core.x0..=core.x1, core.y0..=core.y1, core.z0..=core.z1]));

        // 分量壁面条件
        field.impose_bcs(grid, transport);

        // 残差
        let data = &field.data;
        let local_max = (core.x0..=core.x1)
            .into_par_iter()
            .map(|i| {
                let mut plane_max = 0.0f64;
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
                        let r = (data[[i, j, k]] - half * lap - rhs[[i, j, k]]).abs();
                        plane_max = plane_max.max(r);
                    }
                }
                plane_max
            })
            .reduce(|| 0.0f64, f64::max);

        let global_max = transport.max_all(local_max);
        if global_max < tolerance {
            return Ok(iterations);
        }

        iterations += 1;
        if iterations > max_iterations {
            if grid.topology.is_root() {
                log::error!(
                    "Jacobi 迭代求解 {} 不收敛（{} 次后残差 {:.3e}），中止",
                    field.name,
                    iterations,
                    global_max
                );
            }
            return Err(PhysicsError::Convergence {
                field: field.name.clone(),
                iterations,
                residual: global_max,
            });
        }
    }
}

// ============================================================
// 测试
// ============================================================
