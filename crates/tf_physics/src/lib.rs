// crates/tf_physics/src/lib.rs

//! ThermoFlow 物理求解器
//!
//! 交错结构网格上的不可压缩 Navier-Stokes 求解器，
//! 可选温度标量输运（Rayleigh-Bénard 型算例）。
//!
//! 核心是压力投影时间推进：非线性项显式 Euler，扩散项半隐式
//! Crank-Nicolson（Jacobi 点迭代），压力校正经 Poisson 求解后
//! 将速度投影回无散空间。
//!
//! # 模块概览
//!
//! - [`mesh`]: 子域网格、拉伸度规、进程拓扑
//! - [`transport`]: 幽灵层交换与全局归约
//! - [`field`]: 标量场 / 矢量场 / 裸 RHS 累加器
//! - [`boundary`]: 壁面切片上的边界条件施加
//! - [`numerics`]: 度规加权差分模板与场算子
//! - [`pressure`]: 压力 Poisson 求解器（合同方）
//! - [`les`]: 亚格子尺度模型（合同方）
//! - [`forcing`]: 强迫项协作者
//! - [`timestep`]: 投影法时间推进核心
//! - [`diagnostics`]: 时间序列诊断
//!
//! # 并发模型
//!
//! 进程内 Jacobi 扫描与模板核按外层网格下标用 rayon 并行，
//! 扫描的输出数组与输入数组分离，无跨线程共享可变状态。
//! 只有集体操作阻塞：幽灵层交换、全局最大值归约、压力求解。

#![warn(missing_docs)]

pub mod boundary;
pub mod diagnostics;
pub mod error;
pub mod field;
pub mod forcing;
pub mod les;
pub mod mesh;
pub mod numerics;
pub mod pressure;
pub mod timestep;
pub mod transport;

pub use boundary::{BcKind, Face, FaceBcs};
pub use diagnostics::{SamplePoint, TimeSeriesWriter};
pub use error::{PhysicsError, PhysicsResult};
pub use field::{PlainScalar, PlainVector, ScalarField, VectorField};
pub use forcing::{BuoyancyForcing, ConstantForcing, Forcing, ScalarForcing, ZeroForcing};
pub use les::{SmagorinskyModel, SubgridModel};
pub use mesh::{CartesianTopology, CoreBox, Grid, Side, Stagger};
pub use pressure::{PressureConfig, PressureSolver, SolverResult, SolverStatus};
pub use timestep::{default_max_iterations, ProjectionStepper, StepStats};
pub use transport::{HaloTransport, LocalTransport};
