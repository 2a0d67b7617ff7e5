// crates/tf_config/src/solver_config.rs

//! SolverConfig - 求解器配置（全 f64）
//!
//! 定义求解器的所有配置参数。配置分为五个部分：
//! 计算域（domain）、物理参数（physics）、数值参数（numerics）、
//! 亚格子模型（les）与输出（output）。
//!
//! 所有字段均有默认值，空 JSON `{}` 对应一个可运行的
//! 32³ 方腔算例。

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

// ============================================================
// 顶层配置
// ============================================================

/// 求解器配置（全 f64）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolverConfig {
    /// 计算域配置
    #[serde(default)]
    pub domain: DomainConfig,

    /// 物理参数
    #[serde(default)]
    pub physics: PhysicsConfig,

    /// 数值参数
    #[serde(default)]
    pub numerics: NumericsConfig,

    /// 亚格子模型配置
    #[serde(default)]
    pub les: LesConfig,

    /// 输出配置
    #[serde(default)]
    pub output: OutputConfig,
}

impl SolverConfig {
    /// 从 JSON 文件加载配置
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// 从 JSON 字符串加载配置
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// 校验配置自洽性
    ///
    /// 所有进入求解器构造函数的配置必须先通过此校验。
    /// 失败即终止，不存在部分可用的配置。
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.domain.validate()?;
        self.physics.validate()?;
        self.numerics.validate()?;
        self.les.validate()?;
        Ok(())
    }
}

// ============================================================
// 计算域
// ============================================================

/// 坐标拉伸配置
///
/// 计算坐标 ξ ∈ [0,1] 均匀剖分，物理坐标经拉伸映射得到。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum StretchConfig {
    /// 均匀网格（无拉伸）
    Uniform,
    /// 双侧 tanh 拉伸，向两端壁面加密
    Tanh {
        /// 拉伸强度 β（0 < β，越大壁面越密）
        beta: f64,
    },
}

impl Default for StretchConfig {
    fn default() -> Self {
        Self::Uniform
    }
}

/// 计算域配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
    /// x 方向核心网格数
    #[serde(default = "default_n")]
    pub nx: usize,
    /// y 方向核心网格数（planar 模式下忽略）
    #[serde(default = "default_n")]
    pub ny: usize,
    /// z 方向核心网格数
    #[serde(default = "default_n")]
    pub nz: usize,

    /// x 方向物理长度
    #[serde(default = "default_length")]
    pub lx: f64,
    /// y 方向物理长度
    #[serde(default = "default_length")]
    pub ly: f64,
    /// z 方向物理长度
    #[serde(default = "default_length")]
    pub lz: f64,

    /// 各方向 pad（幽灵层）宽度
    #[serde(default = "default_pad")]
    pub pad: usize,

    /// x 方向周期性
    #[serde(default)]
    pub x_per: bool,
    /// y 方向周期性
    #[serde(default)]
    pub y_per: bool,
    /// z 方向周期性
    #[serde(default)]
    pub z_per: bool,

    /// 2.5D 模式：消去 y 方向（x-z 平面求解）
    #[serde(default)]
    pub planar: bool,

    /// x 方向拉伸
    #[serde(default)]
    pub stretch_x: StretchConfig,
    /// y 方向拉伸
    #[serde(default)]
    pub stretch_y: StretchConfig,
    /// z 方向拉伸
    #[serde(default)]
    pub stretch_z: StretchConfig,
}

fn default_n() -> usize {
    32
}
fn default_length() -> f64 {
    1.0
}
fn default_pad() -> usize {
    1
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            nx: default_n(),
            ny: default_n(),
            nz: default_n(),
            lx: default_length(),
            ly: default_length(),
            lz: default_length(),
            pad: default_pad(),
            x_per: false,
            y_per: false,
            z_per: false,
            planar: false,
            stretch_x: StretchConfig::default(),
            stretch_y: StretchConfig::default(),
            stretch_z: StretchConfig::default(),
        }
    }
}

impl DomainConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.nx < 4 || self.nz < 4 {
            return Err(ConfigError::invalid(
                "domain.nx/nz",
                format!("{}x{}", self.nx, self.nz),
                "核心网格每个方向至少需要 4 个单元",
            ));
        }
        if !self.planar && self.ny < 4 {
            return Err(ConfigError::invalid(
                "domain.ny",
                self.ny,
                "非 planar 模式下 y 方向至少需要 4 个单元",
            ));
        }
        if self.pad < 1 {
            return Err(ConfigError::invalid(
                "domain.pad",
                self.pad,
                "差分模板要求至少 1 层幽灵单元",
            ));
        }
        for (key, l) in [("lx", self.lx), ("ly", self.ly), ("lz", self.lz)] {
            if !(l > 0.0) {
                return Err(ConfigError::invalid(
                    &format!("domain.{}", key),
                    l,
                    "物理长度必须为正",
                ));
            }
        }
        for (key, s) in [
            ("stretch_x", self.stretch_x),
            ("stretch_y", self.stretch_y),
            ("stretch_z", self.stretch_z),
        ] {
            if let StretchConfig::Tanh { beta } = s {
                if !(beta > 0.0) {
                    return Err(ConfigError::invalid(
                        &format!("domain.{}", key),
                        beta,
                        "tanh 拉伸强度必须为正",
                    ));
                }
            }
        }
        Ok(())
    }
}

// ============================================================
// 物理参数
// ============================================================

/// 算例预设
///
/// run 命令据此装配边界条件与强迫项。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemKind {
    /// 顶盖驱动方腔
    #[default]
    Cavity,
    /// Rayleigh-Bénard 热对流（带温度标量）
    RayleighBenard,
    /// 自由衰减（全周期，无强迫）
    Decay,
}

/// 物理参数配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// 算例预设
    #[serde(default)]
    pub problem: ProblemKind,

    /// 动量扩散系数（运动粘性）ν
    #[serde(default = "default_nu")]
    pub nu: f64,

    /// 标量扩散系数 κ
    #[serde(default = "default_kappa")]
    pub kappa: f64,

    /// 浮力系数（Rayleigh-Bénard 无量纲化下的 z 向温度强迫）
    #[serde(default = "default_buoyancy")]
    pub buoyancy: f64,
}

fn default_nu() -> f64 {
    0.01
}
fn default_kappa() -> f64 {
    0.01
}
fn default_buoyancy() -> f64 {
    1.0
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            problem: ProblemKind::default(),
            nu: default_nu(),
            kappa: default_kappa(),
            buoyancy: default_buoyancy(),
        }
    }
}

impl PhysicsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.nu > 0.0) {
            return Err(ConfigError::invalid("physics.nu", self.nu, "粘性必须为正"));
        }
        if !(self.kappa > 0.0) {
            return Err(ConfigError::invalid(
                "physics.kappa",
                self.kappa,
                "扩散系数必须为正",
            ));
        }
        Ok(())
    }
}

// ============================================================
// 数值参数
// ============================================================

/// 数值参数配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericsConfig {
    /// 物理时间步长
    #[serde(default = "default_t_stp")]
    pub t_stp: f64,

    /// 模拟终止时间
    #[serde(default = "default_max_time")]
    pub max_time: f64,

    /// Jacobi 隐式求解收敛容差
    #[serde(default = "default_cn_tolerance")]
    pub cn_tolerance: f64,

    /// Jacobi 迭代上限覆盖值
    ///
    /// `None` 时使用内置启发式 `⌈(ln(Nx·Ny·Nz))³⌉`。
    #[serde(default)]
    pub max_iterations: Option<usize>,

    /// 压力 Poisson 求解容差
    #[serde(default = "default_mg_tolerance")]
    pub mg_tolerance: f64,

    /// 进程内线程数（0 = rayon 默认）
    #[serde(default)]
    pub n_threads: usize,

    /// Poisson 求解器调试开关：RHS 置 1 并跳过压力累加
    #[serde(default)]
    pub test_poisson: bool,
}

fn default_t_stp() -> f64 {
    0.001
}
fn default_max_time() -> f64 {
    1.0
}
fn default_cn_tolerance() -> f64 {
    1e-8
}
fn default_mg_tolerance() -> f64 {
    1e-8
}

impl Default for NumericsConfig {
    fn default() -> Self {
        Self {
            t_stp: default_t_stp(),
            max_time: default_max_time(),
            cn_tolerance: default_cn_tolerance(),
            max_iterations: None,
            mg_tolerance: default_mg_tolerance(),
            n_threads: 0,
            test_poisson: false,
        }
    }
}

impl NumericsConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.t_stp < 0.0 {
            return Err(ConfigError::invalid(
                "numerics.t_stp",
                self.t_stp,
                "时间步长不可为负",
            ));
        }
        if !(self.cn_tolerance > 0.0) {
            return Err(ConfigError::invalid(
                "numerics.cn_tolerance",
                self.cn_tolerance,
                "收敛容差必须为正",
            ));
        }
        if !(self.mg_tolerance > 0.0) {
            return Err(ConfigError::invalid(
                "numerics.mg_tolerance",
                self.mg_tolerance,
                "Poisson 容差必须为正",
            ));
        }
        if let Some(0) = self.max_iterations {
            return Err(ConfigError::invalid(
                "numerics.max_iterations",
                0,
                "迭代上限至少为 1",
            ));
        }
        Ok(())
    }
}

// ============================================================
// 亚格子模型
// ============================================================

/// 亚格子模型开关
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LesModel {
    /// 关闭
    #[default]
    Off,
    /// 仅动量方程
    Momentum,
    /// 动量 + 标量方程
    MomentumScalar,
}

impl LesModel {
    /// 从整数开关解析（0/1/2）
    pub fn from_switch(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Off),
            1 => Some(Self::Momentum),
            2 => Some(Self::MomentumScalar),
            _ => None,
        }
    }

    /// 是否启用
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Off)
    }
}

/// 亚格子模型配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LesConfig {
    /// 模型开关
    #[serde(default)]
    pub model: LesModel,

    /// Smagorinsky 常数 C_s
    #[serde(default = "default_smagorinsky")]
    pub smagorinsky_constant: f64,

    /// 湍流 Prandtl 数（标量涡扩散 κ_t = ν_t / Pr_t）
    #[serde(default = "default_prandtl_t")]
    pub turbulent_prandtl: f64,
}

fn default_smagorinsky() -> f64 {
    0.17
}
fn default_prandtl_t() -> f64 {
    0.9
}

impl Default for LesConfig {
    fn default() -> Self {
        Self {
            model: LesModel::default(),
            smagorinsky_constant: default_smagorinsky(),
            turbulent_prandtl: default_prandtl_t(),
        }
    }
}

impl LesConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.model.is_active() {
            if !(self.smagorinsky_constant > 0.0) {
                return Err(ConfigError::invalid(
                    "les.smagorinsky_constant",
                    self.smagorinsky_constant,
                    "Smagorinsky 常数必须为正",
                ));
            }
            if !(self.turbulent_prandtl > 0.0) {
                return Err(ConfigError::invalid(
                    "les.turbulent_prandtl",
                    self.turbulent_prandtl,
                    "湍流 Prandtl 数必须为正",
                ));
            }
        }
        Ok(())
    }
}

// ============================================================
// 输出
// ============================================================

/// 输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// 时间序列文件路径
    #[serde(default = "default_tseries_path")]
    pub time_series_path: String,

    /// 时间序列写出间隔（物理时间）
    #[serde(default = "default_tseries_interval")]
    pub time_series_interval: f64,
}

fn default_tseries_path() -> String {
    "time_series.dat".to_string()
}
fn default_tseries_interval() -> f64 {
    0.1
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            time_series_path: default_tseries_path(),
            time_series_interval: default_tseries_interval(),
        }
    }
}

// ============================================================
// 测试
// ============================================================
