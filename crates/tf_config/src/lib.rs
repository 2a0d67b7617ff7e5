// crates/tf_config/src/lib.rs

//! ThermoFlow 配置层
//!
//! 定义求解器的全部输入参数，提供 JSON 加载与构造期校验。
//!
//! # 设计原则
//!
//! 1. **全 f64 存储**：配置始终以 f64 保存，便于 JSON 序列化
//! 2. **默认值完备**：每个字段都有 serde 默认值，空配置即可运行
//! 3. **早失败**：所有不一致的配置在 [`SolverConfig::validate`] 中拒绝，
//!    进入求解器的配置保证自洽

pub mod error;
pub mod solver_config;

pub use error::ConfigError;
pub use solver_config::{
    DomainConfig, LesConfig, LesModel, NumericsConfig, OutputConfig, PhysicsConfig, ProblemKind,
    SolverConfig, StretchConfig,
};
