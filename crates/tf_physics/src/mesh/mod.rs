// crates/tf_physics/src/mesh/mod.rs

//! 网格模块
//!
//! - [`grid`]: 子域网格与度规
//! - [`stretch`]: 坐标拉伸映射
//! - [`topology`]: 进程笛卡尔拓扑

pub mod grid;
pub mod stretch;
pub mod topology;

pub use grid::{CoreBox, Grid};
pub use stretch::{
    AxisMetric, Stagger, StaggerSet, StretchKind, STAGGER_CELL, STAGGER_FACE_X, STAGGER_FACE_Y,
    STAGGER_FACE_Z,
};
pub use topology::{CartesianTopology, Side};
