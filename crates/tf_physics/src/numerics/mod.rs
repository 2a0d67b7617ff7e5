// crates/tf_physics/src/numerics/mod.rs

//! 数值核心
//!
//! - [`stencil`]: 度规加权中心差分原语
//! - [`operators`]: 扩散 / 对流 / 散度 / 梯度算子

pub mod operators;
pub mod stencil;

pub use operators::{add_laplacian, divergence, gradient, sub_advection};
