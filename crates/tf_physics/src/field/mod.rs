// crates/tf_physics/src/field/mod.rs

//! 场代数层
//!
//! - [`scalar`]: 带边界条件钩子的标量场
//! - [`vector`]: MAC 交错矢量场
//! - [`plain`]: 裸 RHS 累加器

pub mod plain;
pub mod scalar;
pub mod vector;

pub use plain::{PlainScalar, PlainVector};
pub use scalar::ScalarField;
pub use vector::VectorField;
