// crates/tf_physics/src/field/plain.rs

//! 裸场：RHS 累加器
//!
//! 不带壁面切片与边界条件钩子的场变体，专用于时间推进中的
//! 右端项累加。算术以具名方法给出，`mult_add` 提供融合更新，
//! 避免每个子表达式构造临时数组。

use ndarray::Array3;

use super::scalar::ScalarField;
use super::vector::VectorField;
use crate::mesh::Grid;
use crate::transport::HaloTransport;

/// 裸标量场
#[derive(Debug, Clone)]
pub struct PlainScalar {
    /// 数据数组（全盒）
    pub data: Array3<f64>,
}

impl PlainScalar {
    /// 创建全零裸标量场
    pub fn new(grid: &Grid) -> Self {
        Self {
            data: Array3::zeros(grid.full_shape()),
        }
    }

    /// 全场置常数
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// 全场乘常数
    pub fn scale(&mut self, k: f64) {
        self.data.mapv_inplace(|v| v * k);
    }

    /// 全场加常数
    pub fn add_scalar(&mut self, value: f64) {
        self.data.mapv_inplace(|v| v + value);
    }

    /// `self += a`
    pub fn add_plain(&mut self, a: &PlainScalar) {
        self.data += &a.data;
    }

    /// `self += f`（带边界场）
    pub fn add_field(&mut self, f: &ScalarField) {
        self.data += &f.data;
    }

    /// 融合更新 `self += k·a`
    pub fn mult_add(&mut self, a: &PlainScalar, k: f64) {
        self.data.scaled_add(k, &a.data);
    }

    /// 幽灵层交换
    pub fn sync(&mut self, grid: &Grid, transport: &dyn HaloTransport) {
        transport.sync(grid, &mut self.data);
    }

    /// 全局最大绝对值
    pub fn max_abs(&self, transport: &dyn HaloTransport) -> f64 {
        transport.max_all(local_max_abs(&self.data))
    }
}

/// 裸矢量场
#[derive(Debug, Clone)]
pub struct PlainVector {
    /// x 分量
    pub x: Array3<f64>,
    /// y 分量
    pub y: Array3<f64>,
    /// z 分量
    pub z: Array3<f64>,
}

impl PlainVector {
    /// 创建全零裸矢量场
    pub fn new(grid: &Grid) -> Self {
        let shape = grid.full_shape();
        Self {
            x: Array3::zeros(shape),
            y: Array3::zeros(shape),
            z: Array3::zeros(shape),
        }
    }

    /// 按轴访问分量
    pub fn component(&self, axis: usize) -> &Array3<f64> {
        match axis {
            0 => &self.x,
            1 => &self.y,
            _ => &self.z,
        }
    }

    /// 按轴可变访问分量
    pub fn component_mut(&mut self, axis: usize) -> &mut Array3<f64> {
        match axis {
            0 => &mut self.x,
            1 => &mut self.y,
            _ => &mut self.z,
        }
    }

    /// 全场置常数
    pub fn fill(&mut self, value: f64) {
        self.x.fill(value);
        self.y.fill(value);
        self.z.fill(value);
    }

    /// 全场乘常数
    pub fn scale(&mut self, k: f64) {
        self.x.mapv_inplace(|v| v * k);
        self.y.mapv_inplace(|v| v * k);
        self.z.mapv_inplace(|v| v * k);
    }

    /// `self += a`
    pub fn add_plain(&mut self, a: &PlainVector) {
        self.x += &a.x;
        self.y += &a.y;
        self.z += &a.z;
    }

    /// `self -= a`
    pub fn sub_plain(&mut self, a: &PlainVector) {
        self.x -= &a.x;
        self.y -= &a.y;
        self.z -= &a.z;
    }

    /// `self += v`（带边界场）
    pub fn add_vector(&mut self, v: &VectorField) {
        self.x += &v.x.data;
        self.y += &v.y.data;
        self.z += &v.z.data;
    }

    /// 融合更新 `self += k·a`
    pub fn mult_add(&mut self, a: &PlainVector, k: f64) {
        self.x.scaled_add(k, &a.x);
        self.y.scaled_add(k, &a.y);
        self.z.scaled_add(k, &a.z);
    }

    /// 三个分量依次做幽灵层交换
    pub fn sync(&mut self, grid: &Grid, transport: &dyn HaloTransport) {
        transport.sync(grid, &mut self.x);
        transport.sync(grid, &mut self.y);
        transport.sync(grid, &mut self.z);
    }
}

/// 数组的本地最大绝对值
pub(crate) fn local_max_abs(data: &Array3<f64>) -> f64 {
    use rayon::prelude::*;
    match data.as_slice() {
        Some(s) => s
            .par_iter()
            .fold(|| 0.0f64, |m, &v| m.max(v.abs()))
            .reduce(|| 0.0f64, f64::max),
        None => data.iter().fold(0.0f64, |m, &v| m.max(v.abs())),
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::LocalTransport;
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
    fn test_new_is_zero() {
        let g = grid();
        let p = PlainScalar::new(&g);
        assert!(p.data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_mult_add_fused() {
        let g = grid();
        let mut a = PlainScalar::new(&g);
        let mut b = PlainScalar::new(&g);
        a.fill(1.0);
        b.fill(2.0);

        a.mult_add(&b, 0.5);
        assert!(a.data.iter().all(|&v| (v - 2.0).abs() < 1e-15));
    }

    #[test]
    fn test_scale_and_add() {
        let g = grid();
        let mut a = PlainVector::new(&g);
        let mut b = PlainVector::new(&g);
        a.fill(3.0);
        b.fill(1.0);

        a.scale(2.0);
        a.sub_plain(&b);
        assert!(a.x.iter().all(|&v| (v - 5.0).abs() < 1e-15));
        assert!(a.z.iter().all(|&v| (v - 5.0).abs() < 1e-15));
    }

    #[test]
    fn test_max_abs_scaling_law() {
        // max|c·f| = |c|·max|f|
        let g = grid();
        let transport = LocalTransport::new();
        let mut f = PlainScalar::new(&g);
        f.data[[2, 3, 1]] = -4.0;
        f.data[[1, 1, 1]] = 3.0;

        let m = f.max_abs(&transport);
        assert!((m - 4.0).abs() < 1e-15);

        f.scale(-2.5);
        let m2 = f.max_abs(&transport);
        assert!((m2 - 2.5 * 4.0).abs() < 1e-15);
    }
}
