// crates/tf_physics/src/numerics/stencil.rs

//! 差分模板原语
//!
//! 所有导数在计算坐标 (ξ, η, ζ) 中以中心差分求值，
//! 经拉伸度规映射回物理空间。
//!
//! 二阶导数保持拆分形式：
//!
//! ```text
//! ∂²f/∂x² = grad2·(f₊ − 2f + f₋)·ih2 + curv·(f₊ − f₋)·i2h
//! ```
//!
//! 两项分别对应均匀部分与拉伸修正。均匀网格 curv ≡ 0，
//! 退化为标准中心差分，勿将两项合并。

/// 一阶导数：`(f₊ − f₋)·i2h·grad`
#[inline(always)]
pub fn d1(fm: f64, fp: f64, i2h: f64, grad: f64) -> f64 {
    (fp - fm) * i2h * grad
}

/// 二阶导数（拆分度规形式）
#[inline(always)]
pub fn d2(fm: f64, f0: f64, fp: f64, ih2: f64, i2h: f64, grad2: f64, curv: f64) -> f64 {
    grad2 * (fp - 2.0 * f0 + fm) * ih2 + curv * (fp - fm) * i2h
}

/// 邻居和部分：二阶导数去掉中心项 `−2f` 的剩余
///
/// Jacobi 迭代的候选值公式使用此形式。
#[inline(always)]
pub fn d2_neighbor_sum(fm: f64, fp: f64, ih2: f64, i2h: f64, grad2: f64, curv: f64) -> f64 {
    grad2 * (fp + fm) * ih2 + curv * (fp - fm) * i2h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_d1_uniform_linear_exact() {
        // f = 2x，dx = 0.5，grad = 1
        let i2h = 1.0; // 1/(2·0.5)
        let v = d1(0.0, 2.0, i2h, 1.0);
        assert!((v - 2.0).abs() < 1e-15);
    }

    #[test]
    fn test_d2_uniform_quadratic_exact() {
        // f = x²，节点 {0, 0.25, 1.0} 对应 x = {-0.5, 0, 0.5}，h = 0.5
        let ih2 = 4.0;
        let i2h = 1.0;
        let v = d2(0.25, 0.0, 0.25, ih2, i2h, 1.0, 0.0);
        assert!((v - 2.0).abs() < 1e-15);
    }

    #[test]
    fn test_neighbor_sum_relation() {
        // d2 = neighbor_sum − 2·f0·grad2·ih2
        let (fm, f0, fp) = (1.0, 2.5, 4.0);
        let (ih2, i2h, grad2, curv) = (16.0, 2.0, 1.3, 0.2);
        let full = d2(fm, f0, fp, ih2, i2h, grad2, curv);
        let ns = d2_neighbor_sum(fm, fp, ih2, i2h, grad2, curv);
        assert!((full - (ns - 2.0 * f0 * grad2 * ih2)).abs() < 1e-12);
    }
}
