// crates/tf_physics/src/boundary/mod.rs

//! 边界条件施加
//!
//! 物理边界条件写入壁面切片：紧贴核心外侧一层的退化矩形，
//! 位置在场构造时固定，之后不再移动。壁面切片是边界施加的
//! 唯一写入目标。
//!
//! 三类条件：
//! - Dirichlet：向切片直接赋字面值
//! - Neumann：镜像相邻内部层（零法向梯度）
//! - Periodic：空操作，pad 由幽灵层交换负责
//!
//! 施加顺序（见 [`crate::field::ScalarField::impose_bcs`]）：
//! 先 `sync`，再对每个非周期方向施加一对面条件；
//! 顶/底面视为物理边界，无论 z 周期标志如何总是施加。

use ndarray::{Array3, s};
use serde::{Deserialize, Serialize};

use crate::mesh::Grid;

/// 物理面
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    /// x 负侧
    Left,
    /// x 正侧
    Right,
    /// y 负侧
    Front,
    /// y 正侧
    Back,
    /// z 负侧
    Bottom,
    /// z 正侧
    Top,
}

impl Face {
    /// 六个面的固定顺序
    pub const ALL: [Face; 6] = [
        Face::Left,
        Face::Right,
        Face::Front,
        Face::Back,
        Face::Bottom,
        Face::Top,
    ];

    /// 面法向所在轴
    pub fn axis(&self) -> usize {
        match self {
            Face::Left | Face::Right => 0,
            Face::Front | Face::Back => 1,
            Face::Bottom | Face::Top => 2,
        }
    }

    /// 数组索引（与 [`Face::ALL`] 一致）
    pub fn index(&self) -> usize {
        match self {
            Face::Left => 0,
            Face::Right => 1,
            Face::Front => 2,
            Face::Back => 3,
            Face::Bottom => 4,
            Face::Top => 5,
        }
    }

    /// 是否为负侧面
    pub fn is_minus(&self) -> bool {
        matches!(self, Face::Left | Face::Front | Face::Bottom)
    }
}

/// 边界条件类型
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum BcKind {
    /// 字面值赋入壁面切片
    Dirichlet {
        /// 边界值
        value: f64,
    },
    /// 镜像相邻内部层（零法向梯度）
    Neumann,
    /// 周期：由幽灵层交换处理，此处空操作
    Periodic,
}

/// 一个场的六面边界条件表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceBcs {
    faces: [BcKind; 6],
}

impl FaceBcs {
    /// 全 Neumann（压力场默认）
    pub fn all_neumann() -> Self {
        Self {
            faces: [BcKind::Neumann; 6],
        }
    }

    /// 全 Dirichlet 同值
    pub fn all_dirichlet(value: f64) -> Self {
        Self {
            faces: [BcKind::Dirichlet { value }; 6],
        }
    }

    /// 全周期
    pub fn all_periodic() -> Self {
        Self {
            faces: [BcKind::Periodic; 6],
        }
    }

    /// 设置单面条件
    pub fn set(&mut self, face: Face, bc: BcKind) -> &mut Self {
        self.faces[face.index()] = bc;
        self
    }

    /// 构建式设置单面条件
    pub fn with(mut self, face: Face, bc: BcKind) -> Self {
        self.faces[face.index()] = bc;
        self
    }

    /// 读取单面条件
    pub fn get(&self, face: Face) -> BcKind {
        self.faces[face.index()]
    }
}

impl Default for FaceBcs {
    fn default() -> Self {
        Self::all_neumann()
    }
}

/// 壁面切片下标（核心外一层）与相邻内部层下标
///
/// 返回 `(wall, interior)`，均为该面法向轴上的下标。
pub fn wall_indices(grid: &Grid, face: Face) -> (usize, usize) {
    let axis = face.axis();
    let pad = grid.pads[axis];
    let n = match axis {
        0 => grid.nx,
        1 => grid.ny,
        _ => grid.nz,
    };
    if face.is_minus() {
        (pad - 1, pad)
    } else {
        (pad + n, pad + n - 1)
    }
}

/// 在单面施加边界条件
///
/// 切片覆盖该面的整个全盒截面（含棱边），与壁面切片的
/// 退化矩形定义一致。
pub fn apply_face(grid: &Grid, data: &mut Array3<f64>, face: Face, bc: BcKind) {
    // planar 模式下 y 向无物理面
    if face.axis() == 1 && grid.planar {
        return;
    }

    match bc {
        BcKind::Periodic => {}
        BcKind::Dirichlet { value } => {
            let (w, _) = wall_indices(grid, face);
            match face.axis() {
                0 => data.slice_mut(s![w, .., ..]).fill(value),
                1 => data.slice_mut(s![.., w, ..]).fill(value),
                _ => data.slice_mut(s![.., .., w]).fill(value),
            }
        }
        BcKind::Neumann => {
            let (w, int) = wall_indices(grid, face);
            match face.axis() {
                0 => {
                    let src = data.slice(s![int, .., ..]).to_owned();
                    data.slice_mut(s![w, .., ..]).assign(&src);
                }
                1 => {
                    let src = data.slice(s![.., int, ..]).to_owned();
                    data.slice_mut(s![.., w, ..]).assign(&src);
                }
                _ => {
                    let src = data.slice(s![.., .., int]).to_owned();
                    data.slice_mut(s![.., .., w]).assign(&src);
                }
            }
        }
    }
}

/// 按规定顺序施加全部物理面条件
///
/// 调用前 pad 应已完成幽灵层交换。
/// x / y 向仅在非周期时施加；顶/底面总是施加。
pub fn apply_all(grid: &Grid, data: &mut Array3<f64>, bcs: &FaceBcs) {
    if !grid.periodic[0] {
        apply_face(grid, data, Face::Left, bcs.get(Face::Left));
        apply_face(grid, data, Face::Right, bcs.get(Face::Right));
    }
    if !grid.planar && !grid.periodic[1] {
        apply_face(grid, data, Face::Front, bcs.get(Face::Front));
        apply_face(grid, data, Face::Back, bcs.get(Face::Back));
    }
    apply_face(grid, data, Face::Bottom, bcs.get(Face::Bottom));
    apply_face(grid, data, Face::Top, bcs.get(Face::Top));
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;
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
    fn test_wall_indices() {
        let g = grid();
        assert_eq!(wall_indices(&g, Face::Left), (0, 1));
        assert_eq!(wall_indices(&g, Face::Right), (5, 4));
        assert_eq!(wall_indices(&g, Face::Bottom), (0, 1));
        assert_eq!(wall_indices(&g, Face::Top), (5, 4));
    }

    #[test]
    fn test_dirichlet_writes_wall_slice() {
        let g = grid();
        let mut data = Array3::zeros(g.full_shape());
        apply_face(&g, &mut data, Face::Top, BcKind::Dirichlet { value: 1.5 });

        assert_eq!(data[[2, 2, 5]], 1.5);
        assert_eq!(data[[0, 0, 5]], 1.5);
        // 核心不受影响
        assert_eq!(data[[2, 2, 4]], 0.0);
    }

    #[test]
    fn test_neumann_mirrors_interior() {
        let g = grid();
        let mut data = Array3::zeros(g.full_shape());
        data[[1, 2, 3]] = 4.0;
        apply_face(&g, &mut data, Face::Left, BcKind::Neumann);

        assert_eq!(data[[0, 2, 3]], 4.0);
    }

    #[test]
    fn test_periodic_is_noop() {
        let g = grid();
        let mut data = Array3::from_elem(g.full_shape(), 2.0);
        data[[0, 2, 2]] = -1.0;
        apply_face(&g, &mut data, Face::Left, BcKind::Periodic);
        assert_eq!(data[[0, 2, 2]], -1.0);
    }

    #[test]
    fn test_apply_all_respects_periodicity() {
        let mut config = DomainConfig {
            nx: 4,
            ny: 4,
            nz: 4,
            x_per: true,
            ..Default::default()
        };
        config.z_per = false;
        let g = Grid::new(&config);
        let mut data = Array3::zeros(g.full_shape());
        let bcs = FaceBcs::all_dirichlet(9.0);

        apply_all(&g, &mut data, &bcs);

        // x 周期：壁面未写入
        assert_eq!(data[[0, 2, 2]], 0.0);
        // y 非周期：写入
        assert_eq!(data[[2, 0, 2]], 9.0);
        // z 总是写入
        assert_eq!(data[[2, 2, 0]], 9.0);
    }

    #[test]
    fn test_top_bottom_always_applied() {
        let config = DomainConfig {
            nx: 4,
            ny: 4,
            nz: 4,
            x_per: true,
            y_per: true,
            z_per: true,
            ..Default::default()
        };
        let g = Grid::new(&config);
        let mut data = Array3::zeros(g.full_shape());
        let bcs = FaceBcs::all_periodic()
            .with(Face::Bottom, BcKind::Dirichlet { value: 1.0 })
            .with(Face::Top, BcKind::Dirichlet { value: -1.0 });

        apply_all(&g, &mut data, &bcs);

        // z 周期标志不妨碍顶/底施加
        assert_eq!(data[[2, 2, 0]], 1.0);
        assert_eq!(data[[2, 2, 5]], -1.0);
    }

    #[test]
    fn test_planar_skips_y_faces() {
        let config = DomainConfig {
            nx: 4,
            ny: 1,
            nz: 4,
            planar: true,
            ..Default::default()
        };
        let g = Grid::new(&config);
        let mut data = Array3::zeros(g.full_shape());
        // y 向施加不应越界或写入
        apply_face(&g, &mut data, Face::Front, BcKind::Dirichlet { value: 1.0 });
        assert!(data.iter().all(|&v| v == 0.0));
    }
}
