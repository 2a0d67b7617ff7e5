// crates/tf_physics/src/mesh/topology.rs

//! 进程笛卡尔拓扑
//!
//! 描述 SPMD 分解下的进程网格：每个进程持有一个矩形子域，
//! 通过各方向的邻居秩交换幽灵层。全周期时拓扑为笛卡尔环面。
//!
//! 单进程运行对应 1×1×1 拓扑，周期方向的邻居是自身（环面回绕）。

/// 面方向（负侧 / 正侧）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// 坐标减小方向
    Minus,
    /// 坐标增大方向
    Plus,
}

/// 进程笛卡尔拓扑
#[derive(Debug, Clone)]
pub struct CartesianTopology {
    /// 进程网格维度
    pub dims: [usize; 3],
    /// 本进程坐标
    pub coords: [usize; 3],
    /// 各方向周期性
    pub periodic: [bool; 3],
}

impl CartesianTopology {
    /// 创建拓扑
    pub fn new(dims: [usize; 3], coords: [usize; 3], periodic: [bool; 3]) -> Self {
        debug_assert!(dims.iter().all(|&d| d >= 1));
        debug_assert!(coords.iter().zip(&dims).all(|(&c, &d)| c < d));
        Self {
            dims,
            coords,
            periodic,
        }
    }

    /// 单进程拓扑
    pub fn single_rank(periodic: [bool; 3]) -> Self {
        Self::new([1, 1, 1], [0, 0, 0], periodic)
    }

    /// 坐标到秩的线性映射（x 最快变化）
    pub fn rank_of(&self, coords: [usize; 3]) -> usize {
        coords[0] + self.dims[0] * (coords[1] + self.dims[1] * coords[2])
    }

    /// 本进程秩
    pub fn rank(&self) -> usize {
        self.rank_of(self.coords)
    }

    /// 进程总数
    pub fn size(&self) -> usize {
        self.dims.iter().product()
    }

    /// 是否为 0 号进程（日志与报错从此进程发出）
    pub fn is_root(&self) -> bool {
        self.rank() == 0
    }

    /// 给定方向的邻居秩
    ///
    /// 周期方向按环面回绕；非周期方向在物理边界处返回 `None`。
    pub fn neighbor(&self, axis: usize, side: Side) -> Option<usize> {
        let d = self.dims[axis];
        let c = self.coords[axis];

        let nc = match side {
            Side::Minus => {
                if c == 0 {
                    if self.periodic[axis] {
                        d - 1
                    } else {
                        return None;
                    }
                } else {
                    c - 1
                }
            }
            Side::Plus => {
                if c + 1 >= d {
                    if self.periodic[axis] {
                        0
                    } else {
                        return None;
                    }
                } else {
                    c + 1
                }
            }
        };

        let mut coords = self.coords;
        coords[axis] = nc;
        Some(self.rank_of(coords))
    }

    /// 本进程在该方向是否拥有物理边界面
    ///
    /// 周期方向没有物理边界；非周期方向仅两端进程拥有。
    pub fn has_physical_face(&self, axis: usize, side: Side) -> bool {
        if self.periodic[axis] {
            return false;
        }
        match side {
            Side::Minus => self.coords[axis] == 0,
            Side::Plus => self.coords[axis] + 1 == self.dims[axis],
        }
    }
}

// ============================================================
// 测试
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_rank_periodic_wraps_to_self() {
        let topo = CartesianTopology::single_rank([true, false, true]);
        assert_eq!(topo.neighbor(0, Side::Minus), Some(0));
        assert_eq!(topo.neighbor(0, Side::Plus), Some(0));
        assert_eq!(topo.neighbor(1, Side::Minus), None);
        assert_eq!(topo.neighbor(2, Side::Plus), Some(0));
    }

    #[test]
    fn test_torus_wrap() {
        // 4×2×1 进程网格，全周期
        let topo = CartesianTopology::new([4, 2, 1], [0, 0, 0], [true, true, true]);
        // x 负方向从 0 回绕到 3
        assert_eq!(topo.neighbor(0, Side::Minus), Some(3));
        assert_eq!(topo.neighbor(0, Side::Plus), Some(1));
        // y 负方向从 0 回绕到 1 行
        assert_eq!(topo.neighbor(1, Side::Minus), Some(4));
        // z 维度为 1，回绕到自身
        assert_eq!(topo.neighbor(2, Side::Plus), Some(0));
    }

    #[test]
    fn test_non_periodic_edges() {
        let topo = CartesianTopology::new([3, 1, 1], [2, 0, 0], [false, false, false]);
        assert_eq!(topo.neighbor(0, Side::Plus), None);
        assert_eq!(topo.neighbor(0, Side::Minus), Some(1));
        assert!(topo.has_physical_face(0, Side::Plus));
        assert!(!topo.has_physical_face(0, Side::Minus));
    }

    #[test]
    fn test_rank_linearization() {
        let topo = CartesianTopology::new([2, 3, 4], [1, 2, 3], [false; 3]);
        assert_eq!(topo.rank(), 1 + 2 * (2 + 3 * 3));
        assert_eq!(topo.size(), 24);
    }

    #[test]
    fn test_periodic_has_no_physical_face() {
        let topo = CartesianTopology::single_rank([true, true, true]);
        for axis in 0..3 {
            assert!(!topo.has_physical_face(axis, Side::Minus));
            assert!(!topo.has_physical_face(axis, Side::Plus));
        }
    }
}
