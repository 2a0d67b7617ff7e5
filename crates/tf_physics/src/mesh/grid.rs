// crates/tf_physics/src/mesh/grid.rs

//! 子域网格
//!
//! 描述一个进程所持有的矩形子域：核心（core）索引盒、
//! 幽灵层（pad）、全盒（full），以及拉伸坐标的度规数组。
//!
//! # 不变量
//!
//! - core 严格位于 full 内部（pad ≥ 1），
//!   所有差分模板只访问 full 盒内的下标；
//! - 度规数组与场数组同长，同一下标直接对应；
//! - planar 模式下 y 方向退化为单层（ny = 1，pad_y = 0），
//!   所有 y 向差分在运行期被跳过。

use tf_config::{DomainConfig, StretchConfig};

use super::stretch::{AxisMetric, Stagger, StretchKind};
use super::topology::CartesianTopology;

/// 核心索引盒（闭区间）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoreBox {
    /// x 起始（含）
    pub x0: usize,
    /// x 结束（含）
    pub x1: usize,
    /// y 起始（含）
    pub y0: usize,
    /// y 结束（含）
    pub y1: usize,
    /// z 起始（含）
    pub z0: usize,
    /// z 结束（含）
    pub z1: usize,
}

impl CoreBox {
    /// 核心单元总数
    pub fn count(&self) -> usize {
        (self.x1 - self.x0 + 1) * (self.y1 - self.y0 + 1) * (self.z1 - self.z0 + 1)
    }

    /// 下标是否位于核心内
    pub fn contains(&self, i: usize, j: usize, k: usize) -> bool {
        i >= self.x0 && i <= self.x1 && j >= self.y0 && j <= self.y1 && k >= self.z0 && k <= self.z1
    }
}

/// 单方向的中心/面心度规对
#[derive(Debug, Clone)]
struct AxisPair {
    center: AxisMetric,
    face: AxisMetric,
}

/// 子域网格
#[derive(Debug, Clone)]
pub struct Grid {
    /// 核心单元数
    pub nx: usize,
    /// 核心单元数（planar 模式下为 1）
    pub ny: usize,
    /// 核心单元数
    pub nz: usize,

    /// 各方向幽灵层宽度（planar 模式下 y 为 0）
    pub pads: [usize; 3],

    /// 各方向周期性
    pub periodic: [bool; 3],

    /// 2.5D 模式
    pub planar: bool,

    /// 物理长度
    pub lengths: [f64; 3],

    /// 计算坐标均匀间距
    pub d_xi: f64,
    /// 计算坐标均匀间距（y）
    pub d_et: f64,
    /// 计算坐标均匀间距（z）
    pub d_zt: f64,

    /// 1/(2·dξ)
    pub i2hx: f64,
    /// 1/(2·dη)
    pub i2hy: f64,
    /// 1/(2·dζ)
    pub i2hz: f64,
    /// 1/dξ²
    pub ihx2: f64,
    /// 1/dη²
    pub ihy2: f64,
    /// 1/dζ²
    pub ihz2: f64,

    /// 进程拓扑
    pub topology: CartesianTopology,

    metrics: [AxisPair; 3],
}

fn to_kind(c: StretchConfig) -> StretchKind {
    match c {
        StretchConfig::Uniform => StretchKind::Uniform,
        StretchConfig::Tanh { beta } => StretchKind::Tanh { beta },
    }
}

impl Grid {
    /// 从已校验的配置构建单进程网格
    pub fn new(config: &DomainConfig) -> Self {
        let planar = config.planar;
        let ny = if planar { 1 } else { config.ny };
        let pad_y = if planar { 0 } else { config.pad };
        let pads = [config.pad, pad_y, config.pad];
        let periodic = [config.x_per, config.y_per, config.z_per];

        let d_xi = 1.0 / config.nx as f64;
        let d_et = if planar { 1.0 } else { 1.0 / ny as f64 };
        let d_zt = 1.0 / config.nz as f64;

        let kx = to_kind(config.stretch_x);
        let ky = to_kind(config.stretch_y);
        let kz = to_kind(config.stretch_z);

        let metric_x = AxisPair {
            center: AxisMetric::sample(kx, config.lx, config.nx, pads[0], Stagger::Center),
            face: AxisMetric::sample(kx, config.lx, config.nx, pads[0], Stagger::Face),
        };
        let metric_y = if planar {
            AxisPair {
                center: AxisMetric::trivial(1),
                face: AxisMetric::trivial(1),
            }
        } else {
            AxisPair {
                center: AxisMetric::sample(ky, config.ly, ny, pads[1], Stagger::Center),
                face: AxisMetric::sample(ky, config.ly, ny, pads[1], Stagger::Face),
            }
        };
        let metric_z = AxisPair {
            center: AxisMetric::sample(kz, config.lz, config.nz, pads[2], Stagger::Center),
            face: AxisMetric::sample(kz, config.lz, config.nz, pads[2], Stagger::Face),
        };

        Self {
            nx: config.nx,
            ny,
            nz: config.nz,
            pads,
            periodic,
            planar,
            lengths: [config.lx, config.ly, config.lz],
            d_xi,
            d_et,
            d_zt,
            i2hx: 0.5 / d_xi,
            i2hy: if planar { 0.0 } else { 0.5 / d_et },
            i2hz: 0.5 / d_zt,
            ihx2: 1.0 / (d_xi * d_xi),
            ihy2: if planar { 0.0 } else { 1.0 / (d_et * d_et) },
            ihz2: 1.0 / (d_zt * d_zt),
            topology: CartesianTopology::single_rank(periodic),
            metrics: [metric_x, metric_y, metric_z],
        }
    }

    /// 全盒形状（含 pad）
    pub fn full_shape(&self) -> (usize, usize, usize) {
        (
            self.nx + 2 * self.pads[0],
            self.ny + 2 * self.pads[1],
            self.nz + 2 * self.pads[2],
        )
    }

    /// 核心索引盒
    pub fn core(&self) -> CoreBox {
        CoreBox {
            x0: self.pads[0],
            x1: self.pads[0] + self.nx - 1,
            y0: self.pads[1],
            y1: self.pads[1] + self.ny - 1,
            z0: self.pads[2],
            z1: self.pads[2] + self.nz - 1,
        }
    }

    /// 核心单元总数
    pub fn core_count(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// 给定方向与交错位置的度规数组
    pub fn metric(&self, axis: usize, stagger: Stagger) -> &AxisMetric {
        match stagger {
            Stagger::Center => &self.metrics[axis].center,
            Stagger::Face => &self.metrics[axis].face,
        }
    }

    /// 计算坐标间距（按方向）
    pub fn d_axis(&self, axis: usize) -> f64 {
        match axis {
            0 => self.d_xi,
            1 => self.d_et,
            _ => self.d_zt,
        }
    }

    /// 局部网格体积尺度 Δ = (dx·dy·dz)^(1/3)
    ///
    /// planar 模式下取 (dx·dz)^(1/2)。
    pub fn filter_width(&self, i: usize, j: usize, k: usize) -> f64 {
        let dx = self.metrics[0].center.local_spacing(i, self.d_xi);
        let dz = self.metrics[2].center.local_spacing(k, self.d_zt);
        if self.planar {
            (dx * dz).sqrt()
        } else {
            let dy = self.metrics[1].center.local_spacing(j, self.d_et);
            (dx * dy * dz).cbrt()
        }
    }
}

// ============================================================
// 测试
// ============================================================
