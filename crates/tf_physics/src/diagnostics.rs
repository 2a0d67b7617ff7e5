// crates/tf_physics/src/diagnostics.rs

//! 时间序列诊断
//!
//! 每个采样点输出：时间、总动能、最大散度，标量算例另有
//! 热能与 Nusselt 数；亚格子动能由时间推进统计传入。
//! 诊断只在 `advance` 返回后对场做只读访问。

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::PhysicsResult;
use crate::field::{PlainScalar, ScalarField, VectorField};
use crate::mesh::Grid;
use crate::numerics::divergence;
use crate::transport::HaloTransport;

/// 单个采样点
#[derive(Debug, Clone, Default)]
pub struct SamplePoint {
    /// 模拟时间
    pub time: f64,
    /// 体均动能 ½⟨|V|²⟩
    pub kinetic_energy: f64,
    /// 核心最大散度
    pub max_divergence: f64,
    /// 体均热能 ½⟨T²⟩（标量算例）
    pub thermal_energy: f64,
    /// Nusselt 数（标量算例）
    pub nusselt: f64,
    /// 亚格子动能
    pub subgrid_energy: f64,
}

/// 时间序列写出器
pub struct TimeSeriesWriter {
    writer: BufWriter<File>,
    scalar_run: bool,
    kappa: f64,
    div_scratch: PlainScalar,
}

impl TimeSeriesWriter {
    /// 创建写出器并写表头
    pub fn create(
        path: impl AsRef<Path>,
        grid: &Grid,
        scalar_run: bool,
        kappa: f64,
    ) -> PhysicsResult<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        if scalar_run {
            writeln!(
                writer,
                "# time          kinetic_energy  max_divergence  thermal_energy  nusselt         subgrid_energy"
            )?;
        } else {
            writeln!(
                writer,
                "# time          kinetic_energy  max_divergence  subgrid_energy"
            )?;
        }

        Ok(Self {
            writer,
            scalar_run,
            kappa,
            div_scratch: PlainScalar::new(grid),
        })
    }

    /// 采样并写一行
    pub fn sample(
        &mut self,
        grid: &Grid,
        transport: &dyn HaloTransport,
        time: f64,
        v: &VectorField,
        t: Option<&ScalarField>,
        subgrid_energy: f64,
    ) -> PhysicsResult<SamplePoint> {
        let core = grid.core();
        let n = grid.core_count() as f64;

        let mut ke = 0.0;
        let mut te = 0.0;
        let mut uz_t = 0.0;
        for i in core.x0..=core.x1 {
            for j in core.y0..=core.y1 {
                for k in core.z0..=core.z1 {
                    let vx = v.x.data[[i, j, k]];
                    let vy = v.y.data[[i, j, k]];
                    let vz = v.z.data[[i, j, k]];
                    ke += 0.5 * (vx * vx + vy * vy + vz * vz);
                    if let Some(t) = t {
                        let tv = t.data[[i, j, k]];
                        te += 0.5 * tv * tv;
                        uz_t += vz * tv;
                    }
                }
            }
        }
        ke /= n;
        te /= n;
        uz_t /= n;

        divergence(grid, v, &mut self.div_scratch);
        let max_div = self.div_scratch.max_abs(transport);

        // 无量纲 Nusselt：导热贡献 1 加对流通量贡献
        let nusselt = if t.is_some() { 1.0 + uz_t / self.kappa } else { 0.0 };

        let point = SamplePoint {
            time,
            kinetic_energy: ke,
            max_divergence: max_div,
            thermal_energy: te,
            nusselt,
            subgrid_energy,
        };

        if self.scalar_run {
            writeln!(
                self.writer,
                "{:<15.6e} {:<15.6e} {:<15.6e} {:<15.6e} {:<15.6e} {:<15.6e}",
                point.time,
                point.kinetic_energy,
                point.max_divergence,
                point.thermal_energy,
                point.nusselt,
                point.subgrid_energy
            )?;
        } else {
            writeln!(
                self.writer,
                "{:<15.6e} {:<15.6e} {:<15.6e} {:<15.6e}",
                point.time, point.kinetic_energy, point.max_divergence, point.subgrid_energy
            )?;
        }
        self.writer.flush()?;

        log::debug!(
            "t = {:.4}: KE = {:.4e}, max|div V| = {:.3e}",
            point.time,
            point.kinetic_energy,
            point.max_divergence
        );

        Ok(point)
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

    #[test]
    fn test_sample_uniform_flow() {
        let grid = Grid::new(&DomainConfig {
            nx: 4,
            ny: 4,
            nz: 4,
            x_per: true,
            y_per: true,
            z_per: true,
            ..Default::default()
        });
        let transport = LocalTransport::new();
        let mut v = VectorField::new(&grid);
        v.x.fill(2.0);
        v.sync(&grid, &transport);

        let dir = std::env::temp_dir().join("tf_tseries_test.dat");
        let mut writer = TimeSeriesWriter::create(&dir, &grid, false, 0.01).unwrap();
        let point = writer
            .sample(&grid, &transport, 0.5, &v, None, 0.0)
            .unwrap();

        // KE = ½·2² = 2，均匀流散度为零
        assert!((point.kinetic_energy - 2.0).abs() < 1e-12);
        assert!(point.max_divergence < 1e-12);

        let text = std::fs::read_to_string(&dir).unwrap();
        assert!(text.starts_with("# time"));
        assert!(text.lines().count() >= 2);
        let _ = std::fs::remove_file(&dir);
    }

    #[test]
    fn test_nusselt_of_conduction_state() {
        // 静止流体 Nu = 1
        let grid = Grid::new(&DomainConfig {
            nx: 4,
            ny: 4,
            nz: 4,
            ..Default::default()
        });
        let transport = LocalTransport::new();
        let v = VectorField::new(&grid);
        let mut t = ScalarField::new(&grid, "T");
        t.fill(0.5);

        let dir = std::env::temp_dir().join("tf_tseries_nu_test.dat");
        let mut writer = TimeSeriesWriter::create(&dir, &grid, true, 0.01).unwrap();
        let point = writer
            .sample(&grid, &transport, 0.0, &v, Some(&t), 0.0)
            .unwrap();

        assert!((point.nusselt - 1.0).abs() < 1e-12);
        let _ = std::fs::remove_file(&dir);
    }
}
