// apps/tf_cli/src/commands/info.rs

//! info 子命令：打印配置的派生量

use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

use tf_config::SolverConfig;
use tf_physics::{default_max_iterations, Grid, Stagger};

/// info 参数
#[derive(Args)]
pub struct InfoArgs {
    /// 配置文件路径（JSON）
    #[arg(short, long)]
    pub config: PathBuf,
}

/// 打印派生信息
pub fn execute(args: InfoArgs) -> anyhow::Result<()> {
    let config = SolverConfig::from_json_file(&args.config)
        .with_context(|| format!("加载配置失败: {}", args.config.display()))?;
    config.validate().context("配置校验失败")?;

    let grid = Grid::new(&config.domain);
    let (fx, fy, fz) = grid.full_shape();

    println!("计算域:");
    println!("  核心: {}×{}×{}", grid.nx, grid.ny, grid.nz);
    println!("  全盒: {}×{}×{}（pad = {}）", fx, fy, fz, grid.pads[0]);
    println!(
        "  周期性: x = {}, y = {}, z = {}",
        grid.periodic[0], grid.periodic[1], grid.periodic[2]
    );
    println!("  planar: {}", grid.planar);

    println!("数值参数:");
    println!("  dt = {:.3e}", config.numerics.t_stp);
    println!("  cn_tolerance = {:.1e}", config.numerics.cn_tolerance);
    let cap = config
        .numerics
        .max_iterations
        .unwrap_or_else(|| default_max_iterations(&grid));
    println!("  Jacobi 迭代上限 = {}", cap);

    // 度规范围，供检查拉伸配置
    for (name, axis) in [("x", 0usize), ("y", 1usize), ("z", 2usize)] {
        if axis == 1 && grid.planar {
            continue;
        }
        let m = grid.metric(axis, Stagger::Center);
        let core = grid.core();
        let (lo, hi) = match axis {
            0 => (core.x0, core.x1),
            1 => (core.y0, core.y1),
            _ => (core.z0, core.z1),
        };
        let mut min_dx = f64::MAX;
        let mut max_dx = f64::MIN;
        for idx in lo..=hi {
            let dx = m.local_spacing(idx, grid.d_axis(axis));
            min_dx = min_dx.min(dx);
            max_dx = max_dx.max(dx);
        }
        println!("  {} 向网格间距: [{:.4e}, {:.4e}]", name, min_dx, max_dx);
    }

    Ok(())
}
