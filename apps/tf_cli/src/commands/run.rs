// apps/tf_cli/src/commands/run.rs

//! run 子命令：装配算例并执行主循环

use anyhow::Context;
use clap::Args;
use std::f64::consts::PI;
use std::path::PathBuf;

use tf_config::{ProblemKind, SolverConfig};
use tf_physics::{
    BcKind, BuoyancyForcing, Face, FaceBcs, Grid, LocalTransport, ProjectionStepper, ScalarField,
    TimeSeriesWriter, VectorField,
};

/// run 参数
#[derive(Args)]
pub struct RunArgs {
    /// 配置文件路径（JSON）
    #[arg(short, long)]
    pub config: PathBuf,
}

/// 执行模拟
pub fn execute(args: RunArgs) -> anyhow::Result<()> {
    let config = SolverConfig::from_json_file(&args.config)
        .with_context(|| format!("加载配置失败: {}", args.config.display()))?;
    config.validate().context("配置校验失败")?;

    // 线程池：0 表示交给 rayon 默认
    if config.numerics.n_threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.numerics.n_threads)
            .build_global()
            .context("构建线程池失败")?;
    }

    let grid = Grid::new(&config.domain);
    let transport = LocalTransport::new();

    tracing::info!(
        "网格 {}×{}×{}（核心），pad = {}，planar = {}",
        grid.nx,
        grid.ny,
        grid.nz,
        grid.pads[0],
        grid.planar
    );

    // 按算例预设装配场
    let (mut v, mut p, mut t) = assemble_fields(&grid, &config);
    v.impose_bcs(&grid, &transport);
    p.impose_bcs(&grid, &transport);
    if let Some(t) = t.as_mut() {
        t.impose_bcs(&grid, &transport);
    }

    let mut stepper = ProjectionStepper::new(&grid, &config, Box::new(transport))?;
    tracing::info!(
        "时间步 {:.3e}，终止时间 {:.3}，Jacobi 上限 {}",
        stepper.dt(),
        config.numerics.max_time,
        stepper.max_iterations()
    );

    let scalar_run = t.is_some();
    let mut tseries = TimeSeriesWriter::create(
        &config.output.time_series_path,
        &grid,
        scalar_run,
        config.physics.kappa,
    )?;

    // 主循环
    let mut next_sample = 0.0;
    let mut steps = 0usize;
    while stepper.time() < config.numerics.max_time {
        let stats = match t.as_mut() {
            Some(t) => stepper.advance_with_scalar(&grid, &mut v, &mut p, t)?,
            None => stepper.advance(&grid, &mut v, &mut p)?,
        };
        steps += 1;

        if stepper.time() >= next_sample {
            let point = tseries.sample(
                &grid,
                &transport,
                stepper.time(),
                &v,
                t.as_ref().map(|t| &**t),
                stats.subgrid_energy,
            )?;
            tracing::info!(
                "步 {}: t = {:.4}, KE = {:.4e}, max|div V| = {:.3e}",
                steps,
                point.time,
                point.kinetic_energy,
                point.max_divergence
            );
            next_sample += config.output.time_series_interval;
        }
    }

    tracing::info!("完成 {} 步，t = {:.4}", steps, stepper.time());
    Ok(())
}

/// 按预设装配速度、压力与可选温度场
fn assemble_fields(
    grid: &Grid,
    config: &SolverConfig,
) -> (VectorField, ScalarField, Option<Box<ScalarField>>) {
    match config.physics.problem {
        ProblemKind::Cavity => {
            let mut v = VectorField::new(grid);
            v.x.bcs = FaceBcs::all_dirichlet(0.0)
                .with(Face::Top, BcKind::Dirichlet { value: 1.0 });
            v.y.bcs = FaceBcs::all_dirichlet(0.0);
            v.z.bcs = FaceBcs::all_dirichlet(0.0);
            let p = ScalarField::new(grid, "P");
            (v, p, None)
        }
        ProblemKind::RayleighBenard => {
            let mut v = VectorField::new(grid)
                .with_forcing(Box::new(BuoyancyForcing::new(config.physics.buoyancy)));
            let side_bcs = FaceBcs::all_periodic()
                .with(Face::Bottom, BcKind::Dirichlet { value: 0.0 })
                .with(Face::Top, BcKind::Dirichlet { value: 0.0 });
            v.x.bcs = side_bcs.clone();
            v.y.bcs = side_bcs.clone();
            v.z.bcs = side_bcs;
            let p = ScalarField::new(grid, "P");

            let mut t = ScalarField::new(grid, "T").with_bcs(
                FaceBcs::all_periodic()
                    .with(Face::Bottom, BcKind::Dirichlet { value: 1.0 })
                    .with(Face::Top, BcKind::Dirichlet { value: 0.0 }),
            );
            seed_conduction_profile(grid, &mut t);
            (v, p, Some(Box::new(t)))
        }
        ProblemKind::Decay => {
            let mut v = VectorField::new(grid);
            v.x.bcs = FaceBcs::all_periodic();
            v.y.bcs = FaceBcs::all_periodic();
            v.z.bcs = FaceBcs::all_periodic();
            seed_taylor_green(grid, &mut v);
            let p = ScalarField::new(grid, "P").with_bcs(FaceBcs::all_periodic());
            (v, p, None)
        }
    }
}

/// 传导温度分布加确定性小扰动，触发对流失稳
fn seed_conduction_profile(grid: &Grid, t: &mut ScalarField) {
    let core = grid.core();
    for i in core.x0..=core.x1 {
        let x = (i as f64 - grid.pads[0] as f64 + 0.5) * grid.d_xi;
        for j in core.y0..=core.y1 {
            for k in core.z0..=core.z1 {
                let z = (k as f64 - grid.pads[2] as f64 + 0.5) * grid.d_zt;
                let perturb = 0.01 * (2.0 * PI * x).sin() * (PI * z).sin();
                t.data[[i, j, k]] = 1.0 - z + perturb;
            }
        }
    }
}

/// Taylor-Green 涡初值
fn seed_taylor_green(grid: &Grid, v: &mut VectorField) {
    let core = grid.core();
    for i in core.x0..=core.x1 {
        let x = (i as f64 - grid.pads[0] as f64 + 0.5) * grid.d_xi;
        for j in core.y0..=core.y1 {
            for k in core.z0..=core.z1 {
                let z = (k as f64 - grid.pads[2] as f64 + 0.5) * grid.d_zt;
                v.x.data[[i, j, k]] = (2.0 * PI * x).sin() * (2.0 * PI * z).cos();
                v.z.data[[i, j, k]] = -(2.0 * PI * x).cos() * (2.0 * PI * z).sin();
            }
        }
    }
}
