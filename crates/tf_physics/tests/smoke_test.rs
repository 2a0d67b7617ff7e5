// crates/tf_physics/tests/smoke_test.rs

//! 快速冒烟测试
//!
//! 验证核心组件能正确装配并完成少量时间步。
//! 这些测试应当在秒级完成，用于 CI 快速反馈。

use tf_config::{DomainConfig, SolverConfig};
use tf_physics::{
    BcKind, BuoyancyForcing, Face, FaceBcs, Grid, LocalTransport, ProjectionStepper, ScalarField,
    VectorField,
};

fn finite(v: &VectorField) -> bool {
    v.x.data.iter().all(|x| x.is_finite())
        && v.y.data.iter().all(|x| x.is_finite())
        && v.z.data.iter().all(|x| x.is_finite())
}

/// 顶盖驱动方腔：全 Dirichlet 壁面，顶盖 Vx = 1
fn cavity_fields(grid: &Grid) -> (VectorField, ScalarField) {
    let mut v = VectorField::new(grid);
    v.x.bcs = FaceBcs::all_dirichlet(0.0).with(Face::Top, BcKind::Dirichlet { value: 1.0 });
    v.y.bcs = FaceBcs::all_dirichlet(0.0);
    v.z.bcs = FaceBcs::all_dirichlet(0.0);
    let p = ScalarField::new(grid, "P");
    (v, p)
}

#[test]
fn test_cavity_runs_and_stays_finite() {
    let mut config = SolverConfig::default();
    config.domain = DomainConfig {
        nx: 8,
        ny: 8,
        nz: 8,
        ..Default::default()
    };
    config.numerics.t_stp = 1e-3;
    config.numerics.mg_tolerance = 1e-7;

    let grid = Grid::new(&config.domain);
    let (mut v, mut p) = cavity_fields(&grid);
    let transport = LocalTransport::new();
    v.impose_bcs(&grid, &transport);

    let mut stepper =
        ProjectionStepper::new(&grid, &config, Box::new(LocalTransport::new())).unwrap();

    for _ in 0..5 {
        let stats = stepper.advance(&grid, &mut v, &mut p).unwrap();
        assert!(stats.pressure_residual.is_finite());
    }

    assert!(finite(&v));
    // 顶盖拖动在核心内部产生了运动
    let core = grid.core();
    let mut interior_max = 0.0f64;
    for i in core.x0..=core.x1 {
        for j in core.y0..=core.y1 {
            interior_max = interior_max.max(v.x.data[[i, j, core.z1]].abs());
        }
    }
    assert!(interior_max > 0.0);
    // 时间被推进
    assert!((stepper.time() - 5e-3).abs() < 1e-12);
}

#[test]
fn test_rayleigh_benard_scalar_run() {
    let mut config = SolverConfig::default();
    config.domain = DomainConfig {
        nx: 8,
        ny: 8,
        nz: 8,
        x_per: true,
        y_per: true,
        ..Default::default()
    };
    config.numerics.t_stp = 1e-3;

    let grid = Grid::new(&config.domain);
    let transport = LocalTransport::new();

    let mut v = VectorField::new(&grid).with_forcing(Box::new(BuoyancyForcing::new(1.0)));
    v.x.bcs = FaceBcs::all_periodic()
        .with(Face::Bottom, BcKind::Dirichlet { value: 0.0 })
        .with(Face::Top, BcKind::Dirichlet { value: 0.0 });
    v.y.bcs = v.x.bcs.clone();
    v.z.bcs = v.x.bcs.clone();

    let mut p = ScalarField::new(&grid, "P");
    // 下热上冷
    let mut t = ScalarField::new(&grid, "T").with_bcs(
        FaceBcs::all_periodic()
            .with(Face::Bottom, BcKind::Dirichlet { value: 1.0 })
            .with(Face::Top, BcKind::Dirichlet { value: 0.0 }),
    );

    // 传导温度分布加水平扰动，触发对流
    let core = grid.core();
    for i in core.x0..=core.x1 {
        let x = (i as f64 - grid.pads[0] as f64 + 0.5) * grid.d_xi;
        for j in core.y0..=core.y1 {
            for k in core.z0..=core.z1 {
                let z = (k as f64 - grid.pads[2] as f64 + 0.5) * grid.d_zt;
                let perturb = 0.01
                    * (2.0 * std::f64::consts::PI * x).sin()
                    * (std::f64::consts::PI * z).sin();
                t.data[[i, j, k]] = 1.0 - z + perturb;
            }
        }
    }
    t.impose_bcs(&grid, &transport);

    let mut stepper =
        ProjectionStepper::new(&grid, &config, Box::new(LocalTransport::new())).unwrap();

    for _ in 0..3 {
        stepper
            .advance_with_scalar(&grid, &mut v, &mut p, &mut t)
            .unwrap();
    }

    assert!(finite(&v));
    assert!(t.data.iter().all(|x| x.is_finite()));
    // 浮力驱动出竖向运动
    assert!(v.z.max_abs(&transport) > 0.0);
}

#[test]
fn test_planar_mode_runs() {
    let mut config = SolverConfig::default();
    config.domain = DomainConfig {
        nx: 8,
        ny: 1,
        nz: 8,
        planar: true,
        x_per: true,
        ..Default::default()
    };
    config.numerics.t_stp = 1e-3;

    let grid = Grid::new(&config.domain);
    assert_eq!(grid.full_shape().1, 1);

    let mut v = VectorField::new(&grid);
    v.x.bcs = FaceBcs::all_periodic()
        .with(Face::Bottom, BcKind::Dirichlet { value: 0.0 })
        .with(Face::Top, BcKind::Dirichlet { value: 0.0 });
    v.z.bcs = v.x.bcs.clone();
    let mut p = ScalarField::new(&grid, "P");

    let mut stepper =
        ProjectionStepper::new(&grid, &config, Box::new(LocalTransport::new())).unwrap();
    for _ in 0..3 {
        let stats = stepper.advance(&grid, &mut v, &mut p).unwrap();
        // planar 下 Vy 不求解
        assert_eq!(stats.jacobi_iterations[1], 0);
    }
    assert!(finite(&v));
}

#[test]
fn test_minimum_core_completes() {
    // 最小 4³ 核心：模板不得越界，步进正常完成
    let mut config = SolverConfig::default();
    config.domain = DomainConfig {
        nx: 4,
        ny: 4,
        nz: 4,
        ..Default::default()
    };
    config.numerics.t_stp = 1e-3;

    let grid = Grid::new(&config.domain);
    let (mut v, mut p) = cavity_fields(&grid);
    let transport = LocalTransport::new();
    v.impose_bcs(&grid, &transport);

    let mut stepper =
        ProjectionStepper::new(&grid, &config, Box::new(LocalTransport::new())).unwrap();
    stepper.advance(&grid, &mut v, &mut p).unwrap();
    assert!(finite(&v));
}
