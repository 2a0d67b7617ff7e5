// apps/tf_cli/src/commands/validate.rs

//! validate 子命令：解析并校验配置

use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

use tf_config::SolverConfig;

/// validate 参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 配置文件路径（JSON）
    #[arg(short, long)]
    pub config: PathBuf,
}

/// 校验配置
pub fn execute(args: ValidateArgs) -> anyhow::Result<()> {
    let config = SolverConfig::from_json_file(&args.config)
        .with_context(|| format!("加载配置失败: {}", args.config.display()))?;

    config.validate().context("配置校验失败")?;

    tracing::info!("配置有效: {}", args.config.display());
    tracing::info!(
        "  计算域 {}×{}×{}，问题预设 {:?}",
        config.domain.nx,
        config.domain.ny,
        config.domain.nz,
        config.physics.problem
    );
    Ok(())
}
