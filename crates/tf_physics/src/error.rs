// crates/tf_physics/src/error.rs

//! 物理层错误类型
//!
//! 求解器核心的四类错误：配置不自洽、隐式迭代不收敛、
//! 压力 Poisson 求解失败、IO/通信失败。
//!
//! 核心内部不做任何就地恢复：错误一律向上传播，
//! 由调用方（CLI）记录日志并以非零码退出。
//! 宁可大声早失败，也不让发散的模拟静默烧核时。

/// 统一结果类型别名
pub type PhysicsResult<T> = Result<T, PhysicsError>;

/// 物理求解器错误
#[derive(Debug, thiserror::Error)]
pub enum PhysicsError {
    /// 配置不自洽（构造期检出，终止）
    #[error("配置错误: {message}")]
    InvalidConfig {
        /// 说明
        message: String,
    },

    /// Jacobi 隐式迭代超过上限仍未收敛（终止）
    #[error("Jacobi 迭代求解 {field} 未收敛: {iterations} 次迭代后残差 {residual:.3e}，中止")]
    Convergence {
        /// 场名称（Vx/Vy/Vz/T）
        field: String,
        /// 已执行的迭代次数
        iterations: usize,
        /// 最终残差
        residual: f64,
    },

    /// 压力 Poisson 求解失败（合同方错误，向上委托）
    #[error("压力 Poisson 求解失败: {iterations} 次迭代后残差 {residual:.3e} 未达容差 {tolerance:.3e}")]
    Pressure {
        /// 已执行的迭代次数
        iterations: usize,
        /// 最终残差
        residual: f64,
        /// 要求的容差
        tolerance: f64,
    },

    /// IO 失败（诊断输出等；不重试）
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
}

impl PhysicsError {
    /// 创建配置错误
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convergence_error_display() {
        let err = PhysicsError::Convergence {
            field: "Vx".to_string(),
            iterations: 42,
            residual: 1.5e-3,
        };
        let msg = err.to_string();
        assert!(msg.contains("Vx"));
        assert!(msg.contains("42"));
        assert!(msg.contains("未收敛"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: PhysicsError = io_err.into();
        assert!(matches!(err, PhysicsError::Io(_)));
    }
}
