//! Crack Engine - 关节拉伸与"咔哒"反馈的约束求解器
//!
//! 提供：
//! - 骨骼接口和参考骨骼实现
//! - 关节链注册表（初始化后只读）
//! - 拖拽输入映射、限位分区、多骨骼迭代求解
//! - 带冷却和迟滞重置的咔哒状态机
//! - 空闲回弹
//! - 反馈事件接口

pub mod chain;
pub mod config;
pub mod feedback;
pub mod runtime;
pub mod skeleton;
pub mod solver;

pub use chain::{ChainConfig, ChainId, ChainKind, ChainRegistry, JointChain, LimitProfile};
pub use config::SolverConfig;
pub use feedback::{CrackEvent, EventSink, FeedbackPalette, RecordingSink};
pub use runtime::{ActiveDrag, ChainState, CrackRig, DragInput, Target, TickInput, TickReport};
pub use skeleton::{Axis, Bone, BoneId, BoneManager, SkeletonProvider};
pub use solver::{CrackStateMachine, IterativeAngleSolver, LimitEvaluator, RelaxationController, Zone};

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum CrackError {
    #[error("Chain '{0}' has no bones")]
    EmptyChain(String),

    #[error("Chain '{chain}' has {weights} weights for {bones} bones")]
    WeightMismatch {
        chain: String,
        weights: usize,
        bones: usize,
    },

    #[error("Invalid limits for chain '{chain}': {reason}")]
    InvalidLimits { chain: String, reason: String },

    #[error("Invalid config for chain '{chain}': {reason}")]
    InvalidConfig { chain: String, reason: String },

    #[error("Duplicate chain name: {0}")]
    DuplicateChain(String),

    #[error("Unknown chain: {0}")]
    UnknownChain(String),
}

pub type Result<T> = std::result::Result<T, CrackError>;
