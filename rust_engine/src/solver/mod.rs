//! 求解层
//!
//! - 单骨骼链：驱动值 → [`LimitEvaluator`] 分区
//! - 多骨骼链：目标点 → [`IterativeAngleSolver`]
//! - 两条路径共用 [`CrackStateMachine`] 和 [`RelaxationController`]

mod crack;
mod input;
mod iterative;
mod limit;
mod relax;
mod state;

pub use crack::{CrackState, CrackStateMachine, JitterPulse};
pub use input::{DragAccumulator, DragInput, Drive, InputMapper};
pub use iterative::{in_rearm_band, IterativeAngleSolver};
pub use limit::{LimitEvaluator, Zone, ZoneResult};
pub use relax::RelaxationController;
pub use state::{ChainState, Target};

use crate::chain::ChainId;
use crate::skeleton::BoneId;

/// 单根骨骼的求解结果
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoneSolveResult {
    pub bone: BoneId,
    /// 未裁剪的意图角度
    pub intent_angle: f32,
    /// 实际写回的角度
    pub realized_angle: f32,
}

/// 一条链一帧的求解结果
#[derive(Clone, Debug, PartialEq)]
pub struct ChainSolveReport {
    pub chain: ChainId,
    pub zone: Zone,
    pub bones: Vec<BoneSolveResult>,
    /// 本帧是否发出了咔哒
    pub fired: bool,
}
