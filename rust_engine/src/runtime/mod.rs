//! 每帧调度
//!
//! 交互层每帧给出“当前拖拽的是哪条链、拖到了哪里”，[`CrackRig`] 负责把输入分派给
//! 对应的求解路径，其余链全部回弹。

mod rig;

pub use rig::{ActiveDrag, CrackRig, TickInput, TickReport};
pub use crate::solver::{ChainState, DragInput, Target};
