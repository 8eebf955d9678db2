//! 关节链：静态配置、限位和注册表

pub mod config;
mod limits;
mod registry;

pub use config::{ChainConfig, ChainKind, DriveMode, ScreenAxis, DEFAULT_CHAIN_TABLE};
pub use limits::{DirectionalScale, LimitPreset, LimitProfile};
pub use registry::{ChainId, ChainRegistry, JointChain};
