//! 拖拽输入到驱动值的映射

use glam::{Vec2, Vec3};

use crate::chain::{DriveMode, JointChain, ScreenAxis};
use crate::config::SolverConfig;

/// 交互层每帧提供的拖拽信号
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragInput {
    /// 目标点的世界位置（已由射线与拖拽平面求交得到）
    Target(Vec3),
    /// 屏幕拖拽累积量（见 [`DragAccumulator`]）
    ScreenDelta(Vec2),
}

/// 映射后的驱动
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Drive {
    /// 有符号标量，幅度不受限
    Scalar(f32),
    /// 位移模式下的目标点
    Target(Vec3),
}

/// 输入映射
pub struct InputMapper;

impl InputMapper {
    /// 按链的驱动模式换算输入，模式不匹配时返回 `None`
    pub fn map(chain: &JointChain, input: DragInput) -> Option<Drive> {
        match (chain.config().drive, input) {
            (DriveMode::Displacement, DragInput::Target(target)) => {
                if target.is_finite() {
                    Some(Drive::Target(target))
                } else {
                    None
                }
            }
            (DriveMode::ScreenDrag { .. }, DragInput::ScreenDelta(delta)) => {
                Self::screen_drive(chain, delta).map(Drive::Scalar)
            }
            _ => None,
        }
    }

    /// 屏幕拖拽量 × 缩放，按配置取反
    pub fn screen_drive(chain: &JointChain, delta: Vec2) -> Option<f32> {
        let DriveMode::ScreenDrag { axis, scale, invert } = chain.config().drive else {
            return None;
        };
        let component = match axis {
            ScreenAxis::Horizontal => delta.x,
            ScreenAxis::Vertical => delta.y,
        };
        let sign = if invert { -1.0 } else { 1.0 };
        let drive = component * scale * sign;
        drive.is_finite().then_some(drive)
    }
}

/// 屏幕拖拽累积器
///
/// 按下时记录起点，之后每次移动计算相对起点的偏移；屏幕 Y 向下增长，
/// 这里翻转成向上为正。
#[derive(Clone, Copy, Debug)]
pub struct DragAccumulator {
    start: Vec2,
    accum: Vec2,
    pixel_scale: f32,
}

impl DragAccumulator {
    pub fn new(pixel_scale: f32) -> Self {
        Self {
            start: Vec2::ZERO,
            accum: Vec2::ZERO,
            pixel_scale,
        }
    }

    /// 按下
    pub fn begin(&mut self, pointer: Vec2) {
        self.start = pointer;
        self.accum = Vec2::ZERO;
    }

    /// 移动，返回新的累积量
    pub fn update(&mut self, pointer: Vec2) -> Vec2 {
        self.accum = Vec2::new(
            (pointer.x - self.start.x) * self.pixel_scale,
            (self.start.y - pointer.y) * self.pixel_scale,
        );
        self.accum
    }

    pub fn delta(&self) -> Vec2 {
        self.accum
    }
}

impl From<&SolverConfig> for DragAccumulator {
    fn from(config: &SolverConfig) -> Self {
        Self::new(config.drag_pixel_scale)
    }
}

impl Default for DragAccumulator {
    fn default() -> Self {
        Self::from(&SolverConfig::default())
    }
}
