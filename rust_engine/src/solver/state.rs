//! 每条链的可变状态

use glam::Vec3;

use super::limit::Zone;

/// 拖拽目标点
///
/// 初始位置在初始化时记录一次；拖拽时由交互层写入，空闲时由回弹控制器写入。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Target {
    rest: Option<Vec3>,
    position: Vec3,
}

impl Target {
    /// 以初始位置创建，非有限值视为缺失
    pub fn new(rest: Vec3) -> Self {
        Self {
            rest: rest.is_finite().then_some(rest),
            position: rest,
        }
    }

    pub fn rest(&self) -> Option<Vec3> {
        self.rest
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// 向初始位置指数插值一步
    pub fn ease_to_rest(&mut self, factor: f32) {
        if let Some(rest) = self.rest {
            self.position = self.position.lerp(rest, factor);
        }
    }
}

/// 链的运行时状态（咔哒状态由 [`super::CrackStateMachine`] 单独持有）
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChainState {
    pub zone: Zone,
    /// 上一帧求得的角度（阻力区插值用）
    pub prev_angle: f32,
    pub target: Target,
}

impl ChainState {
    pub fn new(target: Target) -> Self {
        Self {
            zone: Zone::Free,
            prev_angle: 0.0,
            target,
        }
    }
}
