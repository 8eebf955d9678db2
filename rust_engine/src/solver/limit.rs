//! 限位分区

use crate::chain::LimitProfile;

/// 运动分区
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Zone {
    /// 正常活动，角度直接跟随驱动
    #[default]
    Free,
    /// 卡住，角度缓慢逼近软限位
    Resistance,
    /// 已越过裂响阈值，停在硬限位
    Locked,
}

/// 单次分区结果
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoneResult {
    pub zone: Zone,
    pub angle: f32,
    /// 本帧从非锁定进入锁定，需要请求咔哒
    pub crossed: bool,
}

/// 限位分区器（每帧求值，不依赖边沿）
#[derive(Clone, Copy, Debug)]
pub struct LimitEvaluator {
    pub profile: LimitProfile,
    pub resistance_gain: f32,
    pub rearm_margin: f32,
}

impl LimitEvaluator {
    pub fn new(profile: LimitProfile, resistance_gain: f32, rearm_margin: f32) -> Self {
        Self {
            profile,
            resistance_gain,
            rearm_margin,
        }
    }

    /// 对驱动值分区
    ///
    /// 已锁定的链在 `|drive| > soft - margin` 期间保持锁定。
    pub fn evaluate(&self, drive: f32, prev_zone: Zone, prev_angle: f32) -> ZoneResult {
        let limits = self.profile.for_value(drive);
        let magnitude = drive.abs();
        let sign = if drive < 0.0 { -1.0 } else { 1.0 };

        if prev_zone == Zone::Locked && magnitude > limits.soft - self.rearm_margin {
            return ZoneResult {
                zone: Zone::Locked,
                angle: sign * limits.hard,
                crossed: false,
            };
        }

        if magnitude < limits.soft {
            ZoneResult {
                zone: Zone::Free,
                angle: drive,
                crossed: false,
            }
        } else if magnitude < limits.crack {
            let goal = sign * limits.soft;
            ZoneResult {
                zone: Zone::Resistance,
                angle: prev_angle + (goal - prev_angle) * self.resistance_gain,
                crossed: false,
            }
        } else {
            ZoneResult {
                zone: Zone::Locked,
                angle: sign * limits.hard,
                crossed: prev_zone != Zone::Locked,
            }
        }
    }

    /// 角度是否回到重置区间 `[-(soft_neg - margin), soft_pos - margin]`
    pub fn in_rearm_band(&self, angle: f32) -> bool {
        let upper = self.profile.positive_limits().soft - self.rearm_margin;
        let lower = -(self.profile.negative_limits().soft - self.rearm_margin);
        angle >= lower && angle <= upper
    }
}
