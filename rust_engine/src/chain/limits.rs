//! 关节限位预设和方向缩放

/// 限位三档：正常活动 / 卡住 / 咔哒后最大幅度（弧度，取绝对值）
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LimitPreset {
    pub soft: f32,
    pub crack: f32,
    pub hard: f32,
}

impl LimitPreset {
    pub const fn new(soft: f32, crack: f32, hard: f32) -> Self {
        Self { soft, crack, hard }
    }

    /// 手指
    pub const FINGER: LimitPreset = LimitPreset::new(1.1, 1.3, 1.5);
    /// 脖子
    pub const NECK: LimitPreset = LimitPreset::new(0.35, 0.5, 0.65);
    /// 腰
    pub const WAIST: LimitPreset = LimitPreset::new(0.3, 0.45, 0.6);

    /// 满足 0 < soft < crack < hard
    pub fn is_ordered(&self) -> bool {
        self.soft > 0.0 && self.soft < self.crack && self.crack < self.hard && self.hard.is_finite()
    }

    fn scaled(&self, scale: &DirectionalScale) -> Self {
        Self {
            soft: self.soft * scale.soft,
            crack: self.crack * scale.crack,
            hard: self.hard * scale.hard,
        }
    }
}

/// 单方向的三档缩放系数
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalScale {
    pub soft: f32,
    pub crack: f32,
    pub hard: f32,
}

impl DirectionalScale {
    pub const IDENTITY: DirectionalScale = DirectionalScale {
        soft: 1.0,
        crack: 1.0,
        hard: 1.0,
    };

    /// 手指朝手心：正常活动范围大
    pub const PALM_SIDE: DirectionalScale = DirectionalScale {
        soft: 1.25,
        crack: 1.25,
        hard: 1.15,
    };

    /// 手指朝手背：稍微一掰就到头
    pub const BACK_SIDE: DirectionalScale = DirectionalScale {
        soft: 0.55,
        crack: 0.6,
        hard: 0.65,
    };
}

impl Default for DirectionalScale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// 限位配置：基础预设 + 正负方向缩放
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LimitProfile {
    pub base: LimitPreset,
    /// 驱动值 >= 0 时使用（手指为朝手心方向）
    pub positive: DirectionalScale,
    /// 驱动值 < 0 时使用
    pub negative: DirectionalScale,
}

impl LimitProfile {
    /// 正负方向对称
    pub const fn symmetric(base: LimitPreset) -> Self {
        Self {
            base,
            positive: DirectionalScale::IDENTITY,
            negative: DirectionalScale::IDENTITY,
        }
    }

    pub const fn directional(
        base: LimitPreset,
        positive: DirectionalScale,
        negative: DirectionalScale,
    ) -> Self {
        Self {
            base,
            positive,
            negative,
        }
    }

    /// 正方向的实际限位
    pub fn positive_limits(&self) -> LimitPreset {
        self.base.scaled(&self.positive)
    }

    /// 负方向的实际限位（仍为正数幅度）
    pub fn negative_limits(&self) -> LimitPreset {
        self.base.scaled(&self.negative)
    }

    /// 按符号选择方向，`value >= 0` 取正方向
    pub fn for_value(&self, value: f32) -> LimitPreset {
        if value >= 0.0 {
            self.positive_limits()
        } else {
            self.negative_limits()
        }
    }

    /// 校验两个方向都满足 soft < crack < hard，失败时返回原因
    pub fn check(&self) -> std::result::Result<(), String> {
        for (label, limits) in [
            ("positive", self.positive_limits()),
            ("negative", self.negative_limits()),
        ] {
            if !limits.is_ordered() {
                return Err(format!(
                    "{} direction needs 0 < soft < crack < hard, got {:.3} / {:.3} / {:.3}",
                    label, limits.soft, limits.crack, limits.hard
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_ordered() {
        assert!(LimitPreset::FINGER.is_ordered());
        assert!(LimitPreset::NECK.is_ordered());
        assert!(LimitPreset::WAIST.is_ordered());
    }

    #[test]
    fn test_finger_directional_profile_is_valid() {
        let profile = LimitProfile::directional(
            LimitPreset::FINGER,
            DirectionalScale::PALM_SIDE,
            DirectionalScale::BACK_SIDE,
        );
        assert!(profile.check().is_ok());

        let palm = profile.for_value(0.5);
        let back = profile.for_value(-0.5);
        assert!((palm.soft - 1.375).abs() < 1e-5);
        assert!(back.soft < palm.soft);
        assert!(back.hard < palm.hard);
    }

    #[test]
    fn test_zero_uses_positive_direction() {
        let profile = LimitProfile::directional(
            LimitPreset::NECK,
            DirectionalScale::IDENTITY,
            DirectionalScale::BACK_SIDE,
        );
        assert_eq!(profile.for_value(0.0), profile.positive_limits());
    }

    #[test]
    fn test_unordered_scale_is_rejected() {
        // 裂响阈值被放大到超过硬限位
        let profile = LimitProfile::directional(
            LimitPreset::FINGER,
            DirectionalScale {
                soft: 1.25,
                crack: 1.35,
                hard: 1.15,
            },
            DirectionalScale::IDENTITY,
        );
        let err = profile.check().unwrap_err();
        assert!(err.starts_with("positive"));
    }
}
