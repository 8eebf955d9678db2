//! 关节链静态配置表

use glam::Vec3;
use once_cell::sync::Lazy;
use std::time::Duration;

use super::limits::{DirectionalScale, LimitPreset, LimitProfile};
use crate::skeleton::Axis;

/// 关节链类型
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChainKind {
    Finger,
    Neck,
    Waist,
}

impl ChainKind {
    /// 反馈事件标签
    pub fn label(self) -> &'static str {
        match self {
            ChainKind::Finger => "snap",
            ChainKind::Neck => "neck",
            ChainKind::Waist => "waist",
        }
    }
}

/// 屏幕拖拽分量
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScreenAxis {
    Horizontal,
    Vertical,
}

/// 驱动值来源
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DriveMode {
    /// 多骨骼链：每次迭代由目标点与末端的位移推导
    Displacement,
    /// 单骨骼链：屏幕拖拽累积量 × 缩放
    ScreenDrag {
        axis: ScreenAxis,
        scale: f32,
        invert: bool,
    },
}

/// 单条关节链配置
#[derive(Clone, Debug)]
pub struct ChainConfig {
    pub name: String,
    pub kind: ChainKind,
    /// 从根到末端的骨骼名称
    pub bones: Vec<String>,
    pub axis: Axis,
    /// 每根骨骼的灵活度（不要求归一化，根部小末端大）
    pub weights: Vec<f32>,
    pub limits: LimitProfile,
    pub drive: DriveMode,
    /// 阻力区插值系数
    pub resistance_gain: f32,
    /// 两次咔哒之间的最短间隔
    pub cooldown: Duration,
    /// 迟滞重置余量
    pub rearm_margin: f32,
    /// 几何旋转方向到"弯曲为正"的符号
    pub bend_sign: f32,
    /// 每次迭代的最大步长（弧度）
    pub step_clamp: f32,
    /// 末端标记点在末端骨骼局部空间中的偏移
    pub effector_offset: Vec3,
}

impl ChainConfig {
    /// 单骨骼链默认配置
    pub fn single(name: &str, kind: ChainKind, bone: &str, axis: Axis, limits: LimitPreset) -> Self {
        Self {
            name: name.to_string(),
            kind,
            bones: vec![bone.to_string()],
            axis,
            weights: vec![1.0],
            limits: LimitProfile::symmetric(limits),
            drive: DriveMode::ScreenDrag {
                axis: ScreenAxis::Horizontal,
                scale: 0.1,
                invert: false,
            },
            resistance_gain: 0.15,
            cooldown: Duration::from_millis(950),
            rearm_margin: 0.05,
            bend_sign: 1.0,
            step_clamp: 0.1,
            effector_offset: Vec3::ZERO,
        }
    }

    /// 手指链默认配置（三节，朝手心为正）
    pub fn finger(name: &str, bones: [&str; 3], axis: Axis) -> Self {
        Self {
            name: name.to_string(),
            kind: ChainKind::Finger,
            bones: bones.iter().map(|b| b.to_string()).collect(),
            axis,
            weights: vec![0.45, 0.35, 0.2],
            limits: LimitProfile::directional(
                LimitPreset::FINGER,
                DirectionalScale::PALM_SIDE,
                DirectionalScale::BACK_SIDE,
            ),
            drive: DriveMode::Displacement,
            resistance_gain: 0.10,
            cooldown: Duration::from_millis(950),
            rearm_margin: 0.1,
            bend_sign: 1.0,
            step_clamp: 0.1,
            effector_offset: Vec3::new(0.0, 0.025, 0.0),
        }
    }

    pub fn with_drive(mut self, drive: DriveMode) -> Self {
        self.drive = drive;
        self
    }

    pub fn with_limits(mut self, limits: LimitProfile) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_rearm_margin(mut self, margin: f32) -> Self {
        self.rearm_margin = margin;
        self
    }

    pub fn with_bend_sign(mut self, sign: f32) -> Self {
        self.bend_sign = sign;
        self
    }

    pub fn with_weights(mut self, weights: Vec<f32>) -> Self {
        self.weights = weights;
        self
    }
}

/// Mixamo 右手 + 脖子 + 腰的默认配置表
pub static DEFAULT_CHAIN_TABLE: Lazy<Vec<ChainConfig>> = Lazy::new(|| {
    let finger = |name: &str, axis: Axis| {
        let bones = [1, 2, 3].map(|i| format!("mixamorig1RightHand{}{}", name, i));
        ChainConfig::finger(name, [bones[0].as_str(), bones[1].as_str(), bones[2].as_str()], axis)
    };

    vec![
        finger("Index", Axis::X),
        finger("Middle", Axis::X),
        finger("Ring", Axis::X),
        finger("Pinky", Axis::X),
        // 拇指绕 Z 轴弯曲
        finger("Thumb", Axis::Z),
        // 脖子：反向且灵敏度低，与画面上的弯曲方向一致
        ChainConfig::single("Neck", ChainKind::Neck, "mixamorig1Neck", Axis::Z, LimitPreset::NECK)
            .with_drive(DriveMode::ScreenDrag {
                axis: ScreenAxis::Horizontal,
                scale: 0.1,
                invert: true,
            }),
        // 腰：同向，稍慢
        ChainConfig::single("Waist", ChainKind::Waist, "mixamorig1Spine2", Axis::Y, LimitPreset::WAIST)
            .with_drive(DriveMode::ScreenDrag {
                axis: ScreenAxis::Horizontal,
                scale: 0.08,
                invert: false,
            }),
    ]
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_layout() {
        let table = &*DEFAULT_CHAIN_TABLE;
        assert_eq!(table.len(), 7);

        let thumb = table.iter().find(|c| c.name == "Thumb").unwrap();
        assert_eq!(thumb.axis, Axis::Z);
        assert_eq!(thumb.bones[2], "mixamorig1RightHandThumb3");

        let neck = table.iter().find(|c| c.name == "Neck").unwrap();
        assert_eq!(neck.bones.len(), 1);
        assert!(matches!(neck.drive, DriveMode::ScreenDrag { invert: true, .. }));
    }

    #[test]
    fn test_default_table_is_consistent() {
        for config in DEFAULT_CHAIN_TABLE.iter() {
            assert_eq!(config.weights.len(), config.bones.len(), "{}", config.name);
            assert!(config.limits.check().is_ok(), "{}", config.name);
            let multi = config.bones.len() > 1;
            assert_eq!(multi, config.drive == DriveMode::Displacement, "{}", config.name);
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(ChainKind::Finger.label(), "snap");
        assert_eq!(ChainKind::Waist.label(), "waist");
    }
}
