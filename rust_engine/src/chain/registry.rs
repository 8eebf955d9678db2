//! 关节链注册表

use glam::Vec3;
use std::collections::HashMap;

use super::config::{ChainConfig, ChainKind, DriveMode};
use crate::skeleton::{Axis, BoneId, SkeletonProvider};
use crate::{CrackError, Result};

/// 关节链索引
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(pub usize);

/// 已解析到骨骼上的关节链
#[derive(Clone, Debug)]
pub struct JointChain {
    id: ChainId,
    config: ChainConfig,
    bones: Vec<BoneId>,
    /// 初始化时每根骨骼在旋转轴上的角度
    rest_angles: Vec<f32>,
}

impl JointChain {
    pub fn id(&self) -> ChainId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn kind(&self) -> ChainKind {
        self.config.kind
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn axis(&self) -> Axis {
        self.config.axis
    }

    /// 从根到末端的骨骼
    pub fn bones(&self) -> &[BoneId] {
        &self.bones
    }

    pub fn weights(&self) -> &[f32] {
        &self.config.weights
    }

    pub fn rest_angles(&self) -> &[f32] {
        &self.rest_angles
    }

    pub fn root(&self) -> BoneId {
        self.bones[0]
    }

    /// 末端骨骼
    pub fn effector(&self) -> BoneId {
        self.bones[self.bones.len() - 1]
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// 末端标记点的世界位置
    pub fn effector_point<S: SkeletonProvider + ?Sized>(&self, skeleton: &S) -> Vec3 {
        skeleton
            .world_transform(self.effector())
            .transform_point3(self.config.effector_offset)
    }

    /// 第 `index` 根骨骼相对初始姿势的角度（弯曲为正）
    pub fn relative_angle<S: SkeletonProvider + ?Sized>(&self, skeleton: &S, index: usize) -> f32 {
        let current = skeleton.local_rotation(self.bones[index], self.config.axis);
        (current - self.rest_angles[index]) * self.config.bend_sign
    }

    /// 写回相对角度并刷新子骨骼
    pub fn write_relative_angle<S: SkeletonProvider + ?Sized>(
        &self,
        skeleton: &mut S,
        index: usize,
        angle: f32,
    ) {
        let bone = self.bones[index];
        let value = self.rest_angles[index] + angle * self.config.bend_sign;
        skeleton.set_local_rotation(bone, self.config.axis, value);
        skeleton.propagate_transform(bone);
    }
}

/// 关节链注册表（初始化后只读）
#[derive(Clone, Debug, Default)]
pub struct ChainRegistry {
    chains: Vec<JointChain>,
    name_to_index: HashMap<String, usize>,
    omitted: Vec<String>,
}

impl ChainRegistry {
    /// 根据配置表和骨骼构建
    ///
    /// 配置本身有误时返回错误；骨骼找不到的链只记录日志并跳过。
    pub fn build<S: SkeletonProvider + ?Sized>(configs: &[ChainConfig], skeleton: &S) -> Result<Self> {
        let mut registry = Self::default();

        for config in configs {
            validate(config)?;
            if registry.name_to_index.contains_key(&config.name) {
                return Err(CrackError::DuplicateChain(config.name.clone()));
            }

            let resolved: Option<Vec<BoneId>> =
                config.bones.iter().map(|name| skeleton.find_bone(name)).collect();
            let Some(bones) = resolved else {
                log::warn!("关节链 {} 的骨骼未找到，已跳过", config.name);
                registry.omitted.push(config.name.clone());
                continue;
            };

            let rest_angles = bones
                .iter()
                .map(|&bone| skeleton.local_rotation(bone, config.axis))
                .collect();

            let id = ChainId(registry.chains.len());
            registry.name_to_index.insert(config.name.clone(), id.0);
            registry.chains.push(JointChain {
                id,
                config: config.clone(),
                bones,
                rest_angles,
            });
        }

        log::info!(
            "关节链注册完成: {} 条可用, {} 条跳过",
            registry.chains.len(),
            registry.omitted.len()
        );

        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    pub fn get(&self, id: ChainId) -> Option<&JointChain> {
        self.chains.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &JointChain> {
        self.chains.iter()
    }

    /// 通过名称查找
    pub fn find(&self, name: &str) -> Option<ChainId> {
        self.name_to_index.get(name).map(|&i| ChainId(i))
    }

    /// 通过名称查找，找不到时返回错误
    pub fn require(&self, name: &str) -> Result<ChainId> {
        self.find(name)
            .ok_or_else(|| CrackError::UnknownChain(name.to_string()))
    }

    /// 因骨骼缺失而跳过的链
    pub fn omitted(&self) -> &[String] {
        &self.omitted
    }
}

fn validate(config: &ChainConfig) -> Result<()> {
    let invalid = |reason: &str| CrackError::InvalidConfig {
        chain: config.name.clone(),
        reason: reason.to_string(),
    };

    if config.bones.is_empty() {
        return Err(CrackError::EmptyChain(config.name.clone()));
    }
    if config.weights.len() != config.bones.len() {
        return Err(CrackError::WeightMismatch {
            chain: config.name.clone(),
            weights: config.weights.len(),
            bones: config.bones.len(),
        });
    }
    if config.weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(invalid("weights must be finite and non-negative"));
    }
    config
        .limits
        .check()
        .map_err(|reason| CrackError::InvalidLimits {
            chain: config.name.clone(),
            reason,
        })?;

    let min_soft = config
        .limits
        .positive_limits()
        .soft
        .min(config.limits.negative_limits().soft);
    if !(config.rearm_margin >= 0.0 && config.rearm_margin < min_soft) {
        return Err(invalid("rearm_margin must be in [0, soft)"));
    }
    if !(config.step_clamp > 0.0 && config.step_clamp.is_finite()) {
        return Err(invalid("step_clamp must be positive"));
    }
    if config.bend_sign != 1.0 && config.bend_sign != -1.0 {
        return Err(invalid("bend_sign must be 1 or -1"));
    }
    if !(config.resistance_gain > 0.0 && config.resistance_gain <= 1.0) {
        return Err(invalid("resistance_gain must be in (0, 1]"));
    }
    // 单骨骼位移链的末端就在关节上，标记点偏移必须落在旋转平面内
    if config.bones.len() == 1
        && config.drive == DriveMode::Displacement
        && config.axis.plane_angle(config.effector_offset).is_none()
    {
        return Err(invalid("single-bone displacement chain needs an effector_offset off the rotation axis"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::config::DEFAULT_CHAIN_TABLE;
    use crate::chain::limits::{LimitPreset, LimitProfile};
    use crate::skeleton::{Bone, BoneManager};

    fn finger_skeleton() -> BoneManager {
        let mut manager = BoneManager::new();
        manager.add_bone(Bone::with_parent("f1", -1, Vec3::ZERO));
        manager.add_bone(Bone::with_parent("f2", 0, Vec3::new(0.0, 0.1, 0.0)));
        manager.add_bone(Bone::with_parent("f3", 1, Vec3::new(0.0, 0.2, 0.0)));
        manager.build_hierarchy();
        manager
    }

    #[test]
    fn test_build_resolves_bones() {
        let skeleton = finger_skeleton();
        let configs = vec![ChainConfig::finger("Index", ["f1", "f2", "f3"], Axis::X)];
        let registry = ChainRegistry::build(&configs, &skeleton).unwrap();

        assert_eq!(registry.len(), 1);
        let id = registry.find("Index").unwrap();
        let chain = registry.get(id).unwrap();
        assert_eq!(chain.bones(), &[0, 1, 2]);
        assert_eq!(chain.effector(), 2);
        assert_eq!(chain.rest_angles(), &[0.0, 0.0, 0.0]);

        // 末端标记点在末端骨骼上方 0.025
        let p = chain.effector_point(&skeleton);
        assert!((p - Vec3::new(0.0, 0.225, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_missing_bones_are_omitted() {
        let skeleton = finger_skeleton();
        let registry = ChainRegistry::build(&DEFAULT_CHAIN_TABLE, &skeleton).unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.omitted().len(), DEFAULT_CHAIN_TABLE.len());
        assert_eq!(
            registry.require("Neck").unwrap_err(),
            CrackError::UnknownChain("Neck".to_string())
        );
    }

    #[test]
    fn test_invalid_configs_are_rejected() {
        let skeleton = finger_skeleton();

        let mismatch = ChainConfig::finger("A", ["f1", "f2", "f3"], Axis::X).with_weights(vec![1.0]);
        assert!(matches!(
            ChainRegistry::build(&[mismatch], &skeleton),
            Err(CrackError::WeightMismatch { weights: 1, bones: 3, .. })
        ));

        let unordered = ChainConfig::single("B", ChainKind::Neck, "f1", Axis::Z, LimitPreset::NECK)
            .with_limits(LimitProfile::symmetric(LimitPreset::new(0.5, 0.4, 0.6)));
        assert!(matches!(
            ChainRegistry::build(&[unordered], &skeleton),
            Err(CrackError::InvalidLimits { .. })
        ));

        let mut empty = ChainConfig::single("C", ChainKind::Neck, "f1", Axis::Z, LimitPreset::NECK);
        empty.bones.clear();
        empty.weights.clear();
        assert_eq!(
            ChainRegistry::build(&[empty], &skeleton).unwrap_err(),
            CrackError::EmptyChain("C".to_string())
        );

        let wide_margin = ChainConfig::single("D", ChainKind::Neck, "f1", Axis::Z, LimitPreset::NECK)
            .with_rearm_margin(0.4);
        assert!(matches!(
            ChainRegistry::build(&[wide_margin], &skeleton),
            Err(CrackError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_single_bone_displacement_needs_offset() {
        let skeleton = finger_skeleton();
        let mut chain = ChainConfig::single("Tip", ChainKind::Finger, "f3", Axis::Z, LimitPreset::FINGER)
            .with_drive(DriveMode::Displacement);
        assert!(matches!(
            ChainRegistry::build(&[chain.clone()], &skeleton),
            Err(CrackError::InvalidConfig { .. })
        ));

        // 沿旋转轴的偏移同样没有平面分量
        chain.effector_offset = Vec3::new(0.0, 0.0, 0.05);
        assert!(ChainRegistry::build(&[chain.clone()], &skeleton).is_err());

        chain.effector_offset = Vec3::new(0.0, 0.05, 0.0);
        let registry = ChainRegistry::build(&[chain], &skeleton).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let skeleton = finger_skeleton();
        let a = ChainConfig::single("Neck", ChainKind::Neck, "f1", Axis::Z, LimitPreset::NECK);
        let b = a.clone();
        assert_eq!(
            ChainRegistry::build(&[a, b], &skeleton).unwrap_err(),
            CrackError::DuplicateChain("Neck".to_string())
        );
    }

    #[test]
    fn test_relative_angle_respects_rest_and_sign() {
        let mut skeleton = finger_skeleton();
        skeleton.set_local_rotation(1, Axis::X, 0.2);
        skeleton.propagate_transform(1);

        let configs = vec![
            ChainConfig::finger("Index", ["f1", "f2", "f3"], Axis::X).with_bend_sign(-1.0),
        ];
        let registry = ChainRegistry::build(&configs, &skeleton).unwrap();
        let chain = registry.get(ChainId(0)).unwrap();
        assert_eq!(chain.rest_angles()[1], 0.2);
        assert_eq!(chain.relative_angle(&skeleton, 1), 0.0);

        chain.write_relative_angle(&mut skeleton, 1, 0.3);
        assert!((skeleton.local_rotation(1, Axis::X) - (0.2 - 0.3)).abs() < 1e-6);
        assert!((chain.relative_angle(&skeleton, 1) - 0.3).abs() < 1e-6);
    }
}
