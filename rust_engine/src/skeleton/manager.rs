//! 骨骼管理器

use glam::{Mat4, Quat, Vec3};
use std::collections::HashMap;

use super::{Axis, Bone, BoneId, SkeletonProvider};

/// 骨骼管理器
///
/// 引擎自带的参考骨骼实现，外部渲染层也可以直接实现 [`SkeletonProvider`]。
pub struct BoneManager {
    bones: Vec<Bone>,
    name_to_index: HashMap<String, usize>,
    children: Vec<Vec<usize>>,
}

impl BoneManager {
    pub fn new() -> Self {
        Self {
            bones: Vec::new(),
            name_to_index: HashMap::new(),
            children: Vec::new(),
        }
    }

    /// 添加骨骼，返回索引
    pub fn add_bone(&mut self, bone: Bone) -> usize {
        let index = self.bones.len();
        self.name_to_index.insert(bone.name.clone(), index);
        self.bones.push(bone);
        index
    }

    /// 构建骨骼层级并计算初始变换
    pub fn build_hierarchy(&mut self) {
        let bone_count = self.bones.len();
        self.children = vec![Vec::new(); bone_count];
        if bone_count == 0 {
            return;
        }

        for i in 0..bone_count {
            let pos = self.bones[i].initial_position;
            let parent_idx = self.bones[i].parent_index;

            // 相对于父骨骼的偏移
            let offset = if parent_idx >= 0 && (parent_idx as usize) < bone_count {
                self.children[parent_idx as usize].push(i);
                pos - self.bones[parent_idx as usize].initial_position
            } else {
                pos
            };
            self.bones[i].bone_offset = offset;
            self.bones[i].reset_animation();
            self.bones[i].update_local_transform();
        }

        for i in 0..bone_count {
            if !self.has_parent(i) {
                self.update_global_transform_recursive(i);
            }
        }
    }

    fn has_parent(&self, index: usize) -> bool {
        let parent_idx = self.bones[index].parent_index;
        parent_idx >= 0 && (parent_idx as usize) < self.bones.len()
    }

    /// 通过名称查找骨骼
    pub fn find_bone_by_name(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// 获取骨骼数量
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// 获取骨骼
    pub fn get_bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    /// 重置所有骨骼到初始姿势
    pub fn reset_all_transforms(&mut self) {
        for bone in &mut self.bones {
            bone.reset_animation();
            bone.update_local_transform();
        }
        for i in 0..self.bones.len() {
            if !self.has_parent(i) {
                self.update_global_transform_recursive(i);
            }
        }
    }

    /// 递归更新骨骼全局变换
    pub fn update_global_transform_recursive(&mut self, index: usize) {
        if index >= self.bones.len() {
            return;
        }

        let parent_idx = self.bones[index].parent_index;
        self.bones[index].global_transform = if self.has_parent(index) {
            self.bones[parent_idx as usize].global_transform * self.bones[index].local_transform
        } else {
            self.bones[index].local_transform
        };

        // 层级未构建时 children 为空，只刷新自身
        let children = self.children.get(index).cloned().unwrap_or_default();
        for child_idx in children {
            self.update_global_transform_recursive(child_idx);
        }
    }

    /// 获取全局变换
    pub fn get_global_transform(&self, index: usize) -> Mat4 {
        self.bones
            .get(index)
            .map(|b| b.global_transform)
            .unwrap_or(Mat4::IDENTITY)
    }
}

impl Default for BoneManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SkeletonProvider for BoneManager {
    fn find_bone(&self, name: &str) -> Option<BoneId> {
        self.find_bone_by_name(name)
    }

    fn world_position(&self, bone: BoneId) -> Vec3 {
        self.bones
            .get(bone)
            .map(Bone::world_position)
            .unwrap_or(Vec3::ZERO)
    }

    fn world_orientation(&self, bone: BoneId) -> Quat {
        let (_, rotation, _) = self.get_global_transform(bone).to_scale_rotation_translation();
        rotation
    }

    fn world_transform(&self, bone: BoneId) -> Mat4 {
        self.get_global_transform(bone)
    }

    fn local_rotation(&self, bone: BoneId, axis: Axis) -> f32 {
        self.bones.get(bone).map(|b| b.rotation(axis)).unwrap_or(0.0)
    }

    fn set_local_rotation(&mut self, bone: BoneId, axis: Axis, value: f32) {
        if let Some(b) = self.bones.get_mut(bone) {
            b.set_rotation(axis, value);
            b.update_local_transform();
        }
    }

    fn local_translation(&self, bone: BoneId) -> Vec3 {
        self.bones
            .get(bone)
            .map(|b| b.animation_translate)
            .unwrap_or(Vec3::ZERO)
    }

    fn set_local_translation(&mut self, bone: BoneId, value: Vec3) {
        if let Some(b) = self.bones.get_mut(bone) {
            b.animation_translate = value;
            b.update_local_transform();
        }
    }

    fn propagate_transform(&mut self, bone: BoneId) {
        self.update_global_transform_recursive(bone);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_bone_arm() -> BoneManager {
        let mut manager = BoneManager::new();
        manager.add_bone(Bone::with_parent("root", -1, Vec3::ZERO));
        manager.add_bone(Bone::with_parent("tip", 0, Vec3::new(0.0, 1.0, 0.0)));
        manager.build_hierarchy();
        manager
    }

    #[test]
    fn test_build_hierarchy_offsets() {
        let manager = two_bone_arm();
        assert_eq!(manager.bone_count(), 2);
        let tip = manager.find_bone_by_name("tip").unwrap();
        assert!((manager.world_position(tip) - Vec3::new(0.0, 1.0, 0.0)).length() < 1e-6);
        assert_eq!(manager.get_bone(tip).unwrap().bone_offset, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_rotation_propagates_to_children() {
        let mut manager = two_bone_arm();
        manager.set_local_rotation(0, Axis::X, std::f32::consts::FRAC_PI_2);
        manager.propagate_transform(0);
        // 绕 X 轴 90°，+Y 方向的子骨骼转到 +Z
        let tip = manager.world_position(1);
        assert!((tip - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_translation_and_reset() {
        let mut manager = two_bone_arm();
        manager.set_local_translation(0, Vec3::new(0.01, 0.0, 0.0));
        manager.propagate_transform(0);
        assert!((manager.world_position(1).x - 0.01).abs() < 1e-6);

        manager.reset_all_transforms();
        assert!(manager.world_position(1).x.abs() < 1e-6);
    }

    #[test]
    fn test_unknown_bone_is_harmless() {
        let mut manager = two_bone_arm();
        assert!(manager.find_bone("missing").is_none());
        manager.set_local_rotation(99, Axis::Y, 1.0);
        manager.propagate_transform(99);
        assert_eq!(manager.local_rotation(99, Axis::Y), 0.0);
    }
}
