//! 骨骼节点

use glam::{EulerRot, Mat4, Quat, Vec3};

use super::Axis;

/// 骨骼节点
#[derive(Clone, Debug)]
pub struct Bone {
    pub name: String,
    pub parent_index: i32,

    // 初始位置（世界空间）
    pub initial_position: Vec3,
    // 相对于父骨骼的偏移（在 build_hierarchy 中计算）
    pub bone_offset: Vec3,

    // 初始姿势的欧拉角（XYZ 顺序）
    pub initial_rotation: Vec3,

    // 动画状态：欧拉角旋转和附加平移
    pub animation_rotate: Vec3,
    pub animation_translate: Vec3,

    // 变换结果
    pub local_transform: Mat4,
    pub global_transform: Mat4,
}

impl Bone {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_index: -1,
            initial_position: Vec3::ZERO,
            bone_offset: Vec3::ZERO,
            initial_rotation: Vec3::ZERO,
            animation_rotate: Vec3::ZERO,
            animation_translate: Vec3::ZERO,
            local_transform: Mat4::IDENTITY,
            global_transform: Mat4::IDENTITY,
        }
    }

    /// 指定父骨骼和初始世界位置创建
    pub fn with_parent(name: impl Into<String>, parent_index: i32, position: Vec3) -> Self {
        let mut bone = Self::new(name);
        bone.parent_index = parent_index;
        bone.initial_position = position;
        bone
    }

    /// 单轴旋转
    pub fn rotation(&self, axis: Axis) -> f32 {
        axis.component(self.animation_rotate)
    }

    /// 设置单轴旋转
    pub fn set_rotation(&mut self, axis: Axis, value: f32) {
        axis.set_component(&mut self.animation_rotate, value);
    }

    /// 当前局部旋转四元数
    pub fn rotation_quat(&self) -> Quat {
        let r = self.animation_rotate;
        Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z)
    }

    /// 重置到初始姿势
    pub fn reset_animation(&mut self) {
        self.animation_rotate = self.initial_rotation;
        self.animation_translate = Vec3::ZERO;
    }

    /// 更新本地变换
    /// 平移 = bone_offset + animation_translate，旋转 = 欧拉角 XYZ
    pub fn update_local_transform(&mut self) {
        let translate = self.bone_offset + self.animation_translate;
        self.local_transform = Mat4::from_rotation_translation(self.rotation_quat(), translate);
    }

    /// 世界位置
    pub fn world_position(&self) -> Vec3 {
        self.global_transform.col(3).truncate()
    }
}

impl Default for Bone {
    fn default() -> Self {
        Self::new(String::new())
    }
}
