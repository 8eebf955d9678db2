//! 骨骼系统和求解器使用的骨骼接口

mod bone;
mod manager;

pub use bone::Bone;
pub use manager::BoneManager;

use glam::{Mat4, Quat, Vec3};

/// 骨骼索引（由外部骨骼系统分配）
pub type BoneId = usize;

/// 局部旋转轴
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// 单位轴向量
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    /// 取欧拉角中的对应分量
    pub fn component(self, v: Vec3) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }

    /// 写入欧拉角中的对应分量
    pub fn set_component(self, v: &mut Vec3, value: f32) {
        match self {
            Axis::X => v.x = value,
            Axis::Y => v.y = value,
            Axis::Z => v.z = value,
        }
    }

    /// 绕本轴旋转的平面角（忽略沿轴的扭转分量）
    ///
    /// 绕 X 轴旋转 θ 会让 atan2(z, y) 增加 θ，Y、Z 轴同理按右手顺序取分量。
    /// 平面投影过短时返回 `None`。
    pub fn plane_angle(self, v: Vec3) -> Option<f32> {
        let (a, b) = match self {
            Axis::X => (v.y, v.z),
            Axis::Y => (v.z, v.x),
            Axis::Z => (v.x, v.y),
        };
        let len_sq = a * a + b * b;
        if !len_sq.is_finite() || len_sq < 1e-12 {
            return None;
        }
        Some(b.atan2(a))
    }
}

/// 求解器对骨骼系统的最小需求
///
/// 写入必须在同一帧内可见：`propagate_transform` 之后读取子骨骼的世界变换
/// 要反映父骨骼刚写入的旋转。
pub trait SkeletonProvider {
    /// 通过名称查找骨骼
    fn find_bone(&self, name: &str) -> Option<BoneId>;

    /// 世界空间位置
    fn world_position(&self, bone: BoneId) -> Vec3;

    /// 世界空间朝向
    fn world_orientation(&self, bone: BoneId) -> Quat;

    /// 世界变换（默认由位置和朝向组合，不含缩放）
    fn world_transform(&self, bone: BoneId) -> Mat4 {
        Mat4::from_rotation_translation(self.world_orientation(bone), self.world_position(bone))
    }

    /// 单轴局部旋转（弧度）
    fn local_rotation(&self, bone: BoneId, axis: Axis) -> f32;

    /// 写入单轴局部旋转（弧度）
    fn set_local_rotation(&mut self, bone: BoneId, axis: Axis, value: f32);

    /// 局部平移偏移
    fn local_translation(&self, bone: BoneId) -> Vec3;

    /// 写入局部平移偏移
    fn set_local_translation(&mut self, bone: BoneId, value: Vec3);

    /// 从该骨骼起向下刷新全局变换
    fn propagate_transform(&mut self, bone: BoneId);
}
