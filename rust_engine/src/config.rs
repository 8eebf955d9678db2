//! 求解器全局配置
//!
//! 所有参数扁平化，直接在代码中修改默认值即可。
//! 每条链自己的限位、冷却等参数见 [`crate::chain::ChainConfig`]。

use std::time::Duration;

/// 求解器配置（扁平化，不嵌套）
#[derive(Debug, Clone)]
pub struct SolverConfig {
    // ========== 迭代求解 ==========
    /// 多骨骼链每帧迭代次数，默认 10
    pub iterations: u32,

    // ========== 回弹 ==========
    /// 空闲时目标点回到初始位置的插值系数，默认 0.22
    pub target_return_factor: f32,
    /// 非锁定状态下骨骼回弹速度，默认 0.2
    pub relax_speed_free: f32,
    /// 锁定状态下骨骼回弹速度，默认 0.05
    pub relax_speed_locked: f32,
    /// 角度小于此值视为已回正，默认 0.01
    pub relax_epsilon: f32,

    // ========== 抖动 ==========
    /// 咔哒时根骨骼抖动持续时间，默认 80ms
    pub jitter_duration: Duration,
    /// 抖动偏移幅度（局部空间），默认 0.003
    pub jitter_amplitude: f32,

    // ========== 拖拽 ==========
    /// 屏幕像素到拖拽量的缩放，默认 0.01
    pub drag_pixel_scale: f32,
    /// 单骨骼链拖拽时骨骼跟随系数，默认 1.0（立即跟随）
    pub drag_follow: f32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            // 越大 → 手指越快贴近目标点，但每帧开销线性增加
            iterations: 10,

            // 越大 → 松手后拖拽球越快回到原位
            target_return_factor: 0.22,
            // 越小 → 回弹越慢；锁定后回弹更慢，模拟关节"卡住"后缓慢复位
            relax_speed_free: 0.2,
            relax_speed_locked: 0.05,
            relax_epsilon: 0.01,

            // 抖动只是触感点缀，时间太长会显得像模型抽搐
            jitter_duration: Duration::from_millis(80),
            jitter_amplitude: 0.003,

            drag_pixel_scale: 0.01,
            drag_follow: 1.0,
        }
    }
}
