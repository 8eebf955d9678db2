//! 空闲回弹

use super::crack::CrackStateMachine;
use super::in_rearm_band;
use super::limit::Zone;
use super::state::ChainState;
use crate::chain::JointChain;
use crate::config::SolverConfig;
use crate::skeleton::SkeletonProvider;

/// 回弹控制器：目标点回到初始位置，骨骼角度回到 0
#[derive(Clone, Copy, Debug)]
pub struct RelaxationController {
    pub target_factor: f32,
    pub speed_free: f32,
    pub speed_locked: f32,
    pub epsilon: f32,
}

impl RelaxationController {
    pub fn new(config: &SolverConfig) -> Self {
        Self {
            target_factor: config.target_return_factor,
            speed_free: config.relax_speed_free,
            speed_locked: config.relax_speed_locked,
            epsilon: config.relax_epsilon,
        }
    }

    /// 回弹一帧，全部回正时返回 `true`
    ///
    /// 回到重置区间时顺带清除 cracked；分区本身要等角度小于 epsilon 才回到自由。
    pub fn relax<S: SkeletonProvider + ?Sized>(
        &self,
        chain: &JointChain,
        state: &mut ChainState,
        skeleton: &mut S,
        cracks: &mut CrackStateMachine,
    ) -> bool {
        state.target.ease_to_rest(self.target_factor);

        let speed = match state.zone {
            Zone::Locked => self.speed_locked,
            Zone::Free | Zone::Resistance => self.speed_free,
        };

        let mut max_angle = 0.0f32;
        for i in 0..chain.bone_count() {
            let angle = chain.relative_angle(skeleton, i);
            if angle == 0.0 {
                continue;
            }
            let eased = angle * (1.0 - speed);
            chain.write_relative_angle(skeleton, i, eased);
            max_angle = max_angle.max(eased.abs());
        }
        state.prev_angle *= 1.0 - speed;

        if cracks.is_cracked(chain.id()) && in_rearm_band(chain, skeleton) {
            cracks.rearm(chain.id());
        }

        if max_angle < self.epsilon && state.prev_angle.abs() < self.epsilon {
            state.zone = Zone::Free;
            state.prev_angle = 0.0;
            return true;
        }
        false
    }
}

impl Default for RelaxationController {
    fn default() -> Self {
        Self::new(&SolverConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{ChainConfig, ChainKind, ChainRegistry, LimitPreset};
    use crate::feedback::RecordingSink;
    use crate::skeleton::{Axis, Bone, BoneManager};
    use crate::solver::state::Target;
    use glam::Vec3;
    use std::time::Duration;

    fn waist_rig() -> (BoneManager, ChainRegistry, CrackStateMachine) {
        let mut skeleton = BoneManager::new();
        skeleton.add_bone(Bone::with_parent("spine", -1, Vec3::ZERO));
        skeleton.build_hierarchy();
        let configs = vec![ChainConfig::single(
            "Waist",
            ChainKind::Waist,
            "spine",
            Axis::Y,
            LimitPreset::WAIST,
        )];
        let registry = ChainRegistry::build(&configs, &skeleton).unwrap();
        let cracks = CrackStateMachine::new(1, &SolverConfig::default());
        (skeleton, registry, cracks)
    }

    #[test]
    fn test_angle_decreases_monotonically_to_free() {
        let (mut skeleton, registry, mut cracks) = waist_rig();
        let chain = registry.iter().next().unwrap();
        let relax = RelaxationController::default();

        chain.write_relative_angle(&mut skeleton, 0, 0.6);
        let mut state = ChainState::new(Target::new(Vec3::ZERO));
        state.zone = Zone::Locked;
        state.prev_angle = 0.6;

        let mut last = 0.6f32;
        let mut settled = false;
        for _ in 0..400 {
            settled = relax.relax(chain, &mut state, &mut skeleton, &mut cracks);
            let angle = chain.relative_angle(&skeleton, 0).abs();
            assert!(angle <= last);
            last = angle;
            if settled {
                break;
            }
        }
        assert!(settled);
        assert_eq!(state.zone, Zone::Free);
        assert_eq!(state.prev_angle, 0.0);
        assert!(last < 0.01);
    }

    #[test]
    fn test_locked_relaxes_slower() {
        let (mut skeleton, registry, mut cracks) = waist_rig();
        let chain = registry.iter().next().unwrap();
        let relax = RelaxationController::default();

        let mut locked = ChainState::new(Target::new(Vec3::ZERO));
        locked.zone = Zone::Locked;
        chain.write_relative_angle(&mut skeleton, 0, 0.5);
        relax.relax(chain, &mut locked, &mut skeleton, &mut cracks);
        let after_locked = chain.relative_angle(&skeleton, 0);

        let mut free = ChainState::new(Target::new(Vec3::ZERO));
        chain.write_relative_angle(&mut skeleton, 0, 0.5);
        relax.relax(chain, &mut free, &mut skeleton, &mut cracks);
        let after_free = chain.relative_angle(&skeleton, 0);

        assert!((after_locked - 0.475).abs() < 1e-5);
        assert!((after_free - 0.4).abs() < 1e-5);
    }

    #[test]
    fn test_relaxing_into_band_rearms() {
        let (mut skeleton, registry, mut cracks) = waist_rig();
        let chain = registry.iter().next().unwrap();
        let relax = RelaxationController::default();
        let mut sink = RecordingSink::default();

        cracks.request(chain, Vec3::ZERO, Duration::ZERO, &mut skeleton, &mut sink);
        chain.write_relative_angle(&mut skeleton, 0, 0.6);
        let mut state = ChainState::new(Target::new(Vec3::ZERO));
        state.zone = Zone::Locked;

        relax.relax(chain, &mut state, &mut skeleton, &mut cracks);
        assert!(cracks.is_cracked(chain.id()));

        // 0.3 - 0.05 以内才重置
        for _ in 0..40 {
            relax.relax(chain, &mut state, &mut skeleton, &mut cracks);
        }
        assert!(chain.relative_angle(&skeleton, 0) < 0.25);
        assert!(!cracks.is_cracked(chain.id()));
    }

    #[test]
    fn test_target_returns_to_rest() {
        let (mut skeleton, registry, mut cracks) = waist_rig();
        let chain = registry.iter().next().unwrap();
        let relax = RelaxationController::default();

        let mut state = ChainState::new(Target::new(Vec3::ZERO));
        state.target.set_position(Vec3::new(0.0, 1.0, 0.0));
        for _ in 0..60 {
            relax.relax(chain, &mut state, &mut skeleton, &mut cracks);
        }
        assert!(state.target.position().length() < 1e-4);
    }
}
