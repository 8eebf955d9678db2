//! 咔哒状态机
//!
//! 每条链独立记录 `cracked` 标志和上次触发时间：
//! - 请求只有在未处于 cracked 且冷却结束时才被接受
//! - 接受后发出一次反馈事件，并在根骨骼上挂一个短暂的抖动
//! - `cracked` 只能由重置条件清除，时间流逝本身不会清除

use glam::Vec3;
use std::time::Duration;

use crate::chain::{ChainId, JointChain};
use crate::config::SolverConfig;
use crate::feedback::EventSink;
use crate::skeleton::{BoneId, SkeletonProvider};

/// 单条链的咔哒状态
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CrackState {
    cracked: bool,
    last_event: Option<Duration>,
}

impl CrackState {
    pub fn is_cracked(&self) -> bool {
        self.cracked
    }

    pub fn last_event(&self) -> Option<Duration> {
        self.last_event
    }

    /// 冷却是否结束且已重置
    pub fn can_fire(&self, now: Duration, cooldown: Duration) -> bool {
        if self.cracked {
            return false;
        }
        match self.last_event {
            Some(last) => now.saturating_sub(last) >= cooldown,
            None => true,
        }
    }

    /// 尝试接受一次触发
    pub fn accept(&mut self, now: Duration, cooldown: Duration) -> bool {
        if !self.can_fire(now, cooldown) {
            return false;
        }
        self.cracked = true;
        self.last_event = Some(now);
        true
    }

    /// 清除 cracked，返回之前是否处于 cracked
    pub fn rearm(&mut self) -> bool {
        std::mem::replace(&mut self.cracked, false)
    }
}

/// 根骨骼的短暂抖动（到期后恢复原平移）
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JitterPulse {
    pub bone: BoneId,
    pub start: Duration,
    pub duration: Duration,
    pub revert: Vec3,
}

impl JitterPulse {
    pub fn is_expired(&self, now: Duration) -> bool {
        now.saturating_sub(self.start) >= self.duration
    }
}

/// 咔哒状态机
#[derive(Clone, Debug)]
pub struct CrackStateMachine {
    states: Vec<CrackState>,
    pulses: Vec<JitterPulse>,
    jitter_duration: Duration,
    jitter_amplitude: f32,
}

impl CrackStateMachine {
    pub fn new(chain_count: usize, config: &SolverConfig) -> Self {
        Self {
            states: vec![CrackState::default(); chain_count],
            pulses: Vec::new(),
            jitter_duration: config.jitter_duration,
            jitter_amplitude: config.jitter_amplitude,
        }
    }

    pub fn state(&self, chain: ChainId) -> CrackState {
        self.states.get(chain.0).copied().unwrap_or_default()
    }

    pub fn is_cracked(&self, chain: ChainId) -> bool {
        self.state(chain).is_cracked()
    }

    /// 请求触发咔哒
    ///
    /// 状态更新不依赖反馈端是否可用。
    pub fn request<S, E>(
        &mut self,
        chain: &JointChain,
        position: Vec3,
        now: Duration,
        skeleton: &mut S,
        sink: &mut E,
    ) -> bool
    where
        S: SkeletonProvider + ?Sized,
        E: EventSink + ?Sized,
    {
        let cooldown = chain.config().cooldown;
        let Some(state) = self.states.get_mut(chain.id().0) else {
            return false;
        };
        if !state.accept(now, cooldown) {
            log::debug!("关节链 {} 咔哒请求被拒绝（冷却中或未重置）", chain.name());
            return false;
        }

        log::debug!("关节链 {} 咔哒 @ {:?}", chain.name(), position);
        sink.play_crack_feedback(position, chain.kind().label());
        self.start_pulse(chain, now, skeleton);
        true
    }

    /// 清除 cracked
    pub fn rearm(&mut self, chain: ChainId) -> bool {
        self.states
            .get_mut(chain.0)
            .map(CrackState::rearm)
            .unwrap_or(false)
    }

    fn start_pulse<S: SkeletonProvider + ?Sized>(&mut self, chain: &JointChain, now: Duration, skeleton: &mut S) {
        if self.jitter_amplitude <= 0.0 || self.jitter_duration.is_zero() {
            return;
        }
        let bone = chain.root();

        // 同一骨骼已有抖动时只重新计时，保留最初的恢复值
        let revert = match self.pulses.iter().position(|p| p.bone == bone) {
            Some(i) => self.pulses.swap_remove(i).revert,
            None => skeleton.local_translation(bone),
        };

        let offset = chain.axis().unit() * self.jitter_amplitude;
        skeleton.set_local_translation(bone, revert + offset);
        skeleton.propagate_transform(bone);

        self.pulses.push(JitterPulse {
            bone,
            start: now,
            duration: self.jitter_duration,
            revert,
        });
    }

    /// 每帧调用：恢复到期的抖动
    pub fn update_effects<S: SkeletonProvider + ?Sized>(&mut self, now: Duration, skeleton: &mut S) {
        self.pulses.retain(|pulse| {
            if !pulse.is_expired(now) {
                return true;
            }
            skeleton.set_local_translation(pulse.bone, pulse.revert);
            skeleton.propagate_transform(pulse.bone);
            false
        });
    }

    pub fn active_pulses(&self) -> &[JitterPulse] {
        &self.pulses
    }
}
