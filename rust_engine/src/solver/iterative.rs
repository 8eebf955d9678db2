//! 多骨骼链迭代求解器
//!
//! 每帧固定迭代若干次，每次从末端向根部遍历骨骼。每根骨骼同时跟踪两个角度：
//! - 意图角度：不做步长和限位裁剪，只用于判断是否触发咔哒
//! - 实际角度：步长裁剪 + 限位裁剪后写回骨骼
//!
//! 用户把目标拖得再远，关节也会在限位处停下，但咔哒一定会触发。

use glam::Vec3;
use std::f32::consts::{PI, TAU};
use std::time::Duration;

use super::crack::CrackStateMachine;
use super::limit::Zone;
use super::{BoneSolveResult, ChainSolveReport};
use crate::chain::JointChain;
use crate::feedback::EventSink;
use crate::skeleton::SkeletonProvider;

/// 迭代求解器
#[derive(Clone, Copy, Debug)]
pub struct IterativeAngleSolver {
    pub iterations: u32,
}

impl IterativeAngleSolver {
    pub fn new(iterations: u32) -> Self {
        Self { iterations }
    }

    /// 把链向目标点求解一帧
    pub fn solve<S, E>(
        &self,
        chain: &JointChain,
        target: Vec3,
        now: Duration,
        skeleton: &mut S,
        cracks: &mut CrackStateMachine,
        sink: &mut E,
    ) -> ChainSolveReport
    where
        S: SkeletonProvider + ?Sized,
        E: EventSink + ?Sized,
    {
        let config = chain.config();
        let curl = config.limits.positive_limits();
        let extension = config.limits.negative_limits();
        let id = chain.id();
        let band_upper = curl.soft - config.rearm_margin;
        let band_lower = -(extension.soft - config.rearm_margin);

        let mut results: Vec<BoneSolveResult> = (0..chain.bone_count())
            .map(|i| {
                let angle = chain.relative_angle(skeleton, i);
                BoneSolveResult {
                    bone: chain.bones()[i],
                    intent_angle: angle,
                    realized_angle: angle,
                }
            })
            .collect();
        let mut fired = false;
        let mut resisted = false;

        for _ in 0..self.iterations {
            resisted = false;
            let mut intent_in_band = true;

            for i in (0..chain.bone_count()).rev() {
                let Some(raw) = raw_diff(chain, i, target, skeleton) else {
                    continue;
                };
                let weight = chain.weights()[i];
                let current = chain.relative_angle(skeleton, i);

                // 意图角度：不裁剪
                let intent = current + raw * weight;
                results[i].intent_angle = intent;
                if intent < band_lower || intent > band_upper {
                    intent_in_band = false;
                }

                if !cracks.is_cracked(id) {
                    let crossed = (raw > 0.0 && intent >= curl.crack)
                        || (raw < 0.0 && intent <= -extension.crack);
                    if crossed {
                        let joint = skeleton.world_position(chain.bones()[i]);
                        fired |= cracks.request(chain, joint, now, skeleton, sink);
                    }
                }

                let cracked = cracks.is_cracked(id);
                let (lower, upper) = if cracked {
                    (-extension.hard, curl.hard)
                } else {
                    (-extension.soft, curl.soft)
                };
                if !cracked && (intent > curl.soft || intent < -extension.soft) {
                    resisted = true;
                }

                // 实际运动：步长裁剪 × 权重，再裁剪到限位
                let step = raw.clamp(-config.step_clamp, config.step_clamp) * weight;
                let realized = (current + step).clamp(lower, upper);
                chain.write_relative_angle(skeleton, i, realized);
                results[i].realized_angle = realized;
            }

            // 所有骨骼的实际角度和意图角度都回到重置区间后才整体重置
            if cracks.is_cracked(id) && intent_in_band && in_rearm_band(chain, skeleton) {
                cracks.rearm(id);
                log::debug!("关节链 {} 已重置", chain.name());
            }
        }

        let zone = if cracks.is_cracked(id) {
            Zone::Locked
        } else if resisted {
            Zone::Resistance
        } else {
            Zone::Free
        };

        ChainSolveReport {
            chain: id,
            zone,
            bones: results,
            fired,
        }
    }
}

impl Default for IterativeAngleSolver {
    fn default() -> Self {
        Self::new(10)
    }
}

/// 第 `index` 根骨骼需要转动的角度（弯曲为正），几何退化时返回 `None`
fn raw_diff<S: SkeletonProvider + ?Sized>(
    chain: &JointChain,
    index: usize,
    target: Vec3,
    skeleton: &S,
) -> Option<f32> {
    let world = skeleton.world_transform(chain.bones()[index]);
    let inv = world.inverse();
    if !inv.is_finite() {
        return None;
    }

    let axis = chain.axis();
    let to_effector = axis.plane_angle(inv.transform_point3(chain.effector_point(skeleton)))?;
    let to_target = axis.plane_angle(inv.transform_point3(target))?;

    let diff = wrap_angle(to_target - to_effector) * chain.config().bend_sign;
    diff.is_finite().then_some(diff)
}

/// 所有骨骼都在 `[-(ext_soft - margin), curl_soft - margin]` 内
pub fn in_rearm_band<S: SkeletonProvider + ?Sized>(chain: &JointChain, skeleton: &S) -> bool {
    let config = chain.config();
    let upper = config.limits.positive_limits().soft - config.rearm_margin;
    let lower = -(config.limits.negative_limits().soft - config.rearm_margin);
    (0..chain.bone_count()).all(|i| {
        let angle = chain.relative_angle(skeleton, i);
        angle >= lower && angle <= upper
    })
}

/// 归一化到 [-PI, PI]
fn wrap_angle(angle: f32) -> f32 {
    let a = angle % TAU;
    if a > PI {
        a - TAU
    } else if a < -PI {
        a + TAU
    } else {
        a
    }
}
