//! 关节咔哒求解器：每帧分派拖拽并回弹空闲链

use glam::Vec3;
use std::time::Duration;

use crate::chain::{ChainId, ChainRegistry, DriveMode, JointChain};
use crate::config::SolverConfig;
use crate::feedback::EventSink;
use crate::skeleton::SkeletonProvider;
use crate::solver::{
    BoneSolveResult, ChainSolveReport, ChainState, CrackStateMachine, DragAccumulator, DragInput, Drive,
    InputMapper, IterativeAngleSolver, LimitEvaluator, RelaxationController, Target, Zone,
};

/// 当前被拖拽的链
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveDrag {
    pub chain: ChainId,
    pub input: DragInput,
}

/// 一帧的输入
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickInput {
    /// 单调时间（任意起点）
    pub now: Duration,
    /// 同一帧最多一条活动链，松手即为 `None`
    pub active: Option<ActiveDrag>,
}

impl TickInput {
    pub fn idle(now: Duration) -> Self {
        Self { now, active: None }
    }

    pub fn drag(now: Duration, chain: ChainId, input: DragInput) -> Self {
        Self {
            now,
            active: Some(ActiveDrag { chain, input }),
        }
    }
}

/// 一帧的输出
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// 活动链的求解结果，没有活动链或输入被跳过时为 `None`
    pub active: Option<ChainSolveReport>,
    /// 本帧回弹到位的链
    pub settled: Vec<ChainId>,
}

impl TickReport {
    pub fn fired(&self) -> bool {
        self.active.as_ref().map_or(false, |r| r.fired)
    }
}

/// 关节咔哒求解器
///
/// 持有注册表、每条链的状态和咔哒状态机；骨骼由调用方每帧传入。
pub struct CrackRig {
    registry: ChainRegistry,
    states: Vec<ChainState>,
    cracks: CrackStateMachine,
    solver: IterativeAngleSolver,
    relax: RelaxationController,
    config: SolverConfig,
}

impl CrackRig {
    /// 创建并记录每条链目标点的初始位置
    pub fn new<S: SkeletonProvider + ?Sized>(registry: ChainRegistry, skeleton: &S, config: SolverConfig) -> Self {
        let states = registry
            .iter()
            .map(|chain| {
                let rest = match chain.config().drive {
                    DriveMode::Displacement => chain.effector_point(skeleton),
                    DriveMode::ScreenDrag { .. } => skeleton.world_position(chain.effector()),
                };
                if !rest.is_finite() {
                    log::warn!("关节链 {} 没有有效的初始位置，将被忽略", chain.name());
                }
                ChainState::new(Target::new(rest))
            })
            .collect();

        log::info!("CrackRig 初始化完成: {} 条关节链", registry.len());

        Self {
            cracks: CrackStateMachine::new(registry.len(), &config),
            solver: IterativeAngleSolver::new(config.iterations),
            relax: RelaxationController::new(&config),
            registry,
            states,
            config,
        }
    }

    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// 按配置的像素缩放创建屏幕拖拽累积器
    pub fn drag_accumulator(&self) -> DragAccumulator {
        DragAccumulator::from(&self.config)
    }

    pub fn cracks(&self) -> &CrackStateMachine {
        &self.cracks
    }

    pub fn state(&self, chain: ChainId) -> Option<&ChainState> {
        self.states.get(chain.0)
    }

    pub fn zone(&self, chain: ChainId) -> Zone {
        self.state(chain).map_or(Zone::Free, |s| s.zone)
    }

    /// 推进一帧
    pub fn update<S, E>(&mut self, skeleton: &mut S, input: &TickInput, sink: &mut E) -> TickReport
    where
        S: SkeletonProvider + ?Sized,
        E: EventSink + ?Sized,
    {
        self.cracks.update_effects(input.now, skeleton);

        let mut report = TickReport::default();
        let active = input.active.and_then(|drag| {
            if self.registry.get(drag.chain).is_none() {
                log::warn!("未知的关节链 {:?}，忽略本帧拖拽", drag.chain);
                return None;
            }
            Some(drag)
        });

        if let Some(drag) = active {
            report.active = self.drive(drag, input.now, skeleton, sink);
        }

        for chain in self.registry.iter() {
            if active.map_or(false, |d| d.chain == chain.id()) {
                continue;
            }
            let state = &mut self.states[chain.id().0];
            if state.target.rest().is_none() {
                continue;
            }
            let was_settled = state.zone == Zone::Free && state.prev_angle == 0.0;
            if self.relax.relax(chain, state, skeleton, &mut self.cracks) && !was_settled {
                report.settled.push(chain.id());
            }
        }

        report
    }

    fn drive<S, E>(&mut self, drag: ActiveDrag, now: Duration, skeleton: &mut S, sink: &mut E) -> Option<ChainSolveReport>
    where
        S: SkeletonProvider + ?Sized,
        E: EventSink + ?Sized,
    {
        let chain = self.registry.get(drag.chain)?;
        let state = &mut self.states[drag.chain.0];
        if state.target.rest().is_none() {
            return None;
        }

        let Some(drive) = InputMapper::map(chain, drag.input) else {
            log::warn!("关节链 {} 收到不匹配的拖拽输入，已跳过", chain.name());
            return None;
        };

        let report = match drive {
            Drive::Target(target) => {
                state.target.set_position(target);
                let report = self.solver.solve(chain, target, now, skeleton, &mut self.cracks, sink);
                state.zone = report.zone;
                state.prev_angle = report.bones.first().map_or(0.0, |b| b.realized_angle);
                report
            }
            Drive::Scalar(value) => drive_scalar(
                chain,
                state,
                value,
                now,
                self.config.drag_follow,
                skeleton,
                &mut self.cracks,
                sink,
            ),
        };
        Some(report)
    }
}

/// 单骨骼（标量驱动）路径
#[allow(clippy::too_many_arguments)]
fn drive_scalar<S, E>(
    chain: &JointChain,
    state: &mut ChainState,
    drive: f32,
    now: Duration,
    follow: f32,
    skeleton: &mut S,
    cracks: &mut CrackStateMachine,
    sink: &mut E,
) -> ChainSolveReport
where
    S: SkeletonProvider + ?Sized,
    E: EventSink + ?Sized,
{
    let config = chain.config();
    let evaluator = LimitEvaluator::new(config.limits, config.resistance_gain, config.rearm_margin);
    let result = evaluator.evaluate(drive, state.zone, state.prev_angle);

    let mut fired = false;
    if result.crossed {
        let position: Vec3 = skeleton.world_position(chain.effector());
        fired = cracks.request(chain, position, now, skeleton, sink);
    }
    if result.zone != Zone::Locked && evaluator.in_rearm_band(result.angle) && cracks.rearm(chain.id()) {
        log::debug!("关节链 {} 已重置", chain.name());
    }

    state.zone = result.zone;
    state.prev_angle = result.angle;

    let bones = (0..chain.bone_count())
        .map(|i| {
            let weight = chain.weights()[i];
            let goal = result.angle * weight;
            let current = chain.relative_angle(skeleton, i);
            let realized = current + (goal - current) * follow;
            chain.write_relative_angle(skeleton, i, realized);
            BoneSolveResult {
                bone: chain.bones()[i],
                intent_angle: drive * weight,
                realized_angle: realized,
            }
        })
        .collect();

    ChainSolveReport {
        chain: chain.id(),
        zone: result.zone,
        bones,
        fired,
    }
}
