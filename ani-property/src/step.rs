//! # Step 模块
//!
//! 每帧的推进算法。
//!
//! 所有变体共用同一条收敛规则（按分量）：
//!
//! ```text
//! diff = goal - current
//! if |diff| > threshold && dt * speed < 1.0:
//!     current + diff * dt * speed      // 按剩余距离成比例逼近
//! else:
//!     goal                             // 直接落到目标值，结束
//! ```
//!
//! - 标量：对单个值应用规则
//! - 原地序列：逐分量修改捕获的列表，再整体写回以触发变更通知
//! - 重分配序列：每帧重新读取当前值，用容器构造函数生成新序列

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::clock::TickResult;
use crate::error::{AniError, AniResult};
use crate::object::{Animatable, ObjectId};
use crate::property::AnimatorKind;
use crate::value::{AttrValue, ContainerCtor, SharedList};

/// 单步结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Approach {
    /// 仍在逼近
    Moving(f64),
    /// 已到达目标
    Arrived(f64),
}

impl Approach {
    /// 本步的新值
    pub fn value(self) -> f64 {
        match self {
            Self::Moving(v) | Self::Arrived(v) => v,
        }
    }

    /// 是否已到达
    pub fn is_arrived(self) -> bool {
        matches!(self, Self::Arrived(_))
    }
}

/// 收敛规则
pub fn approach(current: f64, goal: f64, threshold: f64, speed: f64, dt: f64) -> Approach {
    let diff = goal - current;
    let p = dt * speed;
    if diff.abs() > threshold && p < 1.0 {
        Approach::Moving(current + diff * p)
    } else {
        Approach::Arrived(goal)
    }
}

/// 原地推进序列
///
/// 按位置配对，较短的一方决定长度；`diff == 0` 的分量跳过。
///
/// # 返回
/// 是否有分量发生了变化
pub fn step_in_place(current: &mut [f64], goal: &[f64], threshold: f64, speed: f64, dt: f64) -> bool {
    let mut any_updates = false;
    for (cur, &target) in current.iter_mut().zip(goal) {
        if target - *cur == 0.0 {
            continue;
        }
        any_updates = true;
        *cur = approach(*cur, target, threshold, speed, dt).value();
    }
    any_updates
}

/// 重分配推进序列
///
/// # 返回
/// - `Some(values)`: 至少一个分量变化，返回新的分量
/// - `None`: 本帧没有任何变化
pub fn step_reallocating(
    current: &[f64],
    goal: &[f64],
    threshold: f64,
    speed: f64,
    dt: f64,
) -> Option<Vec<f64>> {
    let mut any_updates = false;
    let values = current
        .iter()
        .zip(goal)
        .map(|(&cur, &target)| {
            if target - cur == 0.0 {
                cur
            } else {
                any_updates = true;
                approach(cur, target, threshold, speed, dt).value()
            }
        })
        .collect();
    any_updates.then_some(values)
}

/// 条目推进结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Progress {
    Running,
    Finished,
}

/// 活跃动画条目
pub(crate) trait ActiveEntry: Clone + 'static {
    const KIND: AnimatorKind;

    /// 正在逼近的目标值
    fn goal(&self) -> AttrValue;

    /// 推进一帧并写回真实属性
    fn advance(&self, id: ObjectId, object: &dyn Animatable, attr: &str, dt: f64)
    -> AniResult<Progress>;
}

/// 标量条目
#[derive(Debug, Clone)]
pub(crate) struct NumericEntry {
    pub goal: f64,
    pub threshold: f64,
    pub speed: f64,
}

/// 原地序列条目
#[derive(Debug, Clone)]
pub(crate) struct MutableSequenceEntry {
    pub goal: AttrValue,
    /// 赋值时捕获的宿主列表，之后每帧直接修改它
    pub current: SharedList,
    pub threshold: f64,
    pub speed: f64,
}

/// 重分配序列条目
#[derive(Debug, Clone)]
pub(crate) struct SequenceEntry {
    pub goal: AttrValue,
    pub threshold: f64,
    pub speed: f64,
    pub container: ContainerCtor,
}

fn read_attr(id: ObjectId, object: &dyn Animatable, attr: &str) -> AniResult<AttrValue> {
    object.get_attr(attr).ok_or_else(|| AniError::AttributeMissing {
        object: id,
        attr: attr.to_string(),
    })
}

fn write_attr(id: ObjectId, object: &dyn Animatable, attr: &str, value: AttrValue) -> AniResult<()> {
    if object.set_attr(attr, value) {
        Ok(())
    } else {
        Err(AniError::WriteRejected {
            object: id,
            attr: attr.to_string(),
        })
    }
}

fn sequence_components(attr: &str, value: &AttrValue) -> AniResult<Vec<f64>> {
    value.components().ok_or_else(|| AniError::TypeMismatch {
        attr: attr.to_string(),
        expected: "sequence",
        actual: value.type_name(),
    })
}

impl ActiveEntry for NumericEntry {
    const KIND: AnimatorKind = AnimatorKind::Numeric;

    fn goal(&self) -> AttrValue {
        AttrValue::Number(self.goal)
    }

    fn advance(
        &self,
        id: ObjectId,
        object: &dyn Animatable,
        attr: &str,
        dt: f64,
    ) -> AniResult<Progress> {
        let value = read_attr(id, object, attr)?;
        let current = value.as_number().ok_or_else(|| AniError::TypeMismatch {
            attr: attr.to_string(),
            expected: "number",
            actual: value.type_name(),
        })?;

        let step = approach(current, self.goal, self.threshold, self.speed, dt);
        write_attr(id, object, attr, AttrValue::Number(step.value()))?;

        Ok(if step.is_arrived() {
            Progress::Finished
        } else {
            Progress::Running
        })
    }
}

impl ActiveEntry for MutableSequenceEntry {
    const KIND: AnimatorKind = AnimatorKind::MutableSequence;

    fn goal(&self) -> AttrValue {
        self.goal.clone()
    }

    fn advance(
        &self,
        id: ObjectId,
        object: &dyn Animatable,
        attr: &str,
        dt: f64,
    ) -> AniResult<Progress> {
        let goal = sequence_components(attr, &self.goal)?;
        let any_updates = {
            let mut current = self.current.borrow_mut();
            step_in_place(&mut current, &goal, self.threshold, self.speed, dt)
        };

        if !any_updates {
            return Ok(Progress::Finished);
        }
        // 原地修改不会经过宿主的 set_attr，需要整体写回一次
        write_attr(id, object, attr, AttrValue::List(self.current.clone()))?;
        Ok(Progress::Running)
    }
}

impl ActiveEntry for SequenceEntry {
    const KIND: AnimatorKind = AnimatorKind::Sequence;

    fn goal(&self) -> AttrValue {
        self.goal.clone()
    }

    fn advance(
        &self,
        id: ObjectId,
        object: &dyn Animatable,
        attr: &str,
        dt: f64,
    ) -> AniResult<Progress> {
        let goal = sequence_components(attr, &self.goal)?;
        let current = sequence_components(attr, &read_attr(id, object, attr)?)?;

        match step_reallocating(&current, &goal, self.threshold, self.speed, dt) {
            Some(values) => {
                write_attr(id, object, attr, (self.container)(values))?;
                Ok(Progress::Running)
            }
            None => Ok(Progress::Finished),
        }
    }
}

/// 注册表中的一项
///
/// `serial` 在每次赋值时递增，用来区分帧内被覆盖或取消的条目。
#[derive(Debug, Clone)]
pub(crate) struct Slot<E> {
    pub serial: u64,
    pub entry: E,
}

/// 对象级活跃动画注册表（按插入顺序）
pub(crate) type Registry<E> = Rc<RefCell<IndexMap<String, Slot<E>>>>;

fn is_live<E>(registry: &Registry<E>, attr: &str, serial: u64) -> bool {
    registry
        .borrow()
        .get(attr)
        .is_some_and(|slot| slot.serial == serial)
}

/// 更新步骤：由帧时钟每帧调用一次
///
/// 遍历注册表的快照；帧内新赋的目标值要到下一帧才生效，
/// 帧内被取消的条目不再推进。
pub(crate) fn update_step<E: ActiveEntry>(
    id: ObjectId,
    object: &dyn Animatable,
    registry: &Registry<E>,
    dt: f64,
) -> TickResult {
    let snapshot: Vec<(String, Slot<E>)> = registry
        .borrow()
        .iter()
        .map(|(attr, slot)| (attr.clone(), slot.clone()))
        .collect();

    for (attr, slot) in snapshot {
        if !is_live(registry, &attr, slot.serial) {
            continue;
        }

        let finished = match slot.entry.advance(id, object, &attr, dt) {
            Ok(Progress::Running) => false,
            Ok(Progress::Finished) => {
                debug!(object = %id, attr = %attr, kind = ?E::KIND, "动画完成");
                true
            }
            Err(e) => {
                warn!(object = %id, attr = %attr, error = %e, "动画更新失败，放弃该属性");
                true
            }
        };

        if finished && is_live(registry, &attr, slot.serial) {
            registry.borrow_mut().shift_remove(&attr);
        }
    }

    if registry.borrow().is_empty() {
        TickResult::Stop
    } else {
        TickResult::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approach_moves_proportionally() {
        assert_eq!(approach(0.0, 100.0, 2.0, 10.0, 0.05), Approach::Moving(50.0));
        assert_eq!(approach(50.0, 100.0, 2.0, 10.0, 0.05), Approach::Moving(75.0));
        assert_eq!(approach(100.0, 0.0, 2.0, 10.0, 0.05), Approach::Moving(50.0));
    }

    #[test]
    fn test_approach_snaps_within_threshold() {
        assert_eq!(approach(98.5, 100.0, 2.0, 10.0, 0.05), Approach::Arrived(100.0));
        assert_eq!(approach(98.0, 100.0, 2.0, 10.0, 0.05), Approach::Arrived(100.0));
    }

    #[test]
    fn test_approach_snaps_on_large_step() {
        // dt * speed >= 1 时直接落到目标，避免越过目标
        assert_eq!(approach(0.0, 100.0, 2.0, 10.0, 0.1), Approach::Arrived(100.0));
        assert_eq!(approach(0.0, 100.0, 2.0, 10.0, 0.5), Approach::Arrived(100.0));
    }

    #[test]
    fn test_scalar_sequence_of_steps() {
        let mut value = 0.0;
        let mut steps = Vec::new();
        loop {
            let step = approach(value, 100.0, 2.0, 10.0, 0.05);
            value = step.value();
            steps.push(value);
            if step.is_arrived() {
                break;
            }
        }
        assert_eq!(steps, vec![50.0, 75.0, 87.5, 93.75, 96.875, 98.4375, 100.0]);
    }

    #[test]
    fn test_step_in_place_pairs_elementwise() {
        let mut current = vec![2.0, 4.0];
        let changed = step_in_place(&mut current, &[3.0, 1.0], 0.0, 10.0, 0.05);

        assert!(changed);
        assert_eq!(current, vec![2.5, 2.5]);
    }

    #[test]
    fn test_step_in_place_skips_equal_components() {
        let mut current = vec![3.0, 4.0];
        let changed = step_in_place(&mut current, &[3.0, 0.0], 0.0, 10.0, 0.05);

        assert!(changed);
        assert_eq!(current, vec![3.0, 2.0]);

        let mut settled = vec![3.0, 0.0];
        assert!(!step_in_place(&mut settled, &[3.0, 0.0], 0.0, 10.0, 0.05));
    }

    #[test]
    fn test_step_in_place_ignores_trailing_elements() {
        let mut current = vec![0.0, 0.0, 7.0];
        step_in_place(&mut current, &[10.0, 10.0], 2.0, 10.0, 0.05);
        assert_eq!(current, vec![5.0, 5.0, 7.0]);

        let mut short = vec![0.0];
        step_in_place(&mut short, &[10.0, 10.0, 10.0], 2.0, 10.0, 0.05);
        assert_eq!(short, vec![5.0]);
    }

    #[test]
    fn test_step_reallocating() {
        let next = step_reallocating(&[2.0, 4.0], &[3.0, 1.0], 0.0, 10.0, 0.05);
        assert_eq!(next, Some(vec![2.5, 2.5]));

        let next = step_reallocating(&[0.0, 5.0, 9.0], &[10.0, 5.0], 2.0, 10.0, 0.05);
        assert_eq!(next, Some(vec![5.0, 5.0]));

        assert_eq!(step_reallocating(&[1.0, 2.0], &[1.0, 2.0], 0.0, 10.0, 0.05), None);
    }
}
