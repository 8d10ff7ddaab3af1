//! # Clock 模块
//!
//! 单线程协作式帧时钟。
//!
//! 每个订阅（`Trigger`）持有一个重复执行的回调，有两种状态：
//! - `Active`：下一次 `tick` 时执行回调
//! - `Dormant`：休眠，直到再次 `arm()`
//!
//! 回调返回 `TickResult::Stop` 时订阅转入休眠（但不会被销毁）。
//!
//! ```rust,ignore
//! let clock = FrameClock::new();
//! let trigger = clock.create_trigger(|dt| {
//!     // 推进动画 ...
//!     TickResult::Stop
//! });
//! trigger.arm();
//! clock.tick(1.0 / 60.0);
//! ```

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::trace;

/// 回调的返回值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickResult {
    /// 保持激活
    Continue,
    /// 请求休眠
    Stop,
}

/// 订阅状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubscriptionState {
    /// 下一帧执行
    Active,
    /// 休眠中
    #[default]
    Dormant,
}

type TickCallback = Box<dyn FnMut(f64) -> TickResult>;

struct Subscription {
    id: u64,
    state: Cell<SubscriptionState>,
    callback: RefCell<TickCallback>,
}

#[derive(Default)]
struct ClockInner {
    /// 按创建顺序排列
    subscriptions: BTreeMap<u64, Rc<Subscription>>,
    next_id: u64,
    frame: u64,
}

/// 帧时钟
///
/// 克隆得到的是同一个时钟的句柄。
#[derive(Clone, Default)]
pub struct FrameClock {
    inner: Rc<RefCell<ClockInner>>,
}

impl fmt::Debug for FrameClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("FrameClock")
            .field("frame", &inner.frame)
            .field("subscriptions", &inner.subscriptions.len())
            .finish()
    }
}

impl FrameClock {
    /// 创建新的帧时钟
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建重复订阅（初始为休眠状态）
    pub fn create_trigger<F>(&self, callback: F) -> Trigger
    where
        F: FnMut(f64) -> TickResult + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;

        let subscription = Rc::new(Subscription {
            id,
            state: Cell::new(SubscriptionState::Dormant),
            callback: RefCell::new(Box::new(callback)),
        });
        inner.subscriptions.insert(id, Rc::clone(&subscription));

        Trigger {
            subscription,
            clock: Rc::downgrade(&self.inner),
        }
    }

    /// 推进一帧
    ///
    /// 只执行本帧开始时处于激活状态的订阅；帧内新激活的订阅留到下一帧。
    ///
    /// # 返回
    /// 本帧执行的回调数量
    pub fn tick(&self, dt: f64) -> usize {
        let due: Vec<Rc<Subscription>> = {
            let mut inner = self.inner.borrow_mut();
            inner.frame += 1;
            inner
                .subscriptions
                .values()
                .filter(|s| s.state.get() == SubscriptionState::Active)
                .cloned()
                .collect()
        };

        let mut ran = 0;
        for subscription in due {
            // 可能在本帧更早的回调里被取消
            if !self.contains(subscription.id) {
                continue;
            }
            ran += 1;
            let result = {
                let mut callback = subscription.callback.borrow_mut();
                (*callback)(dt)
            };
            if result == TickResult::Stop {
                subscription.state.set(SubscriptionState::Dormant);
                trace!(subscription = subscription.id, "订阅转入休眠");
            }
        }
        ran
    }

    /// 已推进的帧数
    pub fn frame(&self) -> u64 {
        self.inner.borrow().frame
    }

    /// 激活中的订阅数量
    pub fn active_count(&self) -> usize {
        self.inner
            .borrow()
            .subscriptions
            .values()
            .filter(|s| s.state.get() == SubscriptionState::Active)
            .count()
    }

    /// 是否没有任何激活的订阅
    pub fn is_idle(&self) -> bool {
        self.active_count() == 0
    }

    /// 订阅总数（含休眠）
    pub fn subscription_count(&self) -> usize {
        self.inner.borrow().subscriptions.len()
    }

    fn contains(&self, id: u64) -> bool {
        self.inner.borrow().subscriptions.contains_key(&id)
    }
}

/// 订阅句柄
pub struct Trigger {
    subscription: Rc<Subscription>,
    clock: Weak<RefCell<ClockInner>>,
}

impl fmt::Debug for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trigger")
            .field("id", &self.subscription.id)
            .field("state", &self.subscription.state.get())
            .finish()
    }
}

impl Trigger {
    /// 激活订阅，保证下一帧至少执行一次回调
    pub fn arm(&self) {
        self.subscription.state.set(SubscriptionState::Active);
    }

    /// 当前状态
    pub fn state(&self) -> SubscriptionState {
        self.subscription.state.get()
    }

    /// 是否处于激活状态
    pub fn is_active(&self) -> bool {
        self.state() == SubscriptionState::Active
    }

    /// 从时钟上移除订阅
    pub fn cancel(&self) {
        self.subscription.state.set(SubscriptionState::Dormant);
        if let Some(clock) = self.clock.upgrade() {
            clock.borrow_mut().subscriptions.remove(&self.subscription.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_trigger(clock: &FrameClock, stop_after: usize) -> (Trigger, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let trigger = clock.create_trigger(move |_dt| {
            counter.set(counter.get() + 1);
            if counter.get() >= stop_after {
                TickResult::Stop
            } else {
                TickResult::Continue
            }
        });
        (trigger, calls)
    }

    #[test]
    fn test_trigger_starts_dormant() {
        let clock = FrameClock::new();
        let (trigger, calls) = counting_trigger(&clock, 1);

        assert_eq!(trigger.state(), SubscriptionState::Dormant);
        assert_eq!(clock.tick(0.1), 0);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_stop_deactivates_and_arm_reactivates() {
        let clock = FrameClock::new();
        let (trigger, calls) = counting_trigger(&clock, 2);

        trigger.arm();
        clock.tick(0.1);
        assert!(trigger.is_active());
        clock.tick(0.1);
        assert!(!trigger.is_active());
        clock.tick(0.1);
        assert_eq!(calls.get(), 2);

        trigger.arm();
        clock.tick(0.1);
        assert_eq!(calls.get(), 3);
        assert_eq!(clock.subscription_count(), 1);
    }

    #[test]
    fn test_arm_during_tick_runs_next_frame() {
        let clock = FrameClock::new();
        let (late, late_calls) = counting_trigger(&clock, 1);
        let late = Rc::new(late);

        let to_arm = Rc::clone(&late);
        let early = clock.create_trigger(move |_dt| {
            to_arm.arm();
            TickResult::Stop
        });

        early.arm();
        clock.tick(0.1);
        assert_eq!(late_calls.get(), 0);
        assert!(late.is_active());

        clock.tick(0.1);
        assert_eq!(late_calls.get(), 1);
        assert!(clock.is_idle());
    }

    #[test]
    fn test_cancel_removes_subscription() {
        let clock = FrameClock::new();
        let (trigger, calls) = counting_trigger(&clock, 10);

        trigger.arm();
        trigger.cancel();
        clock.tick(0.1);

        assert_eq!(calls.get(), 0);
        assert_eq!(clock.subscription_count(), 0);
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn test_callback_receives_dt() {
        let clock = FrameClock::new();
        let seen = Rc::new(Cell::new(0.0));
        let sink = Rc::clone(&seen);
        let trigger = clock.create_trigger(move |dt| {
            sink.set(dt);
            TickResult::Stop
        });

        trigger.arm();
        clock.tick(0.25);
        assert_eq!(seen.get(), 0.25);
    }
}
