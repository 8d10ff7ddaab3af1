//! # ani-property
//!
//! UI 控件属性的平滑过渡（tweening）。
//!
//! 调用方给带前缀的目标值属性赋值（如 `ani_width`），之后每一帧真实属性（`width`）
//! 都按剩余距离成比例地向目标值逼近，距离小于阈值时直接落到目标值并结束。
//!
//! ## 核心概念
//!
//! - `ClassDef`: 类定义，描述符挂在类上，由所有实例共享
//! - `AniNumericProperty` / `AniMutableSequenceProperty` / `AniSequenceProperty`: 三种描述符
//! - `AnimationManager`: 对象侧表，保存每个对象的活跃动画注册表与帧订阅
//! - `FrameClock`: 单线程帧时钟，驱动更新步骤
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! let mut class = ClassDef::widget();
//! install(&mut class, "ani_")?;
//!
//! let clock = FrameClock::new();
//! let mut manager = AnimationManager::new(clock.clone());
//! let id = manager.register(Rc::new(Widget::new()), Rc::new(class));
//!
//! manager.set_attr(id, "ani_width", AttrValue::Number(300.0))?;
//! while !clock.is_idle() {
//!     clock.tick(1.0 / 60.0);
//! }
//! ```

pub mod binding;
pub mod class;
pub mod clock;
pub mod config;
pub mod error;
pub mod install;
pub mod manager;
pub mod object;
pub mod property;
pub mod step;
pub mod value;
pub mod widget;

pub use binding::{Binding, PREFIX, PRIVATE_PREFIX};
pub use class::{ClassDef, add_bound_property, add_property};
pub use clock::{FrameClock, SubscriptionState, TickResult, Trigger};
pub use config::{AniConfig, DEFAULT_SPEED, DEFAULT_THRESHOLD, dp};
pub use error::{AniError, AniResult, ConfigError};
pub use install::{NUMERIC_PROPERTIES, SEQUENCE_PROPERTIES, install, install_with_config};
pub use manager::AnimationManager;
pub use object::{Animatable, ObjectId};
pub use property::{
    AniMutableSequenceProperty, AniNumericProperty, AniSequenceProperty, AnimatorKind, Descriptor,
};
pub use step::{Approach, approach};
pub use value::{AttrValue, ContainerCtor, SharedList};
pub use widget::{WIDGET_ATTRS, Widget};
