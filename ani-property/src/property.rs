//! # Property 模块
//!
//! 动画属性描述符。
//!
//! 描述符挂在类（`ClassDef`）上，所有实例共享同一份配置：
//! - `AniNumericProperty`：标量属性
//! - `AniMutableSequenceProperty`：可变数字列表，原地修改后整体写回
//! - `AniSequenceProperty`：数字序列，每帧构造新的容器
//!
//! 读取目标属性时，若该属性正在动画中则返回目标值，否则返回真实属性的当前值。
//! 写入目标属性只登记目标值并激活帧订阅，真实属性在后续帧中逐步变化。

use tracing::debug;

use crate::binding::Binding;
use crate::config::{AniConfig, DEFAULT_SPEED, DEFAULT_THRESHOLD};
use crate::error::{AniError, AniResult};
use crate::manager::AnimationManager;
use crate::object::ObjectId;
use crate::step::{MutableSequenceEntry, NumericEntry, SequenceEntry};
use crate::value::{AttrValue, ContainerCtor};

/// 描述符类型
///
/// 每个对象对每种类型各有一个注册表和一个帧订阅。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimatorKind {
    /// 标量
    Numeric,
    /// 原地修改的可变序列
    MutableSequence,
    /// 每帧重新分配的序列
    Sequence,
}

impl AnimatorKind {
    /// 对应描述符的类型名
    pub fn descriptor_name(self) -> &'static str {
        match self {
            Self::Numeric => AniNumericProperty::TYPE_NAME,
            Self::MutableSequence => AniMutableSequenceProperty::TYPE_NAME,
            Self::Sequence => AniSequenceProperty::TYPE_NAME,
        }
    }
}

fn bound_target<'a>(binding: &'a Option<Binding>, descriptor: &'static str) -> AniResult<&'a str> {
    binding
        .as_ref()
        .map(Binding::target_attr)
        .ok_or(AniError::UnboundDescriptor { descriptor })
}

fn require_sequence(attr: &str, goal: &AttrValue) -> AniResult<()> {
    if goal.is_sequence() {
        Ok(())
    } else {
        Err(AniError::TypeMismatch {
            attr: attr.to_string(),
            expected: "sequence",
            actual: goal.type_name(),
        })
    }
}

/// 标量动画描述符
#[derive(Debug, Clone)]
pub struct AniNumericProperty {
    /// 收敛阈值
    pub threshold: f64,
    /// 逼近速度（1/秒）
    pub speed: f64,
    binding: Option<Binding>,
}

impl Default for AniNumericProperty {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            speed: DEFAULT_SPEED,
            binding: None,
        }
    }
}

impl AniNumericProperty {
    /// 类型名，用于错误信息与日志
    pub const TYPE_NAME: &'static str = "AniNumericProperty";

    /// 使用默认阈值与速度创建
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用配置中的阈值与速度创建
    pub fn from_config(config: &AniConfig) -> Self {
        Self::new()
            .with_threshold(config.threshold())
            .with_speed(config.speed)
    }

    /// 设置收敛阈值
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// 设置逼近速度
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// 绑定信息（未挂到类上时为 `None`）
    pub fn binding(&self) -> Option<&Binding> {
        self.binding.as_ref()
    }

    /// 读取目标属性
    pub fn get(&self, manager: &AnimationManager, id: ObjectId) -> AniResult<AttrValue> {
        let target = bound_target(&self.binding, Self::TYPE_NAME)?;
        manager.read_through::<NumericEntry>(id, target)
    }

    /// 写入目标值
    pub fn set(&self, manager: &mut AnimationManager, id: ObjectId, goal: AttrValue) -> AniResult<()> {
        let target = bound_target(&self.binding, Self::TYPE_NAME)?;
        let goal = goal.as_number().ok_or_else(|| AniError::TypeMismatch {
            attr: target.to_string(),
            expected: "number",
            actual: goal.type_name(),
        })?;

        debug!(object = %id, attr = target, goal, "设置标量目标值");
        manager.start(
            id,
            target,
            NumericEntry {
                goal,
                threshold: self.threshold,
                speed: self.speed,
            },
        )
    }

    /// 取消该对象上由本描述符驱动的动画
    pub fn cancel(&self, manager: &AnimationManager, id: ObjectId) -> bool {
        self.binding
            .as_ref()
            .is_some_and(|b| manager.cancel_entry::<NumericEntry>(id, b.target_attr()))
    }
}

/// 可变序列动画描述符
///
/// 赋值时捕获真实属性里的那份列表，之后每帧原地修改它，
/// 再把它整体写回属性，让宿主对象能收到变更通知。
#[derive(Debug, Clone)]
pub struct AniMutableSequenceProperty {
    /// 收敛阈值
    pub threshold: f64,
    /// 逼近速度（1/秒）
    pub speed: f64,
    binding: Option<Binding>,
}

impl Default for AniMutableSequenceProperty {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            speed: DEFAULT_SPEED,
            binding: None,
        }
    }
}

impl AniMutableSequenceProperty {
    /// 类型名，用于错误信息与日志
    pub const TYPE_NAME: &'static str = "AniMutableSequenceProperty";

    /// 使用默认阈值与速度创建
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用配置中的阈值与速度创建
    pub fn from_config(config: &AniConfig) -> Self {
        Self::new()
            .with_threshold(config.threshold())
            .with_speed(config.speed)
    }

    /// 设置收敛阈值
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// 设置逼近速度
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// 绑定信息（未挂到类上时为 `None`）
    pub fn binding(&self) -> Option<&Binding> {
        self.binding.as_ref()
    }

    /// 读取目标属性
    pub fn get(&self, manager: &AnimationManager, id: ObjectId) -> AniResult<AttrValue> {
        let target = bound_target(&self.binding, Self::TYPE_NAME)?;
        manager.read_through::<MutableSequenceEntry>(id, target)
    }

    /// 写入目标值
    ///
    /// 真实属性必须已经赋值且是可变列表。
    pub fn set(&self, manager: &mut AnimationManager, id: ObjectId, goal: AttrValue) -> AniResult<()> {
        let target = bound_target(&self.binding, Self::TYPE_NAME)?;
        require_sequence(target, &goal)?;

        let live = manager.read_target(id, target)?;
        let current = live.as_list().cloned().ok_or_else(|| AniError::TypeMismatch {
            attr: target.to_string(),
            expected: "list",
            actual: live.type_name(),
        })?;

        debug!(object = %id, attr = target, goal = %goal, "设置可变序列目标值");
        manager.start(
            id,
            target,
            MutableSequenceEntry {
                goal,
                current,
                threshold: self.threshold,
                speed: self.speed,
            },
        )
    }

    /// 取消该对象上由本描述符驱动的动画
    pub fn cancel(&self, manager: &AnimationManager, id: ObjectId) -> bool {
        self.binding.as_ref().is_some_and(|b| {
            manager.cancel_entry::<MutableSequenceEntry>(id, b.target_attr())
        })
    }
}

/// 序列动画描述符
///
/// 每帧重新读取真实属性，用 `container` 构造新的序列再写回。
#[derive(Debug, Clone)]
pub struct AniSequenceProperty {
    /// 收敛阈值
    pub threshold: f64,
    /// 逼近速度（1/秒）
    pub speed: f64,
    /// 容器构造函数，默认构造不可变序列
    pub container: ContainerCtor,
    binding: Option<Binding>,
}

impl Default for AniSequenceProperty {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            speed: DEFAULT_SPEED,
            container: AttrValue::tuple,
            binding: None,
        }
    }
}

impl AniSequenceProperty {
    /// 类型名，用于错误信息与日志
    pub const TYPE_NAME: &'static str = "AniSequenceProperty";

    /// 使用默认阈值、速度与容器创建
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用配置中的阈值与速度创建
    pub fn from_config(config: &AniConfig) -> Self {
        Self::new()
            .with_threshold(config.threshold())
            .with_speed(config.speed)
    }

    /// 设置收敛阈值
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// 设置逼近速度
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// 设置容器构造函数
    pub fn with_container(mut self, container: ContainerCtor) -> Self {
        self.container = container;
        self
    }

    /// 绑定信息（未挂到类上时为 `None`）
    pub fn binding(&self) -> Option<&Binding> {
        self.binding.as_ref()
    }

    /// 读取目标属性
    pub fn get(&self, manager: &AnimationManager, id: ObjectId) -> AniResult<AttrValue> {
        let target = bound_target(&self.binding, Self::TYPE_NAME)?;
        manager.read_through::<SequenceEntry>(id, target)
    }

    /// 写入目标值
    pub fn set(&self, manager: &mut AnimationManager, id: ObjectId, goal: AttrValue) -> AniResult<()> {
        let target = bound_target(&self.binding, Self::TYPE_NAME)?;
        require_sequence(target, &goal)?;

        debug!(object = %id, attr = target, goal = %goal, "设置序列目标值");
        manager.start(
            id,
            target,
            SequenceEntry {
                goal,
                threshold: self.threshold,
                speed: self.speed,
                container: self.container,
            },
        )
    }

    /// 取消该对象上由本描述符驱动的动画
    pub fn cancel(&self, manager: &AnimationManager, id: ObjectId) -> bool {
        self.binding
            .as_ref()
            .is_some_and(|b| manager.cancel_entry::<SequenceEntry>(id, b.target_attr()))
    }
}

/// 挂在类上的描述符
#[derive(Debug, Clone)]
pub enum Descriptor {
    Numeric(AniNumericProperty),
    MutableSequence(AniMutableSequenceProperty),
    Sequence(AniSequenceProperty),
}

impl From<AniNumericProperty> for Descriptor {
    fn from(property: AniNumericProperty) -> Self {
        Self::Numeric(property)
    }
}

impl From<AniMutableSequenceProperty> for Descriptor {
    fn from(property: AniMutableSequenceProperty) -> Self {
        Self::MutableSequence(property)
    }
}

impl From<AniSequenceProperty> for Descriptor {
    fn from(property: AniSequenceProperty) -> Self {
        Self::Sequence(property)
    }
}

impl Descriptor {
    /// 描述符类型
    pub fn kind(&self) -> AnimatorKind {
        match self {
            Self::Numeric(_) => AnimatorKind::Numeric,
            Self::MutableSequence(_) => AnimatorKind::MutableSequence,
            Self::Sequence(_) => AnimatorKind::Sequence,
        }
    }

    /// 描述符类型名
    pub fn type_name(&self) -> &'static str {
        self.kind().descriptor_name()
    }

    /// 收敛阈值
    pub fn threshold(&self) -> f64 {
        match self {
            Self::Numeric(p) => p.threshold,
            Self::MutableSequence(p) => p.threshold,
            Self::Sequence(p) => p.threshold,
        }
    }

    /// 逼近速度
    pub fn speed(&self) -> f64 {
        match self {
            Self::Numeric(p) => p.speed,
            Self::MutableSequence(p) => p.speed,
            Self::Sequence(p) => p.speed,
        }
    }

    /// 绑定信息
    pub fn binding(&self) -> Option<&Binding> {
        match self {
            Self::Numeric(p) => p.binding(),
            Self::MutableSequence(p) => p.binding(),
            Self::Sequence(p) => p.binding(),
        }
    }

    /// 真实属性名
    pub fn target_attr(&self) -> Option<&str> {
        self.binding().map(Binding::target_attr)
    }

    /// 按声明名称绑定
    pub(crate) fn bind_name(&mut self, name: &str) -> AniResult<()> {
        let binding = Binding::from_declared_name(self.type_name(), name)?;
        self.bind(binding);
        Ok(())
    }

    /// 显式绑定
    pub(crate) fn bind(&mut self, binding: Binding) {
        let slot = match self {
            Self::Numeric(p) => &mut p.binding,
            Self::MutableSequence(p) => &mut p.binding,
            Self::Sequence(p) => &mut p.binding,
        };
        *slot = Some(binding);
    }

    /// 读取目标属性
    pub fn get(&self, manager: &AnimationManager, id: ObjectId) -> AniResult<AttrValue> {
        match self {
            Self::Numeric(p) => p.get(manager, id),
            Self::MutableSequence(p) => p.get(manager, id),
            Self::Sequence(p) => p.get(manager, id),
        }
    }

    /// 写入目标值
    pub fn set(&self, manager: &mut AnimationManager, id: ObjectId, goal: AttrValue) -> AniResult<()> {
        match self {
            Self::Numeric(p) => p.set(manager, id, goal),
            Self::MutableSequence(p) => p.set(manager, id, goal),
            Self::Sequence(p) => p.set(manager, id, goal),
        }
    }

    /// 取消动画
    pub fn cancel(&self, manager: &AnimationManager, id: ObjectId) -> bool {
        match self {
            Self::Numeric(p) => p.cancel(manager, id),
            Self::MutableSequence(p) => p.cancel(manager, id),
            Self::Sequence(p) => p.cancel(manager, id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let numeric = AniNumericProperty::new();
        assert_eq!(numeric.threshold, 2.0);
        assert_eq!(numeric.speed, 10.0);
        assert!(numeric.binding().is_none());

        let sequence = AniSequenceProperty::new();
        assert_eq!((sequence.container)(vec![1.0, 2.0]), AttrValue::tuple(vec![1.0, 2.0]));
        assert!(matches!((sequence.container)(vec![1.0]), AttrValue::Tuple(_)));
    }

    #[test]
    fn test_builder() {
        let p = AniMutableSequenceProperty::new()
            .with_threshold(0.02)
            .with_speed(2.0);
        assert_eq!(p.threshold, 0.02);
        assert_eq!(p.speed, 2.0);

        let s = AniSequenceProperty::new().with_container(AttrValue::list);
        assert!(matches!((s.container)(vec![1.0]), AttrValue::List(_)));
    }

    #[test]
    fn test_descriptor_kind_and_name() {
        let d = Descriptor::from(AniNumericProperty::new());
        assert_eq!(d.kind(), AnimatorKind::Numeric);
        assert_eq!(d.type_name(), "AniNumericProperty");

        let d = Descriptor::from(AniMutableSequenceProperty::new());
        assert_eq!(d.type_name(), "AniMutableSequenceProperty");

        let d = Descriptor::from(AniSequenceProperty::new());
        assert_eq!(d.type_name(), "AniSequenceProperty");
    }

    #[test]
    fn test_bind_name() {
        let mut d = Descriptor::from(AniSequenceProperty::new());
        d.bind_name("_ani_pos").unwrap();
        assert_eq!(d.target_attr(), Some("pos"));

        let mut d = Descriptor::from(AniNumericProperty::new());
        let err = d.bind_name("width").unwrap_err();
        assert_eq!(
            err,
            AniError::InvalidName {
                descriptor: "AniNumericProperty",
                name: "width".to_string(),
            }
        );
        assert!(d.binding().is_none());
    }

    #[test]
    fn test_from_config() {
        let config = AniConfig {
            threshold_dp: 1.0,
            density: 2.0,
            speed: 4.0,
            ..AniConfig::default()
        };
        let p = AniNumericProperty::from_config(&config);
        assert_eq!(p.threshold, 2.0);
        assert_eq!(p.speed, 4.0);
    }
}
