//! # Object 模块
//!
//! 宿主对象接口定义。
//!
//! ## 核心概念
//!
//! - `ObjectId`: 由 `AnimationManager` 分配的唯一对象标识符
//! - `Animatable`: 宿主对象的属性读写接口（按名称）

use crate::value::AttrValue;

/// 对象唯一标识符
///
/// 由 `AnimationManager` 在对象注册时分配，保证全局唯一。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) u64);

impl ObjectId {
    /// 创建新的对象 ID（仅供 AnimationManager 内部使用）
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// 获取内部 ID 值
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

/// 宿主对象接口
///
/// 对象自己决定如何存储属性、写入时是否发出变更通知。
/// 方法接收 `&self`，实现方通过内部可变性保存状态，
/// 这样更新回调在写入属性时不会与其他借用冲突。
///
/// ## 实现示例
///
/// ```rust,ignore
/// struct Slider {
///     value: Cell<f64>,
/// }
///
/// impl Animatable for Slider {
///     fn get_attr(&self, name: &str) -> Option<AttrValue> {
///         match name {
///             "value" => Some(AttrValue::Number(self.value.get())),
///             _ => None,
///         }
///     }
///
///     fn set_attr(&self, name: &str, value: AttrValue) -> bool {
///         match (name, value) {
///             ("value", AttrValue::Number(v)) => { self.value.set(v); true }
///             _ => false,
///         }
///     }
/// }
/// ```
pub trait Animatable: 'static {
    /// 读取属性
    ///
    /// # 返回
    /// - `Some(value)`: 属性存在且已赋值
    /// - `None`: 属性不存在或尚未赋值
    fn get_attr(&self, name: &str) -> Option<AttrValue>;

    /// 写入属性
    ///
    /// 写入可能触发宿主自己的变更通知。
    ///
    /// # 返回
    /// - `true`: 写入成功
    /// - `false`: 属性不存在或值类型不被接受
    fn set_attr(&self, name: &str, value: AttrValue) -> bool;
}
