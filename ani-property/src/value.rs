//! # Value 模块
//!
//! 宿主属性的值类型。
//!
//! - `Number`：标量
//! - `List`：可变、可共享的数字列表（克隆后共享同一块存储）
//! - `Tuple`：不可变的定长序列

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

/// 可共享的可变数字列表
///
/// 克隆只复制句柄，所有克隆指向同一块存储。
/// 原地变体的序列动画依赖这一点：它持有的就是宿主属性里的那一份列表。
#[derive(Clone, Default)]
pub struct SharedList(Rc<RefCell<Vec<f64>>>);

impl SharedList {
    /// 创建新的列表
    pub fn new(values: Vec<f64>) -> Self {
        Self(Rc::new(RefCell::new(values)))
    }

    /// 借用内容
    pub fn borrow(&self) -> Ref<'_, Vec<f64>> {
        self.0.borrow()
    }

    /// 可变借用内容
    pub fn borrow_mut(&self) -> RefMut<'_, Vec<f64>> {
        self.0.borrow_mut()
    }

    /// 复制当前内容
    pub fn to_vec(&self) -> Vec<f64> {
        self.0.borrow().clone()
    }

    /// 长度
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// 是否与另一个句柄指向同一块存储
    pub fn ptr_eq(&self, other: &SharedList) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for SharedList {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0.borrow() == *other.0.borrow()
    }
}

impl fmt::Debug for SharedList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.borrow().iter()).finish()
    }
}

impl From<Vec<f64>> for SharedList {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}

/// 属性值
#[derive(Debug, Clone)]
pub enum AttrValue {
    /// 标量
    Number(f64),
    /// 可变列表
    List(SharedList),
    /// 不可变定长序列
    Tuple(Rc<[f64]>),
}

/// 序列容器构造函数
///
/// 由重分配变体在每帧用计算结果构造新的容器。
pub type ContainerCtor = fn(Vec<f64>) -> AttrValue;

impl AttrValue {
    /// 构造不可变序列（重分配变体的默认容器）
    pub fn tuple(values: Vec<f64>) -> Self {
        Self::Tuple(values.into())
    }

    /// 构造可变列表
    pub fn list(values: Vec<f64>) -> Self {
        Self::List(SharedList::new(values))
    }

    /// 类型名称，用于错误信息
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::List(_) => "list",
            Self::Tuple(_) => "tuple",
        }
    }

    /// 获取标量值
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// 获取可变列表句柄
    pub fn as_list(&self) -> Option<&SharedList> {
        match self {
            Self::List(list) => Some(list),
            _ => None,
        }
    }

    /// 是否为序列
    pub fn is_sequence(&self) -> bool {
        matches!(self, Self::List(_) | Self::Tuple(_))
    }

    /// 复制序列分量；标量返回 `None`
    pub fn components(&self) -> Option<Vec<f64>> {
        match self {
            Self::Number(_) => None,
            Self::List(list) => Some(list.to_vec()),
            Self::Tuple(items) => Some(items.to_vec()),
        }
    }
}

/// 按内容比较：`List` 与 `Tuple` 内容相同即视为相等
impl PartialEq for AttrValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Number(_), _) | (_, Self::Number(_)) => false,
            _ => self.components() == other.components(),
        }
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<SharedList> for AttrValue {
    fn from(list: SharedList) -> Self {
        Self::List(list)
    }
}

fn write_components(f: &mut fmt::Formatter<'_>, open: &str, items: &[f64], close: &str) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, v) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{v}")?;
    }
    write!(f, "{close}")
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::List(list) => write_components(f, "[", &list.borrow(), "]"),
            Self::Tuple(items) => write_components(f, "(", items, ")"),
        }
    }
}
