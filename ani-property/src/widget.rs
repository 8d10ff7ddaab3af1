//! # Widget 模块
//!
//! 内置的宿主控件，作为批量安装的目标。
//!
//! 几何属性只存储 `x, y, width, height`，其余属性由它们派生：
//!
//! | 属性 | 读取 | 写入 |
//! |------|------|------|
//! | `right` | `x + width` | 移动 `x` |
//! | `top` | `y + height` | 移动 `y` |
//! | `center_x` / `center_y` | 中心点 | 移动 `x` / `y` |
//! | `pos` / `size` / `center` | 新的二元列表 | 接受至少两个分量的序列 |

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::object::Animatable;
use crate::value::AttrValue;

/// `Widget` 的基础属性
pub const WIDGET_ATTRS: &[&str] = &[
    "x", "y", "width", "height", "opacity", "right", "top", "center_x", "center_y", "pos", "size",
    "center",
];

type Observer = Rc<dyn Fn(&str, &AttrValue)>;

/// 宿主控件
pub struct Widget {
    x: Cell<f64>,
    y: Cell<f64>,
    width: Cell<f64>,
    height: Cell<f64>,
    opacity: Cell<f64>,
    /// 用户自定义属性（未赋值时读取返回 `None`）
    extra: RefCell<IndexMap<String, AttrValue>>,
    observers: RefCell<Vec<Observer>>,
}

impl Default for Widget {
    fn default() -> Self {
        Self {
            x: Cell::new(0.0),
            y: Cell::new(0.0),
            width: Cell::new(100.0),
            height: Cell::new(100.0),
            opacity: Cell::new(1.0),
            extra: RefCell::default(),
            observers: RefCell::default(),
        }
    }
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("x", &self.x.get())
            .field("y", &self.y.get())
            .field("width", &self.width.get())
            .field("height", &self.height.get())
            .field("opacity", &self.opacity.get())
            .field("extra", &self.extra.borrow())
            .finish()
    }
}

fn pair(value: &AttrValue) -> Option<(f64, f64)> {
    match value.components()?.as_slice() {
        [a, b, ..] => Some((*a, *b)),
        _ => None,
    }
}

impl Widget {
    /// 创建默认控件（100×100，位于原点，不透明）
    pub fn new() -> Self {
        Self::default()
    }

    pub fn x(&self) -> f64 {
        self.x.get()
    }

    pub fn y(&self) -> f64 {
        self.y.get()
    }

    pub fn width(&self) -> f64 {
        self.width.get()
    }

    pub fn height(&self) -> f64 {
        self.height.get()
    }

    pub fn opacity(&self) -> f64 {
        self.opacity.get()
    }

    /// 注册变更观察者
    ///
    /// 每次 `set_attr` 成功后按注册顺序调用，参数为属性名和写入的值。
    /// 观察者可以在回调中再次写入属性或注册新的观察者。
    pub fn bind(&self, observer: impl Fn(&str, &AttrValue) + 'static) {
        self.observers.borrow_mut().push(Rc::new(observer));
    }

    fn notify(&self, name: &str, value: &AttrValue) {
        let observers: Vec<Observer> = self.observers.borrow().clone();
        for observer in observers {
            observer(name, value);
        }
    }

    fn store(&self, name: &str, value: &AttrValue) -> bool {
        if let Some(n) = value.as_number() {
            let cell = match name {
                "x" => Some(&self.x),
                "y" => Some(&self.y),
                "width" => Some(&self.width),
                "height" => Some(&self.height),
                "opacity" => Some(&self.opacity),
                _ => None,
            };
            if let Some(cell) = cell {
                cell.set(n);
                return true;
            }
            match name {
                "right" => self.x.set(n - self.width.get()),
                "top" => self.y.set(n - self.height.get()),
                "center_x" => self.x.set(n - self.width.get() / 2.0),
                "center_y" => self.y.set(n - self.height.get() / 2.0),
                _ => return self.store_extra(name, value),
            }
            return true;
        }

        match name {
            "x" | "y" | "width" | "height" | "opacity" | "right" | "top" | "center_x"
            | "center_y" => false,
            "pos" | "size" | "center" => {
                let Some((a, b)) = pair(value) else {
                    return false;
                };
                match name {
                    "pos" => {
                        self.x.set(a);
                        self.y.set(b);
                    }
                    "size" => {
                        self.width.set(a);
                        self.height.set(b);
                    }
                    _ => {
                        self.x.set(a - self.width.get() / 2.0);
                        self.y.set(b - self.height.get() / 2.0);
                    }
                }
                true
            }
            _ => self.store_extra(name, value),
        }
    }

    fn store_extra(&self, name: &str, value: &AttrValue) -> bool {
        if WIDGET_ATTRS.contains(&name) {
            return false;
        }
        self.extra
            .borrow_mut()
            .insert(name.to_string(), value.clone());
        true
    }
}

impl Animatable for Widget {
    fn get_attr(&self, name: &str) -> Option<AttrValue> {
        let (x, y) = (self.x.get(), self.y.get());
        let (w, h) = (self.width.get(), self.height.get());
        let value = match name {
            "x" => AttrValue::Number(x),
            "y" => AttrValue::Number(y),
            "width" => AttrValue::Number(w),
            "height" => AttrValue::Number(h),
            "opacity" => AttrValue::Number(self.opacity.get()),
            "right" => AttrValue::Number(x + w),
            "top" => AttrValue::Number(y + h),
            "center_x" => AttrValue::Number(x + w / 2.0),
            "center_y" => AttrValue::Number(y + h / 2.0),
            "pos" => AttrValue::list(vec![x, y]),
            "size" => AttrValue::list(vec![w, h]),
            "center" => AttrValue::list(vec![x + w / 2.0, y + h / 2.0]),
            _ => return self.extra.borrow().get(name).cloned(),
        };
        Some(value)
    }

    fn set_attr(&self, name: &str, value: AttrValue) -> bool {
        if !self.store(name, &value) {
            return false;
        }
        self.notify(name, &value);
        true
    }
}
