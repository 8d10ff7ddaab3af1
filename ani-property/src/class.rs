//! # Class 模块
//!
//! 类定义：宿主类的基础属性表，以及挂在类上的动画描述符。
//!
//! 描述符有两种挂载方式，绑定规则完全相同：
//! - 静态声明：`ClassDef::define` 一次性声明所有成员
//! - 动态注册：`add_property` 挂到已存在的类上

use indexmap::IndexMap;
use tracing::debug;

use crate::binding::Binding;
use crate::error::AniResult;
use crate::property::Descriptor;
use crate::widget::WIDGET_ATTRS;

/// 类定义
#[derive(Debug, Clone)]
pub struct ClassDef {
    name: String,
    /// 基础属性名
    attrs: Vec<String>,
    /// 目标属性名 -> 描述符（按声明顺序）
    properties: IndexMap<String, Descriptor>,
}

impl ClassDef {
    /// 创建没有任何属性的类
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            properties: IndexMap::new(),
        }
    }

    /// 声明基础属性
    pub fn with_attrs<I, S>(mut self, attrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attrs.extend(attrs.into_iter().map(Into::into));
        self
    }

    /// 静态声明：在定义类时同时声明描述符成员
    ///
    /// 任一成员名称不合法时整个类定义失败。
    pub fn define<I, S>(name: impl Into<String>, attrs: &[&str], members: I) -> AniResult<Self>
    where
        I: IntoIterator<Item = (S, Descriptor)>,
        S: AsRef<str>,
    {
        let mut class = Self::new(name).with_attrs(attrs.iter().copied());
        for (member, descriptor) in members {
            add_property(&mut class, member.as_ref(), descriptor)?;
        }
        Ok(class)
    }

    /// 内置 `Widget` 的类定义（只含基础属性）
    pub fn widget() -> Self {
        Self::new("Widget").with_attrs(WIDGET_ATTRS.iter().copied())
    }

    /// 类名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 是否声明了某个基础属性
    pub fn has_attr(&self, attr: &str) -> bool {
        self.attrs.iter().any(|a| a == attr)
    }

    /// 基础属性列表
    pub fn attrs(&self) -> &[String] {
        &self.attrs
    }

    /// 在类上读取描述符
    ///
    /// 返回的就是描述符本身，而不是某个实例上的值。
    pub fn descriptor(&self, name: &str) -> Option<&Descriptor> {
        self.properties.get(name)
    }

    /// 所有描述符（按声明顺序）
    pub fn descriptors(&self) -> impl Iterator<Item = (&str, &Descriptor)> {
        self.properties.iter().map(|(name, d)| (name.as_str(), d))
    }
}

/// 动态注册：把描述符挂到已存在的类上
///
/// 与静态声明走同一套名称绑定，失败时返回相同的错误。
pub fn add_property(class: &mut ClassDef, name: &str, descriptor: impl Into<Descriptor>) -> AniResult<()> {
    let mut descriptor = descriptor.into();
    descriptor.bind_name(name)?;
    insert(class, name.to_string(), descriptor);
    Ok(())
}

/// 显式绑定：不解析名称，直接给出目标值属性名与真实属性名
pub fn add_bound_property(class: &mut ClassDef, binding: Binding, descriptor: impl Into<Descriptor>) {
    let mut descriptor = descriptor.into();
    let name = binding.goal_attr().to_string();
    descriptor.bind(binding);
    insert(class, name, descriptor);
}

fn insert(class: &mut ClassDef, name: String, descriptor: Descriptor) {
    debug!(
        class = %class.name,
        name = %name,
        kind = descriptor.type_name(),
        "注册动画描述符"
    );
    class.properties.insert(name, descriptor);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AniError;
    use crate::property::{AniMutableSequenceProperty, AniNumericProperty, AnimatorKind};

    #[test]
    fn test_widget_class() {
        let class = ClassDef::widget();
        assert_eq!(class.name(), "Widget");
        assert!(class.has_attr("width"));
        assert!(class.has_attr("center"));
        assert!(!class.has_attr("ani_width"));
        assert_eq!(class.attrs().len(), WIDGET_ATTRS.len());
        assert_eq!(class.attrs()[0], "x");
    }

    #[test]
    fn test_define_binds_members() {
        let class = ClassDef::define(
            "Slider",
            &["value", "track"],
            [
                ("ani_value", Descriptor::from(AniNumericProperty::new())),
                (
                    "_ani_track",
                    Descriptor::from(AniMutableSequenceProperty::new()),
                ),
            ],
        )
        .unwrap();

        let value = class.descriptor("ani_value").unwrap();
        assert_eq!(value.kind(), AnimatorKind::Numeric);
        assert_eq!(value.target_attr(), Some("value"));

        let track = class.descriptor("_ani_track").unwrap();
        assert_eq!(track.kind(), AnimatorKind::MutableSequence);
        assert_eq!(track.target_attr(), Some("track"));

        let names: Vec<_> = class.descriptors().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["ani_value", "_ani_track"]);
    }

    #[test]
    fn test_define_rejects_invalid_member() {
        let err = ClassDef::define(
            "Slider",
            &["value"],
            [("value", Descriptor::from(AniNumericProperty::new()))],
        )
        .unwrap_err();
        assert!(matches!(err, AniError::InvalidName { .. }));
    }

    #[test]
    fn test_add_property_failure_leaves_class_untouched() {
        let mut class = ClassDef::widget();
        assert!(add_property(&mut class, "ani_", AniNumericProperty::new()).is_err());
        assert_eq!(class.descriptors().count(), 0);
    }

    #[test]
    fn test_add_bound_property() {
        let mut class = ClassDef::widget();
        add_bound_property(
            &mut class,
            Binding::new("goal_width", "width"),
            AniNumericProperty::new(),
        );

        let d = class.descriptor("goal_width").unwrap();
        assert_eq!(d.target_attr(), Some("width"));
        assert_eq!(d.binding().map(Binding::goal_attr), Some("goal_width"));
    }
}
