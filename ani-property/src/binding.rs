//! # Binding 模块
//!
//! 目标属性名 → 真实属性名的绑定。
//!
//! 显式形式是 `Binding::new(goal_attr, target_attr)`；
//! `Binding::from_declared_name` 只是按前缀约定推导的便捷写法：
//! `ani_width` / `_ani_width` → `width`。

use crate::error::{AniError, AniResult};

/// 公开前缀
pub const PREFIX: &str = "ani_";

/// 私有前缀
pub const PRIVATE_PREFIX: &str = "_ani_";

/// 前缀是否受支持
pub fn is_valid_prefix(prefix: &str) -> bool {
    prefix == PREFIX || prefix == PRIVATE_PREFIX
}

/// 目标属性与真实属性的绑定
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Binding {
    goal_attr: String,
    target_attr: String,
}

impl Binding {
    /// 显式创建绑定
    pub fn new(goal_attr: impl Into<String>, target_attr: impl Into<String>) -> Self {
        Self {
            goal_attr: goal_attr.into(),
            target_attr: target_attr.into(),
        }
    }

    /// 从声明名称推导绑定
    ///
    /// 名称必须以 `ani_` 或 `_ani_` 开头且其后至少还有一个字符，
    /// 否则返回 `AniError::InvalidName`。
    pub fn from_declared_name(descriptor: &'static str, name: &str) -> AniResult<Self> {
        let target = name
            .strip_prefix(PREFIX)
            .or_else(|| name.strip_prefix(PRIVATE_PREFIX))
            .filter(|rest| !rest.is_empty())
            .ok_or_else(|| AniError::InvalidName {
                descriptor,
                name: name.to_string(),
            })?;
        Ok(Self::new(name, target))
    }

    /// 目标属性名（带前缀）
    pub fn goal_attr(&self) -> &str {
        &self.goal_attr
    }

    /// 真实属性名
    pub fn target_attr(&self) -> &str {
        &self.target_attr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_prefix() {
        let binding = Binding::from_declared_name("AniNumericProperty", "ani_width").unwrap();
        assert_eq!(binding.goal_attr(), "ani_width");
        assert_eq!(binding.target_attr(), "width");
    }

    #[test]
    fn test_private_prefix() {
        let binding = Binding::from_declared_name("AniNumericProperty", "_ani_x").unwrap();
        assert_eq!(binding.target_attr(), "x");
    }

    #[test]
    fn test_invalid_names() {
        for name in ["x", "_ani_", "ani_", "hello_everyone", "", "ani", "_ani"] {
            let err = Binding::from_declared_name("AniSequenceProperty", name).unwrap_err();
            assert_eq!(
                err,
                AniError::InvalidName {
                    descriptor: "AniSequenceProperty",
                    name: name.to_string(),
                }
            );
        }
    }

    #[test]
    fn test_explicit_binding() {
        let binding = Binding::new("goal_pos", "pos");
        assert_eq!(binding.goal_attr(), "goal_pos");
        assert_eq!(binding.target_attr(), "pos");
    }

    #[test]
    fn test_is_valid_prefix() {
        assert!(is_valid_prefix("ani_"));
        assert!(is_valid_prefix("_ani_"));
        assert!(!is_valid_prefix("anim_"));
    }
}
