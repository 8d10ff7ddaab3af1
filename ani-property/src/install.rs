//! # Install 模块
//!
//! 批量安装：为控件类的常用几何属性一次性注册动画描述符。

use tracing::info;

use crate::binding::is_valid_prefix;
use crate::class::{ClassDef, add_property};
use crate::config::AniConfig;
use crate::error::{AniError, AniResult};
use crate::property::{AniNumericProperty, AniSequenceProperty};

/// 安装为 `AniNumericProperty` 的标量属性
pub const NUMERIC_PROPERTIES: &[&str] = &[
    "x", "y", "width", "height", "opacity", "right", "top", "center_x", "center_y",
];

/// 安装为 `AniSequenceProperty` 的序列属性
pub const SEQUENCE_PROPERTIES: &[&str] = &["pos", "size", "center"];

/// 使用默认阈值与速度安装
///
/// 先检查前缀和所有基础属性，任一不满足时类保持不变。
pub fn install(class: &mut ClassDef, prefix: &str) -> AniResult<()> {
    install_with(
        class,
        prefix,
        AniNumericProperty::new,
        AniSequenceProperty::new,
    )
}

/// 使用配置中的前缀、阈值与速度安装
pub fn install_with_config(class: &mut ClassDef, config: &AniConfig) -> AniResult<()> {
    install_with(
        class,
        &config.install_prefix,
        || AniNumericProperty::from_config(config),
        || AniSequenceProperty::from_config(config),
    )
}

fn install_with(
    class: &mut ClassDef,
    prefix: &str,
    numeric: impl Fn() -> AniNumericProperty,
    sequence: impl Fn() -> AniSequenceProperty,
) -> AniResult<()> {
    if !is_valid_prefix(prefix) {
        return Err(AniError::InvalidPrefix {
            prefix: prefix.to_string(),
        });
    }

    if let Some(missing) = NUMERIC_PROPERTIES
        .iter()
        .chain(SEQUENCE_PROPERTIES)
        .find(|attr| !class.has_attr(attr))
    {
        return Err(AniError::MissingBaseAttribute {
            class: class.name().to_string(),
            attr: missing.to_string(),
        });
    }

    for attr in NUMERIC_PROPERTIES {
        add_property(class, &format!("{prefix}{attr}"), numeric())?;
    }
    for attr in SEQUENCE_PROPERTIES {
        add_property(class, &format!("{prefix}{attr}"), sequence())?;
    }

    info!(
        class = class.name(),
        prefix,
        count = NUMERIC_PROPERTIES.len() + SEQUENCE_PROPERTIES.len(),
        "动画属性安装完成"
    );
    Ok(())
}
