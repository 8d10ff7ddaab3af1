//! # Error 模块
//!
//! 定义 ani-property 中使用的错误类型。

use thiserror::Error;

use crate::object::ObjectId;

/// 动画属性错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AniError {
    /// 描述符声明名称不合法（缺少 `ani_` / `_ani_` 前缀，或前缀后没有字符）
    #[error(
        "{descriptor} 实例的名称必须以 'ani_' 或 '_ani_' 开头，且其后至少还有一个字符（实际为 '{name}'）"
    )]
    InvalidName {
        descriptor: &'static str,
        name: String,
    },

    /// 批量安装时使用了不支持的前缀
    #[error("前缀必须是 'ani_' 或 '_ani_'（实际为 '{prefix}'）")]
    InvalidPrefix { prefix: String },

    /// 安装目标类缺少预期的基础属性
    #[error("类 '{class}' 缺少基础属性 '{attr}'")]
    MissingBaseAttribute { class: String, attr: String },

    /// 描述符尚未挂到任何类上
    #[error("{descriptor} 尚未绑定到属性名")]
    UnboundDescriptor { descriptor: &'static str },

    /// 对象未注册
    #[error("对象 {0} 未注册")]
    ObjectNotFound(ObjectId),

    /// 宿主对象上不存在该属性（或尚未赋值）
    #[error("对象 {object} 上不存在属性 '{attr}'")]
    AttributeMissing { object: ObjectId, attr: String },

    /// 值类型与描述符不匹配
    #[error("属性 '{attr}' 的值类型不匹配：期望 {expected}，实际 {actual}")]
    TypeMismatch {
        attr: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// 宿主对象拒绝写入（属性只读，或不接受该值的类型/形状）
    #[error("对象 {object} 拒绝写入属性 '{attr}'")]
    WriteRejected { object: ObjectId, attr: String },
}

/// Result 类型别名
pub type AniResult<T> = Result<T, AniError>;

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 序列化失败
    #[error("配置序列化失败: {0}")]
    SerializationFailed(String),

    /// 文件读写失败
    #[error("配置文件读写失败: {0}")]
    IoError(String),

    /// 配置校验失败
    #[error("配置校验失败: {0}")]
    ValidationFailed(String),
}
