//! # Config 模块
//!
//! 动画默认参数配置。
//!
//! ## 配置优先级
//!
//! 1. 描述符构造时显式指定（最高）
//! 2. 配置文件 (JSON)
//! 3. 默认值（最低）

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::binding::{PREFIX, is_valid_prefix};
use crate::error::ConfigError;

/// 默认收敛阈值（密度为 1 时的 `dp(2)`）
pub const DEFAULT_THRESHOLD: f64 = 2.0;

/// 默认逼近速度
pub const DEFAULT_SPEED: f64 = 10.0;

/// 密度无关像素换算
pub fn dp(value: f64, density: f64) -> f64 {
    value * density
}

/// 动画配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AniConfig {
    /// 收敛阈值（dp）
    #[serde(default = "default_threshold_dp")]
    pub threshold_dp: f64,

    /// 屏幕密度
    #[serde(default = "default_density")]
    pub density: f64,

    /// 逼近速度（1/秒）
    #[serde(default = "default_speed")]
    pub speed: f64,

    /// 批量安装使用的前缀（`ani_` 或 `_ani_`）
    #[serde(default = "default_install_prefix")]
    pub install_prefix: String,
}

fn default_threshold_dp() -> f64 {
    DEFAULT_THRESHOLD
}

fn default_density() -> f64 {
    1.0
}

fn default_speed() -> f64 {
    DEFAULT_SPEED
}

fn default_install_prefix() -> String {
    PREFIX.to_string()
}

impl Default for AniConfig {
    fn default() -> Self {
        Self {
            threshold_dp: default_threshold_dp(),
            density: default_density(),
            speed: default_speed(),
            install_prefix: default_install_prefix(),
        }
    }
}

impl AniConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并记录警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = ?path, "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    info!(path = ?path, "配置文件加载成功");
                    config
                }
                Err(e) => {
                    warn!(path = ?path, error = %e, "配置文件解析失败，使用默认配置");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = ?path, error = %e, "配置文件读取失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;

        fs::write(path, json).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.density > 0.0) {
            return Err(ConfigError::ValidationFailed(format!(
                "density 必须为正数: {}",
                self.density
            )));
        }
        if !(self.threshold_dp >= 0.0) {
            return Err(ConfigError::ValidationFailed(format!(
                "threshold_dp 不能为负数: {}",
                self.threshold_dp
            )));
        }
        if !(self.speed > 0.0) {
            return Err(ConfigError::ValidationFailed(format!(
                "speed 必须为正数: {}",
                self.speed
            )));
        }
        if !is_valid_prefix(&self.install_prefix) {
            return Err(ConfigError::ValidationFailed(format!(
                "install_prefix 必须是 'ani_' 或 '_ani_': {}",
                self.install_prefix
            )));
        }
        Ok(())
    }

    /// 换算为像素的收敛阈值
    pub fn threshold(&self) -> f64 {
        dp(self.threshold_dp, self.density)
    }
}
