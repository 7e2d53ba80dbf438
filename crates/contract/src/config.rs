//! 配置契约定义
//!
//! 组件的原始配置以无类型的键值包形式从编排器传入，
//! 再由装配引擎按 serde 约定绑定到组件声明的类型化配置上。

use crate::errors::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 无类型配置包
///
/// 键唯一、顺序无关的键值映射，值为 `serde_json::Value`。
/// 由编排器从装配文档中取出后原样传给工厂。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigMap {
    data: HashMap<String, serde_json::Value>,
}

impl ConfigMap {
    /// 创建空配置包
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入配置项
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// 获取配置项
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// 移除配置项，返回被移除的值
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.data.remove(key)
    }

    /// 是否包含指定键
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// 按字典序排列的全部键
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.data.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// 配置项数量
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 转换为 JSON 对象值，用于 serde 绑定
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.data
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

impl TryFrom<serde_json::Value> for ConfigMap {
    type Error = ConfigError;

    /// 从 JSON 值构造配置包，非对象值视为配置错误
    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Object(map) => Ok(Self {
                data: map.into_iter().collect(),
            }),
            other => Err(ConfigError::NotAnObject {
                detail: format!("实际为 {other}"),
            }),
        }
    }
}

impl FromIterator<(String, serde_json::Value)> for ConfigMap {
    fn from_iter<I: IntoIterator<Item = (String, serde_json::Value)>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

/// 配置映射的严格程度
///
/// 宽松模式忽略未知键，与注入解析器对无匹配槽的注入静默跳过的
/// 纪律保持对称；严格模式将未知键报告为错误。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigStrictness {
    /// 未知键被忽略（默认）
    #[default]
    Lenient,
    /// 未知键报告为 [`ConfigError::UnknownKeys`]
    Strict,
}

/// 可配置组件 trait
///
/// 组件通过关联类型声明自己的类型化配置结构，
/// 装配引擎完成绑定后调用 [`configure`](Self::configure) 应用配置。
/// 组件可在应用阶段拒绝语义上无效的值。
pub trait Configurable: Send + Sync {
    /// 配置类型
    type Config: for<'de> Deserialize<'de> + Serialize + Send + Sync + 'static;

    /// 应用配置
    fn configure(&mut self, config: Self::Config) -> ConfigResult<()>;
}

/// 空配置
///
/// 供不需要任何配置的组件作为 `Config` 关联类型使用
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NoConfig {}
