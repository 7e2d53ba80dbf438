//! 组件类型注册表
//!
//! 进程级目录：类型名 → 可构造该类型组件的工厂。注册表是显式对象，
//! 在启动时构造一次并以引用传给编排器的构建方；同时通过
//! [`default_registry`] 保留"每进程一个目录"的使用习惯。

use crate::component::ComponentFactory;
use crate::errors::{AssemblyError, AssemblyResult};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// 组件类型描述符
///
/// 名称唯一标识一种组件类型；注册后不可变，存活至进程结束
#[derive(Clone)]
pub struct ComponentType {
    name: String,
    description: String,
    factory: Arc<dyn ComponentFactory>,
}

impl ComponentType {
    /// 以名称与工厂创建组件类型
    pub fn new(name: impl Into<String>, factory: impl ComponentFactory + 'static) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            factory: Arc::new(factory),
        }
    }

    /// 附加人类可读描述
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// 类型名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 类型描述
    pub fn description(&self) -> &str {
        &self.description
    }

    /// 该类型的组件工厂
    pub fn factory(&self) -> Arc<dyn ComponentFactory> {
        self.factory.clone()
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentType")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

/// 组件类型注册表
///
/// 写入串行、读取并发。注册通常发生在启动阶段的顺序模块加载中，
/// 但惰性加载的模块可能与装配期间的查找并发。
#[derive(Default)]
pub struct ComponentTypeRegistry {
    entries: RwLock<HashMap<String, ComponentType>>,
}

impl ComponentTypeRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册组件类型，同名后注册者覆盖先注册者
    pub fn register(&self, component_type: ComponentType) {
        let name = component_type.name().to_string();
        let replaced = self
            .entries
            .write()
            .insert(name.clone(), component_type)
            .is_some();
        if replaced {
            warn!(name = %name, "组件类型重复注册，后者覆盖前者");
        } else {
            debug!(name = %name, "注册组件类型");
        }
    }

    /// 批量注册，模块加载入口
    pub fn extend(&self, types: impl IntoIterator<Item = ComponentType>) {
        for component_type in types {
            self.register(component_type);
        }
    }

    /// 按名称查找组件类型
    ///
    /// 未注册时立即返回单因 [`AssemblyError::TypeNotFound`]，
    /// 查找失败没有可聚合的后续
    pub fn lookup(&self, name: &str) -> AssemblyResult<ComponentType> {
        self.entries
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| AssemblyError::TypeNotFound {
                name: name.to_string(),
            })
    }

    /// 是否已注册指定名称
    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    /// 按字典序排列的全部类型名
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// 已注册的类型数量
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// 是否没有任何注册
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl fmt::Debug for ComponentTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentTypeRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}

/// 进程默认注册表
static DEFAULT_REGISTRY: Lazy<ComponentTypeRegistry> = Lazy::new(ComponentTypeRegistry::new);

/// 获取进程默认注册表
pub fn default_registry() -> &'static ComponentTypeRegistry {
    &DEFAULT_REGISTRY
}

/// 向进程默认注册表批量注册组件类型
///
/// 模块加载在进程启动时调用的注册入口
pub fn register_component_types(types: impl IntoIterator<Item = ComponentType>) {
    DEFAULT_REGISTRY.extend(types);
}
