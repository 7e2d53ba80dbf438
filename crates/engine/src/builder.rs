//! 自定义组件类型构建器
//!
//! 纯粹的构造与注册便利：给定类型名与工厂，流式地附加描述，
//! 然后立即注册或仅产出可注册的 [`ComponentType`]。

use armature_contract::{
    default_registry, ComponentFactory, ComponentType, ComponentTypeRegistry,
};

/// 定义一个自定义组件类型
///
/// ```ignore
/// define_component_type("motor", motor_factory())
///     .describe("直流电机控制")
///     .register();
/// ```
pub fn define_component_type(
    name: impl Into<String>,
    factory: impl ComponentFactory + 'static,
) -> CustomComponentType {
    CustomComponentType {
        inner: ComponentType::new(name, factory),
    }
}

/// 流式组件类型构建器
#[derive(Debug)]
pub struct CustomComponentType {
    inner: ComponentType,
}

impl CustomComponentType {
    /// 附加人类可读描述
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.inner = self.inner.with_description(description);
        self
    }

    /// 产出组件类型，不注册
    pub fn build(self) -> ComponentType {
        self.inner
    }

    /// 注册进进程默认注册表，返回注册的类型
    pub fn register(self) -> ComponentType {
        self.register_in(default_registry())
    }

    /// 注册进指定注册表，返回注册的类型
    pub fn register_in(self, registry: &ComponentTypeRegistry) -> ComponentType {
        registry.register(self.inner.clone());
        self.inner
    }
}
