//! 工厂便捷包装
//!
//! 把一个"构造空组件"的普通闭包包装成完整的组件工厂：
//! 构造 → 配置映射 → 注入解析 → 类型擦除返回，
//! 任一阶段的失败原样上抛。

use crate::component::setup_component_with;
use armature_contract::{
    AssemblyResult, Component, ComponentFactory, ComponentRef, ConfigStrictness, Configurable,
    Injectable,
};
use std::sync::Arc;

/// 以默认的宽松配置模式包装构造闭包
///
/// 见 [`component_factory_with`]
pub fn component_factory<C, B>(build: B) -> impl ComponentFactory
where
    C: Component + Configurable + Injectable + 'static,
    B: Fn(Arc<dyn ComponentRef>) -> AssemblyResult<C> + Send + Sync + 'static,
{
    component_factory_with(build, ConfigStrictness::default())
}

/// 把构造闭包包装成完整的组件工厂
///
/// `build` 只负责分配一个持有引用句柄的空组件；
/// 配置映射与注入解析由包装层在返回前完成
pub fn component_factory_with<C, B>(build: B, strictness: ConfigStrictness) -> impl ComponentFactory
where
    C: Component + Configurable + Injectable + 'static,
    B: Fn(Arc<dyn ComponentRef>) -> AssemblyResult<C> + Send + Sync + 'static,
{
    move |reference: Arc<dyn ComponentRef>| -> AssemblyResult<Arc<dyn Component>> {
        let mut component = build(reference.clone())?;
        setup_component_with(&mut component, reference.as_ref(), strictness)?;
        Ok(Arc::new(component) as Arc<dyn Component>)
    }
}
