//! 组件核心契约
//!
//! 定义组件实例、组件引用与组件工厂三方之间的调用约定：
//! 编排器持有 [`ComponentRef`]，工厂据此构造并装配出 [`Component`]。

use crate::capability::CapabilityQuery;
use crate::config::ConfigMap;
use crate::errors::AssemblyResult;
use crate::injection::InjectionMap;
use std::sync::Arc;

/// 组件引用
///
/// 表示装配中一个组件的声明使用点，由编排器实现并持有。
/// 工厂通过它读取原始配置、已解析的依赖绑定与诊断标识；
/// 组件自身只保留指向其引用的共享句柄，不拥有它。
pub trait ComponentRef: Send + Sync {
    /// 组件的原始配置包
    fn component_config(&self) -> ConfigMap;

    /// 已解析的依赖绑定，按注入槽名称索引
    fn injections(&self) -> InjectionMap;

    /// 层级式诊断标识，如 `robot/arm/motor`
    fn message_path(&self) -> String;

    /// 该引用最终产出的组件实例
    ///
    /// 编排器在构造成功后写入；尚未构造时为 `None`
    fn component(&self) -> Option<Arc<dyn Component>>;
}

/// 组件实例
///
/// 工厂产出的活体实例。注入槽仅在装配阶段可变，
/// 装配成功后按约定视为不可变。
pub trait Component: Send + Sync {
    /// 组件所属的引用
    fn component_ref(&self) -> Arc<dyn ComponentRef>;

    /// 回答能力查询
    ///
    /// 组件在此提供自身（或内部对象）的特征对象视图，
    /// 供依赖方的注入槽提取。默认不提供任何能力。
    fn query_capability(self: Arc<Self>, query: &mut CapabilityQuery) {
        let _ = query;
    }
}

/// 组件工厂
///
/// 每次调用分配并完整初始化一个组件实例：内部必须先完成
/// 配置映射与注入解析，再返回成功；二者的失败必须原样上抛。
pub trait ComponentFactory: Send + Sync {
    /// 依据组件引用创建组件
    fn create_component(&self, reference: Arc<dyn ComponentRef>)
        -> AssemblyResult<Arc<dyn Component>>;
}

/// 函数即工厂
///
/// 签名相符的普通函数或闭包可直接充当工厂，与对象形式互换
impl<F> ComponentFactory for F
where
    F: Fn(Arc<dyn ComponentRef>) -> AssemblyResult<Arc<dyn Component>> + Send + Sync,
{
    fn create_component(
        &self,
        reference: Arc<dyn ComponentRef>,
    ) -> AssemblyResult<Arc<dyn Component>> {
        (self)(reference)
    }
}
