//! 能力值与能力查询
//!
//! 注入解析不依赖运行时的可赋值性判断，而是通过显式的能力查询握手：
//! 解析器提出"是否提供能力 T"的查询，组件在 `query_capability` 中
//! 用 [`CapabilityQuery::provide`] 作答，首个匹配的提供生效。

use crate::metadata::TypeInfo;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 类型擦除的能力值
///
/// 持有共享载荷与类型信息，是注入映射中流转的统一货币。
/// 克隆只复制共享指针，不复制载荷本身。
#[derive(Clone)]
pub struct CapabilityValue {
    payload: Arc<dyn Any + Send + Sync>,
    info: TypeInfo,
}

impl CapabilityValue {
    /// 从具体值创建能力值
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self {
            payload: Arc::new(value),
            info: TypeInfo::of::<T>(),
        }
    }

    /// 载荷的类型信息
    pub fn type_info(&self) -> &TypeInfo {
        &self.info
    }

    /// 判断载荷是否为类型 T
    pub fn is<T: 'static>(&self) -> bool {
        self.payload.is::<T>()
    }

    /// 以类型 T 借用载荷
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// 以类型 T 取出载荷的克隆
    pub fn extract<T: Clone + 'static>(&self) -> Option<T> {
        self.payload.downcast_ref::<T>().cloned()
    }
}

impl fmt::Debug for CapabilityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CapabilityValue").field(&self.info.name).finish()
    }
}

/// 一次能力查询
///
/// 查询以目标类型创建，组件通过 [`provide`](Self::provide) 作答；
/// 类型不匹配的作答被忽略，首个匹配的作答生效。
#[derive(Debug)]
pub struct CapabilityQuery {
    wanted: TypeInfo,
    found: Option<CapabilityValue>,
}

impl CapabilityQuery {
    /// 创建目标能力为 T 的查询
    pub fn new<T: Send + Sync + 'static>() -> Self {
        Self {
            wanted: TypeInfo::of::<T>(),
            found: None,
        }
    }

    /// 目标能力的类型信息
    pub fn wanted(&self) -> &TypeInfo {
        &self.wanted
    }

    /// 判断查询是否还在等待类型 T 的能力
    ///
    /// 组件可先用它判断，再构造开销较大的能力视图
    pub fn wants<T: 'static>(&self) -> bool {
        self.found.is_none() && self.wanted.is::<T>()
    }

    /// 提供类型 T 的能力值
    ///
    /// 与查询目标不符或查询已满足时为空操作
    pub fn provide<T: Send + Sync + 'static>(&mut self, value: T) {
        if self.found.is_none() && self.wanted.is::<T>() {
            self.found = Some(CapabilityValue::new(value));
        }
    }

    /// 查询是否已得到作答
    pub fn is_fulfilled(&self) -> bool {
        self.found.is_some()
    }

    /// 取出作答的能力值
    pub fn into_value(self) -> Option<CapabilityValue> {
        self.found
    }
}
