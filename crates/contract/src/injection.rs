//! 注入槽契约
//!
//! 注入槽不通过运行时反射字段发现，而由组件类型在 [`SlotTable`]
//! 中静态声明：槽名 → 期望能力类型 + 写入组件的绑定闭包。
//! 依赖以 [`Injected`] 的形式从编排器传入，既可以是直接的能力值，
//! 也可以是指向另一个组件引用的句柄。

use crate::capability::{CapabilityQuery, CapabilityValue};
use crate::component::{Component, ComponentRef};
use crate::metadata::TypeInfo;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// 一项已解析的依赖供给
///
/// 编排器把依赖组件构造完成后，以直接能力值或组件引用句柄
/// 的形式放入注入映射。句柄在绑定前会被解引用为活体实例，
/// 组件接线到的是依赖的实例本身，而不是句柄套句柄。
#[derive(Clone)]
pub enum Injected {
    /// 直接提供的能力值
    Value(CapabilityValue),
    /// 指向另一个组件引用的句柄
    Handle(Arc<dyn ComponentRef>),
}

impl Injected {
    /// 从具体值创建直接供给
    pub fn value<T: Send + Sync + 'static>(value: T) -> Self {
        Self::Value(CapabilityValue::new(value))
    }

    /// 从组件引用创建句柄供给
    pub fn handle(reference: Arc<dyn ComponentRef>) -> Self {
        Self::Handle(reference)
    }

    /// 解引用为可绑定的依赖形态
    ///
    /// 句柄对应的组件尚未构造时返回 `None`
    pub fn resolve(&self) -> Option<ResolvedDependency> {
        match self {
            Self::Value(value) => Some(ResolvedDependency::Value(value.clone())),
            Self::Handle(reference) => {
                reference.component().map(ResolvedDependency::Component)
            }
        }
    }

    /// 供给形态的诊断描述
    pub fn describe(&self) -> String {
        match self {
            Self::Value(value) => value.type_info().to_string(),
            Self::Handle(reference) => match reference.component() {
                Some(_) => format!("组件句柄 {}", reference.message_path()),
                None => format!("未构造的组件句柄 {}", reference.message_path()),
            },
        }
    }
}

impl fmt::Debug for Injected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Injected").field(&self.describe()).finish()
    }
}

/// 解引用后的依赖
///
/// 直接值按类型提取载荷，活体组件通过能力查询提取视图
pub enum ResolvedDependency {
    /// 直接能力值
    Value(CapabilityValue),
    /// 活体组件实例
    Component(Arc<dyn Component>),
}

impl ResolvedDependency {
    /// 尝试按类型 T 提取依赖
    ///
    /// 直接值走向下转型，组件走一次针对 T 的能力查询
    pub fn extract<T: Clone + Send + Sync + 'static>(&self) -> Option<T> {
        match self {
            Self::Value(value) => value.extract::<T>(),
            Self::Component(component) => {
                let mut query = CapabilityQuery::new::<T>();
                component.clone().query_capability(&mut query);
                query.into_value().and_then(|value| value.extract::<T>())
            }
        }
    }

    /// 依赖形态的诊断描述
    pub fn describe(&self) -> String {
        match self {
            Self::Value(value) => value.type_info().to_string(),
            Self::Component(component) => {
                format!("组件 {}", component.component_ref().message_path())
            }
        }
    }
}

/// 注入映射
///
/// 槽名 → 已解析依赖。底层使用有序映射，遍历顺序即槽名字典序，
/// 保证诊断报告的确定性。
#[derive(Clone, Default)]
pub struct InjectionMap {
    entries: BTreeMap<String, Injected>,
}

impl InjectionMap {
    /// 创建空注入映射
    pub fn new() -> Self {
        Self::default()
    }

    /// 放入一项供给，同名覆盖
    pub fn insert(&mut self, slot: impl Into<String>, injected: Injected) {
        self.entries.insert(slot.into(), injected);
    }

    /// 获取指定槽的供给
    pub fn get(&self, slot: &str) -> Option<&Injected> {
        self.entries.get(slot)
    }

    /// 按槽名字典序遍历
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Injected)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// 供给数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for InjectionMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v.describe())))
            .finish()
    }
}

type BindFn<C> = Box<dyn Fn(&mut C, &ResolvedDependency) -> bool + Send + Sync>;

/// 一个注入槽的静态描述
///
/// 记录槽名、主期望类型与绑定闭包；可附加若干显式适配器，
/// 接受其他来源类型并转换后写入组件。
pub struct Slot<C> {
    name: String,
    expected: TypeInfo,
    bind: BindFn<C>,
    adapters: Vec<(TypeInfo, BindFn<C>)>,
}

impl<C> Slot<C> {
    /// 槽名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 主期望能力类型
    pub fn expected(&self) -> &TypeInfo {
        &self.expected
    }

    /// 槽可接受类型的诊断描述，含适配器来源类型
    pub fn accepts(&self) -> String {
        if self.adapters.is_empty() {
            self.expected.to_string()
        } else {
            let extra: Vec<String> = self
                .adapters
                .iter()
                .map(|(info, _)| info.to_string())
                .collect();
            format!("{} 或 {}", self.expected, extra.join(" 或 "))
        }
    }

    /// 尝试把依赖绑定进组件
    ///
    /// 先按主类型尝试，再按声明顺序尝试各适配器；
    /// 全部失败返回 `false`，组件不被改动
    pub fn try_bind(&self, component: &mut C, dependency: &ResolvedDependency) -> bool {
        if (self.bind)(component, dependency) {
            return true;
        }
        self.adapters
            .iter()
            .any(|(_, adapt)| adapt(component, dependency))
    }
}

impl<C> fmt::Debug for Slot<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("name", &self.name)
            .field("expected", &self.expected.name)
            .field("adapters", &self.adapters.len())
            .finish()
    }
}

/// 注入槽描述表
///
/// 组件类型的静态槽声明集合，通过流式 DSL 构建。
/// 构造时必须用转向鱼写明组件类型，否则 setter 闭包的参数
/// 类型在检查闭包体时尚未确定：
///
/// ```ignore
/// SlotTable::<Self>::new()
///     .slot::<Arc<dyn Sensor>>("sensor", |c, v| c.sensor = Some(v))
///     .adapt::<Arc<RawProbe>>(|c, v| c.sensor = Some(Arc::new(ProbeSensor(v))))
/// ```
///
/// 槽名在组件类型内唯一；重复声明保留后者（显式的"后者覆盖"
/// 语义），并在构建时记录 `warn` 日志。
pub struct SlotTable<C> {
    slots: Vec<Slot<C>>,
}

impl<C> SlotTable<C> {
    /// 创建空槽表
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// 声明一个期望类型为 T 的注入槽
    ///
    /// `setter` 在绑定成功时把提取出的值写入组件
    pub fn slot<T>(
        mut self,
        name: impl Into<String>,
        setter: impl Fn(&mut C, T) + Send + Sync + 'static,
    ) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        let name = name.into();
        if let Some(position) = self.slots.iter().position(|slot| slot.name == name) {
            warn!(slot = %name, "注入槽重复声明，后者覆盖前者");
            self.slots.remove(position);
        }
        self.slots.push(Slot {
            name,
            expected: TypeInfo::of::<T>(),
            bind: Box::new(move |component, dependency| match dependency.extract::<T>() {
                Some(value) => {
                    setter(component, value);
                    true
                }
                None => false,
            }),
            adapters: Vec::new(),
        });
        self
    }

    /// 为最近声明的槽附加一个接受类型 U 的显式适配器
    ///
    /// `apply` 负责把 U 转换为槽可用的形态并写入组件。
    /// 尚无任何槽声明时该调用为空操作。
    pub fn adapt<U>(mut self, apply: impl Fn(&mut C, U) + Send + Sync + 'static) -> Self
    where
        U: Clone + Send + Sync + 'static,
    {
        match self.slots.last_mut() {
            Some(slot) => {
                slot.adapters.push((
                    TypeInfo::of::<U>(),
                    Box::new(move |component, dependency| match dependency.extract::<U>() {
                        Some(value) => {
                            apply(component, value);
                            true
                        }
                        None => false,
                    }),
                ));
            }
            None => warn!("适配器声明前没有任何注入槽，已忽略"),
        }
        self
    }

    /// 查找指定名称的槽
    pub fn get(&self, name: &str) -> Option<&Slot<C>> {
        self.slots.iter().find(|slot| slot.name == name)
    }

    /// 全部槽名
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|slot| slot.name.as_str())
    }

    /// 槽数量
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// 是否没有声明任何槽
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<C> Default for SlotTable<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for SlotTable<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotTable")
            .field("slots", &self.slots)
            .finish()
    }
}

/// 可注入组件 trait
///
/// 组件类型通过它声明自己的注入槽表；
/// 没有注入槽的组件返回空表即可
pub trait Injectable: Send + Sync {
    /// 该组件类型的静态槽声明
    fn slot_table() -> SlotTable<Self>
    where
        Self: Sized;
}
