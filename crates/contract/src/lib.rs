//! # Armature Contract
//!
//! 这个 crate 定义 Armature 组件装配运行时的契约层。
//!
//! ## 核心组件
//!
//! - [`Component`] / [`ComponentRef`] / [`ComponentFactory`] - 组件、引用与工厂的三方约定
//! - [`ComponentType`] / [`ComponentTypeRegistry`] - 组件类型与进程级类型注册表
//! - [`SlotTable`] / [`Injectable`] - 注入槽的静态声明
//! - [`CapabilityValue`] / [`CapabilityQuery`] - 类型擦除的能力值与显式能力查询
//! - [`ConfigMap`] / [`Configurable`] - 无类型配置包与类型化配置约定
//! - [`AggregatedError`] - 空即成功的类型化聚合错误
//!
//! ## 设计原则
//!
//! - 注入槽静态声明，不做运行时字段反射
//! - 能力匹配通过显式查询握手，不做隐式可赋值性判断
//! - 一次装配尝试的全部问题聚合上报，不逐个失败
//! - 注册表写入串行、读取并发

pub mod capability;
pub mod component;
pub mod config;
pub mod errors;
pub mod injection;
pub mod metadata;
pub mod registry;

pub use capability::*;
pub use component::*;
pub use config::*;
pub use errors::*;
pub use injection::*;
pub use metadata::*;
pub use registry::*;
