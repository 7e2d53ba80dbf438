//! # Armature Engine
//!
//! 这个 crate 实现 Armature 装配运行时的构造算法。
//!
//! ## 核心组件
//!
//! - [`configure_component`] - 无类型配置包到类型化配置的映射
//! - [`setup_component`] - 配置映射 + 注入解析的复合装配入口
//! - [`component_factory`] - 把构造闭包包装成完整组件工厂
//! - [`define_component_type`] - 流式的组件类型定义与注册
//!
//! ## 设计原则
//!
//! - 同步的调用即返回构造管线，无 I/O、无挂起点
//! - 一个组件的全部装配问题聚合上报
//! - 配置映射先于注入解析

pub mod builder;
pub mod component;
pub mod factory;

pub use builder::*;
pub use component::*;
pub use factory::*;
