//! # 装配演示
//!
//! 演示如何使用 Armature 组件装配运行时：一个微型编排器
//! 注册两种组件类型，按依赖先行的顺序构造并接线，
//! 最后展示一次错误装配的聚合诊断报告。

use anyhow::Context;
use armature_contract::{
    default_registry, CapabilityQuery, Component, ComponentFactory, ComponentRef, ConfigMap,
    ConfigResult, Configurable, Injectable, Injected, InjectionMap, SlotTable,
};
use armature_engine::{component_factory, define_component_type};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// 指示能力：可被点亮的东西
trait Indicator: Send + Sync {
    fn light(&self, on: bool) -> String;
}

/// 状态指示灯组件
struct StatusIndicator {
    reference: Arc<dyn ComponentRef>,
    config: IndicatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndicatorConfig {
    color: String,
}

impl Indicator for StatusIndicator {
    fn light(&self, on: bool) -> String {
        let state = if on { "亮" } else { "灭" };
        format!("{}灯{}", self.config.color, state)
    }
}

impl Component for StatusIndicator {
    fn component_ref(&self) -> Arc<dyn ComponentRef> {
        self.reference.clone()
    }

    fn query_capability(self: Arc<Self>, query: &mut CapabilityQuery) {
        if query.wants::<Arc<dyn Indicator>>() {
            query.provide::<Arc<dyn Indicator>>(self.clone());
        }
    }
}

impl Configurable for StatusIndicator {
    type Config = IndicatorConfig;

    fn configure(&mut self, config: Self::Config) -> ConfigResult<()> {
        self.config = config;
        Ok(())
    }
}

impl Injectable for StatusIndicator {
    fn slot_table() -> SlotTable<Self> {
        SlotTable::new()
    }
}

/// 闪烁器组件：依赖一个指示能力
struct Blinker {
    reference: Arc<dyn ComponentRef>,
    config: BlinkerConfig,
    indicator: Option<Arc<dyn Indicator>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct BlinkerConfig {
    interval_ms: u64,
    #[serde(default)]
    label: String,
}

/// 闪烁能力：执行一次亮灭循环
trait Blink: Send + Sync {
    fn blink_once(&self) -> String;
}

impl Blink for Blinker {
    fn blink_once(&self) -> String {
        let indicator = self.indicator.as_ref().expect("装配成功后指示灯必然在位");
        format!(
            "[{}] 每 {} 毫秒: {} / {}",
            self.config.label,
            self.config.interval_ms,
            indicator.light(true),
            indicator.light(false),
        )
    }
}

impl Component for Blinker {
    fn component_ref(&self) -> Arc<dyn ComponentRef> {
        self.reference.clone()
    }

    fn query_capability(self: Arc<Self>, query: &mut CapabilityQuery) {
        if query.wants::<Arc<dyn Blink>>() {
            query.provide::<Arc<dyn Blink>>(self.clone());
        }
    }
}

impl Configurable for Blinker {
    type Config = BlinkerConfig;

    fn configure(&mut self, config: Self::Config) -> ConfigResult<()> {
        self.config = config;
        Ok(())
    }
}

impl Injectable for Blinker {
    fn slot_table() -> SlotTable<Self> {
        SlotTable::<Self>::new().slot::<Arc<dyn Indicator>>("indicator", |blinker, indicator| {
            blinker.indicator = Some(indicator)
        })
    }
}

/// 编排器侧的组件引用实现
struct AssemblyRef {
    path: String,
    config: ConfigMap,
    injections: InjectionMap,
    component: RwLock<Option<Arc<dyn Component>>>,
}

impl AssemblyRef {
    fn new(path: &str, config: serde_json::Value, injections: InjectionMap) -> Arc<Self> {
        Arc::new(Self {
            path: path.to_string(),
            config: ConfigMap::try_from(config).expect("演示配置是对象字面量"),
            injections,
            component: RwLock::new(None),
        })
    }
}

impl ComponentRef for AssemblyRef {
    fn component_config(&self) -> ConfigMap {
        self.config.clone()
    }

    fn injections(&self) -> InjectionMap {
        self.injections.clone()
    }

    fn message_path(&self) -> String {
        self.path.clone()
    }

    fn component(&self) -> Option<Arc<dyn Component>> {
        self.component.read().clone()
    }
}

/// 注册演示用的组件类型
fn register_demo_types() {
    define_component_type(
        "status-indicator",
        component_factory(|reference: Arc<dyn ComponentRef>| {
            Ok(StatusIndicator {
                reference,
                config: IndicatorConfig {
                    color: "白".to_string(),
                },
            })
        }),
    )
    .describe("状态指示灯")
    .register();

    define_component_type(
        "blinker",
        component_factory(|reference: Arc<dyn ComponentRef>| {
            Ok(Blinker {
                reference,
                config: BlinkerConfig {
                    interval_ms: 0,
                    label: String::new(),
                },
                indicator: None,
            })
        }),
    )
    .describe("周期闪烁器")
    .register();
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    info!("启动 Armature 装配演示");
    register_demo_types();
    let registry = default_registry();
    info!(types = ?registry.type_names(), "已注册组件类型");

    // 依赖先行：先构造指示灯
    let indicator_ref = AssemblyRef::new(
        "demo/indicator",
        json!({ "color": "红" }),
        InjectionMap::new(),
    );
    let indicator = registry
        .lookup("status-indicator")?
        .factory()
        .create_component(indicator_ref.clone())
        .context("构造指示灯失败")?;
    *indicator_ref.component.write() = Some(indicator);
    info!(path = %indicator_ref.message_path(), "指示灯构造完成");

    // 再构造依赖它的闪烁器，依赖以句柄形式供给
    let mut injections = InjectionMap::new();
    injections.insert("indicator", Injected::handle(indicator_ref.clone()));
    let blinker_ref = AssemblyRef::new(
        "demo/blinker",
        json!({ "interval_ms": 500, "label": "示例" }),
        injections,
    );
    let blinker = registry
        .lookup("blinker")?
        .factory()
        .create_component(blinker_ref.clone())
        .context("构造闪烁器失败")?;
    *blinker_ref.component.write() = Some(blinker.clone());

    // 通过能力查询拿回闪烁视图并演示一次闪烁
    let mut query = CapabilityQuery::new::<Arc<dyn Blink>>();
    blinker.query_capability(&mut query);
    let blink = query
        .into_value()
        .and_then(|value| value.extract::<Arc<dyn Blink>>())
        .expect("闪烁器应该提供闪烁能力");
    info!(path = %blinker_ref.message_path(), "闪烁器构造完成: {}", blink.blink_once());

    // 错误装配演示：配错类型、漏接依赖，一份报告看全
    let broken_ref = AssemblyRef::new(
        "demo/broken-blinker",
        json!({ "interval_ms": "快一点" }),
        InjectionMap::new(),
    );
    match registry.lookup("blinker")?.factory().create_component(broken_ref) {
        Ok(_) => info!("意外：错误装配居然成功了"),
        Err(err) => info!("聚合诊断报告:\n{err}"),
    }

    info!("演示结束");
    Ok(())
}
