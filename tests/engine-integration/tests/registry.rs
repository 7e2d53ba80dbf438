//! 组件类型注册表的集成测试
//!
//! 覆盖后注册覆盖先注册、查找失败的单因错误、批量注册入口，
//! 以及惰性模块加载场景下注册与查找的并发安全。

use armature_contract::{
    default_registry, register_component_types, AssemblyError, AssemblyResult, CapabilityQuery,
    Component, ComponentFactory, ComponentRef, ComponentType, ComponentTypeRegistry, ConfigMap,
    InjectionMap,
};
use std::sync::Arc;
use std::thread;

struct StubRef;

impl ComponentRef for StubRef {
    fn component_config(&self) -> ConfigMap {
        ConfigMap::new()
    }

    fn injections(&self) -> InjectionMap {
        InjectionMap::new()
    }

    fn message_path(&self) -> String {
        "robot/stub".to_string()
    }

    fn component(&self) -> Option<Arc<dyn Component>> {
        None
    }
}

struct Stub {
    reference: Arc<dyn ComponentRef>,
    tag: &'static str,
}

impl Component for Stub {
    fn component_ref(&self) -> Arc<dyn ComponentRef> {
        self.reference.clone()
    }

    fn query_capability(self: Arc<Self>, query: &mut CapabilityQuery) {
        query.provide::<&'static str>(self.tag);
    }
}

fn stub_factory(tag: &'static str) -> impl ComponentFactory {
    move |reference: Arc<dyn ComponentRef>| -> AssemblyResult<Arc<dyn Component>> {
        Ok(Arc::new(Stub { reference, tag }))
    }
}

fn create_tag(registry: &ComponentTypeRegistry, name: &str) -> &'static str {
    let component = registry
        .lookup(name)
        .expect("类型应该已注册")
        .factory()
        .create_component(Arc::new(StubRef))
        .expect("桩工厂不应该失败");
    let mut query = CapabilityQuery::new::<&'static str>();
    component.query_capability(&mut query);
    query
        .into_value()
        .and_then(|value| value.extract::<&'static str>())
        .expect("桩组件应该提供标签能力")
}

#[test]
fn test_last_registration_wins() {
    let registry = ComponentTypeRegistry::new();
    registry.register(ComponentType::new("motor", stub_factory("第一版")));
    registry.register(ComponentType::new("motor", stub_factory("第二版")));

    assert_eq!(registry.len(), 1, "同名重注册不应该增加条目");
    assert_eq!(
        create_tag(&registry, "motor"),
        "第二版",
        "查找应该返回最近一次注册的类型"
    );
}

#[test]
fn test_lookup_missing_type_is_single_cause_not_found() {
    let registry = ComponentTypeRegistry::new();
    let err = registry.lookup("ghost").expect_err("未注册的名称应该失败");
    assert!(
        matches!(err, AssemblyError::TypeNotFound { ref name } if name == "ghost"),
        "查找失败应该是立即的单因 TypeNotFound"
    );
}

#[test]
fn test_batch_registration_entrypoint() {
    let registry = ComponentTypeRegistry::new();
    assert!(registry.is_empty(), "新注册表应该为空");

    registry.extend([
        ComponentType::new("motor", stub_factory("m")).with_description("电机"),
        ComponentType::new("sensor", stub_factory("s")).with_description("传感器"),
    ]);

    assert_eq!(
        registry.type_names(),
        vec!["motor", "sensor"],
        "批量注册的类型名应该按字典序可枚举"
    );
    assert_eq!(
        registry.lookup("sensor").expect("应该可查").description(),
        "传感器",
        "描述应该随类型保留"
    );
}

#[test]
fn test_default_registry_batch_entrypoint() {
    // 默认注册表是进程级共享的，用独有的名称避免与其他测试互扰
    register_component_types([ComponentType::new(
        "registry-test/servo",
        stub_factory("servo"),
    )]);

    assert!(
        default_registry().contains("registry-test/servo"),
        "注册入口应该写入进程默认注册表"
    );
    assert_eq!(
        create_tag(default_registry(), "registry-test/servo"),
        "servo",
        "默认注册表里的类型应该可构造"
    );
}

#[test]
fn test_concurrent_lookups_race_registrations() {
    let registry = Arc::new(ComponentTypeRegistry::new());
    registry.register(ComponentType::new("motor", stub_factory("稳定版")));

    // 写线程模拟惰性模块加载，读线程模拟装配期间的查找
    let writer = {
        let registry = registry.clone();
        thread::spawn(move || {
            for round in 0..200 {
                let name = format!("lazy-{}", round % 8);
                registry.register(ComponentType::new(name, stub_factory("惰性")));
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let registry = registry.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    let found = registry.lookup("motor").expect("已注册的类型应该始终可查");
                    assert_eq!(found.name(), "motor", "并发读取应该返回一致的条目");
                }
            })
        })
        .collect();

    writer.join().expect("写线程不应该恐慌");
    for reader in readers {
        reader.join().expect("读线程不应该恐慌");
    }
    assert!(registry.len() >= 9, "写线程注册的类型应该全部可见");
}
