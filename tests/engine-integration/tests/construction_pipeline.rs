//! 构造管线的黑盒集成测试
//!
//! 以编排器的身份走完整流程：注册类型 → 查找 → 工厂构造 →
//! 配置映射 → 注入解析，覆盖装配契约的全部可测性质。

use armature_contract::{
    AssemblyError, AssemblyResult, CapabilityQuery, Component, ComponentFactory, ComponentRef,
    ComponentTypeRegistry, ConfigError, ConfigMap, ConfigResult, ConfigStrictness, Configurable,
    InjectError, Injectable, Injected, InjectionMap, SetupProblem, SlotTable,
};
use armature_engine::{component_factory, component_factory_with, define_component_type};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// 编排器侧的组件引用桩
struct TestRef {
    path: String,
    config: ConfigMap,
    injections: InjectionMap,
    component: RwLock<Option<Arc<dyn Component>>>,
}

impl TestRef {
    fn new(path: &str) -> Arc<Self> {
        Arc::new(Self {
            path: path.to_string(),
            config: ConfigMap::new(),
            injections: InjectionMap::new(),
            component: RwLock::new(None),
        })
    }

    fn with_config(path: &str, config: serde_json::Value) -> Arc<Self> {
        Arc::new(Self {
            path: path.to_string(),
            config: ConfigMap::try_from(config).expect("测试配置应该是对象"),
            injections: InjectionMap::new(),
            component: RwLock::new(None),
        })
    }

    fn with_injections(path: &str, injections: InjectionMap) -> Arc<Self> {
        Arc::new(Self {
            path: path.to_string(),
            config: ConfigMap::new(),
            injections,
            component: RwLock::new(None),
        })
    }

    fn store(&self, component: Arc<dyn Component>) {
        *self.component.write() = Some(component);
    }
}

impl ComponentRef for TestRef {
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

/// 传感能力
trait Sensor: Send + Sync {
    fn read(&self) -> i64;
}

/// 电机组件：纯配置、无注入槽
struct Motor {
    reference: Arc<dyn ComponentRef>,
    speed: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MotorConfig {
    speed: i64,
}

impl Component for Motor {
    fn component_ref(&self) -> Arc<dyn ComponentRef> {
        self.reference.clone()
    }

    fn query_capability(self: Arc<Self>, query: &mut CapabilityQuery) {
        // 速度作为能力暴露，供测试读回构造结果
        query.provide::<i64>(self.speed);
    }
}

impl Configurable for Motor {
    type Config = MotorConfig;

    fn configure(&mut self, config: Self::Config) -> ConfigResult<()> {
        self.speed = config.speed;
        Ok(())
    }
}

impl Injectable for Motor {
    fn slot_table() -> SlotTable<Self> {
        SlotTable::new()
    }
}

fn motor_factory() -> impl armature_contract::ComponentFactory {
    component_factory(|reference: Arc<dyn ComponentRef>| {
        Ok(Motor {
            reference,
            speed: 0,
        })
    })
}

/// 温度计组件：通过能力查询提供传感视图
struct Thermometer {
    reference: Arc<dyn ComponentRef>,
    degrees: Arc<FixedSensor>,
}

struct FixedSensor(i64);

impl Sensor for FixedSensor {
    fn read(&self) -> i64 {
        self.0
    }
}

impl Component for Thermometer {
    fn component_ref(&self) -> Arc<dyn ComponentRef> {
        self.reference.clone()
    }

    fn query_capability(self: Arc<Self>, query: &mut CapabilityQuery) {
        if query.wants::<Arc<dyn Sensor>>() {
            query.provide::<Arc<dyn Sensor>>(self.degrees.clone());
        }
    }
}

/// 机械臂组件：声明 sensor 与 controller 两个注入槽
#[derive(Default)]
struct Arm {
    sensor: Option<Arc<dyn Sensor>>,
    controller: Option<String>,
    gain: Option<f64>,
}

impl std::fmt::Debug for Arm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arm")
            .field("sensor", &self.sensor.as_ref().map(|_| "已接线"))
            .field("controller", &self.controller)
            .field("gain", &self.gain)
            .finish()
    }
}

impl Configurable for Arm {
    type Config = armature_contract::NoConfig;

    fn configure(&mut self, _config: Self::Config) -> ConfigResult<()> {
        Ok(())
    }
}

impl Injectable for Arm {
    fn slot_table() -> SlotTable<Self> {
        SlotTable::<Self>::new()
            .slot::<Arc<dyn Sensor>>("sensor", |arm, sensor| arm.sensor = Some(sensor))
            .slot::<String>("controller", |arm, controller| {
                arm.controller = Some(controller)
            })
            .slot::<f64>("gain", |arm, gain| arm.gain = Some(gain))
            .adapt::<i64>(|arm, gain| arm.gain = Some(gain as f64))
    }
}

fn read_speed(component: &Arc<dyn Component>) -> i64 {
    let mut query = CapabilityQuery::new::<i64>();
    component.clone().query_capability(&mut query);
    query
        .into_value()
        .and_then(|value| value.extract::<i64>())
        .expect("电机应该提供速度能力")
}

#[test]
fn test_motor_constructs_with_speed_ten() {
    let registry = ComponentTypeRegistry::new();
    registry.register(
        define_component_type("motor", motor_factory())
            .describe("直流电机")
            .build(),
    );

    let reference = TestRef::with_config("robot/motor", json!({ "speed": 10 }));
    let component = registry
        .lookup("motor")
        .expect("电机类型应该已注册")
        .factory()
        .create_component(reference)
        .expect("speed=10 的配置应该构造成功");
    assert_eq!(read_speed(&component), 10, "配置值应该写入组件");
}

#[test]
fn test_motor_rejects_non_numeric_speed() {
    let registry = ComponentTypeRegistry::new();
    registry.register(define_component_type("motor", motor_factory()).build());

    let reference = TestRef::with_config("robot/motor", json!({ "speed": "fast" }));
    let source = match registry
        .lookup("motor")
        .expect("电机类型应该已注册")
        .factory()
        .create_component(reference)
    {
        Ok(_) => panic!("speed=\"fast\" 应该构造失败"),
        Err(AssemblyError::Setup { source }) => source,
        Err(other) => panic!("应该是装配失败，实际为 {other}"),
    };
    assert_eq!(source.len(), 1, "应该恰好一个问题");
    assert!(
        matches!(
            source.problems()[0],
            SetupProblem::Config(ConfigError::TypeMismatch { ref field, .. }) if field == "speed"
        ),
        "错误应该指名字段 speed"
    );
}

fn setup_arm(injections: InjectionMap) -> Result<Arm, armature_contract::AggregatedError> {
    let reference = TestRef::with_injections("robot/arm", injections);
    let mut arm = Arm::default();
    armature_engine::setup_component(&mut arm, reference.as_ref()).map(|()| arm)
}

#[test]
fn test_matching_slot_binds_extra_skips_missing_reports() {
    // 声明槽 {sensor, controller, gain}，供给 {sensor, gain, 无关的 telemetry}
    let mut injections = InjectionMap::new();
    injections.insert(
        "sensor",
        Injected::value::<Arc<dyn Sensor>>(Arc::new(FixedSensor(21))),
    );
    injections.insert("gain", Injected::value(1.5_f64));
    injections.insert("telemetry", Injected::value("对本类型不适用".to_string()));

    let errs = setup_arm(injections).expect_err("缺 controller 槽应该失败");
    assert_eq!(errs.len(), 1, "多余供给不应该产生错误");
    assert!(
        matches!(
            errs.problems()[0],
            SetupProblem::Injection(InjectError::Unresolved { ref slot, .. })
                if slot == "controller"
        ),
        "只有未供给的 controller 槽应该报未解析"
    );
}

#[test]
fn test_mismatched_slot_does_not_stop_others() {
    let mut injections = InjectionMap::new();
    injections.insert("sensor", Injected::value(42_i64));
    injections.insert("controller", Injected::value("PID".to_string()));
    injections.insert("gain", Injected::value(0.5_f64));

    let errs = setup_arm(injections).expect_err("sensor 槽类型不匹配应该失败");
    assert_eq!(errs.len(), 1, "应该恰好一个类型不匹配");
    assert!(
        matches!(
            errs.problems()[0],
            SetupProblem::Injection(InjectError::TypeMismatch { ref slot, .. })
                if slot == "sensor"
        ),
        "错误应该指名 sensor 槽"
    );
}

#[test]
fn test_two_problems_aggregate_to_exactly_two_causes() {
    // controller 类型不匹配 + gain 未供给 = 恰好两个原因
    let mut injections = InjectionMap::new();
    injections.insert(
        "sensor",
        Injected::value::<Arc<dyn Sensor>>(Arc::new(FixedSensor(3))),
    );
    injections.insert("controller", Injected::value(7_i64));

    let errs = setup_arm(injections).expect_err("一错一缺应该失败");
    assert_eq!(errs.len(), 2, "两个独立问题应该聚合为恰好两个原因");
    let mismatches = errs
        .problems()
        .iter()
        .filter(|p| matches!(p, SetupProblem::Injection(InjectError::TypeMismatch { .. })))
        .count();
    let unresolved = errs
        .problems()
        .iter()
        .filter(|p| matches!(p, SetupProblem::Injection(InjectError::Unresolved { .. })))
        .count();
    assert_eq!(mismatches, 1, "应该恰好一个类型不匹配");
    assert_eq!(unresolved, 1, "应该恰好一个未解析");
}

#[test]
fn test_adapter_accepts_narrower_value() {
    let mut injections = InjectionMap::new();
    injections.insert(
        "sensor",
        Injected::value::<Arc<dyn Sensor>>(Arc::new(FixedSensor(3))),
    );
    injections.insert("controller", Injected::value("PID".to_string()));
    injections.insert("gain", Injected::value(4_i64));

    let arm = setup_arm(injections).expect("适配器应该接受整数增益");
    assert_eq!(arm.gain, Some(4.0), "整数供给应该经适配器转换后绑定");
}

#[test]
fn test_config_only_component_has_noop_injection_phase() {
    let reference = TestRef::with_config("robot/motor", json!({ "speed": 5 }));
    let mut motor = Motor {
        reference: reference.clone(),
        speed: 0,
    };
    armature_engine::setup_component(&mut motor, reference.as_ref())
        .expect("无槽组件应该以空注入阶段完成装配");
    assert_eq!(motor.speed, 5, "配置阶段应该照常生效");
}

#[test]
fn test_handle_dereferences_to_live_instance() {
    // 依赖先行：先构造温度计并写回其引用
    let thermometer_ref = TestRef::new("robot/thermometer");
    let thermometer: Arc<dyn Component> = Arc::new(Thermometer {
        reference: thermometer_ref.clone(),
        degrees: Arc::new(FixedSensor(36)),
    });
    thermometer_ref.store(thermometer);

    let mut injections = InjectionMap::new();
    injections.insert("sensor", Injected::handle(thermometer_ref));
    injections.insert("controller", Injected::value("PID".to_string()));
    injections.insert("gain", Injected::value(1.0_f64));

    let arm = setup_arm(injections).expect("句柄供给应该装配成功");
    assert_eq!(
        arm.sensor.expect("传感器应该已接线").read(),
        36,
        "接线到的应该是依赖的活体实例"
    );
}

#[test]
fn test_dangling_handle_is_slot_type_mismatch() {
    let mut injections = InjectionMap::new();
    injections.insert("sensor", Injected::handle(TestRef::new("robot/ghost")));
    injections.insert("controller", Injected::value("PID".to_string()));
    injections.insert("gain", Injected::value(1.0_f64));

    let errs = setup_arm(injections).expect_err("未构造的句柄应该失败");
    assert_eq!(errs.len(), 1, "应该恰好一个问题");
    assert!(
        matches!(
            errs.problems()[0],
            SetupProblem::Injection(InjectError::TypeMismatch { ref slot, ref actual, .. })
                if slot == "sensor" && actual.contains("robot/ghost")
        ),
        "悬空句柄应该报类型不匹配并带上句柄路径"
    );
}

#[test]
fn test_strict_factory_reports_unknown_keys() {
    let strict = component_factory_with(
        |reference: Arc<dyn ComponentRef>| -> AssemblyResult<Motor> {
            Ok(Motor {
                reference,
                speed: 0,
            })
        },
        ConfigStrictness::Strict,
    );

    let reference = TestRef::with_config("robot/motor", json!({ "speed": 1, "colour": "red" }));
    let source = match strict.create_component(reference) {
        Ok(_) => panic!("严格模式应该报告未知键"),
        Err(AssemblyError::Setup { source }) => source,
        Err(other) => panic!("应该是装配失败，实际为 {other}"),
    };
    assert!(
        matches!(
            source.problems()[0],
            SetupProblem::Config(ConfigError::UnknownKeys { ref keys, .. })
                if keys == &["colour".to_string()]
        ),
        "未知键 colour 应该被列出"
    );

    // 同样的配置在默认宽松模式下应该通过
    let lenient = TestRef::with_config("robot/motor", json!({ "speed": 1, "colour": "red" }));
    motor_factory()
        .create_component(lenient)
        .expect("宽松模式应该忽略未知键");
}

#[test]
fn test_builder_registers_constructible_type() {
    let registry = ComponentTypeRegistry::new();
    define_component_type("motor", motor_factory())
        .describe("直流电机")
        .register_in(&registry);

    let reference = TestRef::with_config("robot/motor", json!({ "speed": 8 }));
    let component = registry
        .lookup("motor")
        .expect("构建器注册后应该立即可查")
        .factory()
        .create_component(reference)
        .expect("注册的类型应该立即可构造");
    assert_eq!(read_speed(&component), 8, "构造结果应该带上配置值");
}
