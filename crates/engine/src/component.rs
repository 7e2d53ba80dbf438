//! 配置映射与注入解析
//!
//! 装配一个组件分两个阶段：先把引用携带的无类型配置包绑定到
//! 组件的类型化配置上，再按槽表解析注入。两个阶段各自发现的
//! 问题全部聚合进同一个 [`AggregatedError`]，配置失败不会
//! 短路注入解析，操作者一次就能看到整个组件的全部毛病。

use armature_contract::{
    AggregatedError, ComponentRef, ConfigError, ConfigMap, ConfigStrictness, Configurable,
    InjectError, Injectable, SetupResult,
};
use std::collections::BTreeSet;
use tracing::debug;

/// 以默认的宽松模式映射组件配置
///
/// 见 [`configure_component_with`]
pub fn configure_component<C: Configurable>(
    component: &mut C,
    reference: &dyn ComponentRef,
) -> SetupResult<()> {
    configure_component_with(component, reference, ConfigStrictness::default())
}

/// 把引用的配置包绑定到组件的类型化配置上
///
/// 绑定按 serde 约定进行：包里的键匹配配置结构的字段名
/// （或其 serde 重命名）。类型不匹配的值逐个归因到具体字段，
/// 缺失的必需字段报缺字段错误；未知键在宽松模式下忽略，
/// 严格模式下作为错误列出。全部问题聚合返回。
///
/// 配置映射必须先于注入解析运行，由配置推导的默认值可能
/// 影响槽的取舍。
pub fn configure_component_with<C: Configurable>(
    component: &mut C,
    reference: &dyn ComponentRef,
    strictness: ConfigStrictness,
) -> SetupResult<()> {
    let path = reference.message_path();
    let bag = reference.component_config();
    debug!(path = %path, keys = bag.len(), "开始配置映射");

    let mut errs = AggregatedError::new();
    let config = bind_config::<C>(&bag, &path, &mut errs);

    // 未知键检查不依赖绑定成功，绑定失败时未知键照样进入聚合
    if strictness == ConfigStrictness::Strict {
        let unknown = match &config {
            Some(config) => echo_unknown_keys(&bag, config),
            None => probe_unknown_keys::<C>(&bag),
        };
        if !unknown.is_empty() {
            errs.push(ConfigError::UnknownKeys {
                path: path.clone(),
                keys: unknown,
            });
        }
    }

    if let Some(config) = config {
        if errs.is_empty() {
            errs.add(component.configure(config));
        }
    }
    errs.into_result()
}

/// 以默认的宽松模式装配组件
///
/// 见 [`setup_component_with`]
pub fn setup_component<C>(component: &mut C, reference: &dyn ComponentRef) -> SetupResult<()>
where
    C: Configurable + Injectable,
{
    setup_component_with(component, reference, ConfigStrictness::default())
}

/// 装配组件：配置映射后解析注入
///
/// 注入解析遍历引用里按槽名字典序排列的供给：
/// 没有匹配槽的供给静默跳过（编排器可以传入对本类型不适用的
/// 多余绑定）；有匹配槽的先从待定集合中移除（无论随后绑定
/// 成败都算已解析），再解引用并尝试绑定，失败记类型不匹配。
/// 处理完后仍待定的槽逐个记未解析错误。
pub fn setup_component_with<C>(
    component: &mut C,
    reference: &dyn ComponentRef,
    strictness: ConfigStrictness,
) -> SetupResult<()>
where
    C: Configurable + Injectable,
{
    let mut errs = AggregatedError::new();
    if let Err(config_errs) = configure_component_with(component, reference, strictness) {
        errs.merge(config_errs);
    }
    resolve_injections(component, reference, &mut errs);
    errs.into_result()
}

/// 解析注入槽，问题记入聚合错误
fn resolve_injections<C: Injectable>(
    component: &mut C,
    reference: &dyn ComponentRef,
    errs: &mut AggregatedError,
) {
    let table = C::slot_table();
    let path = reference.message_path();
    let injections = reference.injections();
    debug!(
        path = %path,
        slots = table.len(),
        supplied = injections.len(),
        "开始注入解析"
    );

    let mut pending: BTreeSet<String> = table.names().map(str::to_string).collect();
    for (name, injected) in injections.iter() {
        let Some(slot) = table.get(name) else {
            debug!(path = %path, slot = %name, "供给没有匹配的注入槽，跳过");
            continue;
        };
        pending.remove(name);

        match injected.resolve() {
            Some(dependency) => {
                if slot.try_bind(component, &dependency) {
                    debug!(path = %path, slot = %name, "注入槽绑定成功");
                } else {
                    errs.push(InjectError::TypeMismatch {
                        path: path.clone(),
                        slot: name.to_string(),
                        expected: slot.accepts(),
                        actual: dependency.describe(),
                    });
                }
            }
            None => {
                errs.push(InjectError::TypeMismatch {
                    path: path.clone(),
                    slot: name.to_string(),
                    expected: slot.accepts(),
                    actual: injected.describe(),
                });
            }
        }
    }

    for slot in pending {
        errs.push(InjectError::Unresolved {
            path: path.clone(),
            slot,
        });
    }
}

/// 把配置包绑定为类型化配置，问题记入聚合错误
///
/// serde 一次只报告首个问题，这里逐轮剥离：每轮用隔离探针
/// 归因出全部肇事键，逐个记录错误并从工作副本中移除再试，
/// 直到绑定成功或遇到无法继续的失败。类型错误总是先于
/// 缺字段错误浮现，所以多个独立的类型不匹配都能被剥离出来。
fn bind_config<C: Configurable>(
    bag: &ConfigMap,
    path: &str,
    errs: &mut AggregatedError,
) -> Option<C::Config> {
    let mut working = bag.clone();
    let mut unknown: Vec<String> = Vec::new();
    let mut peeled: Vec<String> = Vec::new();

    let bound = loop {
        match serde_json::from_value::<C::Config>(working.to_value()) {
            Ok(config) => break Some(config),
            Err(err) => match classify(&err) {
                // 已作为类型不匹配剥离的键不再重复报缺失
                BindFailure::MissingField(field) => {
                    if !peeled.contains(&field) {
                        errs.push(ConfigError::MissingField {
                            path: path.to_string(),
                            field,
                        });
                    }
                    break None;
                }
                BindFailure::UnknownField(field) => {
                    working.remove(&field);
                    unknown.push(field);
                }
                BindFailure::Other => {
                    let culprits = mismatched_keys::<C>(&working);
                    if culprits.is_empty() {
                        errs.push(ConfigError::Bind {
                            path: path.to_string(),
                            source: err,
                        });
                        break None;
                    }
                    for (field, detail) in culprits {
                        working.remove(&field);
                        peeled.push(field.clone());
                        errs.push(ConfigError::TypeMismatch {
                            path: path.to_string(),
                            field,
                            detail: detail.to_string(),
                        });
                    }
                }
            },
        }
    };

    if !unknown.is_empty() {
        unknown.sort();
        errs.push(ConfigError::UnknownKeys {
            path: path.to_string(),
            keys: unknown,
        });
    }
    bound
}

/// serde 绑定失败的归类
enum BindFailure {
    MissingField(String),
    UnknownField(String),
    Other,
}

fn classify(err: &serde_json::Error) -> BindFailure {
    let message = err.to_string();
    if message.starts_with("missing field") {
        if let Some(field) = field_in_backticks(&message) {
            return BindFailure::MissingField(field);
        }
    }
    if message.starts_with("unknown field") {
        if let Some(field) = field_in_backticks(&message) {
            return BindFailure::UnknownField(field);
        }
    }
    BindFailure::Other
}

/// 取出 serde 错误消息里反引号包裹的字段名
fn field_in_backticks(message: &str) -> Option<String> {
    let start = message.find('`')? + 1;
    let end = message[start..].find('`')? + start;
    Some(message[start..end].to_string())
}

/// 隔离探针：每个键单独绑定一次，产生类型错误的键即肇事键
///
/// 单键包里类型错误先于缺字段检查浮现，所以归因不依赖
/// 错误消息比较，两个键持有相同的非法值也能各自定位
fn mismatched_keys<C: Configurable>(working: &ConfigMap) -> Vec<(String, serde_json::Error)> {
    let mut culprits = Vec::new();
    for key in working.keys() {
        let Some(value) = working.get(&key) else {
            continue;
        };
        let mut probe = ConfigMap::new();
        probe.insert(key.clone(), value.clone());
        if let Err(err) = serde_json::from_value::<C::Config>(probe.to_value()) {
            if matches!(classify(&err), BindFailure::Other) {
                culprits.push((key, err));
            }
        }
    }
    culprits
}

/// 绑定失败时的未知键探测
///
/// 以空包的绑定结果为基线，逐键用必然类型不符的哨兵值单独试绑：
/// 结果与基线相同的键没有参与绑定，视为未知键。
/// 值类型为任意 JSON 对象的字段与未知键无法区分，不会被报告。
fn probe_unknown_keys<C: Configurable>(bag: &ConfigMap) -> Vec<String> {
    let baseline = bind_outcome::<C>(&ConfigMap::new());
    bag.keys()
        .into_iter()
        .filter(|key| {
            let mut probe = ConfigMap::new();
            probe.insert(key.clone(), serde_json::json!({ "__armature_probe__": null }));
            bind_outcome::<C>(&probe) == baseline
        })
        .collect()
}

/// 一次试绑的结果指纹，成功为空串，失败为错误消息
fn bind_outcome<C: Configurable>(bag: &ConfigMap) -> String {
    match serde_json::from_value::<C::Config>(bag.to_value()) {
        Ok(_) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// 严格模式的未知键检查：把配置序列化回对象，不在其中的包键即未知键
fn echo_unknown_keys<T: serde::Serialize>(bag: &ConfigMap, config: &T) -> Vec<String> {
    match serde_json::to_value(config) {
        Ok(serde_json::Value::Object(echo)) => bag
            .keys()
            .into_iter()
            .filter(|key| !echo.contains_key(key))
            .collect(),
        _ => Vec::new(),
    }
}
