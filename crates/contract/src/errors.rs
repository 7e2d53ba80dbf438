//! 错误类型定义

use std::fmt;
use thiserror::Error;

/// 配置映射错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{path} 配置字段 {field} 类型不匹配: {detail}")]
    TypeMismatch {
        path: String,
        field: String,
        detail: String,
    },

    #[error("{path} 缺少必需的配置字段: {field}")]
    MissingField { path: String, field: String },

    #[error("{path} 存在未知配置键: {keys:?}")]
    UnknownKeys { path: String, keys: Vec<String> },

    #[error("{path} 配置绑定失败: {source}")]
    Bind {
        path: String,
        source: serde_json::Error,
    },

    #[error("配置验证失败: {message}")]
    Validation { message: String },

    #[error("配置值不是键值对象: {detail}")]
    NotAnObject { detail: String },
}

impl ConfigError {
    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// 注入解析错误类型
#[derive(Error, Debug)]
pub enum InjectError {
    #[error("{path} 注入槽 {slot} 类型不匹配: 期望 {expected}, 实际 {actual}")]
    TypeMismatch {
        path: String,
        slot: String,
        expected: String,
        actual: String,
    },

    #[error("{path} 注入槽 {slot} 未解析")]
    Unresolved { path: String, slot: String },
}

/// 单个组件装配过程中可独立检测的一个问题
#[derive(Error, Debug)]
pub enum SetupProblem {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Injection(#[from] InjectError),
}

/// 聚合错误
///
/// 按检测顺序收集一次装配尝试中的全部问题。空集合等价于成功，
/// 只能通过 [`AggregatedError::into_result`] 转换为 `Result`，
/// 不允许把空集合当作失败返回。
#[derive(Debug, Default)]
pub struct AggregatedError {
    problems: Vec<SetupProblem>,
}

impl AggregatedError {
    /// 创建空的聚合错误
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一个问题
    pub fn push(&mut self, problem: impl Into<SetupProblem>) {
        self.problems.push(problem.into());
    }

    /// 记录一次操作的失败结果，成功则忽略
    pub fn add<E: Into<SetupProblem>>(&mut self, result: Result<(), E>) {
        if let Err(problem) = result {
            self.problems.push(problem.into());
        }
    }

    /// 合并另一个聚合错误中的全部问题
    pub fn merge(&mut self, other: AggregatedError) {
        self.problems.extend(other.problems);
    }

    /// 已记录的问题列表
    pub fn problems(&self) -> &[SetupProblem] {
        &self.problems
    }

    /// 已记录的问题数量
    pub fn len(&self) -> usize {
        self.problems.len()
    }

    /// 是否没有记录任何问题
    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    /// 空集合视为成功，否则作为错误返回
    pub fn into_result(self) -> Result<(), AggregatedError> {
        if self.problems.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for AggregatedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.problems.len() {
            0 => write!(f, "无装配问题"),
            1 => write!(f, "{}", self.problems[0]),
            n => {
                writeln!(f, "装配发现 {n} 个问题:")?;
                for (index, problem) in self.problems.iter().enumerate() {
                    if index > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "  {}. {problem}", index + 1)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for AggregatedError {}

/// 装配层错误类型
#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("组件类型未注册: {name}")]
    TypeNotFound { name: String },

    #[error("组件装配失败: {source}")]
    Setup {
        #[from]
        source: AggregatedError,
    },

    #[error("组件创建失败: {path}, 原因: {source}")]
    CreationFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type SetupResult<T> = Result<T, AggregatedError>;
pub type AssemblyResult<T> = Result<T, AssemblyError>;
