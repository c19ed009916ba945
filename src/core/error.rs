//! Agent 错误类型
//!
//! 规划失败对整轮致命；单个任务调用失败终止剩余计划；计划校验失败在进入执行前拒绝。
//! 均不自动重试，在运行边界统一转为一条用户可见消息，诊断细节只进日志。

use thiserror::Error;

/// 编排与工具调用过程中可能出现的错误
#[derive(Error, Debug)]
pub enum AgentError {
    /// Planner 返回缺失或畸形的计划；整轮终止，不展示部分计划
    #[error("Planning failed: {0}")]
    PlanningFailed(String),

    /// 单个任务的外部调用失败；剩余计划终止，已完成任务的结果保留
    #[error("Tool invocation failed: {0}")]
    InvocationFailed(String),

    /// 计划引用了枚举之外的工具、id 重复等；不得进入执行
    #[error("Plan validation failed: {0}")]
    ValidationFailed(String),

    #[error("JSON parse error: {0}")]
    JsonParseError(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    /// 工作室工具执行失败（文件读取、编码等本地环节）
    #[error("Tool execution failed: {0}")]
    ToolExecutionFailed(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}
