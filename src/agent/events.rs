//! 智能体过程事件：任务启动/完成/失败等离散状态转移，供界面与日志消费

use serde::Serialize;

/// 单次运行的过程事件（可序列化为 JSON 落结构化日志）
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    /// 计划已创建并宣告（目标 + 步骤数），尚未执行任何任务
    PlanCreated { objective: String, task_count: usize },
    /// 任务进入 Running
    TaskStarted {
        index: usize,
        tool: String,
        description: String,
    },
    /// 任务完成
    TaskCompleted { index: usize, tool: String },
    /// 任务失败（剩余任务保持 Pending）
    TaskFailed {
        index: usize,
        tool: String,
        reason: String,
    },
    /// directResponse 结果进入对话
    AssistantMessage { text: String },
    /// 结构化结果替换了工件槽位
    ArtifactReplaced { tool: String, description: String },
    /// 全部任务到达终态
    RunCompleted,
}
