//! 计划数据模型：Plan / Task / 状态机与接收校验
//!
//! Plan 形状在创建后不可变（任务数与工具指派在规划时固定），仅各任务的 status/result
//! 随执行推进；状态只向前流转：Pending -> Running -> Completed/Failed。

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::core::AgentError;
use crate::tools::{ToolKind, ToolOutput};

/// 计划允许的最大任务数
pub const MAX_PLAN_TASKS: usize = 5;

/// 任务状态（仅向前流转，同一时刻至多一个 Running）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

/// 单个任务；result 有值当且仅当 status 为 Completed
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: String,
    pub description: String,
    pub tool: ToolKind,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ToolOutput>,
}

/// 一次目标提交产生的完整计划
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub objective: String,
    pub tasks: Vec<Task>,
}

/// Planner 结构化回复的原始形状（工具名保持字符串，接收时解析并校验）
#[derive(Debug, Deserialize)]
pub struct PlanResponse {
    #[serde(default)]
    pub objective: String,
    #[serde(default)]
    pub tasks: Vec<PlanTask>,
}

#[derive(Debug, Deserialize)]
pub struct PlanTask {
    pub id: String,
    pub description: String,
    pub tool: String,
}

impl Plan {
    /// 将 Planner 的结构化回复转为待执行计划（所有任务置 Pending），并做接收校验
    pub fn from_response(resp: PlanResponse) -> Result<Self, AgentError> {
        let mut tasks = Vec::with_capacity(resp.tasks.len());
        for t in resp.tasks {
            let tool = ToolKind::parse(&t.tool)
                .ok_or_else(|| AgentError::ValidationFailed(format!("unknown tool: {}", t.tool)))?;
            tasks.push(Task {
                id: t.id,
                description: t.description,
                tool,
                status: TaskStatus::Pending,
                result: None,
            });
        }
        let plan = Plan {
            objective: resp.objective,
            tasks,
        };
        plan.validate()?;
        Ok(plan)
    }

    /// 接收校验：任务非空且不超上限、id 唯一非空、描述非空、
    /// directResponse 不得与其他工具混排（琐碎输入应为单任务计划）
    pub fn validate(&self) -> Result<(), AgentError> {
        if self.tasks.is_empty() {
            return Err(AgentError::PlanningFailed("plan contains no tasks".to_string()));
        }
        if self.tasks.len() > MAX_PLAN_TASKS {
            return Err(AgentError::ValidationFailed(format!(
                "plan has {} tasks, limit is {MAX_PLAN_TASKS}",
                self.tasks.len()
            )));
        }
        let mut seen = HashSet::new();
        for task in &self.tasks {
            if task.id.trim().is_empty() {
                return Err(AgentError::ValidationFailed("task id is empty".to_string()));
            }
            if !seen.insert(task.id.as_str()) {
                return Err(AgentError::ValidationFailed(format!(
                    "duplicate task id: {}",
                    task.id
                )));
            }
            if task.description.trim().is_empty() {
                return Err(AgentError::ValidationFailed(format!(
                    "task {} has empty description",
                    task.id
                )));
            }
        }
        if self.tasks.len() > 1
            && self.tasks.iter().any(|t| t.tool == ToolKind::DirectResponse)
        {
            return Err(AgentError::ValidationFailed(
                "directResponse must be the sole task of a plan".to_string(),
            ));
        }
        Ok(())
    }
}
