//! Planner：将用户目标分解为有序任务列表
//!
//! 一次结构化生成请求，按优先级应用两条决策准则：琐碎输入（问候、常识问答、闲聊）
//! 归为单个 directResponse 任务；否则分解为 2-5 个内容工具任务。
//! 回复经 Plan::from_response 接收校验后才可进入执行。

use std::sync::Arc;

use serde_json::{json, Value};

use crate::agent::plan::{Plan, PlanResponse};
use crate::core::AgentError;
use crate::llm::{GenerativeClient, GEMINI_PRO};

/// Planner：持有生成客户端，create_plan 产出经校验的初始计划
pub struct Planner {
    client: Arc<dyn GenerativeClient>,
}

impl Planner {
    pub fn new(client: Arc<dyn GenerativeClient>) -> Self {
        Self { client }
    }

    fn plan_prompt(goal: &str) -> String {
        format!(
            "You are a world-class AI Project Manager and Assistant. \n\
             Analyze the user's input: \"{goal}\"\n\n\
             DECISION CRITERIA:\n\
             1. If the input is a greeting (e.g., \"Hi\", \"Hello\"), a simple question \
             (e.g., \"What is 2+2?\"), or small talk, use the 'directResponse' tool as a SINGLE task.\n\
             2. If the input is a complex objective (e.g., \"Research X and write a report\"), \
             decompose it into 2-5 tasks using researchWeb, generateDoc, or generateSlides.\n\n\
             Format: JSON object with \"objective\" (string) and \"tasks\" \
             (array of {{id, description, tool}})."
        )
    }

    /// Planner 结构化回复的 JSON Schema
    fn plan_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "objective": { "type": "string" },
                "tasks": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string" },
                            "description": { "type": "string" },
                            "tool": {
                                "type": "string",
                                "enum": ["researchWeb", "generateDoc", "generateSlides", "directResponse"]
                            }
                        },
                        "required": ["id", "description", "tool"]
                    }
                }
            },
            "required": ["objective", "tasks"]
        })
    }

    /// 创建初始计划；回复缺失或畸形时返回 PlanningFailed，调用方不得进入执行。
    /// 前置条件：goal 非空（空输入由调用方在提交处拒绝）。
    pub async fn create_plan(&self, goal: &str) -> Result<Plan, AgentError> {
        debug_assert!(!goal.trim().is_empty(), "caller must reject empty goals");
        let raw = self
            .client
            .generate_json(GEMINI_PRO, &Self::plan_prompt(goal), Self::plan_schema())
            .await
            .map_err(AgentError::PlanningFailed)?;
        let resp: PlanResponse = serde_json::from_str(&raw)
            .map_err(|e| AgentError::PlanningFailed(format!("malformed plan response: {e}")))?;
        Plan::from_response(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::plan::TaskStatus;
    use crate::llm::MockClient;
    use crate::tools::ToolKind;

    fn planner_with(raw: &str) -> Planner {
        Planner::new(Arc::new(MockClient::with_responses(vec![Ok(raw.to_string())])))
    }

    #[tokio::test]
    async fn test_trivial_goal_yields_single_direct_response() {
        let raw = r#"{"objective": "回应问候", "tasks": [
            {"id": "1", "description": "向用户问好", "tool": "directResponse"}
        ]}"#;
        let plan = planner_with(raw).create_plan("hello").await.unwrap();
        assert_eq!(plan.tasks.len(), 1);
        assert_eq!(plan.tasks[0].tool, ToolKind::DirectResponse);
        assert_eq!(plan.tasks[0].status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn test_complex_goal_yields_content_tool_tasks() {
        let raw = r#"{"objective": "调研电动车厂商并撰写总结", "tasks": [
            {"id": "1", "description": "调研前三大电动车厂商", "tool": "researchWeb"},
            {"id": "2", "description": "撰写一页总结", "tool": "generateDoc"}
        ]}"#;
        let plan = planner_with(raw)
            .create_plan("Research the top 3 EV makers and write a one-page summary.")
            .await
            .unwrap();
        assert_eq!(plan.tasks.len(), 2);
        assert_eq!(plan.tasks[0].tool, ToolKind::ResearchWeb);
        assert_eq!(plan.tasks[1].tool, ToolKind::GenerateDoc);
        let ids: Vec<_> = plan.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["1", "2"]);
    }

    #[tokio::test]
    async fn test_malformed_response_is_planning_failure() {
        let err = planner_with("哎呀这不是 JSON").create_plan("做点什么").await.unwrap_err();
        assert!(matches!(err, AgentError::PlanningFailed(_)));
    }

    #[tokio::test]
    async fn test_llm_failure_is_planning_failure() {
        let planner = Planner::new(Arc::new(MockClient::with_responses(vec![Err(
            "network down".to_string(),
        )])));
        let err = planner.create_plan("做点什么").await.unwrap_err();
        match err {
            AgentError::PlanningFailed(msg) => assert!(msg.contains("network down")),
            other => panic!("expected PlanningFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_tool_never_reaches_execution() {
        let raw = r#"{"objective": "目标", "tasks": [
            {"id": "1", "description": "调用不存在的工具", "tool": "composeMusic"}
        ]}"#;
        let err = planner_with(raw).create_plan("写首歌").await.unwrap_err();
        assert!(matches!(err, AgentError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn test_prompt_embeds_goal() {
        let client = Arc::new(MockClient::new());
        let planner = Planner::new(client.clone());
        let _ = planner.create_plan("研究量子计算").await;
        let prompts = client.recorded_prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("研究量子计算"));
        assert!(prompts[0].contains("DECISION CRITERIA"));
    }
}
