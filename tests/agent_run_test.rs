//! 智能体端到端集成测试：Planner 产出计划，执行循环按序调用工具并路由结果。
//! 全程使用脚本化 Mock 客户端，不触网。

use std::sync::Arc;

use anygen::agent::{run_plan, Planner, TaskStatus};
use anygen::core::{AgentError, AgentSession, EntryKind, Role};
use anygen::llm::MockClient;
use anygen::tools::{ToolInvoker, ToolKind, ToolOutput};

const RESEARCH_DOC_PLAN: &str = r#"{
    "objective": "调研电动车市场并撰写总结",
    "tasks": [
        {"id": "1", "description": "调研前三大电动车厂商", "tool": "researchWeb"},
        {"id": "2", "description": "撰写一页市场总结", "tool": "generateDoc"}
    ]
}"#;

const GREETING_PLAN: &str = r#"{
    "objective": "回应用户的问候",
    "tasks": [
        {"id": "1", "description": "向用户问好", "tool": "directResponse"}
    ]
}"#;

/// 规划 + 执行一轮：responses[0] 给 Planner，其余按序给各任务
async fn run_goal(
    goal: &str,
    responses: Vec<Result<String, String>>,
) -> (AgentSession, Result<(), AgentError>, Arc<MockClient>) {
    let client = Arc::new(MockClient::with_responses(responses));
    let planner = Planner::new(client.clone());
    let invoker = ToolInvoker::new(client.clone());
    let mut session = AgentSession::default();

    let result = match planner.create_plan(goal).await {
        Ok(plan) => {
            session.plan = Some(plan);
            run_plan(&invoker, &mut session, goal, None, &|_| {})
                .await
                .map(|_| ())
        }
        Err(e) => Err(e),
    };
    (session, result, client)
}

#[tokio::test]
async fn research_then_doc_run_fills_artifact_with_doc() {
    let (session, result, client) = run_goal(
        "Research the top 3 EV makers and write a one-page summary.",
        vec![
            Ok(RESEARCH_DOC_PLAN.to_string()),
            Ok("调研正文：比亚迪、特斯拉、大众。".to_string()),
            Ok("一页市场总结正文。".to_string()),
        ],
    )
    .await;
    result.unwrap();

    let plan = session.plan.as_ref().unwrap();
    assert_eq!(plan.tasks.len(), 2);
    assert!(plan.tasks.iter().all(|t| t.status == TaskStatus::Completed));

    // 工件槽位持有最后一个结构化结果：文档覆盖了调研
    let artifact = session.artifact.as_ref().unwrap();
    assert_eq!(artifact.tool, ToolKind::GenerateDoc);
    assert_eq!(
        artifact.data,
        ToolOutput::Text("一页市场总结正文。".to_string())
    );
    assert_eq!(artifact.description, "撰写一页市场总结");

    // 转录只有计划宣告，结构化结果不进对话
    assert_eq!(session.transcript.len(), 1);
    assert_eq!(session.transcript[0].kind, EntryKind::PlanAnnouncement);

    // 任务二的 prompt 引用了任务一的上下文摘要行
    let prompts = client.recorded_prompts();
    assert_eq!(prompts.len(), 3);
    assert!(prompts[2].contains("Initial User Prompt: Research the top 3 EV makers"));
    assert!(prompts[2].contains("Step 1 (researchWeb) Result Summary: Success."));
}

#[tokio::test]
async fn trivial_greeting_routes_to_transcript_only() {
    let (session, result, _) = run_goal(
        "hello",
        vec![
            Ok(GREETING_PLAN.to_string()),
            Ok("你好！有什么可以帮你？".to_string()),
        ],
    )
    .await;
    result.unwrap();

    // 恰好一条助手文本回复，工件槽位保持为空
    let assistant_texts: Vec<_> = session
        .transcript
        .iter()
        .filter(|e| e.role == Role::Assistant && e.kind == EntryKind::Text)
        .collect();
    assert_eq!(assistant_texts.len(), 1);
    assert_eq!(assistant_texts[0].content, "你好！有什么可以帮你？");
    assert!(session.artifact.is_none());
}

#[tokio::test]
async fn failure_mid_run_aborts_and_keeps_prior_artifact() {
    let (session, result, client) = run_goal(
        "调研并产出文档与幻灯片",
        vec![
            Ok(r#"{
                "objective": "调研并产出文档与幻灯片",
                "tasks": [
                    {"id": "1", "description": "调研", "tool": "researchWeb"},
                    {"id": "2", "description": "写文档", "tool": "generateDoc"},
                    {"id": "3", "description": "做幻灯片", "tool": "generateSlides"}
                ]
            }"#
            .to_string()),
            Ok("调研正文".to_string()),
            Err("upstream 500".to_string()),
        ],
    )
    .await;
    assert!(matches!(result, Err(AgentError::InvocationFailed(_))));

    let plan = session.plan.as_ref().unwrap();
    assert_eq!(plan.tasks[0].status, TaskStatus::Completed);
    assert_eq!(plan.tasks[1].status, TaskStatus::Failed);
    assert_eq!(plan.tasks[2].status, TaskStatus::Pending);

    // 任务三从未被调用（Planner 一次 + 任务两次）
    assert_eq!(client.recorded_prompts().len(), 3);

    // 失败前完成的调研工件仍在
    assert_eq!(session.artifact.as_ref().unwrap().tool, ToolKind::ResearchWeb);
}

#[tokio::test]
async fn identical_scripts_yield_identical_end_states() {
    let script = || {
        vec![
            Ok(RESEARCH_DOC_PLAN.to_string()),
            Ok("调研正文".to_string()),
            Ok("总结正文".to_string()),
        ]
    };
    let (first, r1, _) = run_goal("同一个目标", script()).await;
    let (second, r2, _) = run_goal("同一个目标", script()).await;
    r1.unwrap();
    r2.unwrap();

    // 路由与状态推进是纯确定性的：同样的脚本得到同样的终态
    let snapshot = |s: &AgentSession| {
        serde_json::json!({
            "plan": s.plan,
            "artifact": s.artifact,
            "transcript": s.transcript,
        })
    };
    assert_eq!(snapshot(&first), snapshot(&second));
}

#[tokio::test]
async fn planning_failure_leaves_session_untouched() {
    let (session, result, _) =
        run_goal("做点什么", vec![Ok("这不是一个计划 JSON".to_string())]).await;
    assert!(matches!(result, Err(AgentError::PlanningFailed(_))));
    assert!(session.plan.is_none());
    assert!(session.transcript.is_empty());
    assert!(session.artifact.is_none());
}

#[tokio::test]
async fn oversized_plan_is_rejected_before_execution() {
    let tasks: Vec<String> = (1..=6)
        .map(|i| format!(r#"{{"id": "{i}", "description": "步骤 {i}", "tool": "generateDoc"}}"#))
        .collect();
    let raw = format!(
        r#"{{"objective": "超长计划", "tasks": [{}]}}"#,
        tasks.join(",")
    );
    let (session, result, client) = run_goal("一个大目标", vec![Ok(raw)]).await;
    assert!(matches!(result, Err(AgentError::ValidationFailed(_))));
    assert!(session.plan.is_none());
    // 只有 Planner 被调用过，任何工具都未执行
    assert_eq!(client.recorded_prompts().len(), 1);
}
