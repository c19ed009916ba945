//! 顺序执行循环
//!
//! 严格按计划顺序逐个任务执行：Running -> 调用工具 -> Completed/Failed。
//! 后续任务通过共享 context 引用先前结果，因此绝不并发；首个失败即终止剩余计划
//! （后续任务可能依赖先前成功，剩余任务保持 Pending）。

use tokio::sync::mpsc;

use crate::agent::events::AgentEvent;
use crate::agent::plan::TaskStatus;
use crate::core::{AgentError, AgentSession, Artifact, ConversationEntry};
use crate::tools::{ToolInvoker, ToolKind};

/// 一次运行的结果：最终共享上下文（每个完成任务一行摘要）
#[derive(Debug)]
pub struct RunOutcome {
    pub context: String,
}

fn send_event(tx: &Option<&mpsc::UnboundedSender<AgentEvent>>, ev: AgentEvent) {
    if let Some(t) = tx {
        let _ = t.send(ev);
    }
}

/// 执行当前计划（session.plan 必须已就位且非空）
///
/// 每次状态变更都通过 publish 回调发布会话快照供界面渲染；离散过程事件走 event_tx。
/// 失败时返回错误，由运行边界（编排器）追加唯一一条用户可见的失败消息。
pub async fn run_plan(
    invoker: &ToolInvoker,
    session: &mut AgentSession,
    goal: &str,
    event_tx: Option<&mpsc::UnboundedSender<AgentEvent>>,
    publish: &(dyn Fn(&AgentSession) + Sync),
) -> Result<RunOutcome, AgentError> {
    let (objective, task_count) = match &session.plan {
        Some(p) if !p.tasks.is_empty() => (p.objective.clone(), p.tasks.len()),
        _ => return Err(AgentError::PlanningFailed("no plan to execute".to_string())),
    };

    // 上下文以原始目标文本起始
    let mut context = format!("Initial User Prompt: {goal}\n");

    // 先宣告计划（目标 + 步骤数），对用户立即可见，再开始执行
    session.transcript.push(ConversationEntry::announcement(
        format!("好的，我已经根据你的需求制定了计划：{objective}"),
        format!("目标识别: {objective}。正在启动自主执行流程，共包含 {task_count} 个步骤。"),
    ));
    send_event(
        &event_tx,
        AgentEvent::PlanCreated {
            objective,
            task_count,
        },
    );
    publish(session);

    for index in 0..task_count {
        // 置为 Running 并发布计划快照
        let (description, tool) = match session.plan.as_mut() {
            Some(plan) => {
                let task = &mut plan.tasks[index];
                task.status = TaskStatus::Running;
                (task.description.clone(), task.tool)
            }
            None => {
                return Err(AgentError::PlanningFailed(
                    "plan disappeared mid-run".to_string(),
                ))
            }
        };
        send_event(
            &event_tx,
            AgentEvent::TaskStarted {
                index,
                tool: tool.name().to_string(),
                description: description.clone(),
            },
        );
        publish(session);

        match invoker.invoke(&description, tool, &context).await {
            Ok(result) => {
                if let Some(plan) = session.plan.as_mut() {
                    let task = &mut plan.tasks[index];
                    task.status = TaskStatus::Completed;
                    task.result = Some(result.clone());
                }
                // 路由：directResponse 进对话，其余替换工件槽位
                match tool {
                    ToolKind::DirectResponse => {
                        let text = result.as_display_text();
                        session.transcript.push(ConversationEntry::assistant(text.clone()));
                        send_event(&event_tx, AgentEvent::AssistantMessage { text });
                    }
                    _ => {
                        session.artifact = Some(Artifact {
                            tool,
                            data: result,
                            description: description.clone(),
                        });
                        send_event(
                            &event_tx,
                            AgentEvent::ArtifactReplaced {
                                tool: tool.name().to_string(),
                                description: description.clone(),
                            },
                        );
                    }
                }
                // 不论路由到哪一侧，都追加一行摘要供后续任务引用
                context.push_str(&format!(
                    "\nStep {} ({}) Result Summary: Success.\n",
                    index + 1,
                    tool.name()
                ));
                send_event(
                    &event_tx,
                    AgentEvent::TaskCompleted {
                        index,
                        tool: tool.name().to_string(),
                    },
                );
                publish(session);
            }
            Err(e) => {
                // 单点失败策略：失败任务不写 context，剩余任务保持 Pending
                if let Some(plan) = session.plan.as_mut() {
                    plan.tasks[index].status = TaskStatus::Failed;
                }
                send_event(
                    &event_tx,
                    AgentEvent::TaskFailed {
                        index,
                        tool: tool.name().to_string(),
                        reason: e.to_string(),
                    },
                );
                publish(session);
                return Err(e);
            }
        }
    }

    send_event(&event_tx, AgentEvent::RunCompleted);
    Ok(RunOutcome { context })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::agent::plan::{Plan, Task};
    use crate::core::EntryKind;
    use crate::llm::MockClient;
    use crate::tools::ToolOutput;

    fn plan_of(entries: &[(&str, ToolKind)]) -> Plan {
        Plan {
            objective: "测试目标".to_string(),
            tasks: entries
                .iter()
                .enumerate()
                .map(|(i, (desc, tool))| Task {
                    id: (i + 1).to_string(),
                    description: desc.to_string(),
                    tool: *tool,
                    status: TaskStatus::Pending,
                    result: None,
                })
                .collect(),
        }
    }

    fn session_with(plan: Plan) -> AgentSession {
        AgentSession {
            plan: Some(plan),
            ..AgentSession::default()
        }
    }

    #[tokio::test]
    async fn test_all_success_statuses_and_context_lines() {
        let client = Arc::new(MockClient::with_responses(vec![
            Ok("调研结果".to_string()),
            Ok("一页总结".to_string()),
        ]));
        let invoker = ToolInvoker::new(client.clone());
        let mut session = session_with(plan_of(&[
            ("调研前三大电动车厂商", ToolKind::ResearchWeb),
            ("撰写一页总结", ToolKind::GenerateDoc),
        ]));

        let outcome = run_plan(&invoker, &mut session, "研究电动车并写总结", None, &|_| {})
            .await
            .unwrap();

        let plan = session.plan.as_ref().unwrap();
        assert!(plan.tasks.iter().all(|t| t.status == TaskStatus::Completed));
        assert!(plan.tasks.iter().all(|t| t.result.is_some()));
        assert_eq!(
            outcome.context.matches("Result Summary: Success.").count(),
            2
        );
        assert!(outcome.context.starts_with("Initial User Prompt: 研究电动车并写总结\n"));
        assert!(outcome.context.contains("Step 1 (researchWeb) Result Summary: Success."));
        assert!(outcome.context.contains("Step 2 (generateDoc) Result Summary: Success."));
        // 工件槽位持有最后一个结构化结果（文档覆盖了调研）
        let artifact = session.artifact.as_ref().unwrap();
        assert_eq!(artifact.tool, ToolKind::GenerateDoc);
        assert_eq!(artifact.data, ToolOutput::Text("一页总结".to_string()));
    }

    #[tokio::test]
    async fn test_direct_response_routes_to_transcript_only() {
        let client = Arc::new(MockClient::with_responses(vec![Ok("你好呀！".to_string())]));
        let invoker = ToolInvoker::new(client);
        let mut session = session_with(plan_of(&[("向用户问好", ToolKind::DirectResponse)]));

        run_plan(&invoker, &mut session, "hello", None, &|_| {}).await.unwrap();

        // 转录：一条计划宣告 + 恰好一条助手文本；工件槽位保持为空
        assert_eq!(session.transcript.len(), 2);
        assert_eq!(session.transcript[0].kind, EntryKind::PlanAnnouncement);
        assert_eq!(session.transcript[1].kind, EntryKind::Text);
        assert_eq!(session.transcript[1].content, "你好呀！");
        assert!(session.artifact.is_none());
    }

    #[tokio::test]
    async fn test_failure_aborts_remaining_tasks() {
        let client = Arc::new(MockClient::with_responses(vec![
            Ok("调研结果".to_string()),
            Err("upstream 500".to_string()),
            Ok("不应被执行".to_string()),
        ]));
        let invoker = ToolInvoker::new(client.clone());
        let mut session = session_with(plan_of(&[
            ("调研", ToolKind::ResearchWeb),
            ("写文档", ToolKind::GenerateDoc),
            ("做幻灯片", ToolKind::GenerateSlides),
        ]));

        let err = run_plan(&invoker, &mut session, "三步目标", None, &|_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::InvocationFailed(_)));

        let plan = session.plan.as_ref().unwrap();
        assert_eq!(plan.tasks[0].status, TaskStatus::Completed);
        assert_eq!(plan.tasks[1].status, TaskStatus::Failed);
        assert_eq!(plan.tasks[2].status, TaskStatus::Pending);
        assert!(plan.tasks[1].result.is_none());

        // 任务三从未被调用；失败任务没有写入 context（任务二只看到任务一的摘要行）
        let prompts = client.recorded_prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[1].contains("Step 1 (researchWeb) Result Summary: Success."));
        assert!(!prompts[1].contains("Step 2"));

        // 失败前完成的工件仍然可见
        let artifact = session.artifact.as_ref().unwrap();
        assert_eq!(artifact.tool, ToolKind::ResearchWeb);
    }

    #[tokio::test]
    async fn test_first_task_failure_keeps_artifact_empty() {
        let client = Arc::new(MockClient::with_responses(vec![Err("boom".to_string())]));
        let invoker = ToolInvoker::new(client);
        let mut session = session_with(plan_of(&[("调研", ToolKind::ResearchWeb)]));

        let err = run_plan(&invoker, &mut session, "目标", None, &|_| {}).await.unwrap_err();
        assert!(matches!(err, AgentError::InvocationFailed(_)));
        assert!(session.artifact.is_none());
        assert_eq!(
            session.plan.as_ref().unwrap().tasks[0].status,
            TaskStatus::Failed
        );
    }

    #[tokio::test]
    async fn test_missing_plan_is_rejected() {
        let invoker = ToolInvoker::new(Arc::new(MockClient::new()));
        let mut session = AgentSession::default();
        let err = run_plan(&invoker, &mut session, "目标", None, &|_| {}).await.unwrap_err();
        assert!(matches!(err, AgentError::PlanningFailed(_)));
        assert!(session.transcript.is_empty());
    }

    #[tokio::test]
    async fn test_run_plan_is_spawnable() {
        // 编排器在 tokio::spawn 的任务里驱动执行，run_plan 的 future 必须可跨线程
        let client = Arc::new(MockClient::with_responses(vec![Ok("你好！".to_string())]));
        let invoker = ToolInvoker::new(client);
        let mut session = session_with(plan_of(&[("向用户问好", ToolKind::DirectResponse)]));

        let handle = tokio::spawn(async move {
            run_plan(&invoker, &mut session, "hello", None, &|_| {})
                .await
                .map(|_| session)
        });
        let session = handle.await.unwrap().unwrap();
        assert_eq!(session.transcript.len(), 2);
        assert_eq!(session.transcript[1].content, "你好！");
    }

    #[tokio::test]
    async fn test_announcement_precedes_execution() {
        let client = Arc::new(MockClient::with_responses(vec![Err("boom".to_string())]));
        let invoker = ToolInvoker::new(client);
        let mut session = session_with(plan_of(&[("调研", ToolKind::ResearchWeb)]));

        let _ = run_plan(&invoker, &mut session, "目标", None, &|_| {}).await;

        // 即使首个任务失败，计划宣告也已进入转录
        assert_eq!(session.transcript.len(), 1);
        assert_eq!(session.transcript[0].kind, EntryKind::PlanAnnouncement);
        assert!(session.transcript[0]
            .trace
            .as_deref()
            .unwrap()
            .contains("共包含 1 个步骤"));
    }
}
