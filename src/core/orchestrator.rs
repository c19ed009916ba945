//! 编排器：主控循环
//!
//! 负责：加载配置、创建客户端/Planner/工具调用器，建立 cmd/state/event 通道，
//! 并在后台任务中消费用户命令（Submit/Studio/ClearArtifact/Clear/Quit），
//! 驱动规划与计划执行并向 UI 发布状态快照。

use std::path::PathBuf;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

use crate::agent::{run_plan, AgentEvent, Planner};
use crate::config::{load_config, AppConfig};
use crate::core::{
    AgentError, AgentPhase, AgentSession, ConversationEntry, StudioState, UiState,
};
use crate::llm::{GeminiClient, GenerativeClient, MockClient};
use crate::tools::{self, ToolInvoker};

/// 处理失败时的用户可见兜底消息（规划失败与任务失败共用，细节只进日志）
const FALLBACK_APOLOGY: &str = "处理请求时遇到一点问题，请稍后再试。";

/// 从 UI 发往编排器的用户命令
#[derive(Debug, Clone)]
pub enum Command {
    /// 提交用户目标，触发规划与顺序执行
    Submit(String),
    /// 工作室视图的单次生成请求
    Studio(StudioRequest),
    /// 清空工件槽位（仅用户可清空，执行循环只做替换）
    ClearArtifact,
    /// 清空对话、计划与工件
    Clear,
    /// 退出应用
    Quit,
}

/// 工作室视图的单次生成请求
#[derive(Debug, Clone)]
pub enum StudioRequest {
    Research(String),
    Slides(String),
    Doc(String),
    Story(String),
    Data(String),
    /// 音频文件路径（读取后 base64 内联上送）
    Audio(PathBuf),
}

/// 根据配置与环境变量选择客户端（Gemini / Mock）
pub(crate) fn create_client_from_config(cfg: &AppConfig) -> Arc<dyn GenerativeClient> {
    if cfg.llm.provider.eq_ignore_ascii_case("mock") {
        tracing::info!("Using Mock client (configured)");
        return Arc::new(MockClient::new());
    }
    match GeminiClient::from_env(cfg.llm.base_url.as_deref(), cfg.llm.timeouts.request) {
        Some(client) => {
            tracing::info!("Using Gemini client");
            Arc::new(client)
        }
        None => {
            tracing::warn!("GEMINI_API_KEY not set, using Mock client");
            Arc::new(MockClient::new())
        }
    }
}

/// 创建编排器运行时：返回命令发送端与状态接收端；后台任务消费命令并更新状态。
pub async fn create_agent(
    config_path: Option<PathBuf>,
) -> anyhow::Result<(mpsc::UnboundedSender<Command>, watch::Receiver<UiState>)> {
    let cfg = load_config(config_path).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });

    let client = create_client_from_config(&cfg);
    let planner = Planner::new(client.clone());
    let invoker = ToolInvoker::new(client.clone());

    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<Command>();
    let (state_tx, state_rx) = watch::channel(UiState::default());
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<AgentEvent>();

    // 过程事件落结构化日志，便于回看一次运行的任务轨迹
    tokio::spawn(async move {
        while let Some(ev) = event_rx.recv().await {
            if let Ok(json) = serde_json::to_string(&ev) {
                tracing::info!(event = %json, "agent");
            }
        }
    });

    let mut session = AgentSession::default();

    tokio::spawn(async move {
        while let Some(cmd) = cmd_rx.recv().await {
            match cmd {
                Command::Submit(input) => {
                    handle_submit(
                        &planner,
                        &invoker,
                        &mut session,
                        &state_tx,
                        &event_tx,
                        input,
                    )
                    .await;
                }
                Command::Studio(req) => {
                    let _ = state_tx.send(session.project(AgentPhase::StudioRunning, true, None));
                    match run_studio(client.as_ref(), &mut session.studio, req).await {
                        Ok(()) => {
                            let _ = state_tx.send(session.project(AgentPhase::Idle, false, None));
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "studio request failed");
                            let _ = state_tx.send(session.project(
                                AgentPhase::Idle,
                                false,
                                Some(e.to_string()),
                            ));
                        }
                    }
                }
                Command::ClearArtifact => {
                    session.artifact = None;
                    let _ = state_tx.send(session.project(AgentPhase::Idle, false, None));
                }
                Command::Clear => {
                    session.transcript.clear();
                    session.plan = None;
                    session.artifact = None;
                    let _ = state_tx.send(session.project(AgentPhase::Idle, false, None));
                }
                Command::Quit => break,
            }
        }
    });

    Ok((cmd_tx, state_rx))
}

/// 处理一次目标提交：规划、执行并发布状态快照
///
/// 运行边界：规划失败与任务失败都转为唯一一条用户可见的兜底消息，
/// 诊断细节只进日志，不向界面投影。
async fn handle_submit(
    planner: &Planner,
    invoker: &ToolInvoker,
    session: &mut AgentSession,
    state_tx: &watch::Sender<UiState>,
    event_tx: &mpsc::UnboundedSender<AgentEvent>,
    input: String,
) {
    // 前置条件：空输入不进 Planner
    let goal = input.trim().to_string();
    if goal.is_empty() {
        return;
    }
    let run_id = Uuid::new_v4();
    tracing::info!(%run_id, goal = %goal, "agent run started");

    session.transcript.push(ConversationEntry::user(goal.clone()));
    // 新一轮运行开始时丢弃上一轮计划，规划失败时不展示部分计划
    session.plan = None;
    let _ = state_tx.send(session.project(AgentPhase::Planning, true, None));

    let outcome = match planner.create_plan(&goal).await {
        Ok(plan) => {
            session.plan = Some(plan);
            let publish = |s: &AgentSession| {
                let _ = state_tx.send(s.project(AgentPhase::Executing, true, None));
            };
            run_plan(invoker, session, &goal, Some(event_tx), &publish)
                .await
                .map(|_| ())
        }
        Err(e) => Err(e),
    };

    match outcome {
        Ok(()) => {
            tracing::info!(%run_id, "agent run completed");
            let _ = state_tx.send(session.project(AgentPhase::Idle, false, None));
        }
        Err(e) => {
            tracing::error!(%run_id, error = %e, "agent run failed");
            session
                .transcript
                .push(ConversationEntry::assistant(FALLBACK_APOLOGY));
            let _ = state_tx.send(session.project(AgentPhase::Idle, false, None));
        }
    }
}

/// 执行一次工作室请求，将结果写入 StudioState
async fn run_studio(
    client: &dyn GenerativeClient,
    studio: &mut StudioState,
    req: StudioRequest,
) -> Result<(), AgentError> {
    match req {
        StudioRequest::Research(prompt) => {
            studio.research = Some(tools::research_web(client, &prompt).await?);
        }
        StudioRequest::Slides(topic) => {
            studio.slides = Some(tools::generate_slides(client, &topic).await?);
        }
        StudioRequest::Doc(prompt) => {
            studio.doc = Some(tools::generate_doc(client, &prompt).await?);
        }
        StudioRequest::Story(topic) => {
            let mut pages = tools::generate_story(client, &topic).await?;
            // 每页顺序配图；单页失败不影响整本故事（该页 image_url 保持空）
            for page in &mut pages {
                match tools::generate_image(client, &page.image_prompt).await {
                    Ok(url) => page.image_url = url,
                    Err(e) => tracing::warn!(error = %e, "story page image generation failed"),
                }
            }
            studio.story = Some(pages);
        }
        StudioRequest::Data(input) => {
            studio.data = Some(tools::analyze_data(client, &input).await?);
        }
        StudioRequest::Audio(path) => {
            let bytes = tokio::fs::read(&path).await.map_err(|e| {
                AgentError::ToolExecutionFailed(format!("read {}: {e}", path.display()))
            })?;
            let mime = tools::mime_for_extension(
                path.extension().and_then(|e| e.to_str()).unwrap_or(""),
            );
            let encoded = BASE64.encode(&bytes);
            studio.audio = Some(tools::summarize_audio(client, &encoded, mime).await?);
        }
    }
    Ok(())
}
