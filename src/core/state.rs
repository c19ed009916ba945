//! 会话状态与 UI 投影
//!
//! AgentSession 由编排器独占持有并传入执行循环（无环境全局量）；转录与工件槽位
//! 只由执行循环写入，UI 只读投影快照（UiState）。

use serde::Serialize;

use crate::agent::plan::Plan;
use crate::tools::{AnalysisResult, ResearchResult, Slide, StoryPage, ToolKind, ToolOutput};

/// 对话角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// 条目类别：普通文本或计划宣告（附推理轨迹）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Text,
    PlanAnnouncement,
}

/// 一条对话转录（追加式，唯一的交互历史）
#[derive(Debug, Clone, Serialize)]
pub struct ConversationEntry {
    pub role: Role,
    pub content: String,
    pub kind: EntryKind,
    /// 计划宣告附带的推理轨迹（目标识别与步骤数）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

impl ConversationEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            kind: EntryKind::Text,
            trace: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            kind: EntryKind::Text,
            trace: None,
        }
    }

    pub fn announcement(content: impl Into<String>, trace: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            kind: EntryKind::PlanAnnouncement,
            trace: Some(trace.into()),
        }
    }
}

/// 工件槽位内容：最近一次非对话类任务的结果（单槽位，后者覆盖前者）
#[derive(Debug, Clone, Serialize)]
pub struct Artifact {
    pub tool: ToolKind,
    pub data: ToolOutput,
    pub description: String,
}

/// 工作室各视图的最新结果（独立于智能体运行）
#[derive(Debug, Clone, Default)]
pub struct StudioState {
    pub research: Option<ResearchResult>,
    pub slides: Option<Vec<Slide>>,
    pub doc: Option<String>,
    pub story: Option<Vec<StoryPage>>,
    pub data: Option<AnalysisResult>,
    pub audio: Option<String>,
}

/// 一次会话的全部可变状态：转录、当前计划、工件槽位与工作室结果
#[derive(Debug, Default)]
pub struct AgentSession {
    pub transcript: Vec<ConversationEntry>,
    pub plan: Option<Plan>,
    pub artifact: Option<Artifact>,
    pub studio: StudioState,
}

impl AgentSession {
    /// 投影为 UI 可渲染的快照
    pub fn project(
        &self,
        phase: AgentPhase,
        input_locked: bool,
        error_message: Option<String>,
    ) -> UiState {
        UiState {
            phase,
            transcript: self.transcript.clone(),
            plan: self.plan.clone(),
            artifact: self.artifact.clone(),
            studio: self.studio.clone(),
            input_locked,
            error_message,
        }
    }
}

/// Agent 阶段（UI 投影用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentPhase {
    Idle,
    Planning,
    Executing,
    StudioRunning,
}

/// UI 看到的「投影」状态，轻量且易于渲染
#[derive(Debug, Clone)]
pub struct UiState {
    pub phase: AgentPhase,
    pub transcript: Vec<ConversationEntry>,
    pub plan: Option<Plan>,
    pub artifact: Option<Artifact>,
    pub studio: StudioState,
    pub input_locked: bool,
    pub error_message: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            phase: AgentPhase::Idle,
            transcript: Vec::new(),
            plan: None,
            artifact: None,
            studio: StudioState::default(),
            input_locked: false,
            error_message: None,
        }
    }
}
