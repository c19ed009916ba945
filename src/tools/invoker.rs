//! 智能体工具调用器
//!
//! 四种核心工具的封闭枚举与穷举分派：新增工具需要扩展枚举与对应分支，编译期即可发现遗漏。
//! 调用失败原样转为 InvocationFailed；每次调用输出结构化审计日志（JSON）。

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::core::AgentError;
use crate::llm::{GenerativeClient, GEMINI_FLASH};
use crate::tools::{generate_doc, generate_slides, research_web, ResearchResult, Slide};

/// 智能体可用的四种工具（序列化名与 Planner 输出一致）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToolKind {
    #[serde(rename = "researchWeb")]
    ResearchWeb,
    #[serde(rename = "generateDoc")]
    GenerateDoc,
    #[serde(rename = "generateSlides")]
    GenerateSlides,
    #[serde(rename = "directResponse")]
    DirectResponse,
}

impl ToolKind {
    /// 按 Planner 输出的名称解析；未知名称返回 None（由计划接收校验拒绝）
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "researchWeb" => Some(Self::ResearchWeb),
            "generateDoc" => Some(Self::GenerateDoc),
            "generateSlides" => Some(Self::GenerateSlides),
            "directResponse" => Some(Self::DirectResponse),
            _ => None,
        }
    }

    /// 工具名（用于上下文摘要行与界面展示）
    pub fn name(&self) -> &'static str {
        match self {
            Self::ResearchWeb => "researchWeb",
            Self::GenerateDoc => "generateDoc",
            Self::GenerateSlides => "generateSlides",
            Self::DirectResponse => "directResponse",
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 工具返回值：按工具定型，绝不返回未知形状
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    Text(String),
    Research(ResearchResult),
    Slides(Vec<Slide>),
}

impl ToolOutput {
    /// 文本视图（对话与复制用）；结构化结果转为 JSON 文本
    pub fn as_display_text(&self) -> String {
        match self {
            ToolOutput::Text(s) => s.clone(),
            other => serde_json::to_string_pretty(other).unwrap_or_default(),
        }
    }
}

/// directResponse 空回复时的兜底问候
const DEFAULT_GREETING: &str = "Hello! How can I help you today?";

/// 工具调用器：持有生成客户端，将任务分派到对应的生成能力
pub struct ToolInvoker {
    client: Arc<dyn GenerativeClient>,
}

impl ToolInvoker {
    pub fn new(client: Arc<dyn GenerativeClient>) -> Self {
        Self { client }
    }

    /// 分派一个任务到对应工具；外部调用失败原样转为 InvocationFailed
    pub async fn invoke(
        &self,
        description: &str,
        tool: ToolKind,
        context: &str,
    ) -> Result<ToolOutput, AgentError> {
        let start = Instant::now();
        let result = self.dispatch(description, tool, context).await;
        let audit = serde_json::json!({
            "event": "tool_audit",
            "tool": tool.name(),
            "ok": result.is_ok(),
            "duration_ms": start.elapsed().as_millis() as u64,
        });
        tracing::info!(audit = %audit.to_string(), "tool");
        result
    }

    async fn dispatch(
        &self,
        description: &str,
        tool: ToolKind,
        context: &str,
    ) -> Result<ToolOutput, AgentError> {
        match tool {
            ToolKind::DirectResponse => {
                let prompt = format!(
                    "User Task: {description}\nSystem Context: You are a friendly AI Agent. \
                     Provide a direct, helpful response to the user's request. \
                     Context so far: {context}"
                );
                let text = self
                    .client
                    .generate_text(GEMINI_FLASH, &prompt)
                    .await
                    .map_err(AgentError::InvocationFailed)?;
                Ok(ToolOutput::Text(if text.trim().is_empty() {
                    DEFAULT_GREETING.to_string()
                } else {
                    text
                }))
            }
            ToolKind::ResearchWeb => {
                let prompt = format!("{description}\nContext: {context}");
                research_web(self.client.as_ref(), &prompt)
                    .await
                    .map(ToolOutput::Research)
                    .map_err(|e| AgentError::InvocationFailed(e.to_string()))
            }
            ToolKind::GenerateDoc => {
                let prompt = format!("{description}\nContext: {context}");
                generate_doc(self.client.as_ref(), &prompt)
                    .await
                    .map(ToolOutput::Text)
                    .map_err(|e| AgentError::InvocationFailed(e.to_string()))
            }
            ToolKind::GenerateSlides => {
                let prompt = format!("{description}\nContext: {context}");
                generate_slides(self.client.as_ref(), &prompt)
                    .await
                    .map(ToolOutput::Slides)
                    .map_err(|e| AgentError::InvocationFailed(e.to_string()))
            }
        }
    }
}
