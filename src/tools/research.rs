//! 网络调研工具：带搜索落地的生成，返回正文与来源引用

use serde::Serialize;

use crate::core::AgentError;
use crate::llm::{GenerativeClient, SourceRef, GEMINI_FLASH};

/// 调研结果：正文 + 来源引用（无 uri 的来源已在客户端层过滤）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResearchResult {
    pub text: String,
    pub sources: Vec<SourceRef>,
}

pub async fn research_web(
    client: &dyn GenerativeClient,
    prompt: &str,
) -> Result<ResearchResult, AgentError> {
    let grounded = client
        .generate_grounded(GEMINI_FLASH, prompt)
        .await
        .map_err(AgentError::LlmError)?;
    Ok(ResearchResult {
        text: grounded.text,
        sources: grounded.sources,
    })
}
