//! 文档撰写工具：专业模型纯文本生成

use crate::core::AgentError;
use crate::llm::{GenerativeClient, GEMINI_PRO};

pub async fn generate_doc(
    client: &dyn GenerativeClient,
    prompt: &str,
) -> Result<String, AgentError> {
    client
        .generate_text(GEMINI_PRO, prompt)
        .await
        .map_err(AgentError::LlmError)
}
