//! 幻灯片生成工具：JSON Schema 约束输出 5-7 页幻灯片

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::AgentError;
use crate::llm::{GenerativeClient, GEMINI_FLASH};

/// 幻灯片版式；模型偶尔会造出未知版式名，统一回退为 bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlideLayout {
    TextOnly,
    ImageText,
    #[serde(other)]
    Bullet,
}

/// 单页幻灯片
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub title: String,
    #[serde(default)]
    pub content: Vec<String>,
    pub layout: SlideLayout,
}

/// 幻灯片响应的 JSON Schema（随生成请求一同下发）
fn slides_schema() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "title": { "type": "string" },
                "content": { "type": "array", "items": { "type": "string" } },
                "layout": { "type": "string" }
            },
            "required": ["title", "content", "layout"]
        }
    })
}

pub async fn generate_slides(
    client: &dyn GenerativeClient,
    topic: &str,
) -> Result<Vec<Slide>, AgentError> {
    let prompt = format!("Generate 5–7 presentation slides on: {topic}. JSON output.");
    let raw = client
        .generate_json(GEMINI_FLASH, &prompt, slides_schema())
        .await
        .map_err(AgentError::LlmError)?;
    serde_json::from_str(&raw).map_err(|e| AgentError::JsonParseError(format!("{e}: {raw}")))
}
