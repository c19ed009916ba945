//! 故事生成工具：4-6 页儿童故事，每页附图像生成提示词

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::AgentError;
use crate::llm::{GenerativeClient, GEMINI_FLASH};

/// 故事单页：文字 + 配图提示词；image_url 由配图阶段回填
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryPage {
    pub text: String,
    #[serde(rename = "imagePrompt")]
    pub image_prompt: String,
    #[serde(default, rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

fn story_schema() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "text": { "type": "string" },
                "imagePrompt": { "type": "string" }
            },
            "required": ["text", "imagePrompt"]
        }
    })
}

pub async fn generate_story(
    client: &dyn GenerativeClient,
    topic: &str,
) -> Result<Vec<StoryPage>, AgentError> {
    let prompt = format!(
        "Write a children's story about: {topic}. Break it into 4-6 pages. \
         For each page, provide the text of the story and a detailed visual prompt \
         for an image generator. Output as JSON."
    );
    let raw = client
        .generate_json(GEMINI_FLASH, &prompt, story_schema())
        .await
        .map_err(AgentError::LlmError)?;
    serde_json::from_str(&raw).map_err(|e| AgentError::JsonParseError(format!("{e}: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_payload_parses() {
        let raw = r#"[
            {"text": "从前有一只小狐狸。", "imagePrompt": "a little fox in a forest"},
            {"text": "它出发去找朋友。", "imagePrompt": "fox walking through autumn leaves"}
        ]"#;
        let pages: Vec<StoryPage> = serde_json::from_str(raw).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].image_prompt, "a little fox in a forest");
        assert!(pages[0].image_url.is_none());
    }
}
