//! Gemini API 客户端
//!
//! 通过 REST generateContent 端点调用；支持 JSON Schema 约束输出、Google 搜索落地、
//! 图像生成与内联媒体。API Key 来自环境变量 GEMINI_API_KEY（兼容 API_KEY）。

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::llm::{GenerativeClient, GroundedText, InlineImage, SourceRef};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// 快速模型：对话、幻灯片、故事、调研、音频摘要
pub const GEMINI_FLASH: &str = "gemini-3-flash-preview";
/// 专业模型：规划、文档撰写、数据分析
pub const GEMINI_PRO: &str = "gemini-3-pro-preview";
/// 图像生成模型
pub const GEMINI_IMAGE: &str = "gemini-2.5-flash-image";

/// Gemini 客户端：持有 reqwest Client、端点与 API Key
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(base_url: Option<&str>, api_key: &str, timeout_secs: u64) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: base_url.unwrap_or(GEMINI_BASE_URL).trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// 从环境变量读取 API Key；未设置时返回 None（由编排器回退到 Mock）
    pub fn from_env(base_url: Option<&str>, timeout_secs: u64) -> Option<Self> {
        let key = std::env::var("GEMINI_API_KEY")
            .ok()
            .or_else(|| std::env::var("API_KEY").ok())?;
        Some(Self::new(base_url, &key, timeout_secs))
    }

    async fn generate(&self, model: &str, body: Value) -> Result<Value, String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;
        let status = resp.status();
        let value: Value = resp
            .json()
            .await
            .map_err(|e| format!("invalid response body: {e}"))?;
        if !status.is_success() {
            let msg = value
                .pointer("/error/message")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown error");
            return Err(format!("API error ({status}): {msg}"));
        }
        Ok(value)
    }
}

/// 拼接首个候选回复中的所有文本 part
fn extract_text(value: &Value) -> String {
    value
        .pointer("/candidates/0/content/parts")
        .and_then(|v| v.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

/// 提取搜索落地的来源引用；无 uri 的 chunk 被丢弃
fn extract_sources(value: &Value) -> Vec<SourceRef> {
    value
        .pointer("/candidates/0/groundingMetadata/groundingChunks")
        .and_then(|v| v.as_array())
        .map(|chunks| {
            chunks
                .iter()
                .filter_map(|c| {
                    let web = c.get("web")?;
                    let uri = web.get("uri").and_then(|u| u.as_str()).unwrap_or("");
                    if uri.is_empty() {
                        return None;
                    }
                    Some(SourceRef {
                        title: web
                            .get("title")
                            .and_then(|t| t.as_str())
                            .unwrap_or("Source")
                            .to_string(),
                        uri: uri.to_string(),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

/// 提取首个候选回复中的内联图像数据
fn extract_inline_image(value: &Value) -> Option<InlineImage> {
    let parts = value.pointer("/candidates/0/content/parts")?.as_array()?;
    for part in parts {
        if let Some(inline) = part.get("inlineData") {
            return Some(InlineImage {
                mime_type: inline.get("mimeType")?.as_str()?.to_string(),
                data_base64: inline.get("data")?.as_str()?.to_string(),
            });
        }
    }
    None
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate_text(&self, model: &str, prompt: &str) -> Result<String, String> {
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });
        Ok(extract_text(&self.generate(model, body).await?))
    }

    async fn generate_json(
        &self,
        model: &str,
        prompt: &str,
        schema: Value,
    ) -> Result<String, String> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema,
            }
        });
        Ok(extract_text(&self.generate(model, body).await?))
    }

    async fn generate_grounded(&self, model: &str, prompt: &str) -> Result<GroundedText, String> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "tools": [{ "googleSearch": {} }],
        });
        let value = self.generate(model, body).await?;
        Ok(GroundedText {
            text: extract_text(&value),
            sources: extract_sources(&value),
        })
    }

    async fn generate_image(
        &self,
        model: &str,
        prompt: &str,
    ) -> Result<Option<InlineImage>, String> {
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });
        let value = self.generate(model, body).await?;
        Ok(extract_inline_image(&value))
    }

    async fn generate_inline(
        &self,
        model: &str,
        mime_type: &str,
        data_base64: &str,
        prompt: &str,
    ) -> Result<String, String> {
        let body = json!({
            "contents": [{
                "parts": [
                    { "inlineData": { "mimeType": mime_type, "data": data_base64 } },
                    { "text": prompt },
                ]
            }]
        });
        Ok(extract_text(&self.generate(model, body).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_joins_parts() {
        let value = json!({
            "candidates": [{ "content": { "parts": [
                { "text": "Hello " }, { "text": "world" }
            ] } }]
        });
        assert_eq!(extract_text(&value), "Hello world");
    }

    #[test]
    fn test_extract_text_missing_candidates() {
        assert_eq!(extract_text(&json!({})), "");
    }

    #[test]
    fn test_extract_sources_filters_empty_uri() {
        let value = json!({
            "candidates": [{ "groundingMetadata": { "groundingChunks": [
                { "web": { "title": "EV News", "uri": "https://example.com/ev" } },
                { "web": { "title": "No URI" } },
                { "retrievedContext": {} },
            ] } }]
        });
        let sources = extract_sources(&value);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].title, "EV News");
        assert_eq!(sources[0].uri, "https://example.com/ev");
    }

    #[test]
    fn test_extract_sources_default_title() {
        let value = json!({
            "candidates": [{ "groundingMetadata": { "groundingChunks": [
                { "web": { "uri": "https://example.com" } },
            ] } }]
        });
        assert_eq!(extract_sources(&value)[0].title, "Source");
    }

    #[test]
    fn test_extract_inline_image() {
        let value = json!({
            "candidates": [{ "content": { "parts": [
                { "text": "here is your image" },
                { "inlineData": { "mimeType": "image/png", "data": "aGVsbG8=" } },
            ] } }]
        });
        let image = extract_inline_image(&value).unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data_base64, "aGVsbG8=");
    }

    #[test]
    fn test_extract_inline_image_absent() {
        let value = json!({
            "candidates": [{ "content": { "parts": [{ "text": "text only" }] } }]
        });
        assert!(extract_inline_image(&value).is_none());
    }
}
