//! 生成模型客户端抽象
//!
//! 所有后端（Gemini / Mock）实现 GenerativeClient：纯文本、JSON Schema 约束输出、
//! 搜索落地、图像生成与内联媒体五种调用形态。错误以 String 形式返回，由调用方归类。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 来源引用（搜索落地返回的网页标题与 URI）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub title: String,
    pub uri: String,
}

/// 搜索落地回复：正文 + 来源引用
#[derive(Debug, Clone, Default)]
pub struct GroundedText {
    pub text: String,
    pub sources: Vec<SourceRef>,
}

/// 图像生成返回的内联数据
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub mime_type: String,
    pub data_base64: String,
}

/// 生成模型客户端 trait
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// 纯文本生成
    async fn generate_text(&self, model: &str, prompt: &str) -> Result<String, String>;

    /// 结构化生成：responseSchema 约束输出为 JSON，返回原始 JSON 文本
    async fn generate_json(
        &self,
        model: &str,
        prompt: &str,
        schema: Value,
    ) -> Result<String, String>;

    /// 带搜索落地的生成：正文 + 来源引用
    async fn generate_grounded(&self, model: &str, prompt: &str) -> Result<GroundedText, String>;

    /// 图像生成；模型可能不返回图像（None）
    async fn generate_image(&self, model: &str, prompt: &str)
        -> Result<Option<InlineImage>, String>;

    /// 携带内联媒体（如音频）的生成
    async fn generate_inline(
        &self,
        model: &str,
        mime_type: &str,
        data_base64: &str,
        prompt: &str,
    ) -> Result<String, String>;
}
