//! Mock 生成客户端（用于测试与无 API Key 场景）
//!
//! 维护一个脚本化回复队列：各方法按序弹出 Ok/Err，并记录收到的 prompt 供断言；
//! 队列为空时回退到内置的固定回复，便于在无 Key 时本地跑通完整流程。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::llm::{GenerativeClient, GroundedText, InlineImage, SourceRef};

/// Mock 客户端：按序弹出脚本化回复
#[derive(Debug, Default)]
pub struct MockClient {
    responses: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<String>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// 用脚本化回复序列创建；各方法按调用顺序弹出
    pub fn with_responses(responses: Vec<Result<String, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn push_response(&self, response: Result<String, String>) {
        if let Ok(mut q) = self.responses.lock() {
            q.push_back(response);
        }
    }

    /// 已收到的 prompt 列表（按调用顺序）
    pub fn recorded_prompts(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, prompt: &str) {
        if let Ok(mut c) = self.calls.lock() {
            c.push(prompt.to_string());
        }
    }

    fn pop(&self) -> Option<Result<String, String>> {
        self.responses.lock().ok().and_then(|mut q| q.pop_front())
    }
}

/// 队列耗尽时 generate_json 的兜底：单个 directResponse 任务的计划
const FALLBACK_PLAN_JSON: &str = r#"{"objective":"回应用户的输入","tasks":[{"id":"1","description":"直接回复用户","tool":"directResponse"}]}"#;

#[async_trait]
impl GenerativeClient for MockClient {
    async fn generate_text(&self, _model: &str, prompt: &str) -> Result<String, String> {
        self.record(prompt);
        self.pop()
            .unwrap_or_else(|| Ok("你好！我是 AnyGen，很高兴为你服务。".to_string()))
    }

    async fn generate_json(
        &self,
        _model: &str,
        prompt: &str,
        _schema: Value,
    ) -> Result<String, String> {
        self.record(prompt);
        self.pop().unwrap_or_else(|| Ok(FALLBACK_PLAN_JSON.to_string()))
    }

    async fn generate_grounded(&self, _model: &str, prompt: &str) -> Result<GroundedText, String> {
        self.record(prompt);
        let text = match self.pop() {
            Some(Ok(t)) => t,
            Some(Err(e)) => return Err(e),
            None => "（Mock 调研结果）".to_string(),
        };
        Ok(GroundedText {
            text,
            sources: vec![SourceRef {
                title: "Mock Source".to_string(),
                uri: "https://example.com/mock".to_string(),
            }],
        })
    }

    async fn generate_image(
        &self,
        _model: &str,
        prompt: &str,
    ) -> Result<Option<InlineImage>, String> {
        self.record(prompt);
        match self.pop() {
            Some(Ok(data)) => Ok(Some(InlineImage {
                mime_type: "image/png".to_string(),
                data_base64: data,
            })),
            Some(Err(e)) => Err(e),
            None => Ok(None),
        }
    }

    async fn generate_inline(
        &self,
        _model: &str,
        _mime_type: &str,
        _data_base64: &str,
        prompt: &str,
    ) -> Result<String, String> {
        self.record(prompt);
        self.pop().unwrap_or_else(|| Ok("（Mock 音频摘要）".to_string()))
    }
}
