//! 音频摘要工具：内联音频数据 + 固定摘要指令

use crate::core::AgentError;
use crate::llm::{GenerativeClient, GEMINI_FLASH};

const SUMMARY_INSTRUCTION: &str =
    "Please provide a concise and professional summary of this audio recording.";

pub async fn summarize_audio(
    client: &dyn GenerativeClient,
    base64_data: &str,
    mime_type: &str,
) -> Result<String, AgentError> {
    client
        .generate_inline(GEMINI_FLASH, mime_type, base64_data, SUMMARY_INSTRUCTION)
        .await
        .map_err(AgentError::LlmError)
}

/// 按扩展名推断音频 MIME 类型（文件上传用）
pub fn mime_for_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        "webm" => "audio/webm",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_for_extension() {
        assert_eq!(mime_for_extension("mp3"), "audio/mpeg");
        assert_eq!(mime_for_extension("WAV"), "audio/wav");
        assert_eq!(mime_for_extension("webm"), "audio/webm");
        assert_eq!(mime_for_extension("xyz"), "application/octet-stream");
        assert_eq!(mime_for_extension(""), "application/octet-stream");
    }
}
