//! 图像生成工具：内联图像数据转为 data URL

use crate::core::AgentError;
use crate::llm::{GenerativeClient, InlineImage, GEMINI_IMAGE};

/// 生成一张图像，返回 `data:{mime};base64,{data}` 形式的 URL；模型未返回图像时为 None
pub async fn generate_image(
    client: &dyn GenerativeClient,
    prompt: &str,
) -> Result<Option<String>, AgentError> {
    let image = client
        .generate_image(GEMINI_IMAGE, prompt)
        .await
        .map_err(AgentError::LlmError)?;
    Ok(image.map(to_data_url))
}

fn to_data_url(image: InlineImage) -> String {
    format!("data:{};base64,{}", image.mime_type, image.data_base64)
}
