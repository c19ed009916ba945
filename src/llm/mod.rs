//! 生成模型客户端抽象与实现（Gemini / Mock）

pub mod gemini;
pub mod mock;
pub mod traits;

pub use gemini::{GeminiClient, GEMINI_FLASH, GEMINI_IMAGE, GEMINI_PRO};
pub use mock::MockClient;
pub use traits::{GenerativeClient, GroundedText, InlineImage, SourceRef};
