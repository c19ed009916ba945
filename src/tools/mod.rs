//! 生成能力封装
//!
//! 每个文件封装一种外部生成能力（薄请求/响应包装）；invoker 将智能体任务
//! 穷举分派到四种核心工具，其余能力由工作室视图直接调用。

pub mod audio;
pub mod data;
pub mod doc;
pub mod image;
pub mod invoker;
pub mod research;
pub mod slides;
pub mod story;

pub use audio::{mime_for_extension, summarize_audio};
pub use data::{analyze_data, AnalysisResult, ChartType, DataInsight};
pub use doc::generate_doc;
pub use image::generate_image;
pub use invoker::{ToolInvoker, ToolKind, ToolOutput};
pub use research::{research_web, ResearchResult};
pub use slides::{generate_slides, Slide, SlideLayout};
pub use story::{generate_story, StoryPage};
