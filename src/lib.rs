//! AnyGen - 多工具生成工作台
//!
//! 模块划分：
//! - **agent**: 自主智能体核心（Planner、顺序执行循环、过程事件）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型、会话状态与编排器
//! - **llm**: 生成模型客户端抽象与实现（Gemini / Mock）
//! - **tools**: 生成能力封装（调研、文档、幻灯片、故事、图片、数据、音频）与工具调用器
//! - **ui**: Ratatui TUI 界面

pub mod agent;
pub mod config;
pub mod core;
pub mod llm;
pub mod tools;
pub mod ui;
