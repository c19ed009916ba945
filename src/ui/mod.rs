//! 终端界面：主循环、事件处理与渲染

pub mod app;
pub mod event;
pub mod render;

pub use app::run_app;
