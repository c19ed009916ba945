//! 终端应用主循环
//!
//! 负责终端的进入/恢复、视图切换与输入缓冲，状态快照来自 watch 通道，
//! 用户意图通过 Command 通道发给编排器。

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::{mpsc, watch};

use crate::core::{Command, StudioRequest, UiState};
use crate::ui::event::{AppEvent, EventHandler};
use crate::ui::render::draw;

/// 当前视图
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Agent,
    Research,
    Slides,
    Docs,
    Story,
    Data,
    Audio,
}

impl View {
    pub const ALL: [View; 8] = [
        View::Home,
        View::Agent,
        View::Research,
        View::Slides,
        View::Docs,
        View::Story,
        View::Data,
        View::Audio,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|v| *v == self).unwrap_or(0)
    }

    pub fn next(self) -> View {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> View {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn title(self) -> &'static str {
        match self {
            View::Home => "首页",
            View::Agent => "智能体",
            View::Research => "调研",
            View::Slides => "幻灯片",
            View::Docs => "文档",
            View::Story => "绘本",
            View::Data => "数据",
            View::Audio => "音频",
        }
    }

    pub fn input_hint(self) -> &'static str {
        match self {
            View::Home | View::Agent => "输入目标后回车",
            View::Research => "输入调研问题后回车",
            View::Slides => "输入演示主题后回车",
            View::Docs => "输入文档需求后回车",
            View::Story => "输入故事主题后回车",
            View::Data => "粘贴数据后回车",
            View::Audio => "输入音频文件路径后回车",
        }
    }
}

/// 运行 TUI 直到用户退出
pub async fn run_app(
    mut state_rx: watch::Receiver<UiState>,
    cmd_tx: mpsc::UnboundedSender<Command>,
) -> anyhow::Result<()> {
    enable_raw_mode().context("进入原始终端模式失败")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("进入备用屏幕失败")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("创建终端失败")?;

    let result = run_loop(&mut terminal, &mut state_rx, cmd_tx).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state_rx: &mut watch::Receiver<UiState>,
    cmd_tx: mpsc::UnboundedSender<Command>,
) -> anyhow::Result<()> {
    let handler = EventHandler::new(cmd_tx);
    let mut view = View::Home;
    let mut input_buffer = String::new();
    let mut scroll: u16 = 0;

    loop {
        let state = state_rx.borrow_and_update().clone();
        terminal.draw(|f| draw(f, &state, view, &input_buffer, scroll))?;

        match handler.poll()? {
            Some(AppEvent::Command(Command::Quit)) => break,
            Some(AppEvent::Command(Command::Clear)) => {
                input_buffer.clear();
                scroll = 0;
            }
            Some(AppEvent::Command(_)) => {}
            Some(AppEvent::Key(key)) => match key.code {
                KeyCode::Tab => {
                    view = view.next();
                    scroll = 0;
                }
                KeyCode::BackTab => {
                    view = view.prev();
                    scroll = 0;
                }
                KeyCode::Up => scroll = scroll.saturating_sub(1),
                KeyCode::Down => scroll = scroll.saturating_add(1),
                // 执行中锁定输入，避免并发提交
                _ if state.input_locked => {}
                KeyCode::Enter => {
                    let text = input_buffer.trim().to_string();
                    input_buffer.clear();
                    if text.is_empty() {
                        continue;
                    }
                    match view {
                        View::Home | View::Agent => {
                            view = View::Agent;
                            handler.send_submit(text);
                        }
                        View::Research => handler.send_studio(StudioRequest::Research(text)),
                        View::Slides => handler.send_studio(StudioRequest::Slides(text)),
                        View::Docs => handler.send_studio(StudioRequest::Doc(text)),
                        View::Story => handler.send_studio(StudioRequest::Story(text)),
                        View::Data => handler.send_studio(StudioRequest::Data(text)),
                        View::Audio => {
                            handler.send_studio(StudioRequest::Audio(PathBuf::from(text)))
                        }
                    }
                }
                KeyCode::Backspace => {
                    input_buffer.pop();
                }
                KeyCode::Char(c) => input_buffer.push(c),
                _ => {}
            },
            None => {}
        }
    }

    Ok(())
}
