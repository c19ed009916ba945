//! 界面渲染
//!
//! 顶部为视图标签页，主体按当前视图绘制（智能体视图为「对话+任务列表 | 工件工作台」
//! 双栏，工作室视图为单栏结果），底部为输入框（标题显示当前阶段与快捷键提示）。

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::agent::TaskStatus;
use crate::core::{AgentPhase, Artifact, EntryKind, Role, UiState};
use crate::tools::{ChartType, ToolKind, ToolOutput};
use crate::ui::app::View;

/// 数据视图条形图的最大宽度（字符数）
const CHART_BAR_WIDTH: f64 = 30.0;

fn phase_label(state: &UiState) -> &'static str {
    match state.phase {
        AgentPhase::Idle => "就绪",
        AgentPhase::Planning => "规划中…",
        AgentPhase::Executing => "执行中…",
        AgentPhase::StudioRunning => "生成中…",
    }
}

fn status_glyph(status: TaskStatus) -> Span<'static> {
    match status {
        TaskStatus::Pending => Span::styled("○", Style::default().fg(Color::DarkGray)),
        TaskStatus::Running => Span::styled("◐", Style::default().fg(Color::Cyan)),
        TaskStatus::Completed => Span::styled("●", Style::default().fg(Color::Green)),
        TaskStatus::Failed => Span::styled("✗", Style::default().fg(Color::Red)),
    }
}

/// 绘制一帧
pub fn draw(f: &mut Frame, state: &UiState, view: View, input_buffer: &str, scroll: u16) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(5),
        ])
        .split(f.area());

    draw_tabs(f, chunks[0], view);
    match view {
        View::Agent => draw_agent(f, chunks[1], state, scroll),
        _ => draw_studio(f, chunks[1], state, view, scroll),
    }
    draw_input(f, chunks[2], state, view, input_buffer);
}

fn draw_tabs(f: &mut Frame, area: Rect, view: View) {
    let titles: Vec<Line> = View::ALL.iter().map(|v| Line::from(v.title())).collect();
    let tabs = Tabs::new(titles)
        .select(view.index())
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL).title(" AnyGen "));
    f.render_widget(tabs, area);
}

fn draw_input(f: &mut Frame, area: Rect, state: &UiState, view: View, input_buffer: &str) {
    let title = format!(
        " {} | {} | Tab 切换视图 Ctrl+L 清空 Ctrl+X 清工件 Ctrl+Q 退出 ",
        phase_label(state),
        view.input_hint()
    );
    let style = if state.input_locked {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };
    let input = Paragraph::new(input_buffer)
        .style(style)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(input, area);
}

fn draw_agent(f: &mut Frame, area: Rect, state: &UiState, scroll: u16) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    // 左栏：对话转录 + 任务执行列表
    let mut lines: Vec<Line> = Vec::new();
    for entry in &state.transcript {
        match entry.role {
            Role::User => lines.push(Line::from(vec![
                Span::styled("你 > ", Style::default().fg(Color::Yellow)),
                Span::raw(entry.content.clone()),
            ])),
            Role::Assistant => {
                if entry.kind == EntryKind::PlanAnnouncement {
                    if let Some(trace) = &entry.trace {
                        lines.push(Line::from(Span::styled(
                            format!("· {trace}"),
                            Style::default().fg(Color::DarkGray),
                        )));
                    }
                }
                lines.push(Line::from(vec![
                    Span::styled("AnyGen > ", Style::default().fg(Color::Cyan)),
                    Span::raw(entry.content.clone()),
                ]));
            }
        }
        lines.push(Line::from(""));
    }
    if let Some(plan) = &state.plan {
        lines.push(Line::from(Span::styled(
            "── 任务执行协议 ──",
            Style::default().fg(Color::DarkGray),
        )));
        for task in &plan.tasks {
            lines.push(Line::from(vec![
                status_glyph(task.status),
                Span::raw(" "),
                Span::styled(
                    task.tool.name().to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!("  {}", task.description)),
            ]));
        }
    }
    if let Some(err) = &state.error_message {
        lines.push(Line::from(Span::styled(
            format!("错误：{err}"),
            Style::default().fg(Color::Red),
        )));
    }
    let chat = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(Block::default().borders(Borders::ALL).title(" 对话 "));
    f.render_widget(chat, cols[0]);

    // 右栏：工件工作台（单槽位，仅展示最近一次结构化结果）
    let (title, body) = match &state.artifact {
        Some(artifact) => (
            format!(" 工作台：{} ({}) ", artifact.description, artifact.tool),
            artifact_text(artifact),
        ),
        None => (
            " 工作台 ".to_string(),
            "工作台就绪。\n\n生成的文档、幻灯片或调研结果将在此处显示。".to_string(),
        ),
    };
    let pane = Paragraph::new(body)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(pane, cols[1]);
}

/// 工件槽位的文本渲染（按工具定制格式）
fn artifact_text(artifact: &Artifact) -> String {
    match (&artifact.tool, &artifact.data) {
        (ToolKind::GenerateSlides, ToolOutput::Slides(slides)) => {
            let mut out = String::new();
            for (i, slide) in slides.iter().enumerate() {
                out.push_str(&format!("幻灯片 {}：{}\n", i + 1, slide.title));
                for point in &slide.content {
                    out.push_str(&format!("  • {point}\n"));
                }
                out.push('\n');
            }
            out
        }
        (ToolKind::ResearchWeb, ToolOutput::Research(research)) => {
            let mut out = research.text.clone();
            if !research.sources.is_empty() {
                out.push_str("\n\n来源引用：\n");
                for source in &research.sources {
                    out.push_str(&format!("  - {} ({})\n", source.title, source.uri));
                }
            }
            out
        }
        (_, data) => data.as_display_text(),
    }
}

fn draw_studio(f: &mut Frame, area: Rect, state: &UiState, view: View, scroll: u16) {
    let body = match view {
        View::Home => {
            "欢迎使用 AnyGen 多工具生成工作台。\n\n\
             在下方输入一个目标并回车，将交给自主智能体规划执行；\n\
             或用 Tab 切换到某个工作室视图，单独使用对应的生成能力。"
                .to_string()
        }
        View::Research => match &state.studio.research {
            Some(r) => {
                let mut out = r.text.clone();
                if !r.sources.is_empty() {
                    out.push_str("\n\n来源引用：\n");
                    for s in &r.sources {
                        out.push_str(&format!("  - {} ({})\n", s.title, s.uri));
                    }
                }
                out
            }
            None => "输入调研问题并回车。".to_string(),
        },
        View::Slides => match &state.studio.slides {
            Some(slides) => slides
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    let mut out = format!("幻灯片 {}：{}\n", i + 1, s.title);
                    for point in &s.content {
                        out.push_str(&format!("  • {point}\n"));
                    }
                    out
                })
                .collect::<Vec<_>>()
                .join("\n"),
            None => "输入演示主题并回车。".to_string(),
        },
        View::Docs => state
            .studio
            .doc
            .clone()
            .unwrap_or_else(|| "输入文档需求并回车。".to_string()),
        View::Story => match &state.studio.story {
            Some(pages) => pages
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    format!(
                        "第 {} 页{}\n{}\n（配图提示：{}）\n",
                        i + 1,
                        if p.image_url.is_some() { "（已配图）" } else { "" },
                        p.text,
                        p.image_prompt
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"),
            None => "输入故事主题并回车。".to_string(),
        },
        View::Data => match &state.studio.data {
            Some(analysis) => {
                let max = analysis
                    .chart_data
                    .iter()
                    .map(|d| d.value)
                    .fold(0.0_f64, f64::max);
                let chart_name = match analysis.chart_type {
                    ChartType::Bar => "柱状图",
                    ChartType::Line => "折线图",
                    ChartType::Pie => "饼图",
                };
                let mut out = format!("{}\n\n建议图表：{}\n\n", analysis.summary, chart_name);
                for point in &analysis.chart_data {
                    let width = if max > 0.0 {
                        ((point.value / max) * CHART_BAR_WIDTH).round() as usize
                    } else {
                        0
                    };
                    out.push_str(&format!(
                        "{:<12} {} {}\n",
                        point.label,
                        "█".repeat(width),
                        point.value
                    ));
                }
                out
            }
            None => "粘贴待分析的数据并回车。".to_string(),
        },
        View::Audio => state
            .studio
            .audio
            .clone()
            .unwrap_or_else(|| "输入音频文件路径并回车。".to_string()),
        View::Agent => unreachable!("agent view has its own renderer"),
    };

    let mut text = body;
    if let Some(err) = &state.error_message {
        text.push_str(&format!("\n\n错误：{err}"));
    }
    let pane = Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(Block::default().borders(Borders::ALL).title(format!(" {} ", view.title())));
    f.render_widget(pane, area);
}
