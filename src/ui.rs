//! UI rendering functions.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::App;
use crate::roadmap::{OPTION_LETTERS, Roadmap};
use crate::store::Slot;

/// Rows each roadmap takes in the list pane.
const LIST_ITEM_HEIGHT: usize = 2;

/// Contract a path by replacing the home directory with `~` for display.
pub fn contract_path(path: &std::path::Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(suffix) = path.strip_prefix(&home)
    {
        return format!("~/{}", suffix.display());
    }
    path.display().to_string()
}

/// Truncates a string to the given display width, appending "..." if truncated.
pub fn truncate_str(s: &str, max_width: usize) -> String {
    // Control characters (newlines, tabs, carriage returns) become spaces
    let single_line: String = s
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    if single_line.width() <= max_width {
        return single_line;
    }

    let budget = max_width.saturating_sub(3);
    let mut width = 0;
    let mut out = String::new();
    for c in single_line.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > budget {
            break;
        }
        width += w;
        out.push(c);
    }
    out.push_str("...");
    out
}

/// `1 Learning Step`, `5 Learning Steps`.
pub fn count_label(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{} {}", count, noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

/// Full view of a roadmap: header, numbered steps, practice questions with
/// the correct option marked.
pub fn roadmap_lines(roadmap: &Roadmap) -> Vec<Line<'static>> {
    let heading = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);
    let correct = Style::default().fg(Color::Green);

    let mut lines = vec![
        Line::from(Span::styled(roadmap.title.clone(), heading.fg(Color::Cyan))),
        Line::from(Span::styled(
            format!("Created on {}", roadmap.created_date_label()),
            dim,
        )),
        Line::from(Span::styled(format!("Slug: {}", roadmap.slug()), dim)),
        Line::from(""),
        Line::from(Span::styled("Learning Steps", heading)),
    ];

    if roadmap.steps.is_empty() {
        lines.push(Line::from(Span::styled("  (none)", dim)));
    }
    for (i, step) in roadmap.steps.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!("{:>2}. ", i + 1), Style::default().fg(Color::Blue)),
            Span::styled(step.title.clone(), heading),
        ]));
        lines.push(Line::from(format!("    {}", step.description)));
    }

    if !roadmap.questions.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Practice Questions", heading)));
    }
    for (i, question) in roadmap.questions.iter().enumerate() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("Question {}", i + 1), dim)));
        lines.push(Line::from(Span::styled(question.question.clone(), heading)));

        let correct_index = question.correct_index();
        for (j, option) in question.options.iter().enumerate() {
            let letter = OPTION_LETTERS.get(j).copied().unwrap_or('?');
            let text = format!("  {}) {}", letter, option);
            if Some(j) == correct_index {
                lines.push(Line::from(vec![
                    Span::styled(text, correct),
                    Span::styled("  ✓", correct.add_modifier(Modifier::BOLD)),
                ]));
            } else {
                lines.push(Line::from(text));
            }
        }
    }

    lines
}

/// Flattens styled lines to plain text for non-interactive output.
pub fn plain_text(lines: &[Line<'_>]) -> String {
    lines
        .iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|span| span.content.as_ref())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line summary printed by `roadmap list`.
pub fn summary_line(roadmap: &Roadmap) -> String {
    format!(
        "{}  ·  {}  ·  {}",
        roadmap.created_date_label(),
        count_label(roadmap.steps.len(), "Learning Step"),
        count_label(roadmap.questions.len(), "Practice Question"),
    )
}

pub fn draw<S: Slot>(f: &mut Frame, app: &mut App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Body
            Constraint::Length(1), // Footer
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);

    draw_list(f, app, body[0]);
    draw_detail(f, app, body[1]);
    draw_footer(f, app, chunks[2]);

    if let Some(title) = &app.pending_delete {
        draw_delete_popup(f, title);
    }
}

fn draw_header<S: Slot>(f: &mut Frame, app: &App<S>, area: Rect) {
    let mut spans = vec![
        Span::styled(
            "Your Learning Roadmaps",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  ({})", app.roadmaps.len())),
    ];

    let border_color = if let Some(error) = &app.load_error {
        spans.push(Span::raw("    "));
        spans.push(Span::styled("⚠ ", Style::default().fg(Color::Red)));
        spans.push(Span::styled(
            format!("Failed to load saved roadmaps: {}", error),
            Style::default().fg(Color::Red),
        ));
        Color::Red
    } else {
        spans.push(Span::raw("    Session: "));
        spans.push(Span::styled(
            app.session_id.clone().unwrap_or_else(|| "---".to_string()),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        if let Some(dir) = &app.log_directory {
            spans.push(Span::raw("    Logs: "));
            spans.push(Span::styled(
                contract_path(dir),
                Style::default().add_modifier(Modifier::DIM),
            ));
        }
        Color::Cyan
    };

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color)),
    );
    f.render_widget(header, area);
}

fn draw_list<S: Slot>(f: &mut Frame, app: &mut App<S>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(" Roadmaps ");
    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;

    if app.roadmaps.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "  No roadmaps yet",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "  Create one with: roadmap generate <topic>",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let visible_items = (inner_height / LIST_ITEM_HEIGHT).max(1);
    app.ensure_visible(visible_items);

    let end = (app.list_scroll + visible_items).min(app.roadmaps.len());
    let mut content = Vec::new();
    for (idx, roadmap) in app.roadmaps[app.list_scroll..end].iter().enumerate() {
        let is_selected = app.list_scroll + idx == app.selected;
        let (title_style, meta_style) = if is_selected {
            (
                Style::default().fg(Color::Black).bg(Color::White),
                Style::default().fg(Color::Black).bg(Color::White),
            )
        } else {
            (
                Style::default().fg(Color::White),
                Style::default().fg(Color::DarkGray),
            )
        };

        let title = truncate_str(&format!(" {}", roadmap.title), inner_width);
        let meta = truncate_str(
            &format!(
                "   {} · {} · {}",
                count_label(roadmap.steps.len(), "step"),
                count_label(roadmap.questions.len(), "question"),
                roadmap.created_date_label()
            ),
            inner_width,
        );
        content.push(padded_line(title, inner_width, title_style));
        content.push(padded_line(meta, inner_width, meta_style));
    }

    f.render_widget(Paragraph::new(content).block(block), area);
}

/// A line padded to `width` so a selection highlight spans the whole row.
fn padded_line(text: String, width: usize, style: Style) -> Line<'static> {
    let padding = width.saturating_sub(text.width());
    Line::from(vec![
        Span::styled(text, style),
        Span::styled(" ".repeat(padding), style),
    ])
}

fn draw_detail<S: Slot>(f: &mut Frame, app: &mut App<S>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded);

    let Some(roadmap) = app.selected_roadmap() else {
        f.render_widget(block, area);
        app.detail_max_scroll = 0;
        return;
    };

    let paragraph = Paragraph::new(roadmap_lines(roadmap))
        .block(block)
        .wrap(Wrap { trim: false });

    app.detail_height = area.height.saturating_sub(2);
    let total = u16::try_from(paragraph.line_count(area.width)).unwrap_or(u16::MAX);
    app.detail_max_scroll = total.saturating_sub(area.height);
    app.detail_scroll = app.detail_scroll.min(app.detail_max_scroll);

    f.render_widget(paragraph.scroll((app.detail_scroll, 0)), area);
}

fn draw_footer<S: Slot>(f: &mut Frame, app: &App<S>, area: Rect) {
    let text = match &app.notice {
        Some(notice) => notice.clone(),
        None => "[j/k] Select  [J/K] Scroll  [d] Delete  [r] Reload  [q] Quit".to_string(),
    };
    let footer = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(footer, area);
}

fn draw_delete_popup(f: &mut Frame, title: &str) {
    let popup_area = centered_rect(50, 5, f.area());
    f.render_widget(Clear, popup_area);
    let popup = Paragraph::new(vec![
        Line::from(format!("Delete every roadmap titled \"{}\"?", title)),
        Line::from(""),
        Line::from(Span::styled(
            "[y] Delete  [n] Cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Delete")
            .style(Style::default().fg(Color::Yellow)),
    );
    f.render_widget(popup, popup_area);
}

pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use crate::roadmap::{McqQuestion, RoadmapStep};
    use crate::store::{MemorySlot, RoadmapStore};

    fn sample() -> Roadmap {
        Roadmap::new(
            "Machine Learning",
            vec![
                RoadmapStep {
                    title: "Basics".into(),
                    description: "Learn the fundamentals".into(),
                },
                RoadmapStep {
                    title: "Advanced".into(),
                    description: "Go deeper".into(),
                },
            ],
            vec![McqQuestion {
                question: "What comes first?".into(),
                options: vec!["Basics".into(), "Advanced".into(), "Both".into(), "Neither".into()],
                correct_answer: "A".into(),
            }],
            Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("short", 10), "short");
        assert_eq!(truncate_str("exactly10!", 10), "exactly10!");
        assert_eq!(truncate_str("this is too long", 10), "this is...");
        assert_eq!(truncate_str("line\nbreak", 20), "line break");
        assert_eq!(truncate_str("tab\there\r\n", 20), "tab here  ");
    }

    #[test]
    fn test_truncate_str_multibyte() {
        // Must not split inside a character.
        assert_eq!(truncate_str("ééééééééééé", 6), "ééé...");
        assert_eq!(truncate_str("日本語のテキスト", 9), "日本語...");
    }

    #[test]
    fn test_count_label() {
        assert_eq!(count_label(1, "Learning Step"), "1 Learning Step");
        assert_eq!(count_label(5, "Learning Step"), "5 Learning Steps");
        assert_eq!(count_label(0, "Practice Question"), "0 Practice Questions");
    }

    #[test]
    fn test_roadmap_lines_lists_steps_and_marks_answer() {
        let text = plain_text(&roadmap_lines(&sample()));

        assert!(text.starts_with("Machine Learning\nCreated on "));
        assert!(text.contains("Slug: machine-learning"));
        assert!(text.contains(" 1. Basics\n    Learn the fundamentals\n 2. Advanced\n    Go deeper"));
        assert!(text.contains("Practice Questions"));
        assert!(text.contains("Question 1\nWhat comes first?"));
        assert!(text.contains("  A) Basics  ✓\n  B) Advanced\n  C) Both\n  D) Neither"));
    }

    #[test]
    fn test_roadmap_lines_without_questions() {
        let mut roadmap = sample();
        roadmap.questions.clear();
        let text = plain_text(&roadmap_lines(&roadmap));
        assert!(!text.contains("Practice Questions"));
    }

    #[test]
    fn test_roadmap_lines_invalid_answer_marks_nothing() {
        let mut roadmap = sample();
        roadmap.questions[0].correct_answer = "Z".into();
        let text = plain_text(&roadmap_lines(&roadmap));
        assert!(!text.contains('✓'));
    }

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(centered_rect(50, 5, area), Rect::new(25, 17, 50, 5));
        let small = Rect::new(0, 0, 20, 3);
        assert_eq!(centered_rect(50, 5, small), Rect::new(0, 0, 20, 3));
    }

    fn render(app: &mut App<MemorySlot>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_draw_empty_dashboard() {
        let mut app = App::new(RoadmapStore::new(MemorySlot::default()), None, None);
        let screen = render(&mut app);
        assert!(screen.contains("Your Learning Roadmaps"));
        assert!(screen.contains("No roadmaps yet"));
    }

    #[test]
    fn test_draw_dashboard_with_roadmap() {
        let mut store = RoadmapStore::new(MemorySlot::default());
        store.save(&sample()).unwrap();
        let mut app = App::new(store, Some("abc123".into()), None);

        let screen = render(&mut app);
        assert!(screen.contains("Machine Learning"));
        assert!(screen.contains("2 steps · 1 question"));
        assert!(screen.contains("abc123"));
        assert!(screen.contains("Learn the fundamentals"));
    }

    #[test]
    fn test_draw_delete_popup() {
        let mut store = RoadmapStore::new(MemorySlot::default());
        store.save(&sample()).unwrap();
        let mut app = App::new(store, None, None);
        app.request_delete();

        let screen = render(&mut app);
        assert!(screen.contains("Delete every roadmap titled"));
    }
}
