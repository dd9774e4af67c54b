//! Screen layouts.
//!
//! Both layouts use one row for the prompt, one for the status line and the rest
//! for result lines. They differ in where the prompt sits and which way the list
//! grows.

use crate::buffer::Span as MatchSpan;
use crate::error::{LinepickError, Result};
use crate::view::screen::{Row, Screen};
use crate::view::theme::ColorTheme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use std::fmt;

pub const TOP_DOWN: &str = "top-down";
pub const BOTTOM_UP: &str = "bottom-up";

/// Rows taken by the prompt and status lines.
const CHROME_ROWS: u16 = 2;

/// A strategy for placing the prompt, result lines and status on screen.
pub trait ScreenLayout: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    /// Result lines that fit in a terminal `height` rows tall.
    fn lines_per_page(&self, height: u16) -> usize {
        usize::from(height.saturating_sub(CHROME_ROWS)).max(1)
    }

    fn draw(&self, frame: &mut Frame, screen: &Screen, theme: &ColorTheme);
}

/// Prompt on top, first result line right below it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopDown;

/// Prompt at the bottom, first result line right above the status line.
#[derive(Debug, Clone, Copy, Default)]
pub struct BottomUp;

impl ScreenLayout for TopDown {
    fn name(&self) -> &'static str {
        TOP_DOWN
    }

    fn draw(&self, frame: &mut Frame, screen: &Screen, theme: &ColorTheme) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(frame.size());

        draw_prompt(frame, chunks[0], screen, theme);
        let lines: Vec<Line> = screen.rows.iter().map(|row| row_line(row, theme)).collect();
        frame.render_widget(Paragraph::new(lines), chunks[1]);
        draw_status(frame, chunks[2], screen, theme);
    }
}

impl ScreenLayout for BottomUp {
    fn name(&self) -> &'static str {
        BOTTOM_UP
    }

    fn draw(&self, frame: &mut Frame, screen: &Screen, theme: &ColorTheme) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(frame.size());

        let list = chunks[0];
        let padding = usize::from(list.height).saturating_sub(screen.rows.len());
        let lines: Vec<Line> = std::iter::repeat_with(Line::default)
            .take(padding)
            .chain(screen.rows.iter().rev().map(|row| row_line(row, theme)))
            .collect();
        frame.render_widget(Paragraph::new(lines), list);
        draw_status(frame, chunks[1], screen, theme);
        draw_prompt(frame, chunks[2], screen, theme);
    }
}

/// Resolve a layout by its configured name.
pub fn layout_by_name(name: &str) -> Result<Box<dyn ScreenLayout>> {
    match name {
        TOP_DOWN => Ok(Box::new(TopDown)),
        BOTTOM_UP => Ok(Box::new(BottomUp)),
        other => Err(LinepickError::UnknownLayout {
            name: other.to_string(),
        }),
    }
}

fn draw_prompt(frame: &mut Frame, area: Rect, screen: &Screen, theme: &ColorTheme) {
    let line = Line::from(vec![
        Span::styled(screen.prompt.as_str(), theme.prompt),
        Span::raw(" "),
        Span::raw(screen.query.as_str()),
    ]);
    frame.render_widget(Paragraph::new(line), area);

    let offset = screen.prompt.chars().count() + 1 + screen.caret;
    let x = area
        .x
        .saturating_add(u16::try_from(offset).unwrap_or(u16::MAX))
        .min(area.right().saturating_sub(1));
    frame.set_cursor(x, area.y);
}

fn draw_status(frame: &mut Frame, area: Rect, screen: &Screen, theme: &ColorTheme) {
    let status = Paragraph::new(screen.info()).style(theme.status_style());
    frame.render_widget(status, area);
}

fn row_line<'a>(row: &'a Row, theme: &ColorTheme) -> Line<'a> {
    let style = theme.line_style(row.is_cursor, row.is_selected);
    highlighted_line(row.line.display(), row.line.spans(), theme).style(style)
}

/// Split `content` into plain and highlighted spans. Spans that do not fall on
/// char boundaries are skipped rather than panicking.
fn highlighted_line<'a>(content: &'a str, spans: &[MatchSpan], theme: &ColorTheme) -> Line<'a> {
    if spans.is_empty() {
        return Line::from(content);
    }

    let mut parts = Vec::new();
    let mut last_end = 0;
    for &(start, end) in spans {
        if start < last_end {
            continue;
        }
        let (Some(before), Some(matched)) = (content.get(last_end..start), content.get(start..end))
        else {
            continue;
        };
        if !before.is_empty() {
            parts.push(Span::raw(before));
        }
        parts.push(Span::styled(matched, theme.query_match));
        last_end = end;
    }
    if let Some(rest) = content.get(last_end..) {
        if !rest.is_empty() {
            parts.push(Span::raw(rest));
        }
    }
    Line::from(parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{Match, Record};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn row(position: usize, text: &str, is_cursor: bool) -> Row {
        let record = Arc::new(Record::new(position, text.as_bytes().to_vec(), false));
        Row {
            line: Match::plain(record),
            position,
            is_cursor,
            is_selected: false,
        }
    }

    fn screen() -> Screen {
        Screen {
            prompt: "QUERY>".to_string(),
            query: "ab".to_string(),
            caret: 2,
            rows: vec![row(0, "first", true), row(1, "second", false)],
            matcher: "IgnoreCase".to_string(),
            page: 1,
            last_page: 1,
            total: 2,
            buffer_len: 2,
            ..Screen::default()
        }
    }

    fn rendered(layout: &dyn ScreenLayout, height: u16) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(30, height)).unwrap();
        let theme = ColorTheme::default();
        let screen = screen();
        terminal
            .draw(|frame| layout.draw(frame, &screen, &theme))
            .unwrap();
        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| {
                (0..30)
                    .map(|x| buffer.get(x, y).symbol())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn names_resolve_and_unknown_names_fail() {
        assert_eq!(layout_by_name("top-down").unwrap().name(), TOP_DOWN);
        assert_eq!(layout_by_name("bottom-up").unwrap().name(), BOTTOM_UP);
        assert!(matches!(
            layout_by_name("sideways"),
            Err(LinepickError::UnknownLayout { .. })
        ));
    }

    #[test]
    fn page_size_leaves_room_for_prompt_and_status() {
        assert_eq!(TopDown.lines_per_page(24), 22);
        assert_eq!(BottomUp.lines_per_page(2), 1);
        assert_eq!(TopDown.lines_per_page(0), 1);
    }

    #[test]
    fn top_down_puts_prompt_first() {
        let rows = rendered(&TopDown, 5);
        assert_eq!(rows[0], "QUERY> ab");
        assert_eq!(rows[1], "first");
        assert_eq!(rows[2], "second");
        assert!(rows[4].starts_with("IgnoreCase [1/1] (2/2)"));
    }

    #[test]
    fn bottom_up_grows_away_from_the_prompt() {
        let rows = rendered(&BottomUp, 5);
        assert_eq!(rows[0], "");
        assert_eq!(rows[1], "second");
        assert_eq!(rows[2], "first");
        assert!(rows[3].starts_with("IgnoreCase"));
        assert_eq!(rows[4], "QUERY> ab");
    }

    #[test]
    fn highlights_split_the_line() {
        let theme = ColorTheme::default();
        let line = highlighted_line("an apple", &[(3, 6)], &theme);
        let parts: Vec<&str> = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(parts, vec!["an ", "app", "le"]);
        assert_eq!(line.spans[1].style, theme.query_match);

        // Offsets inside a multi-byte char are ignored
        let line = highlighted_line("héllo", &[(2, 3)], &theme);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "héllo");
    }
}
