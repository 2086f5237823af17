use crate::{styles, transcript::TranscriptLine};
use anyhow::Result;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Position},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};
use std::io::Stdout;
use textwrap::wrap;
use unicode_width::UnicodeWidthStr;

pub struct ViewSnap {
    pub panel_open: bool,
    pub input: String,
    pub input_cursor: usize,
    pub lines: Vec<TranscriptLine>,
    pub scroll: usize,
    pub typing: bool,
    pub renders: usize,
    pub spinner: &'static str,
    pub backend: String,
}

pub fn draw(term: &mut Terminal<CrosstermBackend<Stdout>>, snap: &ViewSnap) -> Result<()> {
    term.draw(|frame| {
        let area = frame.area();

        if !snap.panel_open {
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1), Constraint::Length(3)])
                .split(area);
            let hint = Paragraph::new(Line::from(vec![
                Span::styled(" 💬 ", styles::accent()),
                Span::raw("Ctrl-T opens the Tesa Assistant • Ctrl-Q quits"),
            ]))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
            frame.render_widget(hint, layout[1]);
            return;
        }

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(area);

        let header = Paragraph::new(Line::from(vec![Span::styled(
            " Tesa Assistant ",
            styles::accent(),
        )]))
        .wrap(Wrap { trim: true });
        frame.render_widget(header, layout[0]);

        let visible_h = layout[1].height.saturating_sub(2) as usize;
        let content_width = layout[1].width.saturating_sub(2) as usize;
        let mut wrapped = wrap_transcript(&snap.lines, content_width);
        if snap.typing {
            wrapped.push(TranscriptLine::new(
                format!("  {} typing…", snap.spinner),
                styles::dim(),
            ));
        }
        let total = wrapped.len();
        let scroll = snap.scroll.min(total.saturating_sub(visible_h));
        let start = total.saturating_sub(visible_h + scroll);
        let end = total.saturating_sub(scroll);

        let items: Vec<ListItem> = wrapped[start..end]
            .iter()
            .map(|line| {
                let spans: Vec<Span> = line
                    .runs
                    .iter()
                    .map(|r| Span::styled(r.text.clone(), r.style))
                    .collect();
                ListItem::new(Line::from(spans))
            })
            .collect();

        let body = List::new(items).block(Block::default().borders(Borders::ALL).title(" Chat "));
        frame.render_widget(body, layout[1]);

        let input_box = Paragraph::new(snap.input.clone()).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Type your question "),
        );
        frame.render_widget(Clear, layout[2]);
        frame.render_widget(input_box, layout[2]);

        let caret_x = layout[2].x + 1 + visual_caret_col(&snap.input, snap.input_cursor);
        let caret_y = layout[2].y + 1;
        frame.set_cursor_position(Position {
            x: caret_x,
            y: caret_y,
        });

        let status_line = Line::from(vec![
            Span::raw(" "),
            if snap.typing || snap.renders > 0 {
                Span::styled("Replying…", styles::busy())
            } else {
                Span::styled("Ready", styles::ready())
            },
            Span::raw(format!(" • {} • ", snap.backend)),
            Span::styled(
                "Ctrl-X close • Ctrl-R refresh • Ctrl-Q quit",
                styles::dim(),
            ),
        ]);
        let status = Paragraph::new(status_line)
            .block(Block::default().borders(Borders::ALL).title(" Status "));
        frame.render_widget(status, layout[3]);
    })?;

    Ok(())
}

fn visual_caret_col(input: &str, cursor: usize) -> u16 {
    UnicodeWidthStr::width(&input[..cursor]) as u16
}

/// Wrap transcript lines to `width` columns, keeping run styles.
pub fn wrap_transcript(lines: &[TranscriptLine], width: usize) -> Vec<TranscriptLine> {
    let effective_width = width.max(1);
    let mut out = Vec::new();

    for entry in lines {
        match entry.runs.as_slice() {
            [] => out.push(TranscriptLine::default()),
            [single] => {
                let segments = wrap(&single.text, effective_width);
                if segments.is_empty() {
                    out.push(TranscriptLine::default());
                } else {
                    out.extend(
                        segments
                            .into_iter()
                            .map(|seg| TranscriptLine::new(seg.into_owned(), single.style)),
                    );
                }
            }
            runs => {
                let mut current = TranscriptLine::default();
                let mut used = 0usize;
                for run in runs {
                    for piece in run.text.split_inclusive(' ') {
                        let w = UnicodeWidthStr::width(piece.trim_end());
                        if used > 0 && used + w > effective_width {
                            out.push(std::mem::take(&mut current));
                            used = 0;
                            let piece = piece.trim_start();
                            current.push(piece, run.style);
                            used += UnicodeWidthStr::width(piece);
                            continue;
                        }
                        current.push(piece, run.style);
                        used += UnicodeWidthStr::width(piece);
                    }
                }
                out.push(current);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::{Modifier, Style};

    #[test]
    fn mixed_runs_wrap_on_spaces_and_keep_styles() {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let mut line = TranscriptLine::new("  MDF is ", Style::default());
        line.push("very smooth", bold);
        line.push(" and stable", Style::default());

        let wrapped = wrap_transcript(&[line], 12);
        let texts: Vec<_> = wrapped.iter().map(|l| l.text()).collect();
        assert_eq!(texts, ["  MDF is ", "very smooth ", "and stable"]);
        assert_eq!(wrapped[1].runs[0].style, bold);
    }

    #[test]
    fn single_style_lines_use_textwrap() {
        let line = TranscriptLine::new("one two three", Style::default());
        let texts: Vec<_> = wrap_transcript(&[line], 7)
            .iter()
            .map(|l| l.text())
            .collect();
        assert_eq!(texts, ["one two", "three"]);
    }
}
