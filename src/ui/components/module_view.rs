use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::session::view::{
    ChoiceState, ChoiceView, Feedback, ModuleView, TileState, TileView, ViewBody,
};
use crate::ui::layout::AppLayout;
use crate::ui::theme::{Theme, ThemeColors};

/// Draws the live body of a module. Summary bodies are drawn by `SummaryCard`.
pub struct ModuleBody<'a> {
    view: &'a ModuleView,
    layout: &'a AppLayout,
    theme: &'a Theme,
}

impl<'a> ModuleBody<'a> {
    pub fn new(view: &'a ModuleView, layout: &'a AppLayout, theme: &'a Theme) -> Self {
        Self {
            view,
            layout,
            theme,
        }
    }
}

fn choice_style(colors: &ThemeColors, state: ChoiceState) -> Style {
    match state {
        ChoiceState::Open => Style::default().fg(colors.fg()),
        ChoiceState::Disabled => Style::default().fg(colors.muted()),
        ChoiceState::Chosen => Style::default().fg(colors.selected()).add_modifier(Modifier::BOLD),
        ChoiceState::Correct => Style::default().fg(colors.correct()).add_modifier(Modifier::BOLD),
        ChoiceState::Incorrect => Style::default()
            .fg(colors.incorrect())
            .bg(colors.incorrect_bg()),
    }
}

fn tile_style(colors: &ThemeColors, state: TileState) -> Style {
    match state {
        TileState::Idle => Style::default().fg(colors.fg()),
        TileState::Selected => Style::default()
            .fg(colors.selected())
            .add_modifier(Modifier::BOLD | Modifier::REVERSED),
        TileState::Incorrect => Style::default()
            .fg(colors.incorrect())
            .bg(colors.incorrect_bg()),
        TileState::Matched => Style::default()
            .fg(colors.matched())
            .add_modifier(Modifier::DIM | Modifier::CROSSED_OUT),
    }
}

fn choice_lines<'l>(colors: &ThemeColors, choices: &'l [ChoiceView]) -> Vec<Line<'l>> {
    choices
        .iter()
        .map(|choice| {
            Line::from(vec![
                Span::styled(format!("  [{}] ", choice.key), Style::default().fg(colors.accent())),
                Span::styled(choice.label.as_str(), choice_style(colors, choice.state)),
            ])
        })
        .collect()
}

fn tile_lines<'l>(colors: &ThemeColors, tiles: &'l [TileView]) -> Vec<Line<'l>> {
    tiles
        .iter()
        .map(|tile| {
            Line::from(vec![
                Span::styled(format!(" [{}] ", tile.key), Style::default().fg(colors.accent())),
                Span::styled(tile.text.as_str(), tile_style(colors, tile.state)),
            ])
        })
        .collect()
}

fn feedback_lines<'l>(
    colors: &ThemeColors,
    feedback: Option<&'l Feedback>,
    tip: Option<&'l String>,
) -> Vec<Line<'l>> {
    let mut lines = Vec::new();
    if let Some(feedback) = feedback {
        let color = if feedback.correct {
            colors.correct()
        } else {
            colors.incorrect()
        };
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            feedback.message.as_str(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        if let Some(explanation) = &feedback.explanation {
            lines.push(Line::from(Span::styled(
                explanation.as_str(),
                Style::default().fg(colors.fg()),
            )));
        }
    }
    if let Some(tip) = tip {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            tip.as_str(),
            Style::default().fg(colors.muted()).add_modifier(Modifier::ITALIC),
        )));
    }
    lines
}

fn framed(title: String, colors: &ThemeColors, area: Rect, buf: &mut Buffer) -> Rect {
    let block = Block::bordered()
        .title(title)
        .border_style(Style::default().fg(colors.border_focused()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(area);
    block.render(area, buf);
    inner
}

impl Widget for ModuleBody<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let title = match &self.view.progress_label {
            Some(progress) => format!(" {} · {} ", self.view.title, progress),
            None => format!(" {} ", self.view.title),
        };

        match &self.view.body {
            ViewBody::Flashcard {
                side_label,
                face,
                flipped,
                status,
                tip,
            } => {
                let inner = framed(title, colors, area, buf);
                let face_style = Style::default()
                    .fg(if *flipped { colors.accent() } else { colors.fg() })
                    .add_modifier(Modifier::BOLD);
                let mut lines = vec![
                    Line::from(Span::styled(side_label.as_str(), Style::default().fg(colors.muted()))),
                    Line::from(""),
                    Line::from(Span::styled(face.as_str(), face_style)),
                ];
                if let Some(status) = status {
                    lines.push(Line::from(""));
                    lines.push(Line::from(Span::styled(
                        status.as_str(),
                        Style::default().fg(colors.selected()),
                    )));
                }
                lines.extend(feedback_lines(colors, None, tip.as_ref()));
                Paragraph::new(lines)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: false })
                    .render(inner, buf);
            }
            ViewBody::Quiz {
                question,
                choices,
                feedback,
                tip,
            } => {
                let inner = framed(title, colors, area, buf);
                let mut lines = vec![
                    Line::from(Span::styled(
                        question.as_str(),
                        Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(""),
                ];
                lines.extend(choice_lines(colors, choices));
                lines.extend(feedback_lines(colors, feedback.as_ref(), tip.as_ref()));
                Paragraph::new(lines)
                    .wrap(Wrap { trim: false })
                    .render(inner, buf);
            }
            ViewBody::Completion {
                sentence,
                draft,
                placeholder,
                feedback,
                tip,
            } => {
                let inner = framed(title, colors, area, buf);
                let input = if draft.is_empty() && feedback.is_none() {
                    Span::styled(placeholder.as_str(), Style::default().fg(colors.muted()))
                } else {
                    Span::styled(
                        format!("{draft}_"),
                        Style::default().fg(colors.selected()).add_modifier(Modifier::BOLD),
                    )
                };
                let mut lines = vec![
                    Line::from(Span::styled(sentence.as_str(), Style::default().fg(colors.fg()))),
                    Line::from(""),
                    Line::from(vec![Span::raw("> "), input]),
                ];
                lines.extend(feedback_lines(colors, feedback.as_ref(), tip.as_ref()));
                Paragraph::new(lines)
                    .wrap(Wrap { trim: false })
                    .render(inner, buf);
            }
            ViewBody::Sorting {
                prompt,
                bank_label,
                bank,
                answer_label,
                placed,
                feedback,
                tip,
            } => {
                let inner = framed(title, colors, area, buf);
                let mut lines = vec![
                    Line::from(Span::styled(
                        prompt.as_str(),
                        Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(""),
                    Line::from(Span::styled(
                        format!("{answer_label}:"),
                        Style::default().fg(colors.muted()),
                    )),
                    Line::from(Span::styled(
                        format!("  {}", placed.join(" ")),
                        Style::default().fg(colors.selected()),
                    )),
                    Line::from(""),
                    Line::from(Span::styled(
                        format!("{bank_label}:"),
                        Style::default().fg(colors.muted()),
                    )),
                ];
                lines.extend(choice_lines(colors, bank));
                lines.extend(feedback_lines(colors, feedback.as_ref(), tip.as_ref()));
                Paragraph::new(lines)
                    .wrap(Wrap { trim: false })
                    .render(inner, buf);
            }
            ViewBody::Matching {
                terms_label,
                terms,
                definitions_label,
                definitions,
            } => {
                let (left, right) = self.layout.board_panes();
                let left = left.intersection(area);
                let right = right.intersection(area);
                let inner = framed(format!(" {terms_label} "), colors, left, buf);
                Paragraph::new(tile_lines(colors, terms)).render(inner, buf);
                let inner = framed(format!(" {definitions_label} "), colors, right, buf);
                Paragraph::new(tile_lines(colors, definitions))
                    .wrap(Wrap { trim: false })
                    .render(inner, buf);
            }
            ViewBody::Summary { .. } => {}
        }
    }
}

/// Centered results card for a finished module.
pub struct SummaryCard<'a> {
    view: &'a ModuleView,
    theme: &'a Theme,
}

impl<'a> SummaryCard<'a> {
    pub fn new(view: &'a ModuleView, theme: &'a Theme) -> Self {
        Self { view, theme }
    }
}

impl Widget for SummaryCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let ViewBody::Summary {
            heading,
            score,
            lines,
        } = &self.view.body
        else {
            return;
        };

        let block = Block::bordered()
            .title(format!(" {heading} "))
            .border_style(Style::default().fg(colors.accent()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)])
            .split(inner);

        let accuracy = score.accuracy();
        let acc_color = if accuracy >= 90.0 {
            colors.correct()
        } else if accuracy >= 60.0 {
            colors.selected()
        } else {
            colors.incorrect()
        };

        let mut rows = lines.iter();
        if let Some(name) = rows.next() {
            Paragraph::new(Line::from(Span::styled(
                name.as_str(),
                Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center)
            .render(layout[0], buf);
        }
        let body: Vec<Line> = rows
            .enumerate()
            .map(|(i, line)| {
                // Third stat row is accuracy.
                let style = if i == 2 {
                    Style::default().fg(acc_color).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors.fg())
                };
                Line::from(Span::styled(format!("  {line}"), style))
            })
            .collect();
        Paragraph::new(body).render(layout[1], buf);
    }
}
