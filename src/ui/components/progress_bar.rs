use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};

use crate::ui::theme::Theme;

/// Item progress through a module, drawn as one segment per item.
pub struct ProgressBar<'a> {
    pub label: String,
    pub done: usize,
    pub total: usize,
    pub theme: &'a Theme,
}

impl<'a> ProgressBar<'a> {
    pub fn from_counts(label: &str, done: usize, total: usize, theme: &'a Theme) -> Self {
        Self {
            label: label.to_string(),
            done: done.min(total),
            total,
            theme,
        }
    }

    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.done as f64 / self.total as f64
        }
    }

    /// Column where segment `index` starts inside a bar `width` cells wide.
    fn segment_start(&self, index: usize, width: u16) -> u16 {
        (index * width as usize / self.total.max(1)) as u16
    }
}

impl Widget for ProgressBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", self.label))
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 || self.total == 0 {
            return;
        }

        let filled = Style::default().bg(colors.bar_filled());
        let empty = Style::default().bg(colors.bar_empty());
        let gaps = usize::from(inner.width) >= self.total * 3;
        for index in 0..self.total {
            let start = self.segment_start(index, inner.width);
            let end = self.segment_start(index + 1, inner.width);
            let style = if index < self.done { filled } else { empty };
            for x in start..end {
                // Leave a one-cell gap between segments when they are wide enough.
                let gap = gaps && x + 1 == end && index + 1 < self.total;
                let cell = &mut buf[(inner.x + x, inner.y)];
                cell.set_style(if gap { Style::default().bg(colors.bg()) } else { style });
            }
        }

        let count = format!("{}/{}", self.done, self.total);
        let count_x = inner.x + inner.width.saturating_sub(count.len() as u16) / 2;
        buf.set_string(count_x, inner.y, &count, Style::default().fg(colors.fg()));
    }
}
