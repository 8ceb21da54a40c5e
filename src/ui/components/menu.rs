use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use rust_i18n::t;

use crate::dataset::catalog::Catalog;
use crate::i18n::Language;
use crate::session::view::number_key;
use crate::ui::theme::Theme;

pub struct MenuItem {
    pub key: String,
    pub label: String,
    pub description: String,
}

pub struct Menu<'a> {
    pub items: Vec<MenuItem>,
    pub selected: usize,
    pub theme: &'a Theme,
    title: String,
    subtitle: String,
    empty: String,
    keys_random_on: String,
    keys_random_off: String,
}

impl<'a> Menu<'a> {
    pub fn new(theme: &'a Theme, catalog: &Catalog, language: Language) -> Self {
        let mut menu = Self {
            items: Vec::new(),
            selected: 0,
            theme,
            title: String::new(),
            subtitle: String::new(),
            empty: String::new(),
            keys_random_on: String::new(),
            keys_random_off: String::new(),
        };
        menu.refresh(catalog, language);
        menu
    }

    /// Rebuild labels from the catalog in the given language.
    pub fn refresh(&mut self, catalog: &Catalog, language: Language) {
        let locale = language.code();
        self.items = catalog
            .entries()
            .iter()
            .enumerate()
            .map(|(i, dataset)| {
                let key = number_key(i);
                MenuItem {
                    key: if key == ' ' { String::new() } else { key.to_string() },
                    label: dataset.metadata().name.clone(),
                    description: format!(
                        "{} · {}",
                        dataset.kind().display_name(language),
                        dataset.len()
                    ),
                }
            })
            .collect();
        self.title = t!("app.title", locale = locale).to_string();
        self.subtitle = t!("app.subtitle", locale = locale).to_string();
        self.empty = t!("menu.empty", locale = locale).to_string();
        let on = t!("menu.random_on", locale = locale);
        let off = t!("menu.random_off", locale = locale);
        self.keys_random_on = t!("menu.keys", locale = locale, state = on).to_string();
        self.keys_random_off = t!("menu.keys", locale = locale, state = off).to_string();
        self.selected = self.selected.min(self.items.len().saturating_sub(1));
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn keys_hint(&self, random_mode: bool) -> &str {
        if random_mode {
            &self.keys_random_on
        } else {
            &self.keys_random_off
        }
    }

    pub fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.items.len();
    }

    pub fn prev(&mut self) {
        if self.items.is_empty() {
            return;
        }
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len() - 1;
        }
    }
}

impl Widget for &Menu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                &*self.title,
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(&*self.subtitle, Style::default().fg(colors.fg()))),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        if self.items.is_empty() {
            Paragraph::new(Span::styled(&*self.empty, Style::default().fg(colors.muted())))
                .alignment(Alignment::Center)
                .render(layout[2], buf);
            return;
        }

        // Keep the selection visible when the list is taller than the area.
        let rows = (layout[2].height / 2).max(1) as usize;
        let first = self.selected.saturating_sub(rows - 1);
        let menu_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(2); rows])
            .split(layout[2]);

        for (slot, (i, item)) in self.items.iter().enumerate().skip(first).take(rows).enumerate() {
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };
            let label_text = format!(" {indicator} [{}] {}", item.key, item.label);
            let desc_text = format!("       {}", item.description);

            let lines = vec![
                Line::from(Span::styled(
                    label_text,
                    Style::default()
                        .fg(if is_selected { colors.accent() } else { colors.fg() })
                        .add_modifier(if is_selected {
                            Modifier::BOLD
                        } else {
                            Modifier::empty()
                        }),
                )),
                Line::from(Span::styled(desc_text, Style::default().fg(colors.muted()))),
            ];
            Paragraph::new(lines).render(menu_layout[slot], buf);
        }
    }
}
