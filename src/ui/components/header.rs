use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};
use rust_i18n::t;

use crate::i18n::Language;
use crate::session::score::SessionScore;
use crate::store::schema::ProfileData;
use crate::ui::theme::Theme;

/// Top bar: title, player, session tally and global tally.
pub struct Header<'a> {
    title: &'a str,
    profile: &'a ProfileData,
    session: Option<SessionScore>,
    language: Language,
    theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(
        title: &'a str,
        profile: &'a ProfileData,
        session: Option<SessionScore>,
        language: Language,
        theme: &'a Theme,
    ) -> Self {
        Self {
            title,
            profile,
            session,
            language,
            theme,
        }
    }
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let locale = self.language.code();
        let base = Style::default().fg(colors.header_fg()).bg(colors.header_bg());

        let player = match self.profile.username.as_deref() {
            Some(name) => t!("header.user", locale = locale, name = name).to_string(),
            None => t!("header.guest", locale = locale).to_string(),
        };
        let global = t!(
            "header.global",
            locale = locale,
            correct = self.profile.global_correct,
            incorrect = self.profile.global_incorrect
        );

        let mut top = vec![
            Span::styled(format!(" {} ", self.title), base.add_modifier(Modifier::BOLD)),
            Span::styled(format!("| {player} | {global} "), base),
            Span::styled(format!("[{}]", locale.to_uppercase()), base.fg(colors.accent())),
        ];
        if area.width < 50 {
            top.truncate(1);
        }

        let mut lines = vec![Line::from(top)];
        if let Some(score) = self.session {
            lines.push(Line::from(Span::styled(
                format!(
                    " {}",
                    t!(
                        "header.session",
                        locale = locale,
                        correct = score.correct,
                        incorrect = score.incorrect,
                        total = score.total()
                    )
                ),
                base.fg(colors.muted()),
            )));
        }

        Paragraph::new(lines)
            .style(base)
            .alignment(Alignment::Left)
            .render(area, buf);
    }
}
