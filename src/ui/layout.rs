use ratatui::layout::{Constraint, Direction, Layout, Rect};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutTier {
    Wide,   // ≥80 cols: boards side by side, progress bar
    Narrow, // <80 cols: boards stacked, progress in the header only
}

impl LayoutTier {
    pub fn from_area(area: Rect) -> Self {
        if area.width >= 80 {
            LayoutTier::Wide
        } else {
            LayoutTier::Narrow
        }
    }

    pub fn side_by_side(&self) -> bool {
        *self == LayoutTier::Wide
    }

    pub fn show_progress_bar(&self, height: u16) -> bool {
        height >= 16 && *self == LayoutTier::Wide
    }
}

pub struct AppLayout {
    pub header: Rect,
    pub main: Rect,
    pub progress: Option<Rect>,
    pub footer: Rect,
    pub tier: LayoutTier,
}

impl AppLayout {
    pub fn new(area: Rect, footer_lines: u16) -> Self {
        let tier = LayoutTier::from_area(area);
        let footer_height = footer_lines.clamp(1, 3);

        if tier.show_progress_bar(area.height) {
            let vertical = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(2),
                    Constraint::Min(6),
                    Constraint::Length(3),
                    Constraint::Length(footer_height),
                ])
                .split(area);
            Self {
                header: vertical[0],
                main: vertical[1],
                progress: Some(vertical[2]),
                footer: vertical[3],
                tier,
            }
        } else {
            let vertical = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(2),
                    Constraint::Min(4),
                    Constraint::Length(footer_height),
                ])
                .split(area);
            Self {
                header: vertical[0],
                main: vertical[1],
                progress: None,
                footer: vertical[2],
                tier,
            }
        }
    }

    /// Split the main area into two panes for the matching board.
    pub fn board_panes(&self) -> (Rect, Rect) {
        let direction = if self.tier.side_by_side() {
            Direction::Horizontal
        } else {
            Direction::Vertical
        };
        let panes = Layout::default()
            .direction(direction)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(self.main);
        (panes[0], panes[1])
    }
}

/// Split a locale key-hint string (`[x] foo  [y] bar`) on its double-space
/// separators.
pub fn split_hints(hints: &str) -> Vec<&str> {
    hints
        .split("  ")
        .map(str::trim)
        .filter(|hint| !hint.is_empty())
        .collect()
}

pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 || hints.is_empty() {
        return Vec::new();
    }

    let prefix = " ";
    let separator = "  ";
    let mut out: Vec<String> = Vec::new();
    let mut current = prefix.to_string();
    let mut has_hint = false;

    for hint in hints.iter().filter(|hint| !hint.is_empty()) {
        let candidate = if has_hint {
            format!("{current}{separator}{hint}")
        } else {
            format!("{current}{hint}")
        };
        if candidate.chars().count() <= width || !has_hint {
            current = candidate;
        } else {
            out.push(current);
            current = format!("{prefix}{hint}");
        }
        has_hint = true;
    }

    if has_hint {
        out.push(current);
    }
    out
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_POPUP_WIDTH: u16 = 48;
    const MIN_POPUP_HEIGHT: u16 = 12;

    let requested_w = area.width.saturating_mul(percent_x.min(100)) / 100;
    let requested_h = area.height.saturating_mul(percent_y.min(100)) / 100;

    let target_w = requested_w.max(MIN_POPUP_WIDTH).min(area.width);
    let target_h = requested_h.max(MIN_POPUP_HEIGHT).min(area.height);

    let left = area
        .x
        .saturating_add((area.width.saturating_sub(target_w)) / 2);
    let top = area
        .y
        .saturating_add((area.height.saturating_sub(target_h)) / 2);

    Rect::new(left, top, target_w, target_h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_hints() {
        assert_eq!(
            split_hints("[1-9] answer  [Esc] menu  "),
            vec!["[1-9] answer", "[Esc] menu"]
        );
    }

    #[test]
    fn test_pack_hint_lines_wraps() {
        let lines = pack_hint_lines(&["[a] one", "[b] two", "[c] three"], 18);
        assert_eq!(lines, vec![" [a] one  [b] two", " [c] three"]);
        assert!(pack_hint_lines(&["x"], 0).is_empty());
    }

    #[test]
    fn test_centered_rect_stays_inside() {
        let area = Rect::new(0, 0, 40, 10);
        let rect = centered_rect(50, 50, area);
        assert!(rect.width <= area.width && rect.height <= area.height);
    }

    #[test]
    fn test_layout_tiers() {
        let wide = AppLayout::new(Rect::new(0, 0, 120, 40), 1);
        assert!(wide.progress.is_some());
        let (left, right) = wide.board_panes();
        assert_eq!(left.y, right.y);

        let narrow = AppLayout::new(Rect::new(0, 0, 60, 40), 2);
        assert!(narrow.progress.is_none());
        let (top, bottom) = narrow.board_panes();
        assert_eq!(top.x, bottom.x);
        assert_eq!(narrow.footer.height, 2);
    }
}
