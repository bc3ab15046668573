use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

use crate::budget::CategoryStatus;
use crate::models::Category;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, format_percent, progress_bar, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(4)])
        .split(area);

    render_category_list(f, chunks[0], app);
    render_allocation(f, chunks[1], app);
}

fn render_category_list(f: &mut Frame, area: Rect, app: &App) {
    let summary = &app.snapshot.summary;
    let allocation = &app.snapshot.allocation;
    let bar_width = (area.width as usize).saturating_sub(72).clamp(8, 30);

    let items: Vec<ListItem> = Category::all()
        .iter()
        .enumerate()
        .skip(app.budget_scroll)
        .take(area.height.saturating_sub(2) as usize)
        .map(|(i, &category)| {
            let spent = summary.spent_in(category);
            let budget = summary.budget_for(category);
            let status = summary.category_status(category);
            let color = theme::status_color(status);

            let style = if i == app.budget_index {
                theme::selected_style()
            } else if i % 2 == 0 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            let name = truncate(&format!("{} {}", category.emoji(), category.label()), 21);
            let tag = match status {
                CategoryStatus::Over => " OVER",
                CategoryStatus::Warning => " close",
                CategoryStatus::Good | CategoryStatus::Neutral => "",
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("{name:<22}"), style),
                Span::styled(
                    format!("{:>11} / {:<11} ", format_amount(spent), format_amount(budget)),
                    Style::default().fg(color),
                ),
                Span::styled(
                    progress_bar(summary.category_progress(category), bar_width),
                    Style::default().fg(color),
                ),
                Span::styled(
                    format!(" {:>4}", format_percent(summary.category_progress(category))),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(
                        "  {:>4} of pay",
                        format_percent(allocation.share_of_take_home(budget))
                    ),
                    theme::dim_style(),
                ),
                Span::styled(tag, Style::default().fg(color).add_modifier(Modifier::BOLD)),
            ]))
        })
        .collect();

    let title = format!("Budgets for {}", app.snapshot.month.name());
    f.render_widget(List::new(items).block(theme::panel(&title)), area);
}

fn render_allocation(f: &mut Frame, area: Rect, app: &App) {
    let allocation = &app.snapshot.allocation;
    let color = if allocation.over_allocated {
        theme::RED
    } else {
        theme::GREEN
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(" Allocated ", theme::dim_style()),
            Span::styled(
                format_amount(allocation.total_allocated),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" of ", theme::dim_style()),
            Span::styled(
                format_amount(allocation.monthly_take_home),
                theme::normal_style(),
            ),
            Span::styled(
                format!(" take-home ({})", format_percent(allocation.allocated_pct)),
                theme::dim_style(),
            ),
        ]),
        Line::from(vec![
            Span::styled(
                if allocation.over_allocated {
                    " Over-allocated by "
                } else {
                    " Unallocated "
                },
                theme::dim_style(),
            ),
            Span::styled(
                format_amount(allocation.remaining.abs()),
                Style::default().fg(color),
            ),
        ]),
    ];

    f.render_widget(Paragraph::new(lines).block(theme::panel("Allocation")), area);
}
