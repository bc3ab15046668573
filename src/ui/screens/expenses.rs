use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table},
    Frame,
};

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let snap = &app.snapshot;
    if snap.expenses.is_empty() {
        let msg = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("No expenses for {}", snap.month.name()),
                theme::dim_style(),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Log one with :add <amount> <category> [note]",
                theme::dim_style(),
            )),
        ];
        f.render_widget(
            Paragraph::new(msg)
                .centered()
                .block(theme::panel("Expenses (0)")),
            area,
        );
        return;
    }

    let header_cells = ["Date", "Category", "Note", "Amount"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = snap
        .expenses
        .iter()
        .enumerate()
        .skip(app.expense_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, e)| {
            let style = if i == app.expense_index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            let status = snap.summary.category_status(e.category);

            Row::new(vec![
                Cell::from(format!("  {}", e.date_str())),
                Cell::from(Span::styled(
                    format!("{} {}", e.category.emoji(), e.category.label()),
                    Style::default().fg(theme::status_color(status)),
                )),
                Cell::from(truncate(e.note.as_deref().unwrap_or(""), 40)),
                Cell::from(Span::styled(format_amount(e.amount), theme::expense_style())),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(14),
        Constraint::Length(22),
        Constraint::Min(20),
        Constraint::Length(14),
    ];

    let title = format!(
        "Expenses ({}) {} total",
        snap.expenses.len(),
        format_amount(snap.summary.total_spent)
    );
    let table = Table::new(rows, widths)
        .header(header)
        .block(theme::panel(&title));

    f.render_widget(table, area);
}
