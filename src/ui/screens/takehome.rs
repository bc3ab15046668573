use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Cell, Row, Table},
    Frame,
};
use rust_decimal::Decimal;

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, format_percent};

/// Annual figures with a monthly column alongside.
pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let settings = &app.snapshot.settings;
    let th = &app.snapshot.take_home;
    let twelve = Decimal::from(12);

    let line = |label: String, annual: Decimal, deduction: bool| {
        let style = if deduction {
            theme::expense_style()
        } else {
            theme::normal_style()
        };
        let sign = if deduction { "-" } else { "" };
        Row::new(vec![
            Cell::from(format!("  {label}")),
            Cell::from(Span::styled(format!("{sign}{}", format_amount(annual)), style)),
            Cell::from(Span::styled(
                format!("{sign}{}", format_amount(annual / twelve)),
                theme::dim_style(),
            )),
        ])
    };
    let total = |label: &str, annual: Decimal, monthly: Decimal| {
        let bold = Style::default()
            .fg(theme::GREEN)
            .add_modifier(Modifier::BOLD);
        Row::new(vec![
            Cell::from(Span::styled(format!("  {label}"), bold)),
            Cell::from(Span::styled(format_amount(annual), bold)),
            Cell::from(Span::styled(format_amount(monthly), bold)),
        ])
        .style(theme::alt_row_style())
    };

    let rows = vec![
        line("Gross salary".into(), settings.gross_salary, false),
        line("Bonus".into(), settings.bonus, false),
        line("Total gross".into(), th.total_gross, false),
        line(
            format!("Pre-tax 401k ({})", format_percent(settings.pretax_percent)),
            th.pretax_contribution,
            true,
        ),
        line("Federal taxable income".into(), th.federal_taxable_income, false),
        line("Federal income tax".into(), th.federal_tax, true),
        line("State income tax".into(), th.state_tax, true),
        line("Social Security".into(), th.social_security, true),
        line("Medicare".into(), th.medicare, true),
        line("FICA total".into(), th.fica_total, true),
        line("Total taxes".into(), th.total_taxes, true),
        total("Take-home", th.annual_take_home, th.monthly_take_home),
    ];

    let header = Row::new(
        ["", "Annual", "Monthly"]
            .iter()
            .map(|h| Cell::from(*h).style(theme::header_style())),
    );
    let widths = [
        Constraint::Min(28),
        Constraint::Length(16),
        Constraint::Length(16),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(theme::panel("Take-Home Pay"));
    f.render_widget(table, area);
}
