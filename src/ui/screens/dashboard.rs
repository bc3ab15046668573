use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Paragraph, Wrap},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::budget::Mood;
use crate::models::Category;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, format_percent, progress_bar, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Summary cards
            Constraint::Length(7), // Splurge meter + mascot
            Constraint::Min(8),    // Spending chart
        ])
        .split(area);

    render_summary_cards(f, chunks[0], app);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);
    render_splurge_meter(f, middle[0], app);
    render_mascot(f, middle[1], app);

    render_spending_chart(f, chunks[2], app);
}

fn render_summary_cards(f: &mut Frame, area: Rect, app: &App) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let snap = &app.snapshot;
    let remaining = snap.remaining_total;

    render_card(
        f,
        cards[0],
        "Remaining",
        remaining,
        theme::amount_color(remaining),
        "take-home minus spent".to_string(),
    );
    render_card(
        f,
        cards[1],
        "Monthly Take-Home",
        snap.take_home.monthly_take_home,
        theme::GREEN,
        format!("{} / year", format_amount(snap.take_home.annual_take_home)),
    );
    render_card(
        f,
        cards[2],
        "Spent",
        snap.summary.total_spent,
        theme::RED,
        format!("{} expenses", snap.expenses.len()),
    );
    render_card(
        f,
        cards[3],
        "Budgeted",
        snap.summary.total_budget,
        if snap.allocation.over_allocated {
            theme::YELLOW
        } else {
            theme::ACCENT
        },
        format!("{} of take-home", format_percent(snap.allocation.allocated_pct)),
    );
}

fn render_card(
    f: &mut Frame,
    area: Rect,
    title: &str,
    amount: Decimal,
    color: Color,
    subtitle: String,
) {
    let text = Paragraph::new(vec![
        Line::from(Span::styled(
            format_amount(amount),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(subtitle, theme::dim_style())),
    ])
    .centered()
    .block(theme::panel(title));

    f.render_widget(text, area);
}

fn render_splurge_meter(f: &mut Frame, area: Rect, app: &App) {
    let snap = &app.snapshot;
    let summary = &snap.summary;
    let meter = snap.splurge;
    let width = (area.width as usize).saturating_sub(32).clamp(4, 30);

    let row = |label: &str, pct: Decimal, spent: Decimal, color: Color| {
        Line::from(vec![
            Span::styled(format!(" {label:<7}"), theme::normal_style()),
            Span::styled(progress_bar(pct, width), Style::default().fg(color)),
            Span::styled(format!(" {:>4}", format_percent(pct)), theme::normal_style()),
            Span::styled(format!("  {}", format_amount(spent)), theme::dim_style()),
        ])
    };

    let lines = vec![
        row("Needs", meter.needs_pct, summary.needs_spent, theme::ACCENT),
        row("Wants", meter.wants_pct, summary.wants_spent, theme::YELLOW),
        row("Treats", meter.treats_pct, summary.treats_spent, theme::PINK),
        Line::from(""),
        Line::from(Span::styled(
            format!(" Saved this month: {}", format_amount(summary.savings_spent)),
            theme::dim_style(),
        )),
    ];

    f.render_widget(Paragraph::new(lines).block(theme::panel("Splurge Meter")), area);
}

fn render_mascot(f: &mut Frame, area: Rect, app: &App) {
    let summary = &app.snapshot.summary;
    let mood = summary.mood;
    let (face, label) = if !app.snapshot.settings.onboarding_complete {
        ("ʕ•ᴥ•ʔ", "Buddy says hi".to_string())
    } else if app.snapshot.expenses.is_empty() {
        ("ʕ-ᴥ-ʔ", "Buddy is napping".to_string())
    } else {
        let face = match mood {
            Mood::Happy => "ʕ•ᴥ•ʔ",
            Mood::Nervous => "ʕ°ᴥ°ʔ",
            Mood::Alarmed => "ʕ⊙ᴥ⊙ʔ",
        };
        (face, format!("Buddy is {mood}"))
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!(" {face} "),
                Style::default()
                    .fg(theme::mood_color(mood))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(label, theme::dim_style()),
        ]),
        Line::from(Span::styled(
            format!(" \"{}\"", app.mascot_quote()),
            theme::normal_style(),
        )),
    ];

    let flagged: Vec<String> = summary
        .over_budget_categories
        .iter()
        .chain(summary.warning_categories.iter())
        .map(|c: &Category| format!("{} {}", c.emoji(), c.label()))
        .collect();
    if !flagged.is_empty() {
        lines.push(Line::from(Span::styled(
            format!(" Watch: {}", flagged.join(", ")),
            Style::default().fg(theme::mood_color(mood)),
        )));
    }

    let mascot = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(theme::panel("Buddy"));
    f.render_widget(mascot, area);
}

fn render_spending_chart(f: &mut Frame, area: Rect, app: &App) {
    let summary = &app.snapshot.summary;
    if summary.spending_by_category.is_empty() {
        let msg = Paragraph::new(Line::from(Span::styled(
            "No expenses this month. Log one with :add <amount> <category>",
            theme::dim_style(),
        )))
        .centered()
        .block(theme::panel("Spending by Category"));
        f.render_widget(msg, area);
        return;
    }

    let bars: Vec<Bar> = summary
        .spending_by_category
        .iter()
        .map(|(category, amt)| {
            let val = amt.round().to_u64().unwrap_or(0);
            Bar::default()
                .value(val)
                .text_value(format_amount(*amt))
                .label(Line::from(truncate(category.label(), 10)))
                .style(Style::default().fg(theme::status_color(
                    summary.category_status(*category),
                )))
                .value_style(
                    Style::default()
                        .fg(theme::HEADER_BG)
                        .add_modifier(Modifier::BOLD),
                )
        })
        .collect();

    let chart = BarChart::default()
        .block(theme::panel("Spending by Category"))
        .data(BarGroup::default().bars(&bars))
        .bar_width(10)
        .bar_gap(1)
        .value_style(Style::default().fg(theme::TEXT));

    f.render_widget(chart, area);
}
