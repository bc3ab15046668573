use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use rust_decimal::Decimal;
use tracing::warn;

use super::app::{App, InputMode, PendingAction, Screen};
use super::util::format_amount;
use crate::config::{default_export_path, shellexpand};
use crate::models::{Category, Expense, Month, SettingUpdate};
use crate::session::{parse_amount, parse_category, parse_decimal, BudgetSession};

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut BudgetSession) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit Budget Buddy", cmd_quit, r);
    register_command!("quit", "Quit Budget Buddy", cmd_quit, r);
    register_command!("d", "Go to Dashboard", cmd_dashboard, r);
    register_command!("dashboard", "Go to Dashboard", cmd_dashboard, r);
    register_command!("e", "Go to Expenses", cmd_expenses, r);
    register_command!("expenses", "Go to Expenses", cmd_expenses, r);
    register_command!("b", "Go to Budgets", cmd_budgets, r);
    register_command!("budgets", "Go to Budgets", cmd_budgets, r);
    register_command!("t", "Go to Take-Home", cmd_takehome, r);
    register_command!("takehome", "Go to Take-Home", cmd_takehome, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!("month", "Set month (e.g. :month 2024-01)", cmd_month, r);
    register_command!("m", "Set month (e.g. :m 2024-01)", cmd_month, r);
    register_command!("next-month", "Go to next month", cmd_next_month, r);
    register_command!("prev-month", "Go to previous month", cmd_prev_month, r);
    register_command!(
        "add",
        "Log expense for today (e.g. :add 12.50 food tacos)",
        cmd_add,
        r
    );
    register_command!("a", "Log expense (e.g. :a 12.50 food)", cmd_add, r);
    register_command!("delete", "Delete selected expense", cmd_delete, r);
    register_command!(
        "amount",
        "Change amount of selected expense (e.g. :amount 20)",
        cmd_amount,
        r
    );
    register_command!(
        "recat",
        "Re-categorize selected expense (e.g. :recat fun)",
        cmd_recat,
        r
    );
    register_command!(
        "note",
        "Set note on selected expense (empty clears it)",
        cmd_note,
        r
    );
    register_command!("salary", "Set gross salary (e.g. :salary 90000)", cmd_salary, r);
    register_command!("bonus", "Set annual bonus (e.g. :bonus 5000)", cmd_bonus, r);
    register_command!("pretax", "Set pre-tax 401k % (e.g. :pretax 6)", cmd_pretax, r);
    register_command!(
        "budget",
        "Set category budget (e.g. :budget food 500)",
        cmd_budget,
        r
    );
    register_command!(
        "export",
        "Export month to CSV (e.g. :export ~/budget.csv)",
        cmd_export,
        r
    );
    register_command!(
        "onboard",
        "Finish setup (e.g. :onboard 75000 7000 10)",
        cmd_onboard,
        r
    );

    r
});

/// Run one `:` command line. Failures end up in the status bar and the
/// log rather than closing the app.
pub(crate) fn handle_command(
    input: &str,
    app: &mut App,
    session: &mut BudgetSession,
) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        if let Err(e) = (cmd.run)(args, app, session) {
            warn!("Command :{cmd_name} failed: {e:#}");
            app.set_status(format!("Error: {e}"));
        }
        app.refresh(session);
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1)
        .min_by_key(|k| levenshtein(input, k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _session: &mut BudgetSession) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_dashboard(_args: &str, app: &mut App, _session: &mut BudgetSession) -> anyhow::Result<()> {
    app.screen = Screen::Dashboard;
    Ok(())
}

fn cmd_expenses(_args: &str, app: &mut App, _session: &mut BudgetSession) -> anyhow::Result<()> {
    app.screen = Screen::Expenses;
    Ok(())
}

fn cmd_budgets(_args: &str, app: &mut App, _session: &mut BudgetSession) -> anyhow::Result<()> {
    app.screen = Screen::Budgets;
    Ok(())
}

fn cmd_takehome(_args: &str, app: &mut App, _session: &mut BudgetSession) -> anyhow::Result<()> {
    app.screen = Screen::TakeHome;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _session: &mut BudgetSession) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_month(args: &str, app: &mut App, session: &mut BudgetSession) -> anyhow::Result<()> {
    if args.is_empty() {
        session.select_month(Month::current())?;
        reset_cursors(app);
        app.set_status(format!("Month: {}", session.month().name()));
        return Ok(());
    }

    // "1" / "01" picks a month of the selected year
    if let Ok(number) = args.parse::<u32>() {
        session.set_month(number, session.month().year())?;
    } else if let Some(m) = Month::parse(args) {
        session.select_month(m)?;
    } else {
        app.set_status("Invalid month format. Use YYYY-MM (e.g. 2024-01)");
        return Ok(());
    }
    reset_cursors(app);
    app.set_status(format!("Month: {}", session.month().name()));
    Ok(())
}

fn cmd_next_month(_args: &str, app: &mut App, session: &mut BudgetSession) -> anyhow::Result<()> {
    session.next_month()?;
    reset_cursors(app);
    app.set_status(format!("Month: {}", session.month().name()));
    Ok(())
}

fn cmd_prev_month(_args: &str, app: &mut App, session: &mut BudgetSession) -> anyhow::Result<()> {
    session.prev_month()?;
    reset_cursors(app);
    app.set_status(format!("Month: {}", session.month().name()));
    Ok(())
}

fn reset_cursors(app: &mut App) {
    app.expense_index = 0;
    app.expense_scroll = 0;
}

fn cmd_add(args: &str, app: &mut App, session: &mut BudgetSession) -> anyhow::Result<()> {
    let mut parts = args.splitn(3, ' ');
    let (Some(amount), Some(category)) = (parts.next(), parts.next()) else {
        let names: Vec<&str> = Category::all().iter().map(|c| c.as_str()).collect();
        app.set_status(format!(
            "Usage: :add <amount> <category> [note]. Categories: {}",
            names.join(", ")
        ));
        return Ok(());
    };
    let category = parse_category(category)?;
    let note = parts
        .next()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    match session.log_expense(amount, category, note, None)? {
        Some(expense) => {
            app.set_status(format!(
                "Logged {} {} {}",
                expense.category.emoji(),
                format_amount(expense.amount),
                expense.category.label()
            ));
            if session.month().contains(expense.date) {
                reset_cursors(app);
            }
        }
        None => app.set_status(format!("Amount must be a positive number, got '{amount}'")),
    }
    Ok(())
}

fn cmd_delete(_args: &str, app: &mut App, _session: &mut BudgetSession) -> anyhow::Result<()> {
    if app.screen != Screen::Expenses || app.snapshot.expenses.is_empty() {
        app.set_status("Navigate to Expenses and select one first");
        return Ok(());
    }

    let Some((id, label)) = app.selected_expense().map(|e| {
        let label = format!(
            "{} {} on {}",
            format_amount(e.amount),
            e.category.label(),
            e.date_str()
        );
        (e.id.clone(), label)
    }) else {
        return Ok(());
    };
    app.confirm_message = format!("Delete {label}?");
    app.pending_action = Some(PendingAction::DeleteExpense { id, label });
    app.input_mode = InputMode::Confirm;
    Ok(())
}

/// Apply `change` to a copy of the selected expense and save it.
fn edit_selected(
    app: &mut App,
    session: &mut BudgetSession,
    change: impl FnOnce(&mut Expense),
) -> anyhow::Result<bool> {
    if app.screen != Screen::Expenses {
        app.set_status("Navigate to Expenses and select one first");
        return Ok(false);
    }
    let Some(mut edited) = app.selected_expense().cloned() else {
        app.set_status("No expense selected");
        return Ok(false);
    };
    change(&mut edited);
    session.edit_expense(edited)?;
    Ok(true)
}

fn cmd_amount(args: &str, app: &mut App, session: &mut BudgetSession) -> anyhow::Result<()> {
    let Some(amount) = parse_amount(args) else {
        app.set_status("Usage: :amount <positive number>");
        return Ok(());
    };
    if edit_selected(app, session, |e| e.amount = amount)? {
        app.set_status(format!("Amount set to {}", format_amount(amount)));
    }
    Ok(())
}

fn cmd_recat(args: &str, app: &mut App, session: &mut BudgetSession) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :recat <category>");
        return Ok(());
    }
    let category = parse_category(args)?;
    if edit_selected(app, session, |e| e.category = category)? {
        app.set_status(format!("Categorized as: {}", category.label()));
    }
    Ok(())
}

fn cmd_note(args: &str, app: &mut App, session: &mut BudgetSession) -> anyhow::Result<()> {
    let note = Some(args.to_string()).filter(|n| !n.is_empty());
    let cleared = note.is_none();
    if edit_selected(app, session, |e| e.note = note)? {
        app.set_status(if cleared { "Note cleared" } else { "Note saved" });
    }
    Ok(())
}

fn setting_value(args: &str, app: &mut App, usage: &str) -> Option<Decimal> {
    let value = parse_decimal(args);
    if value.is_none() {
        app.set_status(usage.to_string());
    }
    value
}

fn save_setting(
    update: SettingUpdate,
    app: &mut App,
    session: &mut BudgetSession,
) -> anyhow::Result<()> {
    let key = update.key();
    session.update_settings(update)?;
    app.set_status(format!(
        "Saved {key}. Monthly take-home: {}",
        format_amount(session.take_home().monthly_take_home)
    ));
    Ok(())
}

fn cmd_salary(args: &str, app: &mut App, session: &mut BudgetSession) -> anyhow::Result<()> {
    match setting_value(args, app, "Usage: :salary <annual gross>") {
        Some(v) => save_setting(SettingUpdate::GrossSalary(v), app, session),
        None => Ok(()),
    }
}

fn cmd_bonus(args: &str, app: &mut App, session: &mut BudgetSession) -> anyhow::Result<()> {
    match setting_value(args, app, "Usage: :bonus <annual bonus>") {
        Some(v) => save_setting(SettingUpdate::Bonus(v), app, session),
        None => Ok(()),
    }
}

fn cmd_pretax(args: &str, app: &mut App, session: &mut BudgetSession) -> anyhow::Result<()> {
    match setting_value(args.trim_end_matches('%'), app, "Usage: :pretax <percent 0-100>") {
        Some(v) => save_setting(SettingUpdate::PretaxPercent(v), app, session),
        None => Ok(()),
    }
}

fn cmd_budget(args: &str, app: &mut App, session: &mut BudgetSession) -> anyhow::Result<()> {
    // Last token is the amount, everything before is the category
    let parts: Vec<&str> = args.rsplitn(2, ' ').collect();
    if parts.len() < 2 {
        app.set_status("Usage: :budget <category> <amount>. Example: :budget food 500");
        return Ok(());
    }

    let amount_str = parts[0];
    let category = parse_category(parts[1])?;
    let Some(amount) = parse_decimal(amount_str) else {
        app.set_status(format!("Invalid amount: {amount_str}"));
        return Ok(());
    };

    session.set_category_budget(category, amount)?;
    app.screen = Screen::Budgets;
    app.set_status(format!(
        "Budget set: {} = {}",
        category.label(),
        format_amount(amount)
    ));
    Ok(())
}

fn cmd_export(args: &str, app: &mut App, session: &mut BudgetSession) -> anyhow::Result<()> {
    let path = if args.is_empty() {
        default_export_path(&session.month().to_string())
    } else {
        PathBuf::from(shellexpand(args))
    };

    let count = session.export_csv(&path)?;
    if count == 0 {
        app.set_status(format!("No expenses in {}; wrote header only", session.month()));
    } else {
        app.set_status(format!("Exported {count} expenses to {}", path.display()));
    }
    Ok(())
}

fn cmd_onboard(args: &str, app: &mut App, session: &mut BudgetSession) -> anyhow::Result<()> {
    if args.is_empty() {
        session.complete_onboarding()?;
        app.set_status("Setup complete. Using current income settings");
        return Ok(());
    }

    let values: Vec<Option<Decimal>> = args
        .split_whitespace()
        .map(|v| parse_decimal(v.trim_end_matches('%')))
        .collect();
    let [Some(salary), Some(bonus), Some(pretax)] = values[..] else {
        app.set_status("Usage: :onboard <salary> <bonus> <pretax%>");
        return Ok(());
    };

    session.complete_onboarding_with(salary, bonus, pretax, None)?;
    app.set_status(format!(
        "Setup complete. Monthly take-home: {}",
        format_amount(session.take_home().monthly_take_home)
    ));
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
