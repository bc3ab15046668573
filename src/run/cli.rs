use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::path::PathBuf;

use crate::budget::Allocation;
use crate::config::{default_export_path, shellexpand};
use crate::errors::BudgetError;
use crate::models::{Category, CategoryKind, Expense, Month, SettingUpdate, DATE_FORMAT};
use crate::session::{parse_amount, parse_category, parse_decimal, BudgetSession};
use crate::ui::util::{format_amount, format_percent, progress_bar, truncate};

pub(crate) fn as_cli(args: &[String], session: &mut BudgetSession) -> Result<()> {
    match args[1].as_str() {
        "summary" | "s" => cli_summary(&args[2..], session),
        "takehome" | "th" => cli_takehome(session),
        "list" | "ls" => cli_list(&args[2..], session),
        "add" => cli_add(&args[2..], session),
        "delete" | "rm" => cli_delete(&args[2..], session),
        "edit" => cli_edit(&args[2..], session),
        "set" => cli_set(&args[2..], session),
        "budget" => cli_budget(&args[2..], session),
        "setup" => cli_setup(&args[2..], session),
        "categories" => cli_categories(session),
        "export" => cli_export(&args[2..], session),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("budgetbuddy {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("Budget Buddy - take-home pay and monthly budget tracker");
    println!();
    println!("Usage: budgetbuddy [command]");
    println!();
    println!("Commands:");
    println!("  (none)                          Launch interactive TUI");
    println!("  summary [YYYY-MM]               Print the monthly budget summary");
    println!("  takehome                        Print the take-home pay breakdown");
    println!("  list [YYYY-MM]                  List a month's expenses");
    println!("  add <amount> <category>         Log an expense");
    println!("    --note <text>                 Optional note");
    println!("    --date <YYYY-MM-DD>           Date of the expense (default: today)");
    println!("  delete <id> [--month YYYY-MM]   Delete an expense");
    println!("  edit <id> [--month YYYY-MM]     Change an expense");
    println!("    --amount, --category, --note, --date");
    println!("  set <salary|bonus|pretax> <v>   Change an income setting");
    println!("  budget <category> <amount>      Set a category's monthly budget");
    println!("  setup --salary <v> --bonus <v> --pretax <v>");
    println!("                                  Save income settings and finish onboarding");
    println!("  categories                      List categories and budgets");
    println!("  export [path]                   Export expenses to CSV");
    println!("    --month <YYYY-MM>             Month to export (default: current)");
    println!("  --help, -h                      Show this help");
    println!("  --version, -V                   Show version");
}

// ── Argument helpers ─────────────────────────────────────────

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

/// First argument that isn't a flag or a flag's value.
fn positional(args: &[String], index: usize) -> Option<&str> {
    let mut skip_next = false;
    args.iter()
        .filter(|a| {
            if skip_next {
                skip_next = false;
                return false;
            }
            if a.starts_with("--") {
                skip_next = true;
                return false;
            }
            true
        })
        .nth(index)
        .map(String::as_str)
}

fn parse_month_arg(arg: &str) -> Result<Month> {
    Month::parse(arg).with_context(|| format!("Invalid month '{arg}', expected YYYY-MM"))
}

fn parse_date_arg(arg: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(arg.trim(), DATE_FORMAT)
        .with_context(|| format!("Invalid date '{arg}', expected YYYY-MM-DD"))
}

/// Select the month named by the first positional or `--month`, if any.
fn select_month_arg(month: Option<&str>, session: &mut BudgetSession) -> Result<()> {
    if let Some(arg) = month {
        session.select_month(parse_month_arg(arg)?)?;
    }
    Ok(())
}

fn category_line(category: Category, budget: Decimal, allocation: &Allocation) -> String {
    format!(
        "  {} {:<20} {:<18} {:>12} {:>5} of take-home{}",
        category.emoji(),
        category.label(),
        category.as_str(),
        format_amount(budget),
        format_percent(allocation.share_of_take_home(budget)),
        if category.is_fixed() { "  (fixed)" } else { "" },
    )
}

fn expense_line(e: &Expense) -> String {
    format!(
        "{}  {:<14} {:>12}  {:<24} {}",
        e.date_str(),
        format!("{} {}", e.category.emoji(), e.category.label()),
        format_amount(e.amount),
        truncate(e.note.as_deref().unwrap_or(""), 24),
        e.id,
    )
}

// ── Commands ─────────────────────────────────────────────────

fn cli_summary(args: &[String], session: &mut BudgetSession) -> Result<()> {
    select_month_arg(positional(args, 0), session)?;
    let snap = session.snapshot();
    let summary = &snap.summary;

    println!("Budget Buddy - {}", snap.month.name());
    println!("{}", "─".repeat(48));
    println!("  Monthly take-home: {}", format_amount(snap.take_home.monthly_take_home));
    println!("  Spent:             {}", format_amount(summary.total_spent));
    println!("  Remaining:         {}", format_amount(snap.remaining_total));
    println!("  Budgeted:          {}", format_amount(summary.total_budget));
    println!("  Expenses:          {}", snap.expenses.len());

    println!();
    println!("By category:");
    for &category in Category::all() {
        let spent = summary.spent_in(category);
        let budget = summary.budget_for(category);
        println!(
            "  {:<16} {:>12} / {:>12} {} {}",
            category.label(),
            format_amount(spent),
            format_amount(budget),
            progress_bar(summary.category_progress(category), 20),
            summary.category_status(category),
        );
    }

    println!();
    println!(
        "Splurge meter: needs {}  wants {}  treats {}",
        format_percent(snap.splurge.needs_pct),
        format_percent(snap.splurge.wants_pct),
        format_percent(snap.splurge.treats_pct),
    );
    let quotes = summary.mood.quotes();
    if let Some(quote) = quotes.first() {
        println!("Buddy is {}: \"{quote}\"", summary.mood);
    }
    Ok(())
}

fn cli_takehome(session: &mut BudgetSession) -> Result<()> {
    let settings = session.settings();
    let th = session.take_home();

    println!("Take-home pay");
    println!("{}", "─".repeat(40));
    println!("  Gross salary:        {}", format_amount(settings.gross_salary));
    println!("  Bonus:               {}", format_amount(settings.bonus));
    println!("  Total gross:         {}", format_amount(th.total_gross));
    println!(
        "  Pre-tax ({}):     -{}",
        format_percent(settings.pretax_percent),
        format_amount(th.pretax_contribution)
    );
    println!("  Federal taxable:     {}", format_amount(th.federal_taxable_income));
    println!("  Federal tax:        -{}", format_amount(th.federal_tax));
    println!("  State tax:          -{}", format_amount(th.state_tax));
    println!("  Social Security:    -{}", format_amount(th.social_security));
    println!("  Medicare:           -{}", format_amount(th.medicare));
    println!("  Total taxes:        -{}", format_amount(th.total_taxes));
    println!("{}", "─".repeat(40));
    println!("  Annual take-home:    {}", format_amount(th.annual_take_home));
    println!("  Monthly take-home:   {}", format_amount(th.monthly_take_home));
    Ok(())
}

fn cli_list(args: &[String], session: &mut BudgetSession) -> Result<()> {
    select_month_arg(positional(args, 0), session)?;
    let month = session.month();
    if session.expenses().is_empty() {
        println!("No expenses for {month}");
        return Ok(());
    }
    println!("Expenses for {}", month.name());
    println!("{}", "─".repeat(100));
    for e in session.expenses() {
        println!("{}", expense_line(e));
    }
    Ok(())
}

fn cli_add(args: &[String], session: &mut BudgetSession) -> Result<()> {
    let (Some(amount), Some(category)) = (positional(args, 0), positional(args, 1)) else {
        anyhow::bail!("Usage: budgetbuddy add <amount> <category> [--note <text>] [--date YYYY-MM-DD]");
    };
    let category = parse_category(category)?;
    let note = flag(args, "--note").map(str::to_string);
    let date = flag(args, "--date").map(parse_date_arg).transpose()?;

    match session.log_expense(amount, category, note, date)? {
        Some(expense) => println!("Logged {}", expense_line(&expense)),
        None => anyhow::bail!("Amount must be a positive number, got '{amount}'"),
    }
    Ok(())
}

fn cli_delete(args: &[String], session: &mut BudgetSession) -> Result<()> {
    let Some(id) = positional(args, 0) else {
        anyhow::bail!("Usage: budgetbuddy delete <id> [--month YYYY-MM]");
    };
    select_month_arg(flag(args, "--month"), session)?;
    let Some(existing) = session.find_expense(id).cloned() else {
        return Err(BudgetError::UnknownExpense(id.to_string()).into());
    };
    session.remove_expense(id)?;
    println!("Deleted {}", expense_line(&existing));
    Ok(())
}

fn cli_edit(args: &[String], session: &mut BudgetSession) -> Result<()> {
    let Some(id) = positional(args, 0) else {
        anyhow::bail!(
            "Usage: budgetbuddy edit <id> [--amount <v>] [--category <c>] [--note <text>] [--date YYYY-MM-DD]"
        );
    };
    select_month_arg(flag(args, "--month"), session)?;
    let Some(mut edited) = session.find_expense(id).cloned() else {
        return Err(BudgetError::UnknownExpense(id.to_string()).into());
    };

    if let Some(amount) = flag(args, "--amount") {
        edited.amount = parse_amount(amount)
            .with_context(|| format!("Amount must be a positive number, got '{amount}'"))?;
    }
    if let Some(category) = flag(args, "--category") {
        edited.category = parse_category(category)?;
    }
    if let Some(note) = flag(args, "--note") {
        edited.note = Some(note.to_string()).filter(|n| !n.trim().is_empty());
    }
    if let Some(date) = flag(args, "--date") {
        edited.date = parse_date_arg(date)?;
    }

    session.edit_expense(edited.clone())?;
    println!("Updated {}", expense_line(&edited));
    Ok(())
}

fn setting_value(raw: &str) -> Result<Decimal> {
    parse_decimal(raw).with_context(|| format!("Not a number: '{raw}'"))
}

fn cli_set(args: &[String], session: &mut BudgetSession) -> Result<()> {
    let (Some(field), Some(raw)) = (args.first(), args.get(1)) else {
        anyhow::bail!("Usage: budgetbuddy set <salary|bonus|pretax> <value>");
    };
    let value = setting_value(raw)?;
    let update = match field.as_str() {
        "salary" => SettingUpdate::GrossSalary(value),
        "bonus" => SettingUpdate::Bonus(value),
        "pretax" | "401k" => SettingUpdate::PretaxPercent(value),
        other => anyhow::bail!("Unknown setting '{other}', expected salary, bonus or pretax"),
    };
    let key = update.key();
    session.update_settings(update)?;
    let stored = session.stored_setting(key)?.unwrap_or_default();
    println!("Saved {key} = {stored}");
    println!(
        "Monthly take-home is now {}",
        format_amount(session.take_home().monthly_take_home)
    );
    Ok(())
}

fn cli_budget(args: &[String], session: &mut BudgetSession) -> Result<()> {
    let (Some(category), Some(raw)) = (args.first(), args.get(1)) else {
        anyhow::bail!("Usage: budgetbuddy budget <category> <amount>");
    };
    let category = parse_category(category)?;
    let amount = setting_value(raw)?;
    session.set_category_budget(category, amount)?;

    let allocation = session.allocation();
    println!(
        "{} budget set to {} ({} of take-home)",
        category.label(),
        format_amount(amount),
        format_percent(allocation.share_of_take_home(amount)),
    );
    println!(
        "Allocated {} of {} take-home ({} left)",
        format_amount(allocation.total_allocated),
        format_amount(allocation.monthly_take_home),
        format_amount(allocation.remaining),
    );
    Ok(())
}

fn cli_setup(args: &[String], session: &mut BudgetSession) -> Result<()> {
    let current = session.settings().clone();
    let value_or = |name: &str, default: Decimal| -> Result<Decimal> {
        flag(args, name).map_or(Ok(default), setting_value)
    };
    let salary = value_or("--salary", current.gross_salary)?;
    let bonus = value_or("--bonus", current.bonus)?;
    let pretax = value_or("--pretax", current.pretax_percent)?;

    session.complete_onboarding_with(salary, bonus, pretax, None)?;
    println!("Setup complete.");
    cli_takehome(session)
}

fn cli_categories(session: &mut BudgetSession) -> Result<()> {
    let settings = session.settings();
    let allocation = session.allocation();
    for kind in [CategoryKind::Needs, CategoryKind::Wants, CategoryKind::Savings] {
        println!("{}", kind.as_str().to_uppercase());
        for category in Category::of_kind(kind) {
            println!(
                "{}",
                category_line(category, settings.budget_for(category), &allocation)
            );
        }
    }
    println!(
        "Allocated {} of {} take-home ({})",
        format_amount(allocation.total_allocated),
        format_amount(allocation.monthly_take_home),
        format_percent(allocation.allocated_pct),
    );
    Ok(())
}

fn cli_export(args: &[String], session: &mut BudgetSession) -> Result<()> {
    select_month_arg(flag(args, "--month"), session)?;
    let month = session.month().to_string();

    let output_path = positional(args, 0)
        .map(|a| PathBuf::from(shellexpand(a)))
        .unwrap_or_else(|| default_export_path(&month));

    let count = session.export_csv(&output_path)?;
    if count == 0 {
        println!("No expenses for {month}");
    } else {
        println!("Exported {count} expenses to {}", output_path.display());
    }
    Ok(())
}
