//! Rendering helpers shared by the command handlers.

use anyhow::{Context, Result};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use ecocharge_client::ClientError;
use ecocharge_types::{Device, Rating, RatingSummary, Report, ReportStatus, SqlResult};
use serde::Serialize;
use serde_json::Value;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::io::{self, BufRead, IsTerminal, Write};

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print a failed command to stderr, with a login hint when the session is gone.
pub fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<ClientError>() {
        Some(client_err) => {
            eprintln!("{} {}", "✗".red(), client_err.user_message());
            if client_err.requires_login() {
                eprintln!("  Run {} to sign in again.", "ecocharge login".cyan());
            }
        },
        None => eprintln!("{} {:#}", "✗".red(), err),
    }
}

/// Read one line from stdin after printing `label` to stderr.
fn prompt(label: &str) -> Result<String> {
    eprint!("{}: ", label);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Read a password without echoing it. Piped input is read as a plain line.
pub fn prompt_secret(label: &str) -> Result<String> {
    if !io::stdin().is_terminal() {
        return prompt(label);
    }

    eprint!("{} (input hidden): ", label);
    io::stderr().flush()?;
    terminal::enable_raw_mode().context("Failed to enable raw mode")?;
    let line = read_hidden_line();
    terminal::disable_raw_mode().context("Failed to disable raw mode")?;
    eprintln!();
    line
}

fn read_hidden_line() -> Result<String> {
    let mut line = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        match apply_key(&mut line, &key) {
            KeyOutcome::Continue => {},
            KeyOutcome::Done => return Ok(line),
            KeyOutcome::Cancelled => anyhow::bail!("Cancelled"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum KeyOutcome {
    Continue,
    Done,
    Cancelled,
}

/// Edit the hidden line for one key press.
fn apply_key(line: &mut String, key: &KeyEvent) -> KeyOutcome {
    if key.kind == KeyEventKind::Release {
        return KeyOutcome::Continue;
    }
    match key.code {
        KeyCode::Enter => KeyOutcome::Done,
        KeyCode::Esc => KeyOutcome::Cancelled,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            KeyOutcome::Cancelled
        },
        KeyCode::Char(c) => {
            line.push(c);
            KeyOutcome::Continue
        },
        KeyCode::Backspace => {
            line.pop();
            KeyOutcome::Continue
        },
        _ => KeyOutcome::Continue,
    }
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

pub fn stars(count: u8) -> String {
    let filled = usize::from(count.min(5));
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

pub fn ratings_table(ratings: &[Rating]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["ID", "Name", "Station", "Stars", "Comment"]);

    for rating in ratings {
        table.add_row(vec![
            Cell::new(&rating.id),
            Cell::new(&rating.user_name),
            Cell::new(or_dash(rating.station_id.as_deref())),
            Cell::new(stars(rating.stars)).fg(Color::Yellow),
            Cell::new(or_dash(rating.comment.as_deref())),
        ]);
    }
    table
}

pub fn print_summary(summary: &RatingSummary) {
    println!("{}", "Rating Summary".cyan().bold());
    println!("  Ratings: {}", summary.count);
    println!("  Average: {:.2}", summary.average);
    for (index, count) in summary.histogram.iter().enumerate().rev() {
        let bar = if summary.count == 0 { 0 } else { count * 30 / summary.count };
        println!("  {} {:>4} {}", stars(index as u8 + 1), count, "█".repeat(bar).green());
    }
}

pub fn reports_table(reports: &[Report]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["ID", "Reporter", "Category", "Location", "Status", "Description"]);

    for report in reports {
        let status = match &report.status {
            ReportStatus::Pending => Cell::new("Pending").fg(Color::Yellow),
            ReportStatus::InProgress => Cell::new("In progress").fg(Color::Cyan),
            ReportStatus::Resolved => Cell::new("Resolved").fg(Color::Green),
            ReportStatus::Other(s) => Cell::new(s),
        };
        table.add_row(vec![
            Cell::new(&report.id),
            Cell::new(&report.reporter_name),
            Cell::new(&report.category),
            Cell::new(or_dash(report.location.as_deref())),
            status,
            Cell::new(&report.description),
        ]);
    }
    table
}

pub fn devices_table(devices: &[Device]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["ID", "Name", "Latitude", "Longitude", "Status"]);

    for device in devices {
        let status = match device.status.as_deref() {
            Some(s) if s.eq_ignore_ascii_case("available") || s.eq_ignore_ascii_case("online") => {
                Cell::new(s).fg(Color::Green)
            },
            Some(s) if s.eq_ignore_ascii_case("offline") || s.eq_ignore_ascii_case("faulty") => {
                Cell::new(s).fg(Color::Red)
            },
            other => Cell::new(or_dash(other)),
        };
        table.add_row(vec![
            Cell::new(&device.id),
            Cell::new(or_dash(device.name.as_deref())),
            Cell::new(format!("{:.6}", device.latitude)),
            Cell::new(format!("{:.6}", device.longitude)),
            status,
        ]);
    }
    table
}

/// Text for one SQL cell. Strings are shown without quotes, NULL as `NULL`.
pub fn sql_cell(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn print_sql(result: &SqlResult, json: bool) -> Result<()> {
    if json {
        return print_json(result);
    }
    if !result.has_rows() {
        success(&format!("{} row(s) affected", result.row_count));
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(result.columns.clone());
    for row in &result.rows {
        table.add_row(row.iter().map(sql_cell).collect::<Vec<_>>());
    }
    println!("{table}");
    println!("\n{} row(s)", result.row_count);
    Ok(())
}
