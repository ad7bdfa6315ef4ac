use anyhow::Result;
use colored::Colorize;
use ecocharge_types::validation::{ChangePasswordForm, ChangeUsernameForm, ProfileUpdate, SqlQuery};
use ecocharge_types::AdminProfile;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::Context;
use crate::output::{self, prompt_secret, success};

fn print_profile(profile: &AdminProfile) {
    println!("{}", "Admin Profile".cyan().bold());
    println!("  Username: {}", profile.username);
    println!("  Full name: {}", profile.full_name.as_deref().unwrap_or("-"));
    println!("  Email: {}", profile.email);
    println!("  Phone: {}", profile.phone.as_deref().unwrap_or("-"));
    if let Some(role) = &profile.role {
        println!("  Role: {}", role);
    }
}

pub async fn show_profile(ctx: &Context) -> Result<()> {
    let profile = ctx.client.profile().await?;
    if ctx.json {
        return output::print_json(&profile);
    }
    print_profile(&profile);
    Ok(())
}

pub async fn update_profile(
    ctx: &Context,
    full_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
) -> Result<()> {
    let update = ProfileUpdate { full_name, email, phone };
    let profile = ctx.client.update_profile(&update).await?;

    if ctx.json {
        return output::print_json(&profile);
    }
    success("Profile updated");
    print_profile(&profile);
    Ok(())
}

pub async fn change_username(
    ctx: &Context,
    new_username: String,
    current_password: Option<String>,
) -> Result<()> {
    let current_password = match current_password {
        Some(p) => p,
        None => prompt_secret("Current password")?,
    };

    let message = ctx
        .client
        .change_username(&ChangeUsernameForm { new_username: new_username.clone(), current_password })
        .await?;

    if ctx.json {
        return output::print_json(&json!({ "username": new_username, "message": message }));
    }
    success(&message);
    Ok(())
}

pub async fn change_password(ctx: &Context) -> Result<()> {
    let form = ChangePasswordForm {
        current_password: prompt_secret("Current password")?,
        new_password: prompt_secret("New password")?,
        confirm_password: prompt_secret("Confirm new password")?,
    };

    let message = ctx.client.change_password(&form).await?;

    if ctx.json {
        return output::print_json(&json!({ "message": message }));
    }
    success(&message);
    Ok(())
}

pub async fn list_reports(ctx: &Context) -> Result<()> {
    let reports = ctx.client.list_reports().await?;

    if ctx.json {
        return output::print_json(&reports);
    }
    if reports.is_empty() {
        println!("{}", "No reports found.".yellow());
        return Ok(());
    }

    println!("{}", output::reports_table(&reports));
    println!("\n{} reports total", reports.len());
    Ok(())
}

pub async fn run_sql(ctx: &Context, query: &str) -> Result<()> {
    let result = ctx.client.execute_sql(&SqlQuery::new(query.trim())).await?;
    output::print_sql(&result, ctx.json)
}

/// Statements are read until a line ending in `;`. `\q` on an empty buffer quits.
pub async fn sql_console(ctx: &Context) -> Result<()> {
    eprintln!("{}", "EcoCharge SQL console. End statements with ';', \\q to quit.".cyan());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut buffer = String::new();

    loop {
        eprint!("{}", if buffer.is_empty() { "sql> " } else { "  -> " });
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let trimmed = line.trim();

        if buffer.is_empty() {
            if trimmed == "\\q" {
                return Ok(());
            }
            if trimmed.is_empty() {
                continue;
            }
        }

        buffer.push_str(&line);
        buffer.push('\n');
        if !trimmed.ends_with(';') {
            continue;
        }

        let statement = std::mem::take(&mut buffer);
        if let Err(e) = run_sql(ctx, &statement).await {
            output::report_error(&e);
        }
    }

    // EOF with an unterminated statement still runs it
    if !buffer.trim().is_empty() {
        run_sql(ctx, &buffer).await?;
    }
    Ok(())
}
