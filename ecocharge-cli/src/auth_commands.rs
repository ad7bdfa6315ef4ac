use anyhow::Result;
use colored::Colorize;
use ecocharge_types::validation::{LoginForm, ResetPasswordForm, SendOtpForm, VerifyOtpForm};
use serde_json::json;

use crate::commands::Context;
use crate::output::{self, prompt_secret, success};

pub async fn login(ctx: &Context, username: String, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => prompt_secret("Password")?,
    };

    let session = ctx.client.login(&LoginForm { username, password }).await?;

    if ctx.json {
        return output::print_json(&session.admin);
    }
    success(&format!("Logged in as {}", session.admin.display_name().bold()));
    Ok(())
}

pub fn logout(ctx: &Context) -> Result<()> {
    ctx.client.logout()?;
    if !ctx.json {
        success("Logged out");
    }
    Ok(())
}

pub fn whoami(ctx: &Context) -> Result<()> {
    let session = ctx.client.session()?;
    let cooldown = ctx.client.login_cooldown()?;

    if ctx.json {
        return output::print_json(&json!({
            "admin": session.as_ref().map(|s| &s.admin),
            "loggedInAt": session.as_ref().map(|s| s.logged_in_at),
            "loginCooldownSecs": cooldown,
        }));
    }

    match &session {
        Some(session) => {
            println!("{}", "Signed in".cyan().bold());
            println!("  Username: {}", session.admin.username);
            println!("  Name: {}", session.admin.display_name());
            println!("  Email: {}", session.admin.email);
            if let Some(role) = &session.admin.role {
                println!("  Role: {}", role);
            }
            println!("  Since: {}", session.logged_in_at.format("%Y-%m-%d %H:%M UTC"));
        },
        None => println!("{}", "Not signed in.".yellow()),
    }
    if let Some(secs) = cooldown {
        println!("{} Login blocked for another {}s", "!".yellow(), secs);
    }
    Ok(())
}

pub async fn send_otp(ctx: &Context, email: String) -> Result<()> {
    let message = ctx.client.send_otp(&SendOtpForm { email }).await?;
    if ctx.json {
        return output::print_json(&json!({ "message": message }));
    }
    success(&message);
    Ok(())
}

pub async fn verify_otp(ctx: &Context, email: String, otp: String) -> Result<()> {
    let verification = ctx.client.verify_otp(&VerifyOtpForm { email, otp }).await?;

    if ctx.json {
        return output::print_json(&verification);
    }
    if verification.verified {
        success(verification.message.as_deref().unwrap_or("Code verified"));
        Ok(())
    } else {
        anyhow::bail!(
            "{}",
            verification.message.as_deref().unwrap_or("Invalid or expired code")
        )
    }
}

pub async fn reset_password(
    ctx: &Context,
    email: String,
    otp: String,
    new_password: Option<String>,
) -> Result<()> {
    let (new_password, confirm_password) = match new_password {
        Some(p) => (p.clone(), p),
        None => (prompt_secret("New password")?, prompt_secret("Confirm new password")?),
    };

    let message = ctx
        .client
        .reset_password(&ResetPasswordForm { email, otp, new_password, confirm_password })
        .await?;

    if ctx.json {
        return output::print_json(&json!({ "message": message }));
    }
    success(&message);
    Ok(())
}
