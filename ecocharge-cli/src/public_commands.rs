use anyhow::Result;
use colored::Colorize;
use ecocharge_types::validation::{RatingForm, ReportForm};
use ecocharge_types::{ContactMessage, Rating};
use serde_json::json;

use crate::cli::RatingArgs;
use crate::commands::Context;
use crate::output::{self, success};

pub async fn send_contact(
    ctx: &Context,
    name: String,
    email: String,
    subject: Option<String>,
    message: String,
) -> Result<()> {
    let reply = ctx
        .client
        .send_contact(&ContactMessage { name, email, subject, message })
        .await?;

    if ctx.json {
        return output::print_json(&json!({ "message": reply }));
    }
    success(&reply);
    Ok(())
}

fn rating_form(args: RatingArgs) -> RatingForm {
    RatingForm {
        station_id: args.station,
        user_name: args.name,
        user_email: args.email,
        stars: args.stars,
        comment: args.comment,
    }
}

fn print_rating(rating: &Rating, json: bool, verb: &str) -> Result<()> {
    if json {
        return output::print_json(rating);
    }
    success(&format!("Rating {} {} ({})", rating.id.bold(), verb, output::stars(rating.stars)));
    Ok(())
}

pub async fn submit_rating(ctx: &Context, args: RatingArgs) -> Result<()> {
    let rating = ctx.client.submit_rating(&rating_form(args)).await?;
    print_rating(&rating, ctx.json, "submitted")
}

pub async fn edit_rating(ctx: &Context, id: &str, args: RatingArgs) -> Result<()> {
    let rating = ctx.client.edit_rating(id, &rating_form(args)).await?;
    print_rating(&rating, ctx.json, "updated")
}

pub async fn list_ratings(ctx: &Context) -> Result<()> {
    let ratings = ctx.client.list_ratings().await?;

    if ctx.json {
        return output::print_json(&ratings);
    }
    if ratings.is_empty() {
        println!("{}", "No ratings yet.".yellow());
        return Ok(());
    }

    println!("{}", output::ratings_table(&ratings));
    println!("\n{} ratings total", ratings.len());
    Ok(())
}

pub async fn rating_summary(ctx: &Context) -> Result<()> {
    let summary = ctx.client.rating_summary().await?;
    if ctx.json {
        return output::print_json(&summary);
    }
    output::print_summary(&summary);
    Ok(())
}

pub async fn submit_report(
    ctx: &Context,
    reporter_name: String,
    category: String,
    description: String,
    reporter_email: Option<String>,
    location: Option<String>,
) -> Result<()> {
    let form = ReportForm { reporter_name, reporter_email, category, description, location };
    let report = ctx.client.submit_report(&form).await?;

    if ctx.json {
        return output::print_json(&report);
    }
    success(&format!("Report {} filed ({})", report.id.bold(), report.status));
    Ok(())
}

pub async fn list_devices(ctx: &Context) -> Result<()> {
    let devices = ctx.client.list_devices().await?;

    if ctx.json {
        return output::print_json(&devices);
    }
    if devices.is_empty() {
        println!("{}", "No devices registered.".yellow());
        return Ok(());
    }

    println!("{}", output::devices_table(&devices));
    println!("\n{} devices total", devices.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_form_from_args() {
        let form = rating_form(RatingArgs {
            name: "Priya".to_string(),
            stars: 4,
            email: None,
            station: Some("north-lot".to_string()),
            comment: Some("Fast charger".to_string()),
        });
        assert_eq!(form.user_name, "Priya");
        assert_eq!(form.station_id.as_deref(), Some("north-lot"));
        assert_eq!(form.stars, 4);
        assert!(ecocharge_types::validation::check(&form).is_ok());
    }
}
