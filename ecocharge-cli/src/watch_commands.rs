//! Live view of a feed-backed collection.

use anyhow::Result;
use colored::Colorize;
use ecocharge_client::{watch, ChangeFeed, ClientError};
use ecocharge_types::{Device, ListChange, LiveList, Rating, Record};
use serde::Serialize;
use serde_json::json;
use std::future::Future;

use crate::commands::Context;
use crate::output;

pub async fn watch_ratings(ctx: &Context) -> Result<()> {
    follow(ctx, ctx.client.list_ratings(), |rating: &Rating| {
        format!(
            "{} {} {}",
            rating.user_name,
            output::stars(rating.stars),
            rating.comment.as_deref().unwrap_or("")
        )
    })
    .await
}

pub async fn watch_devices(ctx: &Context) -> Result<()> {
    follow(ctx, ctx.client.list_devices(), |device: &Device| {
        format!(
            "{} at ({:.6}, {:.6}) {}",
            device.name.as_deref().unwrap_or(&device.id),
            device.latitude,
            device.longitude,
            device.status.as_deref().unwrap_or("")
        )
    })
    .await
}

/// Open the feed, load the snapshot, then apply events until the feed closes or Ctrl+C.
async fn follow<T, S, D>(ctx: &Context, snapshot: S, describe: D) -> Result<()>
where
    T: Record + Serialize,
    S: Future<Output = Result<Vec<T>, ClientError>>,
    D: Fn(&T) -> String,
{
    let feed = ChangeFeed::new(ctx.client.config())?.with_session(ctx.client.store().as_ref())?;
    let (mut list, stream) = feed.subscribe_live(snapshot).await?;

    if !ctx.json {
        println!(
            "{} Watching {} ({} records). Press Ctrl+C to stop.",
            "●".green(),
            T::COLLECTION,
            list.len()
        );
    }

    let json = ctx.json;
    let updates = watch(stream, &mut list, |change, list| {
        if let Err(e) = print_change(change, list, json, &describe) {
            tracing::warn!("Failed to print change: {}", e);
        }
    });

    tokio::select! {
        result = updates => result?,
        _ = tokio::signal::ctrl_c() => {},
    }

    if !ctx.json {
        println!("\n{} {} records", "Stopped.".yellow(), list.len());
    }
    Ok(())
}

fn change_label(change: &ListChange) -> (&'static str, &str) {
    match change {
        ListChange::Inserted { id } => ("added", id),
        ListChange::Updated { id } => ("modified", id),
        ListChange::Confirmed { id } => ("confirmed", id),
        ListChange::Removed { id } => ("removed", id),
        ListChange::Ignored { id } => ("ignored", id),
    }
}

fn print_change<T, D>(change: &ListChange, list: &LiveList<T>, json: bool, describe: &D) -> Result<()>
where
    T: Record + Serialize,
    D: Fn(&T) -> String,
{
    if !change.is_change() {
        return Ok(());
    }
    let (label, id) = change_label(change);
    let record = list.get(id);

    if json {
        // one object per line so the output can be piped
        println!("{}", serde_json::to_string(&json!({ "change": label, "id": id, "record": record }))?);
        return Ok(());
    }

    let tag = match change {
        ListChange::Inserted { .. } => format!("+ {}", label).green(),
        ListChange::Removed { .. } => format!("- {}", label).red(),
        _ => format!("~ {}", label).cyan(),
    };
    match record {
        Some(record) => println!("{} {} {}", tag, id.bold(), describe(record)),
        None => println!("{} {}", tag, id.bold()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_labels_match_feed_vocabulary() {
        assert_eq!(change_label(&ListChange::Inserted { id: "a".into() }), ("added", "a"));
        assert_eq!(change_label(&ListChange::Updated { id: "b".into() }), ("modified", "b"));
        assert_eq!(change_label(&ListChange::Removed { id: "c".into() }), ("removed", "c"));
    }
}
