//! Scripted walk through a full editing session.

use std::time::Duration;

use anyhow::{ensure, Result};
use colored::Colorize;

use storyforge_core::{SessionHandle, MANUAL_SAVE};

use crate::repl::{print_draft, print_versions};

/// Generate, edit, let auto-save fire, diff and restore.
///
/// `debounce` should match the session's auto-save debounce.
pub async fn run(handle: SessionHandle, debounce: Duration) -> Result<()> {
    step("Generate a story");
    let initial = handle
        .generate("New users register with their email address")
        .await?;
    print_draft(initial.content());

    step("Edit the description and pause");
    let mut draft = handle.draft().await?;
    draft.description =
        "As a visitor, I want to sign up with my email or a social account.".to_string();
    handle.edit(draft).await?;
    tokio::time::sleep(debounce + Duration::from_millis(100)).await;
    print_versions(&handle.versions().await?);

    step("Ask the assistant about the estimate");
    let reply = handle.ask("Is 5 story points appropriate?").await?;
    println!("{}", reply.reply);
    handle.apply_suggestion(reply.suggestion).await?;
    handle.save_version(MANUAL_SAVE).await?;
    print_versions(&handle.versions().await?);

    step("Compare with the initial generation");
    if let Some(diff) = handle.diff(initial.id().as_str()).await? {
        print!("{}", diff);
    }

    step("Restore the initial generation");
    handle.request_restore(initial.id().as_str()).await?;
    let restored = handle.confirm_restore().await?;
    ensure!(
        &restored == initial.content(),
        "Restored draft does not match the initial generation"
    );
    println!("{}", "Draft matches the initial generation".green());

    Ok(())
}

fn step(title: &str) {
    println!();
    println!("{} {}", "==>".cyan().bold(), title.bold());
}
