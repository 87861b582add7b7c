//! Line-oriented stand-in for the story editor UI.

use std::io::Write;

use anyhow::{bail, Context, Result};
use chrono::Local;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use storyforge_core::{AssistantReply, SessionHandle, SessionNotification, MANUAL_SAVE};
use storyforge_history::{StoryContent, VersionSummary};

/// One line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Generate(String),
    Title(String),
    Desc(String),
    Criterion(String),
    Points(u32),
    DevNotes,
    Ask(String),
    Apply,
    Save(Option<String>),
    List,
    Show,
    Diff(String),
    Restore(String),
    Yes,
    No,
    Clear,
    New,
    Help,
    Quit,
}

impl ReplCommand {
    /// Parse a line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "generate" => Self::Generate(rest.to_string()),
            "title" => Self::Title(rest.to_string()),
            "desc" => Self::Desc(rest.to_string()),
            "criterion" => Self::Criterion(required(word, rest)?),
            "points" => {
                let points = rest
                    .parse()
                    .with_context(|| format!("Story points must be a number, got '{}'", rest))?;
                Self::Points(points)
            }
            "devnotes" => Self::DevNotes,
            "ask" => Self::Ask(required(word, rest)?),
            "apply" => Self::Apply,
            "save" => Self::Save((!rest.is_empty()).then(|| rest.to_string())),
            "list" => Self::List,
            "show" => Self::Show,
            "diff" => Self::Diff(required(word, rest)?),
            "restore" => Self::Restore(required(word, rest)?),
            "yes" | "y" => Self::Yes,
            "no" | "n" => Self::No,
            "clear" => Self::Clear,
            "new" => Self::New,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => bail!("Unknown command '{}'. Type 'help' for a list.", other),
        };
        Ok(Some(command))
    }
}

fn required(word: &str, rest: &str) -> Result<String> {
    if rest.is_empty() {
        bail!("'{}' needs an argument", word);
    }
    Ok(rest.to_string())
}

/// Read commands from stdin until `quit` or end of input
pub async fn run(handle: SessionHandle) -> Result<()> {
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_reply: Option<AssistantReply> = None;

    prompt()?;
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        match ReplCommand::parse(&line) {
            Ok(Some(ReplCommand::Quit)) => break,
            Ok(Some(command)) => {
                if let Err(e) = execute(&handle, command, &mut last_reply).await {
                    eprintln!("{} {:#}", "error:".red().bold(), e);
                }
            }
            Ok(None) => {}
            Err(e) => eprintln!("{} {:#}", "error:".red().bold(), e),
        }
        prompt()?;
    }

    Ok(())
}

async fn execute(
    handle: &SessionHandle,
    command: ReplCommand,
    last_reply: &mut Option<AssistantReply>,
) -> Result<()> {
    match command {
        ReplCommand::Generate(requirements) => {
            let version = handle.generate(&requirements).await?;
            println!("Generated '{}'", version.title().bold());
            print_draft(version.content());
        }
        ReplCommand::Title(title) => edit(handle, |d| d.title = title).await?,
        ReplCommand::Desc(description) => edit(handle, |d| d.description = description).await?,
        ReplCommand::Criterion(criterion) => {
            edit(handle, |d| d.acceptance_criteria.push(criterion)).await?
        }
        ReplCommand::Points(points) => edit(handle, |d| d.story_points = points).await?,
        ReplCommand::DevNotes => {
            handle.attach_dev_notes().await?;
            println!("Developer notes attached");
        }
        ReplCommand::Ask(message) => {
            let reply = handle.ask(&message).await?;
            println!("{} {}", "assistant:".cyan().bold(), reply.reply);
            println!(
                "  suggestion ({}): {}",
                reply.suggestion.context.as_str(),
                reply.suggestion.text.italic()
            );
            println!("  {}", "Type 'apply' to add it to the story.".dimmed());
            *last_reply = Some(reply);
        }
        ReplCommand::Apply => {
            let Some(reply) = last_reply.take() else {
                bail!("Nothing to apply, ask the assistant first");
            };
            let version = handle.apply_suggestion(reply.suggestion).await?;
            println!("Applied suggestion, saved as '{}'", version.label());
        }
        ReplCommand::Save(label) => {
            let label = label.as_deref().unwrap_or(MANUAL_SAVE);
            let version = handle.save_version(label).await?;
            println!("Saved '{}' ({})", version.label(), version.id());
        }
        ReplCommand::List => print_versions(&handle.versions().await?),
        ReplCommand::Show => print_draft(&handle.draft().await?),
        ReplCommand::Diff(id) => match handle.diff(&id).await? {
            Some(diff) => print!("{}", diff),
            None => println!("Version {} not found", id),
        },
        ReplCommand::Restore(id) => {
            let version = handle.request_restore(&id).await?;
            println!(
                "Restore '{}' from {}? This replaces the current draft. ({}/{})",
                version.label().bold(),
                version.timestamp().with_timezone(&Local).format("%b %d %H:%M:%S"),
                "yes".green(),
                "no".red()
            );
        }
        ReplCommand::Yes => {
            handle.confirm_restore().await?;
        }
        ReplCommand::No => {
            if handle.cancel_restore().await? {
                println!("Restore cancelled");
            } else {
                println!("No restore pending");
            }
        }
        ReplCommand::Clear => {
            let removed = handle.clear_versions().await?;
            println!("Cleared {} version(s)", removed);
        }
        ReplCommand::New => {
            handle.new_story().await?;
            println!("Started a new story");
        }
        ReplCommand::Help => print_help(),
        ReplCommand::Quit => {}
    }
    Ok(())
}

async fn edit(handle: &SessionHandle, change: impl FnOnce(&mut StoryContent)) -> Result<()> {
    let mut draft = handle.draft().await?;
    change(&mut draft);
    handle.edit(draft).await?;
    Ok(())
}

/// Print a session notification as it arrives
pub fn print_notification(notification: &SessionNotification) {
    match notification {
        SessionNotification::VersionsChanged(versions) => match versions.first() {
            Some(latest) => eprintln!(
                "  {} {} version(s), latest '{}'",
                "●".green(),
                versions.len(),
                latest.label
            ),
            None => eprintln!("  {} version history is empty", "●".yellow()),
        },
        SessionNotification::DraftRestored(content) => {
            eprintln!("  {} draft restored", "●".blue());
            print_draft(content);
        }
    }
}

pub fn print_versions(versions: &[VersionSummary]) {
    if versions.is_empty() {
        println!("{}", "No saved versions".dimmed());
        return;
    }
    for version in versions {
        println!(
            "{}  {}  {:<28} {}",
            version.id.to_string().dimmed(),
            version.timestamp.with_timezone(&Local).format("%H:%M:%S"),
            version.label.bold(),
            version.preview
        );
    }
}

pub fn print_draft(draft: &StoryContent) {
    println!("{} {}", "Title:".bold(), or_empty(&draft.title));
    println!("{} {}", "Description:".bold(), or_empty(&draft.description));
    println!("{}", "Acceptance Criteria:".bold());
    for (i, criterion) in draft.acceptance_criteria.iter().enumerate() {
        println!("  {}. {}", i + 1, criterion);
    }
    println!("{} {}", "Story Points:".bold(), draft.story_points);
    if let Some(test_data) = &draft.test_data {
        println!(
            "{} {} input(s), {} edge case(s), {} response(s), {} snippet(s)",
            "Test Data:".bold(),
            test_data.user_inputs.len(),
            test_data.edge_cases.len(),
            test_data.api_responses.len(),
            test_data.code_snippets.len()
        );
    }
}

fn or_empty(text: &str) -> &str {
    if text.trim().is_empty() {
        "(empty)"
    } else {
        text
    }
}

fn prompt() -> Result<()> {
    print!("{} ", ">".bold());
    std::io::stdout().flush().context("Failed to flush stdout")
}

fn print_help() {
    println!("{}", "Commands".bold());
    println!("  generate [requirements]  draft a story from requirements");
    println!("  title|desc <text>        edit the title or description");
    println!("  criterion <text>         add an acceptance criterion");
    println!("  points <n>               set story points");
    println!("  devnotes                 attach developer notes");
    println!("  ask <message>            ask the refinement assistant");
    println!("  apply                    apply the last suggestion");
    println!("  save [label]             save a version now");
    println!("  list | show              list versions, show the draft");
    println!("  diff <id>                compare a version with the draft");
    println!("  restore <id>, yes | no   restore a version after confirming");
    println!("  clear | new | quit");
}
