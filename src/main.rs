//! # chatcode CLI
//!
//! Command-line interface for the chatcode library.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser as ClapParser;

use chatcode::annotate::{
    DropdownConfig, load_dropdown_configs, render_conversation_page, render_group_page,
    safe_chat_id, sample_configs,
};
use chatcode::clean::{IdCleaner, batch_clean, summarize};
use chatcode::cli::{CleanArgs, Cli, Command, ConvoArgs, GroupArgs, parse_user_pair};
use chatcode::core::{AliasTable, ConversationMap, most_active_sender, segment_turns};
use chatcode::parsers::{MatrixParser, load_chat_logs};
use chatcode::{ChatcodeError, Message};

fn main() {
    if let Err(e) = run() {
        eprintln!("❌ Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), ChatcodeError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Clean(args) => run_clean(&args),
        Command::Convo(args) => run_convo(&args),
        Command::Group(args) => run_group(&args),
    }
}

fn run_clean(args: &CleanArgs) -> Result<(), ChatcodeError> {
    let cleaner = IdCleaner::new();

    if args.batch {
        let output_dir = args
            .output
            .clone()
            .unwrap_or_else(|| default_cleaned_path(&args.input));
        let report = batch_clean(&cleaner, &args.input, &output_dir, &args.pattern)?;

        if report.cleaned.is_empty() && report.skipped.is_empty() {
            println!(
                "No files matching '{}' found in {}",
                args.pattern,
                args.input.display()
            );
            return Ok(());
        }
        for (path, count) in &report.cleaned {
            println!("✅ {}: {} messages", path.display(), count);
        }
        for (path, err) in &report.skipped {
            eprintln!("⚠️  Skipping {}: {}", path.display(), err);
        }
        println!(
            "Cleaned {} files into {}",
            report.cleaned.len(),
            output_dir.display()
        );
        Ok(())
    } else {
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| default_cleaned_path(&args.input));
        let records = cleaner.clean_file(&args.input, Some(&output))?;
        println!("✅ Cleaned {} messages into {}", records.len(), output.display());
        if args.summary {
            println!();
            println!("{}", summarize(&records));
        }
        Ok(())
    }
}

fn run_convo(args: &ConvoArgs) -> Result<(), ChatcodeError> {
    let configs = resolve_configs(&args.config)?;

    let aliases = match AliasTable::load(&args.aliases) {
        Ok(table) => table,
        Err(e) => {
            eprintln!(
                "⚠️  Failed to load alias mapping from {}: {e}",
                args.aliases.display()
            );
            AliasTable::new()
        }
    };

    let outcome = load_chat_logs(&args.files);
    for (path, err) in &outcome.skipped {
        eprintln!("⚠️  Skipping {}: {err}", path.display());
    }

    let map = ConversationMap::from_messages(outcome.messages, &aliases);
    println!("Total processed message count: {}", map.message_count());
    if map.message_count() != map.ingested() {
        println!(
            "Mismatch detected! Ingested: {}, Processed: {}",
            map.ingested(),
            map.message_count()
        );
    }

    let turns = map.into_turns();
    println!("Total number of conversation histories: {}", turns.len());

    if args.users.is_empty() {
        return Ok(());
    }
    fs::create_dir_all(&args.output)?;

    for raw_pair in &args.users {
        let (user_i, user_j) = match parse_user_pair(raw_pair) {
            Ok(pair) => pair,
            Err(e) => {
                eprintln!("⚠️  {e}");
                continue;
            }
        };
        match turns.get(&user_i, &user_j) {
            Some(units) => {
                let html = render_conversation_page(&user_i, &user_j, units, &configs);
                let path = args
                    .output
                    .join(format!("conversation_history_{user_i}_{user_j}.html"));
                fs::write(&path, html)?;
                println!("✅ Wrote {}", path.display());
            }
            None => eprintln!("No conversation found between {user_i} and {user_j}."),
        }
    }

    Ok(())
}

fn run_group(args: &GroupArgs) -> Result<(), ChatcodeError> {
    let configs = resolve_configs(&args.config)?;

    let parser = MatrixParser::new();
    let messages = parser.parse(&args.input)?;
    println!(
        "Parsed {} messages from {}",
        messages.len(),
        args.input.display()
    );

    let mut chat: Vec<Message> = messages
        .into_iter()
        .filter(|msg| msg.chat_id.as_deref() == Some(args.chat_id.as_str()))
        .collect();
    if chat.is_empty() {
        println!("No messages found for chat_id: {}", args.chat_id);
        return Ok(());
    }
    chat.sort_by_key(|msg| msg.timestamp);

    let senders: BTreeSet<&str> = chat.iter().map(|msg| msg.sender.as_str()).collect();
    println!(
        "Users in chat: {}",
        senders.into_iter().collect::<Vec<_>>().join(", ")
    );

    let main_user = match &args.main_user {
        Some(user) => user.clone(),
        None => match most_active_sender(&chat) {
            Some(user) => {
                let user = user.to_string();
                println!("Using '{user}' as the main user (messages shown on right)");
                user
            }
            None => chat[0].sender.clone(),
        },
    };

    let turns = segment_turns(chat);
    fs::create_dir_all(&args.output)?;

    let html = render_group_page(&args.chat_id, &main_user, &turns, &configs);
    let path = args
        .output
        .join(format!("group_chat_{}.html", safe_chat_id(&args.chat_id)));
    fs::write(&path, html)?;
    println!("✅ Wrote {}", path.display());

    Ok(())
}

/// Loads a dropdown configuration file, or the built-in sample set.
fn resolve_configs(raw: &str) -> Result<Vec<DropdownConfig>, ChatcodeError> {
    if raw == "sample" {
        Ok(sample_configs())
    } else {
        load_dropdown_configs(Path::new(raw))
    }
}

/// `cleaned_<name>` next to the input, the default output location.
fn default_cleaned_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("output");
    input.with_file_name(format!("cleaned_{name}"))
}
