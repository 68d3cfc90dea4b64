//! Category command - manage the allowed categories per kind

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use competencia_core::{LogEvent, OperationResult, TransactionKind};

use super::{get_logger, log_event, open_context, parse_kind, GlobalOpts};
use crate::output;

#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// Show the categories for one or both kinds
    List {
        #[arg(long, short, value_parser = parse_kind)]
        kind: Option<TransactionKind>,
    },
    /// Allow a new category
    Add {
        #[arg(value_parser = parse_kind)]
        kind: TransactionKind,
        name: String,
    },
    /// Stop offering a category (existing transactions keep it)
    Remove {
        #[arg(value_parser = parse_kind)]
        kind: TransactionKind,
        name: String,
    },
}

pub fn run(opts: &GlobalOpts, command: CategoryCommands) -> Result<()> {
    let mut ctx = open_context(opts)?;

    match command {
        CategoryCommands::List { kind } => {
            let kinds = match kind {
                Some(kind) => vec![kind],
                None => vec![TransactionKind::Income, TransactionKind::Expense],
            };

            if opts.json {
                let data: serde_json::Map<String, serde_json::Value> = kinds
                    .iter()
                    .map(|k| {
                        (
                            k.as_str().to_string(),
                            serde_json::json!(ctx.config.categories.categories(*k)),
                        )
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&OperationResult::ok(data))?);
                return Ok(());
            }

            for kind in kinds {
                println!("{}", kind.to_string().bold());
                for name in ctx.config.categories.categories(kind) {
                    let shift = ctx.config.period_shifts.get(kind, name);
                    if shift == 0 {
                        println!("  {}", name);
                    } else {
                        println!("  {} {}", name, format!("(+{} month(s))", shift).dimmed());
                    }
                }
            }
        }
        CategoryCommands::Add { kind, name } => {
            ctx.config.categories.add(kind, &name)?;
            ctx.save_config()?;
            log_event(&get_logger(), LogEvent::new("category_added").with_command("category"));

            if opts.json {
                println!("{}", serde_json::to_string_pretty(&OperationResult::ok(name.trim()))?);
            } else {
                output::success(&format!("Added '{}' to {} categories", name.trim(), kind));
            }
        }
        CategoryCommands::Remove { kind, name } => {
            ctx.config.categories.remove(kind, &name)?;
            ctx.save_config()?;
            log_event(&get_logger(), LogEvent::new("category_removed").with_command("category"));

            if opts.json {
                println!("{}", serde_json::to_string_pretty(&OperationResult::ok(name.trim()))?);
            } else {
                output::success(&format!("Removed '{}' from {} categories", name.trim(), kind));
            }
        }
    }

    Ok(())
}
