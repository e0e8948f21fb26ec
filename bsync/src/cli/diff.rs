use bsync_common::config::Config;
use bsync_common::error::{BsyncError, Result};
use bsync_common::model::{DiffResult, ManifestEntry};
use bsync_core::ResolveOptions;
use clap::Args;
use colored::Colorize;
use prettytable::{format, Cell, Row, Table};

use crate::cli::resolver;

/// Show how the Brewfile differs from what is installed
#[derive(Args, Debug)]
pub struct Diff {
    /// Print the difference as JSON
    #[arg(long)]
    pub json: bool,
}

impl Diff {
    pub async fn run(&self, config: &Config) -> Result<()> {
        let diff = resolver(config, ResolveOptions::from_config(config))
            .compute_diff()
            .await?;

        if self.json {
            let json = serde_json::to_string_pretty(&diff)
                .map_err(|e| BsyncError::Generic(format!("Failed to serialize diff: {e}")))?;
            println!("{json}");
            return Ok(());
        }

        if diff.is_empty() {
            println!("{}", "The Brewfile matches the installed packages.".green());
            return Ok(());
        }
        build_table(&diff).printstd();
        println!(
            "{} only installed, {} only in the Brewfile",
            diff.added.len().to_string().green(),
            diff.removed.len().to_string().red()
        );
        Ok(())
    }
}

fn build_table(diff: &DiffResult) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.add_row(Row::new(vec![
        Cell::new("Type").style_spec("b"),
        Cell::new("Name").style_spec("b"),
        Cell::new("Categories").style_spec("b"),
        Cell::new("Change").style_spec("b"),
    ]));
    for entry in &diff.added {
        table.add_row(row(entry, "+", "Fg"));
    }
    for entry in &diff.removed {
        table.add_row(row(entry, "-", "Fr"));
    }
    table
}

fn row(entry: &ManifestEntry, change: &str, style: &str) -> Row {
    let categories = if entry.categories.is_empty() {
        "-".to_string()
    } else {
        entry.categories.join(" / ")
    };
    let name = match entry.store_id() {
        Some(id) => format!("{} ({id})", entry.name),
        None => entry.name.clone(),
    };
    Row::new(vec![
        Cell::new(entry.bundle_type.token()),
        Cell::new(&name).style_spec("Fb"),
        Cell::new(&categories),
        Cell::new(change).style_spec(style),
    ])
}
