// bsync-core/src/resolve/prompt.rs
use std::io::{self, BufRead, Write};

use bsync_common::error::{BsyncError, Result};
use bsync_common::model::DiffResult;
use colored::Colorize;

pub const CHOICES: &str = "\
1. update the manifest with the currently installed packages
2. run cleanup (remove anything not declared)
3. do nothing
4. exit";

/// Answer to the "what now?" question asked when the Brewfile and the
/// installed set disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    UpdateFromActual,
    CleanupOnly,
    NoOp,
    Exit,
}

impl Choice {
    /// Anything other than 1, 2 or 3 means exit.
    pub fn from_input(input: &str) -> Self {
        match input.trim() {
            "1" => Choice::UpdateFromActual,
            "2" => Choice::CleanupOnly,
            "3" => Choice::NoOp,
            _ => Choice::Exit,
        }
    }
}

/// `+ name` for installed-only entries, `- name` for declared-only ones.
pub fn render_diff(diff: &DiffResult) -> String {
    let mut out = String::new();
    for entry in &diff.added {
        out.push_str(&format!("{}\n", format!("+ {}", entry.name).green()));
    }
    for entry in &diff.removed {
        out.push_str(&format!("{}\n", format!("- {}", entry.name).red()));
    }
    out
}

pub fn print_diff_and_choices(diff: &DiffResult) {
    println!(
        "{}",
        "The Brewfile and the currently installed packages are different.".red()
    );
    println!();
    println!("{}", "diff:".bold());
    print!("{}", render_diff(diff));
    println!();
    println!("What will you do to resolve the diff?");
    println!();
    println!("{CHOICES}");
    println!();
}

/// Asks for a choice on `input`. End of input counts as exit.
pub fn ask(input: &mut dyn BufRead) -> Result<Choice> {
    print!("What do you run? [1-4]: ");
    io::stdout().flush()?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .map_err(|e| BsyncError::phase("prompt", e.into()))?;
    if read == 0 {
        println!();
        return Ok(Choice::Exit);
    }
    Ok(Choice::from_input(&line))
}
