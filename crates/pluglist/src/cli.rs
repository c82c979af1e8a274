use std::io::{self, BufRead, Write};

use pluglist_core::planner::CommitSummary;
use pluglist_core::repository::{Module, ModuleRepository};
use pluglist_core::ui_bridge::{MessageSeverity, UiMessage, UserPrompt};

/// Terminal front end: prints the commit summary and reads a y/N answer.
#[derive(Debug, Default)]
pub struct StdioPrompt {
    /// Answer yes without reading stdin (`--yes`)
    pub assume_yes: bool,
}

impl UserPrompt for StdioPrompt {
    fn confirm(&mut self, summary: &CommitSummary) -> bool {
        println!("{}", summary);
        if self.assume_yes {
            return true;
        }
        print!("Proceed? [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            // No terminal to ask; treat as a refusal
            Err(_) => false,
        }
    }

    fn notify(&mut self, message: UiMessage) {
        match message.severity {
            MessageSeverity::Info => println!("{}", message.text),
            MessageSeverity::Warning | MessageSeverity::Error => {
                eprintln!("{}: {}", message.severity, message.text)
            }
        }
    }
}

fn status(module: &Module) -> &'static str {
    if module.is_disabled() { "disabled" } else { "enabled" }
}

fn kind(module: &Module) -> &'static str {
    if module.is_directory() { "folder" } else { "file" }
}

/// Print the filtered, sorted view as a table
pub fn print_modules(repository: &ModuleRepository) {
    let view = repository.view();
    println!(
        "{} of {} module(s) in {}",
        view.len(),
        repository.len(),
        repository.root().display()
    );
    for module in view {
        let staged = match module.planned_action() {
            Some(action) => format!(" [{}]", action),
            None => String::new(),
        };
        println!(
            "  {:<9}{:<7}{}{}",
            status(module),
            kind(module),
            module.display_name(),
            staged
        );
    }
}
