//zoutline/src/main.rs
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

mod logging;

use zoutline::core::Command;
use zoutline::kernel::services::adapters::{ensure_settings_file, load_settings, JsonFileStore};
use zoutline::kernel::{dispatch, Document};
use zoutline::models::OutlineTree;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        eprintln!("Expected 1 argument");
        return ExitCode::FAILURE;
    }

    let settings = load_settings().unwrap_or_default();
    let _logging = logging::init(&settings);
    if let Err(e) = ensure_settings_file() {
        tracing::error!(error = %e, "ensure_settings_file failed");
    }

    let store = JsonFileStore::new(&args[1]).with_settings(&settings.snapshot);
    let mut doc = match Document::open(store) {
        Ok(doc) => doc,
        Err(e) => return fatal(&e),
    };

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::error!(error = %e, "read stdin failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let Some(command) = Command::parse(&line) else {
            let _ = writeln!(stdout, "unknown command: {}", line.trim());
            continue;
        };

        let result = match dispatch(&mut doc, &command) {
            Ok(result) => result,
            // 内存状态已与磁盘不一致，直接退出
            Err(e) => return fatal(&e),
        };
        if result.quit {
            break;
        }

        let written = if command == Command::Show {
            print_outline(&mut stdout, doc.tree())
        } else if result.focus.is_none() && (command.is_edit_command() || command.is_focus_command())
        {
            writeln!(stdout, "unavailable: {}", command.name())
        } else {
            Ok(())
        };
        if written.is_err() {
            break;
        }
    }

    ExitCode::SUCCESS
}

fn fatal(e: &dyn std::error::Error) -> ExitCode {
    tracing::error!(error = %e, "fatal");
    eprintln!("{}", e);
    ExitCode::FAILURE
}

fn print_outline(out: &mut impl Write, tree: &OutlineTree) -> io::Result<()> {
    for row in tree.outline_rows() {
        let marker = if row.is_focused { '>' } else { ' ' };
        let indent = "  ".repeat(row.depth as usize);
        if row.is_collapsed {
            writeln!(out, "{}{}{} [+{}]", marker, indent, row.text, row.child_count)?;
        } else {
            writeln!(out, "{}{}{}", marker, indent, row.text)?;
        }
    }
    out.flush()
}
