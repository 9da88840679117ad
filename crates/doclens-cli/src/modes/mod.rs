//! Interactive session: one command per line until `quit` or EOF.

use std::io::Write;

use anyhow::{Context, Result};
use doclens_core::files::normalize_input_path;
use doclens_core::service::FileService;
use doclens_core::session::{MAX_FILES, Session};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::render;

const PROMPT: &str = "doclens> ";

const HELP: &str = "\
Commands:
  pick <path>...       select PDF documents (up to 3)
  picked               show selected documents
  unpick <slot>        remove a selected document
  upload [path...]     upload the selected documents (and any given paths)
  files                show documents uploaded in this session
  ask <prompt>         ask about every uploaded document
  list                 list all remote files
  delete <id>          delete one remote file
  delete-all           delete every remote file
  help                 show this help
  quit                 end the session
";

/// A parsed line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Pick(Vec<String>),
    Picked,
    Unpick(usize),
    Upload(Vec<String>),
    Files,
    Ask(String),
    List,
    Delete(String),
    DeleteAll,
    Help,
    Quit,
}

impl SessionCommand {
    /// Parses one input line. Blank lines yield `Ok(None)`; errors are user-facing hints.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));

        let command = match word.to_ascii_lowercase().as_str() {
            "pick" => {
                let paths = split_args(rest);
                if paths.is_empty() {
                    return Err("Usage: pick <path>...".to_string());
                }
                SessionCommand::Pick(paths)
            }
            "picked" => SessionCommand::Picked,
            "unpick" => match rest.parse::<usize>() {
                Ok(slot) => SessionCommand::Unpick(slot),
                Err(_) => return Err("Usage: unpick <slot>".to_string()),
            },
            "upload" => SessionCommand::Upload(split_args(rest)),
            "files" => SessionCommand::Files,
            "ask" => SessionCommand::Ask(rest.to_string()),
            "list" => SessionCommand::List,
            "delete" => SessionCommand::Delete(rest.to_string()),
            "delete-all" => SessionCommand::DeleteAll,
            "help" | "?" => SessionCommand::Help,
            "quit" | "exit" => SessionCommand::Quit,
            other => {
                return Err(format!(
                    "Unknown command '{other}'. Type 'help' for a list of commands."
                ));
            }
        };
        Ok(Some(command))
    }
}

/// Splits on unescaped whitespace outside quotes.
///
/// Tokens keep their quotes and escapes; `normalize_input_path` removes them.
fn split_args(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            '"' | '\'' if quote.is_none() => {
                quote = Some(c);
                current.push(c);
            }
            c if Some(c) == quote => {
                quote = None;
                current.push(c);
            }
            c if c.is_whitespace() && quote.is_none() => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        args.push(current);
    }
    args
}

/// Runs the interactive session until `quit` or end of input. The session state is
/// dropped on return.
///
/// # Errors
/// Returns an error only if stdin or stdout fail.
pub async fn run_interactive_session<S: FileService>(mut session: Session<S>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = std::io::stdout();

    println!("Document Upload and Analysis");
    println!(
        "Pick up to {MAX_FILES} PDF documents, upload them, ask questions, and delete the files when needed."
    );
    println!("Type 'help' for commands.");

    loop {
        print!("{PROMPT}");
        stdout.flush().context("flush stdout")?;

        let Some(line) = lines.next_line().await.context("read input")? else {
            println!();
            break;
        };

        match SessionCommand::parse(&line) {
            Ok(None) => {}
            Ok(Some(SessionCommand::Quit)) => break,
            Ok(Some(command)) => execute(&mut session, command).await,
            Err(hint) => println!("{hint}"),
        }
    }

    tracing::info!(
        uploaded = session.remote_files().len(),
        "interactive session ended"
    );
    Ok(())
}

async fn execute<S: FileService>(session: &mut Session<S>, command: SessionCommand) {
    match command {
        SessionCommand::Pick(paths) => pick_all(session, &paths),
        SessionCommand::Picked => print!("{}", render::selected_files(session.selected())),
        SessionCommand::Unpick(slot) => match session.unselect(slot) {
            Some(file) => println!("Removed {}", file.display_name),
            None => println!("No document in slot {slot}."),
        },
        SessionCommand::Upload(paths) => {
            pick_all(session, &paths);
            let report = session.upload().await;
            print!("{}", render::upload_report(&report));
            if !session.remote_files().is_empty() {
                print!("{}", render::uploaded_files(session.remote_files()));
            }
        }
        SessionCommand::Files => print!("{}", render::uploaded_files(session.remote_files())),
        SessionCommand::Ask(prompt) => {
            let report = session.ask(&prompt).await;
            print!("{}", render::ask_report(&report));
        }
        SessionCommand::List => {
            let result = session.list_files().await;
            print!("{}", render::list_result(&result));
        }
        SessionCommand::Delete(id) => {
            let report = session.delete_one(&id).await;
            print!("{}", render::delete_report(&report));
        }
        SessionCommand::DeleteAll => {
            let report = session.delete_all().await;
            print!("{}", render::delete_report(&report));
        }
        SessionCommand::Help => print!("{HELP}"),
        SessionCommand::Quit => {}
    }
}

fn pick_all<S: FileService>(session: &mut Session<S>, paths: &[String]) {
    for raw in paths {
        let path = normalize_input_path(raw);
        match session.select(&path) {
            Ok(file) => {
                let name = file.display_name.clone();
                println!("Selected {name} (slot {})", session.selected().len());
            }
            Err(e) => println!("Error: {e:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_blank_line() {
        assert_eq!(SessionCommand::parse("   "), Ok(None));
    }

    #[test]
    fn test_parse_ask_keeps_prompt_text() {
        assert_eq!(
            SessionCommand::parse("ask  What are the  key dates? "),
            Ok(Some(SessionCommand::Ask("What are the  key dates?".to_string())))
        );
        assert_eq!(
            SessionCommand::parse("ask"),
            Ok(Some(SessionCommand::Ask(String::new())))
        );
    }

    #[test]
    fn test_parse_commands_case_insensitive() {
        assert_eq!(
            SessionCommand::parse("DELETE-ALL"),
            Ok(Some(SessionCommand::DeleteAll))
        );
        assert_eq!(SessionCommand::parse("Exit"), Ok(Some(SessionCommand::Quit)));
    }

    #[test]
    fn test_parse_pick_requires_path() {
        assert!(SessionCommand::parse("pick").is_err());
        assert_eq!(
            SessionCommand::parse("pick a.pdf b.pdf"),
            Ok(Some(SessionCommand::Pick(vec![
                "a.pdf".to_string(),
                "b.pdf".to_string()
            ])))
        );
    }

    #[test]
    fn test_parse_unpick_slot() {
        assert_eq!(
            SessionCommand::parse("unpick 2"),
            Ok(Some(SessionCommand::Unpick(2)))
        );
        assert!(SessionCommand::parse("unpick two").is_err());
    }

    #[test]
    fn test_parse_unknown_command_hints_help() {
        let err = SessionCommand::parse("summon a.pdf").unwrap_err();
        assert!(err.contains("help"));
    }

    #[test]
    fn test_split_args_respects_quotes_and_escapes() {
        assert_eq!(
            split_args(r#""My Report.pdf" other\ file.pdf  'q 3.pdf'"#),
            vec![
                r#""My Report.pdf""#.to_string(),
                r"other\ file.pdf".to_string(),
                "'q 3.pdf'".to_string(),
            ]
        );
        assert!(split_args("   ").is_empty());
    }
}
