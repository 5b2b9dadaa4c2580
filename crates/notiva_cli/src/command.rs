//! REPL command parsing.

use notiva_core::{KeyChord, View};

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    New,
    Title(String),
    Content(String),
    Save,
    Cancel,
    Edit(usize),
    Delete(usize),
    Restore(usize),
    Purge(usize),
    View(View),
    Search(String),
    Undo,
    Redo,
    Key(KeyChord),
    Sync,
    List,
    Menu,
    Help,
    Quit,
}

/// Parses one input line. Card numbers are 1-based as printed by `list`.
pub fn parse(line: &str) -> Result<Command, String> {
    let trimmed = line.trim();
    let (verb, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (trimmed, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "new" => Command::New,
        "title" => Command::Title(rest.to_string()),
        "content" => Command::Content(rest.replace("\\n", "\n")),
        "save" => Command::Save,
        "cancel" | "close" => Command::Cancel,
        "edit" => Command::Edit(card_number(rest)?),
        "delete" | "rm" => Command::Delete(card_number(rest)?),
        "restore" => Command::Restore(card_number(rest)?),
        "purge" => Command::Purge(card_number(rest)?),
        "view" => Command::View(
            View::from_label(rest).ok_or_else(|| format!("unknown view `{rest}`"))?,
        ),
        "search" | "/" => Command::Search(rest.to_string()),
        "undo" => Command::Undo,
        "redo" => Command::Redo,
        "key" => Command::Key(
            KeyChord::parse(rest).ok_or_else(|| format!("unknown key chord `{rest}`"))?,
        ),
        "sync" => Command::Sync,
        "list" | "ls" | "" => Command::List,
        "menu" => Command::Menu,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command `{other}`; try `help`")),
    };
    Ok(command)
}

fn card_number(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(number) if number > 0 => Ok(number - 1),
        _ => Err(format!("expected a card number, got `{raw}`")),
    }
}

pub const HELP: &str = "\
commands:
  new                    open the editor for a new note
  title <text>           set the editor title (new notes only)
  content <text>         set the editor content (\\n for newlines)
  save | cancel          save or discard the editor
  edit <n>               edit card n (notes view)
  delete <n>             move card n to trash
  restore <n>            restore card n (trash view)
  purge <n>              delete card n permanently (trash view)
  view <notes|trash|archive>
  search <text>          filter the visible list (empty clears)
  undo | redo            replay content edits
  key <chord>            send a key chord, e.g. ctrl+z
  sync                   save now
  list | menu | help | quit";
