//! Interactive terminal front-end for the Notiva widget.
//!
//! # Responsibility
//! - Drive the interaction controller from stdin commands.
//! - Answer confirmations and show acknowledgements on the terminal.
//! - Flush debounced saves between commands and on exit.

mod command;

use command::{parse, Command, HELP};
use log::{error, info};
use notiva_core::{
    init_logging, InteractionController, KeyValueStore, NoteRef, NotivaConfig, Partition,
    PersistenceAdapter, Prompt, SqliteKeyValueStore,
};
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::time::Instant;

struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn confirm(&mut self, message: &str) -> bool {
        print!("{message} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }

    fn acknowledge(&mut self, message: &str) {
        println!("! {message}");
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("notiva: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = NotivaConfig::from_env()?;
    let log_dir = config.log_dir.to_string_lossy().into_owned();
    if let Err(err) = init_logging(&config.log_level, &log_dir) {
        eprintln!("notiva: logging disabled: {err}");
    }

    println!(
        "notiva {} (core ping={}) db={}",
        notiva_core::core_version(),
        notiva_core::ping(),
        config.db_path.display()
    );

    let kv = SqliteKeyValueStore::open(&config.db_path)?;
    let mut controller = InteractionController::with_persistence(PersistenceAdapter::with_debounce(
        kv,
        config.save_debounce,
    ));
    if controller.start() {
        println!("restored saved notes");
    }
    print_cards(&controller);

    let mut prompt = TerminalPrompt;
    let stdin = io::stdin();
    loop {
        controller.flush_pending_save(Instant::now());
        print!("{}> ", prompt_label(&controller));
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match parse(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => dispatch(&mut controller, &mut prompt, command),
            Err(message) => println!("{message}"),
        }
    }

    if controller.persistence().has_pending_save() {
        // Exit must not drop a write still inside its debounce window.
        if !controller.flush_pending_save(Instant::now() + config.save_debounce) {
            error!("event=cli_exit module=cli status=error error_code=final_save_skipped");
        }
    }
    info!("event=cli_exit module=cli status=ok");
    Ok(())
}

fn dispatch<S: KeyValueStore>(
    controller: &mut InteractionController<S>,
    prompt: &mut TerminalPrompt,
    command: Command,
) {
    match command {
        Command::New => controller.open_new_note(),
        Command::Title(title) => report(controller.set_editor_title(title)),
        Command::Content(content) => report(controller.set_editor_content(content)),
        Command::Save => {
            controller.save_editor(prompt);
        }
        Command::Cancel => controller.close_editor(),
        Command::Edit(index) => match card_ref(controller, index) {
            Some(note_ref) => {
                report(controller.open_edit(note_ref));
                print_editor(controller);
            }
            None => println!("no card {}", index + 1),
        },
        Command::Delete(index) => {
            if let Some(note_ref) = card_ref(controller, index) {
                controller.trash(note_ref, prompt);
            }
        }
        Command::Restore(index) => {
            if let Some(note_ref) = card_ref(controller, index) {
                controller.restore(note_ref);
            }
        }
        Command::Purge(index) => {
            if let Some(note_ref) = card_ref(controller, index) {
                controller.delete_permanently(note_ref, prompt);
            }
        }
        Command::View(view) => controller.switch_view(view),
        Command::Search(text) => controller.set_search(text),
        Command::Undo => {
            controller.undo(prompt);
        }
        Command::Redo => {
            controller.redo(prompt);
        }
        Command::Key(chord) => {
            if !controller.handle_key(&chord, prompt) {
                println!("no binding");
            }
        }
        Command::Sync => {
            controller.sync(prompt);
        }
        Command::List => {}
        Command::Menu => {
            controller.toggle_sidebar();
            print_menu(controller);
            return;
        }
        Command::Help => {
            println!("{HELP}");
            return;
        }
        Command::Quit => return,
    }

    if controller.editor().is_open() {
        print_editor(controller);
    } else {
        print_cards(controller);
    }
}

fn card_ref<S: KeyValueStore>(
    controller: &InteractionController<S>,
    index: usize,
) -> Option<NoteRef> {
    controller.cards().get(index).map(|card| card.note_ref)
}

fn report<E: Error>(result: Result<(), E>) {
    if let Err(err) = result {
        println!("{err}");
    }
}

fn prompt_label<S: KeyValueStore>(controller: &InteractionController<S>) -> String {
    if controller.editor().is_open() {
        return "editor".to_string();
    }
    let query = controller.query().raw().trim();
    if query.is_empty() {
        controller.view().label().to_ascii_lowercase()
    } else {
        format!("{} /{query}", controller.view().label().to_ascii_lowercase())
    }
}

fn print_menu<S: KeyValueStore>(controller: &InteractionController<S>) {
    if !controller.is_sidebar_expanded() {
        println!("[sidebar collapsed]");
        return;
    }
    for item in controller.menu_items() {
        let marker = if item.active { '*' } else { ' ' };
        println!("{marker} {}", item.label);
    }
}

fn print_editor<S: KeyValueStore>(controller: &InteractionController<S>) {
    let editor = controller.editor();
    if !editor.is_open() {
        return;
    }
    let lock = if editor.title_locked() { " (locked)" } else { "" };
    println!("title{lock}: {}", editor.title());
    println!("content: {}", editor.content());
}

fn print_cards<S: KeyValueStore>(controller: &InteractionController<S>) {
    let Some(partition) = controller.view().partition() else {
        println!("({} is not available yet)", controller.view().label());
        return;
    };
    let cards = controller.cards();
    if cards.is_empty() {
        let what = match partition {
            Partition::Active => "no notes",
            Partition::Trashed => "trash is empty",
        };
        println!("({what})");
        return;
    }

    for (index, card) in cards.iter().enumerate() {
        // Cards carry escaped markup text; the terminal shows the raw note.
        let Some(entry) = controller.store().get_in(partition, card.note_ref) else {
            continue;
        };
        let actions = card
            .actions
            .iter()
            .map(|action| action.label())
            .collect::<Vec<_>>()
            .join("  ");
        println!("{:>3}. {}", index + 1, entry.note.title());
        for line in entry.note.content.lines() {
            println!("     {line}");
        }
        println!("     [{actions}]");
    }
}
