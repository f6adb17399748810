//! Notarium command-line client
//!
//! Exercise a running note service from the terminal.
//!
//! Usage:
//!   cargo run --bin notarium-cli -- recent
//!   cargo run --bin notarium-cli -- file 3 --order latest-first
//!   cargo run --bin notarium-cli -- children 12
//!   cargo run --bin notarium-cli -- create 3 "Note title" "optional description"
//!   cargo run --bin notarium-cli -- pin 12 0
//!   cargo run --bin notarium-cli -- reparent 12 7
//!   cargo run --bin notarium-cli -- delete 12
//!   cargo run --bin notarium-cli -- files

use std::env;
use std::sync::Arc;

use notarium_client::{HttpBackend, ScopeView};
use notarium_core::{EventBus, FileStore, OrderMode, Scope};

#[derive(Debug)]
enum Command {
    Recent,
    File { file_id: i64 },
    Children { parent_id: i64 },
    Create { file_id: i64, title: String, description: String },
    Pin { note_id: i64, position: usize },
    Reparent { note_id: i64, new_parent_id: Option<i64> },
    Delete { note_id: i64 },
    Files,
}

#[derive(Debug)]
struct Args {
    command: Command,
    order: Option<OrderMode>,
}

fn print_help() {
    eprintln!("notarium-cli: talk to a note service");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  recent                       list today's quick notes");
    eprintln!("  file <id>                    list a file's top-level notes");
    eprintln!("  children <id>                list a note's children");
    eprintln!("  create <file-id> <title> [description]");
    eprintln!("  pin <note-id> <position>     pin within the note's scope");
    eprintln!("  reparent <note-id> <parent-id|none>");
    eprintln!("  delete <note-id>");
    eprintln!("  files                        list neural files");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --order latest-first|latest-last   display order for lists");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  NOTARIUM_BASE_URL, NOTARIUM_API_TOKEN, NOTARIUM_TIMEOUT_SECS");
}

fn parse_args() -> Option<Args> {
    let args: Vec<String> = env::args().collect();
    let mut positional: Vec<String> = Vec::new();
    let mut order = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--order" => {
                i += 1;
                if i < args.len() {
                    order = match args[i].as_str() {
                        "latest-first" => Some(OrderMode::LatestFirst),
                        "latest-last" => Some(OrderMode::LatestLast),
                        other => {
                            eprintln!("Unknown order: {}. Using backend order.", other);
                            None
                        }
                    };
                }
            }
            "--help" | "-h" => {
                print_help();
                return None;
            }
            other => positional.push(other.to_string()),
        }
        i += 1;
    }

    let command = match positional.first().map(String::as_str) {
        Some("recent") => Command::Recent,
        Some("file") => Command::File {
            file_id: positional.get(1)?.parse().ok()?,
        },
        Some("children") => Command::Children {
            parent_id: positional.get(1)?.parse().ok()?,
        },
        Some("create") => Command::Create {
            file_id: positional.get(1)?.parse().ok()?,
            title: positional.get(2)?.clone(),
            description: positional.get(3).cloned().unwrap_or_default(),
        },
        Some("pin") => Command::Pin {
            note_id: positional.get(1)?.parse().ok()?,
            position: positional.get(2)?.parse().ok()?,
        },
        Some("reparent") => Command::Reparent {
            note_id: positional.get(1)?.parse().ok()?,
            new_parent_id: match positional.get(2)?.as_str() {
                "none" => None,
                raw => Some(raw.parse().ok()?),
            },
        },
        Some("delete") => Command::Delete {
            note_id: positional.get(1)?.parse().ok()?,
        },
        Some("files") => Command::Files,
        _ => {
            print_help();
            return None;
        }
    };

    Some(Args { command, order })
}

fn print_notes(view: &ScopeView) {
    if view.display().is_empty() {
        println!("(no notes)");
        return;
    }
    for note in view.display() {
        let pin = if note.is_pinned { "* " } else { "" };
        let children = note
            .parent_id
            .map(|p| format!("  (child of {})", p))
            .unwrap_or_default();
        println!("{:>6}  {}{}{}", note.id, pin, note.title, children);
        if !note.description.is_empty() {
            println!("        {}", note.description);
        }
    }
}

async fn list_scope(backend: Arc<HttpBackend>, scope: Scope, order: Option<OrderMode>) -> anyhow::Result<()> {
    let bus = Arc::new(EventBus::default());
    let mut view = ScopeView::new(backend, bus, scope);
    view.set_order(order);
    view.reload().await?;
    print_notes(&view);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "notarium_client=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let Some(args) = parse_args() else {
        return Ok(());
    };

    let backend = Arc::new(HttpBackend::from_env());

    match args.command {
        Command::Recent => list_scope(backend, Scope::Recent, args.order).await?,
        Command::File { file_id } => list_scope(backend, Scope::File(file_id), args.order).await?,
        Command::Children { parent_id } => {
            list_scope(backend, Scope::Children(parent_id), args.order).await?
        }
        Command::Create { file_id, title, description } => {
            let bus = Arc::new(EventBus::default());
            let mut view = ScopeView::new(backend, bus, Scope::File(file_id));
            view.reload().await?;
            let note = view.create(&title, &description).await?;
            println!("created note {}", note.id);
        }
        Command::Pin { note_id, position } => {
            let bus = Arc::new(EventBus::default());
            let scope = scope_of_note(&backend, note_id).await?;
            let mut view = ScopeView::new(backend, bus, scope);
            view.reload().await?;
            view.pin(note_id, position).await?;
            println!("pinned note {} at position {}", note_id, position);
            print_notes(&view);
        }
        Command::Reparent { note_id, new_parent_id } => {
            let bus = Arc::new(EventBus::default());
            let scope = scope_of_note(&backend, note_id).await?;
            let mut view = ScopeView::new(backend, bus, scope);
            view.reload().await?;
            view.reparent(note_id, new_parent_id).await?;
            match new_parent_id {
                Some(p) => println!("moved note {} under {}", note_id, p),
                None => println!("moved note {} to top level", note_id),
            }
        }
        Command::Delete { note_id } => {
            let bus = Arc::new(EventBus::default());
            let scope = scope_of_note(&backend, note_id).await?;
            let mut view = ScopeView::new(backend, bus, scope);
            view.reload().await?;
            view.delete_one(note_id).await?;
            println!("deleted note {}", note_id);
        }
        Command::Files => {
            let files = backend.list_files().await?;
            for file in files {
                let order = file
                    .note_order
                    .map(|o| o.to_string())
                    .unwrap_or_else(|| "unset".to_string());
                println!("{:>6}  {}  [order: {}]", file.id, file.name, order);
            }
        }
    }

    Ok(())
}

/// Resolve which scope a note lives in, for view construction.
async fn scope_of_note(backend: &HttpBackend, note_id: i64) -> anyhow::Result<Scope> {
    use notarium_core::NoteStore;
    let note = backend.fetch(note_id).await?;
    Ok(match (note.parent_id, note.file_id) {
        (Some(parent_id), _) => Scope::Children(parent_id),
        (None, Some(file_id)) => Scope::File(file_id),
        (None, None) => Scope::Recent,
    })
}
