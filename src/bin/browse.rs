//! Terminal client for a running atelier server.
//!
//! Restores the persisted tag selection, applies the requested changes in
//! order, saves the result and prints the matching listing.
//!
//! ## Usage
//!
//! ```bash
//! atelier-browse                          # Listing for the saved selection
//! atelier-browse --select 4               # Only tag 4
//! atelier-browse --multi --toggle 2       # Add or remove tag 2
//! atelier-browse --all                    # Back to everything
//! ```

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use atelier::client::{FetchOutcome, GalleryClient};
use atelier::config::Config;
use atelier::db::{GalleryImage, GalleryTag};
use atelier::filter::{FileStorage, FilterStore, Selection, SelectionMode};
use atelier::logging::{self, LogTarget};

enum Action {
    Select(String),
    Toggle(String),
    Reset,
}

struct BrowseArgs {
    config_path: Option<PathBuf>,
    mode: SelectionMode,
    actions: Vec<Action>,
}

impl Default for BrowseArgs {
    fn default() -> Self {
        Self {
            config_path: None,
            mode: SelectionMode::Single,
            actions: Vec::new(),
        }
    }
}

fn main() -> Result<()> {
    let args = parse_args();

    // Logs go to a file so they don't interleave with the listing.
    let _ = logging::init(LogTarget::Directory(Config::config_dir().join("logs")));

    let config = match &args.config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let mut store = FilterStore::new(FileStorage::new(config.client.state_dir.clone()), args.mode);
    store.hydrate();
    for action in &args.actions {
        match action {
            Action::Select(tag) => store.select(tag)?,
            Action::Toggle(tag) => store.toggle(tag)?,
            Action::Reset => store.reset()?,
        }
    }
    info!(selection = ?store.selection(), "selection applied");

    let client = GalleryClient::from_config(&config.client);

    match client.fetch_tags(&store) {
        Some(FetchOutcome::Loaded(tags)) => print_tag_bar(store.selection(), &tags),
        Some(FetchOutcome::Failed(message)) => eprintln!("{}", message),
        Some(FetchOutcome::Cancelled) | None => {}
    }

    match client.fetch_galleries(&store) {
        Some(FetchOutcome::Loaded(galleries)) => print_listing(&galleries),
        Some(FetchOutcome::Failed(message)) => {
            eprintln!("{}", message);
            std::process::exit(1);
        }
        Some(FetchOutcome::Cancelled) | None => {}
    }

    Ok(())
}

fn print_tag_bar(selection: &Selection, tags: &[GalleryTag]) {
    let mut pills = vec![pill("All", selection.is_all())];
    for tag in tags {
        pills.push(pill(&tag.tag_display_name, selection.is_selected(&tag.id.to_string())));
    }
    println!("{}", pills.join("  "));
    println!();
}

fn pill(label: &str, selected: bool) -> String {
    if selected {
        format!("[{}]", label)
    } else {
        format!(" {} ", label)
    }
}

fn print_listing(galleries: &[GalleryImage]) {
    if galleries.is_empty() {
        println!("No images found");
        return;
    }

    for gallery in galleries {
        let tags: Vec<String> = gallery
            .tags
            .iter()
            .map(|t| format!("#{}", t.tag_display_name))
            .collect();
        println!(
            "{:>6}  {:<28}  {:>4} photos  {}  {}",
            gallery.id,
            gallery.profile_name,
            gallery.total_photos,
            gallery.created_at,
            tags.join(" ")
        );
        println!("        {}", gallery.media_url);
    }
}

fn parse_args() -> BrowseArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = BrowseArgs::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("atelier-browse {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--multi" | "-m" => parsed.mode = SelectionMode::Multi,
            "--all" | "--reset" => parsed.actions.push(Action::Reset),
            "--config" | "-c" | "--select" | "-s" | "--toggle" | "-t" => {
                let Some(value) = args.get(i + 1) else {
                    eprintln!("Error: {} requires an argument", args[i]);
                    std::process::exit(1);
                };
                match args[i].as_str() {
                    "--config" | "-c" => parsed.config_path = Some(PathBuf::from(value)),
                    "--select" | "-s" => parsed.actions.push(Action::Select(value.clone())),
                    _ => parsed.actions.push(Action::Toggle(value.clone())),
                }
                i += 1;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    parsed
}

fn print_help() {
    println!(
        r#"atelier-browse - browse a running atelier server from the terminal

USAGE:
    atelier-browse [OPTIONS]

OPTIONS:
    --select, -s TAG    Select only TAG ("all" clears the selection)
    --toggle, -t TAG    Add TAG to the selection, or remove it if present
    --all, --reset      Clear the selection
    --multi, -m         Multi-select mode (several tags, matched with OR)
    --config, -c PATH   Path to config file
    --version, -V       Show version
    --help, -h          Show this help message

Actions apply in the order given and the result is saved for next time.

ENVIRONMENT:
    ATELIER_CONFIG      Path to config file (overrides default location)
    ATELIER_LOG         Log level (trace, debug, info, warn, error)

Logs are written to $XDG_CONFIG_HOME/atelier/logs"#
    );
}
