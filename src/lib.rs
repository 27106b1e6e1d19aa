pub mod cli;
pub mod edit;
pub mod exchange;
pub mod models;
pub mod review;
pub mod session;
pub mod settings;
pub mod store;
mod utils;

use crate::cli::{Args, Command};
use crate::edit::{add_cards, list_cards, CardEditor};
use crate::exchange::{export_cards, import_cards};
use crate::review::{review, WallClock};
use crate::session::Session;
use crate::settings::Settings;
use crate::store::{CardStore, Preferences};
use crate::utils::plural;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{stdin, stdout, BufReader, Write};
use std::path::PathBuf;
use tracing::{debug, info};

pub fn run(args: Args) -> Result<()> {
    debug!(?args, "Starting flashdeck");
    let path = match args.store {
        Some(path) => path,
        None => default_store_path()?,
    };
    let mut prefs = Preferences::open(&path)
        .with_context(|| format!("Could not open preference file {:?}", path))?;
    debug!(path = ?prefs.path(), "Opened preferences");

    match args.command {
        Command::Add => {
            let mut editor = CardEditor::load(&prefs);
            let added = add_cards(&mut editor, stdin().lock(), stdout().lock())?;
            editor.commit(&mut prefs)?;
            println!("Added {} card{}.", added, plural(added));
        }
        Command::List => list_cards(&prefs.load().unwrap_or_default(), stdout().lock())?,
        Command::Remove { index } => {
            let mut editor = CardEditor::load(&prefs);
            let card = editor.remove(index)?;
            editor.commit(&mut prefs)?;
            println!("Removed {:?}.", card.prompt);
        }
        Command::Import { path } => {
            let file = File::open(&path).with_context(|| format!("Could not open {:?}", path))?;
            let mut editor = CardEditor::load(&prefs);
            let added = import_cards(&mut editor, BufReader::new(file))?;
            editor.commit(&mut prefs)?;
            println!("Imported {} card{} from {:?}.", added, plural(added), path);
        }
        Command::Export { path } => {
            let file =
                File::create(&path).with_context(|| format!("Could not create {:?}", path))?;
            let cards = prefs.load().unwrap_or_default();
            export_cards(&cards, file)?;
            println!("Exported {} card{} to {:?}.", cards.len(), plural(cards.len()), path);
        }
        Command::Settings {
            reuse_incorrect,
            shuffle,
        } => {
            let mut settings = Settings::load(&prefs);
            if let Some(reuse) = reuse_incorrect {
                settings.reuse_incorrect = reuse;
            }
            if let Some(shuffle) = shuffle {
                settings.shuffle = shuffle;
            }
            if reuse_incorrect.is_some() || shuffle.is_some() {
                settings.save(&mut prefs)?;
                info!(?settings, "Saved settings");
            }
            println!("{}", settings);
        }
        Command::Review => {
            let settings = Settings::load(&prefs);
            let mut session = Session::new(prefs);
            session.set_reuse_incorrect(settings.reuse_incorrect);
            session.set_shuffle(settings.shuffle);
            if settings.shuffle {
                session.reset();
            }
            if session.deck().is_empty() {
                println!("No cards to review. Use `flashdeck add` to create some.");
                return Ok(());
            }
            let mut out = stdout().lock();
            let summary = review(&mut session, stdin().lock(), &mut out, &mut WallClock::new())?;
            writeln!(out, "\n{}", summary)?;
        }
    }
    Ok(())
}

pub fn default_store_path() -> Result<PathBuf> {
    let data = dirs::data_dir().context("Could not find data directory")?;
    Ok(data.join("flashdeck").join("preferences.json"))
}
