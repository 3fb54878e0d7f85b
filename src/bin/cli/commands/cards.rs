use anyhow::{Context, Result};

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat) -> Result<()> {
    let store = app.open_store()?;
    let payload = store.get_cards().context("Failed to read cards")?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        OutputFormat::Plain => {
            for chapter in payload.chapters.chapters() {
                for section in payload.chapters.sections(chapter) {
                    println!("Chapter {} / Section {}", chapter, section);
                    for card in payload
                        .cards
                        .iter()
                        .filter(|c| c.chapter == chapter && c.section == section)
                    {
                        println!("  Q: {}", card.front);
                        println!("  A: {}", card.back);
                        println!();
                    }
                }
            }
            println!("{} card(s), edit at {}", payload.cards.len(), payload.url);
        }
    }

    Ok(())
}
