//! Demo host CLI.
//!
//! Starts two contributors, renders their rows, columns and item pane section
//! for a sample item, then shuts everything down.
//!
//! # Usage
//!
//! ```bash
//! TRELLIS_CONFIG=host.json TRELLIS_LOG=trellis_registry=debug item-pane-demo
//! ```

use std::sync::Arc;

use example::{NoteStore, Paper, ReadingNotesPlugin, RowListView, WordCountPlugin};
use trellis_core::{Host, HostConfig, Registries, TracingSetup};
use trellis_item_pane::{DataChange, ToggleEvent};
use trellis_item_tree::MAIN_TREE;
use trellis_registry::Item;

type DemoResult = Result<(), Box<dyn std::error::Error>>;

fn load_config() -> Result<HostConfig, Box<dyn std::error::Error>> {
    let mut config = match std::env::var("TRELLIS_CONFIG") {
        Ok(path) => HostConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        Err(_) => HostConfig::default(),
    };
    if let Ok(filter) = std::env::var("TRELLIS_LOG") {
        config = config.with_log_filter(filter);
    }
    Ok(config)
}

async fn run(config: &HostConfig) -> DemoResult {
    let mut host = Host::new(Registries::from_config(config));
    host.add_contributor(WordCountPlugin)?;
    host.add_contributor(ReadingNotesPlugin::new(NoteStore::default()))?;
    host.start().await?;

    let registries = host.registries().clone();
    let paper: Arc<dyn Item> = Arc::new(
        Paper::new(7)
            .with_field("title", "Attention Is All You Need")
            .with_field("abstractNote", "The dominant sequence transduction models are based on recurrent networks"),
    );

    // item box
    let view = Arc::new(RowListView::new(registries.item_box().clone(), Arc::clone(&paper)));
    registries.item_box().registry().notifier().attach(&view);
    registries
        .item_box()
        .set_custom_row_data(paper.as_ref(), "reader-readingNote", "skim section three again");
    registries.item_box().registry().refresh().await;
    for line in view.lines() {
        tracing::info!(%line, "item box");
    }

    // item tree
    for column in registries.item_tree().get_custom_columns(Some(&[MAIN_TREE]), None) {
        let data = registries.item_tree().get_custom_cell_data(paper.as_ref(), &column.data_key);
        let cell = registries
            .item_tree()
            .render_custom_cell(&column.data_key, 0, &data, false)
            .unwrap_or(data);
        tracing::info!(column = %column.data_key, %cell, "item tree");
    }

    // item pane
    for section in registries.item_pane().get_custom_sections(None) {
        let Some(mut controller) = registries.item_pane().create_section(&section.pane_id) else {
            continue;
        };
        controller.data_change(DataChange::Item(Some(paper.id())))?;
        controller.init()?;
        controller.toggle(ToggleEvent { open: true }).await?;
        tracing::info!(
            pane = controller.pane_id(),
            args = ?controller.context().l10n_args(),
            "item pane section rendered"
        );
        controller.click_button("clear")?;
        controller.destroy()?;
    }

    host.shutdown_all().await;
    registries.item_box().registry().notifier().settled().await;
    tracing::info!(rows = view.lines().len(), "host stopped");
    Ok(())
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let config = load_config().unwrap_or_else(|e| {
        eprintln!("Error: cannot load configuration: {e}");
        std::process::exit(1);
    });
    match TracingSetup::from_config(&config.log) {
        Ok(setup) => {
            setup.init();
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }

    if let Err(e) = run(&config).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
