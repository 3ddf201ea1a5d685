//! Template catalogue listing.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use tally_core::{TemplateCatalog, TemplateQuestion};

use crate::config::TallyConfig;

#[derive(Args, Debug)]
pub struct TemplatesArgs {
    /// Catalogue file to list instead of the configured one
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: TemplatesArgs, config: &TallyConfig) -> Result<()> {
    let catalog = match &args.catalog {
        Some(path) => TemplateCatalog::load(path)?,
        None => TemplateCatalog::for_config(&config.engine)?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(catalog.templates())?);
        return Ok(());
    }

    if catalog.is_empty() {
        println!("No templates in catalogue.");
        return Ok(());
    }
    println!("{}", render(catalog.templates()));
    Ok(())
}

fn render(templates: &[TemplateQuestion]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Id").fg(Color::Cyan),
        Cell::new("Type").fg(Color::Cyan),
        Cell::new("Scope").fg(Color::Cyan),
        Cell::new("Text").fg(Color::Cyan),
    ]);

    for template in templates {
        let scope = template
            .recipient_scope
            .map_or_else(|| "-".to_string(), |s| s.to_string());
        table.add_row(vec![
            Cell::new(&template.id),
            Cell::new(template.question_type()),
            Cell::new(scope),
            Cell::new(&template.text),
        ]);
    }
    table
}
