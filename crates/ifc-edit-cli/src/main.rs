// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `ifc-edit`: inspect, edit and export IFC files

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ifc_edit_engine::{Editor, EngineOptions, ExportKind, ExportMode};
use ifc_edit_parser::StepDocument;
use owo_colors::OwoColorize;
use std::path::PathBuf;

mod commands;
mod render;
mod shell;

#[derive(Parser)]
#[command(name = "ifc-edit")]
#[command(about = "Inspect, edit and export IFC element properties", long_about = None)]
#[command(version)]
struct Cli {
    /// IFC file to open
    file: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suffix appended to the file name for the backup written before saving
    #[arg(long, global = true, default_value = ".bak")]
    backup_suffix: String,

    /// Prefix of the property set that new properties are added to
    #[arg(long, global = true, default_value = "Custom_Properties_")]
    pset_prefix: String,

    /// Accept a single matching type without asking
    #[arg(long, global = true)]
    auto_confirm: bool,

    /// Do not show property sets inherited from type objects
    #[arg(long, global = true)]
    no_type_properties: bool,

    /// Directory export files are written to
    #[arg(short, long, global = true, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// List every element type in the file
    List,

    /// Count elements by list number or type fragment
    Count { query: String },

    /// Show the properties of elements side by side
    Show {
        /// Element IDs or type names
        #[arg(required = true)]
        select: Vec<String>,
    },

    /// Show material layers of elements
    Layers {
        /// Element IDs or type names
        #[arg(required = true)]
        select: Vec<String>,

        /// Show the properties of one layer (1-based) instead of the listing
        #[arg(short, long)]
        layer: Option<usize>,
    },

    /// Set a property on elements and save the file
    Update {
        /// Element IDs or type names
        #[arg(short, long, required = true, num_args = 1..)]
        select: Vec<String>,

        property: String,
        value: String,
    },

    /// Add a property to the custom property set of elements and save the file
    AddProperty {
        /// Element IDs or type names
        #[arg(short, long, required = true, num_args = 1..)]
        select: Vec<String>,

        name: String,
        value: String,
    },

    /// Export properties and layers to CSV
    Export {
        /// Element IDs or type names
        #[arg(short, long, required = true, num_args = 1..)]
        select: Vec<String>,

        #[arg(short, long, value_enum, default_value_t = KindArg::Both)]
        kind: KindArg,

        #[arg(short, long, value_enum, default_value_t = ModeArg::Collective)]
        mode: ModeArg,
    },

    /// Interactive session (default)
    Shell,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum KindArg {
    Properties,
    Layers,
    Both,
}

impl KindArg {
    const fn as_domain(self) -> ExportKind {
        match self {
            KindArg::Properties => ExportKind::Properties,
            KindArg::Layers => ExportKind::Layers,
            KindArg::Both => ExportKind::Both,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    /// One file per element
    Separate,
    /// One file for all elements
    Collective,
}

impl ModeArg {
    const fn as_domain(self) -> ExportMode {
        match self {
            ModeArg::Separate => ExportMode::Separate,
            ModeArg::Collective => ExportMode::Collective,
        }
    }
}

impl Cli {
    fn options(&self) -> EngineOptions {
        EngineOptions::new()
            .with_backup_suffix(self.backup_suffix.clone())
            .with_custom_pset_prefix(self.pset_prefix.clone())
            .with_auto_confirm(self.auto_confirm)
            .with_type_properties(!self.no_type_properties)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let document = StepDocument::open(&cli.file)
        .with_context(|| format!("Failed to open {}", cli.file.display()))?;
    log::info!(
        "Loaded {} with {} entities",
        cli.file.display(),
        ifc_edit_model::EntityResolver::entity_count(&document)
    );
    let mut editor = Editor::new(document, &cli.file, cli.options());

    match cli.command {
        None | Some(Commands::Shell) => shell::run(&mut editor, &cli.out_dir)?,
        Some(Commands::List) => print!("{}", commands::list(&editor)),
        Some(Commands::Count { query }) => print!("{}", commands::count(&editor, &query)?),
        Some(Commands::Show { select }) => {
            let ids = commands::resolve_tokens(&editor, &select)?;
            editor.select(ids);
            print!("{}", render::summaries(&editor.view()));
            println!();
            print!("{}", commands::show(&editor));
        }
        Some(Commands::Layers { select, layer }) => {
            let ids = commands::resolve_tokens(&editor, &select)?;
            match layer {
                Some(number) => {
                    for id in &ids {
                        print!("{}", commands::layer_detail(&editor, *id, number)?);
                    }
                }
                None => {
                    editor.select(ids);
                    print!("{}", commands::layers(&editor));
                }
            }
        }
        Some(Commands::Update {
            select,
            property,
            value,
        }) => {
            let ids = commands::resolve_tokens(&editor, &select)?;
            editor.select(ids);
            let report = editor.update(&property, &value)?;
            print!("{}", commands::update_summary(&property, &value, &report));
            if report.succeeded() {
                save(&mut editor)?;
            }
        }
        Some(Commands::AddProperty {
            select,
            name,
            value,
        }) => {
            let ids = commands::resolve_tokens(&editor, &select)?;
            editor.select(ids);
            let created = editor.create_property(&name, &value)?;
            println!("Added {} = {} to {} element(s)", name, value, created.len());
            save(&mut editor)?;
        }
        Some(Commands::Export { select, kind, mode }) => {
            let ids = commands::resolve_tokens(&editor, &select)?;
            editor.select(ids);
            print!(
                "{}",
                commands::export(&editor, mode.as_domain(), kind.as_domain(), &cli.out_dir)?
            );
        }
    }

    Ok(())
}

fn save(editor: &mut Editor<StepDocument>) -> Result<()> {
    let report = editor.save().context("Save failed")?;
    println!(
        "{} {} (backup at {})",
        "Saved".bright_green(),
        report.canonical.display(),
        report.backup.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_map_to_options() {
        let cli = Cli::parse_from(["ifc-edit", "model.ifc"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.options(), EngineOptions::default());
    }

    #[test]
    fn test_export_args() {
        let cli = Cli::parse_from([
            "ifc-edit",
            "model.ifc",
            "export",
            "--select",
            "wall",
            "42",
            "--mode",
            "separate",
            "--auto-confirm",
        ]);
        assert!(cli.options().auto_confirm_single_type);
        match cli.command {
            Some(Commands::Export { select, kind, mode }) => {
                assert_eq!(select, vec!["wall".to_string(), "42".to_string()]);
                assert_eq!(kind.as_domain(), ExportKind::Both);
                assert_eq!(mode.as_domain(), ExportMode::Separate);
            }
            _ => panic!("expected export"),
        }
    }
}
