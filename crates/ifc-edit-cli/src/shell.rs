// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interactive session
//!
//! The shell owns the prompting; the engine never loops. Selection feeds
//! one [`ResolverEvent`] per answer into a `SelectionResolver` until it
//! reports a final state.

use crate::commands;
use crate::render::{numbered, selection_line, summaries};
use anyhow::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use ifc_edit_engine::{Editor, ExportKind, ExportMode, ResolverEvent, ResolverState};
use ifc_edit_model::{EntityId, EntityResolver, ModelStore};
use owo_colors::OwoColorize;
use std::path::Path;

const HELP: &str = "
Available commands:
  help       - Display this help message
  select     - Select elements by ID or type
  view       - Display basic information about the selected elements
  properties - Display properties of the selected elements
  layers     - List the layers of the selected elements
  update     - Update a property of the selected elements
  add        - Add a custom property to the selected elements
  save       - Save changes to the IFC file
  count      - Count elements of a specific type
  list       - List all element types in the IFC file
  export     - Export properties or layers of the selected elements to CSV
  quit       - Exit the program
";

const PROMPT: &str =
    "Enter command (help/select/view/properties/layers/update/add/save/count/list/export/quit)";

const NOTHING_SELECTED: &str = "No elements selected. Use 'select' command first.";

/// A top-level shell command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShellCommand {
    Help,
    Select,
    View,
    Properties,
    Layers,
    Update,
    Add,
    Save,
    Count,
    List,
    Export,
    Quit,
}

impl ShellCommand {
    pub fn parse(input: &str) -> Option<Self> {
        let command = match input.trim().to_ascii_lowercase().as_str() {
            "help" | "?" => ShellCommand::Help,
            "select" => ShellCommand::Select,
            "view" => ShellCommand::View,
            "properties" | "props" => ShellCommand::Properties,
            "layers" => ShellCommand::Layers,
            "update" => ShellCommand::Update,
            "add" => ShellCommand::Add,
            "save" => ShellCommand::Save,
            "count" => ShellCommand::Count,
            "list" => ShellCommand::List,
            "export" => ShellCommand::Export,
            "quit" | "exit" => ShellCommand::Quit,
            _ => return None,
        };
        Some(command)
    }

    /// Requires a non-empty selection
    fn needs_selection(self) -> bool {
        matches!(
            self,
            ShellCommand::View
                | ShellCommand::Properties
                | ShellCommand::Layers
                | ShellCommand::Update
                | ShellCommand::Add
                | ShellCommand::Export
        )
    }
}

enum Flow {
    Continue,
    Quit,
}

/// Translate an answer at the identifier prompt; `None` asks for the type listing
fn token_event(input: &str) -> Option<ResolverEvent> {
    match input.trim().to_ascii_lowercase().as_str() {
        "list" => None,
        "quit" | "back" => Some(ResolverEvent::Abort),
        _ => Some(ResolverEvent::Token(input.trim().to_string())),
    }
}

/// Translate an answer at the instance prompt
fn pick_event(input: &str) -> ResolverEvent {
    match input.trim().to_ascii_lowercase().as_str() {
        "back" | "quit" => ResolverEvent::Abort,
        "done" => ResolverEvent::Done,
        _ => ResolverEvent::Pick(input.trim().to_string()),
    }
}

/// Numbered instances with their names, as offered for picking
fn instance_lines<S: EntityResolver + ?Sized>(store: &S, instances: &[EntityId]) -> String {
    let labels: Vec<String> = instances
        .iter()
        .map(|&id| {
            let name = store
                .get(id)
                .and_then(|entity| entity.name().map(str::to_string))
                .unwrap_or_default();
            format!("ID {}, Name: {}", id.0, name)
        })
        .collect();
    numbered(&labels)
}

/// Run the shell until the user quits
pub fn run<S: ModelStore>(editor: &mut Editor<S>, out_dir: &Path) -> Result<()> {
    let theme = ColorfulTheme::default();
    println!("{} {}", "Using IFC file:".bright_cyan(), editor.path().display());
    println!("Type 'help' for a list of commands.");

    loop {
        let input: String = Input::with_theme(&theme)
            .with_prompt(PROMPT)
            .interact_text()?;

        let Some(command) = ShellCommand::parse(&input) else {
            println!("{}", "Invalid command. Please try again.".red());
            continue;
        };
        if command.needs_selection() && editor.selection().is_empty() {
            println!("{}", NOTHING_SELECTED.yellow());
            continue;
        }

        match dispatch(editor, command, &theme, out_dir)? {
            Flow::Continue => {}
            Flow::Quit => return Ok(()),
        }
    }
}

fn dispatch<S: ModelStore>(
    editor: &mut Editor<S>,
    command: ShellCommand,
    theme: &ColorfulTheme,
    out_dir: &Path,
) -> Result<Flow> {
    match command {
        ShellCommand::Help => print!("{}", HELP),
        ShellCommand::Select => select(editor, theme)?,
        ShellCommand::View => print!("{}", summaries(&editor.view())),
        ShellCommand::Properties => print!("{}", commands::show(editor)),
        ShellCommand::Layers => layers(editor, theme, out_dir)?,
        ShellCommand::Update => update(editor, theme)?,
        ShellCommand::Add => add(editor, theme)?,
        ShellCommand::Save => {
            let confirmed = Confirm::with_theme(theme)
                .with_prompt(
                    "Are you sure you want to save changes? This will overwrite the existing file.",
                )
                .default(false)
                .interact()?;
            if confirmed {
                save(editor);
            } else {
                println!("Save operation cancelled.");
            }
        }
        ShellCommand::Count => {
            print!("Available element types:\n{}", numbered(&editor.list_types()));
            let query: String = Input::with_theme(theme)
                .with_prompt("Enter the number or name of the type to count (partial matches)")
                .interact_text()?;
            match commands::count(editor, &query) {
                Ok(out) => print!("{}", out),
                Err(err) => println!("{}", err.to_string().red()),
            }
        }
        ShellCommand::List => print!("{}", commands::list(editor)),
        ShellCommand::Export => export(editor, theme, None, out_dir)?,
        ShellCommand::Quit => {
            let prompt = if editor.is_dirty() {
                "You have unsaved changes. Are you sure you want to quit?"
            } else {
                "Are you sure you want to quit?"
            };
            if Confirm::with_theme(theme)
                .with_prompt(prompt)
                .default(false)
                .interact()?
            {
                return Ok(Flow::Quit);
            }
        }
    }
    Ok(Flow::Continue)
}

fn select<S: ModelStore>(editor: &mut Editor<S>, theme: &ColorfulTheme) -> Result<()> {
    let mut resolver = editor.resolver();
    let mut asked_multi = false;

    while !resolver.is_finished() {
        let event = match resolver.state().clone() {
            ResolverState::AwaitToken => {
                let input: String = Input::with_theme(theme)
                    .with_prompt("Enter element type, ID, 'list' to see all types, or 'quit'")
                    .interact_text()?;
                match token_event(&input) {
                    Some(event) => event,
                    None => {
                        print!(
                            "All element types in the IFC file:\n{}",
                            numbered(&editor.list_types())
                        );
                        continue;
                    }
                }
            }
            ResolverState::Disambiguate { types } => {
                let choice = Select::with_theme(theme)
                    .with_prompt("Multiple element types found. Choose one")
                    .items(types.as_slice())
                    .default(0)
                    .interact_opt()?;
                match choice {
                    Some(index) => ResolverEvent::Choose(index + 1),
                    None => ResolverEvent::Abort,
                }
            }
            ResolverState::Confirm { type_name } => {
                let yes = Confirm::with_theme(theme)
                    .with_prompt(format!("Did you mean {}?", type_name))
                    .default(true)
                    .interact()?;
                ResolverEvent::Confirm(yes)
            }
            ResolverState::PickInstances {
                type_name,
                instances,
                multi,
                picked,
            } => {
                if !asked_multi {
                    asked_multi = true;
                    print!(
                        "{} elements:\n{}",
                        type_name,
                        instance_lines(editor.store(), &instances)
                    );
                    if instances.len() > 1
                        && Confirm::with_theme(theme)
                            .with_prompt(format!(
                                "Do you want to select multiple {} elements?",
                                type_name
                            ))
                            .default(false)
                            .interact()?
                    {
                        resolver.handle(editor.store(), ResolverEvent::MultiSelect(true))?;
                        continue;
                    }
                }
                let prompt = if multi {
                    format!(
                        "Enter number, ID or name ({} picked, 'done' to finish, 'back' to cancel)",
                        picked.len()
                    )
                } else {
                    "Enter number, ID or name of the element ('back' to cancel)".to_string()
                };
                let input: String = Input::with_theme(theme)
                    .with_prompt(prompt)
                    .interact_text()?;
                pick_event(&input)
            }
            ResolverState::Resolved(_) | ResolverState::Aborted => break,
        };

        if let Err(err) = resolver.handle(editor.store(), event) {
            println!("{}", err.to_string().red());
        }
    }

    if editor.apply(&resolver) {
        println!("{}", "Selected elements:".bright_green());
        for summary in editor.view() {
            println!("{}", selection_line(&summary));
        }
    } else {
        println!("No elements selected.");
    }
    Ok(())
}

fn layers<S: ModelStore>(
    editor: &Editor<S>,
    theme: &ColorfulTheme,
    out_dir: &Path,
) -> Result<()> {
    print!("{}", commands::layers(editor));
    let layered: Vec<EntityId> = editor
        .layer_listing()
        .into_iter()
        .map(|(summary, _)| summary.id)
        .collect();
    if layered.is_empty() {
        return Ok(());
    }

    loop {
        let input: String = Input::with_theme(theme)
            .with_prompt("Enter a layer number to see its properties, 'export', or 'back'")
            .interact_text()?;
        let input = input.trim().to_ascii_lowercase();
        match input.as_str() {
            "back" | "quit" => return Ok(()),
            "export" => return export(editor, theme, Some(ExportKind::Layers), out_dir),
            other => match other.parse::<usize>() {
                Ok(number) => {
                    for &id in &layered {
                        match commands::layer_detail(editor, id, number) {
                            Ok(out) => print!("{}", out),
                            Err(err) => println!("{}", err.to_string().red()),
                        }
                    }
                }
                Err(_) => println!("{}", "Invalid action. Please try again.".red()),
            },
        }
    }
}

fn update<S: ModelStore>(editor: &mut Editor<S>, theme: &ColorfulTheme) -> Result<()> {
    loop {
        let property: String = Input::with_theme(theme)
            .with_prompt("Enter property name (or 'list' to see properties, 'back' to return)")
            .interact_text()?;
        let property = property.trim().to_string();
        match property.to_ascii_lowercase().as_str() {
            "back" => return Ok(()),
            "list" => {
                print!("{}", commands::show(editor));
                continue;
            }
            _ => {}
        }

        let value: String = Input::with_theme(theme)
            .with_prompt("Enter new value")
            .allow_empty(true)
            .interact_text()?;
        let report = match editor.update(&property, &value) {
            Ok(report) => report,
            Err(err) => {
                println!("{}", err.to_string().red());
                continue;
            }
        };
        print!("{}", commands::update_summary(&property, &value, &report));
        if report.succeeded() {
            offer_save(editor, theme)?;
        }
    }
}

fn add<S: ModelStore>(editor: &mut Editor<S>, theme: &ColorfulTheme) -> Result<()> {
    let name: String = Input::with_theme(theme)
        .with_prompt("Enter the name of the new property")
        .interact_text()?;
    let value: String = Input::with_theme(theme)
        .with_prompt("Enter its value")
        .allow_empty(true)
        .interact_text()?;

    match editor.create_property(name.trim(), &value) {
        Ok(created) => {
            println!(
                "Added {} = {} to {} element(s)",
                name.trim(),
                value,
                created.len()
            );
            offer_save(editor, theme)?;
        }
        Err(err) => println!("{}", err.to_string().red()),
    }
    Ok(())
}

fn export<S: ModelStore>(
    editor: &Editor<S>,
    theme: &ColorfulTheme,
    kind: Option<ExportKind>,
    out_dir: &Path,
) -> Result<()> {
    let kind = match kind {
        Some(kind) => kind,
        None => {
            let choice = Select::with_theme(theme)
                .with_prompt("Export")
                .items(&["Properties", "Layers", "Both"])
                .default(2)
                .interact()?;
            [ExportKind::Properties, ExportKind::Layers, ExportKind::Both][choice]
        }
    };
    let choice = Select::with_theme(theme)
        .with_prompt("Export")
        .items(&["Separately for each element", "Collectively"])
        .default(1)
        .interact()?;
    let mode = [ExportMode::Separate, ExportMode::Collective][choice];

    match commands::export(editor, mode, kind, out_dir) {
        Ok(out) => print!("{}", out),
        Err(err) => println!("{}", format!("{:#}", err).red()),
    }
    Ok(())
}

fn offer_save<S: ModelStore>(editor: &mut Editor<S>, theme: &ColorfulTheme) -> Result<()> {
    if Confirm::with_theme(theme)
        .with_prompt("Do you want to save changes now?")
        .default(false)
        .interact()?
    {
        save(editor);
    }
    Ok(())
}

fn save<S: ModelStore>(editor: &mut Editor<S>) {
    match editor.save() {
        Ok(report) => {
            log::debug!("Backup kept at {}", report.backup.display());
            println!("{}", "Changes saved successfully.".bright_green());
        }
        Err(err) => println!("{} {}", "Failed to save changes:".red(), err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_edit_parser::StepDocument;

    const TEST_IFC: &str = r#"ISO-10303-21;
HEADER;
FILE_SCHEMA(('IFC4'));
ENDSEC;
DATA;
#1=IFCWALL('0Wall00000000000000001',$,'North',$,$,$,$,$,$);
#2=IFCWALL('0Wall00000000000000002',$,$,$,$,$,$,$,$);
ENDSEC;
END-ISO-10303-21;
"#;

    #[test]
    fn test_parse_commands() {
        assert_eq!(ShellCommand::parse(" Select "), Some(ShellCommand::Select));
        assert_eq!(ShellCommand::parse("EXIT"), Some(ShellCommand::Quit));
        assert_eq!(ShellCommand::parse("props"), Some(ShellCommand::Properties));
        assert_eq!(ShellCommand::parse("delete"), None);
        assert!(ShellCommand::Export.needs_selection());
        assert!(!ShellCommand::Count.needs_selection());
    }

    #[test]
    fn test_prompt_answers() {
        assert_eq!(token_event("list"), None);
        assert_eq!(token_event("Quit"), Some(ResolverEvent::Abort));
        assert_eq!(
            token_event(" wall "),
            Some(ResolverEvent::Token("wall".into()))
        );
        assert_eq!(pick_event("DONE"), ResolverEvent::Done);
        assert_eq!(pick_event("back"), ResolverEvent::Abort);
        assert_eq!(pick_event("2"), ResolverEvent::Pick("2".into()));
    }

    #[test]
    fn test_instance_lines() {
        let doc = StepDocument::parse(TEST_IFC).unwrap();
        assert_eq!(
            instance_lines(&doc, &[EntityId(1), EntityId(2)]),
            "  1. ID 1, Name: North\n  2. ID 2, Name: \n"
        );
    }
}
