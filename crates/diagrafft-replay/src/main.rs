//! Replays a JSON script of tool activations and input events against the
//! editor core and prints the resulting document.
//!
//! Usage: `diagrafft-replay <script.json> [--config config.json]`

use clap::Parser;
use diagrafft_core::{
    ConfigError, Document, Editor, EditorConfig, EditorContext, EditorError, Key, KeyEvent,
    KeyPhase, Modifiers, PointerEvent,
};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "diagrafft-replay")]
#[command(version, about = "Replay scripted editor input and print the resulting document")]
struct Cli {
    /// JSON script of tool activations and input events
    #[arg(value_name = "SCRIPT")]
    script: PathBuf,

    /// Editor configuration file (defaults apply when omitted)
    #[arg(long, short = 'c', value_name = "CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Debug, Error)]
enum ReplayError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid script: {0}")]
    Script(#[source] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Step {step} failed: {source}")]
    Step {
        step: usize,
        #[source]
        source: EditorError,
    },
    #[error("Failed to serialize document: {0}")]
    Output(#[source] serde_json::Error),
}

fn default_phase() -> KeyPhase {
    KeyPhase::Down
}

/// One scripted input.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Step {
    /// Activate a tool by name.
    Activate(String),
    Pointer(PointerEvent),
    Key {
        name: String,
        #[serde(default = "default_phase")]
        phase: KeyPhase,
        #[serde(default)]
        modifiers: Modifiers,
    },
}

#[derive(Debug, Deserialize)]
struct Script {
    /// Starting document; empty when absent.
    #[serde(default)]
    document: Option<Document>,
    steps: Vec<Step>,
}

/// Run a script and return the editor in its final state.
fn replay(script: Script, config: EditorConfig) -> Result<Editor, ReplayError> {
    let mut ctx = EditorContext::new(config);
    if let Some(document) = script.document {
        ctx = ctx.with_document(document);
    }
    let mut editor = Editor::with_context(ctx);

    for (index, step) in script.steps.iter().enumerate() {
        let step_number = index + 1;
        log::debug!("Step {}: {:?}", step_number, step);
        let result = match step {
            Step::Activate(name) => editor.activate_tool(name),
            Step::Pointer(event) => editor.handle_pointer(event).map(|_| ()),
            Step::Key {
                name,
                phase,
                modifiers,
            } => {
                let event = KeyEvent {
                    phase: *phase,
                    key: Key::from_name(name),
                    modifiers: *modifiers,
                };
                editor.handle_key(&event).map(|_| ())
            }
        };
        result.map_err(|source| ReplayError::Step {
            step: step_number,
            source,
        })?;
    }
    Ok(editor)
}

fn read(path: &Path) -> Result<String, ReplayError> {
    fs::read_to_string(path).map_err(|source| ReplayError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn run(cli: Cli) -> Result<(), ReplayError> {
    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };

    let script: Script = serde_json::from_str(&read(&cli.script)?).map_err(ReplayError::Script)?;
    log::info!("Replaying {} steps from {}", script.steps.len(), cli.script.display());
    let editor = replay(script, config)?;

    for message in &editor.context().messages {
        eprintln!("{}", message);
    }
    let json = editor.document().to_json().map_err(ReplayError::Output)?;
    println!("{}", json);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
