//! slotedit - drive a structured expression slot from an edit script.
//!
//! # Usage
//!
//! ```bash
//! slotedit -e 'insert a+(b-c)' -e 'backspace'
//! slotedit --dialect type script.txt
//! echo 'insert 1..10' | slotedit --target
//! ```

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use slotedit::config::{
    ConfigFlags, DialectMode, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, parse_flag_tokens, save_config_flags,
};
use slotedit::perf;
use slotedit::script::{Command, Session, parse_line, parse_script};
use slotedit::slot::{Dialect, SlotEditor};

/// Apply an edit script to a structured expression slot
#[derive(Parser, Debug)]
#[command(name = "slotedit", version, about, long_about = None)]
struct Cli {
    /// Script file to run; read from stdin when omitted and no -e is given
    #[arg(value_name = "SCRIPT")]
    script: Option<PathBuf>,

    /// Run a single script line (repeatable, runs after SCRIPT)
    #[arg(short = 'e', long = "exec", value_name = "LINE")]
    exec: Vec<String>,

    /// Grammar of the slot
    #[arg(long, value_enum)]
    dialect: Option<DialectMode>,

    /// Also print the generated Java after each step
    #[arg(long)]
    target: bool,

    /// Print each step as a JSON object
    #[arg(long)]
    json: bool,

    /// Report timing of each step on stderr
    #[arg(long)]
    perf: bool,

    /// Write every edit and its resulting state to a file
    #[arg(long, value_name = "PATH")]
    edit_log: Option<PathBuf>,

    /// Function used for `a..b` in generated Java
    #[arg(long, value_name = "NAME")]
    range_function: Option<String>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

fn load_commands(cli: &Cli) -> Result<Vec<Command>> {
    let mut commands = Vec::new();
    if let Some(path) = &cli.script {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        commands.extend(parse_script(&source)?);
    } else if cli.exec.is_empty() {
        let mut source = String::new();
        std::io::stdin()
            .read_to_string(&mut source)
            .context("Failed to read script from stdin")?;
        commands.extend(parse_script(&source)?);
    }
    for (i, line) in cli.exec.iter().enumerate() {
        commands.extend(parse_line(i + 1, line)?);
    }
    Ok(commands)
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    perf::set_enabled(effective.perf);
    let edit_log_path = effective
        .edit_log
        .clone()
        .or_else(|| std::env::var_os("SLOTEDIT_EDIT_LOG").map(PathBuf::from));
    if let Err(err) = perf::set_journal_path(edit_log_path.as_deref()) {
        tracing::warn!(
            path = %edit_log_path.as_ref().map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            %err,
            "failed to open edit journal"
        );
    }

    let commands = load_commands(&cli)?;
    let dialect = effective.dialect.map_or(Dialect::default(), Dialect::from);
    let mut slot = SlotEditor::new(dialect);
    if let Some(name) = &effective.range_function {
        slot = slot.with_range_function(name.clone());
    }

    let mut session = Session::new(slot);
    for command in &commands {
        let snapshot = session.apply(command);
        if effective.json {
            println!(
                "{}",
                serde_json::to_string(&snapshot).context("Failed to serialize step")?
            );
            continue;
        }
        println!("{:>3}  {}", snapshot.step, snapshot.state);
        if effective.target {
            println!("     {}", snapshot.target);
        }
    }
    Ok(())
}
