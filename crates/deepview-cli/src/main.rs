use std::io;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use anyhow::bail;
use anyhow::Context;
use clap::ArgAction;
use clap::Parser;
use clap::Subcommand;
use deepview_core::config::Config;
use deepview_core::content::file_text;
use deepview_core::grounding::compose_message;
use deepview_core::grounding::GroundingSelection;
use deepview_core::todos::group_todos;
use deepview_core::Transcript;
use deepview_core::TranscriptView;
use deepview_workspace::UploadStore;
use deepview_workspace::Workspace;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use render::build_todo_lines;
use render::build_turn_lines;
use render::plain;
use render::RenderOptions;
use render::UiPalette;

mod render;
mod settings;
mod ui;

/// Inspect deep-agent transcripts, the agent workspace and grounding uploads.
#[derive(Parser, Debug)]
#[command(name = "deepview", version, about)]
struct Cli {
    /// Config file (defaults to <config dir>/deepview/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More logging; repeat for trace output
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the correlated turns of a transcript snapshot
    Turns {
        transcript: PathBuf,
        /// Emit render items as JSON
        #[arg(long)]
        json: bool,
    },
    /// Interactive viewer that follows the snapshot file as it changes
    View { transcript: PathBuf },
    /// Print the snapshot's todos grouped by status
    Todos {
        transcript: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// List the snapshot's agent files, or print one of them
    Files {
        transcript: PathBuf,
        path: Option<String>,
    },
    /// Print the message that would be sent for this input
    Compose {
        /// Grounding file; repeatable
        #[arg(long = "ground", value_name = "FILE")]
        ground: Vec<String>,
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// Browse and edit the agent workspace
    Workspace {
        #[command(subcommand)]
        command: WorkspaceCommand,
    },
    /// Store a grounding file in the upload directory
    Upload {
        file: PathBuf,
        #[arg(long, default_value = "")]
        bucket: String,
    },
}

#[derive(Subcommand, Debug)]
enum WorkspaceCommand {
    Ls { path: Option<String> },
    Cat { path: String },
    /// Content comes from --content, or stdin when omitted
    Write {
        path: String,
        #[arg(long)]
        content: Option<String>,
    },
    Rm { path: String },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.command.owns_terminal());
    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

impl Command {
    /// The viewer draws on the alternate screen for as long as it runs.
    fn owns_terminal(&self) -> bool {
        matches!(self, Self::View { .. })
    }
}

fn init_tracing(verbose: u8, owns_terminal: bool) {
    let fallback = match verbose {
        0 => "deepview=info",
        1 => "deepview=debug",
        _ => "deepview=trace",
    };
    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()),
    );
    if owns_terminal {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::sink))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = settings::load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Turns { transcript, json } => print_turns(&transcript, json, &config),
        Command::View { transcript } => ui::run(transcript, &config.view),
        Command::Todos { transcript, json } => print_todos(&transcript, json),
        Command::Files { transcript, path } => print_files(&transcript, path.as_deref()),
        Command::Compose { ground, message } => {
            let grounding: GroundingSelection = ground.into_iter().collect();
            let Some(composed) = compose_message(&message.join(" "), &grounding) else {
                bail!("message is empty");
            };
            println!("{composed}");
            Ok(())
        }
        Command::Workspace { command } => run_workspace(command, &config),
        Command::Upload { file, bucket } => upload(&file, &bucket, &config),
    }
}

fn load_transcript(path: &Path) -> anyhow::Result<Transcript> {
    Transcript::load(path).with_context(|| format!("failed to load transcript {}", path.display()))
}

fn print_turns(path: &Path, json: bool, config: &Config) -> anyhow::Result<()> {
    let view = TranscriptView::build(&load_transcript(path)?);
    if json {
        println!("{}", serde_json::to_string_pretty(&view.items())?);
        return Ok(());
    }
    let options = RenderOptions {
        show_tool_args: config.view.show_tool_args,
    };
    println!(
        "{}",
        plain(&build_turn_lines(&view, options, UiPalette::default()))
    );
    Ok(())
}

fn print_todos(path: &Path, json: bool) -> anyhow::Result<()> {
    let transcript = load_transcript(path)?;
    let groups = group_todos(&transcript.todos);
    if json {
        println!("{}", serde_json::to_string_pretty(&groups)?);
    } else {
        println!("{}", plain(&build_todo_lines(&groups, UiPalette::default())));
    }
    Ok(())
}

fn print_files(path: &Path, file: Option<&str>) -> anyhow::Result<()> {
    let transcript = load_transcript(path)?;
    let Some(file) = file else {
        for name in transcript.files.keys() {
            println!("{name}");
        }
        return Ok(());
    };
    let Some(entry) = transcript.files.get(file) else {
        bail!("no file {file} in {}", path.display());
    };
    print!("{}", file_text(entry));
    Ok(())
}

fn run_workspace(command: WorkspaceCommand, config: &Config) -> anyhow::Result<()> {
    let workspace = Workspace::new(&config.workspace.root)?;
    match command {
        WorkspaceCommand::Ls { path } => {
            for entry in workspace.list(path.as_deref().unwrap_or_default())? {
                println!(
                    "{:<9} {:>10} {} {}",
                    entry.kind.label(),
                    entry.size,
                    entry.updated_at.format("%Y-%m-%d %H:%M"),
                    entry.path
                );
            }
        }
        WorkspaceCommand::Cat { path } => print!("{}", workspace.read(&path)?),
        WorkspaceCommand::Write { path, content } => {
            let content = match content {
                Some(content) => content,
                None => {
                    let mut buf = String::new();
                    io::stdin()
                        .read_to_string(&mut buf)
                        .context("failed to read stdin")?;
                    buf
                }
            };
            let written = workspace.write(&path, &content)?;
            println!("{}", written.display());
        }
        WorkspaceCommand::Rm { path } => workspace.delete(&path)?,
    }
    Ok(())
}

fn upload(file: &Path, bucket: &str, config: &Config) -> anyhow::Result<()> {
    let store = UploadStore::new(&config.uploads.dir, config.uploads.max_bytes)?;
    let stored = store
        .store_file(file, bucket)
        .with_context(|| format!("failed to upload {}", file.display()))?;
    println!("{}", stored.path);
    Ok(())
}
