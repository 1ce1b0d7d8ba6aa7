use crate::config::{Config, load_config};
use crate::ir::Archetype;
use crate::layout::Graph;
use crate::llm::TextGenerator;
use crate::notes::TaskNote;
use crate::render::{render_svg, write_output_svg};
use crate::server::ToolServer;
use crate::service::{CanvasRequest, CanvasService};
use crate::store::FsVault;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "vcanvas", version, about = "Task notes and canvas diagrams for markdown vaults")]
pub struct Args {
    /// Config JSON file
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Vault root (overrides the config file)
    #[arg(long = "vault", global = true)]
    pub vault: Option<PathBuf>,

    /// Debug logging to stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Lay out a description and print it without touching the vault
    Layout {
        /// taskboard, riskmatrix, mindmap or personnel; detected when omitted
        #[arg(short = 'a', long = "archetype")]
        archetype: Option<Archetype>,
        /// Input file or '-' for stdin
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
        #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "canvas")]
        output_format: OutputFormat,
    },
    /// Create or update a canvas in the vault
    Canvas {
        #[arg(short = 'a', long = "archetype")]
        archetype: Option<Archetype>,
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,
        #[arg(short = 'n', long = "name")]
        name: Option<String>,
        #[arg(long = "folder")]
        folder: Option<String>,
        /// Ask the language model for content instead of extracting it locally
        #[arg(short = 'g', long = "generate")]
        generate: bool,
    },
    /// Write a task note, or several with --generate
    Note {
        #[arg(short = 't', long = "title", required_unless_present = "generate")]
        title: Option<String>,
        #[arg(short = 'd', long = "description", default_value = "")]
        description: String,
        #[arg(long = "status")]
        status: Option<String>,
        #[arg(short = 'p', long = "priority")]
        priority: Option<String>,
        #[arg(long = "due")]
        due: Option<String>,
        #[arg(long = "overwrite")]
        overwrite: bool,
        /// Split the input description into notes with the language model
        #[arg(short = 'g', long = "generate")]
        generate: bool,
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,
    },
    /// Build a task board canvas from the notes in a folder
    Board {
        #[arg(long = "folder")]
        folder: Option<String>,
        #[arg(short = 'n', long = "name", default_value = "Task Board")]
        name: String,
    },
    /// Serve vault tools as JSON-RPC over stdin/stdout
    Serve {
        /// Disable the language model; canvases are always extracted locally
        #[arg(long = "offline")]
        offline: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Canvas,
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(root) = args.vault {
        config.vault.root = root;
    }

    match args.command {
        Command::Layout {
            archetype,
            input,
            output,
            output_format,
        } => {
            let description = read_input(input.as_deref())?;
            let archetype = archetype.unwrap_or_else(|| Archetype::detect(&description));
            let service = vault_service(config);
            let graph = service.layout_from_text(archetype, &description);
            write_graph(&graph, service.config(), output_format, output.as_deref())
        }
        Command::Canvas {
            archetype,
            input,
            name,
            folder,
            generate,
        } => {
            let request = CanvasRequest {
                description: read_input(input.as_deref())?,
                name,
                archetype,
                folder,
            };
            let service = vault_service(config);
            let outcome = if generate {
                let generator = model(service.config())?;
                service.generate_canvas(generator.as_ref(), &request)?
            } else {
                service.create_canvas(&request)?
            };
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Command::Note {
            title,
            description,
            status,
            priority,
            due,
            overwrite,
            generate,
            input,
        } => {
            let service = vault_service(config);
            let saved = if generate {
                let description = read_input(input.as_deref())?;
                let generator = model(service.config())?;
                service.generate_task_notes(generator.as_ref(), &description, overwrite)?
            } else {
                let note = TaskNote {
                    title: title.unwrap_or_default(),
                    description,
                    status,
                    priority,
                    due,
                };
                vec![service.create_task_note(&note, overwrite)?]
            };
            println!("{}", serde_json::to_string_pretty(&saved)?);
            Ok(())
        }
        Command::Board { folder, name } => {
            let service = vault_service(config);
            let outcome = service.taskboard_from_notes(folder.as_deref(), &name)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Command::Serve { offline } => {
            let service = vault_service(config);
            let generator = if offline { None } else { model(service.config()).ok() };
            if generator.is_none() {
                log::warn!("no language model available, create_canvas will extract locally");
            }
            let server = ToolServer::new(&service, generator.as_deref());
            server.serve(io::stdin().lock(), io::stdout().lock())?;
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();
}

fn vault_service(config: Config) -> CanvasService<FsVault> {
    let vault = FsVault::new(config.vault.root.clone());
    CanvasService::new(config, vault)
}

#[cfg(feature = "llm")]
fn model(config: &Config) -> Result<Box<dyn TextGenerator>> {
    let client = crate::llm::AnthropicClient::from_env(&config.llm)?;
    Ok(Box::new(client))
}

#[cfg(not(feature = "llm"))]
fn model(_config: &Config) -> Result<Box<dyn TextGenerator>> {
    anyhow::bail!("built without the llm feature")
}

fn write_graph(graph: &Graph, config: &Config, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    match format {
        OutputFormat::Canvas => {
            let json = crate::canvas_file::to_canvas_json(graph)?;
            match output {
                Some(path) => std::fs::write(path, json)?,
                None => println!("{json}"),
            }
        }
        OutputFormat::Svg => write_output_svg(&render_svg(graph, &config.theme), output)?,
        OutputFormat::Png => write_png(graph, config, output)?,
    }
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(graph: &Graph, config: &Config, output: Option<&Path>) -> Result<()> {
    let output = output.context("Output path required for png output")?;
    crate::render::write_output_png(&render_svg(graph, &config.theme), output, &config.theme)
}

#[cfg(not(feature = "png"))]
fn write_png(_graph: &Graph, _config: &Config, _output: Option<&Path>) -> Result<()> {
    anyhow::bail!("built without the png feature")
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()));
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_subcommands() {
        let args = Args::try_parse_from(["vcanvas", "-v", "layout", "-a", "risk-matrix", "-e", "svg"]).unwrap();
        assert!(args.verbose);
        match args.command {
            Command::Layout {
                archetype, output_format, ..
            } => {
                assert_eq!(archetype, Some(Archetype::RiskMatrix));
                assert!(matches!(output_format, OutputFormat::Svg));
            }
            other => panic!("unexpected {other:?}"),
        }

        assert!(Args::try_parse_from(["vcanvas", "note"]).is_err());
        assert!(Args::try_parse_from(["vcanvas", "note", "--generate"]).is_ok());
        assert!(Args::try_parse_from(["vcanvas", "layout", "-a", "pie"]).is_err());
    }

    #[test]
    fn reads_input_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.md");
        std::fs::write(&path, "- ship").unwrap();
        assert_eq!(read_input(Some(&path)).unwrap(), "- ship");
        assert!(read_input(Some(&dir.path().join("missing.md"))).is_err());
    }
}
