#![allow(
    clippy::needless_pass_by_value,    // clap requires owned values
    clippy::unnecessary_wraps,         // consistent Result return for CLI handlers
    clippy::fn_params_excessive_bools, // CLI commands have many boolean flags
)]

//! nbkit CLI - Jupyter notebook toolbox
//!
//! Converts notebooks to and from script formats, clears outputs and extracts
//! streams, errors and images.

mod config;

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use config::{Config, CONFIG_FILE_NAME, CONFIG_TEMPLATE};
use nbkit_notebook::{
    get_errors, get_images, get_stream, load_notebook_file, load_script_file, markdownize,
    outline, remove_markdown_cells, save_notebook_file, serialize_notebook, to_interactive,
    to_interactive_html, to_percent, ExtractedImage, LoadOptions, Notebook, NotebookVersion,
    ScriptFormat, ScriptParser, StreamSelection,
};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Verbosity level for output control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Verbosity {
    /// Suppress all output except errors
    Quiet,
    /// Normal output (default)
    Normal,
    /// Verbose output with extra details
    Verbose,
}

impl Verbosity {
    /// Create from CLI flags
    const fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    /// Check if status lines should be shown (not quiet)
    const fn should_show_output(self) -> bool {
        !matches!(self, Self::Quiet)
    }

    /// Default log filter for this verbosity (`RUST_LOG` still overrides)
    const fn log_filter(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "debug",
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "nbkit",
    about = "Convert, clean and inspect Jupyter notebooks",
    long_about = "Convert Jupyter notebooks to percent-format or interactive scripts and back,\n\
                  clear outputs, and extract streams, errors and images.\n\
                  \n\
                  Defaults can be set via .nbkit.toml configuration files.",
    version
)]
struct Args {
    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Show detailed processing information
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Fail on cell types other than markdown and code instead of skipping them
    #[arg(long, global = true)]
    strict: bool,

    /// Additional configuration file (overrides user and project config)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a tree outline of a notebook
    Outline {
        /// Input notebook (.ipynb)
        #[arg(value_name = "NOTEBOOK")]
        input: PathBuf,
    },

    /// Convert a notebook to a percent-format script
    #[command(long_about = "Convert a notebook to a percent-format script.\n\
                      \n\
                      Code cells start with '# %%', markdown cells with '# %% [markdown]'\n\
                      and every markdown line is commented with '# '.")]
    Percent {
        /// Input notebook (.ipynb)
        #[arg(value_name = "NOTEBOOK")]
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Convert a notebook to the interactive-cell format (Starboard)
    Interactive {
        /// Input notebook (.ipynb)
        #[arg(value_name = "NOTEBOOK")]
        input: PathBuf,

        /// Emit a standalone HTML page running the Starboard notebook
        #[arg(long)]
        html: bool,

        /// Output file (default: stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Build a notebook from a percent-format or interactive script
    Import {
        /// Input script
        #[arg(value_name = "SCRIPT")]
        input: PathBuf,

        /// Script format: percent or interactive (default: percent, or from config)
        #[arg(long, value_name = "FORMAT")]
        from: Option<ScriptFormat>,

        /// nbformat version of the new notebook (default: 4.5, or from config)
        #[arg(long, value_name = "X.Y")]
        version: Option<NotebookVersion>,

        /// Output notebook (default: stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Remove all outputs and execution counts
    Clear {
        /// Input notebook (.ipynb)
        #[arg(value_name = "NOTEBOOK")]
        input: PathBuf,

        /// Output notebook (default: stdout)
        #[arg(short, long, value_name = "OUTPUT", conflicts_with = "in_place")]
        output: Option<PathBuf>,

        /// Overwrite the input notebook
        #[arg(long)]
        in_place: bool,
    },

    /// Turn every code cell into a markdown cell
    Markdownize {
        /// Input notebook (.ipynb)
        #[arg(value_name = "NOTEBOOK")]
        input: PathBuf,

        /// Output notebook (default: stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Drop every markdown cell
    StripMarkdown {
        /// Input notebook (.ipynb)
        #[arg(value_name = "NOTEBOOK")]
        input: PathBuf,

        /// Output notebook (default: stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Print the text written to stdout and/or stderr
    Streams {
        /// Input notebook (.ipynb)
        #[arg(value_name = "NOTEBOOK")]
        input: PathBuf,

        /// Include standard output (default unless --stderr is given)
        #[arg(long)]
        stdout: bool,

        /// Include standard error
        #[arg(long)]
        stderr: bool,
    },

    /// List the errors raised by code cells
    Errors {
        /// Input notebook (.ipynb)
        #[arg(value_name = "NOTEBOOK")]
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode the PNG images embedded in outputs
    Images {
        /// Input notebook (.ipynb)
        #[arg(value_name = "NOTEBOOK")]
        input: PathBuf,

        /// Write each image as a PNG file into this directory
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
    },

    /// Manage configuration files
    #[command(long_about = "Manage nbkit configuration files.\n\
                      \n\
                      Configuration precedence (highest to lowest):\n\
                      1. Command-line arguments\n\
                      2. --config FILE\n\
                      3. Project config (./.nbkit.toml)\n\
                      4. User config (~/.nbkit.toml)\n\
                      5. Built-in defaults")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Create a new .nbkit.toml configuration file
    Init {
        /// Create in user home directory (~/.nbkit.toml) instead of current directory
        #[arg(long)]
        global: bool,

        /// Overwrite existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Display the current effective configuration
    Show {
        /// Output as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },

    /// Show the paths of the configuration files
    Path,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let verbosity = Verbosity::from_flags(args.quiet, args.verbose);

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(verbosity.log_filter()),
    )
    .target(env_logger::Target::Stderr)
    .init();

    let config = Config::resolve(args.config.as_deref())?;
    let load_options = if config.strict(args.strict) {
        LoadOptions::strict()
    } else {
        LoadOptions::lenient()
    };

    match args.command {
        Commands::Outline { input } => {
            let notebook = load(&input, &load_options)?;
            emit_text(&outline(&notebook), None, verbosity)
        }
        Commands::Percent { input, output } => {
            let notebook = load(&input, &load_options)?;
            emit_text(&to_percent(&notebook), output.as_deref(), verbosity)
        }
        Commands::Interactive {
            input,
            html,
            output,
        } => {
            let notebook = load(&input, &load_options)?;
            let text = if config.html(html) {
                to_interactive_html(&notebook)
            } else {
                to_interactive(&notebook)
            };
            emit_text(&text, output.as_deref(), verbosity)
        }
        Commands::Import {
            input,
            from,
            version,
            output,
        } => import_command(&input, from, version, output.as_deref(), &config, verbosity),
        Commands::Clear {
            input,
            output,
            in_place,
        } => {
            let mut notebook = load(&input, &load_options)?;
            notebook.clear_outputs();
            let target = if in_place { Some(input.as_path()) } else { output.as_deref() };
            emit_notebook(&notebook, target, verbosity)
        }
        Commands::Markdownize { input, output } => {
            let notebook = load(&input, &load_options)?;
            emit_notebook(&markdownize(&notebook), output.as_deref(), verbosity)
        }
        Commands::StripMarkdown { input, output } => {
            let notebook = load(&input, &load_options)?;
            emit_notebook(&remove_markdown_cells(&notebook), output.as_deref(), verbosity)
        }
        Commands::Streams {
            input,
            stdout,
            stderr,
        } => {
            let notebook = load(&input, &load_options)?;
            let (stdout, stderr) = config.stream_flags(stdout, stderr);
            let text = get_stream(&notebook, StreamSelection { stdout, stderr });
            print!("{text}");
            Ok(())
        }
        Commands::Errors { input, json } => {
            let notebook = load(&input, &load_options)?;
            errors_command(&notebook, json)
        }
        Commands::Images { input, out_dir } => {
            let notebook = load(&input, &load_options)?;
            images_command(&notebook, &input, out_dir.as_deref(), verbosity)
        }
        Commands::Config { action } => config_command(action, &config, verbosity),
        Commands::Completions { shell } => completion_command(shell),
    }
}

/// Load a notebook, adding the path to any error
fn load(path: &Path, options: &LoadOptions) -> Result<Notebook> {
    load_notebook_file(path, options)
        .with_context(|| format!("Failed to load notebook: {}", path.display()))
}

/// Write text to a file, or to stdout when no file is given
fn emit_text(text: &str, output: Option<&Path>, verbosity: Verbosity) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            report_written(path, verbosity);
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            if !text.is_empty() && !text.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}

/// Write a notebook as .ipynb JSON to a file, or to stdout
fn emit_notebook(notebook: &Notebook, output: Option<&Path>, verbosity: Verbosity) -> Result<()> {
    match output {
        Some(path) => {
            save_notebook_file(notebook, path)
                .with_context(|| format!("Failed to write notebook: {}", path.display()))?;
            report_written(path, verbosity);
            Ok(())
        }
        None => {
            print!("{}", serialize_notebook(notebook)?);
            Ok(())
        }
    }
}

fn report_written(path: &Path, verbosity: Verbosity) {
    if verbosity.should_show_output() {
        eprintln!("{} Wrote {}", "Success:".green().bold(), path.display());
    }
}

fn import_command(
    input: &Path,
    from: Option<ScriptFormat>,
    version: Option<NotebookVersion>,
    output: Option<&Path>,
    config: &Config,
    verbosity: Verbosity,
) -> Result<()> {
    let format = match (from, config.import_format()) {
        (Some(format), _) => format,
        (None, Some(configured)) => configured
            .parse::<ScriptFormat>()
            .map_err(|e| anyhow::anyhow!("Invalid import.format in config: {e}"))?,
        (None, None) => ScriptFormat::default(),
    };
    let version = match (version, config.import_version()) {
        (Some(version), _) => version,
        (None, Some(configured)) => configured
            .parse::<NotebookVersion>()
            .context("Invalid import.version in config")?,
        (None, None) => NotebookVersion::default(),
    };

    log::debug!("Importing {} as {format} script (v{version})", input.display());
    let parser = ScriptParser::new(format).with_version(version);
    let notebook = load_script_file(input, &parser)
        .with_context(|| format!("Failed to read script: {}", input.display()))?;
    emit_notebook(&notebook, output, verbosity)
}

fn errors_command(notebook: &Notebook, json_output: bool) -> Result<()> {
    let errors = get_errors(notebook);
    if json_output {
        let values: Vec<serde_json::Value> = errors
            .iter()
            .map(|error| {
                serde_json::json!({
                    "cell_id": error.cell_id,
                    "ename": error.ename,
                    "evalue": error.evalue,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
    } else {
        for error in &errors {
            println!("{} {}", format!("[{}]", error.cell_id).bright_black(), error);
        }
    }
    Ok(())
}

fn images_command(
    notebook: &Notebook,
    input: &Path,
    out_dir: Option<&Path>,
    verbosity: Verbosity,
) -> Result<()> {
    let extraction = get_images(notebook);

    for failure in &extraction.failures {
        eprintln!(
            "{} cell {} output {}: {}",
            "Warning:".yellow().bold(),
            failure.cell_id,
            failure.output_index,
            failure.error
        );
    }

    match out_dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
            let stem = input.file_stem().unwrap_or_default().to_string_lossy();
            for (index, image) in extraction.images.iter().enumerate() {
                let path = dir.join(format!("{stem}-{index}-{}.png", image.cell_id));
                save_png(image, &path)?;
                report_written(&path, verbosity);
            }
        }
        None => {
            for image in &extraction.images {
                let shape = image.array.shape();
                println!(
                    "{} {}x{} ({} channels)",
                    format!("[{}]", image.cell_id).bright_black(),
                    shape[1],
                    shape[0],
                    shape[2]
                );
            }
        }
    }

    if extraction.images.is_empty() && extraction.failures.is_empty() && verbosity.should_show_output() {
        eprintln!("{} No images found", "Info:".cyan().bold());
    }
    Ok(())
}

/// Encode an extracted image array as a PNG file
fn save_png(image: &ExtractedImage, path: &Path) -> Result<()> {
    let shape = image.array.shape();
    let (height, width, channels) = (shape[0], shape[1], shape[2]);
    let color = match channels {
        1 => image::ExtendedColorType::L8,
        2 => image::ExtendedColorType::La8,
        3 => image::ExtendedColorType::Rgb8,
        4 => image::ExtendedColorType::Rgba8,
        n => bail!("Unsupported channel count {n} in cell {}", image.cell_id),
    };
    let raw: Vec<u8> = image.array.iter().copied().collect();
    image::save_buffer(
        path,
        &raw,
        u32::try_from(width)?,
        u32::try_from(height)?,
        color,
    )
    .with_context(|| format!("Failed to write image: {}", path.display()))
}

fn completion_command(shell: Shell) -> Result<()> {
    let mut cmd = Args::command();
    let bin_name = cmd.get_name().to_string();

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}

fn config_command(action: ConfigAction, config: &Config, verbosity: Verbosity) -> Result<()> {
    match action {
        ConfigAction::Init { global, force } => config_init(global, force, verbosity),
        ConfigAction::Show { json } => config_show(config, json),
        ConfigAction::Path => config_path(),
    }
}

/// Create a new configuration file from the template
fn config_init(global: bool, force: bool, verbosity: Verbosity) -> Result<()> {
    let config_path = if global {
        Config::user_config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
    } else {
        Config::project_config_path()
    };

    if config_path.exists() && !force {
        eprintln!("{} Use --force to overwrite", "Hint:".cyan().bold());
        bail!("Configuration file already exists: {}", config_path.display());
    }

    fs::write(&config_path, CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

    if verbosity.should_show_output() {
        println!(
            "{} Created configuration file: {}",
            "Success:".green().bold(),
            config_path.display()
        );
    }

    Ok(())
}

/// Display the effective configuration
fn config_show(config: &Config, json_output: bool) -> Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(config)?);
    } else {
        println!("{}", toml::to_string_pretty(config)?);
    }
    Ok(())
}

/// Show the config file paths with existence status
fn config_path() -> Result<()> {
    println!("{}", "Configuration file paths:".bold());
    println!();

    let status = |path: &Path| {
        if path.exists() {
            "exists".green()
        } else {
            "not found".yellow()
        }
    };

    if let Some(home) = Config::user_config_path() {
        println!(
            "  {} {} ({})",
            "User:".bright_black(),
            home.display(),
            status(&home)
        );
    }

    let project = PathBuf::from(CONFIG_FILE_NAME);
    println!(
        "  {} {} ({})",
        "Project:".bright_black(),
        project.display(),
        status(&project)
    );

    Ok(())
}
