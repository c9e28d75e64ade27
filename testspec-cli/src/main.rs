// Command-line interface for testspec
//
// This binary converts manual test specifications between the Markdown dialect and
// spreadsheet files. All of the conversion logic lives in testspec-babel; this crate only
// deals with arguments, configuration, files on disk and reporting.
//
// Usage:
//  testspec to-sheet <files.md>... [-o <dir>] [--force]        - Markdown to one CSV per document
//  testspec to-markdown <files>... [-o <dir>] [--category <text>] [--force]
//                                                              - xlsx/xlsm/xls/ods/csv to Markdown
//  testspec inspect <file.md>                                  - Row table as JSON
//  testspec formats                                            - Supported file formats
//  testspec <files>...                                         - to-sheet or to-markdown, picked
//                                                                from the file extensions
//
// Configuration:
//
// The embedded defaults are layered with ./testspec.toml when it exists, then with the file
// given to --config. Warnings are printed to stderr once every file has been processed, fatal
// errors stop the run with exit status 1.

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use std::fs;
use std::path::{Path, PathBuf};
use testspec_babel::batch::{markdown_to_sheets, sheet_name_from_path, sheets_to_markdown};
use testspec_babel::{
    FileWarning, Grammar, MarkdownFormat, ReadOptions, SheetFormatRegistry, SheetLayout,
};
use testspec_config::{Loader, TestspecConfig};
use tracing_subscriber::EnvFilter;

const SUBCOMMANDS: &[&str] = &["to-sheet", "to-markdown", "inspect", "formats", "help"];
const SHEET_OUTPUT_FORMAT: &str = "csv";

fn build_cli() -> Command {
    Command::new("testspec")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert manual test specifications between Markdown and spreadsheets")
        .long_about(
            "testspec converts test specifications written in a small Markdown dialect into\n\
            spreadsheet sheets, and generates that Markdown back from spreadsheets.\n\n\
            Commands:\n  \
            - to-sheet:    Markdown files to one CSV sheet each\n  \
            - to-markdown: Spreadsheet files to one Markdown file per sheet\n  \
            - inspect:     Show the parsed row table of a Markdown file as JSON\n  \
            - formats:     List the supported file formats\n\n\
            The command may be omitted, it is then picked from the file extensions.\n\n\
            Examples:\n  \
            testspec login.md settings.md -o sheets/   # Same as 'testspec to-sheet ...'\n  \
            testspec spec.xlsx -o docs/                # Same as 'testspec to-markdown ...'\n  \
            testspec inspect login.md                  # Row table as JSON",
        )
        .arg_required_else_help(true)
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a testspec.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log progress to stderr (-v for info, -vv for debug)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("to-sheet")
                .about("Convert Markdown test specifications to sheets")
                .long_about(
                    "Parse Markdown test specifications and write one CSV sheet per file.\n\n\
                    The sheet is named after the file stem, which must be a valid sheet name.\n\
                    Files are processed in sheet order: by the length of their title line,\n\
                    then by path. A cover sheet (表紙.csv by default) records the category\n\
                    of the first document.\n\n\
                    Examples:\n  \
                    testspec to-sheet *.md -o sheets/\n  \
                    testspec to-sheet login.md --force",
                )
                .arg(inputs_arg("Markdown files to convert"))
                .arg(output_dir_arg())
                .arg(force_arg()),
        )
        .subcommand(
            Command::new("to-markdown")
                .about("Generate Markdown test specifications from sheets")
                .long_about(
                    "Read spreadsheet files and write one Markdown file per data sheet.\n\n\
                    Supported inputs: .xlsx, .xlsm, .xlsb, .xls, .ods and .csv.\n\
                    The product category comes from --category, then from the cover sheet,\n\
                    then from the configured default.\n\n\
                    Examples:\n  \
                    testspec to-markdown spec.xlsx -o docs/\n  \
                    testspec to-markdown login.csv --category 製品A",
                )
                .arg(inputs_arg("Spreadsheet files to convert"))
                .arg(output_dir_arg())
                .arg(
                    Arg::new("category")
                        .long("category")
                        .value_name("TEXT")
                        .help("Product category written above the title"),
                )
                .arg(force_arg()),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print the parsed row table of a Markdown file as JSON")
                .arg(
                    Arg::new("path")
                        .help("Path to the Markdown file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(Command::new("formats").about("List the supported file formats"))
}

fn inputs_arg(help: &'static str) -> Arg {
    Arg::new("inputs")
        .help(help)
        .required(true)
        .num_args(1..)
        .index(1)
        .value_hint(ValueHint::FilePath)
}

fn output_dir_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_name("DIR")
        .help("Directory for the generated files (defaults to the current directory)")
        .value_hint(ValueHint::DirPath)
}

fn force_arg() -> Arg {
    Arg::new("force")
        .long("force")
        .help("Overwrite existing output files")
        .action(ArgAction::SetTrue)
}

/// Which conversion the given files call for, judged by their extensions.
fn infer_command(inputs: &[String]) -> Result<&'static str, String> {
    let markdown = MarkdownFormat::default();
    let registry = SheetFormatRegistry::default();

    let mut command = None;
    for input in inputs {
        let this = if has_extension(input, markdown.file_extensions()) {
            "to-sheet"
        } else if registry.detect_format_from_filename(input).is_some() {
            "to-markdown"
        } else {
            return Err(format!("Could not detect format from filename '{input}'"));
        };
        match command {
            Some(previous) if previous != this => {
                return Err(
                    "Markdown and spreadsheet files cannot be converted in one run".to_string(),
                )
            }
            _ => command = Some(this),
        }
    }
    command.ok_or_else(|| "No input files given".to_string())
}

/// Insert the inferred subcommand when the first argument is a file rather than a command.
fn with_default_subcommand(args: &[String]) -> Option<Result<Vec<String>, String>> {
    let first = args.get(1)?;
    if first.starts_with('-') || SUBCOMMANDS.contains(&first.as_str()) {
        return None;
    }

    let inputs: Vec<String> = args[1..]
        .iter()
        .take_while(|arg| !arg.starts_with('-'))
        .cloned()
        .collect();
    Some(infer_command(&inputs).map(|command| {
        let mut new_args = vec![args[0].clone(), command.to_string()];
        new_args.extend_from_slice(&args[1..]);
        new_args
    }))
}

fn has_extension(path: &str, extensions: &[&str]) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.contains(&ext.to_ascii_lowercase().as_str()))
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&args) {
        Ok(m) => m,
        Err(e) => match with_default_subcommand(&args) {
            Some(Ok(new_args)) => match cli.try_get_matches_from(&new_args) {
                Ok(m) => m,
                Err(e2) => e2.exit(),
            },
            Some(Err(message)) => {
                eprintln!("Error: {message}");
                std::process::exit(1);
            }
            None => e.exit(),
        },
    };

    init_tracing(matches.get_count("verbose"));

    let config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));

    match matches.subcommand() {
        Some(("to-sheet", sub_matches)) => {
            let inputs = input_paths(sub_matches);
            require_kind(&inputs, "to-sheet");
            let output = output_dir(sub_matches);
            handle_to_sheet_command(&inputs, &output, sub_matches.get_flag("force"), &config);
        }
        Some(("to-markdown", sub_matches)) => {
            let inputs = input_paths(sub_matches);
            require_kind(&inputs, "to-markdown");
            let output = output_dir(sub_matches);
            let category = sub_matches
                .get_one::<String>("category")
                .map(|s| s.as_str());
            handle_to_markdown_command(
                &inputs,
                &output,
                category,
                sub_matches.get_flag("force"),
                &config,
            );
        }
        Some(("inspect", sub_matches)) => {
            let path = sub_matches
                .get_one::<String>("path")
                .expect("path is required");
            handle_inspect_command(path, &config);
        }
        Some(("formats", _)) => {
            handle_formats_command();
        }
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn input_paths(matches: &ArgMatches) -> Vec<String> {
    matches
        .get_many::<String>("inputs")
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

fn output_dir(matches: &ArgMatches) -> PathBuf {
    let dir = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&dir).unwrap_or_else(|e| {
        eprintln!("Error creating directory '{}': {e}", dir.display());
        std::process::exit(1);
    });
    dir
}

/// Exit unless every input belongs to `command`.
fn require_kind(inputs: &[String], command: &str) {
    match infer_command(inputs) {
        Ok(inferred) if inferred == command => {}
        Ok(_) => {
            eprintln!("Error: '{command}' does not accept these input files");
            std::process::exit(1);
        }
        Err(message) => {
            eprintln!("Error: {message}");
            std::process::exit(1);
        }
    }
}

/// Handle the to-sheet command
fn handle_to_sheet_command(inputs: &[String], output: &Path, force: bool, config: &TestspecConfig) {
    let grammar = compile_grammar(config);
    let layout = SheetLayout::from(&config.sheet);
    let paths: Vec<PathBuf> = inputs.iter().map(PathBuf::from).collect();

    let batch = markdown_to_sheets(&paths, &grammar, &layout, &config.sheet.cover_sheet)
        .unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            std::process::exit(1);
        });

    let registry = SheetFormatRegistry::default();
    let format = registry.get(SHEET_OUTPUT_FORMAT).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    let mut skipped = Vec::new();
    for sheet in &batch.outputs {
        let target = format.output_path(sheet, output);
        if target.exists() && !force {
            skipped.push(target);
            continue;
        }
        let written = format.write(sheet, output).unwrap_or_else(|e| {
            eprintln!("Error writing file '{}': {e}", target.display());
            std::process::exit(1);
        });
        println!("{}", written.display());
    }

    report_warnings(&batch.warnings, &skipped);
}

/// Handle the to-markdown command
fn handle_to_markdown_command(
    inputs: &[String],
    output: &Path,
    category: Option<&str>,
    force: bool,
    config: &TestspecConfig,
) {
    let grammar = compile_grammar(config);
    let options = ReadOptions::from(&config.sheet);
    let paths: Vec<PathBuf> = inputs.iter().map(PathBuf::from).collect();

    let batch = sheets_to_markdown(
        &paths,
        &grammar,
        &options,
        &SheetFormatRegistry::default(),
        category,
        &config.sheet.default_category,
    )
    .unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    let mut skipped = Vec::new();
    for file in &batch.outputs {
        let target = output.join(&file.file_name);
        if target.exists() && !force {
            skipped.push(target);
            continue;
        }
        fs::write(&target, &file.contents).unwrap_or_else(|e| {
            eprintln!("Error writing file '{}': {e}", target.display());
            std::process::exit(1);
        });
        println!("{}", target.display());
    }

    report_warnings(&batch.warnings, &skipped);
}

/// Handle the inspect command
fn handle_inspect_command(path: &str, config: &TestspecConfig) {
    let grammar = compile_grammar(config);
    let source = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{path}': {e}");
        std::process::exit(1);
    });

    let markdown = MarkdownFormat::new(grammar);
    let parsed = sheet_name_from_path(Path::new(path))
        .and_then(|name| markdown.parse(&source, &name))
        .unwrap_or_else(|e| {
            eprintln!("Parse error: {path}: {e}");
            std::process::exit(1);
        });

    let json = serde_json::to_string_pretty(&parsed).unwrap_or_else(|e| {
        eprintln!("Serialization error: {e}");
        std::process::exit(1);
    });
    println!("{json}");
}

/// Handle the formats command
fn handle_formats_command() {
    let markdown = MarkdownFormat::default();
    println!("Markdown:");
    println!("  {:<10} {}", "markdown", markdown.file_extensions().join(", "));

    println!("\nSheet formats:");
    let registry = SheetFormatRegistry::default();
    for name in registry.list_formats() {
        let Ok(format) = registry.get(&name) else {
            continue;
        };
        let mut modes = Vec::new();
        if format.supports_reading() {
            modes.push("read");
        }
        if format.supports_writing() {
            modes.push("write");
        }
        println!(
            "  {name:<10} {:<28} {:<12} {}",
            format.file_extensions().join(", "),
            modes.join("/"),
            format.description()
        );
    }
}

fn report_warnings(warnings: &[FileWarning], skipped: &[PathBuf]) {
    for target in skipped {
        eprintln!(
            "Warning: {} already exists, skipped (use --force to overwrite)",
            target.display()
        );
    }
    for warning in warnings {
        eprintln!("Warning: {warning}");
    }
}

fn compile_grammar(config: &TestspecConfig) -> Grammar {
    config.grammar().unwrap_or_else(|err| {
        eprintln!("Invalid [markdown] configuration: {err}");
        std::process::exit(1);
    })
}

fn load_cli_config(explicit_path: Option<&str>) -> TestspecConfig {
    let loader = Loader::new().with_optional_file("testspec.toml");
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    let config = loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    });
    tracing::debug!(explicit = ?explicit_path, "configuration loaded");
    config
}
