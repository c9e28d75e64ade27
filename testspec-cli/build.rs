use clap::{Arg, ArgAction, Command, ValueHint};
use clap_complete::{generate_to, shells::*};
use std::env;
use std::io::Error;

// Mirror of build_cli() from src/main.rs
// We need to duplicate this here since build scripts can't access src/ modules
fn inputs_arg() -> Arg {
    Arg::new("inputs")
        .required(true)
        .num_args(1..)
        .index(1)
        .value_hint(ValueHint::FilePath)
}

fn output_dir_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_hint(ValueHint::DirPath)
}

fn force_arg() -> Arg {
    Arg::new("force").long("force").action(ArgAction::SetTrue)
}

fn main() -> Result<(), Error> {
    let outdir = match env::var_os("OUT_DIR") {
        None => return Ok(()),
        Some(outdir) => outdir,
    };

    let mut cmd = Command::new("testspec")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert manual test specifications between Markdown and spreadsheets")
        .arg(
            Arg::new("config")
                .long("config")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("to-sheet")
                .about("Convert Markdown test specifications to sheets")
                .arg(inputs_arg())
                .arg(output_dir_arg())
                .arg(force_arg()),
        )
        .subcommand(
            Command::new("to-markdown")
                .about("Generate Markdown test specifications from sheets")
                .arg(inputs_arg())
                .arg(output_dir_arg())
                .arg(Arg::new("category").long("category"))
                .arg(force_arg()),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print the parsed row table of a Markdown file as JSON")
                .arg(
                    Arg::new("path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(Command::new("formats").about("List the supported file formats"));

    // Generate completions for bash
    generate_to(Bash, &mut cmd, "testspec", &outdir)?;

    // Generate completions for zsh
    generate_to(Zsh, &mut cmd, "testspec", &outdir)?;

    // Generate completions for fish
    generate_to(Fish, &mut cmd, "testspec", &outdir)?;

    println!("cargo:warning=Shell completions generated in {outdir:?}");

    Ok(())
}
