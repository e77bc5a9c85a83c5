use clap::{Arg, ArgMatches, Command};
use exovet::{engine, store, Artifact, FeatureTable};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Exovet Offline CLI
///
/// Inspects fitted artifacts and scores CSV files without running the
/// server.

fn main() {
    let matches = create_cli().get_matches();

    if let Err(e) = run_command(matches) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn create_cli() -> Command {
    Command::new("exovet-cli")
        .about("Offline tools for vetting artifacts")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("inspect")
                .about("Show an artifact's schema and classifier shape")
                .arg(
                    Arg::new("artifact")
                        .help("Artifact JSON path")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("predict")
                .about("Score a CSV file offline")
                .arg(
                    Arg::new("artifact")
                        .help("Artifact JSON path")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("input")
                        .help("Input CSV path")
                        .required(true)
                        .index(2),
                )
                .arg(
                    Arg::new("output")
                        .help("Write the result CSV here instead of stdout")
                        .short('o')
                        .long("output")
                        .value_name("PATH"),
                ),
        )
}

fn run_command(matches: ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    match matches.subcommand() {
        Some(("inspect", sub_matches)) => cmd_inspect(sub_matches),
        Some(("predict", sub_matches)) => cmd_predict(sub_matches),
        _ => unreachable!(),
    }
}

fn cmd_inspect(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let path = matches.get_one::<String>("artifact").unwrap();
    let artifact = Artifact::from_file(Path::new(path))?;

    println!("name:    {}", artifact.name);
    println!("version: {}", artifact.version);
    println!("classes: {}", artifact.classifier.class_count());
    println!("columns ({}):", artifact.columns.len());
    for column in &artifact.columns {
        println!("  {}", column);
    }
    Ok(())
}

fn cmd_predict(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let artifact_path = matches.get_one::<String>("artifact").unwrap();
    let input_path = matches.get_one::<String>("input").unwrap();

    let artifact = Artifact::from_file(Path::new(artifact_path))?;
    let bytes = fs::read(input_path)?;
    let table = FeatureTable::from_csv(&bytes)?;
    let results = engine::predict(&artifact, &table)?;
    let encoded = store::encode_csv(&results)?;

    match matches.get_one::<String>("output") {
        Some(path) => {
            fs::write(path, encoded)?;
            println!("Scored {} rows into {}", results.len(), path);
        }
        None => io::stdout().write_all(&encoded)?,
    }
    Ok(())
}
