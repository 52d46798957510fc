use clap::{CommandFactory, Parser};

use bpdec_lib::{NullResolver, SymbolMap, SymbolResolver};

use crate::cli::{Cli, TopLevel, DecompileCommand};

mod cli;

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(TopLevel::Decompile { command }) => match command {
            DecompileCommand::File { path, symbols } => {
                let resolver: Box<dyn SymbolResolver> = match symbols {
                    Some(map_path) => match std::fs::read_to_string(&map_path) {
                        Ok(text) => match SymbolMap::parse(&text) {
                            Ok(map) => Box::new(map),
                            Err(e) => {
                                eprintln!("failed to parse symbol map {map_path:?}: {e}");
                                std::process::exit(1);
                            }
                        },
                        Err(e) => {
                            eprintln!("failed to read {map_path:?}: {e}");
                            std::process::exit(1);
                        }
                    },
                    None => Box::new(NullResolver),
                };
                match std::fs::read(&path) {
                    Ok(bytes) => {
                        print!("{}", bpdec_lib::decompile_bytes(&bytes, resolver.as_ref()));
                    }
                    Err(e) => {
                        eprintln!("failed to read {path:?}: {e}");
                        std::process::exit(1);
                    }
                }
            }
        },
        Some(TopLevel::Completion { shell }) => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
        }
        None => {
            Cli::command().print_help().unwrap();
        }
    }
}
