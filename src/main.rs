use anyhow::Context;
use clap::Parser;
use std::process;
use tanf_processor::cli::{args::Args, commands};

fn main() {
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to create async runtime: {}", e);
            process::exit(1);
        }
    };

    let result: anyhow::Result<commands::RunStats> = runtime.block_on(async {
        tokio::select! {
            result = commands::run(args) => result.context("Processing failed"),
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for CTRL+C")?;
                eprintln!("\nReceived CTRL+C, shutting down...");
                Err(tanf_processor::Error::processing_interrupted(
                    "Processing interrupted by user",
                ))
                .context("Processing stopped")
            }
        }
    });

    match result {
        Ok(stats) if stats.files_failed > 0 => process::exit(2),
        Ok(_) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("TANF Processor - Quarterly Submission Parser and Validator");
    println!("==========================================================");
    println!();
    println!("Parse TANF, SSP-MOE and Tribal TANF fixed-width quarterly files and FRA");
    println!("work-outcome files, validate every record and report acceptance status.");
    println!();
    println!("USAGE:");
    println!("    tanf-processor <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    parse       Parse and validate submission files");
    println!("    schemas     List the record layouts known to the processor");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Parse one active case file for calendar 2020 Q4 (October-December):");
    println!("    tanf-processor parse ADS.E2J.FTP1.TS06 -p tanf -s active -y 2020 -Q 4");
    println!();
    println!("    # Parse a directory of closed case files, writing JSON outcomes:");
    println!("    tanf-processor parse ./submissions -p ssp -s closed -y 2021 -Q 1 -o ./outcomes");
    println!();
    println!("    # Parse every FRA file matching a glob:");
    println!("    tanf-processor parse 'fra/*.csv' -p fra -s work-outcomes -y 2024 -Q 2");
    println!();
    println!("    # Show the FRA layout with every field:");
    println!("    tanf-processor schemas --program fra --detailed");
    println!();
    println!("For detailed help on any command, use:");
    println!("    tanf-processor <COMMAND> --help");
}
