use clap::Parser;

use relay_inspect::{Cli, InspectConfig, inspect, trace};

fn main() {
    let cli = Cli::parse();
    let output_json = cli.json;

    let config = match InspectConfig::try_from(cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err:#}");
            std::process::exit(2);
        }
    };
    if let Err(err) = trace::init(&config.log, config.log_format) {
        eprintln!("failed to set up logging: {err:#}");
        std::process::exit(2);
    }

    match inspect(&config) {
        Ok(report) => {
            if output_json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{json}"),
                    Err(err) => {
                        eprintln!("failed to serialize report: {err:#}");
                        std::process::exit(2);
                    }
                }
            } else {
                print!("{}", report.human_summary());
            }
        }
        Err(err) => {
            eprintln!("inspect failed: {err:#}");
            std::process::exit(1);
        }
    }
}
