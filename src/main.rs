use std::net::{IpAddr, SocketAddr};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use toolhub::core::{Evaluation, FormValues, Tool, evaluate};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "toolhub", version, about = "Everyday calculators over HTTP and the command line")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the JSON API and the calculator page.
    Serve {
        #[arg(long, env = "TOOLHUB_HOST", default_value = "0.0.0.0")]
        host: IpAddr,
        #[arg(long, env = "TOOLHUB_PORT", default_value_t = 8080)]
        port: u16,
    },
    /// List every calculator id and title.
    List,
    /// Evaluate one calculator and print its metrics.
    Calc {
        tool: CliTool,
        /// Form values as `key=value`; omitted fields take their defaults.
        #[arg(value_parser = parse_key_value)]
        values: Vec<(String, String)>,
        /// Print the full evaluation as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliTool {
    Aggregate,
    AmpsToKw,
    KwToAmps,
    PercentToFraction,
    BlackScholes,
    Mortgage,
    IncomeTax,
    PoolPump,
    TitleInsurance,
    SadeSati,
    NameGenerator,
    UnitConverter,
    SchoolCutoff,
}

impl From<CliTool> for Tool {
    fn from(value: CliTool) -> Self {
        match value {
            CliTool::Aggregate => Tool::Aggregate,
            CliTool::AmpsToKw => Tool::AmpsToKw,
            CliTool::KwToAmps => Tool::KwToAmps,
            CliTool::PercentToFraction => Tool::PercentToFraction,
            CliTool::BlackScholes => Tool::BlackScholes,
            CliTool::Mortgage => Tool::Mortgage,
            CliTool::IncomeTax => Tool::IncomeTax,
            CliTool::PoolPump => Tool::PoolPump,
            CliTool::TitleInsurance => Tool::TitleInsurance,
            CliTool::SadeSati => Tool::SadeSati,
            CliTool::NameGenerator => Tool::NameGenerator,
            CliTool::UnitConverter => Tool::UnitConverter,
            CliTool::SchoolCutoff => Tool::SchoolCutoff,
        }
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{raw}'")),
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("toolhub=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_evaluation(evaluation: &Evaluation) {
    let (title, _) = evaluation.tool.describe();
    println!("{title}");
    if let Some(classification) = &evaluation.classification {
        println!("  {classification}");
    }
    let width = evaluation
        .metrics
        .iter()
        .map(|m| m.label.len())
        .max()
        .unwrap_or(0);
    for metric in &evaluation.metrics {
        println!("  {:<width$}  {}", metric.label, metric.display);
    }
    for sub in &evaluation.substitutions {
        println!("  note: {} defaulted to {} ({:?})", sub.field, sub.applied, sub.reason);
    }
}

fn run_calc(tool: Tool, values: Vec<(String, String)>, json: bool) -> ExitCode {
    let form: FormValues = values.into_iter().collect();
    let evaluation = match evaluate(tool, &form) {
        Ok(evaluation) => evaluation,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if json {
        match serde_json::to_string_pretty(&evaluation) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        print_evaluation(&evaluation);
    }
    ExitCode::SUCCESS
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::Serve { host, port } => {
            let addr = SocketAddr::new(host, port);
            if let Err(e) = toolhub::api::run_http_server(addr).await {
                tracing::error!(%addr, error = %e, "server error");
                eprintln!("Server error: {e}");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Command::List => {
            for tool in Tool::ALL {
                let (title, _) = tool.describe();
                println!("{:<20} {title}", tool.id());
            }
            ExitCode::SUCCESS
        }
        Command::Calc { tool, values, json } => run_calc(tool.into(), values, json),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_tool_names_match_evaluator_ids() {
        for tool in CliTool::value_variants() {
            let name = tool
                .to_possible_value()
                .map(|v| v.get_name().to_string())
                .expect("visible variant");
            assert_eq!(Tool::from(*tool).id(), name);
        }
    }

    #[test]
    fn key_value_arguments() {
        assert_eq!(
            parse_key_value("amps=20"),
            Ok(("amps".to_string(), "20".to_string()))
        );
        assert_eq!(
            parse_key_value("date=2024-01-01"),
            Ok(("date".to_string(), "2024-01-01".to_string()))
        );
        assert_eq!(parse_key_value("x="), Ok(("x".to_string(), String::new())));
        assert!(parse_key_value("amps").is_err());
        assert!(parse_key_value("=20").is_err());
    }

    #[test]
    fn calc_command_parses() {
        let cli = Cli::try_parse_from([
            "toolhub",
            "calc",
            "amps-to-kw",
            "phase=dc",
            "amps=20",
            "--json",
        ])
        .expect("parses");
        match cli.command {
            Command::Calc { tool, values, json } => {
                assert_eq!(tool, CliTool::AmpsToKw);
                assert_eq!(values.len(), 2);
                assert!(json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn serve_defaults() {
        let cli = Cli::try_parse_from(["toolhub", "serve"]).expect("parses");
        match cli.command {
            Command::Serve { host, port } => {
                // TOOLHUB_* may be set in the environment running the tests
                if std::env::var_os("TOOLHUB_PORT").is_none() {
                    assert_eq!(port, 8080);
                }
                if std::env::var_os("TOOLHUB_HOST").is_none() {
                    assert_eq!(host.to_string(), "0.0.0.0");
                }
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
