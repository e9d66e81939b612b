//! Ramify CLI binary: tree-of-thoughts search and baselines from the command line.
//!
//! Subcommands: `tot` (24-game tree search), `cot` (chain of thought), `debate`
//! (blackboard debate), `check` (verify an expression).

mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cli::{
    check_expression, format_cot, format_debate, format_tot, load_prompts, make_backend,
    run_cot, run_debate, run_tot, write_output, Mode,
};
use ramify::{DebateConfig, SearchParams};

#[derive(Parser, Debug)]
#[command(name = "ramify", version)]
#[command(about = "Ramify: tree-of-thoughts search over a text-generation backend")]
struct Args {
    #[command(subcommand)]
    cmd: Command,

    /// Offline backend: exhaustive 24-game oracle for `tot`, fixed replies otherwise
    #[arg(long, global = true)]
    mock: bool,

    /// Log search rounds and backend calls (info level) to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Append logs to this file instead of stderr
    #[arg(long, value_name = "PATH", global = true)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Tree-of-thoughts search for a Game of 24 problem
    Tot(TotArgs),
    /// Single chain-of-thought call
    Cot(CotArgs),
    /// Multi-agent blackboard debate
    Debate(DebateArgs),
    /// Check whether an arithmetic expression evaluates to 24
    Check(CheckArgs),
}

#[derive(clap::Args, Debug, Clone)]
struct TotArgs {
    /// The four numbers, quoted ("4 9 10 13") or as separate arguments
    #[arg(required = true, num_args = 1..)]
    numbers: Vec<String>,

    /// Proposals requested per frontier node
    #[arg(short = 'k', long = "proposals", env = "RAMIFY_K", default_value_t = 3)]
    k: usize,

    /// Nodes kept per round
    #[arg(short = 'b', long = "breadth", env = "RAMIFY_BREADTH", default_value_t = 5)]
    b: usize,

    /// Number of rounds
    #[arg(short = 'd', long = "depth", env = "RAMIFY_DEPTH", default_value_t = 3)]
    d: usize,

    /// Print the full outcome as JSON
    #[arg(long)]
    json: bool,

    /// Write the result to this file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
struct CotArgs {
    /// Problem text
    #[arg(required = true, num_args = 1..)]
    problem: Vec<String>,
}

#[derive(clap::Args, Debug, Clone)]
struct DebateArgs {
    /// Problem text
    #[arg(required = true, num_args = 1..)]
    problem: Vec<String>,

    #[arg(long, default_value_t = 3)]
    rounds: usize,

    #[arg(long, default_value_t = 2)]
    agents: usize,

    /// Write the debate report to this file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
struct CheckArgs {
    /// Expression, e.g. "(6 - 4) * (4 + 8)"
    expression: String,

    /// Require the expression to use exactly these numbers
    #[arg(long, value_name = "NUMBERS")]
    numbers: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // before parsing, so .env / config.toml can supply RAMIFY_K and friends
    let config_result = config::load_and_apply("ramify", None::<&std::path::Path>);
    let args = Args::parse();
    let _log_guard = logging::init(args.verbose, args.log_file.as_deref())?;
    if let Err(e) = config_result {
        tracing::warn!(error = %e, "config not applied");
    }

    let prompts = load_prompts();
    match args.cmd {
        Command::Tot(t) => {
            let backend = make_backend(args.mock, Mode::Search)?;
            let problem = t.numbers.join(" ");
            let outcome = run_tot(backend, &prompts, &problem, SearchParams::new(t.k, t.b, t.d)).await;
            write_output(&format_tot(&outcome, t.json)?, t.output.as_deref())?;
        }
        Command::Cot(c) => {
            let backend = make_backend(args.mock, Mode::Conversation)?;
            let answer = run_cot(backend.as_ref(), &prompts, &c.problem.join(" ")).await?;
            write_output(&format_cot(&answer), None)?;
        }
        Command::Debate(d) => {
            let backend = make_backend(args.mock, Mode::Conversation)?;
            let config = DebateConfig {
                rounds: d.rounds,
                agents: d.agents,
            };
            let outcome = run_debate(backend, prompts, &d.problem.join(" "), config).await;
            write_output(&format_debate(&outcome), d.output.as_deref())?;
        }
        Command::Check(c) => {
            let report = check_expression(&c.expression, c.numbers.as_deref())?;
            write_output(&report.to_string(), None)?;
            if !report.solves {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tot_accepts_separate_numbers_and_flags() {
        let args = Args::try_parse_from([
            "ramify", "--mock", "tot", "4", "9", "10", "13", "-k", "2", "-b", "4", "-d", "3", "--json",
        ])
        .unwrap();
        assert!(args.mock);
        match args.cmd {
            Command::Tot(t) => {
                assert_eq!(t.numbers.join(" "), "4 9 10 13");
                assert_eq!((t.k, t.b, t.d), (2, 4, 3));
                assert!(t.json);
            }
            other => panic!("expected tot, got {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let args = Args::try_parse_from(["ramify", "debate", "q", "--rounds", "1", "--verbose"]).unwrap();
        assert!(args.verbose);
        match args.cmd {
            Command::Debate(d) => {
                assert_eq!(d.rounds, 1);
                assert_eq!(d.agents, 2);
            }
            other => panic!("expected debate, got {:?}", other),
        }
    }

    #[test]
    fn check_requires_expression() {
        assert!(Args::try_parse_from(["ramify", "check"]).is_err());
    }
}
