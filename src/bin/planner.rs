//! Thin CLI entry point: parses options, runs the demo case study, persists
//! artifacts. All the planning logic lives in the library crate.

use clap::Parser;
use reactive_ltl_planner::config::Config;
use reactive_ltl_planner::demos;
use reactive_ltl_planner::instrumentation::{Event, VecSink};
use reactive_ltl_planner::{io, RrgPlanner};

#[derive(Parser, Debug)]
#[command(name = "planner", about = "Reactive LTL motion planning demo runner")]
struct Cli {
    /// Path to a YAML config document; defaults are used for anything it omits.
    #[arg(long)]
    config: Option<String>,

    /// Which bundled scenario to run.
    #[arg(long, default_value = "ijrr")]
    scenario: String,
}

fn main() {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let cfg = match &cli.config {
        Some(path) => {
            let s = std::fs::read_to_string(path).expect("reading config file");
            Config::from_yaml_str(&s).expect("parsing config file")
        }
        None => Config::default(),
    };

    let scenario = match cli.scenario.as_str() {
        "trivial" => demos::trivial_reach_scenario(),
        _ => demos::ijrr_case_study(),
    };

    log::info!(
        "running scenario '{}' for up to {} iterations",
        cli.scenario,
        cfg.iterations
    );

    let mut planner = RrgPlanner::new(
        scenario.robot,
        scenario.buchi,
        reactive_ltl_planner::config::Eta {
            lo: cfg.eta.lo,
            hi: cfg.eta.hi,
        },
        cfg.seed,
    );

    let mut sink = VecSink::default();
    match planner.solve(cfg.iterations, &mut sink) {
        Ok((prefix, suffix)) => {
            log::info!(
                "solution found: prefix len {} suffix len {}",
                prefix.len(),
                suffix.len()
            );
            std::fs::create_dir_all(&cfg.output_dir).expect("creating output dir");
            io::write_ts(
                format!("{}/ts.yaml", cfg.output_dir),
                &planner.ts,
            )
            .expect("writing ts.yaml");
            io::write_global_solution(
                format!("{}/solution.yaml", cfg.output_dir),
                &prefix,
                &suffix,
            )
            .expect("writing solution.yaml");
        }
        Err(e) => {
            log::error!("planning failed: {e}");
            std::process::exit(1);
        }
    }

    for event in sink.0 {
        if let Event::PolicyFound { iteration } = event {
            log::debug!("policy found at iteration {iteration}");
        }
    }
}
