use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::PathBuf;
use tracing::{info, Level};

use mpflow::metrics::analyzer::{self, SummaryRow};
use mpflow::metrics::logger::{read_records, RecordLogger};
use mpflow::metrics::RunMeta;
use mpflow::simulation::{SimConfig, Simulator};
use mpflow::strategies::StrategyKind;
use mpflow::topology::{Path as NetPath, Topology, TopologyConfig, HIGH_COST_TAG};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one simulation and write its result log
    Run {
        #[arg(short, long, default_value = "topology.json")]
        topology: PathBuf,
        #[arg(short, long, default_value = "min_rtt")]
        strategy: String,
        #[arg(short = 'n', long, default_value_t = 100)]
        agents: u32,
        #[arg(short, long, default_value_t = 300)]
        duration: u64,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = 0.1)]
        epsilon: f64,
        #[arg(short, long, default_value = "results")]
        output: PathBuf,
        /// Experiment label; defaults to "<strategy>_<agents>_agents"
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Sweep strategies x agent counts under one topology
    Compare {
        #[arg(short, long, default_value = "topology.json")]
        topology: PathBuf,
        #[arg(
            short,
            long,
            default_value = "min_rtt,min_load,attribute_aware,round_robin,weighted_round_robin,epsilon_greedy,blest"
        )]
        strategies: String,
        #[arg(short = 'n', long, default_value = "10,25,50,100,150,250,500")]
        agent_counts: String,
        #[arg(short, long, default_value_t = 300)]
        duration: u64,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(short, long, default_value = "results")]
        output: PathBuf,
        #[arg(short, long, default_value = "experiment")]
        experiment: String,
    },

    /// Recompute summaries from saved result logs
    Analyze {
        #[arg(default_value = "results")]
        path: PathBuf,
    },

    /// Write an example topology file to get started
    Init {
        #[arg(default_value = "topology.json")]
        output: PathBuf,
    },

    /// List the available selection strategies
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run {
            topology,
            strategy,
            agents,
            duration,
            seed,
            epsilon,
            output,
            label,
        } => run_single(topology, strategy, agents, duration, seed, epsilon, output, label),

        Commands::Compare {
            topology,
            strategies,
            agent_counts,
            duration,
            seed,
            output,
            experiment,
        } => compare(topology, strategies, agent_counts, duration, seed, output, experiment),

        Commands::Analyze { path } => analyze(path),

        Commands::Init { output } => init(output),

        Commands::List => {
            println!("\nAvailable selection strategies");
            for kind in StrategyKind::ALL {
                println!("  - {kind}");
            }
            println!("\nUsage: mpflow run --strategy <name> --topology topology.json\n");
            Ok(())
        }
    }
}

fn run_single(
    topology_path: PathBuf,
    strategy: String,
    agents: u32,
    duration: u64,
    seed: Option<u64>,
    epsilon: f64,
    output: PathBuf,
    label: Option<String>,
) -> Result<()> {
    let topology = Topology::load(&topology_path)
        .with_context(|| format!("loading topology {}", topology_path.display()))?;
    let name = label.unwrap_or_else(|| format!("{strategy}_{agents}_agents"));

    let config = SimConfig {
        name: name.clone(),
        strategy_name: strategy.clone(),
        num_agents: agents,
        duration,
        seed,
        epsilon,
    };
    let mut sim = Simulator::new(topology, config)?;
    sim.run()?;

    std::fs::create_dir_all(&output)?;
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let csv_path = output.join(format!("results_{name}_{timestamp}.csv"));
    RecordLogger::new(&csv_path)?.log_all(sim.records())?;
    write_meta(
        &csv_path,
        &RunMeta {
            strategy: strategy.clone(),
            agents,
            duration,
            topology: topology_path.display().to_string(),
            experiment: name,
            seed,
        },
    )?;
    info!("Results saved to: {}", csv_path.display());

    let summary = analyzer::summarize(sim.records(), &strategy, agents);
    info!("Efficiency (mean throughput): {:.2}", summary.efficiency);
    info!("Mean loss: {:.2} Mbps", summary.loss);
    info!("Oscillation: {:.2}", summary.oscillation);
    info!("Fairness: {:.4}", summary.fairness);

    Ok(())
}

fn compare(
    topology_path: PathBuf,
    strategies: String,
    agent_counts: String,
    duration: u64,
    seed: u64,
    output: PathBuf,
    experiment: String,
) -> Result<()> {
    let topology = Topology::load(&topology_path)
        .with_context(|| format!("loading topology {}", topology_path.display()))?;

    // validate the whole grid before launching anything
    let kinds: Vec<StrategyKind> = strategies
        .split(',')
        .map(|s| s.trim().parse::<StrategyKind>())
        .collect::<Result<_, _>>()?;
    let counts: Vec<u32> = agent_counts
        .split(',')
        .map(|s| s.trim().parse::<u32>().context("bad agent count"))
        .collect::<Result<_>>()?;

    let combos: Vec<(StrategyKind, u32)> = kinds
        .iter()
        .flat_map(|&k| counts.iter().map(move |&n| (k, n)))
        .collect();

    info!("Sweep: {} runs ({} strategies x {} agent counts)", combos.len(), kinds.len(), counts.len());
    std::fs::create_dir_all(&output)?;
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();

    let pb = ProgressBar::new(combos.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );

    // independent runs: each gets its own Simulator, topology copy and
    // derived seed, so the sweep can fan out across threads
    let rows: Vec<SummaryRow> = combos
        .par_iter()
        .enumerate()
        .map(|(i, &(kind, agents))| -> Result<SummaryRow> {
            let name = format!("{experiment}_{kind}_{agents}_agents");
            let config = SimConfig {
                name: name.clone(),
                strategy_name: kind.name().to_string(),
                num_agents: agents,
                duration,
                seed: Some(seed.wrapping_add(i as u64)),
                epsilon: 0.1,
            };
            let mut sim = Simulator::new(topology.clone(), config)?;
            sim.run()?;

            let csv_path = output.join(format!("results_{name}_{timestamp}.csv"));
            RecordLogger::new(&csv_path)?.log_all(sim.records())?;
            write_meta(
                &csv_path,
                &RunMeta {
                    strategy: kind.name().to_string(),
                    agents,
                    duration,
                    topology: topology_path.display().to_string(),
                    experiment: experiment.clone(),
                    seed: Some(seed.wrapping_add(i as u64)),
                },
            )?;

            pb.set_message(format!("{kind} / {agents} agents"));
            pb.inc(1);
            Ok(analyzer::summarize(sim.records(), kind.name(), agents))
        })
        .collect::<Result<_>>()?;

    pb.finish_with_message("sweep complete");

    let summary_path = output.join(format!("summary_{experiment}_{timestamp}.csv"));
    analyzer::write_summary_csv(&rows, &summary_path)?;
    info!("Summary saved to: {}", summary_path.display());

    comparison_table(&rows);
    Ok(())
}

fn analyze(path: PathBuf) -> Result<()> {
    info!("Analyzing results in: {}", path.display());

    let mut rows = Vec::new();
    for entry in std::fs::read_dir(&path)? {
        let file = entry?.path();
        let is_csv = file.extension().and_then(|s| s.to_str()) == Some("csv");
        let is_summary = file
            .file_name()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.starts_with("summary_"));
        if !is_csv || is_summary {
            continue;
        }

        let records = read_records(&file)?;
        if records.is_empty() {
            continue;
        }

        let meta_path = file.with_extension("meta.json");
        let (strategy, agents) = if meta_path.exists() {
            let meta: RunMeta = serde_json::from_str(&std::fs::read_to_string(&meta_path)?)
                .with_context(|| format!("parsing {}", meta_path.display()))?;
            (meta.strategy, meta.agents)
        } else {
            ("unknown".to_string(), records[0].agents.len() as u32)
        };
        rows.push(analyzer::summarize(&records, &strategy, agents));
    }

    if rows.is_empty() {
        info!("No result logs found.");
        return Ok(());
    }
    rows.sort_by(|a, b| a.strategy.cmp(&b.strategy).then(a.agents.cmp(&b.agents)));
    comparison_table(&rows);
    Ok(())
}

fn init(output: PathBuf) -> Result<()> {
    // the three-path reference topology the experiments were designed around
    let config = TopologyConfig {
        paths: vec![
            NetPath::new("path_1", 100.0, 50.0).with_weight(100),
            NetPath::new("path_2", 200.0, 100.0).with_weight(200),
            NetPath::new("path_3", 80.0, 50.0)
                .with_attributes(vec![HIGH_COST_TAG.to_string()])
                .with_weight(80),
        ],
    };
    std::fs::write(&output, serde_json::to_string_pretty(&config)?)?;
    info!("Wrote example topology to: {}", output.display());
    Ok(())
}

fn write_meta(csv_path: &std::path::Path, meta: &RunMeta) -> Result<()> {
    let meta_path = csv_path.with_extension("meta.json");
    std::fs::write(&meta_path, serde_json::to_string_pretty(meta)?)?;
    Ok(())
}

fn comparison_table(rows: &[SummaryRow]) {
    println!("\n╔══════════════════════════════════════════════════════════════════════════════════════════╗");
    println!("║                                  STRATEGY COMPARISON                                       ║");
    println!("╠═══════════════════════╦════════╦═══════════╦══════════╦══════════╦═══════════╦════════════╣");
    println!("║ Strategy              ║ Agents ║ Efficiency║ Loss     ║ Osc.     ║ Stability ║ LossAvoid  ║");
    println!("╠═══════════════════════╬════════╬═══════════╬══════════╬══════════╬═══════════╬════════════╣");

    for row in rows {
        println!(
            "║ {:<21} ║ {:>6} ║ {:>9.2} ║ {:>8.2} ║ {:>8.2} ║ {:>9.4} ║ {:>10.4} ║",
            row.strategy,
            row.agents,
            row.efficiency,
            row.loss,
            row.oscillation,
            row.stability,
            row.loss_avoidance,
        );
    }

    println!("╚═══════════════════════╩════════╩═══════════╩══════════╩══════════╩═══════════╩════════════╝\n");

    if let Some(best) = rows.iter().max_by(|a, b| {
        a.efficiency.partial_cmp(&b.efficiency).unwrap_or(std::cmp::Ordering::Equal)
    }) {
        println!("Top efficiency: {} / {} agents ({:.2})", best.strategy, best.agents, best.efficiency);
    }
    if let Some(best) = rows.iter().min_by(|a, b| {
        a.loss.partial_cmp(&b.loss).unwrap_or(std::cmp::Ordering::Equal)
    }) {
        println!("Lowest loss: {} / {} agents ({:.2})", best.strategy, best.agents, best.loss);
    }
    if let Some(best) = rows.iter().max_by(|a, b| {
        a.stability.partial_cmp(&b.stability).unwrap_or(std::cmp::Ordering::Equal)
    }) {
        println!("Most stable: {} / {} agents ({:.4})", best.strategy, best.agents, best.stability);
    }
    println!();
}
