use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pairing_engine::calculate::compute_standings;
use pairing_engine::config::AppConfig;
use pairing_engine::constraints::ConstraintTracker;
use pairing_engine::export::{export_round, RoundExport};
use pairing_engine::lock::RoundLedger;
use pairing_engine::models::{CompetitorId, ResultRecord, TournamentSnapshot};
use pairing_engine::pairing::{PairingEngine, PairingStrategy};
use pairing_engine::parse_pair;
use pairing_engine::schedule::{GroupPhaseScheduler, RoundRobinSchedule};
use pairing_engine::storage::{list_tournaments, StorageConfig, TournamentStore};

#[derive(Parser)]
#[command(name = "pairing-engine")]
#[command(about = "Standings and pairings for Swiss, round-robin and group tournaments")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Tournament id (overrides the config file)
    #[arg(long)]
    tournament: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show standings going into a round
    Standings {
        /// Round to rank for (default: next unpaired round)
        #[arg(long)]
        round: Option<u32>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Preview (and optionally confirm) pairings for a round
    Pair {
        /// Round to pair (default: next unpaired round)
        #[arg(long)]
        round: Option<u32>,

        /// Strategy override (swiss, fonte-swiss, king-of-the-hill, round-robin, manual)
        #[arg(long)]
        strategy: Option<String>,

        /// Manual pair as "name-or-id:name-or-id"; repeat for every table
        #[arg(long = "pair")]
        pairs: Vec<String>,

        /// Persist and lock the pairings
        #[arg(long)]
        confirm: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Record a result for one table
    Record {
        #[arg(long)]
        round: u32,

        #[arg(long)]
        table: u32,

        #[arg(long)]
        score1: i32,

        #[arg(long)]
        score2: i32,
    },

    /// Unlock the most recent round so it can be re-paired
    Unlock {
        #[arg(long)]
        round: u32,
    },

    /// Export a paired round as JSON rows
    Export {
        #[arg(long)]
        round: u32,
    },

    /// List tournaments in the data directory
    List,

    /// Print a standalone round-robin schedule
    Schedule {
        /// Entity names, in seed order
        names: Vec<String>,
    },

    /// Two-phase group format
    Groups {
        #[command(subcommand)]
        action: GroupAction,
    },
}

#[derive(Subcommand)]
enum GroupAction {
    /// Draw the phase-1 groups
    Init {
        /// Seed for the draw (default: config seed, else random)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Pair a group-format round
    Pair {
        #[arg(long)]
        round: Option<u32>,

        /// Seed for the cross-group matching
        #[arg(long)]
        seed: Option<u64>,

        /// Persist and lock the pairings
        #[arg(long)]
        confirm: bool,
    },

    /// Close phase 1 and regroup by phase-1 rank
    Transition {
        /// Last completed round (default: most recent paired round)
        #[arg(long)]
        completed_round: Option<u32>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = if cli.config.exists() {
        AppConfig::from_file(&cli.config)
            .with_context(|| format!("Failed to load config from {:?}", cli.config))?
    } else {
        AppConfig::default()
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(id) = &cli.tournament {
        config.tournament.id = id.clone();
    }

    // Initialize tracing
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting pairing-engine v{}", env!("CARGO_PKG_VERSION"));

    let store = TournamentStore::new(StorageConfig::new(config.data_dir.clone()), &config.tournament.id)?;

    match cli.command {
        Commands::Standings { round, json } => {
            let snapshot = store.load_snapshot()?;
            let round = round.unwrap_or_else(|| RoundLedger::from_snapshot(&snapshot).next_round());
            let standings = compute_standings(&snapshot, round, config.tournament.total_rounds);

            if json {
                println!("{}", serde_json::to_string_pretty(&standings)?);
            } else {
                println!("=== Standings before round {} ===", round);
                println!(
                    "{:>4}  {:<24} {:>6}  {:>8}  {:>6}  {:>7}  {:>6}",
                    "Rank", "Name", "Rating", "W-L-D", "Points", "Spread", "Starts"
                );
                for r in &standings {
                    println!(
                        "{:>4}  {:<24} {:>6}  {:>8}  {:>6.1}  {:>+7}  {:>6}{}",
                        r.rank,
                        r.competitor.name,
                        r.competitor.rating,
                        format!("{}-{}-{}", r.record.wins, r.record.losses, r.record.draws),
                        r.points,
                        r.spread,
                        r.prior_starts,
                        if r.clinched { "  (clinched)" } else { "" }
                    );
                }
            }
        }

        Commands::Pair {
            round,
            strategy,
            pairs,
            confirm,
            json,
        } => {
            let snapshot = store.load_snapshot()?;
            let ledger = RoundLedger::from_snapshot(&snapshot);
            let round = round.unwrap_or_else(|| ledger.next_round());
            ledger.ensure_can_generate(round)?;

            let strategy = match strategy {
                Some(s) => s.parse::<PairingStrategy>()?,
                None => config.tournament.strategy,
            };
            let manual = pairs
                .iter()
                .map(|p| -> Result<(CompetitorId, CompetitorId)> {
                    let (left, right) = parse_pair(p)
                        .with_context(|| format!("Manual pair {:?} is not of the form a:b", p))?;
                    Ok((resolve(&snapshot, &left)?, resolve(&snapshot, &right)?))
                })
                .collect::<Result<Vec<_>>>()?;
            if strategy == PairingStrategy::Manual && manual.is_empty() {
                bail!("The manual strategy needs at least one --pair");
            }

            let standings = compute_standings(&snapshot, round, config.tournament.total_rounds);
            let tracker = ConstraintTracker::from_snapshot(&snapshot, round);
            let engine = PairingEngine::new(strategy, config.tournament.rules()).with_manual_pairs(manual);
            let outcome = engine.generate(round, &standings, &tracker)?;

            let export = export_round(round, &outcome.matchups, outcome.bye.as_ref(), &standings, Utc::now());
            print_export(&export, json)?;

            if confirm {
                let mut updated = snapshot.clone();
                updated.matchups.retain(|m| m.round != round);
                updated.byes.retain(|b| b.round != round);
                updated.record_round(&outcome.matchups, outcome.bye.as_ref());
                RoundLedger::from_snapshot(&updated).ensure_can_lock(round)?;

                store.save_round(round, &outcome.matchups, outcome.bye.as_ref())?;
                store.lock_round(round)?;
                println!("\nRound {} confirmed and locked.", round);
            } else {
                println!("\n(preview only - pass --confirm to persist and lock)");
            }
        }

        Commands::Record {
            round,
            table,
            score1,
            score2,
        } => {
            let snapshot = store.load_snapshot()?;
            let matchup = snapshot
                .matchups_in(round)
                .find(|m| m.table == table)
                .with_context(|| format!("Round {} has no table {}", round, table))?;
            if snapshot.results.iter().any(|r| r.matchup_id == matchup.id) {
                bail!("Table {} of round {} already has a result", table, round);
            }

            store.append_results(&[ResultRecord::new(matchup.id.clone(), score1, score2)])?;
            println!("Recorded round {} table {}: {}-{}", round, table, score1, score2);
        }

        Commands::Unlock { round } => {
            let snapshot = store.load_snapshot()?;
            RoundLedger::from_snapshot(&snapshot).ensure_can_unlock(round)?;
            store.unlock_round(round)?;
            println!("Round {} unlocked.", round);
        }

        Commands::Export { round } => {
            let snapshot = store.load_snapshot()?;
            let standings = compute_standings(&snapshot, round, config.tournament.total_rounds);
            let matchups: Vec<_> = snapshot.matchups_in(round).cloned().collect();
            if matchups.is_empty() {
                bail!("Round {} has no pairings", round);
            }
            let bye = snapshot.byes.iter().find(|b| b.round == round);
            let export = export_round(round, &matchups, bye, &standings, Utc::now());
            print_export(&export, true)?;
        }

        Commands::List => {
            for id in list_tournaments(&StorageConfig::new(config.data_dir.clone()))? {
                println!("{}", id);
            }
        }

        Commands::Schedule { names } => {
            let schedule = RoundRobinSchedule::new(names)?;
            for round in schedule.all_rounds() {
                println!("Round {}", round.round);
                for f in &round.fixtures {
                    println!("  {} vs {}", f.home, f.away);
                }
                if let Some(rest) = &round.bye {
                    println!("  bye: {}", rest);
                }
            }
        }

        Commands::Groups { action } => {
            let format = config
                .group_format
                .context("No [group_format] section in the configuration")?;
            let attempts = config.tournament.max_shuffle_attempts;

            match action {
                GroupAction::Init { seed } => {
                    let snapshot = store.load_snapshot()?;
                    if !store.group_assignments()?.is_empty() {
                        bail!("Groups are already drawn for {}", store.tournament_id());
                    }
                    let teams: Vec<String> = snapshot
                        .active_competitors()
                        .filter_map(|c| c.team.clone())
                        .collect::<std::collections::BTreeSet<_>>()
                        .into_iter()
                        .collect();

                    let mut rng = seeded_rng(seed.or(config.tournament.seed));
                    let scheduler = GroupPhaseScheduler::initialize(format, teams, &mut rng)?
                        .with_max_shuffle_attempts(attempts);
                    store.save_group_assignments(scheduler.assignments())?;

                    for (group, members) in scheduler.groups() {
                        println!("Group {}: {}", group, members.join(", "));
                    }
                }

                GroupAction::Pair {
                    round,
                    seed,
                    confirm,
                } => {
                    let snapshot = store.load_snapshot()?;
                    let ledger = RoundLedger::from_snapshot(&snapshot);
                    let round = round.unwrap_or_else(|| ledger.next_round());
                    ledger.ensure_can_generate(round)?;

                    let scheduler = GroupPhaseScheduler::from_assignments(format, store.group_assignments()?)?
                        .with_max_shuffle_attempts(attempts);
                    let mut rng = seeded_rng(seed.or(config.tournament.seed));
                    let group_round = scheduler.generate_round(round, &snapshot, &mut rng)?;

                    println!("=== Round {} ({}) ===", round, group_round.phase);
                    for m in &group_round.matchups {
                        println!("Match {}: {} vs {}", m.table, m.team1, m.team2);
                        for board in &m.boards {
                            println!(
                                "  table {:>3}: {} vs {} (first move: {})",
                                board.table,
                                name_of(&snapshot, &board.player1),
                                name_of(&snapshot, &board.player2),
                                name_of(&snapshot, &board.first_move)
                            );
                        }
                    }
                    for team in &group_round.byes {
                        println!("Resting: {}", team);
                    }

                    if confirm {
                        let boards = group_round.board_matchups();
                        let mut updated = snapshot.clone();
                        updated.matchups.retain(|m| m.round != round);
                        updated.record_round(&boards, None);
                        RoundLedger::from_snapshot(&updated).ensure_can_lock(round)?;

                        store.save_round(round, &boards, None)?;
                        store.lock_round(round)?;
                        println!("\nRound {} confirmed and locked.", round);
                    }
                }

                GroupAction::Transition { completed_round } => {
                    let snapshot = store.load_snapshot()?;
                    let completed = completed_round
                        .or_else(|| RoundLedger::from_snapshot(&snapshot).latest_paired())
                        .unwrap_or(0);

                    let scheduler = GroupPhaseScheduler::from_assignments(format, store.group_assignments()?)?;
                    let phase2 = scheduler.transition(completed, &snapshot)?;
                    store.save_group_assignments(phase2.assignments())?;

                    for (group, members) in phase2.groups() {
                        println!("Group {}: {}", group, members.join(", "));
                    }
                }
            }
        }
    }

    Ok(())
}

/// Seeded RNG; a fresh seed is drawn and logged so the run can be replayed.
fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    let seed = seed.unwrap_or_else(rand::random);
    tracing::info!("Using shuffle seed {}", seed);
    ChaCha8Rng::seed_from_u64(seed)
}

/// Find a competitor by ID or exact name.
fn resolve(snapshot: &TournamentSnapshot, token: &str) -> Result<CompetitorId> {
    snapshot
        .competitors
        .iter()
        .find(|c| c.id.as_str() == token || c.name == token)
        .map(|c| c.id.clone())
        .with_context(|| format!("No competitor named {:?}", token))
}

fn name_of(snapshot: &TournamentSnapshot, id: &CompetitorId) -> String {
    snapshot
        .competitor(id)
        .map_or_else(|| id.to_string(), |c| c.name.clone())
}

fn print_export(export: &RoundExport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(export)?);
        return Ok(());
    }

    println!("=== Round {} ===", export.round);
    for row in &export.rows {
        println!(
            "Table {:>3}: {} ({}, #{}) vs {} ({}, #{})  first move: {}",
            row.table,
            row.player1_name,
            row.player1_rating,
            row.player1_rank.map_or_else(|| "-".to_string(), |r| r.to_string()),
            row.player2_name,
            row.player2_rating,
            row.player2_rank.map_or_else(|| "-".to_string(), |r| r.to_string()),
            row.first_move_name
        );
    }
    if let Some(bye) = &export.bye {
        println!("Bye: {}", bye);
    }
    Ok(())
}
