//! Demo game: the engine plays the evader against greedy pursuers.
//!
//! The evader's move each turn is whatever plan the turn timer harvests.
//! Pursuers head for the evader's last revealed location along the shortest
//! route their tickets allow.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use pursuit::{
    apply_move, Engine, EngineConfig, GameState, Location, Move, PageRank, Reroot, Role,
    RouteOracle, Rules, ScenarioConfig, SearchSession, StandardRules, TicketRouteFinder,
    TurnScheduler,
};

const DEMO_SCENARIO: &str = include_str!("../demos/scenario.toml");

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Engine settings (TOML); built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scenario to play (TOML); the built-in demo board when omitted
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Number of evader turns to play
    #[arg(short, long, default_value_t = 6)]
    turns: u32,

    /// Thinking time per evader turn in milliseconds
    #[arg(long)]
    turn_ms: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() {
    let args = Args::parse();
    init_logging(args.debug);

    if let Err(e) = run(&args) {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, level),
    )
    .format(|buf, record| {
        writeln!(buf, "[{}] {}: {}", record.level(), record.target(), record.args())
    })
    .target(env_logger::Target::Stderr)
    .init();
}

/// Live session plus the timer reading its plans
type Evader = (SearchSession, TurnScheduler);

fn run(args: &Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => {
            EngineConfig::load(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => EngineConfig::default(),
    }
    .apply_env_overrides();
    if let Some(ms) = args.turn_ms {
        config.scheduler.turn_time_ms = ms;
    }

    let scenario = match &args.scenario {
        Some(path) => {
            ScenarioConfig::load(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => ScenarioConfig::from_toml_str(DEMO_SCENARIO).context("parsing built-in scenario")?,
    }
    .build()
    .context("building scenario")?;

    let rules = Arc::new(scenario.rules);
    let routes = Arc::new(TicketRouteFinder::new(Arc::clone(&scenario.board)));
    let engine = Engine::new(
        rules.clone(),
        routes.clone(),
        Arc::new(PageRank::new(&scenario.board)),
        &config,
    );
    info!(
        "{} locations, {} pursuers, {} ms per turn, max depth {:?}",
        scenario.board.node_count(),
        scenario.state.pursuers().len(),
        config.scheduler.turn_time_ms,
        config.search.max_depth
    );

    let mut state = scenario.state;
    let mut mover = Role::Evader;
    let mut last_seen = state.evader().location;
    let mut evader: Option<Evader> = None;
    let mut turns = 0;

    loop {
        let winners = rules.winners(&state, mover, state.round());
        if !winners.is_empty() {
            let names: Vec<String> = winners.iter().map(Role::to_string).collect();
            println!("game over after round {}: {} won", state.round(), names.join(", "));
            break;
        }

        let mv = if mover.is_evader() {
            if turns == args.turns {
                break;
            }
            turns += 1;
            evader_move(&engine, &mut evader, &state, &config, rules.as_ref())?
        } else {
            chase(rules.as_ref(), routes.as_ref(), &state, mover, last_seen)
        };

        let round = state.round();
        state = apply_move(&state, &mv).with_context(|| format!("applying {mv}"))?;
        if mover.is_evader() {
            if rules.is_reveal_round(round) {
                last_seen = state.evader().location;
                println!("round {:>2}: {mv} (revealed)", round + 1);
            } else {
                println!("round {:>2}: {mv}", round + 1);
            }
        } else {
            println!("          {mv}");
        }

        if let Some((session, _)) = &evader {
            if session.confirm_move(&mv) == Reroot::RebuildRequired {
                evader = None;
            }
        }
        mover = state.next_mover(mover);
    }

    if let Some((session, scheduler)) = evader {
        scheduler.shutdown();
        session.join();
    }
    Ok(())
}

/// Wait one turn for the engine's plan and take its first move.
fn evader_move(
    engine: &Engine,
    evader: &mut Option<Evader>,
    state: &GameState,
    config: &EngineConfig,
    rules: &StandardRules,
) -> Result<Move> {
    let (session, scheduler) = match evader.take() {
        Some(live) => live,
        None => {
            let session = engine.start_session(state.clone(), Role::Evader, state.round())?;
            let scheduler = TurnScheduler::new(session.plan_handle(), config.scheduler.turn_time());
            (session, scheduler)
        }
    };

    scheduler.start_turn();
    let decision = scheduler
        .decisions()
        .recv()
        .context("turn timer stopped unexpectedly")?;

    let legal = state
        .agent(Role::Evader)
        .map(|agent| rules.legal_moves(agent, state))
        .unwrap_or_default();
    let mv = match decision.plan.first() {
        Some(mv) if legal.contains(mv) => *mv,
        planned => {
            if planned.is_some() {
                warn!("planned move is not legal here, falling back");
            } else {
                warn!("no plan after {} ms, falling back", scheduler.interval().as_millis());
            }
            legal.first().copied().unwrap_or(Move::Pass(Role::Evader))
        }
    };
    info!(
        "turn {}: {mv} from a depth-{} plan (score {:.4})",
        decision.turn, decision.plan.depth, decision.plan.score
    );

    *evader = Some((session, scheduler));
    Ok(mv)
}

/// Move that brings `role` closest to `target` within its own tickets.
fn chase(
    rules: &StandardRules,
    routes: &dyn RouteOracle,
    state: &GameState,
    role: Role,
    target: Location,
) -> Move {
    let Some(agent) = state.agent(role) else {
        return Move::Pass(role);
    };
    let budget = agent.tickets.route_budget();
    rules
        .legal_moves(agent, state)
        .into_iter()
        .filter_map(|mv| {
            let to = mv.destination()?;
            let distance = routes.shortest_path_length(to, target, &budget).unwrap_or(u32::MAX);
            Some((distance, mv))
        })
        .min_by_key(|(distance, _)| *distance)
        .map_or(Move::Pass(role), |(_, mv)| mv)
}
