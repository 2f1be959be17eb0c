use chrono::{SecondsFormat, Utc};
use clap::Parser;
use pacman_arcade_server::autopilot;
use pacman_arcade_server::constants::{START_LIVES, TICK_MS, TILE};
use pacman_arcade_server::engine::{GameEngine, GameEngineOptions};
use pacman_arcade_server::error::EngineError;
use pacman_arcade_server::rng::Rng;
use pacman_arcade_server::types::{RunPhase, RunSummary, Snapshot};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Runs seeded autopilot games without a client")]
struct Cli {
    #[arg(long, default_value_t = 1)]
    runs: u32,
    /// First seed; run `i` uses `seed + i`.
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long, default_value_t = TICK_MS)]
    frame_ms: u64,
    #[arg(long, default_value_t = 60 * 60 * 20)]
    max_frames: u64,
    #[arg(long, default_value = "AUTOPILOT")]
    name: String,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug)]
struct RunParams {
    frame_ms: u64,
    max_frames: u64,
    name: String,
}

#[derive(Clone, Debug, Serialize)]
struct RunResultLine {
    seed: u32,
    #[serde(flatten)]
    summary: RunSummary,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct SimulationSummary {
    #[serde(rename = "startedAt")]
    started_at: String,
    #[serde(rename = "finishedAt")]
    finished_at: String,
    #[serde(rename = "runCount")]
    run_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageScore")]
    average_score: u64,
    #[serde(rename = "bestScore")]
    best_score: u32,
    #[serde(rename = "phaseCounts")]
    phase_counts: BTreeMap<String, usize>,
    runs: Vec<RunResultLine>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let base_seed = cli.seed.unwrap_or_else(Rng::random_seed);
    let params = RunParams {
        frame_ms: cli.frame_ms.max(1),
        max_frames: cli.max_frames,
        name: cli.name.clone(),
    };
    let started_at = now_iso();
    let mut results = Vec::new();

    for offset in 0..cli.runs {
        let seed = base_seed.wrapping_add(offset);
        info!(seed, "run started");
        let result = match run_once(seed, &params) {
            Ok(result) => result,
            Err(err) => {
                error!(seed, error = %err, "run could not start");
                std::process::exit(2);
            }
        };
        info!(
            seed,
            phase = ?result.summary.phase,
            score = result.summary.score,
            level = result.summary.level_reached,
            anomalies = result.anomalies.len(),
            "run finished"
        );
        match serde_json::to_string(&result) {
            Ok(line) => println!("{line}"),
            Err(err) => error!(seed, error = %err, "run result did not serialize"),
        }
        results.push(result);
    }

    let summary = build_summary(started_at, now_iso(), results);
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(err) = write_summary(path, &summary) {
            error!(path = %path.display(), error = %err, "summary write failed");
            std::process::exit(2);
        }
        info!(path = %path.display(), "summary written");
    }

    if summary.anomaly_count > 0 {
        std::process::exit(1);
    }
}

fn run_once(seed: u32, params: &RunParams) -> Result<RunResultLine, EngineError> {
    let mut engine = GameEngine::new(GameEngineOptions {
        seed,
        ..GameEngineOptions::default()
    })?;
    engine.start_run(&params.name)?;

    let mut anomalies = Vec::new();
    let mut seen = HashSet::new();
    let mut previous_score = 0;
    let mut steps = 0u64;

    while !engine.is_ended() {
        if steps >= params.max_frames {
            push_anomaly(
                &mut anomalies,
                &mut seen,
                steps,
                "frame limit reached".to_string(),
            );
            break;
        }
        engine.receive_input(autopilot::choose_direction(&engine));
        engine.step(params.frame_ms);
        steps += 1;

        let snapshot = engine.build_snapshot(true);
        for message in collect_snapshot_anomalies(&snapshot, previous_score) {
            push_anomaly(&mut anomalies, &mut seen, snapshot.tick, message);
        }
        previous_score = snapshot.score;
    }

    Ok(RunResultLine {
        seed,
        summary: engine.build_summary(),
        anomalies,
    })
}

fn collect_snapshot_anomalies(snapshot: &Snapshot, previous_score: u32) -> Vec<String> {
    let mut anomalies = Vec::new();
    if snapshot.score < previous_score {
        anomalies.push(format!(
            "score decreased: {previous_score} -> {}",
            snapshot.score
        ));
    }
    if snapshot.lives > START_LIVES {
        anomalies.push(format!("lives above start: {}", snapshot.lives));
    }
    let dots = snapshot
        .tiles
        .iter()
        .map(|row| row.chars().filter(|ch| *ch == '.').count())
        .sum::<usize>();
    if dots != snapshot.dots_remaining as usize {
        anomalies.push(format!(
            "dots remaining {} but {dots} on the grid",
            snapshot.dots_remaining
        ));
    }
    if is_wall_at(&snapshot.tiles, snapshot.player.x, snapshot.player.y) {
        anomalies.push("player inside a wall".to_string());
    }
    for ghost in snapshot.ghosts.iter().filter(|ghost| !ghost.eaten) {
        if is_wall_at(&snapshot.tiles, ghost.x, ghost.y) {
            anomalies.push(format!("ghost {} inside a wall", ghost.name));
        }
    }
    anomalies
}

fn is_wall_at(tiles: &[String], x: f32, y: f32) -> bool {
    let col = (x / TILE).floor();
    let row = (y / TILE).floor();
    if col < 0.0 || row < 0.0 {
        return false;
    }
    tiles
        .get(row as usize)
        .and_then(|line| line.chars().nth(col as usize))
        == Some('#')
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    warn!(tick, %message, "anomaly detected");
    if seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn phase_key(phase: RunPhase) -> String {
    format!("{phase:?}").to_lowercase()
}

fn build_summary(
    started_at: String,
    finished_at: String,
    runs: Vec<RunResultLine>,
) -> SimulationSummary {
    let run_count = runs.len();
    let total_score: u64 = runs.iter().map(|run| u64::from(run.summary.score)).sum();
    let average_score = if run_count == 0 {
        0
    } else {
        total_score / run_count as u64
    };
    let best_score = runs.iter().map(|run| run.summary.score).max().unwrap_or(0);
    let anomaly_count = runs.iter().map(|run| run.anomalies.len()).sum();
    let mut phase_counts = BTreeMap::new();
    for run in &runs {
        *phase_counts.entry(phase_key(run.summary.phase)).or_insert(0) += 1;
    }
    SimulationSummary {
        started_at,
        finished_at,
        run_count,
        anomaly_count,
        average_score,
        best_score,
        phase_counts,
        runs,
    }
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn write_summary(path: &Path, summary: &SimulationSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, summary_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(max_frames: u64) -> RunParams {
        RunParams {
            frame_ms: TICK_MS,
            max_frames,
            name: "BOT".to_string(),
        }
    }

    fn make_result(score: u32, phase: RunPhase) -> RunResultLine {
        RunResultLine {
            seed: 1,
            summary: RunSummary {
                phase,
                score,
                level_reached: 1,
                lives: 0,
                frames: 100,
                ghosts_eaten: 0,
                lives_lost: 3,
            },
            anomalies: Vec::new(),
        }
    }

    #[test]
    fn summary_averages_scores_and_counts_phases() {
        let summary = build_summary(
            "a".to_string(),
            "b".to_string(),
            vec![
                make_result(1_000, RunPhase::GameOver),
                make_result(3_000, RunPhase::GameOver),
                make_result(20_000, RunPhase::Prize),
            ],
        );
        assert_eq!(summary.run_count, 3);
        assert_eq!(summary.average_score, 8_000);
        assert_eq!(summary.best_score, 20_000);
        assert_eq!(summary.phase_counts.get("gameover"), Some(&2));
        assert_eq!(summary.phase_counts.get("prize"), Some(&1));
    }

    #[test]
    fn write_summary_returns_error_when_parent_does_not_exist() {
        let target = std::env::temp_dir()
            .join(format!("pacman-missing-{}", rand::random::<u64>()))
            .join("summary.json");
        let summary = build_summary("a".to_string(), "b".to_string(), Vec::new());
        assert!(write_summary(&target, &summary).is_err());
    }

    #[test]
    fn push_anomaly_deduplicates_messages() {
        let mut anomalies = Vec::new();
        let mut seen = HashSet::new();
        push_anomaly(&mut anomalies, &mut seen, 10, "same anomaly".to_string());
        push_anomaly(&mut anomalies, &mut seen, 11, "same anomaly".to_string());
        assert_eq!(anomalies, vec!["same anomaly".to_string()]);
    }

    #[test]
    fn same_seed_gives_the_same_run() {
        let first = run_once(9, &params(900)).expect("run");
        let second = run_once(9, &params(900)).expect("run");
        assert_eq!(first.summary.score, second.summary.score);
        assert_eq!(first.summary.frames, second.summary.frames);
        assert_eq!(first.summary.lives, second.summary.lives);
    }

    #[test]
    fn autopilot_scores_without_anomalies() {
        let result = run_once(4, &params(900)).expect("run");
        assert!(result.summary.score > 0);
        assert!(result
            .anomalies
            .iter()
            .all(|message| message == "frame limit reached"));
    }

    #[test]
    fn fresh_snapshot_has_no_anomalies() {
        let mut engine = GameEngine::new(GameEngineOptions::default()).expect("engine");
        engine.start_run("BOT").expect("start");
        let snapshot = engine.build_snapshot(true);
        assert!(collect_snapshot_anomalies(&snapshot, 0).is_empty());
    }
}
