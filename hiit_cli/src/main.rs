use chrono::{DateTime, Duration, Utc};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use hiit_core::*;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;

#[derive(Parser)]
#[command(name = "hiit")]
#[command(about = "Interval workout timer (AMRAP, EMOM, TABATA, FOR TIME)", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a timer live in the terminal
    Run {
        #[command(flatten)]
        timer: TimerArgs,

        /// Interval between driver ticks in milliseconds
        #[arg(long, default_value_t = 200)]
        tick_ms: u64,
    },

    /// Drive a timer headlessly and print where it ends up
    Simulate {
        #[command(flatten)]
        timer: TimerArgs,

        /// Seconds of live ticking
        #[arg(long, default_value_t = 0)]
        ticks: u32,

        /// Seconds spent in the background after the ticks
        #[arg(long)]
        background: Option<u32>,

        /// Print the final state and events as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a mixed workout from a TOML file of [[timer]] entries
    Sequence {
        file: PathBuf,

        /// Interval between driver ticks in milliseconds
        #[arg(long, default_value_t = 200)]
        tick_ms: u64,
    },

    /// Validate a timer and show its structure
    Plan {
        #[command(flatten)]
        timer: TimerArgs,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Amrap,
    AmrapIntervals,
    Emom,
    Tabata,
    ForTime,
}

/// Mode and its parameters; anything left out comes from `[defaults]`
#[derive(Args)]
struct TimerArgs {
    #[arg(value_enum)]
    mode: ModeArg,

    #[arg(long)]
    rounds: Option<u32>,

    /// Work seconds (amrap-intervals, tabata)
    #[arg(long)]
    work: Option<u32>,

    /// Rest seconds (amrap-intervals, tabata, for-time)
    #[arg(long)]
    rest: Option<u32>,

    /// Interval seconds (emom)
    #[arg(long)]
    interval: Option<u32>,

    /// Workout length in minutes (amrap, amrap-intervals)
    #[arg(long)]
    minutes: Option<u32>,

    /// Keep the rest after the last TABATA round
    #[arg(long)]
    final_rest: bool,

    /// Override the countdown length in seconds
    #[arg(long)]
    countdown: Option<u32>,
}

impl TimerArgs {
    fn to_request(&self, defaults: &config::ModeDefaults) -> PlanRequest {
        match self.mode {
            ModeArg::Amrap => PlanRequest::Amrap {
                minutes: self.minutes.unwrap_or(defaults.amrap_minutes),
            },
            ModeArg::AmrapIntervals => PlanRequest::AmrapIntervals {
                work: self.work.unwrap_or(defaults.amrap_work),
                rest: self.rest.unwrap_or(defaults.amrap_rest),
                minutes: self.minutes,
            },
            ModeArg::Emom => PlanRequest::Emom {
                rounds: self.rounds.unwrap_or(defaults.emom_rounds),
                interval: self.interval.unwrap_or(defaults.emom_interval),
            },
            ModeArg::Tabata => PlanRequest::Tabata {
                rounds: self.rounds.unwrap_or(defaults.tabata_rounds),
                work: self.work.unwrap_or(defaults.tabata_work),
                rest: self.rest.unwrap_or(defaults.tabata_rest),
                final_rest: self.final_rest.then_some(true),
            },
            ModeArg::ForTime => PlanRequest::ForTime {
                rounds: self.rounds.unwrap_or(defaults.for_time_rounds),
                rest: self.rest.unwrap_or(defaults.for_time_rest),
            },
        }
    }

    fn to_plan(&self, config: &Config) -> Result<PhasePlan> {
        let mut config = config.clone();
        if let Some(seconds) = self.countdown {
            config.countdown.seconds = seconds;
            config.validate()?;
        }
        self.to_request(&config.defaults).into_plan(&config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    hiit_core::logging::init_with_level(hiit_core::logging::level_for_verbosity(cli.verbose));

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Run { timer, tick_ms } => {
            let plan = timer.to_plan(&config)?;
            cmd_run(Sequencer::from_plans([plan]), &config, tick_ms)
        }
        Commands::Simulate {
            timer,
            ticks,
            background,
            json,
        } => cmd_simulate(timer.to_plan(&config)?, ticks, background, json),
        Commands::Sequence { file, tick_ms } => {
            let sequencer = load_sequence(&file, &config)?;
            cmd_run(sequencer, &config, tick_ms)
        }
        Commands::Plan { timer, json } => cmd_plan(&timer.to_plan(&config)?, json),
    }
}

// ============================================================================
// plan / simulate
// ============================================================================

fn cmd_plan(plan: &PhasePlan, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(plan)
            .map_err(|e| Error::Other(format!("Failed to serialize plan: {}", e)))?;
        println!("{}", text);
        return Ok(());
    }

    println!("{}", plan.mode);
    for line in describe_plan(plan) {
        println!("  {}", line);
    }
    Ok(())
}

fn describe_plan(plan: &PhasePlan) -> Vec<String> {
    let mut lines = vec![format!("Countdown: {}", format_clock(plan.countdown_seconds))];

    match &plan.structure {
        Structure::FixedRounds {
            total_rounds,
            work,
            rest_seconds,
            skip_final_rest,
        } => {
            lines.push(format!("Rounds: {}", total_rounds));
            lines.push(match work {
                WorkClock::Descending { seconds } => format!("Work: {}", format_clock(*seconds)),
                WorkClock::Ascending { cap: Some(cap) } => {
                    format!("Work: counts up, capped at {}", format_clock(*cap))
                }
                WorkClock::Ascending { cap: None } => "Work: counts up until skipped".to_string(),
            });
            lines.push(match (*rest_seconds, *skip_final_rest) {
                (0, _) => "Rest: none".to_string(),
                (rest, true) => format!("Rest: {} (none after the last round)", format_clock(rest)),
                (rest, false) => format!("Rest: {}", format_clock(rest)),
            });
        }
        Structure::Amrap { total_seconds } => {
            lines.push(format!("Time cap: {}", format_clock(*total_seconds)));
        }
        Structure::AmrapIntervals {
            work_seconds,
            rest_seconds,
            total_seconds,
        } => {
            lines.push(format!("Work: {}", format_clock(*work_seconds)));
            lines.push(format!("Rest: {}", format_clock(*rest_seconds)));
            lines.push(match total_seconds {
                Some(total) => format!("Time cap: {}", format_clock(*total)),
                None => "Time cap: none".to_string(),
            });
        }
    }

    lines.push(match plan.total_duration() {
        Some(total) => format!("Total: {}", format_clock(total)),
        None => "Total: open-ended".to_string(),
    });
    lines
}

#[derive(Serialize)]
struct SimulationReport {
    mode: TimerMode,
    ticks: u32,
    background: Option<u32>,
    state: EngineState,
    events: Vec<TransitionEvent>,
}

fn cmd_simulate(plan: PhasePlan, ticks: u32, background: Option<u32>, json: bool) -> Result<()> {
    let mode = plan.mode;
    let mut engine = TimerEngine::new(plan);
    let start = Utc::now();
    engine.start(start)?;

    let mut events = Vec::new();
    for second in 1..=ticks {
        if !engine.is_running() {
            break;
        }
        events.extend(engine.tick(start + Duration::seconds(i64::from(second))));
    }
    if let Some(secs) = background {
        let anchor = engine.state().last_tick.unwrap_or(start);
        events.extend(engine.reconcile(secs, anchor + Duration::seconds(i64::from(secs))));
    }
    events.retain(TransitionEvent::is_structural);

    if json {
        let report = SimulationReport {
            mode,
            ticks,
            background,
            state: engine.snapshot(),
            events,
        };
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| Error::Other(format!("Failed to serialize report: {}", e)))?;
        println!("{}", text);
        return Ok(());
    }

    for event in &events {
        let offset = u32::try_from((event.at - start).num_seconds()).unwrap_or(0);
        println!("{:>7}  {}", format!("+{}", format_clock(offset)), describe_event(&event.kind));
    }
    println!("{}", status_line(mode, engine.state()));
    Ok(())
}

// ============================================================================
// run / sequence
// ============================================================================

#[derive(Deserialize)]
struct SequenceFile {
    #[serde(default)]
    timer: Vec<PlanRequest>,
}

fn load_sequence(path: &Path, config: &Config) -> Result<Sequencer> {
    let contents = std::fs::read_to_string(path)?;
    let file: SequenceFile = toml::from_str(&contents)?;

    let mut plans = Vec::with_capacity(file.timer.len());
    for (index, request) in file.timer.into_iter().enumerate() {
        let plan = request
            .into_plan(config)
            .map_err(|e| Error::InvalidInput(format!("timer {}: {}", index + 1, e)))?;
        plans.push(plan);
    }
    tracing::info!("Loaded {} timers from {:?}", plans.len(), path);
    Ok(Sequencer::from_plans(plans))
}

/// Wall clock that can be pushed ahead to stand in for time in the background
#[derive(Clone, Default)]
struct SkewedClock {
    wall: SystemClock,
    offset_secs: Rc<Cell<i64>>,
}

impl SkewedClock {
    fn skip_ahead(&self, secs: u32) {
        self.offset_secs.set(self.offset_secs.get() + i64::from(secs));
    }
}

impl Clock for SkewedClock {
    fn now(&self) -> DateTime<Utc> {
        self.wall.now() + Duration::seconds(self.offset_secs.get())
    }
}

/// Prints cues as text lines
struct TerminalSink;

impl CueSink for TerminalSink {
    fn play(&mut self, cue: Cue) {
        let text = match cue {
            Cue::CountdownBeep(n) => format!("{}...", n),
            Cue::FiveSecondsRemaining => "5 seconds".to_string(),
            Cue::Midpoint => "halfway".to_string(),
            Cue::MinuteMark => "another minute".to_string(),
            Cue::WorkoutComplete => "done!".to_string(),
        };
        println!("\r  \u{266a} {}", text);
    }
}

enum Command {
    TogglePause,
    Skip,
    Restart,
    Quit,
    Background(u32),
}

fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let command = match parts.next()? {
        "p" => Command::TogglePause,
        "n" => Command::Skip,
        "r" => Command::Restart,
        "q" => Command::Quit,
        "b" => Command::Background(parts.next()?.parse().ok()?),
        _ => return None,
    };
    Some(command)
}

fn spawn_input_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

type TerminalDriver = Driver<SkewedClock, TerminalSink>;

fn cmd_run(sequencer: Sequencer, config: &Config, tick_ms: u64) -> Result<()> {
    let clock = SkewedClock::default();
    let mut driver = Driver::new(
        clock.clone(),
        sequencer,
        TerminalSink,
        CueRules::from(&config.cues),
    );

    let total = driver.sequencer().len();
    driver.start()?;
    print_timer_header(&driver, 0, total);
    println!("Commands: p pause/resume, n skip, r restart, q quit, b <secs> background");

    let input = spawn_input_reader();
    let interval = std::time::Duration::from_millis(tick_ms.max(1));
    let mut input_open = true;

    loop {
        let line = if input_open {
            match input.recv_timeout(interval) {
                Ok(line) => Some(line),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::debug!("stdin closed, running without commands");
                    input_open = false;
                    None
                }
            }
        } else {
            thread::sleep(interval);
            None
        };

        if let Some(line) = line {
            match parse_command(&line) {
                Some(Command::Quit) => {
                    println!("\nStopped.");
                    break;
                }
                Some(Command::TogglePause) => {
                    driver.toggle_pause();
                    println!("\r{}", if driver.is_paused() { "Paused" } else { "Resumed" });
                }
                Some(Command::Skip) => {
                    let output = driver.skip()?;
                    report(&driver, &output, total);
                }
                Some(Command::Restart) => {
                    driver.reset();
                    driver.start()?;
                    println!("\rRestarted");
                    print_timer_header(&driver, 0, total);
                }
                Some(Command::Background(secs)) => {
                    driver.enter_background();
                    clock.skip_ahead(secs);
                    let output = driver.enter_foreground()?;
                    println!("\rBack after {}s in the background", secs);
                    report(&driver, &output, total);
                }
                None if line.trim().is_empty() => {}
                None => eprintln!("Unknown command: {:?}", line.trim()),
            }
        }

        if !driver.is_finished() {
            let output = driver.on_interval()?;
            report(&driver, &output, total);
        }

        if driver.is_finished() {
            println!("\nWorkout complete!");
            break;
        }
    }

    driver.shutdown();
    Ok(())
}

fn print_timer_header(driver: &TerminalDriver, index: usize, total: usize) {
    if let Some(item) = driver.sequencer().items().get(index) {
        if total > 1 {
            println!("Timer {}/{}: {}", index + 1, total, item.plan.mode);
        } else {
            println!("{}", item.plan.mode);
        }
        for line in describe_plan(&item.plan) {
            println!("  {}", line);
        }
    }
}

fn report(driver: &TerminalDriver, output: &DriverOutput, total: usize) {
    for event in output.events.iter().filter(|e| e.is_structural()) {
        println!("\r{:<48}", describe_event(&event.kind));
    }

    if let Some(SequenceStep::Started { index, .. }) = output.step {
        print_timer_header(driver, index, total);
    }

    let ticked = output.events.iter().any(|e| !e.is_structural());
    if ticked && !driver.is_finished() {
        if let (Some(item), Some(state)) = (driver.sequencer().current_item(), driver.snapshot()) {
            print!("\r{:<48}", status_line(item.plan.mode, &state));
            let _ = io::stdout().flush();
        }
    }
}

// ============================================================================
// Display helpers
// ============================================================================

fn describe_event(kind: &EventKind) -> String {
    match kind {
        EventKind::PhaseBoundary { from, to } => format!("{:?} -> {:?}", from, to),
        EventKind::RoundAdvanced { round } => format!("Round {}", round),
        EventKind::Completed => "Complete".to_string(),
        EventKind::TickOneSecond {
            phase, elapsed, ..
        } => format!("{:?} {}s", phase, elapsed),
    }
}

fn status_line(mode: TimerMode, state: &EngineState) -> String {
    let rounds = match state.total_rounds {
        Some(total) => format!("round {}/{}", state.round, total),
        None => format!("round {}", state.round),
    };
    let mut line = format!(
        "{}  {:<5} {}  {}",
        mode,
        state.phase.to_string(),
        rounds,
        format_clock(state.display_seconds())
    );
    if state.paused {
        line.push_str("  (paused)");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skewed_clock_runs_ahead_of_wall_clock() {
        let clock = SkewedClock::default();
        let handle = clock.clone();
        handle.skip_ahead(90);

        let before = SystemClock.now();
        let skewed = clock.now();
        let after = SystemClock.now();
        assert!(skewed >= before + Duration::seconds(90));
        assert!(skewed <= after + Duration::seconds(90));
    }
}
