use clap::{Parser, Subcommand, ValueEnum};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use study_timer::{codec, store, Phase, TimerDefaults, TimerMode, TimerRanges, TimerSnapshot};

#[derive(Parser, Debug)]
#[command(name = "study-timer")]
#[command(about = "A study session timer: pomodoro intervals, stopwatch, and manual entry.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start (or resume) the timer in the current mode
    Start {
        /// Subject label to attach to the session
        #[arg(long)]
        subject: Option<String>,
    },
    /// Start and keep ticking in the foreground until the phase ends
    Run {
        #[arg(long)]
        subject: Option<String>,
    },
    /// Stop the timer, keeping the counters where they are
    Stop,
    /// Show the current timer state
    Status,
    /// Stop and zero the live counters for the current mode
    Reset,
    /// Switch timer mode
    Mode { mode: ModeArg },
    /// Change a configured value
    Set {
        #[command(subcommand)]
        field: SetField,
    },
    /// Nudge a configured value by whole steps (5-minute steps for phases)
    Adjust {
        field: AdjustField,
        /// Number of steps, negative to decrease
        #[arg(allow_negative_numbers = true)]
        steps: i64,
    },
    /// Remove the stored timer state entirely
    Clear,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Interval,
    Stopwatch,
    Manual,
}

impl From<ModeArg> for TimerMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Interval => TimerMode::Interval,
            ModeArg::Stopwatch => TimerMode::Stopwatch,
            ModeArg::Manual => TimerMode::Manual,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum AdjustField {
    Active,
    Rest,
    Sets,
}

#[derive(Subcommand, Debug)]
enum SetField {
    /// Focus-phase length in minutes
    Active { minutes: u32 },
    /// Break-phase length in minutes
    Rest { minutes: u32 },
    /// Number of focus/break sets
    Sets { count: u32 },
    /// Manually entered hours
    ManualHours { hours: u32 },
    /// Manually entered minutes
    ManualMinutes { minutes: u32 },
}

const PHASE_STEP_MINUTES: u32 = 5;

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

fn format_epoch_ms(ms: i64) -> String {
    let time = UNIX_EPOCH + Duration::from_millis(ms.max(0) as u64);
    let utc: chrono::DateTime<chrono::Utc> = time.into();
    utc.with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

fn format_mm_ss(seconds: u32) -> String {
    format!("{:02}m{:02}s", seconds / 60, seconds % 60)
}

fn describe(snapshot: &TimerSnapshot) {
    if !snapshot.selected_subject.is_empty() {
        println!("Subject: {}", snapshot.selected_subject);
    }
    match snapshot.mode {
        TimerMode::Interval => {
            println!(
                "Interval mode, set {}/{}, {} phase.",
                snapshot.current_set,
                snapshot.total_sets,
                if snapshot.phase == Phase::Active { "focus" } else { "break" },
            );
            println!(
                "Remaining: {} ({}%)",
                format_mm_ss(snapshot.remaining_seconds),
                (snapshot.remaining_ratio() * 100.0).round() as u32,
            );
            if snapshot.can_edit_config() {
                println!("Phase lengths may still be edited.");
            }
        }
        TimerMode::Stopwatch => {
            println!("Stopwatch mode. Elapsed: {}", format_mm_ss(snapshot.elapsed_seconds));
        }
        TimerMode::Manual => {
            println!(
                "Manual mode. Entered: {}h{:02}m",
                snapshot.manual_hours, snapshot.manual_minutes
            );
        }
    }
    match snapshot.anchor_epoch_ms {
        Some(anchor) => println!("Running since {}.", format_epoch_ms(anchor)),
        None => println!("Not running."),
    }
}

/// Rehydrate the stored state (if any) against the current wall clock.
fn load(now: i64, defaults: &TimerDefaults, ranges: &TimerRanges) -> Result<TimerSnapshot, store::StoreError> {
    let raw = store::load_raw()?;
    Ok(codec::rehydrate(raw.as_ref(), now, defaults, ranges))
}

fn run_loop(mut snapshot: TimerSnapshot, cancel: impl Fn() -> bool) -> Result<TimerSnapshot, store::StoreError> {
    loop {
        let now = now_ms();
        snapshot = snapshot.tick(now);
        store::save(&snapshot)?;

        if !snapshot.is_running {
            // the tick crossed a phase boundary and stopped the timer
            println!();
            println!(
                "Phase complete. Next up: {} ({}), set {}/{}.",
                if snapshot.phase == Phase::Active { "focus" } else { "break" },
                format_mm_ss(snapshot.remaining_seconds),
                snapshot.current_set,
                snapshot.total_sets,
            );
            return Ok(snapshot);
        }

        let line = match snapshot.mode {
            TimerMode::Interval => format!("Time remaining: {}", format_mm_ss(snapshot.remaining_seconds)),
            _ => format!("Elapsed: {}", format_mm_ss(snapshot.elapsed_seconds)),
        };
        print!("\r{line}");
        use std::io::Write as _;
        std::io::stdout().flush()?;

        if cancel() {
            println!();
            snapshot = snapshot.stop();
            store::save(&snapshot)?;
            println!("Stopped.");
            return Ok(snapshot);
        }
        std::thread::sleep(Duration::from_secs(1));
    }
}

fn main() {
    let defaults = TimerDefaults::default();
    let ranges = TimerRanges::default();
    let cli = Cli::parse();
    let now = now_ms();

    let result = (|| -> Result<(), store::StoreError> {
        let snapshot = load(now, &defaults, &ranges)?;
        match cli.command {
            Commands::Start { subject } => {
                let mut next = snapshot;
                if let Some(subject) = subject {
                    next = next.set_subject(&subject);
                }
                if next.mode == TimerMode::Manual {
                    println!("Manual mode has no running timer; use `set manual-hours/manual-minutes`.");
                } else {
                    next = next.start(now);
                }
                store::save(&next)?;
                describe(&next);
            }
            Commands::Run { subject } => {
                let mut next = snapshot;
                if let Some(subject) = subject {
                    next = next.set_subject(&subject);
                }
                if next.mode == TimerMode::Manual {
                    println!("Manual mode has no running timer; use `set manual-hours/manual-minutes`.");
                    store::save(&next)?;
                    return Ok(());
                }
                next = next.start(now);
                store::save(&next)?;
                println!("Press Ctrl+C to stop.");

                let cancel_flag = Arc::new(AtomicBool::new(false));
                {
                    let handler_flag = Arc::clone(&cancel_flag);
                    ctrlc::set_handler(move || {
                        handler_flag.store(true, Ordering::SeqCst);
                    })
                    .expect("failed to set Ctrl+C handler");
                }
                let loop_flag = Arc::clone(&cancel_flag);
                run_loop(next, move || loop_flag.load(Ordering::SeqCst))?;
            }
            Commands::Stop => {
                let next = snapshot.tick(now).stop();
                store::save(&next)?;
                describe(&next);
            }
            Commands::Status => {
                describe(&snapshot.tick(now));
            }
            Commands::Reset => {
                let next = snapshot.reset();
                store::save(&next)?;
                describe(&next);
            }
            Commands::Mode { mode } => {
                let next = snapshot.set_mode(mode.into());
                store::save(&next)?;
                describe(&next);
            }
            Commands::Set { field } => {
                let next = match field {
                    SetField::Active { minutes } => snapshot.set_active_minutes(f64::from(minutes)),
                    SetField::Rest { minutes } => snapshot.set_rest_minutes(f64::from(minutes)),
                    SetField::Sets { count } => snapshot.set_total_sets(count, &ranges),
                    SetField::ManualHours { hours } => snapshot.set_manual_hours(hours, &ranges),
                    SetField::ManualMinutes { minutes } => snapshot.set_manual_minutes(minutes, &ranges),
                };
                store::save(&next)?;
                describe(&next);
            }
            Commands::Adjust { field, steps } => {
                let next = match field {
                    AdjustField::Active => {
                        let minutes = study_timer::adjust_minutes_by_step(
                            snapshot.active_minutes,
                            steps,
                            PHASE_STEP_MINUTES,
                            ranges.active_minutes,
                        );
                        snapshot.set_active_minutes(f64::from(minutes))
                    }
                    AdjustField::Rest => {
                        let minutes = study_timer::adjust_minutes_by_step(
                            snapshot.rest_minutes,
                            steps,
                            PHASE_STEP_MINUTES,
                            ranges.rest_minutes,
                        );
                        snapshot.set_rest_minutes(f64::from(minutes))
                    }
                    AdjustField::Sets => {
                        let count = study_timer::values::adjust_by_step(
                            i64::from(snapshot.total_sets),
                            steps,
                            i64::from(ranges.sets.min),
                            i64::from(ranges.sets.max),
                        );
                        snapshot.set_total_sets(count as u32, &ranges)
                    }
                };
                store::save(&next)?;
                describe(&next);
            }
            Commands::Clear => {
                store::remove()?;
                println!("Cleared stored timer state.");
            }
        }
        Ok(())
    })();

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(2);
    }
}
