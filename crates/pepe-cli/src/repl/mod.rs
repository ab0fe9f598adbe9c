//! Live session REPL.
//!
//! Reads commands with rustyline and forwards them to the runner use case.
//! A background task prints a status line whenever the session moves to a
//! new step or phase, including moves made by the clock.

mod command;

use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use pepe_application::{RunnerSnapshot, WorkoutRunnerUseCase};
use pepe_core::session::{RunnerPhase, SetInputField};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

pub use command::ReplCommand;
use command::{COMMANDS, HELP};

/// rustyline helper completing and hinting session commands.
#[derive(Clone)]
struct SessionHelper;

impl Helper for SessionHelper {}

impl Completer for SessionHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if line.contains(' ') {
            return Ok((0, vec![]));
        }
        let candidates = COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for SessionHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        match line.split_whitespace().next() {
            Some(head) if COMMANDS.contains(&head) => Owned(line.bright_cyan().to_string()),
            _ => Borrowed(line),
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for SessionHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.len() < 2 || line.contains(' ') {
            return None;
        }
        COMMANDS
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .map(|cmd| cmd[line.len()..].to_string())
    }
}

impl Validator for SessionHelper {}

enum Flow {
    Continue,
    Exit,
}

/// Runs the REPL for an already started or resumed session.
///
/// Returns when the session is finished, discarded or suspended.
pub async fn run_session(runner: Arc<WorkoutRunnerUseCase>, first: RunnerSnapshot) -> Result<()> {
    println!(
        "{}",
        format!("=== {} ===", first.plan_label).bright_magenta().bold()
    );
    println!("{}", "Type 'help' for commands, 'quit' to leave (the session stays resumable).".bright_black());
    print_status(&first);

    let printer = tokio::spawn(print_changes(runner.clone(), first));

    let mut rl = Editor::new()?;
    rl.set_helper(Some(SessionHelper));

    loop {
        let prompt = prompt(&runner).await;
        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                let command = match ReplCommand::parse(trimmed) {
                    Ok(command) => command,
                    Err(message) => {
                        println!("{}", message.yellow());
                        continue;
                    }
                };
                match execute(&runner, &mut rl, command).await {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Exit) => break,
                    Err(e) => println!("{}", e.to_string().red()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to leave.".yellow());
            }
            Err(ReadlineError::Eof) => {
                runner.suspend().await?;
                println!("{}", "Session kept. Resume it with `pepe resume`.".bright_green());
                break;
            }
            Err(err) => {
                runner.suspend().await?;
                return Err(err.into());
            }
        }
    }

    printer.abort();
    Ok(())
}

async fn execute(
    runner: &WorkoutRunnerUseCase,
    rl: &mut Editor<SessionHelper, rustyline::history::DefaultHistory>,
    command: ReplCommand,
) -> pepe_core::error::Result<Flow> {
    match command {
        ReplCommand::Start => {
            runner.start_set().await?;
        }
        ReplCommand::Done { reps, weight_kg } => {
            if let Some(reps) = reps {
                runner.set_input(SetInputField::Reps, reps).await?;
            }
            if let Some(weight_kg) = weight_kg {
                runner.set_input(SetInputField::WeightKg, weight_kg).await?;
            }
            runner.complete_set().await?;
        }
        ReplCommand::Input(field, value) => {
            let snapshot = runner.set_input(field, value).await?;
            print_inputs(&snapshot);
        }
        ReplCommand::NudgeWeight(size, direction) => {
            let snapshot = runner.nudge_weight(size, direction).await?;
            print_inputs(&snapshot);
        }
        ReplCommand::NudgeReps(direction) => {
            let snapshot = runner.nudge_reps(direction).await?;
            print_inputs(&snapshot);
        }
        ReplCommand::Rest => {
            runner.start_rest().await?;
        }
        ReplCommand::AdjustRest(seconds) => {
            let snapshot = runner.adjust_rest(seconds).await?;
            println!("{}", format!("Rest: {}s", snapshot.rest_remaining).cyan());
        }
        ReplCommand::Skip => {
            runner.skip_rest().await?;
        }
        ReplCommand::Next => {
            runner.next_exercise().await?;
        }
        ReplCommand::Mute(muted) => {
            runner.set_voice_muted(muted).await?;
            let state = if muted { "Voice muted." } else { "Voice on." };
            println!("{}", state.bright_black());
        }
        ReplCommand::Status => {
            if let Some(snapshot) = runner.snapshot().await {
                print_status(&snapshot);
            }
        }
        ReplCommand::Finish => {
            let session = runner.finish().await?;
            let duration = session.duration_seconds();
            println!(
                "{}",
                format!(
                    "Saved {} sets in {}m {:02}s. Nice work!",
                    session.set_logs.len(),
                    duration / 60,
                    duration % 60
                )
                .bright_green()
            );
            return Ok(Flow::Exit);
        }
        ReplCommand::Discard => {
            if confirm(rl, "Discard this session? Nothing will be saved. [y/N] ") {
                runner.discard().await?;
                println!("{}", "Session discarded.".yellow());
                return Ok(Flow::Exit);
            }
        }
        ReplCommand::Quit => {
            runner.suspend().await?;
            println!("{}", "Session kept. Resume it with `pepe resume`.".bright_green());
            return Ok(Flow::Exit);
        }
        ReplCommand::Help => println!("{}", HELP),
    }
    Ok(Flow::Continue)
}

fn confirm(rl: &mut Editor<SessionHelper, rustyline::history::DefaultHistory>, question: &str) -> bool {
    matches!(rl.readline(question), Ok(answer) if answer.trim().eq_ignore_ascii_case("y"))
}

async fn prompt(runner: &WorkoutRunnerUseCase) -> String {
    match runner.snapshot().await {
        Some(s) if s.phase == RunnerPhase::Rest => format!("[rest {}s] > ", s.rest_remaining),
        Some(s) if s.phase == RunnerPhase::Done => "[done] > ".to_string(),
        Some(s) => format!("[{}/{} {}] > ", (s.step_index + 1).min(s.total_steps), s.total_steps, s.phase),
        None => "> ".to_string(),
    }
}

/// Prints a status line for every step or phase change.
async fn print_changes(runner: Arc<WorkoutRunnerUseCase>, first: RunnerSnapshot) {
    let mut updates = runner.subscribe();
    let mut last = (first.step_index, first.phase);

    while updates.changed().await.is_ok() {
        let Some(snapshot) = updates.borrow_and_update().clone() else {
            continue;
        };
        let position = (snapshot.step_index, snapshot.phase);
        if position != last {
            last = position;
            print_status(&snapshot);
        }
    }
}

fn print_status(snapshot: &RunnerSnapshot) {
    let header = match snapshot.phase {
        RunnerPhase::Done => "Done".to_string(),
        phase => format!(
            "Step {}/{} | {}",
            (snapshot.step_index + 1).min(snapshot.total_steps),
            snapshot.total_steps,
            phase
        ),
    };
    println!("{}", header.bold());
    println!("{}", snapshot.coach_text);
    match snapshot.phase {
        RunnerPhase::Rest => println!("{}", format!("Rest: {}s", snapshot.rest_remaining).cyan()),
        RunnerPhase::Done => println!(
            "{}",
            format!("{} sets logged. Type 'finish' to save.", snapshot.logged_sets).bright_green()
        ),
        _ => print_inputs(snapshot),
    }
}

fn print_inputs(snapshot: &RunnerSnapshot) {
    let inputs = &snapshot.inputs;
    let mut parts = vec![format!("reps {}", dash(&inputs.reps))];
    parts.push(format!("kg {}", dash(&inputs.weight_kg)));
    if !inputs.rpe.is_empty() {
        parts.push(format!("rpe {}", inputs.rpe));
    }
    if !inputs.rir.is_empty() {
        parts.push(format!("rir {}", inputs.rir));
    }
    if !inputs.tempo.is_empty() {
        parts.push(format!("tempo {}", inputs.tempo));
    }
    if !inputs.notes.is_empty() {
        parts.push(format!("note {}", inputs.notes));
    }
    println!("{}", parts.join("  ").bright_black());
}

fn dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}
