//! Parsing of REPL lines into session commands.

use pepe_application::{NudgeDirection, NudgeSize};
use pepe_core::session::SetInputField;

/// One line typed during a live session.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Start,
    /// `done [reps] [kg]`: optional overrides applied before logging.
    Done {
        reps: Option<String>,
        weight_kg: Option<String>,
    },
    Input(SetInputField, String),
    NudgeWeight(NudgeSize, NudgeDirection),
    NudgeReps(NudgeDirection),
    Rest,
    AdjustRest(i32),
    Skip,
    Next,
    Mute(bool),
    Status,
    Finish,
    Discard,
    Quit,
    Help,
}

pub const COMMANDS: &[&str] = &[
    "start", "done", "reps", "kg", "rpe", "rir", "tempo", "note", "w+", "w-", "W+", "W-", "r+", "r-",
    "rest", "skip", "next", "mute", "unmute", "status", "finish", "discard", "quit", "help",
];

pub const HELP: &str = "\
start                 begin the current set
done [reps] [kg]      log the set (optionally overriding reps and weight)
reps|kg|rpe|rir <v>   edit an input
tempo|note <text>     edit tempo or notes
w+ w- / W+ W-         nudge weight by the small / large step
r+ r-                 nudge reps
rest                  start the rest countdown
+N / -N               add or remove N seconds of rest
skip                  end the rest now
next                  move on without resting
mute / unmute         toggle voice coaching
status                show the current set
finish                save the session to history
discard               throw the session away
quit                  leave; the session stays resumable";

impl ReplCommand {
    /// Parses one trimmed, non-empty line.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        let command = match head {
            "start" => ReplCommand::Start,
            "done" => {
                let mut args = rest.split_whitespace().map(str::to_string);
                ReplCommand::Done {
                    reps: args.next(),
                    weight_kg: args.next(),
                }
            }
            "reps" => input(SetInputField::Reps, rest)?,
            "kg" => input(SetInputField::WeightKg, rest)?,
            "rpe" => input(SetInputField::Rpe, rest)?,
            "rir" => input(SetInputField::Rir, rest)?,
            "tempo" => ReplCommand::Input(SetInputField::Tempo, rest.to_string()),
            "note" | "notes" => ReplCommand::Input(SetInputField::Notes, rest.to_string()),
            "w+" => ReplCommand::NudgeWeight(NudgeSize::Small, NudgeDirection::Up),
            "w-" => ReplCommand::NudgeWeight(NudgeSize::Small, NudgeDirection::Down),
            "W+" => ReplCommand::NudgeWeight(NudgeSize::Large, NudgeDirection::Up),
            "W-" => ReplCommand::NudgeWeight(NudgeSize::Large, NudgeDirection::Down),
            "r+" => ReplCommand::NudgeReps(NudgeDirection::Up),
            "r-" => ReplCommand::NudgeReps(NudgeDirection::Down),
            "rest" => ReplCommand::Rest,
            "skip" => ReplCommand::Skip,
            "next" => ReplCommand::Next,
            "mute" => ReplCommand::Mute(true),
            "unmute" => ReplCommand::Mute(false),
            "status" => ReplCommand::Status,
            "finish" => ReplCommand::Finish,
            "discard" => ReplCommand::Discard,
            "quit" | "exit" => ReplCommand::Quit,
            "help" | "?" => ReplCommand::Help,
            other if other.starts_with(['+', '-']) && rest.is_empty() => {
                let seconds = other
                    .parse::<i32>()
                    .map_err(|_| format!("Not a number of seconds: {other}"))?;
                ReplCommand::AdjustRest(seconds)
            }
            other => return Err(format!("Unknown command: {other} (type 'help')")),
        };
        Ok(command)
    }
}

fn input(field: SetInputField, value: &str) -> Result<ReplCommand, String> {
    if value.is_empty() {
        return Err("Missing value".to_string());
    }
    Ok(ReplCommand::Input(field, value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_done_with_overrides() {
        assert_eq!(
            ReplCommand::parse("done 9 61.5").unwrap(),
            ReplCommand::Done {
                reps: Some("9".to_string()),
                weight_kg: Some("61.5".to_string()),
            }
        );
        assert_eq!(
            ReplCommand::parse("done").unwrap(),
            ReplCommand::Done {
                reps: None,
                weight_kg: None
            }
        );
    }

    #[test]
    fn test_parse_rest_adjustments() {
        assert_eq!(ReplCommand::parse("+30").unwrap(), ReplCommand::AdjustRest(30));
        assert_eq!(ReplCommand::parse("-10").unwrap(), ReplCommand::AdjustRest(-10));
        assert!(ReplCommand::parse("+abc").is_err());
    }

    #[test]
    fn test_parse_nudges_are_case_sensitive() {
        assert_eq!(
            ReplCommand::parse("w+").unwrap(),
            ReplCommand::NudgeWeight(NudgeSize::Small, NudgeDirection::Up)
        );
        assert_eq!(
            ReplCommand::parse("W-").unwrap(),
            ReplCommand::NudgeWeight(NudgeSize::Large, NudgeDirection::Down)
        );
    }

    #[test]
    fn test_parse_inputs_keep_free_text() {
        assert_eq!(
            ReplCommand::parse("note felt heavy today").unwrap(),
            ReplCommand::Input(SetInputField::Notes, "felt heavy today".to_string())
        );
        assert_eq!(
            ReplCommand::parse("kg 62,5").unwrap(),
            ReplCommand::Input(SetInputField::WeightKg, "62,5".to_string())
        );
        assert!(ReplCommand::parse("kg").is_err());
    }

    #[test]
    fn test_unknown_command() {
        assert!(ReplCommand::parse("jump").is_err());
    }
}
