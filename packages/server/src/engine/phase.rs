use chrono::{DateTime, Duration, Utc};

use super::{
    flavor::VariantPicker,
    resolver::resolve_phase,
    win::{evaluate, AliveCounts, WinOutcome},
};
use crate::models::{
    game::{Game, GamePhase, GameStatus, RoundState},
    log::{GameLog, LogType},
};

#[derive(Debug, Clone, PartialEq)]
pub struct PhaseOutcome {
    pub eliminated: Option<String>,
    pub outcome: Option<WinOutcome>,
    pub logs: Vec<GameLog>,
}

impl PhaseOutcome {
    pub fn finished(&self) -> bool {
        self.outcome.is_some()
    }
}

impl Game {
    /// One phase boundary: resolve the expiring phase's ballots, check win
    /// conditions against the departing phase, and only then advance.
    /// Returns `None` for games that are not in progress.
    pub fn transition_phase(
        &mut self,
        picker: &dyn VariantPicker,
        now: DateTime<Utc>,
        phase_duration: Duration,
    ) -> Option<PhaseOutcome> {
        if self.status != GameStatus::InProgress {
            return None;
        }
        let departing = self.round.as_ref()?.phase;

        let resolution = resolve_phase(self, picker);
        let mut logs = resolution.logs;

        let outcome = evaluate(AliveCounts::of(self), departing);
        match outcome {
            Some(win) => {
                self.status = GameStatus::Finished;
                self.winner = Some(win.winner());
                self.freeze_round();
                logs.push(win.log());
            }
            None => {
                if let Some(round) = self.round.as_mut() {
                    logs.push(advance(round, now + phase_duration));
                }
            }
        }

        self.push_logs(&logs);
        Some(PhaseOutcome {
            eliminated: resolution.eliminated,
            outcome,
            logs,
        })
    }
}

fn advance(round: &mut RoundState, phase_end_time: DateTime<Utc>) -> GameLog {
    round.phase_end_time = phase_end_time;

    match round.phase {
        GamePhase::Day => {
            round.phase = GamePhase::Night;
            round.day_votes.clear();
            GameLog::new(
                LogType::Phase,
                "nightBegins",
                format!(
                    "Night {} begins. Mafia, choose your target. Doctor, choose who to heal.",
                    round.day_number
                ),
            )
            .with_param("nightNumber", round.day_number)
        }
        GamePhase::Night => {
            round.phase = GamePhase::Day;
            round.day_number += 1;
            round.night_votes.clear();
            round.doctor_heal = None;
            GameLog::new(
                LogType::Phase,
                "dayBegins",
                format!(
                    "Day {} begins. Discuss and vote to lynch a suspect.",
                    round.day_number
                ),
            )
            .with_param("dayNumber", round.day_number)
        }
    }
}
