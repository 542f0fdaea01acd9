use crate::models::{
    game::{Game, GamePhase, Winner},
    log::{GameLog, LogType},
    role::Role,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AliveCounts {
    pub mafia: usize,
    pub doctors: usize,
    pub villagers: usize,
}

impl AliveCounts {
    pub fn of(game: &Game) -> Self {
        AliveCounts {
            mafia: game.count_alive(Role::Mafia),
            doctors: game.count_alive(Role::Doctor),
            villagers: game.count_alive(Role::Villager),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinOutcome {
    VillagersWin,
    MafiaControlTown,
    MafiaUnstoppable,
    /// Leaving day with no doctor: the undefended night kill would hand the
    /// mafia the game, so the night is skipped.
    MafiaWinsTonight,
}

impl WinOutcome {
    pub fn winner(&self) -> Winner {
        match self {
            WinOutcome::VillagersWin => Winner::Villagers,
            _ => Winner::Mafia,
        }
    }

    pub fn log(&self) -> GameLog {
        let (key, message) = match self {
            WinOutcome::VillagersWin => (
                "villagersWin",
                "🎉 Villagers win! All mafia have been eliminated.",
            ),
            WinOutcome::MafiaControlTown => {
                ("mafiaWinsControl", "🎉 Mafia wins! They control the town.")
            }
            WinOutcome::MafiaUnstoppable => (
                "mafiaWinsNoOne",
                "🎉 Mafia wins! No one can stop them anymore.",
            ),
            WinOutcome::MafiaWinsTonight => (
                "mafiaWinsTonight",
                "🎉 Mafia wins! They will eliminate the remaining villagers tonight.",
            ),
        };
        GameLog::new(LogType::System, key, message)
    }
}

/// First matching rule wins. `departing` is the phase that just resolved;
/// the night lookahead only applies when leaving the day.
pub fn evaluate(counts: AliveCounts, departing: GamePhase) -> Option<WinOutcome> {
    let AliveCounts {
        mafia,
        doctors,
        villagers,
    } = counts;

    if mafia == 0 {
        return Some(WinOutcome::VillagersWin);
    }
    if mafia >= doctors + villagers {
        return Some(WinOutcome::MafiaControlTown);
    }
    if doctors == 0 && mafia >= villagers {
        return Some(WinOutcome::MafiaUnstoppable);
    }
    if departing == GamePhase::Day && doctors == 0 && villagers >= 1 {
        let villagers_after_kill = villagers - 1;
        if mafia >= villagers_after_kill {
            return Some(WinOutcome::MafiaWinsTonight);
        }
    }
    None
}
