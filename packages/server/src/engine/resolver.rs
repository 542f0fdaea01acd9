use super::flavor::{self, FlavorPool, VariantPicker};
use crate::models::{
    game::{Game, GamePhase},
    log::{GameLog, LogType},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub eliminated: Option<String>,
    pub logs: Vec<GameLog>,
}

impl Resolution {
    fn nobody(log: GameLog) -> Self {
        Resolution {
            eliminated: None,
            logs: vec![log],
        }
    }
}

pub fn resolve_phase(game: &mut Game, picker: &dyn VariantPicker) -> Resolution {
    match game.round.as_ref().map(|r| r.phase) {
        Some(GamePhase::Day) => resolve_day(game, picker),
        Some(GamePhase::Night) => resolve_night(game, picker),
        None => Resolution {
            eliminated: None,
            logs: Vec::new(),
        },
    }
}

fn no_lynch() -> GameLog {
    GameLog::new(LogType::Vote, "dayNoLynch", "Day ends. No one was lynched.")
}

fn no_target() -> GameLog {
    GameLog::new(
        LogType::Kill,
        "nightNoTarget",
        "Night ends. No one was targeted by the mafia.",
    )
}

pub fn resolve_day(game: &mut Game, picker: &dyn VariantPicker) -> Resolution {
    let target = game
        .round
        .as_ref()
        .and_then(|r| r.day_votes.leader())
        .map(str::to_string);

    let Some(target) = target else {
        return Resolution::nobody(no_lynch());
    };
    let Some(player) = game.player_mut(&target) else {
        return Resolution::nobody(no_lynch());
    };

    player.alive = false;
    let flavor = flavor::render(FlavorPool::for_lynched(player.role), picker, &player.nickname);
    let log = GameLog::new(LogType::Kill, flavor.key, flavor.message)
        .with_param("nickname", player.nickname.as_str());

    Resolution {
        eliminated: Some(target),
        logs: vec![log],
    }
}

pub fn resolve_night(game: &mut Game, picker: &dyn VariantPicker) -> Resolution {
    let (target, healed) = match game.round.as_ref() {
        Some(round) => {
            let target = round.night_votes.leader().map(str::to_string);
            let healed = round.doctor_heal.as_ref().map(|v| v.target_user_id.clone());
            (target, healed)
        }
        None => (None, None),
    };

    let Some(target) = target else {
        return Resolution::nobody(no_target());
    };
    let Some(player) = game.player_mut(&target) else {
        return Resolution::nobody(no_target());
    };

    if healed.as_deref() == Some(target.as_str()) {
        let log = GameLog::new(
            LogType::Heal,
            "heal",
            format!(
                "The doctor saved \"{}\" from the mafia's attack!",
                player.nickname
            ),
        )
        .with_param("nickname", player.nickname.as_str());
        return Resolution::nobody(log);
    }

    player.alive = false;
    let flavor = flavor::render(FlavorPool::MafiaKill, picker, &player.nickname);
    let log = GameLog::new(LogType::Kill, flavor.key, flavor.message)
        .with_param("nickname", player.nickname.as_str());

    Resolution {
        eliminated: Some(target),
        logs: vec![log],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::flavor::FixedPicker;
    use crate::models::{
        game::{GameStatus, RoundState},
        player::Player,
        role::Role,
    };
    use chrono::Utc;

    fn game(phase: GamePhase) -> Game {
        let roles = [
            ("m1", Role::Mafia),
            ("m2", Role::Mafia),
            ("doc", Role::Doctor),
            ("v1", Role::Villager),
            ("v2", Role::Villager),
        ];
        let mut players = roles.iter().map(|(id, role)| {
            let mut p = Player::new(id.to_string(), id.to_uppercase(), id.to_string());
            p.role = Some(*role);
            p
        });
        let mut game = Game::new("g".to_string(), players.next().unwrap(), 10);
        game.players.extend(players);
        game.sync_player_count();
        game.status = GameStatus::InProgress;
        let mut round = RoundState::first_day(Utc::now());
        round.phase = phase;
        game.round = Some(round);
        game
    }

    fn round(game: &mut Game) -> &mut RoundState {
        game.round.as_mut().unwrap()
    }

    #[test]
    fn day_without_votes_lynches_nobody() {
        let mut g = game(GamePhase::Day);
        let res = resolve_phase(&mut g, &FixedPicker(0));
        assert_eq!(res.eliminated, None);
        assert_eq!(res.logs[0].key(), Some("dayNoLynch"));
        assert!(g.players.iter().all(|p| p.alive));
    }

    #[test]
    fn day_lynches_plurality_with_role_flavor() {
        let mut g = game(GamePhase::Day);
        round(&mut g).day_votes.cast("v1", Some("m2"));
        round(&mut g).day_votes.cast("v2", Some("m2"));
        round(&mut g).day_votes.cast("m2", Some("v1"));

        let res = resolve_phase(&mut g, &FixedPicker(4));
        assert_eq!(res.eliminated.as_deref(), Some("m2"));
        assert!(!g.player("m2").unwrap().alive);
        assert_eq!(res.logs[0].key(), Some("lynchMafia.4"));
        assert_eq!(res.logs[0].log_type, LogType::Kill);
        assert_eq!(res.logs[0].log_params["nickname"], "M2");
    }

    #[test]
    fn day_lynch_of_doctor_uses_doctor_pool() {
        let mut g = game(GamePhase::Day);
        round(&mut g).day_votes.cast("v1", Some("doc"));
        let res = resolve_day(&mut g, &FixedPicker(0));
        assert_eq!(res.logs[0].key(), Some("lynchDoctor.0"));
    }

    #[test]
    fn day_tie_goes_to_smallest_id() {
        let mut g = game(GamePhase::Day);
        round(&mut g).day_votes.cast("m1", Some("v2"));
        round(&mut g).day_votes.cast("m2", Some("v1"));
        let res = resolve_day(&mut g, &FixedPicker(0));
        assert_eq!(res.eliminated.as_deref(), Some("v1"));
        assert_eq!(res.logs[0].key(), Some("lynchVillager.0"));
    }

    #[test]
    fn night_without_votes_has_no_target() {
        let mut g = game(GamePhase::Night);
        let res = resolve_phase(&mut g, &FixedPicker(0));
        assert_eq!(res.eliminated, None);
        assert_eq!(res.logs[0].key(), Some("nightNoTarget"));
    }

    #[test]
    fn night_kill_lands_when_not_healed() {
        let mut g = game(GamePhase::Night);
        round(&mut g).night_votes.cast("m1", Some("v1"));
        round(&mut g).night_votes.cast("m2", Some("v1"));
        round(&mut g).doctor_heal = Some(crate::engine::ledger::Vote::new("doc", "v2"));

        let res = resolve_phase(&mut g, &FixedPicker(19));
        assert_eq!(res.eliminated.as_deref(), Some("v1"));
        assert!(!g.player("v1").unwrap().alive);
        assert_eq!(res.logs[0].key(), Some("mafiaKill.19"));
    }

    #[test]
    fn heal_on_target_negates_kill() {
        let mut g = game(GamePhase::Night);
        round(&mut g).night_votes.cast("m1", Some("v1"));
        round(&mut g).doctor_heal = Some(crate::engine::ledger::Vote::new("doc", "v1"));

        let res = resolve_phase(&mut g, &FixedPicker(0));
        assert_eq!(res.eliminated, None);
        assert!(g.player("v1").unwrap().alive);
        assert_eq!(res.logs[0].key(), Some("heal"));
        assert_eq!(res.logs[0].log_type, LogType::Heal);
    }

    #[test]
    fn target_missing_from_roster_is_not_eliminated() {
        let mut g = game(GamePhase::Night);
        round(&mut g).night_votes.cast("m1", Some("v1"));
        g.players.retain(|p| p.user_id != "v1");
        let res = resolve_night(&mut g, &FixedPicker(0));
        assert_eq!(res.eliminated, None);
        assert_eq!(res.logs[0].key(), Some("nightNoTarget"));
    }
}
