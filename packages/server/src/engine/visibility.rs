use crate::models::{
    game::{Game, GameStatus},
    role::Role,
};

/// Copy of `game` as `viewer` may see it. While the game is running only the
/// viewer's own role is visible, the night ledger is shown to mafia only and
/// the heal slot to the doctor only. Once the game is over nothing is hidden.
pub fn mask_for_viewer(game: &Game, viewer: Option<&str>) -> Game {
    let mut masked = game.clone();
    if game.status != GameStatus::InProgress {
        return masked;
    }

    let viewer_role = viewer.and_then(|id| game.player(id)).and_then(|p| p.role);
    let is_viewer = |user_id: &str| viewer == Some(user_id);

    for player in masked.players.iter_mut() {
        if !is_viewer(&player.user_id) {
            player.role = None;
        }
    }
    for comment in masked.comments.iter_mut() {
        if !is_viewer(&comment.user_id) {
            comment.role = None;
        }
    }
    if let Some(round) = masked.round.as_mut() {
        if viewer_role != Some(Role::Mafia) {
            round.night_votes.clear();
        }
        if viewer_role != Some(Role::Doctor) {
            round.doctor_heal = None;
        }
    }
    masked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ledger::Vote;
    use crate::models::{
        game::{GamePhase, RoundState},
        player::Player,
    };
    use chrono::Utc;

    fn running_game() -> Game {
        let roles = [("m", Role::Mafia), ("d", Role::Doctor), ("v", Role::Villager)];
        let mut players = roles.iter().map(|(id, role)| {
            let mut p = Player::new(id.to_string(), id.to_string(), id.to_string());
            p.role = Some(*role);
            p
        });
        let mut game = Game::new("g".to_string(), players.next().unwrap(), 10);
        game.players.extend(players);
        game.sync_player_count();
        game.status = GameStatus::InProgress;
        let mut round = RoundState::first_day(Utc::now());
        round.phase = GamePhase::Night;
        round.night_votes.cast("m", Some("v"));
        round.doctor_heal = Some(Vote::new("d", "v"));
        game.round = Some(round);
        game.add_comment("m", "hi", 500, 1000).unwrap();
        game
    }

    #[test]
    fn viewer_sees_only_own_role() {
        let game = running_game();
        let masked = mask_for_viewer(&game, Some("v"));
        assert_eq!(masked.player("v").unwrap().role, Some(Role::Villager));
        assert_eq!(masked.player("m").unwrap().role, None);
        assert_eq!(masked.player("d").unwrap().role, None);
        assert_eq!(masked.comments[0].role, None);
        let round = masked.round.as_ref().unwrap();
        assert!(round.night_votes.is_empty());
        assert!(round.doctor_heal.is_none());
    }

    #[test]
    fn night_actions_visible_to_their_roles() {
        let game = running_game();
        let mafia_view = mask_for_viewer(&game, Some("m"));
        assert_eq!(mafia_view.round.as_ref().unwrap().night_votes.len(), 1);
        assert!(mafia_view.round.as_ref().unwrap().doctor_heal.is_none());
        assert_eq!(mafia_view.comments[0].role, Some(Role::Mafia));

        let doctor_view = mask_for_viewer(&game, Some("d"));
        assert!(doctor_view.round.as_ref().unwrap().night_votes.is_empty());
        assert!(doctor_view.round.as_ref().unwrap().doctor_heal.is_some());
    }

    #[test]
    fn spectators_see_no_roles() {
        let game = running_game();
        let masked = mask_for_viewer(&game, None);
        assert!(masked.players.iter().all(|p| p.role.is_none()));
    }

    #[test]
    fn masking_never_touches_stored_game() {
        let game = running_game();
        let _ = mask_for_viewer(&game, Some("v"));
        assert!(game.players.iter().all(|p| p.role.is_some()));
    }

    #[test]
    fn roles_revealed_after_game() {
        let mut game = running_game();
        game.status = GameStatus::Finished;
        let masked = mask_for_viewer(&game, Some("v"));
        assert!(masked.players.iter().all(|p| p.role.is_some()));
    }
}
