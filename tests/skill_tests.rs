use ninenine::{
    ActionError, Game, GameConfig, Marker, Phase, PlacementKind, PlayerId, Pos, Skill, WinReason,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::time::{Duration, Instant};

fn started(p1: Skill, p2: Skill, seed: u64) -> Game {
    let mut game = Game::new(GameConfig::default(), SmallRng::seed_from_u64(seed));
    game.start_game().unwrap();
    game.select_skill(PlayerId::P1, p1).unwrap();
    game.select_skill(PlayerId::P2, p2).unwrap();
    game.board_mut().reset();
    game
}

/// Walk the current player into the Place phase at `to`, opponent at `opp`.
fn reach_place(game: &mut Game, to: Pos, opp: Pos) {
    let me = game.current_turn();
    game.player_mut(me).move_to(Pos::new(to.row, to.col - 1));
    game.player_mut(me.other()).move_to(opp);
    game.player_mut(me).stock_die(1);
    game.use_stocked_die().unwrap();
    game.move_to(to).unwrap();
    assert_eq!(game.phase(), Phase::Place);
}

fn now() -> Instant {
    Instant::now()
}

#[test]
fn test_ice_skill_places_on_empty_neighbors_only() {
    let mut game = started(Skill::Ice, Skill::Ice, 1);
    let me = game.current_turn();
    game.player_mut(me).add_points(20);
    game.board_mut().set(Pos::new(3, 4), Marker::Stone);
    reach_place(&mut game, Pos::new(4, 4), Pos::new(8, 8));

    game.activate_skill(now()).unwrap();
    assert_eq!(game.placement_type(), PlacementKind::Ice);
    assert!(!game.placeable_tiles().contains(&Pos::new(3, 4)));
    assert!(game.placeable_tiles().contains(&Pos::new(5, 4)));

    game.place_at(Pos::new(5, 4)).unwrap();
    assert_eq!(game.board().get(Pos::new(5, 4)), Some(Marker::Ice));
    assert_eq!(game.player(me).points(), 0);
    assert_eq!(game.current_turn(), me.other());
}

#[test]
fn test_bomb_skill_records_owner() {
    let mut game = started(Skill::Bomb, Skill::Bomb, 2);
    let me = game.current_turn();
    game.player_mut(me).add_points(50);
    reach_place(&mut game, Pos::new(4, 4), Pos::new(8, 8));

    game.activate_skill(now()).unwrap();
    assert_eq!(game.placement_type(), PlacementKind::Bomb);
    game.place_at(Pos::new(4, 5)).unwrap();
    assert_eq!(game.board().get(Pos::new(4, 5)), Some(Marker::Bomb));
    assert_eq!(game.board().owner_of(Pos::new(4, 5)), Some(me));
    assert_eq!(game.player(me).points(), 0);
}

#[test]
fn test_bomb_placement_needs_the_matching_skill() {
    let mut game = started(Skill::Meteor, Skill::Meteor, 3);
    let me = game.current_turn();
    game.player_mut(me).add_points(500);
    reach_place(&mut game, Pos::new(4, 4), Pos::new(8, 8));
    assert_eq!(
        game.set_placement_type(PlacementKind::Bomb),
        Err(ActionError::SkillUnavailable)
    );
    assert_eq!(game.placement_type(), PlacementKind::Stone);
}

#[test]
fn test_skill_activation_requires_points() {
    let mut game = started(Skill::Domination, Skill::Domination, 4);
    reach_place(&mut game, Pos::new(4, 4), Pos::new(8, 8));
    assert_eq!(game.activate_skill(now()), Err(ActionError::InsufficientPoints));
    assert_eq!(game.phase(), Phase::Place);
}

#[test]
fn test_domination_locks_the_opponent() {
    let mut game = started(Skill::Domination, Skill::Domination, 5);
    let me = game.current_turn();
    let victim = me.other();
    game.player_mut(me).add_points(100);
    reach_place(&mut game, Pos::new(4, 4), Pos::new(8, 8));

    game.activate_skill(now()).unwrap();
    assert_eq!(game.player(me).points(), 0);
    assert_eq!(game.player(victim).domination_turns(), 3);
    // domination ends the turn on the spot
    assert_eq!(game.current_turn(), victim);
    assert_eq!(game.phase(), Phase::Roll);

    // the victim may only plain-roll
    game.player_mut(victim).add_points(500);
    assert_eq!(game.stock_current_die(), Err(ActionError::Dominated));
    game.player_mut(victim).stock_die(2);
    assert_eq!(game.use_stocked_die(), Err(ActionError::Dominated));

    game.player_mut(victim).move_to(Pos::new(4, 2));
    game.player_mut(me).move_to(Pos::new(8, 8));
    game.roll_dice().unwrap();
    let dest = game.movable_tiles()[0].pos;
    game.move_to(dest).unwrap();

    // no skills or drills while locked
    assert_eq!(game.activate_skill(now()), Err(ActionError::Dominated));
    assert_eq!(
        game.set_placement_type(PlacementKind::Drill),
        Err(ActionError::Dominated)
    );

    // finishing the turn ticks the counter down
    let stone = game.placeable_tiles()[0];
    game.place_at(stone).unwrap();
    assert_eq!(game.player(victim).domination_turns(), 2);
}

#[test]
fn test_sniper_requires_clear_line() {
    let mut game = started(Skill::Sniper, Skill::Sniper, 6);
    let me = game.current_turn();
    game.player_mut(me).add_points(100);
    reach_place(&mut game, Pos::new(4, 1), Pos::new(4, 8));

    // stone in the lane blocks the shot and costs nothing
    game.board_mut().set(Pos::new(4, 5), Marker::Stone);
    assert_eq!(game.activate_skill(now()), Err(ActionError::SkillUnavailable));
    assert_eq!(game.player(me).points(), 100);

    game.board_mut().set(Pos::new(4, 5), Marker::Empty);
    game.activate_skill(now()).unwrap();
    assert!(game.sniper_pending().is_some());
    assert_eq!(game.player(me).points(), 0);
}

#[test]
fn test_sniper_rejects_close_or_offline_targets() {
    let mut game = started(Skill::Sniper, Skill::Sniper, 7);
    let me = game.current_turn();
    game.player_mut(me).add_points(100);
    // Chebyshev 3: too close
    reach_place(&mut game, Pos::new(4, 2), Pos::new(4, 5));
    assert_eq!(game.activate_skill(now()), Err(ActionError::SkillUnavailable));

    // off every line
    game.player_mut(me.other()).move_to(Pos::new(6, 8));
    assert_eq!(game.activate_skill(now()), Err(ActionError::SkillUnavailable));
    assert_eq!(game.player(me).points(), 100);
}

#[test]
fn test_sniper_resolves_after_the_delay() {
    let mut game = started(Skill::Sniper, Skill::Sniper, 8);
    let me = game.current_turn();
    game.player_mut(me).add_points(100);
    reach_place(&mut game, Pos::new(4, 1), Pos::new(4, 8));

    let t0 = now();
    game.activate_skill(t0).unwrap();

    game.tick(t0);
    assert_eq!(game.outcome(), None);
    game.tick(t0 + Duration::from_millis(1999));
    assert_eq!(game.outcome(), None);

    game.tick(t0 + Duration::from_secs(2));
    let outcome = game.outcome().unwrap();
    assert_eq!(outcome.winner, me);
    assert_eq!(outcome.reason, WinReason::Sniped);
    assert!(game.sniper_pending().is_none());
    assert_eq!(game.phase(), Phase::GameOver);

    // a later tick changes nothing
    game.tick(t0 + Duration::from_secs(60));
    assert_eq!(game.outcome().unwrap(), outcome);
}

#[test]
fn test_sniper_cannot_stack_pending_shots() {
    let mut game = started(Skill::Sniper, Skill::Sniper, 9);
    let me = game.current_turn();
    game.player_mut(me).add_points(200);
    reach_place(&mut game, Pos::new(4, 1), Pos::new(4, 8));

    let t0 = now();
    game.activate_skill(t0).unwrap();
    assert_eq!(game.activate_skill(t0), Err(ActionError::SkillUnavailable));
    assert_eq!(game.player(me).points(), 100);
}

#[test]
fn test_hitokiri_slashes_adjacent_opponent() {
    let mut game = started(Skill::Hitokiri, Skill::Hitokiri, 10);
    let me = game.current_turn();
    game.player_mut(me).add_points(100);
    reach_place(&mut game, Pos::new(4, 4), Pos::new(4, 5));

    game.activate_skill(now()).unwrap();
    let outcome = game.outcome().unwrap();
    assert_eq!(outcome.winner, me);
    assert_eq!(outcome.reason, WinReason::Slashed);
    assert_eq!(
        game.win_reason_text().unwrap(),
        format!("Player {} was slashed!", me.other().number())
    );
    assert_eq!(game.player(me).points(), 0);
}

#[test]
fn test_hitokiri_needs_cardinal_adjacency() {
    let mut game = started(Skill::Hitokiri, Skill::Hitokiri, 11);
    let me = game.current_turn();
    game.player_mut(me).add_points(100);
    // diagonal neighbor is out of reach
    reach_place(&mut game, Pos::new(4, 4), Pos::new(5, 5));
    assert_eq!(game.activate_skill(now()), Err(ActionError::SkillUnavailable));
    assert_eq!(game.player(me).points(), 100);
    assert_eq!(game.outcome(), None);
}

#[test]
fn test_suriashi_slides_one_diagonal_step() {
    let mut game = started(Skill::Suriashi, Skill::Suriashi, 12);
    let me = game.current_turn();
    game.player_mut(me).add_points(50);
    game.board_mut().set(Pos::new(3, 3), Marker::Stone);
    reach_place(&mut game, Pos::new(4, 4), Pos::new(5, 5));

    game.activate_skill(now()).unwrap();
    assert_eq!(game.phase(), Phase::SkillTarget);
    assert_eq!(game.active_skill(), Some(Skill::Suriashi));
    let targets = game.skill_targets().to_vec();
    assert!(!targets.contains(&Pos::new(3, 3))); // stone
    assert!(!targets.contains(&Pos::new(5, 5))); // opponent
    assert!(targets.contains(&Pos::new(3, 5)));
    assert!(targets.contains(&Pos::new(5, 3)));

    game.skill_target_at(Pos::new(3, 5)).unwrap();
    assert_eq!(game.player(me).pos(), Pos::new(3, 5));
    assert_eq!(game.player(me).points(), 0);
    assert_eq!(game.current_turn(), me.other());
    // no stone was placed by the sneak
    assert_eq!(game.board().get(Pos::new(4, 4)), Some(Marker::Empty));
}

#[test]
fn test_skill_targeting_can_be_cancelled() {
    let mut game = started(Skill::Suriashi, Skill::Suriashi, 13);
    let me = game.current_turn();
    game.player_mut(me).add_points(50);
    reach_place(&mut game, Pos::new(4, 4), Pos::new(8, 8));

    game.activate_skill(now()).unwrap();
    assert_eq!(game.phase(), Phase::SkillTarget);
    // only the stone action may cancel targeting
    assert_eq!(
        game.set_placement_type(PlacementKind::Drill),
        Err(ActionError::WrongPhase)
    );
    game.set_placement_type(PlacementKind::Stone).unwrap();
    assert_eq!(game.phase(), Phase::Place);
    assert_eq!(game.active_skill(), None);
    assert!(game.skill_targets().is_empty());
    // cancelling is free
    assert_eq!(game.player(me).points(), 50);
}

#[test]
fn test_invalid_skill_target_rejected() {
    let mut game = started(Skill::Suriashi, Skill::Suriashi, 14);
    let me = game.current_turn();
    game.player_mut(me).add_points(50);
    reach_place(&mut game, Pos::new(4, 4), Pos::new(8, 8));
    game.activate_skill(now()).unwrap();
    assert_eq!(
        game.skill_target_at(Pos::new(4, 5)),
        Err(ActionError::InvalidTarget)
    );
    assert_eq!(game.phase(), Phase::SkillTarget);
}

#[test]
fn test_meteor_drops_a_stone_anywhere_empty() {
    let mut game = started(Skill::Meteor, Skill::Meteor, 15);
    let me = game.current_turn();
    game.player_mut(me).add_points(200);
    game.board_mut().set(Pos::new(0, 0), Marker::Ice);
    reach_place(&mut game, Pos::new(4, 4), Pos::new(5, 5));

    game.activate_skill(now()).unwrap();
    assert_eq!(game.phase(), Phase::SkillTarget);
    let targets = game.skill_targets().to_vec();
    assert!(!targets.contains(&Pos::new(0, 0))); // not empty
    assert!(!targets.contains(&Pos::new(4, 4))); // under the mover
    assert!(!targets.contains(&Pos::new(5, 5))); // under the opponent
    assert!(targets.contains(&Pos::new(8, 0)));

    game.skill_target_at(Pos::new(8, 0)).unwrap();
    assert_eq!(game.board().get(Pos::new(8, 0)), Some(Marker::Stone));
    assert_eq!(game.player(me).points(), 0);
    assert_eq!(game.current_turn(), me.other());
}

#[test]
fn test_momonga_flies_to_the_nearest_stone() {
    let mut game = started(Skill::Momonga, Skill::Momonga, 16);
    let me = game.current_turn();
    game.player_mut(me).add_points(50);
    game.board_mut().set(Pos::new(4, 6), Marker::Stone);
    game.board_mut().set(Pos::new(0, 0), Marker::Stone);
    reach_place(&mut game, Pos::new(4, 4), Pos::new(8, 8));

    game.activate_skill(now()).unwrap();
    let targets = game.skill_targets().to_vec();
    // neighbors of the nearest stone (4,6) only
    assert!(targets.contains(&Pos::new(3, 6)));
    assert!(targets.contains(&Pos::new(4, 7)));
    assert!(!targets.contains(&Pos::new(0, 1)));
    assert!(!targets.contains(&Pos::new(1, 0)));

    game.skill_target_at(Pos::new(4, 7)).unwrap();
    assert_eq!(game.player(me).pos(), Pos::new(4, 7));
    assert_eq!(game.current_turn(), me.other());
}

#[test]
fn test_momonga_needs_a_stone_on_the_board() {
    let mut game = started(Skill::Momonga, Skill::Momonga, 17);
    let me = game.current_turn();
    game.player_mut(me).add_points(50);
    reach_place(&mut game, Pos::new(4, 4), Pos::new(8, 8));
    assert_eq!(game.activate_skill(now()), Err(ActionError::SkillUnavailable));
    assert_eq!(game.phase(), Phase::Place);
    assert_eq!(game.player(me).points(), 50);
}
