//! End-to-end scenarios driven through the public API.

use std::rc::Rc;
use tickstate::core::{Scope, State, TransitionEdge};
use tickstate::machine::ConfigError;
use tickstate::observe::{Inspect, TransitionLog};
use tickstate::{Driver, ExitState, MachineBuilder, StateMachine};

// Traffic light

struct Light {
    color: &'static str,
    duration_ms: i64,
    remaining_ms: i64,
}

impl Light {
    fn new(color: &'static str, duration_ms: i64) -> Self {
        Self {
            color,
            duration_ms,
            remaining_ms: 0,
        }
    }
}

impl State<Vec<&'static str>> for Light {
    fn on_enter(&mut self, scope: &mut Scope<'_, Vec<&'static str>>) {
        self.remaining_ms = self.duration_ms;
        scope.context_mut().push(self.color);
    }

    fn on_update(&mut self, scope: &mut Scope<'_, Vec<&'static str>>, elapsed_ms: u64) {
        self.remaining_ms -= elapsed_ms as i64;
        if self.remaining_ms <= 0 {
            scope.next();
        }
    }
}

fn lights() -> StateMachine<Vec<&'static str>> {
    let mut machine = StateMachine::new("signal");
    machine
        .add_named_state("Green", Light::new("green", 5000))
        .unwrap();
    machine
        .add_named_state("Yellow", Light::new("yellow", 2000))
        .unwrap();
    machine.add_named_state("Red", Light::new("red", 1500)).unwrap();
    machine
        .add_transition(TransitionEdge::new("Green", "Yellow"))
        .unwrap();
    machine
        .add_transition(TransitionEdge::new("Yellow", "Red"))
        .unwrap();
    machine
        .add_transition(TransitionEdge::new("Red", "Green"))
        .unwrap();
    machine.set_initial_state("Green").unwrap();
    machine
}

fn current<C>(driver: &Driver<C>) -> Option<&str> {
    driver.machine().current_state().map(|s| s.name())
}

#[test]
fn light_stays_green_until_duration_is_spent() {
    let mut driver = Driver::new(lights(), Vec::new());
    driver.enter();

    for _ in 0..5 {
        driver.update(1000);
        assert_eq!(current(&driver), Some("Green"));
    }
    assert!(driver.machine().has_pending_transition());

    driver.update(1000);
    assert_eq!(current(&driver), Some("Yellow"));
    assert_eq!(driver.context(), &vec!["green", "yellow"]);
}

#[test]
fn uneven_ticks_switch_on_the_commit_tick() {
    let mut driver = Driver::new(lights(), Vec::new());
    driver.enter();

    driver.update(3000);
    driver.update(1999);
    assert!(!driver.machine().has_pending_transition());
    driver.update(1);
    assert_eq!(current(&driver), Some("Green"));
    driver.update(16);
    assert_eq!(current(&driver), Some("Yellow"));
}

#[test]
fn light_cycles_through_every_color() {
    let log = Rc::new(TransitionLog::new());
    let mut driver = Driver::new(lights(), Vec::new()).with_observer(log.clone());
    driver.enter();

    for _ in 0..40 {
        driver.update(500);
    }

    assert_eq!(
        &driver.context()[..4],
        &["green", "yellow", "red", "green"]
    );
    assert_eq!(
        &log.path("signal")[..4],
        &["Green", "Yellow", "Red", "Green"]
    );
}

#[test]
fn duplicate_edge_keeps_the_first() {
    let mut machine = lights();
    let err = machine
        .add_transition(TransitionEdge::new("Green", "Yellow"))
        .unwrap_err();
    assert_eq!(
        err,
        ConfigError::DuplicateTransition {
            from: "Green".to_string(),
            to: "Yellow".to_string(),
            name: tickstate::core::DEFAULT_TRANSITION.to_string(),
        }
    );
    assert_eq!(machine.transitions().len(), 3);

    let mut driver = Driver::new(machine, Vec::new());
    driver.enter();
    driver.update(5000);
    driver.update(16);
    assert_eq!(current(&driver), Some("Yellow"));
}

#[test]
fn builder_reports_all_mistakes() {
    let errors = MachineBuilder::<Vec<&'static str>>::new("signal")
        .named_state("Green", Light::new("green", 5000))
        .named_state("Green", Light::new("green", 5000))
        .transition(TransitionEdge::new("Green", "Blue"))
        .initial("Amber")
        .build()
        .unwrap_err();

    assert_eq!(errors.label(), "signal");
    assert_eq!(
        errors.into_errors(),
        vec![
            ConfigError::DuplicateState {
                name: "Green".to_string()
            },
            ConfigError::UnknownState {
                name: "Blue".to_string()
            },
            ConfigError::UnknownState {
                name: "Amber".to_string()
            },
        ]
    );
}

// Battle loop

#[derive(Default)]
struct Battle {
    hero_hp: i32,
    enemy_hp: i32,
    turns: u32,
    turn_over: bool,
}

impl Battle {
    fn new(hero_hp: i32, enemy_hp: i32) -> Self {
        Self {
            hero_hp,
            enemy_hp,
            ..Self::default()
        }
    }
}

struct Choose;

impl State<Battle> for Choose {
    fn on_update(&mut self, scope: &mut Scope<'_, Battle>, _elapsed_ms: u64) {
        scope.next();
    }
}

struct Strike {
    damage: i32,
}

impl State<Battle> for Strike {
    fn on_enter(&mut self, scope: &mut Scope<'_, Battle>) {
        let battle = scope.context_mut();
        battle.enemy_hp -= self.damage;
        battle.turn_over = true;
    }
}

/// Hooks of the player's turn machine; they pick the battle's next state.
struct PlayerTurn;

impl State<Battle> for PlayerTurn {
    fn on_enter(&mut self, scope: &mut Scope<'_, Battle>) {
        let battle = scope.context_mut();
        battle.turns += 1;
        battle.turn_over = false;
    }

    fn on_update(&mut self, scope: &mut Scope<'_, Battle>, _elapsed_ms: u64) {
        if !scope.context().turn_over {
            return;
        }
        if scope.context().enemy_hp <= 0 {
            scope.transition("win");
        } else {
            scope.next();
        }
    }
}

struct EnemyTurn;

impl State<Battle> for EnemyTurn {
    fn on_update(&mut self, scope: &mut Scope<'_, Battle>, _elapsed_ms: u64) {
        scope.context_mut().hero_hp -= 10;
        if scope.context().hero_hp <= 0 {
            scope.transition("lose");
        } else {
            scope.next();
        }
    }
}

fn battle() -> StateMachine<Battle> {
    let turn: StateMachine<Battle> = MachineBuilder::new("player-turn")
        .hooks(PlayerTurn)
        .state(Choose)
        .state(Strike { damage: 30 })
        .transition(TransitionEdge::new("Choose", "Strike"))
        .initial("Choose")
        .build()
        .unwrap();

    MachineBuilder::new("battle")
        .named_state("PlayerTurn", turn)
        .state(EnemyTurn)
        .named_state("Victory", ExitState)
        .named_state("Defeat", ExitState)
        .transitions([
            TransitionEdge::new("PlayerTurn", "EnemyTurn"),
            TransitionEdge::new("PlayerTurn", "Victory").named("win"),
            TransitionEdge::new("EnemyTurn", "PlayerTurn"),
            TransitionEdge::new("EnemyTurn", "Defeat").named("lose"),
        ])
        .initial("PlayerTurn")
        .build()
        .unwrap()
}

fn fight(driver: &mut Driver<Battle>) {
    while !driver.is_finished() && driver.ticks() < 1000 {
        driver.tick(100);
    }
}

#[test]
fn hero_wins_and_battle_finishes() {
    let log = Rc::new(TransitionLog::new());
    let mut driver = Driver::new(battle(), Battle::new(100, 100)).with_observer(log.clone());
    fight(&mut driver);

    assert!(driver.is_finished());
    assert_eq!(current(&driver), None);
    assert!(driver.machine().lifecycle_of("Victory").unwrap().is_awoken());
    assert_eq!(driver.context().turns, 4);
    assert_eq!(driver.context().hero_hp, 70);
    assert_eq!(driver.context().enemy_hp, -20);
    assert_eq!(driver.ticks(), 22);

    assert_eq!(
        log.path("battle"),
        vec![
            "PlayerTurn",
            "EnemyTurn",
            "PlayerTurn",
            "EnemyTurn",
            "PlayerTurn",
            "EnemyTurn",
            "PlayerTurn",
            "Victory",
        ]
    );
    let strikes = log
        .records()
        .iter()
        .filter(|r| r.machine == "player-turn")
        .count();
    assert_eq!(strikes, 4);
}

#[test]
fn hero_loses_against_a_tough_enemy() {
    let mut driver = Driver::new(battle(), Battle::new(100, 1000));
    fight(&mut driver);

    assert!(driver.is_finished());
    assert!(driver.machine().lifecycle_of("Defeat").unwrap().is_awoken());
    assert!(!driver.machine().lifecycle_of("Victory").unwrap().is_awoken());
    assert_eq!(driver.context().hero_hp, 0);
    assert_eq!(driver.context().turns, 10);
}

#[test]
fn player_turn_restarts_from_choose() {
    let mut driver = Driver::new(battle(), Battle::new(100, 100));
    driver.enter();
    for _ in 0..6 {
        driver.update(100);
    }

    assert_eq!(current(&driver), Some("PlayerTurn"));
    let turn = driver.machine().child("PlayerTurn").unwrap();
    assert_eq!(turn.current_state().map(|s| s.name()), Some("Choose"));
    assert_eq!(driver.context().turns, 2);
}

#[test]
fn finished_battle_snapshot_shows_final_position() {
    let mut driver = Driver::new(battle(), Battle::new(100, 100));
    fight(&mut driver);

    let snapshot = driver.snapshot();
    assert!(!snapshot.active);
    assert_eq!(snapshot.root.current, None);
    assert_eq!(snapshot.root.states.len(), 4);

    let victory = &snapshot.root.states[2];
    assert_eq!(victory.name, "Victory");
    assert!(victory.awoken && !victory.active);

    let json = snapshot.to_json().unwrap();
    assert!(json.contains("\"player-turn\""));
}
