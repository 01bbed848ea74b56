//! Turn-Based Battle
//!
//! This example demonstrates nested machines and self-termination.
//!
//! Key concepts:
//! - A sub-machine as a state (the player's turn has its own steps)
//! - Machine hooks that move the outer machine between siblings
//! - Named and guarded edges
//! - `ExitState` ending the battle and finishing the driver
//!
//! Run with: cargo run --example battle
//! Set RUST_LOG=tickstate=debug to see every accepted transition.

use tickstate::core::{Scope, State, TransitionEdge};
use tickstate::{Driver, ExitState, MachineBuilder, StateMachine};
use tracing_subscriber::EnvFilter;

struct Battle {
    hero_hp: i32,
    enemy_hp: i32,
    potions: u32,
    round: u32,
    turn_over: bool,
}

/// Step of the player's turn: pick an action.
struct Choose;

impl State<Battle> for Choose {
    fn on_update(&mut self, scope: &mut Scope<'_, Battle>, _elapsed_ms: u64) {
        // The guard on "heal" decides whether drinking is possible.
        if scope.context().hero_hp < 40 && scope.transition("heal") {
            return;
        }
        scope.transition("attack");
    }
}

struct Attack;

impl State<Battle> for Attack {
    fn on_enter(&mut self, scope: &mut Scope<'_, Battle>) {
        let battle = scope.context_mut();
        let damage = 18 + (battle.round as i32 % 3) * 4;
        battle.enemy_hp -= damage;
        battle.turn_over = true;
        println!("  hero strikes for {damage} (enemy at {})", battle.enemy_hp);
    }
}

struct Heal;

impl State<Battle> for Heal {
    fn on_enter(&mut self, scope: &mut Scope<'_, Battle>) {
        let battle = scope.context_mut();
        battle.potions -= 1;
        battle.hero_hp += 35;
        battle.turn_over = true;
        println!("  hero drinks a potion (hero at {})", battle.hero_hp);
    }
}

/// Hooks of the player's turn. They run in the battle's scope, so they
/// pick the battle's next state once the turn is over.
struct PlayerTurn;

impl State<Battle> for PlayerTurn {
    fn on_enter(&mut self, scope: &mut Scope<'_, Battle>) {
        let battle = scope.context_mut();
        battle.round += 1;
        battle.turn_over = false;
        println!("Round {}", battle.round);
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
        let battle = scope.context_mut();
        battle.hero_hp -= 15;
        println!("  enemy hits for 15 (hero at {})", battle.hero_hp);
        if battle.hero_hp <= 0 {
            scope.transition("lose");
        } else {
            scope.next();
        }
    }
}

fn player_turn() -> Result<StateMachine<Battle>, tickstate::machine::BuildErrors> {
    MachineBuilder::new("player-turn")
        .hooks(PlayerTurn)
        .state(Choose)
        .state(Attack)
        .state(Heal)
        .transitions([
            TransitionEdge::new("Choose", "Attack").named("attack"),
            TransitionEdge::new("Choose", "Heal")
                .named("heal")
                .when(|battle: &Battle| battle.potions > 0),
        ])
        .initial("Choose")
        .build()
}

fn battle() -> Result<StateMachine<Battle>, tickstate::machine::BuildErrors> {
    MachineBuilder::new("battle")
        .named_state("PlayerTurn", player_turn()?)
        .state(EnemyTurn)
        .named_state("Victory", ExitState)
        .named_state("Defeat", ExitState)
        .transitions([
            TransitionEdge::new("PlayerTurn", "EnemyTurn"),
            TransitionEdge::new("PlayerTurn", "Victory")
                .named("win")
                .on_commit(|_: &mut Battle| println!("The enemy falls.")),
            TransitionEdge::new("EnemyTurn", "PlayerTurn"),
            TransitionEdge::new("EnemyTurn", "Defeat")
                .named("lose")
                .on_commit(|_: &mut Battle| println!("The hero falls.")),
        ])
        .initial("PlayerTurn")
        .build()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Turn-Based Battle ===\n");

    let context = Battle {
        hero_hp: 60,
        enemy_hp: 120,
        potions: 2,
        round: 0,
        turn_over: false,
    };
    let mut driver = Driver::new(battle()?, context);

    while !driver.is_finished() {
        driver.tick(16);
    }

    let battle = driver.context();
    println!(
        "\nBattle over after {} rounds and {} ticks: hero {}, enemy {}",
        battle.round,
        driver.ticks(),
        battle.hero_hp,
        battle.enemy_hp
    );

    let snapshot = driver.snapshot();
    println!("\nFinal snapshot:\n{}", snapshot.to_json()?);

    println!("\n=== Example Complete ===");
    Ok(())
}
