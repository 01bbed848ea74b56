//! Traffic Light State Machine
//!
//! This example demonstrates a simple cyclic state machine driven by a
//! fixed frame time.
//!
//! Key concepts:
//! - Cyclic default edges (Green -> Yellow -> Red -> Green)
//! - States that keep their own timers
//! - One commit per tick: the color changes on the tick after the timer
//!   runs out
//! - Observing transitions with a `TransitionLog`
//!
//! Run with: cargo run --example traffic_light
//! Set RUST_LOG=tickstate=trace to see every enter and exit.

use std::rc::Rc;
use tickstate::core::{Scope, State, TransitionEdge};
use tickstate::{Driver, MachineBuilder, TransitionLog};
use tracing_subscriber::EnvFilter;

const FRAME_MS: u64 = 250;

#[derive(Default)]
struct Crossing {
    color: &'static str,
    cycles: u32,
}

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

impl State<Crossing> for Light {
    fn on_enter(&mut self, scope: &mut Scope<'_, Crossing>) {
        self.remaining_ms = self.duration_ms;
        scope.context_mut().color = self.color;
        println!("  [tick {:>3}] light is {}", scope.tick(), self.color);
    }

    fn on_update(&mut self, scope: &mut Scope<'_, Crossing>, elapsed_ms: u64) {
        self.remaining_ms -= elapsed_ms as i64;
        if self.remaining_ms <= 0 {
            scope.next();
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Traffic Light State Machine ===\n");

    let machine = MachineBuilder::new("traffic-light")
        .named_state("Green", Light::new("green", 5000))
        .named_state("Yellow", Light::new("yellow", 2000))
        .named_state("Red", Light::new("red", 1500))
        .transitions([
            TransitionEdge::new("Green", "Yellow"),
            TransitionEdge::new("Yellow", "Red"),
            TransitionEdge::new("Red", "Green")
                .on_commit(|crossing: &mut Crossing| crossing.cycles += 1),
        ])
        .initial("Green")
        .build();

    let machine = match machine {
        Ok(machine) => machine,
        Err(errors) => {
            eprintln!("{errors}");
            return;
        }
    };

    let log = Rc::new(TransitionLog::new());
    let mut driver = Driver::new(machine, Crossing::default()).with_observer(log.clone());

    println!("Driving at {FRAME_MS}ms per frame until two full cycles:\n");
    while driver.context().cycles < 2 {
        driver.tick(FRAME_MS);
    }

    println!(
        "\nFinished on {} after {} ticks ({}ms)",
        driver.context().color,
        driver.ticks(),
        driver.elapsed_ms()
    );
    println!("Path: {}", log.path("traffic-light").join(" -> "));

    match driver.snapshot().to_json() {
        Ok(json) => println!("\nSnapshot:\n{json}"),
        Err(e) => eprintln!("snapshot failed: {e}"),
    }

    println!("\n=== Example Complete ===");
}
