use field_pathing::{DriveOutcome, FieldConfig, FieldSession};
use std::sync::mpsc;
use std::thread;

// Randomizes a field, plans a coverage ("mowing") path from the start and drives it on a worker
// thread. Halfway through the speed is turned up, which takes effect on the next step.

fn main() {
    let config = FieldConfig {
        width: 16,
        height: 10,
        obstacle_rate: 0.15,
        ..FieldConfig::default()
    };
    let mut session = FieldSession::new(&config).unwrap();
    println!("{}", session.world());

    let steps = match session.plan_coverage() {
        Ok(path) => path.len(),
        Err(e) => {
            println!("Mow plan failed: {e}");
            return;
        }
    };
    println!("Mow plan ready: {steps} steps, goal moved to {}", session.world().goal());

    let handle = session.start_drive().unwrap();
    let (tx, rx) = mpsc::channel();
    let outcome = thread::scope(|s| {
        let driver = s.spawn(|| {
            let tx = tx;
            session.run_drive(move |agent| tx.send(*agent).unwrap(), |_| {})
        });
        for (i, agent) in rx.iter().enumerate() {
            if i == steps / 2 {
                handle.set_speed(12);
                println!("Speeding up at {}", agent.cell);
            }
        }
        driver.join().unwrap()
    });

    match outcome {
        DriveOutcome::Completed(metrics) => {
            println!("{}", session.world());
            println!(
                "steps: {}, turns: {}, fuel (rough): {}, time (sim): {}s, coverage: {}%",
                metrics.steps,
                metrics.turns,
                metrics.fuel_estimate,
                metrics.simulated_seconds,
                metrics.coverage_percent
            );
        }
        DriveOutcome::Stopped { steps, .. } => println!("Stopped after {steps} steps"),
    }
}
