use field_pathing::{AstarSolver, GridSolver, GridWorld};

// In this example a path is found on a small fenced field with shape
//  _______
// |#######|
// |#S..#.#|
// |#.#...#|
// |#...#G#|
// |#######|
//  _______
// where
// - # marks an obstacle (the border is always fenced)
// - S marks the start
// - G marks the goal
//
// Moves are restricted to the 4-neighbourhood.

fn main() {
    let world = GridWorld::from_rows(&[
        "#######", //
        "#S..#.#", //
        "#.#...#", //
        "#...#G#", //
        "#######",
    ])
    .unwrap();
    println!("{}", world);
    let solver = AstarSolver::new();
    let path = solver.find_path(&world, world.start(), world.goal());
    println!("Path of {} steps:", path.len());
    for p in path {
        println!("{}", p);
    }
}
