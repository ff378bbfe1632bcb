use core::fmt;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A grid coordinate given as (column, row). Rows grow southwards, so the north neighbour of a
/// cell has a smaller row index. Coordinates are signed so neighbours of border cells can be
/// formed and then rejected by a bounds check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub col: i32,
    pub row: i32,
}

impl Cell {
    pub const fn new(col: i32, row: i32) -> Cell {
        Cell { col, row }
    }

    /// The [Manhattan distance](https://en.wikipedia.org/wiki/Taxicab_geometry), which is the
    /// exact 4-connected distance on an empty grid.
    pub fn manhattan_distance(&self, other: &Cell) -> i32 {
        (self.col - other.col).abs() + (self.row - other.row).abs()
    }

    /// The von Neumann neighbourhood in north, south, west, east order.
    pub fn neumann_neighborhood(&self) -> SmallVec<[Cell; 4]> {
        Heading::ALL
            .iter()
            .map(|heading| *self + *heading)
            .collect()
    }

    /// Whether `other` is one of the four axis-aligned neighbours.
    pub fn is_adjacent(&self, other: &Cell) -> bool {
        self.manhattan_distance(other) == 1
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Cardinal heading of the agent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    North,
    South,
    #[default]
    East,
    West,
}

impl Heading {
    pub const ALL: [Heading; 4] = [Heading::North, Heading::South, Heading::West, Heading::East];

    /// Heading of a move from `from` to `to`. Vertical movement wins, which is unambiguous for
    /// 4-connected moves since only one axis changes at a time.
    pub fn between(from: &Cell, to: &Cell) -> Heading {
        if to.row < from.row {
            Heading::North
        } else if to.row > from.row {
            Heading::South
        } else if to.col < from.col {
            Heading::West
        } else {
            Heading::East
        }
    }

    /// Unit offset as (d_col, d_row).
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Heading::North => (0, -1),
            Heading::South => (0, 1),
            Heading::East => (1, 0),
            Heading::West => (-1, 0),
        }
    }
}

impl core::ops::Add<Heading> for Cell {
    type Output = Cell;

    fn add(self, heading: Heading) -> Cell {
        let (d_col, d_row) = heading.offset();
        Cell::new(self.col + d_col, self.row + d_row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbourhood_order() {
        let c = Cell::new(3, 3);
        let n = c.neumann_neighborhood();
        assert_eq!(
            n.as_slice(),
            &[
                Cell::new(3, 2),
                Cell::new(3, 4),
                Cell::new(2, 3),
                Cell::new(4, 3)
            ]
        );
        assert!(n.iter().all(|p| p.is_adjacent(&c)));
    }

    #[test]
    fn heading_between_neighbours() {
        let c = Cell::new(5, 5);
        for heading in Heading::ALL {
            assert_eq!(Heading::between(&c, &(c + heading)), heading);
        }
    }

    #[test]
    fn manhattan() {
        assert_eq!(Cell::new(1, 1).manhattan_distance(&Cell::new(4, -3)), 7);
    }
}
