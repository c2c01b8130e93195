//! Hex board geometry with axial coordinates, plus the static board tables

use serde::{Deserialize, Serialize};

/// Board radius (distance from center to edge)
pub const BOARD_RADIUS: i8 = 3;

/// Number of cells on a radius-3 hexagon
pub const CELL_COUNT: usize = 37;

/// Pieces a colour has to exit to win
pub const PIECES_TO_WIN: u8 = 4;

/// Axial hex coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hex {
    pub q: i8,
    pub r: i8,
}

impl Hex {
    pub const fn new(q: i8, r: i8) -> Self {
        Self { q, r }
    }

    /// Check if this hex is on the board
    pub fn is_valid(&self) -> bool {
        let (q, r) = (self.q as i16, self.r as i16);
        let radius = BOARD_RADIUS as i16;
        q.abs() <= radius && r.abs() <= radius && (q + r).abs() <= radius
    }

    /// Grid distance between two hexes.
    ///
    /// When the row and column deltas have opposite signs the longer one
    /// dominates, otherwise the deltas add up.
    pub fn distance_to(&self, other: Hex) -> i8 {
        let dq = other.q - self.q;
        let dr = other.r - self.r;
        if (dq as i16) * (dr as i16) < 0 {
            dq.abs().max(dr.abs())
        } else {
            (dq + dr).abs()
        }
    }

    /// Get neighbor in direction (0-5)
    pub fn neighbor(&self, direction: usize) -> Hex {
        self.offset(direction, 1)
    }

    /// Hex `steps` cells away in direction (0-5)
    pub fn offset(&self, direction: usize, steps: i8) -> Hex {
        let (dq, dr) = DIRECTIONS[direction % 6];
        Hex::new(self.q + dq * steps, self.r + dr * steps)
    }

    /// Rotate 120 degrees about the board center.
    ///
    /// One rotation carries every colour's start and exit cells onto the
    /// next colour's.
    pub fn rotate_120(&self) -> Hex {
        Hex::new(-(self.q + self.r), self.q)
    }

    /// Rotate `times` steps of 120 degrees
    pub fn rotate(&self, times: usize) -> Hex {
        (0..times % 3).fold(*self, |hex, _| hex.rotate_120())
    }

    /// Dense index of this cell, `None` when off the board
    pub fn index(&self) -> Option<usize> {
        if !self.is_valid() {
            return None;
        }
        let q = self.q as i32;
        let r = self.r as i32;
        let radius = BOARD_RADIUS as i32;
        // cells in the columns left of q
        let before: i32 = (-radius..q).map(column_len).sum();
        let column_start = (-radius).max(-q - radius);
        Some((before + r - column_start) as usize)
    }

    /// Inverse of [`Hex::index`]
    pub fn from_index(index: usize) -> Hex {
        ALL_CELLS[index]
    }
}

fn column_len(q: i32) -> i32 {
    2 * BOARD_RADIUS as i32 + 1 - q.abs()
}

impl std::fmt::Display for Hex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// Direction vectors in axial coordinates (dq, dr), most forward first
pub const DIRECTIONS: [(i8, i8); 6] = [
    (1, 0),
    (1, -1),
    (0, 1),
    (0, -1),
    (-1, 1),
    (-1, 0),
];

/// Every board cell in index order (column by column)
pub static ALL_CELLS: [Hex; CELL_COUNT] = build_cells();

const fn build_cells() -> [Hex; CELL_COUNT] {
    let mut cells = [Hex::new(0, 0); CELL_COUNT];
    let mut i = 0;
    let mut q = -BOARD_RADIUS;
    while q <= BOARD_RADIUS {
        let mut r = -BOARD_RADIUS;
        while r <= BOARD_RADIUS {
            let s = q + r;
            if s >= -BOARD_RADIUS && s <= BOARD_RADIUS {
                cells[i] = Hex::new(q, r);
                i += 1;
            }
            r += 1;
        }
        q += 1;
    }
    cells
}

// ============================================================================
// COLOURS
// ============================================================================

/// Player colour, cyclically ordered red -> green -> blue
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Colour {
    Red = 0,
    Green = 1,
    Blue = 2,
}

impl Colour {
    pub const ALL: [Colour; 3] = [Colour::Red, Colour::Green, Colour::Blue];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Colour {
        Colour::ALL[index % 3]
    }

    /// Next colour in turn order
    pub fn next(self) -> Colour {
        Colour::from_index(self.index() + 1)
    }

    /// Colour `steps` turns after this one
    pub fn advance(self, steps: usize) -> Colour {
        Colour::from_index(self.index() + steps % 3)
    }

    /// Rotations that carry this colour onto red
    pub fn rotations_to_red(self) -> usize {
        (3 - self.index()) % 3
    }

    pub fn name(self) -> &'static str {
        match self {
            Colour::Red => "red",
            Colour::Green => "green",
            Colour::Blue => "blue",
        }
    }
}

impl std::fmt::Display for Colour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Colour {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "red" => Ok(Colour::Red),
            "green" => Ok(Colour::Green),
            "blue" => Ok(Colour::Blue),
            other => Err(format!("unknown colour: {}", other)),
        }
    }
}

/// What sits on an occupied cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Occupant {
    Piece(Colour),
    Block,
}

impl Occupant {
    pub fn colour(self) -> Option<Colour> {
        match self {
            Occupant::Piece(colour) => Some(colour),
            Occupant::Block => None,
        }
    }

    /// Rotate the colour of a piece; blocks stay blocks
    pub fn advance(self, steps: usize) -> Occupant {
        match self {
            Occupant::Piece(colour) => Occupant::Piece(colour.advance(steps)),
            Occupant::Block => Occupant::Block,
        }
    }
}

// ============================================================================
// BOARD CONFIGURATION
// ============================================================================

/// Static board tables: exit cells, start cells and the win threshold.
///
/// Built once and passed by reference into the rules and evaluators.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub exits: [[Hex; 4]; 3],
    pub starts: [[Hex; 4]; 3],
    pub pieces_to_win: u8,
}

impl BoardConfig {
    /// The standard three-player board
    pub fn standard() -> Self {
        Self {
            exits: [
                [Hex::new(3, -3), Hex::new(3, -2), Hex::new(3, -1), Hex::new(3, 0)],
                [Hex::new(-3, 3), Hex::new(-2, 3), Hex::new(-1, 3), Hex::new(0, 3)],
                [Hex::new(0, -3), Hex::new(-1, -2), Hex::new(-2, -1), Hex::new(-3, 0)],
            ],
            starts: [
                [Hex::new(-3, 0), Hex::new(-3, 1), Hex::new(-3, 2), Hex::new(-3, 3)],
                [Hex::new(0, -3), Hex::new(1, -3), Hex::new(2, -3), Hex::new(3, -3)],
                [Hex::new(0, 3), Hex::new(1, 2), Hex::new(2, 1), Hex::new(3, 0)],
            ],
            pieces_to_win: PIECES_TO_WIN,
        }
    }

    pub fn exits(&self, colour: Colour) -> &[Hex; 4] {
        &self.exits[colour.index()]
    }

    pub fn starts(&self, colour: Colour) -> &[Hex; 4] {
        &self.starts[colour.index()]
    }

    pub fn is_exit(&self, colour: Colour, hex: Hex) -> bool {
        self.exits(colour).contains(&hex)
    }

    /// Shortest grid distance from `hex` to any exit cell of `colour`
    pub fn exit_distance(&self, colour: Colour, hex: Hex) -> i8 {
        self.exits(colour)
            .iter()
            .map(|exit| hex.distance_to(*exit))
            .min()
            .unwrap_or(0)
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self::standard()
    }
}
