use crate::infra::{Bounds, Position, Tile, TileError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObservationError {
    #[error("observation window is empty")]
    Empty,
    #[error("observation row {row} has {len} cells, expected {side}")]
    NotSquare { row: usize, len: usize, side: usize },
    #[error("observation side {0} is even, the agent must be centred")]
    EvenSide(usize),
    #[error(transparent)]
    Tile(#[from] TileError),
}

/// Square window of tiles centred on the observing agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    side: usize,
    cells: Vec<Tile>,
}

impl Observation {
    pub fn new(rows: Vec<Vec<Tile>>) -> Result<Self, ObservationError> {
        let side = rows.len();
        if side == 0 {
            return Err(ObservationError::Empty);
        }
        if side % 2 == 0 {
            return Err(ObservationError::EvenSide(side));
        }
        let mut cells = Vec::with_capacity(side * side);
        for (row, tiles) in rows.into_iter().enumerate() {
            if tiles.len() != side {
                return Err(ObservationError::NotSquare {
                    row,
                    len: tiles.len(),
                    side,
                });
            }
            cells.extend(tiles);
        }
        Ok(Self { side, cells })
    }

    pub fn parse(rows: &[&str]) -> Result<Self, ObservationError> {
        let tiles = rows
            .iter()
            .map(|row| row.chars().map(Tile::from_char).collect::<Result<Vec<_>, _>>())
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(tiles)
    }

    /// Builds a window of the given radius from a tile lookup keyed by the
    /// (dx, dy) offset from the centre.
    pub fn from_fn<F>(radius: i32, mut tile_at: F) -> Self
    where
        F: FnMut(i32, i32) -> Tile,
    {
        let r = radius.max(0);
        let side = (r * 2 + 1) as usize;
        let mut cells = Vec::with_capacity(side * side);
        for dy in -r..=r {
            for dx in -r..=r {
                cells.push(tile_at(dx, dy));
            }
        }
        Self { side, cells }
    }

    /// Window of `Unknown` tiles, i.e. an observation that carries nothing.
    pub fn unknown(radius: i32) -> Self {
        Self::from_fn(radius, |_, _| Tile::Unknown)
    }

    pub fn radius(&self) -> i32 {
        (self.side / 2) as i32
    }

    pub fn side(&self) -> usize {
        self.side
    }

    /// Tile at offset (dx, dy) from the centre, `None` outside the window.
    pub fn get(&self, dx: i32, dy: i32) -> Option<Tile> {
        let r = self.radius();
        if dx.abs() > r || dy.abs() > r {
            return None;
        }
        let col = (dx + r) as usize;
        let row = (dy + r) as usize;
        self.cells.get(row * self.side + col).copied()
    }

    /// Iterates `(dx, dy, tile)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32, Tile)> + '_ {
        let r = self.radius();
        let side = self.side;
        self.cells.iter().enumerate().map(move |(idx, tile)| {
            let dx = (idx % side) as i32 - r;
            let dy = (idx / side) as i32 - r;
            (dx, dy, *tile)
        })
    }

    /// World rectangle covered when the window is centred on `center`.
    pub fn bounds(&self, center: Position) -> Bounds {
        Bounds::from_center_and_range(center, self.radius())
    }
}
