use std::collections::HashMap;

use crate::infra::{Position, Tile, TileError};

/// Partial map of the arena, built from observations. Cells never seen are
/// absent; `Tile::Unknown` is never stored.
#[derive(Clone, Debug)]
pub struct Map {
    pub width: i32,
    pub height: i32,
    tiles: HashMap<Position, Tile>,
}

impl Map {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            tiles: HashMap::new(),
        }
    }

    /// Builds a fully known map from ASCII rows. `?` cells stay absent.
    pub fn from_rows(rows: &[&str]) -> Result<Self, TileError> {
        let height = rows.len() as i32;
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0) as i32;
        let mut map = Map::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, symbol) in row.chars().enumerate() {
                let tile = Tile::from_char(symbol)?;
                map.record(Position::new(x as i32, y as i32), tile);
            }
        }
        Ok(map)
    }

    pub fn in_bounds(&self, pos: &Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    pub fn get(&self, pos: &Position) -> Option<&Tile> {
        self.tiles.get(pos)
    }

    pub fn contains(&self, pos: &Position) -> bool {
        self.tiles.contains_key(pos)
    }

    /// First writer wins: a known cell is never overwritten, unknown and
    /// out-of-bounds cells are ignored. Returns true if the cell was new.
    pub fn record(&mut self, pos: Position, tile: Tile) -> bool {
        if tile.is_unknown() || !self.in_bounds(&pos) || self.tiles.contains_key(&pos) {
            return false;
        }
        self.tiles.insert(pos, tile);
        true
    }

    /// Known and not a wall or obstacle.
    pub fn is_traversable(&self, pos: &Position) -> bool {
        self.get(pos).is_some_and(|tile| !tile.is_blocking())
    }

    /// Any known cell satisfying `predicate`, lowest coordinate first so the
    /// answer does not depend on hash order.
    pub fn find<F>(&self, predicate: F) -> Option<Position>
    where
        F: Fn(&Tile) -> bool,
    {
        self.tiles
            .iter()
            .filter(|(_, tile)| predicate(tile))
            .map(|(pos, _)| *pos)
            .min_by_key(|pos| (pos.y, pos.x))
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Position, &Tile)> {
        self.tiles.iter()
    }

    pub fn draw_ascii(&self) -> String {
        let mut output = String::new();
        for y in 0..self.height {
            for x in 0..self.width {
                let symbol = self
                    .get(&Position::new(x, y))
                    .map_or(' ', |tile| tile.to_char());
                output.push(symbol);
            }
            output.push('\n');
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::Team;

    #[test]
    fn test_first_writer_wins() {
        let mut map = Map::new(4, 4);
        let pos = Position::new(1, 1);
        assert!(map.record(pos, Tile::Wall));
        assert!(!map.record(pos, Tile::Empty));
        assert_eq!(map.get(&pos), Some(&Tile::Wall));
    }

    #[test]
    fn test_unknown_and_out_of_bounds_are_ignored() {
        let mut map = Map::new(2, 2);
        assert!(!map.record(Position::new(0, 0), Tile::Unknown));
        assert!(!map.record(Position::new(2, 0), Tile::Empty));
        assert!(!map.record(Position::new(0, -1), Tile::Empty));
        assert!(map.is_empty());
    }

    #[test]
    fn test_from_rows_and_find() {
        let map = Map::from_rows(&["..R", "#?.", "B.."]).unwrap();
        assert_eq!(map.width, 3);
        assert_eq!(map.height, 3);
        assert_eq!(map.len(), 8);
        assert!(!map.contains(&Position::new(1, 1)));
        assert!(!map.is_traversable(&Position::new(0, 1)));
        assert_eq!(
            map.find(|tile| tile.is_own_flag(Team::Blue)),
            Some(Position::new(0, 2))
        );
    }
}
