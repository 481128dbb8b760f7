use std::fmt;

use crate::infra::Team;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TileError {
    #[error("unrecognised tile symbol {0:?}")]
    UnknownSymbol(char),
}

/// Tile vocabulary as reported by the game. Team-owned tiles are absolute;
/// use the team-relative predicates to interpret them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tile {
    Empty,
    Wall,
    Obstacle,
    FlagCollider(Team),
    Flag(Team),
    Agent { team: Team, carrying: bool },
    Unknown,
}

impl Tile {
    pub fn from_char(symbol: char) -> Result<Tile, TileError> {
        let tile = match symbol {
            '.' => Tile::Empty,
            '#' => Tile::Wall,
            '/' => Tile::Obstacle,
            '{' => Tile::FlagCollider(Team::Blue),
            '}' => Tile::FlagCollider(Team::Red),
            'B' => Tile::Flag(Team::Blue),
            'R' => Tile::Flag(Team::Red),
            'b' => Tile::Agent {
                team: Team::Blue,
                carrying: false,
            },
            'p' => Tile::Agent {
                team: Team::Blue,
                carrying: true,
            },
            'r' => Tile::Agent {
                team: Team::Red,
                carrying: false,
            },
            'q' => Tile::Agent {
                team: Team::Red,
                carrying: true,
            },
            '?' => Tile::Unknown,
            other => return Err(TileError::UnknownSymbol(other)),
        };
        Ok(tile)
    }

    pub fn to_char(self) -> char {
        match self {
            Tile::Empty => '.',
            Tile::Wall => '#',
            Tile::Obstacle => '/',
            Tile::FlagCollider(Team::Blue) => '{',
            Tile::FlagCollider(Team::Red) => '}',
            Tile::Flag(Team::Blue) => 'B',
            Tile::Flag(Team::Red) => 'R',
            Tile::Agent {
                team: Team::Blue,
                carrying,
            } => {
                if carrying {
                    'p'
                } else {
                    'b'
                }
            }
            Tile::Agent {
                team: Team::Red,
                carrying,
            } => {
                if carrying {
                    'q'
                } else {
                    'r'
                }
            }
            Tile::Unknown => '?',
        }
    }

    pub fn is_blocking(self) -> bool {
        matches!(self, Tile::Wall | Tile::Obstacle)
    }

    pub fn is_unknown(self) -> bool {
        self == Tile::Unknown
    }

    pub fn is_own_flag(self, team: Team) -> bool {
        self == Tile::Flag(team)
    }

    pub fn is_enemy_flag(self, team: Team) -> bool {
        self == Tile::Flag(team.opponent())
    }

    /// Plain or flag-carrying agent of the opposing team.
    pub fn is_enemy_agent(self, team: Team) -> bool {
        matches!(self, Tile::Agent { team: other, .. } if other == team.opponent())
    }

    pub fn is_flag_collider_of(self, team: Team) -> bool {
        self == Tile::FlagCollider(team)
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols_parse_back() {
        for symbol in ".#/{}BRbprq?".chars() {
            let tile = Tile::from_char(symbol).unwrap();
            assert_eq!(tile.to_char(), symbol);
        }
        assert_eq!(Tile::from_char('x'), Err(TileError::UnknownSymbol('x')));
    }

    #[test]
    fn test_team_relative_predicates() {
        let red_carrier = Tile::from_char('q').unwrap();
        assert!(red_carrier.is_enemy_agent(Team::Blue));
        assert!(!red_carrier.is_enemy_agent(Team::Red));

        assert!(Tile::Flag(Team::Blue).is_own_flag(Team::Blue));
        assert!(Tile::Flag(Team::Blue).is_enemy_flag(Team::Red));
        assert!(Tile::Obstacle.is_blocking());
        assert!(!Tile::FlagCollider(Team::Red).is_blocking());
    }
}
