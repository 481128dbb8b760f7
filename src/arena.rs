use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, info};

use crate::infra::{Action, Direction, Position, Team, Tile, TileError};
use crate::state::Observation;

pub const START_HEALTH: i32 = 3;
pub const START_AMMO: i32 = 10;
/// Ticks an agent waits after firing before it can fire again.
pub const SHOT_COOLDOWN: u32 = 2;

pub const DEFAULT_ARENA: &str = "\
###################
#B.b.{....#....}.R#
#.......#...#.....#
#..b..#.......#.r.#
#.....#..###..#...#
#..b....#...#...r.#
#{.....#.....#..r}#
###################
";

#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    #[error("arena has no rows")]
    Empty,
    #[error("line {line}, column {column}: {source}")]
    Symbol {
        line: usize,
        column: usize,
        source: TileError,
    },
    #[error("line {line}, column {column}: arenas cannot contain unknown cells")]
    UnknownCell { line: usize, column: usize },
    #[error("line {line} has {found} cells, expected {expected}")]
    Ragged {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("{0} flag is missing")]
    MissingFlag(Team),
    #[error("{0} flag appears more than once")]
    DuplicateFlag(Team),
    #[error("{0} team has no agents")]
    NoAgents(Team),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Physical state of one agent in the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    pub team: Team,
    /// Index within the team.
    pub index: usize,
    pub position: Position,
    pub health: i32,
    pub ammo: i32,
    pub cooldown: u32,
    pub carrying: bool,
    pub alive: bool,
}

impl Body {
    pub fn can_shoot(&self) -> bool {
        self.alive && self.ammo > 0 && self.cooldown == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArenaEvent {
    Moved { body: usize, to: Position },
    Bumped { body: usize, direction: Direction },
    Fired { body: usize, direction: Direction },
    Hit { shooter: usize, target: usize, eliminated: bool },
    FlagTaken { body: usize, flag: Team },
    FlagReturned { flag: Team },
    Captured { team: Team },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FlagState {
    home: Position,
    at_home: bool,
}

/// Ground truth world used by the local game loop.
#[derive(Debug, Clone)]
pub struct Arena {
    width: i32,
    height: i32,
    terrain: Vec<Tile>,
    flags: [FlagState; 2],
    bodies: Vec<Body>,
}

fn slot(team: Team) -> usize {
    match team {
        Team::Blue => 0,
        Team::Red => 1,
    }
}

impl Arena {
    pub fn load(path: &Path) -> Result<Self, ArenaError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parses an ASCII arena. Agent symbols mark spawn points on empty
    /// floor; each team needs exactly one flag and at least one agent.
    pub fn parse(text: &str) -> Result<Self, ArenaError> {
        let rows: Vec<&str> = text.lines().map(str::trim_end).filter(|row| !row.is_empty()).collect();
        let width = rows.first().ok_or(ArenaError::Empty)?.chars().count();

        let mut terrain = Vec::with_capacity(width * rows.len());
        let mut flag_homes: [Option<Position>; 2] = [None, None];
        let mut bodies = Vec::new();
        let mut team_sizes = [0usize; 2];

        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(ArenaError::Ragged {
                    line: y + 1,
                    expected: width,
                    found,
                });
            }
            for (x, symbol) in row.chars().enumerate() {
                let position = Position::new(x as i32, y as i32);
                let tile = Tile::from_char(symbol).map_err(|source| ArenaError::Symbol {
                    line: y + 1,
                    column: x + 1,
                    source,
                })?;
                let floor = match tile {
                    Tile::Unknown => {
                        return Err(ArenaError::UnknownCell {
                            line: y + 1,
                            column: x + 1,
                        });
                    }
                    Tile::Agent { team, .. } => {
                        bodies.push(Body {
                            team,
                            index: team_sizes[slot(team)],
                            position,
                            health: START_HEALTH,
                            ammo: START_AMMO,
                            cooldown: 0,
                            carrying: false,
                            alive: true,
                        });
                        team_sizes[slot(team)] += 1;
                        Tile::Empty
                    }
                    Tile::Flag(team) => {
                        if flag_homes[slot(team)].replace(position).is_some() {
                            return Err(ArenaError::DuplicateFlag(team));
                        }
                        tile
                    }
                    other => other,
                };
                terrain.push(floor);
            }
        }

        let mut flags = [FlagState {
            home: Position::new(0, 0),
            at_home: true,
        }; 2];
        for team in [Team::Blue, Team::Red] {
            flags[slot(team)].home = flag_homes[slot(team)].ok_or(ArenaError::MissingFlag(team))?;
            if team_sizes[slot(team)] == 0 {
                return Err(ArenaError::NoAgents(team));
            }
        }

        Ok(Self {
            width: width as i32,
            height: rows.len() as i32,
            terrain,
            flags,
            bodies,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, body: usize) -> &Body {
        &self.bodies[body]
    }

    pub fn alive_count(&self, team: Team) -> usize {
        self.bodies.iter().filter(|b| b.alive && b.team == team).count()
    }

    pub fn flag_home(&self, team: Team) -> Position {
        self.flags[slot(team)].home
    }

    pub fn flag_at_home(&self, team: Team) -> bool {
        self.flags[slot(team)].at_home
    }

    fn in_bounds(&self, pos: &Position) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    fn terrain_at(&self, pos: &Position) -> Option<Tile> {
        if !self.in_bounds(pos) {
            return None;
        }
        self.terrain.get((pos.y * self.width + pos.x) as usize).copied()
    }

    fn body_at(&self, pos: &Position) -> Option<usize> {
        self.bodies.iter().position(|b| b.alive && b.position == *pos)
    }

    /// What an observer sees at `pos`: living agents over the floor, flags
    /// only while at home, `Unknown` outside the arena.
    pub fn tile_at(&self, pos: &Position) -> Tile {
        if let Some(body) = self.body_at(pos) {
            let body = &self.bodies[body];
            return Tile::Agent {
                team: body.team,
                carrying: body.carrying,
            };
        }
        match self.terrain_at(pos) {
            Some(Tile::Flag(team)) if !self.flag_at_home(team) => Tile::Empty,
            Some(tile) => tile,
            None => Tile::Unknown,
        }
    }

    pub fn observe(&self, body: usize, radius: i32) -> Observation {
        let center = self.bodies[body].position;
        Observation::from_fn(radius, |dx, dy| self.tile_at(&Position::new(center.x + dx, center.y + dy)))
    }

    /// Applies one agent's action, then resolves flag pickup and capture for
    /// that agent. `range` bounds how far shots travel.
    pub fn apply(&mut self, body: usize, action: Action, range: i32) -> Vec<ArenaEvent> {
        let mut events = Vec::new();
        if !self.bodies[body].alive {
            return events;
        }
        match action {
            Action::Idle => {}
            Action::Move(direction) => self.step(body, direction, &mut events),
            Action::Shoot(direction) => self.fire(body, direction, range, &mut events),
        }
        self.resolve_flags(body, &mut events);
        events
    }

    /// Counts down shot cooldowns; called once per tick.
    pub fn cool_down(&mut self) {
        for body in self.bodies.iter_mut() {
            body.cooldown = body.cooldown.saturating_sub(1);
        }
    }

    fn step(&mut self, body: usize, direction: Direction, events: &mut Vec<ArenaEvent>) {
        let target = self.bodies[body].position.step(direction);
        let open = self.terrain_at(&target).is_some_and(|tile| !tile.is_blocking());
        if open && self.body_at(&target).is_none() {
            self.bodies[body].position = target;
            events.push(ArenaEvent::Moved { body, to: target });
        } else {
            events.push(ArenaEvent::Bumped { body, direction });
        }
    }

    fn fire(&mut self, body: usize, direction: Direction, range: i32, events: &mut Vec<ArenaEvent>) {
        if !self.bodies[body].can_shoot() {
            return;
        }
        let shooter_team = self.bodies[body].team;
        self.bodies[body].ammo -= 1;
        self.bodies[body].cooldown = SHOT_COOLDOWN;
        events.push(ArenaEvent::Fired { body, direction });

        let mut pos = self.bodies[body].position;
        for _ in 0..range {
            pos = pos.step(direction);
            if self.terrain_at(&pos).is_none_or(|tile| tile.is_blocking()) {
                return;
            }
            let Some(target) = self.body_at(&pos) else {
                continue;
            };
            if self.bodies[target].team == shooter_team {
                return;
            }
            let victim = &mut self.bodies[target];
            victim.health -= 1;
            let eliminated = victim.health <= 0;
            events.push(ArenaEvent::Hit {
                shooter: body,
                target,
                eliminated,
            });
            if eliminated {
                victim.alive = false;
                if victim.carrying {
                    victim.carrying = false;
                    let flag = victim.team.opponent();
                    self.flags[slot(flag)].at_home = true;
                    events.push(ArenaEvent::FlagReturned { flag });
                }
                debug!(target, "Agent eliminated");
            }
            return;
        }
    }

    fn resolve_flags(&mut self, body: usize, events: &mut Vec<ArenaEvent>) {
        let Body {
            team,
            position,
            carrying,
            ..
        } = self.bodies[body];
        let enemy = team.opponent();

        if !carrying && position == self.flag_home(enemy) && self.flag_at_home(enemy) {
            self.flags[slot(enemy)].at_home = false;
            self.bodies[body].carrying = true;
            info!(%team, body, "Enemy flag taken");
            events.push(ArenaEvent::FlagTaken { body, flag: enemy });
        } else if carrying && position == self.flag_home(team) && self.flag_at_home(team) {
            info!(%team, body, "Flag captured");
            events.push(ArenaEvent::Captured { team });
        }
    }

    pub fn render(&self) -> String {
        let mut output = String::with_capacity(((self.width + 1) * self.height) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                output.push(self.tile_at(&Position::new(x, y)).to_char());
            }
            output.push('\n');
        }
        output
    }
}
