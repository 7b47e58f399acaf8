//! Room decomposition
//!
//! Tunnel cells (exactly two free neighbours, on opposite sides) separate the
//! level into rooms: connected components of the remaining cells.

use std::collections::VecDeque;

use super::IndexMap;
use crate::board::Direction;

/// Levels splitting into more rooms than this are rejected.
pub const MAX_ROOMS: usize = 200;

#[derive(Debug, Clone, Default)]
pub struct Rooms {
    room_of: Vec<Option<u16>>,
    sizes: Vec<usize>,
    tunnel: Vec<bool>,
}

impl Rooms {
    /// Decompose the level, or return the room count when it exceeds
    /// [`MAX_ROOMS`].
    pub fn analyse(map: &IndexMap) -> Result<Rooms, usize> {
        let tunnel: Vec<bool> = map.indices().map(|i| is_tunnel(map, i)).collect();
        let mut room_of = vec![None; map.len()];
        let mut sizes = Vec::new();

        for start in map.indices() {
            if tunnel[start as usize] || room_of[start as usize].is_some() {
                continue;
            }
            let id = sizes.len() as u16;
            let mut size = 0;
            let mut queue = VecDeque::from([start]);
            room_of[start as usize] = Some(id);
            while let Some(cell) = queue.pop_front() {
                size += 1;
                for dir in Direction::ALL {
                    if let Some(n) = map.neighbor(cell, dir) {
                        if !tunnel[n as usize] && room_of[n as usize].is_none() {
                            room_of[n as usize] = Some(id);
                            queue.push_back(n);
                        }
                    }
                }
            }
            sizes.push(size);
            if sizes.len() > MAX_ROOMS {
                return Err(sizes.len());
            }
        }

        Ok(Rooms {
            room_of,
            sizes,
            tunnel,
        })
    }

    pub fn room_of(&self, cell: u16) -> Option<u16> {
        self.room_of[cell as usize]
    }

    pub fn is_tunnel(&self, cell: u16) -> bool {
        self.tunnel[cell as usize]
    }

    pub fn count(&self) -> usize {
        self.sizes.len()
    }

    pub fn size(&self, room: u16) -> usize {
        self.sizes[room as usize]
    }

    pub fn tunnel_cells(&self) -> usize {
        self.tunnel.iter().filter(|&&t| t).count()
    }
}

fn is_tunnel(map: &IndexMap, cell: u16) -> bool {
    let up = map.neighbor(cell, Direction::Up).is_some();
    let down = map.neighbor(cell, Direction::Down).is_some();
    let left = map.neighbor(cell, Direction::Left).is_some();
    let right = map.neighbor(cell, Direction::Right).is_some();
    (up && down && !left && !right) || (left && right && !up && !down)
}
