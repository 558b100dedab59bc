// Tileswap – A picture swap puzzle game
// Copyright (C) 2024  Neil Roberts
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

use std::fmt;

// The board is a permutation of tile identities over display
// positions: tiles[position] is the identity of the tile currently
// shown in that slot, where an identity is the index of the tile’s
// origin cell in the source image. The board is solved when every
// position holds its own identity.

#[derive(Debug)]
pub struct Board {
    tiles: Box<[u16]>,
    size: u32,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    BoardTooSmall,
    BoardTooLarge,
    InvalidPosition,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::BoardTooSmall => write!(f, "board too small"),
            Error::BoardTooLarge => write!(f, "board too large"),
            Error::InvalidPosition => write!(f, "invalid position"),
        }
    }
}

// Tile identities are stored as u16 so the board side can’t go past
// 255 tiles
pub const MAX_SIZE: u32 = 255;

impl Board {
    pub fn new(size: u32) -> Result<Board, Error> {
        if size < 2 {
            return Err(Error::BoardTooSmall);
        }

        if size > MAX_SIZE {
            return Err(Error::BoardTooLarge);
        }

        let n_tiles = (size * size) as usize;

        Ok(Board {
            tiles: (0..n_tiles as u16).collect(),
            size,
        })
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn n_tiles(&self) -> usize {
        self.tiles.len()
    }

    pub fn tiles(&self) -> &[u16] {
        &self.tiles
    }

    // Puts every tile back in its own slot.
    pub fn reset(&mut self) {
        for (position, tile) in self.tiles.iter_mut().enumerate() {
            *tile = position as u16;
        }
    }

    // Exchanges the tiles at the two positions. Swapping a position
    // with itself is accepted and leaves the board unchanged. Either
    // way the board stays a permutation.
    pub fn swap(&mut self, pos_a: usize, pos_b: usize) -> Result<(), Error> {
        if pos_a >= self.tiles.len() || pos_b >= self.tiles.len() {
            return Err(Error::InvalidPosition);
        }

        self.tiles.swap(pos_a, pos_b);

        Ok(())
    }

    pub fn is_solved(&self) -> bool {
        self.tiles.iter().enumerate().all(|(position, &tile)| {
            tile as usize == position
        })
    }
}
