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

use rand::Rng;
use super::board::Board;

// Randomizes the board with a Fisher–Yates pass and rejects any pass
// that happens to land on the solved arrangement, so the result is
// uniform over the non-identity permutations. The board is never left
// solved when this returns.
pub fn shuffle<R: Rng>(board: &mut Board, rng: &mut R) {
    loop {
        for i in (1..board.n_tiles()).rev() {
            let j = rng.gen_range(0..=i);
            // Both indices are in range by construction
            let _ = board.swap(i, j);
        }

        if !board.is_solved() {
            break;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn never_solved() {
        // The 2×2 board is the worst case for rejection: a single
        // pass lands on the identity once every 24 attempts.
        for size in [2, 4] {
            let mut board = Board::new(size).unwrap();
            let mut rng = SmallRng::seed_from_u64(0x7e57_1e55);

            for _ in 0..10_000 {
                shuffle(&mut board, &mut rng);
                assert!(!board.is_solved());
            }
        }
    }

    #[test]
    fn stays_a_permutation() {
        let mut board = Board::new(4).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);

        for _ in 0..100 {
            shuffle(&mut board, &mut rng);

            let mut seen = [false; 16];

            for &tile in board.tiles().iter() {
                assert!(!std::mem::replace(&mut seen[tile as usize], true));
            }
        }
    }

    #[test]
    fn reaches_different_arrangements() {
        let mut board = Board::new(4).unwrap();
        let mut rng = SmallRng::seed_from_u64(1234);

        shuffle(&mut board, &mut rng);
        let first = board.tiles().to_vec();

        let mut any_different = false;

        for _ in 0..20 {
            shuffle(&mut board, &mut rng);

            if board.tiles() != first.as_slice() {
                any_different = true;
                break;
            }
        }

        assert!(any_different);
    }
}
