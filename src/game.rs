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

use std::time::Duration;
use rand::Rng;
use super::board::{self, Board};
use super::session::{self, Session};
use super::shuffle;

// Glues the board, the shuffle and the session together into the
// player-visible lifecycle. This is the only type the frontends talk
// to: after each call they drain the changed_*/pending_* methods and
// update whatever the flags say is stale.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WinReport {
    pub move_count: u32,
    pub elapsed: Duration,
}

pub struct Game {
    board: Board,
    session: Session,
    selected: Option<usize>,
    // Set once the win has fired; swap requests are ignored until the
    // next new_game or reset_to_solved so the win can’t re-trigger.
    won: bool,

    pending_win: Option<WinReport>,

    tiles_dirty: bool,
    move_count_dirty: bool,
}

impl Game {
    pub fn new(size: u32) -> Result<Game, board::Error> {
        Ok(Game {
            board: Board::new(size)?,
            session: Session::new(),
            selected: None,
            won: false,
            pending_win: None,
            tiles_dirty: true,
            move_count_dirty: true,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn move_count(&self) -> u32 {
        self.session.move_count()
    }

    pub fn elapsed(&self) -> Duration {
        self.session.elapsed()
    }

    pub fn is_timer_running(&self) -> bool {
        self.session.is_running()
    }

    // Starts a fresh game with a randomized, guaranteed-unsolved
    // arrangement.
    pub fn new_game<R: Rng>(&mut self, rng: &mut R) {
        self.pending_win = None;
        self.won = false;
        self.selected = None;
        self.session.reset();
        self.board.reset();
        shuffle::shuffle(&mut self.board, rng);
        self.tiles_dirty = true;
        self.move_count_dirty = true;
    }

    // Puts the tiles back in order without starting a game. The board
    // ends up solved but no win fires: win detection only runs after a
    // player swap.
    pub fn reset_to_solved(&mut self) {
        self.pending_win = None;
        self.won = false;
        self.selected = None;
        self.session.reset();
        self.board.reset();
        self.tiles_dirty = true;
        self.move_count_dirty = true;
    }

    // Applies a player swap. A request naming the same position twice
    // only asks for a re-render; a request with an out-of-range
    // position (a malformed drag payload, say) is deliberately dropped
    // on the floor rather than treated as an error.
    pub fn request_swap(&mut self, pos_a: usize, pos_b: usize, now: Duration) {
        if self.won {
            return;
        }

        if pos_a == pos_b {
            self.tiles_dirty = true;
            return;
        }

        if self.board.swap(pos_a, pos_b).is_err() {
            return;
        }

        self.session.start(now);
        self.session.record_move();
        self.tiles_dirty = true;
        self.move_count_dirty = true;

        if self.board.is_solved() {
            self.session.stop(now);
            self.won = true;
            self.pending_win = Some(WinReport {
                move_count: self.session.move_count(),
                elapsed: self.session.elapsed(),
            });
        }
    }

    // Tap-to-swap protocol: the first tap selects a tile, a second tap
    // on a different tile swaps the pair, a second tap on the same
    // tile just clears the selection.
    pub fn select(&mut self, position: usize, now: Duration) {
        if position >= self.board.n_tiles() {
            return;
        }

        match self.selected.take() {
            None => {
                self.selected = Some(position);
                self.tiles_dirty = true;
            },
            Some(previous) => {
                self.request_swap(previous, position, now);
            },
        }
    }

    pub fn tick(&mut self, now: Duration) -> Duration {
        self.session.tick(now)
    }

    pub fn changed_tiles(&mut self) -> Option<&[u16]> {
        if self.tiles_dirty {
            self.tiles_dirty = false;
            Some(self.board.tiles())
        } else {
            None
        }
    }

    pub fn changed_move_count(&mut self) -> Option<u32> {
        if self.move_count_dirty {
            self.move_count_dirty = false;
            Some(self.session.move_count())
        } else {
            None
        }
    }

    // Fires exactly once per transition into the solved arrangement.
    pub fn pending_win(&mut self) -> Option<WinReport> {
        self.pending_win.take()
    }

    pub fn share_text(&self) -> String {
        format!(
            "I solved the {}×{} photo puzzle in {} with {} moves. \
             Can you beat that?",
            self.board.size(),
            self.board.size(),
            session::format_elapsed(self.session.elapsed()),
            self.session.move_count(),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn ms(milliseconds: u64) -> Duration {
        Duration::from_millis(milliseconds)
    }

    fn drain_changes(game: &mut Game) {
        let _ = game.changed_tiles();
        let _ = game.changed_move_count();
    }

    #[test]
    fn initial_state() {
        let mut game = Game::new(4).unwrap();

        assert!(game.board().is_solved());
        assert_eq!(
            game.changed_tiles().unwrap(),
            &(0..16).collect::<Vec<u16>>()[..],
        );
        assert!(game.changed_tiles().is_none());
        assert_eq!(game.changed_move_count().unwrap(), 0);
        assert!(game.changed_move_count().is_none());
        assert!(game.pending_win().is_none());
    }

    #[test]
    fn new_game_is_never_solved() {
        let mut game = Game::new(4).unwrap();
        let mut rng = SmallRng::seed_from_u64(99);

        for _ in 0..100 {
            game.new_game(&mut rng);

            assert!(!game.board().is_solved());
            assert_eq!(game.move_count(), 0);
            assert_eq!(game.elapsed(), Duration::ZERO);
            assert!(!game.is_timer_running());
            assert!(game.changed_tiles().is_some());
            assert!(game.pending_win().is_none());
        }
    }

    #[test]
    fn end_to_end() {
        let mut game = Game::new(4).unwrap();
        let mut rng = SmallRng::seed_from_u64(7);

        game.new_game(&mut rng);
        drain_changes(&mut game);

        game.reset_to_solved();
        assert!(game.board().is_solved());
        // A programmatic reset never fires a win
        assert!(game.pending_win().is_none());
        drain_changes(&mut game);

        game.request_swap(0, 1, ms(1000));

        let mut expected = (0..16).collect::<Vec<u16>>();
        expected.swap(0, 1);
        assert_eq!(game.changed_tiles().unwrap(), &expected[..]);
        assert_eq!(game.changed_move_count().unwrap(), 1);
        assert!(game.pending_win().is_none());
        assert!(game.is_timer_running());

        game.request_swap(0, 1, ms(3500));

        assert!(game.board().is_solved());
        assert_eq!(game.changed_move_count().unwrap(), 2);

        let report = game.pending_win().unwrap();
        assert_eq!(report.move_count, 2);
        assert_eq!(report.elapsed, ms(2500));
        assert!(!game.is_timer_running());

        // Edge-triggered: the report is gone once drained
        assert!(game.pending_win().is_none());
    }

    #[test]
    fn swap_same_position_is_a_no_op() {
        let mut game = Game::new(4).unwrap();
        drain_changes(&mut game);

        game.request_swap(3, 3, ms(0));

        // Re-render only: no move, no timer, no win
        assert!(game.changed_tiles().is_some());
        assert!(game.changed_move_count().is_none());
        assert!(!game.is_timer_running());
        assert!(game.pending_win().is_none());
        assert!(game.board().is_solved());
    }

    #[test]
    fn invalid_positions_are_ignored() {
        let mut game = Game::new(4).unwrap();
        drain_changes(&mut game);

        game.request_swap(0, 16, ms(0));
        game.request_swap(usize::MAX, 0, ms(0));

        assert!(game.changed_tiles().is_none());
        assert!(game.changed_move_count().is_none());
        assert!(!game.is_timer_running());
        assert!(game.board().is_solved());
    }

    #[test]
    fn no_win_after_won() {
        let mut game = Game::new(2).unwrap();

        game.request_swap(0, 1, ms(0));
        game.request_swap(0, 1, ms(1000));

        assert!(game.pending_win().is_some());

        // The session is over: further requests mustn’t move tiles or
        // re-fire the win
        game.request_swap(0, 1, ms(2000));

        assert!(game.board().is_solved());
        assert!(game.pending_win().is_none());
        assert_eq!(game.move_count(), 2);
    }

    #[test]
    fn reset_rearms_win_detection() {
        let mut game = Game::new(2).unwrap();

        game.request_swap(0, 1, ms(0));
        game.request_swap(0, 1, ms(1000));
        assert!(game.pending_win().is_some());

        game.reset_to_solved();

        game.request_swap(2, 3, ms(2000));
        assert!(game.pending_win().is_none());

        game.request_swap(2, 3, ms(3000));

        let report = game.pending_win().unwrap();
        assert_eq!(report.move_count, 2);
        assert_eq!(report.elapsed, ms(1000));
    }

    #[test]
    fn tap_selection() {
        let mut game = Game::new(4).unwrap();
        drain_changes(&mut game);

        game.select(2, ms(0));
        assert_eq!(game.selected(), Some(2));
        assert!(game.changed_tiles().is_some());
        assert!(game.changed_move_count().is_none());

        // Tapping the selected tile again deselects without a swap
        game.select(2, ms(100));
        assert_eq!(game.selected(), None);
        assert!(game.changed_tiles().is_some());
        assert!(game.changed_move_count().is_none());
        assert!(game.board().is_solved());

        // Tapping two different tiles swaps them
        game.select(2, ms(200));
        game.select(5, ms(300));
        assert_eq!(game.selected(), None);
        assert_eq!(game.changed_move_count().unwrap(), 1);
        assert_eq!(game.board().tiles()[2], 5);
        assert_eq!(game.board().tiles()[5], 2);
    }

    #[test]
    fn select_out_of_range() {
        let mut game = Game::new(4).unwrap();
        drain_changes(&mut game);

        game.select(16, ms(0));

        assert_eq!(game.selected(), None);
        assert!(game.changed_tiles().is_none());
    }

    #[test]
    fn timer_keeps_running_between_moves() {
        let mut game = Game::new(4).unwrap();

        game.request_swap(0, 1, ms(1000));
        game.request_swap(2, 3, ms(5000));

        assert_eq!(game.tick(ms(6000)), ms(5000));
    }

    #[test]
    fn share_text() {
        let mut game = Game::new(4).unwrap();

        game.request_swap(0, 1, ms(0));
        game.request_swap(0, 1, ms(65_000));

        assert_eq!(
            &game.share_text(),
            "I solved the 4×4 photo puzzle in 01:05 with 2 moves. \
             Can you beat that?",
        );
    }
}
