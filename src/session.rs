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

// Tracks the move count and the elapsed time of one game. The session
// doesn’t read a clock itself: every method that needs the time takes
// the current instant as an offset from some arbitrary fixed origin,
// so the same code runs against performance.now() in the browser, an
// Instant in the terminal and a hand-rolled clock in the tests.

#[derive(Debug)]
pub struct Session {
    move_count: u32,
    elapsed: Duration,
    // Origin-relative instant that the timer started counting from,
    // already adjusted backwards for any previously accumulated
    // elapsed time. None while the timer is stopped.
    started_at: Option<Duration>,
}

impl Session {
    pub fn new() -> Session {
        Session {
            move_count: 0,
            elapsed: Duration::ZERO,
            started_at: None,
        }
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    // Starts the timer if it isn’t already running. Time accumulated
    // before an earlier stop is preserved, and starting while already
    // running changes nothing.
    pub fn start(&mut self, now: Duration) {
        if self.started_at.is_none() {
            self.started_at = Some(now.saturating_sub(self.elapsed));
        }
    }

    // Freezes the elapsed time at its current value. Stopping an
    // already stopped session changes nothing.
    pub fn stop(&mut self, now: Duration) {
        if let Some(started_at) = self.started_at.take() {
            self.elapsed = now.saturating_sub(started_at);
        }
    }

    // Recomputes the elapsed time while running. Meant to be called on
    // a periodic schedule purely to refresh the display; the elapsed
    // time itself doesn’t depend on how often this happens.
    pub fn tick(&mut self, now: Duration) -> Duration {
        if let Some(started_at) = self.started_at {
            self.elapsed = now.saturating_sub(started_at);
        }

        self.elapsed
    }

    pub fn reset(&mut self) {
        self.move_count = 0;
        self.elapsed = Duration::ZERO;
        self.started_at = None;
    }

    // Counts one accepted swap. Whether a move also starts the timer
    // is the controller’s decision, not ours.
    pub fn record_move(&mut self) {
        self.move_count += 1;
    }
}

// Formats an elapsed time as mm:ss with two-digit zero padding. There
// is no hours field so the minutes keep counting past 59.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_seconds = elapsed.as_secs();

    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

#[cfg(test)]
mod test {
    use super::*;

    fn ms(milliseconds: u64) -> Duration {
        Duration::from_millis(milliseconds)
    }

    #[test]
    fn fresh_session() {
        let session = Session::new();

        assert_eq!(session.move_count(), 0);
        assert_eq!(session.elapsed(), Duration::ZERO);
        assert!(!session.is_running());
    }

    #[test]
    fn start_stop() {
        let mut session = Session::new();

        session.start(ms(1000));
        assert!(session.is_running());

        assert_eq!(session.tick(ms(1250)), ms(250));
        assert_eq!(session.tick(ms(4000)), ms(3000));

        session.stop(ms(5000));
        assert!(!session.is_running());
        assert_eq!(session.elapsed(), ms(4000));

        // Ticking while stopped must not advance the clock
        assert_eq!(session.tick(ms(9000)), ms(4000));
        assert_eq!(session.elapsed(), ms(4000));

        // Stopping again must not either
        session.stop(ms(9000));
        assert_eq!(session.elapsed(), ms(4000));
    }

    #[test]
    fn start_is_idempotent() {
        let mut session = Session::new();

        session.start(ms(1000));
        session.start(ms(8000));

        assert_eq!(session.tick(ms(9000)), ms(8000));
    }

    #[test]
    fn restart_preserves_elapsed() {
        let mut session = Session::new();

        session.start(ms(0));
        session.stop(ms(2000));
        assert_eq!(session.elapsed(), ms(2000));

        // After a pause the accumulated two seconds carry over
        session.start(ms(10_000));
        assert_eq!(session.tick(ms(10_500)), ms(2500));
    }

    #[test]
    fn record_move() {
        let mut session = Session::new();

        session.record_move();
        session.record_move();

        assert_eq!(session.move_count(), 2);
        // Counting moves alone never starts the timer
        assert!(!session.is_running());
    }

    #[test]
    fn reset() {
        let mut session = Session::new();

        session.start(ms(0));
        session.record_move();
        session.tick(ms(1000));

        session.reset();

        assert_eq!(session.move_count(), 0);
        assert_eq!(session.elapsed(), Duration::ZERO);
        assert!(!session.is_running());
    }

    #[test]
    fn format() {
        assert_eq!(&format_elapsed(ms(0)), "00:00");
        assert_eq!(&format_elapsed(ms(999)), "00:00");
        assert_eq!(&format_elapsed(ms(65_000)), "01:05");
        assert_eq!(&format_elapsed(ms(3_599_000)), "59:59");
        assert_eq!(&format_elapsed(ms(3_600_000)), "60:00");
    }
}
