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

mod board;
mod game;
mod session;
mod shuffle;

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::time::{Duration, Instant};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use game::Game;

#[derive(Parser)]
#[command(name = "Tileswap")]
struct Cli {
    #[arg(short, long, value_name = "TILES", default_value_t = 4)]
    size: u32,
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,
}

fn print_board(tiles: &[u16], size: u32, selected: Option<usize>) {
    // Tiles are shown as their identity starting from one, the same
    // numbering as the browser version’s numbers toggle. The selected
    // tile, if any, is bracketed.
    let cell_width = tiles.len().to_string().len();

    for row in 0..size {
        for column in 0..size {
            let position = (row * size + column) as usize;
            let tile = tiles[position];

            if selected == Some(position) {
                print!("[{:>width$}]", tile + 1, width = cell_width);
            } else {
                print!(" {:>width$} ", tile + 1, width = cell_width);
            }
        }
        println!();
    }
}

fn print_help() {
    println!(
        "Commands:\n\
         \x20 swap A B   swap the tiles at positions A and B (0-based,\n\
         \x20            left to right, top to bottom)\n\
         \x20 tap P      select position P, or swap it with an earlier\n\
         \x20            selection, like tapping on a touch screen\n\
         \x20 new        start a new shuffled game\n\
         \x20 reset      put the tiles back in order\n\
         \x20 quit       leave the game"
    );
}

fn flush_changes(game: &mut Game, now: Duration) -> bool {
    let size = game.board().size();
    let selected = game.selected();

    if let Some(tiles) = game.changed_tiles() {
        print_board(tiles, size, selected);
    }

    if game.is_timer_running() {
        game.tick(now);
    }

    if let Some(move_count) = game.changed_move_count() {
        println!(
            "Moves: {}  Time: {}",
            move_count,
            session::format_elapsed(game.elapsed()),
        );
    }

    if let Some(report) = game.pending_win() {
        println!(
            "Solved in {} with {} moves!",
            session::format_elapsed(report.elapsed),
            report.move_count,
        );
        println!("{}", game.share_text());

        true
    } else {
        false
    }
}

fn run_game(game: &mut Game, rng: &mut SmallRng) -> Result<(), io::Error> {
    let origin = Instant::now();

    game.new_game(rng);
    flush_changes(game, origin.elapsed());

    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        print!("> ");
        io::stdout().flush()?;

        line.clear();

        if stdin.lock().read_line(&mut line)? == 0 {
            break Ok(());
        }

        let now = origin.elapsed();
        let mut parts = line.split_whitespace();

        match parts.next() {
            Some("swap") => {
                let positions = parts.next()
                    .zip(parts.next())
                    .and_then(|(a, b)| {
                        Some((
                            a.parse::<usize>().ok()?,
                            b.parse::<usize>().ok()?,
                        ))
                    });

                match positions {
                    Some((pos_a, pos_b)) => {
                        game.request_swap(pos_a, pos_b, now);
                    },
                    None => {
                        println!("usage: swap A B");
                        continue;
                    },
                }
            },
            Some("tap") => {
                match parts.next().and_then(|p| p.parse::<usize>().ok()) {
                    Some(position) => game.select(position, now),
                    None => {
                        println!("usage: tap P");
                        continue;
                    },
                }
            },
            Some("new") => game.new_game(rng),
            Some("reset") => game.reset_to_solved(),
            Some("quit") => break Ok(()),
            Some(_) => {
                print_help();
                continue;
            },
            None => continue,
        }

        if flush_changes(game, now) {
            break Ok(());
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut game = match Game::new(cli.size) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("{}: {}", cli.size, e);
            return ExitCode::FAILURE;
        },
    };

    let mut rng = match cli.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };

    if let Err(e) = run_game(&mut game, &mut rng) {
        eprintln!("stdin: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
