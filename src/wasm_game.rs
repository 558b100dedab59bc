// Tileswap – A picture swap puzzle game
// Copyright (C) 2023, 2024  Neil Roberts
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

use wasm_bindgen::prelude::*;
use web_sys::console;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::time::Duration;
use super::game::Game;
use super::session;

const DEFAULT_SIZE: u32 = 4;
const MIN_SIZE: u32 = 2;
const MAX_SIZE: u32 = 10;

// Display-refresh period for the elapsed-time readout. The timer
// itself doesn’t depend on this, it only affects how smoothly the
// readout updates.
const TICK_INTERVAL_MS: i32 = 250;

const SHARE_TEXT_ID: &'static str = "share-text";
const SHARE_TEXT_COPIED_ID: &'static str = "share-text-copied";
const GRID_TOGGLE_ID: &'static str = "grid-toggle";
const NUMBERS_TOGGLE_ID: &'static str = "numbers-toggle";

fn show_error(message: &str) {
    console::log_1(&message.into());

    let Some(window) = web_sys::window()
    else {
        return;
    };

    let Some(document) = window.document()
    else {
        return;
    };

    let Some(message_elem) = document.get_element_by_id("message")
    else {
        return;
    };

    message_elem.set_text_content(Some("An error occurred"));
}

struct Context {
    document: web_sys::HtmlDocument,
    window: web_sys::Window,
    message: web_sys::HtmlElement,
}

impl Context {
    fn new() -> Result<Context, String> {
        let Some(window) = web_sys::window()
        else {
            return Err("failed to get window".to_string());
        };

        let Some(document) = window.document()
            .and_then(|d| d.dyn_into::<web_sys::HtmlDocument>().ok())
        else {
            return Err("failed to get document".to_string());
        };

        let Some(message) = document.get_element_by_id("message")
            .and_then(|c| c.dyn_into::<web_sys::HtmlElement>().ok())
        else {
            return Err("failed to get message div".to_string());
        };

        Ok(Context {
            document,
            window,
            message,
        })
    }
}

struct Tileswap {
    context: Context,
    dragstart_closure: Option<Closure::<dyn Fn(JsValue)>>,
    dragover_closure: Option<Closure::<dyn Fn(JsValue)>>,
    drop_closure: Option<Closure::<dyn Fn(JsValue)>>,
    click_closure: Option<Closure::<dyn Fn(JsValue)>>,
    shuffle_closure: Option<Closure::<dyn Fn(JsValue)>>,
    reset_closure: Option<Closure::<dyn Fn(JsValue)>>,
    toggles_closure: Option<Closure::<dyn Fn(JsValue)>>,
    preview_closure: Option<Closure::<dyn Fn(JsValue)>>,
    close_preview_closure: Option<Closure::<dyn Fn(JsValue)>>,
    copy_closure: Option<Closure::<dyn Fn(JsValue)>>,
    tick_closure: Option<Closure::<dyn Fn()>>,
    board_element: web_sys::HtmlElement,
    time_element: web_sys::HtmlElement,
    moves_element: web_sys::HtmlElement,
    game: Game,
    rng: SmallRng,
    // Handle of the armed display-refresh interval, if any. There is
    // never more than one interval alive at a time: it is armed when
    // the session timer starts and cancelled when it stops.
    tick_interval: Option<i32>,
}

impl Tileswap {
    fn new(context: Context, size: u32) -> Result<Box<Tileswap>, String> {
        let Some(board_element) =
            context.document.get_element_by_id("board")
            .and_then(|c| c.dyn_into::<web_sys::HtmlElement>().ok())
        else {
            return Err("failed to get board".to_string());
        };

        let Some(time_element) =
            context.document.get_element_by_id("time")
            .and_then(|c| c.dyn_into::<web_sys::HtmlElement>().ok())
        else {
            return Err("failed to get time".to_string());
        };

        let Some(moves_element) =
            context.document.get_element_by_id("moves")
            .and_then(|c| c.dyn_into::<web_sys::HtmlElement>().ok())
        else {
            return Err("failed to get moves".to_string());
        };

        let game = match Game::new(size) {
            Ok(g) => g,
            Err(e) => return Err(e.to_string()),
        };

        let rng = SmallRng::seed_from_u64(js_sys::Date::now() as u64);

        let mut tileswap = Box::new(Tileswap {
            context,
            dragstart_closure: None,
            dragover_closure: None,
            drop_closure: None,
            click_closure: None,
            shuffle_closure: None,
            reset_closure: None,
            toggles_closure: None,
            preview_closure: None,
            close_preview_closure: None,
            copy_closure: None,
            tick_closure: None,
            board_element,
            time_element,
            moves_element,
            game,
            rng,
            tick_interval: None,
        });

        tileswap.create_closures();
        tileswap.set_up_buttons();
        tileswap.set_up_toggles();

        tileswap.start_new_game();

        tileswap.remove_loading_class();

        Ok(tileswap)
    }

    // The current instant on the page’s monotonic clock, as an offset
    // from the time origin.
    fn now(&self) -> Duration {
        self.context.window.performance()
            .map(|p| Duration::from_secs_f64(p.now() / 1000.0))
            .unwrap_or(Duration::ZERO)
    }

    fn create_closures(&mut self) {
        let tileswap_pointer = self as *mut Tileswap;

        let dragstart_closure = Closure::<dyn Fn(JsValue)>::new(
            move |event: JsValue| {
                let tileswap = unsafe { &mut *tileswap_pointer };
                let event: web_sys::DragEvent = event.dyn_into().unwrap();
                tileswap.handle_dragstart_event(event);
            }
        );

        let _ = self.board_element.add_event_listener_with_callback(
            "dragstart",
            dragstart_closure.as_ref().unchecked_ref(),
        );

        self.dragstart_closure = Some(dragstart_closure);

        let dragover_closure = Closure::<dyn Fn(JsValue)>::new(
            move |event: JsValue| {
                let event: web_sys::DragEvent = event.dyn_into().unwrap();
                // Accept any tile dragged over the board
                event.prevent_default();
            }
        );

        let _ = self.board_element.add_event_listener_with_callback(
            "dragover",
            dragover_closure.as_ref().unchecked_ref(),
        );

        self.dragover_closure = Some(dragover_closure);

        let drop_closure = Closure::<dyn Fn(JsValue)>::new(
            move |event: JsValue| {
                let tileswap = unsafe { &mut *tileswap_pointer };
                let event: web_sys::DragEvent = event.dyn_into().unwrap();
                tileswap.handle_drop_event(event);
            }
        );

        let _ = self.board_element.add_event_listener_with_callback(
            "drop",
            drop_closure.as_ref().unchecked_ref(),
        );

        self.drop_closure = Some(drop_closure);

        let click_closure = Closure::<dyn Fn(JsValue)>::new(
            move |event: JsValue| {
                let tileswap = unsafe { &mut *tileswap_pointer };
                let event: web_sys::MouseEvent = event.dyn_into().unwrap();
                tileswap.handle_click_event(event);
            }
        );

        let _ = self.board_element.add_event_listener_with_callback(
            "click",
            click_closure.as_ref().unchecked_ref(),
        );

        self.click_closure = Some(click_closure);

        let tick_closure = Closure::<dyn Fn()>::new(
            move || {
                let tileswap = unsafe { &mut *tileswap_pointer };
                tileswap.handle_tick();
            }
        );

        self.tick_closure = Some(tick_closure);
    }

    fn add_click_listener(
        &self,
        id: &str,
        closure: &Closure::<dyn Fn(JsValue)>,
    ) {
        let Some(button) = self.context.document.get_element_by_id(id)
            .and_then(|c| c.dyn_into::<web_sys::EventTarget>().ok())
        else {
            return;
        };

        let _ = button.add_event_listener_with_callback(
            "click",
            closure.as_ref().unchecked_ref(),
        );
    }

    fn set_up_buttons(&mut self) {
        let tileswap_pointer = self as *mut Tileswap;

        let shuffle_closure = Closure::<dyn Fn(JsValue)>::new(
            move |_event: JsValue| {
                let tileswap = unsafe { &mut *tileswap_pointer };
                tileswap.start_new_game();
            }
        );

        for id in ["shuffle-button", "play-again-button"] {
            self.add_click_listener(id, &shuffle_closure);
        }

        self.shuffle_closure = Some(shuffle_closure);

        let reset_closure = Closure::<dyn Fn(JsValue)>::new(
            move |_event: JsValue| {
                let tileswap = unsafe { &mut *tileswap_pointer };
                tileswap.reset_to_solved();
            }
        );

        self.add_click_listener("reset-button", &reset_closure);

        self.reset_closure = Some(reset_closure);

        let preview_closure = Closure::<dyn Fn(JsValue)>::new(
            move |_event: JsValue| {
                let tileswap = unsafe { &*tileswap_pointer };
                tileswap.set_element_visibility("preview-overlay", true);
            }
        );

        self.add_click_listener("preview-button", &preview_closure);

        self.preview_closure = Some(preview_closure);

        let close_preview_closure = Closure::<dyn Fn(JsValue)>::new(
            move |_event: JsValue| {
                let tileswap = unsafe { &*tileswap_pointer };
                tileswap.set_element_visibility("preview-overlay", false);
            }
        );

        self.add_click_listener("close-preview", &close_preview_closure);

        self.close_preview_closure = Some(close_preview_closure);

        let copy_closure = Closure::<dyn Fn(JsValue)>::new(
            move |_event: JsValue| {
                let tileswap = unsafe { &*tileswap_pointer };
                tileswap.copy_share_text();
            }
        );

        self.add_click_listener("copy-share", &copy_closure);

        self.copy_closure = Some(copy_closure);
    }

    fn set_up_toggles(&mut self) {
        let tileswap_pointer = self as *mut Tileswap;

        let toggles_closure = Closure::<dyn Fn(JsValue)>::new(
            move |_event: JsValue| {
                let tileswap = unsafe { &mut *tileswap_pointer };
                tileswap.handle_toggles_changed();
            }
        );

        for id in [GRID_TOGGLE_ID, NUMBERS_TOGGLE_ID].iter() {
            if let Some(element) = self.context.document.get_element_by_id(id) {
                let _ = element.add_event_listener_with_callback(
                    "change",
                    toggles_closure.as_ref().unchecked_ref(),
                );
            }
        }

        self.toggles_closure = Some(toggles_closure);
    }

    fn get_checkbox_value(&self, checkbox_id: &str) -> bool {
        self.context.document.get_element_by_id(checkbox_id)
            .and_then(|e| e.dyn_into::<web_sys::HtmlInputElement>().ok())
            .map(|c| c.checked())
            .unwrap_or(false)
    }

    fn set_element_visibility(&self, id: &str, visibility: bool) {
        if let Some(elem) =
            self.context.document.get_element_by_id(id)
            .and_then(|c| c.dyn_into::<web_sys::HtmlElement>().ok())
        {
            let _ = elem.style().set_property(
                "display",
                if visibility { "block" } else { "none" },
            );
        }
    }

    fn remove_loading_class(&self) {
        if let Some(content) =
            self.context.document.get_element_by_id("content")
            .and_then(|c| c.dyn_into::<web_sys::HtmlElement>().ok())
        {
            let _ = content.class_list().remove_1("loading");
        }

        let _ = self.context.message.style().set_property("display", "none");
    }

    fn start_new_game(&mut self) {
        self.set_element_visibility("win-overlay", false);
        self.game.new_game(&mut self.rng);
        self.flush_game_changes();
    }

    fn reset_to_solved(&mut self) {
        self.set_element_visibility("win-overlay", false);
        self.game.reset_to_solved();
        self.flush_game_changes();
    }

    fn create_tile(
        &self,
        position: usize,
        tile: u16,
        show_numbers: bool,
    ) -> Result<web_sys::HtmlElement, String> {
        let Some(element) = self.context.document.create_element("div").ok()
            .and_then(|d| d.dyn_into::<web_sys::HtmlElement>().ok())
        else {
            return Err("failed to create tile element".to_string());
        };

        let _ = element.set_attribute("class", "tile");
        let _ = element.set_attribute("draggable", "true");
        let _ = element.set_attribute("data-pos", &position.to_string());

        if self.game.selected() == Some(position) {
            let _ = element.class_list().add_1("selected");
        }

        // Show the slice of the source image that this tile’s identity
        // names by offsetting the shared background image
        let size = self.game.board().size();
        let scale = 100.0 / (size - 1) as f32;
        let x = (tile as u32 % size) as f32 * scale;
        let y = (tile as u32 / size) as f32 * scale;

        let _ = element.style().set_property(
            "background-position",
            &format!("{}% {}%", x, y),
        );

        if show_numbers {
            let Ok(num) = self.context.document.create_element("div")
            else {
                return Err("failed to create number element".to_string());
            };

            let _ = num.set_attribute("class", "num");
            num.set_text_content(Some(&(tile + 1).to_string()));

            let _ = element.append_with_node_1(&num);
        }

        Ok(element)
    }

    fn render_board(&self, tiles: &[u16]) {
        clear_element(&self.board_element);

        let class_list = self.board_element.class_list();

        if self.get_checkbox_value(GRID_TOGGLE_ID) {
            let _ = class_list.add_1("grid");
        } else {
            let _ = class_list.remove_1("grid");
        }

        let show_numbers = self.get_checkbox_value(NUMBERS_TOGGLE_ID);

        for (position, &tile) in tiles.iter().enumerate() {
            match self.create_tile(position, tile, show_numbers) {
                Ok(element) => {
                    let _ = self.board_element.append_with_node_1(&element);
                },
                Err(e) => {
                    show_error(&e);
                    return;
                },
            }
        }
    }

    fn update_time(&self, elapsed: Duration) {
        self.time_element.set_text_content(
            Some(&session::format_elapsed(elapsed)),
        );
    }

    fn show_win(&self, report: &super::game::WinReport) {
        if let Some(win_time) =
            self.context.document.get_element_by_id("win-time")
        {
            win_time.set_text_content(Some(&format!(
                "Time: {}",
                session::format_elapsed(report.elapsed),
            )));
        }

        if let Some(win_moves) =
            self.context.document.get_element_by_id("win-moves")
        {
            win_moves.set_text_content(Some(&format!(
                "Moves: {}",
                report.move_count,
            )));
        }

        if let Some(share_text_elem) =
            self.context.document.get_element_by_id(SHARE_TEXT_ID)
        {
            share_text_elem.set_text_content(Some(&self.game.share_text()));
            self.set_element_visibility(SHARE_TEXT_COPIED_ID, false);
        }

        self.set_element_visibility("win-overlay", true);
    }

    fn copy_share_text(&self) {
        let Some(share_text_elem) =
            self.context.document.get_element_by_id(SHARE_TEXT_ID)
            .and_then(|c| c.dyn_into::<web_sys::HtmlTextAreaElement>().ok())
        else {
            console::log_1(&"Error getting share text element".into());
            return;
        };

        share_text_elem.select();

        let copy_result = self.context.document.exec_command("copy");

        let _ = share_text_elem.set_selection_range(0, 0);

        if copy_result.is_err() {
            // Non-fatal: the selected text stays visible so the player
            // can still copy it by hand
            console::log_1(&"copy command failed".into());
        } else {
            self.set_element_visibility(SHARE_TEXT_COPIED_ID, true);
        }
    }

    fn arm_tick_interval(&mut self) {
        if self.tick_interval.is_some() {
            return;
        }

        let Some(tick_closure) = self.tick_closure.as_ref()
        else {
            return;
        };

        match self.context.window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                tick_closure.as_ref().unchecked_ref(),
                TICK_INTERVAL_MS,
            )
        {
            Ok(handle) => self.tick_interval = Some(handle),
            Err(_) => console::log_1(&"Error setting tick interval".into()),
        }
    }

    fn cancel_tick_interval(&mut self) {
        if let Some(handle) = self.tick_interval.take() {
            self.context.window.clear_interval_with_handle(handle);
        }
    }

    // Keeps the display-refresh interval in step with the session
    // timer so repeated games can’t pile up orphaned callbacks.
    fn sync_tick_interval(&mut self) {
        if self.game.is_timer_running() {
            self.arm_tick_interval();
        } else {
            self.cancel_tick_interval();
        }
    }

    fn flush_game_changes(&mut self) {
        let tiles = self.game.changed_tiles().map(|tiles| tiles.to_vec());

        if let Some(tiles) = tiles {
            self.render_board(&tiles);
        }

        if let Some(move_count) = self.game.changed_move_count() {
            self.moves_element.set_text_content(
                Some(&move_count.to_string()),
            );
            self.update_time(self.game.elapsed());
        }

        if let Some(report) = self.game.pending_win() {
            self.update_time(report.elapsed);
            self.show_win(&report);
        }

        self.sync_tick_interval();
    }

    fn handle_tick(&mut self) {
        let now = self.now();
        let elapsed = self.game.tick(now);
        self.update_time(elapsed);
    }

    fn position_for_event_target(
        &self,
        target: Option<web_sys::EventTarget>,
    ) -> Option<usize> {
        let element = target?.dyn_into::<web_sys::Element>().ok()?;

        // The click might land on the number overlay inside the tile
        let tile = element.closest("[data-pos]").ok()??;

        tile.get_attribute("data-pos")?.parse::<usize>().ok()
    }

    fn handle_dragstart_event(&mut self, event: web_sys::DragEvent) {
        let Some(position) = self.position_for_event_target(event.target())
        else {
            return;
        };

        let Some(data_transfer) = event.data_transfer()
        else {
            return;
        };

        data_transfer.set_effect_allowed("move");
        let _ = data_transfer.set_data("text/plain", &position.to_string());
    }

    fn handle_drop_event(&mut self, event: web_sys::DragEvent) {
        event.prevent_default();

        let Some(dst) = self.position_for_event_target(event.target())
        else {
            return;
        };

        // A foreign payload that doesn’t parse as a position is
        // dropped here; an out-of-range one is dropped by the game
        let Some(src) = event.data_transfer()
            .and_then(|dt| dt.get_data("text/plain").ok())
            .and_then(|data| data.parse::<usize>().ok())
        else {
            return;
        };

        let now = self.now();
        self.game.request_swap(src, dst, now);
        self.flush_game_changes();
    }

    fn handle_click_event(&mut self, event: web_sys::MouseEvent) {
        let Some(position) = self.position_for_event_target(event.target())
        else {
            return;
        };

        let now = self.now();
        self.game.select(position, now);
        self.flush_game_changes();
    }

    fn handle_toggles_changed(&mut self) {
        let tiles = self.game.board().tiles().to_vec();
        self.render_board(&tiles);
    }
}

fn clear_element(element: &web_sys::Element) {
    while let Some(child) = element.first_child() {
        let _ = element.remove_child(&child);
    }
}

fn get_chosen_size(context: &Context) -> u32 {
    let Some(size) = context.document.location()
        .and_then(|location| location.search().ok())
        .and_then(|search| {
            web_sys::UrlSearchParams::new_with_str(&search).ok()
        })
        .and_then(|params| params.get("n"))
        .and_then(|size_str| size_str.parse::<u32>().ok())
    else {
        return DEFAULT_SIZE;
    };

    size.clamp(MIN_SIZE, MAX_SIZE)
}

#[wasm_bindgen]
pub fn init_tileswap() {
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));

    let context = match Context::new() {
        Ok(c) => c,
        Err(e) => {
            show_error(&e);
            return;
        }
    };

    let size = get_chosen_size(&context);

    match Tileswap::new(context, size) {
        Ok(tileswap) => {
            // Leak the main tileswap object so that it will live as
            // long as the web page
            std::mem::forget(tileswap);
        },
        Err(e) => show_error(&e),
    }
}
