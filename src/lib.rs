//! Squirrel Finder core crate.
//!
//! A single-screen retro arcade game for the browser: the koala (player) must
//! touch the squirrel before the bouncing strawberry touches the koala. One to
//! four players take turns; each won round scores a point for the player whose
//! turn it is. All gameplay rules live in [`game::sim`] and [`game::setup`]
//! which are pure Rust (native `cargo test` friendly); [`game`] itself wires
//! them to the canvas, sprite images and keyboard via `web-sys`.

use wasm_bindgen::prelude::*;

pub mod game;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Launch the game: sets up the canvas, loads sprites and starts the frame loop.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    game::start_squirrel_finder()
}

/// Current scoreboard as a JSON array of `{name, score}` objects, for host
/// pages that want to mirror the standings outside the canvas.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn scoreboard_json() -> String {
    game::scoreboard_json()
}
