//! Browser front end for Squirrel Finder: canvas setup, sprite assets,
//! keyboard wiring and the fixed-timestep frame loop. All gameplay rules live
//! in [`sim`] and [`setup`]; this module only feeds them input and draws
//! whatever state they are in.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, window};

pub mod setup;
pub mod sim;

use setup::Key;
use sim::{ARENA_H, ARENA_W, FRAME_MS, Game, InputState, Outcome, Phase, PlayState, Rect};

const CANVAS_ID: &str = "sf-canvas";
const BG_COLOR: &str = "rgb(30,30,30)";
const TEXT_COLOR: &str = "rgb(255,200,0)";
const FONT: &str = "24px 'Courier New', monospace";
/// Cap on catch-up steps after a backgrounded tab; the backlog beyond this is
/// dropped rather than fast-forwarded.
const MAX_STEPS_PER_FRAME: u32 = 8;

const INSTRUCTIONS: [&str; 5] = [
    "Welcome to Squirrel Finder!",
    "You are the koala. Move with arrow keys.",
    "Avoid the bouncing strawberry!",
    "Touch the squirrel to win!",
    "Press any key to start.",
];

/// The three fixed sprites, loaded once at startup from the site root.
struct Assets {
    koala: HtmlImageElement,
    strawberry: HtmlImageElement,
    squirrel: HtmlImageElement,
}

/// Everything the frame loop touches. Lives in a thread-local cell because
/// the rAF callback and the key listeners all need it.
struct App {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    assets: Assets,
    game: Game,
    input: InputState,
    last_ts: Option<f64>,
    acc_ms: f64,
    /// Set when a sprite fails to load; the loop renders the error and stops.
    fatal: Option<String>,
}

// RefCell::new isn't const on this toolchain; allow Clippy lint until a const initializer is feasible.
thread_local! {
    static APP: std::cell::RefCell<Option<App>> = std::cell::RefCell::new(None);
}

pub fn start_squirrel_finder() -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    doc.set_title("Squirrel Finder");

    // Create / reuse the arena canvas.
    let canvas: HtmlCanvasElement = if let Some(el) = doc.get_element_by_id(CANVAS_ID) {
        el.dyn_into()?
    } else {
        let c: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
        c.set_id(CANVAS_ID);
        c.set_width(ARENA_W as u32);
        c.set_height(ARENA_H as u32);
        c.set_attribute(
            "style",
            "position:fixed; left:50%; top:50%; transform:translate(-50%,-50%); box-shadow:0 0 32px 0 rgba(0,0,0,0.18); border-radius:12px; border:2px solid #222; background:rgb(30,30,30); z-index:20;",
        )
        .ok();
        doc.body().unwrap().append_child(&c)?;
        c
    };
    let ctx: CanvasRenderingContext2d = canvas.get_context("2d")?.unwrap().dyn_into()?;
    ctx.set_font(FONT);

    let assets = Assets {
        koala: load_sprite("koala.png")?,
        strawberry: load_sprite("strawberry.png")?,
        squirrel: load_sprite("squirrel.png")?,
    };

    let app = App {
        canvas,
        ctx,
        assets,
        game: Game::new(),
        input: InputState::default(),
        last_ts: None,
        acc_ms: 0.0,
        fatal: None,
    };
    APP.with(|cell| cell.replace(Some(app)));

    // Keydown: held-arrow tracking plus discrete routing into the game.
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
            let key = evt.key();
            APP.with(|cell| {
                if let Some(app) = cell.borrow_mut().as_mut() {
                    match key.as_str() {
                        "ArrowLeft" => app.input.left = true,
                        "ArrowRight" => app.input.right = true,
                        "ArrowUp" => app.input.up = true,
                        "ArrowDown" => app.input.down = true,
                        _ => {}
                    }
                    app.game.handle_key(map_key(&key), entropy_seed());
                }
            });
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    // Keyup releases held arrows.
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
            APP.with(|cell| {
                if let Some(app) = cell.borrow_mut().as_mut() {
                    match evt.key().as_str() {
                        "ArrowLeft" => app.input.left = false,
                        "ArrowRight" => app.input.right = false,
                        "ArrowUp" => app.input.up = false,
                        "ArrowDown" => app.input.down = false,
                        _ => {}
                    }
                }
            });
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    start_frame_loop();
    Ok(())
}

/// Current scoreboard serialized for the host page.
#[cfg(feature = "serde_json")]
pub fn scoreboard_json() -> String {
    APP.with(|cell| match cell.borrow().as_ref().map(|app| &app.game) {
        Some(Game::Play(play)) => {
            serde_json::to_string(play.roster.players()).unwrap_or_default()
        }
        _ => "[]".to_string(),
    })
}

fn map_key(key: &str) -> Key {
    match key {
        "Enter" => Key::Enter,
        "Backspace" => Key::Backspace,
        _ => {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                // Single printable character ("a", "3", " ", ...).
                (Some(c), None) => Key::Char(c),
                _ => Key::Other,
            }
        }
    }
}

/// Seed for the play-state RNG: hardware entropy when the `rng` feature is on,
/// the high-resolution clock otherwise.
fn entropy_seed() -> u64 {
    #[cfg(feature = "rng")]
    {
        let mut buf = [0u8; 8];
        if getrandom::getrandom(&mut buf).is_ok() {
            return u64::from_le_bytes(buf);
        }
    }
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
        .to_bits()
}

/// Start of a sprite load; a failed fetch is fatal and reported once the loop
/// next runs.
fn load_sprite(name: &'static str) -> Result<HtmlImageElement, JsValue> {
    let img = HtmlImageElement::new()?;
    let closure = Closure::wrap(Box::new(move || {
        let msg = format!("failed to load sprite '{name}'");
        web_sys::console::error_1(&JsValue::from_str(&msg));
        APP.with(|cell| {
            if let Some(app) = cell.borrow_mut().as_mut() {
                app.fatal = Some(msg.clone());
            }
        });
    }) as Box<dyn FnMut()>);
    img.add_event_listener_with_callback("error", closure.as_ref().unchecked_ref())?;
    closure.forget();
    img.set_src(name);
    Ok(img)
}

type FrameCallback = std::rc::Rc<std::cell::RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn start_frame_loop() {
    let f: FrameCallback = std::rc::Rc::new(std::cell::RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        let keep_going = APP.with(|cell| match cell.borrow_mut().as_mut() {
            Some(app) => frame(app, ts),
            None => false,
        });
        if keep_going {
            if let Some(w) = window() {
                let _ =
                    w.request_animation_frame(f.borrow().as_ref().unwrap().as_ref().unchecked_ref());
            }
        }
    }) as Box<dyn FnMut(f64)>));
    if let Some(w) = window() {
        let _ = w.request_animation_frame(g.borrow().as_ref().unwrap().as_ref().unchecked_ref());
    }
}

/// One animation frame: run however many whole fixed steps the elapsed wall
/// time covers, then draw. Returns false to stop rescheduling (fatal error).
fn frame(app: &mut App, ts: f64) -> bool {
    if let Some(msg) = app.fatal.clone() {
        render_fatal(app, &msg);
        return false;
    }
    let last = app.last_ts.replace(ts).unwrap_or(ts);
    app.acc_ms += ts - last;
    let mut steps = 0;
    while app.acc_ms >= FRAME_MS && steps < MAX_STEPS_PER_FRAME {
        app.game.step(&app.input);
        app.acc_ms -= FRAME_MS;
        steps += 1;
    }
    if steps == MAX_STEPS_PER_FRAME {
        app.acc_ms = 0.0;
    }
    render(app);
    true
}

// --- Rendering ---------------------------------------------------------------

fn render(app: &App) {
    clear(app);
    match &app.game {
        Game::Setup(setup) => {
            text_centered(&app.ctx, setup.prompt(), ARENA_H / 4.0);
            text_centered(&app.ctx, setup.buffer(), ARENA_H / 2.0);
        }
        Game::Play(play) => match &play.phase {
            Phase::Instructions => {
                let mut y = 100.0;
                for line in INSTRUCTIONS {
                    text_centered(&app.ctx, line, y);
                    y += 40.0;
                }
            }
            Phase::Running => render_running(app, play),
            Phase::RoundOver { outcome, .. } => {
                let name = &play.roster.active().name;
                let msg = match outcome {
                    Outcome::Win => format!("{name} found the squirrel! They win!"),
                    Outcome::Lose => format!("{name} hit the strawberry! Game over!"),
                };
                text_centered(&app.ctx, &msg, ARENA_H / 2.0);
            }
        },
    }
}

fn render_running(app: &App, play: &PlayState) {
    text_left(
        &app.ctx,
        &format!("Time: {}", play.round.elapsed_secs()),
        10.0,
        30.0,
    );
    let mut y = 60.0;
    for p in play.roster.players() {
        text_left(&app.ctx, &format!("{}: {} points", p.name, p.score), 10.0, y);
        y += 30.0;
    }
    text_centered(
        &app.ctx,
        &format!("Player Turn: {}", play.roster.active().name),
        ARENA_H - 26.0,
    );

    if let Some(m) = &play.round.strawberry {
        sprite(&app.ctx, &app.assets.strawberry, &m.rect);
    }
    if let Some(m) = &play.round.squirrel {
        sprite(&app.ctx, &app.assets.squirrel, &m.rect);
    }
    // Koala last, front-most.
    sprite(&app.ctx, &app.assets.koala, &play.round.koala);
}

fn render_fatal(app: &App, msg: &str) {
    clear(app);
    app.ctx.set_fill_style_str("#ff4d4d");
    app.ctx.set_text_align("center");
    app.ctx
        .fill_text(&format!("FATAL: {msg}"), ARENA_W / 2.0, ARENA_H / 2.0)
        .ok();
    app.ctx
        .fill_text("Check the sprite assets and reload.", ARENA_W / 2.0, ARENA_H / 2.0 + 40.0)
        .ok();
}

fn clear(app: &App) {
    app.ctx.set_fill_style_str(BG_COLOR);
    app.ctx
        .fill_rect(0.0, 0.0, app.canvas.width() as f64, app.canvas.height() as f64);
}

fn text_centered(ctx: &CanvasRenderingContext2d, text: &str, y: f64) {
    ctx.set_fill_style_str(TEXT_COLOR);
    ctx.set_text_align("center");
    ctx.fill_text(text, ARENA_W / 2.0, y).ok();
}

fn text_left(ctx: &CanvasRenderingContext2d, text: &str, x: f64, y: f64) {
    ctx.set_fill_style_str(TEXT_COLOR);
    ctx.set_text_align("left");
    ctx.fill_text(text, x, y).ok();
}

fn sprite(ctx: &CanvasRenderingContext2d, img: &HtmlImageElement, rect: &Rect) {
    ctx.draw_image_with_html_image_element_and_dw_and_dh(img, rect.x, rect.y, rect.w, rect.h)
        .ok();
}
