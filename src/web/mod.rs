//! Browser entry point
//!
//! Runs when the inlined module is instantiated. Reads the two data islands
//! the assembler wrote, boots the runtime and wires the page: input
//! listeners on the canvas and document, the animation frame loop and the
//! one second countdown clock.

mod canvas;

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

use crate::assemble::ids;
use crate::audio::AudioManager;
use crate::input::RawInput;
use crate::params::Overrides;
use crate::runtime::Runtime;
use crate::seed_from_millis;

use canvas::CanvasSurface;

/// Everything the page callbacks share
struct Host {
    runtime: Runtime,
    surface: CanvasSurface,
    audio: AudioManager,
    canvas: HtmlCanvasElement,
    /// Active `setInterval` handle of the countdown clock
    clock: Option<i32>,
}

impl Host {
    /// Client coordinates to logical canvas coordinates
    fn to_canvas(&self, client_x: i32, client_y: i32) -> Vec2 {
        let rect = self.canvas.get_bounding_client_rect();
        let scale_x = if rect.width() > 0.0 {
            f64::from(self.canvas.width()) / rect.width()
        } else {
            1.0
        };
        let scale_y = if rect.height() > 0.0 {
            f64::from(self.canvas.height()) / rect.height()
        } else {
            1.0
        };
        Vec2::new(
            ((f64::from(client_x) - rect.left()) * scale_x) as f32,
            ((f64::from(client_y) - rect.top()) * scale_y) as f32,
        )
    }

    fn stop_clock(&mut self) {
        let Some(handle) = self.clock.take() else { return };
        if let Some(window) = web_sys::window() {
            window.clear_interval_with_handle(handle);
        }
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialised".into());
    }

    if let Err(e) = run() {
        log::error!("Game runtime failed to boot: {e:?}");
    }
}

fn run() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let canvas: HtmlCanvasElement = document
        .get_element_by_id(ids::CANVAS)
        .ok_or_else(|| JsValue::from_str("no game canvas"))?
        .dyn_into()?;
    let surface = CanvasSurface::new(&document, &canvas, ids::MAIN_CHARACTER, ids::NPC)
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?;

    let game_type = island_text(&document, ids::GAME_TYPE);
    let overrides = read_overrides(&document);
    let runtime = Runtime::boot(
        game_type.trim(),
        &overrides,
        document.title(),
        seed_from_millis(js_sys::Date::now()),
    );

    let host = Rc::new(RefCell::new(Host {
        runtime,
        surface,
        audio: AudioManager::new(&document, ids::MUSIC),
        canvas: canvas.clone(),
        clock: None,
    }));

    setup_input_handlers(&document, &canvas, host.clone())?;
    request_animation_frame(host);

    log::info!("Runtime started for {:?}", game_type.trim());
    Ok(())
}

fn island_text(document: &Document, id: &str) -> String {
    document
        .get_element_by_id(id)
        .and_then(|el| el.text_content())
        .unwrap_or_default()
}

fn read_overrides(document: &Document) -> Overrides {
    let text = island_text(document, ids::GAME_PARAMS);
    if text.trim().is_empty() {
        return Overrides::new();
    }
    serde_json::from_str(&text).unwrap_or_else(|e| {
        log::warn!("Ignoring unreadable game parameters: {e}");
        Overrides::new()
    })
}

/// Route one event through the runtime and apply the outcome
fn dispatch(host: &Rc<RefCell<Host>>, input: RawInput, event: &web_sys::Event) {
    let restart_seed = seed_from_millis(js_sys::Date::now());
    let needs_clock = {
        let mut h = host.borrow_mut();
        let outcome = h.runtime.handle_input(&input, restart_seed);
        if outcome.prevent_default {
            event.prevent_default();
        }
        if outcome.start_audio {
            h.audio.start_music();
        }
        if outcome.restarted {
            h.stop_clock();
        }
        h.runtime.needs_clock() && h.clock.is_none()
    };
    if needs_clock {
        start_clock(host.clone());
    }
}

/// Feed wall-clock seconds to the countdown until the session stops needing them
fn start_clock(host: Rc<RefCell<Host>>) {
    let Some(window) = web_sys::window() else { return };
    let tick_host = host.clone();
    let closure = Closure::<dyn FnMut()>::new(move || {
        let mut h = tick_host.borrow_mut();
        h.runtime.clock_second();
        if !h.runtime.needs_clock() {
            h.stop_clock();
        }
    });
    match window.set_interval_with_callback_and_timeout_and_arguments_0(
        closure.as_ref().unchecked_ref(),
        1000,
    ) {
        Ok(handle) => host.borrow_mut().clock = Some(handle),
        Err(e) => log::error!("Failed to start countdown clock: {e:?}"),
    }
    closure.forget();
}

fn setup_input_handlers(
    document: &Document,
    canvas: &HtmlCanvasElement,
    host: Rc<RefCell<Host>>,
) -> Result<(), JsValue> {
    // Touch handlers call preventDefault, so they must not be passive
    let options = web_sys::AddEventListenerOptions::new();
    options.set_passive(false);

    // Keyboard
    {
        let host = host.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            dispatch(&host, RawInput::key(&event.code()), &event);
        });
        document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Mouse click
    {
        let host = host.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let pos = host.borrow().to_canvas(event.client_x(), event.client_y());
            dispatch(&host, RawInput::PointerDown { pos }, &event);
        });
        canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Touch start
    {
        let host = host.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
            if let Some(touch) = event.touches().get(0) {
                let pos = host.borrow().to_canvas(touch.client_x(), touch.client_y());
                dispatch(&host, RawInput::TouchStart { pos }, &event);
            }
        });
        canvas.add_event_listener_with_callback_and_add_event_listener_options(
            "touchstart",
            closure.as_ref().unchecked_ref(),
            &options,
        )?;
        closure.forget();
    }

    // Touch end (the lifted finger is only in changedTouches)
    {
        let host = host.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
            if let Some(touch) = event.changed_touches().get(0) {
                let pos = host.borrow().to_canvas(touch.client_x(), touch.client_y());
                dispatch(&host, RawInput::TouchEnd { pos }, &event);
            }
        });
        canvas.add_event_listener_with_callback_and_add_event_listener_options(
            "touchend",
            closure.as_ref().unchecked_ref(),
            &options,
        )?;
        closure.forget();
    }

    Ok(())
}

fn request_animation_frame(host: Rc<RefCell<Host>>) {
    let Some(window) = web_sys::window() else { return };
    let closure = Closure::once(move |time: f64| {
        game_loop(host, time);
    });
    let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
    closure.forget();
}

fn game_loop(host: Rc<RefCell<Host>>, time: f64) {
    {
        let mut h = host.borrow_mut();
        let Host {
            runtime, surface, ..
        } = &mut *h;
        runtime.frame(time, surface);

        for event in h.runtime.drain_events() {
            h.audio.play_event(event);
        }
    }

    request_animation_frame(host);
}
