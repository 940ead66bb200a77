//! Browser bridge
//!
//! The page owns the DOM. It forwards keyboard and click events here, calls
//! `frame` from `requestAnimationFrame`, and renders the JSON events drained
//! after each frame.

use wasm_bindgen::prelude::*;

use super::keys::{self, KeyAction};
use crate::settings::Settings;
use crate::sim::{ButtonEdge, ControlKind, FrameStepper, GameState, TickInput, tick};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // A second init (hot reload) keeps the first logger
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("Claw machine wasm module loaded");
}

#[wasm_bindgen]
pub struct WebClawMachine {
    state: GameState,
    stepper: FrameStepper,
    last_time: Option<f64>,
}

#[wasm_bindgen]
impl WebClawMachine {
    /// New session; `settings_json` overrides the default cabinet
    #[wasm_bindgen(constructor)]
    pub fn new(settings_json: Option<String>) -> Result<WebClawMachine, JsError> {
        let settings = match settings_json {
            Some(json) => Settings::from_json(&json)?,
            None => Settings::default(),
        };
        let seed = js_sys::Date::now() as u64;
        let state = GameState::with_settings(settings, seed)?;
        Ok(Self {
            state,
            stepper: FrameStepper::new(),
            last_time: None,
        })
    }

    /// Returns true when the key was mapped to an action
    pub fn key_down(&mut self, key: &str, repeat: bool, ctrl: bool, shift: bool) -> bool {
        self.apply_key(keys::key_down(key, repeat, ctrl, shift))
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        self.apply_key(keys::key_up(key))
    }

    /// On-screen buttons: `vertical` selects the control
    pub fn press(&mut self, vertical: bool) {
        self.send_edge(vertical, ButtonEdge::Press);
    }

    pub fn release(&mut self, vertical: bool) {
        self.send_edge(vertical, ButtonEdge::Release);
    }

    /// Click on a toy waiting at the collection point
    pub fn collect(&mut self, index: u32) {
        self.apply(TickInput {
            collect: Some(index),
            ..Default::default()
        });
    }

    pub fn restart(&mut self) {
        self.stepper.reset();
        self.apply(TickInput {
            restart: true,
            ..Default::default()
        });
    }

    /// Advance to the animation frame timestamp (ms)
    pub fn frame(&mut self, time_ms: f64) {
        let dt = self.last_time.map_or(0.0, |last| time_ms - last);
        self.last_time = Some(time_ms);
        self.stepper.step(&mut self.state, &TickInput::default(), dt);
    }

    /// Events since the last call, as a JSON array
    pub fn drain_events(&mut self) -> Result<String, JsError> {
        let events = self.state.drain_events();
        Ok(serde_json::to_string(&events)?)
    }

    pub fn collected_count(&self) -> u32 {
        self.state.collection.count()
    }

    pub fn total_toys(&self) -> u32 {
        self.state.collection.total()
    }
}

impl WebClawMachine {
    fn apply_key(&mut self, action: Option<KeyAction>) -> bool {
        let Some(action) = action else {
            return false;
        };
        let mut input = TickInput::default();
        action.apply(&mut input);
        self.apply(input);
        true
    }

    fn send_edge(&mut self, vertical: bool, edge: ButtonEdge) {
        let control = if vertical {
            ControlKind::Vertical
        } else {
            ControlKind::Horizontal
        };
        let mut input = TickInput::default();
        input.set_edge(control, edge);
        self.apply(input);
    }

    /// Inputs take effect immediately, between frames
    fn apply(&mut self, input: TickInput) {
        tick(&mut self.state, &input, 0);
    }
}
