//! Input system with action-based mapping
//!
//! Raw keyboard/mouse events are folded into an [`InputState`] once per frame.
//! The simulation reads it as level-triggered axes (mode selection, flight,
//! look) plus one edge-triggered action, the possess click.

use std::collections::{HashMap, HashSet};

use glam::{Vec2, Vec3};
use possession_core::Ray;
use serde::{Deserialize, Serialize};
use winit::event::{ElementState, MouseButton};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Actions that can be triggered by input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputAction {
    /// Fly forward (W by default)
    MoveForward,
    /// Fly backward (S by default)
    MoveBackward,
    /// Fly left (A by default)
    MoveLeft,
    /// Fly right (D by default)
    MoveRight,
    /// Fly up (E by default)
    MoveUp,
    /// Fly down (Q by default)
    MoveDown,
    /// Select the first-person view (1 by default)
    FirstPersonView,
    /// Select the third-person view (2 by default)
    ThirdPersonView,
    /// Select the overhead view (3 by default)
    GodView,
    /// Try to possess the body under the cursor (left mouse button by default)
    Possess,
}

/// Current state of all inputs for a frame
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Actions currently held down
    pub held: HashSet<InputAction>,
    /// Actions that were just pressed this frame
    pub just_pressed: HashSet<InputAction>,
    /// Actions that were just released this frame
    pub just_released: HashSet<InputAction>,
    /// Analog movement (x = horizontal, y = height, z = vertical), added to keys
    pub analog_movement: Vec3,
    /// Mouse movement delta for this frame
    pub mouse_delta: Vec2,
    /// Cursor position in normalized device coordinates (-1..1, +y up)
    pub cursor: Vec2,
    /// Picking ray supplied by the host, overriding the rig's cursor ray
    pub pick_ray: Option<Ray>,
    /// Whether the cursor is captured (invisible, locked)
    pub cursor_captured: bool,
}

impl InputState {
    /// Create a new empty input state
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if an action is currently held
    pub fn is_held(&self, action: InputAction) -> bool {
        self.held.contains(&action)
    }

    /// Check if an action was just pressed this frame
    pub fn is_just_pressed(&self, action: InputAction) -> bool {
        self.just_pressed.contains(&action)
    }

    /// Check if an action was just released this frame
    pub fn is_just_released(&self, action: InputAction) -> bool {
        self.just_released.contains(&action)
    }

    fn axis(&self, negative: InputAction, positive: InputAction) -> f32 {
        let mut value = 0.0;
        if self.is_held(negative) {
            value -= 1.0;
        }
        if self.is_held(positive) {
            value += 1.0;
        }
        value
    }

    /// Flight axes, each clamped to `[-1, 1]`. Forward is negative Z.
    pub fn movement_axes(&self) -> Vec3 {
        let keys = Vec3::new(
            self.axis(InputAction::MoveLeft, InputAction::MoveRight),
            self.axis(InputAction::MoveDown, InputAction::MoveUp),
            self.axis(InputAction::MoveForward, InputAction::MoveBackward),
        );
        (keys + self.analog_movement).clamp(Vec3::NEG_ONE, Vec3::ONE)
    }

    /// Look axes for this frame (zero unless the cursor is captured)
    pub fn look_axes(&self) -> Vec2 {
        if self.cursor_captured {
            self.mouse_delta
        } else {
            Vec2::ZERO
        }
    }

    /// Clear frame-specific data (call at end of frame)
    pub fn clear_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
        self.mouse_delta = Vec2::ZERO;
        self.pick_ray = None;
    }

    /// Clear all input state
    pub fn clear_all(&mut self) {
        self.clear_frame();
        self.held.clear();
        self.analog_movement = Vec3::ZERO;
    }
}

/// Binding of a physical key to an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputBinding {
    /// Keyboard key
    Key(KeyCode),
    /// Mouse button
    Mouse(u32), // 0 = left, 1 = right, 2 = middle
}

impl From<KeyCode> for InputBinding {
    fn from(key: KeyCode) -> Self {
        Self::Key(key)
    }
}

/// Maps physical inputs to actions
#[derive(Debug, Clone)]
pub struct InputBindings {
    bindings: HashMap<InputBinding, InputAction>,
    reverse: HashMap<InputAction, Vec<InputBinding>>,
}

impl Default for InputBindings {
    fn default() -> Self {
        let mut bindings = Self {
            bindings: HashMap::new(),
            reverse: HashMap::new(),
        };

        bindings.bind(KeyCode::KeyW, InputAction::MoveForward);
        bindings.bind(KeyCode::KeyS, InputAction::MoveBackward);
        bindings.bind(KeyCode::KeyA, InputAction::MoveLeft);
        bindings.bind(KeyCode::KeyD, InputAction::MoveRight);
        bindings.bind(KeyCode::KeyE, InputAction::MoveUp);
        bindings.bind(KeyCode::KeyQ, InputAction::MoveDown);

        // Arrow keys as alternative
        bindings.bind(KeyCode::ArrowUp, InputAction::MoveForward);
        bindings.bind(KeyCode::ArrowDown, InputAction::MoveBackward);
        bindings.bind(KeyCode::ArrowLeft, InputAction::MoveLeft);
        bindings.bind(KeyCode::ArrowRight, InputAction::MoveRight);

        bindings.bind(KeyCode::Digit1, InputAction::FirstPersonView);
        bindings.bind(KeyCode::Digit2, InputAction::ThirdPersonView);
        bindings.bind(KeyCode::Digit3, InputAction::GodView);

        bindings.bind_mouse(0, InputAction::Possess);

        bindings
    }
}

impl InputBindings {
    /// Create new input bindings with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a key to an action
    pub fn bind(&mut self, key: KeyCode, action: InputAction) {
        self.insert(InputBinding::Key(key), action);
    }

    /// Bind a mouse button to an action
    pub fn bind_mouse(&mut self, button: u32, action: InputAction) {
        self.insert(InputBinding::Mouse(button), action);
    }

    fn insert(&mut self, binding: InputBinding, action: InputAction) {
        if let Some(previous) = self.bindings.insert(binding, action) {
            if let Some(list) = self.reverse.get_mut(&previous) {
                list.retain(|b| *b != binding);
            }
        }
        self.reverse.entry(action).or_default().push(binding);
    }

    /// Unbind a key
    pub fn unbind(&mut self, key: KeyCode) {
        let binding = InputBinding::Key(key);
        if let Some(action) = self.bindings.remove(&binding) {
            if let Some(bindings) = self.reverse.get_mut(&action) {
                bindings.retain(|b| *b != binding);
            }
        }
    }

    /// Get the action for a binding, if any
    pub fn get_action(&self, binding: &InputBinding) -> Option<InputAction> {
        self.bindings.get(binding).copied()
    }

    /// Get the action for a key, if any
    pub fn get_key_action(&self, key: KeyCode) -> Option<InputAction> {
        self.get_action(&InputBinding::Key(key))
    }

    /// All bindings that trigger an action
    pub fn bindings_for(&self, action: InputAction) -> &[InputBinding] {
        self.reverse.get(&action).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Input handler that processes raw events and updates state
#[derive(Debug)]
pub struct InputHandler {
    /// Current input state
    pub state: InputState,
    /// Input bindings
    pub bindings: InputBindings,
    /// Mouse sensitivity multiplier
    pub mouse_sensitivity: f32,
    /// Invert Y axis
    pub invert_y: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    /// Create a new input handler with default bindings
    pub fn new() -> Self {
        Self {
            state: InputState::new(),
            bindings: InputBindings::default(),
            mouse_sensitivity: 1.0,
            invert_y: false,
        }
    }

    fn apply(&mut self, action: InputAction, element_state: ElementState) {
        match element_state {
            ElementState::Pressed => {
                if !self.state.held.contains(&action) {
                    self.state.just_pressed.insert(action);
                }
                self.state.held.insert(action);
            }
            ElementState::Released => {
                self.state.held.remove(&action);
                self.state.just_released.insert(action);
            }
        }
    }

    /// Handle a keyboard event
    pub fn handle_keyboard(&mut self, physical_key: PhysicalKey, element_state: ElementState) {
        if let PhysicalKey::Code(key_code) = physical_key {
            if let Some(action) = self.bindings.get_key_action(key_code) {
                self.apply(action, element_state);
            }
        }
    }

    /// Handle a mouse button event
    pub fn handle_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        let button_id = match button {
            MouseButton::Left => 0,
            MouseButton::Right => 1,
            MouseButton::Middle => 2,
            MouseButton::Back => 3,
            MouseButton::Forward => 4,
            MouseButton::Other(id) => id as u32,
        };

        if let Some(action) = self.bindings.get_action(&InputBinding::Mouse(button_id)) {
            self.apply(action, state);
        }
    }

    /// Handle mouse movement
    pub fn handle_mouse_motion(&mut self, delta: (f64, f64)) {
        if self.state.cursor_captured {
            let y_mult = if self.invert_y { -1.0 } else { 1.0 };
            self.state.mouse_delta += Vec2::new(
                delta.0 as f32 * self.mouse_sensitivity,
                delta.1 as f32 * self.mouse_sensitivity * y_mult,
            );
        }
    }

    /// Handle the cursor moving over a viewport of the given pixel size
    pub fn handle_cursor_moved(&mut self, position: (f64, f64), viewport: (u32, u32)) {
        let (width, height) = (viewport.0.max(1) as f32, viewport.1.max(1) as f32);
        self.state.cursor = Vec2::new(
            position.0 as f32 / width * 2.0 - 1.0,
            1.0 - position.1 as f32 / height * 2.0,
        );
    }

    /// Clear frame-specific input data
    pub fn end_frame(&mut self) {
        self.state.clear_frame();
    }

    /// Set cursor capture state
    pub fn set_cursor_captured(&mut self, captured: bool) {
        self.state.cursor_captured = captured;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let bindings = InputBindings::default();
        assert_eq!(
            bindings.get_key_action(KeyCode::KeyW),
            Some(InputAction::MoveForward)
        );
        assert_eq!(
            bindings.get_key_action(KeyCode::Digit3),
            Some(InputAction::GodView)
        );
        assert_eq!(
            bindings.get_action(&InputBinding::Mouse(0)),
            Some(InputAction::Possess)
        );
    }

    #[test]
    fn test_rebinding_moves_reverse_entry() {
        let mut bindings = InputBindings::default();
        bindings.bind(KeyCode::Digit1, InputAction::GodView);
        assert!(bindings.bindings_for(InputAction::FirstPersonView).is_empty());
        assert_eq!(bindings.bindings_for(InputAction::GodView).len(), 2);

        bindings.unbind(KeyCode::Digit1);
        assert_eq!(bindings.get_key_action(KeyCode::Digit1), None);
    }

    #[test]
    fn test_input_state() {
        let mut state = InputState::new();
        state.held.insert(InputAction::MoveForward);
        state.just_pressed.insert(InputAction::Possess);

        assert!(state.is_held(InputAction::MoveForward));
        assert!(state.is_just_pressed(InputAction::Possess));
        assert!(!state.is_held(InputAction::GodView));

        state.clear_frame();
        assert!(state.is_held(InputAction::MoveForward));
        assert!(!state.is_just_pressed(InputAction::Possess));
    }

    #[test]
    fn test_movement_axes_clamp() {
        let mut state = InputState::new();
        state.held.insert(InputAction::MoveForward);
        state.held.insert(InputAction::MoveUp);
        state.analog_movement = Vec3::new(0.5, 0.0, -1.0);

        assert_eq!(state.movement_axes(), Vec3::new(0.5, 1.0, -1.0));
    }

    #[test]
    fn test_press_is_edge_triggered() {
        let mut handler = InputHandler::new();
        handler.handle_mouse_button(MouseButton::Left, ElementState::Pressed);
        assert!(handler.state.is_just_pressed(InputAction::Possess));

        handler.end_frame();
        handler.handle_mouse_button(MouseButton::Left, ElementState::Pressed);
        assert!(!handler.state.is_just_pressed(InputAction::Possess));
        assert!(handler.state.is_held(InputAction::Possess));
    }

    #[test]
    fn test_cursor_to_ndc() {
        let mut handler = InputHandler::new();
        handler.handle_cursor_moved((640.0, 360.0), (1280, 720));
        assert_eq!(handler.state.cursor, Vec2::ZERO);

        handler.handle_cursor_moved((0.0, 0.0), (1280, 720));
        assert_eq!(handler.state.cursor, Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn test_mouse_look_needs_capture() {
        let mut handler = InputHandler::new();
        handler.mouse_sensitivity = 0.5;
        handler.invert_y = true;

        handler.handle_mouse_motion((10.0, 4.0));
        assert_eq!(handler.state.look_axes(), Vec2::ZERO);

        handler.set_cursor_captured(true);
        handler.handle_mouse_motion((10.0, 4.0));
        assert_eq!(handler.state.look_axes(), Vec2::new(5.0, -2.0));

        handler.end_frame();
        assert_eq!(handler.state.look_axes(), Vec2::ZERO);
    }
}
