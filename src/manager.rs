//! # Input Manager Module
//!
//! The explicitly constructed context owning the whole input stack: the
//! scheme registry, per-player scheme assignment, the gamepad handler, and
//! the scan service. Callers construct one and pass it by reference; there is
//! no global instance.
//!
//! ## Tick order
//!
//! `tick(delta_time, source)` advances, in order: the gamepad handler
//! (device check, raw sampling, D-pad synthesis), every control scheme
//! (binding integration and action aggregates), and the scan service. All
//! mutation happens here or through explicit calls serialized with it;
//! queries between ticks read cached state.

use std::collections::HashMap;
use std::path::Path;

use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::gamepad::{GamepadHandler, GamepadProfile};
use crate::keycode::KeyCode;
use crate::scan::{ScanCompleted, ScanFlags, ScanResult, ScanService};
use crate::scheme::binding::InputType;
use crate::scheme::{ControlScheme, InputAction};
use crate::source::RawInputSource;
use crate::xml;

/// Session-stable handle for an action name, interned at initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionId(usize);

/// Which binding an interactive rebind will overwrite.
#[derive(Debug, Clone)]
pub struct RebindTarget {
    /// Owning scheme name.
    pub scheme: String,
    /// Owning action name.
    pub action: String,
    /// Binding index within the action.
    pub binding_index: usize,
    /// For `DigitalAxis` bindings: rebinding the positive or negative key.
    pub changing_positive: bool,
}

/// The input context: scheme registry, players, gamepad engine and scanning.
pub struct InputManager {
    config: Config,
    schemes: Vec<ControlScheme>,
    scheme_lookup: HashMap<String, usize>,
    player_schemes: Vec<Option<usize>>,

    action_names: Vec<String>,
    action_ids: HashMap<String, usize>,

    gamepad: GamepadHandler,
    scan: ScanService,
    pending_rebind: Option<RebindTarget>,

    clock: f32,
    num_players: usize,
}

impl InputManager {
    /// Creates a manager with no schemes loaded.
    #[must_use]
    pub fn new(config: Config, profiles: Vec<GamepadProfile>) -> Self {
        let num_players = config.manager.num_players;
        let gamepad = GamepadHandler::new(profiles, num_players, &config);
        Self {
            config,
            schemes: Vec::new(),
            scheme_lookup: HashMap::new(),
            player_schemes: vec![None; num_players],
            action_names: Vec::new(),
            action_ids: HashMap::new(),
            gamepad,
            scan: ScanService::new(),
            pending_rebind: None,
            clock: 0.0,
            num_players,
        }
    }

    /// Number of players (and gamepad slots) this manager serves.
    #[must_use]
    pub fn num_players(&self) -> usize {
        self.num_players
    }

    /// The gamepad resolution engine.
    #[must_use]
    pub fn gamepad(&self) -> &GamepadHandler {
        &self.gamepad
    }

    /// Replaces the loaded schemes and rebuilds all registries.
    pub fn set_schemes(&mut self, schemes: Vec<ControlScheme>) {
        self.schemes = schemes;
        self.initialize();
    }

    /// Rebuilds lookups and per-player state from the current schemes.
    /// Every player starts on the first scheme.
    pub fn reinitialize(&mut self) {
        self.initialize();
    }

    fn initialize(&mut self) {
        self.scheme_lookup.clear();
        self.action_names.clear();
        self.action_ids.clear();
        self.player_schemes = vec![None; self.num_players];

        if self.schemes.is_empty() {
            warn!("No control schemes loaded");
            return;
        }

        for player in 0..self.num_players {
            self.player_schemes[player] = Some(0);
        }

        for (idx, scheme) in self.schemes.iter_mut().enumerate() {
            if self.scheme_lookup.contains_key(&scheme.name) {
                warn!("Duplicate control scheme name '{}'", scheme.name);
            } else {
                self.scheme_lookup.insert(scheme.name.clone(), idx);
            }

            scheme.initialize(self.num_players);

            for action in scheme.actions() {
                if !self.action_ids.contains_key(&action.name) {
                    self.action_ids
                        .insert(action.name.clone(), self.action_names.len());
                    self.action_names.push(action.name.clone());
                }
            }
        }
    }

    /// Advances the whole input stack by one tick.
    pub fn tick<S: RawInputSource>(&mut self, delta_time: f32, source: &S) {
        self.clock += delta_time;

        self.gamepad.on_update(delta_time, source);

        for scheme in &mut self.schemes {
            scheme.update(delta_time, source, &self.gamepad);
        }

        if self.scan.is_scanning() {
            let accepted = self.scan.update(
                self.clock,
                self.config.cancel_key(),
                self.config.scan.timeout_s,
                self.num_players,
                source,
                &self.gamepad,
            );

            if let Some(result) = accepted {
                if let Some(target) = self.pending_rebind.take() {
                    self.apply_rebind(&target, &result);
                }
            } else if !self.scan.is_scanning() {
                // Timeout or cancel: the pending target stays unchanged
                self.pending_rebind = None;
            }
        }
    }

    // ==================== Action queries ====================

    /// Interns an action name into a session-stable handle. Unknown names
    /// log a diagnostic and return `None`.
    #[must_use]
    pub fn action_id(&self, name: &str) -> Option<ActionId> {
        match self.action_ids.get(name) {
            Some(&idx) => Some(ActionId(idx)),
            None => {
                error!(
                    "An action named '{}' does not exist in the loaded control schemes",
                    name
                );
                None
            }
        }
    }

    fn action(&self, player: usize, id: ActionId) -> Option<&InputAction> {
        let scheme_idx = (*self.player_schemes.get(player)?)?;
        let name = self.action_names.get(id.0)?;
        self.schemes[scheme_idx].action(name)
    }

    /// The resolved float value of an action for a player.
    #[must_use]
    pub fn get_axis(&self, player: usize, id: ActionId) -> f32 {
        self.action(player, id).map(|a| a.value(player)).unwrap_or(0.0)
    }

    /// Whether an action is held for a player.
    #[must_use]
    pub fn get_button(&self, player: usize, id: ActionId) -> bool {
        self.action(player, id)
            .map(|a| a.get_button(player))
            .unwrap_or(false)
    }

    /// Whether an action was pressed this tick for a player.
    #[must_use]
    pub fn get_button_down(&self, player: usize, id: ActionId) -> bool {
        self.action(player, id)
            .map(|a| a.get_button_down(player))
            .unwrap_or(false)
    }

    /// Whether an action was released this tick for a player.
    #[must_use]
    pub fn get_button_up(&self, player: usize, id: ActionId) -> bool {
        self.action(player, id)
            .map(|a| a.get_button_up(player))
            .unwrap_or(false)
    }

    /// Whether any action of any player's scheme is receiving input.
    #[must_use]
    pub fn any_input(&self) -> bool {
        (0..self.num_players).any(|player| self.any_player_input(player))
    }

    /// Whether any action of a player's scheme is receiving input.
    #[must_use]
    pub fn any_player_input(&self, player: usize) -> bool {
        self.player_scheme(player)
            .map(|scheme| scheme.any_input(player))
            .unwrap_or(false)
    }

    /// Whether any action of a named scheme is receiving input from a player.
    #[must_use]
    pub fn any_scheme_input(&self, scheme_name: &str, player: usize) -> bool {
        self.control_scheme(scheme_name)
            .map(|scheme| scheme.any_input(player))
            .unwrap_or(false)
    }

    // ==================== Scheme management ====================

    /// A loaded scheme by name. Unknown names log a diagnostic.
    #[must_use]
    pub fn control_scheme(&self, name: &str) -> Option<&ControlScheme> {
        match self.scheme_lookup.get(name) {
            Some(&idx) => Some(&self.schemes[idx]),
            None => {
                error!("A control scheme named '{}' does not exist", name);
                None
            }
        }
    }

    /// The scheme a player is currently using.
    #[must_use]
    pub fn player_scheme(&self, player: usize) -> Option<&ControlScheme> {
        let idx = (*self.player_schemes.get(player)?)?;
        self.schemes.get(idx)
    }

    /// Switches a player to a named scheme. Already using it, or an unknown
    /// name, is a logged no-op.
    pub fn set_control_scheme(&mut self, name: &str, player: usize) {
        if player >= self.num_players {
            error!("Player {} is out of range", player);
            return;
        }

        if let Some(current) = self.player_schemes[player] {
            if self.schemes[current].name == name {
                warn!("Player {} is already using scheme '{}'", player, name);
                return;
            }
        }

        match self.scheme_lookup.get(name).copied() {
            Some(idx) => {
                self.schemes[idx].initialize(self.num_players);
                self.player_schemes[player] = Some(idx);
            }
            None => {
                error!("A control scheme named '{}' does not exist", name);
            }
        }
    }

    // ==================== Persistence ====================

    /// Saves the loaded schemes as an XML document at `path`.
    ///
    /// # Errors
    ///
    /// Returns error if encoding or writing fails.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        xml::write_schemes_to_file(path, &self.schemes)
    }

    /// The loaded schemes encoded as an XML document.
    ///
    /// # Errors
    ///
    /// Returns error if encoding fails.
    pub fn save_to_string(&self) -> Result<String> {
        xml::encode_schemes(&self.schemes)
    }

    /// Loads schemes from an XML file if it exists. Returns `Ok(false)` when
    /// the file is absent; a malformed document is an error and the prior
    /// state is kept.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or decoded.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<bool> {
        if !path.as_ref().exists() {
            return Ok(false);
        }
        let schemes = xml::read_schemes_from_file(path)?;
        self.set_schemes(schemes);
        Ok(true)
    }

    /// Replaces the loaded schemes from an XML document. A malformed
    /// document is an error and the prior state is kept.
    ///
    /// # Errors
    ///
    /// Returns error if the document cannot be decoded.
    pub fn load_from_str(&mut self, document: &str) -> Result<()> {
        let schemes = xml::decode_schemes(document)?;
        self.set_schemes(schemes);
        Ok(())
    }

    /// Restores binding `binding_index` of every action in a scheme from a
    /// default document. Refuses when the default scheme is missing or the
    /// action counts differ. Returns whether anything was restored.
    pub fn reset_scheme_binding(
        &mut self,
        scheme_name: &str,
        binding_index: usize,
        default_document: &str,
    ) -> bool {
        let default_scheme = match xml::decode_scheme(default_document, scheme_name) {
            Ok(Some(scheme)) => scheme,
            Ok(None) => {
                error!(
                    "Default input document doesn't contain a control scheme named '{}'",
                    scheme_name
                );
                return false;
            }
            Err(err) => {
                error!("Couldn't decode default input document: {}", err);
                return false;
            }
        };

        let Some(&scheme_idx) = self.scheme_lookup.get(scheme_name) else {
            error!("A control scheme named '{}' does not exist", scheme_name);
            return false;
        };

        let scheme = &mut self.schemes[scheme_idx];
        if scheme.actions().len() != default_scheme.actions().len() {
            error!("Current and default control scheme don't have the same number of actions");
            return false;
        }

        for (action, default_action) in scheme
            .actions_mut()
            .iter_mut()
            .zip(default_scheme.actions())
        {
            let Some(default_binding) = default_action.binding(binding_index) else {
                continue;
            };
            if let Some(binding) = action.binding_mut(binding_index) {
                binding.copy_from(default_binding);
            }
        }

        self.reinitialize();
        true
    }

    // ==================== Scanning and rebinding ====================

    /// Whether an interactive scan is in progress.
    #[must_use]
    pub fn is_scanning(&self) -> bool {
        self.scan.is_scanning()
    }

    /// Starts a raw input scan. See [`ScanService::start`].
    pub fn start_scan(
        &mut self,
        flags: ScanFlags,
        on_candidate: Option<Box<dyn FnMut(&ScanResult) -> bool>>,
        on_complete: Option<ScanCompleted>,
    ) -> bool {
        self.scan.start(self.clock, flags, on_candidate, on_complete)
    }

    /// Stops an active scan without a result.
    pub fn stop_scan(&mut self) {
        self.pending_rebind = None;
        self.scan.stop();
    }

    /// Begins an interactive rebind of one binding: the next matching raw
    /// input event (per the binding's kind) overwrites the binding when the
    /// scan completes. Returns `false` when a scan is already running, the
    /// target doesn't resolve, or the binding refuses rebinding.
    pub fn start_rebind(&mut self, target: RebindTarget, on_complete: Option<ScanCompleted>) -> bool {
        if self.scan.is_scanning() {
            warn!("An input scan is already in progress");
            return false;
        }

        let Some(binding) = self.target_binding(&target) else {
            error!(
                "Rebind target {}/{}[{}] does not resolve to a binding",
                target.scheme, target.action, target.binding_index
            );
            return false;
        };

        if !binding.rebindable {
            warn!(
                "Binding {} of action '{}' is not rebindable",
                target.binding_index, target.action
            );
            return false;
        }

        let flags = match binding.kind {
            InputType::MouseAxis => {
                error!("Can't rebind mouse axes");
                return false;
            }
            InputType::KeyButton | InputType::DigitalAxis => ScanFlags::KEY,
            InputType::GamepadAxis => ScanFlags::JOYSTICK_AXIS,
            InputType::GamepadButton | InputType::GamepadAnalogButton => {
                ScanFlags::JOYSTICK_BUTTON | ScanFlags::JOYSTICK_AXIS
            }
        };

        if !self.scan.start(self.clock, flags, None, on_complete) {
            return false;
        }
        self.pending_rebind = Some(target);
        true
    }

    fn target_binding(&self, target: &RebindTarget) -> Option<&crate::scheme::InputBinding> {
        let &idx = self.scheme_lookup.get(&target.scheme)?;
        self.schemes[idx]
            .action(&target.action)?
            .binding(target.binding_index)
    }

    fn apply_rebind(&mut self, target: &RebindTarget, result: &ScanResult) {
        let num_players = self.num_players;
        let Some(&scheme_idx) = self.scheme_lookup.get(&target.scheme) else {
            return;
        };
        let Some(binding) = self.schemes[scheme_idx]
            .action_mut(&target.action)
            .and_then(|a| a.binding_mut(target.binding_index))
        else {
            return;
        };

        if result.flags == ScanFlags::KEY {
            // Backspace clears the key
            let key = if result.key == KeyCode::Backspace {
                KeyCode::None
            } else {
                result.key
            };
            if binding.kind == InputType::DigitalAxis && !target.changing_positive {
                binding.negative = key;
            } else {
                binding.positive = key;
            }
        } else if result.flags == ScanFlags::JOYSTICK_BUTTON {
            binding.kind = InputType::GamepadButton;
            binding.gamepad_button = result.gamepad_button;
        } else if result.flags == ScanFlags::JOYSTICK_AXIS {
            if binding.kind == InputType::GamepadAxis {
                binding.gamepad_axis = result.gamepad_axis;
            } else {
                binding.kind = InputType::GamepadAnalogButton;
                binding.use_negative_axis_for_button = result.axis_value < 0.0;
                binding.gamepad_axis = result.gamepad_axis;
            }
        }

        binding.initialize(num_players);
        info!(
            "Rebound {}/{}[{}]",
            target.scheme, target.action, target.binding_index
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gamepad::profile::fixtures::test_profile;
    use crate::gamepad::{DPadType, GamepadAxis};
    use crate::source::doubles::ScriptedSource;

    const DEFAULT_XML: &str = r#"
<Input>
    <ControlScheme name="Keyboard">
        <Action name="Jump" displayName="Jump">
            <Binding>
                <Positive>Space</Positive>
                <Type>KeyButton</Type>
                <Rebindable>True</Rebindable>
            </Binding>
        </Action>
        <Action name="Horizontal" displayName="Horizontal">
            <Binding>
                <Positive>D</Positive>
                <Negative>A</Negative>
                <Gravity>3</Gravity>
                <Sensitivity>3</Sensitivity>
                <Snap>True</Snap>
                <Type>DigitalAxis</Type>
                <Rebindable>True</Rebindable>
            </Binding>
        </Action>
    </ControlScheme>
    <ControlScheme name="Gamepad">
        <Action name="Jump" displayName="Jump">
            <Binding>
                <Type>GamepadButton</Type>
                <GamepadButton>ActionBottom</GamepadButton>
                <Rebindable>True</Rebindable>
            </Binding>
        </Action>
        <Action name="Horizontal" displayName="Horizontal">
            <Binding>
                <Type>GamepadAxis</Type>
                <GamepadAxis>LeftThumbstickX</GamepadAxis>
                <DeadZone>0.1</DeadZone>
                <Rebindable>True</Rebindable>
            </Binding>
        </Action>
    </ControlScheme>
</Input>"#;

    fn test_manager() -> InputManager {
        let mut manager = InputManager::new(
            Config::default(),
            vec![test_profile(DPadType::Axis)],
        );
        manager.load_from_str(DEFAULT_XML).unwrap();
        manager
    }

    // ==================== Initialization Tests ====================

    #[test]
    fn test_players_start_on_first_scheme() {
        let manager = test_manager();
        assert_eq!(manager.player_scheme(0).unwrap().name, "Keyboard");
        assert_eq!(manager.player_scheme(1).unwrap().name, "Keyboard");
    }

    #[test]
    fn test_action_id_lookup() {
        let manager = test_manager();
        assert!(manager.action_id("Jump").is_some());
        assert!(manager.action_id("Horizontal").is_some());
        assert!(manager.action_id("Missing").is_none());
    }

    #[test]
    fn test_empty_manager_is_neutral() {
        let manager = InputManager::new(Config::default(), Vec::new());
        assert!(manager.action_id("Jump").is_none());
        assert!(manager.player_scheme(0).is_none());
        assert!(!manager.any_input());
    }

    // ==================== Query Tests ====================

    #[test]
    fn test_key_action_through_tick() {
        let mut manager = test_manager();
        let jump = manager.action_id("Jump").unwrap();
        let mut source = ScriptedSource::new(2);

        manager.tick(0.02, &source);
        assert!(!manager.get_button(0, jump));

        source.press(KeyCode::Space);
        manager.tick(0.02, &source);
        assert!(manager.get_button(0, jump));
        assert!(manager.get_button_down(0, jump));
        assert!(manager.any_player_input(0));
        assert!(manager.any_input());

        manager.tick(0.02, &source);
        assert!(!manager.get_button_down(0, jump));

        source.release(KeyCode::Space);
        manager.tick(0.02, &source);
        assert!(manager.get_button_up(0, jump));
    }

    #[test]
    fn test_digital_axis_through_tick() {
        let mut manager = test_manager();
        let horizontal = manager.action_id("Horizontal").unwrap();
        let mut source = ScriptedSource::new(2);

        source.press(KeyCode::D);
        // 0.5s at sensitivity 3 saturates the axis
        for _ in 0..25 {
            manager.tick(0.02, &source);
        }
        assert!((manager.get_axis(0, horizontal) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_out_of_range_player_is_neutral() {
        let manager = test_manager();
        let jump = manager.action_id("Jump").unwrap();
        assert_eq!(manager.get_axis(5, jump), 0.0);
        assert!(!manager.get_button(5, jump));
    }

    // ==================== Scheme Switching Tests ====================

    #[test]
    fn test_switch_scheme_per_player() {
        let mut manager = test_manager();
        manager.set_control_scheme("Gamepad", 1);
        assert_eq!(manager.player_scheme(0).unwrap().name, "Keyboard");
        assert_eq!(manager.player_scheme(1).unwrap().name, "Gamepad");
    }

    #[test]
    fn test_switch_to_unknown_scheme_is_noop() {
        let mut manager = test_manager();
        manager.set_control_scheme("Missing", 0);
        assert_eq!(manager.player_scheme(0).unwrap().name, "Keyboard");
    }

    #[test]
    fn test_switch_to_same_scheme_is_noop() {
        let mut manager = test_manager();
        manager.set_control_scheme("Keyboard", 0);
        assert_eq!(manager.player_scheme(0).unwrap().name, "Keyboard");
    }

    #[test]
    fn test_gamepad_scheme_resolves_per_slot() {
        let mut manager = test_manager();
        manager.set_control_scheme("Gamepad", 1);
        let jump = manager.action_id("Jump").unwrap();

        let mut source = ScriptedSource::new(2);
        source.connect(1, "Test Pad (USB)");
        manager.tick(0.02, &source); // assignment tick

        source.set_button(1, 0, true); // action_bottom on slot 1
        manager.tick(0.02, &source);

        assert!(manager.get_button(1, jump));
        // Player 0 is on the keyboard scheme; slot 0 has no pad anyway
        assert!(!manager.get_button(0, jump));
    }

    // ==================== Persistence Tests ====================

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("override.xml");

        let manager = test_manager();
        manager.save_to_file(&path).unwrap();

        let mut restored = InputManager::new(
            Config::default(),
            vec![test_profile(DPadType::Axis)],
        );
        assert!(restored.load_from_file(&path).unwrap());
        assert_eq!(
            restored.save_to_string().unwrap(),
            manager.save_to_string().unwrap()
        );
    }

    #[test]
    fn test_load_missing_file_returns_false() {
        let mut manager = test_manager();
        let loaded = manager.load_from_file("/nonexistent/override.xml").unwrap();
        assert!(!loaded);
        // Prior state untouched
        assert!(manager.action_id("Jump").is_some());
    }

    #[test]
    fn test_load_malformed_document_keeps_prior_state() {
        let mut manager = test_manager();
        assert!(manager.load_from_str("<Input><broken").is_err());
        assert!(manager.action_id("Jump").is_some());
        assert_eq!(manager.player_scheme(0).unwrap().name, "Keyboard");
    }

    #[test]
    fn test_reset_scheme_binding_restores_default() {
        let mut manager = test_manager();

        // Mutate the Jump key away from its default
        {
            let scheme_idx = *manager.scheme_lookup.get("Keyboard").unwrap();
            let binding = manager.schemes[scheme_idx]
                .action_mut("Jump")
                .unwrap()
                .binding_mut(0)
                .unwrap();
            binding.positive = KeyCode::Q;
        }

        assert!(manager.reset_scheme_binding("Keyboard", 0, DEFAULT_XML));

        let binding = manager
            .control_scheme("Keyboard")
            .unwrap()
            .action("Jump")
            .unwrap()
            .binding(0)
            .unwrap();
        assert_eq!(binding.positive, KeyCode::Space);
    }

    #[test]
    fn test_reset_scheme_binding_refuses_on_action_count_mismatch() {
        let mut manager = test_manager();

        let mismatched = r#"
<Input>
    <ControlScheme name="Keyboard">
        <Action name="Jump" displayName="Jump">
            <Binding><Positive>Space</Positive></Binding>
        </Action>
    </ControlScheme>
</Input>"#;

        assert!(!manager.reset_scheme_binding("Keyboard", 0, mismatched));
    }

    #[test]
    fn test_reset_scheme_binding_unknown_scheme() {
        let mut manager = test_manager();
        assert!(!manager.reset_scheme_binding("Missing", 0, DEFAULT_XML));
    }

    // ==================== Rebind Tests ====================

    fn jump_target() -> RebindTarget {
        RebindTarget {
            scheme: "Keyboard".to_string(),
            action: "Jump".to_string(),
            binding_index: 0,
            changing_positive: true,
        }
    }

    fn keyboard_jump_key(manager: &InputManager) -> KeyCode {
        manager
            .control_scheme("Keyboard")
            .unwrap()
            .action("Jump")
            .unwrap()
            .binding(0)
            .unwrap()
            .positive
    }

    #[test]
    fn test_rebind_key_button() {
        let mut manager = test_manager();
        let mut source = ScriptedSource::new(2);
        manager.tick(0.02, &source);

        assert!(manager.start_rebind(jump_target(), None));
        assert!(manager.is_scanning());

        source.press(KeyCode::G);
        manager.tick(0.02, &source);
        assert!(manager.is_scanning()); // waiting for the release

        source.release(KeyCode::G);
        manager.tick(0.02, &source);
        assert!(!manager.is_scanning());
        assert_eq!(keyboard_jump_key(&manager), KeyCode::G);
    }

    #[test]
    fn test_rebind_backspace_clears_key() {
        let mut manager = test_manager();
        let mut source = ScriptedSource::new(2);
        manager.tick(0.02, &source);

        assert!(manager.start_rebind(jump_target(), None));
        source.press(KeyCode::Backspace);
        manager.tick(0.02, &source);
        source.release(KeyCode::Backspace);
        manager.tick(0.02, &source);

        assert_eq!(keyboard_jump_key(&manager), KeyCode::None);
    }

    #[test]
    fn test_rebind_digital_axis_negative_side() {
        let mut manager = test_manager();
        let mut source = ScriptedSource::new(2);
        manager.tick(0.02, &source);

        let target = RebindTarget {
            scheme: "Keyboard".to_string(),
            action: "Horizontal".to_string(),
            binding_index: 0,
            changing_positive: false,
        };
        assert!(manager.start_rebind(target, None));

        source.press(KeyCode::Q);
        manager.tick(0.02, &source);
        source.release(KeyCode::Q);
        manager.tick(0.02, &source);

        let binding = manager
            .control_scheme("Keyboard")
            .unwrap()
            .action("Horizontal")
            .unwrap()
            .binding(0)
            .unwrap();
        assert_eq!(binding.negative, KeyCode::Q);
        assert_eq!(binding.positive, KeyCode::D); // untouched
    }

    #[test]
    fn test_rebind_gamepad_button_to_analog_axis() {
        let mut manager = test_manager();
        let mut source = ScriptedSource::new(2);
        source.connect(0, "Test Pad (USB)");
        manager.tick(0.02, &source);

        let target = RebindTarget {
            scheme: "Gamepad".to_string(),
            action: "Jump".to_string(),
            binding_index: 0,
            changing_positive: true,
        };
        assert!(manager.start_rebind(target, None));

        // Deflect an axis fully negative instead of pressing a button
        source.set_axis(0, 1, -0.95); // left_stick_y raw index
        manager.tick(0.02, &source);

        let binding = manager
            .control_scheme("Gamepad")
            .unwrap()
            .action("Jump")
            .unwrap()
            .binding(0)
            .unwrap();
        assert_eq!(binding.kind, InputType::GamepadAnalogButton);
        assert_eq!(binding.gamepad_axis, GamepadAxis::LeftThumbstickY);
        assert!(binding.use_negative_axis_for_button);
    }

    #[test]
    fn test_rebind_gamepad_axis_retargets_axis() {
        let mut manager = test_manager();
        let mut source = ScriptedSource::new(2);
        source.connect(0, "Test Pad (USB)");
        manager.tick(0.02, &source);

        let target = RebindTarget {
            scheme: "Gamepad".to_string(),
            action: "Horizontal".to_string(),
            binding_index: 0,
            changing_positive: true,
        };
        assert!(manager.start_rebind(target, None));

        source.set_axis(0, 4, 0.95); // right_stick_y raw index
        manager.tick(0.02, &source);

        let binding = manager
            .control_scheme("Gamepad")
            .unwrap()
            .action("Horizontal")
            .unwrap()
            .binding(0)
            .unwrap();
        assert_eq!(binding.kind, InputType::GamepadAxis); // kind unchanged
        assert_eq!(binding.gamepad_axis, GamepadAxis::RightThumbstickY);
    }

    #[test]
    fn test_rebind_while_scanning_fails() {
        let mut manager = test_manager();
        assert!(manager.start_rebind(jump_target(), None));
        assert!(!manager.start_rebind(jump_target(), None));
    }

    #[test]
    fn test_rebind_unknown_target_fails() {
        let mut manager = test_manager();
        let target = RebindTarget {
            scheme: "Keyboard".to_string(),
            action: "Missing".to_string(),
            binding_index: 0,
            changing_positive: true,
        };
        assert!(!manager.start_rebind(target, None));
        assert!(!manager.is_scanning());
    }

    #[test]
    fn test_rebind_not_rebindable_fails() {
        let mut manager = test_manager();
        {
            let scheme_idx = *manager.scheme_lookup.get("Keyboard").unwrap();
            manager.schemes[scheme_idx]
                .action_mut("Jump")
                .unwrap()
                .binding_mut(0)
                .unwrap()
                .rebindable = false;
        }
        assert!(!manager.start_rebind(jump_target(), None));
    }

    #[test]
    fn test_rebind_timeout_leaves_binding_unchanged() {
        let mut manager = test_manager();
        let source = ScriptedSource::new(2);
        manager.tick(0.02, &source);

        assert!(manager.start_rebind(jump_target(), None));

        // Exceed the 5s scan timeout with no input
        for _ in 0..60 {
            manager.tick(0.1, &source);
        }
        assert!(!manager.is_scanning());
        assert_eq!(keyboard_jump_key(&manager), KeyCode::Space);
    }

    #[test]
    fn test_rebind_cancel_key_leaves_binding_unchanged() {
        let mut manager = test_manager();
        let mut source = ScriptedSource::new(2);
        manager.tick(0.02, &source);

        assert!(manager.start_rebind(jump_target(), None));
        source.press(KeyCode::Escape);
        manager.tick(0.02, &source);

        assert!(!manager.is_scanning());
        assert_eq!(keyboard_jump_key(&manager), KeyCode::Space);
    }

    // ==================== Scan Passthrough Tests ====================

    #[test]
    fn test_generic_scan_through_manager() {
        let mut manager = test_manager();
        let mut source = ScriptedSource::new(2);
        manager.tick(0.02, &source);

        assert!(manager.start_scan(ScanFlags::KEY, None, None));
        assert!(manager.is_scanning());
        assert!(!manager.start_scan(ScanFlags::KEY, None, None));

        source.press(KeyCode::M);
        manager.tick(0.02, &source);
        source.release(KeyCode::M);
        manager.tick(0.02, &source);
        assert!(!manager.is_scanning());
    }

    #[test]
    fn test_stop_scan() {
        let mut manager = test_manager();
        assert!(manager.start_scan(ScanFlags::KEY, None, None));
        manager.stop_scan();
        assert!(!manager.is_scanning());
    }
}
