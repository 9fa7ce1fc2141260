//! # Key Codes
//!
//! Identifiers for keyboard keys and mouse buttons as reported by the host's
//! raw input source.
//!
//! The textual spelling of each variant is part of the persistence wire
//! format: saved binding documents store keys by name (`Space`, `LeftShift`,
//! `Mouse0`, ...), so the names here must stay stable. Unknown names decode
//! to [`KeyCode::None`] rather than failing the load.

macro_rules! keycodes {
    ($($variant:ident),+ $(,)?) => {
        /// A keyboard key or mouse button.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum KeyCode {
            $($variant),+
        }

        impl KeyCode {
            /// Every key code, in declaration order. Used by the scan service
            /// to sweep the keyboard for candidate keys.
            pub const ALL: &'static [KeyCode] = &[$(KeyCode::$variant),+];

            /// The wire-format spelling of this key.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(KeyCode::$variant => stringify!($variant)),+
                }
            }

            /// Parses a wire-format spelling. Returns `None` (the Option) for
            /// unknown names; callers that want fail-soft decoding use
            /// [`KeyCode::from_name`].
            #[must_use]
            pub fn parse(name: &str) -> Option<KeyCode> {
                match name {
                    $(stringify!($variant) => Some(KeyCode::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

keycodes! {
    None,
    Backspace, Delete, Tab, Clear, Return, Pause, Escape, Space,
    Keypad0, Keypad1, Keypad2, Keypad3, Keypad4, Keypad5, Keypad6, Keypad7, Keypad8, Keypad9,
    KeypadPeriod, KeypadDivide, KeypadMultiply, KeypadMinus, KeypadPlus, KeypadEnter, KeypadEquals,
    UpArrow, DownArrow, RightArrow, LeftArrow,
    Insert, Home, End, PageUp, PageDown,
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12, F13, F14, F15,
    Alpha0, Alpha1, Alpha2, Alpha3, Alpha4, Alpha5, Alpha6, Alpha7, Alpha8, Alpha9,
    Exclaim, DoubleQuote, Hash, Dollar, Ampersand, Quote, LeftParen, RightParen,
    Asterisk, Plus, Comma, Minus, Period, Slash, Colon, Semicolon, Less, Equals,
    Greater, Question, At, LeftBracket, Backslash, RightBracket, Caret, Underscore, BackQuote,
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,
    Numlock, CapsLock, ScrollLock,
    RightShift, LeftShift, RightControl, LeftControl, RightAlt, LeftAlt,
    Mouse0, Mouse1, Mouse2, Mouse3, Mouse4, Mouse5, Mouse6,
}

impl KeyCode {
    /// Fail-soft name lookup: unknown spellings map to [`KeyCode::None`].
    #[must_use]
    pub fn from_name(name: &str) -> KeyCode {
        KeyCode::parse(name).unwrap_or(KeyCode::None)
    }
}

impl Default for KeyCode {
    fn default() -> Self {
        KeyCode::None
    }
}

impl std::fmt::Display for KeyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for KeyCode {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        KeyCode::parse(s).ok_or(())
    }
}
