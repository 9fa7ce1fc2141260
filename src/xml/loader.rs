//! # XML Decoder
//!
//! Decodes control schemes from the persistence wire format.
//!
//! Decoding is tolerant by design: missing binding fields fall back to their
//! defaults, unknown elements and enum spellings are ignored, and only a
//! structurally broken document is an error (callers keep their prior state
//! in that case).

use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::gamepad::{GamepadAxis, GamepadButton};
use crate::keycode::KeyCode;
use crate::scheme::binding::InputType;
use crate::scheme::ControlScheme;

use crate::error::Result;

/// Decode every control scheme in an XML document
///
/// # Errors
///
/// Returns error if the document is not well-formed XML.
pub fn decode_schemes(document: &str) -> Result<Vec<ControlScheme>> {
    let mut reader = Reader::from_str(document);
    let mut schemes: Vec<ControlScheme> = Vec::new();

    // Parser context: the scheme being filled, whether the cursor is inside
    // a Binding element, and the pending field element with its text.
    let mut current_scheme: Option<ControlScheme> = None;
    let mut in_binding = false;
    let mut skip_binding = false;
    let mut current_field: Option<String> = None;
    let mut field_text = String::new();
    let mut depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                depth += 1;
                let name = start.name();
                match name.as_ref() {
                    b"ControlScheme" => {
                        let scheme_name = read_attribute(&start, b"name")
                            .unwrap_or_else(|| "Unnamed Control Scheme".to_string());
                        current_scheme = Some(ControlScheme::new(&scheme_name));
                    }
                    b"Action" => {
                        if let Some(scheme) = current_scheme.as_mut() {
                            let action_name = read_attribute(&start, b"name")
                                .unwrap_or_else(|| "Unnamed Action".to_string());
                            let display_name = read_attribute(&start, b"displayName")
                                .unwrap_or_else(|| action_name.clone());
                            scheme.create_action(&action_name, &display_name);
                        }
                    }
                    b"Binding" => {
                        in_binding = true;
                        skip_binding = true;
                        if let Some(action) = current_scheme
                            .as_mut()
                            .and_then(|s| s.actions_mut().last_mut())
                        {
                            skip_binding = action.create_binding().is_none();
                        }
                    }
                    _ if in_binding => {
                        current_field =
                            Some(String::from_utf8_lossy(name.as_ref()).into_owned());
                        field_text.clear();
                    }
                    _ => {}
                }
            }
            Event::Text(text) => {
                if current_field.is_some() {
                    field_text.push_str(&text.unescape()?);
                }
            }
            Event::End(end) => {
                depth = depth.saturating_sub(1);
                match end.name().as_ref() {
                    b"ControlScheme" => {
                        if let Some(scheme) = current_scheme.take() {
                            schemes.push(scheme);
                        }
                    }
                    b"Binding" => {
                        in_binding = false;
                        current_field = None;
                    }
                    b"Action" => {}
                    _ => {
                        if let Some(field) = current_field.take() {
                            if !skip_binding {
                                apply_field(&mut current_scheme, &field, field_text.trim());
                            }
                        }
                    }
                }
            }
            Event::Empty(start) => match start.name().as_ref() {
                b"ControlScheme" => {
                    let scheme_name = read_attribute(&start, b"name")
                        .unwrap_or_else(|| "Unnamed Control Scheme".to_string());
                    schemes.push(ControlScheme::new(&scheme_name));
                }
                b"Action" => {
                    if let Some(scheme) = current_scheme.as_mut() {
                        let action_name = read_attribute(&start, b"name")
                            .unwrap_or_else(|| "Unnamed Action".to_string());
                        let display_name = read_attribute(&start, b"displayName")
                            .unwrap_or_else(|| action_name.clone());
                        scheme.create_action(&action_name, &display_name);
                    }
                }
                b"Binding" => {
                    if let Some(action) = current_scheme
                        .as_mut()
                        .and_then(|s| s.actions_mut().last_mut())
                    {
                        action.create_binding();
                    }
                }
                // An empty field element (e.g. <Positive/>) keeps the default
                _ => {}
            },
            Event::Eof => {
                if depth != 0 || current_scheme.is_some() {
                    return Err(crate::error::BindkitError::Persistence(
                        "unexpected end of document".to_string(),
                    ));
                }
                break;
            }
            _ => {}
        }
    }

    Ok(schemes)
}

/// Decode one named control scheme from an XML document
///
/// Returns `Ok(None)` when the document is valid but holds no scheme with
/// that name.
///
/// # Errors
///
/// Returns error if the document is not well-formed XML.
pub fn decode_scheme(document: &str, scheme_name: &str) -> Result<Option<ControlScheme>> {
    let schemes = decode_schemes(document)?;
    Ok(schemes.into_iter().find(|s| s.name == scheme_name))
}

/// Read and decode control schemes from a file
///
/// # Errors
///
/// Returns error if the file cannot be read or the document is malformed.
pub fn read_schemes_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<ControlScheme>> {
    let contents = std::fs::read_to_string(path)?;
    decode_schemes(&contents)
}

fn read_attribute(start: &quick_xml::events::BytesStart<'_>, key: &[u8]) -> Option<String> {
    start
        .attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok())
        .map(|value| value.into_owned())
}

fn apply_field(scheme: &mut Option<ControlScheme>, field: &str, text: &str) {
    let Some(binding) = scheme
        .as_mut()
        .and_then(|s| s.actions_mut().last_mut())
        .and_then(|a| {
            let last = a.bindings().len().checked_sub(1)?;
            a.binding_mut(last)
        })
    else {
        return;
    };

    match field {
        "Positive" => binding.positive = KeyCode::from_name(text),
        "Negative" => binding.negative = KeyCode::from_name(text),
        "DeadZone" => binding.dead_zone = parse_float(text, 0.0),
        "Gravity" => binding.gravity = parse_float(text, 1.0),
        "Sensitivity" => binding.sensitivity = parse_float(text, 1.0),
        "Snap" => binding.snap = parse_bool(text),
        "Invert" => binding.invert = parse_bool(text),
        "UseNeg" => binding.use_negative_axis_for_button = parse_bool(text),
        "Rebindable" => binding.rebindable = parse_bool(text),
        "SensitivityEditable" => binding.sensitivity_editable = parse_bool(text),
        "InvertEditable" => binding.invert_editable = parse_bool(text),
        "Type" => binding.kind = InputType::from_name(text),
        "Axis" => binding.mouse_axis = text.parse().unwrap_or(0),
        "GamepadButton" => binding.gamepad_button = GamepadButton::from_name(text),
        "GamepadAxis" => binding.gamepad_axis = GamepadAxis::from_name(text),
        "UpdateAsAxis" => binding.update_as_axis = parse_bool(text),
        "UpdateAsButton" => binding.update_as_button = parse_bool(text),
        _ => {}
    }
}

fn parse_float(text: &str, default: f32) -> f32 {
    text.parse().unwrap_or(default)
}

/// Accepts any ASCII casing of `true` (.NET writes `True`).
fn parse_bool(text: &str) -> bool {
    text.eq_ignore_ascii_case("true")
}
