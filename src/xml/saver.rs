//! # XML Encoder
//!
//! Encodes control schemes into the persistence wire format.

use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::Result;
use crate::scheme::{ControlScheme, InputAction, InputBinding};

/// Encode a set of control schemes as an XML document
///
/// Element order inside each `Binding` is fixed; existing saves are parsed
/// by name, but emitting a stable order keeps documents diffable.
///
/// # Errors
///
/// Returns error if the document cannot be written (I/O into the in-memory
/// buffer does not fail in practice; the signature mirrors the file variant).
pub fn encode_schemes(schemes: &[ControlScheme]) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    writer.write_event(Event::Start(BytesStart::new("Input")))?;
    for scheme in schemes {
        write_control_scheme(&mut writer, scheme)?;
    }
    writer.write_event(Event::End(BytesEnd::new("Input")))?;

    let bytes = writer.into_inner();
    String::from_utf8(bytes)
        .map_err(|err| crate::error::BindkitError::Persistence(err.to_string()))
}

/// Encode control schemes and write the document to a file
///
/// # Errors
///
/// Returns error if encoding fails or the file cannot be written.
pub fn write_schemes_to_file<P: AsRef<Path>>(path: P, schemes: &[ControlScheme]) -> Result<()> {
    let document = encode_schemes(schemes)?;
    std::fs::write(path, document)?;
    Ok(())
}

fn write_control_scheme(writer: &mut Writer<Vec<u8>>, scheme: &ControlScheme) -> Result<()> {
    let mut start = BytesStart::new("ControlScheme");
    start.push_attribute(("name", scheme.name.as_str()));
    writer.write_event(Event::Start(start))?;

    for action in scheme.actions() {
        write_action(writer, action)?;
    }

    writer.write_event(Event::End(BytesEnd::new("ControlScheme")))?;
    Ok(())
}

fn write_action(writer: &mut Writer<Vec<u8>>, action: &InputAction) -> Result<()> {
    let mut start = BytesStart::new("Action");
    start.push_attribute(("name", action.name.as_str()));
    start.push_attribute(("displayName", action.display_name.as_str()));
    writer.write_event(Event::Start(start))?;

    for binding in action.bindings() {
        write_binding(writer, binding)?;
    }

    writer.write_event(Event::End(BytesEnd::new("Action")))?;
    Ok(())
}

fn write_binding(writer: &mut Writer<Vec<u8>>, binding: &InputBinding) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("Binding")))?;

    write_field(writer, "Positive", binding.positive.as_str())?;
    write_field(writer, "Negative", binding.negative.as_str())?;

    write_field(writer, "DeadZone", &float_text(binding.dead_zone))?;
    write_field(writer, "Gravity", &float_text(binding.gravity))?;
    write_field(writer, "Sensitivity", &float_text(binding.sensitivity))?;

    write_field(writer, "Snap", bool_text(binding.snap))?;
    write_field(writer, "Invert", bool_text(binding.invert))?;

    write_field(writer, "UseNeg", bool_text(binding.use_negative_axis_for_button))?;
    write_field(writer, "Rebindable", bool_text(binding.rebindable))?;
    write_field(writer, "SensitivityEditable", bool_text(binding.sensitivity_editable))?;
    write_field(writer, "InvertEditable", bool_text(binding.invert_editable))?;

    write_field(writer, "Type", binding.kind.as_str())?;
    write_field(writer, "Axis", &binding.mouse_axis.to_string())?;

    write_field(writer, "GamepadButton", binding.gamepad_button.as_str())?;
    write_field(writer, "GamepadAxis", binding.gamepad_axis.as_str())?;

    write_field(writer, "UpdateAsAxis", bool_text(binding.update_as_axis))?;
    write_field(writer, "UpdateAsButton", bool_text(binding.update_as_button))?;

    writer.write_event(Event::End(BytesEnd::new("Binding")))?;
    Ok(())
}

fn write_field(writer: &mut Writer<Vec<u8>>, name: &str, value: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Existing saves spell booleans with .NET capitalisation.
fn bool_text(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Culture-invariant float spelling (shortest round-trippable form).
fn float_text(value: f32) -> String {
    value.to_string()
}
