//! # XML Persistence Module
//!
//! Serializes the scheme/action/binding graph to and from the XML wire
//! format used by saved binding profiles.
//!
//! The element vocabulary is fixed for compatibility with existing saves:
//! an `Input` root holds `ControlScheme` elements (attribute `name`), each
//! holding `Action` elements (attributes `name`, `displayName`), each holding
//! `Binding` elements with one child element per binding field. Booleans are
//! spelled `True`/`False`, floats culture-invariant, enums by their canonical
//! names. The loader tolerates missing and unknown child elements.

pub mod loader;
pub mod saver;

pub use loader::{decode_scheme, decode_schemes, read_schemes_from_file};
pub use saver::{encode_schemes, write_schemes_to_file};
