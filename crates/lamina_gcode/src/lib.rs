//! G-code parsing
//!
//! The slicer core itself never reads or writes G-code; this crate exists
//! for the collaborators around it (emitters, visualizers) and implements
//! the small subset they exchange: `G0`/`G1` linear moves, `G28` homing,
//! `G90`/`G91` positioning modes, and `G92` position overrides. Comments
//! start with `;`; lines that do not start with `G` are ignored.

mod command;
mod parser;

pub use command::{Axis, GCommand};
pub use parser::{parse_lines, parse_str, GCodeError};
