//! Text builders for wrapper fragments.
//!
//! - `enclose`: fault-isolating closures
//! - `templates`: one assembler per wrapper kind
//! - `compiler`: full fragment for a wrapper specification

pub mod compiler;
pub mod enclose;
pub mod templates;

pub use compiler::compile;
pub use enclose::{enclose_wrapping, enclose_wrapping_named, ErrorReport};
