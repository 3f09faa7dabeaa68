pub use crate::app::App;
pub use sebrule_types::prelude::*;

// vim: ts=4
