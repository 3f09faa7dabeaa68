pub use sebrule_types::prelude::*;

// vim: ts=4
