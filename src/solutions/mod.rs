//! Solutions registered by level. Regenerated whenever a level is scaffolded.

use crate::registry::Registry;

#[allow(unused_mut)]
pub fn registry() -> Registry {
    let mut registry = Registry::default();
    registry
}
