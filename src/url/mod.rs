//! URL handling module for Anchor-Watch
//!
//! This module provides scope normalization (domain + folder), link
//! absolutization, fragment splitting and denylist matching.

mod domain;
mod matcher;
mod normalize;

pub use domain::Scope;
pub use matcher::Denylist;
pub use normalize::{absolutize_link, split_fragment};
