//! Implements the surface-to-surface contact mechanics

mod contact_interfaces;
mod enforcer;
mod interface;
mod pair;
mod projection;
mod search;
mod sliding;
mod surface;
mod surface_element;
mod tied;
pub use crate::contact::contact_interfaces::*;
pub use crate::contact::enforcer::*;
pub use crate::contact::interface::*;
pub use crate::contact::pair::*;
pub use crate::contact::projection::*;
pub use crate::contact::search::*;
pub use crate::contact::sliding::*;
pub use crate::contact::surface::*;
pub use crate::contact::surface_element::*;
pub use crate::contact::tied::*;
