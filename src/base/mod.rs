//! Implements the base structures for the contact kernel

mod assembly;
mod config;
mod enums;
mod equations;
mod essential;
mod kinematics;
mod sample_meshes;
pub use crate::base::assembly::*;
pub use crate::base::config::*;
pub use crate::base::enums::*;
pub use crate::base::equations::*;
pub use crate::base::essential::*;
pub use crate::base::kinematics::*;
pub use crate::base::sample_meshes::*;
