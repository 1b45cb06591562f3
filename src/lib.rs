//! Surface-to-surface contact mechanics for finite element simulations
//!
//! The kernel detects the proximity between two deformable surfaces, computes the
//! closest-point projections, enforces the non-penetration (and Coulomb friction)
//! constraints with a penalty or augmented Lagrangian method, and assembles the
//! resulting residual vector and consistent Jacobian matrix into the global system.

/// Defines a type alias for the error type as a static string
pub type StrError = &'static str;

pub mod base;
pub mod contact;
