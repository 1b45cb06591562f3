use serde::{Deserialize, Serialize};

/// Defines degrees-of-freedom (DOF) types
///
/// Note: The fixed numbering scheme assists in sorting the DOFs.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Deserialize, Serialize)]
pub enum Dof {
    /// Displacement along the first dimension
    Ux = 0,

    /// Displacement along the second dimension
    Uy = 1,

    /// Displacement along the third dimension
    Uz = 2,
}

impl Dof {
    /// Returns the displacement DOFs in sorted order
    pub fn displacements() -> [Dof; 3] {
        [Dof::Ux, Dof::Uy, Dof::Uz]
    }
}

/// Defines how the normal non-penetration constraint is enforced
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum Formulation {
    /// Pure penalty: the pressure is proportional to the penetration
    Penalty,

    /// Augmented Lagrangian: penalty plus a multiplier updated by the augmentation loop
    AugLagrangian,
}

/// Defines when the Lagrange multiplier of a pair is set back to zero
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum MultiplierReset {
    /// The multiplier is never reset (only clamped)
    Never,

    /// The multiplier is reset when the pair stays inactive during a whole augmentation cycle
    InactiveCycle,

    /// The multiplier is reset as soon as the pair separates
    OnSeparation,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
