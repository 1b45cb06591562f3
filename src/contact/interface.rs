use super::{ContactPair, TiedPair};
use crate::base::{Config, MeshKinematics};
use crate::StrError;
use russell_lab::{Matrix, Vector};
use russell_sparse::CooMatrix;
use serde::{Deserialize, Serialize};

/// Holds the time (pseudo-time) information given by the nonlinear solver
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeInfo {
    /// Current time
    pub t: f64,

    /// Current time increment
    pub dt: f64,

    /// Index of the current time step
    ///
    /// A change in this number means that the previous step has converged.
    pub timestep: usize,

    /// Index of the current (Newton) iteration
    pub iteration: usize,
}

impl TimeInfo {
    /// Allocates a new instance
    pub fn new(t: f64, dt: f64, timestep: usize, iteration: usize) -> Self {
        TimeInfo {
            t,
            dt,
            timestep,
            iteration,
        }
    }
}

/// Defines the result of an augmentation
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AugmentStatus {
    /// The multipliers have converged (or the formulation does not require augmentations)
    Converged,

    /// The multipliers have been updated; another solve is required
    Continue,

    /// The maximum number of augmentations has been reached (the solution is accepted)
    LimitExceeded,
}

impl AugmentStatus {
    /// Returns true if no further solve is required
    pub fn converged(&self) -> bool {
        *self != AugmentStatus::Continue
    }

    /// Combines the status of two interfaces
    pub fn and(self, other: AugmentStatus) -> AugmentStatus {
        match (self, other) {
            (AugmentStatus::Continue, _) | (_, AugmentStatus::Continue) => AugmentStatus::Continue,
            (AugmentStatus::LimitExceeded, _) | (_, AugmentStatus::LimitExceeded) => AugmentStatus::LimitExceeded,
            _ => AugmentStatus::Converged,
        }
    }
}

/// Holds statistics of the contact pairs after an evaluation
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ContactStats {
    /// Total number of pairs
    pub n_pair: usize,

    /// Number of inactive pairs
    pub n_inactive: usize,

    /// Number of sticking pairs (including frictionless active pairs)
    pub n_stick: usize,

    /// Number of slipping pairs
    pub n_slip: usize,

    /// Number of degenerate projections
    pub n_degenerate: usize,

    /// Number of projections that did not converge
    pub n_non_converged: usize,
}

impl ContactStats {
    /// Returns the number of active pairs
    #[inline]
    pub fn n_active(&self) -> usize {
        self.n_stick + self.n_slip
    }

    /// Adds the statistics of another interface
    pub fn add(&mut self, other: &ContactStats) {
        self.n_pair += other.n_pair;
        self.n_inactive += other.n_inactive;
        self.n_stick += other.n_stick;
        self.n_slip += other.n_slip;
        self.n_degenerate += other.n_degenerate;
        self.n_non_converged += other.n_non_converged;
    }
}

/// Holds the local residual vector and Jacobian matrix of a contact pair
pub struct LocalSystem {
    /// Local residual vector
    pub residual: Vector,

    /// Local Jacobian matrix
    pub jacobian: Matrix,

    /// Local-to-global equation numbers
    pub local_to_global: Vec<usize>,

    /// Indicates that the pair contributes to the residual
    pub active: bool,

    /// Indicates that the pair contributes to the Jacobian
    pub with_jacobian: bool,
}

impl LocalSystem {
    /// Allocates a new instance
    pub fn new(neq: usize) -> Self {
        LocalSystem {
            residual: Vector::new(neq),
            jacobian: Matrix::new(neq, neq),
            local_to_global: vec![0; neq],
            active: false,
            with_jacobian: false,
        }
    }

    /// Resizes the local system if the number of equations has changed
    pub fn resize(&mut self, neq: usize) {
        if self.residual.dim() != neq {
            self.residual = Vector::new(neq);
            self.jacobian = Matrix::new(neq, neq);
            self.local_to_global = vec![0; neq];
        }
    }
}

/// Holds the persistent data of an interface (for checkpoint/restart)
///
/// The pairs are stored positionally; i.e., in the deterministic order of the
/// (pass, slave element, integration point) or slave node enumeration.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub enum InterfaceState {
    /// Pairs of a sliding interface (one array per pass)
    Sliding(Vec<Vec<ContactPair>>),

    /// Pairs of a tied interface
    Tied(Vec<TiedPair>),
}

/// Defines the operations of a contact interface
///
/// One evaluation per Newton iteration consists of `search`, `enforce` and the assembly
/// functions. After the Newton iterations have converged, `augment` may request another
/// solve. `commit` is called when a time step is accepted.
pub trait ContactInterface: Send {
    /// Returns the parameters
    fn config(&self) -> &Config;

    /// Updates the projections of all pairs onto the master surface
    fn search(&mut self, kin: &dyn MeshKinematics);

    /// Calculates the local residual vectors (and Jacobian matrices) of all pairs
    fn enforce(&mut self, kin: &dyn MeshKinematics, calc_jacobian: bool);

    /// Adds the local residual vectors of the active pairs into the global vector
    fn assemble_residual(&self, rr: &mut Vector, prescribed: &[bool]);

    /// Adds the local Jacobian matrices of the active pairs into the global matrix
    fn assemble_jacobian(&self, kk: &mut CooMatrix, prescribed: &[bool]) -> Result<(), StrError>;

    /// Updates the Lagrange multipliers
    ///
    /// `naug` is the number of augmentations already performed in the current time step
    fn augment(&mut self, naug: usize, kin: &dyn MeshKinematics) -> AugmentStatus;

    /// Accepts the current state as the converged state of the time step
    fn commit(&mut self);

    /// Returns a copy of the persistent data
    fn state(&self) -> InterfaceState;

    /// Restores the persistent data
    fn restore_state(&mut self, state: InterfaceState) -> Result<(), StrError>;

    /// Returns the statistics of the last evaluation
    fn stats(&self) -> ContactStats;

    /// Returns the maximum number of non-zero values added to the global Jacobian matrix
    fn nnz_sup(&self) -> usize;
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
