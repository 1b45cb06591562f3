use super::{AugmentStatus, ContactInterface, ContactStats, InterfaceState, SlidingInterface, TiedInterface, TimeInfo};
use crate::base::{Config, Equations, MeshKinematics};
use crate::StrError;
use gemlab::mesh::{Feature, Mesh};
use russell_lab::Vector;
use russell_sparse::CooMatrix;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::path::Path;

/// Holds the persistent data of all contact interfaces (checkpoint)
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ContactCheckpoint {
    /// Index of the last evaluated time step
    pub timestep: Option<usize>,

    /// Holds the pairs of each interface (in the order the interfaces were added)
    pub interfaces: Vec<InterfaceState>,
}

/// Connects the contact interfaces to the global nonlinear solver
///
/// One evaluation per Newton iteration consists of (for each interface):
///
/// 1. search: update the projections of all pairs
/// 2. enforce: calculate the local residual vectors and Jacobian matrices (in parallel)
/// 3. assemble: add the contributions of the active pairs into the global system
///
/// After the Newton iterations have converged, the solver calls `augment` and
/// repeats the solve while the result is `AugmentStatus::Continue`.
///
/// A change in `TimeInfo::timestep` means that the previous time step has been accepted;
/// then, the history data of all pairs (friction anchors) is committed.
pub struct ContactInterfaces {
    /// Holds all interfaces
    pub all: Vec<Box<dyn ContactInterface>>,

    /// Index of the last evaluated time step
    timestep: Option<usize>,
}

impl ContactInterfaces {
    /// Allocates a new instance without interfaces
    pub fn new() -> Self {
        ContactInterfaces {
            all: Vec::new(),
            timestep: None,
        }
    }

    /// Adds a sliding interface
    pub fn add_sliding(
        &mut self,
        mesh: &Mesh,
        equations: &Equations,
        slave_faces: &[&Feature],
        master_faces: &[&Feature],
        config: &Config,
    ) -> Result<&mut Self, StrError> {
        let mut interface = SlidingInterface::new(mesh, equations, slave_faces, master_faces, config)?;
        interface.index = self.all.len();
        self.all.push(Box::new(interface));
        Ok(self)
    }

    /// Adds a tied interface
    pub fn add_tied(
        &mut self,
        mesh: &Mesh,
        equations: &Equations,
        slave_faces: &[&Feature],
        master_faces: &[&Feature],
        config: &Config,
    ) -> Result<&mut Self, StrError> {
        let mut interface = TiedInterface::new(mesh, equations, slave_faces, master_faces, config)?;
        interface.index = self.all.len();
        self.all.push(Box::new(interface));
        Ok(self)
    }

    /// Evaluates all interfaces and adds their contributions into the global system
    ///
    /// **Notes:**
    ///
    /// 1. The global vector R and matrix K are **not** cleared (the assembly is additive)
    /// 2. The equations marked as prescribed are skipped
    ///
    /// # Output
    ///
    /// * `rr` -- the global residual vector (n_equation)
    /// * `kk` -- the global Jacobian matrix (optional); it must have space for `nnz_sup()` more entries
    ///
    /// # Input
    ///
    /// * `kin` -- the current configuration
    /// * `time` -- the time information given by the nonlinear solver
    /// * `prescribed` -- the prescribed flags (n_equation)
    pub fn evaluate(
        &mut self,
        kin: &dyn MeshKinematics,
        time: &TimeInfo,
        rr: &mut Vector,
        kk: Option<&mut CooMatrix>,
        prescribed: &[bool],
    ) -> Result<(), StrError> {
        if rr.dim() != prescribed.len() {
            return Err("the residual vector and the prescribed array must have the same length");
        }
        if let Some(previous) = self.timestep {
            if previous != time.timestep {
                self.commit();
            }
        }
        self.timestep = Some(time.timestep);
        let calc_jacobian = kk.is_some();
        for interface in self.all.iter_mut() {
            interface.search(kin);
            interface.enforce(kin, calc_jacobian);
            interface.assemble_residual(rr, prescribed);
        }
        if let Some(kk) = kk {
            for interface in &self.all {
                interface.assemble_jacobian(kk, prescribed)?;
            }
        }
        Ok(())
    }

    /// Updates the Lagrange multipliers of all interfaces
    ///
    /// `naug` is the number of augmentations already performed in the current time step.
    /// Returns `Continue` if any interface requires another solve.
    pub fn augment(&mut self, naug: usize, kin: &dyn MeshKinematics) -> AugmentStatus {
        if naug == 0 {
            if let Some(first) = self.all.iter().find(|i| i.config().aug_lagrangian()) {
                first.config().print_aug_header();
            }
        }
        let mut status = AugmentStatus::Converged;
        for interface in self.all.iter_mut() {
            status = status.and(interface.augment(naug, kin));
        }
        status
    }

    /// Accepts the current state of all interfaces
    ///
    /// This is called automatically by `evaluate` when the time step changes.
    pub fn commit(&mut self) {
        self.all.iter_mut().for_each(|i| i.commit());
    }

    /// Returns the statistics of the last evaluation (all interfaces)
    pub fn stats(&self) -> ContactStats {
        let mut stats = ContactStats::default();
        self.all.iter().for_each(|i| stats.add(&i.stats()));
        stats
    }

    /// Returns the maximum number of non-zero values added to the global Jacobian matrix
    pub fn nnz_sup(&self) -> usize {
        self.all.iter().map(|i| i.nnz_sup()).sum()
    }

    /// Returns the checkpoint data
    pub fn checkpoint(&self) -> ContactCheckpoint {
        ContactCheckpoint {
            timestep: self.timestep,
            interfaces: self.all.iter().map(|i| i.state()).collect(),
        }
    }

    /// Restores the checkpoint data
    pub fn restore(&mut self, checkpoint: ContactCheckpoint) -> Result<(), StrError> {
        if checkpoint.interfaces.len() != self.all.len() {
            return Err("checkpoint does not match the number of contact interfaces");
        }
        for (interface, state) in self.all.iter_mut().zip(checkpoint.interfaces) {
            interface.restore_state(state)?;
        }
        self.timestep = checkpoint.timestep;
        Ok(())
    }

    /// Writes the checkpoint data to a stream (JSON)
    pub fn write_state<W: Write>(&self, writer: W) -> Result<(), StrError> {
        serde_json::to_writer(writer, &self.checkpoint()).map_err(|_| "cannot write contact state")
    }

    /// Reads the checkpoint data from a stream (JSON)
    pub fn read_state<R: Read>(&mut self, reader: R) -> Result<(), StrError> {
        let checkpoint: ContactCheckpoint =
            serde_json::from_reader(reader).map_err(|_| "cannot parse contact state")?;
        self.restore(checkpoint)
    }

    /// Writes a JSON file with the checkpoint data
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn write_json<P>(&self, full_path: &P) -> Result<(), StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        if let Some(p) = path.parent() {
            fs::create_dir_all(p).map_err(|_| "cannot create directory")?;
        }
        let file = File::create(&path).map_err(|_| "cannot create file")?;
        self.write_state(file)
    }

    /// Reads a JSON file containing the checkpoint data
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn read_json<P>(&mut self, full_path: &P) -> Result<(), StrError>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        let path = Path::new(full_path).to_path_buf();
        let input = File::open(path).map_err(|_| "cannot open file")?;
        self.read_state(BufReader::new(input))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
