use super::{calc_tied_local, centroid, is_inside, project_point_or_retry};
use super::{AugmentStatus, ContactInterface, ContactStats, InterfaceState, LocalSystem, Surface, TiedPair};
use crate::base::{assemble_matrix, assemble_vector, Config, Dof, Equations, MeshKinematics};
use crate::StrError;
use gemlab::mesh::{Feature, Mesh};
use rayon::prelude::*;
use russell_lab::Vector;
use russell_sparse::CooMatrix;

/// Implements a tied interface (node-to-facet)
///
/// Each slave node is glued to the master point found by the first search. The gap vector
/// `g = x_s - y(ξ₀)` is driven to zero by the penalty or the augmented Lagrangian method
/// with vector multipliers. The nodal area share of the slave node is the integration weight.
pub struct TiedInterface {
    /// Holds the parameters
    config: Config,

    /// Holds the slave surface
    slave: Surface,

    /// Holds the master surface
    master: Surface,

    /// Holds the equation numbers of the slave nodes (nnode_slave, 3)
    slave_eqs: Vec<[usize; 3]>,

    /// Holds the equation numbers of the master elements (nelement_master, 3 × nnode)
    master_eqs: Vec<Vec<usize>>,

    /// Holds one pair per slave node
    pairs: Vec<TiedPair>,

    /// Holds the local systems
    systems: Vec<LocalSystem>,

    /// Holds the maximum number of non-zero values of the local Jacobians
    nnz_sup: usize,

    /// Indicates that the slave nodes have been projected onto the master surface
    initialized: bool,

    /// Holds the statistics of the last evaluation
    stats: ContactStats,

    /// Index used in the augmentation reports
    pub index: usize,
}

impl TiedInterface {
    /// Allocates a new instance
    ///
    /// # Input
    ///
    /// * `mesh` -- the reference mesh
    /// * `equations` -- the equation numbers
    /// * `slave_faces` -- the faces of the slave surface
    /// * `master_faces` -- the faces of the master surface
    /// * `config` -- the parameters (friction and two-pass are ignored)
    pub fn new(
        mesh: &Mesh,
        equations: &Equations,
        slave_faces: &[&Feature],
        master_faces: &[&Feature],
        config: &Config,
    ) -> Result<Self, StrError> {
        if config.validate().is_some() {
            return Err("cannot allocate tied interface because config.validate() failed");
        }
        let slave = Surface::new(mesh, slave_faces)?;
        let master = Surface::new(mesh, master_faces)?;
        let mut slave_eqs = Vec::with_capacity(slave.nnode());
        for p in &slave.points {
            slave_eqs.push([
                equations.eq(*p, Dof::Ux)?,
                equations.eq(*p, Dof::Uy)?,
                equations.eq(*p, Dof::Uz)?,
            ]);
        }
        let mut master_eqs = Vec::with_capacity(master.elements.len());
        for element in &master.elements {
            let mut eqs = Vec::with_capacity(3 * element.nnode());
            for p in &element.points {
                for dof in Dof::displacements() {
                    eqs.push(equations.eq(*p, dof)?);
                }
            }
            master_eqs.push(eqs);
        }
        let pairs: Vec<_> = (0..slave.nnode()).map(|n| TiedPair::new(n)).collect();
        let max_nnode = master.elements.iter().map(|e| e.nnode()).max().unwrap_or(4);
        let ndof = 3 * (1 + max_nnode);
        let systems = pairs.iter().map(|_| LocalSystem::new(ndof)).collect();
        let nnz_sup = pairs.len() * ndof * ndof;
        Ok(TiedInterface {
            config: config.clone(),
            slave,
            master,
            slave_eqs,
            master_eqs,
            pairs,
            systems,
            nnz_sup,
            initialized: false,
            stats: ContactStats::default(),
            index: 0,
        })
    }

    /// Returns the pairs
    pub fn pairs(&self) -> &[TiedPair] {
        &self.pairs
    }
}

/// Returns the current position of a slave node
fn node_position(surface: &Surface, node: usize, kin: &dyn MeshKinematics) -> [f64; 3] {
    let mut x = Vector::new(3);
    kin.current_position(&mut x, surface.points[node]);
    [x[0], x[1], x[2]]
}

/// Finds the master point to which a slave node is tied
fn tie_node(pair: &mut TiedPair, x: &[f64; 3], master: &Surface, kin: &dyn MeshKinematics, config: &Config) {
    let node = master.closest_node(x, kin);
    let mut distance_min = f64::MAX;
    for e in &master.node_elements[node] {
        let nnode = master.elements[*e].nnode();
        let mut pad = master.current_pad(*e, kin);
        let (r0, s0) = centroid(nnode);
        let (tol, n_max_it) = (config.tol_projection, config.n_max_projection_it);
        if let Ok(proj) = project_point_or_retry(&mut pad, x, r0, s0, tol, n_max_it) {
            if is_inside(nnode, proj.r, proj.s, config.tol_search)
                && proj.distance <= config.search_radius
                && proj.distance < distance_min
            {
                distance_min = proj.distance;
                pair.master = Some(*e);
                pair.r = proj.r;
                pair.s = proj.s;
            }
        }
    }
}

impl ContactInterface for TiedInterface {
    fn config(&self) -> &Config {
        &self.config
    }

    fn search(&mut self, kin: &dyn MeshKinematics) {
        let (slave, master, config) = (&self.slave, &self.master, &self.config);
        let initialized = self.initialized;
        self.pairs.par_iter_mut().for_each(|pair| {
            let x = node_position(slave, pair.slave_node, kin);
            if !initialized {
                tie_node(pair, &x, master, kin, config);
            }
            if let Some(m) = pair.master {
                let mut pad = master.current_pad(m, kin);
                let mut y = Vector::new(3);
                if pad.calc_coords(&mut y, &[pair.r, pair.s]).is_ok() {
                    pair.gap = [x[0] - y[0], x[1] - y[1], x[2] - y[2]];
                }
            }
        });
        if !self.initialized {
            let n_free = self.pairs.iter().filter(|p| p.master.is_none()).count();
            if n_free > 0 {
                self.config.print_warning(&format!(
                    "tied contact {}: {} slave nodes could not be tied",
                    self.index, n_free
                ));
            }
            self.initialized = true;
        }
    }

    fn enforce(&mut self, kin: &dyn MeshKinematics, calc_jacobian: bool) {
        let (slave, master) = (&self.slave, &self.master);
        let (slave_eqs, master_eqs) = (&self.slave_eqs, &self.master_eqs);
        let penalty = self.config.penalty;
        self.pairs
            .par_iter_mut()
            .zip(self.systems.par_iter_mut())
            .for_each(|(pair, system)| {
                system.active = false;
                system.with_jacobian = false;
                let m = match pair.master {
                    Some(m) => m,
                    None => return,
                };
                let mut pad = master.current_pad(m, kin);
                let node = pair.slave_node;
                let x = node_position(slave, node, kin);
                system.resize(3 * (1 + pad.kind.nnode()));
                system.local_to_global[..3].copy_from_slice(&slave_eqs[node]);
                system.local_to_global[3..].copy_from_slice(&master_eqs[m]);
                let jacobian = if calc_jacobian { Some(&mut system.jacobian) } else { None };
                match calc_tied_local(
                    &mut system.residual,
                    jacobian,
                    &x,
                    &mut pad,
                    pair.r,
                    pair.s,
                    &pair.lambda,
                    slave.nodal_areas[node],
                    penalty,
                ) {
                    Ok(gap) => pair.gap = gap,
                    Err(_) => return,
                }
                system.active = true;
                system.with_jacobian = calc_jacobian;
            });
        let n_tied = self.pairs.iter().filter(|p| p.master.is_some()).count();
        self.stats = ContactStats {
            n_pair: self.pairs.len(),
            n_inactive: self.pairs.len() - n_tied,
            n_stick: n_tied,
            ..Default::default()
        };
    }

    fn assemble_residual(&self, rr: &mut Vector, prescribed: &[bool]) {
        self.systems
            .iter()
            .filter(|s| s.active)
            .for_each(|s| assemble_vector(rr, &s.residual, &s.local_to_global, prescribed));
    }

    fn assemble_jacobian(&self, kk: &mut CooMatrix, prescribed: &[bool]) -> Result<(), StrError> {
        for s in self.systems.iter().filter(|s| s.active && s.with_jacobian) {
            assemble_matrix(kk, &s.jacobian, &s.local_to_global, prescribed)?;
        }
        Ok(())
    }

    fn augment(&mut self, naug: usize, kin: &dyn MeshKinematics) -> AugmentStatus {
        if !self.config.aug_lagrangian() {
            return AugmentStatus::Converged;
        }
        self.search(kin);
        let penalty = self.config.penalty;
        let (mut norm_old, mut norm_new) = (0.0, 0.0);
        let mut max_gap: f64 = 0.0;
        let mut n_tied = 0;
        let mut lambda_new = Vec::with_capacity(self.pairs.len());
        for pair in &self.pairs {
            let mut value = pair.lambda;
            if pair.master.is_some() {
                n_tied += 1;
                for i in 0..3 {
                    value[i] += penalty * pair.gap[i];
                }
                let g = f64::sqrt(pair.gap[0] * pair.gap[0] + pair.gap[1] * pair.gap[1] + pair.gap[2] * pair.gap[2]);
                max_gap = f64::max(max_gap, g);
            }
            for i in 0..3 {
                norm_old += pair.lambda[i] * pair.lambda[i];
                norm_new += value[i] * value[i];
            }
            lambda_new.push(value);
        }
        let (norm_old, norm_new) = (f64::sqrt(norm_old), f64::sqrt(norm_new));
        let lambda_change = if norm_new > 0.0 {
            f64::abs(norm_new - norm_old) / norm_new
        } else {
            f64::abs(norm_new - norm_old)
        };
        let gap_ok = self.config.tol_gap <= 0.0 || max_gap <= self.config.tol_gap;
        let converged = lambda_change <= self.config.tol_aug && gap_ok && naug >= self.config.n_aug_min;
        self.config
            .print_augmentation(self.index, naug, lambda_change, max_gap, n_tied);
        if converged {
            AugmentStatus::Converged
        } else if naug >= self.config.n_aug_max {
            self.config.print_warning(&format!(
                "tied contact {}: the maximum number of augmentations ({}) has been reached",
                self.index, self.config.n_aug_max
            ));
            AugmentStatus::LimitExceeded
        } else {
            for (pair, value) in self.pairs.iter_mut().zip(lambda_new) {
                pair.lambda = value;
            }
            AugmentStatus::Continue
        }
    }

    fn commit(&mut self) {}

    fn state(&self) -> InterfaceState {
        InterfaceState::Tied(self.pairs.clone())
    }

    fn restore_state(&mut self, state: InterfaceState) -> Result<(), StrError> {
        let pairs = match state {
            InterfaceState::Tied(pairs) => pairs,
            _ => return Err("checkpoint does not match the kind of contact interface"),
        };
        if pairs.len() != self.pairs.len() {
            return Err("checkpoint does not match the number of contact pairs");
        }
        if self.pairs.iter().zip(&pairs).any(|(a, b)| a.slave_node != b.slave_node) {
            return Err("checkpoint does not match the enumeration of contact pairs");
        }
        self.pairs = pairs;
        self.initialized = true;
        Ok(())
    }

    fn stats(&self) -> ContactStats {
        self.stats
    }

    fn nnz_sup(&self) -> usize {
        self.nnz_sup
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
