use super::{calc_sliding_local, project_point, search_pair, ContactLaw, SlidingPoint};
use super::{Activity, Anchor, ContactInterface, ContactIssue, ContactPair, ContactStats, Surface};
use super::{AugmentStatus, InterfaceState, LocalSystem, SlidingResponse};
use crate::base::{assemble_matrix, assemble_vector, Config, Dof, Equations, MultiplierReset};
use crate::base::MeshKinematics;
use crate::StrError;
use gemlab::mesh::{Feature, Mesh};
use gemlab::shapes::Scratchpad;
use rayon::prelude::*;
use russell_lab::Vector;
use russell_sparse::CooMatrix;

/// Holds the pairs of one pass (slave surface against master surface)
struct SlidingPass {
    /// Index of the slave surface
    slave: usize,

    /// Index of the master surface
    master: usize,

    /// Holds one pair per slave integration point
    pairs: Vec<ContactPair>,

    /// Holds the local system of each pair
    systems: Vec<LocalSystem>,

    /// Holds the maximum number of non-zero values of the local Jacobians
    nnz_sup: usize,
}

/// Implements a facet-to-facet sliding interface
///
/// Each integration point of the slave surface is paired with its closest point on the
/// master surface. The normal constraint is enforced by the penalty or the augmented
/// Lagrangian method and the tangential constraint follows Coulomb's friction law.
///
/// With the two-pass option, each surface acts as the slave of the other one in turn
/// and the contributions of each pass are weighted by 1/2.
pub struct SlidingInterface {
    /// Holds the parameters
    config: Config,

    /// Holds the constraint laws
    law: ContactLaw,

    /// Holds the two surfaces: [first (slave of the first pass), second]
    surfaces: Vec<Surface>,

    /// Holds the equation numbers of each element of each surface
    ///
    /// (2, nelement, 3 × nnode)
    element_eqs: Vec<Vec<Vec<usize>>>,

    /// Holds the passes
    passes: Vec<SlidingPass>,

    /// Weight of each pass
    pass_weight: f64,

    /// Holds the statistics of the last evaluation
    stats: ContactStats,

    /// Index used in the augmentation reports
    pub index: usize,
}

impl SlidingInterface {
    /// Allocates a new instance
    ///
    /// # Input
    ///
    /// * `mesh` -- the reference mesh
    /// * `equations` -- the equation numbers
    /// * `slave_faces` -- the faces of the slave surface (outward normal)
    /// * `master_faces` -- the faces of the master surface (outward normal)
    /// * `config` -- the parameters
    pub fn new(
        mesh: &Mesh,
        equations: &Equations,
        slave_faces: &[&Feature],
        master_faces: &[&Feature],
        config: &Config,
    ) -> Result<Self, StrError> {
        if config.validate().is_some() {
            return Err("cannot allocate sliding interface because config.validate() failed");
        }
        let surfaces = vec![Surface::new(mesh, slave_faces)?, Surface::new(mesh, master_faces)?];
        let mut element_eqs = Vec::with_capacity(2);
        for surface in &surfaces {
            element_eqs.push(surface_equations(surface, equations)?);
        }
        let mut passes = vec![new_pass(&surfaces, 0, 1)];
        if config.two_pass {
            passes.push(new_pass(&surfaces, 1, 0));
        }
        let pass_weight = if config.two_pass { 0.5 } else { 1.0 };
        Ok(SlidingInterface {
            config: config.clone(),
            law: ContactLaw::new(config),
            surfaces,
            element_eqs,
            passes,
            pass_weight,
            stats: ContactStats::default(),
            index: 0,
        })
    }

    /// Returns the pairs of a pass (0 or 1 if two-pass)
    pub fn pairs(&self, pass: usize) -> &[ContactPair] {
        &self.passes[pass].pairs
    }

    /// Returns the number of passes
    pub fn npass(&self) -> usize {
        self.passes.len()
    }

    /// Returns the slave (0) or master (1) surface
    pub fn surface(&self, which: usize) -> &Surface {
        &self.surfaces[which]
    }
}

/// Returns the equation numbers of all elements of a surface
fn surface_equations(surface: &Surface, equations: &Equations) -> Result<Vec<Vec<usize>>, StrError> {
    let mut res = Vec::with_capacity(surface.elements.len());
    for element in &surface.elements {
        let mut eqs = Vec::with_capacity(3 * element.nnode());
        for p in &element.points {
            for dof in Dof::displacements() {
                eqs.push(equations.eq(*p, dof)?);
            }
        }
        res.push(eqs);
    }
    Ok(res)
}

/// Allocates the pairs of a pass
fn new_pass(surfaces: &[Surface], slave: usize, master: usize) -> SlidingPass {
    let mut pairs = Vec::new();
    for (e, element) in surfaces[slave].elements.iter().enumerate() {
        for ip in 0..element.ips.len() {
            pairs.push(ContactPair::new(e, ip));
        }
    }
    let max_nnode = surfaces[master].elements.iter().map(|e| e.nnode()).max().unwrap_or(4);
    let ndofs: Vec<_> = pairs
        .iter()
        .map(|pair| 3 * (surfaces[slave].elements[pair.slave_element].nnode() + max_nnode))
        .collect();
    SlidingPass {
        slave,
        master,
        pairs,
        systems: ndofs.iter().map(|n| LocalSystem::new(*n)).collect(),
        nnz_sup: ndofs.iter().map(|n| n * n).sum(),
    }
}

/// Holds the data shared by the evaluation of all pairs of a pass
struct PassData<'a> {
    slave: &'a Surface,
    master: &'a Surface,
    slave_eqs: &'a [Vec<usize>],
    master_eqs: &'a [Vec<usize>],
    law: &'a ContactLaw,
    config: &'a Config,
    weight: f64,
}

/// Calculates the local system of a pair and updates its state
fn enforce_pair(
    pair: &mut ContactPair,
    system: &mut LocalSystem,
    data: &PassData,
    kin: &dyn MeshKinematics,
    calc_jacobian: bool,
) {
    system.active = false;
    system.with_jacobian = false;
    let m = match pair.master {
        Some(m) if pair.in_range => m,
        _ => {
            pair.deactivate();
            return;
        }
    };
    let mut pad = data.master.current_pad(m, kin);
    let e = pair.slave_element;
    let element = &data.slave.elements[e];
    let point = SlidingPoint {
        x: pair.x,
        nn: element.ip_interp[pair.ip].as_data(),
        weight: data.weight * data.slave.ip_weights[e][pair.ip],
    };

    // the trial anchor is created at the first activation and kept until the next commit
    let friction = data.config.with_friction();
    let (anchor, new_anchor) = match pair.anchor {
        Some(a) if a.master == m => (Some(a), false),
        _ if friction => (
            Some(Anchor {
                master: m,
                r: pair.r,
                s: pair.s,
                normal: pair.normal,
            }),
            true,
        ),
        _ => (None, false),
    };

    // local-to-global map
    let neq = 3 * (element.nnode() + pad.kind.nnode());
    system.resize(neq);
    let (slave_eqs, master_eqs) = (&data.slave_eqs[e], &data.master_eqs[m]);
    system.local_to_global[..slave_eqs.len()].copy_from_slice(slave_eqs);
    system.local_to_global[slave_eqs.len()..].copy_from_slice(master_eqs);

    let with_jacobian = calc_jacobian && !pair.skip_stiffness;
    let jacobian = if with_jacobian { Some(&mut system.jacobian) } else { None };
    let res = match calc_sliding_local(
        &mut system.residual,
        jacobian,
        &point,
        &mut pad,
        pair.r,
        pair.s,
        pair.lambda,
        anchor.as_ref(),
        data.law,
    ) {
        Ok(res) => res,
        Err(_) => {
            pair.issue = Some(ContactIssue::DegenerateProjection);
            pair.deactivate();
            return;
        }
    };
    pair.gap = res.gap;
    pair.normal = res.normal;
    if !res.activity.is_active() {
        pair.deactivate();
        return;
    }
    pair.activity = res.activity;
    pair.pressure = res.pressure;
    pair.slip_direction = res.slip_direction;
    pair.active_in_cycle = true;
    if new_anchor {
        pair.anchor = anchor;
    }
    pair.next_anchor = match anchor {
        Some(a) => Some(next_anchor(pair, &a, &res, &mut pad, data)),
        None => None,
    };
    system.active = true;
    system.with_jacobian = with_jacobian;
}

/// Returns the anchor to be committed if the current state is accepted
///
/// A sticking pair keeps its anchor. A slipping pair drags its anchor to the point
/// whose elastic tangential displacement sits exactly on the Coulomb cone.
fn next_anchor(
    pair: &ContactPair,
    anchor: &Anchor,
    res: &SlidingResponse,
    pad: &mut Scratchpad,
    data: &PassData,
) -> Anchor {
    if res.activity == Activity::Stick {
        return Anchor {
            normal: res.normal,
            ..*anchor
        };
    }
    let slip = data.law.friction_coefficient * res.pressure / data.law.friction_penalty;
    let nt = res.slip_direction;
    let z = [pair.x[0] - slip * nt[0], pair.x[1] - slip * nt[1], pair.x[2] - slip * nt[2]];
    let (r, s) = match project_point(
        pad,
        &z,
        anchor.r,
        anchor.s,
        data.config.tol_projection,
        data.config.n_max_projection_it,
    ) {
        Ok(proj) => (proj.r, proj.s),
        Err(_) => (pair.r, pair.s),
    };
    Anchor {
        master: anchor.master,
        r,
        s,
        normal: res.normal,
    }
}

impl ContactInterface for SlidingInterface {
    fn config(&self) -> &Config {
        &self.config
    }

    fn search(&mut self, kin: &dyn MeshKinematics) {
        for pass in self.passes.iter_mut() {
            let slave = &self.surfaces[pass.slave];
            let master = &self.surfaces[pass.master];
            let config = &self.config;
            pass.pairs
                .par_iter_mut()
                .for_each(|pair| search_pair(pair, slave, master, kin, config));
        }
    }

    fn enforce(&mut self, kin: &dyn MeshKinematics, calc_jacobian: bool) {
        for pass in self.passes.iter_mut() {
            let data = PassData {
                slave: &self.surfaces[pass.slave],
                master: &self.surfaces[pass.master],
                slave_eqs: &self.element_eqs[pass.slave],
                master_eqs: &self.element_eqs[pass.master],
                law: &self.law,
                config: &self.config,
                weight: self.pass_weight,
            };
            pass.pairs
                .par_iter_mut()
                .zip(pass.systems.par_iter_mut())
                .for_each(|(pair, system)| enforce_pair(pair, system, &data, kin, calc_jacobian));
        }

        // statistics
        let mut stats = ContactStats::default();
        for pass in &self.passes {
            for pair in &pass.pairs {
                stats.n_pair += 1;
                match pair.activity {
                    Activity::Inactive => stats.n_inactive += 1,
                    Activity::Stick => stats.n_stick += 1,
                    Activity::Slip => stats.n_slip += 1,
                }
                match pair.issue {
                    Some(ContactIssue::DegenerateProjection) => stats.n_degenerate += 1,
                    Some(ContactIssue::ProjectionNonConvergence) => stats.n_non_converged += 1,
                    None => (),
                }
            }
        }
        if stats.n_degenerate + stats.n_non_converged > 0 {
            self.config.print_warning(&format!(
                "contact {}: {} degenerate and {} non-converged projections",
                self.index, stats.n_degenerate, stats.n_non_converged
            ));
        }
        self.stats = stats;
    }

    fn assemble_residual(&self, rr: &mut Vector, prescribed: &[bool]) {
        for pass in &self.passes {
            pass.systems
                .iter()
                .filter(|s| s.active)
                .for_each(|s| assemble_vector(rr, &s.residual, &s.local_to_global, prescribed));
        }
    }

    fn assemble_jacobian(&self, kk: &mut CooMatrix, prescribed: &[bool]) -> Result<(), StrError> {
        for pass in &self.passes {
            for s in pass.systems.iter().filter(|s| s.active && s.with_jacobian) {
                assemble_matrix(kk, &s.jacobian, &s.local_to_global, prescribed)?;
            }
        }
        Ok(())
    }

    fn augment(&mut self, naug: usize, kin: &dyn MeshKinematics) -> AugmentStatus {
        if !self.config.aug_lagrangian() {
            for pass in self.passes.iter_mut() {
                pass.pairs.iter_mut().for_each(|p| p.active_in_cycle = false);
            }
            return AugmentStatus::Converged;
        }
        self.search(kin);

        // new multipliers and norms
        let mut lambda_new = Vec::new();
        let (mut norm_old, mut norm_new) = (0.0, 0.0);
        let mut max_pen: f64 = 0.0;
        let mut n_active = 0;
        for pass in &self.passes {
            for pair in &pass.pairs {
                let value = if pair.in_range {
                    let pressure = self.law.normal_pressure(pair.lambda, pair.gap);
                    if pressure > 0.0 {
                        max_pen = f64::max(max_pen, pair.penetration());
                        n_active += 1;
                    }
                    pressure
                } else {
                    match self.config.multiplier_reset {
                        MultiplierReset::Never => pair.lambda,
                        MultiplierReset::OnSeparation => 0.0,
                        MultiplierReset::InactiveCycle => {
                            if pair.active_in_cycle {
                                pair.lambda
                            } else {
                                0.0
                            }
                        }
                    }
                };
                norm_old += pair.lambda * pair.lambda;
                norm_new += value * value;
                lambda_new.push(value);
            }
        }
        let (norm_old, norm_new) = (f64::sqrt(norm_old), f64::sqrt(norm_new));
        let lambda_change = if norm_new > 0.0 {
            f64::abs(norm_new - norm_old) / norm_new
        } else {
            f64::abs(norm_new - norm_old)
        };
        let gap_ok = self.config.tol_gap <= 0.0 || max_pen <= self.config.tol_gap;
        let converged = lambda_change <= self.config.tol_aug && gap_ok && naug >= self.config.n_aug_min;
        self.config
            .print_augmentation(self.index, naug, lambda_change, max_pen, n_active);

        let status = if converged {
            AugmentStatus::Converged
        } else if naug >= self.config.n_aug_max {
            self.config.print_warning(&format!(
                "contact {}: the maximum number of augmentations ({}) has been reached",
                self.index, self.config.n_aug_max
            ));
            AugmentStatus::LimitExceeded
        } else {
            let mut k = 0;
            for pass in self.passes.iter_mut() {
                for pair in pass.pairs.iter_mut() {
                    pair.lambda = lambda_new[k];
                    k += 1;
                }
            }
            AugmentStatus::Continue
        };
        for pass in self.passes.iter_mut() {
            pass.pairs.iter_mut().for_each(|p| p.active_in_cycle = false);
        }
        status
    }

    fn commit(&mut self) {
        for pass in self.passes.iter_mut() {
            pass.pairs.iter_mut().for_each(|p| p.commit());
        }
    }

    fn state(&self) -> InterfaceState {
        InterfaceState::Sliding(self.passes.iter().map(|p| p.pairs.clone()).collect())
    }

    fn restore_state(&mut self, state: InterfaceState) -> Result<(), StrError> {
        let all = match state {
            InterfaceState::Sliding(all) => all,
            _ => return Err("checkpoint does not match the kind of contact interface"),
        };
        if all.len() != self.passes.len() {
            return Err("checkpoint does not match the number of contact passes");
        }
        for (pass, pairs) in self.passes.iter().zip(&all) {
            if pairs.len() != pass.pairs.len() {
                return Err("checkpoint does not match the number of contact pairs");
            }
            for (pair, read) in pass.pairs.iter().zip(pairs) {
                if pair.slave_element != read.slave_element || pair.ip != read.ip {
                    return Err("checkpoint does not match the enumeration of contact pairs");
                }
            }
        }
        for (pass, pairs) in self.passes.iter_mut().zip(all) {
            pass.pairs = pairs;
        }
        Ok(())
    }

    fn stats(&self) -> ContactStats {
        self.stats
    }

    fn nnz_sup(&self) -> usize {
        self.passes.iter().map(|p| p.nnz_sup).sum()
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
