use super::{centroid, is_inside, project_point, project_point_or_retry, ElementGeometry};
use super::{Anchor, ContactIssue, ContactPair, Projection, Surface};
use crate::base::{Config, MeshKinematics};
use gemlab::shapes::Scratchpad;

/// Holds the best projection found by the search
struct Candidate {
    element: usize,
    projection: Projection,
}

/// Finds the closest valid projection of `x` onto a list of master elements
///
/// A projection is valid if it converges and lies inside the element (within `tol_search`).
/// Returns the best candidate and the last issue found, if any.
fn closest_projection(
    x: &[f64; 3],
    master: &Surface,
    elements: &[usize],
    kin: &dyn MeshKinematics,
    config: &Config,
) -> (Option<Candidate>, Option<ContactIssue>) {
    let mut best: Option<Candidate> = None;
    let mut issue = None;
    for e in elements {
        let nnode = master.elements[*e].nnode();
        let mut pad = master.current_pad(*e, kin);
        let (r0, s0) = centroid(nnode);
        match project_point_or_retry(&mut pad, x, r0, s0, config.tol_projection, config.n_max_projection_it) {
            Ok(proj) => {
                if is_inside(nnode, proj.r, proj.s, config.tol_search) {
                    let better = match &best {
                        Some(b) => proj.distance < b.projection.distance,
                        None => true,
                    };
                    if better {
                        best = Some(Candidate {
                            element: *e,
                            projection: proj,
                        });
                    }
                }
            }
            Err(e) => issue = Some(e),
        }
    }
    (best, issue)
}

/// Updates the projection of a slave integration point onto the master surface
///
/// The search strategy is:
///
/// 1. Re-project onto the previous master element, warm-started from the previous (r,s)
/// 2. If the projection leaves the element, project onto the neighbours of the previous
///    master element and onto the elements around the closest master node; then select
///    the valid projection with minimum distance
/// 3. If the pair has no previous master element, use the elements around the closest master node
///
/// If the projection onto the previous master does not converge (and nothing else is found),
/// the previous projection is kept and the stiffness of the pair is skipped in this pass.
/// A pair whose gap exceeds the search radius is out of range (inactive).
pub fn search_pair(
    pair: &mut ContactPair,
    slave: &Surface,
    master: &Surface,
    kin: &dyn MeshKinematics,
    config: &Config,
) {
    let x = slave.ip_position(pair.slave_element, pair.ip, kin);
    pair.x = x;
    pair.issue = None;
    pair.skip_stiffness = false;

    // warm start
    let mut warm_issue = None;
    if let Some(m) = pair.master {
        let nnode = master.elements[m].nnode();
        let mut pad = master.current_pad(m, kin);
        match project_point_or_retry(&mut pad, &x, pair.r, pair.s, config.tol_projection, config.n_max_projection_it) {
            Ok(proj) => {
                if is_inside(nnode, proj.r, proj.s, config.tol_search) {
                    set_projection(pair, master, m, &proj, kin, config);
                    return;
                }
            }
            Err(issue) => warm_issue = Some(issue),
        }
    }

    // candidates
    let mut elements: Vec<usize> = Vec::new();
    if let Some(m) = pair.master {
        for e in master.neighbours(m) {
            if e != m {
                elements.push(e);
            }
        }
    }
    let node = master.closest_node(&x, kin);
    for e in &master.node_elements[node] {
        if Some(*e) != pair.master && !elements.contains(e) {
            elements.push(*e);
        }
    }
    let (best, issue) = closest_projection(&x, master, &elements, kin, config);
    match best {
        Some(candidate) => set_projection(pair, master, candidate.element, &candidate.projection, kin, config),
        None => match warm_issue {
            Some(ContactIssue::ProjectionNonConvergence) => {
                // keep the previous projection
                pair.issue = Some(ContactIssue::ProjectionNonConvergence);
                pair.skip_stiffness = true;
                if let Some(m) = pair.master {
                    let mut pad = master.current_pad(m, kin);
                    if let Ok(geo) = ElementGeometry::new(&mut pad, pair.r, pair.s) {
                        pair.gap = geo.gap(&x);
                        pair.normal = geo.unit_normal();
                        pair.in_range = pair.gap <= config.search_radius;
                    }
                }
            }
            _ => {
                pair.issue = warm_issue.or(issue);
                pair.in_range = false;
            }
        },
    }
}

/// Sets the projection data of a pair (and moves the friction anchor to a new master element)
fn set_projection(
    pair: &mut ContactPair,
    master: &Surface,
    element: usize,
    proj: &Projection,
    kin: &dyn MeshKinematics,
    config: &Config,
) {
    let mut pad = master.current_pad(element, kin);
    let geo = match ElementGeometry::new(&mut pad, proj.r, proj.s) {
        Ok(geo) => geo,
        Err(_) => {
            pair.issue = Some(ContactIssue::DegenerateProjection);
            pair.in_range = false;
            return;
        }
    };
    pair.master = Some(element);
    pair.r = proj.r;
    pair.s = proj.s;
    pair.gap = geo.gap(&pair.x);
    pair.normal = geo.unit_normal();
    pair.in_range = pair.gap <= config.search_radius;
    if let Some(anchor) = pair.anchor {
        if anchor.master != element {
            pair.anchor = move_anchor(&anchor, master, element, &mut pad, kin, config);
        }
    }
}

/// Projects the anchor (material point of the old master element) onto the new master element
///
/// Returns None if the projection fails; then, the anchor is re-created at the next activation.
fn move_anchor(
    anchor: &Anchor,
    master: &Surface,
    element: usize,
    pad_new: &mut Scratchpad,
    kin: &dyn MeshKinematics,
    config: &Config,
) -> Option<Anchor> {
    let mut pad_old = master.current_pad(anchor.master, kin);
    let y_old = ElementGeometry::new(&mut pad_old, anchor.r, anchor.s).ok()?.position();
    let (r0, s0) = centroid(pad_new.kind.nnode());
    match project_point(pad_new, &y_old, r0, s0, config.tol_projection, config.n_max_projection_it) {
        Ok(proj) => Some(Anchor {
            master: element,
            r: proj.r,
            s: proj.s,
            normal: anchor.normal,
        }),
        Err(_) => None,
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
