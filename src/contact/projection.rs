use super::{centroid, inverse_checked, ElementGeometry};
use gemlab::shapes::Scratchpad;
use russell_lab::{mat_vec_mul, vec_inner, vec_norm, Matrix, Norm, Vector};
use serde::{Deserialize, Serialize};

/// Defines the non-fatal issues of a contact pair
///
/// These issues never abort an evaluation; they are recorded in the pair and counted.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum ContactIssue {
    /// The projection system became singular (even after restarting from the centroid)
    DegenerateProjection,

    /// The Newton iterations of the projection did not converge
    ProjectionNonConvergence,
}

/// Holds the result of a closest-point projection
#[derive(Clone, Copy, Debug)]
pub struct Projection {
    /// Natural coordinate r
    pub r: f64,

    /// Natural coordinate s
    pub s: f64,

    /// Projected point y(r,s)
    pub y: [f64; 3],

    /// Distance |x - y|
    pub distance: f64,

    /// Number of Newton iterations
    pub iterations: usize,
}

/// Finds the closest point on a surface element (Newton-Raphson method)
///
/// Solves the orthogonality conditions `(x - y(r,s)) · ∂y/∂ξ^α = 0` for α = 1, 2.
/// The Jacobian of the system is
///
/// ```text
/// J_αβ = -g_α · g_β + (x - y) · ∂²y/∂ξ^α∂ξ^β
/// ```
///
/// # Input
///
/// * `pad` -- the scratchpad with the current nodal coordinates of the element
/// * `x` -- the point to be projected
/// * `r0`, `s0` -- the initial (warm-start) natural coordinates
/// * `tol` -- tolerance on the norm of the Newton step
/// * `n_max_it` -- maximum number of iterations
pub fn project_point(
    pad: &mut Scratchpad,
    x: &[f64; 3],
    r0: f64,
    s0: f64,
    tol: f64,
    n_max_it: usize,
) -> Result<Projection, ContactIssue> {
    let (mut r, mut s) = (r0, s0);
    let mut ff = Vector::new(2);
    let mut delta = Vector::new(2);
    for it in 0..n_max_it {
        let geo = ElementGeometry::new(pad, r, s).map_err(|_| ContactIssue::DegenerateProjection)?;
        let d = Vector::initialized(3, |i| x[i] - geo.y[i]);
        ff[0] = vec_inner(&d, &geo.gg[0]);
        ff[1] = vec_inner(&d, &geo.gg[1]);
        let mm = geo.metric();
        let twist = vec_inner(&d, &geo.g12);
        let jj = Matrix::from(&[
            [-mm.get(0, 0), -mm.get(0, 1) + twist],
            [-mm.get(1, 0) + twist, -mm.get(1, 1)],
        ]);
        let ji = inverse_checked(&jj).ok_or(ContactIssue::DegenerateProjection)?;
        mat_vec_mul(&mut delta, 1.0, &ji, &ff).map_err(|_| ContactIssue::DegenerateProjection)?;
        r -= delta[0];
        s -= delta[1];
        if !r.is_finite() || !s.is_finite() {
            return Err(ContactIssue::ProjectionNonConvergence);
        }
        if vec_norm(&delta, Norm::Euc) < tol {
            let geo = ElementGeometry::new(pad, r, s).map_err(|_| ContactIssue::DegenerateProjection)?;
            let d = Vector::initialized(3, |i| x[i] - geo.y[i]);
            return Ok(Projection {
                r,
                s,
                y: geo.position(),
                distance: vec_norm(&d, Norm::Euc),
                iterations: it + 1,
            });
        }
    }
    Err(ContactIssue::ProjectionNonConvergence)
}

/// Finds the closest point on a surface element, restarting once from the centroid if degenerate
pub fn project_point_or_retry(
    pad: &mut Scratchpad,
    x: &[f64; 3],
    r0: f64,
    s0: f64,
    tol: f64,
    n_max_it: usize,
) -> Result<Projection, ContactIssue> {
    match project_point(pad, x, r0, s0, tol, n_max_it) {
        Err(ContactIssue::DegenerateProjection) => {
            let (rc, sc) = centroid(pad.kind.nnode());
            project_point(pad, x, rc, sc, tol, n_max_it)
        }
        other => other,
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
