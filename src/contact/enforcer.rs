use super::{inverse_checked, Activity, Anchor, ElementGeometry};
use crate::base::Config;
use crate::StrError;
use gemlab::shapes::Scratchpad;
use russell_lab::{mat_vec_mul, vec_norm, vec_outer, vec_outer_update, Matrix, Norm, Vector};

/// Holds the parameters of the normal and tangential (Coulomb) constraint laws
#[derive(Clone, Copy, Debug)]
pub struct ContactLaw {
    /// Normal penalty ε
    pub penalty: f64,

    /// Friction coefficient μ
    pub friction_coefficient: f64,

    /// Tangential penalty ε_t
    pub friction_penalty: f64,
}

impl ContactLaw {
    /// Allocates a new instance
    pub fn new(config: &Config) -> Self {
        ContactLaw {
            penalty: config.penalty,
            friction_coefficient: config.friction_coefficient,
            friction_penalty: config.tangential_penalty(),
        }
    }

    /// Calculates the normal pressure t_n = ⟨λ - ε g⟩
    ///
    /// The gap g is positive when separated. With λ = 0 this is the pure penalty law.
    #[inline]
    pub fn normal_pressure(&self, lambda: f64, gap: f64) -> f64 {
        f64::max(0.0, lambda - self.penalty * gap)
    }
}

/// Holds the data of a slave integration point
pub struct SlidingPoint<'a> {
    /// Current position
    pub x: [f64; 3],

    /// Shape functions of the slave element at the integration point
    pub nn: &'a [f64],

    /// Integration weight (times the reference area Jacobian)
    pub weight: f64,
}

/// Holds the constraint state computed for a sliding pair
#[derive(Clone, Copy, Debug)]
pub struct SlidingResponse {
    /// Signed gap (positive when separated)
    pub gap: f64,

    /// Master unit normal at the projection
    pub normal: [f64; 3],

    /// Normal pressure t_n ≥ 0
    pub pressure: f64,

    /// Activity (inactive if t_n = 0)
    pub activity: Activity,

    /// Unit slip direction (zero unless slipping)
    pub slip_direction: [f64; 3],
}

/// Calculates the local residual and Jacobian of a (slave point, master element) pair
///
/// The local DOFs are ordered as the slave element nodes followed by the master element
/// nodes, each with (Ux,Uy,Uz). The residual is the derivative of the contact potential;
/// i.e., `R = -w t_n Nv + R_T` with
///
/// ```text
/// Nv = [ N_a ν ; -H_b ν ]      (δg = Nv · δu)
/// ```
///
/// The Jacobian `K = ∂R/∂u` includes the material term `w ε Nv ⊗ Nv` and the geometric term
/// `-w t_n ∂²g/∂u²` accounting for the variation of the projection point, the normal
/// vector and the curvature of the master element. The tangential part uses an anchor
/// point (ξ₀ on the same master element) and a return mapping onto the Coulomb cone.
///
/// # Output
///
/// * `residual` -- the local residual vector (3 × (nnode_slave + nnode_master))
/// * `jacobian` -- the local Jacobian matrix (optional)
///
/// # Input
///
/// * `point` -- the slave integration point
/// * `pad` -- the scratchpad with the current coordinates of the master element
/// * `r`, `s` -- the natural coordinates of the projection onto the master element
/// * `lambda` -- the normal Lagrange multiplier
/// * `anchor` -- the friction anchor on the same master element (ignored if frictionless)
/// * `law` -- the constraint law parameters
pub fn calc_sliding_local(
    residual: &mut Vector,
    jacobian: Option<&mut Matrix>,
    point: &SlidingPoint,
    pad: &mut Scratchpad,
    r: f64,
    s: f64,
    lambda: f64,
    anchor: Option<&Anchor>,
    law: &ContactLaw,
) -> Result<SlidingResponse, StrError> {
    let ns = point.nn.len();
    let nm = pad.kind.nnode();
    let nnode = ns + nm;
    let n = 3 * nnode;
    let geo = ElementGeometry::new(pad, r, s)?;
    let gap = geo.gap(&point.x);
    let pressure = law.normal_pressure(lambda, gap);
    residual.fill(0.0);
    let mut response = SlidingResponse {
        gap,
        normal: geo.unit_normal(),
        pressure,
        activity: Activity::Inactive,
        slip_direction: [0.0; 3],
    };
    if pressure <= 0.0 {
        if let Some(kk) = jacobian {
            kk.fill(0.0);
        }
        return Ok(response);
    }
    response.activity = Activity::Stick;

    // c holds the coefficients of the nodes in x_s - y: [N_a, -H_b]
    let w = point.weight;
    let mut c = vec![0.0; nnode];
    for a in 0..ns {
        c[a] = point.nn[a];
    }
    for b in 0..nm {
        c[ns + b] = -geo.interp[b];
    }
    let mut nv = Vector::new(n);
    for k in 0..nnode {
        for i in 0..3 {
            nv[3 * k + i] = c[k] * geo.normal[i];
            residual[3 * k + i] = -w * pressure * nv[3 * k + i];
        }
    }

    let mut jac = jacobian;
    if let Some(kk) = jac.as_deref_mut() {
        vec_outer(kk, w * law.penalty, &nv, &nv)?;
        add_geometric_stiffness(kk, &geo, &c, ns, gap, w * pressure);
    }

    // friction
    if law.friction_coefficient <= 0.0 {
        return Ok(response);
    }
    let anc = match anchor {
        Some(a) => a,
        None => return Ok(response),
    };
    let mut y0 = Vector::new(3);
    pad.calc_coords(&mut y0, &[anc.r, anc.s])?;
    let mut c0 = c.clone();
    for b in 0..nm {
        c0[ns + b] = -pad.interp[b];
    }
    let nu0 = Vector::from(&anc.normal);
    let mut pp = Matrix::identity(3);
    vec_outer_update(&mut pp, -1.0, &nu0, &nu0)?;
    let wv = Vector::initialized(3, |i| point.x[i] - y0[i]);
    let mut wt = Vector::new(3);
    mat_vec_mul(&mut wt, 1.0, &pp, &wv)?;
    let norm_wt = vec_norm(&wt, Norm::Euc);
    let mu = law.friction_coefficient;
    let eps_t = law.friction_penalty;
    if eps_t * norm_wt <= mu * pressure {
        for k in 0..nnode {
            for i in 0..3 {
                residual[3 * k + i] += w * eps_t * c0[k] * wt[i];
            }
        }
        if let Some(kk) = jac.as_deref_mut() {
            for k in 0..nnode {
                for l in 0..nnode {
                    let coef = w * eps_t * c0[k] * c0[l];
                    for i in 0..3 {
                        for j in 0..3 {
                            kk.add(3 * k + i, 3 * l + j, coef * pp.get(i, j));
                        }
                    }
                }
            }
        }
    } else {
        response.activity = Activity::Slip;
        let nt = [wt[0] / norm_wt, wt[1] / norm_wt, wt[2] / norm_wt];
        response.slip_direction = nt;
        for k in 0..nnode {
            for i in 0..3 {
                residual[3 * k + i] += w * mu * pressure * c0[k] * nt[i];
            }
        }
        if let Some(kk) = jac.as_deref_mut() {
            for k in 0..nnode {
                for i in 0..3 {
                    let coef = -w * mu * law.penalty * c0[k] * nt[i];
                    for q in 0..n {
                        kk.add(3 * k + i, q, coef * nv[q]);
                    }
                }
            }
            let ratio = w * mu * pressure / norm_wt;
            for k in 0..nnode {
                for l in 0..nnode {
                    let coef = ratio * c0[k] * c0[l];
                    for i in 0..3 {
                        for j in 0..3 {
                            kk.add(3 * k + i, 3 * l + j, coef * (pp.get(i, j) - nt[i] * nt[j]));
                        }
                    }
                }
            }
        }
    }
    Ok(response)
}

/// Adds the geometric stiffness -tw ∂²g/∂u² where tw = w t_n
///
/// With T_α = [N_a g_α ; -H_b g_α], D_α = [0 ; H_b,α ν], the metric m_αβ, the curvature
/// b_αβ and A = m - g b:
///
/// ```text
/// ∂²g/∂u² = -Σ Tᶜ^α ⊗ D_α - Σ b_αβ Tᶜ^α ⊗ Ξ^β - Σ D_α ⊗ Ξ^α
/// Tᶜ^α = m^αβ T_β = [N_a g^α ; -H_b g^α]
/// Ξ^β  = (A⁻¹)_βα (T_α + g D_α)      (δξ^β = Ξ^β · δu)
/// ```
///
/// Nothing is added if the metric or A are singular.
fn add_geometric_stiffness(kk: &mut Matrix, geo: &ElementGeometry, c: &[f64], ns: usize, gap: f64, tw: f64) {
    let nnode = c.len();
    let n = 3 * nnode;
    let mm = geo.metric();
    let bb = geo.curvature();
    let gc = match geo.contravariant_tangents() {
        Some(v) => v,
        None => return,
    };
    let aa = Matrix::initialized(2, 2, |a, be| mm.get(a, be) - gap * bb.get(a, be));
    let ai = match inverse_checked(&aa) {
        Some(v) => v,
        None => return,
    };
    let nu = &geo.normal;
    let mut tt = vec![Vector::new(n), Vector::new(n)];
    let mut tc = vec![Vector::new(n), Vector::new(n)];
    let mut dd = vec![Vector::new(n), Vector::new(n)];
    for k in 0..nnode {
        for i in 0..3 {
            for a in 0..2 {
                tt[a][3 * k + i] = c[k] * geo.gg[a][i];
                tc[a][3 * k + i] = c[k] * gc[a][i];
            }
        }
    }
    for b_node in 0..(nnode - ns) {
        let k = ns + b_node;
        for i in 0..3 {
            for a in 0..2 {
                dd[a][3 * k + i] = geo.deriv.get(b_node, a) * nu[i];
            }
        }
    }
    let mut xi = vec![Vector::new(n), Vector::new(n)];
    for q in 0..n {
        for a in 0..2 {
            xi[a][q] = ai.get(a, 0) * (tt[0][q] + gap * dd[0][q]) + ai.get(a, 1) * (tt[1][q] + gap * dd[1][q]);
        }
    }
    for p in 0..n {
        for q in 0..n {
            let mut hg = 0.0;
            for a in 0..2 {
                hg -= tc[a][p] * dd[a][q] + dd[a][p] * xi[a][q];
                for be in 0..2 {
                    hg -= bb.get(a, be) * tc[a][p] * xi[be][q];
                }
            }
            kk.add(p, q, -tw * hg);
        }
    }
}

/// Calculates the local residual and Jacobian of a tied (slave node, master element) pair
///
/// The gap vector `g = x_s - y(ξ₀)` is linear in the displacements because ξ₀ is fixed.
/// The local DOFs are ordered as the slave node followed by the master element nodes.
///
/// ```text
/// R = A Wᵀ (λ + ε g)
/// K = ε A Wᵀ W            with W = [ I , -H_b(ξ₀) I ]
/// ```
///
/// Returns the gap vector
pub fn calc_tied_local(
    residual: &mut Vector,
    jacobian: Option<&mut Matrix>,
    x: &[f64; 3],
    pad: &mut Scratchpad,
    r: f64,
    s: f64,
    lambda: &[f64; 3],
    area: f64,
    penalty: f64,
) -> Result<[f64; 3], StrError> {
    let nm = pad.kind.nnode();
    let nnode = 1 + nm;
    let mut y = Vector::new(3);
    pad.calc_coords(&mut y, &[r, s])?;
    let mut c = vec![1.0; nnode];
    for b in 0..nm {
        c[1 + b] = -pad.interp[b];
    }
    let gap = [x[0] - y[0], x[1] - y[1], x[2] - y[2]];
    for k in 0..nnode {
        for i in 0..3 {
            residual[3 * k + i] = area * c[k] * (lambda[i] + penalty * gap[i]);
        }
    }
    if let Some(kk) = jacobian {
        kk.fill(0.0);
        for k in 0..nnode {
            for l in 0..nnode {
                let coef = penalty * area * c[k] * c[l];
                for i in 0..3 {
                    kk.set(3 * k + i, 3 * l + i, coef);
                }
            }
        }
    }
    Ok(gap)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{calc_sliding_local, calc_tied_local, ContactLaw, SlidingPoint};
    use crate::base::Config;
    use crate::contact::{alloc_pad, project_point, Activity, Anchor, ElementGeometry};
    use gemlab::shapes::{GeoKind, Scratchpad};
    use russell_lab::{approx_eq, deriv1_central5, mat_norm, vec_norm, Matrix, Norm, Vector};

    fn qua4_interp(r: f64, s: f64) -> Vec<f64> {
        let mut pad = Scratchpad::new(3, GeoKind::Qua4).unwrap();
        (pad.fn_interp)(&mut pad.interp, &[r, s]);
        pad.interp.as_data().clone()
    }

    fn law(penalty: f64, mu: f64, penalty_t: f64) -> ContactLaw {
        ContactLaw {
            penalty,
            friction_coefficient: mu,
            friction_penalty: penalty_t,
        }
    }

    #[test]
    fn contact_law_works() {
        let mut config = Config::new();
        config.set_penalty(1000.0).unwrap().set_friction(0.3, None).unwrap();
        let law = ContactLaw::new(&config);
        assert_eq!(law.friction_penalty, 1000.0);
        // separated
        assert_eq!(law.normal_pressure(0.0, 0.1), 0.0);
        // penetration δ → ε |δ|
        approx_eq(law.normal_pressure(0.0, -0.01), 10.0, 1e-14);
        // multiplier
        approx_eq(law.normal_pressure(5.0, -0.01), 15.0, 1e-14);
        approx_eq(law.normal_pressure(5.0, 0.001), 4.0, 1e-14);
        assert_eq!(law.normal_pressure(5.0, 0.01), 0.0);
    }

    fn unit_square(z: f64) -> Matrix {
        #[rustfmt::skip]
        let xx = Matrix::from(&[
            [0.0, 0.0, z],
            [1.0, 0.0, z],
            [1.0, 1.0, z],
            [0.0, 1.0, z],
        ]);
        xx
    }

    #[test]
    fn calc_sliding_local_works_separated() {
        let mut pad = alloc_pad(&unit_square(0.0)).unwrap();
        let nn = [1.0];
        let point = SlidingPoint {
            x: [0.5, 0.5, 0.1],
            nn: &nn,
            weight: 1.0,
        };
        let mut rr = Vector::new(15);
        let mut kk = Matrix::new(15, 15);
        let res = calc_sliding_local(
            &mut rr,
            Some(&mut kk),
            &point,
            &mut pad,
            0.0,
            0.0,
            0.0,
            None,
            &law(1000.0, 0.0, 1000.0),
        )
        .unwrap();
        assert_eq!(res.activity, Activity::Inactive);
        assert_eq!(res.pressure, 0.0);
        approx_eq(res.gap, 0.1, 1e-15);
        assert_eq!(vec_norm(&rr, Norm::Max), 0.0);
        assert_eq!(mat_norm(&kk, Norm::Max), 0.0);
    }

    #[test]
    fn calc_sliding_local_works_penetration() {
        // a single slave "node" (N = 1) penetrating the center of the unit square
        let mut pad = alloc_pad(&unit_square(0.0)).unwrap();
        let nn = [1.0];
        let point = SlidingPoint {
            x: [0.5, 0.5, -0.01],
            nn: &nn,
            weight: 0.25,
        };
        let mut rr = Vector::new(15);
        let mut kk = Matrix::new(15, 15);
        let res = calc_sliding_local(
            &mut rr,
            Some(&mut kk),
            &point,
            &mut pad,
            0.0,
            0.0,
            0.0,
            None,
            &law(1000.0, 0.0, 1000.0),
        )
        .unwrap();
        assert_eq!(res.activity, Activity::Stick);
        approx_eq(res.gap, -0.01, 1e-15);
        approx_eq(res.pressure, 10.0, 1e-12);
        // slave is pushed up (negative residual), master nodes are pushed down
        approx_eq(rr[2], -2.5, 1e-12);
        for m in 0..4 {
            approx_eq(rr[3 + 3 * m + 2], 0.25 * 2.5, 1e-12);
            approx_eq(rr[3 + 3 * m], 0.0, 1e-15);
        }
        // material stiffness
        approx_eq(kk.get(2, 2), 0.25 * 1000.0, 1e-10);
        approx_eq(kk.get(2, 5), -0.25 * 1000.0 * 0.25, 1e-10);
    }

    /// Holds a (slave element, master element) configuration to check the Jacobian
    struct Setup {
        ns: usize,
        nm: usize,
        nn: Vec<f64>,
        weight: f64,
        lambda: f64,
        anchor: Option<Anchor>,
        law: ContactLaw,
    }

    impl Setup {
        /// Calculates the residual (and, optionally, Jacobian) with the projection recomputed
        ///
        /// `uu` holds the positions of the slave nodes followed by the master nodes
        fn calc(&self, rr: &mut Vector, kk: Option<&mut Matrix>, uu: &Vector) -> Activity {
            let mut x = [0.0; 3];
            for a in 0..self.ns {
                for i in 0..3 {
                    x[i] += self.nn[a] * uu[3 * a + i];
                }
            }
            let mut xx = Matrix::new(self.nm, 3);
            for b in 0..self.nm {
                for i in 0..3 {
                    xx.set(b, i, uu[3 * (self.ns + b) + i]);
                }
            }
            let mut pad = alloc_pad(&xx).unwrap();
            let proj = project_point(&mut pad, &x, 0.0, 0.0, 1e-14, 50).unwrap();
            let point = SlidingPoint {
                x,
                nn: &self.nn,
                weight: self.weight,
            };
            let res = calc_sliding_local(
                rr,
                kk,
                &point,
                &mut pad,
                proj.r,
                proj.s,
                self.lambda,
                self.anchor.as_ref(),
                &self.law,
            )
            .unwrap();
            res.activity
        }

        /// Compares the analytical and numerical Jacobian matrices
        fn check_jacobian(&self, uu: &Vector, activity: Activity) {
            let n = uu.dim();
            let mut rr = Vector::new(n);
            let mut kk = Matrix::new(n, n);
            assert_eq!(self.calc(&mut rr, Some(&mut kk), uu), activity);
            let k_max = mat_norm(&kk, Norm::Max);
            struct Args {
                uu: Vector,
                rr: Vector,
            }
            let mut args = Args {
                uu: uu.clone(),
                rr: Vector::new(n),
            };
            for i in 0..n {
                for j in 0..n {
                    let at_u = uu[j];
                    let num = deriv1_central5(at_u, &mut args, |u, a| {
                        let original = a.uu[j];
                        a.uu[j] = u;
                        let act = self.calc(&mut a.rr, None, &a.uu);
                        assert_eq!(act, activity);
                        a.uu[j] = original;
                        Ok(a.rr[i])
                    })
                    .unwrap();
                    approx_eq(kk.get(i, j), num, 1e-8 * k_max);
                }
            }
        }
    }

    fn curved_quad_setup(mu: f64, anchor_shift: Option<(f64, f64)>) -> (Setup, Vector) {
        #[rustfmt::skip]
        let slave = [
            [0.1, 0.1, -0.02],
            [0.1, 0.9,  0.0],
            [0.9, 0.9, -0.03],
            [0.9, 0.1,  0.01],
        ];
        #[rustfmt::skip]
        let master = [
            [0.0, 0.0,  0.0],
            [1.0, 0.0,  0.1],
            [1.1, 1.0, -0.05],
            [0.0, 0.9,  0.15],
        ];
        let mut uu = Vector::new(24);
        for m in 0..4 {
            for i in 0..3 {
                uu[3 * m + i] = slave[m][i];
                uu[12 + 3 * m + i] = master[m][i];
            }
        }
        let nn = qua4_interp(0.2, -0.3);
        let mut setup = Setup {
            ns: 4,
            nm: 4,
            nn,
            weight: 0.3,
            lambda: 0.5,
            anchor: None,
            law: law(100.0, mu, 80.0),
        };
        if let Some((dr, ds)) = anchor_shift {
            // find the current projection and shift it to create the anchor
            let mut x = [0.0; 3];
            for a in 0..4 {
                for i in 0..3 {
                    x[i] += setup.nn[a] * slave[a][i];
                }
            }
            let mut pad = alloc_pad(&Matrix::from(&master)).unwrap();
            let proj = project_point(&mut pad, &x, 0.0, 0.0, 1e-14, 50).unwrap();
            let norm = f64::sqrt(1.0 + 0.01);
            setup.anchor = Some(Anchor {
                master: 0,
                r: proj.r + dr,
                s: proj.s + ds,
                normal: [0.0, 0.1 / norm, 1.0 / norm],
            });
        }
        (setup, uu)
    }

    #[test]
    fn penetration_is_correct_curved_quad() {
        let (setup, uu) = curved_quad_setup(0.0, None);
        let mut rr = Vector::new(24);
        assert_eq!(setup.calc(&mut rr, None, &uu), Activity::Stick);
        // the slave point penetrates the master by about 0.072
        let mut x = [0.0; 3];
        for a in 0..4 {
            for i in 0..3 {
                x[i] += setup.nn[a] * uu[3 * a + i];
            }
        }
        let xx = Matrix::from(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.1],
            [1.1, 1.0, -0.05],
            [0.0, 0.9, 0.15],
        ]);
        let mut pad = alloc_pad(&xx).unwrap();
        let proj = project_point(&mut pad, &x, 0.0, 0.0, 1e-14, 50).unwrap();
        let geo = ElementGeometry::new(&mut pad, proj.r, proj.s).unwrap();
        let gap: f64 = (0..3).map(|i| (x[i] - geo.y[i]) * geo.normal[i]).sum();
        approx_eq(gap, -0.07198829205371195, 1e-10);
        // the forces on slave and master are equal and opposite
        for i in 0..3 {
            let slave: f64 = (0..4).map(|a| rr[3 * a + i]).sum();
            let master: f64 = (0..4).map(|b| rr[12 + 3 * b + i]).sum();
            approx_eq(slave + master, 0.0, 1e-12);
        }
    }

    #[test]
    fn jacobian_is_consistent_frictionless() {
        let (setup, uu) = curved_quad_setup(0.0, None);
        setup.check_jacobian(&uu, Activity::Stick);
    }

    #[test]
    fn jacobian_is_consistent_stick() {
        let (setup, uu) = curved_quad_setup(0.5, Some((0.01, -0.01)));
        setup.check_jacobian(&uu, Activity::Stick);
    }

    #[test]
    fn jacobian_is_consistent_slip() {
        let (setup, uu) = curved_quad_setup(0.3, Some((0.2, -0.15)));
        setup.check_jacobian(&uu, Activity::Slip);
    }

    #[test]
    fn jacobian_is_consistent_triangle_master() {
        #[rustfmt::skip]
        let slave = [
            [0.1, 0.1, -0.02],
            [0.1, 0.9,  0.0],
            [0.9, 0.9, -0.03],
            [0.9, 0.1,  0.01],
        ];
        #[rustfmt::skip]
        let master = [
            [0.0, 0.0,  0.05],
            [1.2, 0.1, -0.05],
            [0.2, 1.1,  0.1],
        ];
        let mut uu = Vector::new(21);
        for m in 0..4 {
            for i in 0..3 {
                uu[3 * m + i] = slave[m][i];
            }
        }
        for m in 0..3 {
            for i in 0..3 {
                uu[12 + 3 * m + i] = master[m][i];
            }
        }
        let mut setup = Setup {
            ns: 4,
            nm: 3,
            nn: qua4_interp(0.2, -0.3),
            weight: 0.3,
            lambda: 0.5,
            anchor: None,
            law: law(100.0, 0.0, 80.0),
        };
        setup.check_jacobian(&uu, Activity::Stick);
        setup.law.friction_coefficient = 0.3;
        setup.anchor = Some(Anchor {
            master: 0,
            r: 0.2,
            s: 0.2,
            normal: [0.0, 0.0, 1.0],
        });
        setup.check_jacobian(&uu, Activity::Slip);
    }

    #[test]
    fn slip_traction_is_on_the_coulomb_cone() {
        let (setup, uu) = curved_quad_setup(0.3, Some((0.2, -0.15)));
        let mut rr = Vector::new(24);
        let mut x = [0.0; 3];
        for a in 0..4 {
            for i in 0..3 {
                x[i] += setup.nn[a] * uu[3 * a + i];
            }
        }
        let xx = Matrix::from(&[
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.1],
            [1.1, 1.0, -0.05],
            [0.0, 0.9, 0.15],
        ]);
        let mut pad = alloc_pad(&xx).unwrap();
        let proj = project_point(&mut pad, &x, 0.0, 0.0, 1e-14, 50).unwrap();
        let point = SlidingPoint {
            x,
            nn: &setup.nn,
            weight: setup.weight,
        };
        let res = calc_sliding_local(
            &mut rr,
            None,
            &point,
            &mut pad,
            proj.r,
            proj.s,
            setup.lambda,
            setup.anchor.as_ref(),
            &setup.law,
        )
        .unwrap();
        assert_eq!(res.activity, Activity::Slip);
        let len: f64 = res.slip_direction.iter().map(|v| v * v).sum();
        approx_eq(len, 1.0, 1e-14);
        // the tangential force on the slave equals μ w t_n
        let mut ft = [0.0; 3];
        for i in 0..3 {
            let total: f64 = (0..4).map(|a| rr[3 * a + i]).sum();
            ft[i] = total + setup.weight * res.pressure * res.normal[i];
        }
        let ft_norm = f64::sqrt(ft[0] * ft[0] + ft[1] * ft[1] + ft[2] * ft[2]);
        approx_eq(ft_norm, 0.3 * setup.weight * res.pressure, 1e-12);
    }

    #[test]
    fn calc_tied_local_works() {
        let mut pad = alloc_pad(&unit_square(0.0)).unwrap();
        let x = [0.25, 0.5, 0.02];
        let lambda = [1.0, 0.0, -2.0];
        let mut rr = Vector::new(15);
        let mut kk = Matrix::new(15, 15);
        // (r,s) = (-0.5, 0) is the point (0.25, 0.5, 0)
        let gap = calc_tied_local(&mut rr, Some(&mut kk), &x, &mut pad, -0.5, 0.0, &lambda, 0.5, 100.0)
            .unwrap();
        approx_eq(gap[0], 0.0, 1e-15);
        approx_eq(gap[1], 0.0, 1e-15);
        approx_eq(gap[2], 0.02, 1e-15);
        // traction t = λ + ε g = (1, 0, 0)
        approx_eq(rr[0], 0.5, 1e-14);
        approx_eq(rr[2], 0.0, 1e-14);
        // H = (3/8, 1/8, 1/8, 3/8)
        approx_eq(rr[3], -0.5 * 0.375, 1e-14);
        approx_eq(rr[6], -0.5 * 0.125, 1e-14);
        approx_eq(kk.get(0, 0), 50.0, 1e-12);
        approx_eq(kk.get(0, 1), 0.0, 1e-15);
        approx_eq(kk.get(2, 5), -50.0 * 0.375, 1e-12);
        approx_eq(kk.get(5, 14), 50.0 * 0.375 * 0.375, 1e-12);
    }

    #[test]
    fn tied_jacobian_is_consistent() {
        #[rustfmt::skip]
        let master = [
            [0.0, 0.0,  0.0],
            [1.0, 0.0,  0.1],
            [1.1, 1.0, -0.05],
            [0.0, 0.9,  0.15],
        ];
        let mut uu = Vector::new(15);
        uu[0] = 0.3;
        uu[1] = 0.4;
        uu[2] = 0.1;
        for m in 0..4 {
            for i in 0..3 {
                uu[3 + 3 * m + i] = master[m][i];
            }
        }
        let lambda = [0.1, -0.2, 0.3];
        let calc = |rr: &mut Vector, kk: Option<&mut Matrix>, uu: &Vector| {
            let mut xx = Matrix::new(4, 3);
            for b in 0..4 {
                for i in 0..3 {
                    xx.set(b, i, uu[3 + 3 * b + i]);
                }
            }
            let x = [uu[0], uu[1], uu[2]];
            let mut pad = alloc_pad(&xx).unwrap();
            calc_tied_local(rr, kk, &x, &mut pad, -0.2, 0.3, &lambda, 0.7, 50.0).unwrap();
        };
        let mut rr = Vector::new(15);
        let mut kk = Matrix::new(15, 15);
        calc(&mut rr, Some(&mut kk), &uu);
        struct Args {
            uu: Vector,
            rr: Vector,
        }
        let mut args = Args {
            uu: uu.clone(),
            rr: Vector::new(15),
        };
        for i in 0..15 {
            for j in 0..15 {
                let num = deriv1_central5(uu[j], &mut args, |u, a| {
                    let original = a.uu[j];
                    a.uu[j] = u;
                    calc(&mut a.rr, None, &a.uu);
                    a.uu[j] = original;
                    Ok(a.rr[i])
                })
                .unwrap();
                approx_eq(kk.get(i, j), num, 1e-8);
            }
        }
    }
}
