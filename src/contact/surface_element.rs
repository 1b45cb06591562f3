use crate::StrError;
use gemlab::integ::{self, IntegPointData};
use gemlab::mesh::PointId;
use gemlab::shapes::{GeoKind, Scratchpad};
use russell_lab::{mat_inverse, vec_inner, Matrix, Vector};

/// Holds the mixed derivatives ∂²H/∂r∂s of the Qua4 shape functions
///
/// The shapes of the scratchpad only provide first derivatives; these constants give
/// the twist vector ∂²y/∂r∂s of bilinear facets. They vanish for Tri3.
const HRS_QUA4: [f64; 4] = [0.25, -0.25, 0.25, -0.25];

/// Holds the differential geometry of a surface element at a point (r,s)
///
/// The unit normal is ν = (g₁ × g₂) / |g₁ × g₂| where g₁ = ∂y/∂r and g₂ = ∂y/∂s.
/// With the counterclockwise node ordering (seen from outside), ν is the outward normal.
#[derive(Clone, Debug)]
pub struct ElementGeometry {
    /// Shape functions H at (r,s) (nnode)
    pub interp: Vector,

    /// Derivatives dH/dξ at (r,s) (nnode, 2)
    pub deriv: Matrix,

    /// Position y(r,s)
    pub y: Vector,

    /// Covariant tangent vectors g₁ = ∂y/∂r and g₂ = ∂y/∂s
    pub gg: [Vector; 2],

    /// Mixed derivative ∂²y/∂r∂s (zero for triangles)
    pub g12: Vector,

    /// Unit normal vector
    pub normal: Vector,

    /// Area Jacobian |g₁ × g₂|
    pub jac: f64,
}

impl ElementGeometry {
    /// Calculates the geometry at (r,s)
    ///
    /// **Note:** all coordinates of the scratchpad must have been set (`set_xx`)
    pub fn new(pad: &mut Scratchpad, r: f64, s: f64) -> Result<Self, StrError> {
        let ksi = [r, s];
        let mut y = Vector::new(3);
        let mut normal = Vector::new(3);
        pad.calc_coords(&mut y, &ksi)?;
        let jac = pad.calc_normal_vector(&mut normal, &ksi)?;
        let mut g12 = Vector::new(3);
        if pad.kind == GeoKind::Qua4 {
            for m in 0..4 {
                for i in 0..3 {
                    g12[i] += HRS_QUA4[m] * pad.xxt.get(i, m);
                }
            }
        }
        Ok(ElementGeometry {
            interp: pad.interp.clone(),
            deriv: pad.deriv.clone(),
            y,
            gg: [
                Vector::from(&pad.jacobian.extract_column(0)),
                Vector::from(&pad.jacobian.extract_column(1)),
            ],
            g12,
            normal,
            jac,
        })
    }

    /// Returns the signed distance (x - y) · ν of a point to the tangent plane at y
    pub fn gap(&self, x: &[f64; 3]) -> f64 {
        let d = Vector::initialized(3, |i| x[i] - self.y[i]);
        vec_inner(&d, &self.normal)
    }

    /// Returns the position y as an array
    pub fn position(&self) -> [f64; 3] {
        [self.y[0], self.y[1], self.y[2]]
    }

    /// Returns the unit normal as an array
    pub fn unit_normal(&self) -> [f64; 3] {
        [self.normal[0], self.normal[1], self.normal[2]]
    }

    /// Returns the covariant metric m_αβ = g_α · g_β
    pub fn metric(&self) -> Matrix {
        Matrix::initialized(2, 2, |a, b| vec_inner(&self.gg[a], &self.gg[b]))
    }

    /// Returns the contravariant metric m^αβ (inverse of the covariant metric)
    ///
    /// Returns None if the tangent vectors are (nearly) parallel
    pub fn metric_inverse(&self) -> Option<Matrix> {
        inverse_checked(&self.metric())
    }

    /// Returns the curvature tensor b_αβ = ν · ∂²y/∂ξ^α∂ξ^β
    ///
    /// The second derivatives ∂²y/∂r² and ∂²y/∂s² vanish for the linear elements.
    pub fn curvature(&self) -> Matrix {
        let b12 = vec_inner(&self.normal, &self.g12);
        Matrix::from(&[[0.0, b12], [b12, 0.0]])
    }

    /// Returns the contravariant base vectors g^α = m^αβ g_β
    pub fn contravariant_tangents(&self) -> Option<[Vector; 2]> {
        let mi = self.metric_inverse()?;
        let calc = |a: usize| Vector::initialized(3, |i| mi.get(a, 0) * self.gg[0][i] + mi.get(a, 1) * self.gg[1][i]);
        Some([calc(0), calc(1)])
    }
}

/// Holds a surface element (facet) of a contact surface
///
/// The element is immutable after creation.
#[derive(Clone)]
pub struct SurfaceElement {
    /// Geometry kind (Tri3 or Qua4)
    pub kind: GeoKind,

    /// Global (mesh) point ids, in local node order
    pub points: Vec<PointId>,

    /// Local (surface) node indices, in local node order
    pub nodes: Vec<usize>,

    /// Scratchpad of this kind of element (the coordinates are not set)
    pub pad: Scratchpad,

    /// Integration points (r, s, t, weight)
    pub ips: IntegPointData,

    /// Shape functions at the integration points
    pub ip_interp: Vec<Vector>,
}

impl SurfaceElement {
    /// Allocates a new instance
    pub fn new(kind: GeoKind, points: &[PointId], nodes: &[usize]) -> Result<Self, StrError> {
        if kind != GeoKind::Tri3 && kind != GeoKind::Qua4 {
            return Err("surface element must be Tri3 or Qua4");
        }
        if points.len() != kind.nnode() || nodes.len() != kind.nnode() {
            return Err("number of points of surface element is incorrect");
        }
        let mut pad = Scratchpad::new(3, kind)?;
        let ips = integ::default_points(kind);
        let ip_interp = ips
            .iter()
            .map(|ip| {
                (pad.fn_interp)(&mut pad.interp, &[ip[0], ip[1]]);
                pad.interp.clone()
            })
            .collect();
        Ok(SurfaceElement {
            kind,
            points: points.to_vec(),
            nodes: nodes.to_vec(),
            pad,
            ips,
            ip_interp,
        })
    }

    /// Returns the number of nodes
    #[inline]
    pub fn nnode(&self) -> usize {
        self.points.len()
    }
}

/// Allocates a scratchpad holding the nodal coordinates of a surface element
///
/// `xx` is (nnode, 3) with nnode = 3 (Tri3) or 4 (Qua4)
pub fn alloc_pad(xx: &Matrix) -> Result<Scratchpad, StrError> {
    let (nnode, ndim) = xx.dims();
    let kind = match nnode {
        3 => GeoKind::Tri3,
        4 => GeoKind::Qua4,
        _ => return Err("surface element must be Tri3 or Qua4"),
    };
    if ndim != 3 {
        return Err("contact mechanics requires a 3D mesh");
    }
    let mut pad = Scratchpad::new(3, kind)?;
    for m in 0..nnode {
        for j in 0..3 {
            pad.set_xx(m, j, xx.get(m, j));
        }
    }
    Ok(pad)
}

/// Returns the natural coordinates of the centroid
pub fn centroid(nnode: usize) -> (f64, f64) {
    if nnode == 4 {
        (0.0, 0.0)
    } else {
        (1.0 / 3.0, 1.0 / 3.0)
    }
}

/// Checks whether (r,s) lies inside the parametric domain, within a tolerance
pub fn is_inside(nnode: usize, r: f64, s: f64, tol: f64) -> bool {
    if nnode == 4 {
        r >= -1.0 - tol && r <= 1.0 + tol && s >= -1.0 - tol && s <= 1.0 + tol
    } else {
        r >= -tol && s >= -tol && r + s <= 1.0 + tol
    }
}

/// Inverts a 2×2 matrix
///
/// Returns None if the determinant is (nearly) zero relative to |a₀₀ a₁₁| + |a₀₁ a₁₀|
pub(crate) fn inverse_checked(a: &Matrix) -> Option<Matrix> {
    let mut ai = Matrix::new(2, 2);
    let det = mat_inverse(&mut ai, a).ok()?;
    let scale = f64::abs(a.get(0, 0) * a.get(1, 1)) + f64::abs(a.get(0, 1) * a.get(1, 0));
    if !det.is_finite() || f64::abs(det) <= 1e-14 * scale {
        return None;
    }
    Some(ai)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
