use super::{Dof, Equations};
use gemlab::mesh::{Mesh, PointId};
use russell_lab::Vector;

/// Gives access to the reference and current positions of the mesh points
///
/// This is the (only) view of the deformation that the contact kernel needs.
/// The implementation must be shareable among threads because the contact
/// pairs are evaluated in parallel.
pub trait MeshKinematics: Sync {
    /// Returns the number of points
    fn npoint(&self) -> usize;

    /// Returns the reference (undeformed) position X of a point
    ///
    /// **Note:** `x.dim()` must be equal to 3
    fn reference_position(&self, x: &mut Vector, point_id: PointId);

    /// Returns the current (deformed) position x = X + u of a point
    ///
    /// **Note:** `x.dim()` must be equal to 3
    fn current_position(&self, x: &mut Vector, point_id: PointId);
}

/// Implements the mesh kinematics from the global vector of displacements
pub struct DisplacedMesh<'a> {
    /// Holds the reference mesh
    pub mesh: &'a Mesh,

    /// Holds the equation numbers
    pub equations: &'a Equations,

    /// Holds the global vector of displacements (n_equation)
    pub uu: &'a Vector,
}

impl<'a> DisplacedMesh<'a> {
    /// Allocates a new instance
    pub fn new(mesh: &'a Mesh, equations: &'a Equations, uu: &'a Vector) -> Self {
        DisplacedMesh { mesh, equations, uu }
    }
}

impl<'a> MeshKinematics for DisplacedMesh<'a> {
    fn npoint(&self) -> usize {
        self.mesh.points.len()
    }

    fn reference_position(&self, x: &mut Vector, point_id: PointId) {
        for i in 0..3 {
            x[i] = self.mesh.points[point_id].coords[i];
        }
    }

    fn current_position(&self, x: &mut Vector, point_id: PointId) {
        for dof in Dof::displacements() {
            let i = dof as usize;
            let eq = self.equations.points[point_id][&dof];
            x[i] = self.mesh.points[point_id].coords[i] + self.uu[eq];
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{DisplacedMesh, MeshKinematics};
    use crate::base::{Dof, Equations, SampleMeshes};
    use russell_lab::Vector;

    #[test]
    fn displaced_mesh_works() {
        let (mesh, _, _) = SampleMeshes::two_cubes(0.25);
        let eqs = Equations::new(&mesh).unwrap();
        let mut uu = Vector::new(eqs.n_equation);
        uu[eqs.eq(9, Dof::Ux).unwrap()] = 0.5;
        uu[eqs.eq(9, Dof::Uz).unwrap()] = -1.0;
        let kin = DisplacedMesh::new(&mesh, &eqs, &uu);
        assert_eq!(kin.npoint(), 16);
        let mut x = Vector::new(3);
        kin.reference_position(&mut x, 9);
        assert_eq!(x.as_data(), &[1.0, 0.0, -0.25]);
        kin.current_position(&mut x, 9);
        assert_eq!(x.as_data(), &[1.5, 0.0, -1.25]);
        kin.current_position(&mut x, 3);
        assert_eq!(x.as_data(), &[0.0, 1.0, -1.0]);
    }
}
