use super::{Dof, Essential};
use crate::StrError;
use gemlab::mesh::{Mesh, PointId};
use std::collections::HashMap;
use std::fmt;

/// Holds the equation numbers (DOF numbers) of the displacement field
///
/// All points of the (3D) mesh have the Ux, Uy and Uz DOFs; thus:
///
/// ```text
/// point   DOFs            equations
///   0     Ux, Uy, Uz  →   0, 1, 2
///   1     Ux, Uy, Uz  →   3, 4, 5
///   …
/// ```
///
/// The contact kernel only reads the equation numbers (`eq`) and the prescribed flags;
/// the equations of prescribed DOFs are "not active" and skipped during assembly.
pub struct Equations {
    /// Holds all points DOFs and numbers
    ///
    /// (npoint)
    pub points: Vec<HashMap<Dof, usize>>,

    /// Holds the total number of global equations
    ///
    /// **Note:** This is equal to the total number of DOFs
    pub n_equation: usize,
}

impl Equations {
    /// Allocates a new instance
    pub fn new(mesh: &Mesh) -> Result<Self, StrError> {
        if mesh.ndim != 3 {
            return Err("contact mechanics requires a 3D mesh");
        }
        let npoint = mesh.points.len();
        let mut points = vec![HashMap::new(); npoint];
        let mut n_equation = 0; // equals the total number of DOFs
        for point_id in 0..npoint {
            for dof in Dof::displacements() {
                points[point_id].insert(dof, n_equation);
                n_equation += 1;
            }
        }
        Ok(Equations { points, n_equation })
    }

    /// Returns the (global) equation number of a (PointId,DOF) pair
    pub fn eq(&self, point_id: PointId, dof: Dof) -> Result<usize, StrError> {
        if point_id >= self.points.len() {
            return Err("point_id is out of bounds");
        }
        let eq = self.points[point_id]
            .get(&dof)
            .ok_or("cannot find equation corresponding to (PointId,DOF)")?;
        Ok(*eq)
    }

    /// Returns the array of prescribed flags (n_equation)
    pub fn prescribed(&self, essential: &Essential) -> Result<Vec<bool>, StrError> {
        let mut flags = vec![false; self.n_equation];
        for (point_id, dof) in &essential.all {
            let eq = self.eq(*point_id, *dof)?;
            flags[eq] = true;
        }
        Ok(flags)
    }
}

impl fmt::Display for Equations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Points: DOFs and global equation numbers\n").unwrap();
        write!(f, "========================================\n").unwrap();
        for point_id in 0..self.points.len() {
            let mut dof_eqn: Vec<_> = self.points[point_id].iter().collect();
            dof_eqn.sort_by(|a, b| a.0.cmp(b.0));
            write!(f, "{:?}: {:?}\n", point_id, dof_eqn).unwrap();
        }
        write!(f, "\nInformation\n").unwrap();
        write!(f, "===========\n").unwrap();
        write!(f, "number of equations = {}\n", self.n_equation).unwrap();
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
