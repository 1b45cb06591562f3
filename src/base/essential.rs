use super::Dof;
use gemlab::mesh::{Feature, PointId};
use std::collections::HashSet;
use std::fmt;

/// Holds the prescribed (fixed) displacement DOFs
///
/// The equations of prescribed DOFs are not assembled by the contact kernel.
pub struct Essential {
    pub all: HashSet<(PointId, Dof)>,
}

impl Essential {
    /// Allocates a new instance
    pub fn new() -> Self {
        Essential { all: HashSet::new() }
    }

    /// Fixes DOFs at points
    pub fn at(&mut self, points: &[PointId], dofs: &[Dof]) -> &mut Self {
        for point_id in points {
            for dof in dofs {
                self.all.insert((*point_id, *dof));
            }
        }
        self
    }

    /// Fixes DOFs on edges or faces
    pub fn on(&mut self, features: &[&Feature], dofs: &[Dof]) -> &mut Self {
        for feature in features {
            self.at(&feature.points, dofs);
        }
        self
    }
}

impl fmt::Display for Essential {
    /// Prints a formatted summary of the prescribed DOFs
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Prescribed DOFs\n").unwrap();
        write!(f, "===============\n").unwrap();
        let mut keys: Vec<_> = self.all.iter().collect();
        keys.sort();
        for key in keys {
            write!(f, "{:?} : {:?}\n", key.0, key.1).unwrap();
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
