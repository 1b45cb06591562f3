use super::SurfaceElement;
use crate::base::MeshKinematics;
use crate::StrError;
use gemlab::mesh::{Feature, Mesh, PointId};
use gemlab::shapes::Scratchpad;
use russell_lab::Vector;
use std::collections::{HashMap, HashSet};

/// Holds a contact surface made of Tri3 and/or Qua4 facets
///
/// The surface is built once (initialization) and its topology never changes.
/// The current geometry is obtained from the mesh kinematics whenever needed.
pub struct Surface {
    /// Holds all surface elements
    pub elements: Vec<SurfaceElement>,

    /// Maps surface node index to mesh point id
    pub points: Vec<PointId>,

    /// Maps mesh point id to surface node index
    pub node_map: HashMap<PointId, usize>,

    /// Holds the elements sharing each surface node (node → element adjacency)
    pub node_elements: Vec<Vec<usize>>,

    /// Holds the reference area share of each surface node
    pub nodal_areas: Vec<f64>,

    /// Holds the reference integration weights (weight × area Jacobian) of each element
    pub ip_weights: Vec<Vec<f64>>,
}

impl Surface {
    /// Allocates a new instance
    ///
    /// # Input
    ///
    /// * `mesh` -- the reference mesh (3D)
    /// * `faces` -- the Tri3 or Qua4 faces; the nodes must be ordered counterclockwise
    ///   when seen from outside the body (outward normal)
    pub fn new(mesh: &Mesh, faces: &[&Feature]) -> Result<Self, StrError> {
        if mesh.ndim != 3 {
            return Err("contact mechanics requires a 3D mesh");
        }
        if faces.len() == 0 {
            return Err("contact surface must have at least one face");
        }
        let npoint = mesh.points.len();
        let mut points = Vec::new();
        let mut node_map = HashMap::new();
        let mut elements = Vec::with_capacity(faces.len());
        let mut node_elements: Vec<Vec<usize>> = Vec::new();
        for face in faces {
            let mut unique = HashSet::new();
            let mut nodes = Vec::with_capacity(face.points.len());
            for p in &face.points {
                if *p >= npoint {
                    return Err("contact surface face has a point id out of range");
                }
                if !unique.insert(*p) {
                    return Err("contact surface face has repeated points");
                }
                let node = match node_map.get(p) {
                    Some(n) => *n,
                    None => {
                        let n = points.len();
                        points.push(*p);
                        node_map.insert(*p, n);
                        node_elements.push(Vec::new());
                        n
                    }
                };
                node_elements[node].push(elements.len());
                nodes.push(node);
            }
            elements.push(SurfaceElement::new(face.kind, &face.points, &nodes)?);
        }

        // reference areas
        let mut nodal_areas = vec![0.0; points.len()];
        let mut ip_weights = Vec::with_capacity(elements.len());
        let mut un = Vector::new(3);
        for element in &elements {
            let mut pad = element.pad.clone();
            mesh.set_pad(&mut pad, &element.points);
            let mut weights = Vec::with_capacity(element.ips.len());
            for (p, ip) in element.ips.iter().enumerate() {
                let jac = pad.calc_normal_vector(&mut un, &[ip[0], ip[1]])?;
                if jac <= 0.0 {
                    return Err("contact surface face has zero area");
                }
                let w = ip[3] * jac;
                for m in 0..element.nnode() {
                    nodal_areas[element.nodes[m]] += element.ip_interp[p][m] * w;
                }
                weights.push(w);
            }
            ip_weights.push(weights);
        }
        Ok(Surface {
            elements,
            points,
            node_map,
            node_elements,
            nodal_areas,
            ip_weights,
        })
    }

    /// Returns the number of surface nodes
    #[inline]
    pub fn nnode(&self) -> usize {
        self.points.len()
    }

    /// Returns a scratchpad with the current coordinates of the nodes of an element
    pub fn current_pad(&self, e: usize, kin: &dyn MeshKinematics) -> Scratchpad {
        self.alloc_pad(e, kin, true)
    }

    fn alloc_pad(&self, e: usize, kin: &dyn MeshKinematics, current: bool) -> Scratchpad {
        let element = &self.elements[e];
        let mut pad = element.pad.clone();
        let mut x = Vector::new(3);
        for (m, p) in element.points.iter().enumerate() {
            if current {
                kin.current_position(&mut x, *p);
            } else {
                kin.reference_position(&mut x, *p);
            }
            for j in 0..3 {
                pad.set_xx(m, j, x[j]);
            }
        }
        pad
    }

    /// Calculates the current position of an integration point
    pub fn ip_position(&self, e: usize, ip: usize, kin: &dyn MeshKinematics) -> [f64; 3] {
        let element = &self.elements[e];
        let interp = &element.ip_interp[ip];
        let mut res = [0.0; 3];
        let mut x = Vector::new(3);
        for (m, p) in element.points.iter().enumerate() {
            kin.current_position(&mut x, *p);
            for i in 0..3 {
                res[i] += interp[m] * x[i];
            }
        }
        res
    }

    /// Calculates the current unit normal at an integration point
    pub fn ip_normal(&self, e: usize, ip: usize, kin: &dyn MeshKinematics) -> Result<[f64; 3], StrError> {
        let mut pad = self.current_pad(e, kin);
        let ksi = &self.elements[e].ips[ip];
        let mut un = Vector::new(3);
        pad.calc_normal_vector(&mut un, &[ksi[0], ksi[1]])?;
        Ok([un[0], un[1], un[2]])
    }

    /// Calculates the area of an element (current or reference configuration)
    pub fn element_area(&self, e: usize, kin: &dyn MeshKinematics, current: bool) -> Result<f64, StrError> {
        let mut pad = self.alloc_pad(e, kin, current);
        let mut un = Vector::new(3);
        let mut area = 0.0;
        for ip in self.elements[e].ips {
            area += ip[3] * pad.calc_normal_vector(&mut un, &[ip[0], ip[1]])?;
        }
        Ok(area)
    }

    /// Returns the surface node closest to a point in the current configuration
    pub fn closest_node(&self, x: &[f64; 3], kin: &dyn MeshKinematics) -> usize {
        let mut y = Vector::new(3);
        let mut closest = 0;
        let mut dist_min = f64::MAX;
        for (node, p) in self.points.iter().enumerate() {
            kin.current_position(&mut y, *p);
            let d2 = (x[0] - y[0]) * (x[0] - y[0]) + (x[1] - y[1]) * (x[1] - y[1]) + (x[2] - y[2]) * (x[2] - y[2]);
            if d2 < dist_min {
                dist_min = d2;
                closest = node;
            }
        }
        closest
    }

    /// Returns the elements adjacent to a given element (sharing at least one node), including itself
    pub fn neighbours(&self, e: usize) -> Vec<usize> {
        let mut res: Vec<usize> = Vec::new();
        for node in &self.elements[e].nodes {
            for f in &self.node_elements[*node] {
                if !res.contains(f) {
                    res.push(*f);
                }
            }
        }
        res
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
