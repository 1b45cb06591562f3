use super::ContactIssue;
use serde::{Deserialize, Serialize};

/// Defines the activity (state) of a contact pair
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum Activity {
    /// The pair is not in contact (no contribution)
    Inactive,

    /// The pair is in contact and does not slide (or the contact is frictionless)
    Stick,

    /// The pair is in contact and slides (Coulomb limit reached)
    Slip,
}

impl Activity {
    /// Returns true if the pair contributes to the residual and Jacobian
    #[inline]
    pub fn is_active(&self) -> bool {
        *self != Activity::Inactive
    }
}

/// Holds the material point on the master surface where a sticking slave point is attached
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct Anchor {
    /// Index of the master element
    pub master: usize,

    /// Natural coordinate r on the master element
    pub r: f64,

    /// Natural coordinate s on the master element
    pub s: f64,

    /// Master normal when the anchor was committed (defines the tangent plane)
    pub normal: [f64; 3],
}

/// Holds the data of a sliding contact pair (one per slave integration point)
///
/// The multiplier and the friction anchor persist across searches and time steps.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ContactPair {
    /// Index of the slave element
    pub slave_element: usize,

    /// Index of the integration point in the slave element
    pub ip: usize,

    /// Index of the master element (None if no projection has been found yet)
    pub master: Option<usize>,

    /// Natural coordinate r of the projection (also used as the warm start)
    pub r: f64,

    /// Natural coordinate s of the projection (also used as the warm start)
    pub s: f64,

    /// Signed gap (positive means separated)
    pub gap: f64,

    /// Master unit normal at the projection
    pub normal: [f64; 3],

    /// Current position of the slave point
    pub x: [f64; 3],

    /// Indicates that a valid projection within the search radius has been found
    pub in_range: bool,

    /// Activity of the pair
    pub activity: Activity,

    /// Lagrange multiplier (normal pressure of the augmented Lagrangian method)
    pub lambda: f64,

    /// Normal pressure t_n of the last evaluation
    pub pressure: f64,

    /// Unit slip direction of the last evaluation (zero if sticking)
    pub slip_direction: [f64; 3],

    /// Friction anchor
    ///
    /// Created at the first activation and kept across iterations; replaced by `next_anchor`
    /// at the commit (None if the pair has not been in contact since the last commit)
    pub anchor: Option<Anchor>,

    /// Friction anchor to be adopted when the time step is accepted
    pub next_anchor: Option<Anchor>,

    /// Indicates that the pair has been active during the current augmentation cycle
    pub active_in_cycle: bool,

    /// Indicates that the stiffness of this pair must be skipped in this pass
    pub skip_stiffness: bool,

    /// Holds the issue found by the last search, if any
    pub issue: Option<ContactIssue>,
}

impl ContactPair {
    /// Allocates a new instance
    pub fn new(slave_element: usize, ip: usize) -> Self {
        ContactPair {
            slave_element,
            ip,
            master: None,
            r: 0.0,
            s: 0.0,
            gap: 0.0,
            normal: [0.0; 3],
            x: [0.0; 3],
            in_range: false,
            activity: Activity::Inactive,
            lambda: 0.0,
            pressure: 0.0,
            slip_direction: [0.0; 3],
            anchor: None,
            next_anchor: None,
            active_in_cycle: false,
            skip_stiffness: false,
            issue: None,
        }
    }

    /// Returns the penetration (positive when penetrating)
    #[inline]
    pub fn penetration(&self) -> f64 {
        -self.gap
    }

    /// Sets the pair inactive and clears the contact data of the last evaluation
    pub fn deactivate(&mut self) {
        self.activity = Activity::Inactive;
        self.pressure = 0.0;
        self.slip_direction = [0.0; 3];
        self.next_anchor = None;
    }

    /// Adopts the friction anchor computed by the last evaluation
    pub fn commit(&mut self) {
        self.anchor = self.next_anchor;
    }
}

/// Holds the data of a tied pair (one per slave node)
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TiedPair {
    /// Index of the slave node (in the slave surface)
    pub slave_node: usize,

    /// Index of the master element (None if the node is not tied)
    pub master: Option<usize>,

    /// Natural coordinate r of the initial projection
    pub r: f64,

    /// Natural coordinate s of the initial projection
    pub s: f64,

    /// Gap vector x - y(r,s)
    pub gap: [f64; 3],

    /// Lagrange multipliers (traction vector)
    pub lambda: [f64; 3],
}

impl TiedPair {
    /// Allocates a new instance
    pub fn new(slave_node: usize) -> Self {
        TiedPair {
            slave_node,
            master: None,
            r: 0.0,
            s: 0.0,
            gap: [0.0; 3],
            lambda: [0.0; 3],
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
