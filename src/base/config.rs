use super::{Formulation, MultiplierReset};
use crate::StrError;
use std::fmt;

/// Defines the smallest allowed tolerance (Config)
pub const CONFIG_MIN_TOL: f64 = 1e-15;

/// Defines the smallest number of projection iterations (Config)
pub const CONFIG_MIN_PROJECTION_IT: usize = 1;

/// Holds the parameters of a contact interface
///
/// All parameters are named scalars supplied at construction. Use the setters to
/// modify the default values; the setters check the values and return an error if
/// they are inconsistent.
#[derive(Clone, Debug)]
pub struct Config {
    /// Constraint enforcement method
    pub formulation: Formulation,

    /// Penalty factor ε (normal direction)
    pub penalty: f64,

    /// Coulomb friction coefficient μ (zero means frictionless)
    pub friction_coefficient: f64,

    /// Penalty factor for the tangential (stick) direction (None means equal to ε)
    pub friction_penalty: Option<f64>,

    /// Tolerance on the relative change of the norm of the multipliers
    pub tol_aug: f64,

    /// Tolerance on the maximum penetration (zero means that the gap is not checked)
    pub tol_gap: f64,

    /// Minimum number of augmentations
    pub n_aug_min: usize,

    /// Maximum number of augmentations
    pub n_aug_max: usize,

    /// Tolerance for the parametric domain check (inside element)
    pub tol_search: f64,

    /// Maximum gap (separation) of a candidate contact pair
    pub search_radius: f64,

    /// Tolerance on the Newton step of the closest-point projection
    pub tol_projection: f64,

    /// Maximum number of iterations of the closest-point projection
    pub n_max_projection_it: usize,

    /// Each surface is used as slave and master in turn (sliding interface only)
    pub two_pass: bool,

    /// Policy for resetting the Lagrange multipliers
    pub multiplier_reset: MultiplierReset,

    /// Verbose mode during augmentations
    pub verbose_augmentations: bool,

    /// Shows warnings such as unresolved projections and augmentation limits
    pub verbose_warnings: bool,
}

impl Config {
    /// Allocates a new instance with default values
    pub fn new() -> Self {
        Config {
            formulation: Formulation::Penalty,
            penalty: 1.0,
            friction_coefficient: 0.0,
            friction_penalty: None,
            tol_aug: 0.01,
            tol_gap: 0.0,
            n_aug_min: 0,
            n_aug_max: 10,
            tol_search: 0.01,
            search_radius: 1.0,
            tol_projection: 1e-5,
            n_max_projection_it: 5,
            two_pass: false,
            multiplier_reset: MultiplierReset::InactiveCycle,
            verbose_augmentations: false,
            verbose_warnings: false,
        }
    }

    /// Sets the constraint enforcement method
    pub fn set_formulation(&mut self, formulation: Formulation) -> Result<&mut Self, StrError> {
        self.formulation = formulation;
        Ok(self)
    }

    /// Sets the penalty factor ε
    pub fn set_penalty(&mut self, value: f64) -> Result<&mut Self, StrError> {
        if value <= 0.0 {
            return Err("penalty must be > 0.0");
        }
        self.penalty = value;
        Ok(self)
    }

    /// Sets the Coulomb friction coefficient μ and (optionally) the tangential penalty
    pub fn set_friction(&mut self, mu: f64, penalty: Option<f64>) -> Result<&mut Self, StrError> {
        if mu < 0.0 {
            return Err("friction coefficient must be ≥ 0.0");
        }
        if let Some(value) = penalty {
            if value <= 0.0 {
                return Err("friction penalty must be > 0.0");
            }
        }
        self.friction_coefficient = mu;
        self.friction_penalty = penalty;
        Ok(self)
    }

    /// Sets the augmentation tolerances (multiplier change and gap)
    pub fn set_tol_aug(&mut self, tol_aug: f64, tol_gap: f64) -> Result<&mut Self, StrError> {
        if tol_aug < CONFIG_MIN_TOL {
            return Err("tol_aug must be ≥ 1e-15");
        }
        if tol_gap < 0.0 {
            return Err("tol_gap must be ≥ 0.0");
        }
        self.tol_aug = tol_aug;
        self.tol_gap = tol_gap;
        Ok(self)
    }

    /// Sets the minimum and maximum number of augmentations
    pub fn set_n_aug(&mut self, n_min: usize, n_max: usize) -> Result<&mut Self, StrError> {
        if n_min > n_max {
            return Err("n_aug_min must be ≤ n_aug_max");
        }
        self.n_aug_min = n_min;
        self.n_aug_max = n_max;
        Ok(self)
    }

    /// Sets the search tolerance (parametric domain) and the search radius
    pub fn set_search(&mut self, tol_search: f64, search_radius: f64) -> Result<&mut Self, StrError> {
        if tol_search < 0.0 {
            return Err("tol_search must be ≥ 0.0");
        }
        if search_radius <= 0.0 {
            return Err("search_radius must be > 0.0");
        }
        self.tol_search = tol_search;
        self.search_radius = search_radius;
        Ok(self)
    }

    /// Sets the closest-point projection tolerance and maximum number of iterations
    pub fn set_projection(&mut self, tol: f64, n_max_it: usize) -> Result<&mut Self, StrError> {
        if tol < CONFIG_MIN_TOL {
            return Err("tol_projection must be ≥ 1e-15");
        }
        if n_max_it < CONFIG_MIN_PROJECTION_IT {
            return Err("n_max_projection_it must be ≥ 1");
        }
        self.tol_projection = tol;
        self.n_max_projection_it = n_max_it;
        Ok(self)
    }

    /// Sets the two-pass option
    pub fn set_two_pass(&mut self, flag: bool) -> Result<&mut Self, StrError> {
        self.two_pass = flag;
        Ok(self)
    }

    /// Sets the multiplier reset policy
    pub fn set_multiplier_reset(&mut self, policy: MultiplierReset) -> Result<&mut Self, StrError> {
        self.multiplier_reset = policy;
        Ok(self)
    }

    /// Sets the verbose flags
    pub fn set_verbose(&mut self, augmentations: bool, warnings: bool) -> Result<&mut Self, StrError> {
        self.verbose_augmentations = augmentations;
        self.verbose_warnings = warnings;
        Ok(self)
    }

    /// Validates all data
    ///
    /// Returns a message with the inconsistent data, or returns None if everything is all right.
    pub fn validate(&self) -> Option<String> {
        if self.penalty <= 0.0 {
            return Some(format!("penalty = {:?} is incorrect; it must be > 0.0", self.penalty));
        }
        if self.friction_coefficient < 0.0 {
            return Some(format!(
                "friction_coefficient = {:?} is incorrect; it must be ≥ 0.0",
                self.friction_coefficient
            ));
        }
        if let Some(value) = self.friction_penalty {
            if value <= 0.0 {
                return Some(format!("friction_penalty = {:?} is incorrect; it must be > 0.0", value));
            }
        }
        if self.tol_aug < CONFIG_MIN_TOL {
            return Some(format!(
                "tol_aug = {:?} is incorrect; it must be ≥ {:e}",
                self.tol_aug, CONFIG_MIN_TOL
            ));
        }
        if self.tol_gap < 0.0 {
            return Some(format!("tol_gap = {:?} is incorrect; it must be ≥ 0.0", self.tol_gap));
        }
        if self.n_aug_min > self.n_aug_max {
            return Some(format!(
                "n_aug_min = {} is incorrect; it must be ≤ n_aug_max = {}",
                self.n_aug_min, self.n_aug_max
            ));
        }
        if self.tol_search < 0.0 {
            return Some(format!("tol_search = {:?} is incorrect; it must be ≥ 0.0", self.tol_search));
        }
        if self.search_radius <= 0.0 {
            return Some(format!(
                "search_radius = {:?} is incorrect; it must be > 0.0",
                self.search_radius
            ));
        }
        if self.tol_projection < CONFIG_MIN_TOL {
            return Some(format!(
                "tol_projection = {:?} is incorrect; it must be ≥ {:e}",
                self.tol_projection, CONFIG_MIN_TOL
            ));
        }
        if self.n_max_projection_it < CONFIG_MIN_PROJECTION_IT {
            return Some(format!(
                "n_max_projection_it = {} is incorrect; it must be ≥ {}",
                self.n_max_projection_it, CONFIG_MIN_PROJECTION_IT
            ));
        }
        None // all good
    }

    /// Returns the penalty factor for the tangential direction
    #[inline]
    pub fn tangential_penalty(&self) -> f64 {
        match self.friction_penalty {
            Some(value) => value,
            None => self.penalty,
        }
    }

    /// Returns whether friction is active or not
    #[inline]
    pub fn with_friction(&self) -> bool {
        self.friction_coefficient > 0.0
    }

    /// Returns whether the augmented Lagrangian method is enabled
    #[inline]
    pub fn aug_lagrangian(&self) -> bool {
        self.formulation == Formulation::AugLagrangian
    }

    /// Prints the header of the table with augmentation data
    #[inline]
    pub fn print_aug_header(&self) {
        if self.verbose_augmentations {
            println!("Legend:");
            println!("✅ : converged");
            println!("👍 : converging");
            println!("🥵 : reached the maximum number of augmentations");
            println!("😱 : found NaN or Inf\n");
            println!(
                "{:>8} {:>5} {:>8}   {:>8}   {:>8}  ",
                "contact", "aug", "Δ|λ|/|λ|", "max(p)", "active"
            );
        }
    }

    /// Prints augmentation data
    pub fn print_augmentation(&self, interface: usize, naug: usize, lambda_change: f64, max_pen: f64, n_active: usize) {
        if !self.verbose_augmentations {
            return;
        }
        let l = if !lambda_change.is_finite() || !max_pen.is_finite() {
            "😱"
        } else if lambda_change <= self.tol_aug && (self.tol_gap <= 0.0 || max_pen <= self.tol_gap) {
            "✅"
        } else if naug + 1 >= self.n_aug_max {
            "🥵"
        } else {
            "👍"
        };
        println!(
            "{:>8} {:>5} {:>8.2e}{} {:>8.2e}   {:>8}  ",
            interface, naug, lambda_change, l, max_pen, n_active
        );
    }

    /// Prints a warning message
    #[inline]
    pub fn print_warning(&self, message: &str) {
        if self.verbose_warnings {
            println!("WARNING: {}", message);
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Contact parameters\n").unwrap();
        write!(f, "==================\n").unwrap();
        write!(f, "formulation = {:?}\n", self.formulation).unwrap();
        write!(f, "penalty = {:?}\n", self.penalty).unwrap();
        write!(f, "friction_coefficient = {:?}\n", self.friction_coefficient).unwrap();
        write!(f, "friction_penalty = {:?}\n", self.friction_penalty).unwrap();
        write!(f, "tol_aug = {:?}\n", self.tol_aug).unwrap();
        write!(f, "tol_gap = {:?}\n", self.tol_gap).unwrap();
        write!(f, "n_aug_min = {:?}\n", self.n_aug_min).unwrap();
        write!(f, "n_aug_max = {:?}\n", self.n_aug_max).unwrap();
        write!(f, "tol_search = {:?}\n", self.tol_search).unwrap();
        write!(f, "search_radius = {:?}\n", self.search_radius).unwrap();
        write!(f, "tol_projection = {:?}\n", self.tol_projection).unwrap();
        write!(f, "n_max_projection_it = {:?}\n", self.n_max_projection_it).unwrap();
        write!(f, "two_pass = {:?}\n", self.two_pass).unwrap();
        write!(f, "multiplier_reset = {:?}\n", self.multiplier_reset).unwrap();
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
