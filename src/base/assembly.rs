use crate::StrError;
use russell_lab::{Matrix, Vector};
use russell_sparse::CooMatrix;

/// Assembles local vector into global vector
///
/// The assembly is additive; i.e., the global vector is not cleared. Thus, the order
/// of the calls does not change the result.
///
/// # Output
///
/// * `rr_global` -- is the global vector R with length = `n_equation`
///
/// # Input
///
/// * `r_local` -- is the local vector r with length = `n_equation_local`
/// * `local_to_global` -- is an array holding all equation numbers.
/// * `prescribed` -- tells whether a global equation number has prescribed
///   DOF or not. Its length is equal to the total number of DOFs `n_equation`.
///
/// # Panics
///
/// This function will panic if the indices are out-of-bounds
#[inline]
pub fn assemble_vector(rr_global: &mut Vector, r_local: &Vector, local_to_global: &[usize], prescribed: &[bool]) {
    let n_equation_local = r_local.dim();
    for l in 0..n_equation_local {
        let g = local_to_global[l];
        if !prescribed[g] {
            rr_global[g] += r_local[l];
        }
    }
}

/// Assembles local matrix into global matrix
///
/// # Output
///
/// * `kk_global` -- is the global square matrix K with dims = (`n_equation`,`n_equation`)
///
/// # Input
///
/// * `kk_local` -- is the local square matrix K with dims = (`n_equation_local`,`n_equation_local`)
/// * `local_to_global` -- is an array holding all equation numbers.
/// * `prescribed` -- tells whether a global equation number has prescribed
///   DOF or not. Its length is equal to the total number of DOFs `n_equation`.
///
/// # Panics
///
/// This function will panic if the indices are out-of-bounds
#[inline]
pub fn assemble_matrix(
    kk_global: &mut CooMatrix,
    kk_local: &Matrix,
    local_to_global: &[usize],
    prescribed: &[bool],
) -> Result<(), StrError> {
    let n_equation_local = kk_local.dims().0;
    for l in 0..n_equation_local {
        let g = local_to_global[l];
        if !prescribed[g] {
            for ll in 0..n_equation_local {
                let gg = local_to_global[ll];
                if !prescribed[gg] {
                    kk_global.put(g, gg, kk_local.get(l, ll))?;
                }
            }
        }
    }
    Ok(())
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
