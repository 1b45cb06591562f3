use pmcontact::base::{Config, DisplacedMesh, Dof, Equations, SampleMeshes};
use pmcontact::contact::{ContactInterfaces, TimeInfo};
use pmcontact::StrError;
use russell_lab::{approx_eq, Vector};
use russell_sparse::{CooMatrix, Sym};

// Two unit cubes overlapping by 0.01 with ε = 1000
//
// The contact pressure is uniform (t_n = ε × 0.01 = 10); thus the nodal forces are
// equal to the pressure times the nodal area shares.

const PENALTY: f64 = 1000.0;
const OVERLAP: f64 = 0.01;

#[test]
fn test_flat_on_flat_penalty_qua4() -> Result<(), StrError> {
    let (mesh, master, slave) = SampleMeshes::two_cubes(OVERLAP);
    let eqs = Equations::new(&mesh)?;
    let neq = eqs.n_equation;
    let uu = Vector::new(neq);
    let kin = DisplacedMesh::new(&mesh, &eqs, &uu);

    let mut config = Config::new();
    config.set_penalty(PENALTY)?;
    let mut contacts = ContactInterfaces::new();
    contacts.add_sliding(&mesh, &eqs, &[&slave], &[&master], &config)?;

    let prescribed = vec![false; neq];
    let mut rr = Vector::new(neq);
    let mut kk = CooMatrix::new(neq, neq, contacts.nnz_sup(), Sym::No)?;
    contacts.evaluate(&kin, &TimeInfo::new(0.0, 1.0, 0, 0), &mut rr, Some(&mut kk), &prescribed)?;
    let stats = contacts.stats();
    println!("{:?}", stats);
    assert_eq!(stats.n_pair, 4);
    assert_eq!(stats.n_active(), 4);

    // nodal forces
    let force = PENALTY * OVERLAP * 0.25;
    for p in 8..12 {
        approx_eq(rr[eqs.eq(p, Dof::Uz)?], -force, 1e-10);
        approx_eq(rr[eqs.eq(p, Dof::Ux)?], 0.0, 1e-12);
        approx_eq(rr[eqs.eq(p, Dof::Uy)?], 0.0, 1e-12);
    }
    for p in 4..8 {
        approx_eq(rr[eqs.eq(p, Dof::Uz)?], force, 1e-10);
    }
    for p in [0, 1, 2, 3, 12, 13, 14, 15] {
        assert_eq!(rr[eqs.eq(p, Dof::Uz)?], 0.0);
    }

    // the total stiffness along z is ε × area
    let dense = kk.as_dense();
    let mut sum = 0.0;
    for p in 8..12 {
        for q in 8..12 {
            sum += dense.get(eqs.eq(p, Dof::Uz)?, eqs.eq(q, Dof::Uz)?);
        }
    }
    approx_eq(sum, PENALTY, 1e-9);
    Ok(())
}

#[test]
fn test_flat_on_flat_penalty_tri3() -> Result<(), StrError> {
    let (mesh, _, _) = SampleMeshes::two_cubes(OVERLAP);
    let (master, slave) = SampleMeshes::two_cubes_tri3_faces();
    let eqs = Equations::new(&mesh)?;
    let neq = eqs.n_equation;
    let uu = Vector::new(neq);
    let kin = DisplacedMesh::new(&mesh, &eqs, &uu);

    let mut config = Config::new();
    config.set_penalty(PENALTY)?;
    let mut contacts = ContactInterfaces::new();
    contacts.add_sliding(
        &mesh,
        &eqs,
        &slave.iter().collect::<Vec<_>>(),
        &master.iter().collect::<Vec<_>>(),
        &config,
    )?;

    let prescribed = vec![false; neq];
    let mut rr = Vector::new(neq);
    contacts.evaluate(&kin, &TimeInfo::new(0.0, 1.0, 0, 0), &mut rr, None, &prescribed)?;
    assert_eq!(contacts.stats().n_active(), 6);

    // the nodal area shares of the split squares are 1/6 or 1/3
    let pressure = PENALTY * OVERLAP;
    let slave_shares = [(8, 1.0 / 6.0), (9, 1.0 / 3.0), (10, 1.0 / 6.0), (11, 1.0 / 3.0)];
    let master_shares = [(4, 1.0 / 6.0), (5, 1.0 / 3.0), (6, 1.0 / 6.0), (7, 1.0 / 3.0)];
    for (p, share) in slave_shares {
        approx_eq(rr[eqs.eq(p, Dof::Uz)?], -pressure * share, 1e-10);
    }
    for (p, share) in master_shares {
        approx_eq(rr[eqs.eq(p, Dof::Uz)?], pressure * share, 1e-10);
    }
    Ok(())
}

#[test]
fn test_flat_on_flat_penalty_separated() -> Result<(), StrError> {
    let (mesh, master, slave) = SampleMeshes::two_cubes(-OVERLAP);
    let eqs = Equations::new(&mesh)?;
    let neq = eqs.n_equation;
    let uu = Vector::new(neq);
    let kin = DisplacedMesh::new(&mesh, &eqs, &uu);

    let mut config = Config::new();
    config.set_penalty(PENALTY)?;
    let mut contacts = ContactInterfaces::new();
    contacts.add_sliding(&mesh, &eqs, &[&slave], &[&master], &config)?;

    let prescribed = vec![false; neq];
    let mut rr = Vector::new(neq);
    contacts.evaluate(&kin, &TimeInfo::new(0.0, 1.0, 0, 0), &mut rr, None, &prescribed)?;
    assert_eq!(contacts.stats().n_inactive, 4);
    assert!(rr.as_data().iter().all(|v| *v == 0.0));
    Ok(())
}
