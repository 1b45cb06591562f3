use gemlab::mesh::Mesh;
use pmcontact::base::{Config, DisplacedMesh, Dof, Equations, SampleMeshes};
use pmcontact::contact::{ContactInterfaces, TimeInfo};
use pmcontact::StrError;
use russell_lab::{approx_eq, Vector};

// Frictional sliding with a restart from a checkpoint file
//
// The top cube (penetration 0.01, ε = 1000, t_n = 10) is dragged along x by 0.001 per
// time step. With μ = 0.5 the pairs stick (ε |w_T| < μ t_n = 5) and the tangential
// nodal force grows with the accumulated tangential displacement. The friction anchors
// are part of the checkpoint; thus, a restarted run gives the same forces.

const PENALTY: f64 = 1000.0;
const MU: f64 = 0.5;
const STEP: f64 = 0.001;

/// Runs one evaluation with the top cube shifted by `shift` along x
fn evaluate(
    contacts: &mut ContactInterfaces,
    eqs: &Equations,
    mesh: &Mesh,
    shift: f64,
    timestep: usize,
) -> Result<Vector, StrError> {
    let mut uu = Vector::new(eqs.n_equation);
    for p in 8..16 {
        uu[eqs.eq(p, Dof::Ux)?] = shift;
    }
    let kin = DisplacedMesh::new(mesh, eqs, &uu);
    let time = TimeInfo::new(timestep as f64, 1.0, timestep, 0);
    let prescribed = vec![false; eqs.n_equation];
    let mut rr = Vector::new(eqs.n_equation);
    contacts.evaluate(&kin, &time, &mut rr, None, &prescribed)?;
    Ok(rr)
}

#[test]
fn test_checkpoint_restart() -> Result<(), StrError> {
    let (mesh, master, slave) = SampleMeshes::two_cubes(0.01);
    let eqs = Equations::new(&mesh)?;
    let mut config = Config::new();
    config.set_penalty(PENALTY)?.set_friction(MU, None)?;
    let new_contacts = || -> Result<ContactInterfaces, StrError> {
        let mut contacts = ContactInterfaces::new();
        contacts.add_sliding(&mesh, &eqs, &[&slave], &[&master], &config)?;
        Ok(contacts)
    };

    // first run: steps 0 and 1, then write the checkpoint
    let mut contacts = new_contacts()?;
    evaluate(&mut contacts, &eqs, &mesh, 0.0, 0)?;
    let rr = evaluate(&mut contacts, &eqs, &mesh, STEP, 1)?;
    for p in 8..12 {
        approx_eq(rr[eqs.eq(p, Dof::Ux)?], 0.25 * PENALTY * STEP, 1e-10);
    }
    let path = "/tmp/pmcontact/test_checkpoint_restart.json";
    contacts.write_json(path)?;

    // continue the first run
    let rr_first = evaluate(&mut contacts, &eqs, &mesh, 2.0 * STEP, 2)?;
    assert_eq!(contacts.stats().n_stick, 4);
    for p in 8..12 {
        approx_eq(rr_first[eqs.eq(p, Dof::Ux)?], 0.25 * PENALTY * 2.0 * STEP, 1e-10);
    }

    // restart
    let mut restarted = new_contacts()?;
    restarted.read_json(path)?;
    let rr_restarted = evaluate(&mut restarted, &eqs, &mesh, 2.0 * STEP, 2)?;
    assert_eq!(rr_restarted.as_data(), rr_first.as_data());

    // without the checkpoint, the history is lost (the anchors are created at the current position)
    let mut fresh = new_contacts()?;
    let rr_fresh = evaluate(&mut fresh, &eqs, &mesh, 2.0 * STEP, 2)?;
    for p in 8..12 {
        approx_eq(rr_fresh[eqs.eq(p, Dof::Ux)?], 0.0, 1e-12);
        approx_eq(rr_fresh[eqs.eq(p, Dof::Uz)?], rr_first[eqs.eq(p, Dof::Uz)?], 1e-12);
    }
    Ok(())
}

#[test]
fn test_checkpoint_mismatch() -> Result<(), StrError> {
    let (mesh, master, slave) = SampleMeshes::two_cubes(0.01);
    let eqs = Equations::new(&mesh)?;
    let mut config = Config::new();
    config.set_penalty(PENALTY)?;
    let mut contacts = ContactInterfaces::new();
    contacts.add_sliding(&mesh, &eqs, &[&slave], &[&master], &config)?;
    evaluate(&mut contacts, &eqs, &mesh, 0.0, 0)?;
    let mut buffer: Vec<u8> = Vec::new();
    contacts.write_state(&mut buffer)?;

    // two-pass interfaces have twice as many pairs
    config.set_two_pass(true)?;
    let mut other = ContactInterfaces::new();
    other.add_sliding(&mesh, &eqs, &[&slave], &[&master], &config)?;
    assert_eq!(
        other.read_state(buffer.as_slice()).err(),
        Some("checkpoint does not match the number of contact passes")
    );

    // a tied interface cannot read a sliding checkpoint
    let mut other = ContactInterfaces::new();
    other.add_tied(&mesh, &eqs, &[&slave], &[&master], &config)?;
    assert_eq!(
        other.read_state(buffer.as_slice()).err(),
        Some("checkpoint does not match the kind of contact interface")
    );
    Ok(())
}
