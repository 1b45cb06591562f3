use gemlab::mesh::{Cell, Feature, Mesh, Point};
use gemlab::shapes::GeoKind;

/// Holds sample meshes with contact surfaces
pub struct SampleMeshes {}

impl SampleMeshes {
    /// Returns two stacked unit cubes and the contact faces between them
    ///
    /// The top cube penetrates the bottom cube by `overlap` (use a negative value for a gap).
    ///
    /// ```text
    ///      15-------------14
    ///      /.            /|       z
    ///    12-------------13|       ↑
    ///     | 11 . . . . .|10       o → y
    ///     |  7----------|-6      ↙
    ///     | /8 . . . . .|/9     x
    ///     4-------------5 |
    ///     | .           | |     master: [4,5,6,7]   (normal = +z)
    ///     | 3 . . . . . |.2     slave:  [8,11,10,9] (normal = -z)
    ///     |.            |/
    ///     0-------------1
    /// ```
    ///
    /// Returns `(mesh, master, slave)`
    #[rustfmt::skip]
    pub fn two_cubes(overlap: f64) -> (Mesh, Feature, Feature) {
        let (zb, zt) = (-overlap, 1.0 - overlap);
        let mesh = Mesh {
            ndim: 3,
            points: vec![
                Point { id:  0, marker: 0, coords: vec![0.0, 0.0, -1.0] },
                Point { id:  1, marker: 0, coords: vec![1.0, 0.0, -1.0] },
                Point { id:  2, marker: 0, coords: vec![1.0, 1.0, -1.0] },
                Point { id:  3, marker: 0, coords: vec![0.0, 1.0, -1.0] },
                Point { id:  4, marker: 0, coords: vec![0.0, 0.0,  0.0] },
                Point { id:  5, marker: 0, coords: vec![1.0, 0.0,  0.0] },
                Point { id:  6, marker: 0, coords: vec![1.0, 1.0,  0.0] },
                Point { id:  7, marker: 0, coords: vec![0.0, 1.0,  0.0] },
                Point { id:  8, marker: 0, coords: vec![0.0, 0.0,   zb] },
                Point { id:  9, marker: 0, coords: vec![1.0, 0.0,   zb] },
                Point { id: 10, marker: 0, coords: vec![1.0, 1.0,   zb] },
                Point { id: 11, marker: 0, coords: vec![0.0, 1.0,   zb] },
                Point { id: 12, marker: 0, coords: vec![0.0, 0.0,   zt] },
                Point { id: 13, marker: 0, coords: vec![1.0, 0.0,   zt] },
                Point { id: 14, marker: 0, coords: vec![1.0, 1.0,   zt] },
                Point { id: 15, marker: 0, coords: vec![0.0, 1.0,   zt] },
            ],
            cells: vec![
                Cell { id: 0, attribute: 1, kind: GeoKind::Hex8, points: vec![0, 1, 2, 3, 4, 5, 6, 7] },
                Cell { id: 1, attribute: 2, kind: GeoKind::Hex8, points: vec![8, 9, 10, 11, 12, 13, 14, 15] },
            ],
        };
        let master = Feature { kind: GeoKind::Qua4, points: vec![4, 5, 6, 7] };
        let slave = Feature { kind: GeoKind::Qua4, points: vec![8, 11, 10, 9] };
        (mesh, master, slave)
    }

    /// Returns a unit cube resting on a 2×2 slab
    ///
    /// The slab occupies [0,2]×[0,2]×[-1,0] and is discretized by four Hex8; its top
    /// face is made of four Qua4 (the master faces). The cube occupies
    /// [0.25,1.25]×[0.25,1.25]×[-overlap,1-overlap]; its bottom face is the slave face.
    /// Thus, the slave integration points project onto different master faces.
    ///
    /// ```text
    ///  top view of the master faces and the slave face (dashed)
    ///
    ///  2.0  15-------16-------17
    ///        |       |        |
    ///        |  [2]  |  [3]   |
    ///  1.25  |  21- -|- - 20  |
    ///  1.0  12-------13-------14
    ///        |  '    |    '   |
    ///        |  18- -|- - 19  |
    ///        |  [0]  |  [1]   |
    ///  0.0   9-------10-------11
    ///       0.0     1.0      2.0
    /// ```
    ///
    /// Returns `(mesh, master_faces, slave_faces)`
    pub fn cube_on_slab(overlap: f64) -> (Mesh, Vec<Feature>, Vec<Feature>) {
        let mut points = Vec::new();
        for z in [-1.0, 0.0] {
            for j in 0..3 {
                for i in 0..3 {
                    let id = points.len();
                    points.push(Point {
                        id,
                        marker: 0,
                        coords: vec![i as f64, j as f64, z],
                    });
                }
            }
        }
        let (zb, zt) = (-overlap, 1.0 - overlap);
        for z in [zb, zt] {
            for (x, y) in [(0.25, 0.25), (1.25, 0.25), (1.25, 1.25), (0.25, 1.25)] {
                let id = points.len();
                points.push(Point {
                    id,
                    marker: 0,
                    coords: vec![x, y, z],
                });
            }
        }
        let p = |i: usize, j: usize| i + 3 * j;
        let mut cells = Vec::new();
        let mut master = Vec::new();
        for cj in 0..2 {
            for ci in 0..2 {
                let bottom = [p(ci, cj), p(ci + 1, cj), p(ci + 1, cj + 1), p(ci, cj + 1)];
                let top = bottom.map(|q| q + 9);
                let mut cell_points = bottom.to_vec();
                cell_points.extend_from_slice(&top);
                cells.push(Cell {
                    id: cells.len(),
                    attribute: 1,
                    kind: GeoKind::Hex8,
                    points: cell_points,
                });
                master.push(Feature {
                    kind: GeoKind::Qua4,
                    points: top.to_vec(),
                });
            }
        }
        cells.push(Cell {
            id: cells.len(),
            attribute: 2,
            kind: GeoKind::Hex8,
            points: (18..26).collect(),
        });
        let slave = vec![Feature {
            kind: GeoKind::Qua4,
            points: vec![18, 21, 20, 19],
        }];
        (
            Mesh {
                ndim: 3,
                points,
                cells,
            },
            master,
            slave,
        )
    }

    /// Returns the faces of `two_cubes` split into triangles
    ///
    /// Returns `(master, slave)` with two Tri3 each
    #[rustfmt::skip]
    pub fn two_cubes_tri3_faces() -> (Vec<Feature>, Vec<Feature>) {
        let master = vec![
            Feature { kind: GeoKind::Tri3, points: vec![4, 5, 7] },
            Feature { kind: GeoKind::Tri3, points: vec![6, 7, 5] },
        ];
        let slave = vec![
            Feature { kind: GeoKind::Tri3, points: vec![8, 11, 9] },
            Feature { kind: GeoKind::Tri3, points: vec![10, 9, 11] },
        ];
        (master, slave)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
