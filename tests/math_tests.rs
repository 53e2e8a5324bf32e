use contact_solver::math::{Matrix3, Vector3};
use approx::assert_relative_eq;

#[test]
fn test_vector3_operations() {
    let v1 = Vector3::new(1.0, 2.0, 3.0);
    let v2 = Vector3::new(4.0, 5.0, 6.0);

    assert_eq!(v1 + v2, Vector3::new(5.0, 7.0, 9.0));
    assert_eq!(v2 - v1, Vector3::new(3.0, 3.0, 3.0));
    assert_eq!(v1 * 2.0, Vector3::new(2.0, 4.0, 6.0));
    assert_eq!(2.0 * v1, v1 * 2.0);
    assert_eq!(-v1, Vector3::new(-1.0, -2.0, -3.0));

    assert_eq!(v1.dot(&v2), 1.0 * 4.0 + 2.0 * 5.0 + 3.0 * 6.0);

    let cross = v1.cross(&v2);
    assert_eq!(cross, Vector3::new(-3.0, 6.0, -3.0));
    assert_relative_eq!(cross.dot(&v1), 0.0);
    assert_relative_eq!(cross.dot(&v2), 0.0);

    let length = v1.length();
    assert_relative_eq!(length, 14.0f32.sqrt());

    let normalized = v1.normalize();
    assert_relative_eq!(normalized.length(), 1.0);
    assert_relative_eq!(normalized, v1 / length);

    let mut v = v1;
    v += v2;
    v -= v1;
    v *= 0.5;
    assert_relative_eq!(v, Vector3::new(2.0, 2.5, 3.0));
}

#[test]
fn test_normalize_leaves_tiny_vectors_alone() {
    let tiny = Vector3::new(1.0e-8, 0.0, 0.0);
    assert_eq!(tiny.normalize(), tiny);
    assert_eq!(Vector3::zero().normalize(), Vector3::zero());
}

#[test]
fn test_tangent_basis_for_every_axis_region() {
    let normals = [
        Vector3::unit_x(),
        Vector3::unit_y(),
        Vector3::unit_z(),
        -Vector3::unit_x(),
        Vector3::new(1.0, 1.0, 1.0).normalize(),
        Vector3::new(0.3, -0.9, 0.2).normalize(),
        Vector3::new(-0.6, 0.1, 0.79).normalize(),
    ];

    for n in normals {
        let (t1, t2) = n.orthonormal_basis();

        assert_relative_eq!(t1.length(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(t2.length(), 1.0, epsilon = 1e-5);
        assert_relative_eq!(n.dot(&t1), 0.0, epsilon = 1e-5);
        assert_relative_eq!(n.dot(&t2), 0.0, epsilon = 1e-5);
        assert_relative_eq!(t1.dot(&t2), 0.0, epsilon = 1e-5);
        // Right-handed: n x t1 = t2
        assert_relative_eq!(n.cross(&t1), t2, epsilon = 1e-5);
    }
}

#[test]
fn test_matrix3_operations() {
    let m = Matrix3::new([
        [1.0, 2.0, 3.0],
        [4.0, 5.0, 6.0],
        [7.0, 8.0, 9.0],
    ]);

    let v = Vector3::new(1.0, 2.0, 3.0);
    let mv = m.multiply_vector(v);
    assert_eq!(mv, Vector3::new(14.0, 32.0, 50.0));
    assert_eq!(Matrix3::identity().multiply_vector(v), v);

    let m_transpose = m.transpose();
    for row in 0..3 {
        for col in 0..3 {
            assert_eq!(m_transpose.data[row][col], m.data[col][row]);
        }
    }

    // Rows are linearly dependent.
    assert_relative_eq!(m.determinant(), 0.0);
    assert!(m.inverse().is_none());
}

#[test]
fn test_inertia_inverse() {
    let inertia = Matrix3::from_diagonal(Vector3::new(2.0, 4.0, 0.5));
    assert_relative_eq!(inertia.determinant(), 4.0);

    let inverse = inertia.inverse().unwrap();
    let v = Vector3::new(1.0, -2.0, 3.0);
    assert_relative_eq!(inverse.multiply_vector(inertia.multiply_vector(v)), v, epsilon = 1e-5);
    assert_relative_eq!(inverse.data[2][2], 2.0, epsilon = 1e-6);

    assert!(Matrix3::zero().inverse().is_none());
}
