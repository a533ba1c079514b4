use geometry3d::{Point3D, Vector3D};
use shading::dimensions::{compute, DimensionPair};
use shading::{Float, ObstructionScene, ObstructionSurface, ShadingOptions, Window};
use validate::assert_close;

/// A 1 by 1 window on the plane y = 0, facing -y, with its sill at z = 0
fn window() -> Window {
    Window::new(
        [
            Point3D::new(0., 0., 0.),
            Point3D::new(1., 0., 0.),
            Point3D::new(1., 0., 1.),
            Point3D::new(0., 0., 1.),
        ],
        Vector3D::new(0., -1., 0.),
        0.0,
        0.01,
    )
    .unwrap()
}

/// A closed box between `min` and `max`
fn cuboid(min: (Float, Float, Float), max: (Float, Float, Float)) -> ObstructionSurface {
    let p = |x: bool, y: bool, z: bool| {
        Point3D::new(
            if x { max.0 } else { min.0 },
            if y { max.1 } else { min.1 },
            if z { max.2 } else { min.2 },
        )
    };
    let quads = [
        [p(false, false, false), p(true, false, false), p(true, true, false), p(false, true, false)],
        [p(false, false, true), p(true, false, true), p(true, true, true), p(false, true, true)],
        [p(false, false, false), p(true, false, false), p(true, false, true), p(false, false, true)],
        [p(false, true, false), p(true, true, false), p(true, true, true), p(false, true, true)],
        [p(false, false, false), p(false, true, false), p(false, true, true), p(false, false, true)],
        [p(true, false, false), p(true, true, false), p(true, true, true), p(true, false, true)],
    ];
    let triangles = quads
        .iter()
        .flat_map(|[a, b, c, d]| [[*a, *b, *c], [*a, *c, *d]])
        .collect();
    ObstructionSurface::from_triangles(triangles).unwrap()
}

/// A block 5 away from the window, `h` tall
fn block(h: Float) -> ObstructionSurface {
    cuboid((-10., -6., -1.), (10., -5., h))
}

#[test]
fn test_right_triangle() {
    let scene = ObstructionScene::new(vec![block(3.)]);
    let r = compute(&window(), &scene, 99., &ShadingOptions::default()).unwrap();
    let h = r.horizon.unwrap();
    assert_close!(h.height, 3., 1e-6);
    assert_close!(h.distance, 5., 1e-6);
    assert_close!(h.hypotenuse(), 5.83, 1e-2);

    // The test line goes to the top of the front face
    let line = r.diagnostics.horizon.test_line;
    assert_close!(line.end.y, -5., 1e-6);
    assert_close!(line.end.z, 3., 1e-6);

    // A block does not overhang and is not a reveal
    assert!(r.overhang.is_none());
    assert!(r.reveal_left.is_none());
    assert!(r.reveal_right.is_none());
}

#[test]
fn test_horizon_monotonicity() {
    let options = ShadingOptions::default();
    let mut last_height = 0.0;
    for h in [0.5, 1., 2., 3., 6., 12.] {
        let scene = ObstructionScene::new(vec![block(h)]);
        let horizon = compute(&window(), &scene, 99., &options).unwrap().horizon.unwrap();
        assert!(horizon.height >= last_height);
        assert_close!(horizon.distance, 5., 1e-6);
        last_height = horizon.height;
    }
}

#[test]
fn test_dominant_obstruction() {
    // A low block nearby and a tall one far away. The one that blocks
    // more sky (i.e., forms the largest angle) wins.
    let near = cuboid((-10., -3., -1.), (10., -2., 1.));
    let far = cuboid((-10., -21., -1.), (10., -20., 8.));
    let scene = ObstructionScene::new(vec![near, far]);
    let r = compute(&window(), &scene, 99., &ShadingOptions::default()).unwrap();
    let h = r.horizon.unwrap();
    assert_close!(h.height, 1., 1e-6);
    assert_close!(h.distance, 2., 1e-6);
    assert_eq!(r.diagnostics.horizon.candidates.len(), 2);

    let far = cuboid((-10., -21., -1.), (10., -20., 25.));
    let scene = ObstructionScene::new(vec![cuboid((-10., -3., -1.), (10., -2., 1.)), far]);
    let h = compute(&window(), &scene, 99., &ShadingOptions::default())
        .unwrap()
        .horizon
        .unwrap();
    assert_close!(h.height, 25., 1e-6);
    assert_close!(h.distance, 20., 1e-6);
}

#[test]
fn test_purity() {
    let scene = ObstructionScene::new(vec![
        block(3.),
        cuboid((-2., -1., 1.5), (3., 0., 1.7)),
        cuboid((-0.3, -0.6, -1.), (-0.1, 0., 2.)),
    ]);
    let options = ShadingOptions::default();
    let a = compute(&window(), &scene, 99., &options).unwrap();
    let b = compute(&window(), &scene, 99., &options).unwrap();
    assert_eq!(a.horizon, b.horizon);
    assert_eq!(a.overhang, b.overhang);
    assert_eq!(a.reveal_left, b.reveal_left);
    assert_eq!(a.reveal_right, b.reveal_right);
}

#[test]
fn test_search_limit_invariance() {
    let options = ShadingOptions::default();
    let near = ObstructionScene::new(vec![block(3.)]);
    let with_far = ObstructionScene::new(vec![
        block(3.),
        // A tower well beyond the search limit
        cuboid((-10., -160., -1.), (10., -150., 300.)),
    ]);
    let a = compute(&window(), &near, 99., &options).unwrap();
    let b = compute(&window(), &with_far, 99., &options).unwrap();
    assert_eq!(a.horizon, b.horizon);
    assert_eq!(a.overhang, b.overhang);
    assert_eq!(a.reveal_left, b.reveal_left);
    assert_eq!(a.reveal_right, b.reveal_right);

    // Only the tower... nothing is found
    let only_far = ObstructionScene::new(vec![cuboid((-10., -160., -1.), (10., -150., 300.))]);
    let c = compute(&window(), &only_far, 99., &options).unwrap();
    assert!(c.horizon.is_none());
}

#[test]
fn test_backward_obstructions() {
    // Everything is behind the window
    let scene = ObstructionScene::new(vec![
        cuboid((-10., 1., -1.), (10., 5., 20.)),
        cuboid((-1., 0.5, 1.2), (2., 3., 1.5)),
    ]);
    let r = compute(&window(), &scene, 99., &ShadingOptions::default()).unwrap();
    assert!(r.horizon.is_none());
    assert!(r.overhang.is_none());
    assert!(r.reveal_left.is_none());
    assert!(r.reveal_right.is_none());
}

#[test]
fn test_overhang_slab() {
    // Balcony slab 0.5 above the window, projecting 1.2
    let scene = ObstructionScene::new(vec![cuboid((-2., -1.2, 1.5), (3., 0., 1.7))]);
    let r = compute(&window(), &scene, 99., &ShadingOptions::default()).unwrap();
    let o = r.overhang.unwrap();
    assert_close!(o.vertical_offset, 0.5, 1e-6);
    assert_close!(o.horizontal_offset, 1.2, 1e-6);
}

#[test]
fn test_overhang_ignores_facade_in_front() {
    // A building across the street is not an overhang, even though it
    // is taller than the window
    let scene = ObstructionScene::new(vec![block(20.)]);
    let r = compute(&window(), &scene, 99., &ShadingOptions::default()).unwrap();
    assert!(r.overhang.is_none());
    assert!(r.horizon.is_some());
}

#[test]
fn test_reveal_symmetry() {
    // Two fins, 0.1 away from the glazing edges, projecting 0.6
    let left = cuboid((-0.3, -0.6, -1.), (-0.1, 0., 2.));
    let right = cuboid((1.1, -0.6, -1.), (1.3, 0., 2.));
    let scene = ObstructionScene::new(vec![left, right]);
    let r = compute(&window(), &scene, 99., &ShadingOptions::default()).unwrap();

    let l = r.reveal_left.unwrap();
    let rr = r.reveal_right.unwrap();
    assert_close!(l.offset, 0.1, 1e-6);
    assert_close!(l.distance, 0.6, 1e-6);
    assert_close!(l.offset, rr.offset, 1e-9);
    assert_close!(l.distance, rr.distance, 1e-9);
}

#[test]
fn test_one_reveal_only() {
    let left = cuboid((-0.3, -0.6, -1.), (-0.1, 0., 2.));
    let scene = ObstructionScene::new(vec![left]);
    let r = compute(&window(), &scene, 99., &ShadingOptions::default()).unwrap();
    assert!(r.reveal_left.is_some());
    assert!(r.reveal_right.is_none());
}

/// A planar polygon from its vertices
fn polygon(vertices: &[(Float, Float, Float)]) -> ObstructionSurface {
    let v: Vec<Point3D> = vertices.iter().map(|(x, y, z)| Point3D::new(*x, *y, *z)).collect();
    ObstructionSurface::from_polygon(&v, 1e-6).unwrap()
}

/// The window, installed `recess` behind the face of a wall whose opening
/// is modelled as the four sides of the opening.
fn recessed(recess: Float) -> (Window, ObstructionScene) {
    let w = Window::new(*window().corners(), Vector3D::new(0., -1., 0.), recess, 0.01).unwrap();
    let y = -recess;
    let scene = ObstructionScene::new(vec![
        // Left jamb
        polygon(&[(0., 0., 0.), (0., y, 0.), (0., y, 1.), (0., 0., 1.)]),
        // Right jamb
        polygon(&[(1., 0., 0.), (1., 0., 1.), (1., y, 1.), (1., y, 0.)]),
        // Head
        polygon(&[(0., 0., 1.), (0., y, 1.), (1., y, 1.), (1., 0., 1.)]),
        // Sill
        polygon(&[(0., 0., 0.), (1., 0., 0.), (1., y, 0.), (0., y, 0.)]),
    ]);
    (w, scene)
}

#[test]
fn test_recessed_window_in_wall() {
    let recess = 0.25;
    let (w, scene) = recessed(recess);

    let r = compute(&w, &scene, 99., &ShadingOptions::default()).unwrap();
    let l = r.reveal_left.unwrap();
    let rr = r.reveal_right.unwrap();
    assert_close!(l.offset, 0., 1e-6);
    assert_close!(l.distance, recess, 1e-6);
    assert_close!(rr.distance, recess, 1e-6);

    // The head of the opening lies flat on the search origin... it is
    // degenerate, not an overhang
    assert!(r.overhang.is_none());

    // The sill is level with the horizontal half-line
    assert!(r.horizon.is_none());
}

#[test]
fn test_jambs_as_deep_as_the_reveal_probe() {
    // The reveal probe runs along the outer edge of each jamb
    let options = ShadingOptions::default();
    let recess = options.reveal_probe_offset;
    let (w, scene) = recessed(recess);

    let r = compute(&w, &scene, 99., &options).unwrap();
    let l = r.reveal_left.unwrap();
    let rr = r.reveal_right.unwrap();
    assert_close!(l.offset, 0., 1e-6);
    assert_close!(l.distance, recess, 1e-6);
    assert_close!(rr.offset, 0., 1e-6);
    assert_close!(rr.distance, recess, 1e-6);
}

#[test]
fn test_facade_starting_at_sill_level() {
    // e.g., a door, with the sill on the ground, and a facade
    // across the street that also starts on the ground
    let facade = polygon(&[(-10., -5., 0.), (10., -5., 0.), (10., -5., 3.), (-10., -5., 3.)]);
    let scene = ObstructionScene::new(vec![facade]);
    let r = compute(&window(), &scene, 99., &ShadingOptions::default()).unwrap();
    let h = r.horizon.unwrap();
    assert_close!(h.height, 3., 1e-6);
    assert_close!(h.distance, 5., 1e-6);
}

#[test]
fn test_flush_host_wall() {
    // The wall the window sits in, flush with the glazing, modelled
    // around the opening.
    let host = vec![
        // Below
        polygon(&[(-2., 0., -1.), (3., 0., -1.), (3., 0., 0.), (-2., 0., 0.)]),
        // Above
        polygon(&[(-2., 0., 1.), (3., 0., 1.), (3., 0., 3.), (-2., 0., 3.)]),
        // Left
        polygon(&[(-2., 0., 0.), (0., 0., 0.), (0., 0., 1.), (-2., 0., 1.)]),
        // Right
        polygon(&[(1., 0., 0.), (3., 0., 0.), (3., 0., 1.), (1., 0., 1.)]),
    ];
    let scene = ObstructionScene::new(host.clone());
    let r = compute(&window(), &scene, 99., &ShadingOptions::default()).unwrap();
    assert!(r.horizon.is_none());
    assert!(r.overhang.is_none());
    assert!(r.reveal_left.is_none());
    assert!(r.reveal_right.is_none());

    // Things in front of it are still found
    let mut surfaces = host;
    surfaces.push(cuboid((-2., -1.2, 1.5), (3., 0., 1.7)));
    surfaces.push(block(3.));
    let scene = ObstructionScene::new(surfaces);
    let r = compute(&window(), &scene, 99., &ShadingOptions::default()).unwrap();
    let o = r.overhang.unwrap();
    assert_close!(o.vertical_offset, 0.5, 1e-6);
    assert_close!(o.horizontal_offset, 1.2, 1e-6);
    let h = r.horizon.unwrap();
    assert_close!(h.height, 3., 1e-6);
    assert_close!(h.distance, 5., 1e-6);
}

#[test]
fn test_concave_facade() {
    // An L-shaped facade: low in front of the window, with a
    // tower to its left
    let facade = polygon(&[
        (10., -5., 2.),
        (10., -5., -1.),
        (-10., -5., -1.),
        (-10., -5., 10.),
        (0., -5., 10.),
        (0., -5., 2.),
    ]);
    let scene = ObstructionScene::new(vec![facade]);
    let r = compute(&window(), &scene, 99., &ShadingOptions::default()).unwrap();
    let h = r.horizon.unwrap();
    assert_close!(h.height, 2., 1e-6);
    assert_close!(h.distance, 5., 1e-6);
}

#[test]
fn test_search_limit_argument_wins() {
    let scene = ObstructionScene::new(vec![block(3.)]);
    let mut options = ShadingOptions::default();
    // Too short to reach the block
    options.set_search_limit(1.);
    let r = compute(&window(), &scene, 99., &options).unwrap();
    assert!(r.horizon.is_some());
}

#[test]
fn test_search_limit_advisory_does_not_change_results() {
    let scene = ObstructionScene::new(vec![block(3.)]);
    let options = ShadingOptions::default();
    assert!(options.check_search_limit(300.).unwrap().is_some());
    let a = compute(&window(), &scene, 99., &options).unwrap();
    let b = compute(&window(), &scene, 300., &options).unwrap();
    assert_eq!(a.horizon, b.horizon);
}
