use site_planner_geometry::{LocalProjection, Point};
use site_planner_setback::{
    CalculationOptions, DefaultRequirements, SetbackError, SetbackRequirements, calculate,
};
use site_planner_setback_models::{
    BuildableAreaRequest, BuildableAreaResult, CalculationMethod, ClassificationSource,
    CoordinateSpace, EdgeClassificationInput, RequirementsInput, SetbackRole,
};

fn init() {
    let _ = pretty_env_logger::try_init();
}

fn rectangle(w: f64, h: f64) -> Vec<[f64; 2]> {
    vec![[0.0, 0.0], [w, 0.0], [w, h], [0.0, h]]
}

fn requirements(front: f64, side: f64, rear: f64) -> Option<RequirementsInput> {
    Some(RequirementsInput::from(SetbackRequirements {
        front,
        side,
        rear,
        water: None,
    }))
}

fn roles(roles: &[SetbackRole]) -> Vec<EdgeClassificationInput> {
    roles
        .iter()
        .enumerate()
        .map(|(i, role)| EdgeClassificationInput::new(i, Some(*role)))
        .collect()
}

fn run(request: &BuildableAreaRequest) -> BuildableAreaResult {
    calculate(request, &DefaultRequirements, &CalculationOptions::default()).unwrap()
}

fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected}, got {actual}"
    );
}

#[allow(clippy::cast_precision_loss)]
fn regular_polygon(sides: usize, radius: f64) -> Vec<[f64; 2]> {
    (0..sides)
        .map(|i| {
            let angle = std::f64::consts::TAU * i as f64 / sides as f64;
            [radius * angle.cos(), radius * angle.sin()]
        })
        .collect()
}

fn l_shape() -> Vec<[f64; 2]> {
    vec![
        [0.0, 0.0],
        [30.0, 0.0],
        [30.0, 12.0],
        [12.0, 12.0],
        [12.0, 30.0],
        [0.0, 30.0],
    ]
}

#[test]
fn rectangle_with_explicit_front_side_rear() {
    init();
    let request = BuildableAreaRequest {
        site_coords: rectangle(20.0, 15.0),
        requirements: requirements(4.5, 1.5, 3.5),
        edge_classifications: roles(&[
            SetbackRole::Front,
            SetbackRole::Side,
            SetbackRole::Rear,
            SetbackRole::Side,
        ]),
        ..BuildableAreaRequest::default()
    };

    let result = run(&request);

    assert_eq!(result.calculation_method, CalculationMethod::EdgeOffset);
    assert_eq!(result.classification_source, ClassificationSource::Explicit);
    assert_close(result.site_area_m2, 300.0, 1e-9);
    assert_close(result.buildable_area_m2, 119.0, 1e-9);
    assert_close(result.coverage_ratio, 0.397, 0.001);

    let expected = [[1.5, 4.5], [18.5, 4.5], [18.5, 11.5], [1.5, 11.5]];
    assert_eq!(result.buildable_coords.len(), 4);
    for (actual, expected) in result.buildable_coords.iter().zip(expected) {
        assert_close(actual[0], expected[0], 1e-9);
        assert_close(actual[1], expected[1], 1e-9);
    }

    assert_eq!(result.setback_details[&0].role, SetbackRole::Front);
    assert_close(result.setback_details[&2].distance_m, 3.5, 0.0);
    assert_close(result.setback_details[&1].length_m, 15.0, 1e-9);
    assert!(result.error.is_none());
}

#[test]
fn frontage_hint_matches_equivalent_explicit_classification() {
    init();
    let base = BuildableAreaRequest {
        site_coords: rectangle(20.0, 15.0),
        requirements: requirements(4.5, 1.5, 3.5),
        ..BuildableAreaRequest::default()
    };

    let by_frontage = run(&BuildableAreaRequest {
        frontage: Some("south".to_string()),
        ..base.clone()
    });
    let by_roles = run(&BuildableAreaRequest {
        edge_classifications: roles(&[
            SetbackRole::Front,
            SetbackRole::Side,
            SetbackRole::Side,
            SetbackRole::Side,
        ]),
        ..base
    });

    assert_eq!(by_frontage.classification_source, ClassificationSource::Frontage);
    assert_eq!(by_frontage.setback_details[&0].role, SetbackRole::Front);
    assert_eq!(by_frontage.buildable_coords, by_roles.buildable_coords);
    assert_close(by_frontage.buildable_area_m2, by_roles.buildable_area_m2, 1e-9);
    // Rear is never inferred from a frontage hint
    assert_close(by_frontage.buildable_area_m2, 17.0 * 9.0, 1e-9);
}

#[test]
fn zero_setbacks_return_the_site() {
    init();
    for coords in [rectangle(20.0, 15.0), regular_polygon(7, 25.0), l_shape()] {
        let result = run(&BuildableAreaRequest {
            site_coords: coords.clone(),
            requirements: requirements(0.0, 0.0, 0.0),
            ..BuildableAreaRequest::default()
        });

        assert_eq!(result.calculation_method, CalculationMethod::FallbackUniform);
        assert_eq!(result.buildable_coords, coords);
        assert_close(result.buildable_area_m2, result.site_area_m2, 1e-9);
        assert_close(result.coverage_ratio, 1.0, 1e-12);
    }
}

#[test]
fn larger_setbacks_never_increase_area() {
    init();
    let mut previous = f64::INFINITY;
    for step in 0..=20 {
        let side = f64::from(step) * 0.5;
        let result = run(&BuildableAreaRequest {
            site_coords: l_shape(),
            requirements: requirements(2.0, side, 2.0),
            frontage: Some("S".to_string()),
            ..BuildableAreaRequest::default()
        });
        assert!(
            result.buildable_area_m2 <= previous + 1e-9,
            "side {side}: {} > {previous}",
            result.buildable_area_m2
        );
        previous = result.buildable_area_m2;
    }
}

#[test]
fn buildable_area_never_exceeds_site_area() {
    init();
    let sites = [
        rectangle(20.0, 15.0),
        rectangle(8.0, 40.0),
        regular_polygon(3, 12.0),
        regular_polygon(5, 18.0),
        regular_polygon(12, 30.0),
        l_shape(),
    ];
    let directions = ["north", "east", "southwest", "NW"];

    for coords in sites {
        for direction in directions {
            let result = run(&BuildableAreaRequest {
                site_coords: coords.clone(),
                requirements: requirements(4.5, 1.5, 3.5),
                frontage: Some(direction.to_string()),
                ..BuildableAreaRequest::default()
            });
            assert!(result.buildable_area_m2 >= 0.0);
            assert!(result.buildable_area_m2 <= result.site_area_m2 + 1e-6);
            assert!((0.0..=1.0).contains(&result.coverage_ratio));
            assert!(result.error.is_none(), "{:?}", result.error);
        }
    }
}

#[test]
fn every_edge_has_a_setback_detail() {
    init();
    for sides in 3..=16 {
        let result = run(&BuildableAreaRequest {
            site_coords: regular_polygon(sides, 40.0),
            requirements: requirements(4.5, 1.5, 3.5),
            edge_classifications: vec![EdgeClassificationInput::new(0, Some(SetbackRole::Rear))],
            ..BuildableAreaRequest::default()
        });
        assert_eq!(result.setback_details.len(), sides);
        assert!((0..sides).all(|i| result.setback_details.contains_key(&i)));
    }
}

#[test]
fn oversized_setbacks_give_an_empty_result() {
    init();
    let result = run(&BuildableAreaRequest {
        site_coords: rectangle(10.0, 10.0),
        requirements: requirements(6.0, 6.0, 6.0),
        frontage: Some("north".to_string()),
        ..BuildableAreaRequest::default()
    });

    assert_eq!(result.calculation_method, CalculationMethod::DegenerateEmpty);
    assert!(result.buildable_coords.is_empty());
    assert_close(result.buildable_area_m2, 0.0, 0.0);
    assert_close(result.coverage_ratio, 0.0, 0.0);
    assert!(result.error.is_none());
}

#[test]
fn two_points_fail_validation_before_geometry() {
    init();
    let err = calculate(
        &BuildableAreaRequest {
            site_coords: vec![[0.0, 0.0], [10.0, 0.0]],
            requirements: requirements(4.5, 1.5, 3.5),
            ..BuildableAreaRequest::default()
        },
        &DefaultRequirements,
        &CalculationOptions::default(),
    )
    .unwrap_err();

    let SetbackError::Validation { errors } = err else {
        panic!("expected a validation error");
    };
    assert!(errors[0].contains("at least 3 points"));
}

#[test]
fn missing_rear_requirement_is_named() {
    init();
    let err = calculate(
        &BuildableAreaRequest {
            site_coords: rectangle(20.0, 15.0),
            requirements: Some(RequirementsInput {
                front: Some(4.5),
                side: Some(1.5),
                rear: None,
                water: None,
            }),
            frontage: Some("south".to_string()),
            ..BuildableAreaRequest::default()
        },
        &DefaultRequirements,
        &CalculationOptions::default(),
    )
    .unwrap_err();

    assert!(err.to_string().contains("'rear'"), "{err}");
}

#[test]
fn classification_is_required_when_sides_have_a_setback() {
    init();
    let err = calculate(
        &BuildableAreaRequest {
            site_coords: rectangle(20.0, 15.0),
            requirements: requirements(4.5, 1.5, 3.5),
            ..BuildableAreaRequest::default()
        },
        &DefaultRequirements,
        &CalculationOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, SetbackError::Validation { .. }));
}

#[test]
fn water_edge_without_water_setback_uses_side() {
    init();
    let result = run(&BuildableAreaRequest {
        site_coords: rectangle(20.0, 15.0),
        requirements: requirements(4.5, 1.5, 3.5),
        edge_classifications: roles(&[
            SetbackRole::Front,
            SetbackRole::Water,
            SetbackRole::Rear,
            SetbackRole::Side,
        ]),
        ..BuildableAreaRequest::default()
    });

    let water = result.setback_details[&1];
    assert_eq!(water.role, SetbackRole::Water);
    assert!(water.side_fallback);
    assert_close(water.distance_m, 1.5, 0.0);
    assert_close(result.buildable_area_m2, 119.0, 1e-9);
}

#[test]
fn geographic_boundary_round_trips_through_meters() {
    init();
    let origin = Point::new(153.0251, -27.4698);
    let projection = LocalProjection::new(origin);
    let site_coords: Vec<[f64; 2]> = [[-10.0, -7.5], [10.0, -7.5], [10.0, 7.5], [-10.0, 7.5]]
        .into_iter()
        .map(|[x, y]| projection.unproject(Point::new(x, y)).into())
        .collect();

    let result = run(&BuildableAreaRequest {
        site_coords,
        requirements: requirements(4.5, 1.5, 3.5),
        frontage: Some("south".to_string()),
        coordinate_space: CoordinateSpace::Geographic,
        ..BuildableAreaRequest::default()
    });

    assert_eq!(result.coordinate_space, CoordinateSpace::Geographic);
    assert_close(result.site_area_m2, 300.0, 1e-3);
    assert_close(result.buildable_area_m2, 17.0 * 9.0, 1e-3);

    let [lng, lat] = result.buildable_coords[0];
    let corner = projection.project(Point::new(lng, lat));
    assert_close(corner.x, -8.5, 1e-3);
    assert_close(corner.y, -3.0, 1e-3);
}

#[test]
fn kinked_front_edge_keeps_its_buildable_area() {
    init();
    let kinked = |dy: f64| BuildableAreaRequest {
        site_coords: vec![[0.0, 0.0], [15.0, -dy], [30.0, 0.0], [30.0, 20.0], [0.0, 20.0]],
        requirements: requirements(4.5, 1.5, 3.5),
        edge_classifications: roles(&[
            SetbackRole::Front,
            SetbackRole::Side,
            SetbackRole::Side,
            SetbackRole::Rear,
            SetbackRole::Side,
        ]),
        ..BuildableAreaRequest::default()
    };

    let straight = run(&kinked(0.0));
    assert_close(straight.buildable_area_m2, 344.25, 1e-9);

    let survey_noise = run(&kinked(0.001));
    assert_eq!(survey_noise.calculation_method, CalculationMethod::EdgeOffset);
    assert_close(survey_noise.buildable_area_m2, 344.25, 0.1);

    for dy in [0.05, 0.3, -0.3] {
        let result = run(&kinked(dy));
        assert_eq!(
            result.calculation_method,
            CalculationMethod::EdgeOffset,
            "dy {dy}"
        );
        assert!(result.buildable_area_m2 > 300.0, "dy {dy}: {}", result.buildable_area_m2);
        assert!(result.buildable_area_m2 <= result.site_area_m2);
        assert!(result.error.is_none(), "{:?}", result.error);
    }
}

#[test]
fn near_duplicate_geographic_vertex_is_kept_as_an_edge() {
    init();
    let projection = LocalProjection::new(Point::new(153.0251, -27.4698));
    let mut site_coords: Vec<[f64; 2]> = [[-10.0, -7.5], [10.0, -7.5], [10.0, 7.5], [-10.0, 7.5]]
        .into_iter()
        .map(|[x, y]| projection.unproject(Point::new(x, y)).into())
        .collect();
    let [lng, lat] = site_coords[1];
    site_coords.insert(2, [lng, lat + 5e-10]);

    let result = calculate(
        &BuildableAreaRequest {
            site_coords,
            requirements: requirements(4.5, 1.5, 3.5),
            edge_classifications: roles(&[
                SetbackRole::Front,
                SetbackRole::Side,
                SetbackRole::Side,
                SetbackRole::Rear,
                SetbackRole::Side,
            ]),
            coordinate_space: CoordinateSpace::Geographic,
            ..BuildableAreaRequest::default()
        },
        &DefaultRequirements,
        &CalculationOptions::default(),
    )
    .unwrap();

    assert_eq!(result.setback_details.len(), 5);
    assert_close(result.site_area_m2, 300.0, 1e-3);
}

#[test]
fn frontend_payload_deserializes_and_serializes() {
    init();
    let request: BuildableAreaRequest = serde_json::from_str(
        r#"{
            "site_coords": [[0, 0], [20, 0], [20, 15], [0, 15]],
            "requirements": {"front": 4.5, "side": 1.5, "rear": 3.5},
            "frontage": "auto",
            "edge_classifications": [
                {"index": 0, "type": "front"},
                {"index": 1, "type": null},
                {"index": 2, "type": "back"},
                {"index": 3, "classification": "side"}
            ]
        }"#,
    )
    .unwrap();

    let result = run(&request);
    assert_close(result.buildable_area_m2, 119.0, 1e-9);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["calculation_method"], "edge-offset");
    assert_eq!(json["requirements_origin"], "supplied");
    assert_eq!(json["setback_details"]["2"]["role"], "rear");
    assert_eq!(json["buildable_coords"][0][0], 1.5);
    assert!(json.get("error").is_none());
}
