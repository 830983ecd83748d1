//! Unit tests for grid geometry, projection and index lookup
//!
//! These use in-memory grid definitions; NetCDF-backed tests live in
//! `integration_test.rs`.

use cmaq_grid::{
    build_projection,
    data_source::{squeeze, InMemorySource, MetadataSource},
    errors::{CmaqGridError, Result},
    get_parallel_info,
    grid::{GridDefinition, ProjectionType},
    projection::{MapProjection, DEFAULT_EARTH_RADIUS},
    transform::{CellIndex, GridTransformer},
    GridSummary, ParallelConfig,
};
use ndarray::ArrayD;

/// 12 km CONUS grid (12US1)
fn conus_grid() -> GridDefinition {
    GridDefinition {
        projection_type: ProjectionType::LambertConformal,
        cell_size_x: 12_000.0,
        cell_size_y: 12_000.0,
        origin_x: -2_736_000.0,
        origin_y: -2_088_000.0,
        column_count: 459,
        row_count: 299,
        center_longitude: -97.0,
        center_latitude: 40.0,
        standard_parallel_1: 33.0,
        standard_parallel_2: 45.0,
    }
}

fn latlon_grid() -> GridDefinition {
    GridDefinition {
        projection_type: ProjectionType::LatLon,
        cell_size_x: 0.5,
        cell_size_y: 0.5,
        origin_x: -130.0,
        origin_y: 20.0,
        column_count: 140,
        row_count: 60,
        ..conus_grid()
    }
}

/// Reference nearest-center search: first index minimising |center - value|
fn argmin_distance(centers: &[f64], value: f64) -> usize {
    let mut best = 0;
    for (k, c) in centers.iter().enumerate() {
        if (c - value).abs() < (centers[best] - value).abs() {
            best = k;
        }
    }
    best
}

#[test]
fn test_error_types() {
    let err = CmaqGridError::UnsupportedProjection {
        projection: "lat-lon".to_string(),
        operation: "cell centers".to_string(),
    };
    assert_eq!(format!("{}", err), "Cannot use cell centers with lat-lon projection");

    let err = CmaqGridError::InputShapeMismatch { first: 2, second: 1 };
    assert!(format!("{}", err).contains("got 2 and 1"));

    let err = CmaqGridError::AttributeNotFound {
        name: "XCELL".to_string(),
    };
    assert!(format!("{}", err).contains("'XCELL' not found"));

    let generic: CmaqGridError = "Test error".into();
    assert_eq!(format!("{}", generic), "Test error");
}

#[test]
fn test_projection_type_codes() {
    assert_eq!(ProjectionType::from_gdtyp(1), ProjectionType::LatLon);
    assert_eq!(ProjectionType::from_gdtyp(2), ProjectionType::LambertConformal);
    assert_eq!(ProjectionType::from_gdtyp(6), ProjectionType::PolarStereographic);
    assert_eq!(ProjectionType::from_gdtyp(42), ProjectionType::Other(42));

    for code in 1..=10 {
        assert_eq!(ProjectionType::from_gdtyp(code).gdtyp(), code);
    }

    assert!(!ProjectionType::LatLon.is_projected());
    assert!(ProjectionType::LambertConformal.is_projected());
}

#[test]
fn test_cell_centers() -> Result<()> {
    let grid = conus_grid();
    let centers = grid.cell_centers()?;

    assert_eq!(centers.x.len(), 459);
    assert_eq!(centers.y.len(), 299);

    assert_eq!(centers.x[0], -2_730_000.0);
    assert_eq!(centers.x[458], 2_766_000.0);
    assert_eq!(centers.y[0], -2_082_000.0);
    assert_eq!(centers.y[298], 1_494_000.0);

    // Uniform spacing
    for w in centers.x.to_vec().windows(2) {
        assert!((w[1] - w[0] - 12_000.0).abs() < 1e-6);
    }

    Ok(())
}

#[test]
fn test_cell_center_length_with_fractional_steps() -> Result<()> {
    // Steps that accumulate rounding error under repeated addition
    let grid = GridDefinition {
        cell_size_x: 0.1,
        cell_size_y: 1.0 / 3.0,
        origin_x: 0.0,
        origin_y: 0.0,
        column_count: 1000,
        row_count: 301,
        ..conus_grid()
    };

    let centers = grid.cell_centers()?;
    assert_eq!(centers.x.len(), 1000);
    assert_eq!(centers.y.len(), 301);

    let corners = grid.cell_corners()?;
    assert_eq!(corners.shape(), (302, 1001));

    Ok(())
}

#[test]
fn test_cell_corners() -> Result<()> {
    let grid = conus_grid();
    let corners = grid.cell_corners()?;

    assert_eq!(corners.shape(), (300, 460));
    assert_eq!(corners.y.dim(), (300, 460));

    assert_eq!(corners.x[[0, 0]], -2_736_000.0);
    assert_eq!(corners.x[[0, 459]], 2_772_000.0);
    assert_eq!(corners.y[[0, 0]], -2_088_000.0);
    assert_eq!(corners.y[[299, 0]], 1_500_000.0);

    // X varies along columns only, Y along rows only
    assert_eq!(corners.x[[0, 17]], corners.x[[250, 17]]);
    assert_eq!(corners.y[[42, 0]], corners.y[[42, 400]]);

    Ok(())
}

#[test]
fn test_domain_bounds_match_corner_mesh() -> Result<()> {
    let grid = conus_grid();
    let corners = grid.cell_corners()?;
    let bounds = grid.domain_bounds()?;

    let x_min = corners.x.iter().copied().fold(f64::INFINITY, f64::min);
    let x_max = corners.x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let y_min = corners.y.iter().copied().fold(f64::INFINITY, f64::min);
    let y_max = corners.y.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    assert_eq!(bounds.x_min, x_min);
    assert_eq!(bounds.x_max, x_max);
    assert_eq!(bounds.y_min, y_min);
    assert_eq!(bounds.y_max, y_max);

    Ok(())
}

#[test]
fn test_latlon_grid_rejects_planar_operations() {
    let grid = latlon_grid();

    for result in [
        grid.cell_centers().map(|_| ()),
        grid.cell_corners().map(|_| ()),
        GridTransformer::new(grid.clone()).map(|_| ()),
        build_projection(&grid, DEFAULT_EARTH_RADIUS).map(|_| ()),
    ] {
        match result {
            Err(CmaqGridError::UnsupportedProjection { projection, .. }) => {
                assert_eq!(projection, "lat-lon");
            }
            other => panic!("Expected UnsupportedProjection error, got {:?}", other),
        }
    }
}

#[test]
fn test_unimplemented_projection_is_rejected() {
    let grid = GridDefinition {
        projection_type: ProjectionType::PolarStereographic,
        ..conus_grid()
    };

    // Geometry is still defined for any projected grid
    assert!(grid.cell_centers().is_ok());

    match build_projection(&grid, DEFAULT_EARTH_RADIUS) {
        Err(CmaqGridError::UnsupportedProjection { projection, .. }) => {
            assert_eq!(projection, "polar stereographic");
        }
        other => panic!("Expected UnsupportedProjection error, got {:?}", other),
    }
    assert!(GridTransformer::new(grid).is_err());
}

#[test]
fn test_invalid_grid_definitions() {
    let zero_cell = GridDefinition {
        cell_size_x: 0.0,
        ..conus_grid()
    };
    assert!(matches!(
        GridTransformer::new(zero_cell),
        Err(CmaqGridError::InvalidGrid { .. })
    ));

    let empty = GridDefinition {
        row_count: 0,
        ..conus_grid()
    };
    assert!(matches!(empty.validate(), Err(CmaqGridError::InvalidGrid { .. })));

    assert!(matches!(
        GridTransformer::with_earth_radius(conus_grid(), -1.0),
        Err(CmaqGridError::InvalidGrid { .. })
    ));
}

#[test]
fn test_shape_mismatch() -> Result<()> {
    let transformer = GridTransformer::new(conus_grid())?;

    match transformer.lon_lat_to_xy(&[1.0, 2.0], &[3.0]) {
        Err(CmaqGridError::InputShapeMismatch { first, second }) => {
            assert_eq!(first, 2);
            assert_eq!(second, 1);
        }
        other => panic!("Expected InputShapeMismatch error, got {:?}", other),
    }

    assert!(matches!(
        transformer.xy_to_lon_lat(&[0.0], &[0.0, 1.0]),
        Err(CmaqGridError::InputShapeMismatch { .. })
    ));
    assert!(matches!(
        transformer.lon_lat_to_indices(&[-84.0, -85.0], &[33.0]),
        Err(CmaqGridError::InputShapeMismatch { .. })
    ));
    assert!(matches!(
        transformer.par_lon_lat_to_indices(&[-84.0], &[]),
        Err(CmaqGridError::InputShapeMismatch { .. })
    ));

    Ok(())
}

#[test]
fn test_projection_center_maps_to_origin() -> Result<()> {
    let transformer = GridTransformer::new(conus_grid())?;

    let (x, y) = transformer.lon_lat_to_xy_point(-97.0, 40.0)?;
    assert!(x.abs() < 1e-6, "x = {}", x);
    assert!(y.abs() < 1e-6, "y = {}", y);

    let (lon, lat) = transformer.xy_to_lon_lat_point(0.0, 0.0)?;
    assert!((lon + 97.0).abs() < 1e-9);
    assert!((lat - 40.0).abs() < 1e-9);

    Ok(())
}

#[test]
fn test_forward_matches_lambert_conformal_formula() -> Result<()> {
    // Closed-form spherical Lambert Conformal Conic for the CONUS parameters
    let r = DEFAULT_EARTH_RADIUS;
    let (p1, p2) = (33.0_f64.to_radians(), 45.0_f64.to_radians());
    let (lat0, lon0) = (40.0_f64.to_radians(), (-97.0_f64).to_radians());
    let t = |phi: f64| (std::f64::consts::FRAC_PI_4 + phi / 2.0).tan();
    let n = (p1.cos() / p2.cos()).ln() / (t(p2) / t(p1)).ln();
    let f = p1.cos() * t(p1).powf(n) / n;
    let rho = |phi: f64| r * f / t(phi).powf(n);

    let transformer = GridTransformer::new(conus_grid())?;
    for (lon, lat) in [(-84.46837, 33.83169), (-120.0, 30.0), (-70.0, 48.0)] {
        let theta = n * (f64::to_radians(lon) - lon0);
        let expected_x = rho(f64::to_radians(lat)) * theta.sin();
        let expected_y = rho(lat0) - rho(f64::to_radians(lat)) * theta.cos();

        let (x, y) = transformer.lon_lat_to_xy_point(lon, lat)?;
        assert!((x - expected_x).abs() < 0.01, "x {} vs {}", x, expected_x);
        assert!((y - expected_y).abs() < 0.01, "y {} vs {}", y, expected_y);
    }

    Ok(())
}

#[test]
fn test_round_trip() -> Result<()> {
    let transformer = GridTransformer::new(conus_grid())?;

    let lons = vec![-84.46837, -84.50322, -84.58422, -120.5, -70.25, -97.0, -105.0];
    let lats = vec![33.83169, 33.91965, 33.72607, 45.0, 25.5, 40.0, 50.0];

    let (xs, ys) = transformer.lon_lat_to_xy(&lons, &lats)?;
    assert_eq!(xs.len(), lons.len());
    let (lons_back, lats_back) = transformer.xy_to_lon_lat(&xs, &ys)?;

    for k in 0..lons.len() {
        assert!((lons_back[k] - lons[k]).abs() < 1e-6, "lon {} vs {}", lons_back[k], lons[k]);
        assert!((lats_back[k] - lats[k]).abs() < 1e-6, "lat {} vs {}", lats_back[k], lats[k]);
    }

    Ok(())
}

#[test]
fn test_unprojectable_point_does_not_abort_batch() -> Result<()> {
    let transformer = GridTransformer::new(conus_grid())?;

    // The south pole lies at the far side of the cone
    let (xs, ys) = transformer.lon_lat_to_xy(&[-84.0, -97.0, -97.0], &[33.0, -90.0, 40.0])?;
    assert_eq!(xs.len(), 3);
    assert!(xs[0].is_finite() && ys[0].is_finite());
    assert!(!xs[1].is_finite() || !ys[1].is_finite());
    assert!(xs[2].abs() < 1e-6 && ys[2].abs() < 1e-6);

    let (lons, lats) = transformer.xy_to_lon_lat(&[0.0, f64::NAN], &[0.0, f64::NAN])?;
    assert!((lons[0] + 97.0).abs() < 1e-9 && (lats[0] - 40.0).abs() < 1e-9);
    assert!(lons[1].is_nan() && lats[1].is_nan());

    Ok(())
}

#[test]
fn test_projection_is_reproducible() -> Result<()> {
    let grid = conus_grid();
    let first = build_projection(&grid, DEFAULT_EARTH_RADIUS)?;
    let second = build_projection(&grid, DEFAULT_EARTH_RADIUS)?;

    for (lon, lat) in [(-84.46837, 33.83169), (-110.0, 42.5), (-75.0, 28.0)] {
        assert_eq!(first.forward(lon, lat)?, second.forward(lon, lat)?);
    }
    assert_eq!(
        first.inverse(123_456.0, -654_321.0)?,
        second.inverse(123_456.0, -654_321.0)?
    );

    Ok(())
}

#[test]
fn test_earth_radius_scales_coordinates() -> Result<()> {
    let small = GridTransformer::with_earth_radius(conus_grid(), 6_370_000.0)?;
    let large = GridTransformer::with_earth_radius(conus_grid(), 6_371_229.0)?;

    let (x_small, _) = small.lon_lat_to_xy_point(-84.0, 34.0)?;
    let (x_large, _) = large.lon_lat_to_xy_point(-84.0, 34.0)?;
    assert!(x_large > x_small);
    assert!(((x_large / x_small) - 6_371_229.0 / 6_370_000.0).abs() < 1e-9);

    Ok(())
}

#[test]
fn test_station_scenario() -> Result<()> {
    let transformer = GridTransformer::new(conus_grid())?;

    let (i, j) = transformer.lon_lat_to_indices(&[-84.46837], &[33.83169])?;
    assert_eq!(i.len(), 1);
    let (i0, j0) = (i[0].expect("station inside domain"), j[0].expect("station inside domain"));
    assert!(i0 <= 458);
    assert!(j0 <= 298);
    assert_eq!((i0, j0), (324, 123));

    // Stable across calls and across transformer instances
    let again = GridTransformer::new(conus_grid())?.lon_lat_to_indices(&[-84.46837], &[33.83169])?;
    assert_eq!(again, (i, j));

    Ok(())
}

#[test]
fn test_station_batch_preserves_order() -> Result<()> {
    let transformer = GridTransformer::new(conus_grid())?;

    let lons = [-84.46837, -84.50322, -84.58422, -84.52058, -83.83925, -83.83684, -84.29018];
    let lats = [33.83169, 33.91965, 33.72607, 33.77784, 33.60807, 33.62966, 33.68808];

    let (is, js) = transformer.lon_lat_to_indices(&lons, &lats)?;
    assert_eq!(is.len(), 7);
    assert_eq!(js.len(), 7);

    for k in 0..lons.len() {
        let single = transformer.lon_lat_to_cell(lons[k], lats[k])?;
        assert_eq!(single.map(|c| c.i), is[k]);
        assert_eq!(single.map(|c| c.j), js[k]);
    }

    Ok(())
}

#[test]
fn test_corner_points_are_inside() -> Result<()> {
    let transformer = GridTransformer::new(conus_grid())?;
    let b = transformer.domain_bounds();

    assert_eq!(transformer.xy_to_cell(b.x_min, b.y_min), Some(CellIndex { i: 0, j: 0 }));
    assert_eq!(transformer.xy_to_cell(b.x_max, b.y_max), Some(CellIndex { i: 458, j: 298 }));
    assert_eq!(transformer.xy_to_cell(b.x_min, b.y_max), Some(CellIndex { i: 0, j: 298 }));

    // Interior cell corner
    let corner_x = -2_736_000.0 + 12_000.0 * 100.0;
    let corner_y = -2_088_000.0 + 12_000.0 * 50.0;
    assert!(transformer.xy_to_cell(corner_x, corner_y).is_some());

    Ok(())
}

#[test]
fn test_half_cell_beyond_last_center_is_inside() -> Result<()> {
    let transformer = GridTransformer::new(conus_grid())?;
    let centers = transformer.cell_centers();

    let last_x = centers.x[458];
    let last_y = centers.y[298];

    assert_eq!(
        transformer.xy_to_cell(last_x + 5_999.0, last_y + 5_999.0),
        Some(CellIndex { i: 458, j: 298 })
    );
    assert_eq!(
        transformer.xy_to_cell(centers.x[0] - 5_999.0, centers.y[0] - 5_999.0),
        Some(CellIndex { i: 0, j: 0 })
    );

    Ok(())
}

#[test]
fn test_points_beyond_domain_are_outside() -> Result<()> {
    let transformer = GridTransformer::new(conus_grid())?;
    let b = transformer.domain_bounds();

    assert_eq!(transformer.xy_to_cell(b.x_max + 12_000.0, 0.0), None);
    assert_eq!(transformer.xy_to_cell(0.0, b.y_min - 12_000.0), None);
    assert_eq!(transformer.xy_to_cell(b.x_min - 0.001, b.y_min), None);
    assert_eq!(transformer.xy_to_cell(f64::NAN, 0.0), None);

    // One cell beyond the upper-right corner, via lon/lat
    let (lon, lat) = transformer.xy_to_lon_lat_point(b.x_max + 12_000.0, b.y_max + 12_000.0)?;
    let (i, j) = transformer.lon_lat_to_indices(&[lon], &[lat])?;
    assert_eq!(i, vec![None]);
    assert_eq!(j, vec![None]);

    Ok(())
}

#[test]
fn test_outside_points_do_not_abort_batch() -> Result<()> {
    let transformer = GridTransformer::new(conus_grid())?;

    // Atlanta, Gulf of Guinea, south pole, Denver
    let lons = [-84.46837, 0.0, 10.0, -104.99];
    let lats = [33.83169, 0.0, -90.0, 39.74];

    let (is, js) = transformer.lon_lat_to_indices(&lons, &lats)?;
    assert!(is[0].is_some() && js[0].is_some());
    assert_eq!((is[1], js[1]), (None, None));
    assert_eq!((is[2], js[2]), (None, None));
    assert!(is[3].is_some() && js[3].is_some());

    Ok(())
}

#[test]
fn test_nearest_center_matches_reference_scan() -> Result<()> {
    let grid = conus_grid();
    let transformer = GridTransformer::new(grid.clone())?;
    let centers = transformer.cell_centers();
    let xs = centers.x.to_vec();
    let ys = centers.y.to_vec();
    let b = transformer.domain_bounds();

    let mut k = 0.0;
    while b.x_min + k * 3_217.3 <= b.x_max {
        let x = b.x_min + k * 3_217.3;
        let y = b.y_min + k * 1_931.7 % (b.y_max - b.y_min);
        let cell = transformer.xy_to_cell(x, y).expect("point inside domain");
        assert_eq!(cell.i, argmin_distance(&xs, x), "x = {}", x);
        assert_eq!(cell.j, argmin_distance(&ys, y), "y = {}", y);
        k += 1.0;
    }

    // Exactly between two centers resolves to the lower index, as a first-minimum scan does
    let edge_x = grid.origin_x + grid.cell_size_x * 10.0;
    let cell = transformer.xy_to_cell(edge_x, 0.0).expect("inside");
    assert_eq!(cell.i, 9);
    assert_eq!(cell.i, argmin_distance(&xs, edge_x));

    Ok(())
}

#[test]
fn test_parallel_lookup_matches_sequential() -> Result<()> {
    let transformer = GridTransformer::new(conus_grid())?;

    let lons: Vec<f64> = (0..200).map(|k| -130.0 + k as f64 * 0.35).collect();
    let lats: Vec<f64> = (0..200).map(|k| 18.0 + (k % 40) as f64 * 0.9).collect();

    let sequential = transformer.lon_lat_to_indices(&lons, &lats)?;
    let parallel = transformer.par_lon_lat_to_indices(&lons, &lats)?;
    assert_eq!(sequential, parallel);

    // The sweep crosses the domain edge, so both outcomes occur
    assert!(sequential.0.iter().any(Option::is_some));
    assert!(sequential.0.iter().any(Option::is_none));

    Ok(())
}

#[test]
fn test_in_memory_source() -> Result<()> {
    let data = ArrayD::from_shape_vec(vec![4, 1, 3, 2], (0..24).map(|v| v as f32).collect())?;
    let source = InMemorySource::new(conus_grid()).with_variable("O3", data);

    assert_eq!(source.grid_definition()?, conus_grid());
    assert_eq!(source.variable_names(), vec!["O3".to_string()]);

    let o3 = source.variable("O3")?;
    assert_eq!(o3.shape(), &[4, 3, 2]);
    assert_eq!(o3[[1, 2, 1]], 11.0);

    match source.variable("NO2") {
        Err(CmaqGridError::VariableNotFound { var }) => assert_eq!(var, "NO2"),
        other => panic!("Expected VariableNotFound error, got {:?}", other),
    }

    Ok(())
}

#[test]
fn test_squeeze_single_value() -> Result<()> {
    let single = ArrayD::from_shape_vec(vec![1, 1, 1], vec![7.5f32])?;
    let squeezed = squeeze(single)?;
    assert_eq!(squeezed.ndim(), 0);
    assert_eq!(squeezed.iter().next(), Some(&7.5));

    let untouched = ArrayD::from_shape_vec(vec![2, 3], vec![0.0f32; 6])?;
    assert_eq!(squeeze(untouched)?.shape(), &[2, 3]);

    Ok(())
}

#[test]
fn test_grid_summary() -> Result<()> {
    let summary = GridSummary::from_grid(&conus_grid())?;
    assert_eq!(summary.gdtyp, 2);
    assert_eq!(summary.columns, 459);
    let [ll, ur] = summary.corner_lon_lat.expect("projected grid has corners");
    assert!(ll.0 < -97.0 && ur.0 > -97.0);
    assert!(ll.1 < ur.1);

    let json = summary.to_json();
    assert_eq!(json["rows"], 299);
    assert_eq!(json["bounds"]["x_min"], -2_736_000.0);

    let latlon = GridSummary::from_grid(&latlon_grid())?;
    assert!(latlon.bounds.is_none());
    assert!(latlon.corner_lon_lat.is_none());

    Ok(())
}

#[test]
fn test_parallel_config() -> Result<()> {
    let default_config = ParallelConfig::default();
    assert!(default_config.num_threads.is_none());
    assert_eq!(ParallelConfig::new(Some(4)).num_threads, Some(4));

    // Leaving the global pool alone never fails
    default_config.setup_global_pool()?;

    let info = get_parallel_info();
    assert!(info.current_threads > 0);
    assert!(info.available_cores > 0);

    Ok(())
}
