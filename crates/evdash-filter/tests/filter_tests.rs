use evdash_core::{Dataset, NumericField, VehicleRecord, VehicleType};
use evdash_filter::{apply, apply_constraints, Constraint, FilterState, RangeUpdate, SetFilter};

fn rec(make: &str, county: &str, year: i32, kind: VehicleType, range: Option<f64>, price: Option<f64>) -> VehicleRecord {
    VehicleRecord {
        make: make.to_string(),
        model: format!("{make} model"),
        model_year: year,
        vehicle_type: kind,
        electric_range: range,
        base_price: price,
        county: county.to_string(),
        city: format!("{county} city"),
    }
}

/// Ten records, four in King county, one with an unknown range.
fn ten_records() -> Dataset {
    use VehicleType::{BatteryElectric as Bev, PluginHybrid as Phev};
    Dataset::from_records(vec![
        rec("TESLA", "King", 2020, Bev, Some(0.0), Some(40000.0)),
        rec("NISSAN", "King", 2013, Bev, Some(30.0), None),
        rec("TESLA", "King", 2019, Bev, Some(75.0), Some(50000.0)),
        rec("CHEVROLET", "King", 2018, Phev, Some(100.0), Some(33000.0)),
        rec("KIA", "Pierce", 2020, Bev, Some(239.0), Some(39000.0)),
        rec("TESLA", "Snohomish", 2021, Bev, Some(310.0), Some(60000.0)),
        rec("TOYOTA", "Spokane", 2018, Phev, Some(25.0), Some(27400.0)),
        rec("FORD", "Clark", 2022, Bev, Some(180.0), None),
        rec("BMW", "Pierce", 2015, Phev, None, Some(44100.0)),
        rec("NISSAN", "Thurston", 2016, Bev, Some(84.0), Some(29000.0)),
    ])
}

#[test]
fn range_filter_returns_exactly_records_in_range() {
    let dataset = ten_records();
    let mut state = FilterState::new(*dataset.extents());
    state.set_range(NumericField::ElectricRange, 50.0, 200.0).unwrap();

    let view = apply(&dataset, &state);
    let ranges: Vec<f64> = view.records().filter_map(|r| r.electric_range).collect();
    assert_eq!(ranges, vec![75.0, 100.0, 180.0, 84.0]);
    assert_eq!(view.excluded_unknown(), 1, "BMW has no known range");
}

#[test]
fn range_and_county_intersect() {
    let dataset = ten_records();
    let mut state = FilterState::new(*dataset.extents());
    state.set_range(NumericField::ElectricRange, 50.0, 200.0).unwrap();
    state.set_counties(["King"]);

    let view = apply(&dataset, &state);
    assert_eq!(view.rows(), &[2, 3]);
    assert!(view.records().all(|r| r.county == "King"));
}

#[test]
fn default_state_keeps_records_with_unknown_values() {
    let dataset = ten_records();
    let state = FilterState::new(*dataset.extents());
    let view = apply(&dataset, &state);
    assert_eq!(view.len(), 10);
    assert_eq!(view.excluded_unknown(), 0);
}

#[test]
fn empty_set_means_unrestricted() {
    let dataset = ten_records();
    let mut none_selected = FilterState::new(*dataset.extents());
    none_selected.set_makes(Vec::<String>::new());

    let mut all_selected = FilterState::new(*dataset.extents());
    all_selected.set_makes(dataset.makes());

    assert!(none_selected.makes().is_any());
    assert_eq!(apply(&dataset, &none_selected).len(), apply(&dataset, &all_selected).len());
    assert_eq!(apply(&dataset, &none_selected).len(), dataset.len());
}

#[test]
fn adding_constraints_never_grows_the_result() {
    let dataset = ten_records();
    let mut state = FilterState::new(*dataset.extents());
    let mut previous = apply(&dataset, &state).len();

    let steps: Vec<Box<dyn Fn(&mut FilterState)>> = vec![
        Box::new(|s: &mut FilterState| s.set_vehicle_types([VehicleType::BatteryElectric])),
        Box::new(|s: &mut FilterState| {
            s.set_year_range(2015, 2022).unwrap();
        }),
        Box::new(|s: &mut FilterState| {
            s.set_range(NumericField::Price, 30000.0, 60000.0).unwrap();
        }),
        Box::new(|s: &mut FilterState| s.set_counties(["King", "Pierce"])),
        Box::new(|s: &mut FilterState| s.set_makes(["TESLA"])),
    ];
    for step in steps {
        step(&mut state);
        let current = apply(&dataset, &state).len();
        assert!(current <= previous, "{current} > {previous}");
        previous = current;
    }
    assert_eq!(previous, 2, "two King Teslas from 2019-2020 with known prices");
}

#[test]
fn disjoint_constraints_yield_empty_view() {
    let dataset = ten_records();
    let constraints = vec![
        Constraint::Counties(SetFilter::only("King".to_string())),
        Constraint::Makes(SetFilter::only("KIA".to_string())),
    ];
    let view = apply_constraints(&dataset, &constraints);
    assert!(view.is_empty());
    assert_eq!(view.records().count(), 0);
}

#[test]
fn explicit_empty_one_of_matches_nothing() {
    let dataset = ten_records();
    let view = apply_constraints(&dataset, &[Constraint::Counties(SetFilter::OneOf(Default::default()))]);
    assert!(view.is_empty());
}

#[test]
fn reset_restores_default() {
    let dataset = ten_records();
    let mut state = FilterState::new(*dataset.extents());
    state.set_makes(["TESLA"]);
    state.set_range(NumericField::Price, 30000.0, 45000.0).unwrap();
    assert!(!state.is_default());
    state.reset();
    assert!(state.is_default());
    assert_eq!(state, FilterState::new(*dataset.extents()));
}

#[test]
fn range_on_field_without_extent_excludes_unknowns() {
    let dataset = Dataset::from_records(vec![rec("TESLA", "King", 2020, VehicleType::BatteryElectric, None, None)]);
    let mut state = FilterState::new(*dataset.extents());
    state.set_range(NumericField::Price, 0.0, 100000.0).unwrap();
    let view = apply(&dataset, &state);
    assert!(view.is_empty());
    assert_eq!(view.excluded_unknown(), 1);
}

#[test]
fn range_entirely_above_the_data_matches_nothing() {
    let dataset = ten_records();
    let mut state = FilterState::new(*dataset.extents());
    let update = state.set_year_range(2030, 2040).unwrap();
    assert!(matches!(update, RangeUpdate::OutsideExtent(_)));

    let view = apply(&dataset, &state);
    assert!(view.is_empty());
    assert_eq!(view.excluded_unknown(), 0);
}

#[test]
fn range_partly_past_the_data_keeps_matching_rows() {
    let dataset = ten_records();
    let mut state = FilterState::new(*dataset.extents());
    let update = state.set_range(NumericField::ElectricRange, 200.0, 1000.0).unwrap();
    assert!(matches!(update, RangeUpdate::Clamped { .. }));

    let ranges: Vec<f64> = apply(&dataset, &state).records().filter_map(|r| r.electric_range).collect();
    assert_eq!(ranges, vec![239.0, 310.0]);
}
