use std::sync::Arc;

use evdash_core::{Dataset, Dimension, NumericField, VehicleRecord, VehicleType};
use evdash_filter::FilterState;
use evdash_pipeline::page::{self, catalog};
use evdash_pipeline::{Action, ActionOutcome, Interaction, PageConfig, PipelineOutput, Session, ViewRenderer};
use evdash_sample::SampleSettings;
use evdash_select::{LinkageGroup, SelectionEvent};

const COUNTIES: [&str; 4] = ["King", "Pierce", "Snohomish", "Spokane"];
const MAKES: [&str; 5] = ["TESLA", "NISSAN", "KIA", "FORD", "BMW"];

fn synthetic(n: usize) -> Arc<Dataset> {
    let records = (0..n)
        .map(|i| VehicleRecord {
            make: MAKES[i % MAKES.len()].to_string(),
            model: format!("M{}", i % 7),
            model_year: 2011 + (i % 13) as i32,
            vehicle_type: if i % 3 == 0 { VehicleType::PluginHybrid } else { VehicleType::BatteryElectric },
            electric_range: if i % 10 == 0 { None } else { Some((i % 300) as f64) },
            base_price: if i % 2 == 0 { Some(30000.0 + (i % 50) as f64 * 1000.0) } else { None },
            county: COUNTIES[i % COUNTIES.len()].to_string(),
            city: String::new(),
        })
        .collect();
    Arc::new(Dataset::from_records(records))
}

fn executive() -> PageConfig {
    page::find("executive").expect("executive page")
}

#[test]
fn default_run_samples_six_thousand_down_to_five_thousand() {
    let session = Session::new(synthetic(6000), SampleSettings::default());
    let first = session.run(&executive());
    let second = session.run(&executive());

    let counts = first.counts();
    assert_eq!((counts.total, counts.filtered, counts.displayed), (6000, 6000, 5000));
    assert!(counts.sampled);
    assert_eq!(first.display_rows(), second.display_rows());
    assert!(first.summary().starts_with("Showing a sample of 5,000 of 6,000"));
}

#[test]
fn sample_mode_off_shows_everything() {
    let mut session = Session::new(synthetic(6000), SampleSettings::default());
    session.apply(Action::SetSampleMode(false)).unwrap();
    let output = session.run(&executive());
    assert_eq!(output.display_rows().len(), 6000);
    assert!(!output.is_sampled());
    assert_eq!(output.summary(), "Showing all 6,000 filtered records (6,000 total)");
}

#[test]
fn small_filtered_set_is_not_sampled() {
    let mut session = Session::new(synthetic(6000), SampleSettings::default());
    session.apply(Action::SetCounties(vec!["King".to_string()])).unwrap();
    let output = session.run(&executive());
    assert_eq!(output.counts().filtered, 1500);
    assert_eq!(output.display_rows(), output.filtered().rows());
    assert!(output.display_records().all(|r| r.county == "King"));
}

#[test]
fn selection_on_linked_page_narrows_and_is_replaced() {
    let mut session = Session::new(synthetic(600), SampleSettings::default());
    let page = executive();
    let group = LinkageGroup::from("executive");

    session.apply(Action::Select { group: group.clone(), event: SelectionEvent::County("King".to_string()) }).unwrap();
    assert_eq!(session.run(&page).counts().filtered, 150);

    let outcome =
        session.apply(Action::Select { group: group.clone(), event: SelectionEvent::Make("TESLA".to_string()) }).unwrap();
    assert_eq!(outcome, ActionOutcome::SelectionReplaced(SelectionEvent::County("King".to_string())));
    let output = session.run(&page);
    assert_eq!(output.counts().filtered, 120);
    assert!(output.filtered_records().all(|r| r.make == "TESLA"));
    assert!(output.filtered_records().any(|r| r.county != "King"), "county click fully gone");

    session.apply(Action::ClearSelection(group)).unwrap();
    assert_eq!(session.run(&page).counts().filtered, 600);
}

#[test]
fn selection_and_sidebar_filters_conjoin() {
    let mut session = Session::new(synthetic(600), SampleSettings::default());
    session.apply(Action::SetMakes(vec!["TESLA".to_string()])).unwrap();
    session
        .apply(Action::Select { group: "executive".into(), event: SelectionEvent::County("King".to_string()) })
        .unwrap();
    let output = session.run(&executive());
    assert_eq!(output.counts().filtered, 30);
    assert!(output.filtered_records().all(|r| r.make == "TESLA" && r.county == "King"));
}

#[test]
fn standalone_page_ignores_selections() {
    let mut session = Session::new(synthetic(600), SampleSettings::default());
    session
        .apply(Action::Select { group: "executive".into(), event: SelectionEvent::County("King".to_string()) })
        .unwrap();
    let leaderboard = page::find("top-manufacturers").unwrap();
    assert_eq!(session.run(&leaderboard).counts().filtered, 600);
}

#[test]
fn pages_only_apply_the_filters_they_show() {
    let mut session = Session::new(synthetic(600), SampleSettings::default());
    session.apply(Action::SetCounties(vec!["King".to_string()])).unwrap();
    let stats = page::find("average-stats").unwrap();
    assert!(!stats.honors(Dimension::County));
    assert_eq!(session.run(&stats).counts().filtered, 600);
    assert_eq!(session.run(&executive()).counts().filtered, 150);
}

#[test]
fn reset_clears_filters_selections_and_sampling_together() {
    let dataset = synthetic(600);
    let mut session = Session::new(Arc::clone(&dataset), SampleSettings::default());
    session.apply(Action::SetMakes(vec!["KIA".to_string()])).unwrap();
    session.apply(Action::SetRange { field: NumericField::ElectricRange, min: 50.0, max: 150.0 }).unwrap();
    session.apply(Action::Select { group: "executive".into(), event: SelectionEvent::ModelYear(2015) }).unwrap();
    session.apply(Action::Select { group: "range-trends".into(), event: SelectionEvent::VehicleType(VehicleType::PluginHybrid) }).unwrap();
    session.apply(Action::SetSampleSize(100)).unwrap();
    assert!(!session.is_default());

    session.apply(Action::Reset).unwrap();
    assert!(session.is_default());
    assert_eq!(*session.filters(), FilterState::new(*dataset.extents()));
    assert!(session.selections().is_empty());
    assert_eq!(*session.sampling(), SampleSettings::default());
    assert_eq!(session.run(&executive()).counts().filtered, 600);
}

#[test]
fn invalid_input_is_rejected_without_changing_state() {
    let mut session = Session::new(synthetic(600), SampleSettings::default());
    assert!(session.apply(Action::SetRange { field: NumericField::Price, min: 50000.0, max: 40000.0 }).is_err());
    assert!(session.apply(Action::SetSampleSize(0)).is_err());
    assert!(session.is_default());
}

#[test]
fn clamped_range_is_reported() {
    let mut session = Session::new(synthetic(600), SampleSettings::default());
    let outcome = session.apply(Action::SetRange { field: NumericField::ModelYear, min: 1990.0, max: 2015.0 }).unwrap();
    match outcome {
        ActionOutcome::RangeClamped { field, applied, .. } => {
            assert_eq!(field, NumericField::ModelYear);
            assert_eq!((applied.min(), applied.max()), (2011.0, 2015.0));
        }
        other => panic!("expected clamp, got {other:?}"),
    }
}

#[test]
fn range_beyond_the_data_is_reported_and_matches_nothing() {
    let mut session = Session::new(synthetic(600), SampleSettings::default());
    let outcome = session.apply(Action::SetRange { field: NumericField::ModelYear, min: 2030.0, max: 2040.0 }).unwrap();
    match outcome {
        ActionOutcome::RangeOutsideData { field, requested } => {
            assert_eq!(field, NumericField::ModelYear);
            assert_eq!((requested.min(), requested.max()), (2030.0, 2040.0));
        }
        other => panic!("expected outside-data outcome, got {other:?}"),
    }
    let output = session.run(&executive());
    assert_eq!(output.counts().filtered, 0);
    assert!(output.filtered_records().all(|r| (2030..=2040).contains(&r.model_year)));
}

#[test]
fn empty_result_is_a_valid_output() {
    let mut session = Session::new(synthetic(600), SampleSettings::default());
    session.apply(Action::SetMakes(vec!["RIVIAN".to_string()])).unwrap();
    let output = session.run(&executive());
    assert_eq!(output.counts().filtered, 0);
    assert_eq!(output.display_records().count(), 0);
    assert_eq!(output.summary(), "Showing all 0 filtered records (600 total)");
}

#[test]
fn unknown_values_are_counted_when_a_range_is_active() {
    let mut session = Session::new(synthetic(600), SampleSettings::default());
    session.apply(Action::SetRange { field: NumericField::ElectricRange, min: 1.0, max: 250.0 }).unwrap();
    let output = session.run(&executive());
    assert_eq!(output.counts().excluded_unknown, 60);
    assert!(output.summary().ends_with("; 60 excluded for unknown values"));
}

#[test]
fn sessions_share_the_dataset_but_not_state() {
    let dataset = synthetic(600);
    let mut alice = Session::new(Arc::clone(&dataset), SampleSettings::default());
    let bob = Session::new(Arc::clone(&dataset), SampleSettings::default());
    alice.apply(Action::SetCounties(vec!["Pierce".to_string()])).unwrap();
    assert_eq!(alice.run(&executive()).counts().filtered, 150);
    assert_eq!(bob.run(&executive()).counts().filtered, 600);
    assert_eq!(Arc::strong_count(&dataset), 3);
}

struct ClickOnce {
    click: Option<SelectionEvent>,
    seen: Vec<usize>,
}

impl ViewRenderer for ClickOnce {
    fn render(&mut self, _page: &PageConfig, output: &PipelineOutput<'_>) -> anyhow::Result<Vec<Interaction>> {
        self.seen.push(output.counts().filtered);
        Ok(self.click.take().map(Interaction::Select).into_iter().collect())
    }
}

#[test]
fn renderer_clicks_feed_back_into_the_next_pass() {
    let mut session = Session::new(synthetic(600), SampleSettings::default());
    let mut renderer = ClickOnce { click: Some(SelectionEvent::County("Spokane".to_string())), seen: Vec::new() };
    let page = executive();

    assert_eq!(session.render(&page, &mut renderer).unwrap(), 1);
    assert_eq!(session.render(&page, &mut renderer).unwrap(), 0);
    assert_eq!(renderer.seen, vec![600, 150]);
}

#[test]
fn renderer_clicks_on_standalone_pages_are_dropped() {
    let mut session = Session::new(synthetic(600), SampleSettings::default());
    let mut renderer = ClickOnce { click: Some(SelectionEvent::Make("KIA".to_string())), seen: Vec::new() };
    let page = page::find("average-stats").unwrap();
    assert_eq!(session.render(&page, &mut renderer).unwrap(), 0);
    assert!(session.selections().is_empty());
}

#[test]
fn catalog_pages_are_uniquely_named() {
    let pages = catalog();
    let mut ids: Vec<&str> = pages.iter().map(PageConfig::id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), pages.len());
    assert!(page::find("missing").is_err());
}

#[test]
fn builder_composes_custom_pages() {
    let page = PageConfig::builder("county-drilldown", "County Drilldown")
        .filters([Dimension::County, Dimension::Make])
        .linked("drilldown")
        .build();
    assert!(page.honors(Dimension::County));
    assert!(!page.honors(Dimension::Price));
    assert_eq!(page.group().map(LinkageGroup::name), Some("drilldown"));
    assert!(page.charts().is_empty());
}
