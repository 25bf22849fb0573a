use queryrace::application::benchmarking::{
    MatrixScheduler, RaceConfig, RaceReportWriter, RaceStatus, ReportCollector, SchedulerState,
    drive_to_end,
};
use queryrace::application::strategies::StrategyRegistry;
use queryrace::config::DEFAULT_DOCUMENT_SEED;
use queryrace::domain::events::RaceLineup;
use queryrace::domain::race::{ExecutionContexts, MeasurementStatus, WorkloadCase};
use queryrace::domain::sandbox::Document;
use queryrace::infrastructure::mock::{RecordedEvent, RecordingReporter};
use queryrace::infrastructure::{ProgressBus, SystemClock};
use std::sync::Arc;

const DOCUMENT_SIZE: usize = 300;
const SEED: u64 = 11;

fn workloads() -> Vec<WorkloadCase> {
    vec![
        WorkloadCase::new("all", "*"),
        WorkloadCase::new("tag", "div"),
        WorkloadCase::new("class", "div.note"),
        WorkloadCase::new("group", "div.fn, p.warning"),
        WorkloadCase::new("descendant", "div p"),
    ]
}

#[test]
fn test_bundled_strategies_agree_on_counts() {
    let registry = StrategyRegistry::builtin(DOCUMENT_SIZE, SEED);
    let ids = ["scan", "indexed", "parallel", "remote_scan"];
    let strategies = registry.select(&ids).unwrap();
    let recorder = RecordingReporter::new();
    let mut scheduler =
        MatrixScheduler::new(Arc::new(recorder.clone()), Arc::new(SystemClock::new()));
    let document = Arc::new(Document::generate(DOCUMENT_SIZE, SEED));

    scheduler
        .start(
            RaceConfig::new(workloads(), strategies, ExecutionContexts::shared(document))
                .with_minimum_duration_ms(0),
        )
        .unwrap();
    let outcome = drive_to_end(&mut scheduler).unwrap();

    assert_eq!(outcome.state, SchedulerState::Completed);
    let cells = recorder.cells();
    assert_eq!(cells.len(), 20);
    for row in 0..3 {
        let counts: Vec<i64> = cells
            .iter()
            .filter(|(r, _, _)| *r == row)
            .map(|(_, _, m)| m.result_count)
            .collect();
        assert!(counts.iter().all(|c| *c == counts[0]), "row {}: {:?}", row, counts);
    }
    assert_eq!(cells[0].2.result_count, DOCUMENT_SIZE as i64);

    // groups: only the index-based strategy refuses
    let group: Vec<MeasurementStatus> = cells
        .iter()
        .filter(|(r, _, _)| *r == 3)
        .map(|(_, _, m)| m.status)
        .collect();
    assert_eq!(
        group,
        vec![
            MeasurementStatus::Ok,
            MeasurementStatus::Failed,
            MeasurementStatus::Ok,
            MeasurementStatus::Ok
        ]
    );

    // combinators are unsupported everywhere, so the row has no winner
    assert!(
        cells
            .iter()
            .filter(|(r, _, _)| *r == 4)
            .all(|(_, _, m)| m.status == MeasurementStatus::Failed)
    );
    assert_eq!(recorder.rows()[4].1, None);
}

#[test]
fn test_per_strategy_documents_and_report() {
    let registry = StrategyRegistry::builtin(DOCUMENT_SIZE, SEED);
    let strategies = registry.defaults().unwrap();
    let contexts = ExecutionContexts::per_strategy(
        strategies
            .iter()
            .map(|_| Arc::new(Document::generate(DOCUMENT_SIZE, SEED)))
            .collect(),
    );
    let collector = ReportCollector::new();
    let bus = ProgressBus::new();
    bus.subscribe(Arc::new(collector.clone()));
    let mut scheduler = MatrixScheduler::new(Arc::new(bus), Arc::new(SystemClock::new()));

    scheduler
        .start(RaceConfig::new(workloads(), strategies, contexts).with_minimum_duration_ms(1))
        .unwrap();
    let outcome = drive_to_end(&mut scheduler).unwrap();

    let report = collector.report();
    assert_eq!(report.status, RaceStatus::Completed);
    assert_eq!(report.strategies, vec!["scan", "indexed", "parallel"]);
    assert_eq!(report.cells.len(), 15);
    assert_eq!(report.winners, outcome.winners);
    assert!(report.configuration.contains("share=false"));

    let dir = tempfile::tempdir().unwrap();
    let path = RaceReportWriter::new(dir.path()).unwrap().write(&report).unwrap();
    assert!(path.exists());
}

#[test]
fn test_context_count_must_match_strategies() {
    let registry = StrategyRegistry::builtin(DOCUMENT_SIZE, SEED);
    let strategies = registry.defaults().unwrap();
    let contexts =
        ExecutionContexts::per_strategy(vec![Arc::new(Document::generate(DOCUMENT_SIZE, SEED))]);
    let recorder = RecordingReporter::new();
    let mut scheduler: MatrixScheduler<Document> =
        MatrixScheduler::new(Arc::new(recorder.clone()), Arc::new(SystemClock::new()));

    let err = scheduler
        .start(RaceConfig::new(workloads(), strategies, contexts))
        .unwrap_err();

    assert!(err.to_string().contains("expected 3"));
    assert_eq!(scheduler.state(), SchedulerState::Idle);
    assert!(recorder.events().is_empty());
}

#[test]
fn test_lineup_carries_display_names() {
    let registry = StrategyRegistry::builtin(DOCUMENT_SIZE, SEED);
    let strategies = registry.select(&["scan", "remote_scan"]).unwrap();
    let recorder = RecordingReporter::new();
    let mut scheduler =
        MatrixScheduler::new(Arc::new(recorder.clone()), Arc::new(SystemClock::new()));
    let document = Arc::new(Document::generate(DOCUMENT_SIZE, SEED));

    scheduler
        .start(RaceConfig::new(
            vec![WorkloadCase::new("tag", "p")],
            strategies,
            ExecutionContexts::shared(document),
        ))
        .unwrap();

    let lineup: RaceLineup = recorder
        .events()
        .into_iter()
        .find_map(|event| match event {
            RecordedEvent::Started(lineup) => Some(lineup),
            _ => None,
        })
        .unwrap();
    assert_eq!(lineup.strategy_names[0], "ScanStrategy");
    assert_eq!(lineup.strategy_names[1], "ScanStrategy (runner thread)");
}

#[test]
fn test_runner_thread_sees_race_documents() {
    let size = 2000;
    let registry = StrategyRegistry::builtin(size, DEFAULT_DOCUMENT_SEED);
    let strategies = registry.select(&["scan", "remote_scan"]).unwrap();
    let contexts = ExecutionContexts::per_strategy(
        strategies
            .iter()
            .map(|_| Arc::new(Document::generate(size, DEFAULT_DOCUMENT_SEED)))
            .collect(),
    );
    let recorder = RecordingReporter::new();
    let mut scheduler =
        MatrixScheduler::new(Arc::new(recorder.clone()), Arc::new(SystemClock::new()));

    scheduler
        .start(
            RaceConfig::new(
                vec![
                    WorkloadCase::new("tag", "div"),
                    WorkloadCase::new("class", ".note"),
                ],
                strategies,
                contexts,
            )
            .with_minimum_duration_ms(0),
        )
        .unwrap();
    drive_to_end(&mut scheduler).unwrap();

    let counts: Vec<i64> = recorder
        .cells()
        .iter()
        .map(|(_, _, m)| m.result_count)
        .collect();
    assert_eq!(counts.len(), 4);
    assert!(counts[0] > 0);
    assert_eq!(counts[0], counts[1]);
    assert_eq!(counts[2], counts[3]);
}
