//! Filter properties: pruning never invents or reorders tasks, exclusion always wins.

use buildpulse::filter::{
    StateFilterConfiguration, StringFilterConfiguration, TaskFilter, TaskFilterConfiguration,
    ThresholdConfiguration,
};
use buildpulse::report::{ExecutionReport, TaskRecord, TaskState};
use proptest::prelude::*;

fn state() -> impl Strategy<Value = TaskState> {
    prop_oneof![
        Just(TaskState::Executed),
        Just(TaskState::UpToDate),
        Just(TaskState::FromCache),
        Just(TaskState::NoSource),
        Just(TaskState::Skipped),
        Just(TaskState::Failed),
    ]
}

fn record() -> impl Strategy<Value = TaskRecord> {
    ("[a-z]{1,6}", "[a-z]{1,4}", state(), 0u64..5_000).prop_map(|(name, module, state, duration)| {
        TaskRecord {
            duration_ms: duration,
            path: format!(":{module}:{name}"),
            name,
            state,
            is_requested: false,
            module: format!(":{module}"),
            start_ms: 0,
            stop_ms: duration,
        }
    })
}

fn report() -> impl Strategy<Value = ExecutionReport> {
    prop::collection::vec(record(), 0..30).prop_map(|tasks| ExecutionReport {
        success: ExecutionReport::success_of(&tasks),
        tasks,
        ..ExecutionReport::default()
    })
}

fn is_subsequence(kept: &[TaskRecord], all: &[TaskRecord]) -> bool {
    let mut all = all.iter();
    kept.iter().all(|k| all.any(|a| a == k))
}

proptest! {
    #[test]
    fn identity_filter_keeps_everything(report in report()) {
        let filtered = TaskFilter::identity().apply(report.clone());
        prop_assert_eq!(filtered, report);
    }

    #[test]
    fn filtering_keeps_order_and_report_fields(
        report in report(),
        excluded in state(),
        min in 0u64..2_500,
    ) {
        let filter = TaskFilter::try_new(&TaskFilterConfiguration {
            states: StateFilterConfiguration {
                includes: Vec::new(),
                excludes: vec![excluded],
            },
            threshold: Some(ThresholdConfiguration {
                min_execution_time_ms: Some(min),
                max_execution_time_ms: None,
            }),
            ..TaskFilterConfiguration::default()
        })
        .unwrap();

        let filtered = filter.apply(report.clone());
        prop_assert!(is_subsequence(&filtered.tasks, &report.tasks));
        prop_assert!(filtered.tasks.iter().all(|t| t.state != excluded && t.duration_ms >= min));
        prop_assert_eq!(filtered.success, report.success);
        prop_assert_eq!(filtered.duration_ms, report.duration_ms);
    }

    #[test]
    fn exclusion_beats_inclusion(report in report(), pattern in "[a-z]{1,6}") {
        let filter = TaskFilter::try_new(&TaskFilterConfiguration {
            names: StringFilterConfiguration {
                includes: vec![pattern.clone()],
                excludes: vec![pattern.clone()],
            },
            ..TaskFilterConfiguration::default()
        })
        .unwrap();

        let filtered = filter.apply(report);
        prop_assert!(filtered.tasks.iter().all(|t| t.name != pattern));
        prop_assert!(filtered.tasks.is_empty());
    }
}
