//! Invariants of task records and assembled reports over arbitrary inputs.

use std::sync::Arc;

use buildpulse::publisher::PublishPipeline;
use buildpulse::report::{derive_module, task_record, ExecutionReport, TaskState, NO_MODULE};
use buildpulse::telemetry::{now_millis, TaskFinishEvent};
use buildpulse::{BuildService, BuildServiceParams};
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,8}"
}

fn task_path() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 1..5).prop_map(|segments| format!(":{}", segments.join(":")))
}

fn state_token() -> impl Strategy<Value = Option<&'static str>> {
    prop_oneof![
        Just(None),
        Just(Some("UP-TO-DATE")),
        Just(Some("FROM-CACHE")),
        Just(Some("NO-SOURCE")),
        Just(Some("skipped")),
        Just(Some("failed")),
    ]
}

fn finish_event() -> impl Strategy<Value = TaskFinishEvent> {
    (task_path(), 0u64..1_000_000, 0u64..1_000_000, state_token()).prop_map(
        |(path, start, end, token)| {
            let display = match token {
                Some(token) => format!("Task {path} {token}"),
                None => format!("Task {path}"),
            };
            TaskFinishEvent::new(path, Some(start), Some(end), display)
        },
    )
}

proptest! {
    #[test]
    fn duration_is_saturating_and_stop_follows_start(event in finish_event()) {
        let record = task_record(&event, &[]);
        let start = event.start_ms.unwrap();
        let end = event.end_ms.unwrap();
        prop_assert_eq!(record.duration_ms, end.saturating_sub(start));
        prop_assert_eq!(record.start_ms, start);
        prop_assert_eq!(record.stop_ms, start + record.duration_ms);
        prop_assert!(record.stop_ms >= record.start_ms);
    }

    #[test]
    fn name_is_last_path_segment(event in finish_event()) {
        let record = task_record(&event, &[]);
        prop_assert_eq!(Some(record.name.as_str()), event.path.rsplit(':').next());
        prop_assert_eq!(record.path, event.path);
    }

    #[test]
    fn requested_iff_short_name_listed(event in finish_event(), listed in any::<bool>()) {
        let short = event.path.rsplit(':').next().unwrap().to_string();
        let requested = if listed { vec![short] } else { vec!["__never__".to_string()] };
        let record = task_record(&event, &requested);
        prop_assert_eq!(record.is_requested, listed);
    }

    #[test]
    fn module_is_parent_path_or_no_module(path in task_path()) {
        let module = derive_module(&path);
        let segments = path.split(':').count();
        if segments > 2 {
            let prefix = format!("{}:", module);
            prop_assert!(path.starts_with(&prefix));
            prop_assert_eq!(module.split(':').count(), segments - 1);
        } else {
            prop_assert_eq!(module, NO_MODULE);
        }
    }

    #[test]
    fn success_iff_no_failed_task(events in prop::collection::vec(finish_event(), 0..20)) {
        let mut service = BuildService::start(
            BuildServiceParams::new(now_millis()),
            Arc::new(PublishPipeline::empty()),
        );
        for event in &events {
            service.on_task_finish(event.clone());
        }
        service.close();

        let report = service.report().unwrap();
        let any_failed = report.tasks.iter().any(|t| t.state == TaskState::Failed);
        prop_assert_eq!(report.success, !any_failed);
        prop_assert_eq!(report.success, ExecutionReport::success_of(&report.tasks));
        prop_assert_eq!(report.tasks.len(), events.len());
        let paths: Vec<&str> = report.tasks.iter().map(|t| t.path.as_str()).collect();
        let expected: Vec<&str> = events.iter().map(|e| e.path.as_str()).collect();
        prop_assert_eq!(paths, expected);
    }

    #[test]
    fn cache_hit_always_zeroes_configuration(
        events in prop::collection::vec(finish_event(), 0..10),
        elapsed in 0u64..10_000,
    ) {
        let params = BuildServiceParams::new(now_millis().saturating_sub(elapsed))
            .with_configuration_phase_executed(|| false);
        let mut service = BuildService::start(params, Arc::new(PublishPipeline::empty()));
        for event in events {
            service.on_task_finish(event);
        }
        service.close();

        let report = service.report().unwrap();
        prop_assert!(report.configuration_cache_hit);
        prop_assert_eq!(report.configuration_duration_ms, 0);
        prop_assert!(report.duration_ms >= elapsed);
    }
}
