use super::*;
use meow_adapters::FakeSessionAdapter;
use meow_core::{AgentId, FakeClock, Step, StepId, StepKind, StepStatus, Value, Workflow, WorkflowId};
use meow_store::{Paths, WorkflowStore};
use std::collections::BTreeMap;

fn orchestrator(workflow: Workflow) -> (Arc<Orchestrator<FakeSessionAdapter, FakeClock>>, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(WorkflowStore::new(Paths { state_dir: dir.path().to_path_buf() }));
    let orch = Orchestrator::new(workflow, store, FakeSessionAdapter::new(), FakeClock::new(1_000));
    (orch, dir)
}

fn shell_step(id: &str, command: &str) -> Step {
    Step::new(StepId::new(id), StepKind::Shell { command: command.to_string() })
}

#[tokio::test]
async fn step_done_request_acks_on_success() {
    let mut step = shell_step("s1", "true");
    step.mark_running(0);
    let wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![step]);
    let (orch, _dir) = orchestrator(wf);

    let response = handle(
        &orch,
        Request::StepDone {
            agent_id: AgentId::new("unused"),
            step_id: Some(StepId::new("s1")),
            outputs: BTreeMap::new(),
            notes: None,
        },
    )
    .await;

    assert_eq!(response, Response::Ack { ok: true });
    assert_eq!(orch.step_status_get(&StepId::new("s1")), Some(StepStatus::Succeeded));
}

#[tokio::test]
async fn step_done_request_on_unknown_step_becomes_an_error_response() {
    let wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![]);
    let (orch, _dir) = orchestrator(wf);

    let response = handle(
        &orch,
        Request::StepDone {
            agent_id: AgentId::new("a1"),
            step_id: Some(StepId::new("missing")),
            outputs: BTreeMap::new(),
            notes: None,
        },
    )
    .await;

    assert!(response.is_error());
}

#[tokio::test]
async fn event_emit_then_await_round_trip_through_the_dispatcher() {
    let wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![]);
    let (orch, _dir) = orchestrator(wf);

    let awaiting = tokio::spawn({
        let orch = Arc::clone(&orch);
        async move {
            handle(
                &orch,
                Request::EventAwait { name: "ready".to_string(), predicate: BTreeMap::new(), timeout_ms: Some(1_000) },
            )
            .await
        }
    });

    let emitted = handle(&orch, Request::EventEmit { name: "ready".to_string(), data: BTreeMap::new() }).await;
    assert!(matches!(emitted, Response::Event { ref name, .. } if name == "ready"));

    let response = awaiting.await.unwrap();
    assert!(matches!(response, Response::Event { ref name, .. } if name == "ready"));
}

#[tokio::test]
async fn session_id_get_returns_none_for_an_agent_with_no_session() {
    let wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![]);
    let (orch, _dir) = orchestrator(wf);

    let response = handle(&orch, Request::SessionIdGet { agent_id: AgentId::new("a1") }).await;
    assert_eq!(response, Response::SessionId { session_id: None });
}

#[tokio::test]
async fn step_status_get_returns_none_for_an_unknown_step() {
    let wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![]);
    let (orch, _dir) = orchestrator(wf);

    let response = handle(&orch, Request::StepStatusGet { step_id: StepId::new("missing") }).await;
    assert_eq!(response, Response::StepStatus { status: None });
}

#[tokio::test]
async fn unknown_request_variant_becomes_an_error_response() {
    let wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![]);
    let (orch, _dir) = orchestrator(wf);

    let response = handle(&orch, Request::Unknown).await;
    assert!(response.is_error());
}
