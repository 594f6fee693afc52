use super::*;
use meow_adapters::FakeSessionAdapter;
use meow_core::{Agent, AgentId, AgentStatus, FakeClock, Step, StepKind, StepStatus, Value, Workflow, WorkflowId};
use meow_store::Paths;
use std::time::Duration;

fn workflow_store() -> (Arc<WorkflowStore>, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = Paths {
        state_dir: dir.path().to_path_buf(),
    };
    (Arc::new(WorkflowStore::new(paths)), dir)
}

fn orchestrator(workflow: Workflow) -> (Arc<Orchestrator<FakeSessionAdapter, FakeClock>>, tempfile::TempDir) {
    let (store, dir) = workflow_store();
    let orch = Orchestrator::new(workflow, store, FakeSessionAdapter::new(), FakeClock::new(1_000));
    (orch, dir)
}

fn shell_step(id: &str, command: &str) -> Step {
    Step::new(StepId::new(id), StepKind::Shell { command: command.to_string() })
}

fn agent_step(id: &str, agent_id: &str) -> Step {
    let mut step = Step::new(
        StepId::new(id),
        StepKind::Agent {
            agent_id: AgentId::new(agent_id),
            prompt: "go".to_string(),
        },
    );
    step.mark_running(0);
    step
}

#[test]
fn step_done_with_explicit_step_id_marks_running_step_succeeded() {
    let wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![agent_step("s1", "a1")]);
    let (orch, _dir) = orchestrator(wf);

    let mut outputs = BTreeMap::new();
    outputs.insert("k".to_string(), Value::string("v"));
    orch.step_done(&AgentId::new("a1"), Some(&StepId::new("s1")), outputs, None)
        .unwrap();

    assert_eq!(orch.step_status_get(&StepId::new("s1")), Some(StepStatus::Succeeded));
}

#[test]
fn step_done_rejects_a_mismatched_agent_id() {
    let wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![agent_step("s1", "a1")]);
    let (orch, _dir) = orchestrator(wf);

    let err = orch
        .step_done(&AgentId::new("a2"), Some(&StepId::new("s1")), BTreeMap::new(), None)
        .unwrap_err();
    assert!(matches!(err, EngineError::AgentMismatch { .. }));
    assert_eq!(orch.step_status_get(&StepId::new("s1")), Some(StepStatus::Running));
}

#[test]
fn step_done_rejects_a_step_that_is_not_running() {
    let step = shell_step("s1", "true");
    let wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![step]);
    let (orch, _dir) = orchestrator(wf);

    let err = orch
        .step_done(&AgentId::new("unused"), Some(&StepId::new("s1")), BTreeMap::new(), None)
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownStep(_)));
}

#[test]
fn step_done_resolves_implicit_step_via_agent_current_step() {
    let mut step = Step::new(
        StepId::new("s1"),
        StepKind::Agent {
            agent_id: AgentId::new("a1"),
            prompt: "go".to_string(),
        },
    );
    step.mark_running(0);
    let mut agent = Agent::new(AgentId::new("a1"), "tmux", "handle-1");
    agent.status = AgentStatus::Busy;
    agent.current_step = Some("s1".to_string());

    let mut wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![step]);
    wf.agents.insert("a1".to_string(), agent);
    let (orch, _dir) = orchestrator(wf);

    orch.step_done(&AgentId::new("a1"), None, BTreeMap::new(), None).unwrap();

    assert_eq!(orch.step_status_get(&StepId::new("s1")), Some(StepStatus::Succeeded));
    let snapshot = orch.workflow_snapshot();
    assert_eq!(snapshot.agents.get("a1").unwrap().status, AgentStatus::Ready);
    assert_eq!(snapshot.agents.get("a1").unwrap().current_step, None);
}

#[test]
fn step_done_without_step_id_and_unknown_agent_errors() {
    let wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![]);
    let (orch, _dir) = orchestrator(wf);

    let err = orch
        .step_done(&AgentId::new("ghost"), None, BTreeMap::new(), None)
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownAgent(_)));
}

#[tokio::test]
async fn event_emit_then_event_await_round_trips() {
    let wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![]);
    let (orch, _dir) = orchestrator(wf);

    orch.event_emit("ping", BTreeMap::new()).unwrap();
    let event = orch
        .event_await("ping", BTreeMap::new(), Some(Duration::from_secs(1)))
        .await
        .unwrap();
    assert_eq!(event.name, "ping");
}

#[tokio::test]
async fn event_await_times_out_when_the_event_never_arrives() {
    let wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![]);
    let (orch, _dir) = orchestrator(wf);

    let result = orch
        .event_await("never", BTreeMap::new(), Some(Duration::from_millis(50)))
        .await;
    assert!(result.is_err());
}

#[test]
fn session_id_set_then_get_round_trips() {
    let agent = Agent::new(AgentId::new("a1"), "tmux", "handle-1");
    let mut wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![]);
    wf.agents.insert("a1".to_string(), agent);
    let (orch, _dir) = orchestrator(wf);

    assert_eq!(orch.session_id_get(&AgentId::new("a1")), None);
    orch.session_id_set(&AgentId::new("a1"), "conv-123".to_string()).unwrap();
    assert_eq!(orch.session_id_get(&AgentId::new("a1")), Some("conv-123".to_string()));
}

#[test]
fn session_id_set_on_unknown_agent_errors() {
    let wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![]);
    let (orch, _dir) = orchestrator(wf);

    let err = orch.session_id_set(&AgentId::new("ghost"), "x".to_string()).unwrap_err();
    assert!(matches!(err, EngineError::UnknownAgent(_)));
}

#[test]
fn step_status_get_is_none_for_an_unknown_step() {
    let wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![]);
    let (orch, _dir) = orchestrator(wf);
    assert_eq!(orch.step_status_get(&StepId::new("ghost")), None);
}

#[tokio::test]
async fn run_settles_two_dependent_shell_steps_to_succeeded() {
    let a = shell_step("a", "true");
    let b = shell_step("b", "true").depends_on([StepId::new("a")]);
    let wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![a, b]);
    let (orch, _dir) = orchestrator(wf);

    let status = tokio::time::timeout(Duration::from_secs(10), Arc::clone(&orch).run())
        .await
        .expect("run did not settle in time")
        .unwrap();

    assert_eq!(status, WorkflowStatus::Succeeded);
    let snapshot = orch.workflow_snapshot();
    assert_eq!(snapshot.step(&StepId::new("a")).unwrap().status, StepStatus::Succeeded);
    assert_eq!(snapshot.step(&StepId::new("b")).unwrap().status, StepStatus::Succeeded);
}

#[tokio::test]
async fn run_fails_the_workflow_and_skips_dependents_when_a_step_fails() {
    let a = shell_step("a", "exit 1");
    let b = shell_step("b", "true").depends_on([StepId::new("a")]);
    let wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![a, b]);
    let (orch, _dir) = orchestrator(wf);

    let status = tokio::time::timeout(Duration::from_secs(10), Arc::clone(&orch).run())
        .await
        .expect("run did not settle in time")
        .unwrap();

    assert_eq!(status, WorkflowStatus::Failed);
    let snapshot = orch.workflow_snapshot();
    assert_eq!(snapshot.step(&StepId::new("a")).unwrap().status, StepStatus::Failed);
    assert_eq!(snapshot.step(&StepId::new("b")).unwrap().status, StepStatus::Skipped);
}

#[tokio::test]
async fn run_dispatches_an_agent_step_and_settles_after_step_done() {
    let step = Step::new(
        StepId::new("s1"),
        StepKind::Agent {
            agent_id: AgentId::new("a1"),
            prompt: "go".to_string(),
        },
    );
    let wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![step]);
    let (orch, _dir) = orchestrator(wf);

    let run_handle = tokio::spawn(Arc::clone(&orch).run());

    for _ in 0..200 {
        if orch.step_status_get(&StepId::new("s1")) == Some(StepStatus::Running) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(orch.step_status_get(&StepId::new("s1")), Some(StepStatus::Running));

    orch.step_done(&AgentId::new("a1"), Some(&StepId::new("s1")), BTreeMap::new(), None)
        .unwrap();

    let status = tokio::time::timeout(Duration::from_secs(5), run_handle)
        .await
        .expect("run did not settle in time")
        .expect("run task panicked")
        .unwrap();
    assert_eq!(status, WorkflowStatus::Succeeded);
}

#[tokio::test]
async fn run_settles_a_workflow_with_an_event_emit_and_event_await_pair() {
    let emitter = Step::new(
        StepId::new("emit"),
        StepKind::EventEmit {
            name: "ready".to_string(),
            data: BTreeMap::new(),
        },
    );
    let waiter = Step::new(
        StepId::new("wait"),
        StepKind::EventAwait {
            name: "ready".to_string(),
            predicate: BTreeMap::new(),
            timeout_ms: Some(5_000),
        },
    );
    let wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![emitter, waiter]);
    let (orch, _dir) = orchestrator(wf);

    let status = tokio::time::timeout(Duration::from_secs(10), Arc::clone(&orch).run())
        .await
        .expect("run did not settle in time")
        .unwrap();

    assert_eq!(status, WorkflowStatus::Succeeded);
    let snapshot = orch.workflow_snapshot();
    assert_eq!(snapshot.step(&StepId::new("wait")).unwrap().status, StepStatus::Succeeded);
}

#[tokio::test]
async fn run_fails_an_event_await_step_that_times_out() {
    let waiter = Step::new(
        StepId::new("wait"),
        StepKind::EventAwait {
            name: "never".to_string(),
            predicate: BTreeMap::new(),
            timeout_ms: Some(50),
        },
    );
    let wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![waiter]);
    let (orch, _dir) = orchestrator(wf);

    let status = tokio::time::timeout(Duration::from_secs(10), Arc::clone(&orch).run())
        .await
        .expect("run did not settle in time")
        .unwrap();

    assert_eq!(status, WorkflowStatus::Failed);
    let snapshot = orch.workflow_snapshot();
    assert_eq!(snapshot.step(&StepId::new("wait")).unwrap().status, StepStatus::Failed);
}

#[tokio::test]
async fn stop_runs_cleanup_on_stop_and_settles_to_stopped() {
    let marker = tempfile::NamedTempFile::new().unwrap();
    let marker_path = marker.path().to_path_buf();
    let cleanup = shell_step("cleanup_on_stop", &format!("echo done > {}", marker_path.display()));
    let wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![cleanup]);
    let (orch, _dir) = orchestrator(wf);

    orch.stop(Duration::from_secs(5)).await.unwrap();

    assert_eq!(orch.workflow_snapshot().status, WorkflowStatus::Stopped);
    assert!(!orch.workflow_snapshot().cleanup_phase);
    assert_eq!(std::fs::read_to_string(&marker_path).unwrap().trim(), "done");
}

#[tokio::test]
async fn stop_is_a_no_op_on_an_already_terminal_workflow() {
    let mut wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![]);
    wf.status = WorkflowStatus::Succeeded;
    let (orch, _dir) = orchestrator(wf);

    orch.stop(Duration::from_secs(5)).await.unwrap();
    assert_eq!(orch.workflow_snapshot().status, WorkflowStatus::Succeeded);
}
