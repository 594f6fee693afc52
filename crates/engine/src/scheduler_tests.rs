use super::*;
use meow_core::{Step, StepId, StepKind, WorkflowId};

fn shell_step(id: &str) -> Step {
    Step::new(StepId::new(id), StepKind::Shell { command: "true".to_string() })
}

#[test]
fn independent_pending_steps_are_all_ready() {
    let wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![shell_step("a"), shell_step("b")]);
    let ready = ready_steps(&wf);
    assert_eq!(
        ready,
        vec![
            Readiness::Ready(StepId::new("a")),
            Readiness::Ready(StepId::new("b")),
        ]
    );
}

#[test]
fn step_blocked_on_pending_dependency_is_not_ready() {
    let b = shell_step("b").depends_on([StepId::new("a")]);
    let wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![shell_step("a"), b]);
    let ready = ready_steps(&wf);
    assert_eq!(ready, vec![Readiness::Ready(StepId::new("a"))]);
}

#[test]
fn step_becomes_ready_once_its_dependency_succeeds() {
    let mut a = shell_step("a");
    a.mark_succeeded(Default::default(), 0);
    let b = shell_step("b").depends_on([StepId::new("a")]);
    let wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![a, b]);

    let ready = ready_steps(&wf);
    assert_eq!(ready, vec![Readiness::Ready(StepId::new("b"))]);
}

#[test]
fn all_succeeded_join_policy_skips_dependent_of_a_failed_step() {
    let mut a = shell_step("a");
    a.mark_failed(meow_core::StepError::ShellExit { code: 1, stderr: String::new() }, 0);
    let b = shell_step("b").depends_on([StepId::new("a")]);
    let wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![a, b]);

    let ready = ready_steps(&wf);
    assert_eq!(ready, vec![Readiness::Skipped(StepId::new("b"))]);
}

#[test]
fn any_terminal_join_policy_runs_regardless_of_dependency_outcome() {
    let mut a = shell_step("a");
    a.mark_failed(meow_core::StepError::ShellExit { code: 1, stderr: String::new() }, 0);
    let mut b = shell_step("b").depends_on([StepId::new("a")]);
    b.join_policy = JoinPolicy::AnyTerminal;
    let wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![a, b]);

    let ready = ready_steps(&wf);
    assert_eq!(ready, vec![Readiness::Ready(StepId::new("b"))]);
}

#[test]
fn ready_order_follows_declaration_order() {
    let b = shell_step("b");
    let a = shell_step("a");
    let wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![b, a]);
    let ready = ready_steps(&wf);
    assert_eq!(
        ready,
        vec![Readiness::Ready(StepId::new("b")), Readiness::Ready(StepId::new("a"))]
    );
}

#[test]
fn all_terminal_is_false_until_every_step_finishes() {
    let mut a = shell_step("a");
    a.mark_succeeded(Default::default(), 0);
    let wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![a, shell_step("b")]);
    assert!(!all_terminal(&wf));
}

#[test]
fn has_unrecovered_failure_detects_failed_steps() {
    let mut a = shell_step("a");
    a.mark_failed(meow_core::StepError::ShellExit { code: 1, stderr: String::new() }, 0);
    let wf = Workflow::new(WorkflowId::new("wf"), "tmux", vec![a]);
    assert!(has_unrecovered_failure(&wf));
}
