use super::*;

#[test]
fn new_agent_starts_in_starting_state() {
    let agent = Agent::new(AgentId::new("a1"), "tmux", "meow-a1");
    assert_eq!(agent.status, AgentStatus::Starting);
    assert!(!agent.is_busy());
}

#[test]
fn dispatch_marks_busy_and_records_step() {
    let mut agent = Agent::new(AgentId::new("a1"), "tmux", "meow-a1");
    agent.status = AgentStatus::Ready;
    agent.dispatch("step-1").unwrap();
    assert!(agent.is_busy());
    assert_eq!(agent.current_step.as_deref(), Some("step-1"));
}

#[test]
fn dispatch_while_busy_is_rejected() {
    let mut agent = Agent::new(AgentId::new("a1"), "tmux", "meow-a1");
    agent.status = AgentStatus::Ready;
    agent.dispatch("step-1").unwrap();
    let err = agent.dispatch("step-2").unwrap_err();
    assert_eq!(err.current_step.as_deref(), Some("step-1"));
}

#[test]
fn complete_dispatch_returns_to_ready() {
    let mut agent = Agent::new(AgentId::new("a1"), "tmux", "meow-a1");
    agent.status = AgentStatus::Ready;
    agent.dispatch("step-1").unwrap();
    agent.complete_dispatch();
    assert_eq!(agent.status, AgentStatus::Ready);
    assert!(agent.current_step.is_none());
}
