use super::*;
use serial_test::serial;

fn clear_env() {
    std::env::remove_var(crate::env::ORCH_SOCK);
    std::env::remove_var(crate::env::WORKFLOW);
    std::env::remove_var(crate::env::AGENT);
}

#[tokio::test]
#[serial]
async fn exits_zero_silently_when_unmanaged() {
    clear_env();
    let code = run(DoneArgs { agent: None, step: None, outputs: vec![], output_json: None, notes: None }).await;
    assert_eq!(code, 0);
}

#[tokio::test]
#[serial]
async fn exits_nonzero_when_managed_but_no_agent_id() {
    clear_env();
    std::env::set_var(crate::env::WORKFLOW, "wf-1");
    let code = run(DoneArgs { agent: None, step: None, outputs: vec![], output_json: None, notes: None }).await;
    assert_eq!(code, 1);
    clear_env();
}

#[tokio::test]
#[serial]
async fn exits_nonzero_on_malformed_output_json() {
    clear_env();
    std::env::set_var(crate::env::WORKFLOW, "wf-1");
    let code = run(DoneArgs {
        agent: Some("a1".to_string()),
        step: None,
        outputs: vec![],
        output_json: Some("not json".to_string()),
        notes: None,
    })
    .await;
    assert_eq!(code, 1);
    clear_env();
}
