use super::*;
use serial_test::serial;

#[tokio::test]
#[serial]
async fn exits_zero_silently_when_unmanaged() {
    std::env::remove_var(crate::env::ORCH_SOCK);
    std::env::remove_var(crate::env::WORKFLOW);
    let code = run(EventArgs { name: "ready".to_string(), data: vec![] }).await;
    assert_eq!(code, 0);
}
