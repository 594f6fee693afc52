use super::*;
use serial_test::serial;

#[test]
#[serial]
fn meow_state_dir_takes_priority() {
    let tmp = tempfile::tempdir().unwrap();
    std::env::set_var(STATE_DIR_ENV, tmp.path());
    std::env::remove_var("XDG_STATE_HOME");

    let paths = Paths::resolve().unwrap();
    assert_eq!(paths.state_dir, tmp.path().join("meow"));

    std::env::remove_var(STATE_DIR_ENV);
}

#[test]
#[serial]
fn xdg_state_home_is_fallback() {
    std::env::remove_var(STATE_DIR_ENV);
    let tmp = tempfile::tempdir().unwrap();
    std::env::set_var("XDG_STATE_HOME", tmp.path());

    let paths = Paths::resolve().unwrap();
    assert_eq!(paths.state_dir, tmp.path().join("meow"));

    std::env::remove_var("XDG_STATE_HOME");
}

#[test]
fn derived_paths_are_scoped_under_state_dir() {
    let paths = Paths {
        state_dir: PathBuf::from("/tmp/meow-test"),
    };
    assert_eq!(
        paths.workflow_yaml("wf-1"),
        PathBuf::from("/tmp/meow-test/workflows/wf-1.yaml")
    );
    assert_eq!(
        paths.workflow_lock("wf-1"),
        PathBuf::from("/tmp/meow-test/workflows/wf-1.lock")
    );
    assert_eq!(
        paths.socket_path("wf-1"),
        PathBuf::from("/tmp/meow-test/run/wf-1.sock")
    );
}
