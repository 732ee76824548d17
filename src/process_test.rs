use super::*;

fn sh(script: &str) -> LaunchSpec {
    LaunchSpec {
        program: "sh".to_string(),
        args: vec!["-c".to_string(), script.to_string()],
        dir: PathBuf::from("/"),
    }
}

#[test]
fn test_default_spec_lists_root() {
    let spec = LaunchSpec::default();

    assert_eq!(spec.program, "ls");
    assert_eq!(spec.args, vec!["-l", "/"]);
    assert_eq!(spec.dir, PathBuf::from("/"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_launch_returns_zero_on_success() {
    assert_eq!(launch(&sh("exit 0")).await.unwrap(), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn test_launch_returns_child_exit_code() {
    assert_eq!(launch(&sh("exit 3")).await.unwrap(), 3);
}

#[cfg(unix)]
#[tokio::test]
async fn test_launch_runs_in_working_directory() {
    let dir = std::env::temp_dir();
    let spec = LaunchSpec {
        dir: dir.clone(),
        ..sh(&format!("test \"$(pwd -P)\" = \"{}\"", dir.canonicalize().unwrap().display()))
    };

    assert_eq!(launch(&spec).await.unwrap(), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn test_launch_signal_termination_reports_minus_one() {
    assert_eq!(launch(&sh("kill -9 $$")).await.unwrap(), -1);
}

#[tokio::test]
async fn test_launch_missing_program_fails_to_spawn() {
    let spec = LaunchSpec {
        program: "definitely-not-a-real-program-7f3a".to_string(),
        args: vec![],
        dir: PathBuf::from("/"),
    };

    match launch(&spec).await {
        Err(ProcessError::Spawn { program, .. }) => assert_eq!(program, spec.program),
        other => panic!("expected spawn error, got {:?}", other),
    }
}
