use crate::container_management::mock_engine::{EngineCall, MockEngine};
use crate::container_management::{ContainerEngine, DockerCli, ExecId};
use std::time::Duration;

fn cmd(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

#[tokio::test]
async fn exec_creates_then_starts() {
    let engine = MockEngine::new();

    let output = engine
        .exec("abc123", &cmd(&["bash", "-c", "start-video"]))
        .await
        .expect("exec should succeed");

    assert!(output.success());
    assert_eq!(
        engine.calls(),
        vec![
            EngineCall::ExecCreate {
                container_id: "abc123".to_string(),
                command: cmd(&["bash", "-c", "start-video"]),
            },
            EngineCall::ExecStart {
                exec_id: ExecId("exec-0".to_string()),
            },
        ]
    );
}

#[tokio::test]
async fn exec_stops_at_create_failure() {
    let engine = MockEngine::new();
    *engine.fail_exec.lock().unwrap() = true;

    assert!(engine.exec("abc123", &cmd(&["true"])).await.is_err());
    assert_eq!(engine.calls().len(), 1);
}

#[tokio::test]
async fn non_zero_exit_is_reported_in_output() {
    let engine = MockEngine::new();
    *engine.exec_exit_code.lock().unwrap() = Some(3);

    let output = engine.exec("abc123", &cmd(&["false"])).await.unwrap();
    assert!(!output.success());
    assert_eq!(output.exit_code, Some(3));
}

fn is_docker_available() -> bool {
    DockerCli::is_runtime_available("docker")
        && std::process::Command::new("docker")
            .arg("info")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
}

#[tokio::test]
#[ignore = "requires a running docker daemon and the busybox image"]
async fn docker_cli_exec_copy_and_stop_end_to_end() {
    if !is_docker_available() {
        return;
    }

    let started = std::process::Command::new("docker")
        .args(["run", "-d", "--rm", "busybox:latest", "sh", "-c", "while :; do sleep 1; done"])
        .output()
        .expect("docker run");
    assert!(started.status.success(), "docker run failed");
    let container_id = String::from_utf8_lossy(&started.stdout).trim().to_string();

    let engine = DockerCli::new("docker").expect("docker available");

    let output = engine
        .exec(&container_id, &cmd(&["sh", "-c", "mkdir -p /videos && echo hi > /videos/a.mp4"]))
        .await
        .expect("exec");
    assert!(output.success());

    let stage = tempfile::tempdir().unwrap();
    engine
        .copy_from_container(&container_id, "/videos", stage.path())
        .await
        .expect("copy");
    assert!(stage.path().join("a.mp4").exists());

    engine
        .stop_container(&container_id, Duration::from_secs(2))
        .await
        .expect("stop");
}
