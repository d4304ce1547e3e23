//! Tests du pipeline de transcodage (processus réels, outils POSIX)

use std::path::Path;
use std::time::Duration;

use futures::StreamExt;

use muzpipe::{FfmpegSpawner, PipelineSpawner};
use muztool::ToolCommand;

/// Vrai si le processus existe encore et n'est pas un zombie
fn process_is_running(pid: u32) -> bool {
    let stat = match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
        Ok(stat) => stat,
        Err(_) => return false,
    };
    // Troisième champ après la parenthèse fermante : l'état
    match stat.rsplit(')').next().and_then(|rest| rest.split_whitespace().next()) {
        Some(state) => state != "Z",
        None => false,
    }
}

#[tokio::test]
async fn test_stream_yields_child_stdout() {
    let spawner = FfmpegSpawner;
    let cmd = ToolCommand::new("echo").arg("pcm-bytes");

    let mut stream = spawner.open(&cmd).await.unwrap();

    let mut collected = Vec::new();
    while let Some(chunk) = stream.next().await {
        collected.extend_from_slice(&chunk.unwrap());
    }
    assert_eq!(collected, b"pcm-bytes\n");
}

#[tokio::test]
async fn test_drop_kills_transcoder() {
    let spawner = FfmpegSpawner;
    // Processus qui ne se terminerait pas seul avant longtemps
    let cmd = ToolCommand::new("sleep").arg("30");

    let stream = spawner.spawn_stream(&cmd).unwrap();
    let pid = stream.pid().expect("child should be running");
    assert!(process_is_running(pid));

    drop(stream);

    // La mort de l'enfant est bornée dans le temps
    let deadline = std::time::Instant::now() + Duration::from_secs(2);
    while process_is_running(pid) {
        assert!(
            std::time::Instant::now() < deadline,
            "transcoder still alive after drop"
        );
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

#[tokio::test]
async fn test_missing_binary_is_spawn_error() {
    let spawner = FfmpegSpawner;
    let cmd = ToolCommand::new("definitely-not-a-real-binary-xyz").arg("-i");

    let err = spawner.open(&cmd).await.err().unwrap();
    assert!(matches!(err, muzpipe::Error::Spawn { .. }));
}

#[tokio::test]
async fn test_stream_ends_when_child_exits() {
    let spawner = FfmpegSpawner;
    let cmd = ToolCommand::new("true");

    let mut stream = spawner.open(&cmd).await.unwrap();
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_large_output_streams_in_chunks() {
    let spawner = FfmpegSpawner;
    // 1 MiB de zéros, bien au-delà d'un seul chunk de lecture
    let cmd = ToolCommand::new("head")
        .arg("-c")
        .arg("1048576")
        .arg("/dev/zero");

    let mut stream = spawner.open(&cmd).await.unwrap();
    let mut total = 0usize;
    let mut chunks = 0usize;
    while let Some(chunk) = stream.next().await {
        total += chunk.unwrap().len();
        chunks += 1;
    }
    assert_eq!(total, 1048576);
    assert!(chunks > 1);
}

#[tokio::test]
async fn test_proc_probe_helper_sees_this_process() {
    // Garde-fou du helper lui-même
    assert!(process_is_running(std::process::id()));
    assert!(!Path::new("/proc/999999999").exists());
}
