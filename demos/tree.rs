#[macro_use]
extern crate log;

use std::path::Path;

use sharefs_smb::engine::MemoryEngine;
use sharefs_smb::{ShareClient, ShareCredentials, ShareOptions};

fn main() -> anyhow::Result<()> {
    assert!(env_logger::builder().try_init().is_ok());

    let mut client = init_client();

    info!("connecting to server...");
    client.connect()?;
    info!("client connected");

    println!("smb://localhost/temp");
    tree(&mut client, Path::new("/"), 1)?;

    info!("disconnecting client...");
    client.disconnect();
    info!("client disconnected");

    Ok(())
}

fn init_client() -> ShareClient {
    info!("initializing client for server localhost and share temp");
    let engine = MemoryEngine::new("localhost", "temp")
        .credentials("test", "test")
        .dir("projects/sharefs")
        .file("projects/sharefs/Cargo.toml", b"[package]\n")
        .file("projects/notes.txt", b"remember the milk\n")
        .file("readme.txt", b"welcome\n");

    ShareClient::new(
        ShareCredentials::new("localhost", "temp")
            .username("test")
            .password("test")
            .workgroup("WORKGROUP"),
        ShareOptions::default(),
        engine,
    )
}

fn tree(client: &mut ShareClient, path: &Path, depth: usize) -> anyhow::Result<()> {
    for entry in client.dir(path)? {
        println!("{}{}", "  ".repeat(depth), entry.name());
        if client.stat(entry.path())?.is_dir() {
            tree(client, entry.path(), depth + 1)?;
        }
    }
    Ok(())
}
