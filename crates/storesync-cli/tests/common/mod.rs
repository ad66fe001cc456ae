use std::path::Path;
use std::process::{Command, Output};

/// Run the CLI binary with arguments in `dir`, with no inherited shop or
/// index credentials.
pub fn run_cli(args: &[&str], dir: &Path) -> Output {
    command(args, dir)
        .output()
        .expect("Failed to execute CLI")
}

/// Run the CLI and expect success.
pub fn run_cli_success(args: &[&str], dir: &Path) -> String {
    let output = run_cli(args, dir);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Build the CLI command without running it.
pub fn command(args: &[&str], dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_storesync"));
    cmd.args(args);
    cmd.current_dir(dir);
    cmd.env("NO_COLOR", "1");
    for var in [
        "SHOPIFY_GRAPHQL_URL",
        "SHOPIFY_ACCESS_TOKEN",
        "SHOPIFY_APP_SECRET",
        "OPENAI_API_KEY",
        "OPENAI_BASE_URL",
        "PINECONE_API_KEY",
        "PINECONE_CONTROL_URL",
        "PINECONE_CLOUD",
        "PINECONE_REGION",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}
