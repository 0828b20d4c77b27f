use std::env::var;
use std::path::Path;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    let in_docker = var("IN_DOCKER").is_ok();

    let commit_hash = if Path::new("./.git").exists() {
        match Command::new("git").arg("rev-parse").arg("--short").arg("HEAD").output() {
            Ok(output) if output.status.success() => {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            }
            Ok(output) => {
                println!("cargo::warning=build.rs: git rev-parse failed: {output:#?}");
                String::from("unknown")
            }
            Err(e) => {
                println!("cargo::warning=build.rs: failed to run git: {e}");
                String::from("unknown")
            }
        }
    } else if !in_docker {
        println!("cargo::warning=build.rs: No .git directory found, skipping git versioning");
        String::from("unknown")
    } else {
        String::new()
    };

    // set by GitHub Actions
    let env_suffix = match var("GITHUB_RUN_ID") {
        Ok(id) => format!("(actions/runs/{id})"),
        Err(_) if in_docker => "(Docker)".to_string(),
        Err(_) => "(Local)".to_string(),
    };

    println!(
        "cargo:rustc-env=VERSION={}({} Profile)-{commit_hash}{env_suffix}",
        var("CARGO_PKG_VERSION").unwrap_or_default(),
        var("PROFILE").unwrap_or_default(),
    );
}
