use std::process::Command;

fn command_output(program: &str, args: &[&str]) -> Option<String> {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
}

fn main() {
    let commit_sha =
        command_output("git", &["rev-parse", "--short", "HEAD"]).unwrap_or_else(|| "unknown".to_string());

    // "rustc 1.92.0 (..." -> "1.92.0"
    let rustc_version = command_output("rustc", &["--version"])
        .and_then(|s| {
            s.strip_prefix("rustc ")
                .and_then(|v| v.split_whitespace().next())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=VESPUCCI_COMMIT_SHA={}", commit_sha);
    println!("cargo:rustc-env=VESPUCCI_RUSTC_VERSION={}", rustc_version);

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-env-changed=VESPUCCI_COMMIT_SHA");
}
