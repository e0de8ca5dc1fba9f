use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-env-changed=PROMPT_DIRECTORY_ROOT_HINT");

    let Some(raw_hint) = env::var("PROMPT_DIRECTORY_ROOT_HINT")
        .ok()
        .filter(|hint| !hint.trim().is_empty())
    else {
        return;
    };

    let candidate = PathBuf::from(raw_hint);
    let canonical = candidate.canonicalize().unwrap_or(candidate);

    println!(
        "cargo:rustc-env=PROMPT_DIRECTORY_ROOT_HINT={}",
        canonical.display()
    );
}
