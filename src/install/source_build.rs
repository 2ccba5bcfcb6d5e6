//! From-source build of the ydotool input-injection helper.
//!
//! Used only when neither the repos nor an AUR helper can provide the tool.
//! The build happens in a uniquely named temporary directory that is removed
//! on every exit path, success or failure.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use super::error::InstallerError;

/// Pinned upstream repository for the injection helper.
pub const YDOTOOL_REPO: &str = "https://github.com/ReimuNotMoe/ydotool";

/// Minimal toolchain needed for the out-of-tree CMake build.
pub const BUILD_TOOLCHAIN: &[&str] = &["git", "cmake", "make", "gcc", "pkgconf", "scdoc"];

/// System-wide user-unit directory receiving the upstream service file.
const SYSTEM_USER_UNIT_DIR: &str = "/usr/lib/systemd/user";

/// Temp directory prefix, unique per process so overlapping runs cannot
/// collide.
pub fn build_dir_prefix() -> String {
    format!("hypr-ai-build-{}-", std::process::id())
}

fn run_checked(description: &str, cmd: &mut Command) -> Result<(), InstallerError> {
    let output = cmd
        .output()
        .map_err(|e| InstallerError::Command(format!("{description}: {e}")))?;
    if !output.status.success() {
        return Err(InstallerError::Command(format!(
            "{description} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        )));
    }
    Ok(())
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Clone, compile, and install ydotool, then install its upstream service
/// unit system-wide.
pub fn build_ydotool() -> Result<(), InstallerError> {
    let build_dir = tempfile::Builder::new()
        .prefix(&build_dir_prefix())
        .tempdir()
        .map_err(|e| InstallerError::System(format!("failed to create build directory: {e}")))?;

    // TempDir removes the directory on drop, so an early `?` return from any
    // sub-step still cleans up.
    let result = build_in(build_dir.path());

    if result.is_ok() {
        build_dir
            .close()
            .map_err(|e| InstallerError::System(format!("failed to remove build directory: {e}")))?;
    }
    result
}

fn build_in(build_dir: &Path) -> Result<(), InstallerError> {
    info!("building ydotool from source in {}", build_dir.display());

    run_checked(
        "pacman (build toolchain)",
        Command::new("sudo")
            .args(["pacman", "-S", "--noconfirm", "--needed"])
            .args(BUILD_TOOLCHAIN),
    )?;

    let src_dir = build_dir.join("ydotool");
    let pb = spinner("Cloning ydotool...");
    let clone = run_checked(
        "git clone",
        Command::new("git")
            .args(["clone", "--depth", "1", YDOTOOL_REPO])
            .arg(&src_dir),
    );
    pb.finish_and_clear();
    clone?;

    let out_dir = src_dir.join("build");
    let pb = spinner("Compiling ydotool...");
    let compile = run_checked(
        "cmake configure",
        Command::new("cmake")
            .current_dir(&src_dir)
            .args(["-B", "build", "-DCMAKE_BUILD_TYPE=Release"]),
    )
    .and_then(|()| {
        run_checked(
            "make",
            Command::new("make")
                .current_dir(&out_dir)
                .arg(format!("-j{}", num_cpus::get())),
        )
    });
    pb.finish_and_clear();
    compile?;

    run_checked(
        "make install",
        Command::new("sudo").args(["make", "install"]).current_dir(&out_dir),
    )?;

    // Upstream ships the companion service unit; put it where user sessions
    // can find it.
    let unit_src = out_dir.join("ydotool.service");
    run_checked(
        "install service unit",
        Command::new("sudo")
            .args(["install", "-Dm644"])
            .arg(&unit_src)
            .arg(format!("{SYSTEM_USER_UNIT_DIR}/ydotool.service")),
    )?;

    info!("ydotool built and installed from source");
    Ok(())
}
