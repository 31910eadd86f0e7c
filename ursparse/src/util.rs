use std::fs::File;
use std::os::fd::AsFd;

/// Standard input as a `File`, so it can be seeked and queried for holes.
pub fn stdin_file() -> std::io::Result<File> {
    let fd = std::io::stdin().as_fd().try_clone_to_owned()?;
    Ok(File::from(fd))
}

/// Standard output as a `File`, bypassing the line buffer of `Stdout`.
pub fn stdout_file() -> std::io::Result<File> {
    let fd = std::io::stdout().as_fd().try_clone_to_owned()?;
    Ok(File::from(fd))
}

/// Format file size in human-readable form
pub fn format_size(bytes: u64) -> String {
    use humansize::{FormatSize, BINARY};
    bytes.format_size(BINARY)
}
