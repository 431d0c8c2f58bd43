pub mod init;
pub mod monitors;
pub mod run;
pub mod windows;

/// Exits with an error on platforms without a desktop backend.
#[cfg(not(windows))]
pub(crate) fn unsupported() -> ! {
    eprintln!("Error: winshift only runs on Windows.");
    std::process::exit(1);
}
