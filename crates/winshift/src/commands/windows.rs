/// Lists every window a pass would consider, without moving anything.
pub fn execute() {
    #[cfg(windows)]
    list_windows();

    #[cfg(not(windows))]
    super::unsupported();
}

#[cfg(windows)]
fn list_windows() {
    use winshift_core::classify::classify;
    use winshift_core::platform::{MonitorQuery, WindowEnumerator};
    use winshift_core::{MonitorTopology, config};
    use winshift_windows::{Desktop, dpi};

    dpi::enable_dpi_awareness();

    let config = config::load();
    let desktop = Desktop;

    let topology = match desktop.monitor_metrics() {
        Ok(m) => MonitorTopology::from_metrics(&m),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let windows = match desktop.enumerate_windows() {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    println!(
        "{:<12} {:<10} {:<10} {:<12} TITLE",
        "HWND", "CURRENT", "TARGET", "PATTERN"
    );
    let mut to_move = 0;
    for window in &windows {
        let current = topology.locate(&window.rect);
        let target = classify(window, &config);
        if current != target.group {
            to_move += 1;
        }
        println!(
            "{:<12} {:<10} {:<10} {:<12} {}",
            format!("0x{:X}", window.handle.0),
            current.to_string(),
            target.group.to_string(),
            target.pattern.as_deref().unwrap_or("-"),
            window.title
        );
    }

    println!("\n{} windows found, {to_move} would move", windows.len());
}
