/// Prints the desktop metrics and every attached monitor.
pub fn execute() {
    #[cfg(windows)]
    print_monitors();

    #[cfg(not(windows))]
    super::unsupported();
}

#[cfg(windows)]
fn print_monitors() {
    use winshift_core::MonitorTopology;
    use winshift_windows::{dpi, monitor};

    dpi::enable_dpi_awareness();

    let metrics = match monitor::metrics() {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    println!(
        "Primary:        {}x{}",
        metrics.primary_width, metrics.primary_height
    );
    println!(
        "Virtual screen: {}x{} at ({}, {})",
        metrics.virtual_width, metrics.virtual_height, metrics.virtual_left, metrics.virtual_top
    );
    println!("Monitors:       {}", metrics.monitor_count);

    if metrics.monitor_count != 2 {
        println!("\nNote: placement assumes exactly two side-by-side monitors.");
    }
    if metrics.virtual_left >= 0 && metrics.monitor_count > 1 {
        println!("Note: the secondary monitor is right of the primary one;");
        println!("      secondary windows are placed from the virtual left edge.");
    }

    let topology = MonitorTopology::from_metrics(&metrics);
    let monitors = match monitor::enumerate_monitors() {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    println!();
    for m in &monitors {
        let group = topology.locate(&m.bounds);
        println!(
            "{:<16} {}x{} at ({}, {})  work area {}x{}  {}{}",
            m.device,
            m.bounds.width(),
            m.bounds.height(),
            m.bounds.left,
            m.bounds.top,
            m.work_area.width(),
            m.work_area.height(),
            group,
            if m.is_primary { " (primary)" } else { "" }
        );
    }
}
