mod app;
mod cli;
mod core;
mod logging;
mod widgets;

use app::App;
use cli::parse_args;
use crate::core::monitor::ConnectionMonitor;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = parse_args();

    if let Err(err) = logging::init(&settings) {
        eprintln!("Warning: logging disabled: {}", err);
    }
    settings.log_warnings();

    let mut monitor = ConnectionMonitor::new()
        .with_filter(settings.filter.clone())
        .with_sort(settings.sort);

    if settings.once {
        monitor.refresh();
        println!("{}", serde_json::to_string_pretty(&monitor.rows())?);
        return Ok(());
    }

    let mut terminal = ratatui::init();

    let app_result = App::new(monitor)
        .with_refresh_interval(settings.interval)
        .run(&mut terminal);

    ratatui::restore();

    app_result?;

    Ok(())
}
