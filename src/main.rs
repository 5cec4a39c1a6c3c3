use tracing_subscriber::EnvFilter;

mod ui;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    ui::run_gpui_panel();
}
