mod app;
mod config;
mod logging;
mod model;
mod services;
mod theme;
mod ui;
mod validation;
mod visuals;
mod widgets;

use anyhow::Result;

fn main() -> Result<()> {
    ui::run()
}
