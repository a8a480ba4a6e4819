// src/main.rs
use blunderdb::app::App;
use blunderdb::config::ShellConfig;
use blunderdb::core::renderer::backend::SelectedPresenter;
use blunderdb::error;

fn main() -> error::Result<()> {
    env_logger::init();

    App::<SelectedPresenter>::run(ShellConfig::default())
}
