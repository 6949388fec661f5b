use anyhow::Result;

use bothy::{BothyApp, ViewerConfig};

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let mut config = ViewerConfig::default();
    if let Some(path) = args.next() {
        config.environment_path = path.into();
    }
    if let Some(path) = args.next() {
        config.model_path = path.into();
    }

    log::info!(
        "starting viewer: environment {}, model {}",
        config.environment_path.display(),
        config.model_path.display()
    );

    let app = pollster::block_on(BothyApp::new(config));
    app.run();

    Ok(())
}
