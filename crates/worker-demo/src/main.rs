use worker_demo::{DriverConfig, driver};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    let config = DriverConfig::default();
    log::debug!("{config:?}");

    let mut stdout = std::io::stdout();
    match driver::run(&config, &mut stdout).await {
        Ok(outcome) => log::debug!("finished: {outcome:?}"),
        Err(err) => {
            log::debug!("request failed: {err:?}");
            if let Err(e) = driver::report(&err, &mut stdout) {
                log::error!("could not print failure: {e}");
            }
        }
    }
}
