fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = pendulum_clock::run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}
