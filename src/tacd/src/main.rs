use std::sync::mpsc;
use std::time::Duration;

use anyhow::Result;
use structopt::StructOpt;

use tacd::argument::Opts;
use tacd::channel::LogChannel;
use tacd::config;
use tacd::controller::{Controller, ControllerCfg};
use tacd::monitor::Monitor;

fn main() -> Result<()> {
    logging::init_log();
    log::info!("starting tacd...");

    let opt = Opts::from_args();
    log::info!("Opts: {:#?}", opt);

    let registry = match &opt.hosts {
        Some(path) => config::read_hosts(path)?,
        None => Default::default(),
    };
    log::info!("{} known hosts registered", registry.hosts.len());

    let (tx, rx) = mpsc::channel();

    let mut monitor =
        Monitor::<LogChannel>::new(Duration::from_secs(opt.interval_secs), tx.clone());
    monitor.run();

    // the protocol frontend feeds discovery, lifecycle, telemetry, and
    // packet events through clones of `tx`; everything is handled on
    // this thread
    let mut controller = Controller::new(ControllerCfg::from_opts(&opt), registry.hosts, tx);
    controller.run(rx);

    if monitor.join().is_err() {
        log::error!("monitor thread panicked");
    }
    Ok(())
}
