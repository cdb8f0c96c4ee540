use std::sync::mpsc;
use std::time::Duration;

use crate::event::Event;

/// Background cadence for the traffic monitor: emits `MonitorTick`
/// into the controller queue every `interval` until the receiving side
/// goes away.
pub struct Monitor<C> {
    interval: Duration,
    handle: Option<std::thread::JoinHandle<()>>,
    tx: mpsc::Sender<Event<C>>,
}

impl<C: Send + 'static> Monitor<C> {
    pub fn new(interval: Duration, tx: mpsc::Sender<Event<C>>) -> Self {
        Monitor {
            interval,
            handle: None,
            tx,
        }
    }

    pub fn run(&mut self) {
        log::info!("starting traffic monitor, interval {:?}", self.interval);
        let tx = self.tx.clone();
        let interval = self.interval;
        self.handle = Some(std::thread::spawn(move || loop {
            std::thread::sleep(interval);
            if tx.send(Event::MonitorTick).is_err() {
                break;
            }
        }));
    }

    pub fn join(&mut self) -> std::thread::Result<()> {
        match self.handle.take() {
            Some(handle) => handle.join(),
            None => Ok(()),
        }
    }
}

/// Deferred fire-and-forget send. The send quietly fails if the
/// receiver is gone by the time the delay elapses.
pub fn send_after<C: Send + 'static>(tx: mpsc::Sender<Event<C>>, delay: Duration, event: Event<C>) {
    std::thread::spawn(move || {
        std::thread::sleep(delay);
        let _ = tx.send(event);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_arrive_and_stop_with_receiver() {
        let (tx, rx) = mpsc::channel::<Event<()>>();
        let mut monitor = Monitor::new(Duration::from_millis(5), tx);
        monitor.run();

        match rx.recv_timeout(Duration::from_secs(2)) {
            Ok(Event::MonitorTick) => {}
            other => panic!("expected a tick, got {:?}", other),
        }

        drop(rx);
        monitor.join().unwrap();
    }

    #[test]
    fn deferred_send_fires_once() {
        let (tx, rx) = mpsc::channel::<Event<()>>();
        send_after(tx, Duration::from_millis(5), Event::ProactiveDeadline);
        match rx.recv_timeout(Duration::from_secs(2)) {
            Ok(Event::ProactiveDeadline) => {}
            other => panic!("expected the deadline, got {:?}", other),
        }
    }
}
