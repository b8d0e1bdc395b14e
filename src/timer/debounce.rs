use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

enum Command<T> {
    Schedule(T),
    Flush(Sender<()>),
    Shutdown,
}

/// Collapses bursts of values into one write after a quiet period.
///
/// Each scheduled value replaces the pending one and restarts the quiet
/// period. Writes run on a background thread.
pub struct Debouncer<T> {
    tx: Mutex<Option<Sender<Command<T>>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    running: Arc<AtomicBool>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn spawn<F>(quiet: Duration, write: F) -> Self
    where
        F: Fn(T) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<Command<T>>();
        let running = Arc::new(AtomicBool::new(true));
        let worker_running = Arc::clone(&running);

        let handle = thread::spawn(move || {
            let mut pending: Option<T> = None;
            loop {
                let next = if pending.is_some() {
                    rx.recv_timeout(quiet)
                } else {
                    rx.recv().map_err(|_| RecvTimeoutError::Disconnected)
                };
                match next {
                    Ok(Command::Schedule(value)) => pending = Some(value),
                    Ok(Command::Flush(ack)) => {
                        if let Some(value) = pending.take() {
                            write(value);
                        }
                        let _ = ack.send(());
                    }
                    Err(RecvTimeoutError::Timeout) => {
                        if let Some(value) = pending.take() {
                            write(value);
                        }
                    }
                    Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => {
                        if let Some(value) = pending.take() {
                            write(value);
                        }
                        break;
                    }
                }
            }
            worker_running.store(false, Ordering::SeqCst);
        });

        Self {
            tx: Mutex::new(Some(tx)),
            handle: Mutex::new(Some(handle)),
            running,
        }
    }

    fn send(&self, command: Command<T>) -> bool {
        crate::safe_lock(&self.tx, "Debouncer")
            .as_ref()
            .is_some_and(|tx| tx.send(command).is_ok())
    }

    pub fn schedule(&self, value: T) {
        if !self.send(Command::Schedule(value)) {
            log::warn!("Debounced write dropped: writer already stopped");
        }
    }

    /// Write the pending value now and wait for it.
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = mpsc::channel();
        if self.send(Command::Flush(ack_tx)) {
            let _ = ack_rx.recv();
        }
    }

    /// Write the pending value and stop the writer thread. Idempotent.
    pub fn shutdown(&self) {
        self.send(Command::Shutdown);
        crate::safe_lock(&self.tx, "Debouncer").take();
        let handle = crate::safe_lock(&self.handle, "Debouncer").take();
        if let Some(handle) = handle {
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                log::error!("Debounced writer thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        let tx = crate::safe_lock(&self.tx, "Debouncer").take();
        if let Some(tx) = tx {
            let _ = tx.send(Command::Shutdown);
        }
        let handle = crate::safe_lock(&self.handle, "Debouncer").take();
        if let Some(handle) = handle {
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn recorder() -> (Arc<Mutex<Vec<u32>>>, impl Fn(u32) + Send + 'static) {
        let written = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&written);
        (written, move |v| sink.lock().unwrap().push(v))
    }

    #[test]
    fn test_burst_collapses_to_last_value() {
        let (written, write) = recorder();
        let debouncer = Debouncer::spawn(Duration::from_millis(50), write);
        for v in 1..=5 {
            debouncer.schedule(v);
        }

        let deadline = Instant::now() + Duration::from_secs(5);
        while written.lock().unwrap().is_empty() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        thread::sleep(Duration::from_millis(100));
        assert_eq!(*written.lock().unwrap(), vec![5]);
    }

    #[test]
    fn test_flush_writes_immediately() {
        let (written, write) = recorder();
        let debouncer = Debouncer::spawn(Duration::from_secs(60), write);
        debouncer.schedule(7);
        debouncer.flush();
        assert_eq!(*written.lock().unwrap(), vec![7]);

        debouncer.flush();
        assert_eq!(written.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_shutdown_flushes_and_stops() {
        let (written, write) = recorder();
        let debouncer = Debouncer::spawn(Duration::from_secs(60), write);
        assert!(debouncer.is_running());
        debouncer.schedule(3);
        debouncer.shutdown();

        assert_eq!(*written.lock().unwrap(), vec![3]);
        assert!(!debouncer.is_running());
        debouncer.schedule(4);
        debouncer.shutdown();
        assert_eq!(*written.lock().unwrap(), vec![3]);
    }

    #[test]
    fn test_drop_flushes_pending() {
        let (written, write) = recorder();
        {
            let debouncer = Debouncer::spawn(Duration::from_secs(60), write);
            debouncer.schedule(9);
        }
        assert_eq!(*written.lock().unwrap(), vec![9]);
    }
}
