use {
    crate::definitions::timer,
    parking_lot::Mutex,
    std::{
        sync::{
            mpsc::{self, RecvTimeoutError, SyncSender},
            Arc,
        },
        thread::{self, JoinHandle},
        time::{Duration, Instant},
    },
};

/// Represents a timer register inside of the chip
/// infrastruture, it will count down to zero from
/// what ever number given at 60Hz.
///
/// The handle is cheap to clone, all clones share the
/// same value. This way the clock thread and the executor
/// can both own one.
#[derive(Debug, Clone, Default)]
pub struct TimerRegister {
    value: Arc<Mutex<u8>>,
}

impl TimerRegister {
    /// Will create a new timer register with the given value.
    pub fn new(value: u8) -> Self {
        Self {
            value: Arc::new(Mutex::new(value)),
        }
    }

    /// Will get the value that the counter is currently at.
    pub fn get_value(&self) -> u8 {
        *self.value.lock()
    }

    /// Will set the value from which the timer shall count down from.
    pub fn set_value(&self, value: u8) {
        *self.value.lock() = value;
    }

    /// Decrements the value by one unless it is already zero, returns the new value.
    ///
    /// # Example
    /// ```rust
    /// # use chip::timer::TimerRegister;
    /// let timer = TimerRegister::new(1);
    /// assert_eq!(timer.decrement_if_positive(), 0);
    /// assert_eq!(timer.decrement_if_positive(), 0);
    /// ```
    pub fn decrement_if_positive(&self) -> u8 {
        let mut value = self.value.lock();
        *value = value.saturating_sub(1);
        *value
    }
}

/// Abstracts the thread that runs a callback on a fixed interval,
/// so that the clock can be driven by something else during testing.
pub trait TimedWorker {
    fn new() -> Self;
    fn start<T>(&mut self, callback: T, interval: Duration)
    where
        T: Send + FnMut() + 'static;
    fn stop(&mut self);
    fn is_alive(&self) -> bool;
}

/// Is the internal worker, that exists on the
/// second thread.
pub struct Worker {
    /// Contains the actuall thread, that is running.
    thread: Option<JoinHandle<()>>,
    /// Contains the sync sender used to gracefull shutdown the thread.
    shutdown: Option<SyncSender<()>>,
    /// Counts the actuall threads used (this is never more then 2, but
    /// is simple to use.) It uses an ```()``` so that it doesn't use
    /// up too much memory.
    alive: Arc<()>,
}

impl TimedWorker for Worker {
    /// Will initialize the new worker.
    fn new() -> Self {
        Self {
            thread: None,
            shutdown: None,
            alive: Arc::new(()),
        }
    }

    /// Will start the worker that will run the callback function
    /// every interval.
    /// Attention the timer assumes the callback will finish
    /// calculation faster then the interval.
    fn start<T>(&mut self, mut callback: T, interval: Duration)
    where
        T: Send + FnMut() + 'static,
    {
        // only one thread per worker
        self.stop();

        let (send, recv) = mpsc::sync_channel::<()>(1);
        let alive = self.alive.clone();
        let thread = thread::spawn(move || {
            // this is to count the references, as it will not actually
            // be used ```_``` is used in front of the name.
            let _alive = alive;
            let mut timeout = interval;
            loop {
                match recv.recv_timeout(timeout) {
                    Err(RecvTimeoutError::Timeout) => {
                        let start = Instant::now();

                        callback();

                        // make sure there the system will at most wait the interval
                        timeout = interval.saturating_sub(start.elapsed());
                    }
                    Ok(_) | Err(_) => break, // shutdown
                }
            }
        });

        self.thread = Some(thread);
        self.shutdown = Some(send);
    }

    /// Will stop the worker and wait for the thread to finish.
    fn stop(&mut self) {
        // Will stop the worker, in two steps one by sending an empty message
        // and second by droping the only sender for the given receiver.
        if let Some(sender) = self.shutdown.take() {
            // the thread may already be gone, droping the sender is enough then
            let _ = sender.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("The timer worker thread panicked.");
            }
        }
    }

    /// Checks if the thread is alive.
    fn is_alive(&self) -> bool {
        Arc::strong_count(&self.alive) > 1
    }
}

impl Drop for Worker {
    /// Will drop the worker
    fn drop(&mut self) {
        self.stop();
    }
}

/// Decrements all the given registers once.
pub fn tick(registers: &[TimerRegister]) {
    for register in registers {
        register.decrement_if_positive();
    }
}

/// The timer subsystem, it will tick all its registers
/// on its own thread, independent of the cpu speed.
/// Dropping the clock stops and joins the thread.
pub struct Clock<W: TimedWorker> {
    worker: W,
}

impl<W: TimedWorker> Clock<W> {
    /// Starts a clock running at the 60Hz the chip requires.
    pub fn start(registers: Vec<TimerRegister>) -> Self {
        Self::with_interval(registers, Duration::from_micros(timer::INTERVAL))
    }

    /// Starts a clock with a custom tick interval.
    pub fn with_interval(registers: Vec<TimerRegister>, interval: Duration) -> Self {
        let mut worker = W::new();
        worker.start(move || tick(&registers), interval);
        log::debug!("timer clock started with an interval of {:?}", interval);
        Self { worker }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_alive()
    }

    /// Stops the clock, the registers keep their current value.
    pub fn stop(&mut self) {
        self.worker.stop();
    }
}
