use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Delay timer that counts down on its own thread at a fixed rate (60Hz by
/// default) until it reaches 0. The counter is the only thing shared with the
/// thread, and every access goes through the mutex.
pub struct DelayTimer {
    value: Arc<Mutex<u8>>,
    running: Arc<AtomicBool>,
    ticker: Option<JoinHandle<()>>,
}

impl DelayTimer {
    pub fn new(hz: u32) -> Self {
        let value = Arc::new(Mutex::new(0u8));
        let running = Arc::new(AtomicBool::new(true));
        let period = Duration::from_secs(1) / hz.max(1);

        let ticker = {
            let value = Arc::clone(&value);
            let running = Arc::clone(&running);
            thread::spawn(move || {
                // schedule against deadlines so time spent waiting on the lock doesn't add up
                let mut next = Instant::now() + period;
                while running.load(Ordering::Acquire) {
                    let now = Instant::now();
                    if now < next {
                        thread::sleep(next - now);
                    }
                    next += period;
                    let mut v = value.lock().unwrap_or_else(PoisonError::into_inner);
                    if *v > 0 {
                        *v -= 1;
                    }
                }
            })
        };

        Self {
            value,
            running,
            ticker: Some(ticker),
        }
    }

    pub fn get(&self) -> u8 {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self, n: u8) {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = n;
    }

    /// stop the ticking thread; the value freezes where it is
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(ticker) = self.ticker.take() {
            if ticker.join().is_err() {
                log::warn!("delay timer thread panicked");
            }
        }
    }
}

impl Drop for DelayTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
