extern crate image;
extern crate mozjpeg;

use std::time::{Duration, Instant};

pub mod config;
pub mod errors;
pub mod listing;
pub mod provider;
pub mod provider_directory;
pub mod tensor;

pub(crate) struct Timer<F: Fn(Duration)> {
    start: Instant,
    f: F,
}

impl<F: Fn(Duration)> Timer<F> {
    pub(crate) fn new(f: F) -> Self {
        Self {
            start: Instant::now(),
            f,
        }
    }
}

impl<F: Fn(Duration)> Drop for Timer<F> {
    fn drop(&mut self) {
        (self.f)(self.start.elapsed())
    }
}
