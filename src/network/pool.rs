//! Session worker pool
//!
//! A fixed set of worker threads fed through a bounded crossbeam channel.
//! Submitting blocks while the queue is full, which is what throttles the
//! accept loop under load.

use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};

use crate::error::{Result, ShiftError};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed-size thread pool with a bounded job queue
pub struct WorkerPool {
    /// Job queue sender (None once shutting down)
    sender: Option<Sender<Job>>,

    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `workers` threads sharing a queue of `queue_capacity` pending jobs
    pub fn new(workers: usize, queue_capacity: usize) -> Result<Self> {
        if workers == 0 {
            return Err(ShiftError::Config("worker pool needs at least one thread".to_string()));
        }

        let (sender, receiver) = channel::bounded::<Job>(queue_capacity);
        let mut handles = Vec::with_capacity(workers);

        for id in 0..workers {
            let receiver = receiver.clone();
            let handle = thread::Builder::new()
                .name(format!("session-{}", id))
                .spawn(move || worker_loop(id, receiver))?;
            handles.push(handle);
        }

        Ok(Self {
            sender: Some(sender),
            workers: handles,
        })
    }

    /// Queue a job, blocking while the queue is full
    pub fn execute<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| ShiftError::Config("worker pool is shut down".to_string()))?;

        sender
            .send(Box::new(job))
            .map_err(|_| ShiftError::Config("all session workers have exited".to_string()))
    }

    /// Number of worker threads
    pub fn size(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // Closing the channel lets every worker drain the queue and exit.
        drop(self.sender.take());
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

fn worker_loop(id: usize, receiver: Receiver<Job>) {
    for job in receiver.iter() {
        // A panicking session must not take its worker down with it.
        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            tracing::error!("Session panicked on worker {}", id);
        }
    }
    tracing::trace!("Worker {} exiting", id);
}
