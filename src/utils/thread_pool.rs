//! A fixed-size worker pool executing nullary jobs in FIFO order.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce() + Send + 'static>;

enum Message {
    Run(Job),
    Terminate,
}

// Tracks jobs that have been queued but not yet finished executing.
//
// The count is bumped at queue time rather than at dequeue time: this closes
// the window where the channel looks empty while the last job is still
// running, which would let a waiter observe a false idle state.
struct JobCounter {
    pending: Mutex<usize>,
    idle: Condvar,
}

impl JobCounter {
    fn add_one(&self) {
        *self.pending.lock().unwrap() += 1;
    }

    fn finish_one(&self) {
        let mut pending = self.pending.lock().unwrap();
        *pending -= 1;
        if *pending == 0 {
            self.idle.notify_all();
        }
    }

    fn is_busy(&self) -> bool {
        *self.pending.lock().unwrap() > 0
    }

    fn wait_idle(&self) {
        let mut pending = self.pending.lock().unwrap();
        while *pending > 0 {
            pending = self.idle.wait(pending).unwrap();
        }
    }
}

struct PoolInner {
    sender: Sender<Message>,
    receiver: Receiver<Message>,
    counter: Arc<JobCounter>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    num_threads: usize,
}

impl PoolInner {
    fn shutdown(&self) {
        let mut workers = self.workers.lock().unwrap();
        for _ in workers.iter() {
            let _ = self.sender.send(Message::Terminate);
        }
        for handle in workers.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for PoolInner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// A fixed-size pool of worker threads sharing a single FIFO job queue.
///
/// Jobs are nullary closures and may themselves queue further jobs, which
/// is what [`crate::partitioning::StaticBvh`] relies on for its recursive
/// parallel subdivision. Cloning the pool yields another cheap handle to
/// the same workers, so a host can own one pool and share it across builds.
///
/// Workers are joined when the last handle is dropped, or eagerly with
/// [`ThreadPool::clear`].
#[derive(Clone)]
pub struct ThreadPool {
    inner: Arc<PoolInner>,
}

impl ThreadPool {
    /// Creates a pool with `num_threads` workers; the workers are not
    /// spawned until [`ThreadPool::start`] is called.
    ///
    /// `num_threads == 0` selects the available hardware parallelism.
    pub fn new(num_threads: usize) -> Self {
        let num_threads = if num_threads == 0 {
            thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
        } else {
            num_threads
        };

        let (sender, receiver) = unbounded();

        Self {
            inner: Arc::new(PoolInner {
                sender,
                receiver,
                counter: Arc::new(JobCounter {
                    pending: Mutex::new(0),
                    idle: Condvar::new(),
                }),
                workers: Mutex::new(Vec::new()),
                num_threads,
            }),
        }
    }

    /// Spawns the worker threads. Calling this on an already-started pool
    /// is a no-op.
    pub fn start(&self) {
        let mut workers = self.inner.workers.lock().unwrap();
        if !workers.is_empty() {
            return;
        }

        for _ in 0..self.inner.num_threads {
            let receiver = self.inner.receiver.clone();
            let counter = Arc::clone(&self.inner.counter);
            workers.push(thread::spawn(move || worker_loop(receiver, counter)));
        }
    }

    /// Enqueues a job; an idle worker wakes up and executes it.
    pub fn queue<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner.counter.add_one();
        self.inner
            .sender
            .send(Message::Run(Box::new(job)))
            .expect("thread pool job channel closed");
    }

    /// Returns `true` while any queued job has not finished executing.
    pub fn busy(&self) -> bool {
        self.inner.counter.is_busy()
    }

    /// Blocks until every queued job has finished executing.
    pub fn wait_idle(&self) {
        self.inner.counter.wait_idle();
    }

    /// Asks all workers to shut down and joins them.
    ///
    /// Pending jobs still in the queue are executed first; callers that
    /// need the queue drained before returning use [`ThreadPool::wait_idle`].
    pub fn clear(&self) {
        self.inner.shutdown();
    }
}

fn worker_loop(receiver: Receiver<Message>, counter: Arc<JobCounter>) {
    while let Ok(message) = receiver.recv() {
        match message {
            Message::Run(job) => {
                job();
                counter.finish_one();
            }
            Message::Terminate => break,
        }
    }
}
