//! Task queue and completion counter
//!
//! The queue is filled once before workers start and then closed, so a
//! worker that finds it empty knows there is no more work.

use crate::tasks::Task;
use crossbeam_channel::{bounded, Receiver};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Closed queue holding every task of a run
pub struct TaskQueue {
    receiver: Receiver<Task>,
}

impl TaskQueue {
    /// Create a queue holding `tasks`
    pub fn new(tasks: Vec<Task>) -> Self {
        let total = tasks.len();
        let (sender, receiver) = bounded(total.max(1));
        for task in tasks {
            // Capacity equals the task count and the receiver is alive
            let _ = sender.send(task);
        }
        drop(sender);

        Self { receiver }
    }

    /// Get a receiver for this queue (clone for each worker)
    pub fn receiver(&self) -> TaskQueueReceiver {
        TaskQueueReceiver {
            receiver: self.receiver.clone(),
        }
    }
}

/// Handle for taking tasks from the queue
#[derive(Clone)]
pub struct TaskQueueReceiver {
    receiver: Receiver<Task>,
}

impl TaskQueueReceiver {
    /// Take the next task, or `None` once the queue is drained
    pub fn next(&self) -> Option<Task> {
        self.receiver.try_recv().ok()
    }
}

/// Number of finished tasks, shared by workers and the progress reporter
#[derive(Debug)]
pub struct CompletionCounter {
    done: AtomicUsize,
    total: usize,
}

impl CompletionCounter {
    pub fn new(total: usize) -> Self {
        Self {
            done: AtomicUsize::new(0),
            total,
        }
    }

    /// Record one finished task (success or failure), returning the new count
    pub fn record(&self) -> usize {
        let done = self.done.fetch_add(1, Ordering::SeqCst) + 1;
        debug_assert!(done <= self.total, "more completions than tasks");
        done
    }

    pub fn completed(&self) -> usize {
        self.done.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.completed() >= self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn task(name: &str) -> Task {
        Task::new("sys.prmtop".into(), name.into(), format!("out/{name}").into())
    }

    #[test]
    fn test_queue_drains_in_order() {
        let queue = TaskQueue::new(vec![task("a.nc"), task("b.nc")]);

        let receiver = queue.receiver();
        assert_eq!(receiver.next().unwrap().trajectory(), std::path::Path::new("a.nc"));
        assert_eq!(receiver.next().unwrap().trajectory(), std::path::Path::new("b.nc"));
        assert!(receiver.next().is_none());
    }

    #[test]
    fn test_empty_queue() {
        let queue = TaskQueue::new(Vec::new());
        assert!(queue.receiver().next().is_none());
    }

    #[test]
    fn test_each_task_handed_out_once() {
        let tasks: Vec<Task> = (0..200).map(|i| task(&format!("t{i}.nc"))).collect();
        let queue = TaskQueue::new(tasks);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let receiver = queue.receiver();
                thread::spawn(move || {
                    let mut taken = 0;
                    while receiver.next().is_some() {
                        taken += 1;
                    }
                    taken
                })
            })
            .collect();

        let taken: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(taken, 200);
    }

    #[test]
    fn test_counter_counts_each_completion_once() {
        let counter = Arc::new(CompletionCounter::new(100));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    for _ in 0..25 {
                        counter.record();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(counter.completed(), 100);
        assert!(counter.is_finished());
    }

    #[test]
    fn test_counter_progress() {
        let counter = CompletionCounter::new(2);
        assert!(!counter.is_finished());
        assert_eq!(counter.record(), 1);
        assert!(!counter.is_finished());
        assert_eq!(counter.record(), 2);
        assert!(counter.is_finished());
    }
}
