//! Dedicated worker thread that runs batches off the caller's thread.

use super::{process_batch, CancellationToken};
use crate::core::optimizer::{OptimizeOptions, OptimizeResult, Optimizer};
use crate::core::validation::Candidate;
use crate::error::ProcessError;
use crate::events::{Event, EventSender, ProcessEvent};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use uuid::Uuid;

type BatchResult = Result<Vec<OptimizeResult>, ProcessError>;

/// One queued batch and the channel its result goes back on
struct Request {
    batch_id: Uuid,
    files: Vec<Candidate>,
    options: OptimizeOptions,
    events: EventSender,
    cancel: CancellationToken,
    reply: Sender<BatchResult>,
}

/// Owns the worker thread. Batches queue up and run one at a time.
///
/// Dropping the coordinator finishes the queued batches, then joins the worker.
pub struct Coordinator {
    requests: Option<Sender<Request>>,
    worker: Option<JoinHandle<()>>,
}

impl Coordinator {
    /// Start the worker thread
    pub fn spawn(optimizer: Optimizer) -> Result<Self, ProcessError> {
        let (requests, queue) = unbounded::<Request>();

        let worker = thread::Builder::new()
            .name("image-squeeze-worker".to_string())
            .spawn(move || run_worker(optimizer, queue))
            .map_err(|e| {
                tracing::error!("failed to start worker thread: {}", e);
                ProcessError::WorkerUnavailable
            })?;

        Ok(Self {
            requests: Some(requests),
            worker: Some(worker),
        })
    }

    /// Queue a batch. Returns immediately.
    pub fn submit(
        &self,
        files: Vec<Candidate>,
        options: OptimizeOptions,
        events: EventSender,
    ) -> BatchHandle {
        let batch_id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        let (reply, result) = bounded(1);

        let request = Request {
            batch_id,
            files,
            options,
            events,
            cancel: cancel.clone(),
            reply,
        };

        let queued = match &self.requests {
            Some(requests) => requests.send(request).map_err(|e| e.into_inner()),
            None => Err(request),
        };

        if let Err(request) = queued {
            tracing::error!(%batch_id, "worker is gone, batch not queued");
            let _ = request.reply.send(Err(ProcessError::WorkerUnavailable));
        }

        BatchHandle {
            id: batch_id,
            result,
            cancel,
            delivered: false,
        }
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        // Closing the queue ends the worker loop after the queued batches
        self.requests.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("worker thread panicked");
            }
        }
    }
}

/// The pending result of one submitted batch
pub struct BatchHandle {
    id: Uuid,
    result: Receiver<BatchResult>,
    cancel: CancellationToken,
    delivered: bool,
}

impl BatchHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Ask the worker to stop before its next file
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Block until the batch resolves
    pub fn wait(self) -> BatchResult {
        if self.delivered {
            return Err(ProcessError::WorkerUnavailable);
        }
        self.result
            .recv()
            .unwrap_or(Err(ProcessError::WorkerUnavailable))
    }

    /// Poll for the result without blocking.
    ///
    /// Yields `Some` once; later calls return `None`.
    pub fn try_result(&mut self) -> Option<BatchResult> {
        if self.delivered {
            return None;
        }
        let result = match self.result.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(ProcessError::WorkerUnavailable),
        };
        self.delivered = true;
        Some(result)
    }
}

fn run_worker(optimizer: Optimizer, queue: Receiver<Request>) {
    tracing::debug!("worker started");

    for request in queue.iter() {
        let batch_id = request.batch_id.to_string();
        tracing::info!(batch_id = %batch_id, files = request.files.len(), "batch started");
        request.events.send(Event::Process(ProcessEvent::Started {
            batch_id,
            files: request.files.len(),
        }));

        let result = process_batch(
            &optimizer,
            &request.files,
            &request.options,
            &request.events,
            &request.cancel,
        );

        // The caller may have dropped its handle
        let _ = request.reply.send(result);
    }

    tracing::debug!("worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::coordinator::runner::tests::{corrupt, png, stub_optimizer};
    use crate::core::optimizer::{ImageEncoder, OutputFormat};
    use crate::error::OptimizeError;
    use crate::events::{null_sender, EventChannel};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Encoder that waits for a go signal before each encode
    struct GatedEncoder {
        gate: Mutex<Receiver<()>>,
    }

    impl ImageEncoder for GatedEncoder {
        fn format(&self) -> OutputFormat {
            OutputFormat::Webp
        }

        fn encode(&self, _: &[u8], _: u32, _: u32, _: u8) -> Result<Vec<u8>, OptimizeError> {
            let gate = self.gate.lock().unwrap();
            gate.recv_timeout(Duration::from_secs(10)).unwrap();
            Ok(vec![9])
        }
    }

    #[test]
    fn batch_resolves_with_ordered_results() {
        let coordinator = Coordinator::spawn(stub_optimizer()).unwrap();
        let files = vec![png("one.png", 2, 2), png("two.png", 2, 2), png("three.png", 2, 2)];

        let results = coordinator
            .submit(files, OptimizeOptions::default(), null_sender())
            .wait()
            .unwrap();

        let names: Vec<_> = results.iter().map(|r| r.original_name.as_str()).collect();
        assert_eq!(names, ["one.png", "two.png", "three.png"]);
    }

    #[test]
    fn failing_batch_names_the_file() {
        let coordinator = Coordinator::spawn(stub_optimizer()).unwrap();
        let files = vec![png("one.png", 2, 2), corrupt("two.jpg"), png("three.png", 2, 2)];

        let error = coordinator
            .submit(files, OptimizeOptions::default(), null_sender())
            .wait()
            .unwrap_err();

        assert!(matches!(error, ProcessError::FileFailed { ref name, .. } if name == "two.jpg"));
        assert!(error.to_string().starts_with("Failed to process two.jpg"));
    }

    #[test]
    fn batches_run_in_submission_order() {
        let coordinator = Coordinator::spawn(stub_optimizer()).unwrap();
        let first = coordinator.submit(vec![png("a.png", 2, 2)], OptimizeOptions::default(), null_sender());
        let second = coordinator.submit(vec![png("b.png", 2, 2)], OptimizeOptions::default(), null_sender());

        assert_eq!(second.wait().unwrap()[0].original_name, "b.png");
        assert_eq!(first.wait().unwrap()[0].original_name, "a.png");
    }

    #[test]
    fn started_event_carries_batch_id() {
        let coordinator = Coordinator::spawn(stub_optimizer()).unwrap();
        let (sender, receiver) = EventChannel::new();

        let handle = coordinator.submit(vec![png("a.png", 2, 2)], OptimizeOptions::default(), sender);
        let id = handle.id().to_string();
        handle.wait().unwrap();

        match receiver.recv() {
            Some(Event::Process(ProcessEvent::Started { batch_id, files })) => {
                assert_eq!(batch_id, id);
                assert_eq!(files, 1);
            }
            other => panic!("expected Started first, got {:?}", other),
        }
    }

    #[test]
    fn try_result_delivers_once() {
        let coordinator = Coordinator::spawn(stub_optimizer()).unwrap();
        let mut handle = coordinator.submit(vec![png("a.png", 2, 2)], OptimizeOptions::default(), null_sender());

        let mut delivered = None;
        for _ in 0..500 {
            if let Some(result) = handle.try_result() {
                delivered = Some(result);
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }

        assert_eq!(delivered.unwrap().unwrap().len(), 1);
        assert!(handle.try_result().is_none());
    }

    #[test]
    fn cancel_stops_between_files() {
        let (go, gate) = unbounded();
        let optimizer = Optimizer::builder()
            .webp_encoder(Arc::new(GatedEncoder {
                gate: Mutex::new(gate),
            }))
            .build();
        let coordinator = Coordinator::spawn(optimizer).unwrap();
        let (sender, receiver) = EventChannel::new();

        let handle = coordinator.submit(
            vec![png("a.png", 2, 2), png("b.png", 2, 2)],
            OptimizeOptions::default(),
            sender,
        );

        // Wait until the first file is in flight, then cancel and release it
        loop {
            match receiver.recv() {
                Some(Event::Process(ProcessEvent::FileStarted { index: 0, .. })) => break,
                Some(_) => continue,
                None => panic!("worker stopped early"),
            }
        }
        handle.cancel();
        go.send(()).unwrap();

        assert_eq!(handle.wait().unwrap_err(), ProcessError::Cancelled);
    }

    #[test]
    fn dropping_coordinator_finishes_queued_batches() {
        let coordinator = Coordinator::spawn(stub_optimizer()).unwrap();
        let handle = coordinator.submit(vec![png("a.png", 2, 2)], OptimizeOptions::default(), null_sender());
        drop(coordinator);

        assert_eq!(handle.wait().unwrap().len(), 1);
    }
}
