use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, mpsc};
use std::thread;

use crate::domain::{GenerateResponse, GenerationRequest, PanelError};
use crate::infra::remote::GenerationRemote;

/// Completion of a remote call, queued for the UI thread to drain.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteJobUpdate {
    SamplesFetched {
        result: Result<Vec<String>, PanelError>,
    },
    GenerationSettled {
        job_id: u64,
        result: Result<GenerateResponse, PanelError>,
    },
}

/// Runs remote calls off the UI thread.
///
/// At most one generation is in flight at a time; a sample fetch runs
/// independently of it. Calls are never cancelled. Dropping the manager stops
/// the worker without waiting for calls still on the wire, and their
/// completions are discarded.
pub struct RemoteJobManager {
    next_job_id: AtomicU64,
    command_tx: mpsc::Sender<WorkerMessage>,
    shared: Arc<Mutex<SharedState>>,
    worker_handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl RemoteJobManager {
    pub fn new(remote: Arc<dyn GenerationRemote>) -> Result<Self, PanelError> {
        let shared = Arc::new(Mutex::new(SharedState::default()));
        let (command_tx, command_rx) = mpsc::channel();
        let worker_tx = command_tx.clone();
        let worker_shared = Arc::clone(&shared);

        let handle = thread::Builder::new()
            .name("genpanel-remote-worker".to_string())
            .spawn(move || worker_loop(remote, command_rx, worker_tx, worker_shared))
            .map_err(|error| {
                PanelError::internal(format!("failed to start remote worker thread: {error}"))
            })?;

        Ok(Self {
            next_job_id: AtomicU64::new(1),
            command_tx,
            shared,
            worker_handle: Mutex::new(Some(handle)),
        })
    }

    pub fn fetch_samples(&self) -> Result<(), PanelError> {
        self.command_tx
            .send(WorkerMessage::FetchSamples)
            .map_err(|error| {
                PanelError::internal(format!(
                    "failed to submit sample fetch to worker queue: {error}"
                ))
            })
    }

    /// Queues a generation and returns its job id.
    ///
    /// Fails with [`PanelError::Busy`] while another generation is running.
    pub fn submit_generation(&self, request: GenerationRequest) -> Result<u64, PanelError> {
        {
            let mut shared = lock_shared(&self.shared);
            if shared.generation_in_flight {
                return Err(PanelError::Busy);
            }
            shared.generation_in_flight = true;
        }

        let job_id = self.next_job_id.fetch_add(1, Ordering::SeqCst);
        if let Err(error) = self
            .command_tx
            .send(WorkerMessage::Generate { job_id, request })
        {
            lock_shared(&self.shared).generation_in_flight = false;
            return Err(PanelError::internal(format!(
                "failed to submit generation job to worker queue: {error}"
            )));
        }

        Ok(job_id)
    }

    pub fn is_generation_in_flight(&self) -> bool {
        lock_shared(&self.shared).generation_in_flight
    }

    pub fn drain_updates(&self) -> Vec<RemoteJobUpdate> {
        lock_shared(&self.shared).updates.drain(..).collect()
    }
}

impl Drop for RemoteJobManager {
    fn drop(&mut self) {
        let _ = self.command_tx.send(WorkerMessage::Shutdown);

        let handle = self
            .worker_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

#[derive(Default)]
struct SharedState {
    generation_in_flight: bool,
    updates: VecDeque<RemoteJobUpdate>,
}

enum WorkerMessage {
    FetchSamples,
    Generate {
        job_id: u64,
        request: GenerationRequest,
    },
    Completion(RemoteJobUpdate),
    Shutdown,
}

fn worker_loop(
    remote: Arc<dyn GenerationRemote>,
    command_rx: mpsc::Receiver<WorkerMessage>,
    command_tx: mpsc::Sender<WorkerMessage>,
    shared: Arc<Mutex<SharedState>>,
) {
    tracing::debug!("remote worker started");

    while let Ok(message) = command_rx.recv() {
        match message {
            WorkerMessage::FetchSamples => {
                spawn_remote_task(
                    "genpanel-fetch-samples",
                    &remote,
                    &command_tx,
                    &shared,
                    |remote| RemoteJobUpdate::SamplesFetched {
                        result: remote.fetch_samples(),
                    },
                    |error| RemoteJobUpdate::SamplesFetched { result: Err(error) },
                );
            }
            WorkerMessage::Generate { job_id, request } => {
                spawn_remote_task(
                    "genpanel-generate",
                    &remote,
                    &command_tx,
                    &shared,
                    move |remote| RemoteJobUpdate::GenerationSettled {
                        job_id,
                        result: remote.submit_generation(&request),
                    },
                    move |error| RemoteJobUpdate::GenerationSettled {
                        job_id,
                        result: Err(error),
                    },
                );
            }
            WorkerMessage::Completion(update) => push_update(&shared, update),
            WorkerMessage::Shutdown => break,
        }
    }

    tracing::debug!("remote worker stopped");
}

fn spawn_remote_task<F, E>(
    name: &str,
    remote: &Arc<dyn GenerationRemote>,
    command_tx: &mpsc::Sender<WorkerMessage>,
    shared: &Arc<Mutex<SharedState>>,
    task: F,
    on_spawn_error: E,
) where
    F: FnOnce(&dyn GenerationRemote) -> RemoteJobUpdate + Send + 'static,
    E: FnOnce(PanelError) -> RemoteJobUpdate,
{
    let remote_for_thread = Arc::clone(remote);
    let tx_for_thread = command_tx.clone();

    let spawned = thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            let update = task(remote_for_thread.as_ref());
            let _ = tx_for_thread.send(WorkerMessage::Completion(update));
        });

    if let Err(error) = spawned {
        push_update(
            shared,
            on_spawn_error(PanelError::internal(format!(
                "failed to start {name} thread: {error}"
            ))),
        );
    }
}

fn push_update(shared: &Arc<Mutex<SharedState>>, update: RemoteJobUpdate) {
    let mut shared = lock_shared(shared);
    if matches!(update, RemoteJobUpdate::GenerationSettled { .. }) {
        shared.generation_in_flight = false;
    }
    shared.updates.push_back(update);
}

fn lock_shared(shared: &Mutex<SharedState>) -> MutexGuard<'_, SharedState> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex, mpsc};
    use std::thread;
    use std::time::{Duration, Instant};

    use crate::domain::{
        GenerateResponse, GenerationRequest, GuidanceScale, PanelError, StepCount,
    };
    use crate::infra::remote::GenerationRemote;

    use super::{RemoteJobManager, RemoteJobUpdate};

    struct BlockingRemote {
        entered: Arc<AtomicBool>,
        release_rx: Arc<Mutex<mpsc::Receiver<()>>>,
        generate_calls: Arc<AtomicUsize>,
    }

    impl GenerationRemote for BlockingRemote {
        fn fetch_samples(&self) -> Result<Vec<String>, PanelError> {
            Ok(vec!["a cat".to_string()])
        }

        fn submit_generation(
            &self,
            _request: &GenerationRequest,
        ) -> Result<GenerateResponse, PanelError> {
            self.generate_calls.fetch_add(1, Ordering::SeqCst);
            self.entered.store(true, Ordering::SeqCst);
            let _ = self
                .release_rx
                .lock()
                .expect("release channel lock poisoned")
                .recv();
            Ok(GenerateResponse {
                image: "QQ==".to_string(),
            })
        }
    }

    struct FailingRemote;

    impl GenerationRemote for FailingRemote {
        fn fetch_samples(&self) -> Result<Vec<String>, PanelError> {
            Err(PanelError::Transport {
                message: "connection refused".to_string(),
            })
        }

        fn submit_generation(
            &self,
            _request: &GenerationRequest,
        ) -> Result<GenerateResponse, PanelError> {
            Err(PanelError::Http {
                status: 500,
                message: "boom".to_string(),
            })
        }
    }

    fn request(prompt: &str) -> GenerationRequest {
        GenerationRequest::new(prompt, StepCount::default(), GuidanceScale::default())
            .expect("request should build")
    }

    fn wait_for_updates(manager: &RemoteJobManager, count: usize) -> Vec<RemoteJobUpdate> {
        let start = Instant::now();
        let mut updates = Vec::new();
        while start.elapsed() < Duration::from_secs(2) {
            updates.extend(manager.drain_updates());
            if updates.len() >= count {
                return updates;
            }
            thread::sleep(Duration::from_millis(5));
        }

        panic!("expected {count} update(s), got {updates:?}");
    }

    #[test]
    fn submit_generation_runs_remote_on_background_thread() {
        let entered = Arc::new(AtomicBool::new(false));
        let (release_tx, release_rx) = mpsc::channel();
        let manager = RemoteJobManager::new(Arc::new(BlockingRemote {
            entered: Arc::clone(&entered),
            release_rx: Arc::new(Mutex::new(release_rx)),
            generate_calls: Arc::new(AtomicUsize::new(0)),
        }))
        .expect("manager should start worker");

        let start = Instant::now();
        let job_id = manager
            .submit_generation(request("a castle"))
            .expect("submit should succeed");
        assert!(
            start.elapsed() < Duration::from_millis(50),
            "submit_generation should not block the caller"
        );
        assert!(manager.is_generation_in_flight());

        let wait_start = Instant::now();
        while wait_start.elapsed() < Duration::from_millis(500) && !entered.load(Ordering::SeqCst)
        {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(entered.load(Ordering::SeqCst));
        assert!(manager.drain_updates().is_empty());

        release_tx.send(()).expect("release should succeed");

        let updates = wait_for_updates(&manager, 1);
        assert_eq!(
            updates,
            vec![RemoteJobUpdate::GenerationSettled {
                job_id,
                result: Ok(GenerateResponse {
                    image: "QQ==".to_string()
                }),
            }]
        );
        assert!(!manager.is_generation_in_flight());
    }

    #[test]
    fn second_generation_is_refused_while_first_is_in_flight() {
        let generate_calls = Arc::new(AtomicUsize::new(0));
        let (release_tx, release_rx) = mpsc::channel();
        let manager = RemoteJobManager::new(Arc::new(BlockingRemote {
            entered: Arc::new(AtomicBool::new(false)),
            release_rx: Arc::new(Mutex::new(release_rx)),
            generate_calls: Arc::clone(&generate_calls),
        }))
        .expect("manager should start worker");

        manager
            .submit_generation(request("first"))
            .expect("first submit should succeed");
        let second = manager
            .submit_generation(request("second"))
            .expect_err("second submit should be refused");
        assert_eq!(second, PanelError::Busy);

        release_tx.send(()).expect("release should succeed");
        wait_for_updates(&manager, 1);

        assert_eq!(generate_calls.load(Ordering::SeqCst), 1);
        manager
            .submit_generation(request("third"))
            .expect("submit should be accepted after settle");
        release_tx.send(()).expect("release should succeed");
        wait_for_updates(&manager, 1);
        assert_eq!(generate_calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn sample_fetch_runs_while_generation_is_blocked() {
        let (release_tx, release_rx) = mpsc::channel();
        let manager = RemoteJobManager::new(Arc::new(BlockingRemote {
            entered: Arc::new(AtomicBool::new(false)),
            release_rx: Arc::new(Mutex::new(release_rx)),
            generate_calls: Arc::new(AtomicUsize::new(0)),
        }))
        .expect("manager should start worker");

        manager
            .submit_generation(request("a castle"))
            .expect("submit should succeed");
        manager.fetch_samples().expect("fetch should be queued");

        let updates = wait_for_updates(&manager, 1);
        assert_eq!(
            updates,
            vec![RemoteJobUpdate::SamplesFetched {
                result: Ok(vec!["a cat".to_string()]),
            }]
        );

        release_tx.send(()).expect("release should succeed");
        wait_for_updates(&manager, 1);
    }

    #[test]
    fn failures_are_reported_as_updates() {
        let manager =
            RemoteJobManager::new(Arc::new(FailingRemote)).expect("manager should start worker");

        manager.fetch_samples().expect("fetch should be queued");
        let job_id = manager
            .submit_generation(request("a castle"))
            .expect("submit should succeed");

        let updates = wait_for_updates(&manager, 2);
        assert!(updates.contains(&RemoteJobUpdate::SamplesFetched {
            result: Err(PanelError::Transport {
                message: "connection refused".to_string()
            }),
        }));
        assert!(updates.contains(&RemoteJobUpdate::GenerationSettled {
            job_id,
            result: Err(PanelError::Http {
                status: 500,
                message: "boom".to_string()
            }),
        }));
        assert!(!manager.is_generation_in_flight());
    }

    #[test]
    fn drop_does_not_wait_for_in_flight_generation() {
        let (_release_tx, release_rx) = mpsc::channel();
        let manager = RemoteJobManager::new(Arc::new(BlockingRemote {
            entered: Arc::new(AtomicBool::new(false)),
            release_rx: Arc::new(Mutex::new(release_rx)),
            generate_calls: Arc::new(AtomicUsize::new(0)),
        }))
        .expect("manager should start worker");
        manager
            .submit_generation(request("a castle"))
            .expect("submit should succeed");

        let start = Instant::now();
        drop(manager);
        assert!(start.elapsed() < Duration::from_millis(500));
    }
}
