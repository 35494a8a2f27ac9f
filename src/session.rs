//! Device session management.
//!
//! Owns the zero-or-one live camera stream behind the widget. Acquisition
//! mirrors a platform permission request: it runs on a detached thread so
//! the event loop stays responsive, and it resolves with either a live
//! source or a typed error.
//!
//! A stale grant (one that resolves after the user has toggled off, or
//! after a newer acquisition replaced it) finds its result channel closed
//! and releases the source immediately; it never becomes the active
//! session.

use crate::capture::{CameraError, CameraSource, CaptureConfig, Frame};
use std::sync::mpsc::{self, Receiver, SendError, TryRecvError};
use std::sync::Arc;
use std::thread;

/// Lifecycle states of the camera session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No stream held, no acquisition in flight.
    Off,
    /// Acquisition requested, platform has not resolved yet.
    Pending,
    /// Live stream held.
    On,
}

/// Factory producing live camera sources.
///
/// `acquire` is the platform capture request: it opens a video-only
/// stream with the given configuration and returns it live, or fails
/// with the platform's reason (denied, no device, busy, ...).
pub trait SourceFactory: Send + Sync + 'static {
    fn acquire(&self, config: &CaptureConfig) -> Result<Box<dyn CameraSource + Send>, CameraError>;
}

type AcquireResult = Result<Box<dyn CameraSource + Send>, CameraError>;

/// Factory producing mock camera sources, for tests and `--mock` runs.
#[derive(Debug, Default)]
pub struct MockSourceFactory;

impl SourceFactory for MockSourceFactory {
    fn acquire(&self, config: &CaptureConfig) -> AcquireResult {
        let mut camera = crate::capture::MockCamera::new();
        camera.open(config)?;
        Ok(Box::new(camera))
    }
}

/// Factory producing real camera sources.
#[cfg(feature = "camera")]
#[derive(Debug, Default)]
pub struct NokhwaSourceFactory;

#[cfg(feature = "camera")]
impl SourceFactory for NokhwaSourceFactory {
    fn acquire(&self, config: &CaptureConfig) -> AcquireResult {
        let mut camera = crate::capture::NokhwaCamera::new();
        camera.open(config)?;
        Ok(Box::new(camera))
    }
}

/// Manages the lifecycle of the single camera session.
pub struct SessionManager {
    factory: Arc<dyn SourceFactory>,
    config: CaptureConfig,
    source: Option<Box<dyn CameraSource + Send>>,
    pending: Option<Receiver<AcquireResult>>,
}

impl SessionManager {
    /// Creates a manager in the `Off` state.
    pub fn new(factory: Arc<dyn SourceFactory>, config: CaptureConfig) -> Self {
        Self {
            factory,
            config,
            source: None,
            pending: None,
        }
    }

    /// Returns the current session state.
    pub fn state(&self) -> SessionState {
        if self.source.is_some() {
            SessionState::On
        } else if self.pending.is_some() {
            SessionState::Pending
        } else {
            SessionState::Off
        }
    }

    /// Returns true if a live stream is held.
    pub fn is_active(&self) -> bool {
        self.source.is_some()
    }

    /// Requests stream acquisition.
    ///
    /// No-op unless the session is `Off`. The request always runs to
    /// completion on its own thread; there is no cancellation primitive.
    pub fn request_acquire(&mut self) {
        if self.state() != SessionState::Off {
            return;
        }

        let (tx, rx) = mpsc::channel();
        let factory = Arc::clone(&self.factory);
        let config = self.config.clone();

        thread::spawn(move || {
            let result = factory.acquire(&config);
            if let Err(SendError(stale)) = tx.send(result) {
                // The session was released while we were acquiring. The
                // grant must not re-activate a dead session; close it here.
                if let Ok(mut source) = stale {
                    tracing::info!("Discarding stale camera grant");
                    source.close();
                }
            }
        });

        tracing::debug!("Camera acquisition requested");
        self.pending = Some(rx);
    }

    /// Drives a pending acquisition forward.
    ///
    /// Returns true if the session transitioned (grant or deny) during
    /// this call. Call once per event-loop iteration.
    pub fn poll(&mut self) -> bool {
        let Some(rx) = &self.pending else {
            return false;
        };

        match rx.try_recv() {
            Ok(Ok(source)) => {
                tracing::info!("Camera session active");
                self.pending = None;
                self.source = Some(source);
                true
            }
            Ok(Err(e)) => {
                tracing::error!("Error accessing camera: {}", e);
                self.pending = None;
                true
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                tracing::error!("Camera acquisition task disappeared");
                self.pending = None;
                true
            }
        }
    }

    /// Releases the session.
    ///
    /// Stops the held stream (close is idempotent per source and releases
    /// the hardware). A pending acquisition is abandoned: a grant already
    /// delivered to the result channel is drained and closed here, and a
    /// grant resolving later finds the channel closed and is released by
    /// the acquiring thread. Safe to call when already `Off`.
    pub fn release(&mut self) {
        if let Some(rx) = self.pending.take() {
            // The grant may already be sitting in the channel; it must be
            // closed, not dropped with the receiver.
            if let Ok(Ok(mut source)) = rx.try_recv() {
                tracing::info!("Discarding stale camera grant");
                source.close();
            }
            tracing::debug!("Abandoning in-flight camera acquisition");
        }
        if let Some(mut source) = self.source.take() {
            source.close();
            tracing::info!("Camera session released");
        }
    }

    /// Captures the current frame from the active stream.
    pub fn current_frame(&mut self) -> Result<Frame, CameraError> {
        match self.source.as_mut() {
            Some(source) => source.frame(),
            None => Err(CameraError::NotOpen),
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Factory that always denies.
    struct DenyFactory;

    impl SourceFactory for DenyFactory {
        fn acquire(
            &self,
            _config: &CaptureConfig,
        ) -> Result<Box<dyn CameraSource + Send>, CameraError> {
            Err(CameraError::PermissionDenied("user declined".into()))
        }
    }

    /// Source whose close() flips a shared flag, for teardown assertions.
    struct TrackedSource {
        open: bool,
        closed_flag: Arc<AtomicBool>,
    }

    impl CameraSource for TrackedSource {
        fn open(&mut self, _config: &CaptureConfig) -> Result<(), CameraError> {
            self.open = true;
            Ok(())
        }

        fn frame(&mut self) -> Result<Frame, CameraError> {
            if !self.open {
                return Err(CameraError::NotOpen);
            }
            Ok(Frame::new(vec![0u8; 12], 2, 2, 1))
        }

        fn is_open(&self) -> bool {
            self.open
        }

        fn close(&mut self) {
            self.open = false;
            self.closed_flag.store(true, Ordering::SeqCst);
        }
    }

    /// Factory that resolves immediately with a tracked source.
    struct TrackedFactory {
        closed_flag: Arc<AtomicBool>,
    }

    impl SourceFactory for TrackedFactory {
        fn acquire(
            &self,
            _config: &CaptureConfig,
        ) -> Result<Box<dyn CameraSource + Send>, CameraError> {
            Ok(Box::new(TrackedSource {
                open: true,
                closed_flag: Arc::clone(&self.closed_flag),
            }))
        }
    }

    /// Factory that blocks in acquire() until the test opens its gate,
    /// simulating a slow permission prompt.
    struct GatedFactory {
        gate: Mutex<Receiver<()>>,
        closed_flag: Arc<AtomicBool>,
    }

    impl SourceFactory for GatedFactory {
        fn acquire(
            &self,
            _config: &CaptureConfig,
        ) -> Result<Box<dyn CameraSource + Send>, CameraError> {
            self.gate
                .lock()
                .unwrap()
                .recv()
                .map_err(|_| CameraError::OpenFailed("gate dropped".into()))?;
            Ok(Box::new(TrackedSource {
                open: true,
                closed_flag: Arc::clone(&self.closed_flag),
            }))
        }
    }

    fn poll_until_settled(manager: &mut SessionManager) {
        for _ in 0..100 {
            if manager.poll() {
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("acquisition did not settle");
    }

    #[test]
    fn test_grant_transitions_off_to_on() {
        let mut manager =
            SessionManager::new(Arc::new(MockSourceFactory), CaptureConfig::default());
        assert_eq!(manager.state(), SessionState::Off);

        manager.request_acquire();
        assert_eq!(manager.state(), SessionState::Pending);

        poll_until_settled(&mut manager);
        assert_eq!(manager.state(), SessionState::On);
        assert!(manager.current_frame().is_ok());
    }

    #[test]
    fn test_deny_leaves_session_off() {
        let mut manager =
            SessionManager::new(Arc::new(DenyFactory), CaptureConfig::default());

        manager.request_acquire();
        poll_until_settled(&mut manager);

        assert_eq!(manager.state(), SessionState::Off);
        assert!(matches!(
            manager.current_frame(),
            Err(CameraError::NotOpen)
        ));
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut manager =
            SessionManager::new(Arc::new(MockSourceFactory), CaptureConfig::default());

        manager.request_acquire();
        poll_until_settled(&mut manager);
        assert!(manager.is_active());

        manager.release();
        assert_eq!(manager.state(), SessionState::Off);

        // Releasing again is a no-op
        manager.release();
        assert_eq!(manager.state(), SessionState::Off);
    }

    #[test]
    fn test_stale_grant_is_discarded_and_closed() {
        let (gate_tx, gate_rx) = mpsc::channel();
        let closed = Arc::new(AtomicBool::new(false));
        let factory = Arc::new(GatedFactory {
            gate: Mutex::new(gate_rx),
            closed_flag: Arc::clone(&closed),
        });
        let mut manager = SessionManager::new(factory, CaptureConfig::default());

        manager.request_acquire();
        assert_eq!(manager.state(), SessionState::Pending);

        // User toggles off before the platform resolves
        manager.release();
        assert_eq!(manager.state(), SessionState::Off);

        // Now let the acquisition resolve; the grant is stale
        gate_tx.send(()).unwrap();

        // The acquiring thread must close the source rather than leak it
        for _ in 0..100 {
            if closed.load(Ordering::SeqCst) {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        assert!(closed.load(Ordering::SeqCst));
        assert_eq!(manager.state(), SessionState::Off);
        assert!(!manager.poll());
    }

    #[test]
    fn test_release_closes_grant_delivered_but_not_polled() {
        let closed = Arc::new(AtomicBool::new(false));
        let factory = Arc::new(TrackedFactory {
            closed_flag: Arc::clone(&closed),
        });
        let mut manager = SessionManager::new(factory, CaptureConfig::default());

        manager.request_acquire();
        // Let the grant land in the result channel without polling it
        thread::sleep(Duration::from_millis(300));

        // Release before poll() ever sees the grant; the stream must
        // still be stopped, not dropped with the channel
        manager.release();

        for _ in 0..100 {
            if closed.load(Ordering::SeqCst) {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        assert!(closed.load(Ordering::SeqCst));
        assert_eq!(manager.state(), SessionState::Off);
        assert!(!manager.poll());
    }

    #[test]
    fn test_request_while_pending_is_noop() {
        let (_gate_tx, gate_rx) = mpsc::channel::<()>();
        let factory = Arc::new(GatedFactory {
            gate: Mutex::new(gate_rx),
            closed_flag: Arc::new(AtomicBool::new(false)),
        });
        let mut manager = SessionManager::new(factory, CaptureConfig::default());

        manager.request_acquire();
        manager.request_acquire();
        assert_eq!(manager.state(), SessionState::Pending);
    }
}
