use crate::error::TrackerError;

/// Best-effort "keep the screen on" service.
///
/// Failures are reported but never stop a session.
#[async_trait::async_trait]
pub trait WakeLock: Send {
    async fn acquire(&mut self) -> Result<(), TrackerError>;

    fn release(&mut self);
}

/// Wake lock for environments without a screen to keep on.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopWakeLock;

#[async_trait::async_trait]
impl WakeLock for NoopWakeLock {
    async fn acquire(&mut self) -> Result<(), TrackerError> {
        Ok(())
    }

    fn release(&mut self) {}
}
