/// Debounced input for the search box
///
/// Inputs are forwarded only after a quiet period with no newer input; every
/// intermediate value is dropped. Dropping the [`Debouncer`] flushes the last
/// pending value and ends the background task.
///
/// # Example
///
/// ```no_run
/// use techclub_client::debounce::{Debouncer, DEFAULT_QUIET_PERIOD};
///
/// # async fn example() {
/// let (debouncer, mut settled) = Debouncer::spawn(DEFAULT_QUIET_PERIOD);
///
/// debouncer.push("r".to_string());
/// debouncer.push("ru".to_string());
/// debouncer.push("rust".to_string());
///
/// assert_eq!(settled.recv().await.as_deref(), Some("rust"));
/// # }
/// ```

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Default quiet period (500 ms)
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

/// Sending half of a debounced channel
pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<T>,
    handle: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawns the debounce task and returns the receiver for settled values
    pub fn spawn(quiet: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (input, rx) = mpsc::unbounded_channel();
        let (settled, output) = mpsc::unbounded_channel();

        let handle = tokio::spawn(run(quiet, rx, settled));

        (Debouncer { input, handle }, output)
    }

    /// Queues a value; returns false once the debounce task has stopped
    pub fn push(&self, value: T) -> bool {
        self.input.send(value).is_ok()
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

async fn run<T>(
    quiet: Duration,
    mut input: mpsc::UnboundedReceiver<T>,
    settled: mpsc::UnboundedSender<T>,
) {
    let mut pending: Option<T> = None;

    loop {
        let Some(value) = pending.take() else {
            match input.recv().await {
                Some(value) => {
                    pending = Some(value);
                    continue;
                }
                None => return,
            }
        };

        tokio::select! {
            next = input.recv() => match next {
                Some(newer) => pending = Some(newer),
                None => {
                    let _ = settled.send(value);
                    return;
                }
            },
            _ = sleep(quiet) => {
                if settled.send(value).is_err() {
                    tracing::debug!("Debounce receiver dropped");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    #[tokio::test(start_paused = true)]
    async fn test_only_last_value_of_burst_is_emitted() {
        let (debouncer, mut settled) = Debouncer::spawn(DEFAULT_QUIET_PERIOD);

        for term in ["r", "ru", "rus", "rust"] {
            assert!(debouncer.push(term));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        assert_eq!(settled.recv().await, Some("rust"));
        assert!(timeout(Duration::from_secs(5), settled.recv()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_separated_inputs_are_each_emitted() {
        let (debouncer, mut settled) = Debouncer::spawn(DEFAULT_QUIET_PERIOD);

        debouncer.push(1);
        tokio::time::sleep(Duration::from_millis(600)).await;
        debouncer.push(2);

        assert_eq!(settled.recv().await, Some(1));
        assert_eq!(settled.recv().await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_flushes_pending_value() {
        let (debouncer, mut settled) = Debouncer::spawn(Duration::from_secs(60));

        debouncer.push("final");
        drop(debouncer);

        assert_eq!(settled.recv().await, Some("final"));
        assert_eq!(settled.recv().await, None);
    }
}
