use std::sync::Arc;
use tokio::sync::watch;

/// Daemon wide stop flag. Once triggered it stays triggered, so a task which only starts
/// waiting afterwards still sees it.
#[derive(Clone)]
pub struct Shutdown {
    sender: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }

    pub async fn wait(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender lives in self, so this can't see a closed channel.
        let _ = receiver.wait_for(|triggered| *triggered).await;
    }
}
