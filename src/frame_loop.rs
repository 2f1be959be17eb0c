use std::future::Future;

use tokio::task::AbortHandle;

/// Owns at most one per-session tick task. Arming replaces the previous task.
#[derive(Debug, Default)]
pub struct FrameLoop {
    handle: Option<AbortHandle>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm<F>(&mut self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let join = tokio::spawn(task);
        self.handle = Some(join.abort_handle());
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_armed(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn counting_task(counter: Arc<AtomicU32>) -> impl Future<Output = ()> + Send + 'static {
        async move {
            let mut interval = tokio::time::interval(Duration::from_millis(5));
            loop {
                interval.tick().await;
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[tokio::test]
    async fn rearming_stops_the_previous_task() {
        let first = Arc::new(AtomicU32::new(0));
        let second = Arc::new(AtomicU32::new(0));
        let mut frame_loop = FrameLoop::new();

        frame_loop.arm(counting_task(first.clone()));
        tokio::time::sleep(Duration::from_millis(30)).await;
        frame_loop.arm(counting_task(second.clone()));
        tokio::time::sleep(Duration::from_millis(10)).await;

        let frozen = first.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(frozen > 0);
        assert_eq!(first.load(Ordering::SeqCst), frozen);
        assert!(second.load(Ordering::SeqCst) > 0);
        assert!(frame_loop.is_armed());
    }

    #[tokio::test]
    async fn cancel_and_drop_abort_the_task() {
        let counter = Arc::new(AtomicU32::new(0));
        let mut frame_loop = FrameLoop::new();
        assert!(!frame_loop.is_armed());

        frame_loop.arm(counting_task(counter.clone()));
        tokio::time::sleep(Duration::from_millis(20)).await;
        frame_loop.cancel();
        assert!(!frame_loop.is_armed());
        tokio::time::sleep(Duration::from_millis(10)).await;
        let after_cancel = counter.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(counter.load(Ordering::SeqCst), after_cancel);

        let dropped = Arc::new(AtomicU32::new(0));
        {
            let mut scoped = FrameLoop::new();
            scoped.arm(counting_task(dropped.clone()));
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        let after_drop = dropped.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(dropped.load(Ordering::SeqCst), after_drop);
    }
}
