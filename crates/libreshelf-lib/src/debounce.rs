use std::{cell::Cell, future::Future};

/// Lets only the last of a burst of calls through.
///
/// Each call to [`Debouncer::settle`] takes a ticket and waits on the given
/// delay; it resolves to `true` only if no newer call started meanwhile.
#[derive(Debug, Default)]
pub struct Debouncer {
    ticket: Cell<u64>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn settle<F>(&self, delay: F) -> bool
    where
        F: Future<Output = ()>,
    {
        let ticket = self.ticket.get().wrapping_add(1);
        self.ticket.set(ticket);
        delay.await;
        self.ticket.get() == ticket
    }

    pub fn cancel(&self) {
        self.ticket.set(self.ticket.get().wrapping_add(1));
    }
}

#[cfg(test)]
mod test {
    use futures::channel::oneshot;

    use super::*;

    #[tokio::test]
    async fn test_only_last_call_fires() {
        let debouncer = Debouncer::new();
        let (tx1, rx1) = oneshot::channel::<()>();
        let (tx2, rx2) = oneshot::channel::<()>();

        let (first, second, _) = futures::join!(
            debouncer.settle(async move {
                let _ = rx1.await;
            }),
            debouncer.settle(async move {
                let _ = rx2.await;
            }),
            async move {
                let _ = tx1.send(());
                let _ = tx2.send(());
            }
        );

        assert!(!first);
        assert!(second);
    }

    #[tokio::test]
    async fn test_cancel() {
        let debouncer = Debouncer::new();
        let (tx, rx) = oneshot::channel::<()>();

        let (fired, _) = futures::join!(
            debouncer.settle(async move {
                let _ = rx.await;
            }),
            async {
                debouncer.cancel();
                let _ = tx.send(());
            }
        );

        assert!(!fired);
    }
}
