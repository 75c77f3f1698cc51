//! Bridge from observables to async consumers.
//!
//! Activations are forwarded through an unbounded `futures` channel, so a
//! task on an executor can follow an observable without being called back
//! synchronously.

use crate::observable::Observable;
use crate::scope::{Scope, Subscription};
use futures::channel::mpsc;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};

/// One step in an observable's lifecycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Activation<T> {
    Opened(T),
    Closed,
}

/// A stream of [`Activation`]s. Dropping it unsubscribes.
pub struct ActivationStream<T> {
    receiver: mpsc::UnboundedReceiver<Activation<T>>,
    _subscription: Subscription,
}

impl<T> Stream for ActivationStream<T> {
    type Item = Activation<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_next_unpin(cx)
    }
}

impl<T: Clone + 'static> Observable<T> {
    /// Subscribe and report every activation and deactivation as a stream
    /// item.
    pub fn activations(&self) -> ActivationStream<T> {
        let (tx, rx) = mpsc::unbounded::<Activation<T>>();

        let subscription = self.subscribe(move |value: T| {
            // Ignore errors - if the receiver is dropped, nobody is listening
            let _ = tx.unbounded_send(Activation::Opened(value));
            let tx = tx.clone();
            Scope::new(move || {
                let _ = tx.unbounded_send(Activation::Closed);
            })
        });

        ActivationStream {
            receiver: rx,
            _subscription: subscription,
        }
    }
}
