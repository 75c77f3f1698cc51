//! Activation stream example.
//!
//! Demonstrates how to follow an observable from async code.

use futures::executor::block_on;
use futures::StreamExt;
use scope_observable::prelude::*;

fn main() {
    let connected = Controller::<u32>::new();
    let mut stream = connected.observe().map(|device| device * 100).activations();

    connected.set(1);
    connected.set(2);
    connected.reset();

    block_on(async {
        for _ in 0..4 {
            match stream.next().await {
                Some(Activation::Opened(port)) => println!("listening on {port}"),
                Some(Activation::Closed) => println!("stopped listening"),
                None => break,
            }
        }
    });

    // Dropping the stream unsubscribes from the controller.
    drop(stream);
    assert_eq!(connected.subscriber_count(), 0);
}
