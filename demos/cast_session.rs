//! Cast session example demonstrating scope_observable.
//!
//! This example shows:
//! - Driving observables from controllers
//! - Combining sources with `and`, `and_then` and `not`
//! - Filtering activations
//! - Tearing everything down by closing subscriptions

use scope_observable::prelude::*;

fn main() {
    let session = Controller::<String>::new();
    let foreground = Controller::<()>::new();
    let volume = Controller::<u8>::new();

    // Shown only while a session runs and the app is in the foreground.
    let controls = session.observe().and(&foreground.observe()).subscribe(
        observers::on_enter_both(|name: String, _: ()| println!("show controls for {name}")),
    );

    // Only counts sessions started after the app came to the foreground.
    let started_here = foreground
        .observe()
        .and_then(&session.observe())
        .subscribe(|pair: Both<(), String>| {
            println!("session {} started while visible", pair.second);
            Scope::new(|| println!("no longer started here"))
        });

    let idle = not(&session.observe()).subscribe(|_: ()| {
        println!("idle");
        Scope::new(|| println!("busy"))
    });

    let loud = volume
        .observe()
        .filter(|level| *level > 80)
        .subscribe(observers::on_enter(|level: u8| println!("volume is loud: {level}")));

    session.set("living room".to_string());
    foreground.set(());
    session.set("kitchen".to_string());
    volume.set(40);
    volume.set(95);
    session.reset();

    controls.close();
    started_here.close();
    idle.close();
    loud.close();

    println!("Run with: cargo run --example cast_session");
}
