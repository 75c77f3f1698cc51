//! # Scope Observable
//!
//! A small, synchronous library for observing state that is either active
//! with a value or inactive.
//!
//! ## Features
//!
//! - **Scoped activations**: observers return a [`Scope`] that is closed
//!   exactly once when the activation ends
//! - **Combinators**: `map`, `flat_map`, `filter`, `and`, `and_then` and
//!   [`not`], all built from `make` and `flat_map`
//! - **Controllers**: the mutable source that drives everything from
//!   imperative code
//! - **Streams**: follow any observable from async code as a stream of
//!   [`Activation`]s
//! - **Tab groups**: [`TabGroupModelFilter`], an indexed grouping of tabs
//!
//! ## Example
//!
//! ```rust,no_run
//! use scope_observable::prelude::*;
//!
//! let session = Controller::<String>::new();
//! let foreground = Controller::<()>::new();
//!
//! let _subscription = session
//!     .observe()
//!     .and(&foreground.observe())
//!     .subscribe(observers::on_enter_both(|name: String, _: ()| {
//!         println!("show controls for {name}");
//!     }));
//!
//! foreground.set(());
//! session.set("kitchen speaker".to_string());
//! ```

mod both;
mod controller;
mod error;
mod observable;
mod observer;
mod scope;
mod stream;
mod tab_group;

pub use both::{both, Both};
pub use controller::Controller;
pub use error::{Result, TabGroupError};
pub use observable::{not, Observable};
pub use observer::{observers, Observer};
pub use scope::{Scope, Subscription};
pub use stream::{Activation, ActivationStream};
pub use tab_group::{TabGroupModelFilter, TabId};

// Re-export the prelude
pub mod prelude {
    pub use crate::{
        not, observers, Activation, Both, Controller, Observable, Observer, Scope, Subscription,
    };
}
