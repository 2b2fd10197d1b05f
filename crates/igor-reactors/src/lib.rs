//! Reactor plugins for igor.
//!
//! A reactor decides whether it can answer an [`Event`](igor_types::Event)
//! and, if so, produces a [`Response`](igor_types::Response). The hub asks
//! reactors in registration order and hands the event to the first one
//! whose [`Reactor::can_handle`] returns `true`.
//!
//! Shipped reactors:
//!
//! - [`EchoReactor`] (`echo`) -- repeats what follows its trigger
//! - [`FortuneReactor`] (`fortune`) -- picks a random fortune
//! - [`CatPicReactor`] (`catpic`) -- fetches a cat picture URL over HTTP
//!
//! [`http::HttpClient`] is the outbound HTTP helper reactors use to talk to
//! third-party APIs.

pub mod catpic;
pub mod echo;
pub mod fortune;
pub mod http;
pub mod matching;
pub mod traits;

pub use catpic::{CatPicReactor, CatPicReactorFactory};
pub use echo::{EchoReactor, EchoReactorFactory};
pub use fortune::{FortuneReactor, FortuneReactorFactory};
pub use traits::{Reactor, ReactorFactory};

pub use igor_types::error::ReactorError;
