//! # Events Module
//!
//! Channel-based progress reporting.
//!
//! ## Design
//! The core library emits events through channels, so any front-end
//! (CLI, GUI, web) can subscribe and render validation results and
//! per-file progress without shared state.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Process(ProcessEvent::Progress(entry)) = event {
//!             println!("{}: {}%", entry.name, entry.progress);
//!         }
//!     }
//! });
//!
//! let results = coordinator.submit(files, options, sender).wait()?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
