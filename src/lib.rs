pub use attributes::{AnchorPlacement, Edge, ElementOptions};
pub use controller::*;
pub use detector::*;
pub use document::*;
pub use element::*;
pub use elements::*;
pub use error::*;
pub use menu::*;
pub use observer::*;
pub use options::*;
pub use page::*;
pub use prepare::*;
pub use scroll::*;
pub use selector::{Selector, SelectorError, Subject};
pub use taffy::NodeId;
pub use timing::*;

pub mod attributes;
mod controller;
mod detector;
mod document;
mod element;
mod elements;
mod error;
mod layout;
mod menu;
mod observer;
mod options;
mod page;
mod prepare;
mod scroll;
mod selector;
pub mod testing;
mod timing;
