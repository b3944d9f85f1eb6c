//! The XDM value model (spec.md §3.1–§3.2): atomic values, nodes, maps,
//! arrays and function items, unified under [`XdmItem`]/[`XdmValue`].

pub mod array;
pub mod atomic;
pub mod function;
pub mod map;
pub mod sequence;

pub use array::XdmArray;
pub use atomic::{AtomicValue, QNameValue};
pub use function::XdmFunction;
pub use map::XdmMap;
pub use sequence::{XdmItem, XdmValue};
