//! Contract bindings for the token contracts the watchdog reads.
//!
//! Only the read-only subset of ERC-20 is declared. The watchdog never decodes
//! return values through these bindings; it uses them for call selectors and
//! hand-decodes the raw `eth_call` results.

pub mod token;

pub use token::{selector_hex, BALANCE_OF, DECIMALS, SYMBOL};
