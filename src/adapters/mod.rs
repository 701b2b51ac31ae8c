//! Adapters — concrete implementations of the port traits.
//!
//! | Adapter    | Implements     | Connects to                    |
//! |------------|----------------|--------------------------------|
//! | `hal_bus`  | Bus            | any `embedded_hal::i2c::I2c`   |
//! | `log_sink` | DiagnosticSink | `log` facade                   |
//! | `time`     | Clock, DelayNs | `std::time` / `std::thread`    |

pub mod hal_bus;
pub mod log_sink;
pub mod time;

pub use hal_bus::HalBus;
pub use log_sink::LogSink;
pub use time::{StdClock, StdDelay};
