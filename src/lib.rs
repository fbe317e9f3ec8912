//! Fetch-decode-execute core for the CHIP-8 virtual machine.
//!
//! The host owns the frame and keypad buffers and shares them with a
//! [`core::processor::Processor`], then drives it one `step()` at a time:
//!
//! ```
//! use chip8_core::config::Config;
//! use chip8_core::core::processor::Processor;
//! use chip8_core::core::ram::{DisplayBuffer, KeyboardBuffer};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let display = Rc::new(RefCell::new(DisplayBuffer::default()));
//! let keys = Rc::new(RefCell::new(KeyboardBuffer::default()));
//! let mut chip8 = Processor::new(Config::default(), Rc::clone(&display), keys);
//! chip8.load_bytes(&[0x60, 0x05, 0xF0, 0x29, 0xD1, 0x15]).unwrap();
//! chip8.run(3).unwrap();
//! assert!(display.borrow().pixel(0, 0));
//! ```
pub mod config;
pub mod consts;
pub mod core;
pub mod error;
pub mod external;
pub mod utils;
