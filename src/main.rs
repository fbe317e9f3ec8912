use chip8_core::config::RunOptions;
use chip8_core::core::processor::Processor;
use chip8_core::core::ram::{DisplayBuffer, KeyboardBuffer};
use chip8_core::core::rom;
use chip8_core::external::output::TextDisplay;
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;
use std::cell::RefCell;
use std::env;
use std::rc::Rc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()?;

    let opts = RunOptions::from_args(env::args().skip(1))?;
    let prog = rom::Rom::new(&opts.rom_path)?;

    let display_buffer = Rc::new(RefCell::new(DisplayBuffer::default()));
    let keyboard_buffer = Rc::new(RefCell::new(KeyboardBuffer::default()));
    if let Some(key) = opts.hold_key {
        keyboard_buffer.borrow_mut().press(key);
    }

    let mut chip8 = Processor::new(
        opts.config,
        Rc::clone(&display_buffer),
        Rc::clone(&keyboard_buffer),
    );
    chip8.load_program(&prog)?;
    info!(
        "running {} ({} bytes) for up to {} steps",
        opts.rom_path.display(),
        prog.len(),
        opts.max_steps
    );

    let steps = chip8.run(opts.max_steps)?;
    info!("executed {} steps", steps);
    if chip8.waiting_for_key() {
        info!("stopped waiting for a key");
    }

    println!("{}", chip8);
    println!("{}", chip8.dump_display());
    print!("{}", TextDisplay::default().render(&display_buffer.borrow()));
    Ok(())
}
