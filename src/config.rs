use crate::consts;
use crate::error::{Chip8Error, Result};
use crate::external::input;
use std::path::PathBuf;

pub const DEFAULT_MAX_STEPS: usize = 1000;

/// Interpreter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// where programs are copied into memory and where execution starts
    pub load_address: u16,
    /// decrement both timers after every executed instruction instead of
    /// leaving it to the host's `tick_timers()` cadence
    pub tick_timers_on_step: bool,
    /// fixed RNG seed; `None` seeds from entropy
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            load_address: consts::PROG_OFFSET as u16,
            tick_timers_on_step: false,
            rng_seed: None,
        }
    }
}

/// Options for the headless runner binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub rom_path: PathBuf,
    pub max_steps: usize,
    pub hold_key: Option<u8>,
    pub config: Config,
}

impl RunOptions {
    /// Parses `<rom> [--steps N] [--seed N] [--hold KEY] [--tick-on-step]`,
    /// without the program name.
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let mut rom_path = None;
        let mut max_steps = DEFAULT_MAX_STEPS;
        let mut hold_key = None;
        let mut config = Config::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--steps" => max_steps = parse_value(&arg, args.next())?,
                "--seed" => config.rng_seed = Some(parse_value(&arg, args.next())?),
                "--tick-on-step" => config.tick_timers_on_step = true,
                "--hold" => {
                    let value: String = parse_value(&arg, args.next())?;
                    let mut chars = value.chars();
                    let key = match (chars.next(), chars.next()) {
                        (Some(c), None) => input::map_key(c),
                        _ => None,
                    };
                    hold_key = Some(key.ok_or_else(|| {
                        Chip8Error::Usage(format!("'{}' is not mapped to a keypad key", value))
                    })?);
                }
                flag if flag.starts_with("--") => {
                    return Err(Chip8Error::Usage(format!("unknown option {}", flag)));
                }
                _ if rom_path.is_none() => rom_path = Some(PathBuf::from(&arg)),
                _ => return Err(Chip8Error::Usage(format!("unexpected argument {}", arg))),
            }
        }

        Ok(RunOptions {
            rom_path: rom_path.ok_or_else(|| Chip8Error::Usage("need to specify rom path".into()))?,
            max_steps,
            hold_key,
            config,
        })
    }
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: Option<String>) -> Result<T> {
    let value = value.ok_or_else(|| Chip8Error::Usage(format!("{} needs a value", flag)))?;
    value
        .parse()
        .map_err(|_| Chip8Error::Usage(format!("invalid value '{}' for {}", value, flag)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() -> Result<()> {
        let opts = RunOptions::from_args(args(&["pong.ch8"]))?;
        assert_eq!(opts.rom_path, PathBuf::from("pong.ch8"));
        assert_eq!(opts.max_steps, DEFAULT_MAX_STEPS);
        assert_eq!(opts.hold_key, None);
        assert_eq!(opts.config, Config::default());
        assert_eq!(opts.config.load_address, 0x200);
        Ok(())
    }

    #[test]
    fn test_all_options() -> Result<()> {
        let opts = RunOptions::from_args(args(&[
            "--steps",
            "50",
            "pong.ch8",
            "--seed",
            "7",
            "--hold",
            "w",
            "--tick-on-step",
        ]))?;
        assert_eq!(opts.max_steps, 50);
        assert_eq!(opts.hold_key, Some(0x5));
        assert_eq!(opts.config.rng_seed, Some(7));
        assert!(opts.config.tick_timers_on_step);
        Ok(())
    }

    #[test]
    fn test_usage_errors() {
        for bad in [
            args(&[]),
            args(&["a.ch8", "b.ch8"]),
            args(&["a.ch8", "--steps"]),
            args(&["a.ch8", "--steps", "many"]),
            args(&["a.ch8", "--hold", "p"]),
            args(&["a.ch8", "--turbo"]),
        ] {
            assert!(matches!(
                RunOptions::from_args(bad),
                Err(Chip8Error::Usage(_))
            ));
        }
    }
}
