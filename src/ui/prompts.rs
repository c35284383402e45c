use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::io::{self, Write};

use crate::capture::Region;

/// Operator decision at the end of a run cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Continue,
    Reset,
    Quit,
}

fn read_line(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    Ok(line.trim().to_string())
}

/// Prompts until the line parses as exactly `n` whole numbers.
fn read_numbers(label: &str, n: usize) -> Result<Vec<u64>> {
    loop {
        let line = read_line(label)?;
        let parsed: Result<Vec<u64>, _> = line.split_whitespace().map(str::parse).collect();
        match parsed {
            Ok(values) if values.len() == n => return Ok(values),
            _ => println!("expected {} whole numbers", n),
        }
    }
}

pub fn read_u64(label: &str) -> Result<u64> {
    Ok(read_numbers(label, 1)?[0])
}

pub fn read_positive_u64(label: &str) -> Result<u64> {
    loop {
        let value = read_u64(label)?;
        if value > 0 {
            return Ok(value);
        }
        println!("value must be greater than zero");
    }
}

/// Region prompt: `x y width height`, re-asked until the rectangle fits the
/// display.
pub fn read_region(max_w: u32, max_h: u32) -> Result<Region> {
    loop {
        let v = read_numbers("enter dimensions in the format: x y width height: ", 4)?;
        let (Ok(x), Ok(y), Ok(w), Ok(h)) = (
            u32::try_from(v[0]),
            u32::try_from(v[1]),
            u32::try_from(v[2]),
            u32::try_from(v[3]),
        ) else {
            println!("values too large");
            continue;
        };

        let region = Region::new(x, y, w, h);
        if region.fits_within(max_w, max_h) {
            return Ok(region);
        }
        println!(
            "out of bounds: max [{},{}], input [{},{}]",
            max_w,
            max_h,
            x as u64 + w as u64,
            y as u64 + h as u64
        );
    }
}

pub fn confirm(label: &str) -> Result<bool> {
    loop {
        match read_line(label)?.to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => println!("please answer y or n"),
        }
    }
}

/// Range selection pair; `0 0` is the stop sentinel.
pub fn read_index_pair(label: &str) -> Result<(usize, usize)> {
    let v = read_numbers(label, 2)?;
    Ok((v[0] as usize, v[1] as usize))
}

/// Single-keypress cycle menu, no Enter required.
pub fn menu_choice() -> Result<MenuChoice> {
    print!("[c]ontinue, [r]eset, [q]uit: ");
    io::stdout().flush()?;

    enable_raw_mode()?;
    let choice = wait_for_choice();
    let restored = disable_raw_mode();
    let choice = choice?;
    restored?;

    let label = match choice {
        MenuChoice::Continue => "continue",
        MenuChoice::Reset => "reset",
        MenuChoice::Quit => "quit",
    };
    println!("{}", label);
    Ok(choice)
}

fn wait_for_choice() -> Result<MenuChoice> {
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('c') | KeyCode::Enter => return Ok(MenuChoice::Continue),
                KeyCode::Char('r') => return Ok(MenuChoice::Reset),
                KeyCode::Char('q') | KeyCode::Esc => return Ok(MenuChoice::Quit),
                _ => {}
            }
        }
    }
}
