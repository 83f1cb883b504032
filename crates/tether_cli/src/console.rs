//! Console implementation of the interaction capability.
//!
//! Each prompt blocks on a line of stdin, standing in for the modal
//! dialogs of a display-based front-end. End-of-input (Ctrl-D) or an
//! explicit `q` cancels the prompt, which aborts the session cleanly.

use std::io::{self, BufRead, Write};

use tether_core::imaging::ThresholdWindow;
use tether_core::interaction::{Interaction, InteractionError, InteractionResult};
use tether_core::models::{Rect, Region};

/// Blocking stdin/stdout prompts.
pub struct ConsoleInteraction;

impl ConsoleInteraction {
    pub fn new() -> Self {
        Self
    }

    fn read_line(&self, prompt: &str) -> InteractionResult<String> {
        let _ = io::stdout().flush();
        let mut line = String::new();
        let n = io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| InteractionError::invalid_response(prompt, e.to_string()))?;
        if n == 0 {
            // End of input behaves like the user closing the dialog.
            return Err(InteractionError::cancelled(prompt));
        }
        let line = line.trim().to_string();
        if line.eq_ignore_ascii_case("q") {
            return Err(InteractionError::cancelled(prompt));
        }
        Ok(line)
    }
}

impl Default for ConsoleInteraction {
    fn default() -> Self {
        Self::new()
    }
}

impl Interaction for ConsoleInteraction {
    fn acknowledge(&self, title: &str, message: &str) -> InteractionResult<()> {
        println!("\n== {} ==", title);
        println!("{}", message);
        print!("[Enter to continue, q to quit] ");
        self.read_line(title).map(|_| ())
    }

    fn ask_yes_no(&self, prompt: &str, default_yes: bool) -> InteractionResult<bool> {
        let hint = if default_yes { "Y/n" } else { "y/N" };
        loop {
            print!("\n{} [{}] ", prompt, hint);
            let line = self.read_line(prompt)?;
            match parse_yes_no(&line, default_yes) {
                Some(answer) => return Ok(answer),
                None => println!("Please answer y or n."),
            }
        }
    }

    fn choose_region(&self, prompt: &str, available: usize) -> InteractionResult<usize> {
        loop {
            print!("\n{} (1-{}) ", prompt, available);
            let line = self.read_line(prompt)?;
            match line.parse::<usize>() {
                Ok(n) if (1..=available).contains(&n) => return Ok(n - 1),
                _ => println!("Enter a region number between 1 and {}.", available),
            }
        }
    }

    fn adjust_threshold(&self, window: ThresholdWindow) -> InteractionResult<ThresholdWindow> {
        let prompt = "Adjust Threshold";
        loop {
            println!(
                "\nAutomatic threshold window: [{:.1}, {:.1}]",
                window.lower, window.upper
            );
            print!("[Enter to accept, or type 'low high'] ");
            let line = self.read_line(prompt)?;
            if line.is_empty() {
                return Ok(window);
            }
            match parse_window(&line) {
                Some(adjusted) => return Ok(adjusted),
                None => println!("Enter two numbers, e.g. '120 200'."),
            }
        }
    }

    fn place_region(&self, prompt: &str, bounds: Rect) -> InteractionResult<Region> {
        loop {
            print!(
                "\n{} - enter 'x y w h' (image is {}x{}) ",
                prompt, bounds.width, bounds.height
            );
            let line = self.read_line(prompt)?;
            match parse_rect(&line) {
                Some(rect) if rect.right() <= bounds.right() && rect.bottom() <= bounds.bottom() => {
                    match Region::from_rect(rect) {
                        Some(region) => return Ok(region),
                        None => println!("The rectangle must have a non-zero area."),
                    }
                }
                Some(_) => println!("The rectangle must lie inside the image."),
                None => println!("Enter four numbers, e.g. '10 10 20 20'."),
            }
        }
    }
}

/// Parse a y/n answer; empty input takes the default.
fn parse_yes_no(line: &str, default_yes: bool) -> Option<bool> {
    match line.to_ascii_lowercase().as_str() {
        "" => Some(default_yes),
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Parse a 'low high' threshold window.
fn parse_window(line: &str) -> Option<ThresholdWindow> {
    let mut parts = line.split_whitespace();
    let lower: f64 = parts.next()?.parse().ok()?;
    let upper: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || lower > upper {
        return None;
    }
    Some(ThresholdWindow::new(lower, upper))
}

/// Parse an 'x y w h' rectangle.
fn parse_rect(line: &str) -> Option<Rect> {
    let values: Vec<u32> = line
        .split_whitespace()
        .map(|p| p.parse().ok())
        .collect::<Option<Vec<_>>>()?;
    match values.as_slice() {
        [x, y, w, h] => Some(Rect::new(*x, *y, *w, *h)),
        _ => None,
    }
}
