//! Line-oriented prompting. Every reader returns `Ok(None)` once input is
//! exhausted so the session can wind down as if the user chose to exit.

use std::io::{self, BufRead, Write};

use appointment_cell::{Date, TimeSlot};

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    pub fn say(&mut self, text: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.output, "{}", text.as_ref())
    }

    /// Prints `label` without a newline and reads one trimmed line. Bytes
    /// that are not UTF-8 come back as U+FFFD, so they fail any later
    /// parsing as ordinary bad input.
    pub fn prompt_line(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = Vec::new();
        if self.input.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&line).trim().to_string()))
    }

    /// Reads a non-negative integer, re-prompting on anything else.
    pub fn prompt_number(&mut self, label: &str) -> io::Result<Option<u32>> {
        loop {
            let Some(line) = self.prompt_line(label)? else {
                return Ok(None);
            };
            match line.parse() {
                Ok(n) => return Ok(Some(n)),
                Err(_) => self.say("Invalid input. Please enter a number.")?,
            }
        }
    }

    /// Asks a yes/no question answered with 1 or 0.
    pub fn confirm(&mut self, question: &str) -> io::Result<Option<bool>> {
        let label = format!("{} (1 for Yes, 0 for No): ", question);
        Ok(self.prompt_number(&label)?.map(|n| n == 1))
    }

    pub fn prompt_date(&mut self, label: &str) -> io::Result<Option<Date>> {
        loop {
            let Some(line) = self.prompt_line(label)? else {
                return Ok(None);
            };
            match parse_date(&line) {
                Some(date) => return Ok(Some(date)),
                None => self.say("Invalid date format. Please use DD MM YYYY.")?,
            }
        }
    }

    pub fn prompt_time(&mut self, label: &str) -> io::Result<Option<TimeSlot>> {
        loop {
            let Some(line) = self.prompt_line(label)? else {
                return Ok(None);
            };
            match parse_time(&line) {
                Some(slot) => return Ok(Some(slot)),
                None => self.say("Invalid time format. Please use HH MM.")?,
            }
        }
    }
}

fn numbers<const N: usize>(line: &str) -> Option<[i64; N]> {
    let parts: Vec<&str> = line
        .split(|c: char| c.is_whitespace() || c == '/' || c == ':')
        .filter(|p| !p.is_empty())
        .collect();
    if parts.len() != N {
        return None;
    }

    let mut values = [0i64; N];
    for (value, part) in values.iter_mut().zip(parts) {
        *value = part.parse().ok()?;
    }
    Some(values)
}

/// Parses `DD MM YYYY` (slashes also accepted). The date itself is
/// not checked against the calendar here.
pub fn parse_date(line: &str) -> Option<Date> {
    let [day, month, year] = numbers::<3>(line)?;
    Some(Date::new(
        u32::try_from(day).ok()?,
        u32::try_from(month).ok()?,
        i32::try_from(year).ok()?,
    ))
}

/// Parses `HH MM` (or `HH:MM`).
pub fn parse_time(line: &str) -> Option<TimeSlot> {
    let [hour, minute] = numbers::<2>(line)?;
    Some(TimeSlot::new(u32::try_from(hour).ok()?, u32::try_from(minute).ok()?))
}
