use std::io::{self, BufRead, Write};

use costs_core::Subscription;

/// Prompts until a listed index is entered. Returns `None` when input ends.
pub fn pick_subscription<'a, R, W>(
    choices: &'a [Subscription],
    mut input: R,
    mut output: W,
) -> io::Result<Option<&'a Subscription>>
where
    R: BufRead,
    W: Write,
{
    writeln!(output, "Please select one of the following subscriptions")?;
    for (index, subscription) in choices.iter().enumerate() {
        writeln!(output, "{index}: {}", subscription.name)?;
    }

    let mut line = String::new();
    loop {
        write!(output, "> ")?;
        output.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match line.trim().parse::<usize>() {
            Ok(index) if index < choices.len() => return Ok(Some(&choices[index])),
            _ => writeln!(output, "Invalid selection. Please try again.")?,
        }
    }
}
