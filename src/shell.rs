//! Interactive console questions for the batch run.
//!
//! Parsing is kept in free functions so it can be tested without a terminal;
//! `Console` only loops and prints.

use crate::{
    catalog::{Topic, TopicCatalog},
    config::Credential,
    error::{Result, StudioError},
    models::UpscaleFactor,
};
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicChoice {
    /// 1-based menu entry.
    Index(usize),
    Random,
    /// Input was present but not a valid menu entry.
    Invalid,
}

pub fn parse_topic_choice(input: &str, topic_count: usize) -> TopicChoice {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return TopicChoice::Random;
    }
    match trimmed.parse::<usize>() {
        Ok(n) if (1..=topic_count).contains(&n) => TopicChoice::Index(n),
        _ => TopicChoice::Invalid,
    }
}

/// Blank means one image. `None` means ask again.
pub fn parse_batch_size(input: &str) -> Option<u32> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Some(1);
    }
    trimmed.parse::<u32>().ok().filter(|n| *n >= 1)
}

/// Blank or `1` means no upscaling. `None` means ask again.
pub fn parse_upscale_factor(input: &str) -> Option<UpscaleFactor> {
    input.parse().ok()
}

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;
        let mut line = String::new();
        let read = self.input.read_line(&mut line)?;
        if read == 0 {
            return Err(StudioError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "input closed",
            )));
        }
        Ok(line.trim().to_string())
    }

    pub fn select_topic(&mut self, catalog: &TopicCatalog) -> Result<Topic> {
        writeln!(self.output, "Available topics:")?;
        for (idx, topic) in catalog.topics().iter().enumerate() {
            writeln!(self.output, "{}. {}", idx + 1, topic.name)?;
        }

        let answer = self.ask(
            "\nEnter the number of the topic you want to select or press Enter for a random topic: ",
        )?;

        let topic = match parse_topic_choice(&answer, catalog.len()) {
            TopicChoice::Index(n) => catalog.by_index(n).map(|t| {
                log::info!("User selected topic: {}", t.name);
                t
            }),
            TopicChoice::Random => catalog.random().map(|t| {
                log::info!("Randomly selected topic: {}", t.name);
                t
            }),
            TopicChoice::Invalid => {
                log::error!("Invalid selection '{}'. Selecting a random topic.", answer);
                catalog.random().map(|t| {
                    log::info!("Randomly selected topic: {}", t.name);
                    t
                })
            }
        };

        topic.ok_or_else(|| StudioError::Config("topic catalog is empty".into()))
    }

    pub fn read_request(&mut self) -> Result<String> {
        let request = self.ask(
            "\nEnter any specific instructions or details you want to include (or press Enter to skip): ",
        )?;
        if request.is_empty() {
            log::info!("No specific request provided by the user.");
        } else {
            log::info!("User's specific request: {}", request);
        }
        Ok(request)
    }

    pub fn read_batch_size(&mut self) -> Result<u32> {
        loop {
            let answer =
                self.ask("\nEnter the number of images you want to generate (default is 1): ")?;
            match parse_batch_size(&answer) {
                Some(size) => {
                    log::info!("Batch size selected: {}", size);
                    return Ok(size);
                }
                None => log::warn!("Invalid input. Please enter a positive integer."),
            }
        }
    }

    pub fn read_upscale_factor(&mut self) -> Result<UpscaleFactor> {
        loop {
            let answer = self.ask("\nEnter the upscaling factor (default is 1, choose 2, 4 or 8): ")?;
            match parse_upscale_factor(&answer) {
                Some(factor) => {
                    log::info!("Selected upscaling factor: {}", factor);
                    return Ok(factor);
                }
                None => log::warn!("Unsupported upscale factor. Choose from 2, 4, or 8."),
            }
        }
    }

    pub fn read_credential(&mut self, credential: Credential) -> Result<String> {
        loop {
            let value = self.ask(&format!("Enter your {}: ", credential.label()))?;
            if !value.is_empty() {
                return Ok(value);
            }
            log::warn!("{} cannot be empty.", credential.label());
        }
    }
}
