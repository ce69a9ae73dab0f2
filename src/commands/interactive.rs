use dialoguer::Input;

use crate::services::matcher::BrandProposal;
use crate::services::pipeline::{ControlSurface, Decision, ResumePoint, StartMode};
use crate::types::{AppError, AppResult};

/// Candidate lines printed per proposal before the prompt.
const PREVIEW_LIMIT: usize = 8;

/// Drives the mapping session from the terminal.
pub struct ConsoleControl;

impl ConsoleControl {
    fn ask(&self, prompt: &str) -> AppResult<String> {
        let answer: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(answer.trim().to_string())
    }
}

impl ControlSurface for ConsoleControl {
    fn choose_start(&mut self, resume: Option<&ResumePoint>) -> AppResult<StartMode> {
        let Some(point) = resume else {
            return Ok(StartMode::FromBeginning);
        };

        println!("Saved session found: {}/{} brands processed.", point.processed, point.total);
        if let Some(next) = &point.next_brand {
            println!("Next pending brand: {next}");
        }
        println!("1. Start from the beginning");
        println!("2. Pick a brand to start from");
        println!("3. Continue where you left off");

        loop {
            let choice = self.ask("Choose an option (1-3)")?;
            match choice.as_str() {
                "1" => return Ok(StartMode::FromBeginning),
                "2" => {
                    let brand = self.ask("Brand name")?;
                    if brand.is_empty() {
                        println!("Empty name, pick again.");
                        continue;
                    }
                    return Ok(StartMode::FromBrand(brand));
                }
                "" | "3" => return Ok(StartMode::Resume),
                _ => println!("Invalid option, choose 1, 2 or 3."),
            }
        }
    }

    fn decide(&mut self, proposal: &BrandProposal, position: usize, total: usize) -> AppResult<Decision> {
        let counts = proposal.counts();

        println!();
        println!("Brand {position}/{total}: {}", proposal.brand);
        println!(
            "{} candidates ({} models, {} submodels): {} exact, {} similarity, {} ai",
            counts.total(),
            proposal.models_mapped(),
            proposal.submodels_mapped(),
            counts.exact,
            counts.similarity,
            counts.ai,
        );
        for candidate in proposal.candidates.iter().take(PREVIEW_LIMIT) {
            println!(
                "  {} {} -> {}  ({}, {:.2})",
                candidate.level, candidate.source_name, candidate.target_name, candidate.method, candidate.score,
            );
        }
        let hidden = proposal.candidates.len().saturating_sub(PREVIEW_LIMIT);
        if hidden > 0 {
            println!("  ... and {hidden} more");
        }

        loop {
            let answer = self.ask("Enter to apply, 'n' to skip, 'q' to quit")?.to_lowercase();
            match answer.as_str() {
                "" | "y" => return Ok(Decision::Confirm),
                "n" | "s" => return Ok(Decision::Skip),
                "q" => return Ok(Decision::Quit),
                _ => println!("Invalid answer, use Enter, 'n' or 'q'."),
            }
        }
    }
}
