//! Interactive decisions for large models

use console::{Style, Term};
use inquire::{Select, Text};

use crate::assembler::{ExternalizationPolicy, LargeModel, LargeModelAction};
use crate::error::Result;

const INCLUDE: &str = "Include in package";
const EXTERNALIZE: &str = "Add download URL";
const SKIP: &str = "Skip";

/// Whether prompts can be shown
pub fn is_interactive() -> bool {
    Term::stdout().is_term() && Term::stderr().is_term()
}

/// Ask the user what to do with each large model
///
/// Escaping a prompt skips the model; interrupting it aborts packing.
pub struct PromptPolicy;

impl ExternalizationPolicy for PromptPolicy {
    fn decide(&mut self, model: &LargeModel) -> Result<LargeModelAction> {
        println!(
            "\n{} {} ({:.2} GB)",
            Style::new().bold().yellow().apply_to("Large model:"),
            model.reference.name,
            model.size_gib()
        );
        println!("  {}", model.path.display());

        let Some(choice) = Select::new("What should be done with it?", vec![INCLUDE, EXTERNALIZE, SKIP])
            .with_starting_cursor(0)
            .without_filtering()
            .with_help_message("↑↓ to move, ENTER to select, ESC to skip")
            .prompt_skippable()?
        else {
            return Ok(LargeModelAction::Skip);
        };

        match choice {
            INCLUDE => Ok(LargeModelAction::Embed),
            EXTERNALIZE => {
                let url = Text::new("Download URL:")
                    .with_help_message("Leave empty to skip the model")
                    .prompt_skippable()?;
                Ok(LargeModelAction::externalize_or_skip(
                    url.as_deref().unwrap_or_default(),
                ))
            }
            _ => Ok(LargeModelAction::Skip),
        }
    }
}
